//! User-registered transformation hooks.

use std::fmt;
use std::sync::Arc;

use crate::context::TranspileContext;
use crate::error::TranspileResult;

/// A hook rewriting a markup span before directives and echoes run.
pub type Extension =
    Arc<dyn Fn(&str, &mut TranspileContext<'_>) -> TranspileResult<String> + Send + Sync>;

/// Extensions in registration order.
#[derive(Clone, Default)]
pub struct Extensions {
    hooks: Vec<Extension>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hook. Duplicates are kept.
    pub fn push(&mut self, hook: Extension) {
        self.hooks.push(hook);
    }

    pub fn as_slice(&self) -> &[Extension] {
        &self.hooks
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run every hook over `text`, each seeing the previous hook's output.
    pub fn apply(&self, text: String, ctx: &mut TranspileContext<'_>) -> TranspileResult<String> {
        self.hooks
            .iter()
            .try_fold(text, |value, hook| hook(&value, &mut *ctx))
    }
}

impl fmt::Debug for Extensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extensions")
            .field("count", &self.hooks.len())
            .finish()
    }
}
