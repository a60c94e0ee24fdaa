//! Directive statements: `<@name`, optionally followed by `( ... )`.
//!
//! Directives are dispatched through an explicit name → handler table.
//! Names without a handler are copied to the output exactly as written.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use regex::Regex;
use tracing::debug;

use crate::config::TagKind;
use crate::context::TranspileContext;
use crate::echo::{join, push_markup, Piece, ESCAPE_MARKER};
use crate::error::{TranspileError, TranspileResult};

/// Two-character marker that starts a directive.
pub const DIRECTIVE_INTRODUCER: &str = "<@";

/// Handler invoked for a directive.
///
/// Receives the argument list including its outer parentheses, or `None`
/// when the directive was written without one. The returned text replaces
/// the directive tag.
pub type DirectiveHandler =
    Arc<dyn Fn(&mut TranspileContext<'_>, Option<&str>) -> TranspileResult<String> + Send + Sync>;

/// A table of directive handlers keyed by name.
#[derive(Clone, Default)]
pub struct DirectiveRegistry {
    handlers: HashMap<String, DirectiveHandler>,
}

impl DirectiveRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Create a registry holding the built-in directives.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::builtin::register_builtins(&mut registry);
        registry
    }

    /// Register a handler, replacing any handler with the same name.
    pub fn register<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&mut TranspileContext<'_>, Option<&str>) -> TranspileResult<String>
            + Send
            + Sync
            + 'static,
    {
        let name = name.into();
        debug!("Registering directive: {}", name);
        self.handlers.insert(name, Arc::new(handler));
    }

    pub fn get(&self, name: &str) -> Option<&DirectiveHandler> {
        self.handlers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered directive names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn unregister(&mut self, name: &str) -> Option<DirectiveHandler> {
        debug!("Unregistering directive: {}", name);
        self.handlers.remove(name)
    }
}

impl fmt::Debug for DirectiveRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectiveRegistry")
            .field("directives", &self.names())
            .finish()
    }
}

/// Strip one pair of enclosing parentheses from an expression.
pub fn strip_parentheses(expression: &str) -> &str {
    expression
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .unwrap_or(expression)
}

/// Index of the `)` balancing the `(` at `open`.
///
/// Nesting depth is unbounded. Parentheses inside single or double quoted
/// strings are ignored.
pub fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'(') {
        return None;
    }

    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = open;

    while i < bytes.len() {
        let byte = bytes[i];
        match quote {
            Some(q) => {
                if byte == b'\\' {
                    i += 1;
                } else if byte == q {
                    quote = None;
                }
            }
            None => match byte {
                b'\'' | b'"' => quote = Some(byte),
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }

    None
}

/// Finds directive tags in markup and substitutes handler output.
#[derive(Debug)]
pub(crate) struct StatementScanner {
    head: Regex,
}

impl StatementScanner {
    pub(crate) fn new() -> TranspileResult<Self> {
        // escape marker, introducer, name, horizontal spacing
        let head = Regex::new(&format!(
            r"({})?\B{}(\w+)([ \t]*)",
            regex::escape(&ESCAPE_MARKER.to_string()),
            regex::escape(DIRECTIVE_INTRODUCER)
        ))?;
        Ok(Self { head })
    }

    /// Replace directive tags in `text`, returning the result as text.
    pub(crate) fn transpile(
        &self,
        text: &str,
        ctx: &mut TranspileContext<'_>,
    ) -> TranspileResult<String> {
        Ok(join(&self.scan(text, ctx)?))
    }

    /// Split `text` into markup and handler output.
    ///
    /// Handler output is final: the echo passes never rescan it. Escaped and
    /// unknown tags stay markup, copied as written; when their argument does
    /// not balance only the head is copied and scanning resumes after it.
    pub(crate) fn scan<'t>(
        &self,
        text: &'t str,
        ctx: &mut TranspileContext<'_>,
    ) -> TranspileResult<Vec<Piece<'t>>> {
        let directives = ctx.transpiler().directives();
        let base = ctx.offset();
        let mut pieces = Vec::new();
        let mut last = 0;

        while let Some(caps) = self.head.captures_at(text, last) {
            let Some(whole) = caps.get(0) else { break };
            let name = caps.get(2).map_or("", |m| m.as_str());
            let spacing = caps.get(3).map_or("", |m| m.as_str());
            let escaped = caps.get(1).is_some();

            let opens_argument = text[whole.end()..].starts_with('(');
            let close = if opens_argument {
                matching_paren(text, whole.end())
            } else {
                None
            };
            let end = close.map_or(whole.end(), |close| close + 1);

            push_markup(&mut pieces, &text[last..whole.start()], base + last);

            match directives.get(name).filter(|_| !escaped) {
                Some(handler) => {
                    if opens_argument && close.is_none() {
                        return Err(TranspileError::UnterminatedTag {
                            tag: TagKind::Directive,
                            offset: base + whole.start(),
                        });
                    }
                    let argument = close.map(|close| &text[whole.end()..=close]);

                    debug!("Transpiling directive: {}", name);
                    let mut output = handler(&mut *ctx, argument)?;
                    if argument.is_none() {
                        output.push_str(spacing);
                    }
                    pieces.push(Piece::Output(output));
                }
                None => {
                    let start = if escaped {
                        whole.start() + ESCAPE_MARKER.len_utf8()
                    } else {
                        whole.start()
                    };
                    push_markup(&mut pieces, &text[start..end], base + start);
                }
            }

            last = end;
        }

        push_markup(&mut pieces, &text[last..], base + last);
        Ok(pieces)
    }
}
