//! # plaze_transpiler
//!
//! Template-to-code transpiler for Plaze views.
//!
//! A template is markup with tags embedded in it. The transpiler rewrites
//! the tags into executable code and stores the result at a cache path
//! derived from the template path:
//!
//! - `{{-- comment --}}` is removed
//! - `<@name(args)` directives are dispatched to registered handlers
//! - `{!! expr !!}` echoes `expr` unescaped
//! - `{{{ expr }}}` echoes `expr` escaped
//! - `{{ expr }}` echoes `expr` through the configured echo format
//!
//! Prefixing a tag with `@` keeps it as literal text. Code already written
//! between `<?php` and `?>` is left alone.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use plaze_transpiler::{Transpiler, TranspilerConfig};
//!
//! let config = TranspilerConfig::new().with_cache_dir("storage/views");
//! let mut transpiler = Transpiler::new(config).unwrap();
//!
//! transpiler.register_directive("csrf", |_, _| {
//!     Ok("<?php echo csrf_field(); ?>".to_string())
//! });
//!
//! let code = transpiler.transpile_to_string("<p>{{ $name }}</p>").unwrap();
//! assert_eq!(code, "<p><?php echo e($name); ?></p>");
//!
//! if transpiler.is_stale(Path::new("views/home.plaze.php")).unwrap() {
//!     transpiler.transpile(Path::new("views/home.plaze.php")).unwrap();
//! }
//! ```

mod builtin;
pub mod cache;
mod comment;
pub mod config;
pub mod context;
pub mod directive;
mod echo;
pub mod error;
pub mod extension;
pub mod fs;
pub mod token;
pub mod transpiler;

pub use cache::{hash_path, CompiledCache};
pub use config::{TagKind, TagPair, TranspilerConfig, ECHO_PLACEHOLDER};
pub use context::TranspileContext;
pub use directive::{
    matching_paren, strip_parentheses, DirectiveHandler, DirectiveRegistry, DIRECTIVE_INTRODUCER,
};
pub use echo::ESCAPE_MARKER;
pub use error::{TranspileError, TranspileResult};
pub use extension::{Extension, Extensions};
pub use fs::{Filesystem, LocalFilesystem};
pub use token::{tokenize, Span, SpanKind};
pub use transpiler::Transpiler;
