//! The template transpiler.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::CompiledCache;
use crate::comment::CommentStripper;
use crate::config::{TagKind, TagPair, TranspilerConfig};
use crate::context::TranspileContext;
use crate::directive::{DirectiveRegistry, StatementScanner};
use crate::echo::EchoTranspiler;
use crate::error::TranspileResult;
use crate::extension::{Extension, Extensions};
use crate::fs::{Filesystem, LocalFilesystem};
use crate::token::tokenize;

/// Converts templates into executable code.
///
/// Each call gets its own [`TranspileContext`], so a single transpiler can
/// be shared between threads once its directives and extensions are set up.
pub struct Transpiler {
    config: TranspilerConfig,
    files: Arc<dyn Filesystem>,
    cache: Option<CompiledCache>,
    comments: CommentStripper,
    statements: StatementScanner,
    echos: EchoTranspiler,
    directives: DirectiveRegistry,
    extensions: Extensions,
}

impl Transpiler {
    /// Create a transpiler working against the local disk.
    pub fn new(config: TranspilerConfig) -> TranspileResult<Self> {
        Self::with_filesystem(config, Arc::new(LocalFilesystem))
    }

    /// Create a transpiler with a custom file-access implementation.
    ///
    /// Fails with a configuration error when the configuration is invalid,
    /// including an empty cache directory.
    pub fn with_filesystem(
        config: TranspilerConfig,
        files: Arc<dyn Filesystem>,
    ) -> TranspileResult<Self> {
        config.validate()?;

        let cache = config.cache_dir.as_ref().map(|dir| {
            CompiledCache::new(dir.clone(), config.compiled_extension.clone(), files.clone())
        });

        Ok(Self {
            comments: CommentStripper::new(&config.comment_tags)?,
            statements: StatementScanner::new()?,
            echos: EchoTranspiler::new(&config)?,
            directives: DirectiveRegistry::with_builtins(),
            extensions: Extensions::new(),
            cache,
            files,
            config,
        })
    }

    pub fn config(&self) -> &TranspilerConfig {
        &self.config
    }

    /// The compiled artifact resolver, when caching is enabled.
    pub fn cache(&self) -> Option<&CompiledCache> {
        self.cache.as_ref()
    }

    /// Transpile the template at `path` and write the compiled artifact.
    ///
    /// Returns the artifact path, or `None` without touching the filesystem
    /// when no cache directory is configured.
    pub fn transpile(&self, path: &Path) -> TranspileResult<Option<PathBuf>> {
        let Some(cache) = &self.cache else {
            debug!("No cache directory configured, skipping {:?}", path);
            return Ok(None);
        };

        let source = self.files.read_to_string(path)?;
        let compiled = self.transpile_to_string(&source)?;
        let target = cache.compiled_path_for(path);

        self.files.write(&target, &compiled)?;
        info!("Transpiled {:?} to {:?}", path, target);

        Ok(Some(target))
    }

    /// Transpile `path` only when its compiled artifact is stale.
    ///
    /// Returns whether a new artifact was written.
    pub fn transpile_if_stale(&self, path: &Path) -> TranspileResult<bool> {
        if self.cache.is_none() || !self.is_stale(path)? {
            return Ok(false);
        }
        Ok(self.transpile(path)?.is_some())
    }

    /// Path of the compiled artifact for `path`, when caching is enabled.
    pub fn compiled_path_for(&self, path: &Path) -> Option<PathBuf> {
        self.cache.as_ref().map(|cache| cache.compiled_path_for(path))
    }

    /// Whether `path` needs transpiling. Always true without a cache.
    pub fn is_stale(&self, path: &Path) -> TranspileResult<bool> {
        match &self.cache {
            Some(cache) => cache.is_stale(path),
            None => Ok(true),
        }
    }

    /// Transpile template text.
    pub fn transpile_to_string(&self, source: &str) -> TranspileResult<String> {
        let mut ctx = TranspileContext::new(self);
        let mut result = String::with_capacity(source.len());

        for span in tokenize(source) {
            if span.is_markup() {
                ctx.set_offset(span.offset);
                result.push_str(&self.transpile_markup(span.text, &mut ctx)?);
            } else {
                result.push_str(span.text);
            }
        }

        let footer = ctx.into_footer();
        if footer.is_empty() {
            return Ok(result);
        }

        let mut body = result.trim_start_matches('\n').to_string();
        body.push('\n');
        let lines: Vec<&str> = footer.iter().rev().map(|line| line.as_str()).collect();
        body.push_str(&lines.join("\n"));
        Ok(body)
    }

    /// Comments, extensions, statements, then echoes.
    fn transpile_markup(&self, text: &str, ctx: &mut TranspileContext<'_>) -> TranspileResult<String> {
        let value = self.comments.strip(text, ctx.offset())?;
        let value = self.extensions.apply(value, ctx)?;
        let pieces = self.statements.scan(&value, ctx)?;
        self.echos.transpile_pieces(pieces)
    }

    /// Register a directive handler under `name`.
    pub fn register_directive<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&mut TranspileContext<'_>, Option<&str>) -> TranspileResult<String>
            + Send
            + Sync
            + 'static,
    {
        self.directives.register(name, handler);
    }

    pub fn directives(&self) -> &DirectiveRegistry {
        &self.directives
    }

    pub fn directives_mut(&mut self) -> &mut DirectiveRegistry {
        &mut self.directives
    }

    /// Register an extension hook. Hooks run in registration order.
    pub fn register_extension<F>(&mut self, hook: F)
    where
        F: Fn(&str, &mut TranspileContext<'_>) -> TranspileResult<String> + Send + Sync + 'static,
    {
        debug!("Registering extension #{}", self.extensions.len() + 1);
        self.extensions.push(Arc::new(hook));
    }

    pub fn extensions(&self) -> &[Extension] {
        self.extensions.as_slice()
    }

    /// Replace the delimiters of a tag family.
    pub fn set_tags(&mut self, kind: TagKind, tags: TagPair) -> TranspileResult<()> {
        let mut config = self.config.clone();
        config.set_tags(kind, tags)?;
        self.reconfigure(config)
    }

    /// Replace the wrapper applied to regular echoes.
    pub fn set_echo_format(&mut self, format: impl Into<String>) -> TranspileResult<()> {
        let config = self.config.clone().with_echo_format(format);
        self.reconfigure(config)
    }

    fn reconfigure(&mut self, config: TranspilerConfig) -> TranspileResult<()> {
        config.validate()?;
        self.comments = CommentStripper::new(&config.comment_tags)?;
        self.echos = EchoTranspiler::new(&config)?;
        self.config = config;
        Ok(())
    }

    pub(crate) fn statements(&self) -> &StatementScanner {
        &self.statements
    }

    pub(crate) fn echos(&self) -> &EchoTranspiler {
        &self.echos
    }
}

impl fmt::Debug for Transpiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transpiler")
            .field("config", &self.config)
            .field("directives", &self.directives)
            .field("extensions", &self.extensions)
            .finish()
    }
}
