//! Conditional-form analysis for Ruby source.
//!
//! Given a file parsed with [`ruby_prism`], the [`Engine`] decides for each
//! plain `if`/`unless` statement whether it should trade its block form for
//! the one-line modifier form (or the reverse, when a modifier line exceeds
//! the configured length limit), and renders the corresponding source edit.
//!
//! The host owns parsing and traversal. A typical embedding parses once,
//! builds one engine per file, walks the tree, and feeds each conditional
//! node to [`Engine::evaluate`], then [`Engine::rewrite`] for the nodes it
//! wants fixed.

pub mod ancestry;
pub mod comment;
pub mod conditional;
pub mod config;
pub mod diagnostic;
pub mod directives;
pub mod engine;
pub mod policy;
pub mod source;
pub mod transform;

#[cfg(test)]
pub mod testutil;

pub use config::LineLengthConfig;
pub use diagnostic::{Diagnostic, Location};
pub use engine::Engine;
pub use source::SourceFile;
pub use transform::Rewrite;
