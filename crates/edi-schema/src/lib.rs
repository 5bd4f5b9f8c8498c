//! # edi-schema
//!
//! Grammar model, loader, and syntax precedence logic for outgoing EDI.
//!
//! A grammar describes, per editype and message type, which records may
//! appear where (the structure), which fields each record holds and how they
//! are formatted, and the syntax defaults (separators, escape, charset).
//! Syntax is layered: editype defaults → grammar → caller → partner.

pub mod inheritance;
pub mod loader;
pub mod model;
pub mod registry;
pub mod syntax;

pub use loader::GrammarLoader;
pub use model::{FieldDef, FieldFormat, Grammar, Structure};
pub use registry::GrammarRegistry;
pub use syntax::Syntax;

use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur when working with grammars
#[derive(Error, Debug)]
pub enum Error {
    #[error("Grammar not found: {0}")]
    NotFound(String),

    #[error("Invalid grammar format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Anything that can hand out grammars and partner syntax.
///
/// Implementations must be safe to share between concurrent serialization
/// calls once populated.
pub trait GrammarSource {
    /// Resolve the grammar for an editype and message type
    fn grammar(&self, editype: &str, messagetype: &str) -> Result<Arc<Grammar>>;

    /// Partner specific syntax; `Ok(None)` when the partner has none
    fn partner_syntax(&self, editype: &str, partner: &str) -> Result<Option<Arc<Syntax>>>;
}
