//! Concurrent grammar registry
//!
//! Grammars are read-only once registered, so lookups hand out `Arc`s and
//! never hold a lock across a serialization call. Two threads missing the
//! cache at once may both load and register the same grammar; the last
//! insert wins and both copies are identical.

use crate::model::{Grammar, qualified_name};
use crate::syntax::Syntax;
use crate::{Error, GrammarSource, Result};
use dashmap::DashMap;
use std::sync::Arc;

/// Registry for resolved grammars and partner syntax
#[derive(Debug, Default)]
pub struct GrammarRegistry {
    grammars: DashMap<String, Arc<Grammar>>,
    partners: DashMap<String, Option<Arc<Syntax>>>,
}

impl GrammarRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a grammar under its editype and message type
    pub fn register(&self, grammar: Grammar) -> Arc<Grammar> {
        let grammar = Arc::new(grammar);
        self.grammars
            .insert(grammar.qualified_name(), Arc::clone(&grammar));
        grammar
    }

    /// Get a grammar by editype and message type
    pub fn get(&self, editype: &str, messagetype: &str) -> Option<Arc<Grammar>> {
        self.grammars
            .get(&qualified_name(editype, messagetype))
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Check if a grammar exists
    pub fn contains(&self, editype: &str, messagetype: &str) -> bool {
        self.grammars
            .contains_key(&qualified_name(editype, messagetype))
    }

    /// Register partner syntax, or record that a partner has none
    pub fn register_partner(
        &self,
        editype: &str,
        partner: &str,
        syntax: Option<Syntax>,
    ) -> Option<Arc<Syntax>> {
        let syntax = syntax.map(Arc::new);
        self.partners
            .insert(qualified_name(editype, partner), syntax.clone());
        syntax
    }

    /// Cached partner lookup: `None` when never looked up
    pub fn partner(&self, editype: &str, partner: &str) -> Option<Option<Arc<Syntax>>> {
        self.partners
            .get(&qualified_name(editype, partner))
            .map(|entry| entry.value().clone())
    }

    /// Number of cached grammars
    pub fn len(&self) -> usize {
        self.grammars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grammars.is_empty()
    }
}

impl GrammarSource for GrammarRegistry {
    fn grammar(&self, editype: &str, messagetype: &str) -> Result<Arc<Grammar>> {
        self.get(editype, messagetype).ok_or_else(|| {
            Error::NotFound(format!(
                "no grammar registered for editype \"{editype}\", messagetype \"{messagetype}\""
            ))
        })
    }

    fn partner_syntax(&self, editype: &str, partner: &str) -> Result<Option<Arc<Syntax>>> {
        Ok(self.partner(editype, partner).flatten())
    }
}
