//! Syntax layering
//!
//! Settings are resolved from the least to the most specific layer:
//! editype defaults → grammar syntax → caller overrides → partner syntax.
//! A more specific layer wins on every key it sets.

use crate::syntax::Syntax;

/// Build the layer chain from base to most specific
pub fn build_syntax_chain<'a>(
    defaults: &'a Syntax,
    grammar: Option<&'a Syntax>,
    caller: Option<&'a Syntax>,
    partner: Option<&'a Syntax>,
) -> Vec<&'a Syntax> {
    let mut chain = vec![defaults];
    if let Some(s) = grammar {
        chain.push(s);
    }
    if let Some(s) = caller {
        chain.push(s);
    }
    if let Some(s) = partner {
        chain.push(s);
    }
    chain
}

/// Apply a layer chain to create the effective syntax
pub fn apply_syntax_chain(chain: &[&Syntax]) -> Syntax {
    let mut result = Syntax::default();
    for layer in chain {
        result.overlay(layer);
    }
    result
}
