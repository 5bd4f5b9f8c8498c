//! Grammar model definitions

use crate::syntax::Syntax;
use serde::{Deserialize, Serialize};

/// Field id every record starts with: the record tag itself.
pub const TAG_FIELD: &str = "BOTSID";

/// A complete grammar for one editype and message type
#[derive(Debug, Clone)]
pub struct Grammar {
    pub editype: String,
    pub messagetype: String,
    /// Syntax declared by the grammar; overrides editype defaults
    pub syntax: Syntax,
    /// Root of the record structure
    pub structure: Structure,
}

impl Grammar {
    /// Create a grammar with an empty syntax section
    pub fn new(
        editype: impl Into<String>,
        messagetype: impl Into<String>,
        structure: Structure,
    ) -> Self {
        Self {
            editype: editype.into(),
            messagetype: messagetype.into(),
            syntax: Syntax::default(),
            structure,
        }
    }

    /// Attach grammar syntax
    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = syntax;
        self
    }

    /// Cache key for this grammar
    pub fn qualified_name(&self) -> String {
        qualified_name(&self.editype, &self.messagetype)
    }
}

/// Cache key for an editype and message type
pub fn qualified_name(editype: &str, messagetype: &str) -> String {
    format!("{editype}/{messagetype}")
}

/// One record in the structure tree, with its permitted children
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    /// Record tag (value of `BOTSID` in matching tree nodes)
    pub id: String,
    /// Structural path from the root, e.g. `UNH/LIN/QTY`
    pub path: String,
    /// Ordered field definitions; the first one is always the tag field
    pub fields: Vec<FieldDef>,
    /// Permitted child records in grammar order
    pub children: Vec<Structure>,
}

impl Structure {
    /// Create a root structure with the given fields
    pub fn new(id: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        let id = id.into();
        Self {
            path: id.clone(),
            id,
            fields,
            children: Vec::new(),
        }
    }

    /// Append a permitted child, rebasing its path under this record
    pub fn with_child(mut self, mut child: Structure) -> Self {
        child.rebase(&self.path);
        self.children.push(child);
        self
    }

    /// First permitted child with the given tag, in grammar order
    pub fn child(&self, tag: &str) -> Option<&Structure> {
        self.children.iter().find(|s| s.id == tag)
    }

    /// Depth of this record in the structure; the root is level 1
    pub fn level(&self) -> usize {
        self.path.split('/').count()
    }

    fn rebase(&mut self, parent_path: &str) {
        self.path = format!("{parent_path}/{}", self.id);
        let path = self.path.clone();
        for child in &mut self.children {
            child.rebase(&path);
        }
    }
}

/// Definition of a field (simple, or composite when it has subfields)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub id: String,
    pub format: FieldFormat,
    pub min_length: usize,
    pub max_length: usize,
    /// Number of decimals; numeric formats only
    pub decimals: usize,
    /// Subfields sharing one wire slot; empty for simple fields
    pub subfields: Vec<FieldDef>,
}

impl FieldDef {
    /// Create a simple field
    pub fn new(id: impl Into<String>, format: FieldFormat, min_length: usize, max_length: usize) -> Self {
        Self {
            id: id.into(),
            format,
            min_length,
            max_length,
            decimals: 0,
            subfields: Vec::new(),
        }
    }

    /// Alphanumeric tag field for a record
    pub fn tag(max_length: usize) -> Self {
        Self::new(TAG_FIELD, FieldFormat::Alphanumeric, 0, max_length)
    }

    /// Create a composite field from its subfields
    pub fn composite(id: impl Into<String>, subfields: Vec<FieldDef>) -> Self {
        let max_length = subfields.iter().map(|s| s.max_length).sum();
        Self {
            id: id.into(),
            format: FieldFormat::Alphanumeric,
            min_length: 0,
            max_length,
            decimals: 0,
            subfields,
        }
    }

    /// Set the number of decimals
    pub fn with_decimals(mut self, decimals: usize) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn is_composite(&self) -> bool {
        !self.subfields.is_empty()
    }
}

/// Field format codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldFormat {
    /// Text, right-padded with spaces to the minimum length
    #[serde(rename = "A", alias = "AN")]
    Alphanumeric,
    /// Date, `YYMMDD` or `CCYYMMDD`
    #[serde(rename = "D", alias = "DT")]
    Date,
    /// Time, `HHMM` or `HHMMSS`
    #[serde(rename = "T", alias = "TM")]
    Time,
    /// Numeric, keeps the decimals present in the source value
    #[serde(rename = "R")]
    FreeDecimal,
    /// Numeric with a fixed number of decimals
    #[serde(rename = "N")]
    FixedDecimal,
    /// Numeric with implicit decimals (no decimal point written)
    #[serde(rename = "I")]
    ImplicitDecimal,
}

impl FieldFormat {
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::FreeDecimal | Self::FixedDecimal | Self::ImplicitDecimal
        )
    }

    /// Single-letter format code
    pub fn code(self) -> char {
        match self {
            Self::Alphanumeric => 'A',
            Self::Date => 'D',
            Self::Time => 'T',
            Self::FreeDecimal => 'R',
            Self::FixedDecimal => 'N',
            Self::ImplicitDecimal => 'I',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structure_paths_follow_nesting() {
        let structure = Structure::new("UNH", vec![FieldDef::tag(3)]).with_child(
            Structure::new("LIN", vec![FieldDef::tag(3)])
                .with_child(Structure::new("QTY", vec![FieldDef::tag(3)])),
        );

        let lin = structure.child("LIN").unwrap();
        assert_eq!(lin.path, "UNH/LIN");
        assert_eq!(lin.child("QTY").unwrap().path, "UNH/LIN/QTY");
        assert_eq!(lin.child("QTY").unwrap().level(), 3);
        assert_eq!(structure.level(), 1);
    }

    #[test]
    fn test_composite_field() {
        let field = FieldDef::composite(
            "C507",
            vec![
                FieldDef::new("C507.2005", FieldFormat::Alphanumeric, 1, 3),
                FieldDef::new("C507.2380", FieldFormat::Alphanumeric, 1, 35),
            ],
        );

        assert!(field.is_composite());
        assert_eq!(field.max_length, 38);
        assert!(!field.subfields[0].is_composite());
    }

    #[test]
    fn test_format_codes() {
        assert!(FieldFormat::ImplicitDecimal.is_numeric());
        assert!(!FieldFormat::Date.is_numeric());
        assert_eq!(FieldFormat::FixedDecimal.code(), 'N');

        let parsed: FieldFormat = serde_json::from_str("\"AN\"").unwrap();
        assert_eq!(parsed, FieldFormat::Alphanumeric);
    }
}
