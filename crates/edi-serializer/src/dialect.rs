//! Dialect profiles
//!
//! The set of editypes is closed. Each variant carries its default syntax
//! and the few hooks where dialects differ: the escape-character set, the
//! policy for separator characters found in content, and an optional
//! container for multi-message documents. Selection depends on the editype
//! only, never on message content.

use crate::config::OutConfig;
use crate::{Error, Result};
use edi_schema::Syntax;
use std::fmt;

/// Serialization dialect, selected by editype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Fixed-width records
    Fixed,
    /// SAP IDoc, fixed-width with canonical control fields
    Idoc,
    /// Delimited, quoted by content
    Csv,
    /// UN/EDIFACT
    Edifact,
    /// TRADACOMS, several messages inside one STX envelope
    Tradacoms,
    /// ANSI X12; separators in content cannot be escaped
    X12,
    /// JSON object per message, grammar checked
    Json,
    /// JSON object per message without grammar lookup
    JsonNoCheck,
}

/// What to do with an escape-set character found in content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Prepend the escape character
    Escape,
    /// Write the replacement character, or fail when none is configured
    Substitute,
}

/// Envelope of a multi-message dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Container {
    /// Tag of the envelope start record (tree root)
    pub start_tag: &'static str,
    /// Tag of each sub-message root under the envelope
    pub message_tag: &'static str,
    /// Fields of the sub-message root whose values, joined, name its grammar
    pub messagetype_fields: [&'static str; 2],
}

const TRADACOMS_CONTAINER: Container = Container {
    start_tag: "STX",
    message_tag: "MHD",
    messagetype_fields: ["TYPE.01", "TYPE.02"],
};

impl Dialect {
    pub const ALL: [Dialect; 8] = [
        Dialect::Fixed,
        Dialect::Idoc,
        Dialect::Csv,
        Dialect::Edifact,
        Dialect::Tradacoms,
        Dialect::X12,
        Dialect::Json,
        Dialect::JsonNoCheck,
    ];

    /// Select the dialect for an editype
    pub fn from_editype(editype: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.editype() == editype)
            .ok_or_else(|| Error::UnknownDialect(editype.to_string()))
    }

    pub fn editype(self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Idoc => "idoc",
            Self::Csv => "csv",
            Self::Edifact => "edifact",
            Self::Tradacoms => "tradacoms",
            Self::X12 => "x12",
            Self::Json => "json",
            Self::JsonNoCheck => "jsonnocheck",
        }
    }

    /// Fixed-width dialects format every absent field
    pub fn is_fixed(self) -> bool {
        matches!(self, Self::Fixed | Self::Idoc)
    }

    /// Dialects written as flat records (as opposed to a tree rendering)
    pub fn renders_records(self) -> bool {
        !matches!(self, Self::Json | Self::JsonNoCheck)
    }

    pub fn needs_grammar(self) -> bool {
        self != Self::JsonNoCheck
    }

    pub fn collision_policy(self) -> CollisionPolicy {
        match self {
            Self::X12 => CollisionPolicy::Substitute,
            _ => CollisionPolicy::Escape,
        }
    }

    pub fn container(self) -> Option<Container> {
        match self {
            Self::Tradacoms => Some(TRADACOMS_CONTAINER),
            _ => None,
        }
    }

    /// Characters that need the collision policy when found in content
    pub fn escape_chars(self, config: &OutConfig) -> Vec<char> {
        let base = || {
            [
                config.record_sep.as_str(),
                config.field_sep.as_str(),
                config.sfield_sep.as_str(),
            ]
        };
        let parts: Vec<&str> = match self {
            Self::Csv => vec![config.escape.as_str()],
            Self::Edifact => {
                let mut parts = base().to_vec();
                parts.push(config.escape.as_str());
                if config.version.as_str() >= "4" {
                    parts.push(config.reserve.as_str());
                }
                parts
            }
            Self::Tradacoms => {
                let mut parts = base().to_vec();
                parts.push(config.escape.as_str());
                parts.push(config.record_tag_sep.as_deref().unwrap_or_default());
                parts
            }
            Self::X12 => {
                let mut parts = base().to_vec();
                if config.version.as_str() >= "00403" {
                    parts.push(config.reserve.as_str());
                }
                parts
            }
            Self::Fixed | Self::Idoc | Self::Json | Self::JsonNoCheck => Vec::new(),
        };

        let mut chars = Vec::new();
        for ch in parts.into_iter().flat_map(str::chars) {
            if !chars.contains(&ch) {
                chars.push(ch);
            }
        }
        chars
    }

    /// Lowest syntax layer for this dialect
    pub fn default_syntax(self) -> Syntax {
        let fixed = || {
            Syntax::new()
                .field_sep("")
                .sfield_sep("")
                .record_sep("\r\n")
                .add_crlf_after_record_sep("")
                .quote_char("")
                .escape("")
                .charset("us-ascii")
                .strip_empty_fields(false)
                .bare_numeric_length(false)
        };

        match self {
            Self::Fixed => fixed(),
            Self::Idoc => {
                let mut syntax = fixed();
                syntax.mandt = Some("0".to_string());
                syntax.docnum = Some("0".to_string());
                syntax.automatic_count = Some(true);
                syntax
            }
            Self::Csv => Syntax::new()
                .field_sep(",")
                .sfield_sep("")
                .record_sep("\r\n")
                .add_crlf_after_record_sep("")
                .quote_char("\"")
                .escape("")
                .charset("utf-8")
                .strip_empty_fields(false)
                .bare_numeric_length(false),
            Self::Edifact => {
                let mut syntax = Syntax::new()
                    .field_sep("+")
                    .sfield_sep(":")
                    .record_sep("'")
                    .add_crlf_after_record_sep("\r\n")
                    .quote_char("")
                    .escape("?")
                    .version("3")
                    .charset("UNOA")
                    .strip_empty_fields(true)
                    .bare_numeric_length(true);
                syntax.reserve = Some("*".to_string());
                syntax
            }
            Self::Tradacoms => Syntax::new()
                .field_sep("+")
                .sfield_sep(":")
                .record_sep("'")
                .record_tag_sep("=")
                .add_crlf_after_record_sep("\r\n")
                .quote_char("")
                .escape("?")
                .charset("us-ascii")
                .strip_empty_fields(true)
                .bare_numeric_length(true),
            Self::X12 => {
                let mut syntax = Syntax::new()
                    .field_sep("*")
                    .sfield_sep(">")
                    .record_sep("~")
                    .add_crlf_after_record_sep("\r\n")
                    .quote_char("")
                    .escape("")
                    .version("00401")
                    .charset("us-ascii")
                    .strip_empty_fields(true)
                    .bare_numeric_length(true);
                syntax.reserve = Some("^".to_string());
                syntax
            }
            Self::Json | Self::JsonNoCheck => Syntax::new().charset("utf-8").indented(false),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.editype())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dialect: Dialect, upper: Syntax) -> OutConfig {
        OutConfig::resolve(dialect, "TEST", None, Some(&upper), None)
    }

    #[test]
    fn test_from_editype() {
        assert_eq!(Dialect::from_editype("edifact").unwrap(), Dialect::Edifact);
        assert_eq!(Dialect::from_editype("jsonnocheck").unwrap(), Dialect::JsonNoCheck);
        assert!(matches!(
            Dialect::from_editype("xml"),
            Err(Error::UnknownDialect(e)) if e == "xml"
        ));
    }

    #[test]
    fn test_edifact_reserve_from_version_4() {
        let v3 = config(Dialect::Edifact, Syntax::new());
        assert_eq!(Dialect::Edifact.escape_chars(&v3), vec!['\'', '+', ':', '?']);

        let v4 = config(Dialect::Edifact, Syntax::new().version("4"));
        assert_eq!(
            Dialect::Edifact.escape_chars(&v4),
            vec!['\'', '+', ':', '?', '*']
        );
    }

    #[test]
    fn test_x12_reserve_from_version_00403() {
        let old = config(Dialect::X12, Syntax::new());
        assert_eq!(Dialect::X12.escape_chars(&old), vec!['~', '*', '>']);

        let new = config(Dialect::X12, Syntax::new().version("00403"));
        assert_eq!(Dialect::X12.escape_chars(&new), vec!['~', '*', '>', '^']);
    }

    #[test]
    fn test_tradacoms_adds_tag_separator() {
        let cfg = config(Dialect::Tradacoms, Syntax::new());
        assert_eq!(
            Dialect::Tradacoms.escape_chars(&cfg),
            vec!['\'', '+', ':', '?', '=']
        );
    }

    #[test]
    fn test_csv_and_fixed_sets() {
        let csv = config(Dialect::Csv, Syntax::new());
        assert!(Dialect::Csv.escape_chars(&csv).is_empty());

        let csv = config(Dialect::Csv, Syntax::new().escape("\\"));
        assert_eq!(Dialect::Csv.escape_chars(&csv), vec!['\\']);

        let fixed = config(Dialect::Fixed, Syntax::new().field_sep("|"));
        assert!(Dialect::Fixed.escape_chars(&fixed).is_empty());
    }

    #[test]
    fn test_dialect_hooks() {
        assert_eq!(Dialect::X12.collision_policy(), CollisionPolicy::Substitute);
        assert_eq!(Dialect::Edifact.collision_policy(), CollisionPolicy::Escape);
        assert_eq!(Dialect::Tradacoms.container().unwrap().start_tag, "STX");
        assert!(Dialect::Edifact.container().is_none());
        assert!(Dialect::Idoc.is_fixed());
        assert!(!Dialect::Json.renders_records());
        assert!(!Dialect::JsonNoCheck.needs_grammar());
    }
}
