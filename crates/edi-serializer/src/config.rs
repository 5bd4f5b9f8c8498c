//! Resolved output configuration
//!
//! An [`OutConfig`] is built once per message from the syntax layers and is
//! read-only afterwards. Together with its [`Dialect`] it is the profile the
//! formatter and renderer work from.

use crate::dialect::Dialect;
use edi_schema::Syntax;
use edi_schema::inheritance::{apply_syntax_chain, build_syntax_chain};
use std::path::PathBuf;

/// Immutable configuration for writing one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutConfig {
    pub dialect: Dialect,
    pub editype: String,
    pub messagetype: String,
    pub topartner: Option<String>,
    pub field_sep: String,
    pub sfield_sep: String,
    pub record_sep: String,
    /// Separator between tag and first field; `None` means `field_sep`
    pub record_tag_sep: Option<String>,
    pub add_crlf_after_record_sep: String,
    /// `None` disables quoting
    pub quote_char: Option<char>,
    pub escape: String,
    pub reserve: String,
    pub forcequote: bool,
    pub decimal_point_substitute: String,
    pub bare_numeric_length: bool,
    pub strip_empty_fields: bool,
    pub suppress_leading_tag: bool,
    pub replacement_char_on_collision: Option<String>,
    pub charset: String,
    pub version: String,
    pub indented: bool,
    pub idoc_mandt: String,
    pub idoc_docnum: String,
    pub automatic_count: bool,
    pub output_destination: Option<PathBuf>,
}

impl OutConfig {
    /// Merge editype defaults, grammar syntax, caller overrides and partner
    /// syntax, in that order of precedence.
    pub fn resolve(
        dialect: Dialect,
        messagetype: impl Into<String>,
        grammar: Option<&Syntax>,
        caller: Option<&Syntax>,
        partner: Option<&Syntax>,
    ) -> Self {
        let defaults = dialect.default_syntax();
        let chain = build_syntax_chain(&defaults, grammar, caller, partner);
        let syntax = apply_syntax_chain(&chain);

        Self {
            dialect,
            editype: dialect.editype().to_string(),
            messagetype: messagetype.into(),
            topartner: None,
            field_sep: syntax.field_sep.unwrap_or_default(),
            sfield_sep: syntax.sfield_sep.unwrap_or_default(),
            record_sep: syntax.record_sep.unwrap_or_default(),
            record_tag_sep: syntax.record_tag_sep.filter(|s| !s.is_empty()),
            add_crlf_after_record_sep: syntax.add_crlf_after_record_sep.unwrap_or_default(),
            quote_char: syntax.quote_char.and_then(|q| q.chars().next()),
            escape: syntax.escape.unwrap_or_default(),
            reserve: syntax.reserve.unwrap_or_default(),
            forcequote: syntax.forcequote.unwrap_or(false),
            decimal_point_substitute: syntax
                .decimal_point_substitute
                .unwrap_or_else(|| ".".to_string()),
            bare_numeric_length: syntax.bare_numeric_length.unwrap_or(false),
            strip_empty_fields: syntax.strip_empty_fields.unwrap_or(false),
            suppress_leading_tag: syntax.suppress_leading_tag.unwrap_or(false),
            replacement_char_on_collision: syntax
                .replacement_char_on_collision
                .filter(|s| !s.is_empty()),
            charset: syntax.charset.unwrap_or_else(|| "utf-8".to_string()),
            version: syntax.version.unwrap_or_default(),
            indented: syntax.indented.unwrap_or(false),
            idoc_mandt: syntax.mandt.unwrap_or_default(),
            idoc_docnum: syntax.docnum.unwrap_or_default(),
            automatic_count: syntax.automatic_count.unwrap_or(false),
            output_destination: None,
        }
    }

    pub fn with_topartner(mut self, topartner: Option<String>) -> Self {
        self.topartner = topartner;
        self
    }

    pub fn with_destination(mut self, destination: Option<PathBuf>) -> Self {
        self.output_destination = destination;
        self
    }

    /// Separator written before the first field after the tag
    pub fn tag_sep(&self) -> &str {
        self.record_tag_sep.as_deref().unwrap_or(&self.field_sep)
    }

    /// Text written after every record
    pub fn record_terminator(&self) -> String {
        format!("{}{}", self.record_sep, self.add_crlf_after_record_sep)
    }

    pub fn escape_chars(&self) -> Vec<char> {
        self.dialect.escape_chars(self)
    }
}
