//! Syntax settings shared by grammars, callers and partner files
//!
//! Every setting is optional; an unset value falls through to the next
//! lower layer (see [`crate::inheritance`]). Keys accept both the descriptive
//! names and the short names found in existing grammar files.

use serde::{Deserialize, Serialize};

/// Layerable syntax section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Syntax {
    pub field_sep: Option<String>,
    pub sfield_sep: Option<String>,
    pub record_sep: Option<String>,
    /// Separator between record tag and first field; defaults to `field_sep`
    pub record_tag_sep: Option<String>,
    /// Line break written after every record separator
    #[serde(alias = "add_crlfafterrecord_sep")]
    pub add_crlf_after_record_sep: Option<String>,
    /// Quote character; empty disables quoting
    pub quote_char: Option<String>,
    pub escape: Option<String>,
    /// Reserved repetition character, escaped from some syntax versions on
    pub reserve: Option<String>,
    pub forcequote: Option<bool>,
    #[serde(alias = "decimaal")]
    pub decimal_point_substitute: Option<String>,
    /// Numeric lengths exclude minus sign and decimal point
    #[serde(alias = "lengthnumericbare")]
    pub bare_numeric_length: Option<bool>,
    /// Trailing empty fields are not written
    #[serde(alias = "stripfield_sep")]
    pub strip_empty_fields: Option<bool>,
    /// Record tag is not written
    #[serde(alias = "noBOTSID")]
    pub suppress_leading_tag: Option<bool>,
    /// Replacement for separator characters in content (x12)
    #[serde(alias = "replacechar")]
    pub replacement_char_on_collision: Option<String>,
    pub charset: Option<String>,
    /// Syntax version, e.g. `4` (edifact) or `00403` (x12)
    pub version: Option<String>,
    /// Pretty-print tree output (json)
    pub indented: Option<bool>,
    /// IDoc client
    #[serde(alias = "MANDT")]
    pub mandt: Option<String>,
    /// IDoc document number
    #[serde(alias = "DOCNUM")]
    pub docnum: Option<String>,
    /// Fill IDoc segment counters
    #[serde(alias = "automaticcount")]
    pub automatic_count: Option<bool>,
}

impl Syntax {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy every value set in `upper` over this layer
    pub fn overlay(&mut self, upper: &Syntax) {
        fn take<T: Clone>(lower: &mut Option<T>, upper: &Option<T>) {
            if upper.is_some() {
                lower.clone_from(upper);
            }
        }

        take(&mut self.field_sep, &upper.field_sep);
        take(&mut self.sfield_sep, &upper.sfield_sep);
        take(&mut self.record_sep, &upper.record_sep);
        take(&mut self.record_tag_sep, &upper.record_tag_sep);
        take(
            &mut self.add_crlf_after_record_sep,
            &upper.add_crlf_after_record_sep,
        );
        take(&mut self.quote_char, &upper.quote_char);
        take(&mut self.escape, &upper.escape);
        take(&mut self.reserve, &upper.reserve);
        take(&mut self.forcequote, &upper.forcequote);
        take(
            &mut self.decimal_point_substitute,
            &upper.decimal_point_substitute,
        );
        take(&mut self.bare_numeric_length, &upper.bare_numeric_length);
        take(&mut self.strip_empty_fields, &upper.strip_empty_fields);
        take(&mut self.suppress_leading_tag, &upper.suppress_leading_tag);
        take(
            &mut self.replacement_char_on_collision,
            &upper.replacement_char_on_collision,
        );
        take(&mut self.charset, &upper.charset);
        take(&mut self.version, &upper.version);
        take(&mut self.indented, &upper.indented);
        take(&mut self.mandt, &upper.mandt);
        take(&mut self.docnum, &upper.docnum);
        take(&mut self.automatic_count, &upper.automatic_count);
    }

    pub fn field_sep(mut self, value: impl Into<String>) -> Self {
        self.field_sep = Some(value.into());
        self
    }

    pub fn sfield_sep(mut self, value: impl Into<String>) -> Self {
        self.sfield_sep = Some(value.into());
        self
    }

    pub fn record_sep(mut self, value: impl Into<String>) -> Self {
        self.record_sep = Some(value.into());
        self
    }

    pub fn record_tag_sep(mut self, value: impl Into<String>) -> Self {
        self.record_tag_sep = Some(value.into());
        self
    }

    pub fn add_crlf_after_record_sep(mut self, value: impl Into<String>) -> Self {
        self.add_crlf_after_record_sep = Some(value.into());
        self
    }

    pub fn quote_char(mut self, value: impl Into<String>) -> Self {
        self.quote_char = Some(value.into());
        self
    }

    pub fn escape(mut self, value: impl Into<String>) -> Self {
        self.escape = Some(value.into());
        self
    }

    pub fn forcequote(mut self, value: bool) -> Self {
        self.forcequote = Some(value);
        self
    }

    pub fn decimal_point_substitute(mut self, value: impl Into<String>) -> Self {
        self.decimal_point_substitute = Some(value.into());
        self
    }

    pub fn bare_numeric_length(mut self, value: bool) -> Self {
        self.bare_numeric_length = Some(value);
        self
    }

    pub fn strip_empty_fields(mut self, value: bool) -> Self {
        self.strip_empty_fields = Some(value);
        self
    }

    pub fn suppress_leading_tag(mut self, value: bool) -> Self {
        self.suppress_leading_tag = Some(value);
        self
    }

    pub fn replacement_char_on_collision(mut self, value: impl Into<String>) -> Self {
        self.replacement_char_on_collision = Some(value.into());
        self
    }

    pub fn charset(mut self, value: impl Into<String>) -> Self {
        self.charset = Some(value.into());
        self
    }

    pub fn version(mut self, value: impl Into<String>) -> Self {
        self.version = Some(value.into());
        self
    }

    pub fn indented(mut self, value: bool) -> Self {
        self.indented = Some(value);
        self
    }
}
