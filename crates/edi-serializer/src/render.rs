//! Record rendering
//!
//! Turns a flattened record into wire text: separators between fields,
//! quoting, escaping (or substitution for dialects that cannot escape) and
//! the record terminator. A record is rendered completely before anything is
//! written, so a failing record never leaves partial output.

use crate::config::OutConfig;
use crate::dialect::CollisionPolicy;
use crate::record::Record;
use crate::{Error, Result};

/// Renderer for one resolved configuration
#[derive(Debug, Clone)]
pub struct RecordRenderer<'a> {
    config: &'a OutConfig,
    escape_chars: Vec<char>,
    terminator: String,
    policy: CollisionPolicy,
}

impl<'a> RecordRenderer<'a> {
    pub fn new(config: &'a OutConfig) -> Self {
        Self {
            config,
            escape_chars: config.escape_chars(),
            terminator: config.record_terminator(),
            policy: config.dialect.collision_policy(),
        }
    }

    /// Render a record including its terminator
    pub fn render(&self, record: &Record) -> Result<String> {
        let mut out = String::new();
        self.render_into(record, &mut out)?;
        Ok(out)
    }

    /// Append a rendered record to `out`.
    ///
    /// On error `out` may hold part of the record; callers render into a
    /// scratch buffer.
    pub fn render_into(&self, record: &Record, out: &mut String) -> Result<()> {
        let config = self.config;
        let fields = if config.suppress_leading_tag {
            record.fields.get(1..).unwrap_or_default()
        } else {
            &record.fields[..]
        };

        let mut field_count = 0;
        for field in fields {
            if field.is_subfield {
                out.push_str(&config.sfield_sep);
            } else {
                match field_count {
                    0 => field_count = 1,
                    1 => {
                        out.push_str(config.tag_sep());
                        field_count = 2;
                    }
                    _ => out.push_str(&config.field_sep),
                }
            }

            let quoted = config
                .quote_char
                .filter(|&quote| config.forcequote || self.needs_quotes(&field.value, quote));
            if let Some(quote) = quoted {
                out.push(quote);
            }

            for ch in field.value.chars() {
                if self.escape_chars.contains(&ch) {
                    match self.policy {
                        CollisionPolicy::Escape => out.push_str(&config.escape),
                        CollisionPolicy::Substitute => {
                            let Some(replacement) = &config.replacement_char_on_collision else {
                                return Err(Error::separator_collision(
                                    &record.path,
                                    ch,
                                    &field.value,
                                ));
                            };
                            out.push_str(replacement);
                            continue;
                        }
                    }
                } else if quoted == Some(ch) {
                    out.push(ch);
                }
                out.push(ch);
            }

            if let Some(quote) = quoted {
                out.push(quote);
            }
        }

        out.push_str(&self.terminator);
        Ok(())
    }

    fn needs_quotes(&self, value: &str, quote: char) -> bool {
        let contains = |sep: &str| !sep.is_empty() && value.contains(sep);
        value.contains(quote) || contains(&self.config.field_sep) || contains(&self.terminator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::record::Field;
    use edi_schema::Syntax;

    fn config(dialect: Dialect, overrides: Syntax) -> OutConfig {
        OutConfig::resolve(dialect, "TEST", None, Some(&overrides), None)
    }

    fn record(fields: Vec<Field>) -> Record {
        Record {
            path: "UNH/QTY".to_string(),
            fields,
        }
    }

    #[test]
    fn test_separator_placement() {
        let cfg = config(Dialect::Edifact, Syntax::new().add_crlf_after_record_sep(""));
        let rec = record(vec![
            Field::new("QTY"),
            Field::new("21"),
            Field::subfield("12"),
            Field::subfield("PCE"),
            Field::new("X"),
        ]);

        assert_eq!(RecordRenderer::new(&cfg).render(&rec).unwrap(), "QTY+21:12:PCE+X'");
    }

    #[test]
    fn test_tag_separator() {
        let cfg = config(Dialect::Tradacoms, Syntax::new());
        let rec = record(vec![Field::new("MHD"), Field::new("1"), Field::new("ORDERS")]);

        assert_eq!(
            RecordRenderer::new(&cfg).render(&rec).unwrap(),
            "MHD=1+ORDERS'\r\n"
        );
    }

    #[test]
    fn test_escaping() {
        let cfg = config(Dialect::Edifact, Syntax::new().add_crlf_after_record_sep(""));
        let rec = record(vec![Field::new("FTX"), Field::new("a+b:c'd?e*f")]);

        // '*' is only reserved from version 4 on
        assert_eq!(
            RecordRenderer::new(&cfg).render(&rec).unwrap(),
            "FTX+a?+b?:c?'d??e*f'"
        );

        let cfg = config(
            Dialect::Edifact,
            Syntax::new().add_crlf_after_record_sep("").version("4"),
        );
        assert_eq!(
            RecordRenderer::new(&cfg).render(&rec).unwrap(),
            "FTX+a?+b?:c?'d??e?*f'"
        );
    }

    #[test]
    fn test_quoting_on_separator() {
        let cfg = config(Dialect::Csv, Syntax::new());
        let rec = record(vec![
            Field::new("HDR"),
            Field::new("a,b"),
            Field::new("say \"hi\""),
            Field::new("plain"),
        ]);

        assert_eq!(
            RecordRenderer::new(&cfg).render(&rec).unwrap(),
            "HDR,\"a,b\",\"say \"\"hi\"\"\",plain\r\n"
        );
    }

    #[test]
    fn test_forcequote_and_no_quote_char() {
        let cfg = config(Dialect::Csv, Syntax::new().forcequote(true));
        let rec = record(vec![Field::new("HDR"), Field::new("1")]);
        assert_eq!(
            RecordRenderer::new(&cfg).render(&rec).unwrap(),
            "\"HDR\",\"1\"\r\n"
        );

        let cfg = config(Dialect::Csv, Syntax::new().quote_char("").forcequote(true));
        let rec = record(vec![Field::new("HDR"), Field::new("a,b")]);
        assert_eq!(RecordRenderer::new(&cfg).render(&rec).unwrap(), "HDR,a,b\r\n");
    }

    #[test]
    fn test_suppress_leading_tag() {
        let cfg = config(Dialect::Csv, Syntax::new().suppress_leading_tag(true));
        let rec = record(vec![Field::new("HDR"), Field::new("1"), Field::new("2")]);

        assert_eq!(RecordRenderer::new(&cfg).render(&rec).unwrap(), "1,2\r\n");
    }

    #[test]
    fn test_x12_collision() {
        let rec = record(vec![Field::new("N1"), Field::new("A*B")]);

        let cfg = config(Dialect::X12, Syntax::new().add_crlf_after_record_sep(""));
        let err = RecordRenderer::new(&cfg).render(&rec).unwrap_err();
        assert!(matches!(
            err,
            Error::SeparatorCollision { character: '*', ref content, .. } if content == "A*B"
        ));

        let cfg = config(
            Dialect::X12,
            Syntax::new()
                .add_crlf_after_record_sep("")
                .replacement_char_on_collision("-"),
        );
        assert_eq!(RecordRenderer::new(&cfg).render(&rec).unwrap(), "N1*A-B~");
    }

    #[test]
    fn test_quoted_field_keeps_separator_unescaped() {
        let cfg = config(Dialect::Csv, Syntax::new().escape("\\"));
        let rec = record(vec![Field::new("HDR"), Field::new("a,b\\c")]);

        assert_eq!(
            RecordRenderer::new(&cfg).render(&rec).unwrap(),
            "HDR,\"a,b\\\\c\"\r\n"
        );
    }
}
