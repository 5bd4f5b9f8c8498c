//! Field formatting and validation
//!
//! Converts a raw tree value into the text written for a field definition.
//! Alphanumerics are padded, dates and times are checked as calendar values,
//! and numerics are normalised to the field's decimal rule and zero-padded.

use crate::config::OutConfig;
use crate::{Error, Result};
use chrono::{NaiveDate, NaiveTime};
use edi_schema::{FieldDef, FieldFormat};

/// Formatter bound to the resolved configuration of one message
#[derive(Debug, Clone, Copy)]
pub struct FieldFormatter<'a> {
    config: &'a OutConfig,
}

impl<'a> FieldFormatter<'a> {
    pub fn new(config: &'a OutConfig) -> Self {
        Self { config }
    }

    /// Format `raw` for `field`; `path` names the record in errors.
    ///
    /// `None` and the empty string are treated alike: the field is absent.
    pub fn format(&self, raw: Option<&str>, field: &FieldDef, path: &str) -> Result<String> {
        let value = raw.unwrap_or_default();
        match field.format {
            FieldFormat::Alphanumeric => self.alphanumeric(value, field, path),
            FieldFormat::Date => self.date(value, field, path),
            FieldFormat::Time => self.time(value, field, path),
            FieldFormat::FreeDecimal | FieldFormat::FixedDecimal | FieldFormat::ImplicitDecimal => {
                self.numeric(value, field, path)
            }
        }
    }

    fn alphanumeric(&self, value: &str, field: &FieldDef, path: &str) -> Result<String> {
        let padded = format!("{value:<width$}", width = field.min_length);
        if padded.chars().count() > field.max_length {
            return Err(Error::field_too_long(
                path,
                &field.id,
                field.max_length,
                padded,
            ));
        }
        Ok(padded)
    }

    fn date(&self, value: &str, field: &FieldDef, path: &str) -> Result<String> {
        if value.is_empty() {
            return Ok(self.blank(field));
        }
        if parse_date(value).is_none() {
            return Err(Error::invalid_date(path, &field.id, value));
        }
        check_length(value, field, path)?;
        Ok(value.to_string())
    }

    fn time(&self, value: &str, field: &FieldDef, path: &str) -> Result<String> {
        if value.is_empty() {
            return Ok(self.blank(field));
        }
        if parse_time(value).is_none() {
            return Err(Error::invalid_time(path, &field.id, value));
        }
        check_length(value, field, path)?;
        Ok(value.to_string())
    }

    /// Absent date or time: nothing, or spaces holding the position
    fn blank(&self, field: &FieldDef) -> String {
        if self.config.dialect.is_fixed() {
            " ".repeat(field.min_length)
        } else {
            String::new()
        }
    }

    fn numeric(&self, value: &str, field: &FieldDef, path: &str) -> Result<String> {
        let value = if value.is_empty() {
            if !self.config.dialect.is_fixed() {
                // left to the strip-empty-field policy
                return Ok(String::new());
            }
            "0"
        } else {
            value
        };

        let invalid = || Error::invalid_numeric(path, &field.id, value);
        if value.trim() != value {
            return Err(invalid());
        }
        let number: f64 = value.parse().map_err(|_| invalid())?;
        if !number.is_finite() {
            return Err(invalid());
        }

        let bare = self.config.bare_numeric_length;
        let negative = value.starts_with('-');
        let negative_zero = negative && number == 0.0;

        let decimals = match field.format {
            FieldFormat::FreeDecimal => value.find('.').map_or(0, |pos| value.len() - pos - 1),
            FieldFormat::FixedDecimal => field.decimals,
            _ => 0,
        };
        let sign_width = usize::from(bare && negative);
        let point_width = usize::from(bare && decimals > 0);

        let magnitude = if negative_zero {
            0.0
        } else if field.format == FieldFormat::ImplicitDecimal {
            (0..field.decimals).fold(number, |acc, _| acc * 10.0)
        } else {
            number
        };

        // the sign of negative zero is prepended after padding
        let width = (field.min_length + sign_width + point_width)
            .saturating_sub(usize::from(negative_zero));
        let mut text = format!("{magnitude:0width$.decimals$}");
        if decimals > 0 {
            text = text.replacen('.', &self.config.decimal_point_substitute, 1);
        }
        if negative_zero {
            text.insert(0, '-');
        }

        let counted = text.chars().count().saturating_sub(sign_width + point_width);
        if counted > field.max_length {
            return Err(Error::field_too_long(
                path,
                &field.id,
                field.max_length,
                text,
            ));
        }
        Ok(text)
    }
}

fn check_length(value: &str, field: &FieldDef, path: &str) -> Result<()> {
    let length = value.chars().count();
    if length > field.max_length {
        return Err(Error::field_too_long(path, &field.id, field.max_length, value));
    }
    if length < field.min_length {
        return Err(Error::field_too_short(path, &field.id, field.min_length, value));
    }
    Ok(())
}

/// Parse `YYMMDD` or `CCYYMMDD`
fn parse_date(value: &str) -> Option<NaiveDate> {
    let digits = digits(value)?;
    let (year, rest) = match digits.len() {
        6 => {
            let yy = number(&digits[..2]);
            // same century pivot as strptime's %y
            let century = if yy < 69 { 2000 } else { 1900 };
            (century + yy, &digits[2..])
        }
        8 => (number(&digits[..4]), &digits[4..]),
        _ => return None,
    };
    let year = i32::try_from(year).ok()?;
    NaiveDate::from_ymd_opt(year, number(&rest[..2]), number(&rest[2..]))
}

/// Parse `HHMM` or `HHMMSS`.
///
/// Seconds 60 and 61 are accepted as leap seconds, like strptime's `%S`;
/// they are clamped to 59 in the returned time.
fn parse_time(value: &str) -> Option<NaiveTime> {
    let digits = digits(value)?;
    let seconds = match digits.len() {
        4 => 0,
        6 => number(&digits[4..]),
        _ => return None,
    };
    if seconds > 61 {
        return None;
    }
    NaiveTime::from_hms_opt(number(&digits[..2]), number(&digits[2..4]), seconds.min(59))
}

fn digits(value: &str) -> Option<&[u8]> {
    let bytes = value.as_bytes();
    bytes.iter().all(u8::is_ascii_digit).then_some(bytes)
}

fn number(digits: &[u8]) -> u32 {
    digits
        .iter()
        .fold(0, |acc, d| acc * 10 + u32::from(d - b'0'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use edi_schema::Syntax;

    fn config(dialect: Dialect, overrides: Syntax) -> OutConfig {
        OutConfig::resolve(dialect, "TEST", None, Some(&overrides), None)
    }

    fn numeric(format: FieldFormat, min: usize, max: usize, decimals: usize) -> FieldDef {
        FieldDef::new("AMOUNT", format, min, max).with_decimals(decimals)
    }

    fn fmt(config: &OutConfig, raw: &str, field: &FieldDef) -> Result<String> {
        FieldFormatter::new(config).format(Some(raw), field, "HDR/DET")
    }

    #[test]
    fn test_alphanumeric_pads_to_min() {
        let cfg = config(Dialect::Fixed, Syntax::new());
        let field = FieldDef::new("NAME", FieldFormat::Alphanumeric, 3, 5);

        assert_eq!(fmt(&cfg, "ab", &field).unwrap(), "ab ");
        assert_eq!(fmt(&cfg, "abcde", &field).unwrap(), "abcde");
    }

    #[test]
    fn test_alphanumeric_too_long() {
        let cfg = config(Dialect::Fixed, Syntax::new());
        let field = FieldDef::new("NAME", FieldFormat::Alphanumeric, 3, 5);

        let err = fmt(&cfg, "abcdef", &field).unwrap_err();
        assert!(matches!(
            err,
            Error::FieldTooLong { ref path, ref field, max: 5, ref content }
                if path == "HDR/DET" && field == "NAME" && content == "abcdef"
        ));
    }

    #[test]
    fn test_alphanumeric_counts_characters() {
        let cfg = config(Dialect::Csv, Syntax::new());
        let field = FieldDef::new("CITY", FieldFormat::Alphanumeric, 0, 6);
        assert_eq!(fmt(&cfg, "Zürich", &field).unwrap(), "Zürich");
    }

    #[test]
    fn test_fixed_decimal() {
        let cfg = config(Dialect::Csv, Syntax::new());
        let field = numeric(FieldFormat::FixedDecimal, 7, 10, 2);
        assert_eq!(fmt(&cfg, "12.3", &field).unwrap(), "0012.30");

        let cfg = config(Dialect::Csv, Syntax::new().decimal_point_substitute(","));
        assert_eq!(fmt(&cfg, "12.3", &field).unwrap(), "0012,30");
    }

    #[test]
    fn test_fixed_decimal_rounds() {
        let cfg = config(Dialect::Csv, Syntax::new());
        let field = numeric(FieldFormat::FixedDecimal, 0, 10, 1);
        assert_eq!(fmt(&cfg, "2.26", &field).unwrap(), "2.3");
        assert_eq!(fmt(&cfg, "7", &field).unwrap(), "7.0");
    }

    #[test]
    fn test_fixed_decimal_bare_length() {
        let cfg = config(Dialect::Edifact, Syntax::new());
        let field = numeric(FieldFormat::FixedDecimal, 5, 6, 2);
        // point does not count: five digits
        assert_eq!(fmt(&cfg, "12.3", &field).unwrap(), "012.30");
        assert_eq!(fmt(&cfg, "-12.3", &field).unwrap(), "-012.30");
        assert!(fmt(&cfg, "12345.3", &field).is_err());
    }

    #[test]
    fn test_free_decimal_keeps_precision() {
        let cfg = config(Dialect::Csv, Syntax::new());
        let field = numeric(FieldFormat::FreeDecimal, 6, 10, 0);

        assert_eq!(fmt(&cfg, "12.30", &field).unwrap(), "012.30");
        assert_eq!(fmt(&cfg, "12", &field).unwrap(), "000012");
        assert_eq!(fmt(&cfg, "-1.5", &field).unwrap(), "-001.5");
    }

    #[test]
    fn test_implicit_decimal() {
        let cfg = config(Dialect::Csv, Syntax::new());
        let field = numeric(FieldFormat::ImplicitDecimal, 0, 10, 2);

        assert_eq!(fmt(&cfg, "12.3", &field).unwrap(), "1230");
        assert_eq!(fmt(&cfg, "-0.5", &field).unwrap(), "-50");
    }

    #[test]
    fn test_negative_zero_keeps_sign() {
        let bare = config(Dialect::Edifact, Syntax::new());
        let field = numeric(FieldFormat::FreeDecimal, 3, 5, 0);
        assert_eq!(fmt(&bare, "-0", &field).unwrap(), "-000");

        let plain = config(Dialect::Csv, Syntax::new());
        assert_eq!(fmt(&plain, "-0", &field).unwrap(), "-00");

        let fixed = numeric(FieldFormat::FixedDecimal, 4, 6, 2);
        assert_eq!(fmt(&bare, "-0.00", &fixed).unwrap(), "-00.00");
    }

    #[test]
    fn test_numeric_too_long() {
        let cfg = config(Dialect::Csv, Syntax::new());
        let field = numeric(FieldFormat::FreeDecimal, 0, 3, 0);

        assert!(fmt(&cfg, "123", &field).is_ok());
        let err = fmt(&cfg, "1234", &field).unwrap_err();
        assert!(matches!(err, Error::FieldTooLong { max: 3, .. }));
    }

    #[test]
    fn test_invalid_numeric() {
        let cfg = config(Dialect::Csv, Syntax::new());
        let field = numeric(FieldFormat::FixedDecimal, 0, 10, 2);

        for raw in ["abc", "1,5", " 12", "inf", "NaN", "12-"] {
            let err = fmt(&cfg, raw, &field).unwrap_err();
            assert!(
                matches!(err, Error::InvalidNumeric { ref content, .. } if content == raw),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_absent_numeric() {
        let field = numeric(FieldFormat::FixedDecimal, 5, 10, 2);

        let csv = config(Dialect::Csv, Syntax::new());
        assert_eq!(FieldFormatter::new(&csv).format(None, &field, "HDR").unwrap(), "");

        let fixed = config(Dialect::Fixed, Syntax::new());
        assert_eq!(
            FieldFormatter::new(&fixed).format(None, &field, "HDR").unwrap(),
            "00.00"
        );
    }

    #[test]
    fn test_dates() {
        let cfg = config(Dialect::Edifact, Syntax::new());
        let field = FieldDef::new("DATE", FieldFormat::Date, 6, 8);

        assert_eq!(fmt(&cfg, "240101", &field).unwrap(), "240101");
        assert_eq!(fmt(&cfg, "20240229", &field).unwrap(), "20240229");
        for raw in ["20240230", "2024013", "240132", "2024-01-01", "202401011"] {
            assert!(
                matches!(fmt(&cfg, raw, &field), Err(Error::InvalidDate { .. })),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_date_length_checks() {
        let cfg = config(Dialect::Edifact, Syntax::new());

        let short = FieldDef::new("DATE", FieldFormat::Date, 0, 6);
        assert!(matches!(
            fmt(&cfg, "20240101", &short),
            Err(Error::FieldTooLong { max: 6, .. })
        ));

        let long = FieldDef::new("DATE", FieldFormat::Date, 8, 8);
        assert!(matches!(
            fmt(&cfg, "240101", &long),
            Err(Error::FieldTooShort { min: 8, .. })
        ));
    }

    #[test]
    fn test_times() {
        let cfg = config(Dialect::Edifact, Syntax::new());
        let field = FieldDef::new("TIME", FieldFormat::Time, 4, 6);

        assert_eq!(fmt(&cfg, "1230", &field).unwrap(), "1230");
        assert_eq!(fmt(&cfg, "235959", &field).unwrap(), "235959");
        assert_eq!(fmt(&cfg, "235960", &field).unwrap(), "235960");
        assert_eq!(fmt(&cfg, "235961", &field).unwrap(), "235961");
        for raw in ["2460", "12300000", "123", "1261", "235962"] {
            assert!(
                matches!(fmt(&cfg, raw, &field), Err(Error::InvalidTime { .. })),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_absent_date_holds_fixed_position() {
        let field = FieldDef::new("DATE", FieldFormat::Date, 8, 8);

        let fixed = config(Dialect::Fixed, Syntax::new());
        assert_eq!(
            FieldFormatter::new(&fixed).format(None, &field, "HDR").unwrap(),
            "        "
        );

        let edifact = config(Dialect::Edifact, Syntax::new());
        assert_eq!(
            FieldFormatter::new(&edifact).format(Some(""), &field, "HDR").unwrap(),
            ""
        );
    }
}
