//! Charset-aware output sink
//!
//! Wraps any [`Write`] and encodes text with the configured charset before
//! writing. Every call to [`OutputSink::write_str`] is one `write_all`, so a
//! rendered record is written whole or not at all.

use crate::{Error, Result};
use encoding_rs::Encoding;
use std::io::Write;

#[derive(Debug, Clone, Copy)]
enum Encoder {
    /// Strict 7-bit
    Ascii,
    /// Strict ISO-8859-1; `encoding_rs` treats the label as windows-1252
    Latin1,
    Label(&'static Encoding),
}

/// Output stream for one write call
pub struct OutputSink<W: Write> {
    inner: W,
    charset: String,
    encoder: Encoder,
    bytes_written: usize,
}

impl<W: Write> OutputSink<W> {
    /// Open a sink; unknown charsets are rejected up front
    pub fn new(inner: W, charset: &str) -> Result<Self> {
        Ok(Self {
            inner,
            charset: charset.to_string(),
            encoder: encoder_for(charset)?,
            bytes_written: 0,
        })
    }

    pub fn charset(&self) -> &str {
        &self.charset
    }

    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// Encode and write `text`
    pub fn write_str(&mut self, text: &str) -> Result<()> {
        match self.encoder {
            Encoder::Ascii => {
                if !text.is_ascii() {
                    return Err(Error::charset(&self.charset, text));
                }
                self.inner.write_all(text.as_bytes())?;
                self.bytes_written += text.len();
            }
            Encoder::Latin1 => {
                let bytes = text
                    .chars()
                    .map(|ch| u8::try_from(u32::from(ch)).ok())
                    .collect::<Option<Vec<u8>>>()
                    .ok_or_else(|| Error::charset(&self.charset, text))?;
                self.inner.write_all(&bytes)?;
                self.bytes_written += bytes.len();
            }
            Encoder::Label(encoding) => {
                let (bytes, _, had_errors) = encoding.encode(text);
                if had_errors {
                    return Err(Error::charset(&self.charset, text));
                }
                self.inner.write_all(&bytes)?;
                self.bytes_written += bytes.len();
            }
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Flush and return the wrapped writer
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.inner)
    }
}

/// Map a charset name to an encoder. EDIFACT syntax identifiers are
/// accepted next to the usual labels.
fn encoder_for(charset: &str) -> Result<Encoder> {
    let label = charset.trim().to_ascii_lowercase();
    let label = match label.as_str() {
        "ascii" | "us-ascii" | "unoa" | "unob" => return Ok(Encoder::Ascii),
        "unoc" | "iso-8859-1" | "iso8859-1" | "iso_8859-1" | "latin1" | "latin-1" | "l1" => {
            return Ok(Encoder::Latin1);
        }
        "unod" => "iso-8859-2",
        "unoe" => "iso-8859-5",
        "unof" => "iso-8859-7",
        "unow" | "unoy" => "utf-8",
        other => other,
    };
    Encoding::for_label(label.as_bytes())
        .map(Encoder::Label)
        .ok_or_else(|| Error::charset(charset, format!("unknown charset \"{charset}\"")))
}
