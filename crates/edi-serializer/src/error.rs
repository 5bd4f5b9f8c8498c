//! Error types for outgoing message serialization
//!
//! Every error is terminal for the message being written. Field level errors
//! carry the structural path of the record, the field id and the offending
//! content so they can be shown to an operator as is.

use thiserror::Error;

/// Errors that can occur while writing an outgoing message
#[derive(Error, Debug)]
pub enum Error {
    #[error("Schema resolution failed: {0}")]
    SchemaResolution(String),

    #[error("Invalid grammar: {0}")]
    Grammar(String),

    #[error("No outgoing message: tree has no content and no children")]
    EmptyMessage,

    #[error("No outgoing message: no sub-messages found in {container} container")]
    NoOutgoingMessage { container: String },

    #[error("record \"{path}\" field \"{field}\" too big (max {max}): \"{content}\"")]
    FieldTooLong {
        path: String,
        field: String,
        max: usize,
        content: String,
    },

    #[error("record \"{path}\" field \"{field}\" too small (min {min}): \"{content}\"")]
    FieldTooShort {
        path: String,
        field: String,
        min: usize,
        content: String,
    },

    #[error("record \"{path}\" field \"{field}\" no valid date: \"{content}\"")]
    InvalidDate {
        path: String,
        field: String,
        content: String,
    },

    #[error("record \"{path}\" field \"{field}\" no valid time: \"{content}\"")]
    InvalidTime {
        path: String,
        field: String,
        content: String,
    },

    #[error("record \"{path}\" field \"{field}\" numerical format not valid: \"{content}\"")]
    InvalidNumeric {
        path: String,
        field: String,
        content: String,
    },

    #[error(
        "record \"{path}\": character \"{character}\" is in use as separator and cannot be escaped; field: \"{content}\""
    )]
    SeparatorCollision {
        path: String,
        character: char,
        content: String,
    },

    #[error("record \"{path}\": child tag \"{tag}\" clashes with a field of the same name")]
    TagCollision { path: String, tag: String },

    #[error("Chars in outmessage not in charset \"{charset}\": \"{content}\"")]
    Charset { charset: String, content: String },

    #[error("No serialization profile for editype \"{0}\"")]
    UnknownDialect(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn field_too_long(
        path: impl Into<String>,
        field: impl Into<String>,
        max: usize,
        content: impl Into<String>,
    ) -> Self {
        Self::FieldTooLong {
            path: path.into(),
            field: field.into(),
            max,
            content: content.into(),
        }
    }

    pub fn field_too_short(
        path: impl Into<String>,
        field: impl Into<String>,
        min: usize,
        content: impl Into<String>,
    ) -> Self {
        Self::FieldTooShort {
            path: path.into(),
            field: field.into(),
            min,
            content: content.into(),
        }
    }

    pub fn invalid_date(
        path: impl Into<String>,
        field: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::InvalidDate {
            path: path.into(),
            field: field.into(),
            content: content.into(),
        }
    }

    pub fn invalid_time(
        path: impl Into<String>,
        field: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::InvalidTime {
            path: path.into(),
            field: field.into(),
            content: content.into(),
        }
    }

    pub fn invalid_numeric(
        path: impl Into<String>,
        field: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::InvalidNumeric {
            path: path.into(),
            field: field.into(),
            content: content.into(),
        }
    }

    pub fn separator_collision(
        path: impl Into<String>,
        character: char,
        content: impl Into<String>,
    ) -> Self {
        Self::SeparatorCollision {
            path: path.into(),
            character,
            content: content.into(),
        }
    }

    pub fn tag_collision(path: impl Into<String>, tag: impl Into<String>) -> Self {
        Self::TagCollision {
            path: path.into(),
            tag: tag.into(),
        }
    }

    pub fn charset(charset: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Charset {
            charset: charset.into(),
            content: content.into(),
        }
    }

    /// True for errors raised by the field formatter
    pub fn is_field_error(&self) -> bool {
        matches!(
            self,
            Self::FieldTooLong { .. }
                | Self::FieldTooShort { .. }
                | Self::InvalidDate { .. }
                | Self::InvalidTime { .. }
                | Self::InvalidNumeric { .. }
        )
    }
}

impl From<edi_schema::Error> for Error {
    fn from(err: edi_schema::Error) -> Self {
        match err {
            edi_schema::Error::NotFound(msg) => Self::SchemaResolution(msg),
            edi_schema::Error::InvalidFormat(msg) | edi_schema::Error::Parse(msg) => {
                Self::Grammar(msg)
            }
            edi_schema::Error::Io(e) => Self::Io(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
