//! Error types for the listing digest.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the listing digest.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A text field could not be parsed.
    #[error("Cannot parse {field} from {input:?}")]
    Parse {
        /// Name of the field being parsed (price, floor, trade type).
        field: &'static str,
        /// The offending input text.
        input: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a parse error for `field`.
    pub fn parse(field: &'static str, input: impl Into<String>) -> Self {
        Error::Parse {
            field,
            input: input.into(),
        }
    }
}
