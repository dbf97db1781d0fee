//! Error types for the camt_v11 library.

use std::io;
use thiserror::Error;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during parsing and V11 generation.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred during read or write operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error parsing XML format.
    #[error("XML parsing error: {0}")]
    XmlError(String),

    /// The document namespace is not a recognized camt message version.
    #[error("Unrecognized camt document: {0}")]
    UnrecognizedFormat(String),

    /// A value is wider than its fixed-width field.
    #[error("value {value:?} exceeds field width {width}")]
    FieldOverflow { value: String, width: usize },

    /// Invalid V11 format version specified.
    #[error("Invalid V11 version: {0}")]
    InvalidVersion(String),
}

impl From<serde_xml_rs::Error> for Error {
    fn from(err: serde_xml_rs::Error) -> Self {
        Error::XmlError(err.to_string())
    }
}
