//! Module containing the definition of error types.

use thiserror::Error;

/// Enumeration of the different error kinds.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Configuration error.
    #[error("there was an error in the configuration: {message}")]
    Config {
        /// Error message.
        message: String,
    },
    /// Parsing error.
    #[error("there was an error in the parsing process")]
    Parse,
    /// The application name could not be extracted from the decompiled tree.
    #[error("missing application metadata: {message}")]
    MissingMetadata {
        /// Error message.
        message: String,
    },
    /// The known library catalog is invalid.
    #[error("invalid library catalog: {message}")]
    Catalog {
        /// Error message.
        message: String,
    },
}
