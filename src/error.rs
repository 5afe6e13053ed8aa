//! Error types for pagemark operations.

use thiserror::Error;

/// Errors that can occur while paginating a content document.
///
/// Every variant is scoped to a single file: callers processing a directory
/// report the error and move on to the next file.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed markup: {0}")]
    MalformedMarkup(String),

    #[error("could not parse numeral '{0}'")]
    UnparsableNumeral(String),

    #[error("no <body>")]
    MissingBody,
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::MalformedMarkup(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
