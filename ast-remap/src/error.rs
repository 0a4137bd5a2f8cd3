//! Error types for ast-remap.
//!
//! The matching core never fails: "cannot relocate" is reported as `None`.
//! These errors cover the adapters around it (parsing, XML, reports, I/O).

use thiserror::Error;

/// Result type alias for ast-remap operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading trees and reports.
#[derive(Error, Debug)]
pub enum Error {
    /// Source text could not be parsed into a syntax tree.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The file type has no parsing adapter.
    #[error("Unsupported language for file: {0}")]
    UnsupportedLanguage(String),

    /// A mutation report was readable XML but not a valid report.
    #[error("Report error: {0}")]
    Report(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML error from quick-xml.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}
