//! Error types for xsdvalid
//!
//! Errors here cover schema compilation and resource loading. Instance
//! validation never surfaces through these types: the validator collects
//! [`Violation`](crate::validators::Violation) records and always runs to
//! completion.

use std::fmt;
use thiserror::Error;

/// Result type alias using the crate [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for schema compilation and loading
#[derive(Error, Debug)]
pub enum Error {
    /// Schema document is structurally malformed
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Resource loading error (bad path, HTTP failure, missing loader)
    #[error("resource error: {0}")]
    Resource(String),

    /// Invalid value for a type or facet
    #[error("value error: {0}")]
    Value(String),

    /// Resource limit exceeded
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML well-formedness or decoding error
    #[error("XML error: {0}")]
    Xml(String),

    /// URL parsing error
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Structural error in a schema document
///
/// Produced by the compiler for problems like a wrong root element, a global
/// component without a `name`, conflicting `default`/`fixed`, or `xs:all`
/// occurrence violations. These abort compilation.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Error message
    pub message: String,
    /// Location in the schema source (file, line:column)
    pub location: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref loc) = self.location {
            write!(f, " (at {})", loc)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new("global complexType must have a name attribute")
            .with_location("schema.xsd:14:3");

        let msg = format!("{}", err);
        assert!(msg.contains("must have a name"));
        assert!(msg.contains("schema.xsd:14:3"));
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = ParseError::new("not an XSD schema document").into();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_resource_error_display() {
        let err = Error::Resource("HTTP 404 from http://example.com/a.xsd".to_string());
        assert!(format!("{}", err).starts_with("resource error:"));
    }
}
