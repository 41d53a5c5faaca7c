//! # xsdvalid
//!
//! XML Schema (XSD 1.0) compilation and instance validation.
//!
//! Given a compiled schema and an XML instance document, the validator
//! produces a deterministic list of violations carrying W3C-style `cvc-*`
//! diagnostic codes. A validation call never stops early: every problem
//! found during the pass is returned.
//!
//! ## Example
//!
//! ```rust
//! use xsdvalid::{Schema, Validator, XmlDocument};
//!
//! let schema = Schema::from_str(r#"
//!     <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
//!       <xs:element name="greeting" type="xs:string"/>
//!     </xs:schema>"#)?;
//!
//! let doc = XmlDocument::parse("<greeting>hello</greeting>")?;
//! let violations = Validator::new(&schema).validate(&doc);
//! assert!(violations.is_empty());
//! # Ok::<(), xsdvalid::Error>(())
//! ```
//!
//! Schemas with `xs:import`/`xs:include` load through
//! [`loaders::SchemaLoader`], which merges the document graph into one
//! combined schema and detects cycles. A compiled [`Schema`] is immutable;
//! concurrent validators may share one.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod documents;
pub mod error;
pub mod limits;
pub mod loaders;
pub mod names;
pub mod namespaces;
pub mod validators;

// Re-exports for convenience
pub use documents::{Position, XmlDocument, XmlElement};
pub use error::{Error, Result};
pub use namespaces::QName;
pub use validators::{Schema, Validator, Violation};

/// Version of the xsdvalid library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The XML Schema namespace
pub const XSD_NAMESPACE: &str = validators::builtins::XSD_NAMESPACE;

/// The XML Schema instance namespace
pub const XSI_NAMESPACE: &str = validators::builtins::XSI_NAMESPACE;
