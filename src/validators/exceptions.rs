//! Validation violations and diagnostic codes
//!
//! Every problem found while validating an instance document is materialized
//! as a [`Violation`]. The validator never bails out early: one call returns
//! all violations gathered during the pass. Codes follow the W3C `cvc-*` and
//! `src-*` conventions, plus a few `xsd-*` synthetic codes for pre-structure
//! checks. Formatting and pretty-printing stay outside this crate's core.

use crate::documents::{Position, XmlElement};
use serde::Serialize;

/// W3C-style diagnostic codes used across the validator
pub mod codes {
    /// No declaration found for a top-level element
    pub const CVC_ELT_1: &str = "cvc-elt.1";
    /// Abstract element used directly
    pub const CVC_ELT_2: &str = "cvc-elt.2";
    /// `xsi:nil` on a non-nillable element
    pub const CVC_ELT_3_1: &str = "cvc-elt.3.1";
    /// Nilled element has content
    pub const CVC_ELT_3_2_2: &str = "cvc-elt.3.2.2";
    /// Element content does not match its fixed value
    pub const CVC_ELT_5_2_2: &str = "cvc-elt.5.2.2";
    /// Abstract type used directly
    pub const CVC_TYPE_2: &str = "cvc-type.2";
    /// Value not valid for its datatype
    pub const CVC_DATATYPE_VALID_1: &str = "cvc-datatype-valid.1";
    /// Attribute value not valid for its datatype
    pub const CVC_DATATYPE_VALID_1_2_1: &str = "cvc-datatype-valid.1.2.1";
    /// Facet constraint violated
    pub const CVC_FACET_VALID: &str = "cvc-facet-valid";
    /// Attribute does not match its fixed value
    pub const CVC_ATTRIBUTE_4: &str = "cvc-attribute.4";
    /// Element must be empty
    pub const CVC_COMPLEX_TYPE_2_1: &str = "cvc-complex-type.2.1";
    /// Unexpected text or element children for the content type
    pub const CVC_COMPLEX_TYPE_2_3: &str = "cvc-complex-type.2.3";
    /// Content does not match any alternative
    pub const CVC_COMPLEX_TYPE_2_4_A: &str = "cvc-complex-type.2.4.a";
    /// Required element missing
    pub const CVC_COMPLEX_TYPE_2_4_B: &str = "cvc-complex-type.2.4.b";
    /// Unexpected element
    pub const CVC_COMPLEX_TYPE_2_4_D: &str = "cvc-complex-type.2.4.d";
    /// Attribute not allowed
    pub const CVC_COMPLEX_TYPE_3_2_2: &str = "cvc-complex-type.3.2.2";
    /// Required attribute missing
    pub const CVC_COMPLEX_TYPE_4: &str = "cvc-complex-type.4";
    /// Element not allowed by a wildcard's namespace constraint
    pub const CVC_WILDCARD_2: &str = "cvc-wildcard.2";
    /// Attribute not allowed by an anyAttribute namespace constraint
    pub const CVC_WILDCARD_ATTRIBUTE_2: &str = "cvc-wildcard-attribute.2";
    /// Strictly processed wildcard element has no declaration
    pub const CVC_ASSESS_ELT_1_1_1: &str = "cvc-assess-elt.1.1.1";
    /// IDREF with no matching ID
    pub const CVC_ID_1: &str = "cvc-id.1";
    /// Duplicate ID value
    pub const CVC_ID_2: &str = "cvc-id.2";
    /// Duplicate key or unique value
    pub const CVC_IDENTITY_CONSTRAINT_4_1: &str = "cvc-identity-constraint.4.1";
    /// Key field evaluated to nothing
    pub const CVC_IDENTITY_CONSTRAINT_4_2_2: &str = "cvc-identity-constraint.4.2.2";
    /// Keyref value matches no key
    pub const CVC_IDENTITY_CONSTRAINT_4_3: &str = "cvc-identity-constraint.4.3";
    /// Keyref refers to an unknown constraint
    pub const SRC_IDENTITY_CONSTRAINT_2_2_2: &str = "src-identity-constraint.2.2.2";
    /// Null document passed to the validator
    pub const XSD_NULL_DOCUMENT: &str = "xsd-null-document";
    /// Document has no root element
    pub const XSD_NO_ROOT: &str = "xsd-no-root";
    /// Group reference could not be resolved
    pub const XSD_GROUP_NOT_FOUND: &str = "xsd-group-not-found";
}

/// Lightweight pointer to an instance element, usable after validation ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementPointer {
    /// Namespace URI of the element
    pub namespace: String,
    /// Local name of the element
    pub local: String,
    /// Source position of the start tag
    pub position: Position,
}

impl ElementPointer {
    /// Build a pointer from a document element
    pub fn from_element(element: &XmlElement) -> Self {
        Self {
            namespace: element.namespace.clone(),
            local: element.local.clone(),
            position: element.position,
        }
    }
}

/// A single validation problem
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    /// Element the problem was found on, when known
    pub element: Option<ElementPointer>,
    /// Attribute local name, for attribute-level problems
    pub attribute: Option<String>,
    /// Diagnostic code (`cvc-*`, `src-*` or `xsd-*`)
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Expected values, when a finite set applies (enumerations, suggestions)
    pub expected: Vec<String>,
    /// Offending value, when one exists
    pub actual: Option<String>,
}

impl Violation {
    /// Create a violation with a code and message
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            element: None,
            attribute: None,
            code: code.to_string(),
            message: message.into(),
            expected: Vec::new(),
            actual: None,
        }
    }

    /// Attach the element the violation was found on
    pub fn at(mut self, element: &XmlElement) -> Self {
        self.element = Some(ElementPointer::from_element(element));
        self
    }

    /// Attach an attribute local name
    pub fn on_attribute(mut self, name: impl Into<String>) -> Self {
        self.attribute = Some(name.into());
        self
    }

    /// Attach the set of expected values
    pub fn with_expected(mut self, expected: Vec<String>) -> Self {
        self.expected = expected;
        self
    }

    /// Attach the offending value
    pub fn with_actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = Some(actual.into());
        self
    }
}
