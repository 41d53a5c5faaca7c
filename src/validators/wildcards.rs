//! Wildcard particles: `xs:any` and `xs:anyAttribute`
//!
//! A wildcard carries a namespace constraint and a `processContents` policy.
//! The namespace constraint decides whether an element or attribute is
//! admitted at all; `processContents` decides how hard to validate what was
//! admitted.

use crate::documents::{XmlAttribute, XmlElement};
use crate::namespaces::QName;

use super::builtins::{XMLNS_NAMESPACE, XSI_NAMESPACE};
use super::exceptions::{codes, Violation};
use super::particles::Occurs;
use super::schemas::Schema;
use super::validation::validate_element_against_decl;

/// Validation policy for wildcard-matched content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessContents {
    /// A declaration must exist and the content must validate against it
    #[default]
    Strict,
    /// Validate against a declaration when one is found, else accept
    Lax,
    /// Accept without validation
    Skip,
}

impl ProcessContents {
    /// Parse a `processContents` attribute value; empty and unknown values
    /// fall back to the `strict` default
    pub fn parse(value: &str) -> Self {
        match value {
            "lax" => ProcessContents::Lax,
            "skip" => ProcessContents::Skip,
            _ => ProcessContents::Strict,
        }
    }
}

/// Namespace constraint of a wildcard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceConstraint {
    /// `##any`: every namespace matches
    Any,
    /// `##other`: any namespace except the target namespace
    Other,
    /// `##targetNamespace`: only the target namespace
    TargetNamespace,
    /// `##local`: only the empty namespace
    Local,
    /// Explicit URI list; entries may include `##targetNamespace`/`##local`
    List(Vec<String>),
}

impl NamespaceConstraint {
    /// Parse a `namespace` attribute value; empty means `##any`
    pub fn parse(value: &str) -> Self {
        match value {
            "" | "##any" => NamespaceConstraint::Any,
            "##other" => NamespaceConstraint::Other,
            "##targetNamespace" => NamespaceConstraint::TargetNamespace,
            "##local" => NamespaceConstraint::Local,
            list => NamespaceConstraint::List(
                list.split_whitespace().map(|s| s.to_string()).collect(),
            ),
        }
    }

    /// Check whether a namespace satisfies this constraint
    pub fn matches(&self, namespace: &str, target_namespace: &str) -> bool {
        match self {
            NamespaceConstraint::Any => true,
            NamespaceConstraint::Other => namespace != target_namespace,
            NamespaceConstraint::TargetNamespace => namespace == target_namespace,
            NamespaceConstraint::Local => namespace.is_empty(),
            NamespaceConstraint::List(entries) => entries.iter().any(|entry| {
                match entry.as_str() {
                    "##targetNamespace" => namespace == target_namespace,
                    "##local" => namespace.is_empty(),
                    uri => uri == namespace,
                }
            }),
        }
    }
}

/// `xs:any` wildcard particle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnyElement {
    /// Raw namespace constraint as written in the schema
    pub namespace: String,
    /// Validation policy for matched elements
    pub process_contents: ProcessContents,
    /// Occurrence bounds
    pub occurs: Occurs,
}

impl AnyElement {
    /// The parsed namespace constraint
    pub fn constraint(&self) -> NamespaceConstraint {
        NamespaceConstraint::parse(&self.namespace)
    }
}

/// `xs:anyAttribute` wildcard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnyAttribute {
    /// Raw namespace constraint as written in the schema
    pub namespace: String,
    /// Validation policy for matched attributes
    pub process_contents: ProcessContents,
}

impl AnyAttribute {
    /// The parsed namespace constraint
    pub fn constraint(&self) -> NamespaceConstraint {
        NamespaceConstraint::parse(&self.namespace)
    }
}

/// Check whether an element's namespace satisfies a wildcard constraint
pub fn matches_wildcard(element: &XmlElement, namespace: &str, target_namespace: &str) -> bool {
    NamespaceConstraint::parse(namespace).matches(&element.namespace, target_namespace)
}

/// Validate an element admitted by an `xs:any` wildcard
pub fn validate_any_element(
    element: &XmlElement,
    wildcard: &AnyElement,
    schema: &Schema,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    if !wildcard
        .constraint()
        .matches(&element.namespace, &schema.target_namespace)
    {
        violations.push(
            Violation::new(
                codes::CVC_WILDCARD_2,
                format!(
                    "Element '{}' is not allowed by the namespace constraint '{}'",
                    element.qname(),
                    wildcard.namespace
                ),
            )
            .at(element),
        );
        return violations;
    }

    match wildcard.process_contents {
        ProcessContents::Strict => {
            let qname = QName::new(element.namespace.clone(), element.local.clone());
            match schema.lookup_element(&qname) {
                Some(decl) => {
                    violations.extend(validate_element_against_decl(element, decl, schema));
                }
                None => violations.push(
                    Violation::new(
                        codes::CVC_ASSESS_ELT_1_1_1,
                        format!(
                            "No element declaration found for '{}' (processContents='strict')",
                            element.qname()
                        ),
                    )
                    .at(element),
                ),
            }
        }
        ProcessContents::Lax => {
            let qname = QName::new(element.namespace.clone(), element.local.clone());
            if let Some(decl) = schema.lookup_element(&qname) {
                violations.extend(validate_element_against_decl(element, decl, schema));
            }
        }
        ProcessContents::Skip => {}
    }

    violations
}

/// Validate an attribute admitted by an `xs:anyAttribute` wildcard
pub fn validate_any_attribute(
    attribute: &XmlAttribute,
    wildcard: &AnyAttribute,
    schema: &Schema,
) -> Vec<Violation> {
    // Namespace declarations and xsi:* attributes are outside wildcard scope.
    if attribute.namespace == XMLNS_NAMESPACE
        || attribute.local == "xmlns"
        || attribute.namespace == XSI_NAMESPACE
    {
        return Vec::new();
    }

    if !wildcard
        .constraint()
        .matches(&attribute.namespace, &schema.target_namespace)
    {
        return vec![Violation::new(
            codes::CVC_WILDCARD_ATTRIBUTE_2,
            format!(
                "Attribute '{}' is not allowed by the anyAttribute namespace constraint '{}'",
                attribute.qualified_name, wildcard.namespace
            ),
        )
        .on_attribute(attribute.local.clone())];
    }

    // Global attribute declarations are not tracked, so strict and lax
    // degenerate to accepting a namespace-valid attribute.
    Vec::new()
}
