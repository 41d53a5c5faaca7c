//! Complex types and their content models
//!
//! A complex type carries optional content (simple content, complex content,
//! a model group, or a group reference), declared attributes, referenced
//! attribute groups and an optional attribute wildcard, plus the `mixed` and
//! `abstract` flags.

use crate::documents::XmlElement;
use crate::namespaces::QName;

use super::attributes::AttributeDecl;
use super::builtins;
use super::exceptions::{codes, Violation};
use super::facets::{validate_facets, Facet, FacetContext};
use super::groups::{GroupRef, ModelGroup};
use super::models;
use super::schemas::{Schema, XsdType};
use super::simple_types::validate_simple_value;
use super::wildcards::AnyAttribute;

/// An XSD complex type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexType {
    /// Type name; anonymous types carry a synthesized local name
    pub name: QName,
    /// Content model, if any
    pub content: Option<Content>,
    /// Attributes declared directly on the type
    pub attributes: Vec<AttributeDecl>,
    /// Referenced attribute group QNames
    pub attribute_groups: Vec<QName>,
    /// Attribute wildcard, if any
    pub any_attribute: Option<AnyAttribute>,
    /// `mixed="true"`: text may interleave with element children
    pub mixed: bool,
    /// `abstract="true"`: may not be used directly in instances
    pub abstract_: bool,
    /// Derivation base recorded at parse time; survives extension merging
    /// so derivation walks keep working after the content is rewritten
    pub base: Option<QName>,
}

impl ComplexType {
    /// Create an empty complex type
    pub fn new(name: QName) -> Self {
        Self {
            name,
            content: None,
            attributes: Vec::new(),
            attribute_groups: Vec::new(),
            any_attribute: None,
            mixed: false,
            abstract_: false,
            base: None,
        }
    }

    /// True when the content is `xs:simpleContent`
    pub fn has_simple_content(&self) -> bool {
        matches!(self.content, Some(Content::Simple(_)))
    }
}

/// Content of a complex type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// `xs:simpleContent`
    Simple(SimpleContent),
    /// `xs:complexContent`
    Complex(ComplexContent),
    /// Direct model group (`sequence` | `choice` | `all`)
    Group(ModelGroup),
    /// Reference to a named model group
    GroupRef(GroupRef),
}

/// `xs:simpleContent` body
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SimpleContent {
    /// At most one of extension or restriction
    pub derivation: Option<SimpleContentDerivation>,
}

/// Derivation inside `xs:simpleContent`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleContentDerivation {
    /// Extension of a base type with attributes
    Extension(Extension),
    /// Restriction of a base type with facets and attributes
    Restriction(SimpleContentRestriction),
}

/// `xs:complexContent` body
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComplexContent {
    /// `mixed` override on the complexContent element
    pub mixed: bool,
    /// At most one of extension or restriction
    pub derivation: Option<ComplexContentDerivation>,
}

/// Derivation inside `xs:complexContent`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComplexContentDerivation {
    /// Extension appending to a base type
    Extension(Extension),
    /// Restriction overriding a base type's content
    Restriction(ComplexContentRestriction),
}

/// `xs:extension`: base plus additions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    /// Base type QName
    pub base: QName,
    /// Added content model (a group or group reference)
    pub content: Option<Box<Content>>,
    /// Added attributes
    pub attributes: Vec<AttributeDecl>,
    /// Added attribute wildcard
    pub any_attribute: Option<AnyAttribute>,
}

impl Extension {
    /// Create an extension of the given base
    pub fn new(base: QName) -> Self {
        Self {
            base,
            content: None,
            attributes: Vec::new(),
            any_attribute: None,
        }
    }
}

/// `xs:restriction` under `xs:simpleContent`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleContentRestriction {
    /// Base type QName
    pub base: QName,
    /// Constraining facets
    pub facets: Vec<Facet>,
    /// Attributes declared in the restriction
    pub attributes: Vec<AttributeDecl>,
    /// Attribute wildcard declared in the restriction
    pub any_attribute: Option<AnyAttribute>,
}

/// `xs:restriction` under `xs:complexContent`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexContentRestriction {
    /// Base type QName
    pub base: QName,
    /// Overriding content model
    pub content: Option<Box<Content>>,
    /// Attributes declared in the restriction
    pub attributes: Vec<AttributeDecl>,
    /// Attribute wildcard declared in the restriction
    pub any_attribute: Option<AnyAttribute>,
}

/// Validate an element against a complex type's content model
pub fn validate_complex_type(
    complex_type: &ComplexType,
    element: &XmlElement,
    schema: &Schema,
) -> Vec<Violation> {
    match &complex_type.content {
        Some(content) => validate_content(content, element, schema),
        None => Vec::new(),
    }
}

/// Validate an element against a content model
pub fn validate_content(content: &Content, element: &XmlElement, schema: &Schema) -> Vec<Violation> {
    match content {
        Content::Group(group) => models::validate_model_group(group, element, schema),
        Content::GroupRef(group_ref) => match schema.lookup_group(&group_ref.ref_name) {
            Some(group) => models::validate_model_group(group, element, schema),
            None => vec![Violation::new(
                codes::XSD_GROUP_NOT_FOUND,
                format!(
                    "Group reference '{}' not found in schema",
                    group_ref.ref_name
                ),
            )
            .at(element)],
        },
        Content::Simple(simple) => validate_simple_content(simple, element, schema),
        Content::Complex(complex) => match &complex.derivation {
            Some(ComplexContentDerivation::Extension(ext)) => match &ext.content {
                Some(inner) => validate_content(inner, element, schema),
                None => Vec::new(),
            },
            Some(ComplexContentDerivation::Restriction(restriction)) => {
                match &restriction.content {
                    Some(inner) => validate_content(inner, element, schema),
                    None => Vec::new(),
                }
            }
            None => Vec::new(),
        },
    }
}

/// Validate an element's text against `xs:simpleContent`
fn validate_simple_content(
    simple: &SimpleContent,
    element: &XmlElement,
    schema: &Schema,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    let content = element.text_content();
    let content = content.trim();

    match &simple.derivation {
        Some(SimpleContentDerivation::Extension(ext)) => {
            if let Some(violation) = validate_text_against_base(content, &ext.base, element, schema)
            {
                violations.push(violation);
            }
        }
        Some(SimpleContentDerivation::Restriction(restriction)) => {
            if let Some(violation) =
                validate_text_against_base(content, &restriction.base, element, schema)
            {
                violations.push(violation);
            }

            if !restriction.facets.is_empty() {
                let ctx = FacetContext::for_base(Some(restriction.base.local.as_str()));
                if let Err(err) = validate_facets(content, &restriction.facets, &ctx) {
                    let allowed = err.allowed.clone();
                    violations.push(
                        Violation::new(codes::CVC_FACET_VALID, err.to_string())
                            .at(element)
                            .with_expected(allowed)
                            .with_actual(content),
                    );
                }
            }
        }
        None => {}
    }

    violations
}

fn validate_text_against_base(
    content: &str,
    base: &QName,
    element: &XmlElement,
    schema: &Schema,
) -> Option<Violation> {
    if base.is_empty() {
        return None;
    }

    if base.namespace == builtins::XSD_NAMESPACE {
        if let Some(builtin) = builtins::get_builtin_type(&base.local) {
            return builtin.validate(content).err().map(|e| {
                Violation::new(codes::CVC_DATATYPE_VALID_1, e.to_string())
                    .at(element)
                    .with_actual(content)
            });
        }
    }

    if let Some(XsdType::Simple(base_st)) = schema.lookup_type(base) {
        if let Err(err) = validate_simple_value(content, base_st, schema) {
            return Some(
                Violation::new(codes::CVC_DATATYPE_VALID_1, err.to_string())
                    .at(element)
                    .with_actual(content),
            );
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::XmlDocument;

    #[test]
    fn test_simple_content_extension_of_builtin() {
        let schema = Schema::default();
        let mut sc = SimpleContent::default();
        sc.derivation = Some(SimpleContentDerivation::Extension(Extension::new(
            QName::new(builtins::XSD_NAMESPACE, "integer"),
        )));

        let ok = XmlDocument::parse("<price>42</price>").unwrap();
        assert!(validate_simple_content(&sc, ok.root().unwrap(), &schema).is_empty());

        let bad = XmlDocument::parse("<price>dear</price>").unwrap();
        let violations = validate_simple_content(&sc, bad.root().unwrap(), &schema);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, codes::CVC_DATATYPE_VALID_1);
    }

    #[test]
    fn test_simple_content_restriction_facets() {
        let schema = Schema::default();
        let mut sc = SimpleContent::default();
        sc.derivation = Some(SimpleContentDerivation::Restriction(
            SimpleContentRestriction {
                base: QName::new(builtins::XSD_NAMESPACE, "string"),
                facets: vec![Facet::MaxLength(3)],
                attributes: Vec::new(),
                any_attribute: None,
            },
        ));

        let bad = XmlDocument::parse("<code>toolong</code>").unwrap();
        let violations = validate_simple_content(&sc, bad.root().unwrap(), &schema);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, codes::CVC_FACET_VALID);
    }

    #[test]
    fn test_missing_group_ref_reports_synthetic_code() {
        let schema = Schema::default();
        let content = Content::GroupRef(GroupRef {
            ref_name: QName::local("nowhere"),
            occurs: crate::validators::particles::Occurs::once(),
        });

        let doc = XmlDocument::parse("<r><a/></r>").unwrap();
        let violations = validate_content(&content, doc.root().unwrap(), &schema);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, codes::XSD_GROUP_NOT_FOUND);
    }
}
