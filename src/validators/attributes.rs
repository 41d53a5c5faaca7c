//! Attribute declarations and the attribute validator
//!
//! Builds the expected-attribute map for a complex type (own attributes plus
//! resolved attribute-group references), then checks every attribute present
//! on the element and every expected attribute that is absent.

use crate::documents::{XmlAttribute, XmlElement};
use crate::namespaces::QName;

use super::builtins::{XMLNS_NAMESPACE, XSI_NAMESPACE};
use super::complex_types::ComplexType;
use super::elements::TypeRef;
use super::exceptions::{codes, Violation};
use super::schemas::{Schema, XsdType};
use super::simple_types::{validate_simple_value, SimpleType, SimpleTypeError};
use super::wildcards;

/// Attribute use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttributeUse {
    /// May appear (the default)
    #[default]
    Optional,
    /// Must appear
    Required,
    /// Must not appear
    Prohibited,
}

impl AttributeUse {
    /// Parse a `use` attribute value; unknown values fall back to optional
    pub fn parse(value: &str) -> Self {
        match value {
            "required" => AttributeUse::Required,
            "prohibited" => AttributeUse::Prohibited,
            _ => AttributeUse::Optional,
        }
    }
}

/// An attribute declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDecl {
    /// Attribute QName
    pub name: QName,
    /// Declared type; must be simple
    pub type_ref: Option<TypeRef>,
    /// Attribute use
    pub use_: AttributeUse,
    /// Default value, mutually exclusive with fixed
    pub default: Option<String>,
    /// Fixed value, mutually exclusive with default
    pub fixed: Option<String>,
}

impl AttributeDecl {
    /// Create an optional attribute declaration with no type
    pub fn new(name: QName) -> Self {
        Self {
            name,
            type_ref: None,
            use_: AttributeUse::Optional,
            default: None,
            fixed: None,
        }
    }
}

/// A named attribute group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeGroup {
    /// Group QName
    pub name: QName,
    /// Ordered attribute declarations
    pub attributes: Vec<AttributeDecl>,
}

/// Validate the attributes of an element against its (complex) type
pub fn validate_attributes(
    element: &XmlElement,
    complex_type: Option<&ComplexType>,
    schema: &Schema,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    let mut expected_attrs: Vec<AttributeDecl> = Vec::new();
    let mut any_attribute = None;
    if let Some(ct) = complex_type {
        expected_attrs.extend(ct.attributes.iter().cloned());
        expected_attrs.extend(schema.resolve_attribute_groups(ct));
        any_attribute = ct.any_attribute.clone();
    }

    let mut pending: Vec<&AttributeDecl> = expected_attrs.iter().collect();

    for attribute in &element.attributes {
        // Namespace declarations and xsi:* attributes are not subject to
        // attribute declarations.
        if attribute.namespace == XMLNS_NAMESPACE
            || attribute.local == "xmlns"
            || attribute.namespace == XSI_NAMESPACE
        {
            continue;
        }

        let position = pending.iter().position(|d| d.name.local == attribute.local);
        match position {
            Some(idx) => {
                let decl = pending.remove(idx);

                if decl.use_ == AttributeUse::Prohibited {
                    violations.push(
                        Violation::new(
                            codes::CVC_COMPLEX_TYPE_3_2_2,
                            format!(
                                "Attribute '{}' is prohibited in element '{}'",
                                attribute.local, element.local
                            ),
                        )
                        .at(element)
                        .on_attribute(attribute.local.clone()),
                    );
                    continue;
                }

                if let Some(violation) = check_fixed_value(Some(attribute), decl, element) {
                    violations.push(violation);
                }

                if let Some(type_ref) = &decl.type_ref {
                    violations.extend(validate_attribute_value(
                        element, attribute, type_ref, schema,
                    ));
                }
            }
            None => {
                if let Some(wildcard) = &any_attribute {
                    for mut violation in
                        wildcards::validate_any_attribute(attribute, wildcard, schema)
                    {
                        if violation.element.is_none() {
                            violation = violation.at(element);
                        }
                        violation.attribute = Some(attribute.local.clone());
                        violations.push(violation);
                    }
                } else {
                    let suggestions = suggest_attribute(&attribute.local, &expected_attrs);
                    violations.push(
                        Violation::new(
                            codes::CVC_COMPLEX_TYPE_3_2_2,
                            format!(
                                "Attribute '{}' is not allowed to appear in element '{}'",
                                attribute.local, element.local
                            ),
                        )
                        .at(element)
                        .on_attribute(attribute.local.clone())
                        .with_expected(suggestions)
                        .with_actual(attribute.local.clone()),
                    );
                }
            }
        }
    }

    // Expected attributes not present on the element. An absent attribute
    // with a fixed value counts as carrying that value, so only a required
    // use is a problem.
    for decl in pending {
        if decl.use_ == AttributeUse::Required {
            violations.push(
                Violation::new(
                    codes::CVC_COMPLEX_TYPE_4,
                    format!("Required attribute '{}' is missing", decl.name.local),
                )
                .at(element)
                .on_attribute(decl.name.local.clone())
                .with_expected(vec![decl.name.local.clone()]),
            );
        }
    }

    violations
}

/// Check an attribute against a declared fixed value
fn check_fixed_value(
    attribute: Option<&XmlAttribute>,
    decl: &AttributeDecl,
    element: &XmlElement,
) -> Option<Violation> {
    let fixed = decl.fixed.as_deref()?;

    let value = match attribute {
        Some(attr) => attr.value.clone(),
        // Absent attributes take the fixed value by definition.
        None => return None,
    };

    if value != fixed {
        Some(
            Violation::new(
                codes::CVC_ATTRIBUTE_4,
                format!(
                    "Attribute '{}' must have fixed value '{}' but has '{}'",
                    decl.name.local, fixed, value
                ),
            )
            .at(element)
            .on_attribute(decl.name.local.clone())
            .with_expected(vec![fixed.to_string()])
            .with_actual(value),
        )
    } else {
        None
    }
}

/// Validate an attribute value against its declared simple type
fn validate_attribute_value(
    element: &XmlElement,
    attribute: &XmlAttribute,
    type_ref: &TypeRef,
    schema: &Schema,
) -> Vec<Violation> {
    let simple_type: Option<SimpleType> = match type_ref {
        TypeRef::Simple(st) => Some((**st).clone()),
        TypeRef::Named(q) | TypeRef::Unresolved(q) => match schema.lookup_type(q) {
            Some(XsdType::Simple(st)) => Some(st.clone()),
            // Complex types are not usable for attributes; tolerated here.
            Some(XsdType::Complex(_)) => None,
            None => Some(SimpleType::placeholder(q.clone())),
        },
        TypeRef::Complex(_) => None,
    };

    let Some(simple_type) = simple_type else {
        return Vec::new();
    };

    match validate_simple_value(&attribute.value, &simple_type, schema) {
        Ok(()) => Vec::new(),
        Err(err) => {
            let expected = match &err {
                SimpleTypeError::Facet(facet_err) => facet_err.allowed.clone(),
                SimpleTypeError::Datatype(_) => Vec::new(),
            };
            vec![Violation::new(
                codes::CVC_DATATYPE_VALID_1_2_1,
                format!("Attribute '{}': {}", attribute.local, err),
            )
            .at(element)
            .on_attribute(attribute.local.clone())
            .with_expected(expected)
            .with_actual(attribute.value.clone())]
        }
    }
}

/// Suggest declared attribute names close to a misspelled one
/// (case-insensitive Levenshtein distance of at most 2)
fn suggest_attribute(wrong: &str, attrs: &[AttributeDecl]) -> Vec<String> {
    let wrong_lower = wrong.to_lowercase();
    let mut suggestions = Vec::new();

    for attr in attrs {
        let name_lower = attr.name.local.to_lowercase();
        if wrong_lower == name_lower || levenshtein_distance(&wrong_lower, &name_lower) <= 2 {
            suggestions.push(attr.name.local.clone());
        }
    }

    suggestions
}

/// Edit distance between two strings
fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for i in 1..=a.len() {
        current[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            current[j] = (prev[j] + 1)
                .min(current[j - 1] + 1)
                .min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut current);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::XmlDocument;
    use crate::validators::builtins::XSD_NAMESPACE;

    fn type_with_attrs(attrs: Vec<AttributeDecl>) -> ComplexType {
        let mut ct = ComplexType::new(QName::local("T"));
        ct.attributes = attrs;
        ct
    }

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("same", "same"), 0);
        assert_eq!(levenshtein_distance("vale", "value"), 1);
    }

    #[test]
    fn test_unknown_attribute_with_suggestion() {
        let schema = Schema::default();
        let ct = type_with_attrs(vec![AttributeDecl::new(QName::local("value"))]);
        let doc = XmlDocument::parse(r#"<e vale="1"/>"#).unwrap();

        let violations = validate_attributes(doc.root().unwrap(), Some(&ct), &schema);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, codes::CVC_COMPLEX_TYPE_3_2_2);
        assert_eq!(violations[0].expected, vec!["value"]);
    }

    #[test]
    fn test_required_attribute_missing() {
        let schema = Schema::default();
        let mut decl = AttributeDecl::new(QName::local("id"));
        decl.use_ = AttributeUse::Required;
        let ct = type_with_attrs(vec![decl]);
        let doc = XmlDocument::parse("<e/>").unwrap();

        let violations = validate_attributes(doc.root().unwrap(), Some(&ct), &schema);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, codes::CVC_COMPLEX_TYPE_4);
    }

    #[test]
    fn test_fixed_value_mismatch() {
        let schema = Schema::default();
        let mut decl = AttributeDecl::new(QName::local("version"));
        decl.fixed = Some("1.0".to_string());
        let ct = type_with_attrs(vec![decl]);

        let ok = XmlDocument::parse(r#"<e version="1.0"/>"#).unwrap();
        assert!(validate_attributes(ok.root().unwrap(), Some(&ct), &schema).is_empty());

        let bad = XmlDocument::parse(r#"<e version="2.0"/>"#).unwrap();
        let violations = validate_attributes(bad.root().unwrap(), Some(&ct), &schema);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, codes::CVC_ATTRIBUTE_4);
    }

    #[test]
    fn test_absent_fixed_attribute_is_fine() {
        let schema = Schema::default();
        let mut decl = AttributeDecl::new(QName::local("version"));
        decl.fixed = Some("1.0".to_string());
        let ct = type_with_attrs(vec![decl]);

        let doc = XmlDocument::parse("<e/>").unwrap();
        assert!(validate_attributes(doc.root().unwrap(), Some(&ct), &schema).is_empty());
    }

    #[test]
    fn test_attribute_value_validated_against_type() {
        let schema = Schema::default();
        let mut decl = AttributeDecl::new(QName::local("count"));
        decl.type_ref = Some(TypeRef::Unresolved(QName::new(XSD_NAMESPACE, "integer")));
        let ct = type_with_attrs(vec![decl]);

        let ok = XmlDocument::parse(r#"<e count="3"/>"#).unwrap();
        assert!(validate_attributes(ok.root().unwrap(), Some(&ct), &schema).is_empty());

        let bad = XmlDocument::parse(r#"<e count="three"/>"#).unwrap();
        let violations = validate_attributes(bad.root().unwrap(), Some(&ct), &schema);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, codes::CVC_DATATYPE_VALID_1_2_1);
    }

    #[test]
    fn test_prohibited_attribute_present() {
        let schema = Schema::default();
        let mut decl = AttributeDecl::new(QName::local("internal"));
        decl.use_ = AttributeUse::Prohibited;
        let ct = type_with_attrs(vec![decl]);

        let doc = XmlDocument::parse(r#"<e internal="x"/>"#).unwrap();
        let violations = validate_attributes(doc.root().unwrap(), Some(&ct), &schema);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, codes::CVC_COMPLEX_TYPE_3_2_2);
    }

    #[test]
    fn test_xsi_attributes_skipped() {
        let schema = Schema::default();
        let ct = type_with_attrs(vec![]);
        let doc = XmlDocument::parse(
            r#"<e xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:nil="true"/>"#,
        )
        .unwrap();

        assert!(validate_attributes(doc.root().unwrap(), Some(&ct), &schema).is_empty());
    }
}
