//! Simple types: restriction, list and union
//!
//! A [`SimpleType`] carries exactly one variant, or none at all: a bare
//! named reference with no variant is a *placeholder* emitted during parse.
//! The resolver rewrites placeholders that name schema types; placeholders
//! whose QName matches a built-in delegate to the datatype registry here.

use crate::namespaces::QName;
use std::fmt;

use super::builtins;
use super::facets::{validate_facets, Facet, FacetContext, FacetError, LengthUnit};
use super::schemas::{Schema, XsdType};

/// An XSD simple type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleType {
    /// Type name; anonymous types carry a synthesized local name
    pub name: QName,
    /// The defining variant; `None` marks a placeholder reference
    pub variant: Option<SimpleVariant>,
}

impl SimpleType {
    /// A placeholder simple type standing in for an unresolved reference
    pub fn placeholder(name: QName) -> Self {
        Self {
            name,
            variant: None,
        }
    }

    /// True if this type is a parse-time placeholder
    pub fn is_placeholder(&self) -> bool {
        self.variant.is_none()
    }
}

/// The defining variant of a simple type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleVariant {
    /// Restriction of a base type by facets
    Restriction(SimpleRestriction),
    /// Space-separated list of an item type
    List(ListType),
    /// Ordered union of member types
    Union(UnionType),
}

/// `xs:restriction` inside a simple type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleRestriction {
    /// Base type QName
    pub base: QName,
    /// Ordered constraining facets
    pub facets: Vec<Facet>,
}

/// `xs:list` simple type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListType {
    /// Item type QName
    pub item_type: QName,
}

/// `xs:union` simple type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionType {
    /// Ordered member type QNames
    pub member_types: Vec<QName>,
}

/// Failure while validating a value against a simple type
#[derive(Debug, Clone)]
pub enum SimpleTypeError {
    /// The value is not in the lexical space of the type
    Datatype(String),
    /// A constraining facet rejected the value
    Facet(FacetError),
}

impl fmt::Display for SimpleTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimpleTypeError::Datatype(msg) => write!(f, "{}", msg),
            SimpleTypeError::Facet(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for SimpleTypeError {}

impl From<FacetError> for SimpleTypeError {
    fn from(err: FacetError) -> Self {
        SimpleTypeError::Facet(err)
    }
}

/// Validate a lexical value against a simple type definition
pub fn validate_simple_value(
    value: &str,
    simple_type: &SimpleType,
    schema: &Schema,
) -> Result<(), SimpleTypeError> {
    match &simple_type.variant {
        Some(SimpleVariant::Union(union)) => validate_union_value(value, union, schema),
        Some(SimpleVariant::List(list)) => validate_list_value(value, list, schema),
        Some(SimpleVariant::Restriction(restriction)) => {
            validate_restriction_value(value, restriction, schema)
        }
        None => {
            // Placeholder: delegate to the built-in registry when the name
            // matches; otherwise there is nothing to check.
            if let Some(builtin) = builtins::get_builtin_type(&simple_type.name.local) {
                builtin
                    .validate(value)
                    .map_err(|e| SimpleTypeError::Datatype(e.to_string()))
            } else {
                Ok(())
            }
        }
    }
}

fn validate_restriction_value(
    value: &str,
    restriction: &SimpleRestriction,
    schema: &Schema,
) -> Result<(), SimpleTypeError> {
    let base = &restriction.base;
    let mut base_is_list = false;

    if !base.is_empty() {
        if let Some(builtin) = builtins::get_builtin_type(&base.local) {
            builtin
                .validate(value)
                .map_err(|e| SimpleTypeError::Datatype(e.to_string()))?;
        } else if let Some(base_type) = schema.lookup_type(base) {
            validate_value_against_type(value, base_type, schema)?;
            if let XsdType::Simple(base_st) = base_type {
                base_is_list = matches!(base_st.variant, Some(SimpleVariant::List(_)));
            }
        }
    }

    let mut ctx = FacetContext::for_base(Some(base.local.as_str()));
    if base_is_list {
        // Restricting a list: length facets count items, not characters.
        ctx.length_unit = LengthUnit::ListItems;
    }

    validate_facets(value, &restriction.facets, &ctx)?;
    Ok(())
}

/// Validate a value against a list type: split on XSD whitespace and check
/// every token against the item type
pub fn validate_list_value(
    value: &str,
    list: &ListType,
    schema: &Schema,
) -> Result<(), SimpleTypeError> {
    if list.item_type.is_empty() {
        return Err(SimpleTypeError::Datatype(
            "list type has no item type".to_string(),
        ));
    }

    let items: Vec<&str> = value.split_whitespace().collect();
    if items.is_empty() && !value.is_empty() {
        return Err(SimpleTypeError::Datatype(
            "list value contains only whitespace".to_string(),
        ));
    }

    if let Some(item_type) = schema.lookup_type(&list.item_type) {
        for (i, item) in items.iter().enumerate() {
            validate_value_against_type(item, item_type, schema).map_err(|e| {
                SimpleTypeError::Datatype(format!(
                    "list item {} ('{}') is invalid: {}",
                    i + 1,
                    item,
                    e
                ))
            })?;
        }
        return Ok(());
    }

    if let Some(builtin) = builtins::get_builtin_type(&list.item_type.local) {
        for (i, item) in items.iter().enumerate() {
            builtin.validate(item).map_err(|e| {
                SimpleTypeError::Datatype(format!(
                    "list item {} ('{}') is invalid: {}",
                    i + 1,
                    item,
                    e
                ))
            })?;
        }
        return Ok(());
    }

    Err(SimpleTypeError::Datatype(format!(
        "unknown item type: {}",
        list.item_type
    )))
}

/// Validate a value against a union type: the first member that accepts the
/// value wins
pub fn validate_union_value(
    value: &str,
    union: &UnionType,
    schema: &Schema,
) -> Result<(), SimpleTypeError> {
    if union.member_types.is_empty() {
        return Err(SimpleTypeError::Datatype(
            "union type has no member types".to_string(),
        ));
    }

    let mut last_error = None;

    for member in &union.member_types {
        if let Some(member_type) = schema.lookup_type(member) {
            match validate_value_against_type(value, member_type, schema) {
                Ok(()) => return Ok(()),
                Err(e) => last_error = Some(e),
            }
        } else if let Some(builtin) = builtins::get_builtin_type(&member.local) {
            match builtin.validate(value) {
                Ok(()) => return Ok(()),
                Err(e) => last_error = Some(SimpleTypeError::Datatype(e.to_string())),
            }
        }
    }

    Err(match last_error {
        Some(e) => SimpleTypeError::Datatype(format!(
            "value '{}' is not valid against any member type of the union: {}",
            value, e
        )),
        None => SimpleTypeError::Datatype(format!(
            "value '{}' is not valid against any member type of the union",
            value
        )),
    })
}

fn validate_value_against_type(
    value: &str,
    ty: &XsdType,
    schema: &Schema,
) -> Result<(), SimpleTypeError> {
    match ty {
        XsdType::Simple(st) => validate_simple_value(value, st, schema),
        XsdType::Complex(_) => Err(SimpleTypeError::Datatype(
            "complex type cannot be used in union or list".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::facets::WhiteSpace;

    fn empty_schema() -> Schema {
        Schema::default()
    }

    fn restriction(base: &str, facets: Vec<Facet>) -> SimpleType {
        SimpleType {
            name: QName::local("t"),
            variant: Some(SimpleVariant::Restriction(SimpleRestriction {
                base: QName::new(builtins::XSD_NAMESPACE, base),
                facets,
            })),
        }
    }

    #[test]
    fn test_restriction_base_and_facets() {
        let schema = empty_schema();
        let st = restriction(
            "integer",
            vec![
                Facet::MinInclusive("1".to_string()),
                Facet::MaxInclusive("10".to_string()),
            ],
        );

        assert!(validate_simple_value("5", &st, &schema).is_ok());
        assert!(matches!(
            validate_simple_value("11", &st, &schema),
            Err(SimpleTypeError::Facet(_))
        ));
        assert!(matches!(
            validate_simple_value("abc", &st, &schema),
            Err(SimpleTypeError::Datatype(_))
        ));
    }

    #[test]
    fn test_list_of_builtin_items() {
        let schema = empty_schema();
        let st = SimpleType {
            name: QName::local("ints"),
            variant: Some(SimpleVariant::List(ListType {
                item_type: QName::new(builtins::XSD_NAMESPACE, "integer"),
            })),
        };

        assert!(validate_simple_value("1 2 3", &st, &schema).is_ok());
        let err = validate_simple_value("1 2 3 abc 4", &st, &schema).unwrap_err();
        assert!(err.to_string().contains("list item 4"));
    }

    #[test]
    fn test_union_first_match_wins() {
        let schema = empty_schema();
        let st = SimpleType {
            name: QName::local("intOrString"),
            variant: Some(SimpleVariant::Union(UnionType {
                member_types: vec![
                    QName::new(builtins::XSD_NAMESPACE, "integer"),
                    QName::new(builtins::XSD_NAMESPACE, "string"),
                ],
            })),
        };

        assert!(validate_simple_value("42", &st, &schema).is_ok());
        assert!(validate_simple_value("hello", &st, &schema).is_ok());
    }

    #[test]
    fn test_union_aggregated_failure() {
        let schema = empty_schema();
        let st = SimpleType {
            name: QName::local("boolOrInt"),
            variant: Some(SimpleVariant::Union(UnionType {
                member_types: vec![
                    QName::new(builtins::XSD_NAMESPACE, "boolean"),
                    QName::new(builtins::XSD_NAMESPACE, "integer"),
                ],
            })),
        };

        let err = validate_simple_value("maybe", &st, &schema).unwrap_err();
        assert!(err
            .to_string()
            .contains("not valid against any member type"));
    }

    #[test]
    fn test_placeholder_delegates_to_builtin() {
        let schema = empty_schema();
        let st = SimpleType::placeholder(QName::new(builtins::XSD_NAMESPACE, "boolean"));

        assert!(validate_simple_value("true", &st, &schema).is_ok());
        assert!(validate_simple_value("maybe", &st, &schema).is_err());
    }

    #[test]
    fn test_deterministic_results() {
        let schema = empty_schema();
        let st = restriction("string", vec![Facet::MaxLength(3)]);

        let first = validate_simple_value("abcd", &st, &schema).unwrap_err();
        let second = validate_simple_value("abcd", &st, &schema).unwrap_err();
        assert_eq!(first.to_string(), second.to_string());
    }

    #[test]
    fn test_whitespace_facet_applies_before_length() {
        let schema = empty_schema();
        let st = restriction(
            "string",
            vec![
                Facet::WhiteSpace(WhiteSpace::Collapse),
                Facet::Length(2),
            ],
        );

        assert!(validate_simple_value("  ab  ", &st, &schema).is_ok());
    }
}
