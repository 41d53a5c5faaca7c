//! Schema components and validation logic
//!
//! The compiler ([`schemas`]) turns parsed XSD documents into a component
//! graph; the orchestrator ([`validation`]) walks instance documents against
//! it, dispatching to the content-model matcher, the attribute validator and
//! the identity-constraint validator.

pub mod attributes;
pub mod builtins;
pub mod complex_types;
pub mod elements;
pub mod exceptions;
pub mod facets;
pub mod groups;
pub mod identities;
pub mod models;
pub mod particles;
pub mod schemas;
pub mod simple_types;
pub mod validation;
pub mod wildcards;

// Re-exports
pub use attributes::{validate_attributes, AttributeDecl, AttributeGroup, AttributeUse};
pub use builtins::{
    get_builtin_type, is_builtin_type, validate_builtin, BuiltinType, XMLNS_NAMESPACE,
    XSD_NAMESPACE, XSI_NAMESPACE,
};
pub use complex_types::{
    ComplexContent, ComplexContentDerivation, ComplexContentRestriction, ComplexType, Content,
    Extension, SimpleContent, SimpleContentDerivation, SimpleContentRestriction,
};
pub use elements::{ElementDecl, ElementRef, TypeRef};
pub use exceptions::{codes, ElementPointer, Violation};
pub use facets::{validate_facets, Facet, FacetContext, FacetError, LengthUnit, WhiteSpace};
pub use groups::{GroupRef, ModelGroup, ModelGroupKind, Particle};
pub use identities::{IdentityConstraint, IdentityConstraintKind, IdentityConstraintValidator};
pub use models::validate_model_group;
pub use particles::{parse_occurs, Occurs};
pub use schemas::{Import, Schema, XsdType};
pub use simple_types::{
    validate_simple_value, ListType, SimpleRestriction, SimpleType, SimpleTypeError,
    SimpleVariant, UnionType,
};
pub use validation::{validate_element_against_decl, Validator};
pub use wildcards::{AnyAttribute, AnyElement, NamespaceConstraint, ProcessContents};
