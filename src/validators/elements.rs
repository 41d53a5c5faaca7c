//! Element declarations and references
//!
//! An [`ElementDecl`] plays two roles: global declaration (reached through a
//! schema's element map, contributes to substitution groups) and inline
//! particle inside a model group. The data type is identical; only the
//! context distinguishes them.

use crate::namespaces::QName;

use super::complex_types::ComplexType;
use super::identities::IdentityConstraint;
use super::particles::Occurs;
use super::simple_types::SimpleType;

/// Reference to a type from an element or attribute declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// Named reference not yet resolved against the schema's type map.
    /// Built-in XSD names stay in this state and are looked up in the
    /// datatype registry at use sites.
    Unresolved(QName),
    /// Resolved reference: the QName is a key of a reachable type map
    Named(QName),
    /// Inline anonymous simple type
    Simple(Box<SimpleType>),
    /// Inline anonymous complex type
    Complex(Box<ComplexType>),
}

impl TypeRef {
    /// The referenced or carried type name
    pub fn name(&self) -> &QName {
        match self {
            TypeRef::Unresolved(q) | TypeRef::Named(q) => q,
            TypeRef::Simple(st) => &st.name,
            TypeRef::Complex(ct) => &ct.name,
        }
    }
}

/// An element declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDecl {
    /// Element QName
    pub name: QName,
    /// Declared type, if any
    pub type_ref: Option<TypeRef>,
    /// Occurrence bounds (meaningful for inline particles)
    pub occurs: Occurs,
    /// `nillable="true"`: the instance may carry `xsi:nil`
    pub nillable: bool,
    /// `abstract="true"`: may not appear directly in instances
    pub abstract_: bool,
    /// Head element this element substitutes for
    pub substitution_group: Option<QName>,
    /// Default value, applied when the element is empty
    pub default: Option<String>,
    /// Fixed value, which element content must equal
    pub fixed: Option<String>,
    /// Identity constraints declared on this element
    pub constraints: Vec<IdentityConstraint>,
}

impl ElementDecl {
    /// Create a declaration with default occurrence bounds and no type
    pub fn new(name: QName) -> Self {
        Self {
            name,
            type_ref: None,
            occurs: Occurs::once(),
            nillable: false,
            abstract_: false,
            substitution_group: None,
            default: None,
            fixed: None,
            constraints: Vec::new(),
        }
    }
}

/// Reference to a global element declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRef {
    /// Referenced element QName
    pub ref_name: QName,
    /// Occurrence bounds of the reference
    pub occurs: Occurs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ref_name() {
        let named = TypeRef::Named(QName::local("T"));
        assert_eq!(named.name().local, "T");

        let inline = TypeRef::Simple(Box::new(SimpleType::placeholder(QName::local("_anon"))));
        assert_eq!(inline.name().local, "_anon");
    }

    #[test]
    fn test_element_decl_defaults() {
        let decl = ElementDecl::new(QName::local("item"));
        assert_eq!(decl.occurs, Occurs::once());
        assert!(!decl.nillable);
        assert!(!decl.abstract_);
        assert!(decl.constraints.is_empty());
    }
}
