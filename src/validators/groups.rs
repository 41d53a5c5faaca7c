//! Model groups and content-model particles
//!
//! A [`ModelGroup`] is an ordered list of particles under a compositor kind
//! (`sequence`, `choice`, `all`). Particles are a closed sum: inline element
//! declarations, references to global elements, named-group references,
//! wildcards and nested groups.

use crate::namespaces::QName;

use super::elements::{ElementDecl, ElementRef};
use super::particles::Occurs;
use super::wildcards::AnyElement;

/// Compositor kind of a model group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelGroupKind {
    /// Ordered sequence
    Sequence,
    /// One alternative
    Choice,
    /// Each particle at most once, any order
    All,
}

/// A model group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelGroup {
    /// Compositor kind
    pub kind: ModelGroupKind,
    /// Ordered particles
    pub particles: Vec<Particle>,
    /// Occurrence bounds of the group itself
    pub occurs: Occurs,
}

impl ModelGroup {
    /// Create an empty group of the given kind with (1, 1) bounds
    pub fn new(kind: ModelGroupKind) -> Self {
        Self {
            kind,
            particles: Vec::new(),
            occurs: Occurs::once(),
        }
    }
}

/// Reference to a named model group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRef {
    /// Referenced group QName
    pub ref_name: QName,
    /// Occurrence bounds; [`Occurs::empty`] means "unspecified, keep the
    /// referenced group's own bounds"
    pub occurs: Occurs,
}

/// A unit of a content model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Particle {
    /// Inline element declaration
    Element(ElementDecl),
    /// Reference to a global element
    ElementRef(ElementRef),
    /// Nested model group
    Group(ModelGroup),
    /// Reference to a named model group
    GroupRef(GroupRef),
    /// `xs:any` wildcard
    Any(AnyElement),
}

impl Particle {
    /// Occurrence bounds of this particle
    pub fn occurs(&self) -> Occurs {
        match self {
            Particle::Element(decl) => decl.occurs,
            Particle::ElementRef(er) => er.occurs,
            Particle::Group(mg) => mg.occurs,
            Particle::GroupRef(gr) => gr.occurs,
            Particle::Any(any) => any.occurs,
        }
    }

    /// Minimum occurrences
    pub fn min_occurs(&self) -> u32 {
        self.occurs().min
    }

    /// Maximum occurrences (None = unbounded)
    pub fn max_occurs(&self) -> Option<u32> {
        self.occurs().max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::wildcards::ProcessContents;

    #[test]
    fn test_particle_occurs_dispatch() {
        let decl = ElementDecl {
            occurs: Occurs::new(0, None),
            ..ElementDecl::new(QName::local("a"))
        };
        assert_eq!(Particle::Element(decl).occurs(), Occurs::zero_or_more());

        let any = AnyElement {
            namespace: "##any".to_string(),
            process_contents: ProcessContents::Lax,
            occurs: Occurs::optional(),
        };
        assert_eq!(Particle::Any(any).min_occurs(), 0);
    }

    #[test]
    fn test_group_defaults() {
        let group = ModelGroup::new(ModelGroupKind::Sequence);
        assert_eq!(group.occurs, Occurs::once());
        assert!(group.particles.is_empty());
    }
}
