//! Schema compilation: parse pass, reference resolution and the compiled
//! [`Schema`] component graph
//!
//! Compilation is two passes. Pass 1 walks the `xs:schema` root and parses
//! every top-level component into typed values, resolving QNames against the
//! root's `xmlns:*` declarations and emitting placeholder type references
//! for names it cannot resolve yet. Pass 2 rewrites placeholders, splices
//! named-group references into content models (cycle-safe), merges extension
//! bases, and builds the substitution-group registry. The resulting schema
//! is immutable: concurrent validators may share one.

use crate::documents::{XmlDocument, XmlElement};
use crate::error::{ParseError, Result};
use crate::names;
use crate::namespaces::{NamespaceContext, QName};
use std::collections::{HashMap, HashSet};

use super::attributes::{AttributeDecl, AttributeGroup, AttributeUse};
use super::builtins::XSD_NAMESPACE;
use super::complex_types::{
    ComplexContent, ComplexContentDerivation, ComplexContentRestriction, ComplexType, Content,
    Extension, SimpleContent, SimpleContentDerivation, SimpleContentRestriction,
};
use super::elements::{ElementDecl, ElementRef, TypeRef};
use super::facets::Facet;
use super::groups::{GroupRef, ModelGroup, ModelGroupKind, Particle};
use super::identities::{IdentityConstraint, IdentityConstraintKind};
use super::particles::{parse_occurs, Occurs};
use super::simple_types::{ListType, SimpleRestriction, SimpleType, SimpleVariant, UnionType};
use super::wildcards::{AnyAttribute, AnyElement, ProcessContents};

/// An XSD type definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XsdType {
    /// Simple type
    Simple(SimpleType),
    /// Complex type
    Complex(ComplexType),
}

impl XsdType {
    /// The type's QName
    pub fn name(&self) -> &QName {
        match self {
            XsdType::Simple(st) => &st.name,
            XsdType::Complex(ct) => &ct.name,
        }
    }
}

/// A recorded `xs:import`; the loader fetches it, the compiler only records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Imported namespace
    pub namespace: String,
    /// Hint location of the imported schema document
    pub schema_location: String,
}

/// A compiled XSD schema
#[derive(Debug, Clone, Default)]
pub struct Schema {
    /// Target namespace of the schema
    pub target_namespace: String,
    /// Global element declarations
    pub element_decls: HashMap<QName, ElementDecl>,
    /// Named type definitions (including synthesized anonymous names)
    pub type_defs: HashMap<QName, XsdType>,
    /// Named attribute groups
    pub attribute_groups: HashMap<QName, AttributeGroup>,
    /// Named model groups
    pub groups: HashMap<QName, ModelGroup>,
    /// Declared imports, recorded during parse
    pub imports: Vec<Import>,
    /// Imported schemas indexed by location
    pub imported_schemas: HashMap<String, Schema>,
    /// Substitution-group registry: head element → substitutable members
    pub substitution_groups: HashMap<QName, Vec<QName>>,
}

impl Schema {
    /// Compile a parsed XSD document into a schema
    pub fn compile(doc: &XmlDocument) -> Result<Schema> {
        let mut schema = Parser::parse_document(doc)?;
        schema.resolve_references();
        Ok(schema)
    }

    /// Compile a schema from XSD source text
    pub fn from_str(xml: &str) -> Result<Schema> {
        let doc = XmlDocument::parse(xml)?;
        Self::compile(&doc)
    }

    /// Compile a schema from a file (no import/include processing; use the
    /// loader for that)
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Schema> {
        let doc = XmlDocument::from_file(path)?;
        Self::compile(&doc)
    }

    /// Look up a type definition, searching imported schemas as well
    pub fn lookup_type(&self, name: &QName) -> Option<&XsdType> {
        if let Some(ty) = self.type_defs.get(name) {
            return Some(ty);
        }
        self.imported_schemas
            .values()
            .find_map(|imported| imported.lookup_type(name))
    }

    /// Look up a global element declaration, searching imported schemas
    pub fn lookup_element(&self, name: &QName) -> Option<&ElementDecl> {
        if let Some(decl) = self.element_decls.get(name) {
            return Some(decl);
        }
        self.imported_schemas
            .values()
            .find_map(|imported| imported.lookup_element(name))
    }

    /// Look up a named model group, searching imported schemas
    pub fn lookup_group(&self, name: &QName) -> Option<&ModelGroup> {
        if let Some(group) = self.groups.get(name) {
            return Some(group);
        }
        self.imported_schemas
            .values()
            .find_map(|imported| imported.lookup_group(name))
    }

    /// Collect the attributes contributed by a complex type's attribute
    /// group references
    pub fn resolve_attribute_groups(&self, complex_type: &ComplexType) -> Vec<AttributeDecl> {
        let mut attrs = Vec::new();
        for group_ref in &complex_type.attribute_groups {
            if let Some(group) = self.lookup_attribute_group(group_ref) {
                attrs.extend(group.attributes.iter().cloned());
            }
        }
        attrs
    }

    fn lookup_attribute_group(&self, name: &QName) -> Option<&AttributeGroup> {
        if let Some(group) = self.attribute_groups.get(name) {
            return Some(group);
        }
        self.imported_schemas
            .values()
            .find_map(|imported| imported.lookup_attribute_group(name))
    }

    /// Check whether `actual` can substitute for the expected element.
    ///
    /// Substitution requires membership in the head's bucket (chained
    /// through imported schemas) and type compatibility: the member's type
    /// equals the head's type or derives from it. The derivation walk is
    /// authoritative; there is no permissive fallback.
    pub fn is_substitutable_for(&self, actual: &QName, expected: &QName) -> bool {
        if let Some(members) = self.substitution_groups.get(expected) {
            if members.contains(actual) {
                let actual_decl = self.lookup_element(actual);
                let expected_decl = self.lookup_element(expected);
                if let (Some(actual_decl), Some(expected_decl)) = (actual_decl, expected_decl) {
                    if let (Some(actual_ty), Some(expected_ty)) =
                        (&actual_decl.type_ref, &expected_decl.type_ref)
                    {
                        if self.is_type_ref_compatible(actual_ty, expected_ty) {
                            return true;
                        }
                    }
                }
                return false;
            }
        }

        self.imported_schemas
            .values()
            .any(|imported| imported.is_substitutable_for(actual, expected))
    }

    /// Check whether `actual` names the same type as `expected` or derives
    /// from it by restriction or extension
    pub fn is_type_ref_compatible(&self, actual: &TypeRef, expected: &TypeRef) -> bool {
        if actual.name() == expected.name() {
            return true;
        }
        let mut visited = HashSet::new();
        self.derives_from(actual.name(), expected.name(), &mut visited)
    }

    /// Walk the derivation chain from `actual` towards `expected`. The
    /// visited set terminates cyclic chains with "not compatible".
    fn derives_from(&self, actual: &QName, expected: &QName, visited: &mut HashSet<QName>) -> bool {
        if actual == expected {
            return true;
        }
        if !visited.insert(actual.clone()) {
            return false;
        }

        let base = match self.lookup_type(actual) {
            Some(XsdType::Complex(ct)) => ct.base.clone(),
            Some(XsdType::Simple(st)) => match &st.variant {
                Some(SimpleVariant::Restriction(r)) if !r.base.is_empty() => Some(r.base.clone()),
                _ => None,
            },
            None => None,
        };

        match base {
            Some(base) => self.derives_from(&base, expected, visited),
            None => false,
        }
    }

    /// Pass 2: placeholder rewriting, group splicing, extension merging and
    /// substitution-group registry construction. Idempotent, so the loader
    /// can re-run it after merging documents.
    pub(crate) fn resolve_references(&mut self) {
        // Element declaration placeholder types.
        for decl in self.element_decls.values_mut() {
            if let Some(TypeRef::Unresolved(q)) = &decl.type_ref {
                if self.type_defs.contains_key(q) {
                    let q = q.clone();
                    decl.type_ref = Some(TypeRef::Named(q));
                }
            }
        }

        // Standalone named groups. A group is detached while its own
        // particles resolve, so self-references stay unresolved and the
        // expansion terminates.
        let group_names: Vec<QName> = self.groups.keys().cloned().collect();
        for name in group_names {
            if let Some(mut group) = self.groups.remove(&name) {
                let mut visited = HashSet::new();
                group.particles = resolve_particles(group.particles, &self.groups, &mut visited);
                resolve_inline_element_types(&mut group.particles, &self.type_defs);
                self.groups.insert(name, group);
            }
        }

        // Complex type content models and extension merging.
        let type_names: Vec<QName> = self.type_defs.keys().cloned().collect();
        for name in type_names {
            if let Some(mut ty) = self.type_defs.remove(&name) {
                if let XsdType::Complex(ct) = &mut ty {
                    resolve_complex_type(ct, &self.groups, &self.type_defs);
                }
                self.type_defs.insert(name, ty);
            }
        }

        // Anonymous complex types embedded in element declarations.
        for decl in self.element_decls.values_mut() {
            if let Some(TypeRef::Complex(ct)) = &mut decl.type_ref {
                resolve_complex_type(ct, &self.groups, &self.type_defs);
            }
        }

        // Attribute types in named attribute groups.
        for group in self.attribute_groups.values_mut() {
            for attr in &mut group.attributes {
                if let Some(TypeRef::Unresolved(q)) = &attr.type_ref {
                    if self.type_defs.contains_key(q) {
                        let q = q.clone();
                        attr.type_ref = Some(TypeRef::Named(q));
                    }
                }
            }
        }

        self.build_substitution_groups();
    }

    /// Rebuild the substitution-group registry from element declarations,
    /// then merge the buckets of imported schemas (deduplicated)
    fn build_substitution_groups(&mut self) {
        self.substitution_groups.clear();

        for decl in self.element_decls.values() {
            if let Some(head) = &decl.substitution_group {
                let mut head = head.clone();
                if head.namespace.is_empty() {
                    head.namespace = self.target_namespace.clone();
                }
                let bucket = self.substitution_groups.entry(head).or_default();
                if !bucket.contains(&decl.name) {
                    bucket.push(decl.name.clone());
                }
            }
        }

        let imported_buckets: Vec<(QName, Vec<QName>)> = self
            .imported_schemas
            .values()
            .flat_map(|imported| {
                imported
                    .substitution_groups
                    .iter()
                    .map(|(head, members)| (head.clone(), members.clone()))
            })
            .collect();

        for (head, members) in imported_buckets {
            let bucket = self.substitution_groups.entry(head).or_default();
            for member in members {
                if !bucket.contains(&member) {
                    bucket.push(member);
                }
            }
        }
    }
}

/// Rewrite `GroupRef` particles to the referenced group's body, tracking the
/// set of groups currently being expanded: revisiting one leaves the inner
/// reference unresolved so the output stays finite.
fn resolve_particles(
    particles: Vec<Particle>,
    groups: &HashMap<QName, ModelGroup>,
    visited: &mut HashSet<QName>,
) -> Vec<Particle> {
    let mut resolved = Vec::with_capacity(particles.len());

    for particle in particles {
        match particle {
            Particle::GroupRef(group_ref) => {
                if visited.contains(&group_ref.ref_name) {
                    resolved.push(Particle::GroupRef(group_ref));
                    continue;
                }

                match groups.get(&group_ref.ref_name) {
                    Some(group) => {
                        visited.insert(group_ref.ref_name.clone());
                        let occurs = if group_ref.occurs.is_empty() {
                            group.occurs
                        } else {
                            group_ref.occurs
                        };
                        let inner =
                            resolve_particles(group.particles.clone(), groups, visited);
                        visited.remove(&group_ref.ref_name);
                        resolved.push(Particle::Group(ModelGroup {
                            kind: group.kind,
                            particles: inner,
                            occurs,
                        }));
                    }
                    None => resolved.push(Particle::GroupRef(group_ref)),
                }
            }
            Particle::Group(mut group) => {
                group.particles = resolve_particles(group.particles, groups, visited);
                resolved.push(Particle::Group(group));
            }
            other => resolved.push(other),
        }
    }

    resolved
}

/// Rewrite unresolved placeholder types on inline element particles
fn resolve_inline_element_types(particles: &mut [Particle], type_defs: &HashMap<QName, XsdType>) {
    for particle in particles {
        match particle {
            Particle::Element(decl) => {
                if let Some(TypeRef::Unresolved(q)) = &decl.type_ref {
                    if type_defs.contains_key(q) {
                        let q = q.clone();
                        decl.type_ref = Some(TypeRef::Named(q));
                    }
                }
            }
            Particle::Group(group) => {
                resolve_inline_element_types(&mut group.particles, type_defs);
            }
            _ => {}
        }
    }
}

/// Resolve a complex type in place: splice group references, resolve nested
/// particles, merge extension bases and rewrite attribute placeholder types
fn resolve_complex_type(
    ct: &mut ComplexType,
    groups: &HashMap<QName, ModelGroup>,
    type_defs: &HashMap<QName, XsdType>,
) {
    // Splice a top-level group reference into an equivalent model group.
    let spliced = match &ct.content {
        Some(Content::GroupRef(group_ref)) => groups.get(&group_ref.ref_name).map(|group| {
            let occurs = if group_ref.occurs.is_empty() {
                group.occurs
            } else {
                group_ref.occurs
            };
            let mut visited = HashSet::new();
            let particles = resolve_particles(group.particles.clone(), groups, &mut visited);
            Content::Group(ModelGroup {
                kind: group.kind,
                particles,
                occurs,
            })
        }),
        _ => None,
    };
    if let Some(content) = spliced {
        ct.content = Some(content);
    }

    if let Some(Content::Group(group)) = &mut ct.content {
        let particles = std::mem::take(&mut group.particles);
        let mut visited = HashSet::new();
        group.particles = resolve_particles(particles, groups, &mut visited);
        resolve_inline_element_types(&mut group.particles, type_defs);
    }

    // Extension merging for simple and complex content.
    let extension = match &ct.content {
        Some(Content::Simple(sc)) => match &sc.derivation {
            Some(SimpleContentDerivation::Extension(ext)) => Some(ext.clone()),
            _ => None,
        },
        Some(Content::Complex(cc)) => match &cc.derivation {
            Some(ComplexContentDerivation::Extension(ext)) => Some(ext.clone()),
            _ => None,
        },
        _ => None,
    };
    if let Some(ext) = extension {
        resolve_extension(ct, &ext, type_defs);
    }

    for attr in &mut ct.attributes {
        if let Some(TypeRef::Unresolved(q)) = &attr.type_ref {
            if type_defs.contains_key(q) {
                let q = q.clone();
                attr.type_ref = Some(TypeRef::Named(q));
            }
        }
    }
}

/// Particles contributed by a content model when used in an extension merge
fn content_particles(content: &Content) -> Option<Vec<Particle>> {
    match content {
        Content::Group(group) => Some(group.particles.clone()),
        Content::GroupRef(group_ref) => Some(vec![Particle::GroupRef(group_ref.clone())]),
        Content::Simple(_) | Content::Complex(_) => None,
    }
}

/// Merge an extension's base complex type into the derived type: base
/// attributes first, appended content particles in a fresh sequence, and
/// inherited `mixed`/`anyAttribute`.
fn resolve_extension(ct: &mut ComplexType, ext: &Extension, type_defs: &HashMap<QName, XsdType>) {
    let Some(XsdType::Complex(base)) = type_defs.get(&ext.base) else {
        return;
    };

    let mut attributes = base.attributes.clone();
    attributes.extend(ext.attributes.iter().cloned());
    ct.attributes = attributes;
    ct.attribute_groups
        .extend(base.attribute_groups.iter().cloned());

    let ext_content = ext.content.as_deref();
    match (ext_content, &base.content) {
        (Some(ext_content), Some(base_content)) => {
            let base_particles = content_particles(base_content);
            let ext_particles = content_particles(ext_content);
            match (base_particles, ext_particles) {
                (Some(mut particles), Some(ext_particles)) => {
                    particles.extend(ext_particles);
                    ct.content = Some(Content::Group(ModelGroup {
                        kind: ModelGroupKind::Sequence,
                        particles,
                        occurs: Occurs::once(),
                    }));
                }
                _ => ct.content = Some(ext_content.clone()),
            }
        }
        (Some(ext_content), None) => ct.content = Some(ext_content.clone()),
        (None, Some(base_content)) => ct.content = Some(base_content.clone()),
        (None, None) => {}
    }

    if base.mixed {
        ct.mixed = true;
    }
    if ct.any_attribute.is_none() {
        ct.any_attribute = base.any_attribute.clone();
    }
}

/// Body of an `xs:restriction`, shared between simpleType, simpleContent
/// and complexContent contexts
struct ParsedRestriction {
    base: QName,
    facets: Vec<Facet>,
    content: Option<Content>,
    attributes: Vec<AttributeDecl>,
    any_attribute: Option<AnyAttribute>,
}

/// Append a facet, collapsing sibling enumeration facets into one
/// deduplicated set
fn push_facet(facets: &mut Vec<Facet>, facet: Facet) {
    if let Facet::Enumeration(mut values) = facet {
        for existing in facets.iter_mut() {
            if let Facet::Enumeration(set) = existing {
                for value in values.drain(..) {
                    if !set.contains(&value) {
                        set.push(value);
                    }
                }
                return;
            }
        }
        facets.push(Facet::Enumeration(values));
        return;
    }
    facets.push(facet);
}

/// Pass 1 parser over an `xs:schema` document
struct Parser {
    target_namespace: String,
    /// Prefix bindings declared on the schema root
    namespaces: NamespaceContext,
    /// Counter for synthesized anonymous type names
    anon_counter: u32,
    schema: Schema,
}

impl Parser {
    fn parse_document(doc: &XmlDocument) -> Result<Schema> {
        let root = doc
            .root()
            .ok_or_else(|| ParseError::new("no root element"))?;

        if root.namespace != XSD_NAMESPACE || root.local != "schema" {
            return Err(ParseError::new("not an XSD schema document").into());
        }

        // Only prefixed declarations matter here: unprefixed names in schema
        // attributes take the target namespace, not the default xmlns.
        let mut namespaces = NamespaceContext::new();
        for decl in &root.namespace_decls {
            if !decl.prefix.is_empty() {
                namespaces.add_prefix(decl.prefix.clone(), decl.uri.clone());
            }
        }

        let mut parser = Parser {
            target_namespace: root.attribute("targetNamespace").unwrap_or("").to_string(),
            namespaces,
            anon_counter: 0,
            schema: Schema::default(),
        };
        parser.schema.target_namespace = parser.target_namespace.clone();

        for child in root.child_elements() {
            if child.namespace != XSD_NAMESPACE {
                continue;
            }

            match child.local.as_str() {
                "element" => {
                    if let Some(decl) = parser.parse_element(child, true)? {
                        parser.schema.element_decls.insert(decl.name.clone(), decl);
                    }
                }
                "simpleType" => parser.parse_global_simple_type(child)?,
                "complexType" => parser.parse_global_complex_type(child)?,
                "attributeGroup" => parser.parse_attribute_group(child)?,
                "group" => parser.parse_named_group(child)?,
                "import" => {
                    parser.schema.imports.push(Import {
                        namespace: child.attribute("namespace").unwrap_or("").to_string(),
                        schema_location: child
                            .attribute("schemaLocation")
                            .unwrap_or("")
                            .to_string(),
                    });
                }
                // Handled by the loader or irrelevant to validation.
                "include" | "annotation" | "notation" | "attribute" | "redefine" => {}
                other => {
                    return Err(ParseError::new(format!(
                        "unknown child of xs:schema: '{}'",
                        other
                    ))
                    .into())
                }
            }
        }

        Ok(parser.schema)
    }

    fn next_anon_name(&mut self, stem: &str) -> QName {
        self.anon_counter += 1;
        QName::new(
            self.target_namespace.clone(),
            format!("_{}_{}", stem, self.anon_counter),
        )
    }

    /// Resolve a possibly-prefixed QName string against the schema root's
    /// prefix declarations. The `xs`/`xsd` prefixes are pinned to the XSD
    /// namespace; unprefixed names take the target namespace; names with an
    /// unknown prefix are kept as literals.
    fn parse_qname(&self, name: &str) -> QName {
        if name.is_empty() {
            return QName::default();
        }

        match name.split_once(':') {
            Some((prefix, local)) => {
                if prefix == "xs" || prefix == "xsd" {
                    return QName::new(XSD_NAMESPACE, local);
                }
                match self.namespaces.get_namespace(prefix) {
                    Some(uri) => QName::new(uri.to_string(), local),
                    None => QName::local(name),
                }
            }
            None => QName::new(self.target_namespace.clone(), name),
        }
    }

    /// Global component names must be NCNames
    fn check_component_name(&self, kind: &str, name: &str) -> Result<()> {
        if names::is_valid_ncname(name) {
            Ok(())
        } else {
            Err(ParseError::new(format!(
                "invalid {} name '{}': must be a valid NCName",
                kind, name
            ))
            .into())
        }
    }

    fn parse_occurs_attrs(&self, elem: &XmlElement) -> Occurs {
        parse_occurs(elem.attribute("minOccurs"), elem.attribute("maxOccurs"))
    }

    fn parse_element(&mut self, elem: &XmlElement, is_global: bool) -> Result<Option<ElementDecl>> {
        let name = match elem.attribute("name") {
            Some(name) => name.to_string(),
            None => {
                if is_global {
                    return Err(ParseError::new(
                        "global element declaration must have a name attribute",
                    )
                    .into());
                }
                return Ok(None);
            }
        };
        if is_global {
            self.check_component_name("element", &name)?;
        }

        let mut decl = ElementDecl::new(QName::new(self.target_namespace.clone(), name.clone()));
        decl.occurs = self.parse_occurs_attrs(elem);
        decl.nillable = elem.attribute("nillable") == Some("true");
        decl.abstract_ = elem.attribute("abstract") == Some("true");

        if let Some(head) = elem.attribute("substitutionGroup") {
            decl.substitution_group = Some(self.parse_qname(head));
        }

        decl.default = elem.attribute("default").map(|s| s.to_string());
        decl.fixed = elem.attribute("fixed").map(|s| s.to_string());
        if decl.default.is_some() && decl.fixed.is_some() {
            return Err(ParseError::new(format!(
                "element '{}': 'default' and 'fixed' are mutually exclusive",
                name
            ))
            .into());
        }

        if let Some(type_name) = elem.attribute("type") {
            decl.type_ref = Some(TypeRef::Unresolved(self.parse_qname(type_name)));
        }

        for child in elem.child_elements() {
            if child.namespace != XSD_NAMESPACE {
                continue;
            }
            match child.local.as_str() {
                "simpleType" => {
                    let st = self.parse_inline_simple_type(child)?;
                    decl.type_ref = Some(TypeRef::Simple(Box::new(st)));
                }
                "complexType" => {
                    let name = self.next_anon_name("anonymous");
                    let ct = self.parse_complex_type_body(child, name)?;
                    decl.type_ref = Some(TypeRef::Complex(Box::new(ct)));
                }
                "key" => {
                    if let Some(c) = self.parse_identity_constraint(child, IdentityConstraintKind::Key) {
                        decl.constraints.push(c);
                    }
                }
                "keyref" => {
                    if let Some(c) =
                        self.parse_identity_constraint(child, IdentityConstraintKind::Keyref)
                    {
                        decl.constraints.push(c);
                    }
                }
                "unique" => {
                    if let Some(c) =
                        self.parse_identity_constraint(child, IdentityConstraintKind::Unique)
                    {
                        decl.constraints.push(c);
                    }
                }
                _ => {}
            }
        }

        Ok(Some(decl))
    }

    fn parse_global_simple_type(&mut self, elem: &XmlElement) -> Result<()> {
        let name = elem.attribute("name").ok_or_else(|| {
            ParseError::new("global simpleType must have a name attribute")
        })?;
        self.check_component_name("simpleType", name)?;

        let qname = QName::new(self.target_namespace.clone(), name);
        let mut st = SimpleType::placeholder(qname.clone());
        self.parse_simple_type_body(elem, &mut st)?;

        self.schema.type_defs.insert(qname, XsdType::Simple(st));
        Ok(())
    }

    fn parse_inline_simple_type(&mut self, elem: &XmlElement) -> Result<SimpleType> {
        let mut st = SimpleType::placeholder(self.next_anon_name("anonymous"));
        self.parse_simple_type_body(elem, &mut st)?;
        Ok(st)
    }

    fn parse_simple_type_body(&mut self, elem: &XmlElement, st: &mut SimpleType) -> Result<()> {
        for child in elem.child_elements() {
            if child.namespace != XSD_NAMESPACE {
                continue;
            }
            match child.local.as_str() {
                "restriction" => {
                    let parsed = self.parse_restriction(child)?;
                    if parsed.base.is_empty() {
                        return Err(ParseError::new(format!(
                            "simpleType '{}': restriction must have a base",
                            st.name.local
                        ))
                        .into());
                    }
                    st.variant = Some(SimpleVariant::Restriction(SimpleRestriction {
                        base: parsed.base,
                        facets: parsed.facets,
                    }));
                }
                "list" => {
                    st.variant = Some(SimpleVariant::List(self.parse_list(child)?));
                }
                "union" => {
                    st.variant = Some(SimpleVariant::Union(self.parse_union(child)?));
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn parse_list(&mut self, elem: &XmlElement) -> Result<ListType> {
        if let Some(item_type) = elem.attribute("itemType") {
            return Ok(ListType {
                item_type: self.parse_qname(item_type),
            });
        }

        for child in elem.child_elements() {
            if child.namespace == XSD_NAMESPACE && child.local == "simpleType" {
                let mut st = self.parse_inline_simple_type(child)?;
                st.name = self.next_anon_name("list_item");
                let qname = st.name.clone();
                self.schema
                    .type_defs
                    .insert(qname.clone(), XsdType::Simple(st));
                return Ok(ListType { item_type: qname });
            }
        }

        Ok(ListType {
            item_type: QName::default(),
        })
    }

    fn parse_union(&mut self, elem: &XmlElement) -> Result<UnionType> {
        let mut union = UnionType {
            member_types: Vec::new(),
        };

        if let Some(member_types) = elem.attribute("memberTypes") {
            for name in member_types.split_whitespace() {
                union.member_types.push(self.parse_qname(name));
            }
        }

        for child in elem.child_elements() {
            if child.namespace == XSD_NAMESPACE && child.local == "simpleType" {
                let mut st = self.parse_inline_simple_type(child)?;
                st.name = self.next_anon_name("union_member");
                let qname = st.name.clone();
                self.schema
                    .type_defs
                    .insert(qname.clone(), XsdType::Simple(st));
                union.member_types.push(qname);
            }
        }

        Ok(union)
    }

    fn parse_global_complex_type(&mut self, elem: &XmlElement) -> Result<()> {
        let name = elem.attribute("name").ok_or_else(|| {
            ParseError::new("global complexType must have a name attribute")
        })?;
        self.check_component_name("complexType", name)?;

        let qname = QName::new(self.target_namespace.clone(), name);
        let ct = self.parse_complex_type_body(elem, qname.clone())?;
        self.schema.type_defs.insert(qname, XsdType::Complex(ct));
        Ok(())
    }

    fn parse_complex_type_body(&mut self, elem: &XmlElement, name: QName) -> Result<ComplexType> {
        let mut ct = ComplexType::new(name);
        ct.mixed = elem.attribute("mixed") == Some("true");
        ct.abstract_ = elem.attribute("abstract") == Some("true");

        for child in elem.child_elements() {
            if child.namespace != XSD_NAMESPACE {
                continue;
            }
            match child.local.as_str() {
                "simpleContent" => {
                    let sc = self.parse_simple_content(child)?;
                    // Attributes on a simpleContent extension belong to the
                    // complex type itself.
                    if let Some(SimpleContentDerivation::Extension(ext)) = &sc.derivation {
                        ct.base = Some(ext.base.clone());
                        ct.attributes.extend(ext.attributes.iter().cloned());
                        if ext.any_attribute.is_some() {
                            ct.any_attribute = ext.any_attribute.clone();
                        }
                    } else if let Some(SimpleContentDerivation::Restriction(r)) = &sc.derivation {
                        ct.base = Some(r.base.clone());
                        ct.attributes.extend(r.attributes.iter().cloned());
                        if r.any_attribute.is_some() {
                            ct.any_attribute = r.any_attribute.clone();
                        }
                    }
                    ct.content = Some(Content::Simple(sc));
                }
                "complexContent" => {
                    let cc = self.parse_complex_content(child)?;
                    ct.base = match &cc.derivation {
                        Some(ComplexContentDerivation::Extension(ext)) => Some(ext.base.clone()),
                        Some(ComplexContentDerivation::Restriction(r)) => Some(r.base.clone()),
                        None => None,
                    };
                    if cc.mixed {
                        ct.mixed = true;
                    }
                    ct.content = Some(Content::Complex(cc));
                }
                "sequence" | "choice" | "all" => {
                    ct.content = Some(Content::Group(self.parse_model_group(child)?));
                }
                "group" => {
                    if let Some(ref_name) = child.attribute("ref") {
                        ct.content = Some(Content::GroupRef(GroupRef {
                            ref_name: self.parse_qname(ref_name),
                            occurs: self.parse_occurs_attrs(child),
                        }));
                    }
                }
                "attribute" => {
                    if let Some(attr) = self.parse_attribute(child)? {
                        ct.attributes.push(attr);
                    }
                }
                "attributeGroup" => {
                    if let Some(ref_name) = child.attribute("ref") {
                        ct.attribute_groups.push(self.parse_qname(ref_name));
                    }
                }
                "anyAttribute" => {
                    ct.any_attribute = Some(self.parse_any_attribute(child));
                }
                _ => {}
            }
        }

        Ok(ct)
    }

    fn parse_simple_content(&mut self, elem: &XmlElement) -> Result<SimpleContent> {
        let mut sc = SimpleContent::default();
        for child in elem.child_elements() {
            if child.namespace != XSD_NAMESPACE {
                continue;
            }
            match child.local.as_str() {
                "extension" => {
                    sc.derivation = Some(SimpleContentDerivation::Extension(
                        self.parse_extension(child)?,
                    ));
                }
                "restriction" => {
                    let parsed = self.parse_restriction(child)?;
                    sc.derivation = Some(SimpleContentDerivation::Restriction(
                        SimpleContentRestriction {
                            base: parsed.base,
                            facets: parsed.facets,
                            attributes: parsed.attributes,
                            any_attribute: parsed.any_attribute,
                        },
                    ));
                }
                _ => {}
            }
        }
        Ok(sc)
    }

    fn parse_complex_content(&mut self, elem: &XmlElement) -> Result<ComplexContent> {
        let mut cc = ComplexContent {
            mixed: elem.attribute("mixed") == Some("true"),
            derivation: None,
        };
        for child in elem.child_elements() {
            if child.namespace != XSD_NAMESPACE {
                continue;
            }
            match child.local.as_str() {
                "extension" => {
                    cc.derivation = Some(ComplexContentDerivation::Extension(
                        self.parse_extension(child)?,
                    ));
                }
                "restriction" => {
                    let parsed = self.parse_restriction(child)?;
                    cc.derivation = Some(ComplexContentDerivation::Restriction(
                        ComplexContentRestriction {
                            base: parsed.base,
                            content: parsed.content.map(Box::new),
                            attributes: parsed.attributes,
                            any_attribute: parsed.any_attribute,
                        },
                    ));
                }
                _ => {}
            }
        }
        Ok(cc)
    }

    fn parse_extension(&mut self, elem: &XmlElement) -> Result<Extension> {
        let base = self.parse_qname(elem.attribute("base").unwrap_or(""));
        let mut ext = Extension::new(base);

        for child in elem.child_elements() {
            if child.namespace != XSD_NAMESPACE {
                continue;
            }
            match child.local.as_str() {
                "attribute" => {
                    if let Some(attr) = self.parse_attribute(child)? {
                        ext.attributes.push(attr);
                    }
                }
                "sequence" | "choice" | "all" => {
                    ext.content = Some(Box::new(Content::Group(self.parse_model_group(child)?)));
                }
                "group" => {
                    if let Some(ref_name) = child.attribute("ref") {
                        ext.content = Some(Box::new(Content::GroupRef(GroupRef {
                            ref_name: self.parse_qname(ref_name),
                            occurs: Occurs::once(),
                        })));
                    }
                }
                "anyAttribute" => {
                    ext.any_attribute = Some(self.parse_any_attribute(child));
                }
                _ => {}
            }
        }

        Ok(ext)
    }

    fn parse_model_group(&mut self, elem: &XmlElement) -> Result<ModelGroup> {
        let kind = match elem.local.as_str() {
            "choice" => ModelGroupKind::Choice,
            "all" => ModelGroupKind::All,
            _ => ModelGroupKind::Sequence,
        };

        let mut group = ModelGroup::new(kind);
        group.occurs = self.parse_occurs_attrs(elem);

        if kind == ModelGroupKind::All {
            // XSD 1.0 restricts xs:all occurrence bounds.
            if group.occurs.max != Some(1) {
                return Err(
                    ParseError::new("xs:all must have maxOccurs = 1").into(),
                );
            }
            if group.occurs.min > 1 {
                return Err(
                    ParseError::new("xs:all must have minOccurs of 0 or 1").into(),
                );
            }
        }

        for child in elem.child_elements() {
            if child.namespace != XSD_NAMESPACE {
                continue;
            }
            match child.local.as_str() {
                "element" => {
                    if let Some(ref_name) = child.attribute("ref") {
                        group.particles.push(Particle::ElementRef(ElementRef {
                            ref_name: self.parse_qname(ref_name),
                            occurs: self.parse_occurs_attrs(child),
                        }));
                    } else if let Some(decl) = self.parse_element(child, false)? {
                        group.particles.push(Particle::Element(decl));
                    }
                }
                "group" => {
                    if let Some(ref_name) = child.attribute("ref") {
                        group.particles.push(Particle::GroupRef(GroupRef {
                            ref_name: self.parse_qname(ref_name),
                            occurs: self.parse_occurs_attrs(child),
                        }));
                    }
                }
                "sequence" | "choice" | "all" => {
                    group
                        .particles
                        .push(Particle::Group(self.parse_model_group(child)?));
                }
                "any" => {
                    group.particles.push(Particle::Any(AnyElement {
                        namespace: child.attribute("namespace").unwrap_or("").to_string(),
                        process_contents: ProcessContents::parse(
                            child.attribute("processContents").unwrap_or(""),
                        ),
                        occurs: self.parse_occurs_attrs(child),
                    }));
                }
                _ => {}
            }
        }

        if kind == ModelGroupKind::All {
            for particle in &group.particles {
                if !matches!(particle.max_occurs(), Some(0) | Some(1)) {
                    return Err(ParseError::new(
                        "children of xs:all must have maxOccurs of 0 or 1",
                    )
                    .into());
                }
            }
        }

        Ok(group)
    }

    fn parse_restriction(&mut self, elem: &XmlElement) -> Result<ParsedRestriction> {
        let mut parsed = ParsedRestriction {
            base: self.parse_qname(elem.attribute("base").unwrap_or("")),
            facets: Vec::new(),
            content: None,
            attributes: Vec::new(),
            any_attribute: None,
        };

        for child in elem.child_elements() {
            if child.namespace != XSD_NAMESPACE {
                continue;
            }

            match child.local.as_str() {
                // An inline simpleType stands in for the base when no base
                // attribute was given; it is registered under a synthesized
                // name so the restriction can refer to it.
                "simpleType" if parsed.base.is_empty() => {
                    let mut st = self.parse_inline_simple_type(child)?;
                    st.name = self.next_anon_name("restriction_base");
                    let qname = st.name.clone();
                    self.schema
                        .type_defs
                        .insert(qname.clone(), XsdType::Simple(st));
                    parsed.base = qname;
                }
                "sequence" | "choice" | "all" => {
                    parsed.content = Some(Content::Group(self.parse_model_group(child)?));
                }
                "group" => {
                    if let Some(ref_name) = child.attribute("ref") {
                        parsed.content = Some(Content::GroupRef(GroupRef {
                            ref_name: self.parse_qname(ref_name),
                            occurs: Occurs::once(),
                        }));
                    }
                }
                "attribute" => {
                    if let Some(attr) = self.parse_attribute(child)? {
                        parsed.attributes.push(attr);
                    }
                }
                "anyAttribute" => {
                    parsed.any_attribute = Some(self.parse_any_attribute(child));
                }
                "annotation" => {}
                facet_name => {
                    let value = child.attribute("value").unwrap_or("");
                    if let Some(facet) = Facet::parse(facet_name, value) {
                        push_facet(&mut parsed.facets, facet);
                    }
                }
            }
        }

        Ok(parsed)
    }

    fn parse_attribute(&mut self, elem: &XmlElement) -> Result<Option<AttributeDecl>> {
        let name = match elem.attribute("name") {
            Some(name) => name.to_string(),
            None => return Ok(None), // a reference; tolerated
        };

        let mut attr = AttributeDecl::new(QName::new(self.target_namespace.clone(), name.clone()));
        attr.use_ = AttributeUse::parse(elem.attribute("use").unwrap_or(""));
        attr.default = elem.attribute("default").map(|s| s.to_string());
        attr.fixed = elem.attribute("fixed").map(|s| s.to_string());
        if attr.default.is_some() && attr.fixed.is_some() {
            return Err(ParseError::new(format!(
                "attribute '{}': 'default' and 'fixed' are mutually exclusive",
                name
            ))
            .into());
        }

        if let Some(type_name) = elem.attribute("type") {
            attr.type_ref = Some(TypeRef::Unresolved(self.parse_qname(type_name)));
        }

        Ok(Some(attr))
    }

    fn parse_any_attribute(&self, elem: &XmlElement) -> AnyAttribute {
        AnyAttribute {
            namespace: elem.attribute("namespace").unwrap_or("").to_string(),
            process_contents: ProcessContents::parse(
                elem.attribute("processContents").unwrap_or(""),
            ),
        }
    }

    fn parse_attribute_group(&mut self, elem: &XmlElement) -> Result<()> {
        let name = elem.attribute("name").ok_or_else(|| {
            ParseError::new("global attributeGroup must have a name attribute")
        })?;
        self.check_component_name("attributeGroup", name)?;

        let mut group = AttributeGroup {
            name: QName::new(self.target_namespace.clone(), name),
            attributes: Vec::new(),
        };

        for child in elem.child_elements() {
            if child.namespace == XSD_NAMESPACE && child.local == "attribute" {
                if let Some(attr) = self.parse_attribute(child)? {
                    group.attributes.push(attr);
                }
            }
        }

        self.schema
            .attribute_groups
            .insert(group.name.clone(), group);
        Ok(())
    }

    fn parse_named_group(&mut self, elem: &XmlElement) -> Result<()> {
        let name = elem
            .attribute("name")
            .ok_or_else(|| ParseError::new("global group must have a name attribute"))?
            .to_string();
        self.check_component_name("group", &name)?;

        for child in elem.child_elements() {
            if child.namespace == XSD_NAMESPACE
                && matches!(child.local.as_str(), "sequence" | "choice" | "all")
            {
                let group = self.parse_model_group(child)?;
                self.schema
                    .groups
                    .insert(QName::new(self.target_namespace.clone(), name.clone()), group);
                return Ok(());
            }
        }

        Ok(())
    }

    fn parse_identity_constraint(
        &self,
        elem: &XmlElement,
        kind: IdentityConstraintKind,
    ) -> Option<IdentityConstraint> {
        let name = elem.attribute("name")?.to_string();

        let mut constraint = IdentityConstraint {
            name,
            kind,
            selector: String::new(),
            fields: Vec::new(),
            refer: None,
        };

        if kind == IdentityConstraintKind::Keyref {
            if let Some(refer) = elem.attribute("refer") {
                constraint.refer = Some(self.parse_qname(refer));
            }
        }

        for child in elem.child_elements() {
            if child.namespace != XSD_NAMESPACE {
                continue;
            }
            match child.local.as_str() {
                "selector" => {
                    if let Some(xpath) = child.attribute("xpath") {
                        constraint.selector = xpath.to_string();
                    }
                }
                "field" => {
                    if let Some(xpath) = child.attribute("xpath") {
                        constraint.fields.push(xpath.to_string());
                    }
                }
                _ => {}
            }
        }

        Some(constraint)
    }
}
