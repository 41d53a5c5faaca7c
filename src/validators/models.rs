//! Content-model matching
//!
//! Validates an ordered list of child elements against a model group.
//! Sequences advance a particle cursor and a child cursor together; choices
//! accept the first alternative that consumes children; `all` groups match
//! every child against a not-yet-used particle.
//!
//! Code preference: when a required particle fails to match and a wildcard
//! in scope would have rejected the child's namespace, `cvc-wildcard.2` is
//! emitted instead of `cvc-complex-type.2.4.d`.

use crate::documents::XmlElement;
use crate::namespaces::QName;

use super::elements::ElementDecl;
use super::exceptions::{codes, Violation};
use super::groups::{ModelGroup, ModelGroupKind, Particle};
use super::schemas::Schema;
use super::validation::validate_element_against_decl;
use super::wildcards::{matches_wildcard, validate_any_element, AnyElement};

/// Validate an element's children against a model group
pub fn validate_model_group(
    group: &ModelGroup,
    element: &XmlElement,
    schema: &Schema,
) -> Vec<Violation> {
    let children = element.child_elements();
    match group.kind {
        ModelGroupKind::Sequence => validate_sequence(group, &children, schema),
        ModelGroupKind::Choice => validate_choice(group, &children, schema),
        ModelGroupKind::All => validate_all(group, &children, schema),
    }
}

fn wildcard_violation(child: &XmlElement, wildcard: &AnyElement) -> Violation {
    Violation::new(
        codes::CVC_WILDCARD_2,
        format!(
            "Element '{}' is not allowed by the namespace constraint '{}'",
            child.qname(),
            wildcard.namespace
        ),
    )
    .at(child)
}

/// Sequence semantics: particles consume consecutive matching children up to
/// their maxOccurs, with occurrence violations reported per particle
pub fn validate_sequence(
    group: &ModelGroup,
    children: &[&XmlElement],
    schema: &Schema,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut child_idx = 0;
    let mut particle_idx = 0;

    while child_idx < children.len() && particle_idx < group.particles.len() {
        let child = children[child_idx];
        let particle = &group.particles[particle_idx];

        match particle {
            Particle::GroupRef(group_ref) => {
                if let Some(resolved) = schema.lookup_group(&group_ref.ref_name) {
                    let (consumed, nested) =
                        match_nested_group(resolved, &children[child_idx..], schema);
                    child_idx += consumed;
                    if group_ref.occurs.min > 0 || consumed > 0 {
                        violations.extend(nested);
                    } else {
                        // An optional group that consumed nothing only
                        // surfaces wildcard namespace violations.
                        violations
                            .extend(nested.into_iter().filter(|v| v.code == codes::CVC_WILDCARD_2));
                    }
                }
                particle_idx += 1;
            }
            Particle::Group(nested_group) => {
                let (consumed, nested) =
                    match_nested_group(nested_group, &children[child_idx..], schema);
                child_idx += consumed;
                if nested_group.occurs.min > 0 || consumed > 0 {
                    violations.extend(nested);
                } else {
                    violations
                        .extend(nested.into_iter().filter(|v| v.code == codes::CVC_WILDCARD_2));
                }
                particle_idx += 1;
            }
            Particle::Any(wildcard) => {
                if matches_wildcard(child, &wildcard.namespace, &schema.target_namespace) {
                    let (matched, consumed, wildcard_violations) =
                        match_wildcard(wildcard, &children[child_idx..], schema);
                    child_idx += consumed;
                    violations.extend(wildcard_violations);

                    if wildcard.occurs.is_missing(matched as u32) {
                        violations.push(Violation::new(
                            codes::CVC_COMPLEX_TYPE_2_4_B,
                            format!(
                                "Expected at least {} wildcard match(es)",
                                wildcard.occurs.min
                            ),
                        ));
                    }
                    particle_idx += 1;
                } else if wildcard.occurs.min == 0 {
                    // Optional wildcard: skip it; the child either matches a
                    // later particle or is reported by the trailing loop.
                    particle_idx += 1;
                } else {
                    violations.push(wildcard_violation(child, wildcard));
                    child_idx += 1;
                }
            }
            _ => {
                // Element declaration or element reference.
                let (matched, consumed, particle_violations) =
                    match_particle(particle, &children[child_idx..], schema);
                violations.extend(particle_violations);

                if consumed > 0 {
                    if let Particle::ElementRef(element_ref) = particle {
                        for offset in 0..consumed {
                            let child_elem = children[child_idx + offset];
                            if let Some(decl) =
                                declaration_for(schema, child_elem, Some(&element_ref.ref_name))
                            {
                                violations.extend(validate_element_against_decl(
                                    child_elem, decl, schema,
                                ));
                            }
                        }
                    }

                    child_idx += consumed;

                    let occurs = particle.occurs();
                    if occurs.is_missing(matched as u32) {
                        violations.push(Violation::new(
                            codes::CVC_COMPLEX_TYPE_2_4_B,
                            format!("Expected at least {} occurrence(s)", occurs.min),
                        ));
                    }
                    if occurs.is_exceeded(matched as u32) {
                        violations.push(Violation::new(
                            codes::CVC_COMPLEX_TYPE_2_4_D,
                            format!(
                                "Expected at most {} occurrence(s)",
                                occurs.max.unwrap_or_default()
                            ),
                        ));
                    }
                    particle_idx += 1;
                } else if particle.min_occurs() == 0 {
                    particle_idx += 1;
                } else {
                    // Required particle did not match. Prefer the namespace
                    // constraint of a preceding wildcard as the explanation.
                    let mut explained = false;
                    for earlier in &group.particles[..particle_idx] {
                        if let Particle::Any(wildcard) = earlier {
                            if !matches_wildcard(
                                child,
                                &wildcard.namespace,
                                &schema.target_namespace,
                            ) {
                                violations.push(wildcard_violation(child, wildcard));
                                explained = true;
                                break;
                            }
                        }
                    }
                    if !explained {
                        violations.push(
                            Violation::new(
                                codes::CVC_COMPLEX_TYPE_2_4_D,
                                format!("Unexpected element '{}'", child.local),
                            )
                            .at(child)
                            .with_actual(child.local.clone()),
                        );
                    }
                    child_idx += 1;
                }
            }
        }
    }

    // Remaining particles must be optional.
    while particle_idx < group.particles.len() {
        if group.particles[particle_idx].min_occurs() > 0 {
            violations.push(Violation::new(
                codes::CVC_COMPLEX_TYPE_2_4_B,
                "Required element missing",
            ));
        }
        particle_idx += 1;
    }

    // Remaining children are unexpected, unless a wildcard's namespace
    // constraint is the better explanation.
    while child_idx < children.len() {
        let child = children[child_idx];
        let mut explained = false;
        for particle in &group.particles {
            if let Particle::Any(wildcard) = particle {
                if !matches_wildcard(child, &wildcard.namespace, &schema.target_namespace) {
                    violations.push(wildcard_violation(child, wildcard));
                    explained = true;
                    break;
                }
            }
        }
        if !explained {
            violations.push(
                Violation::new(
                    codes::CVC_COMPLEX_TYPE_2_4_D,
                    format!("Unexpected element '{}'", child.local),
                )
                .at(child)
                .with_actual(child.local.clone()),
            );
        }
        child_idx += 1;
    }

    violations
}

/// Choice semantics: accept the first alternative that consumes children;
/// if it consumes everything, its violations are the result
pub fn validate_choice(
    group: &ModelGroup,
    children: &[&XmlElement],
    schema: &Schema,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    for particle in &group.particles {
        let (matched, consumed, particle_violations) = match_particle(particle, children, schema);
        if matched > 0 {
            violations.extend(particle_violations);

            if let Particle::ElementRef(element_ref) = particle {
                for child in children.iter().take(consumed) {
                    if let Some(decl) =
                        declaration_for(schema, child, Some(&element_ref.ref_name))
                    {
                        violations.extend(validate_element_against_decl(child, decl, schema));
                    }
                }
            }

            if consumed == children.len() {
                return violations;
            }
        }
    }

    violations.push(Violation::new(
        codes::CVC_COMPLEX_TYPE_2_4_A,
        "Content does not match any choice alternative",
    ));
    violations
}

/// All semantics: every child matches a distinct particle, every required
/// particle must be matched
pub fn validate_all(group: &ModelGroup, children: &[&XmlElement], schema: &Schema) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut matched = vec![false; group.particles.len()];

    for child in children {
        let mut found = false;
        for (i, particle) in group.particles.iter().enumerate() {
            if matched[i] || !element_matches_particle(child, particle, schema) {
                continue;
            }
            matched[i] = true;
            found = true;

            match particle {
                Particle::Element(decl) => {
                    let actual = substituted_declaration(schema, child, decl);
                    violations.extend(validate_element_against_decl(child, actual, schema));
                }
                Particle::ElementRef(element_ref) => {
                    if let Some(decl) =
                        declaration_for(schema, child, Some(&element_ref.ref_name))
                    {
                        violations.extend(validate_element_against_decl(child, decl, schema));
                    }
                }
                _ => {}
            }
            break;
        }

        if !found {
            violations.push(
                Violation::new(
                    codes::CVC_COMPLEX_TYPE_2_4_A,
                    format!("Unexpected element '{}' in 'all' group", child.local),
                )
                .at(child)
                .with_actual(child.local.clone()),
            );
        }
    }

    for (i, particle) in group.particles.iter().enumerate() {
        if !matched[i] && particle.min_occurs() > 0 {
            violations.push(Violation::new(
                codes::CVC_COMPLEX_TYPE_2_4_A,
                "Required element missing in 'all' group",
            ));
        }
    }

    violations
}

/// Run a nested group (inline or resolved from a reference) as a particle
/// in a sequence, returning how many children it consumed
fn match_nested_group(
    group: &ModelGroup,
    children: &[&XmlElement],
    schema: &Schema,
) -> (usize, Vec<Violation>) {
    match group.kind {
        ModelGroupKind::Choice => match_choice_group(group, children, schema),
        ModelGroupKind::Sequence => {
            let nested = validate_sequence(group, children, schema);
            let consumed = count_consumed_by_group(group, children, schema);
            (consumed, nested)
        }
        ModelGroupKind::All => {
            let nested = validate_all(group, children, schema);
            let consumed = count_consumed_by_group(group, children, schema);
            (consumed, nested)
        }
    }
}

/// Greedily consume consecutive children that match any particle of a
/// choice group; a wildcard anywhere inside the choice explains non-matching
/// children as namespace violations
fn match_choice_group(
    choice: &ModelGroup,
    children: &[&XmlElement],
    schema: &Schema,
) -> (usize, Vec<Violation>) {
    let mut consumed = 0;
    let mut violations = Vec::new();

    for child in children {
        let mut matched = false;

        for particle in &choice.particles {
            if !element_matches_particle(child, particle, schema) {
                continue;
            }
            matched = true;
            consumed += 1;

            match particle {
                Particle::Element(decl) => {
                    let actual = substituted_declaration(schema, child, decl);
                    violations.extend(validate_element_against_decl(child, actual, schema));
                }
                Particle::ElementRef(element_ref) => {
                    if let Some(decl) =
                        declaration_for(schema, child, Some(&element_ref.ref_name))
                    {
                        violations.extend(validate_element_against_decl(child, decl, schema));
                    }
                }
                Particle::Any(wildcard) => {
                    violations.extend(validate_any_element(child, wildcard, schema));
                }
                _ => {}
            }
            break;
        }

        if !matched {
            if let Some(wildcard) = find_wildcard(&choice.particles) {
                violations.push(wildcard_violation(child, wildcard));
                consumed += 1; // consume the invalid element and continue
            } else {
                break;
            }
        }
    }

    (consumed, violations)
}

/// First wildcard in a particle list, searching nested groups
fn find_wildcard(particles: &[Particle]) -> Option<&AnyElement> {
    for particle in particles {
        match particle {
            Particle::Any(wildcard) => return Some(wildcard),
            Particle::Group(group) => {
                if let Some(wildcard) = find_wildcard(&group.particles) {
                    return Some(wildcard);
                }
            }
            _ => {}
        }
    }
    None
}

/// Count how many children a group would consume, without reporting
fn count_consumed_by_group(group: &ModelGroup, children: &[&XmlElement], schema: &Schema) -> usize {
    match group.kind {
        ModelGroupKind::Sequence => {
            let mut child_idx = 0;
            for particle in &group.particles {
                if child_idx >= children.len() {
                    break;
                }
                let (_, consumed, _) = match_particle(particle, &children[child_idx..], schema);
                child_idx += consumed;
            }
            child_idx
        }
        ModelGroupKind::Choice => {
            let mut consumed = 0;
            for child in children {
                let matched = group
                    .particles
                    .iter()
                    .any(|p| element_matches_particle(child, p, schema));
                if !matched {
                    break;
                }
                consumed += 1;
            }
            consumed
        }
        ModelGroupKind::All => {
            let mut matched = vec![false; group.particles.len()];
            let mut consumed = 0;
            for child in children {
                for (i, particle) in group.particles.iter().enumerate() {
                    if !matched[i] && element_matches_particle(child, particle, schema) {
                        matched[i] = true;
                        consumed += 1;
                        break;
                    }
                }
            }
            consumed
        }
    }
}

/// Match a particle against a prefix of the child list.
/// Returns (match count, children consumed, violations).
fn match_particle(
    particle: &Particle,
    children: &[&XmlElement],
    schema: &Schema,
) -> (usize, usize, Vec<Violation>) {
    match particle {
        Particle::Any(wildcard) => match_wildcard(wildcard, children, schema),
        Particle::GroupRef(group_ref) => match schema.lookup_group(&group_ref.ref_name) {
            Some(group) => match_group_particle(group, children, schema),
            None => (0, 0, Vec::new()),
        },
        Particle::Group(group) => match_group_particle(group, children, schema),
        Particle::Element(decl) => match_inline_element(decl, children, schema),
        Particle::ElementRef(element_ref) => {
            let mut matched = 0;
            for child in children {
                if !element_matches_particle(child, particle, schema) {
                    break;
                }
                matched += 1;
                if element_ref.occurs.is_over(matched as u32) {
                    break;
                }
            }
            (matched, matched, Vec::new())
        }
    }
}

fn match_group_particle(
    group: &ModelGroup,
    children: &[&XmlElement],
    schema: &Schema,
) -> (usize, usize, Vec<Violation>) {
    match group.kind {
        ModelGroupKind::Choice => {
            let (consumed, violations) = match_choice_group(group, children, schema);
            (consumed, consumed, violations)
        }
        ModelGroupKind::Sequence => {
            let violations = validate_sequence(group, children, schema);
            let consumed = count_consumed_by_group(group, children, schema);
            let matched = usize::from(consumed > 0);
            (matched, consumed, violations)
        }
        ModelGroupKind::All => {
            let violations = validate_all(group, children, schema);
            let consumed = count_consumed_by_group(group, children, schema);
            let matched = usize::from(consumed > 0);
            (matched, consumed, violations)
        }
    }
}

/// Consume consecutive children matching an inline element declaration
/// (directly or through its substitution group), validating each
fn match_inline_element(
    decl: &ElementDecl,
    children: &[&XmlElement],
    schema: &Schema,
) -> (usize, usize, Vec<Violation>) {
    let mut matched = 0;
    let mut violations = Vec::new();

    for child in children {
        let child_qname = QName::new(child.namespace.clone(), child.local.clone());
        let direct = child_qname == decl.name;
        if !direct && !schema.is_substitutable_for(&child_qname, &decl.name) {
            break;
        }

        let actual = substituted_declaration(schema, child, decl);
        violations.extend(validate_element_against_decl(child, actual, schema));

        matched += 1;
        if decl.occurs.is_over(matched as u32) {
            break;
        }
    }

    (matched, matched, violations)
}

/// Consume consecutive children admitted by a wildcard's namespace
/// constraint, validating each per its processContents policy
fn match_wildcard(
    wildcard: &AnyElement,
    children: &[&XmlElement],
    schema: &Schema,
) -> (usize, usize, Vec<Violation>) {
    let mut matched = 0;
    let mut violations = Vec::new();

    for child in children {
        if !matches_wildcard(child, &wildcard.namespace, &schema.target_namespace) {
            break;
        }

        violations.extend(validate_any_element(child, wildcard, schema));
        matched += 1;

        if wildcard.occurs.is_over(matched as u32) {
            break;
        }
    }

    (matched, matched, violations)
}

/// Check whether an element can begin a match of a particle
pub fn element_matches_particle(element: &XmlElement, particle: &Particle, schema: &Schema) -> bool {
    let qname = QName::new(element.namespace.clone(), element.local.clone());
    match particle {
        Particle::Element(decl) => {
            qname == decl.name || schema.is_substitutable_for(&qname, &decl.name)
        }
        Particle::ElementRef(element_ref) => {
            qname == element_ref.ref_name
                || schema.is_substitutable_for(&qname, &element_ref.ref_name)
        }
        Particle::Any(wildcard) => {
            matches_wildcard(element, &wildcard.namespace, &schema.target_namespace)
        }
        Particle::Group(group) => group
            .particles
            .iter()
            .any(|p| element_matches_particle(element, p, schema)),
        Particle::GroupRef(group_ref) => match schema.lookup_group(&group_ref.ref_name) {
            Some(group) => group
                .particles
                .iter()
                .any(|p| element_matches_particle(element, p, schema)),
            None => false,
        },
    }
}

/// Declaration to validate a child matched against an inline element
/// declaration: the inline declaration itself on a direct name match, the
/// substituted element's own global declaration otherwise
fn substituted_declaration<'a>(
    schema: &'a Schema,
    child: &XmlElement,
    decl: &'a ElementDecl,
) -> &'a ElementDecl {
    let child_qname = QName::new(child.namespace.clone(), child.local.clone());
    if child_qname == decl.name {
        decl
    } else {
        declaration_for(schema, child, None).unwrap_or(decl)
    }
}

/// Look up the declaration governing a child element: its own global
/// declaration (with the empty-namespace retry against the target
/// namespace), falling back to a referenced declaration
fn declaration_for<'a>(
    schema: &'a Schema,
    child: &XmlElement,
    fallback: Option<&QName>,
) -> Option<&'a ElementDecl> {
    let qname = QName::new(child.namespace.clone(), child.local.clone());
    if let Some(decl) = schema.lookup_element(&qname) {
        return Some(decl);
    }
    if qname.namespace.is_empty() && !schema.target_namespace.is_empty() {
        let retry = QName::new(schema.target_namespace.clone(), qname.local);
        if let Some(decl) = schema.lookup_element(&retry) {
            return Some(decl);
        }
    }
    fallback.and_then(|name| schema.lookup_element(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::XmlDocument;

    const SEQUENCE_SCHEMA: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
      <xs:element name="root">
        <xs:complexType>
          <xs:sequence>
            <xs:element name="A" type="xs:string"/>
            <xs:element name="B" type="xs:string" minOccurs="0" maxOccurs="unbounded"/>
          </xs:sequence>
        </xs:complexType>
      </xs:element>
    </xs:schema>"#;

    fn model_of(schema: &Schema, element: &str) -> ModelGroup {
        use crate::validators::complex_types::Content;
        use crate::validators::elements::TypeRef;
        let decl = &schema.element_decls[&QName::local(element)];
        let Some(TypeRef::Complex(ct)) = &decl.type_ref else {
            panic!("expected inline complex type")
        };
        let Some(Content::Group(group)) = &ct.content else {
            panic!("expected group content")
        };
        group.clone()
    }

    #[test]
    fn test_sequence_accepts_in_order() {
        let schema = Schema::from_str(SEQUENCE_SCHEMA).unwrap();
        let group = model_of(&schema, "root");
        let doc = XmlDocument::parse("<root><A/><B/><B/></root>").unwrap();

        let violations = validate_model_group(&group, doc.root().unwrap(), &schema);
        assert!(violations.is_empty(), "unexpected: {:?}", violations);
    }

    #[test]
    fn test_sequence_rejects_out_of_order() {
        let schema = Schema::from_str(SEQUENCE_SCHEMA).unwrap();
        let group = model_of(&schema, "root");
        let doc = XmlDocument::parse("<root><B/><A/></root>").unwrap();

        let violations = validate_model_group(&group, doc.root().unwrap(), &schema);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, codes::CVC_COMPLEX_TYPE_2_4_D);
        assert_eq!(violations[0].element.as_ref().unwrap().local, "B");
    }

    #[test]
    fn test_sequence_missing_required() {
        let schema = Schema::from_str(SEQUENCE_SCHEMA).unwrap();
        let group = model_of(&schema, "root");
        let doc = XmlDocument::parse("<root/>").unwrap();

        let violations = validate_model_group(&group, doc.root().unwrap(), &schema);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, codes::CVC_COMPLEX_TYPE_2_4_B);
    }

    #[test]
    fn test_optional_absent_accepted() {
        let xml = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
          <xs:element name="root">
            <xs:complexType>
              <xs:sequence>
                <xs:element name="A" type="xs:string" minOccurs="0"/>
              </xs:sequence>
            </xs:complexType>
          </xs:element>
        </xs:schema>"#;
        let schema = Schema::from_str(xml).unwrap();
        let group = model_of(&schema, "root");
        let doc = XmlDocument::parse("<root/>").unwrap();

        assert!(validate_model_group(&group, doc.root().unwrap(), &schema).is_empty());
    }

    #[test]
    fn test_unbounded_accepts_long_runs() {
        let schema = Schema::from_str(SEQUENCE_SCHEMA).unwrap();
        let group = model_of(&schema, "root");
        let mut xml = String::from("<root><A/>");
        for _ in 0..500 {
            xml.push_str("<B/>");
        }
        xml.push_str("</root>");
        let doc = XmlDocument::parse(&xml).unwrap();

        assert!(validate_model_group(&group, doc.root().unwrap(), &schema).is_empty());
    }

    #[test]
    fn test_choice_accepts_any_alternative() {
        let xml = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
          <xs:element name="root">
            <xs:complexType>
              <xs:choice>
                <xs:element name="A" type="xs:string"/>
                <xs:element name="B" type="xs:string"/>
              </xs:choice>
            </xs:complexType>
          </xs:element>
        </xs:schema>"#;
        let schema = Schema::from_str(xml).unwrap();
        let group = model_of(&schema, "root");

        let a = XmlDocument::parse("<root><A/></root>").unwrap();
        assert!(validate_model_group(&group, a.root().unwrap(), &schema).is_empty());

        let c = XmlDocument::parse("<root><C/></root>").unwrap();
        let violations = validate_model_group(&group, c.root().unwrap(), &schema);
        assert!(violations
            .iter()
            .any(|v| v.code == codes::CVC_COMPLEX_TYPE_2_4_A));
    }

    #[test]
    fn test_all_in_any_order() {
        let xml = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
          <xs:element name="root">
            <xs:complexType>
              <xs:all>
                <xs:element name="A" type="xs:string"/>
                <xs:element name="B" type="xs:string"/>
              </xs:all>
            </xs:complexType>
          </xs:element>
        </xs:schema>"#;
        let schema = Schema::from_str(xml).unwrap();
        let group = model_of(&schema, "root");

        let ok = XmlDocument::parse("<root><B/><A/></root>").unwrap();
        assert!(validate_model_group(&group, ok.root().unwrap(), &schema).is_empty());

        let missing = XmlDocument::parse("<root><B/></root>").unwrap();
        let violations = validate_model_group(&group, missing.root().unwrap(), &schema);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, codes::CVC_COMPLEX_TYPE_2_4_A);
    }

    #[test]
    fn test_wildcard_other_namespace() {
        let xml = r###"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
              targetNamespace="urn:c" xmlns:c="urn:c" elementFormDefault="qualified">
          <xs:element name="container">
            <xs:complexType>
              <xs:sequence>
                <xs:element name="header" type="xs:string"/>
                <xs:any namespace="##other" minOccurs="0" maxOccurs="unbounded" processContents="lax"/>
                <xs:element name="footer" type="xs:string"/>
              </xs:sequence>
            </xs:complexType>
          </xs:element>
        </xs:schema>"###;
        let schema = Schema::from_str(xml).unwrap();
        let decl = &schema.element_decls[&QName::new("urn:c", "container")];
        let crate::validators::elements::TypeRef::Complex(ct) =
            decl.type_ref.as_ref().unwrap()
        else {
            panic!()
        };
        let crate::validators::complex_types::Content::Group(group) =
            ct.content.as_ref().unwrap()
        else {
            panic!()
        };

        // Element in another namespace is admitted by ##other.
        let ok = XmlDocument::parse(
            r#"<container xmlns="urn:c"><header>T</header><x xmlns="other://x"/><footer>E</footer></container>"#,
        )
        .unwrap();
        let violations = validate_model_group(group, ok.root().unwrap(), &schema);
        assert!(violations.is_empty(), "unexpected: {:?}", violations);

        // Element in the target namespace violates the constraint.
        let bad = XmlDocument::parse(
            r#"<container xmlns="urn:c"><header>T</header><extra/><footer>E</footer></container>"#,
        )
        .unwrap();
        let violations = validate_model_group(group, bad.root().unwrap(), &schema);
        assert!(
            violations.iter().any(|v| v.code == codes::CVC_WILDCARD_2),
            "expected cvc-wildcard.2, got {:?}",
            violations
        );
    }
}
