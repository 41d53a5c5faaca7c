//! Instance validation orchestration
//!
//! The [`Validator`] drives one traversal of a document against a compiled
//! schema: declaration lookup, element-level rules (abstract, nillable,
//! fixed/default), type dispatch into the content-model matcher and the
//! attribute validator, ID/IDREF cross-referencing, and finally identity
//! constraints. It never stops early; every violation found during the pass
//! is returned.

use crate::documents::{XmlDocument, XmlElement, XmlNode};
use crate::namespaces::QName;
use std::collections::HashMap;

use super::attributes::validate_attributes;
use super::builtins::XSI_NAMESPACE;
use super::complex_types::{self, ComplexType};
use super::elements::{ElementDecl, TypeRef};
use super::exceptions::{codes, ElementPointer, Violation};
use super::identities::IdentityConstraintValidator;
use super::schemas::{Schema, XsdType};
use super::simple_types::{validate_simple_value, SimpleType, SimpleTypeError};

/// Validates XML documents against a compiled schema.
///
/// The schema is shared read-only; all per-document state lives here and is
/// reset on every [`Validator::validate`] call, so one validator can check
/// documents sequentially but must not be shared across threads mid-call.
pub struct Validator<'a> {
    schema: &'a Schema,
    ids: HashMap<String, ElementPointer>,
    idrefs: Vec<(String, ElementPointer)>,
    violations: Vec<Violation>,
}

impl<'a> Validator<'a> {
    /// Create a validator for a schema
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            ids: HashMap::new(),
            idrefs: Vec::new(),
            violations: Vec::new(),
        }
    }

    /// Validate a document, returning every violation found
    pub fn validate(&mut self, doc: &XmlDocument) -> Vec<Violation> {
        let Some(root) = doc.root() else {
            return vec![Violation::new(
                codes::XSD_NO_ROOT,
                "Document has no root element",
            )];
        };

        self.violations.clear();
        self.ids.clear();
        self.idrefs.clear();

        self.collect_ids_and_refs(root);
        self.validate_element(root);
        self.check_idrefs();

        // Identity constraints run last, over per-call state.
        let mut identity = collect_identity_constraints(self.schema);
        if !identity.is_empty() {
            self.violations.extend(identity.validate(doc));
        }

        std::mem::take(&mut self.violations)
    }

    /// Validate an optional document; `None` short-circuits with a single
    /// violation
    pub fn validate_optional(&mut self, doc: Option<&XmlDocument>) -> Vec<Violation> {
        match doc {
            Some(doc) => self.validate(doc),
            None => vec![Violation::new(codes::XSD_NULL_DOCUMENT, "Document is null")],
        }
    }

    /// One pre-pass over the tree collecting ID values and common IDREF
    /// attribute values; duplicate IDs are reported immediately
    fn collect_ids_and_refs(&mut self, element: &XmlElement) {
        const IDREF_ATTRS: [&str; 5] = ["target", "ref", "idref", "IDREF", "idlocation"];

        for attr in &element.attributes {
            if attr.local == "id" || attr.local == "ID" {
                if self.ids.contains_key(&attr.value) {
                    self.violations.push(
                        Violation::new(
                            codes::CVC_ID_2,
                            format!("Duplicate ID value '{}'", attr.value),
                        )
                        .at(element)
                        .on_attribute(attr.local.clone())
                        .with_actual(attr.value.clone()),
                    );
                } else {
                    self.ids
                        .insert(attr.value.clone(), ElementPointer::from_element(element));
                }
            }

            if !attr.value.is_empty() && IDREF_ATTRS.contains(&attr.local.as_str()) {
                self.idrefs
                    .push((attr.value.clone(), ElementPointer::from_element(element)));
            }
        }

        for child in element.child_elements() {
            self.collect_ids_and_refs(child);
        }
    }

    /// IDREF values must resolve to a collected ID
    fn check_idrefs(&mut self) {
        for (idref, pointer) in &self.idrefs {
            if !self.ids.contains_key(idref) {
                let mut violation = Violation::new(
                    codes::CVC_ID_1,
                    format!("There is no ID/IDREF binding for IDREF '{}'", idref),
                )
                .with_actual(idref.clone());
                violation.element = Some(pointer.clone());
                self.violations.push(violation);
            }
        }
    }

    /// Validate an element reached without a content-model context: look up
    /// its global declaration, report `cvc-elt.1` when there is none, and
    /// recurse so nested problems still surface
    fn validate_element(&mut self, element: &XmlElement) {
        let mut qname = QName::new(element.namespace.clone(), element.local.clone());
        let mut decl = self.schema.lookup_element(&qname);

        if decl.is_none() && qname.namespace.is_empty() && !self.schema.target_namespace.is_empty()
        {
            qname.namespace = self.schema.target_namespace.clone();
            decl = self.schema.lookup_element(&qname);
        }

        match decl {
            Some(decl) => {
                let found = validate_element_against_decl(element, decl, self.schema);
                self.violations.extend(found);
            }
            None => {
                self.violations.push(
                    Violation::new(
                        codes::CVC_ELT_1,
                        format!("Cannot find declaration for element '{}'", element.local),
                    )
                    .at(element)
                    .with_actual(element.local.clone()),
                );
                for child in element.child_elements() {
                    self.validate_element(child);
                }
            }
        }
    }
}

/// Gather the identity constraints declared on a schema's global elements
/// (including imported schemas) into a fresh per-document evaluator
fn collect_identity_constraints(schema: &Schema) -> IdentityConstraintValidator {
    let mut validator = IdentityConstraintValidator::new();
    add_constraints(schema, &mut validator);
    validator
}

fn add_constraints(schema: &Schema, validator: &mut IdentityConstraintValidator) {
    for decl in schema.element_decls.values() {
        for constraint in &decl.constraints {
            validator.add_constraint(constraint.clone());
        }
    }
    for imported in schema.imported_schemas.values() {
        add_constraints(imported, validator);
    }
}

/// Validate a single element against its declaration: element-level rules
/// first, then dispatch on the declared type. Used for elements matched by
/// the content model and by wildcards as well as for the document root.
pub fn validate_element_against_decl(
    element: &XmlElement,
    decl: &ElementDecl,
    schema: &Schema,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    if decl.abstract_ {
        violations.push(
            Violation::new(
                codes::CVC_ELT_2,
                format!(
                    "Element '{}' is abstract and cannot be used directly in instance documents",
                    element.local
                ),
            )
            .at(element)
            .with_actual(element.local.clone()),
        );
    }

    if let Some(nil) = element.attribute_ns(XSI_NAMESPACE, "nil") {
        if !decl.nillable {
            violations.push(
                Violation::new(
                    codes::CVC_ELT_3_1,
                    format!(
                        "Element '{}' has xsi:nil='{}' but is not nillable",
                        element.local, nil
                    ),
                )
                .at(element)
                .on_attribute("xsi:nil")
                .with_actual(nil),
            );
        }

        if (nil == "true" || nil == "1")
            && (!element.child_elements().is_empty() || element.has_significant_text())
        {
            violations.push(
                Violation::new(
                    codes::CVC_ELT_3_2_2,
                    format!("Element '{}' has xsi:nil='true' but has content", element.local),
                )
                .at(element)
                .on_attribute("xsi:nil")
                .with_actual(element.text_content().trim().to_string()),
            );
        }
    }

    // A fixed value constrains text content; mixed structures are exempt.
    if let Some(fixed) = &decl.fixed {
        if element.child_elements().is_empty() {
            let content = element.text_content();
            let content = content.trim();
            if content != fixed {
                violations.push(
                    Violation::new(
                        codes::CVC_ELT_5_2_2,
                        format!(
                            "Element '{}' must have fixed value '{}' but has '{}'",
                            decl.name.local, fixed, content
                        ),
                    )
                    .at(element)
                    .with_expected(vec![fixed.clone()])
                    .with_actual(content),
                );
            }
        }
    }

    match &decl.type_ref {
        Some(type_ref) => {
            violations.extend(validate_element_type(element, decl, type_ref, schema))
        }
        None => violations.extend(validate_attributes(element, None, schema)),
    }

    violations
}

fn validate_element_type(
    element: &XmlElement,
    decl: &ElementDecl,
    type_ref: &TypeRef,
    schema: &Schema,
) -> Vec<Violation> {
    match type_ref {
        TypeRef::Complex(ct) => validate_complex_typed_element(element, ct, schema),
        TypeRef::Simple(st) => validate_simple_typed_element(element, Some(decl), st, schema),
        TypeRef::Named(q) | TypeRef::Unresolved(q) => match schema.lookup_type(q) {
            Some(XsdType::Complex(ct)) => validate_complex_typed_element(element, ct, schema),
            Some(XsdType::Simple(st)) => {
                validate_simple_typed_element(element, Some(decl), st, schema)
            }
            // Unresolved name: built-in types validate through the
            // placeholder path, anything else is left to runtime tolerance.
            None => validate_simple_typed_element(
                element,
                Some(decl),
                &SimpleType::placeholder(q.clone()),
                schema,
            ),
        },
    }
}

/// Validate an element declared with a complex type: content model, mixed
/// and empty-content rules, then attributes
pub fn validate_complex_typed_element(
    element: &XmlElement,
    complex_type: &ComplexType,
    schema: &Schema,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    if complex_type.abstract_ {
        violations.push(
            Violation::new(
                codes::CVC_TYPE_2,
                format!(
                    "Element '{}' has abstract type '{}' which cannot be used directly",
                    element.local, complex_type.name.local
                ),
            )
            .at(element)
            .with_actual(complex_type.name.local.clone()),
        );
    }

    if complex_type.has_simple_content() {
        if !element.child_elements().is_empty() {
            violations.push(
                Violation::new(
                    codes::CVC_COMPLEX_TYPE_2_3,
                    "Element with simple content cannot have element children",
                )
                .at(element),
            );
        } else {
            violations.extend(complex_types::validate_complex_type(
                complex_type,
                element,
                schema,
            ));
        }
        violations.extend(validate_attributes(element, Some(complex_type), schema));
        return violations;
    }

    if !complex_type.mixed {
        for node in &element.nodes {
            if let XmlNode::Text(text) = node {
                if !text.trim().is_empty() {
                    violations.push(
                        Violation::new(
                            codes::CVC_COMPLEX_TYPE_2_3,
                            "Element cannot have text content (mixed='false')",
                        )
                        .at(element)
                        .with_actual(text.trim().to_string()),
                    );
                }
            }
        }
    }

    match &complex_type.content {
        Some(_) => {
            let mut found = complex_types::validate_complex_type(complex_type, element, schema);
            for violation in &mut found {
                if violation.element.is_none() {
                    violation.element = Some(ElementPointer::from_element(element));
                }
            }
            violations.extend(found);
        }
        None => {
            if !element.child_elements().is_empty() {
                violations.push(
                    Violation::new(codes::CVC_COMPLEX_TYPE_2_1, "Element must be empty")
                        .at(element),
                );
            }
        }
    }

    violations.extend(validate_attributes(element, Some(complex_type), schema));
    violations
}

/// Validate an element declared with a simple type: no element children,
/// text content against the type (applying the declaration default when the
/// element is empty), then attributes
fn validate_simple_typed_element(
    element: &XmlElement,
    decl: Option<&ElementDecl>,
    simple_type: &SimpleType,
    schema: &Schema,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    if !element.child_elements().is_empty() {
        violations.push(
            Violation::new(
                codes::CVC_COMPLEX_TYPE_2_3,
                "Element with simple type cannot have element children",
            )
            .at(element),
        );
    }

    let raw = element.text_content();
    let mut content = raw.trim().to_string();
    if content.is_empty() {
        if let Some(default) = decl.and_then(|d| d.default.as_deref()) {
            content = default.to_string();
        }
    }

    if !content.is_empty() {
        match validate_simple_value(&content, simple_type, schema) {
            Ok(()) => {}
            Err(SimpleTypeError::Facet(err)) => {
                let allowed = err.allowed.clone();
                violations.push(
                    Violation::new(codes::CVC_FACET_VALID, err.to_string())
                        .at(element)
                        .with_expected(allowed)
                        .with_actual(content.clone()),
                );
            }
            Err(err) => {
                violations.push(
                    Violation::new(codes::CVC_DATATYPE_VALID_1, err.to_string())
                        .at(element)
                        .with_actual(content.clone()),
                );
            }
        }
    }

    violations.extend(validate_attributes(element, None, schema));
    violations
}
