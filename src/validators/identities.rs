//! Identity constraints: `xs:key`, `xs:keyref`, `xs:unique`
//!
//! Constraints select nodes with an XPath-subset selector, extract field
//! values per node, and enforce uniqueness or referential integrity over the
//! `|`-joined composite keys. The validator owns per-document state and is
//! discarded after each validation call.
//!
//! The XPath subset: absolute paths, `.//` and `//` descendant prefixes,
//! `/`-separated element steps, `.` for self; fields additionally allow
//! `@attr`, `text()` and `elem/@attr`. Namespace prefixes are stripped.

use crate::documents::{XmlDocument, XmlElement};
use crate::namespaces::QName;
use std::collections::HashMap;

use super::exceptions::{codes, Violation};

/// Kind of identity constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityConstraintKind {
    /// `xs:key`: unique and non-empty
    Key,
    /// `xs:keyref`: must match a referenced key/unique
    Keyref,
    /// `xs:unique`: unique when present
    Unique,
}

impl IdentityConstraintKind {
    fn as_str(&self) -> &'static str {
        match self {
            IdentityConstraintKind::Key => "key",
            IdentityConstraintKind::Keyref => "keyref",
            IdentityConstraintKind::Unique => "unique",
        }
    }
}

/// A key, keyref or unique declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConstraint {
    /// Constraint name, unique per schema
    pub name: String,
    /// Constraint kind
    pub kind: IdentityConstraintKind,
    /// Selector XPath (subset)
    pub selector: String,
    /// Ordered field XPaths (subset)
    pub fields: Vec<String>,
    /// Referenced key/unique, for keyref
    pub refer: Option<QName>,
}

/// Per-document identity constraint evaluator
#[derive(Debug, Default)]
pub struct IdentityConstraintValidator {
    constraints: Vec<IdentityConstraint>,
    /// constraint name → composite key → number of occurrences
    key_values: HashMap<String, HashMap<String, usize>>,
}

impl IdentityConstraintValidator {
    /// Create an empty validator
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constraint
    pub fn add_constraint(&mut self, constraint: IdentityConstraint) {
        self.key_values
            .insert(constraint.name.clone(), HashMap::new());
        self.constraints.push(constraint);
    }

    /// True when no constraints are registered
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Evaluate all registered constraints over a document
    pub fn validate(&mut self, doc: &XmlDocument) -> Vec<Violation> {
        let mut violations = Vec::new();
        let root = match doc.root() {
            Some(root) => root,
            None => return violations,
        };

        // Pass A: collect key/unique values, reporting duplicates and
        // empty key fields.
        for constraint in &self.constraints {
            if constraint.kind == IdentityConstraintKind::Keyref {
                continue;
            }
            let selected = evaluate_selector(root, &constraint.selector);
            let values = self.key_values.entry(constraint.name.clone()).or_default();

            for node in selected {
                let field_values = extract_field_values(node, &constraint.fields);
                if field_values.is_empty() {
                    continue;
                }

                if constraint.kind == IdentityConstraintKind::Key {
                    for (i, value) in field_values.iter().enumerate() {
                        if value.is_empty() {
                            violations.push(
                                Violation::new(
                                    codes::CVC_IDENTITY_CONSTRAINT_4_2_2,
                                    format!(
                                        "Key constraint '{}' field {} cannot be null",
                                        constraint.name,
                                        i + 1
                                    ),
                                )
                                .at(node),
                            );
                        }
                    }
                }

                let key = field_values.join("|");
                let count = values.entry(key.clone()).or_insert(0);
                *count += 1;
                if *count > 1 {
                    violations.push(
                        Violation::new(
                            codes::CVC_IDENTITY_CONSTRAINT_4_1,
                            format!(
                                "Duplicate {} constraint '{}' value: {}",
                                constraint.kind.as_str(),
                                constraint.name,
                                key
                            ),
                        )
                        .at(node)
                        .with_actual(key),
                    );
                }
            }
        }

        // Pass B: resolve keyrefs against the collected key sets.
        for constraint in &self.constraints {
            if constraint.kind != IdentityConstraintKind::Keyref {
                continue;
            }

            let refer_local = constraint
                .refer
                .as_ref()
                .map(|q| q.local.clone())
                .unwrap_or_default();
            let referenced = self
                .constraints
                .iter()
                .find(|c| c.kind != IdentityConstraintKind::Keyref && c.name == refer_local);

            let referenced = match referenced {
                Some(r) => r,
                None => {
                    violations.push(Violation::new(
                        codes::SRC_IDENTITY_CONSTRAINT_2_2_2,
                        format!(
                            "Keyref '{}' refers to unknown constraint '{}'",
                            constraint.name, refer_local
                        ),
                    ));
                    continue;
                }
            };

            let Some(keys) = self.key_values.get(&referenced.name) else {
                continue;
            };
            for node in evaluate_selector(root, &constraint.selector) {
                let field_values = extract_field_values(node, &constraint.fields);
                if field_values.is_empty() {
                    continue;
                }
                let key = field_values.join("|");
                if !keys.contains_key(&key) {
                    violations.push(
                        Violation::new(
                            codes::CVC_IDENTITY_CONSTRAINT_4_3,
                            format!(
                                "Keyref '{}' value '{}' does not match any {} '{}'",
                                constraint.name,
                                key,
                                referenced.kind.as_str(),
                                referenced.name
                            ),
                        )
                        .at(node)
                        .with_actual(key),
                    );
                }
            }
        }

        violations
    }
}

/// Evaluate a selector XPath from a context element
pub fn evaluate_selector<'a>(root: &'a XmlElement, xpath: &str) -> Vec<&'a XmlElement> {
    let mut xpath = strip_prefixes(xpath.trim());

    if let Some(rest) = xpath.strip_prefix('/').map(|s| s.to_string()) {
        if !xpath.starts_with("//") {
            xpath = rest;
        }
    }

    let (descendants, path) = if let Some(rest) = xpath.strip_prefix(".//") {
        (true, rest.to_string())
    } else if let Some(rest) = xpath.strip_prefix("//") {
        (true, rest.to_string())
    } else {
        (false, xpath)
    };

    let steps: Vec<&str> = path.split('/').collect();
    let mut results = Vec::new();

    if descendants {
        let mut first_matches = Vec::new();
        find_matching_descendants(root, steps[0], &mut first_matches);
        if steps.len() > 1 {
            for elem in first_matches {
                find_matching_children(elem, &steps[1..], &mut results);
            }
        } else {
            results = first_matches;
        }
    } else {
        find_matching_children(root, &steps, &mut results);
    }

    results
}

fn find_matching_children<'a>(
    element: &'a XmlElement,
    steps: &[&str],
    results: &mut Vec<&'a XmlElement>,
) {
    let Some((step, rest)) = steps.split_first() else {
        results.push(element);
        return;
    };

    if *step == "." {
        find_matching_children(element, rest, results);
        return;
    }

    for child in element.find_children(step) {
        if rest.is_empty() {
            results.push(child);
        } else {
            find_matching_children(child, rest, results);
        }
    }
}

fn find_matching_descendants<'a>(
    element: &'a XmlElement,
    name: &str,
    results: &mut Vec<&'a XmlElement>,
) {
    if element.local == name {
        results.push(element);
    }
    for child in element.child_elements() {
        find_matching_descendants(child, name, results);
    }
}

/// Extract one string per field XPath from a selected node
pub fn extract_field_values(node: &XmlElement, fields: &[String]) -> Vec<String> {
    fields
        .iter()
        .map(|field| evaluate_field(node, field))
        .collect()
}

fn evaluate_field(node: &XmlElement, xpath: &str) -> String {
    let xpath = xpath.trim();

    if let Some(attr_name) = xpath.strip_prefix('@') {
        return node.attribute(attr_name).unwrap_or_default().to_string();
    }

    if xpath == "." || xpath == "text()" {
        return node.text_content();
    }

    // element path ending in an attribute: a/b/@attr
    if let Some((path, attr_name)) = xpath.split_once("/@") {
        let elements = evaluate_selector(node, path);
        return elements
            .first()
            .and_then(|e| e.attribute(attr_name))
            .unwrap_or_default()
            .to_string();
    }

    // plain element path: take the first match's text content
    if !xpath.contains('@') && !xpath.contains("()") {
        let elements = evaluate_selector(node, xpath);
        if let Some(first) = elements.first() {
            return first.text_content();
        }
    }

    String::new()
}

/// Strip namespace prefixes from every non-attribute step of an XPath
fn strip_prefixes(xpath: &str) -> String {
    xpath
        .split('/')
        .map(|step| {
            if step.starts_with('@') {
                step.to_string()
            } else {
                match step.find(':') {
                    Some(idx) if idx > 0 => step[idx + 1..].to_string(),
                    _ => step.to_string(),
                }
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
