//! XML document tree
//!
//! A namespace-aware, owned XML tree parsed with `quick-xml`. The validator
//! walks this tree: per element it needs the namespace URI, local name,
//! ordered child nodes (text nodes distinguishable from elements), ordered
//! attributes and a source position used only for diagnostics.

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::namespaces::QName;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Source position of a node: line and column are 1-based
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Position {
    /// 1-based line number
    pub line: u32,
    /// 1-based column number
    pub column: u32,
    /// Byte offset into the source
    pub offset: u64,
}

/// Attribute on an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Namespace URI (empty for unprefixed attributes)
    pub namespace: String,
    /// Local name
    pub local: String,
    /// Qualified name as written in the source
    pub qualified_name: String,
    /// Attribute value (entity references resolved)
    pub value: String,
}

/// Namespace declaration appearing on an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    /// Declared prefix (empty string for the default namespace)
    pub prefix: String,
    /// Bound namespace URI
    pub uri: String,
}

/// Child node of an element
#[derive(Debug, Clone)]
pub enum XmlNode {
    /// Element child
    Element(XmlElement),
    /// Text or CDATA content
    Text(String),
}

/// Element in the document tree
#[derive(Debug, Clone)]
pub struct XmlElement {
    /// Namespace URI (empty for no namespace)
    pub namespace: String,
    /// Local name
    pub local: String,
    /// Ordered attributes, namespace declarations excluded
    pub attributes: Vec<XmlAttribute>,
    /// Namespace declarations written on this element
    pub namespace_decls: Vec<NamespaceDecl>,
    /// Ordered child nodes
    pub nodes: Vec<XmlNode>,
    /// Source position of the start tag
    pub position: Position,
}

impl XmlElement {
    fn new(namespace: String, local: String, position: Position) -> Self {
        Self {
            namespace,
            local,
            attributes: Vec::new(),
            namespace_decls: Vec::new(),
            nodes: Vec::new(),
            position,
        }
    }

    /// The element's qualified name as a [`QName`]
    pub fn qname(&self) -> QName {
        QName::new(self.namespace.clone(), self.local.clone())
    }

    /// Ordered element children
    pub fn child_elements(&self) -> Vec<&XmlElement> {
        self.nodes
            .iter()
            .filter_map(|n| match n {
                XmlNode::Element(e) => Some(e),
                XmlNode::Text(_) => None,
            })
            .collect()
    }

    /// Concatenated direct text children (no descendant text)
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            if let XmlNode::Text(t) = node {
                out.push_str(t);
            }
        }
        out
    }

    /// True if any direct text child contains non-whitespace characters
    pub fn has_significant_text(&self) -> bool {
        self.nodes.iter().any(|n| match n {
            XmlNode::Text(t) => !t.trim().is_empty(),
            XmlNode::Element(_) => false,
        })
    }

    /// First attribute value with the given local name, any namespace
    pub fn attribute(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.local == local)
            .map(|a| a.value.as_str())
    }

    /// Attribute value with the given namespace and local name
    pub fn attribute_ns(&self, namespace: &str, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace == namespace && a.local == local)
            .map(|a| a.value.as_str())
    }

    /// Child elements with the given local name
    pub fn find_children(&self, local: &str) -> Vec<&XmlElement> {
        self.child_elements()
            .into_iter()
            .filter(|e| e.local == local)
            .collect()
    }
}

/// Parsed XML document
#[derive(Debug, Clone, Default)]
pub struct XmlDocument {
    /// Root element, if the document has one
    pub root: Option<XmlElement>,
}

/// Offsets of line starts, for mapping byte offsets to line/column
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut starts = vec![0usize];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                starts.push(i + 1);
            }
        }
        Self { starts }
    }

    fn position(&self, offset: usize) -> Position {
        let line = match self.starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        Position {
            line: (line + 1) as u32,
            column: (offset - self.starts[line] + 1) as u32,
            offset: offset as u64,
        }
    }
}

/// Stack of in-scope namespace bindings
struct NamespaceScope {
    frames: Vec<HashMap<String, String>>,
    defaults: Vec<Option<String>>,
}

impl NamespaceScope {
    fn new() -> Self {
        Self {
            frames: vec![HashMap::new()],
            defaults: vec![None],
        }
    }

    fn push(&mut self, bindings: &[NamespaceDecl]) {
        let mut frame = HashMap::new();
        let mut default = None;
        for decl in bindings {
            if decl.prefix.is_empty() {
                default = Some(decl.uri.clone());
            } else {
                frame.insert(decl.prefix.clone(), decl.uri.clone());
            }
        }
        self.frames.push(frame);
        self.defaults
            .push(default.or_else(|| self.defaults.last().cloned().flatten()));
    }

    fn pop(&mut self) {
        self.frames.pop();
        self.defaults.pop();
    }

    fn lookup(&self, prefix: &str) -> Option<&str> {
        for frame in self.frames.iter().rev() {
            if let Some(uri) = frame.get(prefix) {
                return Some(uri.as_str());
            }
        }
        None
    }

    fn default_namespace(&self) -> &str {
        self.defaults
            .last()
            .and_then(|d| d.as_deref())
            .unwrap_or("")
    }
}

impl XmlDocument {
    /// Parse a document from a string with default limits
    pub fn parse(xml: &str) -> Result<Self> {
        Self::parse_with_limits(xml, &Limits::default())
    }

    /// Parse a document from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Resource(format!(
                "Failed to read file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::parse(&content)
    }

    /// Parse a document from a string, enforcing the given limits
    pub fn parse_with_limits(xml: &str, limits: &Limits) -> Result<Self> {
        limits.check_xml_size(xml.len())?;

        let index = LineIndex::new(xml);
        let mut reader = Reader::from_str(xml);
        let mut scope = NamespaceScope::new();
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut doc = XmlDocument::default();

        loop {
            let event_offset = reader.buffer_position();
            match reader.read_event() {
                Ok(Event::Start(start)) => {
                    limits.check_xml_depth(stack.len() + 1)?;
                    let element =
                        parse_start(&start, &mut scope, index.position(event_offset), limits)?;
                    scope.push(&element.namespace_decls);
                    stack.push(element);
                }
                Ok(Event::End(_)) => {
                    scope.pop();
                    if let Some(finished) = stack.pop() {
                        match stack.last_mut() {
                            Some(parent) => parent.nodes.push(XmlNode::Element(finished)),
                            None => doc.root = Some(finished),
                        }
                    }
                }
                Ok(Event::Empty(start)) => {
                    let element =
                        parse_start(&start, &mut scope, index.position(event_offset), limits)?;
                    match stack.last_mut() {
                        Some(parent) => parent.nodes.push(XmlNode::Element(element)),
                        None => doc.root = Some(element),
                    }
                }
                Ok(Event::Text(text)) => {
                    if let Some(current) = stack.last_mut() {
                        let content = text
                            .unescape()
                            .map_err(|e| Error::Xml(format!("Failed to unescape text: {}", e)))?;
                        current.nodes.push(XmlNode::Text(content.into_owned()));
                    }
                }
                Ok(Event::CData(data)) => {
                    if let Some(current) = stack.last_mut() {
                        let content = String::from_utf8_lossy(data.as_ref()).into_owned();
                        current.nodes.push(XmlNode::Text(content));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!(
                        "Error parsing XML at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {} // comments, processing instructions, DTD
            }
        }

        if !stack.is_empty() {
            return Err(Error::Xml("unexpected end of document".to_string()));
        }

        Ok(doc)
    }

    /// Get the root element
    pub fn root(&self) -> Option<&XmlElement> {
        self.root.as_ref()
    }
}

fn parse_start(
    start: &BytesStart,
    scope: &mut NamespaceScope,
    position: Position,
    limits: &Limits,
) -> Result<XmlElement> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| Error::Xml(format!("Invalid element name: {}", e)))?
        .to_string();

    // Collect attributes and namespace declarations first: declarations on
    // this element are in scope for its own name.
    let mut raw_attrs: Vec<(String, String)> = Vec::new();
    let mut decls: Vec<NamespaceDecl> = Vec::new();

    for attr_result in start.attributes() {
        let attr =
            attr_result.map_err(|e| Error::Xml(format!("Failed to parse attribute: {}", e)))?;
        let attr_name = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| Error::Xml(format!("Invalid attribute name: {}", e)))?
            .to_string();
        let attr_value = attr
            .unescape_value()
            .map_err(|e| Error::Xml(format!("Failed to unescape attribute value: {}", e)))?
            .into_owned();

        if attr_name == "xmlns" {
            decls.push(NamespaceDecl {
                prefix: String::new(),
                uri: attr_value,
            });
        } else if let Some(prefix) = attr_name.strip_prefix("xmlns:") {
            decls.push(NamespaceDecl {
                prefix: prefix.to_string(),
                uri: attr_value,
            });
        } else {
            raw_attrs.push((attr_name, attr_value));
        }
    }

    limits.check_attributes(raw_attrs.len())?;

    scope.push(&decls);
    let (elem_ns, elem_local) = match name.split_once(':') {
        Some((prefix, local)) => (
            scope.lookup(prefix).unwrap_or("").to_string(),
            local.to_string(),
        ),
        None => (scope.default_namespace().to_string(), name.clone()),
    };

    let mut element = XmlElement::new(elem_ns, elem_local, position);
    element.namespace_decls = decls;

    for (qualified, value) in raw_attrs {
        // Unprefixed attributes are in no namespace per the XML spec.
        let (ns, local) = match qualified.split_once(':') {
            Some((prefix, local)) => (
                scope.lookup(prefix).unwrap_or("").to_string(),
                local.to_string(),
            ),
            None => (String::new(), qualified.clone()),
        };
        element.attributes.push(XmlAttribute {
            namespace: ns,
            local,
            qualified_name: qualified,
            value,
        });
    }

    scope.pop();
    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_document() {
        let doc = XmlDocument::parse("<root><child>text</child></root>").unwrap();
        let root = doc.root().unwrap();
        assert_eq!(root.local, "root");
        let children = root.child_elements();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].local, "child");
        assert_eq!(children[0].text_content(), "text");
    }

    #[test]
    fn test_namespace_resolution() {
        let xml = r#"<a:root xmlns:a="http://a.example" xmlns="http://d.example">
            <child a:attr="1" plain="2"/>
        </a:root>"#;
        let doc = XmlDocument::parse(xml).unwrap();
        let root = doc.root().unwrap();
        assert_eq!(root.namespace, "http://a.example");

        let child = &root.child_elements()[0];
        assert_eq!(child.namespace, "http://d.example");
        assert_eq!(child.attribute_ns("http://a.example", "attr"), Some("1"));
        // Unprefixed attributes stay in no namespace.
        assert_eq!(child.attribute_ns("", "plain"), Some("2"));
    }

    #[test]
    fn test_namespace_declarations_are_not_attributes() {
        let xml = r#"<root xmlns="http://d.example" xmlns:p="http://p.example" id="r"/>"#;
        let doc = XmlDocument::parse(xml).unwrap();
        let root = doc.root().unwrap();
        assert_eq!(root.attributes.len(), 1);
        assert_eq!(root.namespace_decls.len(), 2);
    }

    #[test]
    fn test_text_and_element_nodes_distinguished() {
        let doc = XmlDocument::parse("<r>before<e/>after</r>").unwrap();
        let root = doc.root().unwrap();
        assert_eq!(root.nodes.len(), 3);
        assert!(matches!(root.nodes[0], XmlNode::Text(_)));
        assert!(matches!(root.nodes[1], XmlNode::Element(_)));
        assert_eq!(root.text_content(), "beforeafter");
    }

    #[test]
    fn test_positions_track_lines() {
        let xml = "<root>\n  <child/>\n</root>";
        let doc = XmlDocument::parse(xml).unwrap();
        let root = doc.root().unwrap();
        assert_eq!(root.position.line, 1);
        let child = &root.child_elements()[0];
        assert_eq!(child.position.line, 2);
    }

    #[test]
    fn test_depth_limit() {
        let mut limits = Limits::default();
        limits.max_xml_depth = 2;
        let result = XmlDocument::parse_with_limits("<a><b><c/></b></a>", &limits);
        assert!(result.is_err());
    }

    #[test]
    fn test_prefix_rebinding_in_nested_scope() {
        let xml = r#"<root xmlns:p="http://one"><p:a/><inner xmlns:p="http://two"><p:a/></inner></root>"#;
        let doc = XmlDocument::parse(xml).unwrap();
        let root = doc.root().unwrap();
        let outer = &root.child_elements()[0];
        assert_eq!(outer.namespace, "http://one");
        let inner = root.child_elements()[1].child_elements()[0].clone();
        assert_eq!(inner.namespace, "http://two");
    }
}
