//! XML namespace handling
//!
//! Qualified names and prefix mappings. A [`QName`] pairs a namespace URI
//! with a local name; the empty namespace is legal and distinct from every
//! non-empty URI.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Qualified name: (namespace URI, local name), compared by value
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct QName {
    /// Namespace URI (empty string for no namespace)
    pub namespace: String,
    /// Local name
    pub local: String,
}

impl QName {
    /// Create a new QName
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local: local.into(),
        }
    }

    /// Create a QName in no namespace
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            namespace: String::new(),
            local: local.into(),
        }
    }

    /// True if this QName carries no local name at all
    pub fn is_empty(&self) -> bool {
        self.local.is_empty()
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.local)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.local)
        }
    }
}

/// Namespace context: prefix → URI bindings.
///
/// Holds the prefix declarations of a schema root. How names resolve
/// against it (which prefixes are pinned, what unprefixed and
/// unknown-prefix names mean) is the caller's policy, not this type's.
#[derive(Debug, Clone, Default)]
pub struct NamespaceContext {
    prefixes: HashMap<String, String>,
}

impl NamespaceContext {
    /// Create a new empty namespace context
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a prefix to a namespace URI
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Look up the namespace bound to a prefix
    pub fn get_namespace(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qname_display() {
        let qname = QName::new("http://example.com", "element");
        assert_eq!(qname.to_string(), "{http://example.com}element");

        let local = QName::local("element");
        assert_eq!(local.to_string(), "element");
    }

    #[test]
    fn test_empty_namespace_is_distinct() {
        let a = QName::local("item");
        let b = QName::new("http://example.com", "item");
        assert_ne!(a, b);
        assert_eq!(a, QName::new("", "item"));
    }

    #[test]
    fn test_namespace_context_lookup() {
        let mut ctx = NamespaceContext::new();
        ctx.add_prefix("xs", "http://www.w3.org/2001/XMLSchema");

        assert_eq!(
            ctx.get_namespace("xs"),
            Some("http://www.w3.org/2001/XMLSchema")
        );
        assert_eq!(ctx.get_namespace("unknown"), None);
    }
}
