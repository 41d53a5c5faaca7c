//! Schema loading with import/include support
//!
//! The loader acquires schema documents by location or by namespace,
//! recursively processes `xs:import`/`xs:include`, and merges everything
//! into one combined schema. Cycle detection runs over resolved locations:
//! revisiting a location that is still being loaded is a hard error. Failed
//! imports are logged and skipped; failed includes abort the load.
//!
//! One mutex guards the `loaded`/`loading` maps for the whole of a
//! recursive load so cycle detection stays consistent.

use crate::documents::XmlDocument;
use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::validators::schemas::{Import, Schema};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A namespace declaration extracted from an instance document root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceBinding {
    /// Declared prefix (empty for the default namespace)
    pub prefix: String,
    /// Bound namespace URI
    pub uri: String,
}

/// Function that produces a schema for a matched namespace declaration
pub type SchemaLoaderFn = Box<dyn Fn(&NamespaceBinding) -> Result<Schema> + Send + Sync>;

/// A regex pattern paired with a loader function, matched against namespace
/// URIs when loading by namespace
pub struct PatternLoader {
    /// Pattern source, matched against the namespace URI
    pub pattern: String,
    regex: Regex,
    loader: SchemaLoaderFn,
}

impl PatternLoader {
    /// Create a pattern loader; fails if the pattern does not compile
    pub fn new(pattern: impl Into<String>, loader: SchemaLoaderFn) -> Result<Self> {
        let pattern = pattern.into();
        let regex = Regex::new(&pattern)
            .map_err(|e| Error::Resource(format!("invalid pattern {}: {}", pattern, e)))?;
        Ok(Self {
            pattern,
            regex,
            loader,
        })
    }
}

/// Configuration for a [`SchemaLoader`]
#[derive(Default)]
pub struct SchemaLoaderConfig {
    /// Base directory for resolving relative locations
    pub base_dir: PathBuf,
    /// Pattern-based loaders for namespace resolution
    pub loaders: Vec<PatternLoader>,
    /// Resource limits applied to fetched documents
    pub limits: Limits,
    /// HTTP client used for `http(s)://` locations
    #[cfg(feature = "http")]
    pub http_client: Option<reqwest::blocking::Client>,
}

#[derive(Default)]
struct LoaderState {
    /// Loaded schemas by resolved location (also keyed by namespace for
    /// pattern-loaded schemas)
    loaded: HashMap<String, Schema>,
    /// Locations currently being loaded, for cycle detection
    loading: HashSet<String>,
}

/// Loads schemas with import/include processing and merging
pub struct SchemaLoader {
    base_dir: PathBuf,
    loaders: Vec<PatternLoader>,
    limits: Limits,
    state: Mutex<LoaderState>,
    #[cfg(feature = "http")]
    http_client: reqwest::blocking::Client,
}

impl SchemaLoader {
    /// Create a loader from a configuration
    pub fn new(config: SchemaLoaderConfig) -> Self {
        Self {
            base_dir: config.base_dir,
            loaders: config.loaders,
            limits: config.limits,
            state: Mutex::new(LoaderState::default()),
            #[cfg(feature = "http")]
            http_client: config.http_client.unwrap_or_default(),
        }
    }

    /// Convenience constructor with just a base directory
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self::new(SchemaLoaderConfig {
            base_dir: base_dir.into(),
            ..SchemaLoaderConfig::default()
        })
    }

    /// Load a schema document and everything it imports or includes,
    /// returning the merged and resolved combined schema
    pub fn load_with_imports(&self, location: &str) -> Result<Schema> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        let abs_location = self.resolve_location(location)?;
        let main = self.load_recursive(&mut state, &abs_location, 0)?;

        let mut combined = Schema {
            target_namespace: main.target_namespace.clone(),
            ..Schema::default()
        };

        merge_schema(&mut combined, &main, &abs_location);
        for (loc, schema) in state.loaded.iter() {
            merge_schema(&mut combined, schema, loc);
        }

        combined.resolve_references();
        Ok(combined)
    }

    /// Load a schema from source text. The text is written to a temporary
    /// file (removed when loading finishes) so relative includes resolve
    /// against the configured base directory.
    pub fn load_from_string(&self, content: &str) -> Result<Schema> {
        let mut file = tempfile::Builder::new()
            .prefix("schema-")
            .suffix(".xsd")
            .tempfile()?;
        file.write_all(content.as_bytes())?;
        file.flush()?;

        let path = file.path().to_string_lossy().to_string();
        self.load_with_imports(&path)
        // `file` drops here and unlinks the temporary file.
    }

    /// Load schemas for an instance document's namespace declarations using
    /// the configured pattern loaders
    pub fn load_from_namespaces(
        &self,
        namespaces: &HashMap<String, NamespaceBinding>,
    ) -> Result<Schema> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        let mut combined = Schema::default();
        let mut main_selected = false;
        let mut success_count = 0;

        for binding in namespaces.values() {
            if is_builtin_namespace(&binding.uri) {
                continue;
            }

            let schema = match self.load_for_namespace(&mut state, binding) {
                Ok(schema) => schema,
                Err(e) => {
                    tracing::info!(namespace = %binding.uri, error = %e,
                        "could not load schema for namespace");
                    continue;
                }
            };

            success_count += 1;
            if !main_selected {
                combined.target_namespace = schema.target_namespace.clone();
                main_selected = true;
            }
            merge_schema(&mut combined, &schema, &binding.uri);
        }

        if success_count == 0 {
            return Err(Error::Resource(
                "could not load any schemas from document namespaces".to_string(),
            ));
        }

        combined.resolve_references();
        Ok(combined)
    }

    fn load_for_namespace(
        &self,
        state: &mut LoaderState,
        binding: &NamespaceBinding,
    ) -> Result<Schema> {
        if let Some(schema) = state.loaded.get(&binding.uri) {
            return Ok(schema.clone());
        }

        for pattern_loader in &self.loaders {
            if !pattern_loader.regex.is_match(&binding.uri) {
                continue;
            }
            match (pattern_loader.loader)(binding) {
                Ok(schema) => {
                    state.loaded.insert(binding.uri.clone(), schema.clone());
                    return Ok(schema);
                }
                Err(_) => continue, // try the next loader
            }
        }

        Err(Error::Resource(format!(
            "no loader found for namespace: {}",
            binding.uri
        )))
    }

    fn load_recursive(
        &self,
        state: &mut LoaderState,
        location: &str,
        depth: usize,
    ) -> Result<Schema> {
        let abs_location = self.resolve_location(location)?;

        if let Some(schema) = state.loaded.get(&abs_location) {
            return Ok(schema.clone());
        }

        if state.loading.contains(&abs_location) {
            return Err(Error::Resource(format!(
                "circular dependency detected: {}",
                abs_location
            )));
        }

        self.limits.check_schema_depth(depth)?;

        state.loading.insert(abs_location.clone());
        let result = self.load_document_graph(state, &abs_location, depth);
        state.loading.remove(&abs_location);
        result
    }

    fn load_document_graph(
        &self,
        state: &mut LoaderState,
        abs_location: &str,
        depth: usize,
    ) -> Result<Schema> {
        let doc = self.load_document(abs_location).map_err(|e| {
            Error::Resource(format!("failed to load schema from {}: {}", abs_location, e))
        })?;

        let schema = Schema::compile(&doc).map_err(|e| {
            Error::Resource(format!(
                "failed to parse schema from {}: {}",
                abs_location, e
            ))
        })?;

        // Imports: failures are logged and skipped.
        for import in &schema.imports {
            if import.schema_location.is_empty() {
                continue;
            }
            let import_location = resolve_relative(&import.schema_location, abs_location);
            if let Err(e) = self.load_recursive(state, &import_location, depth + 1) {
                tracing::error!(location = %import.schema_location, error = %e,
                    "failed to import schema");
            }
        }

        // Includes: failures are fatal.
        for include_location in find_includes(&doc) {
            let resolved = resolve_relative(&include_location, abs_location);
            self.load_recursive(state, &resolved, depth + 1)
                .map_err(|e| {
                    Error::Resource(format!("failed to include {}: {}", include_location, e))
                })?;
        }

        // Memoized only once the whole subgraph loaded, so a revisit of an
        // in-progress location is caught as a cycle rather than served from
        // the cache.
        state
            .loaded
            .insert(abs_location.to_string(), schema.clone());

        Ok(schema)
    }

    /// Resolve a location to an absolute path or URL
    fn resolve_location(&self, location: &str) -> Result<String> {
        if is_url(location) {
            return Ok(location.to_string());
        }

        let path = Path::new(location);
        if path.is_absolute() {
            return Ok(location.to_string());
        }

        let base = if self.base_dir.as_os_str().is_empty() {
            std::env::current_dir()?
        } else if self.base_dir.is_absolute() {
            self.base_dir.clone()
        } else {
            std::env::current_dir()?.join(&self.base_dir)
        };

        Ok(base.join(location).to_string_lossy().into_owned())
    }

    /// Fetch and parse an XML document from a file path or URL
    fn load_document(&self, location: &str) -> Result<XmlDocument> {
        if is_url(location) {
            return self.load_remote_document(location);
        }

        let content = std::fs::read_to_string(location)
            .map_err(|e| Error::Resource(format!("failed to open {}: {}", location, e)))?;
        self.limits.check_xml_size(content.len())?;
        XmlDocument::parse_with_limits(&content, &self.limits)
    }

    #[cfg(feature = "http")]
    fn load_remote_document(&self, location: &str) -> Result<XmlDocument> {
        let response = self
            .http_client
            .get(location)
            .send()
            .map_err(|e| Error::Resource(format!("failed to fetch {}: {}", location, e)))?;

        if !response.status().is_success() {
            return Err(Error::Resource(format!(
                "HTTP {} from {}",
                response.status().as_u16(),
                location
            )));
        }

        let content = response
            .text()
            .map_err(|e| Error::Resource(format!("failed to read {}: {}", location, e)))?;
        self.limits.check_xml_size(content.len())?;
        XmlDocument::parse_with_limits(&content, &self.limits)
    }

    #[cfg(not(feature = "http"))]
    fn load_remote_document(&self, location: &str) -> Result<XmlDocument> {
        Err(Error::Resource(format!(
            "cannot fetch {}: HTTP loading requires the 'http' feature",
            location
        )))
    }
}

/// Extract the `xmlns`/`xmlns:*` declarations from a document's root
pub fn extract_namespaces(doc: &XmlDocument) -> HashMap<String, NamespaceBinding> {
    let mut namespaces = HashMap::new();
    if let Some(root) = doc.root() {
        for decl in &root.namespace_decls {
            namespaces.insert(
                decl.prefix.clone(),
                NamespaceBinding {
                    prefix: decl.prefix.clone(),
                    uri: decl.uri.clone(),
                },
            );
        }
    }
    namespaces
}

fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

fn is_builtin_namespace(uri: &str) -> bool {
    matches!(
        uri,
        "http://www.w3.org/2001/XMLSchema"
            | "http://www.w3.org/2001/XMLSchema-instance"
            | "http://www.w3.org/XML/1998/namespace"
            | "http://www.w3.org/2000/xmlns/"
    )
}

/// Find `xs:include` schemaLocation values on a schema document root
fn find_includes(doc: &XmlDocument) -> Vec<String> {
    let mut includes = Vec::new();
    if let Some(root) = doc.root() {
        for child in root.child_elements() {
            if child.namespace == crate::validators::builtins::XSD_NAMESPACE
                && child.local == "include"
            {
                if let Some(location) = child.attribute("schemaLocation") {
                    if !location.is_empty() {
                        includes.push(location.to_string());
                    }
                }
            }
        }
    }
    includes
}

/// Resolve a relative location against the location of the referencing
/// document
fn resolve_relative(relative: &str, base: &str) -> String {
    if is_url(relative) || Path::new(relative).is_absolute() {
        return relative.to_string();
    }

    if is_url(base) {
        if let Ok(base_url) = url::Url::parse(base) {
            if let Ok(joined) = base_url.join(relative) {
                return joined.to_string();
            }
        }
        return relative.to_string();
    }

    match Path::new(base).parent() {
        Some(dir) => dir.join(relative).to_string_lossy().into_owned(),
        None => relative.to_string(),
    }
}

/// Merge a loaded schema into the combined schema.
///
/// Components keep their original target namespace; on a name clash the
/// first-seen declaration wins. Substitution-group buckets deep-merge with
/// deduplication. The source schema is also indexed under its location.
fn merge_schema(combined: &mut Schema, source: &Schema, location: &str) {
    combined
        .imported_schemas
        .insert(location.to_string(), source.clone());

    for (qname, decl) in &source.element_decls {
        combined
            .element_decls
            .entry(qname.clone())
            .or_insert_with(|| decl.clone());
    }
    for (qname, ty) in &source.type_defs {
        combined
            .type_defs
            .entry(qname.clone())
            .or_insert_with(|| ty.clone());
    }
    for (qname, group) in &source.attribute_groups {
        combined
            .attribute_groups
            .entry(qname.clone())
            .or_insert_with(|| group.clone());
    }
    for (qname, group) in &source.groups {
        combined
            .groups
            .entry(qname.clone())
            .or_insert_with(|| group.clone());
    }

    for (head, members) in &source.substitution_groups {
        let bucket = combined
            .substitution_groups
            .entry(head.clone())
            .or_default();
        for member in members {
            if !bucket.contains(member) {
                bucket.push(member.clone());
            }
        }
    }

    for import in &source.imports {
        let duplicate = combined.imports.iter().any(|existing| {
            existing.namespace == import.namespace
                && existing.schema_location == import.schema_location
        });
        if !duplicate {
            combined.imports.push(Import {
                namespace: import.namespace.clone(),
                schema_location: import.schema_location.clone(),
            });
        }
    }
}
