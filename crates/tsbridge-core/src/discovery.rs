//! Type discovery collaborators.
//!
//! The generator never scans anything itself: a [`TypeDiscovery`] hands it the
//! candidate descriptors for the requested namespaces, plus reference-only
//! descriptors that may be pulled in by exploration or member resolution.
//!
//! [`ManifestDiscovery`] reads JSON type manifests, the shape a bytecode
//! reader or a source parser would emit:
//!
//! ```json
//! { "format_version": 1, "types": [ { "name": "app.model.User", "kind": "class" } ] }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::descriptor::{TypeDescriptor, TypeKind};
use crate::error::{GeneratorError, GeneratorResult};

/// Manifest format understood by [`ManifestDiscovery`].
pub const MANIFEST_FORMAT_VERSION: u32 = 1;

/// A candidate that could not be loaded. The run continues without it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    /// Identity when known, otherwise the entry position
    pub name: String,
    pub reason: String,
}

/// Result of a discovery pass.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Types inside the requested namespaces, nested types flattened
    pub candidates: Vec<TypeDescriptor>,
    /// Types outside the requested namespaces
    pub references: Vec<TypeDescriptor>,
    pub failures: Vec<LoadFailure>,
}

impl Discovery {
    /// Partition descriptors by namespace and flatten nested types.
    ///
    /// Annotation types are dropped.
    pub fn partition(descriptors: Vec<TypeDescriptor>, namespaces: &[String]) -> Self {
        let mut discovery = Discovery::default();
        for descriptor in flatten(descriptors) {
            if descriptor.kind == TypeKind::Annotation {
                debug!(type_name = %descriptor.name, "skipping annotation type");
                continue;
            }
            if in_namespaces(&descriptor.name, namespaces) {
                discovery.candidates.push(descriptor);
            } else {
                discovery.references.push(descriptor);
            }
        }
        discovery
    }
}

/// Capability to enumerate candidate types.
pub trait TypeDiscovery {
    /// Discover types for `namespaces`.
    ///
    /// Per-type problems are reported in [`Discovery::failures`]; an `Err`
    /// means discovery as a whole failed.
    fn discover(&self, namespaces: &[String]) -> GeneratorResult<Discovery>;
}

/// Whether `name` lies in one of `namespaces` (or below it).
pub fn in_namespaces(name: &str, namespaces: &[String]) -> bool {
    namespaces.iter().any(|ns| {
        name.strip_prefix(ns.as_str())
            .is_some_and(|rest| rest.starts_with('.'))
    })
}

/// Flatten declared nested types into one list, outer types first.
fn flatten(descriptors: Vec<TypeDescriptor>) -> Vec<TypeDescriptor> {
    let mut out = Vec::with_capacity(descriptors.len());
    let mut stack: Vec<TypeDescriptor> = descriptors.into_iter().rev().collect();
    while let Some(mut descriptor) = stack.pop() {
        let nested = std::mem::take(&mut descriptor.nested);
        out.push(descriptor);
        stack.extend(nested.into_iter().rev());
    }
    out
}

/// Discovery over descriptors already in memory.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDiscovery {
    types: Vec<TypeDescriptor>,
}

impl InMemoryDiscovery {
    pub fn new(types: Vec<TypeDescriptor>) -> Self {
        Self { types }
    }
}

impl TypeDiscovery for InMemoryDiscovery {
    fn discover(&self, namespaces: &[String]) -> GeneratorResult<Discovery> {
        Ok(Discovery::partition(self.types.clone(), namespaces))
    }
}

#[derive(Deserialize)]
struct RawManifest {
    #[serde(default = "default_format_version")]
    format_version: u32,
    #[serde(default)]
    types: Vec<serde_json::Value>,
}

fn default_format_version() -> u32 {
    MANIFEST_FORMAT_VERSION
}

/// Discovery backed by JSON type manifest files.
#[derive(Debug, Default, Clone)]
pub struct ManifestDiscovery {
    paths: Vec<PathBuf>,
}

impl ManifestDiscovery {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Decode one manifest document, entry by entry.
    pub fn parse_manifest(
        source: &str,
        origin: &Path,
    ) -> GeneratorResult<(Vec<TypeDescriptor>, Vec<LoadFailure>)> {
        let raw: RawManifest = serde_json::from_str(source).map_err(|e| {
            GeneratorError::Discovery(format!("malformed manifest {origin:?}: {e}"))
        })?;
        if raw.format_version != MANIFEST_FORMAT_VERSION {
            return Err(GeneratorError::UnsupportedHost(format!(
                "unsupported manifest format {} in {origin:?}, expected {MANIFEST_FORMAT_VERSION}",
                raw.format_version
            )));
        }

        let mut types = Vec::with_capacity(raw.types.len());
        let mut failures = Vec::new();
        for (position, entry) in raw.types.into_iter().enumerate() {
            let name = entry
                .get("name")
                .and_then(serde_json::Value::as_str)
                .map_or_else(|| format!("{}#{position}", origin.display()), str::to_string);
            match serde_json::from_value::<TypeDescriptor>(entry) {
                Ok(descriptor) => types.push(descriptor),
                Err(e) => failures.push(LoadFailure {
                    name,
                    reason: e.to_string(),
                }),
            }
        }
        Ok((types, failures))
    }
}

impl TypeDiscovery for ManifestDiscovery {
    fn discover(&self, namespaces: &[String]) -> GeneratorResult<Discovery> {
        if self.paths.is_empty() {
            return Err(GeneratorError::Config(
                "no type manifest given to discover types from".to_string(),
            ));
        }

        let mut descriptors = Vec::new();
        let mut failures = Vec::new();
        for path in &self.paths {
            info!("Reading type manifest {}", path.display());
            let source =
                std::fs::read_to_string(path).map_err(|e| GeneratorError::io(path, e))?;
            let (types, mut bad) = Self::parse_manifest(&source, path)?;
            descriptors.extend(types);
            failures.append(&mut bad);
        }

        let mut discovery = Discovery::partition(descriptors, namespaces);
        discovery.failures = failures;
        Ok(discovery)
    }
}
