//! Catalog: a build-once, read-only mapping of module id to compiled
//! pathway (spec §3 "Catalog entry", §2 component 5).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{definition, error::DefinitionError, graph, graph::CompiledGraph, ko::Ko};

#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub classes: Vec<String>,
    pub definition: String,
    pub graph: CompiledGraph,
}

impl CatalogEntry {
    /// Parses and compiles `definition`, producing an immutable entry.
    /// A blank/whitespace-only definition compiles to the trivial graph
    /// (spec §4.4 edge case) rather than erroring.
    pub fn compile(
        id: String,
        name: String,
        classes: Vec<String>,
        definition: String,
    ) -> Result<Self, DefinitionError> {
        let compiled = if definition.trim().is_empty() {
            CompiledGraph::trivial()
        } else {
            let expr = definition::parse(&definition)?;
            graph::compile(&expr)
        };
        Ok(CatalogEntry {
            id,
            name,
            classes,
            definition,
            graph: compiled,
        })
    }
}

/// Build-once, read-only map of module id to compiled entry, plus the
/// catalog-wide database version tag (ambient, spec §6 "Database version
/// output").
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub entries: HashMap<String, CatalogEntry>,
    pub version_tag: Option<String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, module_id: &str) -> Option<&CatalogEntry> {
        self.entries.get(module_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn module_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// All KOs that appear in any module's index -- the default enrichment
    /// background universe (spec §4.6, §9).
    pub fn all_indexed_kos(&self) -> std::collections::HashSet<Ko> {
        self.entries
            .values()
            .flat_map(|e| e.graph.ko_to_edges.keys().cloned())
            .collect()
    }
}

/// Builds a catalog from the three headerless TSV tables of spec §6:
/// `definitions` (`module_id`, `definition_string`), `names` (`module_id`,
/// `name`), `classes` (`module_id`, `class_string`, one row per class).
/// Modules with no entry in `names`/`classes` get an empty name/class list.
/// Definitions that fail to parse are reported rather than aborting the
/// whole build (spec §7's skip-on-error build policy).
pub fn build_from_tables(
    definitions: &[(String, String)],
    names: &[(String, String)],
    classes: &[(String, String)],
    version_tag: Option<String>,
) -> (Catalog, Vec<(String, DefinitionError)>) {
    let name_by_id: HashMap<&str, &str> = names.iter().map(|(id, n)| (id.as_str(), n.as_str())).collect();
    let mut classes_by_id: HashMap<&str, Vec<String>> = HashMap::new();
    for (id, class) in classes {
        classes_by_id.entry(id.as_str()).or_default().push(class.clone());
    }

    let mut catalog = Catalog {
        entries: HashMap::new(),
        version_tag,
    };
    let mut failures = Vec::new();

    for (id, definition) in definitions {
        let name = name_by_id.get(id.as_str()).map(|s| s.to_string()).unwrap_or_default();
        let module_classes = classes_by_id.get(id.as_str()).cloned().unwrap_or_default();
        match CatalogEntry::compile(id.clone(), name, module_classes, definition.clone()) {
            Ok(entry) => {
                catalog.entries.insert(id.clone(), entry);
            }
            Err(e) => failures.push((id.clone(), e)),
        }
    }

    (catalog, failures)
}

/// On-disk serialization shape for one catalog entry (spec §6's "opaque"
/// gzip container). The compiled graph is re-derived from the definition
/// on load rather than serialized edge-by-edge, which keeps the container
/// small and guarantees `decode(encode(cat)) == cat` as long as `compile`
/// is itself deterministic (spec §4.3's determinism note; tested directly
/// in `graph::tests`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SerializedEntry {
    pub id: String,
    pub name: String,
    pub classes: Vec<String>,
    pub definition: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SerializedCatalog {
    pub version_tag: Option<String>,
    pub entries: Vec<SerializedEntry>,
}

impl From<&Catalog> for SerializedCatalog {
    fn from(catalog: &Catalog) -> Self {
        let mut entries: Vec<SerializedEntry> = catalog
            .entries
            .values()
            .map(|e| SerializedEntry {
                id: e.id.clone(),
                name: e.name.clone(),
                classes: e.classes.clone(),
                definition: e.definition.clone(),
            })
            .collect();
        entries.sort_by(|a, b| a.id.cmp(&b.id));
        SerializedCatalog {
            version_tag: catalog.version_tag.clone(),
            entries,
        }
    }
}

impl SerializedCatalog {
    /// Recompiles every entry, skipping (and reporting) any whose
    /// definition fails to parse -- this should never happen for a
    /// catalog that was itself produced by `build-catalog`, but decoding
    /// untrusted/corrupted containers should not panic.
    pub fn into_catalog(self) -> (Catalog, Vec<(String, DefinitionError)>) {
        let mut catalog = Catalog {
            entries: HashMap::new(),
            version_tag: self.version_tag,
        };
        let mut failures = Vec::new();
        for entry in self.entries {
            match CatalogEntry::compile(entry.id.clone(), entry.name, entry.classes, entry.definition) {
                Ok(compiled) => {
                    catalog.entries.insert(entry.id, compiled);
                }
                Err(e) => failures.push((entry.id, e)),
            }
        }
        (catalog, failures)
    }
}
