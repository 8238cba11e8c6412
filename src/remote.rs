//! Remote module source (ambient, thin): the out-of-scope REST collaborator
//! named in spec.md §6. Only the interface is real; `build-catalog
//! --download` is the sole caller and the happy path is not exercised by
//! the core's test suite.

use std::collections::HashMap;

/// One module record as returned by the remote collaborator: raw
/// `DEFINITION` and `CLASS` lines, unparsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteModuleRecord {
    pub id: String,
    pub name: String,
    pub definition: String,
    pub classes: Vec<String>,
}

pub trait KeggSource {
    /// Lists every module id the remote source currently carries.
    fn list_modules(&self) -> anyhow::Result<Vec<String>>;

    /// Fetches and parses one module's `DEFINITION`/`CLASS` lines.
    fn fetch_module(&self, module_id: &str) -> anyhow::Result<RemoteModuleRecord>;
}

const KEGG_REST_BASE: &str = "https://rest.kegg.jp";

/// Blocking `reqwest`-based implementation. Kept deliberately thin: this is
/// the out-of-scope collaborator, not a subject of this crate's own
/// correctness guarantees.
pub struct KeggRestSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl Default for KeggRestSource {
    fn default() -> Self {
        KeggRestSource {
            client: reqwest::blocking::Client::new(),
            base_url: KEGG_REST_BASE.to_string(),
        }
    }
}

impl KeggRestSource {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        KeggRestSource {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl KeggSource for KeggRestSource {
    fn list_modules(&self) -> anyhow::Result<Vec<String>> {
        let url = format!("{}/list/module", self.base_url);
        let body = self.client.get(url).send()?.error_for_status()?.text()?;
        Ok(body
            .lines()
            .filter_map(|line| line.split('\t').next())
            .map(|id| id.trim_start_matches("md:").to_string())
            .collect())
    }

    fn fetch_module(&self, module_id: &str) -> anyhow::Result<RemoteModuleRecord> {
        let url = format!("{}/get/{module_id}", self.base_url);
        let body = self.client.get(url).send()?.error_for_status()?.text()?;
        Ok(parse_flat_file(module_id, &body))
    }
}

/// Extracts `NAME`, `DEFINITION`, and `CLASS` from a KEGG flat-file record.
/// Continuation lines are indented and belong to the previous field.
fn parse_flat_file(module_id: &str, body: &str) -> RemoteModuleRecord {
    let mut name = String::new();
    let mut definition = String::new();
    let mut classes = Vec::new();
    let mut current_field = "";

    for line in body.lines() {
        if line.starts_with("///") {
            break;
        }
        let (field, rest) = if line.starts_with(' ') {
            (current_field, line.trim())
        } else {
            let mut parts = line.splitn(2, char::is_whitespace);
            let field = parts.next().unwrap_or("");
            let rest = parts.next().unwrap_or("").trim();
            (field, rest)
        };
        current_field = field;
        match field {
            "NAME" => {
                if !name.is_empty() {
                    name.push(' ');
                }
                name.push_str(rest);
            }
            "DEFINITION" => {
                if !definition.is_empty() {
                    definition.push(' ');
                }
                definition.push_str(rest);
            }
            "CLASS" => classes.push(rest.to_string()),
            _ => {}
        }
    }

    RemoteModuleRecord {
        id: module_id.to_string(),
        name,
        definition,
        classes,
    }
}

/// A canned in-memory source for tests and offline demos, never hitting the
/// network.
pub struct StaticSource {
    records: HashMap<String, RemoteModuleRecord>,
}

impl StaticSource {
    pub fn new(records: Vec<RemoteModuleRecord>) -> Self {
        StaticSource {
            records: records.into_iter().map(|r| (r.id.clone(), r)).collect(),
        }
    }
}

impl KeggSource for StaticSource {
    fn list_modules(&self) -> anyhow::Result<Vec<String>> {
        let mut ids: Vec<String> = self.records.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    fn fetch_module(&self, module_id: &str) -> anyhow::Result<RemoteModuleRecord> {
        self.records
            .get(module_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unknown module: {module_id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flat_file_definition_and_class() {
        let body = "ENTRY       M00001            Pathway   Module\n\
                     NAME        Glycolysis\n\
                     DEFINITION  K00844 K01810\n\
                     CLASS       Pathway modules; Carbohydrate metabolism\n\
                     ///\n";
        let record = parse_flat_file("M00001", body);
        assert_eq!(record.name, "Glycolysis");
        assert_eq!(record.definition, "K00844 K01810");
        assert_eq!(record.classes, vec!["Pathway modules; Carbohydrate metabolism".to_string()]);
    }

    #[test]
    fn static_source_round_trips_records() {
        let source = StaticSource::new(vec![RemoteModuleRecord {
            id: "M00001".to_string(),
            name: "Glycolysis".to_string(),
            definition: "K00844 K01810".to_string(),
            classes: vec!["Pathway modules".to_string()],
        }]);
        assert_eq!(source.list_modules().unwrap(), vec!["M00001".to_string()]);
        assert_eq!(source.fetch_module("M00001").unwrap().name, "Glycolysis");
        assert!(source.fetch_module("M99999").is_err());
    }
}
