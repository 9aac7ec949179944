use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::error::{AdvisorError, Result};
use crate::model::ModelRecord;

/// An ordered, read-only list of models. Order matters: it is the
/// tie-break order for every ranking.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    models: Vec<ModelRecord>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    model: Vec<ModelRecord>,
}

impl Catalog {
    /// Wrap an existing list. Rejects duplicate ids.
    pub fn new(models: Vec<ModelRecord>) -> Result<Self> {
        let mut seen = HashSet::new();
        for m in &models {
            if !seen.insert(m.id.as_str()) {
                return Err(AdvisorError::Parse(format!("duplicate model id: {}", m.id)));
            }
            check_finite(m)?;
        }
        Ok(Self { models })
    }

    pub fn models(&self) -> &[ModelRecord] {
        &self.models
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ModelRecord> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ModelRecord> {
        self.models.iter().find(|m| m.id == id)
    }

    /// Like [`get`](Self::get), but a missing id is an error.
    pub fn require(&self, id: &str) -> Result<&ModelRecord> {
        self.get(id)
            .ok_or_else(|| AdvisorError::ModelNotFound(id.to_string()))
    }

    /// Distinct providers in first-seen order.
    pub fn providers(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.models
            .iter()
            .map(|m| m.provider.as_str())
            .filter(|p| seen.insert(*p))
            .collect()
    }

    /// Case-insensitive substring match on id, name, provider and use cases.
    pub fn search(&self, query: &str) -> Vec<&ModelRecord> {
        let q = query.to_lowercase();
        self.models
            .iter()
            .filter(|m| {
                m.id.to_lowercase().contains(&q)
                    || m.name.to_lowercase().contains(&q)
                    || m.provider.to_lowercase().contains(&q)
                    || m.best_for.iter().any(|b| b.to_lowercase().contains(&q))
            })
            .collect()
    }
}

/// Costs and benchmark scores must be finite; TOML accepts `nan` and `inf`.
fn check_finite(m: &ModelRecord) -> Result<()> {
    let fields = [
        ("input_cost_per_1m", Some(m.input_cost_per_1m)),
        ("output_cost_per_1m", Some(m.output_cost_per_1m)),
        ("mmlu", m.mmlu()),
        ("human_eval", m.human_eval()),
    ];
    for (name, value) in fields {
        if let Some(v) = value {
            if !v.is_finite() {
                return Err(AdvisorError::Parse(format!("{}: {name} is not a finite number", m.id)));
            }
        }
    }
    Ok(())
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a ModelRecord;
    type IntoIter = std::slice::Iter<'a, ModelRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.models.iter()
    }
}

/// Parse a catalog from TOML: an array of `[[model]]` tables.
pub fn parse_catalog(toml_str: &str) -> Result<Catalog> {
    let file: CatalogFile =
        toml::from_str(toml_str).map_err(|e| AdvisorError::Parse(format!("bad catalog: {e}")))?;
    Catalog::new(file.model)
}

/// Parse a catalog from a JSON array of model records.
pub fn parse_catalog_json(json: &str) -> Result<Catalog> {
    let models: Vec<ModelRecord> = serde_json::from_str(json)?;
    Catalog::new(models)
}

/// Load a catalog file; `.json` is read as JSON, anything else as TOML.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path).map_err(|e| AdvisorError::Io(e.to_string()))?;
    let catalog = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => parse_catalog_json(&content)?,
        _ => parse_catalog(&content)?,
    };
    tracing::debug!(path = %path.display(), models = catalog.len(), "loaded catalog");
    Ok(catalog)
}

/// Load the catalog bundled from the data/ directory at compile time.
pub fn load_bundled_catalog() -> Result<Catalog> {
    let toml_str = include_str!("../../../data/catalog.toml");
    parse_catalog(toml_str)
}

/// Load the catalog: cached copy if present and valid, otherwise bundled.
#[cfg(feature = "network")]
pub fn load_catalog_cached() -> Result<Catalog> {
    if let Some(path) = crate::cache::cache_path(crate::cache::CATALOG_FILE) {
        if let Ok(content) = std::fs::read_to_string(&path) {
            match parse_catalog(&content) {
                Ok(parsed) => return Ok(parsed),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "ignoring cached catalog"),
            }
        }
    }
    load_bundled_catalog()
}
