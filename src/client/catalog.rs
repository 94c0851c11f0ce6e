//! Phenotype Catalog Client
//!
//! Searches the public concept-library catalog for existing phenotype
//! records by free-text name. The catalog corroborates locally discovered
//! groups; its identifiers (PH-prefixed) also appear in workflow "about"
//! fields.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One catalog search hit. Only the identifier is contractually required;
/// everything else the API returns is ignored.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CatalogHit {
    pub phenotype_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Catalog search contract consumed by the cluster refiner.
pub trait CatalogSearch {
    /// Returns catalog records matching a free-text phenotype name.
    fn search(&self, query: &str) -> Result<Vec<CatalogHit>>;
}

/// HTTP client for a concept-library catalog API.
pub struct CatalogClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl CatalogClient {
    /// Creates a client against the given API base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl CatalogSearch for CatalogClient {
    fn search(&self, query: &str) -> Result<Vec<CatalogHit>> {
        let url = format!("{}/phenotypes/", self.base_url);
        debug!("searching catalog for: {}", query);
        let hits: Vec<CatalogHit> = self
            .client
            .get(&url)
            .query(&[("search", query)])
            .send()?
            .error_for_status()?
            .json()?;
        debug!("{} catalog hits for '{}'", hits.len(), query);
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_hit_deserializes_extra_fields() {
        let json = r#"{"phenotype_id": "PH152", "name": "Anxiety", "author": "x"}"#;
        let hit: CatalogHit = serde_json::from_str(json).unwrap();
        assert_eq!(hit.phenotype_id, "PH152");
        assert_eq!(hit.name.as_deref(), Some("Anxiety"));
    }

    #[test]
    fn test_catalog_hit_minimal() {
        let json = r#"{"phenotype_id": "PH9"}"#;
        let hit: CatalogHit = serde_json::from_str(json).unwrap();
        assert_eq!(hit.phenotype_id, "PH9");
        assert!(hit.name.is_none());
    }
}
