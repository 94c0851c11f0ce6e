//! Tagged Output Encoding
//!
//! Final pipeline outputs are consumed by downstream JSON tooling that
//! needs to distinguish sets, unordered pairs, and repository records from
//! plain lists and objects. Each is wrapped in a single-key object naming
//! its origin type: `{"__set__": [...]}`, `{"__pair__": [a, b]}` and
//! `{"__repo__": {...}}`. Set contents are emitted sorted and collection
//! entries in insertion order so identical runs produce identical files.

use std::fs;
use std::path::Path;

use log::info;
use serde_json::{json, Value};

use crate::curation::model::{CuratorRepo, Intersections, PhenotypeGroups};
use crate::error::Result;

/// Encodes a repository record as a tagged object.
pub fn repo_value(repo: &CuratorRepo) -> Value {
    json!({ "__repo__": { "name": repo.name, "about": repo.about } })
}

/// Encodes an unordered pair as a tagged two-element list.
pub fn pair_value(a: Value, b: Value) -> Value {
    json!({ "__pair__": [a, b] })
}

/// Encodes a set as a tagged list. Callers pass items in their canonical
/// order.
pub fn set_value(items: Vec<Value>) -> Value {
    json!({ "__set__": items })
}

/// Encodes phenotype groups as an array of lead/sibling entries.
pub fn groups_value(groups: &PhenotypeGroups) -> Value {
    let entries: Vec<Value> = groups
        .iter()
        .map(|group| {
            json!({
                "lead": repo_value(&group.lead),
                "siblings": group
                    .siblings
                    .iter()
                    .map(repo_value)
                    .collect::<Vec<Value>>(),
            })
        })
        .collect();
    Value::Array(entries)
}

/// Encodes intersections as an array of per-lead entries, each holding the
/// workflow pairs and their matched step-name pairs.
pub fn intersections_value(intersections: &Intersections) -> Value {
    let entries: Vec<Value> = intersections
        .iter()
        .map(|(lead, group)| {
            let pairs: Vec<Value> = group
                .iter()
                .map(|entry| {
                    let steps: Vec<Value> = entry
                        .steps
                        .iter()
                        .map(|(a, b)| pair_value(json!(a), json!(b)))
                        .collect();
                    json!({
                        "workflows": pair_value(repo_value(&entry.left), repo_value(&entry.right)),
                        "steps": set_value(steps),
                    })
                })
                .collect();
            json!({ "lead": repo_value(lead), "pairs": pairs })
        })
        .collect();
    Value::Array(entries)
}

/// Writes a value as pretty-printed JSON, creating parent directories.
pub fn write_json(path: &Path, value: &Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    info!("wrote {}", path.display());
    Ok(())
}
