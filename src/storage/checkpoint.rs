//! Stage Checkpointing
//!
//! Each pipeline stage persists its output under a stage key; a re-run
//! loads and returns the checkpoint verbatim instead of recomputing.
//! Callers needing fresh results clear checkpoints explicitly.
//!
//! The store is a trait so pipeline logic stays free of storage concerns
//! and tests can run against the in-memory stand-in.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

/// Stage-keyed load/save contract.
pub trait CheckpointStore {
    /// Returns the checkpointed value for a stage, if one exists.
    fn load<T: DeserializeOwned>(&self, stage: &str) -> Result<Option<T>>;

    /// Persists a stage's output, replacing any previous checkpoint.
    fn save<T: Serialize>(&self, stage: &str, value: &T) -> Result<()>;

    /// Removes a stage's checkpoint if present.
    fn clear(&self, stage: &str) -> Result<()>;
}

/// Checkpoints stored as one pretty-printed JSON file per stage.
pub struct JsonCheckpointStore {
    dir: PathBuf,
}

impl JsonCheckpointStore {
    /// Creates a store rooted at `dir`. The directory is created lazily on
    /// first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn stage_path(&self, stage: &str) -> PathBuf {
        self.dir.join(format!("{}.json", stage))
    }
}

impl CheckpointStore for JsonCheckpointStore {
    fn load<T: DeserializeOwned>(&self, stage: &str) -> Result<Option<T>> {
        let path = self.stage_path(stage);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let value: T = serde_json::from_str(&content)?;
        info!("loaded checkpoint: {}", path.display());
        Ok(Some(value))
    }

    fn save<T: Serialize>(&self, stage: &str, value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.stage_path(stage);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json)?;
        info!("saved checkpoint: {}", path.display());
        Ok(())
    }

    fn clear(&self, stage: &str) -> Result<()> {
        let path = self.stage_path(stage);
        if Path::new(&path).exists() {
            fs::remove_file(&path)?;
            info!("cleared checkpoint: {}", path.display());
        }
        Ok(())
    }
}

/// In-memory store for tests and ad hoc runs.
#[derive(Default)]
pub struct MemoryCheckpointStore {
    values: RefCell<HashMap<String, serde_json::Value>>,
}

impl MemoryCheckpointStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn load<T: DeserializeOwned>(&self, stage: &str) -> Result<Option<T>> {
        match self.values.borrow().get(stage) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    fn save<T: Serialize>(&self, stage: &str, value: &T) -> Result<()> {
        self.values
            .borrow_mut()
            .insert(stage.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    fn clear(&self, stage: &str) -> Result<()> {
        self.values.borrow_mut().remove(stage);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_json_store_roundtrip() {
        let temp_dir = tempdir().unwrap();
        let store = JsonCheckpointStore::new(temp_dir.path());

        let missing: Option<Vec<String>> = store.load("stage").unwrap();
        assert!(missing.is_none());

        let value = vec!["a".to_string(), "b".to_string()];
        store.save("stage", &value).unwrap();

        let loaded: Option<Vec<String>> = store.load("stage").unwrap();
        assert_eq!(loaded, Some(value));
    }

    #[test]
    fn test_json_store_clear() {
        let temp_dir = tempdir().unwrap();
        let store = JsonCheckpointStore::new(temp_dir.path());

        store.save("stage", &1u32).unwrap();
        store.clear("stage").unwrap();

        let loaded: Option<u32> = store.load("stage").unwrap();
        assert!(loaded.is_none());
        // Clearing again is not an error
        store.clear("stage").unwrap();
    }

    #[test]
    fn test_json_store_creates_directory() {
        let temp_dir = tempdir().unwrap();
        let nested = temp_dir.path().join("nested").join("dir");
        let store = JsonCheckpointStore::new(&nested);

        store.save("stage", &"value").unwrap();
        assert!(nested.join("stage.json").exists());
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryCheckpointStore::new();

        let missing: Option<u32> = store.load("stage").unwrap();
        assert!(missing.is_none());

        store.save("stage", &42u32).unwrap();
        let loaded: Option<u32> = store.load("stage").unwrap();
        assert_eq!(loaded, Some(42));

        store.clear("stage").unwrap();
        let cleared: Option<u32> = store.load("stage").unwrap();
        assert!(cleared.is_none());
    }
}
