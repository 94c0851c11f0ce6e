//! Persistence: stage checkpoints and tagged JSON output encoding.

pub mod checkpoint;
pub mod encode;

pub use checkpoint::{CheckpointStore, JsonCheckpointStore, MemoryCheckpointStore};
