//! External Collaborators
//!
//! Thin I/O wrappers around the three network services the pipeline
//! consumes. Each is specified as a trait at the seam so the pipeline
//! stages can be exercised with in-process stand-ins:
//!
//! - [`repos`]: repository source (workflow listing and step enumeration)
//! - [`catalog`]: phenotype catalog search
//! - [`llm`]: chat-completion transport
//!
//! None of these carry decision logic; heuristics live in [`crate::curation`].

pub mod catalog;
pub mod llm;
pub mod repos;

pub use catalog::{CatalogClient, CatalogHit, CatalogSearch};
pub use llm::{ChatCompleter, LlmClient};
pub use repos::{GithubSource, RepositorySource};
