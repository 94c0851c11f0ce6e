//! PhenoCurator - Clinical Phenotype Workflow Curation
//!
//! Curates a portfolio of computable-phenotype workflow repositories:
//! clusters workflows that define the same phenotype, refines the largest
//! clusters with a phenotype catalog and an LLM, and reports pairs of
//! workflow steps that express the same clinical concept.
//!
//! # Architecture
//!
//! The library is organized into five main modules:
//!
//! - [`matching`]: Name decomposition, token classification, fuzzy matching
//! - [`curation`]: Grouping, refinement, intersection, and the pipeline
//! - [`client`]: HTTP collaborators (repository source, catalog, LLM)
//! - [`storage`]: Stage checkpoints and tagged JSON output
//! - [`config`]: YAML configuration and credentials
//!
//! # Example
//!
//! ```rust,no_run
//! use phenocurator::client::{CatalogClient, GithubSource, LlmClient};
//! use phenocurator::curation::pipeline::{Curator, SYSTEM_PROMPT};
//! use phenocurator::storage::JsonCheckpointStore;
//! use phenocurator::Config;
//!
//! fn main() -> phenocurator::Result<()> {
//!     let config = Config::load_or_default("config.yaml")?;
//!     let source = GithubSource::new(
//!         config.github_url.clone(),
//!         config.github_org.clone(),
//!         Config::github_token()?,
//!     );
//!     let catalog = CatalogClient::new(config.catalog_url.clone());
//!     let mut llm = LlmClient::new(
//!         config.llm_url.clone(),
//!         config.llm_api_key.clone(),
//!         config.llm_model.clone(),
//!         config.llm_max_tokens,
//!         config.llm_temperature,
//!         false,
//!         SYSTEM_PROMPT,
//!     );
//!     let store = JsonCheckpointStore::new(config.checkpoint_dir.clone());
//!
//!     let (groups, intersections) =
//!         Curator::new(&source, &mut llm, &catalog, &store, &config).run()?;
//!     println!(
//!         "{} groups, {} workflow pairs with common steps",
//!         groups.len(),
//!         intersections.pair_count()
//!     );
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod curation;
pub mod error;
pub mod matching;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use curation::model::{CuratorRepo, Intersections, PhenotypeGroups};
pub use curation::pipeline::Curator;
pub use error::{CuratorError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "PhenoCurator";
