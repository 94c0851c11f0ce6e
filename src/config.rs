//! Pipeline Configuration
//!
//! Runtime parameters are read from a YAML file (`config.yaml` by default),
//! with credentials taken from the environment. Thresholds that drifted
//! across revisions of the original pipeline are named fields here rather
//! than scattered literals.
//!
//! # Example
//!
//! ```yaml
//! github_org: phenoflow
//! catalog_url: https://phenotypes.healthdatagateway.org/api/v1
//! llm_url: http://localhost:8080/v1
//! llm_model: gpt-3.5-turbo
//! max_llm_groups: 10
//! step_similarity_threshold: 0.9
//! checkpoint_dir: output
//! output_dir: output
//! ```

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CuratorError, Result};

/// Environment variable holding the repository-source access token.
pub const GITHUB_TOKEN_VAR: &str = "GITHUB_ACCESS_TOKEN";

/// Pipeline configuration loaded from YAML.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    /// Organization whose repositories hold the phenotype workflows.
    #[serde(default = "default_github_org")]
    pub github_org: String,

    /// Base URL of the repository-source REST API.
    #[serde(default = "default_github_url")]
    pub github_url: String,

    /// Base URL of the phenotype catalog API.
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,

    /// Base URL of the OpenAI-compatible chat-completion endpoint.
    #[serde(default = "default_llm_url")]
    pub llm_url: String,

    /// API key sent to the LLM endpoint (local deployments accept anything).
    #[serde(default = "default_llm_api_key")]
    pub llm_api_key: String,

    /// Model name requested from the LLM endpoint.
    #[serde(default = "default_llm_model")]
    pub llm_model: String,

    /// Maximum tokens per LLM completion.
    #[serde(default = "default_llm_max_tokens")]
    pub llm_max_tokens: u32,

    /// Sampling temperature for LLM completions.
    #[serde(default = "default_llm_temperature")]
    pub llm_temperature: f64,

    /// Number of largest groups sent through LLM refinement.
    #[serde(default = "default_max_llm_groups")]
    pub max_llm_groups: usize,

    /// Component-similarity threshold for step matching (canonical 0.9).
    #[serde(default = "default_step_similarity_threshold")]
    pub step_similarity_threshold: f64,

    /// Directory holding per-stage checkpoint files.
    #[serde(default = "default_checkpoint_dir")]
    pub checkpoint_dir: String,

    /// Directory receiving the final JSON outputs.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_github_org() -> String {
    "phenoflow".to_string()
}

fn default_github_url() -> String {
    "https://api.github.com".to_string()
}

fn default_catalog_url() -> String {
    "https://phenotypes.healthdatagateway.org/api/v1".to_string()
}

fn default_llm_url() -> String {
    "http://localhost:8080/v1".to_string()
}

fn default_llm_api_key() -> String {
    "foobar".to_string()
}

fn default_llm_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_llm_max_tokens() -> u32 {
    1024
}

fn default_llm_temperature() -> f64 {
    0.7
}

fn default_max_llm_groups() -> usize {
    10
}

fn default_step_similarity_threshold() -> f64 {
    0.9
}

fn default_checkpoint_dir() -> String {
    "output".to_string()
}

fn default_output_dir() -> String {
    "output".to_string()
}

impl Default for Config {
    fn default() -> Self {
        // serde defaults double as the programmatic defaults
        serde_yaml::from_str("{}").expect("empty config must deserialize")
    }
}

impl Config {
    /// Loads configuration from a YAML file.
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CuratorError::Config(format!("failed to read config file '{}': {}", path, e))
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Loads configuration from a file if it exists, otherwise defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Reads the repository-source access token from the environment.
    ///
    /// Absence is fatal: the pipeline cannot proceed without its
    /// collaborators.
    pub fn github_token() -> Result<String> {
        env::var(GITHUB_TOKEN_VAR)
            .ok()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| CuratorError::MissingCredential(GITHUB_TOKEN_VAR.to_string()))
    }
}
