//! Error Types
//!
//! A single error enum covers the pipeline and its collaborators. Per-item
//! failures during batch processing (a repository that fails to list, a
//! catalog hit that cannot be resolved, an LLM answer that cannot be parsed)
//! are logged at the call site and never surface here; only failures that
//! prevent the pipeline from proceeding at all are returned as errors.

use thiserror::Error;

/// Errors raised by the curation pipeline and its collaborators.
#[derive(Error, Debug)]
pub enum CuratorError {
    /// Required credential missing at startup (e.g. GITHUB_ACCESS_TOKEN).
    #[error("missing credential: {0}")]
    MissingCredential(String),

    /// Configuration file could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP transport failure talking to a collaborator API.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Unexpected payload from a collaborator API.
    #[error("unexpected response from {service}: {detail}")]
    BadResponse { service: String, detail: String },

    /// Checkpoint or output file I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML configuration parse failure.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CuratorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_message() {
        let err = CuratorError::MissingCredential("GITHUB_ACCESS_TOKEN".to_string());
        assert!(err.to_string().contains("GITHUB_ACCESS_TOKEN"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: CuratorError = io.into();
        assert!(matches!(err, CuratorError::Io(_)));
    }

    #[test]
    fn test_bad_response_message() {
        let err = CuratorError::BadResponse {
            service: "catalog".to_string(),
            detail: "no phenotype_id field".to_string(),
        };
        assert!(err.to_string().contains("catalog"));
    }
}
