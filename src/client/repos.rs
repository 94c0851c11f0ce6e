//! Repository Source
//!
//! Lists phenotype workflow repositories and their step files from a
//! GitHub-style REST API. Only repositories whose names carry the `---`
//! slug marker are phenotype workflows; within each, step files are
//! enumerated recursively and filtered by the same marker.
//!
//! The two operations are exposed separately so the pipeline can
//! checkpoint the raw listing and resume a partially crawled step
//! enumeration repo by repo.

use std::thread;
use std::time::Duration;

use chrono::Utc;
use log::{debug, info, warn};
use serde::Deserialize;

use crate::curation::model::CuratorRepo;
use crate::error::Result;
use crate::matching::STEP_SEPARATOR;

/// Page size for repository listing.
const PER_PAGE: usize = 100;

/// Remaining-request floor below which we wait for the rate window reset.
const RATE_FLOOR: u64 = 10;

/// Workflow listing contract consumed by the pipeline.
pub trait RepositorySource {
    /// Lists every repository in the organization.
    fn repos(&self) -> Result<Vec<CuratorRepo>>;

    /// Enumerates one repository's step filenames.
    fn steps(&self, repo_name: &str) -> Result<Vec<String>>;
}

#[derive(Deserialize, Debug)]
struct GithubRepo {
    name: String,
    description: Option<String>,
}

#[derive(Deserialize, Debug)]
struct GithubContent {
    name: String,
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Deserialize, Debug)]
struct RateLimitResponse {
    resources: RateLimitResources,
}

#[derive(Deserialize, Debug)]
struct RateLimitResources {
    core: RateLimitCore,
}

#[derive(Deserialize, Debug)]
struct RateLimitCore {
    remaining: u64,
    reset: i64,
}

/// HTTP source reading an organization's repositories from a GitHub-style
/// API.
pub struct GithubSource {
    client: reqwest::blocking::Client,
    base_url: String,
    org: String,
    token: String,
}

impl GithubSource {
    /// Creates a source for one organization.
    pub fn new(base_url: impl Into<String>, org: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.into(),
            org: org.into(),
            token: token.into(),
        }
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let value = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header(reqwest::header::USER_AGENT, "phenocurator")
            .send()?
            .error_for_status()?
            .json()?;
        Ok(value)
    }

    /// Sleeps until the rate window resets when requests are nearly
    /// exhausted. A failed rate-limit query is logged and ignored.
    fn rate_check(&self) {
        let url = format!("{}/rate_limit", self.base_url);
        match self.get_json::<RateLimitResponse>(&url) {
            Ok(limits) => {
                let core = limits.resources.core;
                if core.remaining < RATE_FLOOR {
                    let wait = (core.reset - Utc::now().timestamp()).max(0) as u64;
                    info!("rate limit nearly exhausted, sleeping {}s", wait);
                    thread::sleep(Duration::from_secs(wait));
                }
            }
            Err(e) => warn!("rate limit query failed: {}", e),
        }
    }
}

impl RepositorySource for GithubSource {
    /// Lists every repository in the organization, paginated.
    fn repos(&self) -> Result<Vec<CuratorRepo>> {
        let mut repos = Vec::new();
        let mut page = 1;
        loop {
            self.rate_check();
            let url = format!(
                "{}/orgs/{}/repos?per_page={}&page={}",
                self.base_url, self.org, PER_PAGE, page
            );
            let batch: Vec<GithubRepo> = self.get_json(&url)?;
            let batch_len = batch.len();
            repos.extend(batch.into_iter().map(|repo| {
                CuratorRepo::new(repo.name, repo.description.unwrap_or_default())
            }));
            if batch_len < PER_PAGE {
                break;
            }
            page += 1;
        }
        info!("returning {} repos", repos.len());
        Ok(repos)
    }

    /// Recursively enumerates a repository's files, keeping names that
    /// carry the slug marker.
    fn steps(&self, repo_name: &str) -> Result<Vec<String>> {
        let mut steps = Vec::new();
        let mut pending = vec![String::new()];
        while let Some(path) = pending.pop() {
            self.rate_check();
            let url = format!(
                "{}/repos/{}/{}/contents/{}",
                self.base_url, self.org, repo_name, path
            );
            let contents: Vec<GithubContent> = self.get_json(&url)?;
            for content in contents {
                if content.kind == "dir" {
                    pending.push(content.path);
                } else if content.name.contains(STEP_SEPARATOR) {
                    steps.push(content.name);
                }
            }
        }
        debug!("{}: {} steps", repo_name, steps.len());
        Ok(steps)
    }
}
