//! Pipeline Orchestration
//!
//! Sequences the three curation stages: workflow listing, phenotype
//! grouping with LLM refinement, and step intersection discovery. Each
//! stage checkpoints its output under a stable key; the listing stage
//! additionally checkpoints the raw repository list and each repo's crawl
//! as it completes, so a re-run resumes exactly where the last one
//! stopped unless the checkpoints are cleared first.
//!
//! Collaborators are injected behind traits so the pipeline can run
//! against stubs in tests and against HTTP clients in production.

use std::collections::HashSet;
use std::path::Path;

use log::{error, info};

use crate::client::{CatalogSearch, ChatCompleter, RepositorySource};
use crate::config::Config;
use crate::curation::grouping::group_phenotypes;
use crate::curation::intersect::get_intersections;
use crate::curation::model::{CuratorRepo, Intersections, PhenotypeGroups, RepoSteps};
use crate::curation::refine::Refiner;
use crate::error::Result;
use crate::matching::{MatchContext, STEP_SEPARATOR};
use crate::storage::encode;
use crate::storage::CheckpointStore;

/// Checkpoint key for the raw repository listing.
pub const STAGE_REPOS: &str = "repos";

/// Checkpoint key for the step-enumeration stage. Saved after every repo
/// so an interrupted crawl resumes where it stopped.
pub const STAGE_REPO_STEPS: &str = "repo_to_steps";

/// Checkpoint key for the grouping-and-refinement stage.
pub const STAGE_GROUPS: &str = "phenotype_groups";

/// Checkpoint key for the intersection stage.
pub const STAGE_INTERSECTIONS: &str = "intersections";

/// System prompt framing every refinement conversation.
pub const SYSTEM_PROMPT: &str =
    "You are an expert in clinical phenotypes and the conditions they describe.";

/// Filename of the final group output.
const GROUPS_OUTPUT: &str = "phenotype_groups.json";

/// Filename of the final intersection output.
const INTERSECTIONS_OUTPUT: &str = "intersections.json";

/// The curation pipeline over injected collaborators.
pub struct Curator<'a, S, C, K, P>
where
    S: RepositorySource,
    C: ChatCompleter,
    K: CatalogSearch,
    P: CheckpointStore,
{
    source: &'a S,
    llm: &'a mut C,
    catalog: &'a K,
    store: &'a P,
    config: &'a Config,
}

impl<'a, S, C, K, P> Curator<'a, S, C, K, P>
where
    S: RepositorySource,
    C: ChatCompleter,
    K: CatalogSearch,
    P: CheckpointStore,
{
    /// Wires the pipeline to its collaborators.
    pub fn new(
        source: &'a S,
        llm: &'a mut C,
        catalog: &'a K,
        store: &'a P,
        config: &'a Config,
    ) -> Self {
        Self {
            source,
            llm,
            catalog,
            store,
            config,
        }
    }

    /// Removes every stage checkpoint so the next run starts from scratch.
    pub fn clear_checkpoints(&self) -> Result<()> {
        for stage in [
            STAGE_REPOS,
            STAGE_REPO_STEPS,
            STAGE_GROUPS,
            STAGE_INTERSECTIONS,
        ] {
            self.store.clear(stage)?;
        }
        Ok(())
    }

    /// Runs every stage and writes the final JSON outputs.
    pub fn run(&mut self) -> Result<(PhenotypeGroups, Intersections)> {
        let mut ctx = MatchContext::new();

        let repo_steps = self.repo_steps()?;
        let groups = self.phenotype_groups(&mut ctx, &repo_steps)?;
        let intersections = self.intersections(&mut ctx, &repo_steps, &groups)?;

        self.write_outputs(&groups, &intersections)?;
        info!(
            "curation complete: {} groups, {} workflow pairs with common steps",
            groups.len(),
            intersections.pair_count()
        );
        Ok((groups, intersections))
    }

    /// Stage 1: lists workflow repositories and their step files.
    ///
    /// The raw listing and the step crawl checkpoint independently; the
    /// crawl saves after every repo and skips repos already enumerated, so
    /// an interrupted run never repeats the paginated org listing or the
    /// repos it has finished. A repo whose crawl fails is logged and
    /// skipped; it is retried on the next run.
    fn repo_steps(&self) -> Result<RepoSteps> {
        let repos = match self.store.load(STAGE_REPOS)? {
            Some(repos) => repos,
            None => {
                info!("listing workflow repositories");
                let repos: Vec<CuratorRepo> = self.source.repos()?;
                self.store.save(STAGE_REPOS, &repos)?;
                repos
            }
        };

        let mut repo_to_steps: RepoSteps =
            self.store.load(STAGE_REPO_STEPS)?.unwrap_or_default();
        let done: HashSet<String> = repo_to_steps
            .iter()
            .map(|(repo, _)| repo.name.clone())
            .collect();

        let workflows: Vec<&CuratorRepo> = repos
            .iter()
            .filter(|repo| repo.name.contains(STEP_SEPARATOR))
            .collect();
        for (index, repo) in workflows.iter().enumerate() {
            info!(
                "{}%",
                (index as f64 / workflows.len() as f64 * 100.0 * 100.0).round() / 100.0
            );
            if done.contains(&repo.name) {
                continue;
            }
            match self.source.steps(&repo.name) {
                Ok(steps) => {
                    repo_to_steps.push(((*repo).clone(), steps));
                    self.store.save(STAGE_REPO_STEPS, &repo_to_steps)?;
                }
                Err(e) => error!("error processing repository {}: {}", repo.name, e),
            }
        }
        info!(
            "returning {} of {} repo:step pairs",
            repo_to_steps.len(),
            workflows.len()
        );
        Ok(repo_to_steps)
    }

    /// Stage 2: groups workflows by phenotype and refines the largest
    /// groups through the catalog and the LLM.
    fn phenotype_groups(
        &mut self,
        ctx: &mut MatchContext,
        repo_steps: &RepoSteps,
    ) -> Result<PhenotypeGroups> {
        if let Some(groups) = self.store.load(STAGE_GROUPS)? {
            return Ok(groups);
        }
        info!("grouping {} workflows", repo_steps.len());
        let grouped = group_phenotypes(ctx, repo_steps);
        info!("{} groups before refinement", grouped.len());

        let repos: Vec<CuratorRepo> = repo_steps.iter().map(|(repo, _)| repo.clone()).collect();
        let refined = Refiner::new(self.llm, self.catalog, self.config.max_llm_groups)
            .refine(grouped, &repos);
        info!("{} groups after refinement", refined.len());

        self.store.save(STAGE_GROUPS, &refined)?;
        Ok(refined)
    }

    /// Stage 3: finds equivalent step pairs within each group.
    fn intersections(
        &self,
        ctx: &mut MatchContext,
        repo_steps: &RepoSteps,
        groups: &PhenotypeGroups,
    ) -> Result<Intersections> {
        if let Some(intersections) = self.store.load(STAGE_INTERSECTIONS)? {
            return Ok(intersections);
        }
        let intersections = get_intersections(
            ctx,
            repo_steps,
            groups,
            self.config.step_similarity_threshold,
        );
        self.store.save(STAGE_INTERSECTIONS, &intersections)?;
        Ok(intersections)
    }

    /// Writes tagged JSON renditions of the final groups and intersections.
    fn write_outputs(
        &self,
        groups: &PhenotypeGroups,
        intersections: &Intersections,
    ) -> Result<()> {
        let output_dir = Path::new(&self.config.output_dir);
        encode::write_json(&output_dir.join(GROUPS_OUTPUT), &encode::groups_value(groups))?;
        encode::write_json(
            &output_dir.join(INTERSECTIONS_OUTPUT),
            &encode::intersections_value(intersections),
        )?;
        Ok(())
    }
}
