//! Step Intersection
//!
//! For every pair of workflows inside a finalized phenotype group, finds
//! pairs of steps that express the same clinical concept. Administrative
//! steps (loaders, output writers) are excluded, negation polarity must
//! agree between the two steps, and the remaining name components are
//! compared with the fuzzy matcher after the owning workflow's own
//! identifying prefixes are stripped away.

use log::{debug, info, warn};
use regex::Regex;

use crate::curation::model::{
    CuratorRepo, GroupIntersections, Intersections, PhenotypeGroups, RepoSteps,
};
use crate::matching::{about_components, clean, is_negative, name_components, MatchContext};

/// Normalized workflow name: slug components joined with hyphens,
/// lowercased.
fn workflow_name(repo: &CuratorRepo) -> String {
    name_components(&repo.name).join("-").to_lowercase()
}

/// Builds the prefix-stripping pattern for one workflow: every normalized
/// "about" component and the workflow's own normalized name, each followed
/// by a hyphen. Empty components are skipped; a bare "-" alternative
/// would strip every hyphen in the step name.
fn prefix_pattern(repo: &CuratorRepo) -> Option<Regex> {
    let name = workflow_name(repo);
    let mut prefixes: Vec<String> = about_components(&clean(&repo.about))
        .into_iter()
        .filter(|component| !component.is_empty())
        .map(|component| format!("{}-", component))
        .collect();
    if !name.is_empty() {
        prefixes.push(format!("{}-", name));
    }
    if prefixes.is_empty() {
        return None;
    }
    let pattern = prefixes
        .iter()
        .map(|prefix| regex::escape(prefix))
        .collect::<Vec<_>>()
        .join("|");
    debug!("replacing: {}", pattern);
    Regex::new(&pattern).ok()
}

/// Components of a step name with the owning workflow's prefixes removed.
fn step_name_components(pattern: Option<&Regex>, step: &str) -> Vec<String> {
    let stripped = match pattern {
        Some(regex) => regex.replace_all(step, "").to_string(),
        None => step.to_string(),
    };
    name_components(&clean(&stripped))
}

/// Decides whether two steps from two workflows refer to the same concept.
///
/// Each step name is stripped of its workflow's identifying prefixes and
/// split into components; any pair of non-ignored components whose
/// similarity exceeds the threshold counts as a match.
pub fn step_analysis(
    ctx: &mut MatchContext,
    workflow_a: &CuratorRepo,
    step_a: &str,
    workflow_b: &CuratorRepo,
    step_b: &str,
    threshold: f64,
) -> bool {
    let pattern_a = prefix_pattern(workflow_a);
    let components_a = step_name_components(pattern_a.as_ref(), step_a);
    debug!("{} {} -> {:?}", workflow_a.name, step_a, components_a);

    let pattern_b = prefix_pattern(workflow_b);
    let components_b = step_name_components(pattern_b.as_ref(), step_b);
    debug!("{} {} -> {:?}", workflow_b.name, step_b, components_b);

    for component_a in &components_a {
        if ctx.classifier.ignore(component_a) {
            continue;
        }
        for component_b in &components_b {
            if ctx.classifier.ignore(component_b) {
                continue;
            }
            if ctx.similarity.similarity(component_a, component_b) > threshold {
                return true;
            }
            debug!(
                "no match because similarity not high enough: {} {} {} {}",
                component_a.to_lowercase(),
                workflow_a.name.to_lowercase(),
                component_b.to_lowercase(),
                workflow_b.name.to_lowercase()
            );
        }
    }
    debug!("no match");
    false
}

/// True for step filenames eligible for comparison: recognized step suffix,
/// not a loader or output-writer step.
fn comparable_step(step: &str) -> bool {
    step.ends_with(crate::matching::STEP_SUFFIX)
        && !step.contains("load")
        && !step.contains("output")
}

/// Negation polarity of a step name's space-joined components.
fn step_polarity(step: &str) -> bool {
    is_negative(&name_components(step).join(" "))
}

/// Finds equivalent step pairs within every phenotype group.
///
/// For each unordered pair of group members, every eligible step of one is
/// compared against every eligible step of the other; matches are recorded
/// once per workflow pair, never under both orderings.
pub fn get_intersections(
    ctx: &mut MatchContext,
    repo_steps: &RepoSteps,
    groups: &PhenotypeGroups,
    threshold: f64,
) -> Intersections {
    let mut intersections = Intersections::new();

    for (index, group) in groups.iter().enumerate() {
        let mut members: Vec<&CuratorRepo> = vec![&group.lead];
        members.extend(group.siblings.iter());

        let steps_of = |repo: &CuratorRepo| -> Vec<String> {
            repo_steps
                .iter()
                .find(|(candidate, _)| candidate == repo)
                .map(|(_, steps)| steps.clone())
                .unwrap_or_else(|| {
                    warn!("no step listing for {}", repo.name);
                    Vec::new()
                })
        };

        let mut intersection = GroupIntersections::new();
        for workflow_a in members.iter().copied() {
            for workflow_b in members.iter().copied() {
                if workflow_a == workflow_b
                    || intersection.contains_pair(workflow_b, workflow_a)
                {
                    continue;
                }
                debug!(
                    "comparing {} and {} (group {} of {})",
                    workflow_a.name,
                    workflow_b.name,
                    index + 1,
                    groups.len()
                );
                for step_a in steps_of(workflow_a).iter().filter(|s| comparable_step(s)) {
                    for step_b in steps_of(workflow_b).iter().filter(|s| comparable_step(s)) {
                        if step_a == step_b
                            || intersection.contains_steps(
                                workflow_a, workflow_b, step_b, step_a,
                            )
                            || step_polarity(step_a) != step_polarity(step_b)
                        {
                            continue;
                        }
                        if step_analysis(ctx, workflow_a, step_a, workflow_b, step_b, threshold) {
                            intersection.add(
                                workflow_a,
                                workflow_b,
                                step_a.clone(),
                                step_b.clone(),
                            );
                        }
                    }
                }
            }
        }
        intersections.insert(group.lead.clone(), intersection);
    }

    debug!("{:?}", intersections);
    info!(
        "returning {} repos with common steps",
        intersections.pair_count()
    );
    intersections
}
