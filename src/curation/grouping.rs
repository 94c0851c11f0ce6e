//! Phenotype Grouping
//!
//! Clusters workflow repositories whose normalized names are prefix-related
//! (or, in similarity mode, fuzzy-related) into (lead, siblings) groups.
//! Iteration follows the input listing order, so group assignment is
//! deterministic given identical input ordering.

use log::{debug, info};

use crate::curation::model::{CuratorRepo, PhenotypeGroups, RepoSteps};
use crate::matching::{name_components, MatchContext};

/// Similarity cutoff for similarity-mode name comparison.
const NAME_SIMILARITY_THRESHOLD: f64 = 0.9;

/// Normalizes a repository name for comparison: slug components filtered
/// through the token classifier, joined with spaces, stripped to
/// alphanumerics, lowercased.
fn normalized_name(ctx: &mut MatchContext, name: &str) -> String {
    let kept: Vec<String> = name_components(name)
        .into_iter()
        .filter(|word| !ctx.classifier.ignore(word))
        .collect();
    kept.join(" ")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

/// Decides whether two repository names describe the same phenotype.
///
/// True iff both normalized names are non-empty and one is a prefix of the
/// other; with `similarity` requested, a fuzzy ratio above 0.9 also
/// qualifies. Default call sites use prefix-only.
pub fn same_phenotype(ctx: &mut MatchContext, name_a: &str, name_b: &str, similarity: bool) -> bool {
    let a = normalized_name(ctx, name_a);
    let b = normalized_name(ctx, name_b);
    !a.is_empty()
        && !b.is_empty()
        && ((similarity && ctx.similarity.similarity(&a, &b) > NAME_SIMILARITY_THRESHOLD)
            || a.starts_with(&b)
            || b.starts_with(&a))
}

/// Clusters repositories into phenotype groups.
///
/// Scans every ordered pair (A, B): A leads a group only while unclaimed
/// as a sibling; B joins A's group when their names match and B is not yet
/// claimed anywhere. A repository already leading a group may still be
/// claimed as a later lead's sibling if unclaimed so far.
pub fn group_phenotypes(ctx: &mut MatchContext, repo_steps: &RepoSteps) -> PhenotypeGroups {
    let mut groups = PhenotypeGroups::new();
    let repos: Vec<&CuratorRepo> = repo_steps.iter().map(|(repo, _)| repo).collect();
    let total = repos.len() * repos.len();
    let mut iteration: usize = 1;

    for repo_a in &repos {
        if groups.is_sibling(repo_a) {
            continue;
        }
        for repo_b in &repos {
            if total > 0 {
                let percent = (iteration as f64 / total as f64 * 100.0 * 100.0).round() / 100.0;
                debug!("{}%", percent);
                if iteration % 1000 == 0 {
                    info!("{}%", percent);
                }
            }
            iteration += 1;
            if repo_a == repo_b || groups.is_sibling(repo_b) {
                continue;
            }
            if same_phenotype(ctx, &repo_a.name, &repo_b.name, false) {
                groups.add_sibling(repo_a, (*repo_b).clone());
            }
        }
    }

    debug!("{:?}", groups);
    info!("returning {} phenotype groups", groups.len());
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(name: &str) -> CuratorRepo {
        CuratorRepo::new(name, "")
    }

    #[test]
    fn test_same_phenotype_reflexive() {
        let mut ctx = MatchContext::new();
        for name in ["anxiety---km", "type-1-diabetes---icd", "copd-copd---x"] {
            assert!(
                same_phenotype(&mut ctx, name, name, false),
                "{} should match itself",
                name
            );
        }
    }

    #[test]
    fn test_same_phenotype_prefix() {
        let mut ctx = MatchContext::new();
        assert!(same_phenotype(
            &mut ctx,
            "diabetes---a",
            "diabetes-mellitus---b",
            false
        ));
        assert!(!same_phenotype(&mut ctx, "diabetes---a", "copd---b", false));
    }

    #[test]
    fn test_same_phenotype_requires_marker() {
        let mut ctx = MatchContext::new();
        // Names without the slug marker normalize to empty and never match
        assert!(!same_phenotype(&mut ctx, "diabetes", "diabetes", false));
    }

    #[test]
    fn test_same_phenotype_ignores_stop_words() {
        let mut ctx = MatchContext::new();
        // "disease" and "disorder" are descriptor nouns, filtered out
        assert!(same_phenotype(
            &mut ctx,
            "kidney-disease---a",
            "kidney-disorder---b",
            false
        ));
    }

    #[test]
    fn test_same_phenotype_similarity_mode() {
        let mut ctx = MatchContext::new();
        // Not prefix-related, but nearly identical strings (misspelling)
        assert!(!same_phenotype(
            &mut ctx,
            "anxiety-depresion---a",
            "anxiety-depression---b",
            false
        ));
        assert!(same_phenotype(
            &mut ctx,
            "anxiety-depresion---a",
            "anxiety-depression---b",
            true
        ));
    }

    #[test]
    fn test_group_phenotypes_basic() {
        let mut ctx = MatchContext::new();
        let repo_steps: RepoSteps = vec![
            (repo("anxiety---a"), vec![]),
            (repo("anxiety-specified---b"), vec![]),
            (repo("copd---c"), vec![]),
        ];

        let groups = group_phenotypes(&mut ctx, &repo_steps);
        let lead = repo("anxiety---a");
        assert_eq!(
            groups.get(&lead).unwrap().siblings,
            vec![repo("anxiety-specified---b")]
        );
        assert!(groups.get(&repo("copd---c")).is_none());
    }

    #[test]
    fn test_group_phenotypes_no_double_claim() {
        let mut ctx = MatchContext::new();
        let repo_steps: RepoSteps = vec![
            (repo("diabetes---a"), vec![]),
            (repo("diabetes---b"), vec![]),
            (repo("diabetes---c"), vec![]),
        ];

        let groups = group_phenotypes(&mut ctx, &repo_steps);
        // First repo claims both others; nothing is a sibling twice
        assert_eq!(groups.len(), 1);
        let lead = repo("diabetes---a");
        assert_eq!(groups.get(&lead).unwrap().siblings.len(), 2);

        let mut seen = std::collections::HashSet::new();
        for group in groups.iter() {
            for sibling in &group.siblings {
                assert!(seen.insert(sibling.name.clone()), "sibling claimed twice");
            }
        }
    }

    #[test]
    fn test_group_phenotypes_deterministic() {
        let repo_steps: RepoSteps = vec![
            (repo("asthma---a"), vec![]),
            (repo("asthma-severe---b"), vec![]),
            (repo("dementia---c"), vec![]),
            (repo("dementia-vascular---d"), vec![]),
        ];

        let first = group_phenotypes(&mut MatchContext::new(), &repo_steps);
        let second = group_phenotypes(&mut MatchContext::new(), &repo_steps);
        assert_eq!(first, second);
    }
}
