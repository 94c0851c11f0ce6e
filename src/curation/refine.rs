//! LLM Cluster Refinement
//!
//! Prunes and extends the largest phenotype groups. Catalog search results
//! fold in workflows that name-based grouping missed; the LLM is then asked
//! which candidate phrases are synonyms of, medications for, or
//! subconditions of the lead phenotype. Synonyms and medications stay,
//! subconditions go, and candidates claimed by this group are withdrawn
//! from every other group.
//!
//! The answer protocol is deliberately strict: the reply must end with a
//! bracketed index list ("[1, 2, 3]" or "[]"), and the last well-formed
//! bracket in the response is authoritative. A reply with no extractable
//! bracket fails open: that signal leaves the candidate list unfiltered.

use std::collections::{BTreeSet, HashSet};

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::client::{CatalogSearch, ChatCompleter};
use crate::curation::model::{CuratorRepo, PhenotypeGroup, PhenotypeGroups};
use crate::matching::phenotype_phrase;

/// A bracketed list of decimal indices, possibly empty.
static BRACKET_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([0-9,\s]*)\]").expect("valid bracket pattern"));

/// Marker identifying a catalog id inside an "about" field.
const CATALOG_ID_MARKER: &str = "- PH";

/// Extracts the 1-based indices from the last bracketed list in a reply.
///
/// Returns `None` when no well-formed bracket exists or an entry fails to
/// parse; `Some(vec![])` for an explicit empty list.
fn extract_indices(response: &str) -> Option<Vec<usize>> {
    let captures = BRACKET_LIST.captures_iter(response.trim()).last()?;
    let inner = captures.get(1)?.as_str().trim();
    if inner.is_empty() {
        return Some(Vec::new());
    }
    inner
        .split(',')
        .map(|entry| entry.trim().parse::<usize>().ok())
        .collect()
}

/// Refines phenotype groups against the catalog and the LLM.
pub struct Refiner<'a, C: ChatCompleter, K: CatalogSearch> {
    llm: &'a mut C,
    catalog: &'a K,
    max_groups: usize,
}

impl<'a, C: ChatCompleter, K: CatalogSearch> Refiner<'a, C, K> {
    /// Creates a refiner operating on the `max_groups` largest groups.
    pub fn new(llm: &'a mut C, catalog: &'a K, max_groups: usize) -> Self {
        Self {
            llm,
            catalog,
            max_groups,
        }
    }

    /// Looks up the lead phenotype in the catalog and resolves hits to
    /// local workflows not already present in the group.
    ///
    /// Unresolvable hits are dropped with a warning; a failed search is
    /// treated as an empty result.
    pub fn additional_phenotypes_from_catalog(
        &self,
        group: &PhenotypeGroup,
        repos: &[CuratorRepo],
    ) -> Vec<CuratorRepo> {
        let query = phenotype_phrase(&group.lead.name).replace('_', " ");
        debug!("searching for: {}", query);
        let hits = match self.catalog.search(&query) {
            Ok(hits) => hits,
            Err(e) => {
                warn!("catalog search failed for '{}': {}", query, e);
                return Vec::new();
            }
        };
        if hits.is_empty() {
            return Vec::new();
        }

        let existing_ids: HashSet<String> = std::iter::once(&group.lead)
            .chain(group.siblings.iter())
            .filter(|member| member.about.contains(CATALOG_ID_MARKER))
            .filter_map(|member| member.about.split(" - ").nth(1))
            .map(str::to_string)
            .collect();

        hits.into_iter()
            .filter(|hit| !existing_ids.contains(&hit.phenotype_id))
            .filter_map(|hit| {
                match repos
                    .iter()
                    .find(|repo| repo.about.contains(&hit.phenotype_id))
                {
                    Some(repo) => Some(repo.clone()),
                    None => {
                        warn!("no local workflow for catalog id: {}", hit.phenotype_id);
                        None
                    }
                }
            })
            .collect()
    }

    /// Asks one membership question over the numbered menu and returns the
    /// selected phrases, or `None` when no answer could be extracted.
    fn included(&mut self, question: &str, menu: &[String]) -> Option<Vec<String>> {
        let mut formatted = menu
            .iter()
            .enumerate()
            .map(|(index, phrase)| format!("{}: {},", index + 1, phrase))
            .collect::<Vec<_>>()
            .join("\n");
        formatted.pop();
        let message = format!(
            "Which of the following {}:\n{}.\n\
             Print all the correct answers as a list (e.g. [1, 2, 3]). \
             If none of the answers are correct, print an empty list ([]). \
             This list must be the last thing in your response.",
            question, formatted
        );
        debug!("{}", message);

        let response = match self.llm.send_message(&message) {
            Ok(response) => response,
            Err(e) => {
                warn!("llm request failed: {}", e);
                return None;
            }
        };
        debug!("{}", response);

        let indices = match extract_indices(&response) {
            Some(indices) => indices,
            None => {
                warn!("unable to extract answer from: {}", response);
                return None;
            }
        };
        indices
            .into_iter()
            .map(|index| {
                if index >= 1 && index <= menu.len() {
                    Some(menu[index - 1].clone())
                } else {
                    warn!("answer index {} outside menu of {}", index, menu.len());
                    None
                }
            })
            .collect()
    }

    /// Removes candidates the LLM judges unrelated to the lead phenotype.
    ///
    /// Exact phrase matches of the lead are always retained and never sent
    /// to the LLM. Of the rest, synonyms and medications are kept unless
    /// also flagged as subconditions; a failed prompt fails open for its
    /// signal.
    pub fn remove_unrelated_phenotypes(
        &mut self,
        lead: &CuratorRepo,
        candidates: Vec<CuratorRepo>,
    ) -> Vec<CuratorRepo> {
        let lead_phrase = phenotype_phrase(&lead.name);
        let normalized_lead = lead_phrase.trim().to_lowercase();

        let exact_matches: Vec<CuratorRepo> = candidates
            .iter()
            .filter(|candidate| {
                *candidate != lead
                    && phenotype_phrase(&candidate.name).trim().to_lowercase()
                        == normalized_lead
            })
            .cloned()
            .collect();

        let mut seen = HashSet::new();
        let remaining: Vec<CuratorRepo> = candidates
            .into_iter()
            .filter(|candidate| {
                !exact_matches.contains(candidate) && seen.insert(candidate.clone())
            })
            .collect();
        if remaining.is_empty() {
            return exact_matches;
        }

        let menu: Vec<String> = remaining
            .iter()
            .map(|candidate| phenotype_phrase(&candidate.name))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let synonyms = self
            .included(
                &format!("are another way of writing {}", lead_phrase),
                &menu,
            )
            .unwrap_or_else(|| menu.clone());
        let medications = self
            .included(&format!("are medications for {}", lead_phrase), &menu)
            .unwrap_or_else(|| menu.clone());
        let subconditions = self
            .included(
                &format!("are subconditions (e.g. particular types) of {}", lead_phrase),
                &menu,
            )
            .unwrap_or_default();

        let mut retained = exact_matches;
        retained.extend(remaining.into_iter().filter(|candidate| {
            let phrase = phenotype_phrase(&candidate.name);
            (synonyms.contains(&phrase) || medications.contains(&phrase))
                && !subconditions.contains(&phrase)
        }));
        retained
    }

    /// Refines the largest groups in place and resolves duplicate
    /// membership created by catalog augmentation.
    pub fn refine(&mut self, mut groups: PhenotypeGroups, repos: &[CuratorRepo]) -> PhenotypeGroups {
        let leads: Vec<CuratorRepo> = groups
            .leads_by_size()
            .into_iter()
            .take(self.max_groups)
            .collect();

        for lead in leads {
            let Some(group) = groups.get(&lead).cloned() else {
                // Emptied by an earlier dedup pass
                continue;
            };
            let original = group.siblings.clone();

            let mut candidates = original.clone();
            candidates.extend(self.additional_phenotypes_from_catalog(&group, repos));

            let refined = self.remove_unrelated_phenotypes(&lead, candidates);
            let newly_retained: Vec<CuratorRepo> = refined
                .iter()
                .filter(|member| !original.contains(member))
                .cloned()
                .collect();

            groups.set_siblings(&lead, refined);
            groups.remove_duplicates(&newly_retained, &[lead.clone()]);
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::catalog::CatalogHit;
    use crate::error::Result;

    /// Chat stub answering each membership question from a fixed script.
    struct ScriptedLlm {
        synonyms: String,
        medications: String,
        subconditions: String,
    }

    impl ChatCompleter for ScriptedLlm {
        fn send_message(&mut self, message: &str) -> Result<String> {
            if message.contains("another way of writing") {
                Ok(self.synonyms.clone())
            } else if message.contains("medications for") {
                Ok(self.medications.clone())
            } else {
                Ok(self.subconditions.clone())
            }
        }
    }

    struct EmptyCatalog;

    impl CatalogSearch for EmptyCatalog {
        fn search(&self, _query: &str) -> Result<Vec<CatalogHit>> {
            Ok(Vec::new())
        }
    }

    struct FixedCatalog(Vec<CatalogHit>);

    impl CatalogSearch for FixedCatalog {
        fn search(&self, _query: &str) -> Result<Vec<CatalogHit>> {
            Ok(self.0.clone())
        }
    }

    fn repo(name: &str) -> CuratorRepo {
        CuratorRepo::new(name, "")
    }

    #[test]
    fn test_extract_indices_simple() {
        assert_eq!(extract_indices("[1, 2, 3]"), Some(vec![1, 2, 3]));
        assert_eq!(extract_indices("[]"), Some(vec![]));
        assert_eq!(extract_indices("The answer is [2]"), Some(vec![2]));
    }

    #[test]
    fn test_extract_indices_last_bracket_wins() {
        assert_eq!(
            extract_indices("Maybe [1, 2]? On reflection: [2]"),
            Some(vec![2])
        );
    }

    #[test]
    fn test_extract_indices_failure() {
        assert_eq!(extract_indices("no list here"), None);
        assert_eq!(extract_indices(""), None);
    }

    #[test]
    fn test_refinement_retains_only_insulin() {
        // Lead Type 1 Diabetes; Metformin not flagged as related, Type 2
        // Diabetes flagged as a subcondition, Insulin kept as a medication.
        // Menu is sorted: 1: Insulin, 2: Metformin, 3: Type 2 Diabetes
        let mut llm = ScriptedLlm {
            synonyms: "[]".to_string(),
            medications: "[1]".to_string(),
            subconditions: "[3]".to_string(),
        };
        let catalog = EmptyCatalog;
        let mut refiner = Refiner::new(&mut llm, &catalog, 10);

        let retained = refiner.remove_unrelated_phenotypes(
            &repo("Type 1 Diabetes"),
            vec![
                repo("Type 2 Diabetes"),
                repo("Metformin"),
                repo("Insulin"),
            ],
        );
        assert_eq!(retained, vec![repo("Insulin")]);
    }

    #[test]
    fn test_refinement_subcondition_exclusion_wins() {
        // Flagged as both synonym and subcondition: exclusion takes
        // precedence
        let mut llm = ScriptedLlm {
            synonyms: "[1]".to_string(),
            medications: "[]".to_string(),
            subconditions: "[1]".to_string(),
        };
        let catalog = EmptyCatalog;
        let mut refiner = Refiner::new(&mut llm, &catalog, 10);

        let retained = refiner
            .remove_unrelated_phenotypes(&repo("Dementia"), vec![repo("Vascular Dementia")]);
        assert!(retained.is_empty());
    }

    #[test]
    fn test_refinement_exact_matches_always_kept() {
        let mut llm = ScriptedLlm {
            synonyms: "[]".to_string(),
            medications: "[]".to_string(),
            subconditions: "[]".to_string(),
        };
        let catalog = EmptyCatalog;
        let mut refiner = Refiner::new(&mut llm, &catalog, 10);

        let retained = refiner.remove_unrelated_phenotypes(
            &repo("anxiety---a"),
            vec![repo("anxiety---b"), repo("copd---c")],
        );
        // "anxiety---b" shares the lead's phrase, kept without asking the
        // LLM; "copd---c" rejected by the empty answers
        assert_eq!(retained, vec![repo("anxiety---b")]);
    }

    #[test]
    fn test_refinement_fails_open_without_bracket() {
        let mut llm = ScriptedLlm {
            synonyms: "I cannot answer that.".to_string(),
            medications: "Still no list.".to_string(),
            subconditions: "Nope.".to_string(),
        };
        let catalog = EmptyCatalog;
        let mut refiner = Refiner::new(&mut llm, &catalog, 10);

        let candidates = vec![repo("Type 2 Diabetes"), repo("Insulin")];
        let retained = refiner
            .remove_unrelated_phenotypes(&repo("Type 1 Diabetes"), candidates.clone());
        // All three prompts failed: the cluster is left unchanged
        assert_eq!(retained, candidates);
    }

    #[test]
    fn test_catalog_augmentation_resolves_and_drops() {
        let lead = CuratorRepo::new("anxiety---a", "Anxiety - PH1");
        let group = PhenotypeGroup {
            lead: lead.clone(),
            siblings: vec![],
        };
        let known = vec![
            lead.clone(),
            CuratorRepo::new("anxiety-gad---b", "Generalised Anxiety - PH7"),
        ];
        let catalog = FixedCatalog(vec![
            CatalogHit {
                phenotype_id: "PH1".to_string(),
                name: None,
            },
            CatalogHit {
                phenotype_id: "PH7".to_string(),
                name: None,
            },
            CatalogHit {
                phenotype_id: "PH999".to_string(),
                name: None,
            },
        ]);
        let mut llm = ScriptedLlm {
            synonyms: "[]".to_string(),
            medications: "[]".to_string(),
            subconditions: "[]".to_string(),
        };
        let refiner = Refiner::new(&mut llm, &catalog, 10);

        let additional = refiner.additional_phenotypes_from_catalog(&group, &known);
        // PH1 already in the group, PH999 unresolvable, PH7 resolved
        assert_eq!(additional, vec![known[1].clone()]);
    }

    #[test]
    fn test_refine_dedup_invariant() {
        // Catalog augmentation pulls a workflow into the first group that
        // already sits in another; after refinement no repo is a sibling
        // of two groups
        let lead_a = CuratorRepo::new("diabetes---a", "Diabetes - PH1");
        let other = CuratorRepo::new("diabetes-insipidus---d", "Diabetes Insipidus - PH4");
        let lead_b = CuratorRepo::new("diabetes-mellitus---b", "Diabetes Mellitus - PH2");
        let shared = CuratorRepo::new("diabetes-type-2---c", "Type 2 Diabetes - PH3");

        let mut groups = PhenotypeGroups::new();
        groups.add_sibling(&lead_a, other.clone());
        groups.add_sibling(&lead_b, shared.clone());

        let repos = vec![
            lead_a.clone(),
            lead_b.clone(),
            other.clone(),
            shared.clone(),
        ];
        // The catalog surfaces PH3 for the first lead, creating a
        // cross-group duplicate the dedup pass must resolve
        let catalog = FixedCatalog(vec![CatalogHit {
            phenotype_id: "PH3".to_string(),
            name: None,
        }]);
        let mut llm = ScriptedLlm {
            synonyms: "[1, 2]".to_string(),
            medications: "[]".to_string(),
            subconditions: "[]".to_string(),
        };
        let mut refiner = Refiner::new(&mut llm, &catalog, 10);
        let refined = refiner.refine(groups, &repos);

        let mut sibling_homes = 0;
        for group in refined.iter() {
            if group.siblings.contains(&shared) {
                sibling_homes += 1;
            }
        }
        assert_eq!(sibling_homes, 1);
        // The second group was emptied by the dedup pass and dropped
        assert!(refined.get(&lead_b).is_none());
    }
}
