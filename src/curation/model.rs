//! Curation Data Model
//!
//! Core records flowing through the pipeline: workflow repositories, the
//! phenotype groups built from them, and the step intersections discovered
//! inside finalized groups.
//!
//! Group and intersection collections are vector-backed rather than
//! hash-map-backed so that iteration follows insertion order; group
//! assignment and intersection output must be deterministic given identical
//! input ordering.

use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A phenotype-definition workflow repository.
///
/// `name` follows the slug---suffix convention; `about` is a free-text
/// description, often "<Display Name> - <CatalogID>". Identity (equality
/// and hashing) is by name alone; the description is a non-identifying
/// attribute.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CuratorRepo {
    pub name: String,
    pub about: String,
}

impl CuratorRepo {
    /// Creates a repository record.
    pub fn new(name: impl Into<String>, about: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            about: about.into(),
        }
    }
}

impl PartialEq for CuratorRepo {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for CuratorRepo {}

impl Hash for CuratorRepo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// Repositories paired with their discovered step filenames, in listing
/// order.
pub type RepoSteps = Vec<(CuratorRepo, Vec<String>)>;

/// One lead repository and the siblings judged to represent the same
/// phenotype.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PhenotypeGroup {
    pub lead: CuratorRepo,
    pub siblings: Vec<CuratorRepo>,
}

/// Ordered collection of phenotype groups.
///
/// Invariant: a repository appears as a sibling in at most one group.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PhenotypeGroups {
    groups: Vec<PhenotypeGroup>,
}

impl PhenotypeGroups {
    /// Creates an empty group set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns true if no groups exist.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterates groups in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &PhenotypeGroup> {
        self.groups.iter()
    }

    /// Returns the group led by `lead`, if any.
    pub fn get(&self, lead: &CuratorRepo) -> Option<&PhenotypeGroup> {
        self.groups.iter().find(|group| &group.lead == lead)
    }

    /// Appends a sibling under `lead`, creating the group on first use.
    pub fn add_sibling(&mut self, lead: &CuratorRepo, sibling: CuratorRepo) {
        match self.groups.iter_mut().find(|group| &group.lead == lead) {
            Some(group) => group.siblings.push(sibling),
            None => self.groups.push(PhenotypeGroup {
                lead: lead.clone(),
                siblings: vec![sibling],
            }),
        }
    }

    /// Replaces the sibling list of an existing group.
    pub fn set_siblings(&mut self, lead: &CuratorRepo, siblings: Vec<CuratorRepo>) {
        if let Some(group) = self.groups.iter_mut().find(|group| &group.lead == lead) {
            group.siblings = siblings;
        }
    }

    /// Returns true if `repo` is currently a sibling in any group.
    pub fn is_sibling(&self, repo: &CuratorRepo) -> bool {
        self.groups
            .iter()
            .any(|group| group.siblings.contains(repo))
    }

    /// Group leads ranked by sibling count, descending, ties in insertion
    /// order.
    pub fn leads_by_size(&self) -> Vec<CuratorRepo> {
        let mut leads: Vec<(usize, CuratorRepo)> = self
            .groups
            .iter()
            .map(|group| (group.siblings.len(), group.lead.clone()))
            .collect();
        leads.sort_by(|a, b| b.0.cmp(&a.0));
        leads.into_iter().map(|(_, lead)| lead).collect()
    }

    /// Removes `duplicates` from the sibling lists of every group whose
    /// lead is not in `ignore`, dropping groups emptied by the removal.
    pub fn remove_duplicates(&mut self, duplicates: &[CuratorRepo], ignore: &[CuratorRepo]) {
        self.groups.retain_mut(|group| {
            if ignore.contains(&group.lead) {
                return true;
            }
            group
                .siblings
                .retain(|sibling| !duplicates.contains(sibling));
            !group.siblings.is_empty()
        });
    }
}

impl FromIterator<PhenotypeGroup> for PhenotypeGroups {
    fn from_iter<I: IntoIterator<Item = PhenotypeGroup>>(iter: I) -> Self {
        Self {
            groups: iter.into_iter().collect(),
        }
    }
}

/// Matched step pairs between one unordered pair of group members.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkflowPairSteps {
    pub left: CuratorRepo,
    pub right: CuratorRepo,
    /// Ordered set: each (stepA, stepB) pair recorded at most once.
    pub steps: BTreeSet<(String, String)>,
}

/// All intersections found within one phenotype group.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct GroupIntersections {
    pairs: Vec<WorkflowPairSteps>,
}

impl GroupIntersections {
    /// Creates an empty intersection set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of workflow pairs with at least one matched step.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if no pairs have been recorded.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterates recorded pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &WorkflowPairSteps> {
        self.pairs.iter()
    }

    /// Returns true if (left, right) is recorded in this exact order.
    pub fn contains_pair(&self, left: &CuratorRepo, right: &CuratorRepo) -> bool {
        self.pairs
            .iter()
            .any(|entry| &entry.left == left && &entry.right == right)
    }

    /// Returns true if the pair (left, right) already holds the step pair
    /// (step_a, step_b).
    pub fn contains_steps(
        &self,
        left: &CuratorRepo,
        right: &CuratorRepo,
        step_a: &str,
        step_b: &str,
    ) -> bool {
        self.pairs
            .iter()
            .filter(|entry| &entry.left == left && &entry.right == right)
            .any(|entry| {
                entry
                    .steps
                    .contains(&(step_a.to_string(), step_b.to_string()))
            })
    }

    /// Records a matched step pair under (left, right), creating the pair
    /// entry on first use.
    pub fn add(
        &mut self,
        left: &CuratorRepo,
        right: &CuratorRepo,
        step_a: String,
        step_b: String,
    ) {
        match self
            .pairs
            .iter_mut()
            .find(|entry| &entry.left == left && &entry.right == right)
        {
            Some(entry) => {
                entry.steps.insert((step_a, step_b));
            }
            None => {
                let mut steps = BTreeSet::new();
                steps.insert((step_a, step_b));
                self.pairs.push(WorkflowPairSteps {
                    left: left.clone(),
                    right: right.clone(),
                    steps,
                });
            }
        }
    }
}

/// Intersections per group lead, in group order.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Intersections {
    entries: Vec<(CuratorRepo, GroupIntersections)>,
}

impl Intersections {
    /// Creates an empty intersection map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of leads with computed intersections.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been computed yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates (lead, intersections) in group order.
    pub fn iter(&self) -> impl Iterator<Item = &(CuratorRepo, GroupIntersections)> {
        self.entries.iter()
    }

    /// Returns the intersections recorded for a lead, if any.
    pub fn get(&self, lead: &CuratorRepo) -> Option<&GroupIntersections> {
        self.entries
            .iter()
            .find(|(entry_lead, _)| entry_lead == lead)
            .map(|(_, intersections)| intersections)
    }

    /// Stores the intersections for a lead.
    pub fn insert(&mut self, lead: CuratorRepo, intersections: GroupIntersections) {
        self.entries.push((lead, intersections));
    }

    /// Total number of workflow pairs with common steps, across all leads.
    pub fn pair_count(&self) -> usize {
        self.entries
            .iter()
            .map(|(_, intersections)| intersections.len())
            .sum()
    }
}
