//! Phenotype curation: grouping, LLM-assisted refinement, step
//! intersection discovery, and the pipeline that sequences them.

pub mod grouping;
pub mod intersect;
pub mod model;
pub mod pipeline;
pub mod refine;

pub use model::{
    CuratorRepo, GroupIntersections, Intersections, PhenotypeGroup, PhenotypeGroups, RepoSteps,
    WorkflowPairSteps,
};
pub use pipeline::Curator;
