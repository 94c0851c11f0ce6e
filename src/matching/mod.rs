//! Matching Primitives
//!
//! Shared linguistic and string-similarity building blocks used by every
//! pipeline stage.
//!
//! - [`similarity`]: memoized normalized edit-distance ratio
//! - [`lexicon`]: stop-word / part-of-speech token classifier
//! - [`text`]: slug and "about" normalization, negation detection

pub mod lexicon;
pub mod similarity;
pub mod text;

pub use lexicon::{PosLexicon, PosTag, TokenClassifier};
pub use similarity::SimilarityCache;
pub use text::{
    about_components, clean, is_negative, name_components, phenotype_phrase, STEP_SEPARATOR,
    STEP_SUFFIX,
};

/// Mutable matching state threaded through the pipeline stages.
///
/// Holds the two memoization caches; a single instance is owned by the
/// pipeline, with no concurrent writers.
#[derive(Debug, Default)]
pub struct MatchContext {
    pub classifier: TokenClassifier,
    pub similarity: SimilarityCache,
}

impl MatchContext {
    /// Creates a context around a freshly built lexicon.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context around an explicitly initialized lexicon.
    pub fn with_lexicon(lexicon: PosLexicon) -> Self {
        Self {
            classifier: TokenClassifier::new(lexicon),
            similarity: SimilarityCache::new(),
        }
    }
}
