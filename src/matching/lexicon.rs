//! Token Classification
//!
//! Decides whether a word carries signal when comparing phenotype names and
//! step names. Combines fixed stop-word lists (generic disease-descriptor
//! nouns plus filler words), a dosage pattern, and a part-of-speech check
//! backed by a function-word lexicon. Results are memoized per distinct
//! word for the process lifetime.
//!
//! The lexicon is built once per process and handed to the classifier at
//! construction; it is a read-only resource, not a hidden module singleton.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

/// Generic disease-descriptor nouns that appear in most phenotype names and
/// therefore distinguish nothing.
const PHENOTYPE_SYNONYMS: &[&str] = &[
    "syndrome",
    "infection",
    "infections",
    "disease",
    "diseases",
    "disorder",
    "disorders",
    "malignancy",
    "status",
    "diagnosis",
    "dysfunction",
    "accident",
    "difficulty",
    "symptom",
    "symptoms",
    "phenotype",
];

/// Filler words with no clinical content.
const IGNORE_WORDS: &[&str] = &["not", "use", "type", "using", "anything", "enjoying"];

/// Coordinating conjunctions.
const CCONJ: &[&str] = &["and", "or", "but", "nor", "yet", "so", "both", "either", "neither"];

/// Subordinating conjunctions.
const SCONJ: &[&str] = &[
    "if", "because", "while", "although", "though", "since", "unless", "whereas", "whether",
    "once", "that", "till", "lest",
];

/// Adpositions (prepositions).
const ADP: &[&str] = &[
    "in", "on", "at", "by", "for", "with", "from", "into", "during", "including", "until",
    "against", "among", "throughout", "despite", "towards", "toward", "upon", "concerning",
    "of", "to", "over", "under", "above", "below", "between", "without", "within", "along",
    "following", "across", "behind", "beyond", "except", "near", "off", "out", "per", "via",
    "after", "before", "about", "around", "up", "down",
];

/// Common adverbs.
const ADV: &[&str] = &[
    "very", "really", "quite", "too", "also", "just", "only", "never", "always", "often",
    "sometimes", "rarely", "seldom", "however", "there", "here", "now", "then", "more",
    "most", "less", "least", "well", "early", "late", "recently", "currently", "previously",
    "again", "still", "already", "soon", "almost", "ever", "away", "else", "even", "instead",
    "rather", "together", "yes", "no", "where", "when", "why", "how",
];

/// Dosage tokens such as "500mg" carry no phenotype signal.
static DOSAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+mg$").expect("valid dosage pattern"));

/// Coarse part-of-speech tags relevant to token filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosTag {
    CoordinatingConjunction,
    SubordinatingConjunction,
    Adposition,
    Adverb,
    Other,
}

/// Fixed English function-word lexicon used as the part-of-speech tagger.
///
/// Built once per process; lookups are case-insensitive.
#[derive(Debug)]
pub struct PosLexicon {
    cconj: HashSet<&'static str>,
    sconj: HashSet<&'static str>,
    adp: HashSet<&'static str>,
    adv: HashSet<&'static str>,
}

impl PosLexicon {
    /// Builds the lexicon from the built-in word lists.
    pub fn new() -> Self {
        Self {
            cconj: CCONJ.iter().copied().collect(),
            sconj: SCONJ.iter().copied().collect(),
            adp: ADP.iter().copied().collect(),
            adv: ADV.iter().copied().collect(),
        }
    }

    /// Tags a single word. Conjunction lists win over the adposition list
    /// for words appearing in both (e.g. "so").
    pub fn tag(&self, word: &str) -> PosTag {
        let word = word.to_lowercase();
        let word = word.as_str();
        if self.cconj.contains(word) {
            PosTag::CoordinatingConjunction
        } else if self.sconj.contains(word) {
            PosTag::SubordinatingConjunction
        } else if self.adp.contains(word) {
            PosTag::Adposition
        } else if self.adv.contains(word) {
            PosTag::Adverb
        } else {
            PosTag::Other
        }
    }
}

impl Default for PosLexicon {
    fn default() -> Self {
        Self::new()
    }
}

/// Memoizing stop-word / part-of-speech filter for name components.
#[derive(Debug)]
pub struct TokenClassifier {
    lexicon: PosLexicon,
    cache: HashMap<String, bool>,
}

impl TokenClassifier {
    /// Creates a classifier around an already-initialized lexicon.
    pub fn new(lexicon: PosLexicon) -> Self {
        Self {
            lexicon,
            cache: HashMap::new(),
        }
    }

    /// Returns true if the word should be ignored when comparing names.
    ///
    /// Rules in priority order: empty words are ignored; purely numeric
    /// tokens are never ignored (dosage and version numbers carry signal);
    /// then short tokens, stop-word lists, dosage patterns, and
    /// function-word part-of-speech tags are all ignored.
    pub fn ignore(&mut self, word: &str) -> bool {
        if word.is_empty() {
            return true;
        }
        if word.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
        if let Some(&ignore) = self.cache.get(word) {
            return ignore;
        }
        let lower = word.to_lowercase();
        let tag = self.lexicon.tag(word);
        let ignore = word.chars().count() <= 2
            || PHENOTYPE_SYNONYMS.contains(&lower.as_str())
            || IGNORE_WORDS.contains(&lower.as_str())
            || DOSAGE.is_match(&lower)
            || matches!(
                tag,
                PosTag::CoordinatingConjunction
                    | PosTag::SubordinatingConjunction
                    | PosTag::Adposition
                    | PosTag::Adverb
            );
        self.cache.insert(word.to_string(), ignore);
        ignore
    }

    /// Drops all memoized classifications.
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

impl Default for TokenClassifier {
    fn default() -> Self {
        Self::new(PosLexicon::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_word_ignored() {
        let mut classifier = TokenClassifier::default();
        assert!(classifier.ignore(""));
    }

    #[test]
    fn test_numeric_word_kept() {
        let mut classifier = TokenClassifier::default();
        assert!(!classifier.ignore("1"));
        assert!(!classifier.ignore("2024"));
    }

    #[test]
    fn test_short_word_ignored() {
        let mut classifier = TokenClassifier::default();
        assert!(classifier.ignore("a"));
        assert!(classifier.ignore("b1"));
    }

    #[test]
    fn test_stop_words_ignored() {
        let mut classifier = TokenClassifier::default();
        for word in ["syndrome", "Disease", "DISORDERS", "status", "diagnosis"] {
            assert!(classifier.ignore(word), "{} should be ignored", word);
        }
        for word in ["not", "use", "type", "using"] {
            assert!(classifier.ignore(word), "{} should be ignored", word);
        }
    }

    #[test]
    fn test_dosage_pattern_ignored() {
        let mut classifier = TokenClassifier::default();
        assert!(classifier.ignore("500mg"));
        assert!(classifier.ignore("metformin500mg"));
        // Bare "mg" is already short; a word merely ending in "mg" without
        // digits is kept
        assert!(!classifier.ignore("nutmeg"));
    }

    #[test]
    fn test_function_words_ignored() {
        let mut classifier = TokenClassifier::default();
        for word in ["and", "because", "with", "without", "never", "during"] {
            assert!(classifier.ignore(word), "{} should be ignored", word);
        }
    }

    #[test]
    fn test_clinical_content_kept() {
        let mut classifier = TokenClassifier::default();
        for word in ["diabetes", "anxiety", "metformin", "exudative", "mellitus"] {
            assert!(!classifier.ignore(word), "{} should be kept", word);
        }
    }

    #[test]
    fn test_memoized_matches_fresh() {
        let mut classifier = TokenClassifier::default();
        let words = ["diabetes", "and", "syndrome", "500mg", "2"];
        let first: Vec<bool> = words.iter().map(|w| classifier.ignore(w)).collect();
        let cached: Vec<bool> = words.iter().map(|w| classifier.ignore(w)).collect();
        assert_eq!(first, cached);

        classifier.clear();
        let fresh: Vec<bool> = words.iter().map(|w| classifier.ignore(w)).collect();
        assert_eq!(first, fresh);
    }

    #[test]
    fn test_lexicon_tags() {
        let lexicon = PosLexicon::new();
        assert_eq!(lexicon.tag("and"), PosTag::CoordinatingConjunction);
        assert_eq!(lexicon.tag("Because"), PosTag::SubordinatingConjunction);
        assert_eq!(lexicon.tag("with"), PosTag::Adposition);
        assert_eq!(lexicon.tag("never"), PosTag::Adverb);
        assert_eq!(lexicon.tag("diabetes"), PosTag::Other);
    }
}
