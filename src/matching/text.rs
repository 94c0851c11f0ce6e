//! Name Normalization
//!
//! Phenotype workflow repositories and their step files share a naming
//! convention: a hyphenated phenotype slug, the `---` marker, and a unique
//! suffix (`anxiety-specified---primary.cwl`). The helpers here extract
//! comparable tokens from those names and from the free-text "about"
//! field, and detect negated phrasing.

use once_cell::sync::Lazy;
use regex::Regex;

/// Marker separating a phenotype slug from its unique suffix.
pub const STEP_SEPARATOR: &str = "---";

/// Recognized workflow-step file suffix.
pub const STEP_SUFFIX: &str = ".cwl";

/// Doubled hyphens are artifacts of concatenating slug fragments.
static DOUBLE_HYPHEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w)--(\w)").expect("valid double-hyphen pattern"));

/// Splits the slug portion of a name into its hyphen-separated components.
///
/// Only the portion before the last `---` marker is considered; names
/// without the marker yield no components.
pub fn name_components(name: &str) -> Vec<String> {
    match name.rfind(STEP_SEPARATOR) {
        Some(idx) => name[..idx].split('-').map(str::to_string).collect(),
        None => Vec::new(),
    }
}

/// Splits an "about" description into normalized components.
///
/// The field conventionally reads "<Display Name> - <CatalogID>"; each
/// " - "-separated segment is stripped of parentheses and slashes, has its
/// internal spaces replaced with hyphens, and is lowercased.
pub fn about_components(about: &str) -> Vec<String> {
    about
        .split(" - ")
        .map(|component| {
            component
                .replace(['(', ')', '/'], "")
                .replace(' ', "-")
                .to_lowercase()
        })
        .collect()
}

/// Collapses a doubled hyphen between two word characters into one.
pub fn clean(input: &str) -> String {
    DOUBLE_HYPHEN.replace_all(input, "$1-$2").to_string()
}

/// Returns true if a phrase reads as negated.
///
/// Checks for the words "not", "never", "no", "without", and for any token
/// starting with "non" or "un". The prefix check is unconditional, so
/// unrelated words such as "united" also register as negative; this
/// imprecision is accepted and relied upon elsewhere.
pub fn is_negative(phrase: &str) -> bool {
    let phrase = phrase.to_lowercase();
    phrase.split(' ').any(|word| {
        word == "not"
            || word == "never"
            || word == "no"
            || word == "without"
            || word.starts_with("non")
            || word.starts_with("un")
    })
}

/// Human-readable phenotype phrase of a repository name.
///
/// The slug before the first `---` with hyphens turned back into spaces;
/// used for catalog queries and LLM prompt menus. Names without the marker
/// pass through with hyphens replaced.
pub fn phenotype_phrase(name: &str) -> String {
    let slug = name.split(STEP_SEPARATOR).next().unwrap_or(name);
    slug.replace('-', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_components_with_marker() {
        assert_eq!(
            name_components("anxiety-specified---primary.cwl"),
            vec!["anxiety", "specified"]
        );
        assert_eq!(
            name_components("type-1-diabetes---km"),
            vec!["type", "1", "diabetes"]
        );
    }

    #[test]
    fn test_name_components_last_marker_wins() {
        assert_eq!(
            name_components("copd---exacerbation---icd"),
            vec!["copd", "", "", "exacerbation"]
        );
    }

    #[test]
    fn test_name_components_without_marker() {
        assert!(name_components("plain-name").is_empty());
        assert!(name_components("").is_empty());
    }

    #[test]
    fn test_about_components() {
        assert_eq!(
            about_components("Anxiety (Primary Care) - PH152"),
            vec!["anxiety-primary-care", "ph152"]
        );
        assert_eq!(
            about_components("COPD/Asthma overlap"),
            vec!["copdasthma-overlap"]
        );
    }

    #[test]
    fn test_clean_repairs_double_hyphen() {
        assert_eq!(clean("exudative--diabetes"), "exudative-diabetes");
        // Triple hyphens are not word-adjacent on both sides, left alone
        assert_eq!(clean("slug---suffix"), "slug---suffix");
        assert_eq!(clean("already-fine"), "already-fine");
    }

    #[test]
    fn test_is_negative_words() {
        assert!(is_negative("not recorded"));
        assert!(is_negative("never smoked"));
        assert!(is_negative("no history"));
        assert!(is_negative("without complications"));
        assert!(!is_negative("anxiety specified"));
    }

    #[test]
    fn test_is_negative_prefixes() {
        assert!(is_negative("anxiety unspecified"));
        assert!(is_negative("non insulin dependent"));
        // Accepted imprecision: any "un"/"non" prefix counts
        assert!(is_negative("united kingdom"));
    }

    #[test]
    fn test_negation_polarity_differs() {
        let specified = name_components("anxiety-specified---primary.cwl").join(" ");
        let unspecified = name_components("anxiety-unspecified---icd.cwl").join(" ");
        assert_ne!(is_negative(&specified), is_negative(&unspecified));
    }

    #[test]
    fn test_phenotype_phrase() {
        assert_eq!(phenotype_phrase("type-1-diabetes---km"), "type 1 diabetes");
        assert_eq!(phenotype_phrase("Type 1 Diabetes"), "Type 1 Diabetes");
    }
}
