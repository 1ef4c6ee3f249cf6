//! Category fallback for analyses that named no categories.

use super::{AnalysisCandidate, Extracted, Provenance};

/// Most categories the taxonomy contributes.
const MAX_CATEGORIES: usize = 5;

/// Category used when only a verdict could be recovered.
pub const VERDICT_ONLY_CATEGORY: &str = "Content Analysis";

/// Category used when nothing else applies.
pub const GENERIC_CATEGORY: &str = "Video Content";

/// Keyword rules, matched as case-insensitive substrings, in output order.
const TAXONOMY: &[(&str, &[&str])] = &[
    ("Review", &["review", "critique", "analysis"]),
    ("Tutorial", &["tutorial", "guide", "how to", "learn", "teaching"]),
    ("Comedy", &["comedy", "comedic", "humor", "funny", "joke"]),
    ("Documentary", &["documentary", "history", "historical", "real"]),
    ("Educational", &["education", "educational", "lecture", "learn"]),
    ("Entertainment", &["entertainment", "show", "performance"]),
    ("Music", &["music", "song", "concert", "musician", "band"]),
    (
        "Technology",
        &["tech", "technology", "software", "hardware", "digital"],
    ),
    ("Gaming", &["game", "gaming", "video game", "gameplay"]),
    ("Film", &["film", "movie", "cinema", "director", "actor"]),
    (
        "Television",
        &["tv", "television", "show", "series", "episode"],
    ),
];

/// Categories whose keywords occur in `text`, capped at [`MAX_CATEGORIES`].
pub fn categorize(text: &str) -> Vec<String> {
    let text = text.to_lowercase();
    TAXONOMY
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(category, _)| category.to_string())
        .take(MAX_CATEGORIES)
        .collect()
}

/// Guarantee non-empty categories on any non-empty candidate.
pub(super) fn fill_categories(candidate: &mut AnalysisCandidate) {
    if candidate.categories.is_some() || candidate.is_empty() {
        return;
    }

    let source: Vec<&str> = [&candidate.core_topic, &candidate.summary]
        .into_iter()
        .flatten()
        .map(|e| e.value.as_str())
        .collect();

    let mut categories = categorize(&source.join("\n"));
    if categories.is_empty() {
        let fallback = if candidate.verdict_text.is_some() {
            VERDICT_ONLY_CATEGORY
        } else {
            GENERIC_CATEGORY
        };
        categories.push(fallback.to_string());
    }

    candidate.categories = Some(Extracted::new(categories, Provenance::Heuristic));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate_with_topic(topic: &str) -> AnalysisCandidate {
        AnalysisCandidate {
            core_topic: Some(Extracted::new(topic.to_string(), Provenance::Json)),
            ..Default::default()
        }
    }

    #[test]
    fn test_categorize_matches_keywords() {
        assert_eq!(
            categorize("A Software TUTORIAL for beginners"),
            vec!["Tutorial", "Technology"]
        );
        assert!(categorize("quarterly earnings call").is_empty());
    }

    #[test]
    fn test_categorize_caps_results() {
        let text = "review tutorial comedy documentary lecture music tech game film";
        assert_eq!(categorize(text).len(), MAX_CATEGORIES);
    }

    #[test]
    fn test_fill_from_topic() {
        let mut candidate = candidate_with_topic("A concert film");
        fill_categories(&mut candidate);

        let categories = candidate.categories.unwrap();
        assert_eq!(categories.value, vec!["Music", "Film"]);
        assert_eq!(categories.provenance, Provenance::Heuristic);
    }

    #[test]
    fn test_fallbacks_when_no_keyword_matches() {
        let mut plain = candidate_with_topic("quarterly earnings call");
        fill_categories(&mut plain);
        assert_eq!(plain.categories.unwrap().value, vec![GENERIC_CATEGORY]);

        let mut with_verdict = AnalysisCandidate {
            verdict_text: Some(Extracted::new("meh".to_string(), Provenance::Regex)),
            ..Default::default()
        };
        fill_categories(&mut with_verdict);
        assert_eq!(
            with_verdict.categories.unwrap().value,
            vec![VERDICT_ONLY_CATEGORY]
        );
    }

    #[test]
    fn test_empty_candidate_untouched() {
        let mut candidate = AnalysisCandidate::default();
        fill_categories(&mut candidate);
        assert!(candidate.categories.is_none());
    }
}
