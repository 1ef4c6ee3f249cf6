//! Heading-style section extraction for prose responses.
//!
//! Recognizes lines such as `Categories: a, b`, `**2. Key Takeaways:**`,
//! `### Summary:` or `**Verdict**: ...`. A section runs until the next
//! heading; its body becomes the field value.

use std::sync::LazyLock;

use regex::Regex;

use super::{dedup, fill_slot, non_blank, split_list, AnalysisCandidate, Provenance};

static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?P<deco>#{1,6}\s*|\*\*|__)?\s*(?P<num>\d{1,2}[.)]\s*)?(?:\*\*|__)?(?P<name>[A-Za-z][A-Za-z &/_-]{0,40}?)\s*(?:\*\*|__)?\s*:\s*(?:\*\*|__)?(?P<rest>.*)$",
    )
    .unwrap()
});

static INLINE_VERDICT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bverdict\b[^:\n]{0,20}:\s*([^\n]+)").unwrap());

static INLINE_JUSTIFICATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bjustification\b[^:\n]{0,20}:\s*([^\n]+)").unwrap());

static WORTH_WATCHING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)worth\s+watching").unwrap());

static SUMMARY_SUFFICIENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)summary\s+sufficient").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    CoreTopic,
    Summary,
    Structure,
    Takeaways,
    Categories,
    Verdict,
    Justification,
}

impl Field {
    fn from_heading(heading: &str) -> Option<Self> {
        let heading = heading
            .replace('_', " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        match heading.as_str() {
            "core topic & purpose" | "core topic and purpose" | "core topic" | "topic"
            | "purpose" => Some(Field::CoreTopic),
            "summary" | "detailed summary" | "summary & structure"
            | "detailed summary & structure" => Some(Field::Summary),
            "structure" => Some(Field::Structure),
            "key takeaways" | "takeaways" => Some(Field::Takeaways),
            "categories" | "categories/tags" | "categories & tags" | "category" | "tags" => {
                Some(Field::Categories)
            }
            "verdict" | "final verdict" => Some(Field::Verdict),
            "justification" | "reasoning" => Some(Field::Justification),
            _ => None,
        }
    }
}

/// Fill unset candidate fields from heading sections.
///
/// With `loose` set (no JSON object was found) inline `Verdict:` and
/// `Justification:` mentions and bare verdict phrases are also accepted.
pub(super) fn fill(candidate: &mut AnalysisCandidate, text: &str, loose: bool) {
    for (field, body) in split_sections(text) {
        apply(candidate, field, &body);
    }

    if !loose {
        return;
    }

    if let Some(caps) = INLINE_VERDICT.captures(text) {
        fill_slot(&mut candidate.verdict_text, non_blank(&caps[1]), Provenance::Regex);
    }
    if let Some(caps) = INLINE_JUSTIFICATION.captures(text) {
        fill_slot(&mut candidate.justification, non_blank(&caps[1]), Provenance::Regex);
    }

    let phrase = if WORTH_WATCHING.is_match(text) {
        Some("Worth Watching")
    } else if SUMMARY_SUFFICIENT.is_match(text) {
        Some("Summary Sufficient")
    } else {
        None
    };
    fill_slot(
        &mut candidate.verdict_text,
        phrase.map(str::to_string),
        Provenance::Heuristic,
    );
}

fn apply(candidate: &mut AnalysisCandidate, field: Field, body: &str) {
    let text = || non_blank(body.trim_end_matches('*'));
    let list = || {
        let items = split_list(body);
        (!items.is_empty()).then_some(items)
    };

    match field {
        Field::CoreTopic => fill_slot(&mut candidate.core_topic, text(), Provenance::Regex),
        Field::Summary => fill_slot(&mut candidate.summary, text(), Provenance::Regex),
        Field::Structure => fill_slot(&mut candidate.structure, text(), Provenance::Regex),
        Field::Takeaways => fill_slot(&mut candidate.takeaways, list(), Provenance::Regex),
        Field::Categories => fill_slot(
            &mut candidate.categories,
            list().map(dedup).filter(|c| !c.is_empty()),
            Provenance::Regex,
        ),
        Field::Verdict => {
            let first_line = body.lines().find_map(non_blank);
            fill_slot(&mut candidate.verdict_text, first_line, Provenance::Regex)
        }
        Field::Justification => {
            fill_slot(&mut candidate.justification, text(), Provenance::Regex)
        }
    }
}

/// Known sections in document order.
///
/// Unknown headings close the open section when they are decorated
/// (markdown heading, bold, numbered) or have no inline text; otherwise
/// they are ordinary body lines such as `Note: ...`.
fn split_sections(text: &str) -> Vec<(Field, String)> {
    let mut sections = Vec::new();
    let mut current: Option<(Field, String)> = None;

    for line in text.lines() {
        if let Some(caps) = HEADING.captures(line) {
            let rest = caps.name("rest").map_or("", |m| m.as_str()).trim();
            match Field::from_heading(&caps["name"]) {
                Some(field) => {
                    sections.extend(current.take());
                    current = Some((field, rest.to_string()));
                    continue;
                }
                None => {
                    let decorated = caps.name("deco").is_some() || caps.name("num").is_some();
                    if decorated || rest.is_empty() {
                        sections.extend(current.take());
                        continue;
                    }
                }
            }
        }

        if let Some((_, body)) = current.as_mut() {
            if !body.is_empty() {
                body.push('\n');
            }
            body.push_str(line.trim_end());
        }
    }

    sections.extend(current);
    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections_of(text: &str) -> AnalysisCandidate {
        let mut candidate = AnalysisCandidate::default();
        fill(&mut candidate, text, true);
        candidate
    }

    #[test]
    fn test_bold_numbered_headings() {
        let text = "**1. Core Topic & Purpose:** Explains sourdough starters.\n\
                    **2. Key Takeaways:**\n\
                    * Feed daily\n\
                    * Keep it warm\n\
                    **3. Categories/Tags:** Cooking, Baking\n\
                    **4. Verdict:** Summary Sufficient\n\
                    **5. Justification:** The summary covers it.";
        let candidate = sections_of(text);

        assert_eq!(
            candidate.core_topic.unwrap().value,
            "Explains sourdough starters."
        );
        assert_eq!(
            candidate.takeaways.unwrap().value,
            vec!["Feed daily", "Keep it warm"]
        );
        assert_eq!(candidate.categories.unwrap().value, vec!["Cooking", "Baking"]);
        assert_eq!(candidate.verdict_text.unwrap().value, "Summary Sufficient");
        assert_eq!(
            candidate.justification.unwrap().value,
            "The summary covers it."
        );
    }

    #[test]
    fn test_markdown_and_plain_headings() {
        let text = "### Summary:\nA long talk.\nWith two lines.\n\nCategories:\n- Music\n- Live";
        let candidate = sections_of(text);

        assert_eq!(candidate.summary.unwrap().value, "A long talk.\nWith two lines.");
        assert_eq!(candidate.categories.unwrap().value, vec!["Music", "Live"]);
    }

    #[test]
    fn test_repeated_takeaways_kept_categories_deduplicated() {
        let text = "Key Takeaways:\n- Practice\n- Rest\n- Practice\nCategories: Music, Music, Live";
        let candidate = sections_of(text);

        assert_eq!(
            candidate.takeaways.unwrap().value,
            vec!["Practice", "Rest", "Practice"]
        );
        assert_eq!(candidate.categories.unwrap().value, vec!["Music", "Live"]);
    }

    #[test]
    fn test_unknown_decorated_heading_closes_section() {
        let text = "Categories: Film\n**Watch Value Assessment:**\nVerdict: Worth Watching";
        let candidate = sections_of(text);

        assert_eq!(candidate.categories.unwrap().value, vec!["Film"]);
        assert_eq!(candidate.verdict_text.unwrap().value, "Worth Watching");
    }

    #[test]
    fn test_plain_note_line_stays_in_body() {
        let text = "Summary: First part.\nNote: second part.";
        let candidate = sections_of(text);
        assert_eq!(
            candidate.summary.unwrap().value,
            "First part.\nNote: second part."
        );
    }

    #[test]
    fn test_phrase_scan_only_when_loose() {
        let text = "I think this one is worth watching overall.";

        let loose = sections_of(text);
        let verdict = loose.verdict_text.unwrap();
        assert_eq!(verdict.value, "Worth Watching");
        assert_eq!(verdict.provenance, Provenance::Heuristic);

        let mut strict = AnalysisCandidate::default();
        fill(&mut strict, text, false);
        assert!(strict.verdict_text.is_none());
    }

    #[test]
    fn test_inline_verdict_mid_line() {
        let candidate = sections_of("Overall my verdict: summary sufficient. Justification: short clip");
        assert_eq!(
            candidate.verdict_text.unwrap().value,
            "summary sufficient. Justification: short clip"
        );
        assert_eq!(candidate.justification.unwrap().value, "short clip");
    }

    #[test]
    fn test_existing_fields_are_not_overwritten() {
        let mut candidate = AnalysisCandidate::default();
        candidate.summary = Some(super::super::Extracted::new(
            "from json".to_string(),
            Provenance::Json,
        ));
        fill(&mut candidate, "Summary: from prose", false);
        assert_eq!(candidate.summary.unwrap().value, "from json");
    }
}
