//! Balanced-brace scan for JSON objects embedded in prose.

use serde_json::{Map, Value};

use super::json;

/// Spans tried before giving up; bounds work on pathological input.
const MAX_CANDIDATES: usize = 64;

/// First balanced `{...}` span, by start position, that parses as an object
/// carrying an analysis field.
pub(super) fn find_object(text: &str) -> Option<Map<String, Value>> {
    balanced_spans(text)
        .into_iter()
        .take(MAX_CANDIDATES)
        .find_map(|(start, end)| json::parse_object(&text[start..end]))
}

/// Byte ranges of every balanced brace pair, ordered by opening position.
///
/// Braces inside double-quoted strings are ignored. Unclosed openers and
/// stray closers are skipped.
fn balanced_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut open: Vec<usize> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' if !open.is_empty() => in_string = true,
            '{' => open.push(i),
            '}' => {
                if let Some(start) = open.pop() {
                    spans.push((start, i + 1));
                }
            }
            _ => {}
        }
    }

    spans.sort_by_key(|&(start, _)| start);
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spans_ignore_braces_in_strings() {
        let text = r#"x {"summary": "a } b {"} y"#;
        let spans = balanced_spans(text);
        assert_eq!(spans.len(), 1);
        let (start, end) = spans[0];
        assert_eq!(&text[start..end], r#"{"summary": "a } b {"}"#);
    }

    #[test]
    fn test_nested_spans_ordered_by_start() {
        let spans = balanced_spans("{a{b}c}");
        assert_eq!(spans, vec![(0, 7), (2, 5)]);
    }

    #[test]
    fn test_find_object_skips_unrelated_objects() {
        let text = r#"Config {"temperature": 1} then {"summary": "found"}"#;
        let object = find_object(text).unwrap();
        assert_eq!(object["summary"], "found");
    }

    #[test]
    fn test_find_object_falls_through_to_nested() {
        let text = r#"wrapped: {"result": {"core_topic": "inner"}} done"#;
        let object = find_object(text).unwrap();
        assert_eq!(object["core_topic"], "inner");
    }

    #[test]
    fn test_truncated_object_is_not_found() {
        assert!(find_object(r#"{"summary": "cut off"#).is_none());
        assert!(find_object("}}}{{{").is_none());
    }
}
