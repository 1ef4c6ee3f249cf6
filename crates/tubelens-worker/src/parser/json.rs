//! JSON field extraction with defensive type coercion.

use serde_json::{Map, Value};

use super::{dedup, fill_slot, split_list, AnalysisCandidate, Provenance};

const CORE_TOPIC: &[&str] = &["core_topic", "coreTopic", "topic"];
const SUMMARY: &[&str] = &["summary"];
const STRUCTURE: &[&str] = &["structure"];
const TAKEAWAYS: &[&str] = &["takeaways", "key_takeaways", "keyTakeaways"];
const CATEGORIES: &[&str] = &["categories", "tags"];
const VERDICT: &[&str] = &["verdict"];
const JUSTIFICATION: &[&str] = &["justification"];

const ALL_FIELDS: &[&[&str]] = &[
    CORE_TOPIC,
    SUMMARY,
    STRUCTURE,
    TAKEAWAYS,
    CATEGORIES,
    VERDICT,
    JUSTIFICATION,
];

/// Parse `text` as a JSON object carrying at least one analysis field.
pub(super) fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Object(object)) if has_known_key(&object) => Some(object),
        _ => None,
    }
}

pub(super) fn has_known_key(object: &Map<String, Value>) -> bool {
    ALL_FIELDS
        .iter()
        .any(|aliases| aliases.iter().any(|key| object.contains_key(*key)))
}

/// Copy known fields from `object` into unset candidate slots.
pub(super) fn fill(candidate: &mut AnalysisCandidate, object: &Map<String, Value>) {
    let text = |aliases: &[&str]| lookup(object, aliases).and_then(coerce_text);
    let list = |aliases: &[&str]| lookup(object, aliases).and_then(coerce_list);

    fill_slot(&mut candidate.core_topic, text(CORE_TOPIC), Provenance::Json);
    fill_slot(&mut candidate.summary, text(SUMMARY), Provenance::Json);
    fill_slot(&mut candidate.structure, text(STRUCTURE), Provenance::Json);
    fill_slot(&mut candidate.takeaways, list(TAKEAWAYS), Provenance::Json);
    fill_slot(
        &mut candidate.categories,
        list(CATEGORIES).map(dedup).filter(|c| !c.is_empty()),
        Provenance::Json,
    );
    fill_slot(&mut candidate.verdict_text, text(VERDICT), Provenance::Json);
    fill_slot(&mut candidate.justification, text(JUSTIFICATION), Provenance::Json);
}

fn lookup<'a>(object: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases.iter().find_map(|key| object.get(*key))
}

/// Text field: strings as-is, scalars stringified, arrays joined by line.
///
/// Blank text counts as absent.
fn coerce_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => coerce_array(items).join("\n"),
        Value::Null | Value::Object(_) => return None,
    };
    (!text.trim().is_empty()).then_some(text)
}

/// List field: arrays stringified per element, strings split as lists.
fn coerce_list(value: &Value) -> Option<Vec<String>> {
    let items = match value {
        Value::Array(items) => coerce_array(items),
        Value::String(s) => split_list(s),
        Value::Number(n) => vec![n.to_string()],
        Value::Bool(b) => vec![b.to_string()],
        Value::Null | Value::Object(_) => Vec::new(),
    };
    (!items.is_empty()).then_some(items)
}

/// Array elements in order, strings verbatim; only `null` is dropped.
pub(super) fn coerce_array(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            other => Some(other.to_string()),
        })
        .collect()
}
