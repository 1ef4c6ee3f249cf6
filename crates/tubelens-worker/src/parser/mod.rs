//! Structural recovery of analyses from generator output.
//!
//! The generator is asked for a JSON object, but its text channel gives no
//! guarantee: answers arrive as clean JSON, JSON fenced or buried in prose,
//! or headed prose with no JSON at all. [`parse`] recovers what it can:
//!
//! 1. Strict parse of the whole text as a JSON object.
//! 2. Brace scan for the first balanced `{...}` span that parses.
//! 3. Heading-style sections (`Categories: ...`) for fields still unset.
//! 4. Category fallback from a keyword taxonomy.
//!
//! Parsing is total and deterministic. Every recovered field remembers which
//! kind of stage produced it.

mod json;
mod scan;
mod sections;
mod taxonomy;

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use tubelens_models::{Analysis, Verdict};

/// How a field value was recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provenance {
    /// Read from a JSON object (strict or brace-scanned)
    Json,
    /// Matched by a heading pattern
    Regex,
    /// Inferred from other fields or loose phrases
    Heuristic,
}

/// A recovered value tagged with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted<T> {
    pub value: T,
    pub provenance: Provenance,
}

impl<T> Extracted<T> {
    pub fn new(value: T, provenance: Provenance) -> Self {
        Self { value, provenance }
    }
}

/// Earliest stage that recovered at least one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParseStage {
    StrictJson,
    BraceScan,
    Sections,
    #[default]
    Nothing,
}

impl ParseStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseStage::StrictJson => "strict_json",
            ParseStage::BraceScan => "brace_scan",
            ParseStage::Sections => "sections",
            ParseStage::Nothing => "nothing",
        }
    }
}

impl fmt::Display for ParseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fields recovered from one generator response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnalysisCandidate {
    pub core_topic: Option<Extracted<String>>,
    pub summary: Option<Extracted<String>>,
    pub structure: Option<Extracted<String>>,
    pub takeaways: Option<Extracted<Vec<String>>>,
    pub categories: Option<Extracted<Vec<String>>>,
    /// Verdict text as written; see [`AnalysisCandidate::verdict`]
    pub verdict_text: Option<Extracted<String>>,
    pub justification: Option<Extracted<String>>,
    pub stage: ParseStage,
}

impl AnalysisCandidate {
    /// True when no field was recovered.
    pub fn is_empty(&self) -> bool {
        self.core_topic.is_none()
            && self.summary.is_none()
            && self.structure.is_none()
            && self.takeaways.is_none()
            && self.categories.is_none()
            && self.verdict_text.is_none()
            && self.justification.is_none()
    }

    /// Normalized verdict.
    pub fn verdict(&self) -> Option<Verdict> {
        self.verdict_text
            .as_ref()
            .and_then(|text| Verdict::normalize(&text.value))
    }

    /// Drop provenance and build the persisted analysis.
    ///
    /// Returns `None` when nothing was recovered.
    pub fn into_analysis(self) -> Option<Analysis> {
        if self.is_empty() {
            return None;
        }
        let verdict = self.verdict();
        Some(Analysis {
            core_topic: self.core_topic.map(|e| e.value),
            summary: self.summary.map(|e| e.value),
            structure: self.structure.map(|e| e.value),
            takeaways: self.takeaways.map(|e| e.value).unwrap_or_default(),
            categories: self.categories.map(|e| e.value).unwrap_or_default(),
            verdict,
            justification: self.justification.map(|e| e.value),
        })
    }
}

/// Recover an analysis candidate from raw generator text.
pub fn parse(raw: &str) -> AnalysisCandidate {
    let mut candidate = AnalysisCandidate::default();

    let object = match json::parse_object(raw) {
        Some(object) => Some((object, ParseStage::StrictJson)),
        None => scan::find_object(raw).map(|object| (object, ParseStage::BraceScan)),
    };
    let found_json = object.is_some();

    if let Some((object, stage)) = object {
        json::fill(&mut candidate, &object);
        if !candidate.is_empty() {
            candidate.stage = stage;
        }
    }

    let empty_before_sections = candidate.is_empty();
    sections::fill(&mut candidate, raw, !found_json);
    if empty_before_sections && !candidate.is_empty() {
        candidate.stage = ParseStage::Sections;
    }

    taxonomy::fill_categories(&mut candidate);

    debug!(
        stage = %candidate.stage,
        categories = candidate.categories.as_ref().map_or(0, |c| c.value.len()),
        has_verdict = candidate.verdict_text.is_some(),
        "Parsed generator response"
    );
    candidate
}

/// Set `slot` only if it is still unset and `value` is present.
fn fill_slot<T>(slot: &mut Option<Extracted<T>>, value: Option<T>, provenance: Provenance) {
    if slot.is_none() {
        if let Some(value) = value {
            *slot = Some(Extracted::new(value, provenance));
        }
    }
}

/// Trimmed text, `None` when blank.
fn non_blank(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-*•+]|\d{1,3}[.)])\s*").unwrap());

/// Strip list markers and quotes from one list item.
fn clean_item(item: &str) -> String {
    let item = LIST_MARKER.replace(item.trim(), "");
    item.trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim()
        .to_string()
}

/// Split free text into list items.
///
/// A string holding a JSON array is decoded. Otherwise enclosing brackets are
/// dropped and the text splits by line when it spans several lines, by comma
/// when it holds one, or stays a single item.
fn split_list(text: &str) -> Vec<String> {
    let text = text.trim();
    if text.starts_with('[') {
        if let Ok(serde_json::Value::Array(items)) = serde_json::from_str(text) {
            return json::coerce_array(&items);
        }
    }

    let inner = text
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .unwrap_or(text);
    let lines: Vec<&str> = inner
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let items: Vec<String> = if lines.len() > 1 {
        lines.into_iter().map(clean_item).collect()
    } else if inner.contains(',') {
        inner.split(',').map(clean_item).collect()
    } else {
        vec![clean_item(inner)]
    };

    items.into_iter().filter(|item| !item.is_empty()).collect()
}

/// Drop blank and repeated items, keeping first occurrences.
///
/// Only categories are a set; takeaways keep their repeats.
fn dedup(items: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(items.len());
    for item in items {
        if !item.trim().is_empty() && !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}
