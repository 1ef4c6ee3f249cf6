//! Transcript analysis models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether the full video adds value beyond its summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Verdict {
    #[serde(rename = "Worth Watching")]
    WorthWatching,
    #[serde(rename = "Summary Sufficient")]
    SummarySufficient,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::WorthWatching => "Worth Watching",
            Verdict::SummarySufficient => "Summary Sufficient",
        }
    }

    /// Map free verdict text onto the closed enumeration.
    ///
    /// Any text mentioning "worth" (case-insensitive) is `WorthWatching`;
    /// every other non-blank text collapses to `SummarySufficient`. Blank
    /// text has no verdict. Phrasings such as "not worth watching" therefore
    /// map to `WorthWatching`; that collapse is a product rule, kept as is.
    pub fn normalize(text: &str) -> Option<Verdict> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if text.to_lowercase().contains("worth") {
            Some(Verdict::WorthWatching)
        } else {
            Some(Verdict::SummarySufficient)
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured analysis of a video transcript.
///
/// When an analysis exists its `categories` are non-empty; the response
/// parser guarantees this with its category fallback.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Analysis {
    /// Central subject and thesis of the video
    #[serde(skip_serializing_if = "Option::is_none")]
    pub core_topic: Option<String>,

    /// Detailed summary of the content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Apparent structure (tutorial, discussion, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<String>,

    /// Key takeaways in the order given
    #[serde(default)]
    pub takeaways: Vec<String>,

    /// Topic categories
    #[serde(default)]
    pub categories: Vec<String>,

    /// Watch verdict
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,

    /// Reasoning behind the verdict
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
}
