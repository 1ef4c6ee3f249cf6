//! Gemini client for transcript analysis.
//!
//! Sends the analysis prompt to the `generateContent` endpoint, trying each
//! configured model in order, and returns the raw response text for the
//! parser. No structure is assumed here.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::sources::AnalysisGenerator;

/// Characters of transcript sent to the model.
pub const MAX_TRANSCRIPT_CHARS: usize = 200_000;

/// Gemini API client.
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    models: Vec<String>,
    client: Client,
}

/// Gemini API request.
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

/// Gemini API response.
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    /// Create a client from worker configuration.
    pub fn new(config: &WorkerConfig) -> WorkerResult<Self> {
        let api_key = config
            .gemini_api_key
            .clone()
            .ok_or_else(|| WorkerError::config_error("GEMINI_API_KEY not set"))?;

        let client = Client::builder()
            .timeout(config.generation_timeout)
            .build()
            .map_err(|e| WorkerError::config_error(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            base_url: config.gemini_api_base.trim_end_matches('/').to_string(),
            models: config.gemini_models.clone(),
            client,
        })
    }

    /// Build the analysis prompt for a transcript.
    pub fn build_prompt(transcript: &str) -> String {
        let transcript = truncate_chars(transcript, MAX_TRANSCRIPT_CHARS);
        format!(
            r#"Objective: analyze the YouTube video transcript below so a viewer can decide whether to watch the full video or whether its summary is enough.

Act as an expert content analyst and rely only on what the transcript says.

--- TRANSCRIPT START ---
{transcript}
--- TRANSCRIPT END ---

Return ONLY a single JSON object with this schema:
{{
  "core_topic": "1-2 sentences on the central subject and the video's main goal or thesis",
  "summary": "A detailed summary of the main arguments, information or narrative arc",
  "structure": "The apparent structure (tutorial steps, interview, historical overview, comparison, ...)",
  "takeaways": ["Key takeaway 1", "Key takeaway 2", "Key takeaway 3"],
  "categories": ["Category 1", "Category 2", "Category 3"],
  "verdict": "Worth Watching or Summary Sufficient",
  "justification": "A concise explanation of the verdict"
}}

Additional instructions:
- Return ONLY the JSON object and nothing else.
- "categories" MUST contain at least 3 relevant topic tags.
- "takeaways" lists the most important insights in the order they appear.
- "verdict" MUST be exactly "Worth Watching" or "Summary Sufficient".
"#
        )
    }

    /// Call one model and return its text.
    async fn call_model(&self, model: &str, prompt: &str) -> WorkerResult<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                WorkerError::transient_service(format!("Gemini API request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = format!("Gemini API returned {}: {}", status, error_text.trim());
            return Err(if is_transient_status(status) {
                WorkerError::transient_service(message)
            } else {
                WorkerError::service(message)
            });
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            WorkerError::service(format!("Failed to decode Gemini response: {}", e))
        })?;

        let text: String = gemini_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(WorkerError::service("No content in Gemini response"));
        }
        Ok(text)
    }
}

#[async_trait]
impl AnalysisGenerator for GeminiClient {
    async fn generate(&self, transcript: &str) -> WorkerResult<String> {
        let prompt = Self::build_prompt(transcript);
        let mut last_error: Option<WorkerError> = None;

        for model in &self.models {
            debug!("Attempting Gemini API with model: {}", model);
            match self.call_model(model, &prompt).await {
                Ok(text) => {
                    info!(model = %model, chars = text.len(), "Gemini analysis received");
                    return Ok(text);
                }
                Err(e) => {
                    warn!("Failed with model {}: {}", model, e);
                    // A transient failure wins so the caller retries.
                    if !last_error.as_ref().is_some_and(WorkerError::is_retryable) {
                        last_error = Some(e);
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| WorkerError::service("No Gemini models configured")))
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}

/// Prefix of `text` holding at most `max` characters.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
