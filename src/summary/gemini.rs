use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info};

use super::{truncate_transcript, StructuredSummary, Summarizer, SummaryResult};
use crate::config::SummarySettings;

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

const PROMPT: &str = "You are a medical assistant. Summarize this doctor-patient \
consultation transcript into structured JSON.";

/// Summarizer backed by the Generative Language `generateContent` API.
pub struct GeminiSummarizer {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiSummarizer {
    pub fn new(settings: &SummarySettings) -> Self {
        info!(model = %settings.model, "Initialized summarization backend");

        Self {
            client: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: settings.model.clone(),
            api_key: settings.api_key.clone(),
        }
    }

    /// Point the client at a different API root (used against test servers).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn response_schema() -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "history": {"type": "array", "items": {"type": "string"}},
                "diagnosis": {"type": "array", "items": {"type": "string"}},
                "medications": {"type": "array", "items": {"type": "string"}},
                "tests": {"type": "array", "items": {"type": "string"}},
                "instructions": {"type": "array", "items": {"type": "string"}},
            },
            "required": ["history", "diagnosis", "medications", "tests", "instructions"],
        })
    }

    async fn request_summary(&self, transcript: &str) -> Result<StructuredSummary> {
        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{"text": format!("{}\n\nTranscript:\n{}", PROMPT, transcript)}],
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": Self::response_schema(),
            },
        });

        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .context("Failed to send summarization request")?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .context("Failed to read summarization response body")?;

        if !status.is_success() {
            anyhow::bail!(
                "Summarization backend returned {}: {}",
                status,
                response_text
            );
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&response_text)
            .context("Failed to parse summarization response")?;

        let payload = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .context("Summarization response contained no candidates")?;

        serde_json::from_str(&payload).context("Summary payload did not match the expected schema")
    }
}

#[async_trait::async_trait]
impl Summarizer for GeminiSummarizer {
    async fn summarize(&self, transcript: &str) -> SummaryResult {
        let input = truncate_transcript(transcript);
        debug!(chars = input.len(), "Requesting consultation summary");

        match self.request_summary(input).await {
            Ok(summary) => SummaryResult::Ok(summary),
            Err(e) => {
                error!("Summary generation failed: {:#}", e);
                SummaryResult::failure(e.to_string())
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: String,
}
