//! Summary generation
//!
//! Wraps the external completion backend behind the `Summarizer` boundary:
//! a transcript string goes in, a `SummaryResult` comes out. Backend
//! failures are encoded in the result payload; nothing escapes this
//! boundary as a panic or error. The component itself is stateless; the
//! session coordinator enforces at-most-once invocation.

mod gemini;

pub use gemini::GeminiSummarizer;

use serde::{Deserialize, Serialize};

/// Transcripts are cut to this many characters before the completion call.
///
/// Content past the limit is silently dropped. This is a deliberate guard
/// against backend input limits, not an accident; revising it means moving
/// to a chunking strategy.
pub const MAX_TRANSCRIPT_CHARS: usize = 4000;

/// Structured consultation summary with the five required sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredSummary {
    pub history: Vec<String>,
    pub diagnosis: Vec<String>,
    pub medications: Vec<String>,
    pub tests: Vec<String>,
    pub instructions: Vec<String>,
}

/// Outcome of one summarization call.
///
/// Serializes untagged: success is the bare summary object, failure is
/// `{"error": "Summary failed", "details": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SummaryResult {
    Ok(StructuredSummary),
    Err { error: String, details: String },
}

impl SummaryResult {
    pub fn failure(details: impl Into<String>) -> Self {
        SummaryResult::Err {
            error: "Summary failed".to_string(),
            details: details.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, SummaryResult::Ok(_))
    }
}

/// Cut a transcript to the documented input limit.
pub fn truncate_transcript(transcript: &str) -> &str {
    match transcript.char_indices().nth(MAX_TRANSCRIPT_CHARS) {
        Some((idx, _)) => &transcript[..idx],
        None => transcript,
    }
}

/// Summarization backend boundary.
#[async_trait::async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize a consultation transcript.
    async fn summarize(&self, transcript: &str) -> SummaryResult;
}
