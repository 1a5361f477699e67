use serde::{Deserialize, Serialize};

/// Stream-open message published before any audio frames.
///
/// Carries the recognition configuration the backend applies for the whole
/// stream, mirroring the first request of a streaming recognize call.
#[derive(Debug, Serialize, Deserialize)]
pub struct StreamOpenMessage {
    pub stream_id: String,
    pub session_id: String,
    pub sample_rate: u32,
    pub language: String,
    pub alternate_languages: Vec<String>,
    pub punctuation: bool,
    pub diarization_speakers: u32,
    pub enhanced: bool,
}

/// Audio frame message published to the recognizer.
#[derive(Debug, Serialize, Deserialize)]
pub struct AudioFrameMessage {
    pub stream_id: String,
    pub sequence: u32,
    pub pcm: String, // Base64-encoded LINEAR16 PCM
    pub timestamp: String, // RFC3339 timestamp
    #[serde(rename = "final")]
    pub final_frame: bool,
}

/// Recognition result message received from the recognizer.
///
/// A message with `error` set aborts the stream; a message with
/// `end_of_stream` set is the last one published for a stream.
#[derive(Debug, Serialize, Deserialize)]
pub struct RecognitionResultMessage {
    pub stream_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub is_final: bool,
    /// Diarization tag of the first recognized word, when available
    #[serde(default)]
    pub speaker_tag: Option<u32>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub end_of_stream: bool,
}

/// Request payload for single-shot (batch) recognition.
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchRecognizeRequest {
    pub session_id: String,
    pub sample_rate: u32,
    pub language: String,
    pub content: String, // Base64-encoded LINEAR16 PCM
}

/// Reply payload for single-shot (batch) recognition.
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchRecognizeResponse {
    /// Final alternative texts in recognition order
    #[serde(default)]
    pub results: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}
