use anyhow::Result;
use tokio::sync::mpsc;

use crate::config::RecognitionSettings;
use crate::error::BackendError;
use crate::session::TranscriptSegment;

/// Per-stream recognition configuration, fixed at open time.
#[derive(Debug, Clone)]
pub struct RecognitionConfig {
    /// Opaque caller-supplied session identifier (not validated for uniqueness)
    pub session_id: String,

    /// Sample rate of the LINEAR16 PCM audio in Hz
    pub sample_rate: u32,

    /// Primary language code
    pub language: String,

    /// Alternate language codes
    pub alternate_languages: Vec<String>,

    /// Enable automatic punctuation
    pub punctuation: bool,

    /// Number of speakers for diarization
    pub diarization_speakers: u32,

    /// Request the enhanced recognition model
    pub enhanced: bool,
}

impl RecognitionConfig {
    /// Build the fixed per-session configuration from service settings.
    ///
    /// Consultations are two-party (clinician and patient), so diarization
    /// is pinned to two speakers.
    pub fn from_settings(settings: &RecognitionSettings, session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            sample_rate: settings.sample_rate,
            language: settings.language.clone(),
            alternate_languages: settings.alternate_languages.clone(),
            punctuation: true,
            diarization_speakers: 2,
            enhanced: true,
        }
    }
}

/// Normalized recognizer output.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    /// Hypothesis that may still change; relayed for display, never stored
    Partial(String),
    /// Stable hypothesis, appended to the transcript permanently
    Final(TranscriptSegment),
}

/// Derive a speaker label from a diarization tag.
///
/// Tags come from the first recognized word of a finalized result; a
/// missing tag maps to the "unknown" sentinel.
pub fn speaker_label(tag: Option<u32>) -> String {
    match tag {
        Some(n) => format!("SPEAKER_{}", n),
        None => "unknown".to_string(),
    }
}

/// Duplex handle for one recognition stream.
///
/// The inbound half accepts raw PCM chunks until `finish` is called; the
/// outbound half yields normalized events until the backend exhausts the
/// stream or aborts it with a terminal error. One handle per session;
/// handles are not reusable.
pub struct RecognitionStream {
    audio_tx: Option<mpsc::Sender<Vec<u8>>>,
    events: mpsc::Receiver<Result<RecognitionEvent, BackendError>>,
}

impl RecognitionStream {
    pub fn new(
        audio_tx: mpsc::Sender<Vec<u8>>,
        events: mpsc::Receiver<Result<RecognitionEvent, BackendError>>,
    ) -> Self {
        Self {
            audio_tx: Some(audio_tx),
            events,
        }
    }

    /// Forward one audio chunk to the recognizer.
    pub async fn send_audio(&self, chunk: Vec<u8>) -> Result<(), BackendError> {
        match &self.audio_tx {
            Some(tx) => tx
                .send(chunk)
                .await
                .map_err(|_| BackendError("recognition stream closed".to_string())),
            None => Err(BackendError(
                "audio side of the stream already finished".to_string(),
            )),
        }
    }

    /// Close the inbound side. Buffered results keep flowing until the
    /// backend exhausts the stream. Calling this without having sent any
    /// audio is legal and yields an empty event sequence.
    pub fn finish(&mut self) {
        self.audio_tx.take();
    }

    /// Next normalized event; `None` once the stream is exhausted.
    pub async fn next_event(&mut self) -> Option<Result<RecognitionEvent, BackendError>> {
        self.events.recv().await
    }
}

/// Streaming speech recognition backend.
///
/// The backend itself is a black box reached over the wire; this trait is
/// the whole surface the rest of the system sees.
#[async_trait::async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Open exactly one recognition stream for a session.
    async fn open_stream(&self, config: RecognitionConfig) -> Result<RecognitionStream>;

    /// Single-shot recognition of a complete audio payload. Returns the
    /// concatenated text of all final alternatives.
    async fn recognize(&self, config: RecognitionConfig, audio: Vec<u8>) -> Result<String>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speaker_labels_come_from_diarization_tags() {
        assert_eq!(speaker_label(Some(1)), "SPEAKER_1");
        assert_eq!(speaker_label(Some(2)), "SPEAKER_2");
    }

    #[test]
    fn missing_tag_maps_to_unknown() {
        assert_eq!(speaker_label(None), "unknown");
    }
}
