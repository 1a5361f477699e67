use serde::{Deserialize, Serialize};

/// A single finalized transcript segment.
///
/// Immutable once appended; insertion order is the order the recognizer
/// finalized results in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Speaker label derived from diarization (e.g. "SPEAKER_1", "unknown")
    pub speaker: String,

    /// Finalized text for this segment
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
        }
    }
}

/// The accumulated transcript of one session.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    segments: Vec<TranscriptSegment>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: TranscriptSegment) {
        self.segments.push(segment);
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> &[TranscriptSegment] {
        &self.segments
    }

    /// Canonical text form: one `[SPEAKER]: text` line per segment.
    ///
    /// This is the form shown to the client and fed to summarization.
    pub fn render(&self) -> String {
        self.segments
            .iter()
            .map(|segment| format!("[{}]: {}", segment.speaker, segment.text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Rendered transcript with a trailing partial hypothesis for display.
    ///
    /// Partials carry no diarization, so the hypothesis is appended as-is.
    pub fn render_with_partial(&self, partial: &str) -> String {
        if self.segments.is_empty() {
            return partial.to_string();
        }
        format!("{}\n{}", self.render(), partial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_joins_labeled_segments() {
        let mut transcript = Transcript::new();
        transcript.push(TranscriptSegment::new("SPEAKER_1", "Good morning."));
        transcript.push(TranscriptSegment::new("SPEAKER_2", "Morning, doctor."));

        assert_eq!(
            transcript.render(),
            "[SPEAKER_1]: Good morning.\n[SPEAKER_2]: Morning, doctor."
        );
    }

    #[test]
    fn render_with_partial_appends_hypothesis() {
        let mut transcript = Transcript::new();
        assert_eq!(transcript.render_with_partial("uh"), "uh");

        transcript.push(TranscriptSegment::new("SPEAKER_1", "Hello."));
        assert_eq!(
            transcript.render_with_partial("how are"),
            "[SPEAKER_1]: Hello.\nhow are"
        );
    }
}
