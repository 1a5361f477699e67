use std::sync::Arc;

use crate::config::{RecognitionSettings, SessionSettings};
use crate::recognition::SpeechBackend;
use crate::summary::Summarizer;

/// Shared application state for HTTP handlers
///
/// Backends are process-wide and stateless per session; every session gets
/// its own recognition stream, so nothing here needs locking.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn SpeechBackend>,
    pub summarizer: Arc<dyn Summarizer>,
    pub recognition: RecognitionSettings,
    pub session: SessionSettings,
}

impl AppState {
    pub fn new(
        backend: Arc<dyn SpeechBackend>,
        summarizer: Arc<dyn Summarizer>,
        recognition: RecognitionSettings,
        session: SessionSettings,
    ) -> Self {
        Self {
            backend,
            summarizer,
            recognition,
            session,
        }
    }
}
