pub mod audio;
pub mod config;
pub mod error;
pub mod http;
pub mod recognition;
pub mod session;
pub mod summary;
pub mod transport;

pub use config::Config;
pub use error::{BackendError, SessionError, TransportError};
pub use http::{create_router, AppState};
pub use recognition::{
    NatsSpeechBackend, RecognitionConfig, RecognitionEvent, RecognitionStream, SpeechBackend,
};
pub use session::{
    OutboundEvent, SessionCoordinator, SessionReport, SessionState, TerminationCause, Transcript,
    TranscriptSegment,
};
pub use summary::{GeminiSummarizer, StructuredSummary, Summarizer, SummaryResult};
pub use transport::{EventSink, FrameSource, InboundFrame};
