//! Recognition stream adapter
//!
//! Wraps the external streaming speech recognizer behind the
//! `SpeechBackend` boundary:
//! - one duplex `RecognitionStream` per session (audio in, events out)
//! - raw PCM chunks translated into backend frame messages
//! - backend responses normalized into `RecognitionEvent`s
//! - single-shot batch recognition for the file upload path

pub mod backend;
pub mod messages;
pub mod nats;

pub use backend::{
    speaker_label, RecognitionConfig, RecognitionEvent, RecognitionStream, SpeechBackend,
};
pub use messages::{
    AudioFrameMessage, BatchRecognizeRequest, BatchRecognizeResponse, RecognitionResultMessage,
    StreamOpenMessage,
};
pub use nats::NatsSpeechBackend;
