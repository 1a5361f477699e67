//! HTTP API server
//!
//! The outward surface of the relay:
//! - GET /ws/transcribe/:consultation_id - streaming transcription session
//! - POST /transcribe-file/:consultation_id - single-shot file transcription
//! - GET /health - Health check

mod error;
mod handlers;
mod routes;
mod state;

pub use error::{ApiError, ApiResult};
pub use handlers::FileTranscriptionResponse;
pub use routes::create_router;
pub use state::AppState;
