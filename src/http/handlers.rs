use super::error::{ApiError, ApiResult};
use super::state::AppState;
use crate::audio;
use crate::recognition::RecognitionConfig;
use crate::session::SessionCoordinator;
use crate::summary::SummaryResult;
use crate::transport;
use axum::{
    body::Bytes,
    extract::{
        ws::{WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use tracing::{info, warn};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct FileTranscriptionResponse {
    pub transcript: String,
    pub summary: SummaryResult,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /ws/transcribe/:consultation_id
/// Upgrade to a WebSocket and run a streaming transcription session
pub async fn transcribe_stream(
    State(state): State<AppState>,
    Path(consultation_id): Path<String>,
    upgrade: WebSocketUpgrade,
) -> impl IntoResponse {
    upgrade.on_upgrade(move |socket| run_session(state, consultation_id, socket))
}

async fn run_session(state: AppState, consultation_id: String, socket: WebSocket) {
    info!("Starting streaming session: {}", consultation_id);

    let (source, sink) = transport::split_websocket(socket);
    let recognition = RecognitionConfig::from_settings(&state.recognition, &consultation_id);

    let report = SessionCoordinator::new(consultation_id.clone(), state.session.clone())
        .run(
            Box::new(source),
            Box::new(sink),
            state.backend.clone(),
            state.summarizer.clone(),
            recognition,
        )
        .await;

    info!(
        session = %consultation_id,
        state = report.state.as_str(),
        segments = report.segments,
        "Streaming session closed"
    );
}

/// POST /transcribe-file/:consultation_id
/// Single-shot transcription and summarization of a complete audio payload
pub async fn transcribe_file(
    State(state): State<AppState>,
    Path(consultation_id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<FileTranscriptionResponse>> {
    if body.is_empty() {
        return Err(ApiError::bad_request("empty audio payload"));
    }

    info!(
        "Transcribing uploaded file for consultation {} ({} bytes)",
        consultation_id,
        body.len()
    );

    let pcm = audio::extract_pcm(&body).map_err(|e| {
        warn!("Rejected audio upload: {:#}", e);
        ApiError::bad_request("unsupported audio payload")
    })?;

    let config = RecognitionConfig::from_settings(&state.recognition, &consultation_id);
    let transcript = state
        .backend
        .recognize(config, pcm)
        .await
        .map_err(ApiError::internal)?;

    // Same rule as the streaming path: nothing recognized means nothing to
    // summarize.
    let summary = if transcript.is_empty() {
        SummaryResult::failure("transcript was empty")
    } else {
        state.summarizer.summarize(&transcript).await
    };

    Ok(Json(FileTranscriptionResponse {
        transcript,
        summary,
    }))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
