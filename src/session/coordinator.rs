use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::events::OutboundEvent;
use super::state::{SessionState, TerminationCause};
use super::transcript::Transcript;
use crate::config::SessionSettings;
use crate::error::{BackendError, SessionError, TransportError};
use crate::recognition::{RecognitionConfig, RecognitionEvent, SpeechBackend};
use crate::summary::Summarizer;
use crate::transport::{EventSink, FrameSource, InboundFrame};

/// Final report for a finished session.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub state: SessionState,
    pub termination: Option<TerminationCause>,
    pub segments: usize,
}

/// Recognized client control messages. Anything else is logged and ignored.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ControlMessage {
    EndSession,
}

fn is_end_session(text: &str) -> bool {
    matches!(
        serde_json::from_str::<ControlMessage>(text),
        Ok(ControlMessage::EndSession)
    )
}

/// Coordinates one session's full lifecycle.
///
/// Owns the state machine `Connecting → Listening → Draining → Summarizing
/// → Complete` (with `Failed` absorbing unrecoverable transport errors),
/// the accumulated transcript, and the at-most-once summary guarantee. The
/// inbound frame flow and the recognition event flow are serviced from one
/// `select!` loop so neither can starve the other; all outbound events
/// funnel through a single writer task that owns the sink.
pub struct SessionCoordinator {
    session_id: String,
    state: SessionState,
    transcript: Transcript,
    termination: Option<TerminationCause>,
    summary_emitted: bool,
    idle_timeout: Duration,
}

impl SessionCoordinator {
    pub fn new(session_id: String, settings: SessionSettings) -> Self {
        Self {
            session_id,
            state: SessionState::Connecting,
            transcript: Transcript::new(),
            termination: None,
            summary_emitted: false,
            idle_timeout: Duration::from_secs(settings.idle_timeout_secs),
        }
    }

    /// Run the session to completion. Never panics and never returns an
    /// error: every failure path collapses into the `Failed` state and a
    /// best-effort notification to the client.
    pub async fn run(
        mut self,
        source: Box<dyn FrameSource>,
        sink: Box<dyn EventSink>,
        backend: Arc<dyn SpeechBackend>,
        summarizer: Arc<dyn Summarizer>,
        recognition: RecognitionConfig,
    ) -> SessionReport {
        let (out_tx, out_rx) = mpsc::channel::<OutboundEvent>(64);
        let writer = tokio::spawn(write_events(sink, out_rx));

        if let Err(err) = self
            .drive(source, backend, summarizer, recognition, &out_tx)
            .await
        {
            warn!(session = %self.session_id, "session failed: {}", err);
            self.set_state(SessionState::Failed);
            self.termination = Some(TerminationCause::Error);
            let _ = out_tx
                .send(OutboundEvent::error_status("Error: session failed"))
                .await;
        }

        // Closing the channel lets the writer flush the backlog and close
        // the transport.
        drop(out_tx);
        if let Err(err) = writer.await {
            error!(session = %self.session_id, "outbound writer panicked: {}", err);
        }

        info!(
            session = %self.session_id,
            state = self.state.as_str(),
            termination = self.termination.map(|c| c.as_str()).unwrap_or("none"),
            segments = self.transcript.len(),
            "session finished"
        );

        SessionReport {
            state: self.state,
            termination: self.termination,
            segments: self.transcript.len(),
        }
    }

    async fn drive(
        &mut self,
        mut source: Box<dyn FrameSource>,
        backend: Arc<dyn SpeechBackend>,
        summarizer: Arc<dyn Summarizer>,
        recognition: RecognitionConfig,
        out_tx: &mpsc::Sender<OutboundEvent>,
    ) -> Result<(), SessionError> {
        self.emit(out_tx, OutboundEvent::connected()).await?;

        let mut stream = backend
            .open_stream(recognition)
            .await
            .map_err(|e| BackendError(e.to_string()))?;

        self.set_state(SessionState::Listening);

        let mut backend_error = false;
        let idle_enabled = !self.idle_timeout.is_zero();
        let idle = tokio::time::sleep(if idle_enabled {
            self.idle_timeout
        } else {
            Duration::from_secs(24 * 60 * 60)
        });
        tokio::pin!(idle);

        let cause = loop {
            tokio::select! {
                frame = source.next_frame() => match frame {
                    Some(Ok(InboundFrame::Audio(chunk))) => {
                        if idle_enabled {
                            idle.as_mut().reset(Instant::now() + self.idle_timeout);
                        }
                        if let Err(err) = stream.send_audio(chunk).await {
                            warn!(session = %self.session_id, "audio forwarding stopped: {}", err);
                            backend_error = true;
                            break TerminationCause::Error;
                        }
                    }
                    Some(Ok(InboundFrame::Control(text))) => {
                        if idle_enabled {
                            idle.as_mut().reset(Instant::now() + self.idle_timeout);
                        }
                        if is_end_session(&text) {
                            info!(session = %self.session_id, "client requested end of session");
                            break TerminationCause::ClientRequested;
                        }
                        warn!(session = %self.session_id, payload = %text, "ignoring unrecognized control frame");
                    }
                    Some(Err(err)) => return Err(err.into()),
                    None => {
                        info!(session = %self.session_id, "client connection closed");
                        break TerminationCause::StreamClosed;
                    }
                },
                event = stream.next_event() => match event {
                    Some(Ok(event)) => self.relay_event(event, out_tx).await?,
                    Some(Err(err)) => {
                        warn!(session = %self.session_id, "recognition stream error: {}", err);
                        backend_error = true;
                        break TerminationCause::Error;
                    }
                    None => {
                        info!(session = %self.session_id, "recognition stream exhausted");
                        break TerminationCause::StreamClosed;
                    }
                },
                () = &mut idle, if idle_enabled => {
                    info!(session = %self.session_id, "idle timeout reached, draining session");
                    break TerminationCause::IdleTimeout;
                }
            }
        };
        self.termination = Some(cause);

        // No more audio in; flush whatever the recognizer still holds.
        // Bounded by backend-buffered results, not by client behavior.
        self.set_state(SessionState::Draining);
        stream.finish();
        if !backend_error {
            while let Some(item) = stream.next_event().await {
                match item {
                    Ok(event) => self.relay_event(event, out_tx).await?,
                    Err(err) => {
                        warn!(session = %self.session_id, "recognition stream error while draining: {}", err);
                        backend_error = true;
                        break;
                    }
                }
            }
        }

        if backend_error {
            self.emit(
                out_tx,
                OutboundEvent::error_status("Error: recognition stream terminated"),
            )
            .await?;
        }

        self.set_state(SessionState::Summarizing);
        if self.transcript.is_empty() {
            info!(session = %self.session_id, "no transcript accumulated, skipping summary");
        } else if !self.summary_emitted {
            let rendered = self.transcript.render();
            info!(
                session = %self.session_id,
                chars = rendered.len(),
                "generating consultation summary"
            );
            let summary = summarizer.summarize(&rendered).await;
            self.summary_emitted = true;
            self.emit(out_tx, OutboundEvent::Summary { summary }).await?;
        }

        self.set_state(SessionState::Complete);
        self.emit(out_tx, OutboundEvent::complete()).await?;

        Ok(())
    }

    async fn relay_event(
        &mut self,
        event: RecognitionEvent,
        out_tx: &mpsc::Sender<OutboundEvent>,
    ) -> Result<(), SessionError> {
        match event {
            RecognitionEvent::Partial(text) => {
                let transcript = self.transcript.render_with_partial(&text);
                self.emit(out_tx, OutboundEvent::Interim { transcript }).await
            }
            RecognitionEvent::Final(segment) => {
                self.transcript.push(segment);
                let transcript = self.transcript.render();
                self.emit(out_tx, OutboundEvent::Final { transcript }).await
            }
        }
    }

    async fn emit(
        &self,
        out_tx: &mpsc::Sender<OutboundEvent>,
        event: OutboundEvent,
    ) -> Result<(), SessionError> {
        out_tx
            .send(event)
            .await
            .map_err(|_| TransportError::Io("outbound channel closed".to_string()).into())
    }

    fn set_state(&mut self, next: SessionState) {
        debug!(
            session = %self.session_id,
            from = self.state.as_str(),
            to = next.as_str(),
            "session state transition"
        );
        self.state = next;
    }
}

/// Single writer task: serializes all outbound sends, since the transport
/// is not safe for concurrent writes.
async fn write_events(mut sink: Box<dyn EventSink>, mut out_rx: mpsc::Receiver<OutboundEvent>) {
    while let Some(event) = out_rx.recv().await {
        if let Err(err) = sink.send(event).await {
            warn!("outbound send failed, dropping remaining events: {}", err);
            break;
        }
    }
    if let Err(err) = sink.close().await {
        debug!("transport close failed: {}", err);
    }
}
