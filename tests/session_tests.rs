// End-to-end coordinator scenarios against scripted transport and backend
// doubles. No network involved: the transport halves are channel-backed and
// the recognition backend replays a scripted event sequence.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use consult_scribe::config::SessionSettings;
use consult_scribe::error::{BackendError, TransportError};
use consult_scribe::recognition::{
    RecognitionConfig, RecognitionEvent, RecognitionStream, SpeechBackend,
};
use consult_scribe::session::{
    OutboundEvent, SessionCoordinator, SessionState, TerminationCause, TranscriptSegment,
};
use consult_scribe::summary::{StructuredSummary, Summarizer, SummaryResult};
use consult_scribe::transport::{EventSink, FrameSource, InboundFrame};

// ============================================================================
// Doubles
// ============================================================================

struct ChannelSource {
    rx: mpsc::Receiver<Result<InboundFrame, TransportError>>,
}

#[async_trait]
impl FrameSource for ChannelSource {
    async fn next_frame(&mut self) -> Option<Result<InboundFrame, TransportError>> {
        self.rx.recv().await
    }
}

struct ChannelSink {
    tx: mpsc::Sender<OutboundEvent>,
}

#[async_trait]
impl EventSink for ChannelSink {
    async fn send(&mut self, event: OutboundEvent) -> Result<(), TransportError> {
        self.tx
            .send(event)
            .await
            .map_err(|_| TransportError::Io("test sink closed".to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Backend that replays a scripted event sequence.
///
/// With `hold_until_finish` the script plays only after the audio side of
/// the stream closes (results surface while draining); otherwise it plays
/// immediately (results surface while listening).
struct ScriptedBackend {
    script: Mutex<Vec<Result<RecognitionEvent, BackendError>>>,
    hold_until_finish: bool,
}

impl ScriptedBackend {
    fn new(script: Vec<Result<RecognitionEvent, BackendError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script),
            hold_until_finish: true,
        })
    }

    fn immediate(script: Vec<Result<RecognitionEvent, BackendError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script),
            hold_until_finish: false,
        })
    }
}

#[async_trait]
impl SpeechBackend for ScriptedBackend {
    async fn open_stream(&self, _config: RecognitionConfig) -> anyhow::Result<RecognitionStream> {
        let script = std::mem::take(&mut *self.script.lock().unwrap());
        let hold = self.hold_until_finish;

        let (audio_tx, mut audio_rx) = mpsc::channel::<Vec<u8>>(32);
        let (event_tx, event_rx) = mpsc::channel(32);

        tokio::spawn(async move {
            if hold {
                while audio_rx.recv().await.is_some() {}
            }
            for item in script {
                if event_tx.send(item).await.is_err() {
                    return;
                }
            }
            drop(event_tx);
            if !hold {
                while audio_rx.recv().await.is_some() {}
            }
        });

        Ok(RecognitionStream::new(audio_tx, event_rx))
    }

    async fn recognize(&self, _config: RecognitionConfig, _audio: Vec<u8>) -> anyhow::Result<String> {
        Ok(String::new())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Backend whose stream never opens.
struct FailingBackend;

#[async_trait]
impl SpeechBackend for FailingBackend {
    async fn open_stream(&self, _config: RecognitionConfig) -> anyhow::Result<RecognitionStream> {
        anyhow::bail!("recognizer unavailable")
    }

    async fn recognize(&self, _config: RecognitionConfig, _audio: Vec<u8>) -> anyhow::Result<String> {
        anyhow::bail!("recognizer unavailable")
    }

    fn name(&self) -> &str {
        "failing"
    }
}

struct CountingSummarizer {
    calls: AtomicUsize,
    inputs: Mutex<Vec<String>>,
}

impl CountingSummarizer {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Summarizer for CountingSummarizer {
    async fn summarize(&self, transcript: &str) -> SummaryResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inputs.lock().unwrap().push(transcript.to_string());
        SummaryResult::Ok(sample_summary())
    }
}

fn sample_summary() -> StructuredSummary {
    StructuredSummary {
        history: vec!["cough for two weeks".to_string()],
        diagnosis: vec!["viral bronchitis".to_string()],
        medications: vec![],
        tests: vec![],
        instructions: vec!["rest and fluids".to_string()],
    }
}

fn recognition_config() -> RecognitionConfig {
    RecognitionConfig {
        session_id: "consult-1".to_string(),
        sample_rate: 16000,
        language: "en-US".to_string(),
        alternate_languages: vec![],
        punctuation: true,
        diarization_speakers: 2,
        enhanced: true,
    }
}

fn settings() -> SessionSettings {
    SessionSettings {
        idle_timeout_secs: 300,
    }
}

fn end_session_frame() -> Result<InboundFrame, TransportError> {
    Ok(InboundFrame::Control(r#"{"type":"end_session"}"#.to_string()))
}

fn audio_frame() -> Result<InboundFrame, TransportError> {
    Ok(InboundFrame::Audio(vec![0u8; 320]))
}

fn final_event(speaker: &str, text: &str) -> Result<RecognitionEvent, BackendError> {
    Ok(RecognitionEvent::Final(TranscriptSegment::new(speaker, text)))
}

/// Drive one full session; returns the report and every emitted event.
async fn run_session(
    frames: Vec<Result<InboundFrame, TransportError>>,
    close_inbound: bool,
    backend: Arc<dyn SpeechBackend>,
    summarizer: Arc<dyn Summarizer>,
    session_settings: SessionSettings,
) -> (consult_scribe::session::SessionReport, Vec<OutboundEvent>) {
    let (frame_tx, frame_rx) = mpsc::channel(64);
    let (event_tx, mut event_rx) = mpsc::channel(64);

    let coordinator = SessionCoordinator::new("consult-1".to_string(), session_settings);
    let run = tokio::spawn(coordinator.run(
        Box::new(ChannelSource { rx: frame_rx }),
        Box::new(ChannelSink { tx: event_tx }),
        backend,
        summarizer,
        recognition_config(),
    ));

    for frame in frames {
        frame_tx.send(frame).await.unwrap();
    }
    let mut frame_tx = Some(frame_tx);
    if close_inbound {
        frame_tx.take();
    }

    let report = run.await.unwrap();
    drop(frame_tx);

    let mut events = Vec::new();
    while let Ok(event) = event_rx.try_recv() {
        events.push(event);
    }
    (report, events)
}

fn summary_count(events: &[OutboundEvent]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, OutboundEvent::Summary { .. }))
        .count()
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn end_session_with_no_audio_completes_without_summary() {
    let summarizer = CountingSummarizer::new();
    let (report, events) = run_session(
        vec![end_session_frame()],
        false,
        ScriptedBackend::new(vec![]),
        summarizer.clone(),
        settings(),
    )
    .await;

    assert_eq!(
        events,
        vec![OutboundEvent::connected(), OutboundEvent::complete()]
    );
    assert_eq!(summarizer.call_count(), 0);
    assert_eq!(report.state, SessionState::Complete);
    assert_eq!(report.termination, Some(TerminationCause::ClientRequested));
}

#[tokio::test]
async fn two_finalized_segments_produce_cumulative_transcripts_and_one_summary() {
    let summarizer = CountingSummarizer::new();
    let backend = ScriptedBackend::new(vec![
        final_event("SPEAKER_1", "hello"),
        final_event("SPEAKER_2", "world"),
    ]);

    let (report, events) = run_session(
        vec![audio_frame(), audio_frame(), end_session_frame()],
        false,
        backend,
        summarizer.clone(),
        settings(),
    )
    .await;

    assert_eq!(
        events,
        vec![
            OutboundEvent::connected(),
            OutboundEvent::Final {
                transcript: "[SPEAKER_1]: hello".to_string(),
            },
            OutboundEvent::Final {
                transcript: "[SPEAKER_1]: hello\n[SPEAKER_2]: world".to_string(),
            },
            OutboundEvent::Summary {
                summary: SummaryResult::Ok(sample_summary()),
            },
            OutboundEvent::complete(),
        ]
    );
    assert_eq!(summarizer.call_count(), 1);
    assert_eq!(
        summarizer.inputs.lock().unwrap()[0],
        "[SPEAKER_1]: hello\n[SPEAKER_2]: world"
    );
    assert_eq!(report.state, SessionState::Complete);
    assert_eq!(report.segments, 2);
}

#[tokio::test]
async fn partials_interleave_without_disturbing_segment_order() {
    let summarizer = CountingSummarizer::new();
    let backend = ScriptedBackend::new(vec![
        Ok(RecognitionEvent::Partial("hel".to_string())),
        final_event("SPEAKER_1", "hello"),
        Ok(RecognitionEvent::Partial("wor".to_string())),
        final_event("SPEAKER_2", "world"),
    ]);

    let (_, events) = run_session(
        vec![audio_frame(), end_session_frame()],
        false,
        backend,
        summarizer.clone(),
        settings(),
    )
    .await;

    assert_eq!(
        &events[1..5],
        &[
            OutboundEvent::Interim {
                transcript: "hel".to_string(),
            },
            OutboundEvent::Final {
                transcript: "[SPEAKER_1]: hello".to_string(),
            },
            OutboundEvent::Interim {
                transcript: "[SPEAKER_1]: hello\nwor".to_string(),
            },
            OutboundEvent::Final {
                transcript: "[SPEAKER_1]: hello\n[SPEAKER_2]: world".to_string(),
            },
        ]
    );
    assert_eq!(summary_count(&events), 1);
    assert_eq!(events.last(), Some(&OutboundEvent::complete()));
}

#[tokio::test]
async fn client_disconnect_drains_and_summarizes() {
    let summarizer = CountingSummarizer::new();
    let backend = ScriptedBackend::new(vec![final_event("SPEAKER_1", "short visit")]);

    let (report, events) = run_session(
        vec![audio_frame()],
        true,
        backend,
        summarizer.clone(),
        settings(),
    )
    .await;

    assert_eq!(report.termination, Some(TerminationCause::StreamClosed));
    assert_eq!(report.state, SessionState::Complete);
    assert_eq!(summary_count(&events), 1);
    assert_eq!(events.last(), Some(&OutboundEvent::complete()));
}

#[tokio::test]
async fn recognizer_error_mid_stream_still_summarizes_accumulated_transcript() {
    let summarizer = CountingSummarizer::new();
    let backend = ScriptedBackend::immediate(vec![
        final_event("SPEAKER_1", "hello"),
        Err(BackendError("quota exceeded".to_string())),
    ]);

    let (report, events) = run_session(vec![], false, backend, summarizer.clone(), settings()).await;

    assert_eq!(report.termination, Some(TerminationCause::Error));
    assert_eq!(report.state, SessionState::Complete);
    assert_eq!(summarizer.call_count(), 1);
    assert_eq!(summary_count(&events), 1);
    assert!(events.contains(&OutboundEvent::Status {
        message: "Error: recognition stream terminated".to_string(),
    }));
    assert_eq!(events.last(), Some(&OutboundEvent::complete()));
}

#[tokio::test]
async fn recognizer_error_with_empty_transcript_skips_summary() {
    let summarizer = CountingSummarizer::new();
    let backend = ScriptedBackend::immediate(vec![Err(BackendError("stream reset".to_string()))]);

    let (report, events) = run_session(vec![], false, backend, summarizer.clone(), settings()).await;

    assert_eq!(summarizer.call_count(), 0);
    assert_eq!(summary_count(&events), 0);
    assert_eq!(report.state, SessionState::Complete);
    assert_eq!(events.last(), Some(&OutboundEvent::complete()));
}

#[tokio::test]
async fn transport_error_fails_session_without_summary() {
    let summarizer = CountingSummarizer::new();
    let backend = ScriptedBackend::new(vec![final_event("SPEAKER_1", "hello")]);

    let (report, events) = run_session(
        vec![
            audio_frame(),
            Err(TransportError::MalformedFrame("bad frame".to_string())),
        ],
        false,
        backend,
        summarizer.clone(),
        settings(),
    )
    .await;

    assert_eq!(report.state, SessionState::Failed);
    assert_eq!(report.termination, Some(TerminationCause::Error));
    assert_eq!(summarizer.call_count(), 0);
    assert_eq!(summary_count(&events), 0);
    assert_eq!(
        events.last(),
        Some(&OutboundEvent::Status {
            message: "Error: session failed".to_string(),
        })
    );
}

#[tokio::test]
async fn failed_stream_open_fails_session() {
    let summarizer = CountingSummarizer::new();

    let (report, events) = run_session(
        vec![],
        false,
        Arc::new(FailingBackend),
        summarizer.clone(),
        settings(),
    )
    .await;

    assert_eq!(report.state, SessionState::Failed);
    assert_eq!(summary_count(&events), 0);
    assert_eq!(
        events.last(),
        Some(&OutboundEvent::Status {
            message: "Error: session failed".to_string(),
        })
    );
}

#[tokio::test(start_paused = true)]
async fn idle_timeout_drains_session() {
    let summarizer = CountingSummarizer::new();

    let (report, events) = run_session(
        vec![],
        false,
        ScriptedBackend::new(vec![]),
        summarizer.clone(),
        SessionSettings {
            idle_timeout_secs: 1,
        },
    )
    .await;

    assert_eq!(report.termination, Some(TerminationCause::IdleTimeout));
    assert_eq!(report.state, SessionState::Complete);
    assert_eq!(
        events,
        vec![OutboundEvent::connected(), OutboundEvent::complete()]
    );
}

#[tokio::test]
async fn unrecognized_control_frames_are_ignored() {
    let summarizer = CountingSummarizer::new();

    let (report, events) = run_session(
        vec![
            Ok(InboundFrame::Control(r#"{"type":"pause"}"#.to_string())),
            Ok(InboundFrame::Control("not json".to_string())),
            end_session_frame(),
        ],
        false,
        ScriptedBackend::new(vec![]),
        summarizer.clone(),
        settings(),
    )
    .await;

    assert_eq!(report.state, SessionState::Complete);
    assert_eq!(report.termination, Some(TerminationCause::ClientRequested));
    assert_eq!(
        events,
        vec![OutboundEvent::connected(), OutboundEvent::complete()]
    );
}
