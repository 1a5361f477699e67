use anyhow::{Context, Result};
use async_nats::Client;
use base64::Engine;
use futures::stream::StreamExt;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::backend::{
    speaker_label, RecognitionConfig, RecognitionEvent, RecognitionStream, SpeechBackend,
};
use super::messages::{
    AudioFrameMessage, BatchRecognizeRequest, BatchRecognizeResponse, RecognitionResultMessage,
    StreamOpenMessage,
};
use crate::config::RecognitionSettings;
use crate::error::BackendError;
use crate::session::TranscriptSegment;

const BATCH_SUBJECT: &str = "stt.recognize";

/// Speech recognition backend reached over NATS.
///
/// Each stream gets its own uuid-scoped subjects: session identifiers are
/// caller-supplied and may collide, stream ids may not.
pub struct NatsSpeechBackend {
    client: Client,
}

impl NatsSpeechBackend {
    /// Connect to the NATS server fronting the recognizer.
    pub async fn connect(settings: &RecognitionSettings) -> Result<Self> {
        info!("Connecting to recognition backend at {}", settings.nats_url);

        let client = match &settings.credentials_file {
            Some(path) => {
                async_nats::ConnectOptions::with_credentials_file(path)
                    .await
                    .context("Failed to read NATS credentials file")?
                    .connect(&settings.nats_url)
                    .await
                    .context("Failed to connect to NATS")?
            }
            None => async_nats::connect(&settings.nats_url)
                .await
                .context("Failed to connect to NATS")?,
        };

        info!("Connected to recognition backend");

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl SpeechBackend for NatsSpeechBackend {
    async fn open_stream(&self, config: RecognitionConfig) -> Result<RecognitionStream> {
        let stream_id = uuid::Uuid::new_v4().to_string();

        // Subscribe before announcing the stream so no result can be missed.
        let mut subscriber = self
            .client
            .subscribe(format!("stt.stream.result.{}", stream_id))
            .await
            .context("Failed to subscribe to recognition results")?;

        let open = StreamOpenMessage {
            stream_id: stream_id.clone(),
            session_id: config.session_id.clone(),
            sample_rate: config.sample_rate,
            language: config.language.clone(),
            alternate_languages: config.alternate_languages.clone(),
            punctuation: config.punctuation,
            diarization_speakers: config.diarization_speakers,
            enhanced: config.enhanced,
        };

        self.client
            .publish(
                format!("stt.stream.open.{}", stream_id),
                serde_json::to_vec(&open)?.into(),
            )
            .await
            .context("Failed to open recognition stream")?;

        info!(
            session = %config.session_id,
            stream = %stream_id,
            "Opened recognition stream"
        );

        let (audio_tx, mut audio_rx) = mpsc::channel::<Vec<u8>>(32);
        let (event_tx, event_rx) = mpsc::channel::<Result<RecognitionEvent, BackendError>>(32);

        // Inbound half: forward PCM chunks as frame messages. An empty frame
        // with the final marker tells the recognizer no more audio is coming.
        let client = self.client.clone();
        let audio_subject = format!("stt.stream.audio.{}", stream_id);
        let sid = stream_id.clone();
        tokio::spawn(async move {
            let mut sequence: u32 = 0;

            while let Some(chunk) = audio_rx.recv().await {
                let frame = AudioFrameMessage {
                    stream_id: sid.clone(),
                    sequence,
                    pcm: base64::engine::general_purpose::STANDARD.encode(&chunk),
                    timestamp: chrono::Utc::now().to_rfc3339(),
                    final_frame: false,
                };
                sequence += 1;

                let payload = match serde_json::to_vec(&frame) {
                    Ok(payload) => payload,
                    Err(e) => {
                        error!("Failed to serialize audio frame: {}", e);
                        continue;
                    }
                };

                if let Err(e) = client.publish(audio_subject.clone(), payload.into()).await {
                    error!("Failed to publish audio frame: {}", e);
                    break;
                }
            }

            // Audio side finished: send the final marker frame
            let frame = AudioFrameMessage {
                stream_id: sid,
                sequence,
                pcm: String::new(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                final_frame: true,
            };
            match serde_json::to_vec(&frame) {
                Ok(payload) => {
                    if let Err(e) = client.publish(audio_subject, payload.into()).await {
                        error!("Failed to send final frame: {}", e);
                    }
                }
                Err(e) => error!("Failed to serialize final frame: {}", e),
            }
        });

        // Outbound half: normalize result messages into events. Dropping
        // event_tx ends the event sequence seen by the coordinator.
        let sid = stream_id;
        tokio::spawn(async move {
            while let Some(msg) = subscriber.next().await {
                let result: RecognitionResultMessage = match serde_json::from_slice(&msg.payload) {
                    Ok(result) => result,
                    Err(e) => {
                        warn!("Failed to parse recognition result: {}", e);
                        continue;
                    }
                };

                if result.stream_id != sid {
                    continue;
                }

                if let Some(message) = result.error {
                    let _ = event_tx.send(Err(BackendError(message))).await;
                    break;
                }

                if result.end_of_stream {
                    break;
                }

                let event = if result.is_final {
                    RecognitionEvent::Final(TranscriptSegment::new(
                        speaker_label(result.speaker_tag),
                        result.text,
                    ))
                } else {
                    RecognitionEvent::Partial(result.text)
                };

                if event_tx.send(Ok(event)).await.is_err() {
                    break;
                }
            }
        });

        Ok(RecognitionStream::new(audio_tx, event_rx))
    }

    async fn recognize(&self, config: RecognitionConfig, audio: Vec<u8>) -> Result<String> {
        let request = BatchRecognizeRequest {
            session_id: config.session_id.clone(),
            sample_rate: config.sample_rate,
            language: config.language.clone(),
            content: base64::engine::general_purpose::STANDARD.encode(&audio),
        };

        info!(
            session = %config.session_id,
            bytes = audio.len(),
            "Requesting batch recognition"
        );

        let reply = self
            .client
            .request(BATCH_SUBJECT, serde_json::to_vec(&request)?.into())
            .await
            .context("Batch recognition request failed")?;

        let response: BatchRecognizeResponse = serde_json::from_slice(&reply.payload)
            .context("Failed to parse batch recognition response")?;

        if let Some(error) = response.error {
            anyhow::bail!("Recognizer rejected batch request: {}", error);
        }

        Ok(response.results.join(" "))
    }

    fn name(&self) -> &str {
        "nats"
    }
}
