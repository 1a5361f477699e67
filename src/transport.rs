//! Client transport boundary
//!
//! The session coordinator only ever talks to these two traits: a source
//! of inbound frames and a sink for outbound events. The WebSocket
//! implementation lives here; tests substitute channel-backed doubles.

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};

use crate::error::TransportError;
use crate::session::OutboundEvent;

/// One inbound client frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    /// Raw LINEAR16 PCM audio chunk (arbitrary chunking boundaries)
    Audio(Vec<u8>),
    /// JSON control message text
    Control(String),
}

/// Inbound half of a session connection.
#[async_trait]
pub trait FrameSource: Send {
    /// Next inbound frame; `None` once the peer has closed.
    async fn next_frame(&mut self) -> Option<Result<InboundFrame, TransportError>>;
}

/// Outbound half of a session connection.
///
/// Not safe for concurrent writes; the coordinator funnels all events
/// through a single writer task.
#[async_trait]
pub trait EventSink: Send {
    async fn send(&mut self, event: OutboundEvent) -> Result<(), TransportError>;

    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Split an accepted WebSocket into the coordinator's transport halves.
pub fn split_websocket(socket: WebSocket) -> (WsFrameSource, WsEventSink) {
    let (sink, stream) = socket.split();
    (WsFrameSource { inner: stream }, WsEventSink { inner: sink })
}

pub struct WsFrameSource {
    inner: SplitStream<WebSocket>,
}

#[async_trait]
impl FrameSource for WsFrameSource {
    async fn next_frame(&mut self) -> Option<Result<InboundFrame, TransportError>> {
        while let Some(message) = self.inner.next().await {
            match message {
                Ok(Message::Binary(data)) => return Some(Ok(InboundFrame::Audio(data))),
                Ok(Message::Text(text)) => return Some(Ok(InboundFrame::Control(text))),
                Ok(Message::Close(_)) => return None,
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
                Err(e) => {
                    return Some(Err(TransportError::ConnectionDropped(e.to_string())));
                }
            }
        }
        None
    }
}

pub struct WsEventSink {
    inner: SplitSink<WebSocket, Message>,
}

#[async_trait]
impl EventSink for WsEventSink {
    async fn send(&mut self, event: OutboundEvent) -> Result<(), TransportError> {
        let payload =
            serde_json::to_string(&event).map_err(|e| TransportError::Io(e.to_string()))?;

        self.inner
            .send(Message::Text(payload))
            .await
            .map_err(|e| TransportError::Io(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        // The peer may already be gone; a failed close frame is not an error
        // worth surfacing.
        let _ = self.inner.send(Message::Close(None)).await;
        Ok(())
    }
}
