use thiserror::Error;

/// Errors at the client transport boundary.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The connection dropped before the session finished cleanly.
    #[error("connection dropped: {0}")]
    ConnectionDropped(String),

    /// The peer sent a frame this protocol cannot interpret.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// Underlying socket failure while sending or receiving.
    #[error("transport io error: {0}")]
    Io(String),
}

/// Recognition backend failure surfaced on a result stream.
#[derive(Debug, Error)]
#[error("recognition backend error: {0}")]
pub struct BackendError(pub String);

/// Errors that terminate a session.
///
/// Caught at the coordinator boundary and converted into a terminal state
/// plus a best-effort outbound notification. Per-session errors must never
/// take the process down.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}
