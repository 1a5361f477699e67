/// Lifecycle phase of a streaming session.
///
/// Sessions move `Connecting → Listening → Draining → Summarizing →
/// Complete`. `Failed` absorbs unrecoverable transport errors from any
/// phase. Both `Complete` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Listening,
    Draining,
    Summarizing,
    Complete,
    Failed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Connecting => "connecting",
            SessionState::Listening => "listening",
            SessionState::Draining => "draining",
            SessionState::Summarizing => "summarizing",
            SessionState::Complete => "complete",
            SessionState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Complete | SessionState::Failed)
    }
}

/// Why a session stopped accepting audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationCause {
    /// The client sent an explicit end-of-session control frame
    ClientRequested,
    /// The client connection or the recognition stream closed
    StreamClosed,
    /// No inbound frame arrived within the idle window
    IdleTimeout,
    /// A transport or recognition error cut the session short
    Error,
}

impl TerminationCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationCause::ClientRequested => "client_requested",
            TerminationCause::StreamClosed => "stream_closed",
            TerminationCause::IdleTimeout => "idle_timeout",
            TerminationCause::Error => "error",
        }
    }
}
