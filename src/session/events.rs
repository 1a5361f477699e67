use serde::{Deserialize, Serialize};

use crate::summary::SummaryResult;

/// Outbound session events, serialized as `{"type": ...}` JSON frames.
///
/// Partial hypotheses go out as `interim`; every finalized segment produces
/// a `final` carrying the full transcript so far. `summary` is emitted at
/// most once per session, and `status: Complete` is always the last event
/// of a cleanly-terminating session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundEvent {
    Connected { message: String },
    Interim { transcript: String },
    Final { transcript: String },
    Summary { summary: SummaryResult },
    Status { message: String },
}

impl OutboundEvent {
    pub fn connected() -> Self {
        OutboundEvent::Connected {
            message: "Listening...".to_string(),
        }
    }

    pub fn complete() -> Self {
        OutboundEvent::Status {
            message: "Complete".to_string(),
        }
    }

    pub fn error_status(message: impl Into<String>) -> Self {
        OutboundEvent::Status {
            message: message.into(),
        }
    }
}
