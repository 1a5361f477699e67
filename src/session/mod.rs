//! Streaming session coordination
//!
//! This module owns one client connection's full lifecycle:
//! - inbound audio/control frames fed to the recognition stream
//! - recognition events assembled into the running transcript
//! - outbound events serialized through a single writer
//! - termination detection and at-most-once summary generation

mod coordinator;
mod events;
mod state;
mod transcript;

pub use coordinator::{SessionCoordinator, SessionReport};
pub use events::OutboundEvent;
pub use state::{SessionState, TerminationCause};
pub use transcript::{Transcript, TranscriptSegment};
