//! Outbound application events.
//!
//! Tasks emit these through the [`EventSink`](super::ports::EventSink)
//! port.  Adapters on the other side decide what to do with them.

use super::state::{Rgb, SessionId};
use crate::error::RemoteError;

/// Why a session was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// No presence for longer than the end timeout.
    Timeout,
    /// Manual override button.
    Button,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The task set is about to start.
    Started { own_color: Rgb },

    /// The registry issued a token and the session is open.
    SessionStarted { id: SessionId },

    /// Presence was seen but the registry refused or was unreachable.
    SessionStartFailed(RemoteError),

    /// The session is closed locally (the remote end call may have failed).
    SessionEnded { id: SessionId, reason: EndReason },

    /// The remote end call failed; local state was cleared anyway.
    SessionEndFailed { id: SessionId, error: RemoteError },

    /// A poll succeeded and replaced the peer list.
    PeersUpdated { count: usize },

    /// A poll failed and the peer list was cleared.
    PeerPollFailed(RemoteError),
}
