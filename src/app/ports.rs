//! Port traits: the hexagonal boundary between the tasks and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Tasks (domain)
//! ```
//!
//! Driven adapters (sensor, light, button, registry, clock, event sink)
//! implement these traits.  The tasks consume them via generics, so the
//! domain core never touches hardware or the network directly.
//!
//! ## Blocking contract
//!
//! Every method here runs to completion inside a task tick, between two
//! yield points.  Implementations MUST bound their own latency (request
//! timeouts, poll budgets): a call that never returns stalls every task.

use super::state::{Rgb, SessionId};
use crate::error::{ActuatorError, RemoteError, SensorError};

// ───────────────────────────────────────────────────────────────
// Presence sensor (hardware → domain)
// ───────────────────────────────────────────────────────────────

pub trait PresenceSensor {
    /// Current distance in millimetres.  Any error means "unavailable".
    fn read_distance_mm(&mut self) -> Result<u16, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Light actuator (domain → hardware)
// ───────────────────────────────────────────────────────────────

pub trait LightPort {
    /// Show `color` scaled by `brightness` (0.0–1.0, clamped).
    fn set(&mut self, color: Rgb, brightness: f32) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Manual input (hardware → domain)
// ───────────────────────────────────────────────────────────────

pub trait ManualInput {
    /// Current level, already translated from active-low wiring.
    fn is_pressed(&mut self) -> Result<bool, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Remote session registry (domain ↔ network)
// ───────────────────────────────────────────────────────────────

/// Start / end / list calls against the remote session registry.
///
/// Single attempt per call, no hidden retries: the calling task's period
/// is the retry interval.
pub trait SessionRegistry {
    /// Open a session in `color`, returning its token.
    fn start(&mut self, color: Rgb) -> Result<SessionId, RemoteError>;

    /// Close the session identified by `id`.
    fn end(&mut self, id: &SessionId) -> Result<(), RemoteError>;

    /// Colours of every currently open session.
    fn list_active_peers(&mut self) -> Result<Vec<Rgb>, RemoteError>;
}

// ───────────────────────────────────────────────────────────────
// Time
// ───────────────────────────────────────────────────────────────

pub trait TimePort {
    /// Milliseconds since boot (monotonic).
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Event sink (domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The tasks emit structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
