//! Unified error types for the Drinkmon firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! boot path's error handling uniform.  All variants are `Copy` so tasks can
//! pass them into [`AppEvent`](crate::app::events::AppEvent)s and log lines
//! without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The presence sensor could not produce a reading.
    Sensor(SensorError),
    /// A call to the remote session registry failed.
    Remote(RemoteError),
    /// A light or GPIO write failed.
    Actuator(ActuatorError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Remote(e) => write!(f, "remote: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

/// Reasons a distance or input read produced no usable value.
///
/// Every variant means "unavailable" to the presence logic; none is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// No sensor was detected at boot.
    NotPresent,
    /// The I²C / GPIO transaction failed.
    BusFailed,
    /// The sensor did not signal data-ready within the poll budget.
    NotReady,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPresent => write!(f, "sensor not present"),
            Self::BusFailed => write!(f, "bus transaction failed"),
            Self::NotReady => write!(f, "measurement not ready"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Remote registry errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteError {
    /// Connection or I/O failure.
    Transport,
    /// The request exceeded the configured timeout.
    Timeout,
    /// The registry answered with a non-success status code.
    Status(u16),
    /// The response body could not be decoded.
    Malformed,
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "transport error"),
            Self::Timeout => write!(f, "request timed out"),
            Self::Status(code) => write!(f, "HTTP status {code}"),
            Self::Malformed => write!(f, "malformed response"),
        }
    }
}

impl From<RemoteError> for Error {
    fn from(e: RemoteError) -> Self {
        Self::Remote(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// PWM duty-cycle write failed.
    PwmWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PwmWriteFailed => write!(f, "PWM write failed"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
