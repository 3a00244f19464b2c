//! Polled, debounced push-button driver.
//!
//! ## Hardware
//!
//! Active-low momentary switch with pull-up: the pin reads LOW while held.
//! [`GpioButton`] wraps any `embedded-hal` [`InputPin`] and translates the
//! level into "pressed".
//!
//! ## Debounce
//!
//! [`EdgeDebouncer`] turns a stream of polled levels into accepted falling
//! edges (released → pressed).  An edge is accepted only if at least
//! `debounce_ms` have passed since the previously *accepted* edge; rejected
//! edges do not restart the window.

use embedded_hal::digital::InputPin;

use crate::app::ports::ManualInput;
use crate::error::SensorError;

/// Classification of one polled sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// No released → pressed transition on this sample.
    None,
    /// A press edge inside the debounce window.
    Ignored,
    /// A press edge that counts.
    Accepted,
}

#[derive(Debug, Clone)]
pub struct EdgeDebouncer {
    debounce_ms: u64,
    was_pressed: bool,
    last_accepted_ms: Option<u64>,
}

impl EdgeDebouncer {
    pub fn new(debounce_ms: u32) -> Self {
        Self {
            debounce_ms: u64::from(debounce_ms),
            was_pressed: false,
            last_accepted_ms: None,
        }
    }

    /// Feed the level sampled at `now_ms`.
    pub fn update(&mut self, pressed: bool, now_ms: u64) -> Edge {
        let falling = pressed && !self.was_pressed;
        self.was_pressed = pressed;
        if !falling {
            return Edge::None;
        }

        match self.last_accepted_ms {
            Some(last) if now_ms.saturating_sub(last) < self.debounce_ms => Edge::Ignored,
            _ => {
                self.last_accepted_ms = Some(now_ms);
                Edge::Accepted
            }
        }
    }

    /// Timestamp of the last accepted edge.
    pub fn last_accepted_ms(&self) -> Option<u64> {
        self.last_accepted_ms
    }
}

/// Active-low GPIO button.
pub struct GpioButton<P: InputPin> {
    pin: P,
}

impl<P: InputPin> GpioButton<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P: InputPin> ManualInput for GpioButton<P> {
    fn is_pressed(&mut self) -> Result<bool, SensorError> {
        self.pin.is_low().map_err(|_| SensorError::BusFailed)
    }
}
