//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::error::Error;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { own_color } => {
                let (r, g, b) = own_color;
                info!("START | own_color=#{:02x}{:02x}{:02x}", r, g, b);
            }
            AppEvent::SessionStarted { id } => {
                info!("SESSION | started id={}", id);
            }
            AppEvent::SessionStartFailed(e) => {
                warn!("SESSION | start failed: {}", Error::from(*e));
            }
            AppEvent::SessionEnded { id, reason } => {
                info!("SESSION | ended id={} reason={:?}", id, reason);
            }
            AppEvent::SessionEndFailed { id, error } => {
                warn!("SESSION | end call failed id={}: {}", id, Error::from(*error));
            }
            AppEvent::PeersUpdated { count } => {
                info!("PEERS | {} active", count);
            }
            AppEvent::PeerPollFailed(e) => {
                warn!("PEERS | poll failed, cleared: {}", Error::from(*e));
            }
        }
    }
}
