//! Button task: manual override that ends the open session.
//!
//! Polls the input every `button_poll_ms`.  An accepted press edge ends the
//! session through the same path as the presence timeout; a press while
//! inactive is accepted (it still restarts the debounce window) but does
//! nothing.

use core::time::Duration;

use log::{debug, info};

use super::events::EndReason;
use super::ports::{EventSink, ManualInput, SessionRegistry, TimePort};
use super::session::{SharedRegistry, end_session};
use super::state::SessionWriter;
use crate::config::DeviceConfig;
use crate::error::Error;
use crate::drivers::button::{Edge, EdgeDebouncer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonOutcome {
    /// No press edge on this poll.
    NoEdge,
    /// Press edge inside the debounce window.
    Debounced,
    /// Accepted press, but no session was open.
    NoSession,
    /// Accepted press closed the session.
    Ended,
}

pub struct ButtonTask<B, R, C, E>
where
    B: ManualInput,
    R: SessionRegistry,
    C: TimePort,
    E: EventSink,
{
    input: B,
    debouncer: EdgeDebouncer,
    registry: SharedRegistry<R>,
    session: SessionWriter,
    clock: C,
    sink: E,
    period: Duration,
}

impl<B, R, C, E> ButtonTask<B, R, C, E>
where
    B: ManualInput,
    R: SessionRegistry,
    C: TimePort,
    E: EventSink,
{
    pub fn new(
        input: B,
        registry: SharedRegistry<R>,
        session: SessionWriter,
        clock: C,
        sink: E,
        config: &DeviceConfig,
    ) -> Self {
        Self {
            input,
            debouncer: EdgeDebouncer::new(config.debounce_ms),
            registry,
            session,
            clock,
            sink,
            period: Duration::from_millis(u64::from(config.button_poll_ms)),
        }
    }

    pub fn tick(&mut self) -> ButtonOutcome {
        let now = self.clock.now_ms();
        let pressed = self.input.is_pressed().unwrap_or_else(|e| {
            debug!("Button read failed, treated as released: {}", Error::from(e));
            false
        });

        match self.debouncer.update(pressed, now) {
            Edge::None => ButtonOutcome::NoEdge,
            Edge::Ignored => {
                debug!("Button: edge inside debounce window ignored");
                ButtonOutcome::Debounced
            }
            Edge::Accepted => {
                if end_session(&self.session, &self.registry, &mut self.sink, EndReason::Button) {
                    info!("Button: session ended by press");
                    ButtonOutcome::Ended
                } else {
                    debug!("Button: press with no open session");
                    ButtonOutcome::NoSession
                }
            }
        }
    }

    pub async fn run(mut self) {
        loop {
            self.tick();
            async_io_mini::Timer::after(self.period).await;
        }
    }
}
