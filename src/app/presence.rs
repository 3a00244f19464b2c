//! Presence task: distance sensor → session lifecycle → "active" light.
//!
//! Each tick, in order:
//!
//! 1. sample `now` and read the distance (errors mean "unavailable");
//! 2. render the light from the state *before* this tick's transition:
//!    own colour at full brightness while active, off otherwise;
//! 3. evolve the session:
//!
//! | present | session  | action                                               |
//! |---------|----------|------------------------------------------------------|
//! | yes     | inactive | registry start; open on success, stay idle otherwise |
//! | yes     | active   | `last_refresh = now`                                 |
//! | no      | active   | end if `now - last_refresh > timeout`, else wait     |
//! | no      | inactive | nothing                                              |
//!
//! "Present" means a distance was read **and** it exceeds the threshold.

use core::time::Duration;
use std::rc::Rc;

use log::debug;

use super::events::EndReason;
use super::light::{LightBus, LightOwner};
use super::ports::{EventSink, LightPort, PresenceSensor, SessionRegistry, TimePort};
use super::session::{SharedRegistry, end_session, start_session};
use super::state::{OFF, Session, SessionWriter};
use crate::config::DeviceConfig;
use crate::error::Error;

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceOutcome {
    /// No presence, no session.
    Idle,
    /// Presence seen and the registry opened a session.
    Started,
    /// Presence seen but the registry call failed.
    StartFailed,
    /// Presence confirmed on an open session.
    Refreshed,
    /// No presence, session still within its grace period.
    Grace,
    /// No presence for longer than the timeout; session closed.
    Ended,
}

pub struct PresenceTask<S, L, R, C, E>
where
    S: PresenceSensor,
    L: LightPort,
    R: SessionRegistry,
    C: TimePort,
    E: EventSink,
{
    sensor: S,
    light: Rc<LightBus<L>>,
    registry: SharedRegistry<R>,
    session: SessionWriter,
    clock: C,
    sink: E,
    threshold_mm: u16,
    end_timeout_ms: u64,
    period: Duration,
}

impl<S, L, R, C, E> PresenceTask<S, L, R, C, E>
where
    S: PresenceSensor,
    L: LightPort,
    R: SessionRegistry,
    C: TimePort,
    E: EventSink,
{
    pub fn new(
        sensor: S,
        light: Rc<LightBus<L>>,
        registry: SharedRegistry<R>,
        session: SessionWriter,
        clock: C,
        sink: E,
        config: &DeviceConfig,
    ) -> Self {
        Self {
            sensor,
            light,
            registry,
            session,
            clock,
            sink,
            threshold_mm: config.presence_threshold_mm,
            end_timeout_ms: config.session_end_timeout_ms(),
            period: Duration::from_millis(u64::from(config.sensor_period_ms)),
        }
    }

    /// Run one presence cycle.
    pub fn tick(&mut self) -> PresenceOutcome {
        let now = self.clock.now_ms();
        let reading = self.sensor.read_distance_mm();
        if let Err(e) = reading {
            debug!("Distance unavailable: {}", Error::from(e));
        }

        let own = self.session.own_color();
        if self.session.is_active() {
            self.light.render(LightOwner::Presence, own, 1.0);
        } else {
            self.light.render(LightOwner::Presence, OFF, 0.0);
        }

        let present = matches!(reading, Ok(mm) if mm > self.threshold_mm);

        match (present, self.session.session()) {
            (true, Session::Inactive) => {
                if start_session(&self.session, &self.registry, &mut self.sink, own, now) {
                    PresenceOutcome::Started
                } else {
                    PresenceOutcome::StartFailed
                }
            }
            (true, Session::Active { .. }) => {
                self.session.refresh(now);
                PresenceOutcome::Refreshed
            }
            (false, Session::Active { last_refresh_ms, .. })
                if now.saturating_sub(last_refresh_ms) > self.end_timeout_ms =>
            {
                end_session(&self.session, &self.registry, &mut self.sink, EndReason::Timeout);
                PresenceOutcome::Ended
            }
            (false, Session::Active { .. }) => PresenceOutcome::Grace,
            (false, Session::Inactive) => PresenceOutcome::Idle,
        }
    }

    /// Tick forever at the sensor period.
    pub async fn run(mut self) {
        loop {
            self.tick();
            async_io_mini::Timer::after(self.period).await;
        }
    }
}
