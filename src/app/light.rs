//! Single write path to the physical light.
//!
//! The presence and breath tasks both render to the same LED.  Every render
//! goes through [`LightBus::render`], which applies the configured
//! [`LightArbitration`] before touching the [`LightPort`].
//!
//! | Policy            | Presence writes         | Breath writes                  |
//! |-------------------|-------------------------|--------------------------------|
//! | `LastWriterWins`  | always                  | always                         |
//! | `SessionPriority` | unless inactive + peers | unless a session is active     |
//!
//! `LastWriterWins` is the historical device behaviour: whichever task ran
//! last owns the LED until the other's next tick.

use core::cell::RefCell;

use log::warn;
use serde::{Deserialize, Serialize};

use super::ports::LightPort;
use super::state::{Rgb, StateView};
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightArbitration {
    /// No arbitration; the most recent render wins.
    LastWriterWins,
    /// Presence owns the light while a session is open, breath while
    /// inactive with peers known.
    SessionPriority,
}

/// Which task is asking to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightOwner {
    Presence,
    Breath,
}

pub struct LightBus<L: LightPort> {
    light: RefCell<L>,
    policy: LightArbitration,
    view: StateView,
}

impl<L: LightPort> LightBus<L> {
    pub fn new(light: L, policy: LightArbitration, view: StateView) -> Self {
        Self {
            light: RefCell::new(light),
            policy,
            view,
        }
    }

    /// Whether `owner` may drive the light right now.
    pub fn may_render(&self, owner: LightOwner) -> bool {
        match self.policy {
            LightArbitration::LastWriterWins => true,
            LightArbitration::SessionPriority => {
                let active = self.view.is_active();
                match owner {
                    LightOwner::Presence => active || !self.view.has_peers(),
                    LightOwner::Breath => !active,
                }
            }
        }
    }

    /// Render on behalf of `owner`.  Returns `false` if the policy withheld
    /// the write or the actuator failed (already logged).
    pub fn render(&self, owner: LightOwner, color: Rgb, brightness: f32) -> bool {
        if !self.may_render(owner) {
            return false;
        }
        match self.light.borrow_mut().set(color, brightness) {
            Ok(()) => true,
            Err(e) => {
                warn!("Light write from {:?} failed: {}", owner, Error::from(e));
                false
            }
        }
    }

    /// Borrow the underlying actuator (tests, diagnostics).
    pub fn with_light<T>(&self, f: impl FnOnce(&L) -> T) -> T {
        f(&self.light.borrow())
    }
}
