//! Breath task: raised-cosine pulse across the peer colours.
//!
//! Phase depends only on the monotonic clock:
//!
//! ```text
//! idx  = (ms / period) mod n          colour shown during this period
//! frac = (ms mod period) / period     position within the pulse, [0, 1)
//! b    = (1 - cos(2π·frac)) / 2       0 → 1 → 0 once per period
//! ```
//!
//! so the pulse stays continuous when the list changes length or a colour
//! switch happens.  With no peers the light is turned off and the task
//! backs off to the idle interval.

use core::f32::consts::PI;
use core::time::Duration;
use std::rc::Rc;

use super::light::{LightBus, LightOwner};
use super::ports::{LightPort, TimePort};
use super::state::{OFF, Rgb, StateView};
use crate::config::DeviceConfig;

/// Raised-cosine brightness at `ms` for a pulse of `period_ms`.
pub fn brightness_at(ms: u64, period_ms: u32) -> f32 {
    let period = u64::from(period_ms.max(1));
    let frac = (ms % period) as f32 / period as f32;
    (1.0 - (2.0 * PI * frac).cos()) / 2.0
}

/// Colour and brightness to show at `ms`, or `None` when there is nothing
/// to animate.
pub fn frame(colors: &[Rgb], ms: u64, period_ms: u32) -> Option<(Rgb, f32)> {
    if colors.is_empty() {
        return None;
    }
    let period = u64::from(period_ms.max(1));
    let idx = ((ms / period) % colors.len() as u64) as usize;
    Some((colors[idx], brightness_at(ms, period_ms)))
}

pub struct BreathTask<L: LightPort, C: TimePort> {
    light: Rc<LightBus<L>>,
    view: StateView,
    clock: C,
    period_ms: u32,
    frame_delay: Duration,
    idle_delay: Duration,
}

impl<L: LightPort, C: TimePort> BreathTask<L, C> {
    pub fn new(light: Rc<LightBus<L>>, view: StateView, clock: C, config: &DeviceConfig) -> Self {
        Self {
            light,
            view,
            clock,
            period_ms: config.breath_period_ms,
            frame_delay: Duration::from_millis(u64::from(config.breath_frame_ms)),
            idle_delay: Duration::from_millis(u64::from(config.breath_idle_ms)),
        }
    }

    /// Render one frame and return how long to sleep before the next.
    pub fn tick(&mut self) -> Duration {
        let colors = self.view.peer_colors();
        match frame(&colors, self.clock.now_ms(), self.period_ms) {
            Some((color, brightness)) => {
                self.light.render(LightOwner::Breath, color, brightness);
                self.frame_delay
            }
            None => {
                self.light.render(LightOwner::Breath, OFF, 0.0);
                self.idle_delay
            }
        }
    }

    pub async fn run(mut self) {
        loop {
            let delay = self.tick();
            async_io_mini::Timer::after(delay).await;
        }
    }
}
