//! Standalone light patterns shown outside the session controller.
//!
//! The only one today is the "awaiting provisioning" spectrum fade: the hue
//! walks the colour wheel in small steps at full brightness while the
//! device has no usable configuration.
//!
//! | Pattern        | Description                     | Rate              |
//! |----------------|---------------------------------|-------------------|
//! | SpectrumFade   | Full-saturation hue rotation    | 0.002 turn / 20 ms|

use core::time::Duration;

use async_io_mini::Timer;
use log::{info, warn};

use crate::app::ports::LightPort;
use crate::app::state::Rgb;

pub const SPECTRUM_STEP: f32 = 0.002;
pub const SPECTRUM_FRAME_MS: u64 = 20;

/// Hue in turns (`0.0..1.0`, wraps) to a fully saturated, full-value colour.
pub fn hsv_to_rgb(h: f32) -> Rgb {
    let h = h.rem_euclid(1.0) * 6.0;
    let sector = h as u32;
    let f = h - sector as f32;
    let q = (255.0 * (1.0 - f)) as u8;
    let t = (255.0 * f) as u8;
    match sector % 6 {
        0 => (255, t, 0),
        1 => (q, 255, 0),
        2 => (0, 255, t),
        3 => (0, q, 255),
        4 => (t, 0, 255),
        _ => (255, 0, q),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpectrumFade {
    hue: f32,
}

impl SpectrumFade {
    pub fn new() -> Self {
        Self { hue: 0.0 }
    }

    pub fn hue(&self) -> f32 {
        self.hue
    }

    /// Advance one frame and return the colour to show.
    pub fn step(&mut self) -> Rgb {
        self.hue = (self.hue + SPECTRUM_STEP).rem_euclid(1.0);
        hsv_to_rgb(self.hue)
    }
}

/// Drive `light` with the spectrum fade forever.
pub async fn run_spectrum_fade<L: LightPort>(mut light: L) {
    info!("LED: awaiting provisioning, spectrum fade");
    let mut fade = SpectrumFade::new();
    let mut warned = false;
    loop {
        if let Err(e) = light.set(fade.step(), 1.0) {
            if !warned {
                warn!("LED: spectrum frame dropped: {}", e);
                warned = true;
            }
        }
        Timer::after(Duration::from_millis(SPECTRUM_FRAME_MS)).await;
    }
}
