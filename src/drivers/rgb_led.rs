//! Tri-colour PWM light driver.
//!
//! Three `embedded-hal` PWM channels drive the R/G/B dies of a
//! common-cathode LED.  Each channel's duty is
//! `channel / 255 × brightness × max_duty`, truncated.
//!
//! ## Dual-target design
//!
//! On ESP-IDF the channels are `LedcDriver`s (1 kHz).  On host/test any
//! `SetDutyCycle` mock works.

use embedded_hal::pwm::SetDutyCycle;

use crate::app::ports::LightPort;
use crate::app::state::Rgb;
use crate::error::ActuatorError;

pub struct PwmLight<P: SetDutyCycle> {
    channels: [P; 3],
}

impl<P: SetDutyCycle> PwmLight<P> {
    pub fn new(red: P, green: P, blue: P) -> Self {
        Self {
            channels: [red, green, blue],
        }
    }

    pub fn channels(&self) -> &[P; 3] {
        &self.channels
    }
}

/// Duty for one channel value at `brightness` (clamped to `[0, 1]`).
pub fn channel_duty(value: u8, brightness: f32, max_duty: u16) -> u16 {
    let brightness = if brightness.is_nan() {
        0.0
    } else {
        brightness.clamp(0.0, 1.0)
    };
    (f32::from(value) / 255.0 * brightness * f32::from(max_duty)) as u16
}

impl<P: SetDutyCycle> LightPort for PwmLight<P> {
    fn set(&mut self, (r, g, b): Rgb, brightness: f32) -> Result<(), ActuatorError> {
        for (ch, value) in self.channels.iter_mut().zip([r, g, b]) {
            let duty = channel_duty(value, brightness, ch.max_duty_cycle());
            ch.set_duty_cycle(duty)
                .map_err(|_| ActuatorError::PwmWriteFailed)?;
        }
        Ok(())
    }
}
