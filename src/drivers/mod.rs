//! Actuator and input drivers over `embedded-hal` traits, plus standalone
//! light patterns.

pub mod button;
pub mod led_patterns;
pub mod rgb_led;
