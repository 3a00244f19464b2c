//! GPIO / peripheral pin assignments for the Drinkmon board (ESP32-WROOM).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// RGB light (discrete common-cathode LED, LEDC PWM)
// ---------------------------------------------------------------------------

pub const LED_R_GPIO: i32 = 19;
pub const LED_G_GPIO: i32 = 18;
pub const LED_B_GPIO: i32 = 5;

/// LEDC frequency for the RGB light (1 kHz).
pub const LED_PWM_FREQ_HZ: u32 = 1_000;

// ---------------------------------------------------------------------------
// I²C bus (VL53L0X time-of-flight sensor)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;
pub const I2C_BAUDRATE_HZ: u32 = 400_000;

// ---------------------------------------------------------------------------
// User button (active-low with internal pull-up)
// ---------------------------------------------------------------------------

/// Momentary push-button that ends the current session.
pub const BUTTON_GPIO: i32 = 23;
