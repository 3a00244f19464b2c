//! System configuration parameters
//!
//! All tunable parameters for the Drinkmon controller.  Timing constants are
//! fixed for the whole run; only `own_color` comes from provisioning.

use serde::{Deserialize, Serialize};

use crate::app::light::LightArbitration;
use crate::app::state::Rgb;
use crate::error::{Error, Result};

/// Default registry endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://drinkmon.chrispatten.dev/api";

/// Core controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// This device's session colour.
    pub own_color: Rgb,

    // --- Presence ---
    /// Distance (mm) above which the object counts as lifted.
    pub presence_threshold_mm: u16,
    /// Seconds without presence before an open session is ended.
    pub session_end_timeout_secs: u32,
    /// Presence task period (milliseconds)
    pub sensor_period_ms: u32,

    // --- Button ---
    /// Button poll period (milliseconds)
    pub button_poll_ms: u32,
    /// Minimum gap between accepted button edges (milliseconds)
    pub debounce_ms: u32,

    // --- Peers ---
    /// Peer poll period (seconds)
    pub poll_interval_secs: u32,

    // --- Breath ---
    /// One full pulse per colour (milliseconds)
    pub breath_period_ms: u32,
    /// Re-render interval while peers exist (milliseconds)
    pub breath_frame_ms: u32,
    /// Re-check interval while no peers are known (milliseconds)
    pub breath_idle_ms: u32,

    // --- Remote ---
    /// Base URL of the session registry, without trailing slash.
    pub api_base_url: heapless::String<128>,
    /// Upper bound for any single registry request (milliseconds)
    pub request_timeout_ms: u32,

    /// Who may drive the light when presence and breath disagree.
    pub light_arbitration: LightArbitration,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        let mut api_base_url = heapless::String::new();
        // Fits: the constant is well under capacity.
        let _ = api_base_url.push_str(DEFAULT_API_BASE_URL);

        Self {
            own_color: (0, 0, 0),

            // Presence
            presence_threshold_mm: 100,
            session_end_timeout_secs: 60,
            sensor_period_ms: 1000, // 1 Hz

            // Button
            button_poll_ms: 20,
            debounce_ms: 200,

            // Peers
            poll_interval_secs: 30,

            // Breath
            breath_period_ms: 2000,
            breath_frame_ms: 20,
            breath_idle_ms: 200,

            // Remote
            api_base_url,
            request_timeout_ms: 5000,

            light_arbitration: LightArbitration::LastWriterWins,
        }
    }
}

impl DeviceConfig {
    /// Defaults with the provisioned colour applied.
    pub fn with_color(own_color: Rgb) -> Self {
        Self {
            own_color,
            ..Self::default()
        }
    }

    /// Session end timeout in milliseconds.
    pub fn session_end_timeout_ms(&self) -> u64 {
        u64::from(self.session_end_timeout_secs) * 1000
    }

    /// Peer poll interval in milliseconds.
    pub fn poll_interval_ms(&self) -> u64 {
        u64::from(self.poll_interval_secs) * 1000
    }

    /// Reject values that would stall or spin a task.
    pub fn validate(&self) -> Result<()> {
        if self.presence_threshold_mm == 0 {
            return Err(Error::Config("presence_threshold_mm must be > 0"));
        }
        if self.sensor_period_ms == 0
            || self.button_poll_ms == 0
            || self.poll_interval_secs == 0
            || self.breath_frame_ms == 0
            || self.breath_idle_ms == 0
        {
            return Err(Error::Config("task periods must be > 0"));
        }
        if self.breath_period_ms == 0 {
            return Err(Error::Config("breath_period_ms must be > 0"));
        }
        if self.request_timeout_ms == 0 {
            return Err(Error::Config("request_timeout_ms must be > 0"));
        }
        if self.request_timeout_ms >= self.session_end_timeout_secs.saturating_mul(1000) {
            return Err(Error::Config(
                "request_timeout_ms must be shorter than the session end timeout",
            ));
        }
        if self.api_base_url.is_empty() {
            return Err(Error::Config("api_base_url must not be empty"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Provisioning record
// ---------------------------------------------------------------------------

/// Record written by the captive portal: Wi-Fi credentials plus colour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionedConfig {
    pub ssid: heapless::String<32>,
    pub pw: heapless::String<64>,
    #[serde(default)]
    pub color: Rgb,
}

impl ProvisionedConfig {
    /// Decode the JSON record, e.g. `{"ssid":"home","pw":"secret123","color":[0,128,255]}`.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let record: Self = serde_json::from_slice(bytes)
            .map_err(|_| Error::Config("provisioning record is not valid JSON"))?;
        if record.ssid.is_empty() {
            return Err(Error::Config("provisioning record has empty ssid"));
        }
        Ok(record)
    }

    /// Controller configuration for this record.
    pub fn device_config(&self) -> DeviceConfig {
        DeviceConfig::with_color(self.color)
    }
}
