//! WiFi station-mode adapter.
//!
//! Joins the access point named in the provisioning record.  Credential
//! checks run on every target; the driver wiring is ESP-IDF only.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::wifi::BlockingWifi` over `EspWifi`.
//! - **all other targets**: validation only, for host-side tests.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    InvalidSsid,
    InvalidPassword,
    DriverInit,
    ConnectionFailed,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)"),
            Self::DriverInit => write!(f, "WiFi driver initialisation failed"),
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
        }
    }
}

impl core::error::Error for ConnectivityError {}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

/// Station credentials that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    ssid: heapless::String<32>,
    password: heapless::String<64>,
}

impl WifiCredentials {
    pub fn new(ssid: &str, password: &str) -> Result<Self, ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        Ok(Self {
            ssid: ssid.try_into().map_err(|()| ConnectivityError::InvalidSsid)?,
            password: password
                .try_into()
                .map_err(|()| ConnectivityError::InvalidPassword)?,
        })
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF station
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use esp_impl::connect_station;

#[cfg(target_os = "espidf")]
mod esp_impl {
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_hal::modem::Modem;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
    use log::{info, warn};

    use super::{ConnectivityError, WifiCredentials};

    /// Bring the station up and block until the netif has an address.
    /// The returned driver must be kept alive for the link to stay up.
    pub fn connect_station(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
        creds: &WifiCredentials,
    ) -> Result<BlockingWifi<EspWifi<'static>>, ConnectivityError> {
        let esp_wifi = EspWifi::new(modem, sysloop.clone(), Some(nvs))
            .map_err(|_| ConnectivityError::DriverInit)?;
        let mut wifi =
            BlockingWifi::wrap(esp_wifi, sysloop).map_err(|_| ConnectivityError::DriverInit)?;

        let config = Configuration::Client(ClientConfiguration {
            ssid: creds
                .ssid()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidSsid)?,
            password: creds
                .password()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method: if creds.is_open() {
                AuthMethod::None
            } else {
                AuthMethod::WPA2Personal
            },
            ..Default::default()
        });

        wifi.set_configuration(&config)
            .map_err(|_| ConnectivityError::DriverInit)?;
        wifi.start().map_err(|_| ConnectivityError::DriverInit)?;
        info!("WiFi: connecting to '{}'", creds.ssid());

        if let Err(e) = wifi.connect() {
            warn!("WiFi: connect failed: {:?}", e);
            return Err(ConnectivityError::ConnectionFailed);
        }
        wifi.wait_netif_up()
            .map_err(|_| ConnectivityError::ConnectionFailed)?;

        info!("WiFi: connected");
        Ok(wifi)
    }
}
