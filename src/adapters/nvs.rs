//! NVS (Non-Volatile Storage) adapter for the provisioning record.
//!
//! The captive portal writes one JSON blob to namespace `drinkmon`, key
//! `config`.  This adapter only reads it; saving belongs to the portal.
//! The simulation backend holds the blob in memory (dev/test only).

use log::{info, warn};

use crate::config::ProvisionedConfig;
use crate::error::{Error, Result};

#[cfg(target_os = "espidf")]
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};

pub const RECORD_NAMESPACE: &str = "drinkmon";
pub const RECORD_KEY: &str = "config";

const MAX_RECORD_SIZE: usize = 512;

pub struct ProvisioningStore {
    #[cfg(target_os = "espidf")]
    nvs: EspNvs<NvsDefault>,
    #[cfg(not(target_os = "espidf"))]
    record: Option<Vec<u8>>,
}

impl ProvisioningStore {
    /// Open the record namespace read-only.
    #[cfg(target_os = "espidf")]
    pub fn open(partition: EspDefaultNvsPartition) -> Result<Self> {
        let nvs = EspNvs::new(partition, RECORD_NAMESPACE, false)
            .map_err(|_| Error::Init("NVS namespace open failed"))?;
        info!("ProvisioningStore: namespace '{}' opened", RECORD_NAMESPACE);
        Ok(Self { nvs })
    }

    /// Simulation backend seeded with `record` (or nothing).
    #[cfg(not(target_os = "espidf"))]
    pub fn simulated(record: Option<&[u8]>) -> Self {
        info!("ProvisioningStore: simulation backend");
        Self {
            record: record.map(<[u8]>::to_vec),
        }
    }

    #[cfg(target_os = "espidf")]
    fn read_raw<'a>(&self, buf: &'a mut [u8]) -> Result<Option<&'a [u8]>> {
        self.nvs
            .get_raw(RECORD_KEY, buf)
            .map_err(|_| Error::Config("NVS read failed"))
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_raw<'a>(&self, buf: &'a mut [u8]) -> Result<Option<&'a [u8]>> {
        match &self.record {
            None => Ok(None),
            Some(data) if data.len() > buf.len() => Err(Error::Config("record too large")),
            Some(data) => {
                buf[..data.len()].copy_from_slice(data);
                Ok(Some(&buf[..data.len()]))
            }
        }
    }

    /// `Ok(None)` when the device was never provisioned; `Err` when a
    /// record exists but cannot be used.
    pub fn load(&self) -> Result<Option<ProvisionedConfig>> {
        let mut buf = [0u8; MAX_RECORD_SIZE];
        let Some(bytes) = self.read_raw(&mut buf)? else {
            info!("ProvisioningStore: no record");
            return Ok(None);
        };
        match ProvisionedConfig::from_json(bytes) {
            Ok(cfg) => {
                info!("ProvisioningStore: loaded record ({} bytes)", bytes.len());
                Ok(Some(cfg))
            }
            Err(e) => {
                warn!("ProvisioningStore: unusable record: {}", e);
                Err(e)
            }
        }
    }
}
