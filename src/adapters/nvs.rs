//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`ConfigPort`]: the whole [`SystemConfig`] is stored as one
//! `postcard` blob under `sericult/syscfg`.
//!
//! - Config validation: all fields are range-checked before persistence
//!   and again after loading.
//! - Atomic writes: ESP-IDF NVS commits are atomic per `set_blob`.
//! - The simulation backend keeps the blob in memory (dev/test only).

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SystemConfig;

#[cfg(target_os = "espidf")]
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};

const CONFIG_NAMESPACE: &str = "sericult";
const CONFIG_KEY: &str = "syscfg";

/// Upper bound for the serialised config blob.
const MAX_BLOB_SIZE: usize = 512;

pub struct NvsAdapter {
    #[cfg(target_os = "espidf")]
    nvs: EspNvs<NvsDefault>,
    #[cfg(not(target_os = "espidf"))]
    blob: Option<Vec<u8>>,
}

impl NvsAdapter {
    /// Open the config namespace on the default NVS partition.
    #[cfg(target_os = "espidf")]
    pub fn new(partition: EspDefaultNvsPartition) -> Result<Self, ConfigError> {
        let nvs = EspNvs::new(partition, CONFIG_NAMESPACE, true).map_err(|e| {
            warn!("NvsAdapter: open '{}' failed: {}", CONFIG_NAMESPACE, e);
            ConfigError::IoError
        })?;
        info!("NvsAdapter: ESP-IDF NVS namespace '{}' open", CONFIG_NAMESPACE);
        Ok(Self { nvs })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Result<Self, ConfigError> {
        info!("NvsAdapter: simulation backend");
        Ok(Self { blob: None })
    }

    /// Simulation: pre-seed the stored blob (e.g. to test corruption).
    #[cfg(not(target_os = "espidf"))]
    pub fn with_blob(bytes: &[u8]) -> Self {
        Self {
            blob: Some(bytes.to_vec()),
        }
    }

    #[cfg(target_os = "espidf")]
    fn read_blob(&self) -> Result<Option<Vec<u8>>, ConfigError> {
        let mut buf = [0u8; MAX_BLOB_SIZE];
        match self.nvs.get_blob(CONFIG_KEY, &mut buf) {
            Ok(Some(bytes)) => Ok(Some(bytes.to_vec())),
            Ok(None) => Ok(None),
            Err(e) => {
                warn!("NvsAdapter: read '{}' failed: {}", CONFIG_KEY, e);
                Err(ConfigError::IoError)
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_blob(&self) -> Result<Option<Vec<u8>>, ConfigError> {
        Ok(self.blob.clone())
    }

    #[cfg(target_os = "espidf")]
    fn write_blob(&mut self, bytes: &[u8]) -> Result<(), ConfigError> {
        self.nvs.set_blob(CONFIG_KEY, bytes).map_err(|e| {
            warn!("NvsAdapter: write '{}' failed: {}", CONFIG_KEY, e);
            ConfigError::IoError
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_blob(&mut self, bytes: &[u8]) -> Result<(), ConfigError> {
        self.blob = Some(bytes.to_vec());
        Ok(())
    }
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let bytes = self.read_blob()?.ok_or(ConfigError::NotFound)?;
        let cfg: SystemConfig = postcard::from_bytes(&bytes).map_err(|_| ConfigError::Corrupted)?;
        cfg.validate()?;
        info!("NvsAdapter: loaded config ({} bytes)", bytes.len());
        Ok(cfg)
    }

    fn save(&mut self, config: &SystemConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        if bytes.len() > MAX_BLOB_SIZE {
            return Err(ConfigError::StorageFull);
        }
        self.write_blob(&bytes)?;
        info!("NvsAdapter: config saved ({} bytes)", bytes.len());
        Ok(())
    }
}

/// Boot-time config resolution.
///
/// A missing blob is replaced by persisted defaults; an unreadable or
/// invalid one falls back to defaults without overwriting it.
pub fn load_or_default(port: &mut impl ConfigPort) -> SystemConfig {
    match port.load() {
        Ok(cfg) => cfg,
        Err(ConfigError::NotFound) => {
            info!("NvsAdapter: no stored config, writing defaults");
            let cfg = SystemConfig::default();
            if let Err(e) = port.save(&cfg) {
                warn!("NvsAdapter: could not persist defaults: {}", e);
            }
            cfg
        }
        Err(e) => {
            warn!("NvsAdapter: stored config rejected ({}), using defaults", e);
            SystemConfig::default()
        }
    }
}
