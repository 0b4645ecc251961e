//! File-backed settings store.
//!
//! Persists the fixed-size schedule record as a single binary file on the
//! flash filesystem (the ESP-IDF VFS exposes POSIX file I/O, so the same
//! code path runs on host). The whole record is written in one pass via a
//! temp file + rename, so a power cut mid-write leaves the previous record
//! intact.
//!
//! `load()` is infallible by contract: a missing, truncated or invalid
//! record is replaced with defaults which are immediately written back, so
//! the file exists and is well-formed from first boot onward.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::SettingsStorePort;
use crate::config::ScheduleConfig;
use crate::error::StoreError;

pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_record(&self) -> Result<ScheduleConfig, StoreError> {
        let bytes = fs::read(&self.path).map_err(|_| StoreError::Io)?;
        let cfg = ScheduleConfig::decode(&bytes)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn write_record(&self, cfg: &ScheduleConfig) -> Result<(), StoreError> {
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, cfg.encode()).map_err(|_| StoreError::Io)?;
        fs::rename(&tmp, &self.path).map_err(|_| StoreError::Io)?;
        Ok(())
    }
}

impl SettingsStorePort for FileSettingsStore {
    fn load(&mut self) -> ScheduleConfig {
        match self.read_record() {
            Ok(cfg) => {
                info!("settings loaded from {}", self.path.display());
                cfg
            }
            Err(e) => {
                warn!(
                    "settings record unusable ({}), rewriting defaults to {}",
                    e,
                    self.path.display()
                );
                let defaults = ScheduleConfig::default();
                if let Err(e) = self.write_record(&defaults) {
                    warn!("default record rewrite failed: {}", e);
                }
                defaults
            }
        }
    }

    fn save(&mut self, cfg: &ScheduleConfig) -> Result<(), StoreError> {
        self.write_record(cfg)
    }
}
