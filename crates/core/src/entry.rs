//! Persisted config entry: setup data, options overlay, and the two flows that
//! write them.
//!
//! Options are layered over the setup data. A changed option only takes
//! effect when the controller is rebuilt from the entry.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::entity::{DEFAULT_SCAN_INTERVAL, DOMAIN, SENSOR_NAME};
use crate::error::ConfigError;

/// User-editable options. Every field is optional so that unset values fall
/// through to the next layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_interval: Option<u32>,
}

impl EntryOptions {
    pub fn with_scan_interval(hours: u32) -> Self {
        Self {
            scan_interval: Some(hours),
        }
    }

    /// Reject a refresh interval below one hour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.scan_interval {
            Some(0) => Err(ConfigError::InvalidOption {
                key: "scan_interval".to_string(),
                reason: "must be at least 1 hour".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// Unique id; one entry per domain.
    pub unique_id: String,
    pub title: String,
    pub data: EntryOptions,
    #[serde(default)]
    pub options: EntryOptions,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConfigEntry {
    /// Effective refresh interval: options, then setup data, then the default.
    pub fn scan_interval(&self) -> u32 {
        self.options
            .scan_interval
            .or(self.data.scan_interval)
            .unwrap_or(DEFAULT_SCAN_INTERVAL)
    }

    /// Read an entry from a JSON file. A missing file yields `Ok(None)`.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    /// Write to `<path>.tmp` then rename over the target.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp_path = PathBuf::from(format!("{}.tmp", path.display()));
        fs::write(&tmp_path, serde_json::to_string_pretty(self)?)?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

/// Initial setup of the single entry for this domain.
pub struct ConfigFlow {
    entry_file: PathBuf,
}

impl ConfigFlow {
    pub fn new(entry_file: PathBuf) -> Self {
        Self { entry_file }
    }

    /// Validate the user input and persist a new entry.
    ///
    /// Fails with [`ConfigError::AlreadyConfigured`] if an entry exists.
    pub fn create_entry(&self, input: EntryOptions) -> Result<ConfigEntry, ConfigError> {
        input.validate()?;
        if ConfigEntry::load(&self.entry_file)?.is_some() {
            return Err(ConfigError::AlreadyConfigured(DOMAIN.to_string()));
        }

        let now = Utc::now();
        let data = EntryOptions {
            scan_interval: Some(input.scan_interval.unwrap_or(DEFAULT_SCAN_INTERVAL)),
        };
        let entry = ConfigEntry {
            unique_id: DOMAIN.to_string(),
            title: SENSOR_NAME.to_string(),
            data,
            options: EntryOptions::default(),
            created_at: now,
            updated_at: now,
        };
        entry.save(&self.entry_file)?;

        info!(unique_id = %entry.unique_id, scan_interval = entry.scan_interval(), "created config entry");
        Ok(entry)
    }

    /// Load the existing entry, or create one with defaults.
    pub fn load_or_create(&self) -> Result<ConfigEntry, ConfigError> {
        match ConfigEntry::load(&self.entry_file)? {
            Some(entry) => Ok(entry),
            None => self.create_entry(EntryOptions::default()),
        }
    }
}

/// Post-setup editing of the entry's options.
pub struct OptionsFlow {
    entry_file: PathBuf,
}

impl OptionsFlow {
    pub fn new(entry_file: PathBuf) -> Self {
        Self { entry_file }
    }

    /// Current effective options, used to prefill the form.
    pub fn current(&self) -> Result<EntryOptions, ConfigError> {
        let entry = self.require_entry()?;
        Ok(EntryOptions::with_scan_interval(entry.scan_interval()))
    }

    /// Validate and store new options. The running controller is untouched.
    pub fn update(&self, input: EntryOptions) -> Result<ConfigEntry, ConfigError> {
        input.validate()?;
        let mut entry = self.require_entry()?;
        entry.options = input;
        entry.updated_at = Utc::now();
        entry.save(&self.entry_file)?;

        info!(
            unique_id = %entry.unique_id,
            scan_interval = entry.scan_interval(),
            "updated config entry options (applies after reload)"
        );
        Ok(entry)
    }

    fn require_entry(&self) -> Result<ConfigEntry, ConfigError> {
        ConfigEntry::load(&self.entry_file)?
            .ok_or_else(|| ConfigError::EntryNotFound(DOMAIN.to_string()))
    }
}
