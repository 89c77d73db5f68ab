use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::entity::{DATASET_FILE, DEFAULT_SCAN_INTERVAL};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_u32(profile: &str, key: &str) -> Option<u32> {
    profiled_env_opt(profile, key).and_then(|v| v.parse().ok())
}

/// Directory holding the running executable, or `.` when it cannot be resolved.
fn default_install_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    /// Directory the bundled dataset is resolved against.
    pub install_dir: PathBuf,
    /// Refresh interval override in hours; the config entry wins when unset.
    pub scan_interval: Option<u32>,
    /// JSON file holding the persisted config entry.
    pub entry_file: PathBuf,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `SHICI_PROFILE`. When set (e.g. `DEV`), every key
    /// is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("SHICI_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        let install_dir = profiled_env_opt(p, "SHICI_INSTALL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_install_dir);
        let entry_file = profiled_env_opt(p, "SHICI_ENTRY_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| install_dir.join("entry.json"));
        Self {
            profile: p.to_string(),
            scan_interval: profiled_env_u32(p, "SHICI_SCAN_INTERVAL"),
            install_dir,
            entry_file,
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Path of the bundled dataset file.
    pub fn dataset_path(&self) -> PathBuf {
        self.install_dir.join(DATASET_FILE)
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  install_dir:   {}", self.install_dir.display());
        tracing::info!("  dataset:       {}", self.dataset_path().display());
        tracing::info!("  entry_file:    {}", self.entry_file.display());
        tracing::info!(
            "  scan_interval: {}",
            self.scan_interval
                .map(|h| format!("{}h (override)", h))
                .unwrap_or_else(|| format!("from entry (default {}h)", DEFAULT_SCAN_INTERVAL))
        );
    }
}
