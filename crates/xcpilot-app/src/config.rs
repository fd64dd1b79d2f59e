//! Per-project configuration (.xcpilot/config.toml)
//!
//! Everything is optional; a missing or unparsable file degrades to
//! defaults with a warning so a broken config never blocks a build.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use xcpilot_core::prelude::*;
use xcpilot_sim::control::{
    BootPolicy, BOOT_POLL_ATTEMPTS, BOOT_POLL_INTERVAL, BOOT_SETTLE_DELAY,
};

const CONFIG_FILENAME: &str = "config.toml";
const XCPILOT_DIR: &str = ".xcpilot";

/// Application settings (.xcpilot/config.toml)
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub build: BuildSection,

    #[serde(default)]
    pub simulator: SimulatorSection,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BuildSection {
    /// Scheme used when none is given on the command line
    #[serde(default)]
    pub scheme: Option<String>,

    /// Device query used when none is given on the command line
    #[serde(default)]
    pub destination: Option<String>,

    /// Pipe streamed xcodebuild output through xcbeautify when available
    #[serde(default = "default_beautify")]
    pub beautify: bool,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            scheme: None,
            destination: None,
            beautify: default_beautify(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SimulatorSection {
    /// Fixed settling delay when the readiness poll cannot confirm a boot
    #[serde(default = "default_settle_secs")]
    pub boot_settle_secs: u64,

    /// Bound on inventory polls after a boot command
    #[serde(default = "default_poll_attempts")]
    pub boot_poll_attempts: u32,

    /// Pause between inventory polls
    #[serde(default = "default_poll_interval_ms")]
    pub boot_poll_interval_ms: u64,
}

impl SimulatorSection {
    pub fn boot_policy(&self) -> BootPolicy {
        BootPolicy {
            poll_attempts: self.boot_poll_attempts,
            poll_interval: Duration::from_millis(self.boot_poll_interval_ms),
            settle_delay: Duration::from_secs(self.boot_settle_secs),
        }
    }
}

impl Default for SimulatorSection {
    fn default() -> Self {
        Self {
            boot_settle_secs: default_settle_secs(),
            boot_poll_attempts: default_poll_attempts(),
            boot_poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_beautify() -> bool {
    true
}

fn default_settle_secs() -> u64 {
    BOOT_SETTLE_DELAY.as_secs()
}

fn default_poll_attempts() -> u32 {
    BOOT_POLL_ATTEMPTS
}

fn default_poll_interval_ms() -> u64 {
    BOOT_POLL_INTERVAL.as_millis() as u64
}

/// Load settings from .xcpilot/config.toml
///
/// Returns default settings if the file doesn't exist or can't be parsed.
pub fn load_settings(project_path: &Path) -> Settings {
    let config_path = project_path.join(XCPILOT_DIR).join(CONFIG_FILENAME);

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}
