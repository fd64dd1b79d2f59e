//! Error types shared across the xcpilot crates

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Error types organized by layer
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Process Execution Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Executable '{name}' not found. Ensure it is in your PATH.")]
    ExecutableNotFound { name: String },

    #[error("{command} exited with status {code:?}{suffix}", suffix = format_stderr(.stderr))]
    ProcessExitedNonZero {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    // ─────────────────────────────────────────────────────────────
    // Simulator Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Could not read the simulator inventory: {message}")]
    CatalogUnavailable { message: String },

    #[error("No booted simulator found. Boot one with 'xcpilot sim boot <name>'.")]
    NoBootedDevice,

    #[error("No available simulator matches '{query}'")]
    NoDeviceMatch { query: String },

    // ─────────────────────────────────────────────────────────────
    // Pipeline Stage Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Build failed: {message}")]
    BuildFailed { message: String },

    #[error("Could not locate the built app bundle: {message}")]
    ArtifactNotLocatable { message: String },

    #[error("Install failed: {message}")]
    InstallFailed { message: String },

    #[error("Launch failed: {message}")]
    LaunchFailed { message: String },

    // ─────────────────────────────────────────────────────────────
    // Project/Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("No Xcode workspace, project, or Package.swift found in: {path}")]
    NoProject { path: PathBuf },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

fn format_stderr(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn executable_not_found(name: impl Into<String>) -> Self {
        Self::ExecutableNotFound { name: name.into() }
    }

    pub fn process_exited(command: impl Into<String>, code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self::ProcessExitedNonZero {
            command: command.into(),
            code,
            stderr: stderr.into(),
        }
    }

    pub fn catalog_unavailable(message: impl Into<String>) -> Self {
        Self::CatalogUnavailable {
            message: message.into(),
        }
    }

    pub fn no_device_match(query: impl Into<String>) -> Self {
        Self::NoDeviceMatch {
            query: query.into(),
        }
    }

    pub fn build_failed(message: impl Into<String>) -> Self {
        Self::BuildFailed {
            message: message.into(),
        }
    }

    pub fn artifact_not_locatable(message: impl Into<String>) -> Self {
        Self::ArtifactNotLocatable {
            message: message.into(),
        }
    }

    pub fn install_failed(message: impl Into<String>) -> Self {
        Self::InstallFailed {
            message: message.into(),
        }
    }

    pub fn launch_failed(message: impl Into<String>) -> Self {
        Self::LaunchFailed {
            message: message.into(),
        }
    }

    pub fn no_project(path: impl Into<PathBuf>) -> Self {
        Self::NoProject { path: path.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if this is a device-resolution failure.
    ///
    /// Resolution failures are the only class the deployment pipeline may
    /// degrade from (falling back to a generic destination); everything else
    /// terminates the run.
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            Error::CatalogUnavailable { .. } | Error::NoBootedDevice | Error::NoDeviceMatch { .. }
        )
    }

    /// Check if this error should terminate a pipeline run immediately
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::ExecutableNotFound { .. }
                | Error::NoProject { .. }
                | Error::BuildFailed { .. }
                | Error::ArtifactNotLocatable { .. }
                | Error::InstallFailed { .. }
                | Error::LaunchFailed { .. }
        )
    }
}
