//! Simulator control via simctl
//!
//! Thin command wrappers around `xcrun simctl` plus the boot-readiness
//! logic: after booting a device, CoreSimulator needs observable time
//! before an install will reliably succeed. We poll the inventory for the
//! device to report Booted, and fall back to a fixed settling delay when
//! the poll never confirms.

use std::path::Path;
use std::time::Duration;

use crate::catalog::DeviceCatalog;
use xcpilot_core::prelude::*;
use xcpilot_core::{run_captured, run_streamed};

/// Fixed settling delay used when the readiness poll cannot confirm boot
pub const BOOT_SETTLE_DELAY: Duration = Duration::from_secs(5);

/// Default bound on inventory polls after a boot command
pub const BOOT_POLL_ATTEMPTS: u32 = 10;

/// Default pause between inventory polls
pub const BOOT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// How long to wait for a freshly booted device before installing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootPolicy {
    pub poll_attempts: u32,
    pub poll_interval: Duration,
    pub settle_delay: Duration,
}

impl Default for BootPolicy {
    fn default() -> Self {
        Self {
            poll_attempts: BOOT_POLL_ATTEMPTS,
            poll_interval: BOOT_POLL_INTERVAL,
            settle_delay: BOOT_SETTLE_DELAY,
        }
    }
}

/// The device a simctl command is aimed at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimTarget {
    /// The `booted` sentinel: whatever device is currently booted
    Booted,
    /// A concrete device handle
    Device { udid: String },
}

impl SimTarget {
    pub fn device(udid: impl Into<String>) -> Self {
        Self::Device { udid: udid.into() }
    }

    /// The device argument simctl expects
    pub fn argument(&self) -> &str {
        match self {
            Self::Booted => "booted",
            Self::Device { udid } => udid,
        }
    }

    /// The concrete handle, when there is one
    pub fn udid(&self) -> Option<&str> {
        match self {
            Self::Booted => None,
            Self::Device { udid } => Some(udid),
        }
    }
}

/// What a boot command actually did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootOutcome {
    Booted,
    AlreadyBooted,
}

/// simctl refuses to boot a booted device; that refusal is success for us
fn is_already_booted_stderr(stderr: &str) -> bool {
    stderr.contains("current state: Booted")
}

/// Boot a device.
///
/// A failure because the device is already booted is reported as
/// `BootOutcome::AlreadyBooted`, not an error. Any other failure surfaces
/// so the caller can decide whether it is fatal.
pub async fn boot(target: &SimTarget) -> Result<BootOutcome> {
    match run_captured("xcrun", ["simctl", "boot", target.argument()]).await {
        Ok(_) => Ok(BootOutcome::Booted),
        Err(Error::ProcessExitedNonZero { stderr, .. }) if is_already_booted_stderr(&stderr) => {
            debug!("Device {} is already booted", target.argument());
            Ok(BootOutcome::AlreadyBooted)
        }
        Err(e) => Err(e),
    }
}

/// Install an app bundle onto a device
pub async fn install(target: &SimTarget, app_path: &Path) -> Result<()> {
    info!("Installing {} onto {}", app_path.display(), target.argument());
    let app_path = app_path.to_string_lossy();
    run_captured(
        "xcrun",
        ["simctl", "install", target.argument(), &*app_path],
    )
    .await?;
    Ok(())
}

/// Launch a bundle identifier on a device
pub async fn launch(target: &SimTarget, bundle_id: &str) -> Result<()> {
    info!("Launching {} on {}", bundle_id, target.argument());
    run_captured("xcrun", ["simctl", "launch", target.argument(), bundle_id]).await?;
    Ok(())
}

/// Bring the Simulator application to the foreground.
///
/// Fire-and-forget at the pipeline level; callers downgrade a failure here
/// to a warning.
pub async fn foreground_simulator() -> Result<()> {
    run_captured("open", ["-a", "Simulator"]).await?;
    Ok(())
}

/// Stream the OS log of a device, optionally filtered to one process
pub async fn stream_log(target: &SimTarget, process: Option<&str>) -> Result<()> {
    let mut args = vec![
        "simctl".to_string(),
        "spawn".to_string(),
        target.argument().to_string(),
        "log".to_string(),
        "stream".to_string(),
    ];
    if let Some(process) = process {
        args.push("--predicate".to_string());
        args.push(format!("processImagePath contains \"{process}\""));
    }
    run_streamed("xcrun", args).await
}

/// Wait until `target` is ready to accept an install.
///
/// For a concrete device, polls the inventory until the device reports
/// Booted, bounded by the policy; if the poll never confirms, sleeps the
/// fixed settling delay instead. For the `booted` sentinel there is nothing
/// to poll for, so only the fixed delay applies. Install is never attempted
/// before one of the two has elapsed.
pub async fn wait_until_ready(target: &SimTarget, policy: &BootPolicy) {
    let Some(udid) = target.udid() else {
        tokio::time::sleep(policy.settle_delay).await;
        return;
    };

    for attempt in 1..=policy.poll_attempts {
        match DeviceCatalog::fetch().await {
            Ok(catalog) => {
                if catalog
                    .find_by_udid(udid)
                    .is_some_and(|device| device.state.is_booted())
                {
                    debug!("Device {udid} reported Booted after {attempt} poll(s)");
                    return;
                }
            }
            Err(e) => debug!("Inventory poll failed: {e}"),
        }
        tokio::time::sleep(policy.poll_interval).await;
    }

    warn!(
        "Device {udid} did not report Booted after {} polls, falling back to fixed settle delay",
        policy.poll_attempts
    );
    tokio::time::sleep(policy.settle_delay).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sim_target_argument() {
        assert_eq!(SimTarget::Booted.argument(), "booted");
        assert_eq!(SimTarget::device("AAAA-1111").argument(), "AAAA-1111");
    }

    #[test]
    fn test_sim_target_udid() {
        assert_eq!(SimTarget::Booted.udid(), None);
        assert_eq!(SimTarget::device("AAAA-1111").udid(), Some("AAAA-1111"));
    }

    #[test]
    fn test_already_booted_stderr_detection() {
        let stderr = "An error was encountered processing the command \
                      (domain=com.apple.CoreSimulator.SimError, code=405):\n\
                      Unable to boot device in current state: Booted";
        assert!(is_already_booted_stderr(stderr));

        assert!(!is_already_booted_stderr("Invalid device: AAAA-1111"));
        assert!(!is_already_booted_stderr(""));
    }

    #[test]
    fn test_boot_policy_defaults() {
        let policy = BootPolicy::default();
        assert_eq!(policy.poll_attempts, BOOT_POLL_ATTEMPTS);
        assert_eq!(policy.poll_interval, BOOT_POLL_INTERVAL);
        assert_eq!(policy.settle_delay, BOOT_SETTLE_DELAY);
    }
}
