//! Service seams for the deployment pipeline
//!
//! The pipeline talks to the simulator and the build tool through these
//! traits so tests can substitute recording fakes for the real commands.

use std::path::Path;

use xcpilot_build::{dump_build_settings, run_xcodebuild_streamed, BuildInvocation};
use xcpilot_core::prelude::*;
use xcpilot_sim::control::{self, BootOutcome, BootPolicy, SimTarget};
use xcpilot_sim::DeviceCatalog;

/// Access to the device-simulation service
#[trait_variant::make(SimulatorService: Send)]
pub trait LocalSimulatorService {
    /// Fetch a fresh inventory snapshot
    async fn catalog(&self) -> Result<DeviceCatalog>;

    /// Boot a device; already-booted is not an error
    async fn boot(&self, target: &SimTarget) -> Result<BootOutcome>;

    /// Bring the simulator UI to the front
    async fn foreground(&self) -> Result<()>;

    /// Block until the target can accept an install
    async fn wait_until_ready(&self, target: &SimTarget);

    /// Install an app bundle onto the target
    async fn install(&self, target: &SimTarget, app_path: &Path) -> Result<()>;

    /// Launch a bundle identifier on the target
    async fn launch(&self, target: &SimTarget, bundle_id: &str) -> Result<()>;
}

/// Access to the build tool
#[trait_variant::make(BuildService: Send)]
pub trait LocalBuildService {
    /// Run the build action, streaming output to the terminal
    async fn build(&self, invocation: &BuildInvocation) -> Result<()>;

    /// Capture a build-settings dump for the invocation
    async fn settings_dump(&self, invocation: &BuildInvocation) -> Result<String>;
}

/// Production simulator service backed by `xcrun simctl`
#[derive(Debug, Clone, Default)]
pub struct SimctlService {
    pub boot_policy: BootPolicy,
}

impl SimctlService {
    pub fn new(boot_policy: BootPolicy) -> Self {
        Self { boot_policy }
    }
}

impl SimulatorService for SimctlService {
    async fn catalog(&self) -> Result<DeviceCatalog> {
        DeviceCatalog::fetch().await
    }

    async fn boot(&self, target: &SimTarget) -> Result<BootOutcome> {
        control::boot(target).await
    }

    async fn foreground(&self) -> Result<()> {
        control::foreground_simulator().await
    }

    async fn wait_until_ready(&self, target: &SimTarget) {
        control::wait_until_ready(target, &self.boot_policy).await
    }

    async fn install(&self, target: &SimTarget, app_path: &Path) -> Result<()> {
        control::install(target, app_path).await
    }

    async fn launch(&self, target: &SimTarget, bundle_id: &str) -> Result<()> {
        control::launch(target, bundle_id).await
    }
}

/// Production build service backed by xcodebuild
#[derive(Debug, Clone, Default)]
pub struct XcodebuildService {
    pub beautify: bool,
}

impl XcodebuildService {
    pub fn new(beautify: bool) -> Self {
        Self { beautify }
    }
}

impl BuildService for XcodebuildService {
    async fn build(&self, invocation: &BuildInvocation) -> Result<()> {
        run_xcodebuild_streamed(&invocation.build_args(), self.beautify).await
    }

    async fn settings_dump(&self, invocation: &BuildInvocation) -> Result<String> {
        dump_build_settings(invocation).await
    }
}
