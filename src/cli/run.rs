//! `xcpilot run` - build and run the app on a simulator
//!
//! The full deployment pipeline: resolve a simulator, build for it, locate
//! the built bundle, make sure the device is booted, install, launch.

use clap::Args;

use xcpilot_app::{
    config, DeploymentPipeline, DeploymentRequest, SimctlService, XcodebuildService,
};
use xcpilot_core::prelude::*;
use xcpilot_core::ProjectContext;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// The scheme to run. Defaults to the inferred project name.
    #[arg(short, long)]
    pub scheme: Option<String>,

    /// The simulator to run on, matched by name (e.g. "15 pro").
    /// Defaults to the booted simulator.
    #[arg(short, long)]
    pub destination: Option<String>,
}

pub async fn execute(args: RunArgs) -> Result<()> {
    let context = ProjectContext::discover_required()?;
    let settings = config::load_settings(context.root());

    let scheme = super::resolve_scheme(args.scheme, settings.build.scheme.as_deref(), &context);
    println!(
        "🚀 Preparing {} for execution...",
        scheme.as_deref().unwrap_or("project")
    );

    let request = DeploymentRequest {
        target_args: context.target_args(),
        scheme,
        destination_query: args.destination.or_else(|| settings.build.destination.clone()),
    };

    let pipeline = DeploymentPipeline::new(
        SimctlService::new(settings.simulator.boot_policy()),
        XcodebuildService::new(settings.build.beautify),
    );

    let outcome = pipeline.run(&request).await?;
    println!("✅ Launched {} on {}", outcome.bundle_id, outcome.device);
    Ok(())
}
