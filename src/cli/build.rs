//! `xcpilot build` - build the current project

use clap::Args;

use xcpilot_app::config;
use xcpilot_build::{run_xcodebuild_streamed, BuildInvocation, Destination};
use xcpilot_core::prelude::*;
use xcpilot_core::ProjectContext;

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// The scheme to build. Defaults to the inferred project name.
    #[arg(short, long)]
    pub scheme: Option<String>,

    /// The destination to build for. Defaults to the generic iOS Simulator.
    #[arg(short, long)]
    pub destination: Option<String>,
}

pub async fn execute(args: BuildArgs) -> Result<()> {
    let context = ProjectContext::discover_required()?;
    let settings = config::load_settings(context.root());

    let scheme = super::resolve_scheme(args.scheme, settings.build.scheme.as_deref(), &context);
    let destination = args
        .destination
        .map(Destination::Custom)
        .unwrap_or(Destination::GenericSimulator);

    let invocation = BuildInvocation::new(context.target_args(), scheme, destination);
    println!(
        "🛠️  Building {} for {}...",
        invocation.scheme.as_deref().unwrap_or("project"),
        invocation.destination
    );

    run_xcodebuild_streamed(&invocation.build_args(), settings.build.beautify)
        .await
        .map_err(|e| Error::build_failed(e.to_string()))?;

    println!("✅ Build succeeded");
    Ok(())
}
