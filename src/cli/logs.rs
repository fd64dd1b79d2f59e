//! `xcpilot logs` - tail the OS log of a simulator

use clap::Args;

use xcpilot_core::prelude::*;
use xcpilot_sim::control::{stream_log, SimTarget};
use xcpilot_sim::{resolve, DeviceCatalog};

#[derive(Args, Debug)]
pub struct LogsArgs {
    /// The simulator to stream logs from, matched by name.
    /// Defaults to the booted simulator.
    #[arg(short, long)]
    pub destination: Option<String>,

    /// Filter by a specific process name or bundle identifier
    #[arg(short, long)]
    pub process: Option<String>,
}

pub async fn execute(args: LogsArgs) -> Result<()> {
    let target = resolve_target(args.destination.as_deref()).await;

    println!(
        "📝 Streaming logs for simulator {}... (Ctrl+C to stop)",
        target.argument()
    );
    stream_log(&target, args.process.as_deref()).await
}

/// Resolve the log target, degrading to the `booted` sentinel: simctl can
/// still pick a device for us, and an unusable one fails loudly there.
async fn resolve_target(query: Option<&str>) -> SimTarget {
    match lookup(query).await {
        Ok(target) => target,
        Err(e) => {
            if let Some(query) = query {
                warn!("Could not resolve '{query}' for log streaming: {e}");
                eprintln!(
                    "⚠️  Could not find a simulator matching '{query}'. Falling back to 'booted'."
                );
            }
            SimTarget::Booted
        }
    }
}

async fn lookup(query: Option<&str>) -> Result<SimTarget> {
    let catalog = DeviceCatalog::fetch().await?;
    let device = resolve(query, &catalog)?;
    Ok(SimTarget::device(device.udid.clone()))
}
