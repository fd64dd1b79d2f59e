//! `xcpilot sim` - manage simulators

use clap::Subcommand;

use xcpilot_core::prelude::*;
use xcpilot_sim::control::{boot, foreground_simulator, SimTarget};
use xcpilot_sim::{display_runtime, resolve, DeviceCatalog};

#[derive(Subcommand, Debug)]
pub enum SimCommand {
    /// List available simulators grouped by runtime
    List,
    /// Fuzzy-find and boot a simulator (e.g. xcpilot sim boot "15 pro")
    Boot {
        /// Part of the simulator name to match
        query: String,
    },
}

pub async fn execute(command: SimCommand) -> Result<()> {
    match command {
        SimCommand::List => list().await,
        SimCommand::Boot { query } => boot_matching(&query).await,
    }
}

async fn list() -> Result<()> {
    println!("📱 Fetching simulator list...");
    let catalog = DeviceCatalog::fetch().await?;

    let mut printed = false;
    for (runtime, devices) in catalog.runtimes_newest_first() {
        let available: Vec<_> = devices.iter().filter(|d| d.available).collect();
        if available.is_empty() {
            continue;
        }

        println!("\n{}:", display_runtime(runtime));
        for device in available {
            let icon = if device.state.is_booted() { "🟢" } else { "⚪️" };
            println!("  {icon} {}", device.name);
        }
        printed = true;
    }

    if !printed {
        println!("No available simulators found.");
    }
    Ok(())
}

async fn boot_matching(query: &str) -> Result<()> {
    println!("🔍 Searching for a simulator matching '{query}'...");
    let catalog = DeviceCatalog::fetch().await?;
    let device = resolve(Some(query), &catalog)?;

    if device.state.is_booted() {
        println!("✅ {} is already booted.", device.name);
    } else {
        println!("📱 Booting {}...", device.name);
        boot(&SimTarget::device(device.udid.clone())).await?;
    }

    if let Err(e) = foreground_simulator().await {
        warn!("Could not open the Simulator app: {e}");
    }
    Ok(())
}
