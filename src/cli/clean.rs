//! `xcpilot clean` - clean build products

use clap::Args;

use xcpilot_build::{BuildInvocation, Destination};
use xcpilot_core::prelude::*;
use xcpilot_core::{run_streamed, ProjectContext};

#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Also delete this project's DerivedData folders
    #[arg(short, long)]
    pub deep: bool,
}

pub async fn execute(args: CleanArgs) -> Result<()> {
    let context = ProjectContext::discover_required()?;

    println!("🧹 Cleaning project...");

    let invocation = BuildInvocation::new(
        context.target_args(),
        context.inferred_scheme(),
        Destination::GenericSimulator,
    );

    // A failed clean is not worth aborting over; DerivedData removal below
    // still works and the build system recovers on the next build.
    if let Err(e) = run_streamed("xcodebuild", invocation.clean_args()).await {
        warn!("xcodebuild clean failed: {e}");
        eprintln!("⚠️  xcodebuild clean failed: {e}");
    }

    if args.deep {
        deep_clean(&context)?;
    }

    println!("✅ Clean complete");
    Ok(())
}

/// Delete `~/Library/Developer/Xcode/DerivedData/<Name>-*`
fn deep_clean(context: &ProjectContext) -> Result<()> {
    let name = match context.inferred_scheme() {
        Some(name) => name,
        None => {
            eprintln!("⚠️  Could not determine a project name for the DerivedData clean.");
            return Ok(());
        }
    };

    let derived_data = dirs::home_dir()
        .ok_or_else(|| Error::config("Could not determine the home directory"))?
        .join("Library/Developer/Xcode/DerivedData");

    let entries = match std::fs::read_dir(&derived_data) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!(
                "⚠️  Could not read {}: {e}",
                derived_data.display()
            );
            return Ok(());
        }
    };

    let prefix = format!("{name}-");
    let mut removed = false;
    for entry in entries.flatten() {
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if file_name.starts_with(&prefix) {
            std::fs::remove_dir_all(entry.path())?;
            println!("   Deleted DerivedData: {file_name}");
            removed = true;
        }
    }

    if !removed {
        eprintln!("⚠️  No DerivedData folder found for '{name}'.");
    }
    Ok(())
}
