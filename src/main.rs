//! xcpilot - a command-line companion for Xcode builds and iOS simulators
//!
//! Binary entry point; command implementations live in `cli`.

mod cli;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "xcpilot")]
#[command(about = "A friendly wrapper around xcodebuild and simctl", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the current project
    Build(cli::build::BuildArgs),
    /// Build and run the app on a simulator
    Run(cli::run::RunArgs),
    /// Build and run tests
    Test(cli::test::TestArgs),
    /// Clean build products, optionally including DerivedData
    Clean(cli::clean::CleanArgs),
    /// Tail the OS log of a simulator
    Logs(cli::logs::LogsArgs),
    /// Manage simulators
    #[command(subcommand)]
    Sim(cli::sim::SimCommand),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> xcpilot_core::Result<()> {
    xcpilot_core::logging::init()?;

    match cli.command {
        Command::Build(args) => cli::build::execute(args).await,
        Command::Run(args) => cli::run::execute(args).await,
        Command::Test(args) => cli::test::execute(args).await,
        Command::Clean(args) => cli::clean::execute(args).await,
        Command::Logs(args) => cli::logs::execute(args).await,
        Command::Sim(command) => cli::sim::execute(command).await,
    }
}
