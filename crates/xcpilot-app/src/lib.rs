//! # xcpilot-app
//!
//! Orchestration layer: per-project configuration, the service seams the
//! pipeline talks through, and the deployment pipeline itself
//! (build -> locate artifact -> ensure booted -> install -> launch).

pub mod config;
pub mod pipeline;
pub mod services;

pub use config::{load_settings, Settings};
pub use pipeline::{DeploymentPipeline, DeploymentRequest, PipelineOutcome};
pub use services::{BuildService, SimctlService, SimulatorService, XcodebuildService};
