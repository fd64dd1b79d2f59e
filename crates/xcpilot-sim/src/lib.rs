//! # xcpilot-sim
//!
//! Everything that talks to the device-simulation service: fetching and
//! parsing the device inventory, resolving fuzzy device queries to a single
//! concrete device, and driving simctl (boot, install, launch, readiness).

pub mod catalog;
pub mod control;
pub mod resolve;

pub use catalog::{display_runtime, DeviceCatalog, DeviceRecord, DeviceState};
pub use control::{
    boot, foreground_simulator, install, launch, stream_log, wait_until_ready, BootOutcome,
    BootPolicy, SimTarget,
};
pub use resolve::{resolve, BOOTED_SENTINEL};
