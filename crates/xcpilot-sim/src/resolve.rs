//! Device resolution
//!
//! Turns a human-supplied, possibly partial device query into exactly one
//! device from a catalog snapshot. Matching is substring-based and
//! first-match-wins in scan order (runtimes newest first, document order
//! within a runtime): predictable over clever -- the same query against the
//! same catalog always picks the same device.

use crate::catalog::{DeviceCatalog, DeviceRecord};
use xcpilot_core::prelude::*;

/// Query sentinel meaning "whatever is already booted"
pub const BOOTED_SENTINEL: &str = "booted";

/// Select exactly one target device.
///
/// Precedence:
/// 1. No query, or the literal `booted` sentinel: first available Booted
///    device in scan order, else `NoBootedDevice`.
/// 2. Anything else: case-insensitive substring match against available
///    device names, first match in scan order, else `NoDeviceMatch`.
pub fn resolve<'a>(query: Option<&str>, catalog: &'a DeviceCatalog) -> Result<&'a DeviceRecord> {
    match query {
        None => first_booted(catalog),
        Some(q) if q.eq_ignore_ascii_case(BOOTED_SENTINEL) => first_booted(catalog),
        Some(q) => match_by_name(q, catalog),
    }
}

fn first_booted(catalog: &DeviceCatalog) -> Result<&DeviceRecord> {
    catalog
        .devices_newest_first()
        .find(|device| device.available && device.state.is_booted())
        .ok_or(Error::NoBootedDevice)
}

fn match_by_name<'a>(query: &str, catalog: &'a DeviceCatalog) -> Result<&'a DeviceRecord> {
    let needle = query.to_lowercase();
    catalog
        .devices_newest_first()
        .find(|device| device.available && device.name.to_lowercase().contains(&needle))
        .inspect(|device| {
            debug!(
                "Resolved '{}' to {} ({}) in {}",
                query, device.name, device.udid, device.runtime
            )
        })
        .ok_or_else(|| Error::no_device_match(query))
}
