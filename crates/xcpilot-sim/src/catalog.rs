//! Simulator inventory parsing
//!
//! `xcrun simctl list devices -j` returns a mapping from runtime key (one
//! platform/OS version) to a list of device objects. The format is owned by
//! Xcode and has drifted across releases -- notably the availability flag,
//! which has been both a boolean `isAvailable` and a string `availability`.
//! Parsing is therefore deliberately lenient: a device record missing its
//! name or udid is skipped, never fatal.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use xcpilot_core::prelude::*;
use xcpilot_core::run_captured;

/// Legacy availability encoding used by older simctl releases
const AVAILABLE_SENTINEL: &str = "(available)";

/// Extracts "<os>-<major>-<minor...>" from the tail of a runtime key,
/// e.g. "com.apple.CoreSimulator.SimRuntime.iOS-17-0"
static RUNTIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z]+)-(\d+(?:-\d+)*)$").expect("Invalid runtime pattern regex")
});

/// Lifecycle state reported by the simulation service.
///
/// Only `Booted` matters to resolution; every other state (including ones
/// future Xcode releases may invent) is "not booted".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Shutdown,
    Booted,
    Booting,
    ShuttingDown,
    Unknown,
}

impl DeviceState {
    fn parse(state: Option<&str>) -> Self {
        match state {
            Some("Booted") => Self::Booted,
            Some("Shutdown") => Self::Shutdown,
            Some("Booting") => Self::Booting,
            Some("Shutting Down") => Self::ShuttingDown,
            _ => Self::Unknown,
        }
    }

    pub fn is_booted(&self) -> bool {
        matches!(self, Self::Booted)
    }
}

/// One simulated device known to the simulation service
#[derive(Debug, Clone)]
pub struct DeviceRecord {
    /// Human-readable label, not unique ("iPhone 15 Pro")
    pub name: String,
    /// Opaque unique device handle
    pub udid: String,
    /// Runtime key of the platform/OS version this device belongs to
    pub runtime: String,
    pub state: DeviceState,
    pub available: bool,
}

/// Wire shape of a single device object. All fields optional; normalization
/// decides what is usable.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDevice {
    name: Option<String>,
    udid: Option<String>,
    state: Option<String>,
    is_available: Option<bool>,
    availability: Option<String>,
}

impl RawDevice {
    fn is_available(&self) -> bool {
        self.is_available == Some(true)
            || self.availability.as_deref() == Some(AVAILABLE_SENTINEL)
    }
}

/// Top-level wire shape of the inventory document
#[derive(Debug, Deserialize)]
struct RawInventory {
    devices: BTreeMap<String, Vec<RawDevice>>,
}

/// An immutable snapshot of the simulation service's device inventory,
/// keyed by runtime. A fresh fetch is required to observe state changes.
#[derive(Debug, Clone, Default)]
pub struct DeviceCatalog {
    // BTreeMap iterates keys ascending; scans reverse it so newer runtimes
    // (higher lexical keys) come first. Document order within a key is kept.
    runtimes: BTreeMap<String, Vec<DeviceRecord>>,
}

impl DeviceCatalog {
    /// Query the simulation service and parse its inventory
    pub async fn fetch() -> Result<Self> {
        let output = run_captured("xcrun", ["simctl", "list", "devices", "-j"])
            .await
            .map_err(|e| Error::catalog_unavailable(e.to_string()))?;
        Self::parse(&output.stdout)
    }

    /// Parse an inventory document.
    ///
    /// A document violating the top-level shape is `CatalogUnavailable`; a
    /// well-formed document with zero devices is an empty catalog.
    pub fn parse(json: &str) -> Result<Self> {
        let raw: RawInventory = serde_json::from_str(json)
            .map_err(|e| Error::catalog_unavailable(format!("malformed inventory: {e}")))?;

        let mut runtimes: BTreeMap<String, Vec<DeviceRecord>> = BTreeMap::new();
        for (runtime, devices) in raw.devices {
            let records: Vec<DeviceRecord> = devices
                .into_iter()
                .filter_map(|device| {
                    let available = device.is_available();
                    let state = DeviceState::parse(device.state.as_deref());
                    let (Some(name), Some(udid)) = (device.name, device.udid) else {
                        debug!("Skipping device record without name/udid in {runtime}");
                        return None;
                    };
                    Some(DeviceRecord {
                        name,
                        udid,
                        runtime: runtime.clone(),
                        state,
                        available,
                    })
                })
                .collect();
            runtimes.insert(runtime, records);
        }

        Ok(Self { runtimes })
    }

    /// Runtime groups, newest (highest lexical key) first.
    ///
    /// Descending lexical order approximates "newest platform first"; it is
    /// a documented heuristic, not true version ordering.
    pub fn runtimes_newest_first(&self) -> impl Iterator<Item = (&str, &[DeviceRecord])> {
        self.runtimes
            .iter()
            .rev()
            .map(|(key, devices)| (key.as_str(), devices.as_slice()))
    }

    /// All devices in scan order: runtimes newest first, document order
    /// within each runtime.
    pub fn devices_newest_first(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.runtimes_newest_first()
            .flat_map(|(_, devices)| devices.iter())
    }

    /// Look up a device by its unique handle
    pub fn find_by_udid(&self, udid: &str) -> Option<&DeviceRecord> {
        self.devices_newest_first().find(|d| d.udid == udid)
    }

    pub fn is_empty(&self) -> bool {
        self.runtimes.values().all(|devices| devices.is_empty())
    }
}

/// Human-friendly form of a runtime key.
///
/// "com.apple.CoreSimulator.SimRuntime.iOS-17-0" becomes "iOS 17.0";
/// anything the pattern does not recognize falls back to the last dotted
/// component with dashes spaced.
pub fn display_runtime(runtime_key: &str) -> String {
    if let Some(caps) = RUNTIME_PATTERN.captures(runtime_key) {
        let os = &caps[1];
        let version = caps[2].replace('-', ".");
        return format!("{os} {version}");
    }
    runtime_key
        .rsplit('.')
        .next()
        .unwrap_or(runtime_key)
        .replace('-', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const INVENTORY: &str = r#"{
        "devices": {
            "com.apple.CoreSimulator.SimRuntime.iOS-17-0": [
                {
                    "name": "iPhone 15",
                    "udid": "AAAA-1111",
                    "state": "Shutdown",
                    "isAvailable": true
                },
                {
                    "name": "iPhone 15 Pro",
                    "udid": "AAAA-2222",
                    "state": "Shutdown",
                    "isAvailable": false
                }
            ],
            "com.apple.CoreSimulator.SimRuntime.iOS-16-4": [
                {
                    "name": "iPhone 14",
                    "udid": "BBBB-1111",
                    "state": "Booted",
                    "availability": "(available)"
                }
            ]
        }
    }"#;

    #[test]
    fn test_parse_inventory() {
        let catalog = DeviceCatalog::parse(INVENTORY).unwrap();
        let devices: Vec<_> = catalog.devices_newest_first().collect();

        assert_eq!(devices.len(), 3);
        assert_eq!(devices[0].name, "iPhone 15");
        assert_eq!(devices[0].state, DeviceState::Shutdown);
        assert!(devices[0].available);
    }

    #[test]
    fn test_both_availability_encodings_accepted() {
        let catalog = DeviceCatalog::parse(INVENTORY).unwrap();

        let modern = catalog.find_by_udid("AAAA-1111").unwrap();
        assert!(modern.available);

        let legacy = catalog.find_by_udid("BBBB-1111").unwrap();
        assert!(legacy.available);

        let unavailable = catalog.find_by_udid("AAAA-2222").unwrap();
        assert!(!unavailable.available);
    }

    #[test]
    fn test_runtimes_scan_newest_first() {
        let catalog = DeviceCatalog::parse(INVENTORY).unwrap();
        let keys: Vec<_> = catalog
            .runtimes_newest_first()
            .map(|(key, _)| key)
            .collect();

        assert_eq!(
            keys,
            vec![
                "com.apple.CoreSimulator.SimRuntime.iOS-17-0",
                "com.apple.CoreSimulator.SimRuntime.iOS-16-4",
            ]
        );
    }

    #[test]
    fn test_device_missing_required_field_is_skipped() {
        let json = r#"{
            "devices": {
                "iOS-17-0": [
                    { "udid": "NO-NAME", "state": "Shutdown", "isAvailable": true },
                    { "name": "No Udid", "state": "Shutdown", "isAvailable": true },
                    { "name": "Kept", "udid": "KEPT-1", "state": "Shutdown", "isAvailable": true }
                ]
            }
        }"#;

        let catalog = DeviceCatalog::parse(json).unwrap();
        let devices: Vec<_> = catalog.devices_newest_first().collect();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name, "Kept");
    }

    #[test]
    fn test_unknown_state_is_not_booted() {
        let json = r#"{
            "devices": {
                "iOS-17-0": [
                    { "name": "A", "udid": "A-1", "state": "Creating", "isAvailable": true },
                    { "name": "B", "udid": "B-1", "isAvailable": true }
                ]
            }
        }"#;

        let catalog = DeviceCatalog::parse(json).unwrap();
        for device in catalog.devices_newest_first() {
            assert!(!device.state.is_booted());
            assert_eq!(device.state, DeviceState::Unknown);
        }
    }

    #[test]
    fn test_shutting_down_state() {
        assert_eq!(
            DeviceState::parse(Some("Shutting Down")),
            DeviceState::ShuttingDown
        );
        assert!(!DeviceState::parse(Some("Shutting Down")).is_booted());
        assert!(DeviceState::parse(Some("Booted")).is_booted());
    }

    #[test]
    fn test_empty_inventory_is_empty_catalog_not_error() {
        let catalog = DeviceCatalog::parse(r#"{ "devices": {} }"#).unwrap();
        assert!(catalog.is_empty());

        let catalog = DeviceCatalog::parse(r#"{ "devices": { "iOS-17-0": [] } }"#).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_top_level_shape_violation_is_catalog_unavailable() {
        let err = DeviceCatalog::parse("not json at all").unwrap_err();
        assert!(matches!(err, Error::CatalogUnavailable { .. }));

        let err = DeviceCatalog::parse(r#"{ "runtimes": {} }"#).unwrap_err();
        assert!(matches!(err, Error::CatalogUnavailable { .. }));
    }

    #[test]
    fn test_find_by_udid() {
        let catalog = DeviceCatalog::parse(INVENTORY).unwrap();
        assert_eq!(catalog.find_by_udid("BBBB-1111").unwrap().name, "iPhone 14");
        assert!(catalog.find_by_udid("missing").is_none());
    }

    #[test]
    fn test_display_runtime() {
        assert_eq!(
            display_runtime("com.apple.CoreSimulator.SimRuntime.iOS-17-0"),
            "iOS 17.0"
        );
        assert_eq!(
            display_runtime("com.apple.CoreSimulator.SimRuntime.watchOS-10-2"),
            "watchOS 10.2"
        );
        // Unrecognized tails fall back to dash spacing
        assert_eq!(display_runtime("custom.Runtime-Beta"), "Runtime Beta");
    }
}
