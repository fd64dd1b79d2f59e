//! Build destinations
//!
//! The `-destination` argument xcodebuild receives. The generic simulator
//! destination builds for no particular device; a concrete device id
//! sharpens the architecture choice to that device.

/// Destination when no concrete simulator could be resolved
pub const GENERIC_SIMULATOR: &str = "generic/platform=iOS Simulator";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Build for the simulator platform without naming a device
    GenericSimulator,
    /// Build for one concrete simulator
    DeviceId(String),
    /// A destination string supplied verbatim by the user
    Custom(String),
}

impl Destination {
    /// The value passed to `-destination`
    pub fn argument(&self) -> String {
        match self {
            Self::GenericSimulator => GENERIC_SIMULATOR.to_string(),
            Self::DeviceId(udid) => format!("platform=iOS Simulator,id={udid}"),
            Self::Custom(raw) => raw.clone(),
        }
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.argument())
    }
}
