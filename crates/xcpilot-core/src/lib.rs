//! # xcpilot-core
//!
//! Foundation crate for xcpilot. Provides the error taxonomy, process
//! execution primitives, logging bootstrap, and Xcode project-context
//! detection. Everything that talks to a specific external tool
//! (simctl, xcodebuild) lives in the sibling crates.

pub mod error;
pub mod exec;
pub mod logging;
pub mod project;

/// Prelude for common imports used throughout all xcpilot crates
pub mod prelude {
    pub use super::error::{Error, Result};
    pub use tracing::{debug, error, info, trace, warn};
}

pub use error::{Error, Result};
pub use exec::{run_captured, run_streamed, run_streamed_piped, CapturedOutput};
pub use project::ProjectContext;
