//! # xcpilot-build
//!
//! Everything that talks to xcodebuild: destination rendering, argument
//! assembly for the actions xcpilot drives (build, test, clean,
//! -showBuildSettings), streamed execution with optional xcbeautify
//! formatting, and build-settings extraction.

pub mod destination;
pub mod settings;
pub mod xcodebuild;

pub use destination::{Destination, GENERIC_SIMULATOR};
pub use settings::{
    extract, BuildSettings, FULL_PRODUCT_NAME, PRODUCT_BUNDLE_IDENTIFIER, TARGET_BUILD_DIR,
};
pub use xcodebuild::{
    dump_build_settings, run_xcodebuild_streamed, xcbeautify_available, BuildInvocation,
};
