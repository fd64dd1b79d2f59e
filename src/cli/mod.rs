//! Command implementations for the xcpilot binary

pub mod build;
pub mod clean;
pub mod logs;
pub mod run;
pub mod sim;

use xcpilot_core::prelude::*;
use xcpilot_core::ProjectContext;

/// Pick the scheme for a build-like command: explicit flag, then the
/// project config, then the name inferred from the container file.
///
/// No scheme at all is a soft warning; xcodebuild can sometimes infer one.
pub(crate) fn resolve_scheme(
    flag: Option<String>,
    configured: Option<&str>,
    context: &ProjectContext,
) -> Option<String> {
    let scheme = flag
        .or_else(|| configured.map(str::to_string))
        .or_else(|| context.inferred_scheme());
    if scheme.is_none() {
        warn!("No scheme could be inferred");
        eprintln!(
            "⚠️  Could not infer a scheme automatically. You may need to provide one with --scheme."
        );
    }
    scheme
}
