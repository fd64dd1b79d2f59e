//! xcodebuild invocation
//!
//! Assembles argument lists for the xcodebuild actions xcpilot drives and
//! runs them. Streamed actions are piped through `xcbeautify` when it is on
//! PATH, since raw xcodebuild output is close to unreadable.

use std::path::Path;

use crate::destination::Destination;
use xcpilot_core::prelude::*;
use xcpilot_core::{run_captured, run_streamed, run_streamed_piped};

const XCODEBUILD: &str = "xcodebuild";
const XCBEAUTIFY: &str = "xcbeautify";

/// One xcodebuild target: container args, scheme, and destination.
///
/// The scheme is optional because xcodebuild can sometimes infer it; an
/// unresolved scheme is the caller's soft warning, not an error here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInvocation {
    /// `-workspace`/`-project` args from the project context
    pub target_args: Vec<String>,
    pub scheme: Option<String>,
    pub destination: Destination,
}

impl BuildInvocation {
    pub fn new(target_args: Vec<String>, scheme: Option<String>, destination: Destination) -> Self {
        Self {
            target_args,
            scheme,
            destination,
        }
    }

    /// Common tail: container, scheme if known, destination
    fn common_args(&self) -> Vec<String> {
        let mut args = self.target_args.clone();
        if let Some(scheme) = &self.scheme {
            args.push("-scheme".to_string());
            args.push(scheme.clone());
        }
        args.push("-destination".to_string());
        args.push(self.destination.argument());
        args
    }

    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec!["build".to_string()];
        args.extend(self.common_args());
        args
    }

    pub fn clean_args(&self) -> Vec<String> {
        // clean does not need a destination; the scheme is enough
        let mut args = vec!["clean".to_string()];
        args.extend(self.target_args.clone());
        if let Some(scheme) = &self.scheme {
            args.push("-scheme".to_string());
            args.push(scheme.clone());
        }
        args
    }

    pub fn settings_args(&self) -> Vec<String> {
        let mut args = vec!["-showBuildSettings".to_string()];
        args.extend(self.common_args());
        args
    }

    pub fn test_args(&self, only: Option<&str>, coverage_bundle: Option<&Path>) -> Vec<String> {
        let mut args = vec!["test".to_string()];
        args.extend(self.common_args());
        if let Some(only) = only {
            args.push(format!("-only-testing:{only}"));
        }
        if let Some(bundle) = coverage_bundle {
            args.push("-enableCodeCoverage".to_string());
            args.push("YES".to_string());
            args.push("-resultBundlePath".to_string());
            args.push(bundle.to_string_lossy().into_owned());
        }
        args
    }
}

/// True when xcbeautify can be used to format streamed output
pub fn xcbeautify_available() -> bool {
    which::which(XCBEAUTIFY).is_ok()
}

/// Run an xcodebuild action with output on the user's terminal.
///
/// With `beautify`, stdout is piped child-to-child through xcbeautify;
/// xcodebuild's own failure still wins over the formatter's.
pub async fn run_xcodebuild_streamed(args: &[String], beautify: bool) -> Result<()> {
    if beautify && xcbeautify_available() {
        debug!("Formatting xcodebuild output with {XCBEAUTIFY}");
        run_streamed_piped(XCODEBUILD, args, XCBEAUTIFY, Vec::<&str>::new()).await
    } else {
        run_streamed(XCODEBUILD, args).await
    }
}

/// Capture a build-settings dump for the invocation
pub async fn dump_build_settings(invocation: &BuildInvocation) -> Result<String> {
    let output = run_captured(XCODEBUILD, invocation.settings_args()).await?;
    debug!(
        "Captured {} bytes of build settings",
        output.stdout.len()
    );
    Ok(output.stdout)
}
