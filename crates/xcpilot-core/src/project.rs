//! Xcode project context detection
//!
//! Scans a directory for the buildable container xcodebuild should target:
//! a `.xcworkspace` (preferred), a `.xcodeproj`, or a bare `Package.swift`.
//! Also infers a default scheme from the container name, since most projects
//! name their main scheme after the workspace or project file.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use tracing::debug;

const WORKSPACE_EXT: &str = ".xcworkspace";
const PROJECT_EXT: &str = ".xcodeproj";
const PACKAGE_MANIFEST: &str = "Package.swift";

/// The Xcode build containers found in a directory
#[derive(Debug, Clone, Default)]
pub struct ProjectContext {
    /// First `.xcworkspace` entry, if any
    pub workspace: Option<String>,
    /// First `.xcodeproj` entry, if any
    pub project: Option<String>,
    /// Whether a `Package.swift` manifest is present
    pub package: bool,
    root: PathBuf,
}

impl ProjectContext {
    /// Scan `directory` for buildable containers.
    ///
    /// Directory entries are sorted before matching so the selection is
    /// stable across runs regardless of filesystem enumeration order.
    pub fn discover(directory: &Path) -> Result<Self> {
        let mut entries: Vec<String> = std::fs::read_dir(directory)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        entries.sort();

        let workspace = entries
            .iter()
            .find(|name| name.ends_with(WORKSPACE_EXT))
            .cloned();
        let project = entries
            .iter()
            .find(|name| name.ends_with(PROJECT_EXT))
            .cloned();
        let package = entries.iter().any(|name| name == PACKAGE_MANIFEST);

        debug!(
            "Project context in {}: workspace={:?} project={:?} package={}",
            directory.display(),
            workspace,
            project,
            package
        );

        Ok(Self {
            workspace,
            project,
            package,
            root: directory.to_path_buf(),
        })
    }

    /// Scan the current working directory, failing with `NoProject` when
    /// nothing buildable is present.
    pub fn discover_required() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let context = Self::discover(&cwd)?;
        if !context.is_valid() {
            return Err(Error::no_project(cwd));
        }
        Ok(context)
    }

    /// True if the directory holds some sort of buildable target
    pub fn is_valid(&self) -> bool {
        self.workspace.is_some() || self.project.is_some() || self.package
    }

    /// Guess the default scheme from the container file name.
    ///
    /// Strips the `.xcworkspace`/`.xcodeproj` extension; for bare packages
    /// the directory name is the usual scheme.
    pub fn inferred_scheme(&self) -> Option<String> {
        if let Some(workspace) = &self.workspace {
            return Some(workspace.trim_end_matches(WORKSPACE_EXT).to_string());
        }
        if let Some(project) = &self.project {
            return Some(project.trim_end_matches(PROJECT_EXT).to_string());
        }
        if self.package {
            return self
                .root
                .file_name()
                .map(|name| name.to_string_lossy().into_owned());
        }
        None
    }

    /// xcodebuild arguments selecting the container.
    ///
    /// Bare packages produce no arguments; xcodebuild picks up the manifest
    /// from the working directory.
    pub fn target_args(&self) -> Vec<String> {
        if let Some(workspace) = &self.workspace {
            vec!["-workspace".to_string(), workspace.clone()]
        } else if let Some(project) = &self.project {
            vec!["-project".to_string(), project.clone()]
        } else {
            Vec::new()
        }
    }

    /// Directory this context was discovered in
    pub fn root(&self) -> &Path {
        &self.root
    }
}
