//! The deployment pipeline
//!
//! Sequences build, artifact location, device readiness, install, and
//! launch. Stages run strictly in order; destination resolution and the
//! boot sub-steps are the only soft-failure (warn-and-continue) paths,
//! every other stage failure terminates the run tagged with its stage.
//! Nothing is retried; the user re-runs the whole pipeline.

use xcpilot_build::{BuildInvocation, BuildSettings, Destination};
use xcpilot_core::prelude::*;
use xcpilot_sim::control::{BootOutcome, SimTarget};
use xcpilot_sim::resolve::resolve;

use crate::services::{BuildService, SimulatorService};

/// Input to a pipeline run
#[derive(Debug, Clone, Default)]
pub struct DeploymentRequest {
    /// `-workspace`/`-project` args from the project context
    pub target_args: Vec<String>,
    /// Scheme, if one was given or inferred
    pub scheme: Option<String>,
    /// Fuzzy device query; absent means "whatever is booted"
    pub destination_query: Option<String>,
}

/// Terminal outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    /// Bundle identifier that was launched
    pub bundle_id: String,
    /// Device the app was installed on (a udid, or the `booted` sentinel)
    pub device: String,
}

/// Single-shot orchestrator: build, locate, ensure booted, install, launch
pub struct DeploymentPipeline<S, B> {
    sim: S,
    build: B,
}

impl<S: SimulatorService, B: BuildService> DeploymentPipeline<S, B> {
    pub fn new(sim: S, build: B) -> Self {
        Self { sim, build }
    }

    pub async fn run(&self, request: &DeploymentRequest) -> Result<PipelineOutcome> {
        // Stage 1: Resolve-Destination (degrades, never fails)
        let (destination, target) = self.resolve_destination(request).await;
        let invocation = BuildInvocation::new(
            request.target_args.clone(),
            request.scheme.clone(),
            destination,
        );

        // Stage 2: Build
        info!(
            "Building {} for {}",
            invocation.scheme.as_deref().unwrap_or("project"),
            invocation.destination
        );
        self.build
            .build(&invocation)
            .await
            .map_err(|e| Error::build_failed(e.to_string()))?;

        // Stage 3: Locate-Artifact
        let dump = self
            .build
            .settings_dump(&invocation)
            .await
            .map_err(|e| Error::artifact_not_locatable(e.to_string()))?;
        let settings = BuildSettings::from_dump(&dump)?;
        let app_path = settings.app_path();
        info!("Located app bundle at {}", app_path.display());

        // Stage 4: Ensure-Device-Booted (soft; install surfaces real problems)
        if target.udid().is_some() {
            match self.sim.boot(&target).await {
                Ok(BootOutcome::Booted) => info!("Booted {}", target.argument()),
                Ok(BootOutcome::AlreadyBooted) => {
                    debug!("{} was already booted", target.argument())
                }
                Err(e) => warn!("Boot of {} failed, continuing: {e}", target.argument()),
            }
        }
        if let Err(e) = self.sim.foreground().await {
            warn!("Could not foreground the Simulator app: {e}");
        }
        self.sim.wait_until_ready(&target).await;

        // Stage 5: Install
        self.sim
            .install(&target, &app_path)
            .await
            .map_err(|e| Error::install_failed(e.to_string()))?;

        // Stage 6: Launch
        self.sim
            .launch(&target, &settings.bundle_identifier)
            .await
            .map_err(|e| Error::launch_failed(e.to_string()))?;

        Ok(PipelineOutcome {
            bundle_id: settings.bundle_identifier,
            device: target.argument().to_string(),
        })
    }

    /// Pick the build destination and the simctl target.
    ///
    /// A supplied query that cannot be resolved degrades to the generic
    /// destination with a warning. With no query, a booted device sharpens
    /// the build at its concrete id; none booted falls back silently.
    async fn resolve_destination(&self, request: &DeploymentRequest) -> (Destination, SimTarget) {
        match request.destination_query.as_deref() {
            Some(query) => match self.lookup_udid(Some(query)).await {
                Ok(udid) => (Destination::DeviceId(udid.clone()), SimTarget::device(udid)),
                Err(e) => {
                    warn!(
                        "Could not resolve a simulator for '{query}', \
                         falling back to the generic destination: {e}"
                    );
                    (Destination::GenericSimulator, SimTarget::Booted)
                }
            },
            None => match self.lookup_udid(None).await {
                Ok(udid) => (Destination::DeviceId(udid.clone()), SimTarget::device(udid)),
                Err(e) if e.is_resolution() => {
                    debug!("No booted simulator to target, using the generic destination: {e}");
                    (Destination::GenericSimulator, SimTarget::Booted)
                }
                Err(e) => {
                    warn!("Simulator lookup failed, using the generic destination: {e}");
                    (Destination::GenericSimulator, SimTarget::Booted)
                }
            },
        }
    }

    async fn lookup_udid(&self, query: Option<&str>) -> Result<String> {
        let catalog = self.sim.catalog().await?;
        let device = resolve(query, &catalog)?;
        Ok(device.udid.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use xcpilot_sim::DeviceCatalog;

    /// Shared call log so ordering across both services can be asserted
    type CallLog = Arc<Mutex<Vec<String>>>;

    fn log_of(calls: &CallLog) -> Vec<String> {
        calls.lock().unwrap().clone()
    }

    const BOOTED_CATALOG: &str = r#"{
        "devices": {
            "iOS-17": [
                { "name": "iPhone 15", "udid": "id-A", "state": "Booted", "isAvailable": true }
            ]
        }
    }"#;

    const SHUTDOWN_CATALOG: &str = r#"{
        "devices": {
            "iOS-17": [
                { "name": "iPhone 15", "udid": "id-A", "state": "Shutdown", "isAvailable": true }
            ]
        }
    }"#;

    struct FakeSim {
        catalog_json: Option<&'static str>,
        boot_fails: bool,
        install_fails: bool,
        launch_fails: bool,
        calls: CallLog,
    }

    impl FakeSim {
        fn new(catalog_json: Option<&'static str>, calls: CallLog) -> Self {
            Self {
                catalog_json,
                boot_fails: false,
                install_fails: false,
                launch_fails: false,
                calls,
            }
        }

        fn push(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }
    }

    impl SimulatorService for FakeSim {
        async fn catalog(&self) -> Result<DeviceCatalog> {
            self.push("catalog");
            match self.catalog_json {
                Some(json) => DeviceCatalog::parse(json),
                None => Err(Error::catalog_unavailable("service down")),
            }
        }

        async fn boot(&self, target: &SimTarget) -> Result<BootOutcome> {
            self.push(format!("boot {}", target.argument()));
            if self.boot_fails {
                Err(Error::process_exited("xcrun", Some(164), "no such device"))
            } else {
                Ok(BootOutcome::Booted)
            }
        }

        async fn foreground(&self) -> Result<()> {
            self.push("foreground");
            Ok(())
        }

        async fn wait_until_ready(&self, target: &SimTarget) {
            self.push(format!("wait {}", target.argument()));
        }

        async fn install(&self, target: &SimTarget, app_path: &Path) -> Result<()> {
            self.push(format!(
                "install {} {}",
                target.argument(),
                app_path.display()
            ));
            if self.install_fails {
                Err(Error::process_exited("xcrun", Some(1), "install error"))
            } else {
                Ok(())
            }
        }

        async fn launch(&self, target: &SimTarget, bundle_id: &str) -> Result<()> {
            self.push(format!("launch {} {}", target.argument(), bundle_id));
            if self.launch_fails {
                Err(Error::process_exited("xcrun", Some(1), "launch error"))
            } else {
                Ok(())
            }
        }
    }

    const GOOD_DUMP: &str = "    TARGET_BUILD_DIR = /tmp/out\n    \
                             FULL_PRODUCT_NAME = Demo.app\n    \
                             PRODUCT_BUNDLE_IDENTIFIER = com.example.Demo\n";

    struct FakeBuild {
        build_fails: bool,
        dump: &'static str,
        calls: CallLog,
        seen_invocation: Mutex<Option<BuildInvocation>>,
    }

    impl FakeBuild {
        fn new(calls: CallLog) -> Self {
            Self {
                build_fails: false,
                dump: GOOD_DUMP,
                calls,
                seen_invocation: Mutex::new(None),
            }
        }
    }

    impl BuildService for FakeBuild {
        async fn build(&self, invocation: &BuildInvocation) -> Result<()> {
            self.calls.lock().unwrap().push("build".to_string());
            *self.seen_invocation.lock().unwrap() = Some(invocation.clone());
            if self.build_fails {
                Err(Error::process_exited("xcodebuild", Some(65), ""))
            } else {
                Ok(())
            }
        }

        async fn settings_dump(&self, _invocation: &BuildInvocation) -> Result<String> {
            self.calls.lock().unwrap().push("settings".to_string());
            Ok(self.dump.to_string())
        }
    }

    fn request() -> DeploymentRequest {
        DeploymentRequest {
            target_args: vec!["-project".to_string(), "Demo.xcodeproj".to_string()],
            scheme: Some("Demo".to_string()),
            destination_query: None,
        }
    }

    #[tokio::test]
    async fn test_happy_path_runs_stages_in_order() {
        let calls: CallLog = Default::default();
        let sim = FakeSim::new(Some(BOOTED_CATALOG), Arc::clone(&calls));
        let build = FakeBuild::new(Arc::clone(&calls));

        let outcome = DeploymentPipeline::new(sim, build)
            .run(&request())
            .await
            .unwrap();

        assert_eq!(outcome.bundle_id, "com.example.Demo");
        assert_eq!(outcome.device, "id-A");
        assert_eq!(
            log_of(&calls),
            vec![
                "catalog",
                "build",
                "settings",
                "boot id-A",
                "foreground",
                "wait id-A",
                "install id-A /tmp/out/Demo.app",
                "launch id-A com.example.Demo",
            ]
        );
    }

    #[tokio::test]
    async fn test_build_failure_stops_pipeline_before_install() {
        let calls: CallLog = Default::default();
        let sim = FakeSim::new(Some(BOOTED_CATALOG), Arc::clone(&calls));
        let mut build = FakeBuild::new(Arc::clone(&calls));
        build.build_fails = true;

        let err = DeploymentPipeline::new(sim, build)
            .run(&request())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::BuildFailed { .. }));
        let log = log_of(&calls);
        assert!(log.contains(&"build".to_string()));
        assert!(!log.iter().any(|c| c.starts_with("settings")));
        assert!(!log.iter().any(|c| c.starts_with("install")));
        assert!(!log.iter().any(|c| c.starts_with("launch")));
    }

    #[tokio::test]
    async fn test_missing_settings_key_is_artifact_not_locatable() {
        let calls: CallLog = Default::default();
        let sim = FakeSim::new(Some(BOOTED_CATALOG), Arc::clone(&calls));
        let mut build = FakeBuild::new(Arc::clone(&calls));
        build.dump = "    TARGET_BUILD_DIR = /tmp/out\n    FULL_PRODUCT_NAME = Demo.app\n";

        let err = DeploymentPipeline::new(sim, build)
            .run(&request())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ArtifactNotLocatable { .. }));
        let log = log_of(&calls);
        assert!(!log.iter().any(|c| c.starts_with("install")));
        assert!(!log.iter().any(|c| c.starts_with("launch")));
    }

    #[tokio::test]
    async fn test_unresolvable_query_degrades_to_generic_destination() {
        let calls: CallLog = Default::default();
        let sim = FakeSim::new(Some(SHUTDOWN_CATALOG), Arc::clone(&calls));
        let build = FakeBuild::new(Arc::clone(&calls));
        let pipeline = DeploymentPipeline::new(sim, build);

        let mut request = request();
        request.destination_query = Some("pixel 8".to_string());

        let outcome = pipeline.run(&request).await.unwrap();

        // Degraded to the booted sentinel: no concrete device to boot
        assert_eq!(outcome.device, "booted");
        let seen = pipeline
            .build
            .seen_invocation
            .lock()
            .unwrap()
            .clone()
            .unwrap();
        assert_eq!(seen.destination, Destination::GenericSimulator);

        let log = log_of(&calls);
        assert!(!log.iter().any(|c| c.starts_with("boot")));
        assert!(log.contains(&"wait booted".to_string()));
        assert!(log.contains(&"install booted /tmp/out/Demo.app".to_string()));
    }

    #[tokio::test]
    async fn test_query_resolves_to_concrete_destination() {
        let calls: CallLog = Default::default();
        let sim = FakeSim::new(Some(SHUTDOWN_CATALOG), Arc::clone(&calls));
        let build = FakeBuild::new(Arc::clone(&calls));
        let pipeline = DeploymentPipeline::new(sim, build);

        let mut request = request();
        request.destination_query = Some("iphone 15".to_string());

        let outcome = pipeline.run(&request).await.unwrap();

        assert_eq!(outcome.device, "id-A");
        let seen = pipeline
            .build
            .seen_invocation
            .lock()
            .unwrap()
            .clone()
            .unwrap();
        assert_eq!(seen.destination, Destination::DeviceId("id-A".to_string()));

        // A concrete device gets booted and waited on
        let log = log_of(&calls);
        assert!(log.contains(&"boot id-A".to_string()));
        assert!(log.contains(&"wait id-A".to_string()));
    }

    #[tokio::test]
    async fn test_boot_failure_is_soft() {
        let calls: CallLog = Default::default();
        let mut sim = FakeSim::new(Some(BOOTED_CATALOG), Arc::clone(&calls));
        sim.boot_fails = true;
        let build = FakeBuild::new(Arc::clone(&calls));

        let outcome = DeploymentPipeline::new(sim, build)
            .run(&request())
            .await
            .unwrap();

        // Boot failed but install/launch still ran
        assert_eq!(outcome.bundle_id, "com.example.Demo");
        let log = log_of(&calls);
        assert!(log.iter().any(|c| c.starts_with("install")));
        assert!(log.iter().any(|c| c.starts_with("launch")));
    }

    #[tokio::test]
    async fn test_catalog_unavailable_without_query_falls_back_silently() {
        let calls: CallLog = Default::default();
        let sim = FakeSim::new(None, Arc::clone(&calls));
        let build = FakeBuild::new(Arc::clone(&calls));

        let outcome = DeploymentPipeline::new(sim, build)
            .run(&request())
            .await
            .unwrap();

        assert_eq!(outcome.device, "booted");
    }

    #[tokio::test]
    async fn test_install_failure_is_tagged_and_stops_launch() {
        let calls: CallLog = Default::default();
        let mut sim = FakeSim::new(Some(BOOTED_CATALOG), Arc::clone(&calls));
        sim.install_fails = true;
        let build = FakeBuild::new(Arc::clone(&calls));

        let err = DeploymentPipeline::new(sim, build)
            .run(&request())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InstallFailed { .. }));
        assert!(!log_of(&calls).iter().any(|c| c.starts_with("launch")));
    }

    #[tokio::test]
    async fn test_launch_failure_is_tagged() {
        let calls: CallLog = Default::default();
        let mut sim = FakeSim::new(Some(BOOTED_CATALOG), Arc::clone(&calls));
        sim.launch_fails = true;
        let build = FakeBuild::new(Arc::clone(&calls));

        let err = DeploymentPipeline::new(sim, build)
            .run(&request())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::LaunchFailed { .. }));
    }
}
