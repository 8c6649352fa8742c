//! The provisioning pipeline: resolve, download, probe, accept, persist.
//!
//! Stages run strictly one after another. Every failure except a script
//! write is fatal and ends the run; whatever earlier stages left on disk stays
//! there for the next run to overwrite.

mod download;
mod flags;
mod license;
mod probe;
mod script;

use std::path::PathBuf;
use std::sync::Arc;

pub use download::{part_path, Downloader};
pub use flags::{FlagSet, Invocation, TunedProfile, LARGE_PROFILE_MIN_MEMORY, NO_GUI_FLAG};
pub use license::{Acceptance, LicenseAcceptor, ACCEPTANCE_LINE, ACCEPTED, LICENSE_FILE_NAME};
pub use probe::{LaunchProbe, Launcher, ProbeReport, ProbeState, ProcessLauncher};
pub use script::{default_script_name, ScriptWriter};

use crate::config::ProvisionConfig;
use crate::error::{ProvisionError, Result};
use crate::meta::{ArtifactResolver, MetaClient};
use crate::models::{ProvisioningState, ReleaseEntry, Stage};

/// Receives operator-facing output from the pipeline.
pub trait ProgressSink {
    /// Something is under way (e.g. a download tick).
    fn progress(&self, message: &str);

    /// A stage finished.
    fn status(&self, line: &str);

    /// The download is about to start.
    fn download_started(&self) {}

    /// The download returned. Called exactly once per `download_started`,
    /// before the next stage begins.
    fn download_finished(&self, _ok: bool) {}
}

/// Summary of a finished run.
#[derive(Debug)]
pub struct ProvisionReport {
    pub release_id: String,
    pub artifact_path: PathBuf,
    pub bytes: u64,
    pub probe: ProbeReport,
    pub license: Acceptance,
    pub script_path: PathBuf,
    /// Set when the launch script could not be written.
    pub script_error: Option<ProvisionError>,
}

impl ProvisionReport {
    pub fn tuned(&self) -> bool {
        self.probe.outcome.tuned
    }
}

/// Drives one provisioning run.
pub struct Provisioner<L> {
    resolver: ArtifactResolver,
    downloader: Downloader,
    probe: Arc<LaunchProbe<L>>,
    license: LicenseAcceptor,
    scripts: ScriptWriter,
    artifact_path: PathBuf,
    license_path: PathBuf,
    script_path: PathBuf,
    state: ProvisioningState,
}

impl<L: Launcher + Send + Sync + 'static> Provisioner<L> {
    pub fn new(
        config: &ProvisionConfig,
        client: MetaClient,
        launcher: L,
        profile: TunedProfile,
    ) -> Self {
        let artifact_path = config.artifact_path();
        Self {
            resolver: ArtifactResolver::new(client.clone()),
            downloader: Downloader::new(client).with_verification(config.verify_checksum),
            probe: Arc::new(LaunchProbe::new(launcher, config.runtime.clone(), profile)),
            license: LicenseAcceptor::new(),
            scripts: ScriptWriter::new(config.runtime.clone(), profile, artifact_path.clone()),
            license_path: config.license_path(),
            script_path: config.script_path(),
            artifact_path,
            state: ProvisioningState::new(),
        }
    }

    pub fn state(&self) -> &ProvisioningState {
        &self.state
    }

    /// Provision `release`. Each call starts a fresh run.
    pub async fn provision(
        &mut self,
        release: ReleaseEntry,
        sink: &dyn ProgressSink,
    ) -> Result<ProvisionReport> {
        match self.run(release, sink).await {
            Ok(report) => Ok(report),
            Err(e) => {
                tracing::error!(stage = self.state.stage().as_str(), "Provisioning failed: {}", e);
                self.state.fail();
                Err(e)
            }
        }
    }

    async fn run(
        &mut self,
        release: ReleaseEntry,
        sink: &dyn ProgressSink,
    ) -> Result<ProvisionReport> {
        self.state = ProvisioningState::new();
        self.state.advance(Stage::Resolving);
        let release_id = release.id.clone();
        sink.progress(&format!("Resolving {}", release_id));
        let descriptor = self.resolver.resolve(&release).await?;
        self.state.release = Some(release);
        if let Some(major) = descriptor.runtime_major {
            sink.status(&format!("Release {} requires Java {} or newer", release_id, major));
        }

        self.state.advance(Stage::Downloading);
        sink.download_started();
        let downloaded = self
            .downloader
            .download(&self.artifact_path, &descriptor, sink)
            .await;
        sink.download_finished(downloaded.is_ok());
        let bytes = downloaded?;
        self.state.artifact = Some(descriptor);
        self.state.artifact_path = Some(self.artifact_path.clone());
        sink.status(&format!("Downloaded {}", file_label(&self.artifact_path)));

        self.state.advance(Stage::Probing);
        sink.progress("Starting server once to generate its files");
        let probe = {
            let launcher = Arc::clone(&self.probe);
            let artifact = self.artifact_path.clone();
            tokio::task::spawn_blocking(move || launcher.probe(&artifact))
                .await
                .map_err(|e| ProvisionError::LaunchFatal(format!("launch task failed: {}", e)))?
        };
        if !probe.succeeded() {
            return Err(ProvisionError::LaunchFatal(probe.failure_summary()));
        }
        self.state.tuned = Some(probe.outcome.tuned);
        if probe.outcome.tuned {
            sink.status("Server started with tuned flags");
        } else {
            sink.status("Server started with minimal flags (tuned flags were rejected)");
        }

        self.state.advance(Stage::AcceptingLicense);
        let license = self.license.accept(&self.license_path)?;
        sink.status(match license {
            Acceptance::Accepted => "Accepted EULA automatically",
            Acceptance::AlreadyAccepted => "EULA was already accepted",
        });

        self.state.advance(Stage::WritingScript);
        let script_error = match self.scripts.write(&self.script_path, probe.outcome.tuned) {
            Ok(()) => {
                self.state.script_path = Some(self.script_path.clone());
                sink.status(&format!("Wrote {}", self.script_path.display()));
                None
            }
            Err(e) => {
                tracing::warn!("{}", e);
                sink.status(&format!("Could not write launch script: {}", e));
                Some(e)
            }
        };

        self.state.advance(Stage::Done);
        Ok(ProvisionReport {
            release_id,
            artifact_path: self.artifact_path.clone(),
            bytes,
            probe,
            license,
            script_path: self.script_path.clone(),
            script_error,
        })
    }
}

fn file_label(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
