use std::path::PathBuf;

use serde::Serialize;

use super::{ArtifactDescriptor, ReleaseEntry};

/// Where a provisioning run currently is.
///
/// Stages only ever move forward; `Failed` is terminal.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    Resolving,
    Downloading,
    Probing,
    AcceptingLicense,
    WritingScript,
    Done,
    Failed,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Resolving => "resolving",
            Self::Downloading => "downloading",
            Self::Probing => "probing",
            Self::AcceptingLicense => "accepting_license",
            Self::WritingScript => "writing_script",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

/// The run's top-level record: one per invocation, owned by the orchestrator.
///
/// Holds only what later stages still need: the chosen release, the artifact
/// location and whether the tuned flags worked.
#[derive(Debug, Clone, Serialize)]
pub struct ProvisioningState {
    stage: Stage,
    pub release: Option<ReleaseEntry>,
    pub artifact: Option<ArtifactDescriptor>,
    pub artifact_path: Option<PathBuf>,
    pub tuned: Option<bool>,
    pub script_path: Option<PathBuf>,
}

impl Default for ProvisioningState {
    fn default() -> Self {
        Self::new()
    }
}

impl ProvisioningState {
    pub fn new() -> Self {
        Self {
            stage: Stage::Idle,
            release: None,
            artifact: None,
            artifact_path: None,
            tuned: None,
            script_path: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Move to `next`. Returns false, leaving the state untouched, if that
    /// would move backwards or leave a terminal stage.
    pub fn advance(&mut self, next: Stage) -> bool {
        if matches!(self.stage, Stage::Done | Stage::Failed) || next <= self.stage {
            return false;
        }
        tracing::debug!(from = self.stage.as_str(), to = next.as_str(), "Provisioning stage");
        self.stage = next;
        true
    }

    pub fn fail(&mut self) {
        if self.stage != Stage::Done {
            self.stage = Stage::Failed;
        }
    }
}
