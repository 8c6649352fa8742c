use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How the catalog classifies a release.
///
/// Anything the catalog reports besides `release` and `snapshot`
/// (`old_beta`, `old_alpha`, future kinds) collapses into `Other`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseKind {
    Release,
    Snapshot,
    #[serde(other)]
    Other,
}

impl ReleaseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Release => "release",
            Self::Snapshot => "snapshot",
            Self::Other => "other",
        }
    }
}

/// One release listed in the manifest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReleaseEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ReleaseKind,
    /// Where the per-version metadata for this release lives.
    #[serde(rename = "url")]
    pub metadata_url: String,
    #[serde(rename = "releaseTime", default)]
    pub release_time: Option<DateTime<Utc>>,
}

/// Pointers to the newest entries, as advertised by the catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LatestReleases {
    pub release: Option<String>,
    pub snapshot: Option<String>,
}

/// Wire shape of the manifest document.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ManifestDocument {
    #[serde(default)]
    pub latest: LatestReleases,
    pub versions: Vec<ReleaseEntry>,
}

/// Snapshot of the remote release index, fetched once per run.
///
/// Entries keep manifest order (newest first) and ids are unique: later
/// duplicates are dropped when the manifest is built.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReleaseManifest {
    latest: LatestReleases,
    entries: Vec<ReleaseEntry>,
}

impl ReleaseManifest {
    pub fn new(latest: LatestReleases, entries: Vec<ReleaseEntry>) -> Self {
        let mut seen = HashSet::new();
        let entries = entries
            .into_iter()
            .filter(|entry| {
                let fresh = seen.insert(entry.id.clone());
                if !fresh {
                    tracing::warn!(id = %entry.id, "Dropping duplicate manifest entry");
                }
                fresh
            })
            .collect();
        Self { latest, entries }
    }

    pub fn latest(&self) -> &LatestReleases {
        &self.latest
    }

    pub fn entries(&self) -> &[ReleaseEntry] {
        &self.entries
    }

    pub fn find(&self, id: &str) -> Option<&ReleaseEntry> {
        self.entries.iter().find(|e| e.id == id)
    }
}

impl From<ManifestDocument> for ReleaseManifest {
    fn from(doc: ManifestDocument) -> Self {
        Self::new(doc.latest, doc.versions)
    }
}

/// The installable subset of a manifest, in manifest order.
///
/// May be empty: a catalog whose format drifted simply yields no candidates.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CandidateList {
    candidates: Vec<ReleaseEntry>,
    latest: Option<String>,
}

impl CandidateList {
    pub(crate) fn new(candidates: Vec<ReleaseEntry>, latest: Option<String>) -> Self {
        Self { candidates, latest }
    }

    pub fn as_slice(&self) -> &[ReleaseEntry] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.id.as_str()).collect()
    }

    /// Whether `id` is the catalog's advertised latest release.
    pub fn is_latest(&self, id: &str) -> bool {
        self.latest.as_deref() == Some(id)
    }

    /// Consume the list once the operator has chosen.
    pub fn into_selection(self, index: usize) -> Option<ReleaseEntry> {
        self.candidates.into_iter().nth(index)
    }
}
