use crate::error::{ProvisionError, Result};
use crate::models::{CandidateList, ManifestDocument, ReleaseKind, ReleaseManifest};

use super::client::MetaClient;
use super::version::check_stable_release;

/// Well-known location of the release manifest.
pub const DEFAULT_MANIFEST_URL: &str =
    "https://launchermeta.mojang.com/mc/game/version_manifest.json";

/// Fetches the release manifest and narrows it to installable candidates.
#[derive(Debug, Clone)]
pub struct VersionCatalog {
    client: MetaClient,
    manifest_url: String,
}

impl VersionCatalog {
    pub fn new(client: MetaClient, manifest_url: impl Into<String>) -> Self {
        Self {
            client,
            manifest_url: manifest_url.into(),
        }
    }

    /// Fetch the manifest. Any transport or parse failure is fatal for the run.
    pub async fn fetch(&self) -> Result<ReleaseManifest> {
        let doc: ManifestDocument = self
            .client
            .get_json(&self.manifest_url)
            .await
            .map_err(|e| ProvisionError::CatalogUnavailable(e.to_string()))?;
        let manifest = ReleaseManifest::from(doc);
        tracing::info!(
            entries = manifest.entries().len(),
            url = %self.manifest_url,
            "Fetched release manifest"
        );
        Ok(manifest)
    }
}

/// Keep only stable releases, preserving manifest order.
pub fn filter(manifest: &ReleaseManifest) -> CandidateList {
    let candidates = manifest
        .entries()
        .iter()
        .filter(|entry| entry.kind == ReleaseKind::Release)
        .filter(|entry| match check_stable_release(&entry.id) {
            Ok(()) => true,
            Err(reason) => {
                tracing::debug!(id = %entry.id, %reason, "Skipping release");
                false
            }
        })
        .cloned()
        .collect::<Vec<_>>();

    if candidates.is_empty() {
        tracing::warn!("Manifest contains no stable releases");
    }
    let list = CandidateList::new(candidates, manifest.latest().release.clone());
    tracing::debug!(candidates = ?list.ids(), "Filtered release manifest");
    list
}
