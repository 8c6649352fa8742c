use serde::{Deserialize, Serialize};

/// The concrete server download for one release.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    pub download_url: String,
    pub size_bytes: u64,
    /// SHA-1 hex digest as published by the catalog.
    pub checksum: String,
    /// Java major version the release was built for, when the metadata says.
    pub runtime_major: Option<u32>,
}

/// Wire shape of a per-version metadata document. Only the fields the
/// resolver reads are modelled; everything else is ignored.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct VersionMetadata {
    pub id: Option<String>,
    #[serde(default)]
    pub downloads: Option<VersionDownloads>,
    #[serde(rename = "javaVersion", default)]
    pub java_version: Option<JavaVersion>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct VersionDownloads {
    pub server: Option<DownloadEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DownloadEntry {
    pub sha1: Option<String>,
    pub size: Option<u64>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct JavaVersion {
    #[serde(rename = "majorVersion")]
    pub major_version: Option<u32>,
}
