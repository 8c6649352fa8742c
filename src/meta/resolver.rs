use crate::error::{ProvisionError, Result};
use crate::models::{ArtifactDescriptor, ReleaseEntry, VersionMetadata};

use super::client::MetaClient;

/// Turns a chosen release into the server artifact to download.
#[derive(Debug, Clone)]
pub struct ArtifactResolver {
    client: MetaClient,
}

impl ArtifactResolver {
    pub fn new(client: MetaClient) -> Self {
        Self { client }
    }

    /// Fetch the release's metadata and extract its server download.
    ///
    /// There is no alternative artifact source, so any failure is fatal.
    pub async fn resolve(&self, candidate: &ReleaseEntry) -> Result<ArtifactDescriptor> {
        let metadata: VersionMetadata = self
            .client
            .get_json(&candidate.metadata_url)
            .await
            .map_err(|e| ProvisionError::MetadataUnavailable(e.to_string()))?;

        if let Some(id) = metadata.id.as_deref() {
            if id != candidate.id {
                tracing::warn!(expected = %candidate.id, found = %id, "Metadata id mismatch");
            }
        }

        let descriptor = extract(&candidate.id, metadata)?;
        tracing::info!(
            id = %candidate.id,
            url = %descriptor.download_url,
            size = descriptor.size_bytes,
            "Resolved server artifact"
        );
        Ok(descriptor)
    }
}

fn extract(id: &str, metadata: VersionMetadata) -> Result<ArtifactDescriptor> {
    let missing = |field: &str| {
        ProvisionError::MetadataUnavailable(format!("{} has no server {}", id, field))
    };

    let server = metadata
        .downloads
        .and_then(|d| d.server)
        .ok_or_else(|| missing("download"))?;
    let download_url = server.url.filter(|u| !u.is_empty()).ok_or_else(|| missing("url"))?;
    let size_bytes = server.size.ok_or_else(|| missing("size"))?;
    let checksum = server.sha1.filter(|s| !s.is_empty()).ok_or_else(|| missing("checksum"))?;

    Ok(ArtifactDescriptor {
        download_url,
        size_bytes,
        checksum,
        runtime_major: metadata.java_version.and_then(|j| j.major_version),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> VersionMetadata {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn extracts_server_download() {
        let metadata = parse(
            r#"{
                "id": "1.20.1",
                "downloads": {
                    "client": {"sha1": "c", "size": 1, "url": "https://example.invalid/client.jar"},
                    "server": {"sha1": "abc123", "size": 4096, "url": "https://example.invalid/server.jar"}
                },
                "javaVersion": {"component": "java-runtime-gamma", "majorVersion": 17}
            }"#,
        );
        let descriptor = extract("1.20.1", metadata).unwrap();
        assert_eq!(descriptor.download_url, "https://example.invalid/server.jar");
        assert_eq!(descriptor.size_bytes, 4096);
        assert_eq!(descriptor.checksum, "abc123");
        assert_eq!(descriptor.runtime_major, Some(17));
    }

    #[test]
    fn releases_without_server_are_unavailable() {
        let metadata = parse(r#"{"id": "1.2.5", "downloads": {"client": {"url": "x"}}}"#);
        let err = extract("1.2.5", metadata).unwrap_err();
        assert!(matches!(err, ProvisionError::MetadataUnavailable(_)));
        assert!(err.to_string().contains("1.2.5 has no server download"));
    }

    #[test]
    fn missing_checksum_is_unavailable() {
        let metadata = parse(r#"{"downloads": {"server": {"size": 1, "url": "https://example.invalid/s.jar"}}}"#);
        assert!(matches!(
            extract("1.20.1", metadata),
            Err(ProvisionError::MetadataUnavailable(_))
        ));
    }
}
