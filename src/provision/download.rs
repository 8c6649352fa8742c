use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use sha1::{Digest, Sha1};
use tokio::io::AsyncWriteExt;

use crate::error::{ProvisionError, Result};
use crate::meta::MetaClient;
use crate::models::ArtifactDescriptor;

use super::ProgressSink;

/// Streams a server artifact to disk.
///
/// Any existing file at the destination is removed before the transfer
/// starts. The body goes to `<destination>.part` and is renamed over the
/// destination only once fully written, so after a failure the destination
/// path is empty.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: MetaClient,
    verify: bool,
}

impl Downloader {
    pub fn new(client: MetaClient) -> Self {
        Self {
            client,
            verify: false,
        }
    }

    /// Also check the transferred size and SHA-1 against the descriptor.
    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Download `descriptor` to `destination`, returning the bytes written.
    pub async fn download(
        &self,
        destination: &Path,
        descriptor: &ArtifactDescriptor,
        progress: &dyn ProgressSink,
    ) -> Result<u64> {
        if let Some(dir) = destination.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| failed(format!("cannot create {}: {}", dir.display(), e)))?;
        }

        let label = destination
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| destination.display().to_string());

        match tokio::fs::remove_file(destination).await {
            Ok(()) => tracing::debug!(path = %destination.display(), "Removed previous artifact"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(failed(format!("cannot replace {}: {}", destination.display(), e)));
            }
        }

        let part = part_path(destination);
        let mut file = tokio::fs::File::create(&part)
            .await
            .map_err(|e| failed(format!("cannot create {}: {}", part.display(), e)))?;

        let response = self
            .client
            .get(&descriptor.download_url)
            .await
            .map_err(|e| failed(e.to_string()))?;

        progress.progress(&format!("Downloading {}", label));

        let total = response.content_length().unwrap_or(descriptor.size_bytes);
        let mut hasher = self.verify.then(Sha1::new);
        let mut written: u64 = 0;
        let mut last_percent = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| failed(format!("read failed: {}", e)))?;
            if let Some(h) = hasher.as_mut() {
                h.update(&chunk);
            }
            file.write_all(&chunk)
                .await
                .map_err(|e| failed(format!("write to {} failed: {}", part.display(), e)))?;
            written += chunk.len() as u64;

            if total > 0 {
                let percent = (written.saturating_mul(100) / total).min(100);
                if percent >= last_percent + 5 {
                    last_percent = percent;
                    progress.progress(&format!("Downloading {} ({}%)", label, percent));
                }
            }
        }

        file.flush()
            .await
            .map_err(|e| failed(format!("flush of {} failed: {}", part.display(), e)))?;
        drop(file);

        if let Some(h) = hasher {
            verify(descriptor, written, &hex::encode(h.finalize()))?;
        }

        tokio::fs::rename(&part, destination).await.map_err(|e| {
            failed(format!(
                "cannot move {} to {}: {}",
                part.display(),
                destination.display(),
                e
            ))
        })?;

        tracing::info!(path = %destination.display(), bytes = written, "Downloaded artifact");
        Ok(written)
    }
}

fn verify(descriptor: &ArtifactDescriptor, written: u64, digest: &str) -> Result<()> {
    if written != descriptor.size_bytes {
        return Err(failed(format!(
            "size mismatch: expected {} bytes, got {}",
            descriptor.size_bytes, written
        )));
    }
    if !digest.eq_ignore_ascii_case(&descriptor.checksum) {
        return Err(failed(format!(
            "checksum mismatch: expected {}, got {}",
            descriptor.checksum, digest
        )));
    }
    Ok(())
}

/// Sibling path used while the transfer is in flight.
pub fn part_path(destination: &Path) -> PathBuf {
    let mut name = OsString::from(destination.as_os_str());
    name.push(".part");
    PathBuf::from(name)
}

fn failed(message: String) -> ProvisionError {
    ProvisionError::DownloadFailed(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(size: u64, checksum: &str) -> ArtifactDescriptor {
        ArtifactDescriptor {
            download_url: "http://127.0.0.1/server.jar".into(),
            size_bytes: size,
            checksum: checksum.into(),
            runtime_major: None,
        }
    }

    #[test]
    fn part_path_appends_suffix() {
        assert_eq!(
            part_path(Path::new("server/server.jar")),
            PathBuf::from("server/server.jar.part")
        );
    }

    #[test]
    fn verify_checks_size_then_digest() {
        let digest = hex::encode(Sha1::digest(b"jar"));
        assert!(verify(&descriptor(3, &digest), 3, &digest).is_ok());
        assert!(verify(&descriptor(3, &digest.to_uppercase()), 3, &digest).is_ok());

        let err = verify(&descriptor(4, &digest), 3, &digest).unwrap_err();
        assert!(err.to_string().contains("size mismatch"));

        let err = verify(&descriptor(3, "deadbeef"), 3, &digest).unwrap_err();
        assert!(err.to_string().contains("checksum mismatch"));
    }
}
