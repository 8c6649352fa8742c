use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};

use crate::meta::DEFAULT_MANIFEST_URL;
use crate::provision::default_script_name;

const APP_NAME: &str = "blockhost";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProvisionConfig {
    /// Release manifest endpoint
    pub manifest_url: String,
    /// Directory the server is installed into
    pub server_dir: PathBuf,
    /// File name of the downloaded server inside `server_dir`
    pub artifact_name: String,
    /// Runtime executable used to start the server
    pub runtime: String,
    /// Launch script name, written next to `server_dir`
    pub script_name: String,
    /// Check the downloaded size and SHA-1 against the catalog
    pub verify_checksum: bool,
    pub user_agent: String,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            manifest_url: DEFAULT_MANIFEST_URL.to_string(),
            server_dir: PathBuf::from("server"),
            artifact_name: "server.jar".to_string(),
            runtime: "java".to_string(),
            script_name: default_script_name().to_string(),
            verify_checksum: false,
            user_agent: concat!("blockhost/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ProvisionConfig {
    /// Load the user's config file, then apply environment overrides.
    /// Falls back to defaults if the file is absent or unreadable.
    pub fn load() -> Self {
        let config = match Self::try_load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        config.with_env(|key| std::env::var(key).ok())
    }

    fn try_load() -> Result<Self> {
        let config_path = get_config_path()?;
        if !config_path.exists() {
            return Ok(Self::default());
        }
        Self::from_file(&config_path)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Apply `BLOCKHOST_*` overrides using `lookup` to read variables.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("BLOCKHOST_MANIFEST_URL") {
            self.manifest_url = url;
        }
        if let Some(dir) = lookup("BLOCKHOST_SERVER_DIR") {
            self.server_dir = PathBuf::from(dir);
        }
        if let Some(runtime) = lookup("BLOCKHOST_RUNTIME") {
            self.runtime = runtime;
        }
        if let Some(verify) = lookup("BLOCKHOST_VERIFY") {
            self.verify_checksum = matches!(verify.trim(), "1" | "true" | "yes");
        }
        self
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.server_dir.join(&self.artifact_name)
    }

    pub fn license_path(&self) -> PathBuf {
        crate::provision::LicenseAcceptor::path_in(&self.server_dir)
    }

    /// The launch script lives one level above the server directory.
    pub fn script_path(&self) -> PathBuf {
        match self.server_dir.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.join(&self.script_name),
            _ => PathBuf::from(&self.script_name),
        }
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}
