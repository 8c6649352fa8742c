//! Remote release metadata: the manifest, version filtering and artifact
//! resolution.

mod catalog;
pub mod client;
mod resolver;
pub mod version;

pub use catalog::{filter, VersionCatalog, DEFAULT_MANIFEST_URL};
pub use client::{FetchError, MetaClient};
pub use resolver::ArtifactResolver;
pub use version::{check_stable_release, is_stable_release, NotStable};
