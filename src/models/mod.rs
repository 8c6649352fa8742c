//! Data model for a provisioning run.
//!
//! - [`ReleaseManifest`]: immutable snapshot of the remote release index.
//! - [`CandidateList`]: the stable releases an operator may pick from.
//! - [`ArtifactDescriptor`]: where to download the chosen server from.
//! - [`LaunchAttemptResult`]: what happened when the server was started.
//! - [`ProvisioningState`]: the forward-only record of a single run.

mod artifact;
mod launch;
mod release;
mod state;

pub use artifact::*;
pub use launch::*;
pub use release::*;
pub use state::*;
