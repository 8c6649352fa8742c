use serde::{Deserialize, Serialize};

/// Outcome of a single launch of the server artifact.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LaunchAttemptResult {
    /// Whether the tuned flag set was used.
    pub tuned: bool,
    pub succeeded: bool,
    /// Exit code, if the process ran and exited normally.
    pub exit_status: Option<i32>,
}

impl LaunchAttemptResult {
    pub fn success(tuned: bool, exit_status: Option<i32>) -> Self {
        Self {
            tuned,
            succeeded: true,
            exit_status,
        }
    }

    pub fn failure(tuned: bool, exit_status: Option<i32>) -> Self {
        Self {
            tuned,
            succeeded: false,
            exit_status,
        }
    }
}
