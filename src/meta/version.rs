//! Stable release identifiers.
//!
//! A stable id is a dotted run of at least two purely numeric components
//! (`1.20`, `1.20.1`). Pre-releases (`1.20.1-pre1`, `1.20-rc1`), weekly
//! snapshots (`23w13a`) and anything with letters never qualify.

use std::fmt;

/// Why an id is not a stable release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotStable {
    Empty,
    PreRelease,
    Snapshot,
    TooFewComponents,
    NonNumeric(String),
}

impl fmt::Display for NotStable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty identifier"),
            Self::PreRelease => write!(f, "pre-release marker"),
            Self::Snapshot => write!(f, "snapshot marker"),
            Self::TooFewComponents => write!(f, "fewer than two components"),
            Self::NonNumeric(part) => write!(f, "non-numeric component {:?}", part),
        }
    }
}

/// Check that `id` is a stable release id, or say why it is not.
pub fn check_stable_release(id: &str) -> Result<(), NotStable> {
    if id.is_empty() {
        return Err(NotStable::Empty);
    }
    if id.contains('-') {
        return Err(NotStable::PreRelease);
    }
    if id.contains('w') {
        return Err(NotStable::Snapshot);
    }

    let mut components = 0;
    for part in id.split('.') {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(NotStable::NonNumeric(part.to_string()));
        }
        components += 1;
    }

    if components < 2 {
        return Err(NotStable::TooFewComponents);
    }
    Ok(())
}

/// Predicate form of [`check_stable_release`].
pub fn is_stable_release(id: &str) -> bool {
    check_stable_release(id).is_ok()
}
