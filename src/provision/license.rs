use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{ProvisionError, Result};

/// File the server writes on its first start.
pub const LICENSE_FILE_NAME: &str = "eula.txt";

/// Zero-based line holding the acceptance flag. The server writes two comment
/// lines (notice and timestamp) before it.
pub const ACCEPTANCE_LINE: usize = 2;

/// Line content recording consent.
pub const ACCEPTED: &str = "eula=true";

/// What `accept` did to the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    Accepted,
    AlreadyAccepted,
}

/// Records consent in the server's license file.
#[derive(Debug, Clone)]
pub struct LicenseAcceptor {
    line: usize,
}

impl Default for LicenseAcceptor {
    fn default() -> Self {
        Self {
            line: ACCEPTANCE_LINE,
        }
    }
}

impl LicenseAcceptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of the license file inside a server directory.
    pub fn path_in(server_dir: &Path) -> PathBuf {
        server_dir.join(LICENSE_FILE_NAME)
    }

    /// Rewrite the acceptance line, leaving every other line untouched.
    pub fn accept(&self, path: &Path) -> Result<Acceptance> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ProvisionError::LicenseFileMissing(path.to_path_buf()),
            _ => ProvisionError::LicenseFileMalformed {
                path: path.to_path_buf(),
                lines: 0,
                index: self.line,
            },
        })?;

        let Some(rewritten) = rewrite(&content, self.line) else {
            return Err(ProvisionError::LicenseFileMalformed {
                path: path.to_path_buf(),
                lines: split_lines(&content).0.len(),
                index: self.line,
            });
        };

        if rewritten == content {
            tracing::debug!(path = %path.display(), "License already accepted");
            return Ok(Acceptance::AlreadyAccepted);
        }

        fs::write(path, rewritten).map_err(|source| ProvisionError::LicenseWriteFailed {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "Accepted license");
        Ok(Acceptance::Accepted)
    }
}

/// The file's lines plus the terminator after the last one. A final newline
/// ends the last line; it does not start another.
fn split_lines(content: &str) -> (Vec<&str>, &str) {
    if content.is_empty() {
        return (Vec::new(), "");
    }
    match content.strip_suffix('\n') {
        Some(body) => (body.split('\n').collect(), "\n"),
        None => (content.split('\n').collect(), ""),
    }
}

/// Replace line `index` with the accepted marker, keeping a trailing `\r` if
/// the file uses CRLF. `None` if the line does not exist.
fn rewrite(content: &str, index: usize) -> Option<String> {
    let (mut lines, terminator) = split_lines(content);
    let line = lines.get_mut(index)?;
    let replacement = if line.ends_with('\r') {
        "eula=true\r"
    } else {
        ACCEPTED
    };
    *line = replacement;
    Some(lines.join("\n") + terminator)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENERATED: &str = "#By changing the setting below to TRUE you are indicating your agreement to our EULA (https://aka.ms/MinecraftEULA).\n#Tue Jun 13 10:00:00 UTC 2023\neula=false\n";

    #[test]
    fn rewrites_only_the_acceptance_line() {
        let out = rewrite(GENERATED, ACCEPTANCE_LINE).unwrap();
        let before: Vec<&str> = GENERATED.split('\n').collect();
        let after: Vec<&str> = out.split('\n').collect();
        assert_eq!(before.len(), after.len());
        assert_eq!(after[2], "eula=true");
        for i in [0, 1, 3] {
            assert_eq!(before[i], after[i]);
        }
    }

    #[test]
    fn keeps_crlf_endings() {
        let out = rewrite("a\r\nb\r\neula=false\r\n", 2).unwrap();
        assert_eq!(out, "a\r\nb\r\neula=true\r\n");
    }

    #[test]
    fn short_files_have_no_acceptance_line() {
        assert!(rewrite("eula=false", ACCEPTANCE_LINE).is_none());
        assert!(rewrite("#notice\neula=false\n", ACCEPTANCE_LINE).is_none());
        assert!(rewrite("", 0).is_none());
    }

    #[test]
    fn final_newline_does_not_count_as_a_line() {
        assert_eq!(split_lines("a\nb\n"), (vec!["a", "b"], "\n"));
        assert_eq!(split_lines("a\nb"), (vec!["a", "b"], ""));
        assert_eq!(rewrite("a\nb\neula=false", 2).unwrap(), "a\nb\neula=true");
    }

    #[test]
    fn rewrite_is_idempotent() {
        let once = rewrite(GENERATED, ACCEPTANCE_LINE).unwrap();
        assert_eq!(rewrite(&once, ACCEPTANCE_LINE).unwrap(), once);
    }
}
