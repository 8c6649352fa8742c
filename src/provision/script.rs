use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ProvisionError, Result};

use super::flags::{FlagSet, Invocation, TunedProfile};

/// Default launch script name for the host platform.
pub fn default_script_name() -> &'static str {
    if cfg!(windows) {
        "run.bat"
    } else {
        "run.sh"
    }
}

/// Persists the launch command that worked during probing.
#[derive(Debug, Clone)]
pub struct ScriptWriter {
    runtime: String,
    profile: TunedProfile,
    artifact: PathBuf,
}

impl ScriptWriter {
    pub fn new(
        runtime: impl Into<String>,
        profile: TunedProfile,
        artifact: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runtime: runtime.into(),
            profile,
            artifact: artifact.into(),
        }
    }

    fn flags(&self, tuned: bool) -> FlagSet {
        if tuned {
            FlagSet::Tuned(self.profile)
        } else {
            FlagSet::Minimal
        }
    }

    /// The single command line stored in a script at `script_path`.
    ///
    /// The server must run from its own directory. The line changes into it
    /// relative to the script's own location, so the script works from any
    /// current directory.
    pub fn render(&self, script_path: &Path, tuned: bool) -> String {
        let invocation = Invocation::for_artifact(&self.runtime, self.flags(tuned), &self.artifact);
        let command = invocation.command_line();

        let script_dir = script_path
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let working_dir = invocation.working_dir.as_path();
        let relative = match working_dir.strip_prefix(script_dir) {
            Ok(rel) => Some(rel),
            Err(_) if working_dir.is_relative() && script_dir == Path::new(".") => {
                Some(working_dir)
            }
            Err(_) => None,
        };

        let batch = is_batch(script_path);
        let target = match relative {
            Some(rel) if batch => format!("%~dp0{}", rel.display()).replace('/', "\\"),
            Some(rel) if rel.as_os_str().is_empty() => "$(dirname \"$0\")".to_string(),
            Some(rel) => format!("$(dirname \"$0\")/{}", rel.display()),
            None => working_dir.display().to_string(),
        };
        let cd = if batch { "cd /d" } else { "cd" };
        format!("{} \"{}\" && {}", cd, target, command)
    }

    /// Write the script. Failure is reported but does not undo the run.
    pub fn write(&self, script_path: &Path, tuned: bool) -> Result<()> {
        let line = self.render(script_path, tuned);
        let fail = |source| ProvisionError::ScriptWriteFailed {
            path: script_path.to_path_buf(),
            source,
        };

        fs::write(script_path, format!("{}\n", line)).map_err(fail)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(script_path, fs::Permissions::from_mode(0o755)).map_err(fail)?;
        }

        tracing::info!(path = %script_path.display(), tuned, "Wrote launch script");
        Ok(())
    }
}

fn is_batch(script_path: &Path) -> bool {
    script_path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("bat") || e.eq_ignore_ascii_case("cmd"))
}
