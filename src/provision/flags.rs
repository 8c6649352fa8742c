//! Runtime flag sets and the invocations built from them.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Hosts with at least this much physical memory get the large tuned profile.
pub const LARGE_PROFILE_MIN_MEMORY: u64 = 12_000_000_000;

/// Flag that keeps the server from opening its own window.
pub const NO_GUI_FLAG: &str = "--nogui";

const TUNED_COMMON_HEAD: &[&str] = &[
    "-Xms10G",
    "-Xmx10G",
    "-XX:+UseG1GC",
    "-XX:+ParallelRefProcEnabled",
    "-XX:MaxGCPauseMillis=200",
    "-XX:+UnlockExperimentalVMOptions",
    "-XX:+DisableExplicitGC",
    "-XX:+AlwaysPreTouch",
];

const TUNED_STANDARD: &[&str] = &[
    "-XX:G1NewSizePercent=30",
    "-XX:G1MaxNewSizePercent=40",
    "-XX:G1HeapRegionSize=8M",
    "-XX:G1ReservePercent=20",
    "-XX:G1HeapWastePercent=5",
    "-XX:G1MixedGCCountTarget=4",
    "-XX:InitiatingHeapOccupancyPercent=15",
];

const TUNED_LARGE: &[&str] = &[
    "-XX:G1NewSizePercent=40",
    "-XX:G1MaxNewSizePercent=50",
    "-XX:G1HeapRegionSize=16M",
    "-XX:G1ReservePercent=15",
    "-XX:G1HeapWastePercent=5",
    "-XX:G1MixedGCCountTarget=4",
    "-XX:InitiatingHeapOccupancyPercent=20",
];

const TUNED_COMMON_TAIL: &[&str] = &[
    "-XX:G1MixedGCLiveThresholdPercent=90",
    "-XX:G1RSetUpdatingPauseTimePercent=5",
    "-XX:SurvivorRatio=32",
    "-XX:+PerfDisableSharedMem",
    "-XX:MaxTenuringThreshold=1",
    "-Dusing.aikars.flags=https://mcflags.emc.gs",
    "-Daikars.new.flags=true",
];

/// Which tuned profile fits the host.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TunedProfile {
    Standard,
    Large,
}

impl TunedProfile {
    pub fn for_memory(total_bytes: u64) -> Self {
        if total_bytes >= LARGE_PROFILE_MIN_MEMORY {
            Self::Large
        } else {
            Self::Standard
        }
    }

    /// Pick a profile from the host's physical memory.
    pub fn detect() -> Self {
        let mut system = sysinfo::System::new();
        system.refresh_memory();
        let total = system.total_memory();
        tracing::debug!(total_memory = total, "Detected host memory");
        Self::for_memory(total)
    }
}

/// The runtime flags placed before the artifact.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "mode", content = "profile")]
pub enum FlagSet {
    Tuned(TunedProfile),
    Minimal,
}

impl FlagSet {
    pub fn is_tuned(&self) -> bool {
        matches!(self, Self::Tuned(_))
    }

    /// Flags up to and including `-jar`.
    pub fn runtime_args(&self) -> Vec<String> {
        let mut args: Vec<&str> = Vec::new();
        if let Self::Tuned(profile) = self {
            args.extend_from_slice(TUNED_COMMON_HEAD);
            args.extend_from_slice(match profile {
                TunedProfile::Standard => TUNED_STANDARD,
                TunedProfile::Large => TUNED_LARGE,
            });
            args.extend_from_slice(TUNED_COMMON_TAIL);
        }
        args.push("-jar");
        args.into_iter().map(String::from).collect()
    }
}

/// A fully specified process launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Directory the process runs in; the server writes its files here.
    pub working_dir: PathBuf,
    pub flags: FlagSet,
}

impl Invocation {
    /// `<runtime> <flags> -jar <artifact file name> --nogui`, run from the
    /// artifact's directory.
    pub fn for_artifact(runtime: &str, flags: FlagSet, artifact: &Path) -> Self {
        let working_dir = artifact
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let file_name = artifact
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| artifact.display().to_string());

        let mut args = flags.runtime_args();
        args.push(file_name);
        args.push(NO_GUI_FLAG.to_string());

        Self {
            program: runtime.to_string(),
            args,
            working_dir,
            flags,
        }
    }

    /// The invocation as a single shell command line.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(quote)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn quote(arg: &str) -> String {
    if !arg.is_empty() && !arg.contains(|c: char| c.is_whitespace() || c == '"') {
        arg.to_string()
    } else {
        format!("\"{}\"", arg.replace('"', "\\\""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuning_options(args: &[String]) -> Vec<&String> {
        args.iter()
            .filter(|a| a.starts_with("-X") || a.starts_with("-D"))
            .collect()
    }

    #[test]
    fn profile_follows_memory_threshold() {
        assert_eq!(TunedProfile::for_memory(8_000_000_000), TunedProfile::Standard);
        assert_eq!(TunedProfile::for_memory(LARGE_PROFILE_MIN_MEMORY), TunedProfile::Large);
    }

    #[test]
    fn minimal_flags_carry_no_tuning() {
        assert_eq!(FlagSet::Minimal.runtime_args(), vec!["-jar"]);
    }

    #[test]
    fn tuned_profiles_differ_in_region_size() {
        let standard = FlagSet::Tuned(TunedProfile::Standard).runtime_args();
        let large = FlagSet::Tuned(TunedProfile::Large).runtime_args();
        assert!(standard.contains(&"-XX:G1HeapRegionSize=8M".to_string()));
        assert!(large.contains(&"-XX:G1HeapRegionSize=16M".to_string()));
        assert_eq!(standard.last().map(String::as_str), Some("-jar"));
        assert_eq!(tuning_options(&standard).len(), standard.len() - 1);
    }

    #[test]
    fn invocation_runs_from_artifact_dir() {
        let inv =
            Invocation::for_artifact("java", FlagSet::Minimal, Path::new("server/server.jar"));
        assert_eq!(inv.working_dir, PathBuf::from("server"));
        assert_eq!(inv.args, vec!["-jar", "server.jar", "--nogui"]);
        assert_eq!(inv.command_line(), "java -jar server.jar --nogui");
    }

    #[test]
    fn command_line_quotes_paths_with_spaces() {
        let inv = Invocation::for_artifact(
            "C:\\Program Files\\Java\\bin\\java.exe",
            FlagSet::Minimal,
            Path::new("server.jar"),
        );
        assert_eq!(inv.working_dir, PathBuf::from("."));
        assert!(inv.command_line().starts_with("\"C:\\Program Files\\Java\\bin\\java.exe\" -jar"));
    }
}
