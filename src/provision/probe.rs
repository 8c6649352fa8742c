//! One-shot launch of the downloaded server.
//!
//! ```text
//! Idle -> TunedAttempt -> Success -> Done
//!              |
//!              v
//!        MinimalAttempt -> Success -> Done
//!              |
//!              v
//!            Fatal
//! ```

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;

use crate::models::LaunchAttemptResult;

use super::flags::{FlagSet, Invocation, TunedProfile};

/// Runs an invocation to completion.
///
/// `Ok(Some(code))` is a normal exit; `Ok(None)` means the process ended
/// without an exit code (killed by a signal). `Err` means it never started.
pub trait Launcher {
    fn run(&self, invocation: &Invocation) -> io::Result<Option<i32>>;
}

impl<L: Launcher + ?Sized> Launcher for &L {
    fn run(&self, invocation: &Invocation) -> io::Result<Option<i32>> {
        (**self).run(invocation)
    }
}

impl<L: Launcher + ?Sized> Launcher for Arc<L> {
    fn run(&self, invocation: &Invocation) -> io::Result<Option<i32>> {
        (**self).run(invocation)
    }
}

/// Launches real processes, discarding their output.
#[derive(Debug, Clone, Default)]
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    fn run(&self, invocation: &Invocation) -> io::Result<Option<i32>> {
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;
        Ok(status.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    Idle,
    TunedAttempt,
    MinimalAttempt,
    Success { tuned: bool },
    Fatal,
    Done,
}

/// Every attempt made, in order, plus the final verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub attempts: Vec<LaunchAttemptResult>,
    pub outcome: LaunchAttemptResult,
}

impl ProbeReport {
    pub fn succeeded(&self) -> bool {
        self.outcome.succeeded
    }

    /// Human-readable account of the failed attempts.
    pub fn failure_summary(&self) -> String {
        self.attempts
            .iter()
            .filter(|a| !a.succeeded)
            .map(|a| {
                let mode = if a.tuned { "tuned" } else { "minimal" };
                match a.exit_status {
                    Some(code) => format!("{} exited with {}", mode, code),
                    None => format!("{} did not start or was killed", mode),
                }
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Tries the tuned flags once, then falls back to minimal flags once.
pub struct LaunchProbe<L> {
    launcher: L,
    runtime: String,
    profile: TunedProfile,
}

impl<L: Launcher> LaunchProbe<L> {
    pub fn new(launcher: L, runtime: impl Into<String>, profile: TunedProfile) -> Self {
        Self {
            launcher,
            runtime: runtime.into(),
            profile,
        }
    }

    /// Run the state machine to completion against `artifact`. Blocks until
    /// each launched process exits.
    pub fn probe(&self, artifact: &Path) -> ProbeReport {
        let mut attempts = Vec::new();
        let mut outcome = LaunchAttemptResult::failure(false, None);
        let mut state = ProbeState::Idle;

        while state != ProbeState::Done {
            state = match state {
                ProbeState::Idle => ProbeState::TunedAttempt,
                ProbeState::TunedAttempt => {
                    let result = self.attempt(artifact, FlagSet::Tuned(self.profile));
                    attempts.push(result);
                    if result.succeeded {
                        ProbeState::Success { tuned: true }
                    } else {
                        tracing::warn!(
                            exit_status = ?result.exit_status,
                            "Tuned launch failed, retrying with minimal flags"
                        );
                        ProbeState::MinimalAttempt
                    }
                }
                ProbeState::MinimalAttempt => {
                    let result = self.attempt(artifact, FlagSet::Minimal);
                    attempts.push(result);
                    if result.succeeded {
                        ProbeState::Success { tuned: false }
                    } else {
                        ProbeState::Fatal
                    }
                }
                ProbeState::Success { tuned } => {
                    outcome = LaunchAttemptResult::success(tuned, Some(0));
                    ProbeState::Done
                }
                ProbeState::Fatal => {
                    outcome = LaunchAttemptResult::failure(false, last_exit(&attempts));
                    break;
                }
                ProbeState::Done => ProbeState::Done,
            };
        }

        ProbeReport { attempts, outcome }
    }

    fn attempt(&self, artifact: &Path, flags: FlagSet) -> LaunchAttemptResult {
        let invocation = Invocation::for_artifact(&self.runtime, flags, artifact);
        tracing::debug!(command = %invocation.command_line(), "Launching server");
        match self.launcher.run(&invocation) {
            Ok(Some(0)) => LaunchAttemptResult::success(flags.is_tuned(), Some(0)),
            Ok(code) => LaunchAttemptResult::failure(flags.is_tuned(), code),
            Err(e) => {
                tracing::warn!(program = %invocation.program, "Could not start runtime: {}", e);
                LaunchAttemptResult::failure(flags.is_tuned(), None)
            }
        }
    }
}

fn last_exit(attempts: &[LaunchAttemptResult]) -> Option<i32> {
    attempts.last().and_then(|a| a.exit_status)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    struct Scripted {
        results: RefCell<Vec<io::Result<Option<i32>>>>,
        seen: RefCell<Vec<FlagSet>>,
    }

    impl Scripted {
        fn new(results: Vec<io::Result<Option<i32>>>) -> Self {
            Self {
                results: RefCell::new(results),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl Launcher for Scripted {
        fn run(&self, invocation: &Invocation) -> io::Result<Option<i32>> {
            self.seen.borrow_mut().push(invocation.flags);
            self.results.borrow_mut().remove(0)
        }
    }

    fn probe(launcher: &Scripted) -> ProbeReport {
        LaunchProbe::new(launcher, "java", TunedProfile::Standard)
            .probe(Path::new("server/server.jar"))
    }

    #[test]
    fn tuned_success_skips_fallback() {
        let launcher = Scripted::new(vec![Ok(Some(0))]);
        let report = probe(&launcher);
        assert_eq!(report.outcome, LaunchAttemptResult::success(true, Some(0)));
        assert_eq!(launcher.seen.borrow().len(), 1);
    }

    #[test]
    fn unstartable_runtime_falls_back_then_fails() {
        let launcher = Scripted::new(vec![
            Err(io::Error::from(io::ErrorKind::NotFound)),
            Err(io::Error::from(io::ErrorKind::NotFound)),
        ]);
        let report = probe(&launcher);
        assert!(!report.succeeded());
        assert_eq!(report.attempts.len(), 2);
        assert_eq!(
            *launcher.seen.borrow(),
            vec![FlagSet::Tuned(TunedProfile::Standard), FlagSet::Minimal]
        );
        assert_eq!(
            report.failure_summary(),
            "tuned did not start or was killed; minimal did not start or was killed"
        );
    }

    #[test]
    fn signal_exit_counts_as_failure() {
        let launcher = Scripted::new(vec![Ok(None), Ok(Some(0))]);
        let report = probe(&launcher);
        assert_eq!(report.outcome, LaunchAttemptResult::success(false, Some(0)));
    }
}
