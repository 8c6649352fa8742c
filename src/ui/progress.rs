//! Console output with a spinner during the download.
//!
//! Without a terminal on stdout no spinner is drawn and progress messages are
//! printed as plain lines.
//!
//! The spinner lives on its own thread and only draws; the download's result
//! never depends on it. It is stopped and joined exactly once, when the
//! pipeline reports the download finished.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Mutex;
use std::thread::JoinHandle;
use std::time::Duration;

use dialoguer::console::Term;

use crate::provision::ProgressSink;

use super::Style;

const TICK: Duration = Duration::from_millis(100);

enum SpinnerMsg {
    Message(String),
    Stop,
}

struct Spinner {
    tx: Sender<SpinnerMsg>,
    handle: JoinHandle<()>,
}

impl Spinner {
    fn start(style: Style) -> Self {
        let (tx, rx) = mpsc::channel();
        let handle = std::thread::spawn(move || {
            let term = Term::stdout();
            let mut message = String::new();
            let mut frame = 0usize;
            loop {
                match rx.recv_timeout(TICK) {
                    Ok(SpinnerMsg::Message(m)) => message = m,
                    Ok(SpinnerMsg::Stop) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {}
                }
                if message.is_empty() {
                    continue;
                }
                let glyph = style.spinner_frames[frame % style.spinner_frames.len()];
                frame += 1;
                let _ = term.clear_line();
                let _ = term.write_str(&format!("  {} {}", style.accent(glyph), message));
                let _ = term.flush();
            }
            let _ = term.clear_line();
            let _ = term.flush();
        });
        Self { tx, handle }
    }

    fn set(&self, message: &str) {
        let _ = self.tx.send(SpinnerMsg::Message(message.to_string()));
    }

    fn stop(self) {
        let _ = self.tx.send(SpinnerMsg::Stop);
        if self.handle.join().is_err() {
            tracing::debug!("Spinner thread panicked");
        }
    }
}

/// Prints pipeline progress to stdout.
pub struct ConsoleReporter {
    style: Style,
    spinner: Mutex<Option<Spinner>>,
}

impl ConsoleReporter {
    pub fn new(style: Style) -> Self {
        Self {
            style,
            spinner: Mutex::new(None),
        }
    }
}

impl ProgressSink for ConsoleReporter {
    fn progress(&self, message: &str) {
        let spinner = self.spinner.lock().unwrap_or_else(|e| e.into_inner());
        match spinner.as_ref() {
            Some(spinner) => spinner.set(message),
            None => println!("  {}", self.style.muted(message)),
        }
    }

    fn status(&self, line: &str) {
        println!("{}", self.style.done_line(line));
    }

    fn download_started(&self) {
        let mut spinner = self.spinner.lock().unwrap_or_else(|e| e.into_inner());
        if spinner.is_none() && Term::stdout().is_term() {
            *spinner = Some(Spinner::start(self.style.clone()));
        }
    }

    fn download_finished(&self, _ok: bool) {
        let spinner = self.spinner.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(spinner) = spinner {
            spinner.stop();
        }
    }
}

impl Drop for ConsoleReporter {
    fn drop(&mut self) {
        self.download_finished(false);
    }
}
