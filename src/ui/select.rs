//! Release picker.

use std::io;

use dialoguer::console::Term;
use dialoguer::Select;

use crate::models::{CandidateList, ReleaseEntry};

use super::Style;

/// Rows shown at once before the picker scrolls.
const VISIBLE_ROWS: usize = 15;

/// What the operator decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Chosen(usize),
    Cancelled,
}

/// One candidate as shown to the operator: id, latest marker, release date.
pub fn candidate_label(list: &CandidateList, entry: &ReleaseEntry, style: &Style) -> String {
    let marker = if list.is_latest(&entry.id) {
        style.muted(" (latest)")
    } else {
        String::new()
    };
    let date = entry
        .release_time
        .map(|t| style.muted(&format!("  {}", t.format("%Y-%m-%d"))))
        .unwrap_or_default();
    format!("{}{}{}", entry.id, marker, date)
}

/// Render the candidates as a numbered list, newest first.
pub fn render_candidates(list: &CandidateList, style: &Style) -> String {
    let mut output = format!("{}\n", style.accent(" Server version "));
    for (i, entry) in list.as_slice().iter().enumerate() {
        output.push_str(&format!("  {:>3}. {}\n", i + 1, candidate_label(list, entry, style)));
    }
    output
}

/// Map an answer (1-based number or release id) to a list index.
pub fn resolve_choice(list: &CandidateList, answer: &str) -> Option<usize> {
    let answer = answer.trim();
    if let Ok(n) = answer.parse::<usize>() {
        if n >= 1 && n <= list.len() {
            return Some(n - 1);
        }
    }
    list.as_slice().iter().position(|e| e.id == answer)
}

/// Let the operator pick a release on the terminal. Esc or `q` cancels.
pub fn choose(list: &CandidateList, style: &Style) -> dialoguer::Result<Selection> {
    let term = Term::stderr();
    if list.is_empty() {
        term.write_line("No installable releases found.")?;
        return Ok(Selection::Cancelled);
    }
    if !term.is_term() {
        return Err(io::Error::new(
            io::ErrorKind::NotConnected,
            "choosing a release needs a terminal; pass --release <id> instead",
        )
        .into());
    }

    let labels: Vec<String> = list
        .as_slice()
        .iter()
        .map(|entry| candidate_label(list, entry, style))
        .collect();
    let theme = style.theme();
    let choice = Select::with_theme(theme.as_ref())
        .with_prompt("Server version (Esc or q to quit)")
        .items(labels.as_slice())
        .default(0)
        .max_length(VISIBLE_ROWS)
        .interact_on_opt(&term)?;

    Ok(match choice {
        Some(index) => Selection::Chosen(index),
        None => Selection::Cancelled,
    })
}
