//! Terminal presentation: the release picker and progress output.

mod progress;
mod select;
mod style;

pub use progress::ConsoleReporter;
pub use select::{candidate_label, choose, render_candidates, resolve_choice, Selection};
pub use style::Style;
