use dialoguer::console::{self, style, StyledObject};
use dialoguer::theme::{ColorfulTheme, SimpleTheme, Theme};

/// Terminal styling, handed to the presentation layer at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Style {
    pub color: bool,
    pub checkmark: &'static str,
    pub spinner_frames: &'static [&'static str],
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: true,
            checkmark: "✓",
            spinner_frames: &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"],
        }
    }
}

impl Style {
    /// Default palette. Color is off when `NO_COLOR` is set or stdout is not
    /// a color terminal.
    pub fn from_env() -> Self {
        Self {
            color: std::env::var_os("NO_COLOR").is_none() && console::colors_enabled(),
            ..Self::default()
        }
    }

    pub fn plain() -> Self {
        Self {
            color: false,
            ..Self::default()
        }
    }

    fn styled<'a>(&self, text: &'a str) -> StyledObject<&'a str> {
        style(text).force_styling(self.color)
    }

    pub fn accent(&self, text: &str) -> String {
        self.styled(text).bold().magenta().to_string()
    }

    pub fn success(&self, text: &str) -> String {
        self.styled(text).green().to_string()
    }

    pub fn muted(&self, text: &str) -> String {
        self.styled(text).dim().to_string()
    }

    /// A completed-stage line: `  ✓ text`.
    pub fn done_line(&self, text: &str) -> String {
        format!("  {} {}", self.success(self.checkmark), text)
    }

    /// Prompt theme for the interactive picker.
    pub fn theme(&self) -> Box<dyn Theme> {
        if self.color {
            Box::new(ColorfulTheme::default())
        } else {
            Box::new(SimpleTheme)
        }
    }
}
