//! Color theme for CLI output

use crate::domain::install::Outcome;
use comfy_table::Color as TableColor;

/// Color theme for terminal output
#[derive(Debug, Clone)]
pub struct ColorTheme {
    pub success: TableColor,
    pub warning: TableColor,
    pub error: TableColor,
    pub info: TableColor,
    pub muted: TableColor,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            success: TableColor::Green,
            warning: TableColor::Yellow,
            error: TableColor::Red,
            info: TableColor::Cyan,
            muted: TableColor::DarkGrey,
        }
    }
}

impl ColorTheme {
    /// Get color for an install outcome
    pub fn get_outcome_color(&self, outcome: Outcome) -> TableColor {
        match outcome {
            Outcome::Installed => self.success,
            Outcome::WouldInstall => self.info,
            Outcome::SkippedAlreadyPresent => self.muted,
            Outcome::SkippedPolicy | Outcome::SkippedUserDeclined => self.warning,
        }
    }

    /// Get color for the installed column of the tool list
    pub fn get_presence_color(&self, installed: bool) -> TableColor {
        if installed {
            self.success
        } else {
            self.error
        }
    }
}
