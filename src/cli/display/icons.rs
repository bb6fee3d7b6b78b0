//! Status icons for CLI output

use crate::domain::install::Outcome;

/// Status icons for different states
pub struct StatusIcon;

impl StatusIcon {
    /// Success icon (installed)
    pub const SUCCESS: &'static str = "✓";

    /// Warning icon (skipped by policy or declined)
    pub const WARNING: &'static str = "⚠";

    /// Error icon (missing)
    pub const ERROR: &'static str = "✗";

    /// Pending icon (dry run)
    pub const PENDING: &'static str = "⏳";

    /// Unchanged icon
    pub const UNCHANGED: &'static str = "•";

    pub fn get_outcome_icon(outcome: Outcome) -> &'static str {
        match outcome {
            Outcome::Installed => Self::SUCCESS,
            Outcome::WouldInstall => Self::PENDING,
            Outcome::SkippedAlreadyPresent => Self::UNCHANGED,
            Outcome::SkippedPolicy | Outcome::SkippedUserDeclined => Self::WARNING,
        }
    }

    pub fn get_presence_icon(installed: bool) -> &'static str {
        if installed {
            Self::SUCCESS
        } else {
            Self::ERROR
        }
    }
}
