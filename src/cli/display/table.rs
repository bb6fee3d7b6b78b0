//! Table rendering for CLI output

use super::{ColorTheme, StatusIcon};
use crate::domain::install::{InstallReport, Outcome};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};
use serde::Serialize;

/// One row of `list`
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
    pub url: String,
    pub installed: bool,
    pub path: String,
}

/// Table renderer for formatted output
pub struct TableRenderer {
    theme: ColorTheme,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRenderer {
    /// Create a new table renderer with default theme
    pub fn new() -> Self {
        Self {
            theme: ColorTheme::default(),
        }
    }

    /// Render the result of an install run
    pub fn render_install_report(&self, reports: &[InstallReport]) -> String {
        if reports.is_empty() {
            return "No dependencies requested".to_string();
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("TOOL").set_alignment(CellAlignment::Left),
                Cell::new("VERSION").set_alignment(CellAlignment::Left),
                Cell::new("RESULT").set_alignment(CellAlignment::Left),
            ]);

        for report in reports {
            let icon = StatusIcon::get_outcome_icon(report.outcome);
            table.add_row(vec![
                Cell::new(&report.name),
                Cell::new(&report.version),
                Cell::new(format!("{} {}", icon, report.outcome))
                    .fg(self.theme.get_outcome_color(report.outcome)),
            ]);
        }

        let installed = reports
            .iter()
            .filter(|r| r.outcome == Outcome::Installed)
            .count();
        let skipped = reports.iter().filter(|r| r.outcome.is_skip()).count();

        let mut output = String::new();
        output.push_str(&format!(
            "╭─ Dependencies {} ─╮\n",
            format!(
                "[{} installed / {} skipped / {} total]",
                installed,
                skipped,
                reports.len()
            )
            .bright_black()
        ));
        output.push_str(&table.to_string());
        output.push('\n');
        output
    }

    /// Render the registry with install state
    pub fn render_tool_list(&self, tools: &[ToolInfo]) -> String {
        if tools.is_empty() {
            return "No tools registered".to_string();
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("TOOL").set_alignment(CellAlignment::Left),
                Cell::new("VERSION").set_alignment(CellAlignment::Left),
                Cell::new("INSTALLED").set_alignment(CellAlignment::Center),
                Cell::new("SOURCE").set_alignment(CellAlignment::Left),
            ]);

        for tool in tools {
            let icon = StatusIcon::get_presence_icon(tool.installed);
            let label = if tool.installed { "yes" } else { "no" };
            table.add_row(vec![
                Cell::new(&tool.name),
                Cell::new(&tool.version),
                Cell::new(format!("{} {}", icon, label))
                    .fg(self.theme.get_presence_color(tool.installed))
                    .set_alignment(CellAlignment::Center),
                Cell::new(&tool.url).fg(self.theme.muted),
            ]);
        }

        let mut output = table.to_string();
        output.push('\n');
        output.push_str(&format!(
            "Legend: {} Installed  {} Missing\n",
            StatusIcon::SUCCESS.green(),
            StatusIcon::ERROR.red()
        ));
        output
    }
}
