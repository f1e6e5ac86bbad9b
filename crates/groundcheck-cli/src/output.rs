//! Styled terminal output

use console::style;
use groundcheck::resolver::EntryCheck;
use groundcheck::SuiteReport;
use std::fmt::Write as _;

/// Apply the color choice to all `console` styling
pub fn set_colors(enabled: bool) {
    console::set_colors_enabled(enabled);
    console::set_colors_enabled_stderr(enabled);
}

/// Suite report with verdicts and step marks colored
#[must_use]
pub fn styled_report(suite: &SuiteReport) -> String {
    let mut out = String::new();
    for line in suite.render_text().lines() {
        let styled = if line.starts_with("PASS") {
            style(line).green().bold().to_string()
        } else if line.starts_with("FAIL") {
            style(line).red().bold().to_string()
        } else if line.starts_with("SKIP") || line.contains("[skip]") {
            style(line).yellow().to_string()
        } else if line.contains("[FAIL]") {
            style(line).red().to_string()
        } else if line.starts_with("         ") {
            style(line).dim().to_string()
        } else {
            line.to_string()
        };
        let _ = writeln!(out, "{styled}");
    }
    out
}

/// One line per object map entry check
#[must_use]
pub fn styled_check(name: &str, check: &EntryCheck) -> String {
    match check {
        EntryCheck::Unique { widget } => {
            format!("{} {name} -> {widget}", style("unique   ").green())
        }
        EntryCheck::Absent { detail } => {
            format!("{} {name}: {detail}", style("absent   ").yellow())
        }
        EntryCheck::Ambiguous { count } => {
            format!("{} {name}: {count} widgets match", style("AMBIGUOUS").red().bold())
        }
    }
}
