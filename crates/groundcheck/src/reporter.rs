//! Scenario and suite reports.
//!
//! Reports carry simulated time only, so two runs with the same seed produce
//! byte-identical reports.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::result::{GroundcheckError, GroundcheckResult};

/// What to do after a scenario fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// Run every scenario and collect all failures
    #[default]
    CollectAll,
    /// Stop the suite at the first failed scenario
    FailFast,
}

/// Outcome of one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Step completed
    Passed,
    /// Step raised an error; the scenario was aborted
    Failed,
    /// Not run because an earlier step failed
    Skipped,
}

impl StepStatus {
    /// Check if status is passing
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Check if status is failing
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// Result of one scenario step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    /// 1-based step number
    pub index: usize,
    /// Human-readable step description
    pub step: String,
    /// Outcome
    pub status: StepStatus,
    /// Application time when the step finished, in milliseconds
    pub finished_at_ms: u64,
    /// Application time spent in the step, in milliseconds
    pub duration_ms: u64,
    /// Error message for failed steps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of one scenario run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Scenario name
    pub scenario: String,
    /// Application the scenario ran against
    pub application: String,
    /// Per-step outcomes in order
    pub steps: Vec<StepResult>,
    /// Total application time, in milliseconds
    pub elapsed_ms: u64,
}

impl ScenarioReport {
    /// Check if every step passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.steps.iter().all(|s| s.status.is_passed())
    }

    /// The failing step, if any
    #[must_use]
    pub fn failure(&self) -> Option<&StepResult> {
        self.steps.iter().find(|s| s.status.is_failed())
    }
}

/// Results of a suite of scenarios
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Scenario reports in run order
    pub scenarios: Vec<ScenarioReport>,
    /// Scenarios not run because the suite stopped early
    #[serde(default)]
    pub not_run: Vec<String>,
}

impl SuiteReport {
    /// Create an empty report
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scenario report; returns whether the suite should continue
    pub fn record(&mut self, report: ScenarioReport, mode: FailureMode) -> bool {
        let failed = !report.passed();
        self.scenarios.push(report);
        !(failed && mode == FailureMode::FailFast)
    }

    /// Get number of passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.scenarios.iter().filter(|r| r.passed()).count()
    }

    /// Get number of failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.scenarios.len() - self.passed_count()
    }

    /// Get number of scenarios, including those not run
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.scenarios.len() + self.not_run.len()
    }

    /// Get pass rate (0.0 to 1.0)
    #[must_use]
    pub fn pass_rate(&self) -> f64 {
        if self.total_count() == 0 {
            return 1.0;
        }
        self.passed_count() as f64 / self.total_count() as f64
    }

    /// Check if every scenario ran and passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0 && self.not_run.is_empty()
    }

    /// Get failing scenarios
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioReport> {
        self.scenarios.iter().filter(|r| !r.passed()).collect()
    }

    /// One-line summary
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}/{} scenarios passed ({:.1}%)",
            self.passed_count(),
            self.total_count(),
            self.pass_rate() * 100.0
        )
    }

    /// Plain-text report, one line per step
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for report in &self.scenarios {
            let verdict = if report.passed() { "PASS" } else { "FAIL" };
            let _ = writeln!(
                out,
                "{verdict} {} ({} steps on {}, {:.2}s simulated)",
                report.scenario,
                report.steps.len(),
                report.application,
                report.elapsed_ms as f64 / 1000.0
            );
            for step in &report.steps {
                let mark = match step.status {
                    StepStatus::Passed => "ok  ",
                    StepStatus::Failed => "FAIL",
                    StepStatus::Skipped => "skip",
                };
                let _ = writeln!(out, "  [{mark}] {:>2}. {}", step.index, step.step);
                if let Some(error) = &step.error {
                    let _ = writeln!(out, "         {error}");
                }
            }
        }
        for name in &self.not_run {
            let _ = writeln!(out, "SKIP {name} (not run)");
        }
        let _ = writeln!(out, "{}", self.summary());
        out
    }

    /// Pretty-printed JSON report
    pub fn to_json(&self) -> GroundcheckResult<String> {
        serde_json::to_string_pretty(self).map_err(GroundcheckError::from)
    }
}
