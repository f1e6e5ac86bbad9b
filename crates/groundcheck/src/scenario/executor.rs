//! Scenario execution.
//!
//! Steps run strictly in order against one application instance. The first
//! failing step aborts the scenario; the rest are reported as skipped.

use std::time::Duration;
use tracing::{debug, info, warn};

use super::schema::{Condition, Scenario, Step};
use crate::app::{Application, ApplicationFactory};
use crate::config::{HarnessConfig, WaitPolicy};
use crate::object_map::ObjectMap;
use crate::reporter::{FailureMode, ScenarioReport, StepResult, StepStatus, SuiteReport};
use crate::resolver::Resolver;
use crate::result::{GroundcheckError, GroundcheckResult};
use crate::wait::{poll_until, Probe};

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Runs scenarios against an application
#[derive(Debug, Clone)]
pub struct ScenarioExecutor<'m> {
    resolver: Resolver<'m>,
    policy: WaitPolicy,
}

impl<'m> ScenarioExecutor<'m> {
    /// Create an executor over `map` with the configured waits
    #[must_use]
    pub fn new(map: &'m ObjectMap, config: &HarnessConfig) -> Self {
        Self {
            resolver: Resolver::new(map).with_options(config.wait_options()),
            policy: config.wait_policy,
        }
    }

    /// The resolver used for lookups
    #[must_use]
    pub const fn resolver(&self) -> &Resolver<'m> {
        &self.resolver
    }

    /// Run every step of `scenario`
    pub fn run<A: Application + ?Sized>(&self, scenario: &Scenario, app: &mut A) -> ScenarioReport {
        info!(scenario = %scenario.name, application = app.name(), "running scenario");
        let started = app.elapsed();
        let mut steps = Vec::with_capacity(scenario.steps.len());
        let mut aborted = false;

        for (i, step) in scenario.steps.iter().enumerate() {
            let description = step.to_string();
            if aborted {
                steps.push(StepResult {
                    index: i + 1,
                    step: description,
                    status: StepStatus::Skipped,
                    finished_at_ms: millis(app.elapsed()),
                    duration_ms: 0,
                    error: None,
                });
                continue;
            }
            let before = app.elapsed();
            let outcome = self.execute_step(step, app);
            let after = app.elapsed();
            let (status, error) = match outcome {
                Ok(()) => {
                    debug!(step = i + 1, %description, "step passed");
                    (StepStatus::Passed, None)
                }
                Err(e) => {
                    warn!(scenario = %scenario.name, step = i + 1, error = %e, "step failed");
                    aborted = true;
                    (StepStatus::Failed, Some(e.to_string()))
                }
            };
            steps.push(StepResult {
                index: i + 1,
                step: description,
                status,
                finished_at_ms: millis(after),
                duration_ms: millis(after.saturating_sub(before)),
                error,
            });
        }

        let report = ScenarioReport {
            scenario: scenario.name.clone(),
            application: app.name().to_string(),
            steps,
            elapsed_ms: millis(app.elapsed().saturating_sub(started)),
        };
        info!(scenario = %scenario.name, passed = report.passed(), "scenario finished");
        report
    }

    /// Execute a single step
    pub fn execute_step<A: Application + ?Sized>(
        &self,
        step: &Step,
        app: &mut A,
    ) -> GroundcheckResult<()> {
        match step {
            Step::Click { object, .. } | Step::Drag { object, .. } => {
                let event = step
                    .event()
                    .ok_or_else(|| GroundcheckError::invalid_scenario(object, "not an input step"))?;
                let handle = self.resolver.wait_for_object(app, object)?;
                app.send(handle.id, event).map_err(|e| match e {
                    GroundcheckError::InputRejected { message, .. } => {
                        GroundcheckError::InputRejected {
                            object: object.clone(),
                            message,
                        }
                    }
                    other => other,
                })
            }
            Step::Wait { seconds, until } => {
                let recorded = Duration::try_from_secs_f64(*seconds).map_err(|e| {
                    GroundcheckError::invalid_scenario("wait", format!("{seconds}s: {e}"))
                })?;
                match (self.policy, until) {
                    (WaitPolicy::Poll, Some(condition)) => {
                        self.wait_until(app, condition, recorded)
                    }
                    _ => {
                        app.advance(recorded);
                        Ok(())
                    }
                }
            }
            Step::AssertEquals {
                object,
                property,
                expected,
            } => {
                let handle = self.resolver.wait_for_object_exists(app, object)?;
                let actual = handle.property(property)?;
                if expected.matches(&actual) {
                    Ok(())
                } else {
                    Err(GroundcheckError::AssertionMismatch {
                        object: object.clone(),
                        property: property.clone(),
                        expected: expected.to_string(),
                        actual: actual.to_string(),
                    })
                }
            }
        }
    }

    /// Poll `condition`; the timeout is never shorter than the recorded wait
    fn wait_until<A: Application + ?Sized>(
        &self,
        app: &mut A,
        condition: &Condition,
        recorded: Duration,
    ) -> GroundcheckResult<()> {
        let base = *self.resolver.options();
        let options = base.with_timeout(base.timeout_ms.max(millis(recorded)));
        poll_until(app, &options, &condition.to_string(), |a| {
            let handle = match self.resolver.find_object(a, &condition.object) {
                Ok(handle) => handle,
                Err(e) if e.is_retryable() => return Ok(Probe::Pending(e.to_string())),
                Err(e) => return Err(e),
            };
            match (&condition.property, &condition.equals) {
                (Some(property), Some(expected)) => {
                    let actual = handle.property(property)?;
                    Ok(if expected.matches(&actual) {
                        Probe::Ready(())
                    } else {
                        Probe::Pending(format!("{property} is {actual}"))
                    })
                }
                _ => Ok(Probe::Ready(())),
            }
        })
    }
}

/// Runs several scenarios, each against a freshly launched application
#[derive(Debug)]
pub struct SuiteRunner<'m, F: ApplicationFactory> {
    executor: ScenarioExecutor<'m>,
    factory: F,
    mode: FailureMode,
}

impl<'m, F: ApplicationFactory> SuiteRunner<'m, F> {
    /// Create a runner that collects every failure
    pub fn new(executor: ScenarioExecutor<'m>, factory: F) -> Self {
        Self {
            executor,
            factory,
            mode: FailureMode::CollectAll,
        }
    }

    /// Set the failure mode
    #[must_use]
    pub fn with_failure_mode(mut self, mode: FailureMode) -> Self {
        self.mode = mode;
        self
    }

    /// Run `scenarios` in order.
    ///
    /// Fails only if an application cannot be launched; scenario failures
    /// are part of the report.
    pub fn run(&self, scenarios: &[Scenario]) -> GroundcheckResult<SuiteReport> {
        let mut suite = SuiteReport::new();
        let mut remaining = scenarios.iter();
        for scenario in remaining.by_ref() {
            let mut app = self.factory.launch()?;
            let report = self.executor.run(scenario, &mut app);
            if !suite.record(report, self.mode) {
                break;
            }
        }
        suite.not_run = remaining.map(|s| s.name.clone()).collect();
        Ok(suite)
    }
}
