//! Command handlers
//!
//! Each handler writes its output to the given writer so it can be tested
//! without a terminal.

use groundcheck::prelude::*;
use groundcheck::scenario::builtin_names;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::commands::{CheckMapArgs, ReportFormat, RunArgs, TreeArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::{styled_check, styled_report};

fn load_map(path: Option<&Path>) -> CliResult<ObjectMap> {
    let map = match path {
        Some(path) => ObjectMap::load(path)?,
        None => ObjectMap::builtin()?,
    };
    debug!(entries = map.len(), "object map loaded");
    Ok(map)
}

/// Harness settings after applying `run` flag overrides
pub fn harness_config(config: &CliConfig, args: &RunArgs) -> CliResult<HarnessConfig> {
    let mut harness = config.harness.clone();
    if let Some(policy) = args.policy {
        harness = harness.with_wait_policy(policy.into());
    }
    if let Some(seed) = args.seed {
        harness = harness.with_seed(seed);
    }
    if let Some(timeout) = args.timeout {
        harness = harness.with_wait_timeout(timeout);
    }
    harness.validate()?;
    Ok(harness)
}

/// Scenarios selected by the `run` arguments, validated against `map`
pub fn select_scenarios(args: &RunArgs, map: &ObjectMap) -> CliResult<Vec<Scenario>> {
    let mut scenarios = Vec::new();
    if args.all || args.files.is_empty() {
        scenarios.extend(builtin_scenarios()?);
    }
    for path in &args.files {
        if !path.exists() {
            return Err(CliError::invalid_argument(format!(
                "scenario file {} does not exist",
                path.display()
            )));
        }
        scenarios.push(Scenario::load(path)?);
    }
    for scenario in &scenarios {
        scenario.validate(map)?;
    }
    Ok(scenarios)
}

/// Run scenarios and print the report; fails if any scenario did not pass
pub fn run_scenarios(config: &CliConfig, args: &RunArgs, out: &mut impl Write) -> CliResult<()> {
    let harness = harness_config(config, args)?;
    let map = load_map(args.map.as_deref())?;
    let scenarios = select_scenarios(args, &map)?;
    info!(
        scenarios = scenarios.len(),
        policy = %harness.wait_policy,
        seed = harness.seed,
        "running suite"
    );

    let mode = if args.fail_fast {
        FailureMode::FailFast
    } else {
        FailureMode::CollectAll
    };
    let executor = ScenarioExecutor::new(&map, &harness);
    let suite = SuiteRunner::new(executor, GcsFactory::new(harness.clone()))
        .with_failure_mode(mode)
        .run(&scenarios)?;

    match args.format {
        ReportFormat::Json => writeln!(out, "{}", suite.to_json()?)?,
        ReportFormat::Text if !config.verbosity.is_quiet() => write!(out, "{}", styled_report(&suite))?,
        ReportFormat::Text => {}
    }

    if suite.all_passed() {
        Ok(())
    } else {
        Err(CliError::ScenariosFailed {
            failed: suite.total_count() - suite.passed_count(),
            total: suite.total_count(),
        })
    }
}

/// List the built-in scenarios
pub fn list_scenarios(config: &CliConfig, out: &mut impl Write) -> CliResult<()> {
    for scenario in builtin_scenarios()? {
        if config.verbosity.is_quiet() {
            writeln!(out, "{}", scenario.name)?;
            continue;
        }
        writeln!(
            out,
            "{} {:>2} steps  {}",
            console::style(format!("{:<10}", scenario.name)).bold(),
            scenario.steps.len(),
            scenario.description
        )?;
        if config.verbosity.is_verbose() {
            for (i, step) in scenario.steps.iter().enumerate() {
                writeln!(out, "    {:>2}. {step}", i + 1)?;
            }
        }
    }
    Ok(())
}

/// Check every map entry against the initial widget tree.
///
/// Entries for widgets that only appear later are reported as absent;
/// only ambiguous entries fail the check.
pub fn check_map(config: &CliConfig, args: &CheckMapArgs, out: &mut impl Write) -> CliResult<()> {
    let map = load_map(args.map.as_deref())?;
    let app = GcsApp::new(&config.harness);
    let checks = Resolver::new(&map).check_all(&app.snapshot());
    let mut ambiguous = 0;
    for (name, check) in &checks {
        if matches!(check, EntryCheck::Ambiguous { .. }) {
            ambiguous += 1;
        }
        if !config.verbosity.is_quiet() {
            writeln!(out, "{}", styled_check(name, check))?;
        }
    }
    if ambiguous > 0 {
        return Err(CliError::AmbiguousEntries { count: ambiguous });
    }
    if !config.verbosity.is_quiet() {
        writeln!(out, "{} entries checked", checks.len())?;
    }
    Ok(())
}

/// Print the simulated GCS widget tree
pub fn print_tree(config: &CliConfig, args: &TreeArgs, out: &mut impl Write) -> CliResult<()> {
    let mut app = GcsApp::new(&config.harness);
    if let Some(name) = &args.after {
        if !builtin_names().any(|n| n == name) {
            return Err(CliError::invalid_argument(format!(
                "unknown scenario '{name}' (expected one of: {})",
                builtin_names().collect::<Vec<_>>().join(", ")
            )));
        }
        let map = ObjectMap::builtin()?;
        let report = ScenarioExecutor::new(&map, &config.harness).run(&builtin_scenario(name)?, &mut app);
        if let Some(step) = report.failure() {
            warn!(step = step.index, error = ?step.error, "scenario failed");
            return Err(CliError::ScenariosFailed { failed: 1, total: 1 });
        }
    }
    write!(out, "{}", app.snapshot().outline())?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn run_args() -> RunArgs {
        RunArgs {
            files: Vec::new(),
            all: false,
            policy: None,
            seed: None,
            timeout: None,
            map: None,
            format: ReportFormat::Text,
            fail_fast: false,
        }
    }

    fn quiet() -> CliConfig {
        CliConfig::new().with_verbosity(crate::config::Verbosity::Quiet)
    }

    mod run_tests {
        use super::*;

        #[test]
        fn test_builtins_pass_with_json_report() {
            let args = RunArgs {
                format: ReportFormat::Json,
                ..run_args()
            };
            let mut out = Vec::new();
            run_scenarios(&quiet(), &args, &mut out).unwrap();
            let suite: SuiteReport = serde_json::from_slice(&out).unwrap();
            assert_eq!(suite.scenarios.len(), 3);
            assert!(suite.all_passed());
        }

        #[test]
        fn test_overrides_apply() {
            let args = RunArgs {
                policy: Some(crate::commands::PolicyArg::Recorded),
                seed: Some(5),
                timeout: Some(1_000),
                ..run_args()
            };
            let harness = harness_config(&CliConfig::new(), &args).unwrap();
            assert_eq!(harness.wait_policy, WaitPolicy::Recorded);
            assert_eq!(harness.seed, 5);
            assert_eq!(harness.wait_timeout_ms, 1_000);
        }

        #[test]
        fn test_failing_file_reports_failure() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("bad.yaml");
            std::fs::write(
                &path,
                "name: bad\nsteps:\n  - action: assert_equals\n    object: gCS_Landed_Text\n    property: text\n    expected: Flying\n",
            )
            .unwrap();
            let args = RunArgs {
                files: vec![path],
                ..run_args()
            };
            let mut out = Vec::new();
            let err = run_scenarios(&CliConfig::new(), &args, &mut out).unwrap_err();
            assert!(matches!(err, CliError::ScenariosFailed { failed: 1, total: 1 }));
            assert!(String::from_utf8(out).unwrap().contains("bad"));
        }

        #[test]
        fn test_missing_file() {
            let args = RunArgs {
                files: vec![PathBuf::from("/nonexistent/s.yaml")],
                ..run_args()
            };
            let err = run_scenarios(&quiet(), &args, &mut Vec::new()).unwrap_err();
            assert!(err.to_string().contains("does not exist"));
        }

        #[test]
        fn test_all_adds_builtins_to_files() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("extra.yaml");
            std::fs::write(
                &path,
                "name: extra\nsteps:\n  - action: wait\n    seconds: 0.5\n",
            )
            .unwrap();
            let args = RunArgs {
                files: vec![path],
                all: true,
                ..run_args()
            };
            let scenarios = select_scenarios(&args, &ObjectMap::builtin().unwrap()).unwrap();
            let names: Vec<_> = scenarios.iter().map(|s| s.name.as_str()).collect();
            assert_eq!(names, vec!["take_off", "landing", "waypoint", "extra"]);
        }
    }

    mod command_tests {
        use super::*;

        #[test]
        fn test_list() {
            let mut out = Vec::new();
            list_scenarios(&quiet(), &mut out).unwrap();
            assert_eq!(String::from_utf8(out).unwrap(), "take_off\nlanding\nwaypoint\n");
        }

        #[test]
        fn test_check_builtin_map() {
            crate::output::set_colors(false);
            let mut out = Vec::new();
            check_map(&CliConfig::new(), &CheckMapArgs { map: None }, &mut out).unwrap();
            let text = String::from_utf8(out).unwrap();
            assert!(text.contains("unique    gCS_map_GeoMap"));
            assert!(text.contains("absent    gCS_Loitering_Text"));
            assert!(text.ends_with("21 entries checked\n"));
        }

        #[test]
        fn test_check_map_rejects_ambiguous_entry() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("names.yaml");
            std::fs::write(&path, "objects:\n  anyText:\n    type: Text\n    visible: true\n").unwrap();
            let err = check_map(&quiet(), &CheckMapArgs { map: Some(path) }, &mut Vec::new())
                .unwrap_err();
            assert!(matches!(err, CliError::AmbiguousEntries { count: 1 }));
        }

        #[test]
        fn test_tree_after_take_off() {
            let mut out = Vec::new();
            let args = TreeArgs {
                after: Some("take_off".to_string()),
            };
            print_tree(&CliConfig::new(), &args, &mut out).unwrap();
            let text = String::from_utf8(out).unwrap();
            assert!(text.starts_with("QQuickWindowQmlImpl title=\"GCS\""));
            assert!(text.contains("Text text=\"Flying\""));
        }

        #[test]
        fn test_tree_unknown_scenario() {
            let args = TreeArgs {
                after: Some("barrel_roll".to_string()),
            };
            let err = print_tree(&CliConfig::new(), &args, &mut Vec::new()).unwrap_err();
            assert!(err.to_string().contains("take_off, landing, waypoint"));
        }
    }
}
