//! End-to-end runs of the bundled scenarios against the simulated GCS.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use groundcheck::prelude::*;
use std::time::Duration;

fn run(name: &str, config: &HarnessConfig) -> (ScenarioReport, GcsApp) {
    let map = ObjectMap::builtin().unwrap();
    let executor = ScenarioExecutor::new(&map, config);
    let scenario = builtin_scenario(name).unwrap();
    let mut app = GcsApp::new(config);
    let report = executor.run(&scenario, &mut app);
    (report, app)
}

fn assert_passed(report: &ScenarioReport) {
    if let Some(step) = report.failure() {
        panic!("{} failed at step {}: {:?}", report.scenario, step.index, step.error);
    }
    assert!(report.passed());
}

// ============================================================================
// Recorded journeys
// ============================================================================

#[test]
fn test_take_off_reaches_flying() {
    let (report, app) = run("take_off", &HarnessConfig::default());
    assert_passed(&report);
    assert_eq!(app.simulator().state(), UasState::Flying);
}

#[test]
fn test_landing_returns_to_landed() {
    let (report, app) = run("landing", &HarnessConfig::default());
    assert_passed(&report);
    assert_eq!(app.simulator().state(), UasState::Landed);
    assert_eq!(app.simulator().telemetry().altitude, 0);
}

#[test]
fn test_waypoint_ends_loitering() {
    let (report, app) = run("waypoint", &HarnessConfig::default());
    assert_passed(&report);
    assert_eq!(app.simulator().state(), UasState::Loitering);
    assert!(app.simulator().destination().is_some());
}

#[test]
fn test_recorded_policy_replays_exact_durations() {
    let config = HarnessConfig::default().with_wait_policy(WaitPolicy::Recorded);
    // take_off's recorded 6s ends mid-climb; the assertion then waits for Flying
    for (name, seconds) in [("take_off", 7), ("landing", 16), ("waypoint", 18)] {
        let (report, app) = run(name, &config);
        assert_passed(&report);
        assert_eq!(app.elapsed(), Duration::from_secs(seconds), "{name}");
    }
}

#[test]
fn test_poll_policy_finishes_early() {
    let (_, polled) = run("landing", &HarnessConfig::default());
    assert!(polled.elapsed() < Duration::from_secs(16));
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_same_seed_same_report() {
    let config = HarnessConfig::default().with_seed(7);
    let map = ObjectMap::builtin().unwrap();
    let executor = ScenarioExecutor::new(&map, &config);
    let scenarios = builtin_scenarios().unwrap();
    let first = SuiteRunner::new(executor.clone(), GcsFactory::new(config.clone()))
        .run(&scenarios)
        .unwrap();
    let second = SuiteRunner::new(executor, GcsFactory::new(config))
        .run(&scenarios)
        .unwrap();
    assert!(first.all_passed());
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

#[test]
fn test_scenarios_pass_for_other_seeds() {
    for seed in [1, 99, 2024] {
        let config = HarnessConfig::default().with_seed(seed);
        let map = ObjectMap::builtin().unwrap();
        let executor = ScenarioExecutor::new(&map, &config);
        let suite = SuiteRunner::new(executor, GcsFactory::new(config))
            .run(&builtin_scenarios().unwrap())
            .unwrap();
        assert!(suite.all_passed(), "seed {seed}: {}", suite.render_text());
    }
}

// ============================================================================
// Object map against the live tree
// ============================================================================

#[test]
fn test_initial_tree_resolves_landed_entries() {
    let map = ObjectMap::builtin().unwrap();
    let resolver = Resolver::new(&map);
    let checks = resolver.check_all(&GcsApp::default().snapshot());
    assert_eq!(checks.len(), map.len());
    for name in [
        "gCS_QQuickWindowQmlImpl",
        "gCS_map_GeoMap",
        "gCS_UAS_STATUS_Text",
        "gCS_root_Rectangle",
        "gCS_buttonRect_Rectangle",
        "gCS_TAKE_OFF_Text",
        "gCS_Landed_Text",
        "gCS_0_m_s_Text",
        "gCS_Connected_Text",
        "gCS_DataLabel",
        "gCS_DataLabel_2",
    ] {
        let (_, check) = checks.iter().find(|(n, _)| n == name).unwrap();
        assert!(matches!(check, EntryCheck::Unique { .. }), "{name}: {check:?}");
    }
    for name in ["gCS_Flying_Text", "gCS_Loitering_Text", "gCS_destIcon_Image"] {
        let (_, check) = checks.iter().find(|(n, _)| n == name).unwrap();
        assert!(matches!(check, EntryCheck::Absent { .. }), "{name}: {check:?}");
    }
}

#[test]
fn test_occurrence_entries_resolve_once_flying() {
    let (report, app) = run("take_off", &HarnessConfig::default());
    assert_passed(&report);
    let map = ObjectMap::builtin().unwrap();
    let resolver = Resolver::new(&map);
    let second = resolver.find_object(&app, "gCS_buttonRect_Rectangle_2").unwrap();
    let third = resolver.find_object(&app, "gCS_buttonRect_Rectangle_3").unwrap();
    assert_ne!(second.id, third.id);
    assert!(second.is_ready() && third.is_ready());
}

// ============================================================================
// Failures surface as failed test cases
// ============================================================================

#[test]
fn test_zero_timeout_fails_immediately() {
    let config = HarnessConfig::default().with_wait_timeout(0);
    let scenario = Scenario::from_yaml(
        r"
name: impatient
steps:
  - action: click
    object: gCS_buttonRect_Rectangle
    x: 146
    y: 60
  - action: drag
    object: gCS_Text
    x: 6
    y: 8
    dx: 662
    dy: 36
  - action: assert_equals
    object: gCS_Flying_Text
    property: text
    expected: Flying
",
    )
    .unwrap();
    let map = ObjectMap::builtin().unwrap();
    let executor = ScenarioExecutor::new(&map, &config);
    let mut app = GcsApp::new(&config);
    let report = executor.run(&scenario, &mut app);
    let failure = report.failure().unwrap();
    assert_eq!(failure.index, 3);
    assert!(failure.error.as_deref().unwrap().starts_with("Timed out after 0ms"));
    assert_eq!(app.simulator().state(), UasState::TakingOff);
}
