//! Headless ground control station.
//!
//! A deterministic stand-in for the GCS desktop application: a UAS state
//! machine and telemetry simulator behind the main window's widget tree.
//! Time advances only when the harness asks it to, in fixed ticks, and all
//! randomness comes from a seeded generator, so every run of a scenario
//! with the same seed sees the same flight.

pub mod geo;
pub mod map;
pub mod rng;
pub mod state_machine;
pub mod telemetry;
pub mod ui;

pub use geo::GeoCoordinate;
pub use map::MapController;
pub use rng::DeterministicRng;
pub use state_machine::{StateChange, UasState, UasStateMachine};
pub use telemetry::{Telemetry, TelemetrySimulator};
pub use ui::{Action, GcsApp, GcsFactory};
