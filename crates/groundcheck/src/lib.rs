//! Groundcheck: object-map driven UI acceptance testing for ground control
//! stations.
//!
//! Tests refer to widgets by symbolic names. An object map binds each name
//! to a set of attributes that must identify exactly one live widget; the
//! resolver finds it, waiting for it to appear when needed, and scenarios
//! drive the application through clicks, drags, waits and property
//! assertions.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────────────────┐
//! │ Scenario     │   │ Executor     │   │ Application              │
//! │ (YAML steps) │──►│ + Resolver   │──►│ snapshot / send / advance│
//! └──────────────┘   └──────┬───────┘   └────────────┬─────────────┘
//!                           │                        │
//!                    ┌──────▼───────┐       ┌────────▼─────────┐
//!                    │ Object map   │       │ Simulated GCS    │
//!                    │ (names.yaml) │       │ state + telemetry│
//!                    └──────────────┘       └──────────────────┘
//! ```
//!
//! The bundled [`gcs::GcsApp`] is a headless, deterministic GCS driven by a
//! simulated clock, so every scenario runs in microseconds and produces the
//! same report for the same seed.
//!
//! # Example
//!
//! ```
//! use groundcheck::prelude::*;
//!
//! # fn main() -> GroundcheckResult<()> {
//! let map = ObjectMap::builtin()?;
//! let config = HarnessConfig::default();
//! let executor = ScenarioExecutor::new(&map, &config);
//! let suite = SuiteRunner::new(executor, GcsFactory::new(config)).run(&builtin_scenarios()?)?;
//! assert!(suite.all_passed());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod app;
pub mod clock;
pub mod config;
pub mod event;
pub mod gcs;
pub mod object_map;
pub mod reporter;
pub mod resolver;
pub mod result;
pub mod scenario;
pub mod wait;
pub mod widget;

pub use app::{Application, ApplicationFactory};
pub use config::{HarnessConfig, WaitPolicy};
pub use object_map::{AttrValue, ObjectMap, ObjectMapEntry};
pub use reporter::{FailureMode, ScenarioReport, SuiteReport};
pub use resolver::{Resolver, WidgetHandle};
pub use result::{GroundcheckError, GroundcheckResult};
pub use scenario::{Scenario, ScenarioExecutor, Step, SuiteRunner};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::app::{Application, ApplicationFactory};
    pub use super::clock::SimulatedClock;
    pub use super::config::{HarnessConfig, WaitPolicy};
    pub use super::event::{Modifier, MouseButton, MouseEvent};
    pub use super::gcs::{GcsApp, GcsFactory, UasState};
    pub use super::object_map::{AttrValue, ObjectMap, ObjectMapEntry};
    pub use super::reporter::{FailureMode, ScenarioReport, StepStatus, SuiteReport};
    pub use super::resolver::{EntryCheck, Resolver, WidgetHandle};
    pub use super::result::{GroundcheckError, GroundcheckResult};
    pub use super::scenario::{
        builtin_scenario, builtin_scenarios, Condition, Scenario, ScenarioExecutor, Step,
        SuiteRunner,
    };
    pub use super::wait::WaitOptions;
    pub use super::widget::{Point, Widget, WidgetId, WidgetTree};
}
