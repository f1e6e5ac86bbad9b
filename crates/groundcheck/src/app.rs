//! The application under test, as seen by the harness.
//!
//! The resolver and the scenario executor only talk to an [`Application`]:
//! they take widget tree snapshots, deliver mouse gestures to resolved
//! widgets and let time pass. Swapping the implementation swaps the system
//! under test; the bundled one is the simulated GCS in [`crate::gcs`].

use std::time::Duration;

use crate::event::MouseEvent;
use crate::result::GroundcheckResult;
use crate::widget::{WidgetId, WidgetTree};

/// An application whose UI can be inspected and driven.
///
/// All calls are blocking and happen on one thread; nothing changes in the
/// widget tree except through [`Application::send`] and
/// [`Application::advance`].
pub trait Application {
    /// Name shown in reports
    fn name(&self) -> &str;

    /// Snapshot of the live widget tree
    fn snapshot(&self) -> WidgetTree;

    /// Deliver a mouse gesture to a widget from the latest snapshot
    fn send(&mut self, target: WidgetId, event: MouseEvent) -> GroundcheckResult<()>;

    /// Time elapsed since the application started
    fn elapsed(&self) -> Duration;

    /// Let `duration` pass (simulated or real)
    fn advance(&mut self, duration: Duration);
}

/// Creates fresh application instances, one per scenario run
pub trait ApplicationFactory {
    /// Application type produced
    type App: Application;

    /// Start a new instance in its initial state
    fn launch(&self) -> GroundcheckResult<Self::App>;
}
