//! The GCS main window as a live widget tree.
//!
//! The window is re-rendered from the simulator state on every snapshot.
//! Widgets that react to input are recorded as controls while rendering;
//! an event sent to any widget bubbles up to the nearest control.

use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

use super::geo::GeoCoordinate;
use super::map::MapController;
use super::state_machine::UasState;
use super::telemetry::{Telemetry, TelemetrySimulator};
use crate::app::{Application, ApplicationFactory};
use crate::clock::SimulatedClock;
use crate::config::HarnessConfig;
use crate::event::{MouseButton, MouseEvent};
use crate::result::{GroundcheckError, GroundcheckResult};
use crate::widget::{Point, Widget, WidgetId, WidgetTree};

/// Window size
pub const WINDOW_WIDTH: i32 = 1280;
/// Window height
pub const WINDOW_HEIGHT: i32 = 800;
/// Map view width
pub const MAP_WIDTH: i32 = 1280;
/// Map view height
pub const MAP_HEIGHT: i32 = 560;

/// Horizontal drag needed to confirm a slider
pub const SLIDE_CONFIRM_DISTANCE: i32 = 350;

const BACKGROUND: &str = "#1e1e1e";
const PANEL: &str = "#2d2d2d";
const DATA_LABEL: &str = "#252525";
const BUTTON: &str = "#3a3a3a";
const SLIDER_HANDLE: &str = "#ffffff";
const WAYPOINT_HANDLE: &str = "#f0f0f0";
const WAYPOINT_ICON: &str = "/images/Waypoint.png";
const UAS_ICON: &str = "/images/Drone.png";

/// Command behind an action button or the action slider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Take off from the ground
    TakeOff,
    /// Land at the current position
    Land,
    /// Choose and fly to a waypoint
    GoTo,
}

impl Action {
    const fn label(self) -> &'static str {
        match self {
            Self::TakeOff => "TAKE OFF",
            Self::Land => "LAND",
            Self::GoTo => "GO TO",
        }
    }

    fn enabled_in(self, state: UasState) -> bool {
        match self {
            Self::TakeOff => state == UasState::Landed,
            Self::Land | Self::GoTo => state.is_flyable(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Button(Action),
    ActionSlider,
    WaypointSlider,
    Map,
}

/// Waypoint selection flow
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct WaypointFlow {
    /// Confirmation panel open
    selecting: bool,
    /// Destination picked on the map
    destination: Option<GeoCoordinate>,
    /// Route to the confirmed destination drawn on the map
    route: bool,
}

/// Headless ground control station
#[derive(Debug, Clone)]
pub struct GcsApp {
    simulator: TelemetrySimulator,
    map: MapController,
    clock: SimulatedClock,
    armed: Option<Action>,
    waypoint: WaypointFlow,
}

impl Default for GcsApp {
    fn default() -> Self {
        Self::new(&HarnessConfig::default())
    }
}

impl GcsApp {
    /// Start landed at home
    #[must_use]
    pub fn new(config: &HarnessConfig) -> Self {
        let simulator = TelemetrySimulator::new(config.seed, config.tick_ms);
        let map = MapController::centered_on(simulator.telemetry().position);
        Self {
            simulator,
            map,
            clock: SimulatedClock::new(config.tick_ms),
            armed: None,
            waypoint: WaypointFlow::default(),
        }
    }

    /// The simulated UAS
    #[must_use]
    pub const fn simulator(&self) -> &TelemetrySimulator {
        &self.simulator
    }

    /// The map view
    #[must_use]
    pub const fn map(&self) -> &MapController {
        &self.map
    }

    /// Action waiting for slide-to-confirm
    #[must_use]
    pub const fn armed(&self) -> Option<Action> {
        self.armed
    }

    fn render(&self) -> (WidgetTree, HashMap<WidgetId, Control>) {
        let mut ui = Renderer::default();
        let state = self.simulator.state();
        let telemetry = self.simulator.telemetry();

        let window = ui.tree.push_root(
            Widget::new("QQuickWindowQmlImpl")
                .with_title("GCS")
                .with_bounds(0, 0, WINDOW_WIDTH, WINDOW_HEIGHT),
        );
        let root = ui.tree.push_child(
            window,
            Widget::new("Rectangle")
                .with_id("root")
                .with_color(BACKGROUND)
                .with_bounds(0, 0, WINDOW_WIDTH, WINDOW_HEIGHT),
        );

        self.render_map(&mut ui, root, telemetry);
        render_status(&mut ui, root, state);
        render_telemetry(&mut ui, root, telemetry);
        render_buttons(&mut ui, root, state);
        self.render_action_slider(&mut ui, root);
        self.render_waypoint_panel(&mut ui, root);

        (ui.tree, ui.controls)
    }

    fn render_map(&self, ui: &mut Renderer, root: WidgetId, telemetry: &Telemetry) {
        let map = ui.control(
            root,
            Widget::new("GeoMap")
                .with_id("map")
                .with_bounds(0, 0, MAP_WIDTH, MAP_HEIGHT),
            Control::Map,
        );
        let dest = self.waypoint.destination.map(|d| self.map.geo_to_pixel(d, MAP_WIDTH, MAP_HEIGHT));
        let dest_at = dest.unwrap_or(Point::new(0, 0));
        let _ = ui.tree.push_child(
            map,
            Widget::new("Image")
                .with_id("destIcon")
                .with_source(WAYPOINT_ICON)
                .with_visible(dest.is_some())
                .with_bounds(dest_at.x - 16, dest_at.y - 32, 32, 32),
        );
        let uas = self.map.geo_to_pixel(telemetry.position, MAP_WIDTH, MAP_HEIGHT);
        let _ = ui.tree.push_child(
            map,
            Widget::new("Image")
                .with_id("uasIcon")
                .with_source(UAS_ICON)
                .with_bounds(uas.x - 20, uas.y - 20, 40, 40),
        );
        let _ = ui.tree.push_child(
            map,
            Widget::new("MapPolyline")
                .with_id("routeLine")
                .with_visible(self.waypoint.route)
                .with_bounds(0, 0, MAP_WIDTH, MAP_HEIGHT),
        );
    }

    fn render_action_slider(&self, ui: &mut Renderer, root: WidgetId) {
        let prompt = match self.armed {
            Some(Action::Land) => "Slide to confirm landing",
            _ => "Slide to confirm take off",
        };
        let slider = ui.tree.push_child(
            root,
            Widget::new("Rectangle")
                .with_id("actionSlider")
                .with_color(PANEL)
                .with_visible(self.armed.is_some())
                .with_bounds(340, 440, 600, 100),
        );
        let _ = ui.tree.push_child(
            slider,
            Widget::new("Text").with_text(prompt).with_bounds(80, 10, 440, 24),
        );
        let handle = ui.control(
            slider,
            Widget::new("Rectangle")
                .with_color(SLIDER_HANDLE)
                .with_bounds(10, 50, 60, 40),
            Control::ActionSlider,
        );
        let _ = ui.tree.push_child(
            handle,
            Widget::new("Text").with_text("→").with_bounds(15, 8, 30, 24),
        );
    }

    fn render_waypoint_panel(&self, ui: &mut Renderer, root: WidgetId) {
        let chosen = self.waypoint.destination.is_some();
        let panel = ui.tree.push_child(
            root,
            Widget::new("Rectangle")
                .with_id("goToWaypointConfirmation")
                .with_color(PANEL)
                .with_visible(self.waypoint.selecting)
                .with_bounds(340, 120, 600, 300),
        );
        let _ = ui.tree.push_child(
            panel,
            Widget::new("Text").with_text("GO TO WAYPOINT").with_bounds(20, 20, 560, 32),
        );
        for (i, text) in ["UAS", "→", "WP"].iter().enumerate() {
            let _ = ui.tree.push_child(
                panel,
                Widget::new("Text")
                    .with_text(*text)
                    .with_bounds(220 + i as i32 * 60, 80, 40, 24),
            );
        }
        let hint = if chosen {
            "Slide to confirm the route"
        } else {
            "Select a destination on the map"
        };
        let _ = ui.tree.push_child(
            panel,
            Widget::new("Text").with_text(hint).with_bounds(20, 140, 560, 24),
        );
        let handle = ui.control(
            panel,
            Widget::new("Rectangle")
                .with_color(WAYPOINT_HANDLE)
                .with_enabled(chosen)
                .with_bounds(20, 220, 60, 40),
            Control::WaypointSlider,
        );
        let _ = ui.tree.push_child(
            handle,
            Widget::new("Text")
                .with_text("→")
                .with_enabled(chosen)
                .with_bounds(15, 8, 30, 24),
        );
    }

    fn press(&mut self, control: Control, event: MouseEvent) -> GroundcheckResult<()> {
        match (control, event) {
            (Control::Button(Action::GoTo), MouseEvent::Click { .. }) => {
                self.armed = None;
                self.waypoint = WaypointFlow {
                    selecting: true,
                    ..WaypointFlow::default()
                };
                self.map.set_center(self.simulator.telemetry().position);
                let _ = self.map.set_interactive(true);
                info!("waypoint selection started");
            }
            (Control::Button(action), MouseEvent::Click { .. }) => {
                self.armed = Some(action);
                self.waypoint.selecting = false;
                let _ = self.map.set_interactive(false);
                info!(action = action.label(), "action armed");
            }
            (Control::Map, MouseEvent::Click { at, .. }) => {
                if self.map.is_interactive() {
                    let destination = self.map.pixel_to_geo(at, MAP_WIDTH, MAP_HEIGHT);
                    let _ = self.map.set_target(destination);
                    self.waypoint.destination = Some(destination);
                    info!(%destination, "destination selected");
                } else {
                    debug!("map click ignored outside waypoint selection");
                }
            }
            (Control::ActionSlider, MouseEvent::Drag { delta, .. }) => {
                if delta.x >= SLIDE_CONFIRM_DISTANCE {
                    let accepted = match self.armed.take() {
                        Some(Action::TakeOff) => self.simulator.take_off(),
                        Some(Action::Land) => {
                            self.waypoint.route = false;
                            self.simulator.land()
                        }
                        Some(Action::GoTo) | None => false,
                    };
                    debug!(accepted, "action slider confirmed");
                } else {
                    debug!(dx = delta.x, "action slider released early");
                }
            }
            (Control::WaypointSlider, MouseEvent::Drag { delta, .. }) => {
                if delta.x >= SLIDE_CONFIRM_DISTANCE {
                    if let Some(destination) = self.waypoint.destination {
                        let accepted = self.simulator.go_to(destination);
                        self.waypoint.selecting = false;
                        self.waypoint.route = accepted;
                        let _ = self.map.set_interactive(false);
                        debug!(accepted, "route confirmed");
                    }
                } else {
                    debug!(dx = delta.x, "waypoint slider released early");
                }
            }
            (control, event) => debug!(?control, %event, "gesture has no effect"),
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Renderer {
    tree: WidgetTree,
    controls: HashMap<WidgetId, Control>,
}

impl Renderer {
    fn control(&mut self, parent: WidgetId, widget: Widget, control: Control) -> WidgetId {
        let id = self.tree.push_child(parent, widget);
        let _ = self.controls.insert(id, control);
        id
    }
}

fn render_status(ui: &mut Renderer, root: WidgetId, state: UasState) {
    let panel = ui.tree.push_child(
        root,
        Widget::new("Rectangle")
            .with_id("statusPanel")
            .with_color(PANEL)
            .with_bounds(0, MAP_HEIGHT, 320, 240),
    );
    for (i, text) in ["UAS STATUS", state.label(), "Connected"].iter().enumerate() {
        let _ = ui.tree.push_child(
            panel,
            Widget::new("Text")
                .with_text(*text)
                .with_bounds(20, 20 + i as i32 * 60, 280, 32),
        );
    }
}

fn render_telemetry(ui: &mut Renderer, root: WidgetId, t: &Telemetry) {
    let panel = ui.tree.push_child(
        root,
        Widget::new("Rectangle")
            .with_id("telemetryPanel")
            .with_color(PANEL)
            .with_bounds(320, MAP_HEIGHT, 680, 240),
    );
    let rows = [
        ("Battery", format!("{} %", t.battery)),
        ("Altitude", format!("{} m", t.altitude)),
        ("Speed", format!("{} m/s", t.speed)),
        ("Heading", format!("{:.0}°", t.heading())),
        ("Latitude", format!("{:.6}", t.position.latitude)),
        ("Longitude", format!("{:.6}", t.position.longitude)),
        ("Loiter Radius", format!("{} m", t.loiter_radius)),
        (
            "Loiter Direction",
            if t.loiter_clockwise { "Clockwise" } else { "Counter-clockwise" }.to_string(),
        ),
    ];
    for (i, (title, value)) in rows.into_iter().enumerate() {
        let i = i as i32;
        let label = ui.tree.push_child(
            panel,
            Widget::new("DataLabel")
                .with_color(DATA_LABEL)
                .with_bounds(10 + (i % 4) * 165, 10 + (i / 4) * 115, 160, 110),
        );
        let _ = ui.tree.push_child(label, Widget::new("Text").with_text(title).with_bounds(10, 10, 140, 24));
        let _ = ui.tree.push_child(label, Widget::new("Text").with_text(value).with_bounds(10, 50, 140, 40));
    }
}

fn render_buttons(ui: &mut Renderer, root: WidgetId, state: UasState) {
    for (i, action) in [Action::TakeOff, Action::Land, Action::GoTo].into_iter().enumerate() {
        let visible = action == Action::TakeOff || state.is_airborne();
        let button = ui.control(
            root,
            Widget::new("Rectangle")
                .with_id("buttonRect")
                .with_color(BUTTON)
                .with_visible(visible)
                .with_enabled(action.enabled_in(state))
                .with_bounds(1020, MAP_HEIGHT + i as i32 * 80, 240, 80),
            Control::Button(action),
        );
        let _ = ui.tree.push_child(
            button,
            Widget::new("Text").with_text(action.label()).with_bounds(60, 28, 120, 24),
        );
    }
}

impl Application for GcsApp {
    fn name(&self) -> &str {
        "GCS"
    }

    fn snapshot(&self) -> WidgetTree {
        self.render().0
    }

    fn send(&mut self, target: WidgetId, event: MouseEvent) -> GroundcheckResult<()> {
        let (tree, controls) = self.render();
        let widget = tree.widget(target)?;
        let rejected = |message: &str| GroundcheckError::InputRejected {
            object: format!("{} {target}", widget.type_name),
            message: message.to_string(),
        };
        if !tree.is_visible(target) {
            return Err(rejected("widget is hidden"));
        }
        if !widget.bounds.contains_local(event.origin()) {
            return Err(rejected(&format!(
                "{event} starts outside the {}x{} widget",
                widget.bounds.width, widget.bounds.height
            )));
        }
        let Some((control_id, control)) = std::iter::once(target)
            .chain(tree.ancestors(target))
            .find_map(|id| controls.get(&id).map(|c| (id, *c)))
        else {
            debug!(widget = %target, %event, "no control under the pointer");
            return Ok(());
        };
        if !tree.get(control_id).is_some_and(|w| w.enabled) {
            return Err(rejected("control is disabled"));
        }
        if event.button() != MouseButton::Left {
            debug!(button = %event.button(), "only the left button acts");
            return Ok(());
        }
        debug!(widget = %target, ?control, %event, "input delivered");
        self.press(control, event)
    }

    fn elapsed(&self) -> Duration {
        self.clock.now()
    }

    fn advance(&mut self, duration: Duration) {
        let ticks = self.clock.advance(duration);
        self.simulator.run(ticks);
        if !self.map.is_interactive() {
            self.map.set_center(self.simulator.telemetry().position);
        }
    }
}

/// Launches a fresh [`GcsApp`] per scenario
#[derive(Debug, Clone, Default)]
pub struct GcsFactory {
    config: HarnessConfig,
}

impl GcsFactory {
    /// Factory using the given seed and tick
    #[must_use]
    pub const fn new(config: HarnessConfig) -> Self {
        Self { config }
    }
}

impl ApplicationFactory for GcsFactory {
    type App = GcsApp;

    fn launch(&self) -> GroundcheckResult<GcsApp> {
        self.config.validate()?;
        Ok(GcsApp::new(&self.config))
    }
}
