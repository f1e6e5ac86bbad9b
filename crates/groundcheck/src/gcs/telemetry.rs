//! Telemetry simulator.
//!
//! Drives battery, altitude, speed, position and heading from the UAS state.
//! Time only moves through [`TelemetrySimulator::tick`]; each tick runs the
//! behaviour of the current flight phase once.

use serde::Serialize;
use tracing::{debug, info};

use super::geo::GeoCoordinate;
use super::rng::DeterministicRng;
use super::state_machine::{UasState, UasStateMachine};
use crate::clock::DEFAULT_TICK_MS;

/// Duration of the take-off and landing sequences
pub const TAKEOFF_LANDING_DURATION_MS: u64 = 7_000;

/// Degrees moved per tick per m/s of speed
pub const MOVEMENT_STEP: f64 = 0.000_01;

/// Distance at which a destination counts as reached
pub const ARRIVAL_RADIUS_M: f64 = 50.0;

/// Speed reached at the end of take-off
pub const TAKEOFF_SPEED: i32 = 40;

/// Speed above which the UAS starts climbing
pub const ROTATION_SPEED: i32 = 10;

/// Chance per tick of losing one battery percent
pub const BATTERY_DRAIN_CHANCE: f64 = 0.02;

/// Metres per degree of latitude
const METRES_PER_DEGREE: f64 = 111_000.0;

/// Where the simulated UAS starts
pub const HOME: GeoCoordinate = GeoCoordinate::new(42.3314, -83.0458);

/// Observable telemetry values
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Telemetry {
    /// Battery charge, percent
    pub battery: i32,
    /// Altitude, metres
    pub altitude: i32,
    /// Ground speed, m/s
    pub speed: i32,
    /// Current position
    pub position: GeoCoordinate,
    /// Heading in degrees
    pub direction: f64,
    /// Loiter circle radius, metres
    pub loiter_radius: i32,
    /// Loiter direction
    pub loiter_clockwise: bool,
    /// Altitude climbed to during take-off, metres
    pub target_altitude: i32,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self {
            battery: 100,
            altitude: 0,
            speed: 0,
            position: HOME,
            direction: 45.0,
            loiter_radius: 100,
            loiter_clockwise: true,
            target_altitude: 120,
        }
    }
}

impl Telemetry {
    /// Heading normalised to `[0, 360)`
    #[must_use]
    pub fn heading(&self) -> f64 {
        self.direction.rem_euclid(360.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Idle,
    TakingOff { elapsed_ms: u64 },
    Landing { elapsed_ms: u64 },
    Cruising,
    Navigating { destination: GeoCoordinate },
    Loitering { circle: Vec<(GeoCoordinate, i32)>, index: usize },
}

fn lerp(from: i32, to: i32, progress: f64) -> i32 {
    from + (f64::from(to - from) * progress) as i32
}

/// 360 points around `center`, each with its tangent heading
fn loiter_circle(center: GeoCoordinate, radius_m: i32, clockwise: bool) -> Vec<(GeoCoordinate, i32)> {
    let lat_radius = f64::from(radius_m) / METRES_PER_DEGREE;
    let lon_radius = f64::from(radius_m) / (METRES_PER_DEGREE * center.latitude.to_radians().cos());
    let offset = if clockwise { 90 } else { -90 };
    (0..360)
        .map(|angle: i32| {
            let radians = f64::from(angle).to_radians();
            let point = GeoCoordinate::new(
                center.latitude + lat_radius * radians.cos(),
                center.longitude + lon_radius * radians.sin(),
            );
            (point, (angle + offset) % 360)
        })
        .collect()
}

/// Simulated UAS: state machine plus telemetry
#[derive(Debug, Clone)]
pub struct TelemetrySimulator {
    state_machine: UasStateMachine,
    telemetry: Telemetry,
    rng: DeterministicRng,
    phase: Phase,
    destination: Option<GeoCoordinate>,
    tick_ms: u64,
}

impl Default for TelemetrySimulator {
    fn default() -> Self {
        Self::new(42, DEFAULT_TICK_MS)
    }
}

impl TelemetrySimulator {
    /// Landed at home with full battery
    #[must_use]
    pub fn new(seed: u64, tick_ms: u64) -> Self {
        Self {
            state_machine: UasStateMachine::new(),
            telemetry: Telemetry::default(),
            rng: DeterministicRng::new(seed),
            phase: Phase::Idle,
            destination: None,
            tick_ms: tick_ms.max(1),
        }
    }

    /// Current telemetry
    #[must_use]
    pub const fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    /// Current flight state
    #[must_use]
    pub const fn state(&self) -> UasState {
        self.state_machine.current()
    }

    /// The state machine and its change log
    #[must_use]
    pub const fn state_machine(&self) -> &UasStateMachine {
        &self.state_machine
    }

    /// Last commanded destination
    #[must_use]
    pub const fn destination(&self) -> Option<GeoCoordinate> {
        self.destination
    }

    /// Start the take-off sequence from `Landed`
    pub fn take_off(&mut self) -> bool {
        if !self.state_machine.take_off() {
            return false;
        }
        self.telemetry.direction = f64::from(self.rng.bounded(360));
        self.phase = Phase::TakingOff { elapsed_ms: 0 };
        info!(heading = self.telemetry.direction, "starting take-off sequence");
        true
    }

    /// Start the landing sequence from a flying state
    pub fn land(&mut self) -> bool {
        if !self.state_machine.land() {
            return false;
        }
        self.phase = Phase::Landing { elapsed_ms: 0 };
        info!("starting landing sequence");
        true
    }

    /// Fly to `destination` and loiter there
    pub fn go_to(&mut self, destination: GeoCoordinate) -> bool {
        if !self.state().is_flyable() {
            debug!(state = %self.state(), "go-to ignored");
            return false;
        }
        info!(%destination, "navigating");
        if self.state() == UasState::Loitering {
            let _ = self.state_machine.fly();
        }
        let _ = self.state_machine.set_state(UasState::FlyingToWaypoint);
        self.destination = Some(destination);
        self.phase = Phase::Navigating { destination };
        true
    }

    /// Change the loiter radius; restarts an active loiter
    pub fn set_loiter_radius(&mut self, radius_m: i32) {
        if self.telemetry.loiter_radius != radius_m {
            self.telemetry.loiter_radius = radius_m;
            self.restart_loiter();
        }
    }

    /// Change the loiter direction; restarts an active loiter
    pub fn set_loiter_clockwise(&mut self, clockwise: bool) {
        if self.telemetry.loiter_clockwise != clockwise {
            self.telemetry.loiter_clockwise = clockwise;
            self.restart_loiter();
        }
    }

    /// Change the take-off target altitude
    pub fn set_target_altitude(&mut self, altitude_m: i32) {
        self.telemetry.target_altitude = altitude_m;
    }

    fn restart_loiter(&mut self) {
        if let (UasState::Loitering, Some(center)) = (self.state(), self.destination) {
            self.start_loiter(center);
        }
    }

    fn start_loiter(&mut self, center: GeoCoordinate) {
        let _ = self.state_machine.loiter();
        self.phase = Phase::Loitering {
            circle: loiter_circle(
                center,
                self.telemetry.loiter_radius,
                self.telemetry.loiter_clockwise,
            ),
            index: 0,
        };
    }

    /// Run one simulation tick
    pub fn tick(&mut self) {
        match &mut self.phase {
            Phase::Idle => {}
            Phase::TakingOff { elapsed_ms } => {
                *elapsed_ms += self.tick_ms;
                let elapsed = *elapsed_ms;
                self.tick_take_off(elapsed);
            }
            Phase::Landing { elapsed_ms } => {
                *elapsed_ms += self.tick_ms;
                let elapsed = *elapsed_ms;
                self.tick_landing(elapsed);
            }
            Phase::Cruising => self.tick_cruise(),
            Phase::Navigating { destination } => {
                let destination = *destination;
                self.tick_navigation(destination);
            }
            Phase::Loitering { circle, index } => {
                if let Some((point, heading)) = circle.get(*index).copied() {
                    *index = if self.telemetry.loiter_clockwise {
                        (*index + 1) % circle.len()
                    } else {
                        (*index + circle.len() - 1) % circle.len()
                    };
                    self.tick_loiter(point, heading);
                }
            }
        }
    }

    /// Run `ticks` ticks
    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    fn tick_take_off(&mut self, elapsed_ms: u64) {
        let progress = elapsed_ms as f64 / TAKEOFF_LANDING_DURATION_MS as f64;
        let t = &mut self.telemetry;
        t.speed = lerp(t.speed, TAKEOFF_SPEED, progress);
        if t.speed > ROTATION_SPEED {
            t.altitude = lerp(t.altitude, t.target_altitude, progress);
        }
        self.drain_battery();
        self.update_position();
        if elapsed_ms >= TAKEOFF_LANDING_DURATION_MS {
            let _ = self.state_machine.set_state(UasState::Flying);
            self.phase = Phase::Cruising;
            info!(
                altitude = self.telemetry.altitude,
                speed = self.telemetry.speed,
                position = %self.telemetry.position,
                "take-off complete"
            );
        }
    }

    fn tick_landing(&mut self, elapsed_ms: u64) {
        let progress = elapsed_ms as f64 / TAKEOFF_LANDING_DURATION_MS as f64;
        let t = &mut self.telemetry;
        t.speed = lerp(t.speed, 0, progress);
        t.altitude = lerp(t.altitude, 0, progress);
        self.update_position();
        self.drain_battery();
        if elapsed_ms >= TAKEOFF_LANDING_DURATION_MS {
            self.telemetry.speed = 0;
            self.telemetry.altitude = 0;
            let _ = self.state_machine.set_state(UasState::Landed);
            self.phase = Phase::Idle;
            info!(position = %self.telemetry.position, "landed");
        }
    }

    fn tick_cruise(&mut self) {
        let speed_adjust = self.rng.variation(2.0);
        let alt_adjust = self.rng.variation(3.0);
        let t = &mut self.telemetry;
        t.speed = (t.speed + speed_adjust).clamp(38, 42);
        t.altitude = (t.altitude + alt_adjust).clamp(100, 135);
        self.update_position();
        self.drain_battery();
    }

    fn tick_navigation(&mut self, destination: GeoCoordinate) {
        let position = self.telemetry.position;
        self.telemetry.direction = position.azimuth_to(&destination);
        let distance = position.distance_to(&destination);
        if distance < ARRIVAL_RADIUS_M {
            info!(%destination, "destination reached");
            self.start_loiter(destination);
            return;
        }
        self.update_position();
        self.drain_battery();
    }

    fn tick_loiter(&mut self, point: GeoCoordinate, heading: i32) {
        self.telemetry.position = point;
        self.telemetry.direction = f64::from(heading);
        let alt_adjust = self.rng.variation(1.0);
        let speed_adjust = self.rng.variation(1.0);
        let t = &mut self.telemetry;
        t.altitude = (t.altitude + alt_adjust).clamp(100, 110);
        t.speed = (t.speed + speed_adjust).clamp(15, 20);
        self.drain_battery();
    }

    fn update_position(&mut self) {
        let t = &mut self.telemetry;
        let radians = t.direction.to_radians();
        let step = MOVEMENT_STEP * f64::from(t.speed);
        t.position = GeoCoordinate::new(
            t.position.latitude + step * radians.cos(),
            t.position.longitude + step * radians.sin(),
        );
    }

    fn drain_battery(&mut self) {
        if self.telemetry.battery <= 0 {
            return;
        }
        if self.rng.chance(BATTERY_DRAIN_CHANCE) {
            self.telemetry.battery -= 1;
        }
    }
}
