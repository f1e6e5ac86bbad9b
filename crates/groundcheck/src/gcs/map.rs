//! Map view state.

use serde::Serialize;

use super::geo::{GeoCoordinate, EARTH_RADIUS_M};
use crate::widget::Point;

/// Lowest zoom level
pub const MIN_ZOOM: i32 = 1;

/// Highest zoom level
pub const MAX_ZOOM: i32 = 20;

/// Zoom level at start-up
pub const DEFAULT_ZOOM: i32 = 15;

/// Ground resolution at the equator and zoom 0, metres per pixel
const EQUATOR_METRES_PER_PIXEL: f64 = 156_543.033_92;

/// Interactive state of the map view
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapController {
    interactive: bool,
    target: GeoCoordinate,
    zoom: i32,
    center: GeoCoordinate,
}

impl Default for MapController {
    fn default() -> Self {
        Self {
            interactive: false,
            target: GeoCoordinate::new(0.0, 0.0),
            zoom: DEFAULT_ZOOM,
            center: GeoCoordinate::default(),
        }
    }
}

impl MapController {
    /// Map centred on `center`
    #[must_use]
    pub fn centered_on(center: GeoCoordinate) -> Self {
        Self {
            center,
            ..Self::default()
        }
    }

    /// Whether clicks select a destination
    #[must_use]
    pub const fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Last selected target
    #[must_use]
    pub const fn target(&self) -> GeoCoordinate {
        self.target
    }

    /// Current zoom level
    #[must_use]
    pub const fn zoom(&self) -> i32 {
        self.zoom
    }

    /// Coordinate at the centre of the view
    #[must_use]
    pub const fn center(&self) -> GeoCoordinate {
        self.center
    }

    /// Returns whether the flag changed
    pub fn set_interactive(&mut self, interactive: bool) -> bool {
        let changed = self.interactive != interactive;
        self.interactive = interactive;
        changed
    }

    /// Returns whether the target changed
    pub fn set_target(&mut self, target: GeoCoordinate) -> bool {
        let changed = self.target != target;
        self.target = target;
        changed
    }

    /// Set the zoom, clamped to `MIN_ZOOM..=MAX_ZOOM`; returns whether it changed
    pub fn set_zoom(&mut self, level: i32) -> bool {
        let bounded = level.clamp(MIN_ZOOM, MAX_ZOOM);
        let changed = self.zoom != bounded;
        self.zoom = bounded;
        changed
    }

    /// Recentre the view
    pub fn set_center(&mut self, center: GeoCoordinate) {
        self.center = center;
    }

    /// Web-mercator ground resolution at the view centre
    #[must_use]
    pub fn metres_per_pixel(&self) -> f64 {
        EQUATOR_METRES_PER_PIXEL * self.center.latitude.to_radians().cos()
            / 2f64.powi(self.zoom)
    }

    /// Geographic position under a pixel of a `width` x `height` view
    #[must_use]
    pub fn pixel_to_geo(&self, at: Point, width: i32, height: i32) -> GeoCoordinate {
        let mpp = self.metres_per_pixel();
        let east_m = f64::from(at.x - width / 2) * mpp;
        let north_m = f64::from(height / 2 - at.y) * mpp;
        let lat = self.center.latitude.to_radians();
        GeoCoordinate::new(
            self.center.latitude + (north_m / EARTH_RADIUS_M).to_degrees(),
            self.center.longitude + (east_m / (EARTH_RADIUS_M * lat.cos())).to_degrees(),
        )
    }

    /// Pixel of a `width` x `height` view showing `coordinate`
    #[must_use]
    pub fn geo_to_pixel(&self, coordinate: GeoCoordinate, width: i32, height: i32) -> Point {
        let mpp = self.metres_per_pixel();
        let lat = self.center.latitude.to_radians();
        let north_m = (coordinate.latitude - self.center.latitude).to_radians() * EARTH_RADIUS_M;
        let east_m =
            (coordinate.longitude - self.center.longitude).to_radians() * EARTH_RADIUS_M * lat.cos();
        Point::new(
            width / 2 + (east_m / mpp).round() as i32,
            height / 2 - (north_m / mpp).round() as i32,
        )
    }
}
