//! Geographic coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Mean Earth radius in metres
pub const EARTH_RADIUS_M: f64 = 6_371_007.2;

/// Latitude/longitude in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoCoordinate {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

impl GeoCoordinate {
    /// Create a coordinate
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance in metres (haversine)
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = lat2 - lat1;
        let dlon = (other.longitude - self.longitude).to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
    }

    /// Initial bearing towards `other`, in degrees within `[0, 360)`
    #[must_use]
    pub fn azimuth_to(&self, other: &Self) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();
        let y = dlon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
        y.atan2(x).to_degrees().rem_euclid(360.0)
    }
}

impl fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETROIT: GeoCoordinate = GeoCoordinate::new(42.3314, -83.0458);

    #[test]
    fn test_distance_to_self_is_zero() {
        assert!(DETROIT.distance_to(&DETROIT).abs() < 1e-9);
    }

    #[test]
    fn test_one_degree_latitude() {
        let north = GeoCoordinate::new(43.3314, -83.0458);
        let d = DETROIT.distance_to(&north);
        assert!((d - 111_195.0).abs() < 100.0, "got {d}");
    }

    #[test]
    fn test_cardinal_bearings() {
        let north = GeoCoordinate::new(42.4, -83.0458);
        let east = GeoCoordinate::new(42.3314, -83.0);
        let south = GeoCoordinate::new(42.3, -83.0458);
        assert!(DETROIT.azimuth_to(&north).abs() < 1e-6);
        assert!((DETROIT.azimuth_to(&east) - 90.0).abs() < 0.1);
        assert!((DETROIT.azimuth_to(&south) - 180.0).abs() < 1e-6);
    }

    #[test]
    fn test_display() {
        assert_eq!(DETROIT.to_string(), "42.331400, -83.045800");
    }
}
