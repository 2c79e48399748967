//! Geographic locations and the geometry used to describe them in prompts.
//!
//! The selector treats `(lat, lon)` as a flat plane; this module is where
//! distances and bearings are computed on the ellipsoid instead, for the
//! human-readable "Nearby Places" block of a prompt.

pub mod nearby;

use std::fmt;

use geo::{GeodesicDistance, HaversineBearing};
use serde::{Deserialize, Serialize};

use crate::diversity::Point;

pub use nearby::{describe_nearby, NearbyPlace, MAX_NEARBY_PLACES};

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Planar point `(lat, lon)` for spread-out selection.
    pub fn to_point(self) -> Point {
        Point::new(self.lat, self.lon)
    }

    fn to_geo(self) -> geo::Point<f64> {
        geo::Point::new(self.lon, self.lat)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lon)
    }
}

/// Geodesic distance between two locations on the WGS84 ellipsoid, in km.
pub fn geodesic_distance_km(from: Location, to: Location) -> f64 {
    from.to_geo().geodesic_distance(&to.to_geo()) / 1000.0
}

/// Initial great-circle bearing from `from` to `to`, in `[0, 360)` degrees.
///
/// Identical locations have bearing 0.
pub fn initial_bearing(from: Location, to: Location) -> f64 {
    if from == to {
        return 0.0;
    }
    let bearing = from.to_geo().haversine_bearing(to.to_geo());
    (bearing + 360.0) % 360.0
}

/// Eight-point compass rose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompassDirection {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl CompassDirection {
    const ALL: [CompassDirection; 8] = [
        CompassDirection::North,
        CompassDirection::NorthEast,
        CompassDirection::East,
        CompassDirection::SouthEast,
        CompassDirection::South,
        CompassDirection::SouthWest,
        CompassDirection::West,
        CompassDirection::NorthWest,
    ];

    /// Nearest compass direction for a bearing in degrees.
    ///
    /// Bearings exactly between two directions round to the even sector, so
    /// 22.5° is North and 67.5° is East.
    pub fn from_bearing(bearing: f64) -> Self {
        let sector = (bearing / 45.0).round_ties_even().rem_euclid(8.0) as usize;
        Self::ALL[sector % 8]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompassDirection::North => "North",
            CompassDirection::NorthEast => "North-East",
            CompassDirection::East => "East",
            CompassDirection::SouthEast => "South-East",
            CompassDirection::South => "South",
            CompassDirection::SouthWest => "South-West",
            CompassDirection::West => "West",
            CompassDirection::NorthWest => "North-West",
        }
    }
}

impl fmt::Display for CompassDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
