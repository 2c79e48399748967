//! "Nearby Places" descriptions for prompts.
//!
//! Place names come from an external gazetteer; this module only measures
//! and formats them relative to the prompt's location.

use serde::{Deserialize, Serialize};

use super::{geodesic_distance_km, initial_bearing, CompassDirection, Location};

/// Maximum number of places listed under "Nearby Places".
pub const MAX_NEARBY_PLACES: usize = 10;

/// A named place measured from a prompt's origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyPlace {
    pub name: String,
    pub distance_km: f64,
    pub direction: CompassDirection,
}

impl NearbyPlace {
    /// Measures a named place relative to `origin`.
    pub fn measure(origin: Location, name: impl Into<String>, place: Location) -> Self {
        Self {
            name: name.into(),
            distance_km: geodesic_distance_km(origin, place),
            direction: CompassDirection::from_bearing(initial_bearing(origin, place)),
        }
    }
}

/// Formats the closest `limit` places, one per line.
///
/// Each line reads `"{distance:.1} km {direction}: {name}"` and ends in a
/// newline. Unnamed places should be passed as `"n/a"`.
pub fn describe_nearby<I, S>(origin: Location, places: I, limit: usize) -> String
where
    I: IntoIterator<Item = (S, Location)>,
    S: Into<String>,
{
    let mut measured: Vec<NearbyPlace> = places
        .into_iter()
        .map(|(name, place)| NearbyPlace::measure(origin, name, place))
        .collect();
    measured.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

    measured
        .iter()
        .take(limit)
        .map(|p| format!("{:.1} km {}: {}\n", p.distance_km, p.direction, p.name))
        .collect()
}
