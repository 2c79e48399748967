//! Extraction of coordinates from prompts and ratings from completions.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::PromptError;
use crate::location::Location;

const COORDINATES_MARKER: &str = "Coordinates: ";

static RATING_PATTERN: OnceLock<Regex> = OnceLock::new();

fn rating_pattern() -> &'static Regex {
    RATING_PATTERN.get_or_init(|| Regex::new(r"\d+\.\d+").expect("Invalid regex for ratings"))
}

/// Reads the `(lat, lon)` pair following `Coordinates: ` in a prompt.
pub fn extract_coordinates(text: &str) -> Result<Location, PromptError> {
    let start = text
        .find(COORDINATES_MARKER)
        .ok_or(PromptError::MissingCoordinates)?;
    let rest = &text[start + COORDINATES_MARKER.len()..];

    let open = rest.find('(').ok_or(PromptError::MissingCoordinates)?;
    let close = rest[open..]
        .find(')')
        .map(|i| open + i)
        .ok_or(PromptError::MissingCoordinates)?;

    let mut parts = rest[open + 1..close].split(", ");
    let lat = parse_coordinate(parts.next())?;
    let lon = parse_coordinate(parts.next())?;
    if let Some(extra) = parts.next() {
        return Err(PromptError::InvalidCoordinate(extra.to_string()));
    }

    Ok(Location::new(lat, lon))
}

fn parse_coordinate(part: Option<&str>) -> Result<f64, PromptError> {
    let raw = part.ok_or(PromptError::MissingCoordinates)?;
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| PromptError::InvalidCoordinate(raw.to_string()))
}

/// First decimal number (`X.Y`) in a model completion, if any.
///
/// Completions such as `"My answer is 7.5."` yield `Some(7.5)`; bare
/// integers are not ratings and yield `None`.
pub fn extract_rating(completion: &str) -> Option<f64> {
    rating_pattern()
        .find(completion)
        .and_then(|m| m.as_str().parse().ok())
}
