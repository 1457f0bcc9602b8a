//! GeoJSON `LineString` reading and writing
//!
//! Coordinates are `[longitude, latitude, elevation?]` arrays, the GeoJSON order, while
//! [`TrackPoint`] exposes named `lat` / `lng` fields. Parsing is always strict: any bad
//! coordinate fails the whole call.

use crate::point::check_coordinates;
use crate::{Result, TrackError, TrackPoint, TrackSequence};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A GeoJSON `LineString` geometry object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoJsonLineString {
    #[serde(rename = "type")]
    pub geometry_type: String,
    pub coordinates: Vec<Vec<f64>>,
}

impl GeoJsonLineString {
    /// Serialize to compact JSON text
    pub fn to_json_string(&self) -> String {
        // Plain strings and finite numbers always serialize
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Serialize to a `serde_json::Value`
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Anything [`parse_geojson`] accepts
#[derive(Debug, Clone, Copy)]
pub enum GeoJsonInput<'a> {
    /// Raw JSON text, for example a database text column
    Text(&'a str),
    /// An already decoded JSON value, for example a `jsonb` column
    Value(&'a Value),
    /// A typed geometry produced by [`to_geojson_line_string`]
    LineString(&'a GeoJsonLineString),
}

impl<'a> From<&'a str> for GeoJsonInput<'a> {
    fn from(text: &'a str) -> Self {
        GeoJsonInput::Text(text)
    }
}

impl<'a> From<&'a String> for GeoJsonInput<'a> {
    fn from(text: &'a String) -> Self {
        GeoJsonInput::Text(text)
    }
}

impl<'a> From<&'a Value> for GeoJsonInput<'a> {
    fn from(value: &'a Value) -> Self {
        GeoJsonInput::Value(value)
    }
}

impl<'a> From<&'a GeoJsonLineString> for GeoJsonInput<'a> {
    fn from(line: &'a GeoJsonLineString) -> Self {
        GeoJsonInput::LineString(line)
    }
}

/// Parse a GeoJSON `LineString` into track points
///
/// # Errors
/// * [`TrackError::Parse`] if textual input is not valid JSON
/// * [`TrackError::Validation`] if the geometry is not a `LineString`, has no coordinates,
///   or contains a coordinate that is not a `[lng, lat]` / `[lng, lat, ele]` numeric array
///   within WGS84 range
pub fn parse_geojson<'a>(input: impl Into<GeoJsonInput<'a>>) -> Result<TrackSequence> {
    match input.into() {
        GeoJsonInput::Text(text) => {
            let value: Value = serde_json::from_str(text)
                .map_err(|e| TrackError::Parse(format!("invalid JSON: {e}")))?;
            parse_value(&value)
        }
        GeoJsonInput::Value(value) => parse_value(value),
        GeoJsonInput::LineString(line) => {
            check_type(&line.geometry_type)?;
            if line.coordinates.is_empty() {
                return Err(empty_coordinates());
            }
            line.coordinates
                .iter()
                .enumerate()
                .map(|(i, position)| point_from_numbers(i, position))
                .collect()
        }
    }
}

fn parse_value(value: &Value) -> Result<TrackSequence> {
    let object = value.as_object().ok_or_else(|| {
        TrackError::Validation("GeoJSON geometry must be a JSON object".to_string())
    })?;

    match object.get("type").and_then(Value::as_str) {
        Some(kind) => check_type(kind)?,
        None => {
            return Err(TrackError::Validation(
                "GeoJSON geometry has no \"type\" field".to_string(),
            ));
        }
    }

    let coordinates = match object.get("coordinates") {
        Some(Value::Array(coordinates)) => coordinates,
        Some(_) => {
            return Err(TrackError::Validation(
                "LineString \"coordinates\" must be an array".to_string(),
            ));
        }
        None => return Err(empty_coordinates()),
    };
    if coordinates.is_empty() {
        return Err(empty_coordinates());
    }

    coordinates
        .iter()
        .enumerate()
        .map(|(i, position)| {
            let numbers = position
                .as_array()
                .ok_or_else(|| invalid_position(i, "not an array"))?
                .iter()
                .map(|n| n.as_f64().ok_or_else(|| invalid_position(i, "non-numeric value")))
                .collect::<Result<Vec<f64>>>()?;
            point_from_numbers(i, &numbers)
        })
        .collect()
}

fn check_type(kind: &str) -> Result<()> {
    if kind == "LineString" {
        Ok(())
    } else {
        Err(TrackError::Validation(format!(
            "expected GeoJSON type \"LineString\", got {kind:?}"
        )))
    }
}

fn empty_coordinates() -> TrackError {
    TrackError::Validation("LineString has no coordinates".to_string())
}

fn invalid_position(index: usize, reason: &str) -> TrackError {
    TrackError::Validation(format!("invalid coordinate #{index}: {reason}"))
}

fn point_from_numbers(index: usize, numbers: &[f64]) -> Result<TrackPoint> {
    let (lng, lat, elevation) = match *numbers {
        [lng, lat] => (lng, lat, None),
        [lng, lat, elevation] => (lng, lat, Some(elevation)),
        _ => {
            return Err(invalid_position(
                index,
                &format!("expected 2 or 3 numbers, got {}", numbers.len()),
            ));
        }
    };
    check_coordinates(lat, lng).map_err(|reason| invalid_position(index, &reason))?;
    Ok(TrackPoint {
        lat,
        lng,
        elevation,
    })
}

/// Convert track points to a GeoJSON `LineString`
///
/// Elevation is dropped, so the conversion is lossy.
pub fn to_geojson_line_string(points: &[TrackPoint]) -> GeoJsonLineString {
    GeoJsonLineString {
        geometry_type: "LineString".to_string(),
        coordinates: points.iter().map(|p| vec![p.lng, p.lat]).collect(),
    }
}
