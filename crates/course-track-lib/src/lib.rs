//! Course Track Library - Track Parsing, Conversion and Geometry
//!
//! This library turns running-course geometry stored as GPX files, GeoJSON `LineString`
//! values or WKT text into a normalized sequence of [`TrackPoint`]s, and computes the
//! metadata the course pages need (bounds, center, path length).
//!
//! # Architecture
//!
//! - **[`parse_gpx`] / [`parse_gpx_with`]**: Streaming GPX reader with a strict or lenient
//!   policy for invalid points ([`ParseOptions`])
//! - **[`parse_gpx_batch`]**: Many documents at once, in parallel
//! - **[`parse_geojson`]**: GeoJSON `LineString` from text or a decoded JSON value
//! - **[`calculate_bounds`], [`calculate_center`], [`calculate_distance`]**: Geometry math
//! - **[`to_geojson_line_string`], [`to_wkt_line_string`], [`write_gpx`]**: Converters
//! - **[`load_gpx_from_url`]**: Fetch and parse a remote GPX file
//! - **[`GpxWorker`]**: Background parsing with a request/response message protocol
//!
//! All parsers, converters and math functions are pure and synchronous. Only the loader
//! and the worker need a tokio runtime.

mod geojson;
mod geometry;
mod gpx_io;
mod loader;
mod point;
mod wkt;
mod worker;

// Public API exports
pub use geojson::{GeoJsonInput, GeoJsonLineString, parse_geojson, to_geojson_line_string};
pub use geometry::{
    DISTANCE_DISPLAY_DECIMALS, EARTH_RADIUS_KM, TrackSummary, calculate_bounds, calculate_center,
    calculate_distance, haversine_km, round_distance_km, summarize,
};
pub use gpx_io::{
    InvalidPointPolicy, ParseOptions, parse_gpx, parse_gpx_batch, parse_gpx_with, write_gpx,
};
pub use loader::{LoaderConfig, load_gpx_from_url};
pub use point::{BoundingBox, Centroid, TrackPoint, TrackSequence, to_line_string};
pub use wkt::{parse_wkt_line_string, to_wkt_line_string};
pub use worker::{GpxWorker, ParseRequest, ParseResponse, handle_request};

/// Error types for track parsing and loading
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("GPX write error: {0}")]
    GpxWrite(#[from] gpx::errors::GpxError),

    #[error("GPX worker is no longer running")]
    WorkerStopped,
}

/// Coarse classification of a [`TrackError`], for callers that branch on the failure class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Validation,
    Network,
    Other,
}

impl TrackError {
    /// Coarse category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrackError::Parse(_) => ErrorKind::Parse,
            TrackError::Validation(_) => ErrorKind::Validation,
            TrackError::Network(_) => ErrorKind::Network,
            TrackError::GpxWrite(_) | TrackError::WorkerStopped => ErrorKind::Other,
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackError>;
