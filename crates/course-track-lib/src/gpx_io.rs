//! GPX reading and writing
//!
//! Reading is a single streaming pass over the XML with `quick-xml`, so large files never
//! build a DOM. Writing goes through the `gpx` crate.
//!
//! Only `trk > trkseg > trkpt` points are collected. Any number of tracks and segments is
//! accepted, and both `<trkpt .../>` and `<trkpt ...>...</trkpt>` forms are read.

use crate::point::check_coordinates;
use crate::{Result, TrackError, TrackPoint, TrackSequence};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use rayon::prelude::*;

/// What to do with a track point whose coordinates cannot be used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidPointPolicy {
    /// Fail the whole parse with a validation error (strict)
    #[default]
    Throw,
    /// Drop the point and keep going; fail only if nothing is left (lenient)
    Skip,
}

/// Options for [`parse_gpx_with`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub on_invalid_point: InvalidPointPolicy,
}

impl ParseOptions {
    /// Strict parsing: the first invalid point fails the parse
    pub fn strict() -> Self {
        Self {
            on_invalid_point: InvalidPointPolicy::Throw,
        }
    }

    /// Lenient parsing: invalid points are dropped
    pub fn lenient() -> Self {
        Self {
            on_invalid_point: InvalidPointPolicy::Skip,
        }
    }
}

/// Parse GPX text with the strict policy
pub fn parse_gpx(xml: &str) -> Result<TrackSequence> {
    parse_gpx_with(xml, &ParseOptions::strict())
}

/// A `trkpt` whose closing tag has not been seen yet
struct PendingPoint {
    index: usize,
    depth: usize,
    coordinates: std::result::Result<(f64, f64), String>,
    elevation_text: Option<String>,
}

impl PendingPoint {
    fn from_element(element: &BytesStart, index: usize, depth: usize) -> Result<Self> {
        let mut lat: Option<String> = None;
        let mut lon: Option<String> = None;

        for attr in element.attributes() {
            let attr = attr.map_err(|e| TrackError::Parse(format!("malformed attribute: {e}")))?;
            let value = attr
                .unescape_value()
                .map_err(|e| TrackError::Parse(format!("malformed attribute value: {e}")))?;
            match attr.key.local_name().as_ref() {
                b"lat" => lat = Some(value.into_owned()),
                b"lon" => lon = Some(value.into_owned()),
                _ => {}
            }
        }

        let coordinates = match (lat, lon) {
            (None, _) => Err("missing lat attribute".to_string()),
            (_, None) => Err("missing lon attribute".to_string()),
            (Some(lat), Some(lon)) => parse_number("lat", &lat).and_then(|lat| {
                let lon = parse_number("lon", &lon)?;
                check_coordinates(lat, lon)?;
                Ok((lat, lon))
            }),
        };

        Ok(Self {
            index,
            depth,
            coordinates,
            elevation_text: None,
        })
    }
}

fn parse_number(field: &str, text: &str) -> std::result::Result<f64, String> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| format!("{field} value {text:?} is not a number"))
}

/// Accumulates points and applies the invalid-point policy
struct PointCollector {
    policy: InvalidPointPolicy,
    points: TrackSequence,
    skipped: usize,
}

impl PointCollector {
    fn finish_point(&mut self, pending: PendingPoint) -> Result<()> {
        let (lat, lng) = match pending.coordinates {
            Ok(coordinates) => coordinates,
            Err(reason) => return self.reject(pending.index, reason),
        };

        let elevation = match pending.elevation_text.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(text) => match parse_number("ele", text) {
                Ok(value) if value.is_finite() => Some(value),
                Ok(value) => {
                    self.bad_elevation(pending.index, format!("non-finite elevation {value}"))?
                }
                Err(reason) => self.bad_elevation(pending.index, reason)?,
            },
        };

        self.points.push(TrackPoint {
            lat,
            lng,
            elevation,
        });
        Ok(())
    }

    fn reject(&mut self, index: usize, reason: String) -> Result<()> {
        match self.policy {
            InvalidPointPolicy::Throw => Err(TrackError::Validation(format!(
                "invalid track point #{index}: {reason}"
            ))),
            InvalidPointPolicy::Skip => {
                tracing::debug!("Skipping invalid track point #{index}: {reason}");
                self.skipped += 1;
                Ok(())
            }
        }
    }

    /// An unreadable elevation fails strict parsing; lenient parsing keeps the point without it
    fn bad_elevation(&mut self, index: usize, reason: String) -> Result<Option<f64>> {
        match self.policy {
            InvalidPointPolicy::Throw => Err(TrackError::Validation(format!(
                "invalid track point #{index}: {reason}"
            ))),
            InvalidPointPolicy::Skip => {
                tracing::debug!("Dropping elevation of track point #{index}: {reason}");
                Ok(None)
            }
        }
    }
}

/// Parse GPX text into track points
///
/// # Errors
/// * [`TrackError::Parse`] if the XML is not well formed
/// * [`TrackError::Validation`] if a point is invalid under [`InvalidPointPolicy::Throw`],
///   or if no usable track point is found
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn parse_gpx_with(xml: &str, options: &ParseOptions) -> Result<TrackSequence> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut collector = PointCollector {
        policy: options.on_invalid_point,
        points: Vec::new(),
        skipped: 0,
    };

    let mut depth: usize = 0;
    let mut saw_root = false;
    let mut root_closed = false;
    let mut trk_depth: usize = 0;
    let mut trkseg_depth: usize = 0;
    let mut trkpt_index: usize = 0;
    let mut pending: Option<PendingPoint> = None;
    let mut in_ele = false;

    loop {
        let event = reader.read_event().map_err(|e| {
            TrackError::Parse(format!(
                "XML syntax error at byte {}: {e}",
                reader.buffer_position()
            ))
        })?;

        match event {
            Event::Start(_) | Event::Empty(_) if root_closed => {
                return Err(TrackError::Parse(
                    "content after the root element".to_string(),
                ));
            }
            Event::Text(ref text) if depth == 0 && !is_blank(text) => {
                return Err(TrackError::Parse(
                    "text outside the root element".to_string(),
                ));
            }
            Event::CData(_) if depth == 0 => {
                return Err(TrackError::Parse(
                    "CDATA outside the root element".to_string(),
                ));
            }
            Event::Start(e) => {
                depth += 1;
                saw_root = true;
                match e.local_name().as_ref() {
                    b"trk" => trk_depth += 1,
                    b"trkseg" if trk_depth > 0 => trkseg_depth += 1,
                    b"trkpt" if trkseg_depth > 0 && pending.is_none() => {
                        pending = Some(PendingPoint::from_element(&e, trkpt_index, depth)?);
                        trkpt_index += 1;
                    }
                    b"ele" => {
                        if let Some(point) = pending.as_mut() {
                            if depth == point.depth + 1 {
                                in_ele = true;
                                point.elevation_text = Some(String::new());
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => {
                saw_root = true;
                root_closed |= depth == 0;
                if e.local_name().as_ref() == b"trkpt" && trkseg_depth > 0 && pending.is_none() {
                    let point = PendingPoint::from_element(&e, trkpt_index, depth + 1)?;
                    trkpt_index += 1;
                    collector.finish_point(point)?;
                }
            }
            Event::End(e) => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    TrackError::Parse("closing tag without matching opening tag".to_string())
                })?;
                root_closed |= depth == 0;
                match e.local_name().as_ref() {
                    b"trk" => trk_depth = trk_depth.saturating_sub(1),
                    b"trkseg" if trk_depth > 0 => trkseg_depth = trkseg_depth.saturating_sub(1),
                    b"ele" => in_ele = false,
                    b"trkpt" => {
                        if let Some(point) = pending.take_if(|p| p.depth == depth + 1) {
                            collector.finish_point(point)?;
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(text) if in_ele => {
                let text = text
                    .unescape()
                    .map_err(|e| TrackError::Parse(format!("malformed text: {e}")))?;
                if let Some(buffer) = pending.as_mut().and_then(|p| p.elevation_text.as_mut()) {
                    buffer.push_str(&text);
                }
            }
            Event::CData(data) if in_ele => {
                if let Some(buffer) = pending.as_mut().and_then(|p| p.elevation_text.as_mut()) {
                    buffer.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(TrackError::Parse("document has no root element".to_string()));
    }
    if depth != 0 {
        return Err(TrackError::Parse(format!(
            "unexpected end of document: {depth} unclosed element(s)"
        )));
    }

    if collector.skipped > 0 {
        tracing::warn!(
            "Dropped {} invalid track point(s), kept {}",
            collector.skipped,
            collector.points.len()
        );
    }

    if collector.points.is_empty() {
        return Err(TrackError::Validation(
            "no track points with valid lat/lon found".to_string(),
        ));
    }

    Ok(collector.points)
}

fn is_blank(text: &[u8]) -> bool {
    text.iter().all(u8::is_ascii_whitespace)
}

/// Parse many GPX documents in parallel
///
/// Results keep the input order; one failing document does not affect the others.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn parse_gpx_batch<S: AsRef<str> + Sync>(
    documents: &[S],
    options: &ParseOptions,
) -> Vec<Result<TrackSequence>> {
    documents
        .par_iter()
        .map(|xml| parse_gpx_with(xml.as_ref(), options))
        .collect()
}

/// Serialize track points as a GPX 1.1 document with a single track and segment
///
/// Elevation is kept. The output parses back with [`parse_gpx`].
pub fn write_gpx(points: &[TrackPoint], name: Option<&str>) -> Result<String> {
    let mut segment = gpx::TrackSegment::default();
    segment.points = points
        .iter()
        .map(|p| {
            let mut waypoint = gpx::Waypoint::new(p.to_point());
            waypoint.elevation = p.elevation;
            waypoint
        })
        .collect();

    let mut track = gpx::Track::default();
    track.name = name.map(str::to_string);
    track.segments.push(segment);

    let data = gpx::Gpx {
        version: gpx::GpxVersion::Gpx11,
        creator: Some(concat!("course-track ", env!("CARGO_PKG_VERSION")).to_string()),
        tracks: vec![track],
        ..Default::default()
    };

    let mut buffer = Vec::new();
    gpx::write(&data, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
