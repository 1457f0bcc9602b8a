//! WKT `LINESTRING` text, as stored by spatial databases
//!
//! Output is `LINESTRING(lng lat, lng lat, ...)` without elevation. Input also accepts
//! the EWKT `SRID=4326;` prefix, a `Z` tag with a third ordinate, and `LINESTRING EMPTY`.

use crate::point::check_coordinates;
use crate::{Result, TrackError, TrackPoint, TrackSequence};

const LINESTRING_KEYWORD: &str = "LINESTRING";

/// Format track points as WKT; elevation is dropped
///
/// Total over any input: an empty sequence yields `LINESTRING()`, which callers needing a
/// real line must guard against.
pub fn to_wkt_line_string(points: &[TrackPoint]) -> String {
    let pairs: Vec<String> = points
        .iter()
        .map(|p| format!("{} {}", p.lng, p.lat))
        .collect();
    format!("{LINESTRING_KEYWORD}({})", pairs.join(", "))
}

/// Parse a WKT or EWKT `LINESTRING` into track points
///
/// # Errors
/// * [`TrackError::Parse`] on anything that is not `LINESTRING [Z] (...)` / `LINESTRING EMPTY`
/// * [`TrackError::Validation`] on coordinates outside WGS84 range
pub fn parse_wkt_line_string(text: &str) -> Result<TrackSequence> {
    let mut rest = text.trim();

    // EWKT: "SRID=4326;LINESTRING(...)"
    if rest.get(..5).is_some_and(|prefix| prefix.eq_ignore_ascii_case("SRID=")) {
        let (srid, geometry) = rest
            .split_once(';')
            .ok_or_else(|| TrackError::Parse("SRID prefix without ';'".to_string()))?;
        if srid[5..].trim().parse::<u32>().is_err() {
            return Err(TrackError::Parse(format!("invalid SRID prefix {srid:?}")));
        }
        rest = geometry.trim_start();
    }

    let keyword_len = LINESTRING_KEYWORD.len();
    if !rest
        .get(..keyword_len)
        .is_some_and(|keyword| keyword.eq_ignore_ascii_case(LINESTRING_KEYWORD))
    {
        return Err(TrackError::Parse(format!(
            "expected {LINESTRING_KEYWORD}, got {:?}",
            rest.chars().take(20).collect::<String>()
        )));
    }
    rest = rest[keyword_len..].trim_start();

    let has_z = match rest.chars().next() {
        Some('Z' | 'z') => {
            rest = rest[1..].trim_start();
            true
        }
        Some('M' | 'm') => {
            return Err(TrackError::Parse(
                "measured (M) coordinates are not supported".to_string(),
            ));
        }
        _ => false,
    };

    if rest.eq_ignore_ascii_case("EMPTY") {
        return Ok(Vec::new());
    }

    let body = rest
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
        .ok_or_else(|| TrackError::Parse("expected parenthesized coordinate list".to_string()))?;
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    body.split(',')
        .enumerate()
        .map(|(index, position)| parse_position(index, position, has_z))
        .collect()
}

fn parse_position(index: usize, position: &str, has_z: bool) -> Result<TrackPoint> {
    let numbers = position
        .split_whitespace()
        .map(|n| {
            n.parse::<f64>().map_err(|_| {
                TrackError::Parse(format!("coordinate #{index}: {n:?} is not a number"))
            })
        })
        .collect::<Result<Vec<f64>>>()?;

    let (lng, lat, elevation) = match (numbers.as_slice(), has_z) {
        (&[lng, lat], false) => (lng, lat, None),
        (&[lng, lat, z], _) => (lng, lat, Some(z)),
        _ => {
            return Err(TrackError::Parse(format!(
                "coordinate #{index}: expected {} ordinates, got {}",
                if has_z { 3 } else { 2 },
                numbers.len()
            )));
        }
    };

    check_coordinates(lat, lng)
        .map_err(|reason| TrackError::Validation(format!("coordinate #{index}: {reason}")))?;

    Ok(TrackPoint {
        lat,
        lng,
        elevation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_wkt() {
        let wkt = to_wkt_line_string(&[TrackPoint::new(1.0, 2.0), TrackPoint::new(3.0, 4.0)]);
        assert_eq!(wkt, "LINESTRING(2 1, 4 3)");
    }

    #[test]
    fn test_to_wkt_drops_elevation_and_keeps_precision() {
        let wkt = to_wkt_line_string(&[TrackPoint::with_elevation(37.5283, 126.9326, 12.0)]);
        assert_eq!(wkt, "LINESTRING(126.9326 37.5283)");
    }

    #[test]
    fn test_to_wkt_empty() {
        assert_eq!(to_wkt_line_string(&[]), "LINESTRING()");
    }

    #[test]
    fn test_parse_wkt() {
        let points = parse_wkt_line_string("LINESTRING(2 1, 4 3)").unwrap();
        assert_eq!(
            points,
            vec![TrackPoint::new(1.0, 2.0), TrackPoint::new(3.0, 4.0)]
        );
    }

    #[test]
    fn test_parse_inverts_write() {
        let points = vec![
            TrackPoint::new(37.5283, 126.9326),
            TrackPoint::new(37.529, 126.934),
        ];
        let parsed = parse_wkt_line_string(&to_wkt_line_string(&points)).unwrap();
        assert_eq!(parsed, points);
        assert!(parse_wkt_line_string("LINESTRING()").unwrap().is_empty());
    }

    #[test]
    fn test_parse_ewkt_and_z() {
        let points =
            parse_wkt_line_string("SRID=4326;linestring z (126.9 37.5 10, 127.0 37.6 11.5)")
                .unwrap();
        assert_eq!(points[0], TrackPoint::with_elevation(37.5, 126.9, 10.0));
        assert_eq!(points[1].elevation, Some(11.5));
    }

    #[test]
    fn test_parse_empty_keyword() {
        assert!(parse_wkt_line_string("LINESTRING EMPTY").unwrap().is_empty());
    }

    #[test]
    fn test_parse_errors() {
        for text in [
            "POINT(1 2)",
            "LINESTRING(1 2, 3)",
            "LINESTRING(1 2, 3 4",
            "LINESTRING Z (1 2, 3 4)",
            "LINESTRING M (1 2 3)",
            "LINESTRING(a b)",
            "SRID=abc;LINESTRING(1 2)",
        ] {
            let err = parse_wkt_line_string(text).unwrap_err();
            assert!(matches!(err, TrackError::Parse(_)), "{text}: {err:?}");
        }

        let err = parse_wkt_line_string("LINESTRING(1 95)").unwrap_err();
        assert!(matches!(err, TrackError::Validation(_)), "{err:?}");
    }
}
