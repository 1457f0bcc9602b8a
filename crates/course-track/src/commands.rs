//! Command implementations over the track library

use crate::cli::{SourceArgs, SourceFormat, TargetFormat};
use anyhow::{Context, Result, bail};
use course_track_lib::{
    ParseOptions, TrackSequence, load_gpx_from_url, parse_geojson, parse_gpx_with,
    parse_wkt_line_string, summarize, to_geojson_line_string, to_wkt_line_string, write_gpx,
};

/// Parse track text of a known format
pub fn parse_text(text: &str, format: SourceFormat, options: &ParseOptions) -> Result<TrackSequence> {
    let points = match format {
        SourceFormat::Gpx => parse_gpx_with(text, options)?,
        SourceFormat::GeoJson => parse_geojson(text)?,
        SourceFormat::Wkt => parse_wkt_line_string(text)?,
    };
    Ok(points)
}

/// Read the source (file or URL) and parse it
pub async fn load_source(args: &SourceArgs) -> Result<TrackSequence> {
    let format = args.resolved_format();

    if args.is_url() {
        if format != SourceFormat::Gpx {
            bail!("only GPX can be loaded from a URL, got {format:?}");
        }
        tracing::info!("Downloading {}", args.source);
        return load_gpx_from_url(&args.source, &args.loader_config())
            .await
            .with_context(|| format!("failed to load {}", args.source));
    }

    let text = tokio::task::spawn_blocking({
        let path = args.source.clone();
        move || std::fs::read_to_string(path)
    })
    .await
    .context("file reader task failed")?
    .with_context(|| format!("failed to read {}", args.source))?;

    tracing::debug!("Read {} bytes from {} as {format:?}", text.len(), args.source);
    parse_text(&text, format, &args.parse_options())
        .with_context(|| format!("failed to parse {}", args.source))
}

/// Render the summary as pretty JSON
pub fn render_summary(points: &TrackSequence) -> Result<String> {
    Ok(serde_json::to_string_pretty(&summarize(points))?)
}

/// Render points in the requested output format
pub fn render_conversion(
    points: &TrackSequence,
    target: TargetFormat,
    name: Option<&str>,
) -> Result<String> {
    let output = match target {
        TargetFormat::GeoJson => to_geojson_line_string(points).to_json_string(),
        TargetFormat::Wkt => to_wkt_line_string(points),
        TargetFormat::Gpx => write_gpx(points, name)?,
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use course_track_lib::{TrackError, TrackPoint};

    const GPX: &str = r#"<gpx><trk><trkseg><trkpt lat="0" lon="0"/><trkpt lat="0" lon="1"/></trkseg></trk></gpx>"#;

    #[test]
    fn test_parse_each_format() {
        let strict = ParseOptions::strict();
        let expected = vec![TrackPoint::new(0.0, 0.0), TrackPoint::new(0.0, 1.0)];

        assert_eq!(parse_text(GPX, SourceFormat::Gpx, &strict).unwrap(), expected);
        assert_eq!(
            parse_text(
                r#"{"type":"LineString","coordinates":[[0,0],[1,0]]}"#,
                SourceFormat::GeoJson,
                &strict
            )
            .unwrap(),
            expected
        );
        assert_eq!(
            parse_text("LINESTRING(0 0, 1 0)", SourceFormat::Wkt, &strict).unwrap(),
            expected
        );
    }

    #[test]
    fn test_library_error_is_preserved() {
        let err = parse_text("<gpx>", SourceFormat::Gpx, &ParseOptions::strict()).unwrap_err();
        let track_error = err.downcast_ref::<TrackError>().unwrap();
        assert!(matches!(track_error, TrackError::Parse(_)));
    }

    #[test]
    fn test_render_summary() {
        let points = parse_text(GPX, SourceFormat::Gpx, &ParseOptions::strict()).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&render_summary(&points).unwrap()).unwrap();
        assert_eq!(json["pointCount"], 2);
        assert_eq!(json["distanceKmDisplay"], 111.19);
        assert_eq!(json["bounds"]["maxLng"], 1.0);
    }

    #[test]
    fn test_render_conversion() {
        let points = vec![TrackPoint::new(1.0, 2.0), TrackPoint::new(3.0, 4.0)];
        assert_eq!(
            render_conversion(&points, TargetFormat::Wkt, None).unwrap(),
            "LINESTRING(2 1, 4 3)"
        );
        assert_eq!(
            render_conversion(&points, TargetFormat::GeoJson, None).unwrap(),
            r#"{"type":"LineString","coordinates":[[2.0,1.0],[4.0,3.0]]}"#
        );
        let gpx = render_conversion(&points, TargetFormat::Gpx, Some("Course")).unwrap();
        assert_eq!(
            parse_text(&gpx, SourceFormat::Gpx, &ParseOptions::strict()).unwrap(),
            points
        );
    }
}
