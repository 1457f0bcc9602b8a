//! Command-line arguments and environment overrides

use clap::{Parser, Subcommand, ValueEnum};
use course_track_lib::{LoaderConfig, ParseOptions};
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding the download timeout, in seconds
pub const TIMEOUT_ENV: &str = "COURSE_TRACK_TIMEOUT_SECS";
/// Environment variable overriding the HTTP User-Agent
pub const USER_AGENT_ENV: &str = "COURSE_TRACK_USER_AGENT";

/// Generic function to get environment variable, parsing it to the desired type.
pub fn get_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

#[derive(Debug, Parser)]
#[command(name = "course-track", version, about = "Inspect and convert running-course tracks")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print point count, bounds, center and distance as JSON
    Inspect(SourceArgs),
    /// Convert a track to another format and print it
    Convert {
        #[command(flatten)]
        source: SourceArgs,
        /// Output format
        #[arg(long)]
        to: TargetFormat,
        /// Track name written into GPX output
        #[arg(long)]
        name: Option<String>,
    },
}

#[derive(Debug, clap::Args)]
pub struct SourceArgs {
    /// File path or http(s) URL of the track
    pub source: String,
    /// Input format; inferred from the extension when omitted
    #[arg(long)]
    pub format: Option<SourceFormat>,
    /// Drop invalid GPX points instead of failing
    #[arg(long)]
    pub lenient: bool,
    /// Download timeout in seconds (also settable through COURSE_TRACK_TIMEOUT_SECS)
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceFormat {
    Gpx,
    #[value(name = "geojson")]
    GeoJson,
    Wkt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetFormat {
    #[value(name = "geojson")]
    GeoJson,
    Wkt,
    Gpx,
}

impl SourceArgs {
    pub fn is_url(&self) -> bool {
        self.source.starts_with("http://") || self.source.starts_with("https://")
    }

    /// Explicit `--format`, else the extension, else GPX
    pub fn resolved_format(&self) -> SourceFormat {
        if let Some(format) = self.format {
            return format;
        }
        let extension = Path::new(self.source.split(['?', '#']).next().unwrap_or_default())
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("geojson" | "json") => SourceFormat::GeoJson,
            Some("wkt") => SourceFormat::Wkt,
            _ => SourceFormat::Gpx,
        }
    }

    pub fn parse_options(&self) -> ParseOptions {
        if self.lenient {
            ParseOptions::lenient()
        } else {
            ParseOptions::strict()
        }
    }

    /// Flags first, then environment, then library defaults
    pub fn loader_config(&self) -> LoaderConfig {
        let defaults = LoaderConfig::default();
        LoaderConfig {
            parse_options: self.parse_options(),
            timeout: self
                .timeout_secs
                .or_else(|| get_env(TIMEOUT_ENV))
                .map(Duration::from_secs),
            user_agent: get_env(USER_AGENT_ENV).unwrap_or(defaults.user_agent),
        }
    }
}
