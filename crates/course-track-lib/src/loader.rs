//! Loading GPX files over HTTP(S)
//!
//! Course files live in object storage and are handed out as (signed) URLs.

use crate::{ParseOptions, Result, TrackError, TrackSequence, parse_gpx_with};
use std::time::Duration;

/// Configuration for [`load_gpx_from_url`]
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Policy applied to the downloaded document. Default: strict
    pub parse_options: ParseOptions,
    /// Whole-request timeout. `None` leaves timing entirely to the caller. Default: `None`
    pub timeout: Option<Duration>,
    /// User-Agent header sent with the request
    pub user_agent: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            parse_options: ParseOptions::default(),
            timeout: None,
            user_agent: concat!("course-track/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl LoaderConfig {
    fn build_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder().user_agent(self.user_agent.as_str());
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder
            .build()
            .map_err(|e| TrackError::Network(format!("cannot build HTTP client: {e}")))
    }
}

/// Download a GPX document and parse it
///
/// # Errors
/// * [`TrackError::Network`] on transport failures and non-success HTTP statuses
/// * Any error of [`parse_gpx_with`] for the downloaded body
pub async fn load_gpx_from_url(url: &str, config: &LoaderConfig) -> Result<TrackSequence> {
    let client = config.build_client()?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| TrackError::Network(format!("request to {url} failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(TrackError::Network(format!("GET {url} returned {status}")));
    }

    let body = response
        .text()
        .await
        .map_err(|e| TrackError::Network(format!("reading body of {url} failed: {e}")))?;

    tracing::info!("Fetched {} bytes of GPX from {url}", body.len());
    parse_gpx_with(&body, &config.parse_options)
}
