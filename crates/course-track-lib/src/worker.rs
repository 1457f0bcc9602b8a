//! Background GPX parsing
//!
//! Large course files are parsed off the caller's task. Requests go in over a channel,
//! responses come back tagged with the request id. Parsing happens on the blocking pool,
//! so responses to overlapping requests may arrive in any order. Correlate on
//! `request_id`. There is no cancellation and no timeout.

use crate::{ParseOptions, Result, TrackError, TrackPoint, parse_gpx_with};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tokio::sync::mpsc;

/// Message sent to the worker: `{"gpxContent": "...", "requestId": 1}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseRequest {
    pub gpx_content: String,
    pub request_id: u64,
}

/// Message sent back: `{"trackPoints": [...], "error": null, "requestId": 1}`
///
/// On failure `track_points` is empty and `error` holds the message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResponse {
    pub track_points: Vec<TrackPoint>,
    pub error: Option<String>,
    pub request_id: u64,
}

impl ParseResponse {
    /// `true` when the request parsed without error
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Handle one request with the lenient policy
pub fn handle_request(request: ParseRequest) -> ParseResponse {
    #[cfg(feature = "profiling")]
    profiling::scope!("worker::handle_request");

    match parse_gpx_with(&request.gpx_content, &ParseOptions::lenient()) {
        Ok(track_points) => {
            tracing::debug!(
                "Request {} parsed into {} points",
                request.request_id,
                track_points.len()
            );
            ParseResponse {
                track_points,
                error: None,
                request_id: request.request_id,
            }
        }
        Err(e) => {
            tracing::warn!("Request {} failed: {e}", request.request_id);
            ParseResponse {
                track_points: Vec::new(),
                error: Some(e.to_string()),
                request_id: request.request_id,
            }
        }
    }
}

/// Handle to a background parsing task
///
/// Dropping the handle closes the request channel; the task exits once in-flight
/// requests have been answered.
pub struct GpxWorker {
    requests: mpsc::UnboundedSender<ParseRequest>,
    responses: mpsc::UnboundedReceiver<ParseResponse>,
    /// Responses received by [`GpxWorker::parse`] while waiting for a different id
    stashed: VecDeque<ParseResponse>,
    next_request_id: u64,
}

impl GpxWorker {
    /// Start the worker task. Must be called from within a tokio runtime.
    pub fn spawn() -> Self {
        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<ParseRequest>();
        let (response_tx, response_rx) = mpsc::unbounded_channel::<ParseResponse>();

        tokio::spawn(async move {
            tracing::info!("GPX worker started");
            while let Some(request) = request_rx.recv().await {
                let response_tx = response_tx.clone();
                tokio::task::spawn_blocking(move || {
                    // A closed receiver only means nobody is listening anymore
                    let _ = response_tx.send(handle_request(request));
                });
            }
            tracing::info!("GPX worker stopped");
        });

        Self {
            requests: request_tx,
            responses: response_rx,
            stashed: VecDeque::new(),
            next_request_id: 1,
        }
    }

    /// Allocate a request id that [`GpxWorker::parse`] will not reuse
    pub fn next_request_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    /// Queue a request without waiting for its response
    pub fn submit(&self, request: ParseRequest) -> Result<()> {
        self.requests
            .send(request)
            .map_err(|_| TrackError::WorkerStopped)
    }

    /// Next available response, in completion order
    pub async fn recv(&mut self) -> Option<ParseResponse> {
        if let Some(response) = self.stashed.pop_front() {
            return Some(response);
        }
        self.responses.recv().await
    }

    /// Submit GPX text and wait for its response
    ///
    /// Responses to other requests that arrive meanwhile are kept for [`GpxWorker::recv`].
    pub async fn parse(&mut self, gpx_content: impl Into<String>) -> Result<ParseResponse> {
        let request_id = self.next_request_id();
        self.submit(ParseRequest {
            gpx_content: gpx_content.into(),
            request_id,
        })?;

        loop {
            let response = self
                .responses
                .recv()
                .await
                .ok_or(TrackError::WorkerStopped)?;
            if response.request_id == request_id {
                return Ok(response);
            }
            self.stashed.push_back(response);
        }
    }
}
