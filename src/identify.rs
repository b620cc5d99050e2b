//! Recognition endpoint client.
//!
//! Submits one multipart request per finalized sample and maps the response
//! onto an [`IdentificationOutcome`]. Requests are never retried; raw failure
//! causes are logged for diagnostics and never shown to the user.

use async_trait::async_trait;
use serde::Deserialize;

use crate::session::capture::AudioSample;
use crate::session::state::{IdentificationOutcome, TrackMatch};

/// Status marker the backend sets when the sample matched nothing. Success is
/// signalled by the *absence* of this marker, not by a positive one.
const NO_MATCH_STATUS: &str = "No Match";

/// Shown when the backend reports no match without giving a reason.
pub const DEFAULT_NO_MATCH_REASON: &str = "No match found";

/// Shown for any transport, status, or parse failure.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to identify song. Please try again.";

/// Identifies a finalized audio sample.
#[async_trait]
pub trait Recognizer: Send + Sync {
    async fn identify(&self, sample: AudioSample) -> IdentificationOutcome;
}

/// HTTP client for the recognition endpoint.
pub struct IdentificationClient {
    endpoint: String,
    http: reqwest::Client,
}

impl IdentificationClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: reqwest::Client::new(),
        }
    }
}

/// Raw response shape. Match fields and the no-match marker share one body;
/// which ones are present decides the outcome.
#[derive(Debug, Deserialize)]
struct IdentifyResponse {
    status: Option<String>,
    reason: Option<String>,
    title: Option<String>,
    artist: Option<String>,
    album_name: Option<String>,
    cover_art: Option<String>,
    spotify_url: Option<String>,
}

fn outcome_from_response(response: IdentifyResponse) -> IdentificationOutcome {
    if response.status.as_deref() == Some(NO_MATCH_STATUS) {
        return IdentificationOutcome::NoMatch {
            reason: response
                .reason
                .unwrap_or_else(|| DEFAULT_NO_MATCH_REASON.to_string()),
        };
    }

    // No no-match marker: the body must carry full match metadata.
    match (
        response.title,
        response.artist,
        response.album_name,
        response.cover_art,
        response.spotify_url,
    ) {
        (Some(title), Some(artist), Some(album_name), Some(cover_art), Some(spotify_url)) => {
            IdentificationOutcome::Match(TrackMatch {
                title,
                artist,
                album_name,
                cover_art,
                spotify_url,
            })
        }
        _ => {
            tracing::error!("identify response is missing match fields");
            IdentificationOutcome::Failure {
                message: GENERIC_FAILURE_MESSAGE.to_string(),
            }
        }
    }
}

#[async_trait]
impl Recognizer for IdentificationClient {
    async fn identify(&self, sample: AudioSample) -> IdentificationOutcome {
        let failure = || IdentificationOutcome::Failure {
            message: GENERIC_FAILURE_MESSAGE.to_string(),
        };

        let wav = match sample.to_wav() {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!("failed to encode sample: {e}");
                return failure();
            }
        };

        tracing::info!(
            bytes = wav.len(),
            duration_secs = sample.duration_secs(),
            "submitting sample for identification"
        );

        let part = match reqwest::multipart::Part::bytes(wav)
            .file_name("sample.wav")
            .mime_str("audio/wav")
        {
            Ok(part) => part,
            Err(e) => {
                tracing::error!("failed to build multipart body: {e}");
                return failure();
            }
        };
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = match self.http.post(&self.endpoint).multipart(form).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("identify request failed: {e}");
                return failure();
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("identify endpoint returned {status}: {body}");
            return failure();
        }

        match response.json::<IdentifyResponse>().await {
            Ok(parsed) => outcome_from_response(parsed),
            Err(e) => {
                tracing::error!("failed to parse identify response: {e}");
                failure()
            }
        }
    }
}
