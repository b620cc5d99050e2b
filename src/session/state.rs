//! Display state and identification outcome types.
//!
//! `DisplayState` is owned exclusively by the session controller and published
//! through a watch channel. The presentation layer only ever reads it.

use serde::Deserialize;

/// Metadata for a successfully identified track, as returned by the
/// recognition endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TrackMatch {
    pub title: String,
    pub artist: String,
    /// Album the track appears on.
    pub album_name: String,
    /// Cover art image URL.
    pub cover_art: String,
    /// External playback link.
    pub spotify_url: String,
}

/// Outcome of submitting one finalized sample to the recognition endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentificationOutcome {
    /// The service matched the sample against its database.
    Match(TrackMatch),
    /// The service answered with an explicit no-match signal. Not a system
    /// failure; the reason is shown to the user as-is.
    NoMatch { reason: String },
    /// Transport failure, non-success status, or unparseable body. The
    /// message is a fixed generic text; the raw cause is only logged.
    Failure { message: String },
}

/// The state the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayState {
    /// Nothing happening; ready to start a capture.
    Idle,
    /// Microphone is live. `elapsed_secs` is a display-only counter; the
    /// recording cutoff is governed by the deadline, not by this value.
    Recording { elapsed_secs: u64 },
    /// Sample submitted, waiting for the recognition endpoint.
    Analyzing,
    /// Terminal: a match was found.
    Result(TrackMatch),
    /// Terminal: no match or identification failure.
    ErrorDisplay { reason: String },
}

impl DisplayState {
    pub fn is_recording(&self) -> bool {
        matches!(self, DisplayState::Recording { .. })
    }

    /// Terminal states require an explicit `reset` before a new attempt.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DisplayState::Result(_) | DisplayState::ErrorDisplay { .. }
        )
    }
}
