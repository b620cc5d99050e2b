//! Error taxonomy for the capture/identify flow.

use thiserror::Error;

/// Errors raised while acquiring or running the microphone.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Microphone access was denied or no usable input device exists.
    /// Surfaced to the user as a banner; no session is created.
    #[error("microphone access denied or unavailable: {0}")]
    Permission(String),

    /// The device was acquired but the audio stream could not be started.
    #[error("audio stream error: {0}")]
    Stream(String),
}

/// Errors returned by [`SessionController::start`](crate::session::SessionController::start).
#[derive(Debug, Error)]
pub enum StartError {
    /// An identification request is in flight. It cannot be interrupted,
    /// so a new recording cannot begin until it resolves.
    #[error("identification in progress")]
    Busy,

    /// Microphone acquisition failed; the controller stays in `Idle`.
    #[error(transparent)]
    Capture(#[from] CaptureError),
}
