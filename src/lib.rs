//! echoid — capture a short ambient audio sample and identify the song
//! playing around you.
//!
//! The core of the crate is the session lifecycle: a controller that owns the
//! microphone resource, enforces the recording deadline, resolves the
//! cancel-vs-timeout race, and maps recognition responses onto display
//! states. The console frontend in [`app`] is a thin observer of that state.

pub mod app;
pub mod config;
pub mod error;
pub mod identify;
pub mod logging;
pub mod session;

pub use config::EchoIdConfig;
pub use error::{CaptureError, StartError};
pub use identify::{
    IdentificationClient, Recognizer, DEFAULT_NO_MATCH_REASON, GENERIC_FAILURE_MESSAGE,
};
pub use session::{
    AudioSample, CaptureHandle, ChunkBuffer, CpalMicrophone, DisplayState, IdentificationOutcome,
    Microphone, SessionConfig, SessionController, TrackMatch,
};
