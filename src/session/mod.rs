//! Capture session lifecycle: device ownership, chunk collection, the
//! recording timer/deadline, and the state machine the presentation observes.

pub mod capture;
pub mod controller;
pub mod device;
pub mod state;
pub mod timer;

pub use capture::{AudioSample, CaptureSession, ChunkBuffer};
pub use controller::{SessionConfig, SessionController};
pub use device::{CaptureHandle, CpalMicrophone, Microphone};
pub use state::{DisplayState, IdentificationOutcome, TrackMatch};
pub use timer::RecordingTimer;
