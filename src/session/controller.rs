//! Session controller: the capture/finalize/identify state machine.
//!
//! Owns the mutable session state (capture handle, chunk buffer, timer,
//! deadline) outside any render loop and publishes a [`DisplayState`] that
//! the presentation layer only observes. States: Idle, Recording, Analyzing,
//! Result, ErrorDisplay; every leaf state returns to Idle via `reset` or a
//! fresh `start`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;

use crate::error::{CaptureError, StartError};
use crate::identify::Recognizer;
use crate::session::capture::CaptureSession;
use crate::session::device::Microphone;
use crate::session::state::{DisplayState, IdentificationOutcome};
use crate::session::timer::RecordingTimer;

/// Controller tunables. `capture_duration` bounds the recording window; the
/// deadline scheduled at session start is the sole authority for the cutoff.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub capture_duration: Duration,
}

/// Mutable state behind the controller mutex. `active` is the single slot a
/// finalize must win: taking the session out of it is the mutual exclusion
/// point for the cancel-vs-deadline race.
struct SessionSlot {
    active: Option<CaptureSession>,
    next_id: u64,
    timer: Option<RecordingTimer>,
}

pub struct SessionController {
    config: SessionConfig,
    microphone: Arc<dyn Microphone>,
    recognizer: Arc<dyn Recognizer>,
    display: watch::Sender<DisplayState>,
    slot: Mutex<SessionSlot>,
}

impl SessionController {
    pub fn new(
        config: SessionConfig,
        microphone: Arc<dyn Microphone>,
        recognizer: Arc<dyn Recognizer>,
    ) -> Arc<Self> {
        let (display, _) = watch::channel(DisplayState::Idle);
        Arc::new(Self {
            config,
            microphone,
            recognizer,
            display,
            slot: Mutex::new(SessionSlot {
                active: None,
                next_id: 0,
                timer: None,
            }),
        })
    }

    /// Subscribes the presentation layer to display-state updates.
    pub fn display(&self) -> watch::Receiver<DisplayState> {
        self.display.subscribe()
    }

    pub fn current_state(&self) -> DisplayState {
        self.display.borrow().clone()
    }

    /// Starts a new capture session.
    ///
    /// Any prior session is discarded first and the display returns to
    /// `Idle` before acquisition is attempted. On success the display moves
    /// to `Recording`, the timer starts, and a deadline is scheduled at the
    /// configured duration. On microphone failure the display is left at
    /// `Idle` and no session exists.
    ///
    /// # Errors
    /// [`StartError::Busy`] while an identification is in flight (it cannot
    /// be interrupted); [`StartError::Capture`] when mic acquisition fails.
    pub async fn start(self: &Arc<Self>) -> Result<(), StartError> {
        if self.current_state() == DisplayState::Analyzing {
            return Err(StartError::Busy);
        }

        // Entering Recording always first discards any prior session. The
        // display drops to Idle here, not on success: if acquisition fails
        // below there is no session left, so a lingering Recording (or
        // terminal) state would be unrecoverable.
        self.discard_active();
        if self.current_state() != DisplayState::Idle {
            self.display.send_replace(DisplayState::Idle);
        }

        let id = {
            let mut slot = self.slot.lock().unwrap();
            let id = slot.next_id;
            slot.next_id += 1;
            id
        };

        // Device acquisition can block on the OS; keep it off the runtime.
        let microphone = Arc::clone(&self.microphone);
        let session = tokio::task::spawn_blocking(move || {
            CaptureSession::acquire(microphone.as_ref(), id)
        })
        .await
        .map_err(|e| CaptureError::Stream(format!("acquisition task failed: {e}")))??;

        {
            let mut slot = self.slot.lock().unwrap();
            slot.active = Some(session);
            self.display
                .send_replace(DisplayState::Recording { elapsed_secs: 0 });
            slot.timer = Some(RecordingTimer::start(self.display.clone()));
        }

        let controller = Arc::clone(self);
        let window = self.config.capture_duration;
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            // The id guard makes a stale deadline a no-op if this session was
            // already finalized (or replaced) in the meantime.
            controller.finish(false, Some(id)).await;
        });

        tracing::debug!(session = id, window_secs = window.as_secs(), "session started");
        Ok(())
    }

    /// User-initiated cancel: discards the sample and returns to `Idle`.
    /// A no-op unless a session is currently recording.
    pub async fn cancel(self: &Arc<Self>) {
        self.finish(true, None).await;
    }

    /// Returns a terminal state (`Result` or `ErrorDisplay`) to `Idle`.
    pub fn reset(&self) {
        if self.current_state().is_terminal() {
            self.display.send_replace(DisplayState::Idle);
        }
    }

    /// Finalizes the active session. Exactly one caller wins the session;
    /// late or stale invocations (the losing side of the cancel-vs-deadline
    /// race, or a deadline from a replaced session) find nothing to do.
    async fn finish(self: &Arc<Self>, cancel: bool, expect_id: Option<u64>) {
        let (session, timer) = {
            let mut slot = self.slot.lock().unwrap();
            match &slot.active {
                Some(session)
                    if expect_id.map_or(true, |id| session.id() == id) => {}
                _ => return,
            }
            (slot.active.take(), slot.timer.take())
        };
        drop(timer);

        let Some(session) = session else { return };
        let sample = session.finalize(cancel);

        match sample {
            None => {
                // Cancelled or empty capture: silently back to Idle.
                self.display.send_replace(DisplayState::Idle);
            }
            Some(sample) => {
                self.display.send_replace(DisplayState::Analyzing);
                // Not cancellable from here on; runs to completion or failure.
                let outcome = self.recognizer.identify(sample).await;
                let next = match outcome {
                    IdentificationOutcome::Match(track) => DisplayState::Result(track),
                    IdentificationOutcome::NoMatch { reason } => {
                        DisplayState::ErrorDisplay { reason }
                    }
                    IdentificationOutcome::Failure { message } => {
                        DisplayState::ErrorDisplay { reason: message }
                    }
                };
                self.display.send_replace(next);
            }
        }
    }

    /// Synchronously finalizes (as cancelled) whatever session is active.
    fn discard_active(&self) {
        let (session, timer) = {
            let mut slot = self.slot.lock().unwrap();
            (slot.active.take(), slot.timer.take())
        };
        drop(timer);
        if let Some(session) = session {
            tracing::debug!(session = session.id(), "discarding prior session");
            let _ = session.finalize(true);
        }
    }
}
