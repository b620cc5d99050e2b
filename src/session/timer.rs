//! Display-only recording timer.
//!
//! Ticks the `elapsed_secs` counter inside `DisplayState::Recording` once per
//! second. Deliberately decoupled from the recording deadline: delayed or
//! missed ticks only affect the displayed count, never the capture window.

use std::time::Duration;

use tokio::sync::watch;

use crate::session::state::DisplayState;

/// Handle to the ticking task. Stops on drop; also exits on its own as soon
/// as the published state leaves `Recording`.
pub struct RecordingTimer {
    task: tokio::task::JoinHandle<()>,
}

impl RecordingTimer {
    pub fn start(display: watch::Sender<DisplayState>) -> Self {
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // The first tick of a tokio interval completes immediately.
            interval.tick().await;
            let mut elapsed: u64 = 0;
            loop {
                interval.tick().await;
                elapsed += 1;
                let mut still_recording = false;
                display.send_if_modified(|state| {
                    if let DisplayState::Recording { elapsed_secs } = state {
                        *elapsed_secs = elapsed;
                        still_recording = true;
                        true
                    } else {
                        false
                    }
                });
                if !still_recording {
                    break;
                }
            }
        });
        Self { task }
    }

    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for RecordingTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
