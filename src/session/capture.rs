//! Capture session: chunk collection, finalize semantics, sample assembly.
//!
//! A [`CaptureSession`] exists only while the controller is in `Recording`.
//! It owns the device capture handle and the growing chunk sequence, and it
//! guarantees that the device is released on every path out of `Recording`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::error::CaptureError;
use crate::session::device::{CaptureHandle, Microphone};

/// Ordered, append-only collection of PCM chunks shared with the device
/// callback.
///
/// Pushes and the closing drain go through the same mutex, so no chunk can
/// land after `finalize` has run.
pub struct ChunkBuffer {
    chunks: Mutex<Vec<Vec<i16>>>,
    open: AtomicBool,
}

impl ChunkBuffer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            chunks: Mutex::new(Vec::new()),
            open: AtomicBool::new(true),
        })
    }

    /// Appends one chunk in delivery order. Ignored once the buffer has been
    /// closed by finalize, and for empty chunks.
    pub fn push(&self, chunk: Vec<i16>) {
        if chunk.is_empty() {
            return;
        }
        let mut chunks = self.chunks.lock().unwrap();
        if self.open.load(Ordering::Relaxed) {
            chunks.push(chunk);
        }
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.lock().unwrap().len()
    }

    /// Closes the buffer and drains all chunks. Later pushes are no-ops.
    fn close_and_take(&self) -> Vec<Vec<i16>> {
        let mut chunks = self.chunks.lock().unwrap();
        self.open.store(false, Ordering::Relaxed);
        std::mem::take(&mut *chunks)
    }
}

/// A finalized mono PCM sample, ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSample {
    pub data: Vec<i16>,
    pub sample_rate: u32,
}

impl AudioSample {
    pub fn duration_secs(&self) -> f32 {
        self.data.len() as f32 / self.sample_rate as f32
    }

    /// Encodes the sample as an in-memory WAV container for the multipart
    /// upload.
    pub fn to_wav(&self) -> anyhow::Result<Vec<u8>> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
            for &sample in &self.data {
                writer.write_sample(sample)?;
            }
            writer.finalize()?;
        }
        Ok(cursor.into_inner())
    }
}

/// One live recording. At most one exists at a time; the controller holds it
/// in a slot and takes it out to finalize, so `finalize` runs at most once.
pub struct CaptureSession {
    id: u64,
    handle: Box<dyn CaptureHandle>,
    sink: Arc<ChunkBuffer>,
    started_at: Instant,
    cancelled: bool,
}

impl CaptureSession {
    /// Requests microphone access and begins chunked capture.
    ///
    /// # Errors
    /// [`CaptureError::Permission`] when access is denied or no usable input
    /// device exists; [`CaptureError::Stream`] when the stream fails to start.
    pub fn acquire(microphone: &dyn Microphone, id: u64) -> Result<Self, CaptureError> {
        let sink = ChunkBuffer::new();
        let handle = microphone.open(Arc::clone(&sink))?;
        tracing::info!(session = id, rate = handle.sample_rate(), "capture started");
        Ok(Self {
            id,
            handle,
            sink,
            started_at: Instant::now(),
            cancelled: false,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Closes the capture and decides whether a sample gets submitted.
    ///
    /// Stops the recorder and releases the device stream unconditionally.
    /// Returns `None` on cancel or when no chunks were captured (an empty
    /// capture is a no-op, not an error); otherwise the chunks are assembled
    /// in delivery order into a single sample.
    ///
    /// Consumes the session: whichever of user-cancel or deadline reaches it
    /// first wins, the other finds the controller slot empty.
    pub fn finalize(mut self, cancel: bool) -> Option<AudioSample> {
        self.cancelled = cancel;
        let chunks = self.sink.close_and_take();
        let sample_rate = self.handle.sample_rate();
        self.handle.stop();

        let elapsed = self.started_at.elapsed();
        if self.cancelled {
            tracing::info!(
                session = self.id,
                elapsed_ms = elapsed.as_millis() as u64,
                "capture cancelled, sample discarded"
            );
            return None;
        }
        if chunks.is_empty() {
            tracing::warn!(session = self.id, "capture finished with no chunks");
            return None;
        }

        let mut data = Vec::with_capacity(chunks.iter().map(Vec::len).sum());
        for chunk in &chunks {
            data.extend_from_slice(chunk);
        }
        let sample = AudioSample { data, sample_rate };
        tracing::info!(
            session = self.id,
            chunks = chunks.len(),
            duration_secs = sample.duration_secs(),
            "capture finalized"
        );
        Some(sample)
    }
}
