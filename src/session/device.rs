//! Microphone backends.
//!
//! The controller only sees the [`Microphone`]/[`CaptureHandle`] traits.
//! [`CpalMicrophone`] is the real backend; tests substitute fakes.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::error::CaptureError;
use crate::session::capture::ChunkBuffer;

/// Opens an audio input device and starts delivering chunks into a sink.
pub trait Microphone: Send + Sync {
    /// Requests access to the device and begins chunked capture. Chunks are
    /// pushed into `sink` in delivery order until the returned handle is
    /// stopped.
    fn open(&self, sink: Arc<ChunkBuffer>) -> Result<Box<dyn CaptureHandle>, CaptureError>;
}

/// A live capture stream. Stopping releases the underlying device.
pub trait CaptureHandle: Send {
    /// Stops the recorder and releases the device stream. Idempotent;
    /// stopping an inactive recorder is a no-op.
    fn stop(&mut self);

    /// Sample rate the device is actually recording at.
    fn sample_rate(&self) -> u32;
}

/// cpal-backed microphone. The `cpal::Stream` is not `Send`, so a dedicated
/// thread owns it for the lifetime of the capture and drops it when the stop
/// channel closes.
pub struct CpalMicrophone {
    device_name: String,
}

impl CpalMicrophone {
    /// `device_name` is a device name, a numeric index, or "default" for the
    /// system default input device.
    pub fn new(device_name: String) -> Self {
        Self { device_name }
    }
}

impl Microphone for CpalMicrophone {
    fn open(&self, sink: Arc<ChunkBuffer>) -> Result<Box<dyn CaptureHandle>, CaptureError> {
        let (ready_tx, ready_rx) = mpsc::channel::<Result<u32, CaptureError>>();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let device_name = self.device_name.clone();

        let worker = thread::Builder::new()
            .name("echoid-capture".into())
            .spawn(move || {
                let built = build_stream(&device_name, sink);
                match built {
                    Ok((stream, sample_rate)) => {
                        if ready_tx.send(Ok(sample_rate)).is_err() {
                            return;
                        }
                        // Park until stop() runs or the handle is dropped;
                        // either closes the channel.
                        let _ = stop_rx.recv();
                        drop(stream);
                        tracing::debug!("capture stream released");
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                    }
                }
            })
            .map_err(|e| CaptureError::Stream(format!("failed to spawn capture thread: {e}")))?;

        let sample_rate = ready_rx
            .recv()
            .map_err(|_| CaptureError::Stream("capture thread exited before ready".into()))??;

        Ok(Box::new(CpalHandle {
            stop: Some(stop_tx),
            worker: Some(worker),
            sample_rate,
        }))
    }
}

struct CpalHandle {
    stop: Option<mpsc::Sender<()>>,
    worker: Option<thread::JoinHandle<()>>,
    sample_rate: u32,
}

impl CaptureHandle for CpalHandle {
    fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            drop(stop);
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl Drop for CpalHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Builds and starts the input stream on the capture thread.
fn build_stream(
    device_name: &str,
    sink: Arc<ChunkBuffer>,
) -> Result<(cpal::Stream, u32), CaptureError> {
    let host = cpal::default_host();

    let device = if device_name == "default" {
        host.default_input_device().ok_or_else(|| {
            CaptureError::Permission("no audio input device available".into())
        })?
    } else {
        find_device(&host, device_name)?
    };

    let label = device.name().unwrap_or_else(|_| "unknown device".into());

    let config = device
        .default_input_config()
        .map_err(|e| CaptureError::Permission(format!("cannot query device '{label}': {e}")))?;
    let sample_rate = config.sample_rate().0;
    let channels = config.channels() as usize;

    tracing::info!(
        device = %label,
        rate = sample_rate,
        channels,
        "opening input device"
    );

    let stream = device
        .build_input_stream(
            &config.into(),
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                sink.push(downmix_to_mono(data, channels));
            },
            |err| {
                tracing::error!("audio stream error: {err}");
            },
            None,
        )
        .map_err(|e| CaptureError::Stream(format!("failed to build input stream: {e}")))?;

    stream
        .play()
        .map_err(|e| CaptureError::Stream(format!("failed to start input stream: {e}")))?;

    Ok((stream, sample_rate))
}

/// Finds an input device by name or numeric index.
fn find_device(host: &cpal::Host, device_spec: &str) -> Result<cpal::Device, CaptureError> {
    let devices: Vec<_> = host
        .input_devices()
        .map_err(|e| CaptureError::Permission(format!("failed to enumerate devices: {e}")))?
        .collect();

    if let Ok(index) = device_spec.parse::<usize>() {
        return devices.into_iter().nth(index).ok_or_else(|| {
            CaptureError::Permission(format!("device index {index} is out of range"))
        });
    }

    for device in devices {
        if device.name().map(|name| name == device_spec).unwrap_or(false) {
            return Ok(device);
        }
    }

    Err(CaptureError::Permission(format!(
        "audio input device '{device_spec}' not found"
    )))
}

/// Averages interleaved channels into one mono chunk.
fn downmix_to_mono(data: &[i16], channels: usize) -> Vec<i16> {
    match channels {
        0 | 1 => data.to_vec(),
        n => data
            .chunks_exact(n)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                (sum / n as i32) as i16
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_passes_through() {
        assert_eq!(downmix_to_mono(&[1, 2, 3], 1), vec![1, 2, 3]);
    }

    #[test]
    fn stereo_averages_pairs() {
        assert_eq!(downmix_to_mono(&[100, 200, -50, 50], 2), vec![150, 0]);
    }

    #[test]
    fn multichannel_averages_frames() {
        assert_eq!(downmix_to_mono(&[3, 6, 9], 3), vec![6]);
    }
}
