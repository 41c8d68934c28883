//! Microphone loudness sensing
//!
//! Acquires the default capture device once, then continuously computes the
//! root-mean-square of the most recent fixed-size sample window on cpal's
//! audio thread. The simulation only ever wants the freshest reading, so the
//! hand-off is a single atomic cell with last-write-wins semantics: no queue,
//! no lock, intermediate samples between reads are silently dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample};
use thiserror::Error;

use crate::consts::LOUDNESS_WINDOW;

/// Why microphone acquisition failed.
///
/// Surfaced exactly once, from [`LoudnessSensor::init`]. Every variant is
/// recoverable in the sense that the game stays playable with loudness
/// pinned to zero; voice control simply does nothing.
#[derive(Debug, Error)]
pub enum SensorError {
    #[error("no audio capture device available: {0}")]
    Unavailable(String),
    #[error("microphone permission denied: {0}")]
    PermissionDenied(String),
    #[error("capture device busy or unreadable: {0}")]
    DeviceBusy(String),
    #[error("microphone acquisition aborted: {0}")]
    Aborted(String),
}

/// Continuously samples microphone loudness.
///
/// The capture stream runs for the sensor's whole lifetime; `start_sampling`
/// and `stop_sampling` gate whether the callback publishes anything. Both are
/// idempotent, and stopping zeroes the published value so stale loudness
/// cannot leak into a paused or restarted session. Dropping the sensor tears
/// the stream down.
pub struct LoudnessSensor {
    _stream: cpal::Stream,
    level: Arc<AtomicU32>,
    active: Arc<AtomicBool>,
}

impl LoudnessSensor {
    /// Acquire the default capture device and start the stream (inactive:
    /// nothing is published until `start_sampling`).
    pub fn init() -> Result<Self, SensorError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| SensorError::Unavailable("no default capture device".into()))?;
        let name = device.name().unwrap_or_else(|_| "<unknown>".into());

        let supported = device
            .default_input_config()
            .map_err(classify_config_error)?;
        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();

        let level = Arc::new(AtomicU32::new(0.0f32.to_bits()));
        let active = Arc::new(AtomicBool::new(false));

        let stream = match sample_format {
            SampleFormat::F32 => {
                build_stream::<f32>(&device, &config, level.clone(), active.clone())
            }
            SampleFormat::I16 => {
                build_stream::<i16>(&device, &config, level.clone(), active.clone())
            }
            SampleFormat::U16 => {
                build_stream::<u16>(&device, &config, level.clone(), active.clone())
            }
            other => Err(SensorError::Unavailable(format!(
                "unsupported sample format {other:?}"
            ))),
        }?;

        stream
            .play()
            .map_err(|e| SensorError::Aborted(e.to_string()))?;

        log::info!(
            "loudness sensor on '{}' ({} Hz, {} ch, {:?})",
            name,
            config.sample_rate.0,
            config.channels,
            sample_format
        );

        Ok(Self {
            _stream: stream,
            level,
            active,
        })
    }

    /// Begin publishing loudness. Idempotent.
    pub fn start_sampling(&self) {
        if !self.active.swap(true, Ordering::Relaxed) {
            log::info!("loudness sampling started");
        }
    }

    /// Stop publishing and zero the stored value. Idempotent; the capture
    /// callback keeps running but writes nothing while inactive.
    pub fn stop_sampling(&self) {
        if self.active.swap(false, Ordering::Relaxed) {
            log::info!("loudness sampling stopped");
        }
        self.level.store(0.0f32.to_bits(), Ordering::Relaxed);
    }

    /// Non-blocking read of the latest RMS value; 0 while sampling is
    /// inactive.
    pub fn current_loudness(&self) -> f32 {
        if !self.active.load(Ordering::Relaxed) {
            return 0.0;
        }
        f32::from_bits(self.level.load(Ordering::Relaxed))
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    level: Arc<AtomicU32>,
    active: Arc<AtomicBool>,
) -> Result<cpal::Stream, SensorError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = config.channels.max(1) as usize;

    // Ring of the most recent mono samples, local to the audio thread.
    let mut window = vec![0.0f32; LOUDNESS_WINDOW];
    let mut write_idx = 0usize;

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                if !active.load(Ordering::Relaxed) {
                    return;
                }
                for frame in data.chunks(channels) {
                    let mut sum = 0.0f32;
                    for s in frame {
                        sum += f32::from_sample(*s);
                    }
                    window[write_idx] = sum / frame.len() as f32;
                    write_idx = (write_idx + 1) % window.len();
                }
                level.store(rms(&window).to_bits(), Ordering::Relaxed);
            },
            |err| log::warn!("capture stream error: {err}"),
            None,
        )
        .map_err(classify_build_error)
}

/// Root-mean-square energy of a sample window
fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

fn classify_config_error(err: cpal::DefaultStreamConfigError) -> SensorError {
    use cpal::DefaultStreamConfigError::*;
    match err {
        DeviceNotAvailable => SensorError::DeviceBusy("capture device disappeared".into()),
        StreamTypeNotSupported => {
            SensorError::Unavailable("device does not support capture".into())
        }
        BackendSpecific { err } => classify_backend_message(err.description),
    }
}

fn classify_build_error(err: cpal::BuildStreamError) -> SensorError {
    use cpal::BuildStreamError::*;
    match err {
        DeviceNotAvailable => SensorError::DeviceBusy("capture device disappeared".into()),
        StreamConfigNotSupported | InvalidArgument => {
            SensorError::Unavailable("capture configuration rejected".into())
        }
        BackendSpecific { err } => classify_backend_message(err.description),
        other => SensorError::Aborted(other.to_string()),
    }
}

/// Backends report permission problems as free-form text, so classification
/// falls back to keyword matching before giving up as Aborted.
fn classify_backend_message(description: String) -> SensorError {
    let lower = description.to_lowercase();
    if lower.contains("denied") || lower.contains("permission") || lower.contains("not allowed") {
        SensorError::PermissionDenied(description)
    } else if lower.contains("busy") || lower.contains("in use") {
        SensorError::DeviceBusy(description)
    } else {
        SensorError::Aborted(description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rms_of_silence_is_zero() {
        assert_eq!(rms(&[0.0; 256]), 0.0);
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    fn test_rms_of_constant_signal() {
        assert!((rms(&[0.5; 256]) - 0.5).abs() < 1e-6);
        // Full-scale square wave
        let square: Vec<f32> = (0..256).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        assert!((rms(&square) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rms_of_sine_is_peak_over_sqrt_two() {
        let sine: Vec<f32> = (0..256)
            .map(|i| (i as f32 / 256.0 * std::f32::consts::TAU * 4.0).sin())
            .collect();
        assert!((rms(&sine) - std::f32::consts::FRAC_1_SQRT_2).abs() < 0.01);
    }

    #[test]
    fn test_error_messages_name_the_cause() {
        let err = classify_backend_message("Access denied by user".into());
        assert!(matches!(err, SensorError::PermissionDenied(_)));
        assert!(err.to_string().contains("permission denied"));

        let err = classify_backend_message("device is busy".into());
        assert!(matches!(err, SensorError::DeviceBusy(_)));

        let err = classify_backend_message("something else".into());
        assert!(matches!(err, SensorError::Aborted(_)));
    }
}
