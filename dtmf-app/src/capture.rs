// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! The capture source: opens a cpal input stream, downmixes to mono,
//! quantizes to unsigned 8-bit PCM, and feeds the pipeline's ring. The
//! cpal audio callback only pushes samples -- it never calls `run_cycle`,
//! since the fan-out/wait-all coordinator pass may take longer than the
//! audio backend's real-time deadline allows. A separate cadence on the
//! owning thread drives `run_cycle` once per window.
//!
//! Device loss (USB unplug, ALSA POLLERR, …) reopens the stream rather
//! than terminating the process, mirroring `trx-server`'s audio capture
//! recovery loop.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{debug, info, warn};

use dtmf_core::Pipeline;

use crate::error::CaptureError;

const STREAM_RECOVERY_DELAY: Duration = Duration::from_millis(500);

/// Tracks the minimum and maximum downmixed sample value seen since the
/// last reset, using lock-free atomics so the audio callback never blocks.
struct MinMaxMonitor {
    min_bits: AtomicU32,
    max_bits: AtomicU32,
}

impl MinMaxMonitor {
    fn new() -> Self {
        Self {
            min_bits: AtomicU32::new(f32::MAX.to_bits()),
            max_bits: AtomicU32::new(f32::MIN.to_bits()),
        }
    }

    fn observe(&self, sample: f32) {
        let bits = sample.to_bits();

        let mut current = self.min_bits.load(Ordering::Relaxed);
        while f32::from_bits(bits) < f32::from_bits(current) {
            match self.min_bits.compare_exchange_weak(
                current,
                bits,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(observed) => current = observed,
            }
        }

        let mut current = self.max_bits.load(Ordering::Relaxed);
        while f32::from_bits(bits) > f32::from_bits(current) {
            match self.max_bits.compare_exchange_weak(
                current,
                bits,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(observed) => current = observed,
            }
        }
    }

    /// Read back the current (min, max) and reset for the next interval.
    fn take(&self) -> (f32, f32) {
        let min = f32::from_bits(self.min_bits.swap(f32::MAX.to_bits(), Ordering::Relaxed));
        let max = f32::from_bits(self.max_bits.swap(f32::MIN.to_bits(), Ordering::Relaxed));
        (min, max)
    }
}

fn downmix_to_mono(data: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return data.to_vec();
    }
    let num_frames = data.len() / channels;
    let mut mono = Vec::with_capacity(num_frames);
    for frame in data.chunks_exact(channels) {
        let sum: f32 = frame.iter().sum();
        mono.push(sum / channels as f32);
    }
    mono
}

fn quantize_u8(sample: f32) -> u8 {
    let clamped = sample.clamp(-1.0, 1.0);
    (127.0 + clamped * 127.0).round().clamp(0.0, 255.0) as u8
}

fn select_device(
    host: &cpal::Host,
    device_name: Option<&str>,
) -> Result<cpal::Device, CaptureError> {
    match device_name {
        Some(name) => host
            .input_devices()
            .map_err(|e| CaptureError::DeviceEnumeration(e.to_string()))?
            .find(|d| d.name().map(|n| n == name).unwrap_or(false))
            .ok_or_else(|| CaptureError::NoDevice(Some(name.to_string()))),
        None => host
            .default_input_device()
            .ok_or(CaptureError::NoDevice(None)),
    }
}

fn open_input_stream(
    device_name: Option<&str>,
    sample_rate: u32,
    pipeline: Arc<Pipeline>,
    monitor: Arc<MinMaxMonitor>,
    stream_failed: Arc<AtomicBool>,
) -> Result<cpal::Stream, CaptureError> {
    let host = cpal::default_host();
    let device = select_device(&host, device_name)?;

    info!(
        device = %device.name().unwrap_or_else(|_| "unknown".into()),
        "DTMF capture: using input device"
    );

    let supported = device
        .default_input_config()
        .map_err(|e| CaptureError::UnsupportedStreamConfig(e.to_string()))?;
    let channels = supported.channels() as usize;

    let config = cpal::StreamConfig {
        channels: channels as u16,
        sample_rate: cpal::SampleRate(sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let stream = device
        .build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let mono = downmix_to_mono(data, channels);
                for &sample in &mono {
                    monitor.observe(sample);
                }
                let batch: Vec<u8> = mono.iter().copied().map(quantize_u8).collect();
                pipeline.enqueue_batch(&batch);
            },
            move |err| {
                warn!("DTMF capture: input stream error: {}", err);
                stream_failed.store(true, Ordering::SeqCst);
            },
            None,
        )
        .map_err(|e| CaptureError::StreamOpen(e.to_string()))?;

    stream
        .play()
        .map_err(|e| CaptureError::StreamPlay(e.to_string()))?;

    Ok(stream)
}

/// Run the capture loop until `running` is cleared. Reopens the input
/// stream whenever the backend reports an error, matching the recovery
/// policy the spec's error table calls for on capture-layer faults:
/// log and continue, never terminate the process.
pub fn run_capture(
    pipeline: Arc<Pipeline>,
    device_name: Option<String>,
    cycle_interval: Duration,
    monitor_interval_seconds: u32,
    running: Arc<AtomicBool>,
) {
    let sample_rate = pipeline.sample_rate();
    let monitor = Arc::new(MinMaxMonitor::new());
    let mut last_monitor_log = Instant::now();

    while running.load(Ordering::Acquire) {
        let stream_failed = Arc::new(AtomicBool::new(false));

        let stream = open_input_stream(
            device_name.as_deref(),
            sample_rate,
            pipeline.clone(),
            monitor.clone(),
            stream_failed.clone(),
        );

        let stream = match stream {
            Ok(stream) => stream,
            Err(err) => {
                warn!("DTMF capture: {}, retrying", err);
                std::thread::sleep(STREAM_RECOVERY_DELAY);
                continue;
            }
        };

        while running.load(Ordering::Acquire) && !stream_failed.load(Ordering::SeqCst) {
            pipeline.run_cycle();

            if monitor_interval_seconds > 0
                && last_monitor_log.elapsed()
                    >= Duration::from_secs(monitor_interval_seconds as u64)
            {
                let (min, max) = monitor.take();
                debug!(min, max, "DTMF capture: channel sample range");
                last_monitor_log = Instant::now();
            }

            std::thread::sleep(cycle_interval);
        }

        drop(stream);

        if stream_failed.load(Ordering::SeqCst) {
            warn!("DTMF capture: stream failed, reopening");
            std::thread::sleep(STREAM_RECOVERY_DELAY);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_passthrough_is_unchanged() {
        let data = [0.1, -0.2, 0.3];
        assert_eq!(downmix_to_mono(&data, 1), vec![0.1, -0.2, 0.3]);
    }

    #[test]
    fn stereo_downmix_averages_channel_pairs() {
        let data = [1.0, -1.0, 0.5, 0.5];
        assert_eq!(downmix_to_mono(&data, 2), vec![0.0, 0.5]);
    }

    #[test]
    fn quantize_maps_full_scale_to_byte_range() {
        assert_eq!(quantize_u8(0.0), 127);
        assert_eq!(quantize_u8(1.0), 254);
        assert_eq!(quantize_u8(-1.0), 0);
    }

    #[test]
    fn quantize_clamps_out_of_range_input() {
        assert_eq!(quantize_u8(5.0), 254);
        assert_eq!(quantize_u8(-5.0), 0);
    }

    #[test]
    fn monitor_tracks_min_and_max_then_resets() {
        let monitor = MinMaxMonitor::new();
        monitor.observe(0.2);
        monitor.observe(-0.4);
        monitor.observe(0.9);
        let (min, max) = monitor.take();
        assert_eq!(min, -0.4);
        assert_eq!(max, 0.9);

        let (min, max) = monitor.take();
        assert_eq!(min, f32::MAX);
        assert_eq!(max, f32::MIN);
    }
}
