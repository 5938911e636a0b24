// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! The eight-worker Goertzel detector pool.
//!
//! One thread per DTMF tone. Each worker idles on its private start event,
//! computes one Goertzel magnitude over the full ring starting at the
//! coordinator-supplied read offset, updates its own tone's detected flag,
//! and signals its private done event. `trx-server`'s CW decoder
//! (`decode/cw.rs`'s `goertzel_energy`) is the same recursive filter; this
//! version keeps the real/imaginary split and `sqrt(...)/ (N/2)` scaling
//! instead of the squared-energy-ratio shortcut, to match the magnitude
//! units the spec's threshold is defined in.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, trace, warn};

use crate::error::{PipelineError, WorkerWakeError};
use crate::event::AutoResetEvent;
use crate::ring::SampleRing;
use crate::tone::ToneTable;

/// Default detection threshold in magnitude units after scaling by N/2.
pub const DEFAULT_THRESHOLD: f32 = 3.0;

/// Run the recursive Goertzel filter for `tone` over one full window of
/// `ring`, starting at `read_offset`, and return the scaled magnitude.
pub fn goertzel_magnitude(ring: &SampleRing, tones: &ToneTable, index: usize, read_offset: usize) -> f32 {
    let tone = tones.get(index);
    let window_size = ring.capacity();
    let coeff = tone.coeff();

    let mut q1 = 0f32;
    let mut q2 = 0f32;
    for i in 0..window_size {
        let sample = ring.read_at(read_offset, i) as f32;
        let q0 = coeff * q1 - q2 + sample;
        q2 = q1;
        q1 = q0;
    }

    let real = q1 * tone.cos() - q2;
    let imag = q1 * tone.sin();
    (real * real + imag * imag).sqrt() / (window_size as f32 / 2.0)
}

/// The shared state one worker thread needs to participate in a cycle: the
/// ring and tone table it reads/writes, the read offset the coordinator
/// publishes once per cycle, the cycle-global changed flag, and the
/// pipeline-wide running flag.
pub struct WorkerShared {
    pub ring: Arc<SampleRing>,
    pub tones: Arc<ToneTable>,
    pub read_offset: Arc<AtomicUsize>,
    pub changed: Arc<AtomicBool>,
    pub running: Arc<AtomicBool>,
    pub threshold: f32,
}

/// Handle to one spawned Goertzel worker thread and its event pair.
pub struct WorkerHandle {
    pub index: usize,
    pub start: Arc<AutoResetEvent>,
    pub done: Arc<AutoResetEvent>,
    join: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    pub fn join(&mut self) {
        if let Some(handle) = self.join.take() {
            let _ = handle.join();
        }
    }
}

/// Spawn the worker thread for `index`. SHOULD request the platform's
/// real-time audio capture scheduling class; this is a best-effort hint,
/// never a correctness requirement (spec section 4.5). Propagates the
/// spawn failure to the caller rather than aborting, per the init-fatal
/// error policy: no partial startup.
pub fn spawn_worker(index: usize, shared: Arc<WorkerShared>) -> Result<WorkerHandle, PipelineError> {
    let start = Arc::new(AutoResetEvent::new());
    let done = Arc::new(AutoResetEvent::new());

    let thread_start = start.clone();
    let thread_done = done.clone();
    let join = thread::Builder::new()
        .name(format!("goertzel-worker-{index}"))
        .spawn(move || worker_loop(index, shared, thread_start, thread_done))
        .map_err(|source| PipelineError::WorkerSpawnFailed { index, source })?;

    Ok(WorkerHandle {
        index,
        start,
        done,
        join: Some(join),
    })
}

fn worker_loop(
    index: usize,
    shared: Arc<WorkerShared>,
    start: Arc<AutoResetEvent>,
    done: Arc<AutoResetEvent>,
) {
    crate::hint::request_realtime_scheduling("goertzel-worker");

    loop {
        if let Err(reason) = start.wait() {
            let err = WorkerWakeError { index, reason };
            warn!(%err, "Goertzel worker wake failed, clearing running and exiting");
            shared.running.store(false, Ordering::Release);
            done.set();
            return;
        }

        if !shared.running.load(Ordering::Acquire) {
            debug!(index, "Goertzel worker observed shutdown, exiting");
            done.set();
            return;
        }

        let read_offset = shared.read_offset.load(Ordering::Acquire);
        let magnitude = goertzel_magnitude(&shared.ring, &shared.tones, index, read_offset);
        let detected = magnitude >= shared.threshold;
        let changed = shared.tones.record(index, magnitude, detected);
        trace!(index, magnitude, detected, "Goertzel cycle complete");
        if changed {
            shared.changed.store(true, Ordering::Release);
        }

        done.set();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tone::ToneTable;
    use std::f32::consts::PI;

    fn ring_with_sine(frequency_hz: f32, amplitude: f32, window_size: usize, sample_rate: u32) -> SampleRing {
        let ring = SampleRing::new(window_size).unwrap();
        for n in 0..window_size {
            let t = n as f32 / sample_rate as f32;
            let value = 127.0 + amplitude * (2.0 * PI * frequency_hz * t).sin();
            ring.push(value.round().clamp(0.0, 255.0) as u8);
        }
        ring
    }

    #[test]
    fn silence_produces_near_zero_magnitude() {
        let sample_rate = 8000;
        let window_size = 400;
        let ring = SampleRing::new(window_size).unwrap();
        let tones = ToneTable::new(sample_rate, window_size);
        for index in 0..tones.len() {
            let offset = ring.snapshot_offset();
            let magnitude = goertzel_magnitude(&ring, &tones, index, offset);
            assert!(magnitude < DEFAULT_THRESHOLD, "tone {index} magnitude {magnitude}");
        }
    }

    #[test]
    fn matching_tone_exceeds_threshold_others_do_not() {
        let sample_rate = 8000;
        let window_size = 400;
        let tones = ToneTable::new(sample_rate, window_size);
        let ring = ring_with_sine(697.0, 50.0, window_size, sample_rate);
        let offset = ring.snapshot_offset();

        let magnitudes: Vec<f32> = (0..tones.len())
            .map(|i| goertzel_magnitude(&ring, &tones, i, offset))
            .collect();

        assert!(magnitudes[0] >= DEFAULT_THRESHOLD, "697Hz bin: {}", magnitudes[0]);
        for (i, &m) in magnitudes.iter().enumerate().skip(1) {
            assert!(m < DEFAULT_THRESHOLD, "tone {i} unexpectedly detected: {m}");
        }
    }
}
