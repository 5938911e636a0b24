// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Owns the whole pipeline's lifetime: init allocates the ring, the tone
//! table, and the eight worker threads; `enqueue_sample`/`enqueue_batch`
//! feed the ring from whatever capture source the caller wires up;
//! `run_cycle` drives one coordinator pass; `shutdown` tears everything
//! down exactly once. Calling anything before `init` or after `shutdown`
//! is caller misuse, not a recoverable error -- it panics, matching the
//! spec's "fatal assertion" policy for that case.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::info;

use crate::config::PipelineConfig;
use crate::coordinator::PipelineCoordinator;
use crate::error::PipelineError;
use crate::ring::SampleRing;
use crate::tone::ToneTable;
use crate::view::{StateChangeSink, ToneSnapshot};

/// A running (or shut-down) DTMF decoding pipeline.
pub struct Pipeline {
    ring: Arc<SampleRing>,
    tones: Arc<ToneTable>,
    coordinator: PipelineCoordinator,
    running: Arc<AtomicBool>,
    sample_rate: u32,
    shut_down: bool,
}

impl Pipeline {
    /// Allocate the ring sized for `config.window_ms` at `sample_rate`,
    /// build the tone table's Goertzel coefficients, and spawn the eight
    /// worker threads. Workers idle on their start events until the first
    /// [`Pipeline::run_cycle`] call.
    pub fn init(sample_rate: u32, config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;

        let window_size = config.window_size(sample_rate);
        if window_size == 0 {
            return Err(PipelineError::InvalidConfig(
                "window_size resolved to zero samples".into(),
            ));
        }

        let ring = Arc::new(SampleRing::new(window_size)?);
        let tones = Arc::new(ToneTable::new(sample_rate, window_size));
        let running = Arc::new(AtomicBool::new(true));

        let coordinator = PipelineCoordinator::with_threshold(
            ring.clone(),
            tones.clone(),
            running.clone(),
            config.detection_threshold,
        )?;

        info!(
            sample_rate,
            window_size,
            threshold = config.detection_threshold,
            "DTMF pipeline initialized"
        );

        Ok(Self {
            ring,
            tones,
            coordinator,
            running,
            sample_rate,
            shut_down: false,
        })
    }

    /// Register the sink that receives at most one notification per cycle,
    /// and only when the decoded state actually changed. Must be called
    /// before the first [`Pipeline::run_cycle`] to see every transition;
    /// calling it later only affects subsequent cycles.
    pub fn set_sink(&mut self, sink: Arc<dyn StateChangeSink>) {
        self.coordinator.set_sink(sink);
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Feed one freshly captured sample into the ring. Safe to call from
    /// the capture thread concurrently with a coordinator cycle in
    /// progress -- the ring tolerates torn reads at its write frontier by
    /// design.
    pub fn enqueue_sample(&self, sample: u8) {
        self.assert_running();
        self.ring.push(sample);
    }

    /// Feed a batch of samples in capture order.
    pub fn enqueue_batch(&self, samples: &[u8]) {
        self.assert_running();
        for &sample in samples {
            self.ring.push(sample);
        }
    }

    /// Run one fan-out/wait-all analysis cycle over the ring's current
    /// contents. The caller decides the cadence (e.g. once per captured
    /// buffer); the pipeline itself has no timer of its own.
    pub fn run_cycle(&self) {
        self.assert_running();
        self.coordinator.run_cycle();
    }

    /// A non-blocking snapshot of the eight tone-detected flags and the
    /// keypad decoder's verdict, independent of the sink mechanism.
    pub fn snapshot_tone_state(&self) -> ToneSnapshot {
        ToneSnapshot {
            detected: self.tones.snapshot_detected(),
            key: crate::keypad::decode_key(&self.tones),
        }
    }

    /// Idempotent. Clears `running`, wakes every worker so none stays
    /// parked on its start event, and joins all eight threads. Safe to
    /// call multiple times or from a signal handler's perspective -- the
    /// second call is a cheap no-op.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.coordinator.shutdown();
        self.shut_down = true;
        info!("DTMF pipeline shut down");
    }

    fn assert_running(&self) {
        assert!(
            self.running.load(Ordering::Acquire) && !self.shut_down,
            "DTMF pipeline method called after shutdown or before init completed"
        );
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}
