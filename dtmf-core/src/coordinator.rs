// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Fans a batch of newly-enqueued samples out to the eight Goertzel
//! workers, waits for all eight to finish, and notifies the view at most
//! once per cycle -- only when a tone's detected flag actually changed.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::error;

use crate::error::PipelineError;
use crate::goertzel::{spawn_worker, WorkerHandle, WorkerShared, DEFAULT_THRESHOLD};
use crate::keypad::decode_key;
use crate::ring::SampleRing;
use crate::tone::ToneTable;
use crate::view::{StateChangeSink, ToneSnapshot};

pub struct PipelineCoordinator {
    ring: Arc<SampleRing>,
    tones: Arc<ToneTable>,
    workers: Vec<WorkerHandle>,
    read_offset: Arc<AtomicUsize>,
    changed: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    sink: Option<Arc<dyn StateChangeSink>>,
}

impl PipelineCoordinator {
    pub fn new(
        ring: Arc<SampleRing>,
        tones: Arc<ToneTable>,
        running: Arc<AtomicBool>,
    ) -> Result<Self, PipelineError> {
        Self::with_threshold(ring, tones, running, DEFAULT_THRESHOLD)
    }

    /// Spawn the eight worker threads and wire them to `ring`/`tones`. If a
    /// thread fails to spawn partway through, the workers already spawned
    /// are woken and joined before the error is returned -- no partially
    /// started pipeline is left behind.
    pub fn with_threshold(
        ring: Arc<SampleRing>,
        tones: Arc<ToneTable>,
        running: Arc<AtomicBool>,
        threshold: f32,
    ) -> Result<Self, PipelineError> {
        let changed = Arc::new(AtomicBool::new(false));
        let read_offset = Arc::new(AtomicUsize::new(0));

        let shared = Arc::new(WorkerShared {
            ring: ring.clone(),
            tones: tones.clone(),
            read_offset: read_offset.clone(),
            changed: changed.clone(),
            running: running.clone(),
            threshold,
        });

        let mut workers = Vec::with_capacity(tones.len());
        for index in 0..tones.len() {
            match spawn_worker(index, shared.clone()) {
                Ok(worker) => workers.push(worker),
                Err(err) => {
                    running.store(false, Ordering::Release);
                    for worker in &workers {
                        worker.start.set();
                    }
                    for worker in &mut workers {
                        worker.join();
                    }
                    return Err(err);
                }
            }
        }

        Ok(Self {
            ring,
            tones,
            workers,
            read_offset,
            changed,
            running,
            sink: None,
        })
    }

    pub fn set_sink(&mut self, sink: Arc<dyn StateChangeSink>) {
        self.sink = Some(sink);
    }

    /// Run one analysis cycle: snapshot the read offset, wake all eight
    /// workers, wait for all eight to finish, and -- only if at least one
    /// flag changed -- build a snapshot and hand it to the registered sink.
    pub fn run_cycle(&self) {
        let offset = self.ring.snapshot_offset();
        self.read_offset.store(offset, Ordering::Release);

        for worker in &self.workers {
            worker.start.set();
        }
        for worker in &self.workers {
            if let Err(reason) = worker.done.wait() {
                error!(index = worker.index, reason, "Goertzel worker done-event wake failed");
            }
        }

        if self.changed.swap(false, Ordering::AcqRel) {
            if let Some(sink) = &self.sink {
                let snapshot = ToneSnapshot {
                    detected: self.tones.snapshot_detected(),
                    key: decode_key(&self.tones),
                };
                sink.on_state_changed(snapshot);
            }
        }
    }

    /// Idempotent: clears `running`, wakes every worker so none stays
    /// blocked on its start event, then joins each thread. A second call
    /// is a cheap no-op because the join handles are already consumed.
    pub fn shutdown(&mut self) {
        self.running.store(false, Ordering::Release);
        for worker in &self.workers {
            worker.start.set();
        }
        for worker in &mut self.workers {
            worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;
    use std::sync::atomic::AtomicUsize as StdAtomicUsize;

    fn push_dual_tone(ring: &SampleRing, row_hz: f32, col_hz: f32, amplitude: f32, sample_rate: u32) {
        for n in 0..ring.capacity() {
            let t = n as f32 / sample_rate as f32;
            let wave = (2.0 * PI * row_hz * t).sin() + (2.0 * PI * col_hz * t).sin();
            let value = 127.0 + amplitude * wave;
            ring.push(value.round().clamp(0.0, 255.0) as u8);
        }
    }

    struct CountingSink {
        calls: StdAtomicUsize,
    }

    impl StateChangeSink for CountingSink {
        fn on_state_changed(&self, _snapshot: ToneSnapshot) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn new_pipeline(sample_rate: u32, window_size: usize) -> (Arc<SampleRing>, Arc<ToneTable>, Arc<AtomicBool>, PipelineCoordinator) {
        let ring = Arc::new(SampleRing::new(window_size).unwrap());
        let tones = Arc::new(ToneTable::new(sample_rate, window_size));
        let running = Arc::new(AtomicBool::new(true));
        let coordinator =
            PipelineCoordinator::new(ring.clone(), tones.clone(), running.clone()).unwrap();
        (ring, tones, running, coordinator)
    }

    #[test]
    fn silence_cycle_never_notifies_sink() {
        let (_ring, _tones, _running, mut coordinator) = new_pipeline(8000, 400);
        let sink = Arc::new(CountingSink { calls: StdAtomicUsize::new(0) });
        coordinator.set_sink(sink.clone());

        coordinator.run_cycle();
        coordinator.run_cycle();

        assert_eq!(sink.calls.load(Ordering::SeqCst), 0);
        coordinator.shutdown();
    }

    #[test]
    fn tone_press_and_release_notifies_exactly_twice() {
        let sample_rate = 8000;
        let window_size = 400;
        let (ring, tones, _running, mut coordinator) = new_pipeline(sample_rate, window_size);
        let sink = Arc::new(CountingSink { calls: StdAtomicUsize::new(0) });
        coordinator.set_sink(sink.clone());

        // Silence cycle: no change.
        coordinator.run_cycle();
        assert_eq!(sink.calls.load(Ordering::SeqCst), 0);

        // Press: 697Hz + 1336Hz -> "2".
        push_dual_tone(&ring, 697.0, 1336.0, 20.0, sample_rate);
        coordinator.run_cycle();
        assert_eq!(sink.calls.load(Ordering::SeqCst), 1);
        assert!(tones.get(0).detected() && tones.get(5).detected());

        // Hold: no flags flip, no further notification.
        coordinator.run_cycle();
        assert_eq!(sink.calls.load(Ordering::SeqCst), 1);

        // Release back to silence.
        for _ in 0..window_size {
            ring.push(crate::ring::SILENCE);
        }
        coordinator.run_cycle();
        assert_eq!(sink.calls.load(Ordering::SeqCst), 2);
        assert!(!tones.get(0).detected() && !tones.get(5).detected());

        coordinator.shutdown();
    }

    #[test]
    fn shutdown_is_idempotent() {
        let (_ring, _tones, _running, mut coordinator) = new_pipeline(8000, 400);
        coordinator.shutdown();
        coordinator.shutdown();
    }
}
