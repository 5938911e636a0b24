// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Fixed-capacity mono PCM sample ring.
//!
//! One writer (the capture thread), many concurrent readers (the Goertzel
//! workers). Each byte lives in its own `AtomicU8` so that a reader
//! iterating the ring while the writer advances never triggers a data race,
//! even though the values it sees at the write frontier may straddle two
//! revolutions — the spec calls this out as an accepted, spectrally
//! negligible race, not a bug to fix.

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use crate::error::PipelineError;

/// Silence for unsigned 8-bit PCM centered at 127.
pub const SILENCE: u8 = 127;

pub struct SampleRing {
    samples: Vec<AtomicU8>,
    write_head: AtomicUsize,
}

impl SampleRing {
    /// Allocate a ring of `capacity` bytes, initialized to silence.
    /// Fails rather than aborting the process if the allocator can't
    /// satisfy the request, per the init-fatal-propagates-to-caller policy.
    pub fn new(capacity: usize) -> Result<Self, PipelineError> {
        let mut samples = Vec::new();
        samples
            .try_reserve_exact(capacity)
            .map_err(|_| PipelineError::RingAllocationFailed(capacity))?;
        samples.resize_with(capacity, || AtomicU8::new(SILENCE));
        Ok(Self {
            samples,
            write_head: AtomicUsize::new(0),
        })
    }

    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Append one sample at the write head and advance it, wrapping modulo
    /// capacity. Must only be called from the capture thread.
    pub fn push(&self, sample: u8) {
        let head = self.write_head.load(Ordering::Relaxed);
        self.samples[head].store(sample, Ordering::Relaxed);
        let next = if head + 1 >= self.samples.len() {
            0
        } else {
            head + 1
        };
        self.write_head.store(next, Ordering::Release);
    }

    /// Capture the current write head as a read offset for one analysis
    /// cycle. Workers must use this value rather than re-reading the write
    /// head mid-computation.
    pub fn snapshot_offset(&self) -> usize {
        self.write_head.load(Ordering::Acquire)
    }

    /// Read the sample `i` positions after `offset`, wrapping modulo
    /// capacity. `i` may be any non-negative value; only `i < capacity` is
    /// meaningful for a full-window Goertzel pass.
    pub fn read_at(&self, offset: usize, i: usize) -> u8 {
        let idx = (offset + i) % self.samples.len();
        self.samples[idx].load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_silence() {
        let ring = SampleRing::new(400).unwrap();
        for i in 0..ring.capacity() {
            assert_eq!(ring.read_at(0, i), SILENCE);
        }
    }

    #[test]
    fn push_wraps_modulo_capacity() {
        let ring = SampleRing::new(4).unwrap();
        for b in [10u8, 20, 30, 40, 50, 60] {
            ring.push(b);
        }
        // Head is now back at index 2 (6 pushes % 4), overwriting in order.
        let offset = ring.snapshot_offset();
        assert_eq!(offset, 2);
        // The last 4 pushes (30, 40, 50, 60) should be the current contents,
        // starting at the write head.
        assert_eq!(ring.read_at(offset, 0), 30);
        assert_eq!(ring.read_at(offset, 1), 40);
        assert_eq!(ring.read_at(offset, 2), 50);
        assert_eq!(ring.read_at(offset, 3), 60);
    }

    #[test]
    fn capacity_matches_fifty_millisecond_window_across_sample_rates() {
        for rate in [8000u32, 11025, 16000, 22050, 44100, 48000] {
            let expected = (rate as f64 * 0.050).round() as usize;
            let ring = SampleRing::new(expected).unwrap();
            assert_eq!(ring.capacity(), expected);
        }
    }
}
