// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! The eight-tone DTMF descriptor table and its Goertzel coefficients.
//!
//! Shape is immutable after [`ToneTable::new`]: `k`, `sin`, `cos`, and
//! `coeff` are computed once and never rewritten short of building a whole
//! new table. Each tone's `detected`/`last_magnitude` pair is written only
//! by the worker that owns that tone index — no cross-tone writes.

use std::f32::consts::PI;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

pub const ROW_FREQUENCIES_HZ: [u32; 4] = [697, 770, 852, 941];
pub const COLUMN_FREQUENCIES_HZ: [u32; 4] = [1209, 1336, 1477, 1633];

/// Row tones occupy indices 0..4, column tones 4..8.
pub const ROW_INDICES: [usize; 4] = [0, 1, 2, 3];
pub const COL_INDICES: [usize; 4] = [4, 5, 6, 7];
pub const TONE_COUNT: usize = 8;

/// One of the eight DTMF tone descriptors. `k`/`sin`/`cos`/`coeff` are the
/// Goertzel coefficients, bin-aligned by rounding `k` to an integer so the
/// target frequency lands exactly on a bin center (no scalloping loss).
pub struct ToneDescriptor {
    pub index: usize,
    pub frequency_hz: u32,
    pub label: String,
    k: u32,
    sin: f32,
    cos: f32,
    coeff: f32,
    last_magnitude: AtomicU32,
    detected: AtomicBool,
}

impl ToneDescriptor {
    fn new(index: usize, frequency_hz: u32, window_size: usize, sample_rate: u32) -> Self {
        let k = (window_size as f32 * frequency_hz as f32 / sample_rate as f32).round();
        let omega = 2.0 * PI * k / window_size as f32;
        let (sin, cos) = omega.sin_cos();
        Self {
            index,
            frequency_hz,
            label: frequency_hz.to_string(),
            k: k as u32,
            sin,
            cos,
            coeff: 2.0 * cos,
            last_magnitude: AtomicU32::new(0f32.to_bits()),
            detected: AtomicBool::new(false),
        }
    }

    pub fn k(&self) -> u32 {
        self.k
    }

    pub fn sin(&self) -> f32 {
        self.sin
    }

    pub fn cos(&self) -> f32 {
        self.cos
    }

    pub fn coeff(&self) -> f32 {
        self.coeff
    }

    pub fn detected(&self) -> bool {
        self.detected.load(Ordering::Acquire)
    }

    pub fn last_magnitude(&self) -> f32 {
        f32::from_bits(self.last_magnitude.load(Ordering::Acquire))
    }

    /// Record a new magnitude and detection state. Returns `true` if
    /// `detected` flipped, which is how the owning worker decides whether
    /// to raise the cycle-global "changed" flag.
    fn set_detected(&self, magnitude: f32, detected: bool) -> bool {
        self.last_magnitude
            .store(magnitude.to_bits(), Ordering::Release);
        let previous = self.detected.swap(detected, Ordering::AcqRel);
        previous != detected
    }
}

/// The 4-row-by-4-column DTMF tone table, laid out row tones first (indices
/// 0..4) then column tones (indices 4..8), matching the row/column split in
/// the spec's keypad decoder.
pub struct ToneTable {
    tones: Vec<ToneDescriptor>,
}

impl ToneTable {
    pub fn new(sample_rate: u32, window_size: usize) -> Self {
        let frequencies = ROW_FREQUENCIES_HZ
            .iter()
            .chain(COLUMN_FREQUENCIES_HZ.iter());
        let tones = frequencies
            .enumerate()
            .map(|(index, &freq)| ToneDescriptor::new(index, freq, window_size, sample_rate))
            .collect();
        Self { tones }
    }

    pub fn get(&self, index: usize) -> &ToneDescriptor {
        &self.tones[index]
    }

    pub fn len(&self) -> usize {
        self.tones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tones.is_empty()
    }

    /// Record a magnitude/detection result for `index`, returning `true` if
    /// the tone's detected flag changed value this cycle.
    pub fn record(&self, index: usize, magnitude: f32, detected: bool) -> bool {
        self.tones[index].set_detected(magnitude, detected)
    }

    /// Non-blocking snapshot of all eight detection flags, in tone-index
    /// order (rows then columns).
    pub fn snapshot_detected(&self) -> [bool; TONE_COUNT] {
        let mut out = [false; TONE_COUNT];
        for (i, tone) in self.tones.iter().enumerate() {
            out[i] = tone.detected();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eight_tones_in_row_then_column_order() {
        let table = ToneTable::new(8000, 400);
        assert_eq!(table.len(), TONE_COUNT);
        for (i, &freq) in ROW_FREQUENCIES_HZ.iter().enumerate() {
            assert_eq!(table.get(i).frequency_hz, freq);
        }
        for (i, &freq) in COLUMN_FREQUENCIES_HZ.iter().enumerate() {
            assert_eq!(table.get(4 + i).frequency_hz, freq);
        }
    }

    #[test]
    fn bin_index_aligns_close_to_target_frequency() {
        let sample_rate = 8000;
        let window_size = 400; // 50ms @ 8kHz
        let table = ToneTable::new(sample_rate, window_size);
        for i in 0..TONE_COUNT {
            let tone = table.get(i);
            let bin_freq = tone.k() as f32 * sample_rate as f32 / window_size as f32;
            assert!(
                (bin_freq - tone.frequency_hz as f32).abs() <= sample_rate as f32 / window_size as f32,
                "tone {} bin frequency {} too far from {}",
                i,
                bin_freq,
                tone.frequency_hz
            );
        }
    }

    #[test]
    fn coefficients_never_recomputed_by_record() {
        let table = ToneTable::new(8000, 400);
        let coeff_before = table.get(0).coeff();
        table.record(0, 42.0, true);
        assert_eq!(table.get(0).coeff(), coeff_before);
    }

    #[test]
    fn record_reports_change_only_on_transition() {
        let table = ToneTable::new(8000, 400);
        assert!(table.record(0, 5.0, true), "false -> true is a change");
        assert!(!table.record(0, 5.0, true), "true -> true is not a change");
        assert!(table.record(0, 0.0, false), "true -> false is a change");
    }
}
