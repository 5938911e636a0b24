// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! The 4x4 DTMF keypad matrix decoder.
//!
//! Pure function of the eight tone-detected flags; holds no state of its
//! own. A key is pressed iff exactly one row tone and exactly one column
//! tone are simultaneously detected. Any other combination (zero or
//! multiple rows/columns) reports "no key" here, though the individual tone
//! flags stay observable through [`crate::tone::ToneTable::snapshot_detected`].

use crate::tone::{ToneTable, COL_INDICES, ROW_INDICES};

/// A decoded key: its digit/letter and the legacy phone-keypad letter
/// grouping shown above it (display-only, carried over from the original
/// view's keypad table).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyLabel {
    pub digit: char,
    pub letters: &'static str,
}

/// Row-major table of the 16 DTMF keys. Row index 0..4 pairs with column
/// index 4..8 of the tone table, e.g. row 3 / column 7 (941Hz + 1633Hz) is
/// `D` -- the original's fourth-column mapping for A-D is retained as the
/// spec's design notes direct.
const KEY_TABLE: [[KeyLabel; 4]; 4] = [
    [
        KeyLabel { digit: '1', letters: "" },
        KeyLabel { digit: '2', letters: "ABC" },
        KeyLabel { digit: '3', letters: "DEF" },
        KeyLabel { digit: 'A', letters: "" },
    ],
    [
        KeyLabel { digit: '4', letters: "GHI" },
        KeyLabel { digit: '5', letters: "JKL" },
        KeyLabel { digit: '6', letters: "MNO" },
        KeyLabel { digit: 'B', letters: "" },
    ],
    [
        KeyLabel { digit: '7', letters: "PQRS" },
        KeyLabel { digit: '8', letters: "TUV" },
        KeyLabel { digit: '9', letters: "WXYZ" },
        KeyLabel { digit: 'C', letters: "" },
    ],
    [
        KeyLabel { digit: '*', letters: "" },
        KeyLabel { digit: '0', letters: "" },
        KeyLabel { digit: '#', letters: "" },
        KeyLabel { digit: 'D', letters: "" },
    ],
];

/// Decode the current tone state into at most one key. Ambiguous states
/// (multiple rows or multiple columns detected at once) return `None`.
pub fn decode_key(tones: &ToneTable) -> Option<KeyLabel> {
    let detected = tones.snapshot_detected();

    let mut row = None;
    for (row_idx, &tone_idx) in ROW_INDICES.iter().enumerate() {
        if detected[tone_idx] {
            if row.is_some() {
                return None;
            }
            row = Some(row_idx);
        }
    }

    let mut col = None;
    for (col_idx, &tone_idx) in COL_INDICES.iter().enumerate() {
        if detected[tone_idx] {
            if col.is_some() {
                return None;
            }
            col = Some(col_idx);
        }
    }

    match (row, col) {
        (Some(r), Some(c)) => Some(KEY_TABLE[r][c]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_tones_decodes_to_none() {
        let tones = ToneTable::new(8000, 400);
        assert_eq!(decode_key(&tones), None);
    }

    #[test]
    fn single_tone_decodes_to_none() {
        let tones = ToneTable::new(8000, 400);
        tones.record(0, 10.0, true);
        assert_eq!(decode_key(&tones), None);
    }

    #[test]
    fn row_697_col_1336_decodes_to_two() {
        let tones = ToneTable::new(8000, 400);
        tones.record(0, 10.0, true); // 697 Hz
        tones.record(5, 10.0, true); // 1336 Hz
        assert_eq!(decode_key(&tones), Some(KeyLabel { digit: '2', letters: "ABC" }));
    }

    #[test]
    fn row_941_col_1477_decodes_to_hash() {
        let tones = ToneTable::new(8000, 400);
        tones.record(3, 10.0, true); // 941 Hz
        tones.record(6, 10.0, true); // 1477 Hz
        assert_eq!(decode_key(&tones), Some(KeyLabel { digit: '#', letters: "" }));
    }

    #[test]
    fn two_rows_detected_is_ambiguous() {
        let tones = ToneTable::new(8000, 400);
        tones.record(0, 10.0, true);
        tones.record(1, 10.0, true);
        tones.record(5, 10.0, true);
        assert_eq!(decode_key(&tones), None);
    }

    #[test]
    fn d_key_maps_to_fourth_column() {
        let tones = ToneTable::new(8000, 400);
        tones.record(3, 10.0, true); // 941 Hz
        tones.record(7, 10.0, true); // 1633 Hz
        assert_eq!(decode_key(&tones), Some(KeyLabel { digit: 'D', letters: "" }));
    }
}
