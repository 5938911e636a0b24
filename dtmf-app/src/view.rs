// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! A minimal console view: prints the decoded digit as it changes, and logs
//! the full eight-tone state at `debug` for troubleshooting.

use tracing::debug;

use dtmf_core::{StateChangeSink, ToneSnapshot, COLUMN_FREQUENCIES_HZ, ROW_FREQUENCIES_HZ};

pub struct ConsoleView;

impl StateChangeSink for ConsoleView {
    fn on_state_changed(&self, snapshot: ToneSnapshot) {
        match snapshot.key {
            Some(key) if key.letters.is_empty() => println!("{}", key.digit),
            Some(key) => println!("{} ({})", key.digit, key.letters),
            None => {}
        }

        let detected_hz: Vec<u32> = ROW_FREQUENCIES_HZ
            .iter()
            .chain(COLUMN_FREQUENCIES_HZ.iter())
            .zip(snapshot.detected.iter())
            .filter_map(|(&hz, &on)| on.then_some(hz))
            .collect();
        debug!(?detected_hz, key = ?snapshot.key, "tone state changed");
    }
}
