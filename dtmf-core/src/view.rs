// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! The view contract: a pull-style snapshot and a push-style change
//! notification, per spec section 6. Neither blocks the pipeline -- the
//! sink is a hint to repaint asynchronously, not a rendezvous.

use crate::keypad::KeyLabel;
use crate::tone::TONE_COUNT;

/// A non-blocking, thread-safe snapshot of the eight tone-detected flags
/// plus the keypad decoder's verdict at the moment it was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneSnapshot {
    pub detected: [bool; TONE_COUNT],
    pub key: Option<KeyLabel>,
}

/// Registered once at startup; the core calls this at most once per
/// analysis cycle, and only when at least one tone's detected flag
/// changed.
pub trait StateChangeSink: Send + Sync {
    fn on_state_changed(&self, snapshot: ToneSnapshot);
}

impl<F> StateChangeSink for F
where
    F: Fn(ToneSnapshot) + Send + Sync,
{
    fn on_state_changed(&self, snapshot: ToneSnapshot) {
        self(snapshot)
    }
}
