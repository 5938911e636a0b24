// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Best-effort real-time scheduling hint.
//!
//! The original implementation calls `AvSetMmThreadCharacteristics(L"Capture", ...)`
//! on the capture and Goertzel worker threads to ask Windows' multimedia
//! class scheduler for elevated priority. There is no portable stdlib
//! equivalent, so this is a logged no-op: requesting it and failing is
//! explicitly *not* a correctness requirement (spec section 4.5).
use tracing::debug;

pub fn request_realtime_scheduling(thread_label: &str) {
    debug!(
        thread = thread_label,
        "real-time scheduling class not requested on this platform (best-effort hint only)"
    );
}
