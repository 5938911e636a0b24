// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no input device available (requested: {0:?})")]
    NoDevice(Option<String>),

    #[error("failed to enumerate input devices: {0}")]
    DeviceEnumeration(String),

    #[error("failed to query default input stream config: {0}")]
    UnsupportedStreamConfig(String),

    #[error("failed to open input stream: {0}")]
    StreamOpen(String),

    #[error("failed to start input stream: {0}")]
    StreamPlay(String),
}
