// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Real-time DTMF (Dual-Tone Multi-Frequency) decoding core.
//!
//! Owns the sample ring, the eight-tone Goertzel worker pool, the pipeline
//! coordinator that fans work out and merges results, and the keypad
//! decoder. No audio backend and no logging subscriber live here — those
//! belong to whatever binary drives this pipeline.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod event;
pub mod goertzel;
pub mod hint;
pub mod keypad;
pub mod lifecycle;
pub mod ring;
pub mod tone;
pub mod view;

pub type DynResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use keypad::{decode_key, KeyLabel};
pub use lifecycle::Pipeline;
pub use tone::{ToneDescriptor, ToneTable, COLUMN_FREQUENCIES_HZ, ROW_FREQUENCIES_HZ};
pub use view::{StateChangeSink, ToneSnapshot};
