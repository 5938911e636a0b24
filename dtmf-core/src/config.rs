// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Pipeline configuration. Pure data -- no file I/O or CLI parsing lives
//! here, that's the driving binary's job. Every field has a default so a
//! caller can start from `PipelineConfig::default()` and override only
//! what it cares about.

use serde::{Deserialize, Serialize};

/// Tunables for one [`crate::lifecycle::Pipeline`] instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Goertzel magnitude a tone must reach to be considered "detected".
    pub detection_threshold: f32,

    /// Analysis window length in milliseconds. The ring's capacity (and
    /// each tone's Goertzel bin index) is derived from this and the
    /// sample rate at init time.
    pub window_ms: u32,

    /// How often, in seconds, the capture source logs its per-channel
    /// min/max sample monitoring line. Zero disables monitoring.
    pub monitor_interval_seconds: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            detection_threshold: crate::goertzel::DEFAULT_THRESHOLD,
            window_ms: 50,
            monitor_interval_seconds: 4,
        }
    }
}

impl PipelineConfig {
    /// Ring capacity in samples for a given sample rate, rounded to the
    /// nearest sample per spec section 4.1.
    pub fn window_size(&self, sample_rate: u32) -> usize {
        ((sample_rate as f32) * (self.window_ms as f32) / 1000.0).round() as usize
    }

    pub fn validate(&self) -> Result<(), crate::error::PipelineError> {
        if self.detection_threshold <= 0.0 {
            return Err(crate::error::PipelineError::InvalidConfig(
                "detection_threshold must be positive".into(),
            ));
        }
        if self.window_ms == 0 {
            return Err(crate::error::PipelineError::InvalidConfig(
                "window_ms must be positive".into(),
            ));
        }
        Ok(())
    }
}
