// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Pipeline error types.
//!
//! Follows the error policy table in the spec: init-fatal errors propagate
//! to the caller with no partial startup, worker wake anomalies clear
//! `running` and drain the pipeline, and caller misuse is a fatal assertion
//! rather than a recoverable `Result`.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to allocate the {0}-byte sample ring")]
    RingAllocationFailed(usize),

    #[error("failed to spawn Goertzel worker thread for tone index {index}: {source}")]
    WorkerSpawnFailed { index: usize, source: io::Error },

    #[error("{0}")]
    InvalidConfig(String),
}

/// A worker's wait on its start event failed or returned for an
/// unrecognized reason. Per the spec this is never retried: it clears
/// `running` and the worker exits.
#[derive(Debug, Error)]
#[error("Goertzel worker {index} wake failed: {reason}")]
pub struct WorkerWakeError {
    pub index: usize,
    pub reason: &'static str,
}
