// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! A minimal auto-reset event, standing in for the Win32 `CreateEventA`/
//! `SetEvent`/`WaitForSingleObject` handles the original implementation
//! fans out to its eight worker threads.
//!
//! `set()` wakes exactly one waiter and the event immediately returns to the
//! unsignaled state, matching an auto-reset (`bManualReset = FALSE`) Win32
//! event. `wait()` blocks with no timeout, per the spec's "Timeouts: None"
//! concurrency note.

use std::sync::{Condvar, Mutex};

pub struct AutoResetEvent {
    signaled: Mutex<bool>,
    cvar: Condvar,
}

impl AutoResetEvent {
    pub fn new() -> Self {
        Self {
            signaled: Mutex::new(false),
            cvar: Condvar::new(),
        }
    }

    /// Signal the event, waking a single blocked waiter (or the next caller
    /// to `wait()`, if none is blocked yet).
    pub fn set(&self) {
        let mut signaled = self.signaled.lock().expect("event mutex poisoned");
        *signaled = true;
        self.cvar.notify_one();
    }

    /// Block until signaled, then clear the event before returning. Returns
    /// `Err` instead of panicking if the mutex was poisoned by another
    /// thread panicking while holding it, so a waiter can treat that as a
    /// worker wake anomaly and exit cleanly rather than tearing the whole
    /// process down.
    pub fn wait(&self) -> Result<(), &'static str> {
        let mut signaled = self.signaled.lock().map_err(|_| "event mutex poisoned")?;
        while !*signaled {
            signaled = self.cvar.wait(signaled).map_err(|_| "event mutex poisoned")?;
        }
        *signaled = false;
        Ok(())
    }
}

impl Default for AutoResetEvent {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn set_then_wait_returns_immediately() {
        let event = AutoResetEvent::new();
        event.set();
        event.wait().unwrap();
    }

    #[test]
    fn wait_blocks_until_set_from_another_thread() {
        let event = Arc::new(AutoResetEvent::new());
        let waiter = event.clone();
        let handle = thread::spawn(move || waiter.wait().unwrap());

        thread::sleep(Duration::from_millis(20));
        event.set();
        handle.join().expect("waiter thread panicked");
    }
}
