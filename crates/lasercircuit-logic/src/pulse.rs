//! Pulse sequences: when an emitter is active.
//!
//! A sequence is a list of ordered, non-overlapping activation windows.
//! It is attached once: setting it a second time is an error, never an
//! overwrite.

use serde::{Deserialize, Serialize};

use crate::error::CircuitError;

/// One activation window covering ticks `start .. start + duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PulseWindow {
    pub start: u64,
    pub duration: u64,
}

impl PulseWindow {
    pub fn new(start: u64, duration: u64) -> Self {
        Self { start, duration }
    }

    /// First tick after the window.
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.duration)
    }

    pub fn contains(&self, tick: u64) -> bool {
        self.start <= tick && tick < self.end()
    }
}

/// The activation windows of one emitter. Empty until set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PulseSequence {
    windows: Vec<PulseWindow>,
}

impl PulseSequence {
    /// Attach a single window.
    pub fn set(&mut self, start: u64, duration: u64, symbol: char) -> Result<(), CircuitError> {
        self.set_windows(&[PulseWindow::new(start, duration)], symbol)
    }

    /// Attach several windows at once. They must be sorted by start, each
    /// at least one tick long, and must not overlap.
    pub fn set_windows(&mut self, windows: &[PulseWindow], symbol: char) -> Result<(), CircuitError> {
        if self.is_set() {
            return Err(CircuitError::SequenceAlreadySet(symbol));
        }
        let mut prev_end = 0;
        for (i, w) in windows.iter().enumerate() {
            if w.duration == 0 || (i > 0 && w.start < prev_end) {
                return Err(CircuitError::InvalidPulseWindow {
                    start: w.start,
                    duration: w.duration,
                });
            }
            prev_end = w.end();
        }
        if windows.is_empty() {
            return Err(CircuitError::InvalidPulseWindow {
                start: 0,
                duration: 0,
            });
        }
        self.windows = windows.to_vec();
        Ok(())
    }

    pub fn is_set(&self) -> bool {
        !self.windows.is_empty()
    }

    pub fn windows(&self) -> &[PulseWindow] {
        &self.windows
    }

    pub fn active_at(&self, tick: u64) -> bool {
        self.window_at(tick).is_some()
    }

    /// Index of the window covering `tick`.
    pub fn window_at(&self, tick: u64) -> Option<usize> {
        self.windows.iter().position(|w| w.contains(tick))
    }

    /// End of the last window, or 0 when unset.
    pub fn end_tick(&self) -> u64 {
        self.windows.last().map_or(0, |w| w.end())
    }
}
