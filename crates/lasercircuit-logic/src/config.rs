//! Circuit configuration: board limits, capacities and run policies.
//!
//! Every field has a default, so a partial JSON object (or `{}`) is a
//! valid configuration.

use serde::{Deserialize, Serialize};

/// What to do with two beams sharing a cell when frequency mode is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Beams ignore each other and continue independently.
    #[default]
    PassThrough,
    /// Two beams travelling in opposite directions on one cell cancel out.
    Annihilate,
}

/// What to do when the color-frequency table is malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpectrumFallback {
    /// Return the spectrum error to the caller.
    #[default]
    Abort,
    /// Log a warning and build the circuit without frequency mode.
    Disable,
}

/// Limits and policies for one circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitConfig {
    pub max_width: u32,
    pub max_height: u32,
    pub max_emitters: usize,
    pub max_receivers: usize,
    pub collision_policy: CollisionPolicy,
    pub spectrum_fallback: SpectrumFallback,
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self {
            max_width: 64,
            max_height: 64,
            max_emitters: 10,
            max_receivers: 10,
            collision_policy: CollisionPolicy::PassThrough,
            spectrum_fallback: SpectrumFallback::Abort,
        }
    }
}

impl CircuitConfig {
    /// Whether a `width × height` board is allowed.
    pub fn accepts_board(&self, width: u32, height: u32) -> bool {
        (1..=self.max_width).contains(&width) && (1..=self.max_height).contains(&height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let config = CircuitConfig::default();
        assert_eq!(config.max_emitters, 10);
        assert_eq!(config.max_receivers, 10);
        assert_eq!(config.collision_policy, CollisionPolicy::PassThrough);
        assert_eq!(config.spectrum_fallback, SpectrumFallback::Abort);
    }

    #[test]
    fn test_accepts_board() {
        let config = CircuitConfig::default();
        assert!(config.accepts_board(1, 1));
        assert!(config.accepts_board(64, 64));
        assert!(!config.accepts_board(0, 5));
        assert!(!config.accepts_board(5, 65));
    }
}
