//! Common Types Module
//!
//! Shared types used across the codebase to avoid circular dependencies.

use serde::{Deserialize, Serialize};

/// Identifier of a currency pair (e.g., "EURUSD").
pub type InstrumentId = String;

/// How a follower trade relates to the leader's move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Trade the follower against the leader's move (leader up → follower short)
    Opposite,
    /// Trade the follower with the leader's move
    Same,
}

impl Direction {
    /// Sign to apply to a follower position given the leader's return.
    ///
    /// Returns 0 for a zero return.
    pub fn position_sign(&self, leader_return: f64) -> i8 {
        let leader_sign = if leader_return > 0.0 {
            1
        } else if leader_return < 0.0 {
            -1
        } else {
            0
        };
        match self {
            Direction::Opposite => -leader_sign,
            Direction::Same => leader_sign,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Opposite => write!(f, "opposite"),
            Direction::Same => write!(f, "same"),
        }
    }
}
