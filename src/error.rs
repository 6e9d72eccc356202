//! Error types for the boundaries around the simulation
//!
//! `tick` itself is total; errors only arise when feeding it input, loading
//! configuration, or when the host gives up on a misbehaving world.

use thiserror::Error;

use crate::sim::PlayerId;

/// Rejected control input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    /// Aim rotation was NaN or infinite
    #[error("non-finite aim rotation for player {player}: {rotation}")]
    NonFiniteRotation { player: PlayerId, rotation: f32 },

    #[error("unknown player: {0}")]
    UnknownPlayer(PlayerId),

    /// Controls for a player that an AI controller drives
    #[error("player {0} is AI-controlled")]
    AiControlled(PlayerId),
}

/// Invalid match configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("arena must be positive, got {width}x{height}")]
    InvalidArena { width: f32, height: f32 },

    #[error("time limit must be positive, got {0}")]
    InvalidTimeLimit(f32),

    /// A mode would start with players already out of lives
    #[error("{mode} lives must be at least 1")]
    ZeroLives { mode: &'static str },
}

/// Host-level failure policy
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    /// Too many failed frames in a row
    #[error("{failures} consecutive tick failures, last: {last}")]
    TooManyFailures { failures: u32, last: String },
}
