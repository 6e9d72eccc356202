//! Arrow Arena - deterministic arena archery simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, combat, collisions, AI, waves)
//! - `input`: Sanitization of raw control intents at the input boundary
//! - `host`: Frame runner with dt clamping, watchdog and failure policy
//! - `settings`: Match configuration

pub mod error;
pub mod host;
pub mod input;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, HostError, InputError};
pub use host::{MatchHooks, MatchRunner};
pub use settings::SimConfig;

use glam::Vec2;

/// Simulation tuning constants
pub mod consts {
    /// Largest frame step the simulation accepts (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Default arena dimensions
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 600.0;
    /// Default match length for PvP modes (seconds)
    pub const MAX_GAME_TIME: f32 = 120.0;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 24.0;
    pub const PLAYER_MAX_HEALTH: f32 = 100.0;
    pub const DEFAULT_LIVES: u32 = 3;
    pub const DUEL_LIVES: u32 = 1;
    pub const MOVE_SPEED: f32 = 200.0;
    /// Movement multiplier while the bow is drawn
    pub const DRAW_MOVE_FACTOR: f32 = 0.4;

    /// Dash: fixed-duration linear burst
    pub const DASH_SPEED: f32 = 800.0;
    pub const DASH_DURATION: f32 = 0.15;
    pub const DASH_COOLDOWN: f32 = 1.5;

    /// Bow draw
    pub const MAX_DRAW_TIME: f32 = 1.5;
    /// Fraction of max draw below which a release is a weak shot
    pub const MIN_DRAW_FRACTION: f32 = 0.3;
    pub const SHOT_COOLDOWN: f32 = 0.2;
    pub const ARROW_MIN_DAMAGE: f32 = 5.0;
    pub const ARROW_MAX_DAMAGE: f32 = 25.0;
    pub const ARROW_MIN_SPEED: f32 = 300.0;
    pub const ARROW_MAX_SPEED: f32 = 600.0;
    pub const WEAK_SHOT_DAMAGE: f32 = 1.0;
    pub const WEAK_SHOT_SPEED_FACTOR: f32 = 0.3;
    /// Empirical range cap for weak shots
    pub const WEAK_SHOT_RANGE: f32 = 200.0;
    pub const ARROW_RADIUS: f32 = 5.0;
    /// Gap between the archer's body and a freshly spawned arrow
    pub const ARROW_SPAWN_GAP: f32 = 5.0;
    /// Arrows are dropped once they leave the arena by more than this
    pub const ARROW_BOUNDS_MARGIN: f32 = 0.0;

    /// Special attack: charged triple volley
    pub const SPECIAL_MIN_CHARGE: f32 = 0.5;
    pub const SPECIAL_ARROW_SPEED: f32 = 500.0;
    pub const SPECIAL_ARROW_DAMAGE: f32 = 15.0;
    pub const SPECIAL_SPREAD: f32 = 0.1;
    pub const SPECIAL_COOLDOWN: f32 = 5.0;

    /// Explosive arrow
    pub const EXPLOSIVE_ARROW_SPEED: f32 = 400.0;
    pub const EXPLOSIVE_ARROW_DAMAGE: f32 = 20.0;
    pub const EXPLOSION_RADIUS: f32 = 100.0;
    pub const EXPLOSION_DAMAGE: f32 = 40.0;
    /// Exponent of the distance falloff (1.0 = linear)
    pub const EXPLOSION_FALLOFF_EXPONENT: f32 = 1.0;
    pub const EXPLOSION_LIFETIME: f32 = 0.5;
    pub const EXPLOSIVE_COOLDOWN: f32 = 30.0;

    /// Hit reaction
    pub const HIT_ANIMATION_TIME: f32 = 0.5;
    pub const HIT_INVULNERABILITY: f32 = 0.1;
    pub const RESPAWN_DELAY: f32 = 1.0;
    pub const SPAWN_INVULNERABILITY: f32 = 0.5;
    pub const KILL_SCORE: u32 = 100;

    /// FFA ends when someone reaches this many kills
    pub const FFA_KILL_TARGET: u32 = 10;

    /// Separation below which overlaps are ignored (keeps push-out idempotent)
    pub const COLLISION_EPSILON: f32 = 1e-3;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    // rem_euclid can round up to TAU itself
    if wrapped >= PI { -PI } else { wrapped }
}

/// Unit vector pointing along `angle`
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Signed shortest rotation from `from` to `to`
#[inline]
pub fn angle_delta(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_wraps() {
        // 3π sits on the seam; either end of the range is acceptable
        assert!((normalize_angle(3.0 * PI).abs() - PI).abs() < 1e-4);
        assert!((normalize_angle(-1.5 * PI) - 0.5 * PI).abs() < 1e-4);
        assert_eq!(normalize_angle(f32::NAN), 0.0);
    }

    #[test]
    fn test_normalize_angle_huge_values_stay_in_range() {
        for angle in [1e9, -1e9, 5e8, f32::MAX, f32::MIN, PI, -PI] {
            let n = normalize_angle(angle);
            assert!((-PI..PI).contains(&n), "{angle} -> {n}");
        }
    }

    #[test]
    fn test_angle_delta_takes_short_way() {
        let d = angle_delta(PI - 0.1, -PI + 0.1);
        assert!((d - 0.2).abs() < 1e-4);
    }
}
