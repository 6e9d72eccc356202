//! Input boundary
//!
//! Hosts translate devices into [`RawControls`] and submit them here. Anything
//! that reaches the simulation has a finite, normalized aim and boolean
//! movement keys.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::normalize_angle;
use crate::sim::{Controls, PlayerId, TickInput, World};

/// Analog axis magnitude that counts as a pressed direction
const AXIS_THRESHOLD: f32 = 0.5;

/// Device-level intent before validation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawControls {
    /// Horizontal axis, -1 (left) to 1 (right)
    pub move_x: f32,
    /// Vertical axis, -1 (up) to 1 (down)
    pub move_y: f32,
    /// Aim direction (radians)
    pub aim: f32,
    pub shoot: bool,
    pub dash: bool,
    pub special: bool,
    pub explosive_arrow: bool,
}

impl RawControls {
    /// Aim at a world-space point from the player's position
    pub fn aiming_at(mut self, from: Vec2, target: Vec2) -> Self {
        let delta = target - from;
        if delta.length_squared() > 0.0 {
            self.aim = delta.y.atan2(delta.x);
        }
        self
    }

    /// Validate and convert for `player`
    ///
    /// Non-finite axes are treated as released; a non-finite aim is rejected.
    pub fn sanitize(&self, player: PlayerId) -> Result<Controls, InputError> {
        if !self.aim.is_finite() {
            return Err(InputError::NonFiniteRotation {
                player,
                rotation: self.aim,
            });
        }
        let axis = |v: f32| if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 };
        let (x, y) = (axis(self.move_x), axis(self.move_y));

        Ok(Controls {
            up: y <= -AXIS_THRESHOLD,
            down: y >= AXIS_THRESHOLD,
            left: x <= -AXIS_THRESHOLD,
            right: x >= AXIS_THRESHOLD,
            shoot: self.shoot,
            dash: self.dash,
            special: self.special,
            explosive_arrow: self.explosive_arrow,
            rotation: normalize_angle(self.aim),
        })
    }
}

/// Check an already-built `Controls` for `player`
pub fn validate_controls(player: PlayerId, controls: Controls) -> Result<Controls, InputError> {
    if !controls.rotation.is_finite() {
        return Err(InputError::NonFiniteRotation {
            player,
            rotation: controls.rotation,
        });
    }
    Ok(Controls {
        rotation: normalize_angle(controls.rotation),
        ..controls
    })
}

/// Validate raw input for a human player and queue it for the next tick
pub fn submit(
    world: &World,
    input: &mut TickInput,
    player: PlayerId,
    raw: RawControls,
) -> Result<(), InputError> {
    if !world.players.contains_key(&player) {
        return Err(InputError::UnknownPlayer(player));
    }
    if world.is_ai(player) {
        return Err(InputError::AiControlled(player));
    }
    let controls = raw.sanitize(player)?;
    input.set(player, controls);
    Ok(())
}
