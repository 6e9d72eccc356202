//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Game-time timestamps only (never wall-clock)
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod ai;
pub mod collision;
pub mod combat;
pub mod director;
pub mod rng;
pub mod state;
pub mod tick;

pub use ai::{AiCommand, AiController, DecisionState, Difficulty, Personality};
pub use collision::{CollisionResult, circle_overlap, line_of_sight, resolve_against_walls};
pub use combat::{detonate, explosion_damage, fire_explosive, release_bow, release_special};
pub use director::{evaluate, generate_wave};
pub use rng::SimRng;
pub use state::{
    AnimationState, Arrow, Circle, Controls, Enemy, EnemyArchetype, EntityId, EntityKind,
    Explosion, GameEvent, GameMode, Player, PlayerId, Wall, Wave, World, generate_walls,
};
pub use tick::{TickInput, TickOutcome, tick};
