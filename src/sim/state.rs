//! World state and entity records
//!
//! Pure data plus constructors. Everything the renderer, UI or a debugger
//! might want to look at lives here and is serializable.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Deserializer, Serialize};

use super::ai::{AiController, Difficulty};
use super::director::generate_wave;
use super::rng::SimRng;
use crate::consts::*;
use crate::settings::SimConfig;

/// Stable entity identifier, unique for the lifetime of a world
pub type EntityId = u32;
/// Players are keyed by their entity id
pub type PlayerId = EntityId;

/// Broad entity category (attribution, debugging)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Player,
    Arrow,
    Wall,
    Pickup,
    Enemy,
}

/// Anything that collides as a circle
pub trait Circle {
    fn center(&self) -> Vec2;
    fn radius(&self) -> f32;
}

/// Match rules variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Duel,
    #[default]
    Ffa,
    Survival,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Duel => "duel",
            GameMode::Ffa => "ffa",
            GameMode::Survival => "survival",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "duel" => Some(GameMode::Duel),
            "ffa" | "timed" => Some(GameMode::Ffa),
            "survival" | "last-stand" => Some(GameMode::Survival),
            _ => None,
        }
    }
}

/// Player animation, in priority order death > hit > fire/special > dash > run > idle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationState {
    #[default]
    Idle,
    Run,
    Fire,
    Hit,
    Death,
    Dash,
    Special,
}

impl AnimationState {
    /// Parse a tag; unknown tags fall back to `Idle` with a warning
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "idle" => AnimationState::Idle,
            "run" | "walk" => AnimationState::Run,
            "fire" | "attack" => AnimationState::Fire,
            "hit" => AnimationState::Hit,
            "death" => AnimationState::Death,
            "dash" => AnimationState::Dash,
            "special" => AnimationState::Special,
            other => {
                log::warn!("Invalid animation state: {other}, defaulting to idle");
                AnimationState::Idle
            }
        }
    }
}

impl<'de> Deserialize<'de> for AnimationState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(AnimationState::from_tag(&tag))
    }
}

/// Per-player intent snapshot, written by the input layer or an AI brain
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Controls {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub shoot: bool,
    pub dash: bool,
    pub special: bool,
    pub explosive_arrow: bool,
    /// Aim direction (radians)
    pub rotation: f32,
}

impl Controls {
    /// Raw movement axis from the direction keys (screen coords, +y down)
    pub fn movement_axis(&self) -> Vec2 {
        let mut axis = Vec2::ZERO;
        if self.up {
            axis.y -= 1.0;
        }
        if self.down {
            axis.y += 1.0;
        }
        if self.left {
            axis.x -= 1.0;
        }
        if self.right {
            axis.x += 1.0;
        }
        axis
    }

    pub fn any_movement(&self) -> bool {
        self.up || self.down || self.left || self.right
    }
}

/// An archer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: String,
    pub pos: Vec2,
    pub vel: Vec2,
    pub rotation: f32,
    pub size: f32,
    pub health: f32,
    pub score: u32,
    pub kills: u32,
    pub deaths: u32,
    pub lives: u32,

    // Ability timers, all count down to zero
    pub shot_cooldown: f32,
    pub dash_cooldown: f32,
    pub special_attack_cooldown: f32,
    pub explosive_arrow_cooldown: f32,
    pub invulnerable_time: f32,
    pub hit_animation_timer: f32,
    pub respawn_timer: f32,

    // Bow
    pub is_drawing_bow: bool,
    pub draw_start_time: Option<f32>,
    pub max_draw_time: f32,
    pub min_draw_time: f32,

    // Special attack charge
    pub is_charging_special: bool,
    pub special_charge_start_time: Option<f32>,

    // Dash
    pub is_dashing: bool,
    pub dash_start_time: Option<f32>,
    pub dash_velocity: Option<Vec2>,

    pub animation_state: AnimationState,
    pub last_damage_from: Option<PlayerId>,
    pub controls: Controls,

    #[serde(default)]
    pub shots_fired: u32,
    #[serde(default)]
    pub shots_hit: u32,
}

impl Player {
    pub fn new(id: PlayerId, name: &str, spawn: Vec2, color: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            color: color.to_string(),
            pos: spawn,
            vel: Vec2::ZERO,
            rotation: 0.0,
            size: PLAYER_RADIUS,
            health: PLAYER_MAX_HEALTH,
            score: 0,
            kills: 0,
            deaths: 0,
            lives: DEFAULT_LIVES,
            shot_cooldown: 0.0,
            dash_cooldown: 0.0,
            special_attack_cooldown: 0.0,
            explosive_arrow_cooldown: 0.0,
            invulnerable_time: 0.0,
            hit_animation_timer: 0.0,
            respawn_timer: 0.0,
            is_drawing_bow: false,
            draw_start_time: None,
            max_draw_time: MAX_DRAW_TIME,
            min_draw_time: MAX_DRAW_TIME * MIN_DRAW_FRACTION,
            is_charging_special: false,
            special_charge_start_time: None,
            is_dashing: false,
            dash_start_time: None,
            dash_velocity: None,
            animation_state: AnimationState::Idle,
            last_damage_from: None,
            controls: Controls::default(),
            shots_fired: 0,
            shots_hit: 0,
        }
    }

    /// Still in the match (has lives left)
    pub fn in_match(&self) -> bool {
        self.lives > 0
    }

    /// In the match and not currently dead-waiting-for-respawn
    pub fn is_alive(&self) -> bool {
        self.lives > 0 && self.health > 0.0
    }

    /// Can be damaged right now
    pub fn is_targetable(&self) -> bool {
        self.is_alive() && self.invulnerable_time <= 0.0
    }

    /// Hit percentage of fired arrows
    pub fn accuracy(&self) -> f32 {
        if self.shots_fired == 0 {
            0.0
        } else {
            self.shots_hit as f32 / self.shots_fired as f32 * 100.0
        }
    }

    /// Seconds the bow has been drawn at `now` (0 when not drawing)
    pub fn draw_time(&self, now: f32) -> f32 {
        match self.draw_start_time {
            Some(start) if self.is_drawing_bow => (now - start).max(0.0),
            _ => 0.0,
        }
    }

    pub fn kind(&self) -> EntityKind {
        EntityKind::Player
    }
}

impl Circle for Player {
    fn center(&self) -> Vec2 {
        self.pos
    }
    fn radius(&self) -> f32 {
        self.size
    }
}

/// Area-effect payload carried by an explosive arrow
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExplosivePayload {
    pub radius: f32,
    pub damage: f32,
}

/// A projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arrow {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub rotation: f32,
    pub size: f32,
    pub damage: f32,
    pub owner_id: PlayerId,
    pub is_weak_shot: bool,
    pub distance_traveled: f32,
    /// Range cap (weak shots only)
    pub range: Option<f32>,
    pub explosive: Option<ExplosivePayload>,
}

impl Arrow {
    /// New arrow; the id is assigned when the world takes ownership
    pub fn new(pos: Vec2, vel: Vec2, rotation: f32, owner_id: PlayerId, damage: f32) -> Self {
        Self {
            id: 0,
            pos,
            vel,
            rotation,
            size: ARROW_RADIUS,
            damage,
            owner_id,
            is_weak_shot: false,
            distance_traveled: 0.0,
            range: None,
            explosive: None,
        }
    }

    /// Range exhausted (only weak shots carry a range)
    pub fn is_spent(&self) -> bool {
        self.is_weak_shot && self.range.is_some_and(|range| self.distance_traveled > range)
    }

    pub fn kind(&self) -> EntityKind {
        EntityKind::Arrow
    }
}

impl Circle for Arrow {
    fn center(&self) -> Vec2 {
        self.pos
    }
    fn radius(&self) -> f32 {
        self.size
    }
}

/// Static circular obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wall {
    pub id: EntityId,
    pub pos: Vec2,
    pub size: f32,
}

impl Wall {
    /// Walls cannot be destroyed
    pub fn health(&self) -> f32 {
        f32::INFINITY
    }

    pub fn kind(&self) -> EntityKind {
        EntityKind::Wall
    }
}

impl Circle for Wall {
    fn center(&self) -> Vec2 {
        self.pos
    }
    fn radius(&self) -> f32 {
        self.size
    }
}

/// Transient area effect left by a detonation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub pos: Vec2,
    pub radius: f32,
    pub time: f32,
    pub max_time: f32,
    pub owner_id: PlayerId,
}

impl Explosion {
    pub fn is_finished(&self) -> bool {
        self.time >= self.max_time
    }
}

/// Survival enemy archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyArchetype {
    /// Skeleton
    Basic,
    /// Zombie
    Tanky,
    /// Ghost
    RangedFast,
    /// Necromancer
    Elite,
}

/// A survival-mode melee enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub archetype: EnemyArchetype,
    pub pos: Vec2,
    pub vel: Vec2,
    pub rotation: f32,
    pub health: f32,
    pub max_health: f32,
    pub size: f32,
    pub speed: f32,
    pub damage: f32,
    pub attack_cooldown: f32,
    /// Score granted to whoever kills it
    pub value: u32,
    pub attacking: bool,
}

impl Enemy {
    pub fn kind(&self) -> EntityKind {
        EntityKind::Enemy
    }
}

impl Circle for Enemy {
    fn center(&self) -> Vec2 {
        self.pos
    }
    fn radius(&self) -> f32 {
        self.size
    }
}

/// A survival wave
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wave {
    pub number: u32,
    pub enemy_count: u32,
    /// Enemies still to be spawned
    pub remaining: u32,
    pub spawn_delay: f32,
    pub last_spawn_time: f32,
    pub is_complete: bool,
}

/// Notable things that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ArrowFired {
        owner: PlayerId,
        arrow: EntityId,
        weak: bool,
        explosive: bool,
    },
    PlayerHit {
        victim: PlayerId,
        attacker: Option<PlayerId>,
        damage: f32,
    },
    PlayerDied {
        victim: PlayerId,
        killer: Option<PlayerId>,
        lives_left: u32,
    },
    PlayerRespawned {
        player: PlayerId,
    },
    Explosion {
        owner: PlayerId,
        pos: Vec2,
        radius: f32,
    },
    EnemySpawned {
        enemy: EntityId,
        archetype: EnemyArchetype,
    },
    EnemyKilled {
        enemy: EntityId,
        killer: PlayerId,
        value: u32,
    },
    WaveCompleted {
        number: u32,
    },
    WaveStarted {
        number: u32,
        enemy_count: u32,
    },
    GameOver {
        winner: Option<PlayerId>,
    },
}

/// Rules that stay fixed for the whole match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRules {
    pub ffa_kill_target: u32,
    pub respawn_delay: f32,
    pub lives: u32,
}

/// Complete simulation state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub players: BTreeMap<PlayerId, Player>,
    pub arrows: Vec<Arrow>,
    pub walls: Vec<Wall>,
    pub explosions: Vec<Explosion>,
    pub enemies: Vec<Enemy>,
    pub arena_size: Vec2,
    pub game_time: f32,
    /// None = no time limit
    pub max_game_time: Option<f32>,
    pub is_game_over: bool,
    pub winner: Option<PlayerId>,
    pub mode: GameMode,
    pub current_wave: Option<Wave>,
    pub completed_waves: u32,
    pub rules: MatchRules,
    pub rng: SimRng,
    /// AI controllers keyed by the player they drive
    pub brains: BTreeMap<PlayerId, AiController>,
    next_id: EntityId,
}

impl World {
    /// Fresh world with arena walls (and the first wave in survival)
    pub fn new(mode: GameMode, config: &SimConfig) -> Self {
        let arena_size = Vec2::new(config.arena_width, config.arena_height);
        let walls = generate_walls(arena_size);
        let next_id = walls.iter().map(|w| w.id).max().unwrap_or(0) + 1;
        let lives = match mode {
            GameMode::Duel => config.duel_lives,
            GameMode::Ffa => config.default_lives,
            GameMode::Survival => config.survival_lives,
        };
        let max_game_time = match mode {
            GameMode::Survival => None,
            _ => Some(config.max_game_time),
        };
        let current_wave = match mode {
            GameMode::Survival => Some(generate_wave(1)),
            _ => None,
        };

        Self {
            players: BTreeMap::new(),
            arrows: Vec::new(),
            walls,
            explosions: Vec::new(),
            enemies: Vec::new(),
            arena_size,
            game_time: 0.0,
            max_game_time,
            is_game_over: false,
            winner: None,
            mode,
            current_wave,
            completed_waves: 0,
            rules: MatchRules {
                ffa_kill_target: config.ffa_kill_target,
                respawn_delay: config.respawn_delay,
                lives,
            },
            rng: SimRng::new(config.seed),
            brains: BTreeMap::new(),
            next_id,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spawn point for the n-th player joining the match
    pub fn spawn_point(&self, index: usize) -> Vec2 {
        if self.mode == GameMode::Survival {
            return Vec2::new(self.arena_size.x / 2.0, self.arena_size.y * 0.75);
        }
        let (w, h) = (self.arena_size.x, self.arena_size.y);
        let inset = 100.0_f32.min(w / 4.0).min(h / 4.0);
        let corners = [
            Vec2::new(inset, inset),
            Vec2::new(w - inset, h - inset),
            Vec2::new(w - inset, inset),
            Vec2::new(inset, h - inset),
        ];
        corners[index % corners.len()]
    }

    /// Add a human-controlled player at the next spawn point
    pub fn add_player(&mut self, name: &str, color: &str) -> PlayerId {
        let id = self.next_entity_id();
        let spawn = self.spawn_point(self.players.len());
        let mut player = Player::new(id, name, spawn, color);
        player.lives = self.rules.lives;
        self.players.insert(id, player);
        id
    }

    /// Add an AI-controlled player
    pub fn add_ai_player(&mut self, name: &str, color: &str, difficulty: Difficulty) -> PlayerId {
        let id = self.add_player(name, color);
        let brain = AiController::new(difficulty, &mut self.rng);
        log::debug!("Created AI player {id} ({name}) with difficulty {difficulty:?}");
        self.brains.insert(id, brain);
        id
    }

    pub fn is_ai(&self, id: PlayerId) -> bool {
        self.brains.contains_key(&id)
    }

    /// Take ownership of an arrow, assigning its id
    pub fn push_arrow(&mut self, mut arrow: Arrow) -> EntityId {
        let id = self.next_entity_id();
        arrow.id = id;
        self.arrows.push(arrow);
        id
    }

    /// Players still holding lives
    pub fn players_in_match(&self) -> impl Iterator<Item = &Player> {
        self.players.values().filter(|p| p.in_match())
    }

    /// Ensure entity lists are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.arrows.sort_by_key(|a| a.id);
        self.enemies.sort_by_key(|e| e.id);
    }
}

/// Four boundary walls plus fixed interior obstacles
pub fn generate_walls(arena_size: Vec2) -> Vec<Wall> {
    let thickness = 20.0;
    let (w, h) = (arena_size.x, arena_size.y);
    let layout = [
        // Boundaries
        (Vec2::new(w / 2.0, thickness / 2.0), thickness),
        (Vec2::new(w / 2.0, h - thickness / 2.0), thickness),
        (Vec2::new(thickness / 2.0, h / 2.0), thickness),
        (Vec2::new(w - thickness / 2.0, h / 2.0), thickness),
        // Obstacles
        (Vec2::new(w / 2.0, h / 2.0), 40.0),
        (Vec2::new(w / 4.0, h / 4.0), 30.0),
        (Vec2::new(w * 0.75, h * 0.75), 30.0),
    ];

    layout
        .iter()
        .enumerate()
        .map(|(i, &(pos, size))| Wall {
            id: i as EntityId + 1,
            pos,
            size,
        })
        .collect()
}
