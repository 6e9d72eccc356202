//! Personality-driven AI opponents
//!
//! Each AI-driven player owns an [`AiController`]. Once per tick the
//! controller looks at a read-only [`AiView`] of the world and produces the
//! same [`Controls`] a human would, so AI and human players share every rule.
//!
//! Difficulty only biases the personality roll; there is no per-tier logic.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{line_of_sight, ray_miss_distance};
use super::combat::shot_speed;
use super::rng::SimRng;
use super::state::{Arrow, Controls, EntityId, Player, PlayerId, Wall, World};
use crate::{angle_delta, heading};

/// Seconds between strategic decisions
const DECISION_INTERVAL: f32 = 0.5;
/// Arrows farther than this are ignored for dodging
const DANGER_RADIUS: f32 = 300.0;
/// Arrows closer than this may trigger a dodge dash
const DODGE_DASH_RADIUS: f32 = 100.0;
/// Another player this close to a candidate means it is already engaged
const ENGAGED_RADIUS: f32 = 150.0;
/// Normalizes distance and health terms of the target score
const SCORE_DISTANCE_SCALE: f32 = 400.0;
/// Bow is only drawn against targets within this range
const ENGAGE_RANGE: f32 = 400.0;
/// Special attack is only started within this range
const SPECIAL_RANGE: f32 = 300.0;
/// Charge held before the AI lets a special go
const SPECIAL_HOLD: f32 = 0.6;
/// Arrival radius for ambush and patrol points
const ARRIVE_RADIUS: f32 = 20.0;
/// Per-axis dead zone when steering toward a point
const STEER_DEAD_ZONE: f32 = 10.0;
/// Stationary time before random unsticking moves
const STUCK_MOVE_TIME: f32 = 0.5;
/// Stationary time before an unsticking dash
const STUCK_DASH_TIME: f32 = 1.5;
/// Arrow speed assumed when predicting without a drawn bow
const DEFAULT_ARROW_SPEED: f32 = 450.0;
/// Targets slower than this are aimed at directly
const PREDICT_MIN_SPEED: f32 = 10.0;
/// Maximum aim jitter (radians) at zero accuracy
const AIM_JITTER: f32 = 0.3;

/// AI difficulty tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            "expert" => Some(Difficulty::Expert),
            _ => None,
        }
    }

    /// (base, variance) for the combat traits and for dodging/special/adaptability/targeting
    fn trait_bias(&self) -> [(f32, f32); 8] {
        match self {
            Difficulty::Easy => [
                (0.3, 0.2),
                (0.3, 0.2),
                (0.3, 0.2),
                (0.3, 0.2),
                (0.2, 0.1),
                (0.2, 0.1),
                (0.2, 0.1),
                (0.3, 0.1),
            ],
            Difficulty::Medium => [(0.5, 0.2); 8],
            Difficulty::Hard => [(0.7, 0.2); 8],
            Difficulty::Expert => [(0.9, 0.1); 8],
        }
    }
}

/// Behavior scalars, each in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    /// Pursuit and trigger-happiness
    pub aggression: f32,
    /// How long the bow is held
    pub patience: f32,
    /// Tendency to move and dash
    pub mobility: f32,
    /// Aim prediction weight, inverse jitter
    pub accuracy: f32,
    /// Probability of reacting to an incoming arrow
    pub dodging: f32,
    pub special_use: f32,
    /// Target switching and ambushes
    pub adaptability: f32,
    pub targeting: f32,
}

impl Personality {
    /// Roll a personality around the difficulty's bias
    pub fn roll(difficulty: Difficulty, rng: &mut SimRng) -> Self {
        let [agg, pat, mob, acc, dodge, special, adapt, target] = difficulty.trait_bias();
        Self {
            aggression: rng.jitter(agg.0, agg.1),
            patience: rng.jitter(pat.0, pat.1),
            mobility: rng.jitter(mob.0, mob.1),
            accuracy: rng.jitter(acc.0, acc.1),
            dodging: rng.jitter(dodge.0, dodge.1),
            special_use: rng.jitter(special.0, special.1),
            adaptability: rng.jitter(adapt.0, adapt.1),
            targeting: rng.jitter(target.0, target.1),
        }
    }
}

/// Mutable decision memory of one AI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionState {
    pub target_id: Option<PlayerId>,
    /// Game time of the last strategic decision
    pub last_decision_time: Option<f32>,
    pub decision_interval: f32,
    pub preferred_distance: f32,
    pub patrol_point: Option<Vec2>,
    pub patrol_until: f32,
    pub ambush_point: Option<Vec2>,
    pub ambush_until: f32,
    pub stuck_time: f32,
    pub last_position: Option<Vec2>,
    pub last_shot_time: Option<f32>,
    /// Arrows currently on a collision course
    pub dangerous_arrows: Vec<EntityId>,
    /// Whether the last command asked to move (stuck detection)
    pub wants_to_move: bool,
}

impl DecisionState {
    pub fn new(preferred_distance: f32) -> Self {
        Self {
            target_id: None,
            last_decision_time: None,
            decision_interval: DECISION_INTERVAL,
            preferred_distance,
            patrol_point: None,
            patrol_until: 0.0,
            ambush_point: None,
            ambush_until: 0.0,
            stuck_time: 0.0,
            last_position: None,
            last_shot_time: None,
            dangerous_arrows: Vec::new(),
            wants_to_move: false,
        }
    }
}

/// What an AI wants its player to do this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiCommand {
    pub controls: Controls,
    pub aim_rotation: f32,
}

/// Read-only slice of the world handed to AI controllers
#[derive(Debug, Clone, Copy)]
pub struct AiView<'a> {
    pub players: &'a BTreeMap<PlayerId, Player>,
    pub arrows: &'a [Arrow],
    pub walls: &'a [Wall],
    pub arena_size: Vec2,
    pub game_time: f32,
}

impl<'a> AiView<'a> {
    pub fn of(world: &'a World) -> Self {
        Self {
            players: &world.players,
            arrows: &world.arrows,
            walls: &world.walls,
            arena_size: world.arena_size,
            game_time: world.game_time,
        }
    }
}

/// One AI opponent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiController {
    pub difficulty: Difficulty,
    pub personality: Personality,
    pub state: DecisionState,
}

impl AiController {
    pub fn new(difficulty: Difficulty, rng: &mut SimRng) -> Self {
        let personality = Personality::roll(difficulty, rng);
        let preferred_distance = rng.range(200.0, 300.0);
        Self {
            difficulty,
            personality,
            state: DecisionState::new(preferred_distance),
        }
    }

    /// Produce this tick's command; `None` while the player is dead
    pub fn update(
        &mut self,
        me: PlayerId,
        view: &AiView,
        rng: &mut SimRng,
        dt: f32,
    ) -> Option<AiCommand> {
        let player = view.players.get(&me)?;
        if !player.is_alive() {
            self.state.dangerous_arrows.clear();
            self.state.wants_to_move = false;
            return None;
        }

        self.track_stuck(player, dt);

        let target_lost = self
            .state
            .target_id
            .is_some_and(|id| !view.players.get(&id).is_some_and(Player::is_alive));
        let decision_due = self
            .state
            .last_decision_time
            .is_none_or(|t| view.game_time - t >= self.state.decision_interval);
        if decision_due || target_lost {
            self.state.last_decision_time = Some(view.game_time);
            self.decide(player, view, rng);
        }

        self.track_dangerous_arrows(player, view.arrows);

        let mut controls = self.movement(player, view, rng);
        self.combat(player, view, rng, &mut controls);
        let aim_rotation = self.aim(player, view, rng);
        controls.rotation = aim_rotation;
        self.state.wants_to_move = controls.any_movement() || controls.dash;

        Some(AiCommand {
            controls,
            aim_rotation,
        })
    }

    /// Desirability of `candidate` as a target for `me`
    pub fn score_target(
        &self,
        me: &Player,
        candidate: &Player,
        players: &BTreeMap<PlayerId, Player>,
    ) -> f32 {
        let p = &self.personality;
        let distance = me.pos.distance(candidate.pos);

        let distance_factor =
            1.0 - (distance - self.state.preferred_distance).abs() / SCORE_DISTANCE_SCALE;
        let mut score = distance_factor * 2.0;

        let health_factor = if p.aggression > 0.5 {
            (100.0 - candidate.health) / 100.0
        } else {
            (me.health - candidate.health) / 100.0
        };
        score += health_factor * 3.0;

        let engaged = players.values().any(|other| {
            other.id != me.id
                && other.id != candidate.id
                && other.is_alive()
                && other.pos.distance(candidate.pos) < ENGAGED_RADIUS
        });
        if engaged {
            score += (1.0 - p.aggression) * 2.0;
        }

        if me.last_damage_from == Some(candidate.id) {
            score += p.aggression * 4.0;
        }

        score
    }

    /// Strategic decision: target, ambush and patrol
    fn decide(&mut self, me: &Player, view: &AiView, rng: &mut SimRng) {
        let now = view.game_time;
        let candidates: Vec<&Player> = view
            .players
            .values()
            .filter(|p| p.id != me.id && p.is_alive())
            .collect();

        if candidates.is_empty() {
            self.state.target_id = None;
            if self.state.patrol_point.is_none() || self.state.patrol_until <= now {
                self.state.patrol_point = Some(rng.point_in(view.arena_size, 50.0));
                self.state.patrol_until = now + rng.range(3.0, 8.0);
            }
            return;
        }

        let current_valid = self
            .state
            .target_id
            .is_some_and(|id| candidates.iter().any(|c| c.id == id));
        let switch = !current_valid || rng.chance(0.1 * self.personality.adaptability);

        if switch {
            let mut best: Option<(PlayerId, f32)> = None;
            for candidate in &candidates {
                let score = self.score_target(me, candidate, view.players);
                if best.is_none_or(|(_, s)| score > s) {
                    best = Some((candidate.id, score));
                }
            }
            let chosen = best.map(|(id, _)| id);
            if chosen != self.state.target_id {
                log::trace!("AI {} switched target to {chosen:?}", me.id);
            }
            self.state.target_id = chosen;
        }

        let should_ambush = self.personality.adaptability > 0.7
            && rng.chance(0.05)
            && self.state.ambush_until <= now;
        if should_ambush {
            let (w, h) = (view.arena_size.x, view.arena_size.y);
            let spots = [
                Vec2::new(100.0, 100.0),
                Vec2::new(w - 100.0, 100.0),
                Vec2::new(100.0, h - 100.0),
                Vec2::new(w - 100.0, h - 100.0),
                Vec2::new(w / 2.0, 100.0),
                Vec2::new(w / 2.0, h - 100.0),
                Vec2::new(100.0, h / 2.0),
                Vec2::new(w - 100.0, h / 2.0),
            ];
            self.state.ambush_point = Some(spots[rng.index(spots.len())]);
            self.state.ambush_until = now + rng.range(5.0, 15.0);
        }
    }

    fn track_stuck(&mut self, me: &Player, dt: f32) {
        let moved = self
            .state
            .last_position
            .is_none_or(|last| last.distance(me.pos) > 0.5);
        if moved {
            self.state.last_position = Some(me.pos);
            self.state.stuck_time = 0.0;
        } else if self.state.wants_to_move {
            self.state.stuck_time += dt;
        } else {
            self.state.stuck_time = 0.0;
        }
    }

    fn track_dangerous_arrows(&mut self, me: &Player, arrows: &[Arrow]) {
        self.state.dangerous_arrows = arrows
            .iter()
            .filter(|a| a.owner_id != me.id && a.pos.distance(me.pos) <= DANGER_RADIUS)
            .filter(|a| ray_miss_distance(a.pos, a.vel, me.pos).is_some_and(|d| d <= me.size))
            .map(|a| a.id)
            .collect();
    }

    fn movement(&mut self, me: &Player, view: &AiView, rng: &mut SimRng) -> Controls {
        let mut controls = Controls::default();
        let p = &self.personality;
        let now = view.game_time;

        // Dodge the closest incoming arrow
        if !self.state.dangerous_arrows.is_empty() && rng.chance(p.dodging) {
            let closest = view
                .arrows
                .iter()
                .filter(|a| self.state.dangerous_arrows.contains(&a.id))
                .min_by(|a, b| a.pos.distance(me.pos).total_cmp(&b.pos.distance(me.pos)));
            if let Some(arrow) = closest {
                let dir = arrow.vel.try_normalize().unwrap_or_else(|| heading(arrow.rotation));
                let side = if rng.chance(0.5) {
                    Vec2::new(-dir.y, dir.x)
                } else {
                    Vec2::new(dir.y, -dir.x)
                };
                press_toward(&mut controls, side, 0.1);
                if arrow.pos.distance(me.pos) < DODGE_DASH_RADIUS
                    && me.dash_cooldown <= 0.0
                    && rng.chance(p.dodging * 0.8)
                {
                    controls.dash = true;
                }
                return controls;
            }
        }

        if self.state.stuck_time > STUCK_MOVE_TIME {
            press_random(&mut controls, rng);
            if self.state.stuck_time > STUCK_DASH_TIME && me.dash_cooldown <= 0.0 {
                controls.dash = true;
            }
            return controls;
        }

        if let Some(point) = self.state.ambush_point
            && self.state.ambush_until > now
        {
            let delta = point - me.pos;
            if delta.length() >= ARRIVE_RADIUS {
                press_toward(&mut controls, delta, STEER_DEAD_ZONE);
            }
            return controls;
        }

        if let Some(target) = self.current_target(view) {
            let delta = target.pos - me.pos;
            let distance = delta.length();
            let preferred = self.state.preferred_distance;

            if distance > preferred * 1.2 {
                press_toward(&mut controls, delta, STEER_DEAD_ZONE);
            } else if distance < preferred * 0.8 {
                press_toward(&mut controls, -delta, STEER_DEAD_ZONE);
            } else {
                let strafe = if rng.chance(0.5) {
                    Vec2::new(-delta.y, delta.x)
                } else {
                    Vec2::new(delta.y, -delta.x)
                };
                press_toward(&mut controls, strafe, 0.0);
            }

            if me.dash_cooldown <= 0.0 && rng.chance(p.mobility * 0.2) {
                let charge = p.aggression > 0.6 && distance > preferred;
                let flee = p.aggression < 0.4 && distance < preferred * 0.7;
                controls.dash = charge || flee;
            }
            return controls;
        }

        if let Some(point) = self.state.patrol_point {
            let delta = point - me.pos;
            if delta.length() >= ARRIVE_RADIUS {
                press_toward(&mut controls, delta, STEER_DEAD_ZONE);
            }
            return controls;
        }

        if rng.chance(p.mobility * 0.3) {
            press_random(&mut controls, rng);
        }
        controls
    }

    fn combat(&mut self, me: &Player, view: &AiView, rng: &mut SimRng, controls: &mut Controls) {
        let now = view.game_time;
        let p = &self.personality;

        // Hold a started special until it is worth releasing
        if me.is_charging_special {
            let charged = me.special_charge_start_time.map_or(0.0, |t| now - t);
            controls.special = charged < SPECIAL_HOLD;
            return;
        }

        let Some(target) = self.current_target(view) else {
            return;
        };
        let distance = me.pos.distance(target.pos);
        let clear = line_of_sight(me.pos, target.pos, view.walls);

        if me.special_attack_cooldown <= 0.0
            && clear
            && distance < SPECIAL_RANGE
            && rng.chance(p.special_use * 0.3)
        {
            controls.special = true;
            return;
        }

        if !clear || distance >= ENGAGE_RANGE {
            // Keep a drawn bow drawn; letting go here would loose into cover
            controls.shoot = me.is_drawing_bow;
            return;
        }

        if me.is_drawing_bow {
            let distance_factor = (distance / 300.0).min(1.0);
            let optimal = me.min_draw_time
                + (me.max_draw_time - me.min_draw_time)
                    * (p.patience * 0.5 + distance_factor * 0.2);
            if me.draw_time(now) >= optimal {
                self.state.last_shot_time = Some(now);
            } else {
                controls.shoot = true;
            }
        } else {
            let wait = 0.2 + (1.0 - p.aggression) * 0.8;
            let since = self.state.last_shot_time.map_or(f32::INFINITY, |t| now - t);
            if since > wait || rng.chance(p.aggression * 0.3) {
                controls.shoot = true;
            }
        }
    }

    /// Aim: straight line blended with a predicted intercept, plus jitter
    fn aim(&self, me: &Player, view: &AiView, rng: &mut SimRng) -> f32 {
        let Some(target) = self.current_target(view) else {
            if me.vel.length_squared() > 0.0 {
                return me.vel.y.atan2(me.vel.x);
            }
            return me.rotation;
        };
        let p = &self.personality;
        let delta = target.pos - me.pos;
        let direct = delta.y.atan2(delta.x);
        let mut aim = direct;

        if target.vel.length() > PREDICT_MIN_SPEED {
            let arrow_speed = if me.is_drawing_bow {
                shot_speed(me.draw_time(view.game_time), me.min_draw_time, me.max_draw_time)
            } else {
                DEFAULT_ARROW_SPEED
            };
            let lead = delta.length() / arrow_speed.max(1.0);
            let predicted = target.pos + target.vel * lead - me.pos;
            let predicted_angle = predicted.y.atan2(predicted.x);
            aim += angle_delta(direct, predicted_angle) * p.accuracy;
        }

        aim + (rng.unit() - 0.5) * (1.0 - p.accuracy) * AIM_JITTER
    }

    fn current_target<'v>(&self, view: &AiView<'v>) -> Option<&'v Player> {
        self.state
            .target_id
            .and_then(|id| view.players.get(&id))
            .filter(|t| t.is_alive())
    }
}

/// Press the direction keys pointing along `dir`, ignoring small components
fn press_toward(controls: &mut Controls, dir: Vec2, dead_zone: f32) {
    controls.left = dir.x < -dead_zone;
    controls.right = dir.x > dead_zone;
    controls.up = dir.y < -dead_zone;
    controls.down = dir.y > dead_zone;
}

fn press_random(controls: &mut Controls, rng: &mut SimRng) {
    match rng.index(4) {
        0 => controls.up = true,
        1 => controls.down = true,
        2 => controls.left = true,
        _ => controls.right = true,
    }
}
