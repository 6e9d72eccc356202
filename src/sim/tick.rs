//! Simulation tick - the core update loop
//!
//! This is the heart of the simulation. Each tick:
//! 1. Advances game time and checks the time limit
//! 2. Applies human input, runs AI brains, updates players (abilities, movement)
//! 3. Resolves player collisions (walls, each other), then survival enemies
//! 4. Moves arrows and resolves hits
//! 5. Evaluates waves and game-over conditions
//! 6. Ages explosions

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ai::AiView;
use super::collision::{
    clamp_to_arena, out_of_bounds, resolve_against_walls, separate_pair, touching,
};
use super::combat::{
    apply_hit, begin_draw, begin_special_charge, damage_enemy, detonate, fire_explosive,
    release_bow, release_special,
};
use super::director;
use super::state::{AnimationState, Arrow, Controls, GameEvent, GameMode, Player, PlayerId, World};
use crate::consts::*;
use crate::{heading, normalize_angle};

/// Respawn points keep this far from the arena edge
const RESPAWN_MARGIN: f32 = 50.0;

/// Input for a single tick
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickInput {
    /// Controls for human players; players absent here keep last tick's controls
    pub controls: BTreeMap<PlayerId, Controls>,
}

impl TickInput {
    pub fn set(&mut self, player: PlayerId, controls: Controls) {
        self.controls.insert(player, controls);
    }
}

/// What happened during a tick
#[derive(Debug, Clone, Default)]
pub struct TickOutcome {
    pub events: Vec<GameEvent>,
}

impl TickOutcome {
    /// Players who died this tick
    pub fn deaths(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.events.iter().filter_map(|e| match e {
            GameEvent::PlayerDied { victim, .. } => Some(*victim),
            _ => None,
        })
    }

    /// `Some(winner)` if the match ended this tick
    pub fn game_over(&self) -> Option<Option<PlayerId>> {
        self.events.iter().find_map(|e| match e {
            GameEvent::GameOver { winner } => Some(*winner),
            _ => None,
        })
    }
}

/// Advance the world by `dt` seconds
pub fn tick(world: &mut World, input: &TickInput, dt: f32) -> TickOutcome {
    let mut events = Vec::new();
    if world.is_game_over {
        return TickOutcome { events };
    }

    let dt = if dt.is_finite() && dt > 0.0 {
        dt.min(MAX_FRAME_DT)
    } else {
        0.0
    };

    // 1. Time
    world.game_time += dt;
    if director::check_time_limit(world, &mut events) {
        return TickOutcome { events };
    }

    // 2. Intent, then player state machines
    apply_input(world, input);
    run_brains(world, dt);
    let fired = update_players(world, dt, &mut events);
    for arrow in fired {
        let (owner, weak, explosive) = (arrow.owner_id, arrow.is_weak_shot, arrow.explosive.is_some());
        let id = world.push_arrow(arrow);
        events.push(GameEvent::ArrowFired {
            owner,
            arrow: id,
            weak,
            explosive,
        });
    }

    // 3. Collisions
    resolve_player_collisions(world);
    if world.mode == GameMode::Survival {
        director::update_enemies(world, dt, &mut events);
    }

    // 4. Arrows
    update_arrows(world, dt, &mut events);

    // 5. Waves and game over
    director::evaluate(world, &mut events);

    // 6. Explosions
    for explosion in &mut world.explosions {
        explosion.time += dt;
    }
    world.explosions.retain(|e| !e.is_finished());

    world.normalize_order();
    TickOutcome { events }
}

/// Copy human controls onto their (living, non-AI) players
fn apply_input(world: &mut World, input: &TickInput) {
    for (id, controls) in &input.controls {
        if world.brains.contains_key(id) {
            continue;
        }
        if let Some(player) = world.players.get_mut(id)
            && player.is_alive()
        {
            player.controls = *controls;
        }
    }
}

/// Let every AI brain write its player's controls
fn run_brains(world: &mut World, dt: f32) {
    let view = AiView {
        players: &world.players,
        arrows: &world.arrows,
        walls: &world.walls,
        arena_size: world.arena_size,
        game_time: world.game_time,
    };

    let mut commands = Vec::new();
    for (&id, brain) in world.brains.iter_mut() {
        if let Some(command) = brain.update(id, &view, &mut world.rng, dt) {
            commands.push((id, command));
        }
    }

    for (id, command) in commands {
        if let Some(player) = world.players.get_mut(&id) {
            player.controls = command.controls;
            player.controls.rotation = command.aim_rotation;
        }
    }
}

/// Per-player timers, respawn, dash, movement and weapons; returns new arrows
fn update_players(world: &mut World, dt: f32, events: &mut Vec<GameEvent>) -> Vec<Arrow> {
    let now = world.game_time;
    let arena = world.arena_size;
    let mut fired = Vec::new();

    for player in world.players.values_mut() {
        if !player.in_match() {
            continue;
        }

        if player.health <= 0.0 {
            player.respawn_timer = (player.respawn_timer - dt).max(0.0);
            if player.respawn_timer <= 0.0 {
                let mut spawn = world.rng.point_in(arena, RESPAWN_MARGIN);
                resolve_against_walls(&mut spawn, player.size, &world.walls);
                respawn(player, clamp_to_arena(spawn, player.size, arena));
                events.push(GameEvent::PlayerRespawned { player: player.id });
            }
            continue;
        }

        decay_timers(player, dt);

        let controls = player.controls;
        if controls.rotation.is_finite() {
            player.rotation = normalize_angle(controls.rotation);
        }

        update_movement(player, &controls, now, dt);

        // Bow: hold to draw, let go to release
        if controls.shoot && !player.is_drawing_bow {
            begin_draw(player, now);
        } else if !controls.shoot && player.is_drawing_bow {
            fired.push(release_bow(player, now));
        }

        // Special: hold to charge, let go to fire
        if controls.special && !player.is_charging_special {
            begin_special_charge(player, now);
        } else if !controls.special && player.is_charging_special {
            fired.extend(release_special(player, now));
        }

        if controls.explosive_arrow
            && let Some(arrow) = fire_explosive(player)
        {
            fired.push(arrow);
        }

        player.pos = clamp_to_arena(player.pos, player.size, arena);
        player.animation_state = animation_for(player);
    }

    fired
}

fn decay_timers(player: &mut Player, dt: f32) {
    for timer in [
        &mut player.shot_cooldown,
        &mut player.dash_cooldown,
        &mut player.special_attack_cooldown,
        &mut player.explosive_arrow_cooldown,
        &mut player.invulnerable_time,
        &mut player.hit_animation_timer,
    ] {
        *timer = (*timer - dt).max(0.0);
    }
}

/// Dash start/continue/end, otherwise normal walking
fn update_movement(player: &mut Player, controls: &Controls, now: f32, dt: f32) {
    let axis = controls.movement_axis().normalize_or_zero();

    if controls.dash && !player.is_dashing && player.dash_cooldown <= 0.0 {
        let dir = if axis != Vec2::ZERO {
            axis
        } else {
            heading(player.rotation)
        };
        player.is_dashing = true;
        player.dash_start_time = Some(now);
        player.dash_velocity = Some(dir * DASH_SPEED);
        player.dash_cooldown = DASH_COOLDOWN;
    }

    if player.is_dashing {
        let elapsed = player.dash_start_time.map_or(DASH_DURATION, |start| now - start);
        let remaining = (DASH_DURATION - elapsed).max(0.0);
        match player.dash_velocity {
            Some(velocity) if remaining > 1e-6 => {
                player.vel = velocity;
                player.pos += velocity * remaining.min(dt);
                return;
            }
            _ => {
                player.is_dashing = false;
                player.dash_start_time = None;
                player.dash_velocity = None;
            }
        }
    }

    let speed = if player.is_drawing_bow {
        MOVE_SPEED * DRAW_MOVE_FACTOR
    } else {
        MOVE_SPEED
    };
    player.vel = axis * speed;
    player.pos += player.vel * dt;
}

/// Animation priority: death > hit > fire/special > dash > run > idle
fn animation_for(player: &Player) -> AnimationState {
    if player.health <= 0.0 {
        AnimationState::Death
    } else if player.hit_animation_timer > 0.0 {
        AnimationState::Hit
    } else if player.is_drawing_bow || player.controls.shoot {
        AnimationState::Fire
    } else if player.is_charging_special {
        AnimationState::Special
    } else if player.is_dashing {
        AnimationState::Dash
    } else if player.vel != Vec2::ZERO {
        AnimationState::Run
    } else {
        AnimationState::Idle
    }
}

fn respawn(player: &mut Player, pos: Vec2) {
    player.pos = pos;
    player.vel = Vec2::ZERO;
    player.health = PLAYER_MAX_HEALTH;
    player.respawn_timer = 0.0;
    player.invulnerable_time = SPAWN_INVULNERABILITY;
    player.hit_animation_timer = 0.0;
    player.animation_state = AnimationState::Idle;
    player.last_damage_from = None;
    player.controls = Controls::default();
}

/// Push living players out of walls and apart from each other
fn resolve_player_collisions(world: &mut World) {
    let arena = world.arena_size;
    let mut bodies: Vec<(PlayerId, Vec2, f32)> = world
        .players
        .values()
        .filter(|p| p.is_alive())
        .map(|p| (p.id, p.pos, p.size))
        .collect();

    for (_, pos, size) in bodies.iter_mut() {
        resolve_against_walls(pos, *size, &world.walls);
    }
    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            let (head, tail) = bodies.split_at_mut(j);
            let (a, b) = (&mut head[i], &mut tail[0]);
            separate_pair(&mut a.1, a.2, &mut b.1, b.2);
        }
    }

    for (id, pos, size) in bodies {
        if let Some(player) = world.players.get_mut(&id) {
            player.pos = clamp_to_arena(pos, size, arena);
        }
    }
}

/// Move arrows, expire them, and resolve wall/player/enemy hits
fn update_arrows(world: &mut World, dt: f32, events: &mut Vec<GameEvent>) {
    let arrows = std::mem::take(&mut world.arrows);
    let mut kept = Vec::with_capacity(arrows.len());

    for mut arrow in arrows {
        let step = arrow.vel * dt;
        arrow.pos += step;
        arrow.distance_traveled += step.length();

        if out_of_bounds(arrow.pos, world.arena_size, ARROW_BOUNDS_MARGIN) || arrow.is_spent() {
            continue;
        }

        if world.walls.iter().any(|wall| touching(&arrow, wall)) {
            detonate(world, &arrow, events);
            continue;
        }

        let victim = world
            .players
            .values()
            .find(|p| p.id != arrow.owner_id && p.is_targetable() && touching(&arrow, *p))
            .map(|p| p.id);
        if let Some(victim) = victim {
            apply_hit(world, victim, Some(arrow.owner_id), arrow.damage, events);
            record_hit(world, arrow.owner_id);
            detonate(world, &arrow, events);
            continue;
        }

        let enemy = world
            .enemies
            .iter()
            .find(|e| touching(&arrow, *e))
            .map(|e| e.id);
        if let Some(enemy) = enemy {
            damage_enemy(world, enemy, arrow.owner_id, arrow.damage, events);
            record_hit(world, arrow.owner_id);
            detonate(world, &arrow, events);
            continue;
        }

        kept.push(arrow);
    }

    world.arrows = kept;
}

fn record_hit(world: &mut World, owner: PlayerId) {
    if let Some(player) = world.players.get_mut(&owner) {
        player.shots_hit += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SimConfig;
    use crate::sim::ai::Difficulty;
    use crate::sim::state::{Explosion, ExplosivePayload};

    const DT: f32 = 1.0 / 60.0;

    fn two_player_world(mode: GameMode) -> (World, PlayerId, PlayerId) {
        let mut world = World::new(mode, &SimConfig::with_seed(12345));
        let a = world.add_player("A", "red");
        let b = world.add_player("B", "blue");
        (world, a, b)
    }

    fn hold(input: &mut TickInput, id: PlayerId, f: impl FnOnce(&mut Controls)) {
        let mut controls = Controls::default();
        f(&mut controls);
        input.set(id, controls);
    }

    #[test]
    fn test_determinism() {
        let run = || {
            let mut world = World::new(GameMode::Ffa, &SimConfig::with_seed(12345));
            for (name, difficulty) in [
                ("Easy", Difficulty::Easy),
                ("Hard", Difficulty::Hard),
                ("Expert", Difficulty::Expert),
            ] {
                world.add_ai_player(name, "grey", difficulty);
            }
            let input = TickInput::default();
            for _ in 0..600 {
                tick(&mut world, &input, DT);
            }
            serde_json::to_string(&world).unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_game_over_world_is_frozen() {
        let (mut world, _, _) = two_player_world(GameMode::Ffa);
        world.is_game_over = true;
        let before = world.game_time;
        let outcome = tick(&mut world, &TickInput::default(), DT);
        assert!(outcome.events.is_empty());
        assert_eq!(world.game_time, before);
    }

    #[test]
    fn test_bad_dt_is_ignored_and_large_dt_capped() {
        let (mut world, _, _) = two_player_world(GameMode::Ffa);
        tick(&mut world, &TickInput::default(), f32::NAN);
        tick(&mut world, &TickInput::default(), -1.0);
        assert_eq!(world.game_time, 0.0);
        tick(&mut world, &TickInput::default(), 5.0);
        assert!((world.game_time - MAX_FRAME_DT).abs() < 1e-6);
    }

    #[test]
    fn test_diagonal_movement_normalized() {
        let (mut world, a, _) = two_player_world(GameMode::Ffa);
        world.players.get_mut(&a).unwrap().pos = Vec2::new(300.0, 450.0);
        let mut input = TickInput::default();
        hold(&mut input, a, |c| {
            c.right = true;
            c.down = true;
        });
        tick(&mut world, &input, 0.1);
        let p = &world.players[&a];
        assert!((p.vel.length() - MOVE_SPEED).abs() < 1e-3);
        assert_eq!(p.animation_state, AnimationState::Run);
    }

    #[test]
    fn test_drawing_slows_movement() {
        let (mut world, a, _) = two_player_world(GameMode::Ffa);
        world.players.get_mut(&a).unwrap().pos = Vec2::new(300.0, 450.0);
        let mut input = TickInput::default();
        hold(&mut input, a, |c| c.shoot = true);
        tick(&mut world, &input, DT);
        hold(&mut input, a, |c| {
            c.shoot = true;
            c.right = true;
        });
        tick(&mut world, &input, DT);
        let p = &world.players[&a];
        assert!((p.vel.x - MOVE_SPEED * DRAW_MOVE_FACTOR).abs() < 1e-3);
        assert_eq!(p.animation_state, AnimationState::Fire);
    }

    #[test]
    fn test_full_draw_fires_max_arrow() {
        let (mut world, a, _) = two_player_world(GameMode::Ffa);
        let mut input = TickInput::default();
        hold(&mut input, a, |c| c.shoot = true);
        for _ in 0..16 {
            tick(&mut world, &input, 0.1);
        }
        input.set(a, Controls::default());
        let outcome = tick(&mut world, &input, 0.1);

        assert!(outcome.events.iter().any(|e| matches!(
            e,
            GameEvent::ArrowFired { owner, weak: false, .. } if *owner == a
        )));
        let arrow = &world.arrows[0];
        assert_eq!(arrow.damage, ARROW_MAX_DAMAGE);
        assert!((arrow.vel - Vec2::new(ARROW_MAX_SPEED, 0.0)).length() < 1e-2);
        assert_eq!(world.players[&a].shots_fired, 1);
    }

    #[test]
    fn test_dash_covers_fixed_distance() {
        let (mut world, a, _) = two_player_world(GameMode::Ffa);
        world.players.get_mut(&a).unwrap().pos = Vec2::new(300.0, 500.0);
        let mut input = TickInput::default();
        hold(&mut input, a, |c| c.dash = true);
        tick(&mut world, &input, 0.05);
        assert_eq!(world.players[&a].animation_state, AnimationState::Dash);
        for _ in 0..5 {
            tick(&mut world, &input, 0.05);
        }
        let p = &world.players[&a];
        assert!(!p.is_dashing);
        assert!((p.pos.x - (300.0 + DASH_SPEED * DASH_DURATION)).abs() < 0.1);
        assert!(p.dash_cooldown > 0.0);
    }

    #[test]
    fn test_arrow_leaving_arena_is_removed() {
        let (mut world, a, _) = two_player_world(GameMode::Ffa);
        world.push_arrow(Arrow::new(
            Vec2::new(795.0, 150.0),
            Vec2::new(600.0, 0.0),
            0.0,
            a,
            10.0,
        ));
        tick(&mut world, &TickInput::default(), DT);
        assert!(world.arrows.is_empty());
    }

    #[test]
    fn test_weak_arrow_expires_past_range() {
        let (mut world, a, _) = two_player_world(GameMode::Ffa);
        let mut arrow = Arrow::new(Vec2::new(100.0, 240.0), Vec2::new(100.0, 0.0), 0.0, a, 1.0);
        arrow.is_weak_shot = true;
        arrow.range = Some(WEAK_SHOT_RANGE);
        arrow.distance_traveled = 194.0;
        world.push_arrow(arrow);

        tick(&mut world, &TickInput::default(), 0.05);
        assert_eq!(world.arrows.len(), 1);
        tick(&mut world, &TickInput::default(), 0.05);
        assert!(world.arrows.is_empty());
    }

    #[test]
    fn test_arrow_hit_damages_and_is_consumed() {
        let (mut world, a, b) = two_player_world(GameMode::Ffa);
        world.players.get_mut(&b).unwrap().pos = Vec2::new(300.0, 450.0);
        world.push_arrow(Arrow::new(
            Vec2::new(270.0, 450.0),
            Vec2::new(300.0, 0.0),
            0.0,
            a,
            25.0,
        ));
        let outcome = tick(&mut world, &TickInput::default(), DT);
        assert!(world.arrows.is_empty());
        let victim = &world.players[&b];
        assert_eq!(victim.health, 75.0);
        assert_eq!(victim.last_damage_from, Some(a));
        assert_eq!(victim.animation_state, AnimationState::Hit);
        assert_eq!(world.players[&a].shots_hit, 1);
        assert!(outcome.events.iter().any(|e| matches!(e, GameEvent::PlayerHit { .. })));
    }

    #[test]
    fn test_owner_is_never_hit_by_own_arrow() {
        let (mut world, a, _) = two_player_world(GameMode::Ffa);
        world.players.get_mut(&a).unwrap().pos = Vec2::new(300.0, 450.0);
        world.push_arrow(Arrow::new(
            Vec2::new(300.0, 450.0),
            Vec2::new(300.0, 0.0),
            0.0,
            a,
            25.0,
        ));
        tick(&mut world, &TickInput::default(), DT);
        assert_eq!(world.players[&a].health, 100.0);
    }

    #[test]
    fn test_explosive_arrow_detonates_on_wall() {
        let (mut world, a, b) = two_player_world(GameMode::Ffa);
        // Central pillar (400, 300) r40
        world.players.get_mut(&b).unwrap().pos = Vec2::new(400.0, 370.0);
        let mut arrow = Arrow::new(Vec2::new(340.0, 300.0), Vec2::new(400.0, 0.0), 0.0, a, 20.0);
        arrow.explosive = Some(ExplosivePayload {
            radius: EXPLOSION_RADIUS,
            damage: EXPLOSION_DAMAGE,
        });
        world.push_arrow(arrow);

        let outcome = tick(&mut world, &TickInput::default(), 0.05);
        assert!(world.arrows.is_empty());
        assert_eq!(world.explosions.len(), 1);
        assert!(world.players[&b].health < 100.0);
        assert!(outcome.events.iter().any(|e| matches!(e, GameEvent::Explosion { .. })));
    }

    #[test]
    fn test_explosions_expire() {
        let (mut world, a, _) = two_player_world(GameMode::Ffa);
        world.explosions.push(Explosion {
            pos: Vec2::new(400.0, 500.0),
            radius: 100.0,
            time: 0.0,
            max_time: EXPLOSION_LIFETIME,
            owner_id: a,
        });
        for _ in 0..4 {
            tick(&mut world, &TickInput::default(), 0.1);
        }
        assert_eq!(world.explosions.len(), 1);
        tick(&mut world, &TickInput::default(), 0.1);
        tick(&mut world, &TickInput::default(), 0.1);
        assert!(world.explosions.is_empty());
    }

    #[test]
    fn test_duel_death_ends_match_same_tick() {
        let (mut world, a, b) = two_player_world(GameMode::Duel);
        {
            let victim = world.players.get_mut(&b).unwrap();
            victim.pos = Vec2::new(300.0, 450.0);
            victim.health = 10.0;
        }
        world.push_arrow(Arrow::new(
            Vec2::new(270.0, 450.0),
            Vec2::new(300.0, 0.0),
            0.0,
            a,
            25.0,
        ));
        let outcome = tick(&mut world, &TickInput::default(), DT);

        assert!(world.is_game_over);
        assert_eq!(world.winner, Some(a));
        assert_eq!(outcome.game_over(), Some(Some(a)));
        assert_eq!(outcome.deaths().collect::<Vec<_>>(), vec![b]);
        assert_eq!(world.players[&b].lives, 0);
        assert_eq!(world.players[&b].animation_state, AnimationState::Death);
    }

    #[test]
    fn test_ffa_respawn_after_delay() {
        let (mut world, a, b) = two_player_world(GameMode::Ffa);
        let mut events = Vec::new();
        world.players.get_mut(&b).unwrap().health = 5.0;
        apply_hit(&mut world, b, Some(a), 10.0, &mut events);
        assert_eq!(world.players[&b].lives, 2);

        let mut respawned = false;
        for _ in 0..11 {
            let outcome = tick(&mut world, &TickInput::default(), 0.1);
            respawned |= outcome
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::PlayerRespawned { player } if *player == b));
        }
        assert!(respawned);
        let p = &world.players[&b];
        assert_eq!(p.health, PLAYER_MAX_HEALTH);
        assert!(p.is_alive());
        assert!(!world.is_game_over);
    }

    #[test]
    fn test_dead_player_ignores_input() {
        let (mut world, a, b) = two_player_world(GameMode::Ffa);
        let mut events = Vec::new();
        apply_hit(&mut world, b, Some(a), 200.0, &mut events);
        let pos = world.players[&b].pos;
        let mut input = TickInput::default();
        hold(&mut input, b, |c| {
            c.right = true;
            c.shoot = true;
        });
        tick(&mut world, &input, 0.05);
        assert_eq!(world.players[&b].pos, pos);
        assert!(!world.players[&b].is_drawing_bow);
    }

    #[test]
    fn test_huge_aim_is_wrapped() {
        let (mut world, a, _) = two_player_world(GameMode::Ffa);
        let mut input = TickInput::default();
        hold(&mut input, a, |c| c.rotation = 1e9);
        tick(&mut world, &input, DT);
        let rotation = world.players[&a].rotation;
        assert!((-std::f32::consts::PI..std::f32::consts::PI).contains(&rotation));
    }

    #[test]
    fn test_players_pushed_out_of_walls_and_apart() {
        let (mut world, a, b) = two_player_world(GameMode::Ffa);
        world.players.get_mut(&a).unwrap().pos = Vec2::new(410.0, 300.0);
        world.players.get_mut(&b).unwrap().pos = Vec2::new(300.0, 450.0);
        let c = world.add_player("C", "green");
        world.players.get_mut(&c).unwrap().pos = Vec2::new(320.0, 450.0);

        tick(&mut world, &TickInput::default(), DT);
        let wall = world.walls[4].pos;
        assert!(world.players[&a].pos.distance(wall) >= 40.0 + PLAYER_RADIUS - 0.01);
        let gap = world.players[&b].pos.distance(world.players[&c].pos);
        assert!(gap >= 2.0 * PLAYER_RADIUS - 0.01);
    }

    #[test]
    fn test_ai_players_ignore_human_input() {
        let mut world = World::new(GameMode::Ffa, &SimConfig::with_seed(3));
        let bot = world.add_ai_player("Bot", "grey", Difficulty::Easy);
        world.add_player("Human", "red");
        let mut input = TickInput::default();
        hold(&mut input, bot, |c| c.explosive_arrow = true);
        tick(&mut world, &input, DT);
        assert!(!world.arrows.iter().any(|a| a.explosive.is_some()));
    }

    #[test]
    fn test_survival_wave_spawns_enemy() {
        let mut world = World::new(GameMode::Survival, &SimConfig::with_seed(8));
        world.add_player("Hero", "gold");
        let input = TickInput::default();
        let mut spawned = false;
        for _ in 0..41 {
            let outcome = tick(&mut world, &input, 0.1);
            spawned |= outcome
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::EnemySpawned { .. }));
        }
        assert!(spawned);
        assert_eq!(world.enemies.len(), 1);
        assert!(!world.is_game_over);
    }
}
