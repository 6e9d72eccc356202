//! Wave and mode director
//!
//! Decides when a match is over (per mode) and runs survival waves: spawn
//! cadence, enemy archetypes, enemy pursuit and melee.

use glam::Vec2;

use super::collision::{resolve_against_walls, separate_pair};
use super::combat::apply_hit;
use super::rng::SimRng;
use super::state::{
    AnimationState, Enemy, EnemyArchetype, EntityId, GameEvent, GameMode, Player, PlayerId, Wave,
    World,
};

/// Distance from the arena edge where enemies appear
const SPAWN_MARGIN: f32 = 50.0;
/// Extra reach beyond touching at which enemies melee
const MELEE_REACH: f32 = 10.0;
/// Seconds between melee swings
const MELEE_COOLDOWN: f32 = 1.0;
/// Invulnerability granted to a player after a melee hit
const MELEE_INVULNERABILITY: f32 = 0.5;
const MELEE_HIT_ANIMATION: f32 = 0.3;

/// Build survival wave `number`
pub fn generate_wave(number: u32) -> Wave {
    let number = number.max(1);
    let enemy_count = if number > 10 {
        25 + 3 * (number - 10)
    } else {
        5 + 2 * number
    };
    let spawn_delay = (4.0 - number as f32 * 0.1).max(1.0);

    log::info!("Generated wave {number}: {enemy_count} enemies, spawn delay {spawn_delay:.1}s");

    Wave {
        number,
        enemy_count,
        remaining: enemy_count,
        spawn_delay,
        last_spawn_time: 0.0,
        is_complete: false,
    }
}

/// Archetype spawned throughout wave `number`
pub fn enemy_archetype_for_wave(number: u32) -> EnemyArchetype {
    if number % 10 == 0 {
        EnemyArchetype::Elite
    } else if number % 5 == 0 {
        EnemyArchetype::RangedFast
    } else if number % 3 == 0 {
        EnemyArchetype::Tanky
    } else {
        EnemyArchetype::Basic
    }
}

/// Enemy with archetype stats scaled by wave number
pub fn spawn_enemy(id: EntityId, archetype: EnemyArchetype, wave: u32, pos: Vec2) -> Enemy {
    let w = wave as f32;
    // (health, damage, speed, value, size)
    let (health, damage, speed, value, size) = match archetype {
        EnemyArchetype::Basic => (30.0 + w * 5.0, 10.0 + w, 80.0 + w * 2.0, 10, 20.0),
        EnemyArchetype::Tanky => (50.0 + w * 8.0, 15.0 + w * 1.5, 60.0 + w, 20, 22.0),
        EnemyArchetype::RangedFast => (20.0 + w * 3.0, 8.0 + w * 0.5, 100.0 + w * 3.0, 15, 18.0),
        EnemyArchetype::Elite => (80.0 + w * 10.0, 20.0 + w * 2.0, 50.0 + w, 50, 25.0),
    };

    Enemy {
        id,
        archetype,
        pos,
        vel: Vec2::ZERO,
        rotation: 0.0,
        health,
        max_health: health,
        size,
        speed,
        damage,
        attack_cooldown: MELEE_COOLDOWN,
        value,
        attacking: false,
    }
}

/// Random point just inside a uniformly chosen arena edge
pub fn spawn_position(rng: &mut SimRng, arena_size: Vec2) -> Vec2 {
    let (w, h) = (arena_size.x, arena_size.y);
    let inset = SPAWN_MARGIN / 2.0;
    match rng.index(4) {
        0 => Vec2::new(rng.range(SPAWN_MARGIN, w - SPAWN_MARGIN), inset),
        1 => Vec2::new(w - inset, rng.range(SPAWN_MARGIN, h - SPAWN_MARGIN)),
        2 => Vec2::new(rng.range(SPAWN_MARGIN, w - SPAWN_MARGIN), h - inset),
        _ => Vec2::new(inset, rng.range(SPAWN_MARGIN, h - SPAWN_MARGIN)),
    }
}

/// Per-tick match evaluation: survival waves and game-over per mode
pub fn evaluate(world: &mut World, events: &mut Vec<GameEvent>) {
    if world.is_game_over {
        return;
    }
    match world.mode {
        GameMode::Duel | GameMode::Ffa => evaluate_pvp(world, events),
        GameMode::Survival => {
            update_waves(world, events);
            let wiped_out = world.players_in_match().next().is_none();
            if wiped_out && !world.players.is_empty() {
                finish(world, None, events);
            }
        }
    }
}

/// Time-limit check; returns true if the match just ended
pub fn check_time_limit(world: &mut World, events: &mut Vec<GameEvent>) -> bool {
    let Some(limit) = world.max_game_time else {
        return false;
    };
    if world.is_game_over || world.game_time < limit {
        return false;
    }
    let winner = leader(world.players.values());
    log::info!("Time limit reached at {:.1}s", world.game_time);
    finish(world, winner, events);
    true
}

/// Most kills, ties broken by score, then lowest id
fn leader<'a>(players: impl Iterator<Item = &'a Player>) -> Option<PlayerId> {
    let mut best: Option<&Player> = None;
    for player in players {
        let better = best.is_none_or(|b| (player.kills, player.score) > (b.kills, b.score));
        if better {
            best = Some(player);
        }
    }
    best.map(|p| p.id)
}

fn evaluate_pvp(world: &mut World, events: &mut Vec<GameEvent>) {
    // A lone player never "wins" by default
    if world.players.len() < 2 {
        return;
    }

    if world.mode == GameMode::Ffa {
        let target = world.rules.ffa_kill_target;
        let reached = world.players.values().filter(|p| p.kills >= target);
        if let Some(winner) = leader(reached) {
            log::info!("Player {winner} reached {target} kills");
            finish(world, Some(winner), events);
            return;
        }
    }

    let (first, lone) = {
        let mut survivors = world.players_in_match();
        (survivors.next().map(|p| p.id), survivors.next().is_none())
    };
    if lone {
        finish(world, first, events);
    }
}

fn finish(world: &mut World, winner: Option<PlayerId>, events: &mut Vec<GameEvent>) {
    world.is_game_over = true;
    world.winner = winner;
    log::info!(
        "Game over ({}) at {:.1}s, winner: {winner:?}",
        world.mode.as_str(),
        world.game_time
    );
    events.push(GameEvent::GameOver { winner });
}

/// Spawn cadence and wave completion
fn update_waves(world: &mut World, events: &mut Vec<GameEvent>) {
    let now = world.game_time;
    let Some(wave) = world.current_wave.as_mut() else {
        return;
    };
    if wave.is_complete {
        return;
    }

    if wave.remaining > 0 && now - wave.last_spawn_time >= wave.spawn_delay {
        wave.remaining -= 1;
        wave.last_spawn_time = now;
        let number = wave.number;

        let archetype = enemy_archetype_for_wave(number);
        let pos = spawn_position(&mut world.rng, world.arena_size);
        let id = world.next_entity_id();
        world.enemies.push(spawn_enemy(id, archetype, number, pos));
        events.push(GameEvent::EnemySpawned {
            enemy: id,
            archetype,
        });
    }

    let Some(wave) = world.current_wave.as_mut() else {
        return;
    };
    if wave.remaining == 0 && world.enemies.is_empty() {
        wave.is_complete = true;
        let finished = wave.number;
        world.completed_waves += 1;
        events.push(GameEvent::WaveCompleted { number: finished });

        let next = generate_wave(finished + 1);
        events.push(GameEvent::WaveStarted {
            number: next.number,
            enemy_count: next.enemy_count,
        });
        world.current_wave = Some(next);
    }
}

/// Enemies chase the nearest living player and melee when in reach
pub fn update_enemies(world: &mut World, dt: f32, events: &mut Vec<GameEvent>) {
    let mut strikes: Vec<(PlayerId, f32)> = Vec::new();

    for enemy in world.enemies.iter_mut() {
        enemy.attack_cooldown = (enemy.attack_cooldown - dt).max(0.0);

        let nearest = world
            .players
            .values()
            .filter(|p| p.is_alive())
            .min_by(|a, b| a.pos.distance(enemy.pos).total_cmp(&b.pos.distance(enemy.pos)));
        let Some(target) = nearest else {
            enemy.vel = Vec2::ZERO;
            enemy.attacking = false;
            continue;
        };

        let delta = target.pos - enemy.pos;
        let distance = delta.length();
        enemy.rotation = delta.y.atan2(delta.x);
        let reach = enemy.size + target.size + MELEE_REACH;

        if distance > reach {
            enemy.vel = delta / distance * enemy.speed;
            enemy.pos += enemy.vel * dt;
            enemy.attacking = false;
        } else {
            enemy.vel = Vec2::ZERO;
            enemy.attacking = true;
            if enemy.attack_cooldown <= 0.0 {
                enemy.attack_cooldown = MELEE_COOLDOWN;
                if target.invulnerable_time <= 0.0 {
                    strikes.push((target.id, enemy.damage));
                }
            }
        }
    }

    // Walls, then each other
    for enemy in world.enemies.iter_mut() {
        resolve_against_walls(&mut enemy.pos, enemy.size, &world.walls);
    }
    let count = world.enemies.len();
    for i in 0..count {
        for j in (i + 1)..count {
            let (head, tail) = world.enemies.split_at_mut(j);
            let (a, b) = (&mut head[i], &mut tail[0]);
            separate_pair(&mut a.pos, a.size, &mut b.pos, b.size);
        }
    }

    for (victim, damage) in strikes {
        // Two enemies may reach the same player in one tick
        let Some(player) = world.players.get(&victim) else {
            continue;
        };
        if !player.is_targetable() {
            continue;
        }
        if !apply_hit(world, victim, None, damage, events)
            && let Some(player) = world.players.get_mut(&victim)
        {
            player.invulnerable_time = MELEE_INVULNERABILITY;
            player.hit_animation_timer = MELEE_HIT_ANIMATION;
            player.animation_state = AnimationState::Hit;
        }
    }
}
