//! Combat resolution
//!
//! Bow charge/release, special volleys, explosive arrows, area damage and
//! the hit/death bookkeeping shared by every damage source.

use glam::Vec2;

use super::state::{
    AnimationState, Arrow, EntityId, ExplosivePayload, Explosion, GameEvent, Player, PlayerId,
    World,
};
use crate::consts::*;
use crate::heading;

/// Fraction of full draw reached after `draw_time`
fn draw_ratio(draw_time: f32, max_draw_time: f32) -> f32 {
    if max_draw_time <= 0.0 {
        return 1.0;
    }
    (draw_time.max(0.0) / max_draw_time).min(1.0)
}

/// Arrow damage for a release after `draw_time` seconds
pub fn shot_damage(draw_time: f32, min_draw_time: f32, max_draw_time: f32) -> f32 {
    if draw_time < min_draw_time {
        return WEAK_SHOT_DAMAGE;
    }
    let ratio = draw_ratio(draw_time, max_draw_time);
    ARROW_MIN_DAMAGE + ratio * (ARROW_MAX_DAMAGE - ARROW_MIN_DAMAGE)
}

/// Arrow speed for a release after `draw_time` seconds
pub fn shot_speed(draw_time: f32, min_draw_time: f32, max_draw_time: f32) -> f32 {
    let ratio = draw_ratio(draw_time, max_draw_time);
    let speed = ARROW_MIN_SPEED + ratio * (ARROW_MAX_SPEED - ARROW_MIN_SPEED);
    if draw_time < min_draw_time {
        speed * WEAK_SHOT_SPEED_FACTOR
    } else {
        speed
    }
}

/// Where an arrow leaves the bow for a given aim
fn muzzle(player: &Player, rotation: f32) -> Vec2 {
    player.pos + heading(rotation) * (player.size + ARROW_SPAWN_GAP)
}

/// Start drawing the bow; refused while the shot cooldown runs
pub fn begin_draw(player: &mut Player, now: f32) -> bool {
    if player.is_drawing_bow || player.shot_cooldown > 0.0 {
        return false;
    }
    player.is_drawing_bow = true;
    player.draw_start_time = Some(now);
    true
}

/// Release the drawn bow, producing one arrow
///
/// Clears the bow state and starts the shot cooldown.
pub fn release_bow(player: &mut Player, now: f32) -> Arrow {
    let draw_time = player.draw_time(now);
    let is_weak = draw_time < player.min_draw_time;
    let damage = shot_damage(draw_time, player.min_draw_time, player.max_draw_time);
    let speed = shot_speed(draw_time, player.min_draw_time, player.max_draw_time);
    let rotation = player.rotation;

    let mut arrow = Arrow::new(
        muzzle(player, rotation),
        heading(rotation) * speed,
        rotation,
        player.id,
        damage,
    );
    if is_weak {
        arrow.is_weak_shot = true;
        arrow.range = Some(WEAK_SHOT_RANGE);
    }

    player.is_drawing_bow = false;
    player.draw_start_time = None;
    player.shot_cooldown = SHOT_COOLDOWN;
    player.shots_fired += 1;
    arrow
}

/// Start charging the special attack; refused while on cooldown
pub fn begin_special_charge(player: &mut Player, now: f32) -> bool {
    if player.is_charging_special || player.special_attack_cooldown > 0.0 {
        return false;
    }
    player.is_charging_special = true;
    player.special_charge_start_time = Some(now);
    true
}

/// Release the special charge
///
/// With at least `SPECIAL_MIN_CHARGE` seconds of charge this fires a
/// three-arrow fan and starts the cooldown; an undercharged release just
/// cancels.
pub fn release_special(player: &mut Player, now: f32) -> Vec<Arrow> {
    let charged = player
        .special_charge_start_time
        .map(|start| now - start)
        .unwrap_or(0.0);
    player.is_charging_special = false;
    player.special_charge_start_time = None;

    if charged < SPECIAL_MIN_CHARGE {
        return Vec::new();
    }

    player.special_attack_cooldown = SPECIAL_COOLDOWN;
    player.shots_fired += 3;
    [-SPECIAL_SPREAD, 0.0, SPECIAL_SPREAD]
        .iter()
        .map(|offset| {
            let rotation = player.rotation + offset;
            Arrow::new(
                muzzle(player, rotation),
                heading(rotation) * SPECIAL_ARROW_SPEED,
                rotation,
                player.id,
                SPECIAL_ARROW_DAMAGE,
            )
        })
        .collect()
}

/// Fire an explosive arrow if off cooldown
pub fn fire_explosive(player: &mut Player) -> Option<Arrow> {
    if player.explosive_arrow_cooldown > 0.0 {
        return None;
    }
    let rotation = player.rotation;
    let mut arrow = Arrow::new(
        muzzle(player, rotation),
        heading(rotation) * EXPLOSIVE_ARROW_SPEED,
        rotation,
        player.id,
        EXPLOSIVE_ARROW_DAMAGE,
    );
    arrow.explosive = Some(ExplosivePayload {
        radius: EXPLOSION_RADIUS,
        damage: EXPLOSION_DAMAGE,
    });

    player.explosive_arrow_cooldown = EXPLOSIVE_COOLDOWN;
    player.shots_fired += 1;
    Some(arrow)
}

/// Area damage at `distance` from a blast center (0 at and beyond the radius)
pub fn explosion_damage(max_damage: f32, radius: f32, distance: f32) -> f32 {
    if radius <= 0.0 || distance >= radius {
        return 0.0;
    }
    let falloff = (1.0 - distance.max(0.0) / radius).powf(EXPLOSION_FALLOFF_EXPONENT);
    (max_damage * falloff).round()
}

/// Detonate an explosive arrow at its current position
///
/// Damages every targetable player (except the owner) and every enemy in
/// range, then records an `Explosion` for effect bookkeeping.
pub fn detonate(world: &mut World, arrow: &Arrow, events: &mut Vec<GameEvent>) {
    let Some(payload) = arrow.explosive else {
        return;
    };
    let center = arrow.pos;

    let victims: Vec<(PlayerId, f32)> = world
        .players
        .values()
        .filter(|p| p.id != arrow.owner_id && p.is_targetable())
        .map(|p| (p.id, explosion_damage(payload.damage, payload.radius, p.pos.distance(center))))
        .filter(|&(_, damage)| damage > 0.0)
        .collect();
    for (victim, damage) in victims {
        apply_hit(world, victim, Some(arrow.owner_id), damage, events);
    }

    let struck: Vec<(EntityId, f32)> = world
        .enemies
        .iter()
        .map(|e| (e.id, explosion_damage(payload.damage, payload.radius, e.pos.distance(center))))
        .filter(|&(_, damage)| damage > 0.0)
        .collect();
    for (enemy, damage) in struck {
        damage_enemy(world, enemy, arrow.owner_id, damage, events);
    }

    world.explosions.push(Explosion {
        pos: center,
        radius: payload.radius,
        time: 0.0,
        max_time: EXPLOSION_LIFETIME,
        owner_id: arrow.owner_id,
    });
    events.push(GameEvent::Explosion {
        owner: arrow.owner_id,
        pos: center,
        radius: payload.radius,
    });
}

/// Apply damage to a player, with hit reaction and death handling
///
/// Returns true if the hit killed the player.
pub fn apply_hit(
    world: &mut World,
    victim: PlayerId,
    attacker: Option<PlayerId>,
    damage: f32,
    events: &mut Vec<GameEvent>,
) -> bool {
    let Some(player) = world.players.get_mut(&victim) else {
        return false;
    };
    if !player.is_alive() {
        return false;
    }

    player.health = (player.health - damage).max(0.0);
    if attacker.is_some() {
        player.last_damage_from = attacker;
    }
    player.hit_animation_timer = HIT_ANIMATION_TIME;
    player.invulnerable_time = player.invulnerable_time.max(HIT_INVULNERABILITY);
    player.animation_state = AnimationState::Hit;
    let dead = player.health <= 0.0;

    events.push(GameEvent::PlayerHit {
        victim,
        attacker,
        damage,
    });

    if dead {
        handle_death(world, victim, events);
    }
    dead
}

/// Death bookkeeping: lose a life, credit the killer, schedule respawn
pub fn handle_death(world: &mut World, victim: PlayerId, events: &mut Vec<GameEvent>) {
    let respawn_delay = world.rules.respawn_delay;
    let Some(player) = world.players.get_mut(&victim) else {
        return;
    };

    player.health = 0.0;
    player.animation_state = AnimationState::Death;
    player.deaths += 1;
    player.lives = player.lives.saturating_sub(1);
    player.respawn_timer = if player.lives > 0 { respawn_delay } else { 0.0 };
    player.vel = Vec2::ZERO;
    player.is_drawing_bow = false;
    player.draw_start_time = None;
    player.is_charging_special = false;
    player.special_charge_start_time = None;
    player.is_dashing = false;
    player.dash_start_time = None;
    player.dash_velocity = None;
    player.controls = Default::default();
    let lives_left = player.lives;
    let killer = player.last_damage_from.filter(|&k| k != victim);

    let mut credited = None;
    if let Some(killer_id) = killer
        && let Some(killer) = world.players.get_mut(&killer_id)
        && killer.is_alive()
    {
        killer.kills += 1;
        killer.score += KILL_SCORE;
        credited = Some(killer_id);
    }

    log::debug!("Player {victim} died (killer: {credited:?}, lives left: {lives_left})");
    events.push(GameEvent::PlayerDied {
        victim,
        killer: credited,
        lives_left,
    });
}

/// Damage a survival enemy; the killer collects its value
pub fn damage_enemy(
    world: &mut World,
    enemy_id: EntityId,
    owner: PlayerId,
    damage: f32,
    events: &mut Vec<GameEvent>,
) -> bool {
    let Some(idx) = world.enemies.iter().position(|e| e.id == enemy_id) else {
        return false;
    };
    let enemy = &mut world.enemies[idx];
    enemy.health = (enemy.health - damage).max(0.0);
    if enemy.health > 0.0 {
        return false;
    }

    let enemy = world.enemies.remove(idx);
    if let Some(player) = world.players.get_mut(&owner) {
        player.score += enemy.value;
        player.kills += 1;
    }
    events.push(GameEvent::EnemyKilled {
        enemy: enemy.id,
        killer: owner,
        value: enemy.value,
    });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SimConfig;
    use crate::sim::state::GameMode;
    use proptest::prelude::*;

    fn archer() -> Player {
        Player::new(1, "Robin", Vec2::new(100.0, 100.0), "green")
    }

    #[test]
    fn test_full_draw_release() {
        let mut p = archer();
        assert!(begin_draw(&mut p, 2.0));
        let arrow = release_bow(&mut p, 3.5);
        assert!((arrow.pos - Vec2::new(129.0, 100.0)).length() < 1e-4);
        assert!((arrow.vel - Vec2::new(600.0, 0.0)).length() < 1e-3);
        assert_eq!(arrow.damage, 25.0);
        assert!(!arrow.is_weak_shot);
        assert!(arrow.range.is_none());
        assert!(!p.is_drawing_bow);
        assert!(p.draw_start_time.is_none());
        assert_eq!(p.shots_fired, 1);
    }

    #[test]
    fn test_weak_shot_release() {
        let mut p = archer();
        begin_draw(&mut p, 0.0);
        let arrow = release_bow(&mut p, 0.1);
        assert!(arrow.is_weak_shot);
        assert_eq!(arrow.damage, 1.0);
        assert_eq!(arrow.range, Some(WEAK_SHOT_RANGE));
        let expected = (300.0 + 0.1 / 1.5 * 300.0) * 0.3;
        assert!((arrow.vel.length() - expected).abs() < 1e-3);
    }

    #[test]
    fn test_draw_blocked_by_shot_cooldown() {
        let mut p = archer();
        begin_draw(&mut p, 0.0);
        release_bow(&mut p, 1.0);
        assert!(!begin_draw(&mut p, 1.05));
        p.shot_cooldown = 0.0;
        assert!(begin_draw(&mut p, 1.3));
    }

    #[test]
    fn test_special_fan() {
        let mut p = archer();
        assert!(begin_special_charge(&mut p, 0.0));
        let arrows = release_special(&mut p, 0.6);
        assert_eq!(arrows.len(), 3);
        assert!((arrows[0].rotation - -0.1).abs() < 1e-6);
        assert!((arrows[2].rotation - 0.1).abs() < 1e-6);
        for arrow in &arrows {
            assert!((arrow.vel.length() - 500.0).abs() < 1e-3);
            assert_eq!(arrow.damage, 15.0);
        }
        assert_eq!(p.special_attack_cooldown, 5.0);
        assert!(!begin_special_charge(&mut p, 1.0));
    }

    #[test]
    fn test_undercharged_special_cancels() {
        let mut p = archer();
        begin_special_charge(&mut p, 0.0);
        assert!(release_special(&mut p, 0.3).is_empty());
        assert!(!p.is_charging_special);
        assert_eq!(p.special_attack_cooldown, 0.0);
    }

    #[test]
    fn test_explosive_cooldown() {
        let mut p = archer();
        let arrow = fire_explosive(&mut p).unwrap();
        assert_eq!(arrow.damage, 20.0);
        assert_eq!(arrow.explosive.unwrap().radius, 100.0);
        assert!((arrow.vel.length() - 400.0).abs() < 1e-3);
        assert_eq!(p.explosive_arrow_cooldown, 30.0);
        assert!(fire_explosive(&mut p).is_none());
    }

    #[test]
    fn test_explosion_damage_examples() {
        assert_eq!(explosion_damage(40.0, 100.0, 0.0), 40.0);
        assert_eq!(explosion_damage(40.0, 100.0, 50.0), 20.0);
        assert_eq!(explosion_damage(40.0, 100.0, 99.0), 0.0);
        assert_eq!(explosion_damage(40.0, 100.0, 100.0), 0.0);
        assert_eq!(explosion_damage(40.0, 100.0, 150.0), 0.0);
    }

    #[test]
    fn test_kill_credits_attacker() {
        let mut world = World::new(GameMode::Ffa, &SimConfig::default());
        let a = world.add_player("A", "red");
        let b = world.add_player("B", "blue");
        let mut events = Vec::new();
        world.players.get_mut(&b).unwrap().health = 10.0;
        assert!(apply_hit(&mut world, b, Some(a), 25.0, &mut events));

        let victim = &world.players[&b];
        assert_eq!(victim.health, 0.0);
        assert_eq!(victim.deaths, 1);
        assert_eq!(victim.lives, 2);
        assert_eq!(victim.animation_state, AnimationState::Death);
        assert!(victim.respawn_timer > 0.0);
        let killer = &world.players[&a];
        assert_eq!(killer.kills, 1);
        assert_eq!(killer.score, 100);
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::PlayerDied { victim, killer: Some(k), .. } if *victim == b && *k == a
        )));
    }

    #[test]
    fn test_detonate_spares_owner_and_invulnerable() {
        let mut world = World::new(GameMode::Ffa, &SimConfig::default());
        let owner = world.add_player("A", "red");
        let near = world.add_player("B", "blue");
        let shielded = world.add_player("C", "gold");
        for id in [owner, near, shielded] {
            world.players.get_mut(&id).unwrap().pos = Vec2::new(400.0, 500.0);
        }
        world.players.get_mut(&near).unwrap().pos = Vec2::new(450.0, 500.0);
        world.players.get_mut(&shielded).unwrap().invulnerable_time = 0.3;

        let mut arrow = Arrow::new(Vec2::new(400.0, 500.0), Vec2::ZERO, 0.0, owner, 20.0);
        arrow.explosive = Some(ExplosivePayload {
            radius: 100.0,
            damage: 40.0,
        });
        let mut events = Vec::new();
        detonate(&mut world, &arrow, &mut events);

        assert_eq!(world.players[&owner].health, 100.0);
        assert_eq!(world.players[&shielded].health, 100.0);
        assert_eq!(world.players[&near].health, 80.0);
        assert_eq!(world.explosions.len(), 1);
        assert!(events.iter().any(|e| matches!(e, GameEvent::Explosion { .. })));
    }

    proptest! {
        #[test]
        fn prop_damage_and_speed_monotonic(a in 0.45f32..=1.5, b in 0.45f32..=1.5) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(shot_damage(lo, 0.45, 1.5) <= shot_damage(hi, 0.45, 1.5));
            prop_assert!(shot_speed(lo, 0.45, 1.5) <= shot_speed(hi, 0.45, 1.5));
        }

        #[test]
        fn prop_weak_shot_fixed_damage(t in 0.0f32..0.45) {
            prop_assert_eq!(shot_damage(t, 0.45, 1.5), 1.0);
            let full = 300.0 + (t / 1.5) * 300.0;
            prop_assert!((shot_speed(t, 0.45, 1.5) - full * 0.3).abs() < 1e-3);
        }

        #[test]
        fn prop_explosion_falloff(d in 0.0f32..200.0) {
            let damage = explosion_damage(40.0, 100.0, d);
            if d >= 100.0 {
                prop_assert_eq!(damage, 0.0);
            } else {
                prop_assert_eq!(damage, (40.0 * (1.0 - d / 100.0)).round());
            }
        }
    }
}
