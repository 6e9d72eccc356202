//! Collision detection and positional correction
//!
//! Everything collides as a circle. Resolution is pure push-out along the
//! center-to-center axis; no velocities are touched.

use glam::Vec2;

use super::state::{Circle, Wall};
use crate::consts::COLLISION_EPSILON;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Contact point on the static circle's surface (if hit)
    pub point: Vec2,
    /// Unit normal pointing from the static circle toward the moving one
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Circle/circle overlap test between a moving and a static circle
///
/// Overlaps shallower than `COLLISION_EPSILON` count as separated, so
/// resolving an already resolved pair is a no-op.
pub fn circle_overlap(
    moving_pos: Vec2,
    moving_radius: f32,
    static_pos: Vec2,
    static_radius: f32,
) -> CollisionResult {
    let offset = moving_pos - static_pos;
    let dist = offset.length();
    let penetration = moving_radius + static_radius - dist;

    if penetration <= COLLISION_EPSILON {
        return CollisionResult::miss();
    }

    // Coincident centers: pick a fixed axis
    let normal = if dist > f32::EPSILON {
        offset / dist
    } else {
        Vec2::X
    };

    CollisionResult {
        hit: true,
        point: static_pos + normal * static_radius,
        normal,
        penetration,
    }
}

/// Plain contact predicate (arrows, melee), no epsilon
#[inline]
pub fn touching(a: &impl Circle, b: &impl Circle) -> bool {
    a.center().distance(b.center()) < a.radius() + b.radius()
}

/// Push a circle out of every wall it overlaps; returns true if it moved
pub fn resolve_against_walls(pos: &mut Vec2, radius: f32, walls: &[Wall]) -> bool {
    let mut moved = false;
    for wall in walls {
        let result = circle_overlap(*pos, radius, wall.pos, wall.size);
        if result.hit {
            *pos += result.normal * result.penetration;
            moved = true;
        }
    }
    moved
}

/// Push two movable circles apart, half the penetration each
pub fn separate_pair(a: &mut Vec2, a_radius: f32, b: &mut Vec2, b_radius: f32) -> bool {
    let result = circle_overlap(*a, a_radius, *b, b_radius);
    if !result.hit {
        return false;
    }
    let half = result.normal * (result.penetration / 2.0);
    *a += half;
    *b -= half;
    true
}

/// Keep a circle fully inside the arena rectangle
pub fn clamp_to_arena(pos: Vec2, radius: f32, arena_size: Vec2) -> Vec2 {
    Vec2::new(
        pos.x.clamp(radius, (arena_size.x - radius).max(radius)),
        pos.y.clamp(radius, (arena_size.y - radius).max(radius)),
    )
}

/// Outside the arena by more than `margin`
pub fn out_of_bounds(pos: Vec2, arena_size: Vec2, margin: f32) -> bool {
    pos.x < -margin || pos.x > arena_size.x + margin || pos.y < -margin || pos.y > arena_size.y + margin
}

/// Distance from `point` to the segment `a`-`b`
pub fn segment_distance(a: Vec2, b: Vec2, point: Vec2) -> f32 {
    let line = b - a;
    let len_sq = line.length_squared();
    if len_sq < 1e-4 {
        return point.distance(a); // Degenerate segment
    }
    let t = ((point - a).dot(line) / len_sq).clamp(0.0, 1.0);
    point.distance(a + line * t)
}

/// True when no wall's circle intersects the segment `from`-`to`
pub fn line_of_sight(from: Vec2, to: Vec2, walls: &[Wall]) -> bool {
    walls
        .iter()
        .all(|wall| segment_distance(from, to, wall.pos) >= wall.size)
}

/// Perpendicular miss distance of a ray passing a point, if the point is ahead of it
///
/// Returns `None` when the ray is stationary or moving away from the point.
pub fn ray_miss_distance(origin: Vec2, velocity: Vec2, point: Vec2) -> Option<f32> {
    let dir = velocity.normalize_or_zero();
    if dir == Vec2::ZERO {
        return None;
    }
    let to_point = point - origin;
    let along = to_point.dot(dir);
    if along <= 0.0 {
        return None;
    }
    Some((to_point - dir * along).length())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall(x: f32, y: f32, size: f32) -> Wall {
        Wall {
            id: 1,
            pos: Vec2::new(x, y),
            size,
        }
    }

    #[test]
    fn test_circle_overlap_pushes_along_axis() {
        let result = circle_overlap(Vec2::new(50.0, 0.0), 24.0, Vec2::ZERO, 40.0);
        assert!(result.hit);
        assert!((result.penetration - 14.0).abs() < 1e-4);
        assert!((result.normal - Vec2::X).length() < 1e-6);
        assert!((result.point - Vec2::new(40.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_circle_overlap_miss() {
        let result = circle_overlap(Vec2::new(100.0, 0.0), 24.0, Vec2::ZERO, 40.0);
        assert!(!result.hit);
    }

    #[test]
    fn test_coincident_centers_push_along_x() {
        let mut pos = Vec2::new(10.0, 10.0);
        let walls = [wall(10.0, 10.0, 30.0)];
        assert!(resolve_against_walls(&mut pos, 20.0, &walls));
        assert!((pos - Vec2::new(60.0, 10.0)).length() < 1e-4);
    }

    #[test]
    fn test_wall_push_out_idempotent() {
        let walls = [wall(400.0, 300.0, 40.0)];
        let mut pos = Vec2::new(430.0, 310.0);
        resolve_against_walls(&mut pos, 24.0, &walls);
        let resolved = pos;
        assert!(!resolve_against_walls(&mut pos, 24.0, &walls));
        assert_eq!(pos, resolved);
    }

    #[test]
    fn test_separate_pair_splits_penetration() {
        let mut a = Vec2::new(0.0, 0.0);
        let mut b = Vec2::new(40.0, 0.0);
        assert!(separate_pair(&mut a, 24.0, &mut b, 24.0));
        assert!((a.x - -4.0).abs() < 1e-4);
        assert!((b.x - 44.0).abs() < 1e-4);
    }

    #[test]
    fn test_line_of_sight_blocked_by_wall() {
        let walls = [wall(400.0, 300.0, 40.0)];
        assert!(!line_of_sight(Vec2::new(100.0, 300.0), Vec2::new(700.0, 300.0), &walls));
        assert!(line_of_sight(Vec2::new(100.0, 100.0), Vec2::new(700.0, 100.0), &walls));
        // Wall behind the shooter does not block
        assert!(line_of_sight(Vec2::new(500.0, 300.0), Vec2::new(700.0, 300.0), &walls));
    }

    #[test]
    fn test_clamp_to_arena() {
        let arena = Vec2::new(800.0, 600.0);
        let p = clamp_to_arena(Vec2::new(-10.0, 700.0), 24.0, arena);
        assert_eq!(p, Vec2::new(24.0, 576.0));
    }

    #[test]
    fn test_ray_miss_distance() {
        let d = ray_miss_distance(Vec2::ZERO, Vec2::new(100.0, 0.0), Vec2::new(50.0, 10.0));
        assert!((d.unwrap() - 10.0).abs() < 1e-4);
        assert!(ray_miss_distance(Vec2::ZERO, Vec2::new(-1.0, 0.0), Vec2::new(50.0, 0.0)).is_none());
    }
}
