//! Circle-based proximity queries.
//!
//! Used both for gameplay range gating (attack reach, detection) and for
//! overlap rejection on the legacy movement path that runs without a
//! physics body.

use outbreak_common::Vec2;

/// Collision circle diameter shared by all characters, world units.
pub const COLLISION_DIAMETER: f32 = 10.0;

/// Returns the collision center of a sprite footprint.
///
/// The half-height lands on x and the half-width on y. The transposed
/// axes are kept exactly as-is: every existing distance and bearing
/// result depends on them, and all current footprints are square.
#[must_use]
pub fn center(position: Vec2, width: f32, height: f32) -> Vec2 {
    Vec2::new(position.x + height / 2.0, position.y + width / 2.0)
}

/// Returns the sprite center used as the origin for bearings.
#[must_use]
pub fn sprite_center(position: Vec2, width: f32, height: f32) -> Vec2 {
    Vec2::new(position.x + width / 2.0, position.y + height / 2.0)
}

/// Tests whether two collision circles overlap.
///
/// True iff the squared distance between the centers lies within
/// `[0, COLLISION_DIAMETER²]`. Symmetric in its arguments.
#[must_use]
pub fn collides(a_center: Vec2, b_center: Vec2) -> bool {
    let distance_squared = a_center.distance_squared(b_center);
    (0.0..=COLLISION_DIAMETER * COLLISION_DIAMETER).contains(&distance_squared)
}

/// Returns the bearing from an origin toward a target, in `[0, 2π)`.
///
/// Measured via `atan2(dx, dy)`: zero points along +y and the angle grows
/// clockwise. The `+ 2π mod 2π` displacement keeps the result
/// non-negative for targets in the -x quadrants, where `atan2` alone
/// comes back negative.
#[must_use]
pub fn bearing(origin: Vec2, target: Vec2) -> f32 {
    use std::f32::consts::TAU;

    let delta = target - origin;
    (delta.x.atan2(delta.y) + TAU) % TAU
}

/// Returns a normalized vector pointing from an origin toward a target.
///
/// Degenerate (coincident) inputs produce the zero vector.
#[must_use]
pub fn direction_to(origin: Vec2, target: Vec2) -> Vec2 {
    (target - origin).normalized()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::{PI, TAU};

    #[test]
    fn test_center_axes_are_transposed() {
        let c = center(Vec2::new(10.0, 20.0), 32.0, 48.0);
        assert_eq!(c, Vec2::new(10.0 + 24.0, 20.0 + 16.0));

        let s = sprite_center(Vec2::new(10.0, 20.0), 32.0, 48.0);
        assert_eq!(s, Vec2::new(10.0 + 16.0, 20.0 + 24.0));
    }

    #[test]
    fn test_square_footprint_centers_agree() {
        let pos = Vec2::new(5.0, -3.0);
        assert_eq!(center(pos, 32.0, 32.0), sprite_center(pos, 32.0, 32.0));
    }

    #[test]
    fn test_collides_within_diameter() {
        let a = Vec2::new(0.0, 0.0);
        assert!(collides(a, Vec2::new(0.0, 0.0)));
        assert!(collides(a, Vec2::new(10.0, 0.0)));
        assert!(collides(a, Vec2::new(7.0, 7.0)));
        assert!(!collides(a, Vec2::new(10.1, 0.0)));
        assert!(!collides(a, Vec2::new(8.0, 8.0)));
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let origin = Vec2::ZERO;
        // Zero bearing points along +y; angle grows clockwise.
        assert!((bearing(origin, Vec2::new(0.0, 1.0)) - 0.0).abs() < 1e-6);
        assert!((bearing(origin, Vec2::new(1.0, 0.0)) - PI / 2.0).abs() < 1e-6);
        assert!((bearing(origin, Vec2::new(0.0, -1.0)) - PI).abs() < 1e-6);
        assert!((bearing(origin, Vec2::new(-1.0, 0.0)) - 3.0 * PI / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_bearing_toward_player_below() {
        // Chaser at (0, 50) bearing toward a target at the origin: straight
        // down the -y axis.
        let b = bearing(Vec2::new(0.0, 50.0), Vec2::new(0.0, 0.0));
        assert!((b - PI).abs() < 1e-6);
    }

    #[test]
    fn test_direction_to_normalizes() {
        let d = direction_to(Vec2::new(0.0, 50.0), Vec2::new(0.0, 0.0));
        assert_eq!(d, Vec2::new(0.0, -1.0));

        assert_eq!(direction_to(Vec2::new(3.0, 3.0), Vec2::new(3.0, 3.0)), Vec2::ZERO);
    }

    proptest! {
        #[test]
        fn prop_collides_is_symmetric(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0,
            bx in -500.0f32..500.0, by in -500.0f32..500.0,
        ) {
            let a = Vec2::new(ax, ay);
            let b = Vec2::new(bx, by);
            prop_assert_eq!(collides(a, b), collides(b, a));
        }

        #[test]
        fn prop_bearing_stays_in_range(
            ox in -500.0f32..500.0, oy in -500.0f32..500.0,
            tx in -500.0f32..500.0, ty in -500.0f32..500.0,
        ) {
            let b = bearing(Vec2::new(ox, oy), Vec2::new(tx, ty));
            prop_assert!((0.0..TAU).contains(&b));
        }
    }
}
