//! Direction maths.
//!
//! Angles are in degrees, measured counter-clockwise from the +X (east) axis,
//! as returned by `atan2`.

use std::f64::consts::SQRT_2;

use stowbot_types::{CompassDirection, Point, RelativeDirection};

/// When one axis exceeds the other by this factor the label collapses to the
/// dominant cardinal direction.
const CARDINAL_DOMINANCE: f64 = 1.5;

/// Normalise an angle into `[0, 360)`.
pub fn normalize_degrees(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    // rem_euclid can round tiny negative inputs up to exactly 360.0
    if a >= 360.0 { 0.0 } else { a }
}

/// Label `target` relative to an observer at `from` facing `facing_deg`.
///
/// | Relative angle | Label |
/// |---|---|
/// | `[315, 45)` | ahead |
/// | `[45, 135)` | right |
/// | `[135, 225)` | behind |
/// | `[225, 315)` | left |
pub fn relative_direction(from: Point, facing_deg: f64, target: Point) -> RelativeDirection {
    let angle = (target.y - from.y).atan2(target.x - from.x).to_degrees();
    let relative = normalize_degrees(angle - facing_deg);

    if !(45.0..315.0).contains(&relative) {
        RelativeDirection::Ahead
    } else if relative < 135.0 {
        RelativeDirection::Right
    } else if relative < 225.0 {
        RelativeDirection::Behind
    } else {
        RelativeDirection::Left
    }
}

/// Absolute compass label for the offset `(dx, dy)`, independent of facing.
///
/// A cardinal label is chosen when one axis dominates by more than
/// [`CARDINAL_DOMINANCE`]; otherwise the diagonal matching the sign pair.
/// The zero offset maps to `north-east`.
pub fn compass_direction(dx: f64, dy: f64) -> CompassDirection {
    let (ax, ay) = (dx.abs(), dy.abs());

    if ax > CARDINAL_DOMINANCE * ay {
        return if dx > 0.0 {
            CompassDirection::East
        } else {
            CompassDirection::West
        };
    }
    if ay > CARDINAL_DOMINANCE * ax {
        return if dy > 0.0 {
            CompassDirection::North
        } else {
            CompassDirection::South
        };
    }
    match (dy >= 0.0, dx >= 0.0) {
        (true, true) => CompassDirection::NorthEast,
        (true, false) => CompassDirection::NorthWest,
        (false, true) => CompassDirection::SouthEast,
        (false, false) => CompassDirection::SouthWest,
    }
}

/// Unit axis vectors for each token of a compass label.
fn axis_tokens(direction: CompassDirection) -> &'static [(f64, f64)] {
    const N: (f64, f64) = (0.0, 1.0);
    const S: (f64, f64) = (0.0, -1.0);
    const E: (f64, f64) = (1.0, 0.0);
    const W: (f64, f64) = (-1.0, 0.0);
    match direction {
        CompassDirection::North => &[N],
        CompassDirection::NorthEast => &[N, E],
        CompassDirection::East => &[E],
        CompassDirection::SouthEast => &[S, E],
        CompassDirection::South => &[S],
        CompassDirection::SouthWest => &[S, W],
        CompassDirection::West => &[W],
        CompassDirection::NorthWest => &[N, W],
    }
}

/// Displacement of one step in `direction`.
///
/// Every token of the label contributes `step_cm` along its axis for a
/// cardinal label and `step_cm / sqrt(2)` for a diagonal one.
pub fn step_delta(direction: CompassDirection, step_cm: f64) -> (f64, f64) {
    let per_token = if direction.is_diagonal() {
        step_cm / SQRT_2
    } else {
        step_cm
    };
    axis_tokens(direction)
        .iter()
        .fold((0.0, 0.0), |(dx, dy), (ux, uy)| {
            (dx + ux * per_token, dy + uy * per_token)
        })
}

/// Whole steps of `step_cm` needed to cover `distance`, truncated toward zero.
pub fn whole_steps(distance: f64, step_cm: f64) -> u32 {
    if step_cm <= 0.0 || !distance.is_finite() {
        return 0;
    }
    (distance / step_cm).trunc() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: Point = Point::new(500.0, 500.0);

    fn rel(facing: f64, angle_deg: f64) -> RelativeDirection {
        let r = angle_deg.to_radians();
        let target = ORIGIN.offset(100.0 * r.cos(), 100.0 * r.sin());
        relative_direction(ORIGIN, facing, target)
    }

    // ------------------------------------------------------------------ relative

    #[test]
    fn relative_buckets_facing_zero() {
        assert_eq!(rel(0.0, 0.0), RelativeDirection::Ahead);
        assert_eq!(rel(0.0, 90.0), RelativeDirection::Right);
        assert_eq!(rel(0.0, 180.0), RelativeDirection::Behind);
        assert_eq!(rel(0.0, 270.0), RelativeDirection::Left);
        assert_eq!(rel(0.0, 330.0), RelativeDirection::Ahead);
    }

    #[test]
    fn relative_boundaries_belong_to_next_bucket() {
        let at = |deg: f64| relative_direction(ORIGIN, -deg, ORIGIN.offset(100.0, 0.0));
        assert_eq!(at(45.0), RelativeDirection::Right);
        assert_eq!(at(135.0), RelativeDirection::Behind);
        assert_eq!(at(225.0), RelativeDirection::Left);
        assert_eq!(at(315.0), RelativeDirection::Ahead);
        assert_eq!(at(44.9), RelativeDirection::Ahead);
    }

    #[test]
    fn relative_accounts_for_facing() {
        // Target due east; robot facing 90 degrees sees it at -90 -> 270 -> left.
        assert_eq!(rel(90.0, 0.0), RelativeDirection::Left);
        assert_eq!(rel(180.0, 0.0), RelativeDirection::Behind);
    }

    #[test]
    fn normalize_wraps() {
        assert!((normalize_degrees(-90.0) - 270.0).abs() < 1e-9);
        assert!((normalize_degrees(720.0)).abs() < 1e-9);
        assert!(normalize_degrees(-1e-18) < 360.0);
    }

    // ------------------------------------------------------------------ compass

    #[test]
    fn compass_cardinals_when_one_axis_dominates() {
        assert_eq!(compass_direction(100.0, 0.0), CompassDirection::East);
        assert_eq!(compass_direction(-100.0, 60.0), CompassDirection::West);
        assert_eq!(compass_direction(10.0, 100.0), CompassDirection::North);
        assert_eq!(compass_direction(0.0, -5.0), CompassDirection::South);
    }

    #[test]
    fn compass_diagonals_when_comparable() {
        assert_eq!(compass_direction(100.0, 100.0), CompassDirection::NorthEast);
        assert_eq!(compass_direction(-100.0, 80.0), CompassDirection::NorthWest);
        assert_eq!(compass_direction(70.0, -100.0), CompassDirection::SouthEast);
        assert_eq!(compass_direction(-100.0, -100.0), CompassDirection::SouthWest);
    }

    #[test]
    fn compass_exact_ratio_is_diagonal() {
        // |dx| == 1.5 * |dy| is not "more than", so stays diagonal.
        assert_eq!(compass_direction(150.0, 100.0), CompassDirection::NorthEast);
        assert_eq!(compass_direction(151.0, 100.0), CompassDirection::East);
    }

    #[test]
    fn compass_zero_offset() {
        assert_eq!(compass_direction(0.0, 0.0), CompassDirection::NorthEast);
    }

    // ------------------------------------------------------------------ steps

    #[test]
    fn cardinal_step_is_full_length() {
        let (dx, dy) = step_delta(CompassDirection::North, 10.0);
        assert!(dx.abs() < 1e-12);
        assert!((dy - 10.0).abs() < 1e-12);
        let (dx, dy) = step_delta(CompassDirection::West, 10.0);
        assert!((dx + 10.0).abs() < 1e-12);
        assert!(dy.abs() < 1e-12);
    }

    #[test]
    fn diagonal_step_splits_across_axes() {
        let (dx, dy) = step_delta(CompassDirection::SouthEast, 10.0);
        let expected = 10.0 / SQRT_2;
        assert!((dx - expected).abs() < 1e-12);
        assert!((dy + expected).abs() < 1e-12);
    }

    #[test]
    fn whole_steps_truncate() {
        assert_eq!(whole_steps(99.9, 10.0), 9);
        assert_eq!(whole_steps(100.0, 10.0), 10);
        assert_eq!(whole_steps(0.0, 10.0), 0);
        assert_eq!(whole_steps(50.0, 0.0), 0);
    }
}
