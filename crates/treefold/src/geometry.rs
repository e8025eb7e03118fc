//! Small 2D helpers shared by cleanup, hull, insetting and face tracing.
//!
//! All points live in the unit square with y pointing up, so a positive
//! [`parallelogram_area`] means a counter-clockwise turn.

use nalgebra::Vector2;

pub type Vec2 = Vector2<f64>;

/// Signed area of the parallelogram spanned by (a, b).
#[inline]
pub fn parallelogram_area(a: Vec2, b: Vec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Turn of `o → a → b`: positive for a left turn.
#[inline]
pub fn turn(o: Vec2, a: Vec2, b: Vec2) -> f64 {
    parallelogram_area(a - o, b - o)
}

/// Polar angle of `v` in (-π, π].
#[inline]
pub fn angle_of(v: Vec2) -> f64 {
    v.y.atan2(v.x)
}

#[inline]
pub fn lerp(p: Vec2, q: Vec2, t: f64) -> Vec2 {
    p + (q - p) * t
}

/// Shoelace area of a closed polygon; positive when counter-clockwise.
pub fn signed_area(points: &[Vec2]) -> f64 {
    let n = points.len();
    let twice: f64 = (0..n)
        .map(|i| parallelogram_area(points[i], points[(i + 1) % n]))
        .sum();
    twice / 2.0
}

/// Distance to the nearest side of the unit square (negative outside).
#[inline]
pub fn boundary_slack(p: Vec2) -> f64 {
    p.x.min(1.0 - p.x).min(p.y).min(1.0 - p.y)
}

#[inline]
pub fn in_unit_square(p: Vec2, eps: f64) -> bool {
    (-eps..=1.0 + eps).contains(&p.x) && (-eps..=1.0 + eps).contains(&p.y)
}

/// Intersection of circles `(c1, r1)` and `(c2, r2)` lying on the same side of
/// the line `c1 → c2` as `side_ref`. `None` when the circles miss each other.
pub fn circle_intersection(c1: Vec2, r1: f64, c2: Vec2, r2: f64, side_ref: Vec2) -> Option<Vec2> {
    let d = c2 - c1;
    let dist = d.norm();
    if dist == 0.0 || dist > r1 + r2 || dist < (r1 - r2).abs() {
        return None;
    }
    let a = (r1 * r1 - r2 * r2 + dist * dist) / (2.0 * dist);
    let h = (r1 * r1 - a * a).max(0.0).sqrt();
    let mid = c1 + d * (a / dist);
    let offset = Vec2::new(-d.y, d.x) * (h / dist);
    let p1 = mid + offset;
    let p2 = mid - offset;
    let want = parallelogram_area(d, side_ref - c1) >= 0.0;
    let got = parallelogram_area(d, p1 - c1) >= 0.0;
    Some(if want == got { p1 } else { p2 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn area_axis_aligned() {
        let a = vector![1.0, 0.0];
        let b = vector![0.0, 2.5];
        assert!((parallelogram_area(a, b) - 2.5).abs() < 1e-12);
        assert!((parallelogram_area(b, a) + 2.5).abs() < 1e-12);
    }

    #[test]
    fn signed_area_tracks_winding() {
        let square = [
            vector![0.0, 0.0],
            vector![1.0, 0.0],
            vector![1.0, 1.0],
            vector![0.0, 1.0],
        ];
        assert!((signed_area(&square) - 1.0).abs() < 1e-12);
        let mut rev = square;
        rev.reverse();
        assert!((signed_area(&rev) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn circle_intersection_picks_requested_side() {
        let c1 = vector![0.0, 0.0];
        let c2 = vector![2.0, 0.0];
        let up = circle_intersection(c1, 2.0_f64.sqrt(), c2, 2.0_f64.sqrt(), vector![1.0, 5.0])
            .unwrap();
        assert!((up - vector![1.0, 1.0]).norm() < 1e-12);
        let down =
            circle_intersection(c1, 2.0_f64.sqrt(), c2, 2.0_f64.sqrt(), vector![1.0, -0.1])
                .unwrap();
        assert!((down - vector![1.0, -1.0]).norm() < 1e-12);
        assert!(circle_intersection(c1, 0.5, c2, 0.5, up).is_none());
    }

    #[test]
    fn circle_intersection_randomized_seeded() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let c1 = Vec2::new(rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0));
            let c2 = Vec2::new(rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0));
            let d = (c2 - c1).norm();
            let r1 = d * rng.gen_range(0.6..1.0);
            let r2 = d * rng.gen_range(0.6..1.0);
            let p = circle_intersection(c1, r1, c2, r2, c1 + Vec2::new(0.3, 0.7)).unwrap();
            assert!(((p - c1).norm() - r1).abs() < 1e-9);
            assert!(((p - c2).norm() - r2).abs() < 1e-9);
        }
    }

    #[test]
    fn boundary_slack_of_corners_and_centre() {
        assert!(boundary_slack(vector![0.0, 0.3]).abs() < 1e-12);
        assert!((boundary_slack(vector![0.5, 0.5]) - 0.5).abs() < 1e-12);
        assert!(in_unit_square(vector![1.0 + 1e-10, 0.0], 1e-9));
        assert!(!in_unit_square(vector![1.1, 0.0], 1e-9));
    }
}
