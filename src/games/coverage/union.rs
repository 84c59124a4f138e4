//! Exact area of a union of circles.
//!
//! The boundary of the union consists of the arcs of each circle that no
//! other circle covers. By Green's theorem the enclosed area is
//!
//! ```text
//! A = 1/2 ∮ (x dy - y dx)
//! ```
//!
//! and for an arc of circle `(cx, cy, r)` from angle `a` to `b` the integral
//! has the closed form
//!
//! ```text
//! 1/2 [ r²(b - a) + cx·r(sin b - sin a) - cy·r(cos b - cos a) ]
//! ```
//!
//! Holes in the union are traversed clockwise by the same arcs, so they
//! subtract themselves without special handling.

use std::f64::consts::{PI, TAU};

use super::circle::Circle;

/// Area covered by at least one of `circles`.
///
/// The input is treated as a set: order and exact duplicates do not change
/// the result, bit for bit.
///
/// # Example
/// ```
/// use coverage_game_solver::games::coverage::{union_area, Circle};
///
/// let area = union_area(&[Circle::new(0.0, 0.0, 1.0), Circle::new(5.0, 0.0, 1.0)]);
/// assert!((area - 2.0 * std::f64::consts::PI).abs() < 1e-12);
/// ```
pub fn union_area(circles: &[Circle]) -> f64 {
    let circles = canonical(circles);
    let mut arcs: Vec<(f64, f64)> = Vec::new();
    let mut total: f64 = 0.0;

    for (i, circle) in circles.iter().enumerate() {
        if circle.radius <= 0.0 {
            continue;
        }
        arcs.clear();
        if !covered_arcs(&circles, i, &mut arcs) {
            continue;
        }
        if arcs.is_empty() {
            total += PI * circle.radius * circle.radius;
            continue;
        }

        arcs.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
        let mut cursor: f64 = 0.0;
        for &(start, end) in &arcs {
            if start > cursor {
                total += arc_integral(circle, cursor, start);
            }
            cursor = f64::max(cursor, end);
        }
        if cursor < TAU {
            total += arc_integral(circle, cursor, TAU);
        }
    }

    total.max(0.0)
}

/// Sorted by `(x, y, r)` with exact duplicates removed.
fn canonical(circles: &[Circle]) -> Vec<Circle> {
    let mut sorted = circles.to_vec();
    sorted.sort_by(|a, b| {
        a.center
            .x
            .total_cmp(&b.center.x)
            .then(a.center.y.total_cmp(&b.center.y))
            .then(a.radius.total_cmp(&b.radius))
    });
    sorted.dedup();
    sorted
}

/// Collect the angular intervals of circle `i` covered by the others, in
/// `[0, 2π)`. Returns `false` when circle `i` lies inside another circle
/// and contributes no boundary at all.
fn covered_arcs(circles: &[Circle], i: usize, arcs: &mut Vec<(f64, f64)>) -> bool {
    let circle = &circles[i];
    let ri = circle.radius;

    for (j, other) in circles.iter().enumerate() {
        if i == j || other.radius <= 0.0 {
            continue;
        }
        let rj = other.radius;
        let dx = other.center.x - circle.center.x;
        let dy = other.center.y - circle.center.y;
        let d = dx.hypot(dy);

        // Nested circles with equal radii can round to mutual containment;
        // only the later one in canonical order yields.
        if d + ri <= rj && (ri < rj || j < i) {
            return false;
        }
        if d >= ri + rj || d + rj <= ri {
            continue;
        }

        let cos_half = ((ri * ri + d * d - rj * rj) / (2.0 * ri * d)).clamp(-1.0, 1.0);
        let half = cos_half.acos();
        if half >= PI {
            arcs.clear();
            arcs.push((0.0, TAU));
            return true;
        }

        let start = (dy.atan2(dx) - half).rem_euclid(TAU);
        let end = start + 2.0 * half;
        if end > TAU {
            arcs.push((start, TAU));
            arcs.push((0.0, end - TAU));
        } else {
            arcs.push((start, end));
        }
    }
    true
}

fn arc_integral(circle: &Circle, a: f64, b: f64) -> f64 {
    let r = circle.radius;
    let (cx, cy) = (circle.center.x, circle.center.y);
    0.5 * (r * r * (b - a) + cx * r * (b.sin() - a.sin()) - cy * r * (b.cos() - a.cos()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::coverage::Point;

    fn lens(r: f64, d: f64) -> f64 {
        2.0 * r * r * (d / (2.0 * r)).acos() - 0.5 * d * (4.0 * r * r - d * d).sqrt()
    }

    /// Midpoint-rule estimate on a fine grid.
    fn grid_area(circles: &[Circle], steps: usize) -> f64 {
        let min_x = circles.iter().map(|c| c.center.x - c.radius).fold(f64::INFINITY, f64::min);
        let max_x = circles.iter().map(|c| c.center.x + c.radius).fold(f64::NEG_INFINITY, f64::max);
        let min_y = circles.iter().map(|c| c.center.y - c.radius).fold(f64::INFINITY, f64::min);
        let max_y = circles.iter().map(|c| c.center.y + c.radius).fold(f64::NEG_INFINITY, f64::max);
        let (hx, hy) = ((max_x - min_x) / steps as f64, (max_y - min_y) / steps as f64);

        let mut inside = 0usize;
        for ix in 0..steps {
            for iy in 0..steps {
                let p = Point::new(
                    min_x + (ix as f64 + 0.5) * hx,
                    min_y + (iy as f64 + 0.5) * hy,
                );
                if circles.iter().any(|c| c.contains(p)) {
                    inside += 1;
                }
            }
        }
        inside as f64 * hx * hy
    }

    #[test]
    fn test_empty_and_single() {
        assert_eq!(union_area(&[]), 0.0);
        let c = Circle::new(2.0, -1.0, 1.5);
        assert_eq!(union_area(&[c]), c.area());
    }

    #[test]
    fn test_two_unit_circles_at_distance_one() {
        let area = union_area(&[Circle::new(0.0, 0.0, 1.0), Circle::new(1.0, 0.0, 1.0)]);
        let expected = 2.0 * PI - (2.0 * PI / 3.0 - 3f64.sqrt() / 2.0);
        assert!((area - expected).abs() < 1e-12, "{} vs {}", area, expected);
    }

    #[test]
    fn test_lens_at_any_angle() {
        let d: f64 = 1.3;
        for k in 0..12 {
            let theta = k as f64 * PI / 6.0 + 0.1;
            let a = Circle::new(4.0, 4.0, 1.0);
            let b = Circle::new(4.0 + d * theta.cos(), 4.0 + d * theta.sin(), 1.0);
            let area = union_area(&[a, b]);
            assert!((area - (2.0 * PI - lens(1.0, d))).abs() < 1e-10);
        }
    }

    #[test]
    fn test_tangent_and_disjoint() {
        let tangent = union_area(&[Circle::new(0.0, 0.0, 1.0), Circle::new(2.0, 0.0, 1.0)]);
        assert!((tangent - 2.0 * PI).abs() < 1e-12);

        let disjoint = union_area(&[
            Circle::new(0.0, 0.0, 1.0),
            Circle::new(3.0, 0.0, 1.0),
            Circle::new(6.0, 0.0, 1.0),
        ]);
        assert!((disjoint - 3.0 * PI).abs() < 1e-12);
    }

    #[test]
    fn test_nested() {
        let outer = Circle::new(1.0, 1.0, 3.0);
        let inner = Circle::new(1.5, 0.5, 1.0);
        assert_eq!(union_area(&[outer, inner]), outer.area());
        assert_eq!(union_area(&[inner, outer]), outer.area());

        let concentric = Circle::new(1.0, 1.0, 2.0);
        assert_eq!(union_area(&[concentric, outer]), outer.area());
    }

    #[test]
    fn test_duplicates_and_order() {
        let a = Circle::new(0.0, 0.0, 1.0);
        let b = Circle::new(1.2, 0.4, 1.5);
        let c = Circle::new(-0.5, 1.0, 0.8);
        let base = union_area(&[a, b, c]);
        assert_eq!(union_area(&[c, a, b]), base);
        assert_eq!(union_area(&[b, c, a, a, c]), base);
        assert_eq!(union_area(&[a, a]), a.area());
    }

    #[test]
    fn test_ring_with_hole_matches_grid() {
        // Six circles around an uncovered center.
        let circles: Vec<Circle> = (0..6)
            .map(|k| {
                let t = k as f64 * PI / 3.0;
                Circle::new(5.0 + 2.0 * t.cos(), 5.0 + 2.0 * t.sin(), 1.1)
            })
            .collect();
        let exact = union_area(&circles);
        let estimate = grid_area(&circles, 800);
        assert!((exact - estimate).abs() / exact < 5e-3, "{} vs {}", exact, estimate);
    }

    #[test]
    fn test_overlapping_cluster_matches_grid() {
        let circles = [
            Circle::new(2.0, 2.0, 1.5),
            Circle::new(3.0, 2.5, 1.0),
            Circle::new(2.5, 3.5, 1.2),
            Circle::new(6.0, 6.0, 0.7),
            Circle::new(2.2, 2.1, 0.3),
        ];
        let exact = union_area(&circles);
        let estimate = grid_area(&circles, 800);
        assert!((exact - estimate).abs() / exact < 5e-3, "{} vs {}", exact, estimate);
    }
}
