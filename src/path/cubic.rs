//! Cubic Bézier evaluation, extents, length and distance.
//!
//! Every drawable segment is expressed as one or more [`CubicBez`] pieces
//! once it leaves the parser, so this is where most of the numeric work
//! happens.

use glam::DVec2;

use crate::types::BBox;

/// 12-point Gauss–Legendre abscissae (positive half) on [-1, 1]
const GAUSS_NODES: [f64; 6] = [
    0.1252334085114689,
    0.3678314989981802,
    0.5873179542866175,
    0.7699026741943047,
    0.9041172563704749,
    0.9815606342467192,
];

const GAUSS_WEIGHTS: [f64; 6] = [
    0.2491470458134028,
    0.2334925365383548,
    0.2031674267230659,
    0.1600783285433462,
    0.1069393259953184,
    0.0471753363865118,
];

/// Coarse samples taken before refining the nearest point on a curve
const DISTANCE_SAMPLES: usize = 32;
const DISTANCE_REFINE_STEPS: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBez {
    pub p0: DVec2,
    pub p1: DVec2,
    pub p2: DVec2,
    pub p3: DVec2,
}

impl CubicBez {
    pub fn new(p0: DVec2, p1: DVec2, p2: DVec2, p3: DVec2) -> Self {
        CubicBez { p0, p1, p2, p3 }
    }

    /// A straight line as a cubic with its control points on the endpoints.
    pub fn line(from: DVec2, to: DVec2) -> Self {
        CubicBez::new(from, from, to, to)
    }

    /// Degree elevation of a quadratic with control point `ctrl`.
    pub fn from_quad(from: DVec2, ctrl: DVec2, to: DVec2) -> Self {
        CubicBez::new(
            from,
            from + (ctrl - from) * (2.0 / 3.0),
            to + (ctrl - to) * (2.0 / 3.0),
            to,
        )
    }

    /// Position at `t` on the forward curve.
    pub fn eval(&self, t: f64) -> DVec2 {
        self.reversed_at(1.0 - t)
    }

    /// Position with the control polygon read backwards: `reversed_at(0)` is
    /// `p3`, `reversed_at(1)` is `p0`.
    pub fn reversed_at(&self, t: f64) -> DVec2 {
        let onet = 1.0 - t;
        onet * onet * (onet * self.p3 + 3.0 * t * self.p2)
            + t * t * (t * self.p0 + 3.0 * onet * self.p1)
    }

    /// First derivative at `t`.
    pub fn deriv(&self, t: f64) -> DVec2 {
        let mt = 1.0 - t;
        3.0 * mt * mt * (self.p1 - self.p0)
            + 6.0 * mt * t * (self.p2 - self.p1)
            + 3.0 * t * t * (self.p3 - self.p2)
    }

    /// Arc length by Gauss–Legendre quadrature.
    pub fn arclen(&self) -> f64 {
        let mut sum = 0.0;
        for (x, w) in GAUSS_NODES.iter().zip(GAUSS_WEIGHTS.iter()) {
            let lo = 0.5 * (1.0 - x);
            let hi = 0.5 * (1.0 + x);
            sum += w * (self.deriv(lo).length() + self.deriv(hi).length());
        }
        0.5 * sum
    }

    /// Parameters in (0, 1) where either coordinate has a turning point.
    pub fn extrema(&self) -> Vec<f64> {
        // B'(t)/3 = a t^2 + b t + c per axis
        let a = -self.p0 + 3.0 * self.p1 - 3.0 * self.p2 + self.p3;
        let b = 2.0 * (self.p0 - 2.0 * self.p1 + self.p2);
        let c = self.p1 - self.p0;

        let mut ts = Vec::with_capacity(4);
        for axis in 0..2 {
            for t in solve_quadratic(a[axis], b[axis], c[axis]) {
                if t > 0.0 && t < 1.0 {
                    ts.push(t);
                }
            }
        }
        ts
    }

    /// Tight box around the curve (not the control hull).
    pub fn bbox(&self) -> BBox {
        let mut bb = BBox::from_corners(self.p0, self.p3);
        for t in self.extrema() {
            bb.expand_point(self.eval(t));
        }
        bb
    }

    /// Shortest distance from `p` to the curve.
    ///
    /// Every local minimum of the coarse samples is refined, not just the
    /// closest sample.
    pub fn nearest_distance(&self, p: DVec2) -> f64 {
        if self.is_line() {
            return distance_to_segment(p, self.p0, self.p3);
        }

        let step = 1.0 / DISTANCE_SAMPLES as f64;
        let samples: Vec<f64> = (0..=DISTANCE_SAMPLES)
            .map(|i| self.eval(i as f64 * step).distance_squared(p))
            .collect();

        let mut best = f64::INFINITY;
        for (i, &d) in samples.iter().enumerate() {
            best = best.min(d);
            let left = i.checked_sub(1).map_or(f64::INFINITY, |j| samples[j]);
            let right = samples.get(i + 1).copied().unwrap_or(f64::INFINITY);
            if d <= left && d <= right {
                let lo = i.saturating_sub(1) as f64 * step;
                let hi = (i + 1).min(DISTANCE_SAMPLES) as f64 * step;
                best = best.min(self.refine(p, lo, hi));
            }
        }
        best.sqrt()
    }

    /// Squared distance at the local minimum of a bracket, by ternary search.
    fn refine(&self, p: DVec2, mut lo: f64, mut hi: f64) -> f64 {
        for _ in 0..DISTANCE_REFINE_STEPS {
            let m1 = lo + (hi - lo) / 3.0;
            let m2 = hi - (hi - lo) / 3.0;
            if self.eval(m1).distance_squared(p) < self.eval(m2).distance_squared(p) {
                hi = m2;
            } else {
                lo = m1;
            }
        }
        self.eval((lo + hi) / 2.0).distance_squared(p)
    }

    /// Control points sit on the chord, so the curve is its own chord.
    fn is_line(&self) -> bool {
        let chord = self.p3 - self.p0;
        let len2 = chord.length_squared();
        if len2 == 0.0 {
            return self.p1 == self.p0 && self.p2 == self.p3;
        }
        let on_chord = |q: DVec2| {
            let v = q - self.p0;
            let t = v.dot(chord) / len2;
            (0.0..=1.0).contains(&t) && chord.perp_dot(v).abs() <= 1e-12 * len2
        };
        on_chord(self.p1) && on_chord(self.p2)
    }
}

/// Distance from `p` to the segment `a`–`b`.
pub fn distance_to_segment(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let denom = ab.dot(ab);
    if denom <= 1.0e-20 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / denom).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Real roots of `a t^2 + b t + c`, degrading to the linear case.
///
/// `a` counts as zero relative to the other coefficients: a degree-elevated
/// quadratic leaves rounding noise there, not an exact zero.
fn solve_quadratic(a: f64, b: f64, c: f64) -> Vec<f64> {
    const REL_EPS: f64 = 1e-12;
    let scale = a.abs() + b.abs() + c.abs();
    if scale == 0.0 {
        return Vec::new();
    }
    if a.abs() <= REL_EPS * scale {
        if b.abs() <= REL_EPS * scale {
            return Vec::new();
        }
        return vec![-c / b];
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return Vec::new();
    }
    // q never cancels, so neither root does
    let q = -0.5 * (b + b.signum() * disc.sqrt());
    if q == 0.0 {
        return vec![0.0];
    }
    vec![q / a, c / q]
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    const EPSILON: f64 = 1e-9;

    fn assert_point_eq(actual: DVec2, expected: DVec2) {
        assert!(
            (actual - expected).length() < EPSILON,
            "expected {:?}, got {:?}",
            expected,
            actual
        );
    }

    fn arch() -> CubicBez {
        CubicBez::new(dvec2(0.0, 0.0), dvec2(0.0, 10.0), dvec2(10.0, 10.0), dvec2(10.0, 0.0))
    }

    #[test]
    fn reversed_form_runs_backwards() {
        let c = arch();
        assert_point_eq(c.reversed_at(0.0), c.p3);
        assert_point_eq(c.reversed_at(1.0), c.p0);
        assert_point_eq(c.eval(0.25), c.reversed_at(0.75));
    }

    #[test]
    fn eval_midpoint() {
        assert_point_eq(arch().eval(0.5), dvec2(5.0, 7.5));
    }

    #[test]
    fn line_length_is_exact() {
        let c = CubicBez::line(dvec2(0.0, 0.0), dvec2(3.0, 4.0));
        assert!((c.arclen() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn quarter_circle_length() {
        // Standard cubic approximation of a unit quarter circle
        let k = 0.5522847498;
        let c = CubicBez::new(dvec2(1.0, 0.0), dvec2(1.0, k), dvec2(k, 1.0), dvec2(0.0, 1.0));
        assert!((c.arclen() - std::f64::consts::FRAC_PI_2).abs() < 1e-3);
    }

    #[test]
    fn elevated_quad_matches_quad() {
        let (p0, ctrl, p2) = (dvec2(0.0, 0.0), dvec2(5.0, 10.0), dvec2(10.0, 0.0));
        let c = CubicBez::from_quad(p0, ctrl, p2);
        assert_point_eq(c.p0, p0);
        assert_point_eq(c.p3, p2);
        // Quadratic midpoint: 0.25 p0 + 0.5 ctrl + 0.25 p2
        assert_point_eq(c.eval(0.5), dvec2(5.0, 5.0));
    }

    #[test]
    fn bbox_uses_extrema_not_hull() {
        let bb = arch().bbox();
        assert!((bb.max_y() - 7.5).abs() < EPSILON);
        assert_eq!(bb.min_x(), 0.0);
        assert_eq!(bb.max_x(), 10.0);
    }

    #[test]
    fn near_zero_leading_coefficient_is_linear() {
        let roots = solve_quadratic(1e-12, -1500.0, 750.0);
        assert_eq!(roots.len(), 1);
        assert!((roots[0] - 0.5).abs() < EPSILON);
    }

    #[test]
    fn quadratic_roots_are_both_found() {
        let mut roots = solve_quadratic(1.0, -3.0, 2.0);
        roots.sort_by(f64::total_cmp);
        assert_eq!(roots, vec![1.0, 2.0]);
    }

    #[test]
    fn elevated_quad_box_holds_turning_point() {
        let p0 = dvec2(1271.1098315632748, 951.9137854029495);
        let ctrl = dvec2(1673.6540407452512, 1705.8446736769124);
        let p2 = dvec2(62.43159019003963, 973.34356610675);
        let bb = CubicBez::from_quad(p0, ctrl, p2).bbox().inflate(1e-9);

        for axis in 0..2 {
            let t = (p0[axis] - ctrl[axis]) / (p0[axis] - 2.0 * ctrl[axis] + p2[axis]);
            assert!(t > 0.0 && t < 1.0);
            let mt = 1.0 - t;
            let on_curve = mt * mt * p0 + 2.0 * mt * t * ctrl + t * t * p2;
            assert!(bb.contains(on_curve), "{on_curve:?} outside {bb:?}");
        }
    }

    #[test]
    fn distance_never_worse_than_dense_sampling() {
        let curves = [
            arch(),
            // loop
            CubicBez::new(
                dvec2(0.0, 0.0),
                dvec2(30.0, 30.0),
                dvec2(-20.0, 30.0),
                dvec2(10.0, 0.0),
            ),
            // S bend
            CubicBez::new(
                dvec2(0.0, 0.0),
                dvec2(40.0, -10.0),
                dvec2(-20.0, 30.0),
                dvec2(20.0, 20.0),
            ),
        ];
        for c in curves {
            for gx in -4..=8 {
                for gy in -4..=8 {
                    let p = dvec2(gx as f64 * 5.0, gy as f64 * 5.0);
                    let dense = (0..=4000)
                        .map(|i| c.eval(i as f64 / 4000.0).distance(p))
                        .fold(f64::INFINITY, f64::min);
                    let d = c.nearest_distance(p);
                    assert!(d <= dense + 1e-3, "{c:?} at {p:?}: {d} > {dense}");
                }
            }
        }
    }

    #[test]
    fn distance_to_arch_apex() {
        let d = arch().nearest_distance(dvec2(5.0, 9.5));
        assert!((d - 2.0).abs() < 1e-6, "got {d}");
    }

    #[test]
    fn distance_to_degenerate_line() {
        let c = CubicBez::line(dvec2(0.0, 0.0), dvec2(10.0, 0.0));
        assert!((c.nearest_distance(dvec2(5.0, 3.0)) - 3.0).abs() < EPSILON);
        assert!((c.nearest_distance(dvec2(13.0, 4.0)) - 5.0).abs() < EPSILON);
    }

    #[test]
    fn segment_distance_clamps_to_ends() {
        let d = distance_to_segment(dvec2(-3.0, 4.0), dvec2(0.0, 0.0), dvec2(10.0, 0.0));
        assert!((d - 5.0).abs() < EPSILON);
        let d = distance_to_segment(dvec2(1.0, 1.0), dvec2(2.0, 2.0), dvec2(2.0, 2.0));
        assert!((d - std::f64::consts::SQRT_2).abs() < EPSILON);
    }
}
