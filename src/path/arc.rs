//! Elliptical arcs: endpoint to center conversion and cubic approximation.
//!
//! See SVG 2, section B.2.4 "Conversion from endpoint to center
//! parameterization".

use std::f64::consts::{FRAC_PI_2, PI};

use glam::{DVec2, dvec2};

use super::cubic::CubicBez;

/// An arc as written in path data: endpoints plus ellipse description.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipticalArc {
    pub radii: DVec2,
    /// Rotation of the ellipse's x-axis, in degrees
    pub x_axis_rotation: f64,
    pub large_arc: bool,
    pub sweep: bool,
    pub from: DVec2,
    pub to: DVec2,
}

/// Result of converting an arc to center form
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArcParameterization {
    /// Zero radius: draw a straight line to the endpoint
    LineTo,
    /// Coincident endpoints: draw nothing
    Omit,
    CenterParameters {
        center: DVec2,
        radii: DVec2,
        theta1: f64,
        delta_theta: f64,
    },
}

impl EllipticalArc {
    pub fn center_parameterization(&self) -> ArcParameterization {
        let (mut rx, mut ry) = (self.radii.x.abs(), self.radii.y.abs());
        if rx * rx < f64::EPSILON || ry * ry < f64::EPSILON {
            return ArcParameterization::LineTo;
        }
        if self.from == self.to {
            return ArcParameterization::Omit;
        }

        let (sin_phi, cos_phi) = self.x_axis_rotation.to_radians().sin_cos();
        let (x1, y1) = (self.from.x, self.from.y);
        let (x2, y2) = (self.to.x, self.to.y);

        // Origin at the chord midpoint, axes along the ellipse
        let mid_x = (x1 - x2) / 2.0;
        let mid_y = (y1 - y2) / 2.0;
        let x1_ = cos_phi * mid_x + sin_phi * mid_y;
        let y1_ = -sin_phi * mid_x + cos_phi * mid_y;

        // Radii too small for the chord are scaled up uniformly
        let lambda = (x1_ / rx).powi(2) + (y1_ / ry).powi(2);
        if lambda > 1.0 {
            rx *= lambda.sqrt();
            ry *= lambda.sqrt();
        }

        let d = (rx * y1_).powi(2) + (ry * x1_).powi(2);
        if d == 0.0 {
            return ArcParameterization::Omit;
        }
        let mut k = ((rx * ry).powi(2) / d - 1.0).abs().sqrt();
        if self.sweep == self.large_arc {
            k = -k;
        }
        let cx_ = k * rx * y1_ / ry;
        let cy_ = -k * ry * x1_ / rx;

        let cx = cos_phi * cx_ - sin_phi * cy_ + (x1 + x2) / 2.0;
        let cy = sin_phi * cx_ + cos_phi * cy_ + (y1 + y2) / 2.0;

        let u = dvec2((x1_ - cx_) / rx, (y1_ - cy_) / ry);
        let v = dvec2((-x1_ - cx_) / rx, (-y1_ - cy_) / ry);
        let (u_len, v_len) = (u.length(), v.length());
        if u_len == 0.0 || v_len == 0.0 {
            return ArcParameterization::Omit;
        }

        let mut theta1 = (u.x / u_len).clamp(-1.0, 1.0).acos();
        if u.y < 0.0 {
            theta1 = -theta1;
        }

        let mut delta_theta = (u.dot(v) / (u_len * v_len)).clamp(-1.0, 1.0).acos();
        if u.perp_dot(v) < 0.0 {
            delta_theta = -delta_theta;
        }
        if self.sweep && delta_theta < 0.0 {
            delta_theta += PI * 2.0;
        } else if !self.sweep && delta_theta > 0.0 {
            delta_theta -= PI * 2.0;
        }

        ArcParameterization::CenterParameters {
            center: dvec2(cx, cy),
            radii: dvec2(rx, ry),
            theta1,
            delta_theta,
        }
    }

    /// Cubic pieces spanning at most a quarter turn each.
    ///
    /// A zero-radius arc is a single straight piece; coincident endpoints
    /// produce nothing.
    pub fn to_cubics(&self) -> Vec<CubicBez> {
        match self.center_parameterization() {
            ArcParameterization::LineTo => vec![CubicBez::line(self.from, self.to)],
            ArcParameterization::Omit => Vec::new(),
            ArcParameterization::CenterParameters {
                center,
                radii,
                theta1,
                delta_theta,
            } => {
                let n = (delta_theta.abs() / FRAC_PI_2 - 0.001).ceil().max(1.0) as usize;
                let step = delta_theta / n as f64;
                let mut pieces = Vec::with_capacity(n);
                let mut from = self.from;
                for i in 0..n {
                    let th0 = theta1 + i as f64 * step;
                    let mut piece =
                        arc_segment(center, radii, self.x_axis_rotation, th0, th0 + step);
                    // Keep pieces chained exactly; trig leaves tiny gaps
                    piece.p0 = from;
                    if i == n - 1 {
                        piece.p3 = self.to;
                    }
                    from = piece.p3;
                    pieces.push(piece);
                }
                pieces
            }
        }
    }

    /// Direction of travel at the endpoint, before normalization.
    pub fn end_direction(&self) -> DVec2 {
        match self.to_cubics().last() {
            Some(last) => {
                let d = last.p3 - last.p2;
                if d.length_squared() > 0.0 { d } else { last.p3 - last.p0 }
            }
            None => DVec2::ZERO,
        }
    }
}

/// One cubic approximating the ellipse between angles `th0` and `th1`.
pub fn arc_segment(
    center: DVec2,
    radii: DVec2,
    x_axis_rotation: f64,
    th0: f64,
    th1: f64,
) -> CubicBez {
    let (sin_phi, cos_phi) = x_axis_rotation.to_radians().sin_cos();
    let (sin_th0, cos_th0) = th0.sin_cos();
    let (sin_th1, cos_th1) = th1.sin_cos();
    let (rx, ry) = (radii.x, radii.y);

    let th_half = 0.5 * (th1 - th0);
    let t = (8.0 / 3.0) * (th_half * 0.5).sin().powi(2) / th_half.sin();

    let x0 = rx * cos_th0;
    let y0 = ry * sin_th0;
    let x1 = rx * (cos_th0 - t * sin_th0);
    let y1 = ry * (sin_th0 + t * cos_th0);
    let x3 = rx * cos_th1;
    let y3 = ry * sin_th1;
    let x2 = x3 + rx * (t * sin_th1);
    let y2 = y3 + ry * (-t * cos_th1);

    let place = |x: f64, y: f64| {
        center + dvec2(cos_phi * x - sin_phi * y, sin_phi * x + cos_phi * y)
    };
    CubicBez::new(place(x0, y0), place(x1, y1), place(x2, y2), place(x3, y3))
}
