//! Open arrowhead at the end of a stroked path.

use std::f64::consts::FRAC_PI_6;

use glam::{DAffine2, DVec2};

use super::RenderContext;
use crate::types::Width;

/// Half-angle between the arrow's barbs and the shaft
pub const ARROW_ANGLE: f64 = FRAC_PI_6;

/// Length of each barb for a given stroke width.
pub fn arrow_length(line_width: Width) -> f64 {
    6.0 + 3.0 * line_width.raw()
}

/// Where the shaft has to stop so the mitered tip lands on `end`.
///
/// `dir` is the unit direction of travel at the end.
pub fn shortened_end(dir: DVec2, end: DVec2, line_width: Width) -> DVec2 {
    let pull_back = line_width.raw() / ARROW_ANGLE.sin() / 2.0;
    end - dir * pull_back
}

/// Draw the two barbs as an open polyline with its tip at `tip`.
pub fn draw_arrow(ctx: &mut dyn RenderContext, dir: DVec2, tip: DVec2, line_width: Width) {
    let back = -dir * arrow_length(line_width);
    let left = DAffine2::from_angle(ARROW_ANGLE).transform_vector2(back);
    let right = DAffine2::from_angle(-ARROW_ANGLE).transform_vector2(back);

    ctx.move_to(tip + left);
    ctx.line_to(tip);
    ctx.line_to(tip + right);
}
