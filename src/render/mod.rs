//! Drawing backend seam
//!
//! Shapes never draw pixels themselves. They describe their outline to a
//! [`RenderContext`], the same call sequence an HTML canvas receives, and
//! fill containment is answered by whatever backend sits behind it.

mod arrow;
mod recording;

pub use arrow::{ARROW_ANGLE, arrow_length, draw_arrow, shortened_end};
pub use recording::{DrawOp, RecordingContext};

use glam::{DAffine2, DVec2};

use crate::types::Color;

/// Canvas-style drawing context.
///
/// Coordinates passed to the path methods are in the context's current
/// user space (after [`set_transform`](RenderContext::set_transform)).
/// [`is_point_in_path`](RenderContext::is_point_in_path) tests the current
/// path with the even-odd rule.
pub trait RenderContext {
    fn begin_path(&mut self);
    fn move_to(&mut self, p: DVec2);
    fn line_to(&mut self, p: DVec2);
    fn quadratic_curve_to(&mut self, ctrl: DVec2, to: DVec2);
    fn bezier_curve_to(&mut self, ctrl1: DVec2, ctrl2: DVec2, to: DVec2);
    fn close_path(&mut self);

    fn fill(&mut self);
    fn stroke(&mut self);
    fn is_point_in_path(&self, p: DVec2) -> bool;

    fn global_alpha(&self) -> f64;
    fn set_global_alpha(&mut self, alpha: f64);
    fn set_line_width(&mut self, width: f64);
    fn set_fill_style(&mut self, color: &Color);
    fn set_stroke_style(&mut self, color: &Color);
    fn transform(&self) -> DAffine2;
    fn set_transform(&mut self, m: DAffine2);
}
