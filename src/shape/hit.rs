//! Hit-testing collaborators: clip regions and fill probes.

use std::cell::RefCell;
use std::rc::Rc;

use glam::{DAffine2, DVec2, dvec2};

use super::Shape;
use crate::render::RenderContext;
use crate::types::{BBox, Width};

/// Outcome of a containment test that may need a rendering backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    Inside,
    Outside,
    /// No rendering context was available to answer
    Indeterminate,
}

impl Containment {
    /// Indeterminate counts as a miss.
    pub fn is_inside(self) -> bool {
        self == Containment::Inside
    }
}

impl From<bool> for Containment {
    fn from(inside: bool) -> Self {
        if inside {
            Containment::Inside
        } else {
            Containment::Outside
        }
    }
}

/// Predicate gating which world points a shape may be hit at.
pub trait ClipRegion {
    fn inside(&self, x: f64, y: f64) -> bool;
}

impl<F> ClipRegion for F
where
    F: Fn(f64, f64) -> bool,
{
    fn inside(&self, x: f64, y: f64) -> bool {
        self(x, y)
    }
}

impl ClipRegion for BBox {
    fn inside(&self, x: f64, y: f64) -> bool {
        self.contains(dvec2(x, y))
    }
}

/// A shape clips by its own hit area.
impl ClipRegion for Shape {
    fn inside(&self, x: f64, y: f64) -> bool {
        self.is_hit(x, y)
    }
}

/// Everything a geometry needs from its shape to answer a containment query.
pub struct HitProbe<'a> {
    pub(crate) line_width: Width,
    /// `line_width + line_append_width`
    pub(crate) hit_width: Width,
    pub(crate) fill: bool,
    pub(crate) stroke: bool,
    pub(crate) arrow: Option<Width>,
    pub(crate) context: Option<&'a Rc<RefCell<dyn RenderContext>>>,
}

impl HitProbe<'_> {
    pub fn line_width(&self) -> Width {
        self.line_width
    }

    pub fn hit_width(&self) -> Width {
        self.hit_width
    }

    pub fn has_fill(&self) -> bool {
        self.fill
    }

    pub fn has_stroke(&self) -> bool {
        self.stroke
    }

    /// Build a path with `draw` in local space and ask the context about `p`.
    ///
    /// Indeterminate without a context, or when the context is already
    /// borrowed by a render in progress. The context's transform is put
    /// back afterwards.
    pub fn fill_test(&self, p: DVec2, draw: impl FnOnce(&mut dyn RenderContext)) -> Containment {
        let Some(cell) = self.context else {
            return Containment::Indeterminate;
        };
        let Ok(mut ctx) = cell.try_borrow_mut() else {
            return Containment::Indeterminate;
        };
        let saved = ctx.transform();
        ctx.set_transform(DAffine2::IDENTITY);
        draw(&mut *ctx);
        let inside = ctx.is_point_in_path(p);
        ctx.set_transform(saved);
        Containment::from(inside)
    }
}
