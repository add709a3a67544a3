//! Shape attributes and the update builder that changes them.
//!
//! [`ShapeAttrs`] is read-only from outside; every change goes through an
//! [`AttrUpdate`] handed to [`Shape::apply`](super::Shape::apply), which
//! validates the whole update before touching the shape.

use std::fmt;
use std::rc::Rc;

use glam::DVec2;

use super::hit::ClipRegion;
use super::marker::MarkerSymbol;
use crate::parse::PathInput;
use crate::types::{Color, Opacity, Width};

#[derive(Clone)]
pub struct ShapeAttrs {
    pub(crate) line_width: Width,
    pub(crate) line_append_width: Width,
    pub(crate) fill: Option<Color>,
    pub(crate) stroke: Option<Color>,
    pub(crate) fill_opacity: Opacity,
    pub(crate) stroke_opacity: Opacity,
    pub(crate) clip: Option<Rc<dyn ClipRegion>>,
    pub(crate) arrow: bool,
}

impl Default for ShapeAttrs {
    fn default() -> Self {
        ShapeAttrs {
            line_width: Width::ONE,
            line_append_width: Width::ZERO,
            fill: None,
            stroke: None,
            fill_opacity: Opacity::OPAQUE,
            stroke_opacity: Opacity::OPAQUE,
            clip: None,
            arrow: false,
        }
    }
}

impl ShapeAttrs {
    pub fn line_width(&self) -> Width {
        self.line_width
    }

    /// Extra width counted for hit-testing and boxes but never drawn.
    pub fn line_append_width(&self) -> Width {
        self.line_append_width
    }

    /// Width used for boxes and stroke hits.
    pub fn hit_width(&self) -> Width {
        self.line_width + self.line_append_width
    }

    pub fn fill(&self) -> Option<&Color> {
        self.fill.as_ref()
    }

    pub fn stroke(&self) -> Option<&Color> {
        self.stroke.as_ref()
    }

    pub fn fill_opacity(&self) -> Opacity {
        self.fill_opacity
    }

    pub fn stroke_opacity(&self) -> Opacity {
        self.stroke_opacity
    }

    pub fn clip(&self) -> Option<&Rc<dyn ClipRegion>> {
        self.clip.as_ref()
    }

    pub fn arrow(&self) -> bool {
        self.arrow
    }
}

impl fmt::Debug for ShapeAttrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShapeAttrs")
            .field("line_width", &self.line_width)
            .field("line_append_width", &self.line_append_width)
            .field("fill", &self.fill)
            .field("stroke", &self.stroke)
            .field("fill_opacity", &self.fill_opacity)
            .field("stroke_opacity", &self.stroke_opacity)
            .field("clip", &self.clip.is_some())
            .field("arrow", &self.arrow)
            .finish()
    }
}

/// A batch of attribute changes.
///
/// Unset fields are left alone. Values are plain numbers here and only
/// validated when the update is applied.
#[derive(Clone, Default)]
pub struct AttrUpdate {
    pub(crate) path: Option<Option<PathInput>>,
    pub(crate) line_width: Option<f64>,
    pub(crate) line_append_width: Option<f64>,
    pub(crate) fill: Option<Option<Color>>,
    pub(crate) stroke: Option<Option<Color>>,
    pub(crate) fill_opacity: Option<f64>,
    pub(crate) stroke_opacity: Option<f64>,
    pub(crate) clip: Option<Option<Rc<dyn ClipRegion>>>,
    pub(crate) arrow: Option<bool>,
    pub(crate) x: Option<f64>,
    pub(crate) y: Option<f64>,
    pub(crate) radius: Option<f64>,
    pub(crate) symbol: Option<MarkerSymbol>,
}

impl AttrUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, input: impl Into<PathInput>) -> Self {
        self.path = Some(Some(input.into()));
        self
    }

    pub fn clear_path(mut self) -> Self {
        self.path = Some(None);
        self
    }

    pub fn line_width(mut self, width: f64) -> Self {
        self.line_width = Some(width);
        self
    }

    pub fn line_append_width(mut self, width: f64) -> Self {
        self.line_append_width = Some(width);
        self
    }

    pub fn fill(mut self, color: impl Into<Color>) -> Self {
        self.fill = Some(Some(color.into()));
        self
    }

    pub fn no_fill(mut self) -> Self {
        self.fill = Some(None);
        self
    }

    pub fn stroke(mut self, color: impl Into<Color>) -> Self {
        self.stroke = Some(Some(color.into()));
        self
    }

    pub fn no_stroke(mut self) -> Self {
        self.stroke = Some(None);
        self
    }

    pub fn fill_opacity(mut self, opacity: f64) -> Self {
        self.fill_opacity = Some(opacity);
        self
    }

    pub fn stroke_opacity(mut self, opacity: f64) -> Self {
        self.stroke_opacity = Some(opacity);
        self
    }

    pub fn clip(mut self, clip: Rc<dyn ClipRegion>) -> Self {
        self.clip = Some(Some(clip));
        self
    }

    pub fn no_clip(mut self) -> Self {
        self.clip = Some(None);
        self
    }

    pub fn arrow(mut self, arrow: bool) -> Self {
        self.arrow = Some(arrow);
        self
    }

    /// Marker center
    pub fn center(mut self, center: DVec2) -> Self {
        self.x = Some(center.x);
        self.y = Some(center.y);
        self
    }

    pub fn x(mut self, x: f64) -> Self {
        self.x = Some(x);
        self
    }

    pub fn y(mut self, y: f64) -> Self {
        self.y = Some(y);
        self
    }

    pub fn radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn symbol(mut self, symbol: MarkerSymbol) -> Self {
        self.symbol = Some(symbol);
        self
    }

    /// Whether the update changes anything the bounding box depends on.
    pub(crate) fn touches_geometry(&self) -> bool {
        self.path.is_some()
            || self.line_width.is_some()
            || self.line_append_width.is_some()
            || self.touches_marker()
    }

    pub(crate) fn touches_marker(&self) -> bool {
        self.x.is_some() || self.y.is_some() || self.radius.is_some() || self.symbol.is_some()
    }
}
