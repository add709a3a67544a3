//! Path geometry: parsed segments plus lazily built sampling caches.

use std::cell::OnceCell;
use std::fmt;

use glam::DVec2;

use super::geometry::Geometry;
use crate::errors::PathDataError;
use crate::log::{debug, warn};
use crate::parse::PathInput;
use crate::path::{self, ParameterCache, PathSegment, to_curve};
use crate::render::{RenderContext, draw_arrow, shortened_end};
use crate::types::{BBox, Width};

#[derive(Clone, Default)]
pub struct PathGeometry {
    source: Option<PathInput>,
    segments: Vec<PathSegment>,
    /// Last parse failure, kept for the host to inspect
    diagnostic: Option<std::rc::Rc<PathDataError>>,
    params: OnceCell<Option<ParameterCache>>,
}

impl fmt::Debug for PathGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathGeometry")
            .field("source", &self.source)
            .field("segments", &self.segments.len())
            .field("diagnostic", &self.diagnostic.as_ref().map(|d| d.to_string()))
            .finish()
    }
}

impl PathGeometry {
    pub fn new(input: impl Into<PathInput>) -> Self {
        let mut geometry = PathGeometry::default();
        geometry.set_path(Some(input.into()));
        geometry
    }

    /// Replace the path data. Bad data leaves an empty path behind.
    pub fn set_path(&mut self, input: Option<PathInput>) {
        self.params = OnceCell::new();
        self.diagnostic = None;
        self.segments = match &input {
            None => Vec::new(),
            Some(input) => match path::parse(input) {
                Ok(segments) => {
                    debug!(count = segments.len(), "parsed path segments");
                    segments
                }
                Err(err) => {
                    warn!(error = %err, "rejected path data");
                    self.diagnostic = Some(std::rc::Rc::new(err));
                    Vec::new()
                }
            },
        };
        self.source = input;
    }

    pub fn source(&self) -> Option<&PathInput> {
        self.source.as_ref()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn diagnostic(&self) -> Option<&PathDataError> {
        self.diagnostic.as_deref()
    }

    /// Normalized curve and arc-length cache, built on first use.
    pub fn parameters(&self) -> Option<&ParameterCache> {
        self.params
            .get_or_init(|| {
                let curve = to_curve(&self.segments)?;
                debug!(pieces = curve.pieces.len(), "built arc-length cache");
                Some(ParameterCache::new(curve))
            })
            .as_ref()
    }
}

impl Geometry for PathGeometry {
    fn kind_name(&self) -> &'static str {
        "path"
    }

    fn calculate_box(&self, width: Width) -> Option<BBox> {
        self.segments
            .iter()
            .filter_map(|s| s.local_box(width))
            .reduce(BBox::union)
    }

    fn is_point_in_stroke(&self, p: DVec2, width: Width) -> bool {
        self.segments.iter().any(|s| s.is_inside_stroke(p, width))
    }

    fn create_path(&self, ctx: &mut dyn RenderContext, arrow: Option<Width>) {
        if self.segments.is_empty() {
            return;
        }
        ctx.begin_path();
        for segment in &self.segments {
            let arrow_dir = arrow.zip(segment.end_tangent()).filter(|_| segment.is_last());
            match arrow_dir {
                Some((line_width, dir)) => {
                    let end = shortened_end(dir, segment.to(), line_width);
                    segment.with_end(end).draw(ctx);
                    draw_arrow(ctx, dir, end, line_width);
                }
                None => segment.draw(ctx),
            }
        }
    }

    fn point_at(&self, t: f64) -> Option<DVec2> {
        self.parameters()?.point_at(t)
    }
}
