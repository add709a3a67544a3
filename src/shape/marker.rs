//! Marker geometry: a symbol glyph centered on a point.

use std::fmt;
use std::str::FromStr;

use glam::{DVec2, dvec2};

use super::geometry::Geometry;
use super::hit::HitProbe;
use crate::render::RenderContext;
use crate::types::{BBox, Width};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerSymbol {
    #[default]
    Circle,
    Square,
    Diamond,
    Triangle,
    TriangleDown,
}

impl MarkerSymbol {
    pub fn name(self) -> &'static str {
        match self {
            MarkerSymbol::Circle => "circle",
            MarkerSymbol::Square => "square",
            MarkerSymbol::Diamond => "diamond",
            MarkerSymbol::Triangle => "triangle",
            MarkerSymbol::TriangleDown => "triangle-down",
        }
    }

    /// Outline vertices for the polygonal symbols, `None` for the circle.
    fn polygon(self, c: DVec2, r: f64) -> Option<Vec<DVec2>> {
        // Triangles are equilateral with the circumradius r
        let dx = r * 3f64.sqrt() / 2.0;
        let points = match self {
            MarkerSymbol::Circle => return None,
            MarkerSymbol::Square => vec![
                c + dvec2(-r, -r),
                c + dvec2(r, -r),
                c + dvec2(r, r),
                c + dvec2(-r, r),
            ],
            MarkerSymbol::Diamond => vec![
                c + dvec2(-r, 0.0),
                c + dvec2(0.0, -r),
                c + dvec2(r, 0.0),
                c + dvec2(0.0, r),
            ],
            MarkerSymbol::Triangle => vec![
                c + dvec2(-dx, r / 2.0),
                c + dvec2(0.0, -r),
                c + dvec2(dx, r / 2.0),
            ],
            MarkerSymbol::TriangleDown => vec![
                c + dvec2(-dx, -r / 2.0),
                c + dvec2(dx, -r / 2.0),
                c + dvec2(0.0, r),
            ],
        };
        Some(points)
    }
}

impl fmt::Display for MarkerSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MarkerSymbol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "circle" => Ok(MarkerSymbol::Circle),
            "square" => Ok(MarkerSymbol::Square),
            "diamond" => Ok(MarkerSymbol::Diamond),
            "triangle" => Ok(MarkerSymbol::Triangle),
            "triangle-down" => Ok(MarkerSymbol::TriangleDown),
            other => Err(format!("unknown marker symbol `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerGeometry {
    pub(crate) center: DVec2,
    pub(crate) radius: f64,
    pub(crate) symbol: MarkerSymbol,
}

impl MarkerGeometry {
    /// Unvalidated constructor; [`Shape::marker`](super::Shape::marker) checks the radius.
    pub(crate) fn new(center: DVec2, radius: f64) -> Self {
        MarkerGeometry {
            center,
            radius,
            symbol: MarkerSymbol::Circle,
        }
    }

    pub fn center(&self) -> DVec2 {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn symbol(&self) -> MarkerSymbol {
        self.symbol
    }
}

impl Geometry for MarkerGeometry {
    fn kind_name(&self) -> &'static str {
        "marker"
    }

    fn calculate_box(&self, width: Width) -> Option<BBox> {
        let r = self.radius + width.half();
        Some(BBox::from_corners(self.center - dvec2(r, r), self.center + dvec2(r, r)))
    }

    fn is_point_in_stroke(&self, p: DVec2, width: Width) -> bool {
        (p.distance(self.center) - self.radius).abs() <= width.half()
    }

    fn create_path(&self, ctx: &mut dyn RenderContext, _arrow: Option<Width>) {
        ctx.begin_path();
        match self.symbol.polygon(self.center, self.radius) {
            Some(points) => {
                let mut iter = points.into_iter();
                if let Some(first) = iter.next() {
                    ctx.move_to(first);
                }
                for p in iter {
                    ctx.line_to(p);
                }
            }
            None => {
                // Four quarter arcs
                const K: f64 = 0.552_284_749_830_793_4;
                let (c, r) = (self.center, self.radius);
                let quarter = |from: DVec2, to: DVec2| {
                    let (a, b) = (from - c, to - c);
                    (c + a + b * K, c + b + a * K, to)
                };
                let pts = [
                    c + dvec2(r, 0.0),
                    c + dvec2(0.0, r),
                    c + dvec2(-r, 0.0),
                    c + dvec2(0.0, -r),
                ];
                ctx.move_to(pts[0]);
                for i in 0..4 {
                    let (c1, c2, to) = quarter(pts[i], pts[(i + 1) % 4]);
                    ctx.bezier_curve_to(c1, c2, to);
                }
            }
        }
        ctx.close_path();
    }

    /// The whole disc of `radius` grown by half the line width is hot,
    /// whatever the symbol.
    fn is_point_in_path(&self, p: DVec2, probe: &HitProbe<'_>) -> bool {
        p.distance(self.center) <= self.radius + probe.line_width().half()
    }
}
