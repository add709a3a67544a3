//! Retained-mode 2D vector shapes with hit-testing.
//!
//! Shapes hold declarative attributes, compute their geometry lazily and
//! answer "is this pointer over me?" queries:
//!
//! ```
//! use hitpath::{AttrUpdate, Shape};
//!
//! let mut line = Shape::path("M0 0 L100 0");
//! line.apply(AttrUpdate::new().stroke("black").line_width(4.0)).unwrap();
//!
//! assert!(line.is_hit(50.0, 1.5));
//! assert!(!line.is_hit(50.0, 3.0));
//! assert_eq!(line.point_at(0.5).map(|p| p.x), Some(50.0));
//! ```
//!
//! Path data is the SVG path mini-language. Filled-area containment is
//! delegated to a [`RenderContext`]; [`RecordingContext`] is an in-memory
//! one that answers with the even-odd rule.

pub mod errors;
pub mod events;
mod log;
pub mod parse;
pub mod path;
pub mod render;
pub mod scene;
pub mod shape;
pub mod types;

pub use errors::{AttrError, PathDataError, SceneError};
pub use events::{Event, EventDispatcher, ListenerId};
pub use parse::{PathCommand, PathInput, tokenize};
pub use path::{PathSegment, SegmentKind};
pub use render::{DrawOp, RecordingContext, RenderContext};
pub use scene::{NodeId, Scene};
pub use shape::{
    AttrUpdate, ClipRegion, Containment, Geometry, MarkerGeometry, MarkerSymbol, PathGeometry,
    Shape, ShapeAttrs, ShapeKind,
};
pub use types::{BBox, Color, NumericError, Opacity, Width};

pub use glam::{DAffine2, DVec2, dvec2};
