//! Path geometry: segments, cubic normalization and arc-length sampling.

pub mod arc;
pub mod arc_length;
pub mod cubic;
pub mod curve;
pub mod segment;

pub use arc::EllipticalArc;
pub use arc_length::{ArcLengthCache, Interval, ParameterCache};
pub use cubic::CubicBez;
pub use curve::{Curve, to_curve};
pub use segment::{PathSegment, SegmentKind};

use crate::errors::PathDataError;
use crate::parse::{PathInput, tokenize};

/// Parse path data into absolute segments.
///
/// The first segment is always a move-to and the last one carries the
/// is-last flag.
pub fn parse(input: &PathInput) -> Result<Vec<PathSegment>, PathDataError> {
    let commands = tokenize(input)?;
    Ok(segment::resolve(&commands))
}
