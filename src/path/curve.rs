//! Normalization of a segment list into cubic pieces.

use glam::DVec2;

use super::cubic::CubicBez;
use super::segment::PathSegment;

/// A path as an ordered list of cubics.
///
/// Within a subpath each piece starts where the previous one ended; a
/// move-to in the middle of the path starts a new chain without emitting
/// a piece of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub start: DVec2,
    pub pieces: Vec<CubicBez>,
}

pub fn to_curve(segments: &[PathSegment]) -> Option<Curve> {
    let first = segments.first()?;
    let pieces = segments.iter().flat_map(PathSegment::to_cubics).collect();
    Some(Curve {
        start: first.to(),
        pieces,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::tokenize;
    use crate::path::segment::resolve;
    use glam::dvec2;

    fn curve(d: &str) -> Curve {
        to_curve(&resolve(&tokenize(&d.into()).unwrap())).unwrap()
    }

    #[test]
    fn lines_become_degenerate_cubics() {
        let c = curve("M0 0 L10 0");
        assert_eq!(c.pieces, vec![CubicBez::line(dvec2(0.0, 0.0), dvec2(10.0, 0.0))]);
    }

    #[test]
    fn pieces_chain_within_subpath() {
        let c = curve("M0 0 Q5 5 10 0 C10 5 15 5 15 0 A5 5 0 0 1 25 0 Z");
        for pair in c.pieces.windows(2) {
            assert!((pair[0].p3 - pair[1].p0).length() < 1e-9);
        }
        assert_eq!(c.pieces.last().map(|p| p.p3), Some(dvec2(0.0, 0.0)));
    }

    #[test]
    fn move_starts_new_chain() {
        let c = curve("M0 0 L1 0 M5 5 L6 5");
        assert_eq!(c.start, dvec2(0.0, 0.0));
        assert_eq!(c.pieces.len(), 2);
        assert_eq!(c.pieces[1].p0, dvec2(5.0, 5.0));
    }

    #[test]
    fn lone_move_has_no_pieces() {
        let c = curve("M3 3");
        assert!(c.pieces.is_empty());
        assert_eq!(c.start, dvec2(3.0, 3.0));
    }
}
