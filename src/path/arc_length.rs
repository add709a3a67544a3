//! Arc-length parameterization of a normalized curve.
//!
//! `t` in `[0, 1]` maps to the point reached after travelling `t` of the
//! total length, piece by piece. Within a piece the cubic's own parameter
//! is used, so sampling is proportional across pieces but not inside them.

use glam::DVec2;

use super::curve::Curve;

/// Share of `[0, 1]` owned by one cubic piece
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

/// Partition of `[0, 1]` with one interval per piece.
///
/// Intervals are contiguous and the last one ends at exactly `1`. A curve
/// with zero total length gets no intervals at all.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcLengthCache {
    intervals: Vec<Interval>,
    total_length: f64,
}

impl ArcLengthCache {
    pub fn build(curve: &Curve) -> Self {
        let lengths: Vec<f64> = curve.pieces.iter().map(|p| p.arclen()).collect();
        let total_length: f64 = lengths.iter().sum();
        if total_length <= 0.0 || !total_length.is_finite() {
            return ArcLengthCache {
                intervals: Vec::new(),
                total_length: 0.0,
            };
        }

        let mut intervals = Vec::with_capacity(lengths.len());
        let mut travelled = 0.0;
        for len in &lengths {
            let start = travelled / total_length;
            travelled += len;
            intervals.push(Interval {
                start,
                end: travelled / total_length,
            });
        }
        if let Some(last) = intervals.last_mut() {
            last.end = 1.0;
        }

        ArcLengthCache {
            intervals,
            total_length,
        }
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    pub fn is_degenerate(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Piece index and local parameter for global `t`.
    ///
    /// The first interval whose end reaches `t` wins, so a shared boundary
    /// belongs to the earlier piece.
    pub fn locate(&self, t: f64) -> Option<(usize, f64)> {
        if !(0.0..=1.0).contains(&t) || self.intervals.is_empty() {
            return None;
        }
        let index = self.intervals.partition_point(|iv| iv.end < t);
        let iv = self.intervals.get(index)?;
        let width = iv.end - iv.start;
        let local = if width > 0.0 {
            ((t - iv.start) / width).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Some((index, local))
    }
}

/// A curve together with its arc-length cache, built on first use.
#[derive(Debug, Clone)]
pub struct ParameterCache {
    curve: Curve,
    lengths: ArcLengthCache,
}

impl ParameterCache {
    pub fn new(curve: Curve) -> Self {
        let lengths = ArcLengthCache::build(&curve);
        ParameterCache { curve, lengths }
    }

    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    pub fn lengths(&self) -> &ArcLengthCache {
        &self.lengths
    }

    /// Point `t` of the way along the curve.
    ///
    /// `None` outside `[0, 1]`. A zero-length curve answers with its start.
    pub fn point_at(&self, t: f64) -> Option<DVec2> {
        if !(0.0..=1.0).contains(&t) {
            return None;
        }
        if self.lengths.is_degenerate() {
            return Some(self.curve.start);
        }
        let (index, local) = self.lengths.locate(t)?;
        let piece = self.curve.pieces.get(index)?;
        Some(piece.reversed_at(1.0 - local))
    }
}
