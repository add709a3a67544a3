//! Numeric primitives shared by the geometry code.
//!
//! Points and vectors are `glam::DVec2`; this module adds the validated
//! scalars that attributes are made of and the axis-aligned [`BBox`].

use std::fmt;

use glam::{DAffine2, DVec2, dvec2};

/// Error type for invalid numeric values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericError {
    /// Value is NaN
    NaN,
    /// Value is infinite
    Infinite,
    /// Value is negative when a non-negative value is required
    Negative,
    /// Value is zero or negative when a positive value is required
    NotPositive,
    /// Value is above the allowed maximum
    TooLarge,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::NaN => write!(f, "value is NaN"),
            NumericError::Infinite => write!(f, "value is infinite"),
            NumericError::Negative => write!(f, "value is negative"),
            NumericError::NotPositive => write!(f, "value is not positive"),
            NumericError::TooLarge => write!(f, "value is larger than 1"),
        }
    }
}

impl std::error::Error for NumericError {}

fn check_finite(val: f64) -> Result<f64, NumericError> {
    if val.is_nan() {
        Err(NumericError::NaN)
    } else if val.is_infinite() {
        Err(NumericError::Infinite)
    } else {
        Ok(val)
    }
}

/// A stroke width in user units. Never negative, never NaN.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
#[repr(transparent)]
pub struct Width(f64);

impl Width {
    pub const ZERO: Width = Width(0.0);
    pub const ONE: Width = Width(1.0);

    /// Create a width with validation (rejects NaN, infinite and negative values)
    #[inline]
    pub fn try_new(val: f64) -> Result<Width, NumericError> {
        let val = check_finite(val)?;
        if val < 0.0 {
            Err(NumericError::Negative)
        } else {
            Ok(Width(val))
        }
    }

    /// Get the raw value
    #[inline]
    pub fn raw(self) -> f64 {
        self.0
    }

    /// Half of the width; the distance a stroke reaches on each side of the path.
    #[inline]
    pub fn half(self) -> f64 {
        self.0 / 2.0
    }
}

impl std::ops::Add for Width {
    type Output = Width;
    fn add(self, rhs: Width) -> Width {
        Width(self.0 + rhs.0)
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An opacity in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Opacity(f64);

impl Opacity {
    pub const OPAQUE: Opacity = Opacity(1.0);

    /// Create an opacity with validation
    #[inline]
    pub fn try_new(val: f64) -> Result<Opacity, NumericError> {
        let val = check_finite(val)?;
        if val < 0.0 {
            Err(NumericError::Negative)
        } else if val > 1.0 {
            Err(NumericError::TooLarge)
        } else {
            Ok(Opacity(val))
        }
    }

    #[inline]
    pub fn raw(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn is_opaque(self) -> bool {
        self.0 == 1.0
    }
}

impl Default for Opacity {
    fn default() -> Self {
        Opacity::OPAQUE
    }
}

/// Validate a strictly positive finite value (marker radii).
pub fn try_positive(val: f64) -> Result<f64, NumericError> {
    let val = check_finite(val)?;
    if val <= 0.0 {
        Err(NumericError::NotPositive)
    } else {
        Ok(val)
    }
}

/// Validate a finite coordinate.
pub fn try_coord(val: f64) -> Result<f64, NumericError> {
    check_finite(val)
}

/// Simple color model; the raw string is kept for anything not recognized.
#[derive(Clone, Debug, PartialEq)]
pub enum Color {
    Named(String),
    Rgb(u8, u8, u8),
    Rgba(u8, u8, u8, u8),
    Raw(String),
}

impl Color {
    pub fn named(name: impl Into<String>) -> Self {
        Color::Named(name.into())
    }

    /// True when painting with this color leaves no visible mark.
    pub fn is_transparent(&self) -> bool {
        match self {
            Color::Named(s) | Color::Raw(s) => {
                let s = s.trim();
                s.is_empty()
                    || s.eq_ignore_ascii_case("none")
                    || s.eq_ignore_ascii_case("transparent")
            }
            Color::Rgb(..) => false,
            Color::Rgba(_, _, _, a) => *a == 0,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Named(s) | Color::Raw(s) => write!(f, "{}", s),
            Color::Rgb(r, g, b) => write!(f, "rgb({},{},{})", r, g, b),
            Color::Rgba(r, g, b, a) => write!(f, "rgba({},{},{},{})", r, g, b, a),
        }
    }
}

impl From<&str> for Color {
    fn from(s: &str) -> Self {
        Color::Named(s.to_string())
    }
}

/// Axis-aligned bounding box.
///
/// A `BBox` always holds `min <= max` on both axes; "no geometry" is
/// expressed as `Option<BBox>::None` rather than an inverted box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    pub min: DVec2,
    pub max: DVec2,
}

impl BBox {
    /// Box spanning two corner points in any order.
    pub fn from_corners(a: DVec2, b: DVec2) -> Self {
        BBox {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Degenerate box around a single point.
    pub fn from_point(p: DVec2) -> Self {
        BBox { min: p, max: p }
    }

    /// Smallest box containing every point, `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = DVec2>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bb = BBox::from_point(first);
        for p in iter {
            bb.expand_point(p);
        }
        Some(bb)
    }

    /// Expand to include a point
    pub fn expand_point(&mut self, p: DVec2) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Smallest box containing both boxes
    pub fn union(self, other: BBox) -> BBox {
        BBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Grow every side by `amount`
    pub fn inflate(self, amount: f64) -> BBox {
        let d = dvec2(amount, amount);
        BBox {
            min: self.min - d,
            max: self.max + d,
        }
    }

    pub fn min_x(&self) -> f64 {
        self.min.x
    }

    pub fn min_y(&self) -> f64 {
        self.min.y
    }

    pub fn max_x(&self) -> f64 {
        self.max.x
    }

    pub fn max_y(&self) -> f64 {
        self.max.y
    }

    pub fn x(&self) -> f64 {
        self.min.x
    }

    pub fn y(&self) -> f64 {
        self.min.y
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> DVec2 {
        (self.min + self.max) / 2.0
    }

    /// Inclusive containment test
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Box enclosing this box after an affine transform.
    pub fn transformed(&self, m: &DAffine2) -> BBox {
        let corners = [
            self.min,
            dvec2(self.max.x, self.min.y),
            self.max,
            dvec2(self.min.x, self.max.y),
        ];
        let mut bb = BBox::from_point(m.transform_point2(corners[0]));
        for c in &corners[1..] {
            bb.expand_point(m.transform_point2(*c));
        }
        bb
    }
}
