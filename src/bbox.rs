use nalgebra as na;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

pub trait BBoxFormat: fmt::Debug + Copy + Clone + PartialEq {}

/// Left-top-width-height format, the layout drawing primitives take
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ltwh;
impl BBoxFormat for Ltwh {}

/// Left-top-right-bottom format, contains left top and right bottom corners
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ltrb;
impl BBoxFormat for Ltrb {}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BBox<F: BBoxFormat>([f32; 4], PhantomData<F>);

impl<F: BBoxFormat> BBox<F> {
    #[inline]
    pub fn as_slice(&self) -> &[f32; 4] {
        &self.0
    }
}

impl<F: BBoxFormat> Serialize for BBox<F> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de, F: BBoxFormat> Deserialize<'de> for BBox<F> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <[f32; 4]>::deserialize(deserializer).map(|v| BBox(v, PhantomData))
    }
}

impl BBox<Ltwh> {
    #[inline(always)]
    pub fn left(&self) -> f32 {
        self.0[0]
    }

    #[inline(always)]
    pub fn top(&self) -> f32 {
        self.0[1]
    }

    #[inline(always)]
    pub fn width(&self) -> f32 {
        self.0[2]
    }

    #[inline(always)]
    pub fn height(&self) -> f32 {
        self.0[3]
    }
}

impl BBox<Ltrb> {
    #[inline]
    pub fn ltrb(x1: f32, x2: f32, x3: f32, x4: f32) -> Self {
        BBox([x1, x2, x3, x4], PhantomData)
    }

    /// Same box as corner plus size, for drawing.
    #[inline]
    pub fn as_ltwh(&self) -> BBox<Ltwh> {
        self.into()
    }

    #[inline(always)]
    pub fn left(&self) -> f32 {
        self.0[0]
    }

    #[inline(always)]
    pub fn top(&self) -> f32 {
        self.0[1]
    }

    #[inline(always)]
    pub fn right(&self) -> f32 {
        self.0[2]
    }

    #[inline(always)]
    pub fn bottom(&self) -> f32 {
        self.0[3]
    }

    /// Strict containment: every edge of `inner` lies inside this box,
    /// touching an edge does not count.
    #[inline]
    pub fn contains(&self, inner: &BBox<Ltrb>) -> bool {
        inner.left() > self.left()
            && inner.top() > self.top()
            && inner.right() < self.right()
            && inner.bottom() < self.bottom()
    }

    /// Per-coordinate linear blend, `t == 0` gives `self`, `t == 1` gives `other`.
    pub fn lerp(&self, other: &BBox<Ltrb>, t: f32) -> BBox<Ltrb> {
        let a = na::Vector4::from(self.0);
        let b = na::Vector4::from(other.0);
        let v = a.lerp(&b, t);

        BBox([v[0], v[1], v[2], v[3]], PhantomData)
    }
}

impl<'a> From<&'a BBox<Ltrb>> for BBox<Ltwh> {
    #[inline]
    fn from(v: &'a BBox<Ltrb>) -> Self {
        Self([v.0[0], v.0[1], v.0[2] - v.0[0], v.0[3] - v.0[1]], PhantomData)
    }
}

/// Written as `[x1 y1 x2 y2]`, the layout the tabular hand-off files use.
impl fmt::Display for BBox<Ltrb> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {} {} {}]", self.0[0], self.0[1], self.0[2], self.0[3])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BBoxParseError(pub String);

impl fmt::Display for BBoxParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for BBoxParseError {}

impl FromStr for BBox<Ltrb> {
    type Err = BBoxParseError;

    /// Accepts `[x1 y1 x2 y2]`, with commas and repeated spaces tolerated.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .trim()
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .ok_or_else(|| BBoxParseError(format!("expected `[x1 y1 x2 y2]`, got {:?}", s)))?;

        let mut coords = [0.0f32; 4];
        let mut count = 0;

        for part in inner
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
        {
            if count == 4 {
                return Err(BBoxParseError(format!("more than 4 coordinates in {:?}", s)));
            }

            coords[count] = part
                .parse()
                .map_err(|_| BBoxParseError(format!("non-numeric coordinate {:?}", part)))?;
            count += 1;
        }

        if count != 4 {
            return Err(BBoxParseError(format!(
                "expected 4 coordinates, got {} in {:?}",
                count, s
            )));
        }

        Ok(BBox(coords, PhantomData))
    }
}
