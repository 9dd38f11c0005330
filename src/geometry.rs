use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Exact coordinate equality, used for vertex identity.
    pub fn same_coords(&self, other: &Point) -> bool {
        self.x.to_bits() == other.x.to_bits() && self.y.to_bits() == other.y.to_bits()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

pub fn distance(a: Point, b: Point) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

/// Returns true when segment (p0, p1) crosses segment (p2, p3).
///
/// Both parametric coefficients must lie in the open interval (0, 1), so
/// segments that merely touch at an endpoint do not cross. Parallel and
/// collinear segments (zero denominator) never cross.
pub fn segments_cross(p0: Point, p1: Point, p2: Point, p3: Point) -> bool {
    let s1x = p1.x - p0.x;
    let s1y = p1.y - p0.y;
    let s2x = p3.x - p2.x;
    let s2y = p3.y - p2.y;

    let denom = -s2x * s1y + s1x * s2y;
    if denom == 0.0 || !denom.is_finite() {
        return false;
    }

    let s = (-s1y * (p0.x - p2.x) + s1x * (p0.y - p2.y)) / denom;
    let t = (s2x * (p0.y - p2.y) - s2y * (p0.x - p2.x)) / denom;

    s > 0.0 && s < 1.0 && t > 0.0 && t < 1.0
}
