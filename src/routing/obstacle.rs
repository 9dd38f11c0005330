use serde::Serialize;

use crate::error::SceneError;
use crate::geometry::{Point, segments_cross};

/// Parametric overlap below which a segment only grazes a corner.
const INTERIOR_EPSILON: f32 = 1e-4;

/// Axis-aligned node rectangle seen by the router. The clearance margin is
/// only applied when corners are computed; the rectangle itself is never
/// grown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Obstacle {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Result<Self, SceneError> {
        if !(x.is_finite() && y.is_finite() && width.is_finite() && height.is_finite()) {
            return Err(SceneError::NonFiniteGeometry);
        }
        if width < 0.0 || height < 0.0 {
            return Err(SceneError::NegativeSize { width, height });
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Corners grown by `margin` on every side, in top-left, top-right,
    /// bottom-right, bottom-left order.
    pub fn inflated_corners(&self, margin: f32) -> [Point; 4] {
        let left = self.x - margin;
        let top = self.y - margin;
        let right = self.x + self.width + margin;
        let bottom = self.y + self.height + margin;
        [
            Point::new(left, top),
            Point::new(right, top),
            Point::new(right, bottom),
            Point::new(left, bottom),
        ]
    }

    /// True when the segment crosses one of the inflated polygon's edges.
    pub fn blocks_segment(&self, margin: f32, src: Point, dst: Point) -> bool {
        let corners = self.inflated_corners(margin);
        (0..corners.len()).any(|k| {
            let a = corners[k];
            let b = corners[(k + 1) % corners.len()];
            segments_cross(a, b, src, dst)
        })
    }

    /// True when the segment enters the open interior of the inflated box.
    ///
    /// Unlike [`Obstacle::blocks_segment`] this also catches segments that
    /// slip through the box corner to corner, or that start on the boundary
    /// and leave through a corner. Running along an edge or touching a
    /// corner does not count.
    pub fn passes_through(&self, margin: f32, src: Point, dst: Point) -> bool {
        let [top_left, _, bottom_right, _] = self.inflated_corners(margin);
        let mut enter = 0.0f32;
        let mut exit = 1.0f32;
        for (start, delta, low, high) in [
            (src.x, dst.x - src.x, top_left.x, bottom_right.x),
            (src.y, dst.y - src.y, top_left.y, bottom_right.y),
        ] {
            if delta == 0.0 {
                if start <= low || start >= high {
                    return false;
                }
                continue;
            }
            let a = (low - start) / delta;
            let b = (high - start) / delta;
            enter = enter.max(a.min(b));
            exit = exit.min(a.max(b));
        }
        exit - enter > INTERIOR_EPSILON
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}
