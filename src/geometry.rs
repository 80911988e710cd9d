//! Quadrilateral bounding boxes and affine crop mapping
//!
//! A bounding box is four corner points in image pixel coordinates with
//! sub-pixel precision. The same type serves as the caller's region of
//! interest and as a detection's reported quadrilateral.

/// A point in image pixel coordinates (column, row).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub col: f32,
    pub row: f32,
}

impl Point {
    pub fn new(col: f32, row: f32) -> Self {
        Self { col, row }
    }
}

/// Four-corner bounding box of a detection area.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub top_left: Point,
    pub top_right: Point,
    pub bot_left: Point,
    pub bot_right: Point,
}

impl BoundingBox {
    pub fn new(top_left: Point, top_right: Point, bot_left: Point, bot_right: Point) -> Self {
        Self {
            top_left,
            top_right,
            bot_left,
            bot_right,
        }
    }

    /// Axis-aligned box from a top-left corner and a size.
    pub fn from_rect(col: f32, row: f32, width: f32, height: f32) -> Self {
        Self {
            top_left: Point::new(col, row),
            top_right: Point::new(col + width, row),
            bot_left: Point::new(col, row + height),
            bot_right: Point::new(col + width, row + height),
        }
    }

    /// Full-frame box for an image of the given dimensions.
    pub fn full_frame(width: u32, height: u32) -> Self {
        Self::from_rect(0.0, 0.0, width as f32, height as f32)
    }

    /// Clamp all four corners into `[0, width] x [0, height]`.
    pub fn clipped(&self, width: u32, height: u32) -> Self {
        let clamp = |p: Point| Point {
            col: p.col.clamp(0.0, width as f32),
            row: p.row.clamp(0.0, height as f32),
        };
        Self {
            top_left: clamp(self.top_left),
            top_right: clamp(self.top_right),
            bot_left: clamp(self.bot_left),
            bot_right: clamp(self.bot_right),
        }
    }

    /// True when the box encloses no area (degenerate after clipping).
    pub fn is_empty(&self) -> bool {
        let w = (self.top_right.col - self.top_left.col)
            .max(self.bot_right.col - self.bot_left.col);
        let h = (self.bot_left.row - self.top_left.row)
            .max(self.bot_right.row - self.top_right.row);
        w <= 0.0 || h <= 0.0
    }

    /// True when every corner lies within `[0, width] x [0, height]`.
    pub fn within(&self, width: u32, height: u32) -> bool {
        [self.top_left, self.top_right, self.bot_left, self.bot_right]
            .iter()
            .all(|p| {
                p.col >= 0.0 && p.col <= width as f32 && p.row >= 0.0 && p.row <= height as f32
            })
    }

    pub fn corners(&self) -> [Point; 4] {
        [self.top_left, self.top_right, self.bot_left, self.bot_right]
    }
}

/// Affine mapping from crop coordinates back to source image coordinates.
///
/// Holds the first three rows of a 3x2 affine matrix, row-major, so that
/// `(x, y, 1) * m` transforms crop coordinates to source coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineMap(pub [f64; 6]);

impl AffineMap {
    /// Identity transform (crop coordinates == source coordinates).
    pub fn identity() -> Self {
        Self([1.0, 0.0, 0.0, 1.0, 0.0, 0.0])
    }

    /// Pure translation by (col, row).
    pub fn translation(col: f64, row: f64) -> Self {
        Self([1.0, 0.0, 0.0, 1.0, col, row])
    }

    /// Apply the transform to a crop-space point.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let m = &self.0;
        (
            x * m[0] + y * m[2] + m[4],
            x * m[1] + y * m[3] + m[5],
        )
    }
}

impl Default for AffineMap {
    fn default() -> Self {
        Self::identity()
    }
}
