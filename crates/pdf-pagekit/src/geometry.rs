//! Rectangle and affine arithmetic in PDF user space (points, y up)

use serde::{Deserialize, Serialize};

/// A rectangle given by its lower-left and upper-right corners, in points
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Rectangle anchored at the origin
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// True when the rectangle has no positive area
    pub fn is_degenerate(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    /// Shrink by the given amounts on each side (negative values grow)
    pub fn inset(&self, left: f32, bottom: f32, right: f32, top: f32) -> Rect {
        Rect::new(
            self.x0 + left,
            self.y0 + bottom,
            self.x1 - right,
            self.y1 - top,
        )
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x0 + dx, self.y0 + dy, self.x1 + dx, self.y1 + dy)
    }

    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }

    /// Width greater than height (box only, rotation not considered)
    pub fn is_landscape(&self) -> bool {
        self.width() > self.height()
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.x0, self.y0, self.x1, self.y1]
    }

    /// Build from the four numbers of a PDF rectangle, normalizing corner order
    pub fn from_corners(a: f32, b: f32, c: f32, d: f32) -> Rect {
        Rect::new(a.min(c), b.min(d), a.max(c), b.max(d))
    }
}

/// Scale followed by translation: `x' = sx*x + tx`, `y' = sy*y + ty`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Affine {
    pub sx: f32,
    pub sy: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Default for Affine {
    fn default() -> Self {
        Self::identity()
    }
}

impl Affine {
    pub fn identity() -> Self {
        Self {
            sx: 1.0,
            sy: 1.0,
            tx: 0.0,
            ty: 0.0,
        }
    }

    pub fn translate(tx: f32, ty: f32) -> Self {
        Self {
            tx,
            ty,
            ..Self::identity()
        }
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Self {
            sx,
            sy,
            ..Self::identity()
        }
    }

    /// Apply `self` first, then `next`
    pub fn then(&self, next: &Affine) -> Affine {
        Affine {
            sx: self.sx * next.sx,
            sy: self.sy * next.sy,
            tx: self.tx * next.sx + next.tx,
            ty: self.ty * next.sy + next.ty,
        }
    }

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (self.sx * x + self.tx, self.sy * y + self.ty)
    }

    pub fn apply_rect(&self, rect: &Rect) -> Rect {
        let (a, b) = self.apply(rect.x0, rect.y0);
        let (c, d) = self.apply(rect.x1, rect.y1);
        Rect::from_corners(a, b, c, d)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// The six operands of a PDF `cm` operator
    pub fn to_pdf_matrix(&self) -> [f32; 6] {
        [self.sx, 0.0, 0.0, self.sy, self.tx, self.ty]
    }
}
