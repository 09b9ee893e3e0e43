//! Pixel-space geometry primitives shared by the layout engine and the animator.

use std::fmt;

/// Measured position and size of a view, in pixels relative to the grid container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl BoundingBox {
    /// The zero box hosts report for views that have not been laid out yet.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    /// Create a box from its origin and size.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Offset that visually places a view laid out at `self` back at `previous`.
    pub fn delta_from(&self, previous: &BoundingBox) -> Translate {
        Translate::new(previous.x - self.x, previous.y - self.y)
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// A 2D translation in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Translate {
    /// Horizontal offset.
    pub dx: f64,
    /// Vertical offset.
    pub dy: f64,
}

impl Translate {
    /// No offset.
    pub const IDENTITY: Self = Self { dx: 0.0, dy: 0.0 };

    /// Create a translation.
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// True when both components are zero.
    pub fn is_identity(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }

    /// Scale both components by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.dx * factor, self.dy * factor)
    }
}

/// Renders as a CSS transform value, e.g. `translate(0px, -220px)`.
impl fmt::Display for Translate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // -0.0 prints as "-0"; normalize so identity reads cleanly
        let dx = if self.dx == 0.0 { 0.0 } else { self.dx };
        let dy = if self.dy == 0.0 { 0.0 } else { self.dy };
        write!(f, "translate({dx}px, {dy}px)")
    }
}
