use std::cmp;

use serde::{Deserialize, Serialize};

/// An integer rectangle in application space, whose origin is the top-left
/// corner of the target and whose y axis grows downward.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    #[inline]
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Rect {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Creates a rect from its top-left position and size.
    #[inline]
    pub fn with_size(x: i32, y: i32, width: i32, height: i32) -> Self {
        Rect::new(x, y, x + width, y + height)
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    #[inline]
    pub fn overlap(&self, rhs: Self) -> Self {
        Rect {
            left: cmp::max(self.left, rhs.left),
            top: cmp::max(self.top, rhs.top),
            right: cmp::min(self.right, rhs.right),
            bottom: cmp::min(self.bottom, rhs.bottom),
        }
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }
}

/// Anchor used when laying out text or sprites relative to a position.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Align {
    TopLeft,
    Top,
    TopRight,
    Left,
    Center,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl Default for Align {
    fn default() -> Self {
        Align::TopLeft
    }
}

impl Align {
    /// Returns the normalized anchor, (0, 0) being top-left and (1, 1) bottom-right.
    pub fn anchor(self) -> (f32, f32) {
        match self {
            Align::TopLeft => (0.0, 0.0),
            Align::Top => (0.5, 0.0),
            Align::TopRight => (1.0, 0.0),
            Align::Left => (0.0, 0.5),
            Align::Center => (0.5, 0.5),
            Align::Right => (1.0, 0.5),
            Align::BottomLeft => (0.0, 1.0),
            Align::Bottom => (0.5, 1.0),
            Align::BottomRight => (1.0, 1.0),
        }
    }
}
