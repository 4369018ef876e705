//! Conversion of application rectangles into the native coordinate system of a backend.
//!
//! Application space always has its origin at the top-left corner of the bound target,
//! with the y axis growing downward. OpenGL places the origin of viewports and scissor
//! rectangles at the bottom-left corner instead, so they must be flipped against the
//! height of whatever target is currently bound.

use crate::math::prelude::Rect;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Convention {
    /// Origin at top-left, y down (Direct3D).
    TopLeft,
    /// Origin at bottom-left, y up (OpenGL).
    BottomLeft,
}

/// A rectangle in native coordinates.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct NativeRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Default for Convention {
    fn default() -> Self {
        Convention::TopLeft
    }
}

impl Convention {
    /// Converts `rect` for a target of `target_height` pixels.
    pub fn to_native(self, rect: Rect, target_height: i32) -> NativeRect {
        let y = match self {
            Convention::TopLeft => rect.top,
            Convention::BottomLeft => target_height - rect.top - rect.height(),
        };

        NativeRect {
            x: rect.left,
            y,
            width: rect.width(),
            height: rect.height(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bottom_left_flip() {
        let rect = Rect::with_size(10, 20, 100, 50);
        let native = Convention::BottomLeft.to_native(rect, 600);
        assert_eq!(
            native,
            NativeRect {
                x: 10,
                y: 530,
                width: 100,
                height: 50
            }
        );
    }

    #[test]
    fn top_left_passthrough() {
        let rect = Rect::with_size(10, 20, 100, 50);
        let native = Convention::TopLeft.to_native(rect, 600);
        assert_eq!(native.y, 20);
        assert_eq!(native.height, 50);
    }

    #[test]
    fn full_target() {
        let rect = Rect::with_size(0, 0, 800, 600);
        assert_eq!(Convention::BottomLeft.to_native(rect, 600).y, 0);
    }
}
