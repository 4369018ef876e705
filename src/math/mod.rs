//! This module contains the math utils that mainly comes from `cgmath`, plus the
//! small integer rectangle and color types used by the renderer.

pub use cgmath::*;

pub mod color;
pub use self::color::Color;

pub mod rect;
pub use self::rect::{Align, Rect};

pub mod prelude {
    pub use super::color::Color;
    pub use super::rect::{Align, Rect};
    pub use cgmath::prelude::*;
    pub use cgmath::{Deg, Matrix4, Rad, Vector2, Vector3, Vector4};
}
