//! Bitmap fonts in the AngelCode BMFont text format.

pub mod errors;
pub mod font;

pub mod prelude {
    pub use super::errors::Error as FontError;
    pub use super::font::{Font, FontCommon, FontPage, Glyph};
}
