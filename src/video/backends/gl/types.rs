use gl;
use gl::types::*;

use super::super::super::assets::prelude::*;
use super::super::super::state::{AddressMode, BlendMode, Filtering, PrimitiveMode};

impl From<BufferHint> for GLenum {
    fn from(hint: BufferHint) -> Self {
        match hint {
            BufferHint::Immutable => gl::STATIC_DRAW,
            BufferHint::Dynamic => gl::DYNAMIC_DRAW,
        }
    }
}

impl From<BufferKind> for GLenum {
    fn from(kind: BufferKind) -> Self {
        match kind {
            BufferKind::Vertex => gl::ARRAY_BUFFER,
            BufferKind::Index => gl::ELEMENT_ARRAY_BUFFER,
        }
    }
}

impl From<PrimitiveMode> for GLenum {
    fn from(primitive: PrimitiveMode) -> Self {
        match primitive {
            PrimitiveMode::PointList => gl::POINTS,
            PrimitiveMode::LineList => gl::LINES,
            PrimitiveMode::LineStrip => gl::LINE_STRIP,
            PrimitiveMode::TriangleList => gl::TRIANGLES,
            PrimitiveMode::TriangleStrip => gl::TRIANGLE_STRIP,
        }
    }
}

impl From<AddressMode> for GLenum {
    fn from(address: AddressMode) -> Self {
        match address {
            AddressMode::Wrap => gl::REPEAT,
            AddressMode::Clamp => gl::CLAMP_TO_EDGE,
        }
    }
}

/// The source and destination factors of `mode`, or `None` if blending is disabled.
pub fn blend_func(mode: BlendMode) -> Option<(GLenum, GLenum)> {
    match mode {
        BlendMode::Opaque => None,
        BlendMode::Alpha => Some((gl::SRC_ALPHA, gl::ONE_MINUS_SRC_ALPHA)),
        BlendMode::Add => Some((gl::SRC_ALPHA, gl::ONE)),
        BlendMode::PreMultiplied => Some((gl::ONE, gl::ONE_MINUS_SRC_ALPHA)),
        BlendMode::Multiply => Some((gl::DST_COLOR, gl::ONE_MINUS_SRC_ALPHA)),
        BlendMode::ForceWrite => Some((gl::ONE, gl::ZERO)),
    }
}

/// The minification and magnification filters of a texture with `levels` mip levels.
pub fn filters(filtering: Filtering, levels: u32) -> (GLenum, GLenum) {
    match filtering {
        Filtering::Nearest if levels > 1 => (gl::NEAREST_MIPMAP_NEAREST, gl::NEAREST),
        Filtering::Nearest => (gl::NEAREST, gl::NEAREST),
        Filtering::Linear if levels > 1 => (gl::LINEAR_MIPMAP_LINEAR, gl::LINEAR),
        Filtering::Linear => (gl::LINEAR, gl::LINEAR),
    }
}
