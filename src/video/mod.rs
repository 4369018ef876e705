//! The rendering core.
//!
//! `VideoSystem` is the device: it owns the dirty-tracked render state store and one
//! backend `Visitor` (OpenGL, or headless). Resource objects (`Texture`, `Buffer`) and
//! the `SpriteBatch` write states into the store and issue draw calls through it.

pub mod assets;
pub mod backends;
pub mod batch;
pub mod buffer;
pub mod convention;
pub mod effects;
pub mod errors;
pub mod state;
pub mod system;
pub mod texture;

/// Number of texture sampler slots.
pub const MAX_TEXTURES: usize = 8;

pub mod prelude {
    pub use super::assets::prelude::*;
    pub use super::batch::{SpriteBatch, SpriteVertex};
    pub use super::buffer::Buffer;
    pub use super::convention::Convention;
    pub use super::effects::EffectKernels;
    pub use super::state::{
        AddressMode, BlendMode, Filtering, PrimitiveMode, RenderStateValue, RenderStates,
    };
    pub use super::system::{FrameInfo, VideoParams, VideoSystem};
    pub use super::texture::{Texture, TextureRef};
}
