pub mod buffer;
pub mod image;
pub mod shader;
pub mod texture;

pub mod prelude {
    pub use super::buffer::{BufferHandle, BufferHint, BufferKind, BufferParams};
    pub use super::image::{DecodedImage, ImageDecoder, PngDecoder};
    pub use super::shader::{ShaderHandle, ShaderParams, ShaderStage, UniformVariable};
    pub use super::texture::{TextureData, TextureHandle, TextureKind, TextureParams};
}
