//! The backend of renderer, which should be responsible for only one thing:
//! pushing resources, states and draw calls into a low-level video API.
//!
//! State methods are only ever called by the device when the matching render state is
//! dirty, in a fixed order, see `VideoSystem::apply_render_states`.

pub mod headless;

#[cfg(not(target_arch = "wasm32"))]
pub mod gl;

use crate::errors::*;
use crate::math::prelude::{Color, Matrix4, Vector2};

use super::assets::prelude::*;
use super::convention::{Convention, NativeRect};
use super::state::{AddressMode, BlendMode, Filtering, PrimitiveMode};

pub trait Visitor {
    /// The coordinate convention of viewport and scissor rectangles.
    fn convention(&self) -> Convention;

    unsafe fn create_texture(
        &mut self,
        handle: TextureHandle,
        params: TextureParams,
        data: Option<&TextureData>,
    ) -> Result<()>;

    unsafe fn update_texture(&mut self, handle: TextureHandle, bytes: &[u8]) -> Result<()>;

    unsafe fn delete_texture(&mut self, handle: TextureHandle) -> Result<()>;

    unsafe fn create_buffer(
        &mut self,
        handle: BufferHandle,
        params: BufferParams,
        data: Option<&[u8]>,
    ) -> Result<()>;

    unsafe fn update_buffer(&mut self, handle: BufferHandle, bytes: &[u8]) -> Result<()>;

    unsafe fn delete_buffer(&mut self, handle: BufferHandle) -> Result<()>;

    unsafe fn create_shader(
        &mut self,
        handle: ShaderHandle,
        params: ShaderParams,
        source: &str,
    ) -> Result<()>;

    unsafe fn delete_shader(&mut self, handle: ShaderHandle) -> Result<()>;

    unsafe fn update_uniform(
        &mut self,
        handle: ShaderHandle,
        name: &str,
        variable: UniformVariable,
    ) -> Result<()>;

    unsafe fn set_clear_color(&mut self, color: Color) -> Result<()>;

    /// Binds the render target, or the window surface if `None`.
    unsafe fn bind_render_target(&mut self, target: Option<TextureHandle>) -> Result<()>;

    unsafe fn bind_texture(
        &mut self,
        slot: usize,
        texture: Option<TextureHandle>,
        filtering: Filtering,
        address: AddressMode,
    ) -> Result<()>;

    unsafe fn set_blend_mode(&mut self, mode: BlendMode) -> Result<()>;

    unsafe fn set_viewport(&mut self, rect: NativeRect) -> Result<()>;

    unsafe fn set_scissor_enabled(&mut self, enabled: bool) -> Result<()>;

    unsafe fn set_back_face_cull(&mut self, enabled: bool) -> Result<()>;

    unsafe fn set_scissor(&mut self, rect: NativeRect) -> Result<()>;

    unsafe fn set_projection(&mut self, projection: &Matrix4<f32>) -> Result<()>;

    unsafe fn set_model_view(&mut self, model_view: &Matrix4<f32>) -> Result<()>;

    unsafe fn set_depth_write(&mut self, enabled: bool) -> Result<()>;

    unsafe fn set_depth_test(&mut self, enabled: bool) -> Result<()>;

    unsafe fn bind_shaders(
        &mut self,
        vs: Option<ShaderHandle>,
        ps: Option<ShaderHandle>,
    ) -> Result<()>;

    unsafe fn bind_vertex_buffer(&mut self, buffer: Option<BufferHandle>) -> Result<()>;

    unsafe fn bind_index_buffer(&mut self, buffer: Option<BufferHandle>) -> Result<()>;

    /// Clears the color of the bound target with the current clear color.
    unsafe fn clear(&mut self) -> Result<()>;

    unsafe fn clear_depth(&mut self) -> Result<()>;

    unsafe fn draw(&mut self, primitive: PrimitiveMode, vertices: u32) -> Result<()>;

    unsafe fn draw_indexed(&mut self, primitive: PrimitiveMode, indices: u32) -> Result<()>;

    /// Notifies that the window surface has been resized.
    unsafe fn resize(&mut self, dimensions: Vector2<u32>) -> Result<()>;

    /// Finishes the commands of current frame.
    unsafe fn advance(&mut self) -> Result<()>;
}

/// Creates a visitor of the OpenGL backend. The GL functions must have been loaded into
/// the current context, see `WindowSystem::make_current`.
#[cfg(not(target_arch = "wasm32"))]
pub fn new() -> Result<Box<dyn Visitor>> {
    let visitor = unsafe { self::gl::visitor::GLVisitor::new()? };
    Ok(Box::new(visitor))
}

pub fn new_headless() -> Box<dyn Visitor> {
    Box::new(self::headless::HeadlessVisitor::new())
}
