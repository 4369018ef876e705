//! A backend that talks to no GPU at all. It optionally records every call it receives,
//! which makes the device observable in tests and tools.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::errors::*;
use crate::math::prelude::{Color, Matrix4, Vector2};

use super::super::assets::prelude::*;
use super::super::convention::{Convention, NativeRect};
use super::super::state::{AddressMode, BlendMode, Filtering, PrimitiveMode};
use super::Visitor;

/// A call received by `HeadlessVisitor`.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateTexture(TextureHandle, TextureParams),
    UpdateTexture(TextureHandle, usize),
    DeleteTexture(TextureHandle),
    CreateBuffer(BufferHandle, BufferParams),
    UpdateBuffer(BufferHandle, usize),
    DeleteBuffer(BufferHandle),
    CreateShader(ShaderHandle, ShaderParams),
    DeleteShader(ShaderHandle),
    UpdateUniform(ShaderHandle, String, UniformVariable),
    SetClearColor(Color),
    BindRenderTarget(Option<TextureHandle>),
    BindTexture(usize, Option<TextureHandle>, Filtering, AddressMode),
    SetBlendMode(BlendMode),
    SetViewport(NativeRect),
    SetScissorEnabled(bool),
    SetBackFaceCull(bool),
    SetScissor(NativeRect),
    SetProjection(Matrix4<f32>),
    SetModelView(Matrix4<f32>),
    SetDepthWrite(bool),
    SetDepthTest(bool),
    BindShaders(Option<ShaderHandle>, Option<ShaderHandle>),
    BindVertexBuffer(Option<BufferHandle>),
    BindIndexBuffer(Option<BufferHandle>),
    Clear,
    ClearDepth,
    Draw(PrimitiveMode, u32),
    DrawIndexed(PrimitiveMode, u32),
    Resize(Vector2<u32>),
    Advance,
}

impl Call {
    #[inline]
    pub fn is_draw(&self) -> bool {
        match *self {
            Call::Draw(_, _) | Call::DrawIndexed(_, _) => true,
            _ => false,
        }
    }
}

/// Shared view into the calls recorded by a `HeadlessVisitor`.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    calls: Rc<RefCell<Vec<Call>>>,
    pixels: Rc<RefCell<HashMap<TextureHandle, Vec<u8>>>>,
}

impl Recorder {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Returns and forgets the calls recorded so far.
    pub fn take(&self) -> Vec<Call> {
        ::std::mem::replace(&mut *self.calls.borrow_mut(), Vec::new())
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn count<F: Fn(&Call) -> bool>(&self, predicate: F) -> usize {
        self.calls.borrow().iter().filter(|v| predicate(*v)).count()
    }

    pub fn draws(&self) -> usize {
        self.count(Call::is_draw)
    }

    /// The latest base level pixels uploaded into `handle`.
    pub fn pixels(&self, handle: TextureHandle) -> Option<Vec<u8>> {
        self.pixels.borrow().get(&handle).cloned()
    }
}

pub struct HeadlessVisitor {
    convention: Convention,
    recorder: Option<Recorder>,
}

impl HeadlessVisitor {
    pub fn new() -> Self {
        HeadlessVisitor {
            convention: Convention::TopLeft,
            recorder: None,
        }
    }

    /// Creates a visitor which records its calls into the returned `Recorder`.
    pub fn recorded() -> (Self, Recorder) {
        let recorder = Recorder::default();
        let visitor = HeadlessVisitor {
            convention: Convention::TopLeft,
            recorder: Some(recorder.clone()),
        };

        (visitor, recorder)
    }

    /// Pretends to be a backend of another coordinate convention.
    pub fn with_convention(mut self, convention: Convention) -> Self {
        self.convention = convention;
        self
    }

    #[inline]
    fn record(&self, call: Call) -> Result<()> {
        if let Some(ref recorder) = self.recorder {
            recorder.calls.borrow_mut().push(call);
        }

        Ok(())
    }

    fn record_pixels(&self, handle: TextureHandle, bytes: Option<&[u8]>) {
        if let Some(ref recorder) = self.recorder {
            let mut pixels = recorder.pixels.borrow_mut();
            match bytes {
                Some(bytes) => pixels.insert(handle, bytes.to_vec()),
                None => pixels.remove(&handle),
            };
        }
    }
}

impl Default for HeadlessVisitor {
    fn default() -> Self {
        HeadlessVisitor::new()
    }
}

impl Visitor for HeadlessVisitor {
    fn convention(&self) -> Convention {
        self.convention
    }

    unsafe fn create_texture(
        &mut self,
        handle: TextureHandle,
        params: TextureParams,
        data: Option<&TextureData>,
    ) -> Result<()> {
        let base = data.and_then(|v| v.levels.first()).map(|v| v.as_slice());
        self.record_pixels(handle, base);
        self.record(Call::CreateTexture(handle, params))
    }

    unsafe fn update_texture(&mut self, handle: TextureHandle, bytes: &[u8]) -> Result<()> {
        self.record_pixels(handle, Some(bytes));
        self.record(Call::UpdateTexture(handle, bytes.len()))
    }

    unsafe fn delete_texture(&mut self, handle: TextureHandle) -> Result<()> {
        self.record_pixels(handle, None);
        self.record(Call::DeleteTexture(handle))
    }

    unsafe fn create_buffer(
        &mut self,
        handle: BufferHandle,
        params: BufferParams,
        _: Option<&[u8]>,
    ) -> Result<()> {
        self.record(Call::CreateBuffer(handle, params))
    }

    unsafe fn update_buffer(&mut self, handle: BufferHandle, bytes: &[u8]) -> Result<()> {
        self.record(Call::UpdateBuffer(handle, bytes.len()))
    }

    unsafe fn delete_buffer(&mut self, handle: BufferHandle) -> Result<()> {
        self.record(Call::DeleteBuffer(handle))
    }

    unsafe fn create_shader(
        &mut self,
        handle: ShaderHandle,
        params: ShaderParams,
        _: &str,
    ) -> Result<()> {
        self.record(Call::CreateShader(handle, params))
    }

    unsafe fn delete_shader(&mut self, handle: ShaderHandle) -> Result<()> {
        self.record(Call::DeleteShader(handle))
    }

    unsafe fn update_uniform(
        &mut self,
        handle: ShaderHandle,
        name: &str,
        variable: UniformVariable,
    ) -> Result<()> {
        self.record(Call::UpdateUniform(handle, name.to_owned(), variable))
    }

    unsafe fn set_clear_color(&mut self, color: Color) -> Result<()> {
        self.record(Call::SetClearColor(color))
    }

    unsafe fn bind_render_target(&mut self, target: Option<TextureHandle>) -> Result<()> {
        self.record(Call::BindRenderTarget(target))
    }

    unsafe fn bind_texture(
        &mut self,
        slot: usize,
        texture: Option<TextureHandle>,
        filtering: Filtering,
        address: AddressMode,
    ) -> Result<()> {
        self.record(Call::BindTexture(slot, texture, filtering, address))
    }

    unsafe fn set_blend_mode(&mut self, mode: BlendMode) -> Result<()> {
        self.record(Call::SetBlendMode(mode))
    }

    unsafe fn set_viewport(&mut self, rect: NativeRect) -> Result<()> {
        self.record(Call::SetViewport(rect))
    }

    unsafe fn set_scissor_enabled(&mut self, enabled: bool) -> Result<()> {
        self.record(Call::SetScissorEnabled(enabled))
    }

    unsafe fn set_back_face_cull(&mut self, enabled: bool) -> Result<()> {
        self.record(Call::SetBackFaceCull(enabled))
    }

    unsafe fn set_scissor(&mut self, rect: NativeRect) -> Result<()> {
        self.record(Call::SetScissor(rect))
    }

    unsafe fn set_projection(&mut self, projection: &Matrix4<f32>) -> Result<()> {
        self.record(Call::SetProjection(*projection))
    }

    unsafe fn set_model_view(&mut self, model_view: &Matrix4<f32>) -> Result<()> {
        self.record(Call::SetModelView(*model_view))
    }

    unsafe fn set_depth_write(&mut self, enabled: bool) -> Result<()> {
        self.record(Call::SetDepthWrite(enabled))
    }

    unsafe fn set_depth_test(&mut self, enabled: bool) -> Result<()> {
        self.record(Call::SetDepthTest(enabled))
    }

    unsafe fn bind_shaders(
        &mut self,
        vs: Option<ShaderHandle>,
        ps: Option<ShaderHandle>,
    ) -> Result<()> {
        self.record(Call::BindShaders(vs, ps))
    }

    unsafe fn bind_vertex_buffer(&mut self, buffer: Option<BufferHandle>) -> Result<()> {
        self.record(Call::BindVertexBuffer(buffer))
    }

    unsafe fn bind_index_buffer(&mut self, buffer: Option<BufferHandle>) -> Result<()> {
        self.record(Call::BindIndexBuffer(buffer))
    }

    unsafe fn clear(&mut self) -> Result<()> {
        self.record(Call::Clear)
    }

    unsafe fn clear_depth(&mut self) -> Result<()> {
        self.record(Call::ClearDepth)
    }

    unsafe fn draw(&mut self, primitive: PrimitiveMode, vertices: u32) -> Result<()> {
        self.record(Call::Draw(primitive, vertices))
    }

    unsafe fn draw_indexed(&mut self, primitive: PrimitiveMode, indices: u32) -> Result<()> {
        self.record(Call::DrawIndexed(primitive, indices))
    }

    unsafe fn resize(&mut self, dimensions: Vector2<u32>) -> Result<()> {
        self.record(Call::Resize(dimensions))
    }

    unsafe fn advance(&mut self) -> Result<()> {
        self.record(Call::Advance)
    }
}
