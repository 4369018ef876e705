use std::cell::RefCell;
use std::collections::HashMap;
use std::mem;
use std::rc::Rc;

use cgmath::ortho;

use crate::math::prelude::*;
use crate::utils::prelude::ObjectPool;

use super::assets::prelude::*;
use super::backends::{self, headless::HeadlessVisitor, Visitor};
use super::convention::Convention;
use super::effects::{Effect, EffectKernels};
use super::errors::*;
use super::state::{BlendMode, PrimitiveMode, RenderStates};

/// The setup parameters of video system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoParams {
    /// Maximum number of quads a `SpriteBatch` submits with one draw call.
    pub sprite_batch_capacity: usize,
    /// Whether textures loaded through `ContentManager` get mip chains.
    pub generate_mipmaps: bool,
    /// The coordinate convention the headless backend pretends to have.
    pub headless_convention: Convention,
    pub kernels: EffectKernels,
}

impl Default for VideoParams {
    fn default() -> Self {
        VideoParams {
            sprite_batch_capacity: 2048,
            generate_mipmaps: true,
            headless_convention: Convention::TopLeft,
            kernels: EffectKernels::default(),
        }
    }
}

/// Statistics of the last finished frame.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    pub draw_calls: u32,
    pub vertices: u32,
    pub alive_textures: u32,
    pub alive_buffers: u32,
}

/// Handles released by dropped resource objects, waiting to be deleted on the next frame
/// boundary.
#[derive(Debug, Default)]
pub(crate) struct Releases {
    pub textures: Vec<TextureHandle>,
    pub buffers: Vec<BufferHandle>,
}

pub(crate) type SharedReleases = Rc<RefCell<Releases>>;

/// The rendering device.
///
/// `VideoSystem` owns the render state store and the backend. Frontends such as
/// `Texture` and `SpriteBatch` write states into `render_states_mut()`, and every
/// `clear`/`draw` call pushes the dirty states to the backend in a fixed order before
/// the command itself.
pub struct VideoSystem {
    visitor: Box<dyn Visitor>,
    states: RenderStates,
    resolution: Vector2<u32>,
    params: VideoParams,

    textures: ObjectPool<TextureHandle, TextureParams>,
    buffers: ObjectPool<BufferHandle, BufferParams>,
    shaders: ObjectPool<ShaderHandle, ShaderParams>,
    releases: SharedReleases,

    sprite_program: (ShaderHandle, ShaderHandle),
    fullscreen_vs: ShaderHandle,
    fullscreen_quad: BufferHandle,
    effects: HashMap<Effect, ShaderHandle>,

    info: FrameInfo,
    last_info: FrameInfo,
    in_frame: bool,
}

impl VideoSystem {
    /// Creates a video system on top of the OpenGL backend. The OpenGL context of the
    /// window must be current.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new(params: VideoParams, dimensions: Vector2<u32>) -> Result<Self> {
        let visitor = backends::new()?;
        VideoSystem::from_visitor(visitor, params, dimensions)
    }

    /// Creates a video system which draws nothing.
    pub fn headless(params: VideoParams, dimensions: Vector2<u32>) -> Result<Self> {
        let visitor = HeadlessVisitor::new().with_convention(params.headless_convention);
        VideoSystem::from_visitor(Box::new(visitor), params, dimensions)
    }

    pub fn from_visitor(
        visitor: Box<dyn Visitor>,
        params: VideoParams,
        dimensions: Vector2<u32>,
    ) -> Result<Self> {
        info!(
            "Creates video system with {:?} convention, {}x{}.",
            visitor.convention(),
            dimensions.x,
            dimensions.y
        );

        let mut video = VideoSystem {
            visitor,
            states: RenderStates::default(),
            resolution: dimensions,
            params,
            textures: ObjectPool::new(),
            buffers: ObjectPool::new(),
            shaders: ObjectPool::new(),
            releases: Rc::new(RefCell::new(Releases::default())),
            sprite_program: (ShaderHandle::default(), ShaderHandle::default()),
            fullscreen_vs: ShaderHandle::default(),
            fullscreen_quad: BufferHandle::default(),
            effects: HashMap::new(),
            info: FrameInfo::default(),
            last_info: FrameInfo::default(),
            in_frame: false,
        };

        let kernels = video.params.kernels.clone();
        let vs = video.create_shader(ShaderStage::Vertex, &kernels.sprite_vs)?;
        let ps = video.create_shader(ShaderStage::Pixel, &kernels.sprite_ps)?;
        video.sprite_program = (vs, ps);
        video.fullscreen_vs = video.create_shader(ShaderStage::Vertex, &kernels.fullscreen_vs)?;

        let quad = fullscreen_quad_bytes();
        let params = BufferParams {
            kind: BufferKind::Vertex,
            hint: BufferHint::Immutable,
            size: quad.len(),
        };

        video.fullscreen_quad = video.create_buffer(params, Some(&quad))?;
        Ok(video)
    }

    #[inline]
    pub fn params(&self) -> &VideoParams {
        &self.params
    }

    #[inline]
    pub fn render_states(&self) -> &RenderStates {
        &self.states
    }

    #[inline]
    pub fn render_states_mut(&mut self) -> &mut RenderStates {
        &mut self.states
    }

    /// The dimensions of the window surface in pixels.
    #[inline]
    pub fn true_resolution(&self) -> Vector2<u32> {
        self.resolution
    }

    /// The dimensions of the currently bound render target, or of the window surface.
    pub fn target_dimensions(&self) -> Vector2<u32> {
        match *self.states.render_target.get() {
            Some(handle) => self
                .textures
                .get(handle)
                .map(|v| v.dimensions)
                .unwrap_or(self.resolution),
            None => self.resolution,
        }
    }

    /// The vertex and pixel shaders of the default sprite program.
    #[inline]
    pub fn sprite_program(&self) -> (ShaderHandle, ShaderHandle) {
        self.sprite_program
    }

    #[inline]
    pub fn is_in_frame(&self) -> bool {
        self.in_frame
    }

    /// Statistics of the last finished frame.
    #[inline]
    pub fn frame_info(&self) -> FrameInfo {
        self.last_info
    }

    /// Resets every render state to its default, covers the whole window with viewport
    /// and scissor, and selects the default sprite program and 2D camera.
    pub fn begin_frame(&mut self) -> Result<()> {
        self.drain_releases()?;

        self.info = FrameInfo::default();
        self.in_frame = true;

        let (vs, ps) = self.sprite_program;
        let full = Rect::with_size(0, 0, self.resolution.x as i32, self.resolution.y as i32);
        let (projection, view) = camera_2d(self.resolution, Vector2::new(0.0, 0.0));

        let mut defaults = RenderStates::default();
        defaults.viewport.set(full);
        defaults.scissor.set(full);
        defaults.vertex_shader.set(Some(vs));
        defaults.pixel_shader.set(Some(ps));
        defaults.projection.set(projection);
        defaults.view.set(view);

        // Only the states which differ from last frame become dirty.
        self.states.restore(&defaults);
        Ok(())
    }

    pub fn end_frame(&mut self) -> Result<FrameInfo> {
        self.in_frame = false;
        unsafe { self.visitor.advance()? };
        self.drain_releases()?;

        self.info.alive_textures = self.textures.len() as u32;
        self.info.alive_buffers = self.buffers.len() as u32;
        self.last_info = self.info;
        Ok(self.info)
    }

    /// Notifies that the window surface has been resized.
    pub fn on_resize(&mut self, dimensions: Vector2<u32>) -> Result<()> {
        if dimensions == self.resolution {
            return Ok(());
        }

        debug!("Resizes window surface to {}x{}.", dimensions.x, dimensions.y);
        self.resolution = dimensions;
        unsafe { self.visitor.resize(dimensions)? };

        self.states.viewport.mark_dirty();
        self.states.scissor.mark_dirty();
        Ok(())
    }

    /// Sets an orthographic projection sized to the current target, with the origin at
    /// its top-left corner, and a view translated to `position`.
    pub fn set_2d_camera(&mut self, position: Vector2<f32>) {
        let (projection, view) = camera_2d(self.target_dimensions(), position);
        self.states.projection.set(projection);
        self.states.view.set(view);
    }

    /// Clears the color of the bound target.
    pub fn clear(&mut self, color: Color) -> Result<()> {
        debug_assert!(self.in_frame, "Clears outside of frame.");

        self.states.clear_color.set(color);
        self.apply_render_states()?;
        unsafe { self.visitor.clear()? };
        Ok(())
    }

    pub fn clear_depth(&mut self) -> Result<()> {
        debug_assert!(self.in_frame, "Clears outside of frame.");

        self.apply_render_states()?;
        unsafe { self.visitor.clear_depth()? };
        Ok(())
    }

    /// Draws `vertices` vertices of the bound vertex buffer.
    pub fn draw(&mut self, vertices: u32) -> Result<()> {
        debug_assert!(self.in_frame, "Draws outside of frame.");

        self.apply_render_states()?;
        let primitive = *self.states.primitive_mode.get();
        unsafe { self.visitor.draw(primitive, vertices)? };

        self.info.draw_calls += 1;
        self.info.vertices += vertices;
        Ok(())
    }

    /// Draws `indices` indices of the bound index buffer.
    pub fn draw_indexed(&mut self, indices: u32) -> Result<()> {
        debug_assert!(self.in_frame, "Draws outside of frame.");

        self.apply_render_states()?;
        let primitive = *self.states.primitive_mode.get();
        unsafe { self.visitor.draw_indexed(primitive, indices)? };

        self.info.draw_calls += 1;
        self.info.vertices += indices;
        Ok(())
    }

    /// Pushes every dirty render state to the backend and clears its dirty flag.
    ///
    /// States are applied in a fixed order: clear color, render target, textures and
    /// sampling, blend, viewport, scissor enable, culling, scissor rectangle, projection,
    /// model-view, depth write, depth test, shaders, vertex buffer and index buffer.
    /// The scissor rectangle is left pending while scissoring is disabled.
    pub fn apply_render_states(&mut self) -> Result<()> {
        let convention = self.visitor.convention();
        let target_height = self.target_dimensions().y as i32;

        let visitor = &mut self.visitor;
        let s = &mut self.states;

        unsafe {
            if s.clear_color.is_dirty() {
                visitor.set_clear_color(*s.clear_color.get())?;
                s.clear_color.reset_dirty();
            }

            if s.render_target.is_dirty() {
                visitor.bind_render_target(*s.render_target.get())?;
                s.render_target.reset_dirty();

                // The native rectangles depend on the height of bound target.
                s.viewport.mark_dirty();
                s.scissor.mark_dirty();
            }

            let sampling = s.sample_filtering.is_dirty() || s.sample_address_mode.is_dirty();
            let filtering = *s.sample_filtering.get();
            let address = *s.sample_address_mode.get();
            for (slot, texture) in s.textures.iter_mut().enumerate() {
                if texture.is_dirty() || (sampling && texture.get().is_some()) {
                    visitor.bind_texture(slot, *texture.get(), filtering, address)?;
                    texture.reset_dirty();
                }
            }

            s.sample_filtering.reset_dirty();
            s.sample_address_mode.reset_dirty();

            if s.blend_mode.is_dirty() {
                visitor.set_blend_mode(*s.blend_mode.get())?;
                s.blend_mode.reset_dirty();
            }

            if s.viewport.is_dirty() {
                let rect = convention.to_native(*s.viewport.get(), target_height);
                visitor.set_viewport(rect)?;
                s.viewport.reset_dirty();
            }

            if s.scissor_enabled.is_dirty() {
                visitor.set_scissor_enabled(*s.scissor_enabled.get())?;
                s.scissor_enabled.reset_dirty();
            }

            if s.back_face_cull.is_dirty() {
                visitor.set_back_face_cull(*s.back_face_cull.get())?;
                s.back_face_cull.reset_dirty();
            }

            if *s.scissor_enabled.get() && s.scissor.is_dirty() {
                let rect = convention.to_native(*s.scissor.get(), target_height);
                visitor.set_scissor(rect)?;
                s.scissor.reset_dirty();
            }

            if s.projection.is_dirty() {
                visitor.set_projection(s.projection.get())?;
                s.projection.reset_dirty();
            }

            if s.view.is_dirty() || s.world.is_dirty() {
                let model_view = s.view.get() * s.world.get();
                visitor.set_model_view(&model_view)?;
                s.view.reset_dirty();
                s.world.reset_dirty();
            }

            if s.depth_write.is_dirty() {
                visitor.set_depth_write(*s.depth_write.get())?;
                s.depth_write.reset_dirty();
            }

            if s.depth_enabled.is_dirty() {
                visitor.set_depth_test(*s.depth_enabled.get())?;
                s.depth_enabled.reset_dirty();
            }

            if s.vertex_shader.is_dirty() || s.pixel_shader.is_dirty() {
                visitor.bind_shaders(*s.vertex_shader.get(), *s.pixel_shader.get())?;
                s.vertex_shader.reset_dirty();
                s.pixel_shader.reset_dirty();
            }

            if s.vertex_buffer.is_dirty() {
                visitor.bind_vertex_buffer(*s.vertex_buffer.get())?;
                s.vertex_buffer.reset_dirty();
            }

            if s.index_buffer.is_dirty() {
                visitor.bind_index_buffer(*s.index_buffer.get())?;
                s.index_buffer.reset_dirty();
            }
        }

        Ok(())
    }

    /// Creates a texture object. A `TextureKind::Dynamic` texture is created without data.
    pub fn create_texture(
        &mut self,
        params: TextureParams,
        data: Option<&TextureData>,
    ) -> Result<TextureHandle> {
        params.validate(data)?;

        let handle = self.textures.create(params);
        if let Err(err) = unsafe { self.visitor.create_texture(handle, params, data) } {
            self.textures.free(handle);
            return Err(Error::ResourceCreationFailure(format!("{}", err)));
        }

        Ok(handle)
    }

    /// Replaces the pixels of a dynamic texture.
    pub fn update_texture(&mut self, handle: TextureHandle, bytes: &[u8]) -> Result<()> {
        let params = *self
            .textures
            .get(handle)
            .ok_or(Error::TextureHandleInvalid(handle))?;

        if params.kind != TextureKind::Dynamic {
            return Err(Error::UpdateImmutableBuffer);
        }

        if bytes.len() != params.bytes()? {
            return Err(Error::OutOfBounds);
        }

        unsafe { self.visitor.update_texture(handle, bytes)? };
        Ok(())
    }

    pub fn delete_texture(&mut self, handle: TextureHandle) -> Result<()> {
        if self.textures.free(handle).is_some() {
            self.states.unbind_texture(handle);
            unsafe { self.visitor.delete_texture(handle)? };
        }

        Ok(())
    }

    /// Gets the parameters of a live texture object.
    #[inline]
    pub fn texture(&self, handle: TextureHandle) -> Option<&TextureParams> {
        self.textures.get(handle)
    }

    pub fn create_buffer(
        &mut self,
        params: BufferParams,
        data: Option<&[u8]>,
    ) -> Result<BufferHandle> {
        params.validate(data)?;

        let handle = self.buffers.create(params);
        if let Err(err) = unsafe { self.visitor.create_buffer(handle, params, data) } {
            self.buffers.free(handle);
            return Err(Error::ResourceCreationFailure(format!("{}", err)));
        }

        Ok(handle)
    }

    /// Rewrites the head of a dynamic buffer.
    pub fn update_buffer(&mut self, handle: BufferHandle, bytes: &[u8]) -> Result<()> {
        let params = *self
            .buffers
            .get(handle)
            .ok_or(Error::BufferHandleInvalid(handle))?;

        if params.hint == BufferHint::Immutable {
            return Err(Error::UpdateImmutableBuffer);
        }

        if bytes.len() > params.size {
            return Err(Error::OutOfBounds);
        }

        unsafe { self.visitor.update_buffer(handle, bytes)? };
        Ok(())
    }

    pub fn delete_buffer(&mut self, handle: BufferHandle) -> Result<()> {
        if self.buffers.free(handle).is_some() {
            if *self.states.vertex_buffer.get() == Some(handle) {
                self.states.vertex_buffer.set(None);
            }

            if *self.states.index_buffer.get() == Some(handle) {
                self.states.index_buffer.set(None);
            }

            unsafe { self.visitor.delete_buffer(handle)? };
        }

        Ok(())
    }

    #[inline]
    pub fn buffer(&self, handle: BufferHandle) -> Option<&BufferParams> {
        self.buffers.get(handle)
    }

    pub fn create_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle> {
        let params = ShaderParams { stage };
        params.validate(source)?;

        let handle = self.shaders.create(params);
        if let Err(err) = unsafe { self.visitor.create_shader(handle, params, source) } {
            self.shaders.free(handle);
            return Err(Error::ShaderCreationFailure(format!("{}", err)));
        }

        Ok(handle)
    }

    pub fn delete_shader(&mut self, handle: ShaderHandle) -> Result<()> {
        if self.shaders.free(handle).is_some() {
            unsafe { self.visitor.delete_shader(handle)? };
        }

        Ok(())
    }

    /// Sets a uniform variable of shader stage. It stays in effect for all following
    /// draw calls using the stage.
    pub fn set_uniform<T>(&mut self, handle: ShaderHandle, name: &str, variable: T) -> Result<()>
    where
        T: Into<UniformVariable>,
    {
        if !self.shaders.contains(handle) {
            return Err(Error::ShaderHandleInvalid(handle));
        }

        unsafe { self.visitor.update_uniform(handle, name, variable.into())? };
        Ok(())
    }

    /// Draws the texture `source` through a full-screen `effect` pass into the render
    /// target `destination`, which gets cleared first. The pass leaves its own states in
    /// the store, callers restore whatever they need.
    pub fn draw_effect(
        &mut self,
        effect: Effect,
        source: TextureHandle,
        destination: TextureHandle,
        uniforms: &[(&str, UniformVariable)],
    ) -> Result<()> {
        let dimensions = self
            .textures
            .get(destination)
            .ok_or(Error::TextureHandleInvalid(destination))?
            .dimensions;

        let ps = self.effect_program(effect)?;
        for &(name, variable) in uniforms {
            self.set_uniform(ps, name, variable)?;
        }

        let full = Rect::with_size(0, 0, dimensions.x as i32, dimensions.y as i32);
        let s = &mut self.states;
        s.render_target.set(Some(destination));
        s.textures[0].set(Some(source));
        s.viewport.set(full);
        s.scissor_enabled.set(false);
        s.blend_mode.set(BlendMode::Opaque);
        s.vertex_shader.set(Some(self.fullscreen_vs));
        s.pixel_shader.set(Some(ps));
        s.vertex_buffer.set(Some(self.fullscreen_quad));
        s.primitive_mode.set(PrimitiveMode::TriangleStrip);

        self.clear(Color::transparent())?;
        self.draw(4)
    }

    fn effect_program(&mut self, effect: Effect) -> Result<ShaderHandle> {
        if let Some(&ps) = self.effects.get(&effect) {
            return Ok(ps);
        }

        let source = self.params.kernels.source(effect).to_owned();
        let ps = self.create_shader(ShaderStage::Pixel, &source)?;
        self.effects.insert(effect, ps);
        Ok(ps)
    }

    pub(crate) fn releases(&self) -> SharedReleases {
        self.releases.clone()
    }

    fn drain_releases(&mut self) -> Result<()> {
        let (textures, buffers) = {
            let mut releases = self.releases.borrow_mut();
            (
                mem::replace(&mut releases.textures, Vec::new()),
                mem::replace(&mut releases.buffers, Vec::new()),
            )
        };

        for handle in textures {
            self.delete_texture(handle)?;
        }

        for handle in buffers {
            self.delete_buffer(handle)?;
        }

        Ok(())
    }
}

fn camera_2d(dimensions: Vector2<u32>, position: Vector2<f32>) -> (Matrix4<f32>, Matrix4<f32>) {
    let projection = ortho(
        0.0,
        dimensions.x as f32,
        dimensions.y as f32,
        0.0,
        -1000.0,
        1000.0,
    );

    let view = Matrix4::from_translation(Vector3::new(-position.x, -position.y, 0.0));
    (projection, view)
}

/// A triangle strip covering the whole target in clip space, in the sprite vertex layout.
fn fullscreen_quad_bytes() -> Vec<u8> {
    let corners: [[f32; 4]; 4] = [
        [-1.0, -1.0, 0.0, 0.0],
        [1.0, -1.0, 1.0, 0.0],
        [-1.0, 1.0, 0.0, 1.0],
        [1.0, 1.0, 1.0, 1.0],
    ];

    let mut bytes = Vec::with_capacity(4 * 8 * 4);
    for corner in &corners {
        for v in corner.iter().chain([1.0f32; 4].iter()) {
            bytes.extend_from_slice(&v.to_bits().to_le_bytes());
        }
    }

    bytes
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn quad_layout() {
        let bytes = fullscreen_quad_bytes();
        assert_eq!(bytes.len(), 4 * 32);
    }
}
