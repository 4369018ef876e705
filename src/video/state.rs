//! The render state store. Every piece of pipeline state is a `RenderStateValue` cell which
//! remembers whether the backend has seen its latest value. Frontends write cells freely,
//! and the device only pushes the dirty ones right before a draw call.

use crate::math::prelude::*;
use crate::video::assets::prelude::{BufferHandle, ShaderHandle, TextureHandle};
use crate::video::MAX_TEXTURES;

/// A value paired with a dirty flag.
///
/// The flag is raised only when a *different* value is written, and cleared by the
/// device once it has pushed the value to the backend.
#[derive(Debug, Clone, Copy)]
pub struct RenderStateValue<T> {
    value: T,
    dirty: bool,
}

impl<T: PartialEq> RenderStateValue<T> {
    /// Creates a new cell. It starts dirty since no backend has observed it yet.
    pub fn new(value: T) -> Self {
        RenderStateValue { value, dirty: true }
    }

    /// Writes a value, raising the dirty flag if it differs from the current one.
    #[inline]
    pub fn set(&mut self, value: T) {
        if self.value != value {
            self.value = value;
            self.dirty = true;
        }
    }

    #[inline]
    pub fn get(&self) -> &T {
        &self.value
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn reset_dirty(&mut self) {
        self.dirty = false;
    }

    /// Forces the value to be pushed again, e.g. after the backend lost it.
    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

impl<T: PartialEq + Default> Default for RenderStateValue<T> {
    fn default() -> Self {
        RenderStateValue::new(T::default())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum BlendMode {
    /// Source replaces destination, alpha is ignored.
    Opaque,
    /// Straight alpha blending.
    Alpha,
    /// Additive blending.
    Add,
    /// Alpha blending of premultiplied colors.
    PreMultiplied,
    /// Source multiplies destination.
    Multiply,
    /// Source replaces destination, alpha channel included.
    ForceWrite,
}

impl Default for BlendMode {
    fn default() -> Self {
        BlendMode::PreMultiplied
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum Filtering {
    Nearest,
    Linear,
}

impl Default for Filtering {
    fn default() -> Self {
        Filtering::Linear
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum AddressMode {
    Wrap,
    Clamp,
}

impl Default for AddressMode {
    fn default() -> Self {
        AddressMode::Wrap
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum PrimitiveMode {
    PointList,
    LineList,
    LineStrip,
    TriangleList,
    TriangleStrip,
}

impl Default for PrimitiveMode {
    fn default() -> Self {
        PrimitiveMode::TriangleList
    }
}

impl PrimitiveMode {
    /// Number of primitives formed by `vertices` vertices.
    pub fn primitives(self, vertices: u32) -> u32 {
        match self {
            PrimitiveMode::PointList => vertices,
            PrimitiveMode::LineList => vertices / 2,
            PrimitiveMode::LineStrip => vertices.saturating_sub(1),
            PrimitiveMode::TriangleList => vertices / 3,
            PrimitiveMode::TriangleStrip => vertices.saturating_sub(2),
        }
    }
}

/// The complete set of pipeline states the device tracks.
#[derive(Debug, Clone)]
pub struct RenderStates {
    pub clear_color: RenderStateValue<Color>,
    pub render_target: RenderStateValue<Option<TextureHandle>>,
    pub textures: [RenderStateValue<Option<TextureHandle>>; MAX_TEXTURES],
    pub sample_filtering: RenderStateValue<Filtering>,
    pub sample_address_mode: RenderStateValue<AddressMode>,
    pub blend_mode: RenderStateValue<BlendMode>,
    pub viewport: RenderStateValue<Rect>,
    pub scissor_enabled: RenderStateValue<bool>,
    pub back_face_cull: RenderStateValue<bool>,
    pub scissor: RenderStateValue<Rect>,
    pub projection: RenderStateValue<Matrix4<f32>>,
    pub view: RenderStateValue<Matrix4<f32>>,
    pub world: RenderStateValue<Matrix4<f32>>,
    pub depth_write: RenderStateValue<bool>,
    pub depth_enabled: RenderStateValue<bool>,
    pub vertex_shader: RenderStateValue<Option<ShaderHandle>>,
    pub pixel_shader: RenderStateValue<Option<ShaderHandle>>,
    pub vertex_buffer: RenderStateValue<Option<BufferHandle>>,
    pub index_buffer: RenderStateValue<Option<BufferHandle>>,
    pub primitive_mode: RenderStateValue<PrimitiveMode>,
}

impl Default for RenderStates {
    fn default() -> Self {
        RenderStates {
            clear_color: RenderStateValue::new(Color::black()),
            render_target: RenderStateValue::new(None),
            textures: [RenderStateValue::new(None); MAX_TEXTURES],
            sample_filtering: RenderStateValue::default(),
            sample_address_mode: RenderStateValue::default(),
            blend_mode: RenderStateValue::default(),
            viewport: RenderStateValue::default(),
            scissor_enabled: RenderStateValue::new(false),
            back_face_cull: RenderStateValue::new(false),
            scissor: RenderStateValue::default(),
            projection: RenderStateValue::new(Matrix4::identity()),
            view: RenderStateValue::new(Matrix4::identity()),
            world: RenderStateValue::new(Matrix4::identity()),
            depth_write: RenderStateValue::new(false),
            depth_enabled: RenderStateValue::new(false),
            vertex_shader: RenderStateValue::new(None),
            pixel_shader: RenderStateValue::new(None),
            vertex_buffer: RenderStateValue::new(None),
            index_buffer: RenderStateValue::new(None),
            primitive_mode: RenderStateValue::default(),
        }
    }
}

impl RenderStates {
    /// Writes the default value into every cell. Only cells whose value actually changes
    /// become dirty.
    pub fn reset(&mut self) {
        let defaults = RenderStates::default();
        self.restore(&defaults);
    }

    /// Writes every value of `other` into this store, with the usual `set` semantics.
    pub fn restore(&mut self, other: &RenderStates) {
        self.clear_color.set(*other.clear_color.get());
        self.render_target.set(*other.render_target.get());
        for (v, o) in self.textures.iter_mut().zip(other.textures.iter()) {
            v.set(*o.get());
        }
        self.sample_filtering.set(*other.sample_filtering.get());
        self.sample_address_mode.set(*other.sample_address_mode.get());
        self.blend_mode.set(*other.blend_mode.get());
        self.viewport.set(*other.viewport.get());
        self.scissor_enabled.set(*other.scissor_enabled.get());
        self.back_face_cull.set(*other.back_face_cull.get());
        self.scissor.set(*other.scissor.get());
        self.projection.set(*other.projection.get());
        self.view.set(*other.view.get());
        self.world.set(*other.world.get());
        self.depth_write.set(*other.depth_write.get());
        self.depth_enabled.set(*other.depth_enabled.get());
        self.vertex_shader.set(*other.vertex_shader.get());
        self.pixel_shader.set(*other.pixel_shader.get());
        self.vertex_buffer.set(*other.vertex_buffer.get());
        self.index_buffer.set(*other.index_buffer.get());
        self.primitive_mode.set(*other.primitive_mode.get());
    }

    /// Raises every dirty flag, so the next apply pushes the complete state.
    pub fn mark_all_dirty(&mut self) {
        self.clear_color.mark_dirty();
        self.render_target.mark_dirty();
        for v in &mut self.textures {
            v.mark_dirty();
        }
        self.sample_filtering.mark_dirty();
        self.sample_address_mode.mark_dirty();
        self.blend_mode.mark_dirty();
        self.viewport.mark_dirty();
        self.scissor_enabled.mark_dirty();
        self.back_face_cull.mark_dirty();
        self.scissor.mark_dirty();
        self.projection.mark_dirty();
        self.view.mark_dirty();
        self.world.mark_dirty();
        self.depth_write.mark_dirty();
        self.depth_enabled.mark_dirty();
        self.vertex_shader.mark_dirty();
        self.pixel_shader.mark_dirty();
        self.vertex_buffer.mark_dirty();
        self.index_buffer.mark_dirty();
        self.primitive_mode.mark_dirty();
    }

    /// Releases every binding of `texture`.
    pub fn unbind_texture(&mut self, texture: TextureHandle) {
        if *self.render_target.get() == Some(texture) {
            self.render_target.set(None);
        }

        for v in &mut self.textures {
            if *v.get() == Some(texture) {
                v.set(None);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn dirty_on_change_only() {
        let mut v = RenderStateValue::new(BlendMode::Opaque);
        assert!(v.is_dirty());

        v.reset_dirty();
        v.set(BlendMode::Opaque);
        assert!(!v.is_dirty());

        v.set(BlendMode::Add);
        assert!(v.is_dirty());
        assert_eq!(*v.get(), BlendMode::Add);

        v.reset_dirty();
        assert!(!v.is_dirty());
        v.set(BlendMode::Add);
        assert!(!v.is_dirty());
    }

    #[test]
    fn mark_dirty_forces() {
        let mut v = RenderStateValue::new(3);
        v.reset_dirty();
        v.mark_dirty();
        assert!(v.is_dirty());
        assert_eq!(*v.get(), 3);
    }

    #[test]
    fn reset_keeps_unchanged_clean() {
        let mut states = RenderStates::default();
        states.blend_mode.reset_dirty();
        states.depth_write.reset_dirty();

        states.depth_write.set(true);
        states.depth_write.reset_dirty();

        states.reset();
        assert!(!states.blend_mode.is_dirty());
        assert!(states.depth_write.is_dirty());
        assert_eq!(*states.depth_write.get(), false);
    }

    #[test]
    fn primitives() {
        assert_eq!(PrimitiveMode::TriangleList.primitives(6), 2);
        assert_eq!(PrimitiveMode::TriangleStrip.primitives(4), 2);
        assert_eq!(PrimitiveMode::LineStrip.primitives(0), 0);
        assert_eq!(PrimitiveMode::PointList.primitives(7), 7);
    }
}
