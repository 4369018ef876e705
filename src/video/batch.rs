//! Batched sprite rendering.
//!
//! `SpriteBatch` accumulates textured quads between `begin` and `end`. Consecutive quads
//! sharing the same texture, blend mode and filtering form a run which is submitted with
//! a single indexed draw call. Runs are drawn in submission order.

use std::mem;
use std::slice;

use crate::math::prelude::*;
use crate::video::assets::prelude::TextureHandle;
use crate::video::buffer::Buffer;
use crate::video::errors::Result;
use crate::video::state::{BlendMode, Filtering, PrimitiveMode};
use crate::video::system::VideoSystem;
use crate::video::texture::Texture;

/// The vertex layout of sprite program, 32 bytes.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SpriteVertex {
    pub position: [f32; 2],
    pub texcoord: [f32; 2],
    pub color: [f32; 4],
}

impl SpriteVertex {
    #[inline]
    pub fn new(position: [f32; 2], texcoord: [f32; 2], color: Color) -> Self {
        SpriteVertex {
            position,
            texcoord,
            color: color.into(),
        }
    }
}

/// Quads are indexed with 16-bit indices.
const MAX_CAPACITY: usize = 0x4000;

#[derive(Debug, Copy, Clone, PartialEq)]
struct RunState {
    texture: TextureHandle,
    blend: BlendMode,
    filtering: Filtering,
}

#[derive(Debug, Copy, Clone)]
struct Run {
    state: RunState,
    quads: usize,
}

pub struct SpriteBatch {
    vertices: Buffer,
    indices: Buffer,
    capacity: usize,
    white: Texture,

    quads: Vec<[SpriteVertex; 4]>,
    runs: Vec<Run>,
    blend: BlendMode,
    filtering: Filtering,
    transform: Matrix4<f32>,
    is_in_batch: bool,
}

impl SpriteBatch {
    /// Creates a sprite batch with the capacity in `VideoParams`.
    pub fn new(video: &mut VideoSystem) -> Result<Self> {
        let capacity = video.params().sprite_batch_capacity;
        SpriteBatch::with_capacity(video, capacity)
    }

    /// Creates a sprite batch which submits at most `capacity` quads per draw call.
    pub fn with_capacity(video: &mut VideoSystem, capacity: usize) -> Result<Self> {
        let capacity = capacity.max(1).min(MAX_CAPACITY);

        let mut indices = Vec::with_capacity(capacity * 6);
        for i in 0..capacity {
            let v = (i * 4) as u16;
            indices.extend_from_slice(&[v, v + 1, v + 2, v, v + 2, v + 3]);
        }

        let vertices = Buffer::vertex(video, capacity * mem::size_of::<[SpriteVertex; 4]>())?;
        let indices = Buffer::index(video, &indices)?;
        let white = Texture::create_from_data(video, &[255; 4], Vector2::new(1, 1), false)?
            .with_name("white");

        Ok(SpriteBatch {
            vertices,
            indices,
            capacity,
            white,
            quads: Vec::with_capacity(capacity),
            runs: Vec::new(),
            blend: BlendMode::PreMultiplied,
            filtering: Filtering::Linear,
            transform: Matrix4::identity(),
            is_in_batch: false,
        })
    }

    /// Maximum number of quads submitted with one draw call.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of quads waiting to be flushed.
    #[inline]
    pub fn len(&self) -> usize {
        self.quads.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    #[inline]
    pub fn is_in_batch(&self) -> bool {
        self.is_in_batch
    }

    pub fn begin(&mut self) {
        self.begin_with_transform(Matrix4::identity());
    }

    /// Starts a batch whose quads are all transformed with `transform` as world matrix.
    pub fn begin_with_transform(&mut self, transform: Matrix4<f32>) {
        assert!(!self.is_in_batch, "SpriteBatch::begin called twice.");
        self.is_in_batch = true;
        self.transform = transform;
        self.blend = BlendMode::PreMultiplied;
        self.filtering = Filtering::Linear;
    }

    /// Flushes the remaining quads.
    pub fn end(&mut self, video: &mut VideoSystem) -> Result<()> {
        assert!(self.is_in_batch, "SpriteBatch::end called without begin.");
        let result = self.flush(video);
        self.is_in_batch = false;
        result
    }

    /// The blend mode of following quads.
    #[inline]
    pub fn change_blend_mode(&mut self, blend: BlendMode) {
        self.blend = blend;
    }

    /// The texture filtering of following quads.
    #[inline]
    pub fn change_filtering(&mut self, filtering: Filtering) {
        self.filtering = filtering;
    }

    /// Draws an axis aligned rectangle `(x, y, width, height)`. Untextured rectangles are
    /// filled with `color`.
    pub fn draw_rect(&mut self, texture: Option<&Texture>, rect: Vector4<f32>, color: Color) {
        self.draw_rect_with_uvs(texture, rect, Vector4::new(0.0, 0.0, 1.0, 1.0), color);
    }

    /// Draws an axis aligned rectangle with texture coordinates `(u1, v1, u2, v2)`.
    pub fn draw_rect_with_uvs(
        &mut self,
        texture: Option<&Texture>,
        rect: Vector4<f32>,
        uvs: Vector4<f32>,
        color: Color,
    ) {
        self.draw_rect_with_colors_uvs(texture, rect, uvs, [color; 4]);
    }

    /// Draws an axis aligned rectangle with per-corner colors, in the order top-left,
    /// bottom-left, bottom-right and top-right.
    pub fn draw_rect_with_colors(
        &mut self,
        texture: Option<&Texture>,
        rect: Vector4<f32>,
        colors: [Color; 4],
    ) {
        self.draw_rect_with_colors_uvs(texture, rect, Vector4::new(0.0, 0.0, 1.0, 1.0), colors);
    }

    fn draw_rect_with_colors_uvs(
        &mut self,
        texture: Option<&Texture>,
        rect: Vector4<f32>,
        uvs: Vector4<f32>,
        colors: [Color; 4],
    ) {
        let (l, t, r, b) = (rect.x, rect.y, rect.x + rect.z, rect.y + rect.w);
        let quad = [
            SpriteVertex::new([l, t], [uvs.x, uvs.y], colors[0]),
            SpriteVertex::new([l, b], [uvs.x, uvs.w], colors[1]),
            SpriteVertex::new([r, b], [uvs.z, uvs.w], colors[2]),
            SpriteVertex::new([r, t], [uvs.z, uvs.y], colors[3]),
        ];

        self.draw_quad(texture, quad);
    }

    /// Draws a texture at `position`, rotated by `rotation` degrees and scaled around
    /// `origin`, which is relative to the texture size (`(0.5, 0.5)` is the center).
    pub fn draw_sprite(
        &mut self,
        texture: &Texture,
        position: Vector2<f32>,
        color: Color,
        rotation: f32,
        scale: Vector2<f32>,
        origin: Vector2<f32>,
    ) {
        let dimensions = texture.dimensions();
        let size = Vector2::new(dimensions.x as f32 * scale.x, dimensions.y as f32 * scale.y);
        let (sin, cos) = rotation.to_radians().sin_cos();

        let corner = |cx: f32, cy: f32| {
            let x = (cx - origin.x) * size.x;
            let y = (cy - origin.y) * size.y;
            let p = [x * cos - y * sin + position.x, x * sin + y * cos + position.y];
            SpriteVertex::new(p, [cx, cy], color)
        };

        let quad = [
            corner(0.0, 0.0),
            corner(0.0, 1.0),
            corner(1.0, 1.0),
            corner(1.0, 0.0),
        ];

        self.draw_quad(Some(texture), quad);
    }

    /// Draws a quad of `size` pixels, placed by an arbitrary 2D `transform` such as the
    /// world transform of an entity.
    pub fn draw_sprite_with_transform(
        &mut self,
        texture: Option<&Texture>,
        transform: &Matrix4<f32>,
        size: Vector2<f32>,
        color: Color,
        origin: Vector2<f32>,
    ) {
        let corner = |cx: f32, cy: f32| {
            let local = Vector4::new((cx - origin.x) * size.x, (cy - origin.y) * size.y, 0.0, 1.0);
            let p = transform * local;
            SpriteVertex::new([p.x, p.y], [cx, cy], color)
        };

        let quad = [
            corner(0.0, 0.0),
            corner(0.0, 1.0),
            corner(1.0, 1.0),
            corner(1.0, 0.0),
        ];

        self.draw_quad(texture, quad);
    }

    /// Queues a quad, in the order top-left, bottom-left, bottom-right and top-right.
    pub fn draw_quad(&mut self, texture: Option<&Texture>, quad: [SpriteVertex; 4]) {
        debug_assert!(self.is_in_batch, "Draws outside of SpriteBatch::begin/end.");

        let state = RunState {
            texture: texture.unwrap_or(&self.white).handle(),
            blend: self.blend,
            filtering: self.filtering,
        };

        match self.runs.last_mut() {
            Some(ref mut run) if run.state == state => run.quads += 1,
            _ => self.runs.push(Run { state, quads: 1 }),
        }

        self.quads.push(quad);
    }

    /// Submits the queued quads, one draw call per run and per `capacity` quads.
    pub fn flush(&mut self, video: &mut VideoSystem) -> Result<()> {
        if self.quads.is_empty() {
            self.runs.clear();
            return Ok(());
        }

        let (vs, ps) = video.sprite_program();
        {
            let s = video.render_states_mut();
            s.world.set(self.transform);
            s.vertex_shader.set(Some(vs));
            s.pixel_shader.set(Some(ps));
            s.vertex_buffer.set(Some(self.vertices.handle()));
            s.index_buffer.set(Some(self.indices.handle()));
            s.primitive_mode.set(PrimitiveMode::TriangleList);
        }

        let mut first = 0;
        for run in self.runs.drain(..) {
            {
                let s = video.render_states_mut();
                s.textures[0].set(Some(run.state.texture));
                s.blend_mode.set(run.state.blend);
                s.sample_filtering.set(run.state.filtering);
            }

            for chunk in self.quads[first..first + run.quads].chunks(self.capacity) {
                self.vertices.update(video, as_bytes(chunk))?;
                video.draw_indexed((chunk.len() * 6) as u32)?;
            }

            first += run.quads;
        }

        self.quads.clear();
        Ok(())
    }
}

fn as_bytes(quads: &[[SpriteVertex; 4]]) -> &[u8] {
    let len = quads.len() * mem::size_of::<[SpriteVertex; 4]>();
    unsafe { slice::from_raw_parts(quads.as_ptr() as *const u8, len) }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn layout() {
        assert_eq!(mem::size_of::<SpriteVertex>(), 32);
        let quads = [[SpriteVertex::new([0.0, 0.0], [0.0, 0.0], Color::white()); 4]; 3];
        assert_eq!(as_bytes(&quads).len(), 3 * 128);
    }
}
