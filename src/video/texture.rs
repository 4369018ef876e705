//! Texture resource objects.
//!
//! A `Texture` owns one GPU texture object, plus a second "fx" object when it is a render
//! target used with post-processing effects. Every effect renders the primary object into
//! the fx object through a full-screen pass and then swaps them, so the result always
//! ends up in the primary object without an extra copy.

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use crate::math::prelude::*;
use crate::video::assets::image::{DecodedImage, ImageDecoder, PngDecoder};
use crate::video::assets::prelude::*;
use crate::video::assets::texture::{
    generate_mip_chain, is_power_of_two, premultiply, rgba_bytes,
};
use crate::video::effects::Effect;
use crate::video::errors::{Error, Result};
use crate::video::system::{SharedReleases, VideoSystem};
use crate::video::MAX_TEXTURES;

pub type TextureRef = Rc<Texture>;

#[derive(Debug, Copy, Clone)]
struct Targets {
    dimensions: Vector2<u32>,
    mip_levels: u32,
    handle: TextureHandle,
    fx: Option<TextureHandle>,
}

pub struct Texture {
    name: String,
    kind: TextureKind,
    targets: RefCell<Targets>,
    releases: SharedReleases,
}

impl Texture {
    fn create(
        video: &mut VideoSystem,
        params: TextureParams,
        data: Option<&TextureData>,
    ) -> Result<Self> {
        let handle = video.create_texture(params, data)?;
        Ok(Texture {
            name: String::new(),
            kind: params.kind,
            targets: RefCell::new(Targets {
                dimensions: params.dimensions,
                mip_levels: params.mip_levels,
                handle,
                fx: None,
            }),
            releases: video.releases(),
        })
    }

    /// Creates a static texture from RGBA8 pixels. A full mip chain is generated when
    /// requested and both dimensions are powers of two.
    pub fn create_from_data(
        video: &mut VideoSystem,
        pixels: &[u8],
        dimensions: Vector2<u32>,
        generate_mipmaps: bool,
    ) -> Result<Self> {
        if pixels.len() != rgba_bytes(dimensions)? {
            return Err(Error::OutOfBounds);
        }

        let pot = is_power_of_two(dimensions.x) && is_power_of_two(dimensions.y);
        if generate_mipmaps && !pot {
            warn!(
                "Skips mipmaps of non power-of-two texture {}x{}.",
                dimensions.x, dimensions.y
            );
        }

        let levels = if generate_mipmaps && pot {
            generate_mip_chain(pixels.to_vec(), dimensions)
        } else {
            vec![pixels.to_vec()]
        };

        let params = TextureParams {
            kind: TextureKind::Static,
            dimensions,
            mip_levels: levels.len() as u32,
        };

        Texture::create(video, params, Some(&TextureData { levels }))
    }

    /// Creates a static texture from straight-alpha pixels, premultiplying them first.
    pub fn create_from_image(
        video: &mut VideoSystem,
        mut image: DecodedImage,
        generate_mipmaps: bool,
    ) -> Result<Self> {
        premultiply(&mut image.pixels);
        Texture::create_from_data(video, &image.pixels, image.dimensions, generate_mipmaps)
    }

    /// Creates a static texture from the bytes of a PNG file.
    pub fn create_from_file_data(
        video: &mut VideoSystem,
        bytes: &[u8],
        generate_mipmaps: bool,
    ) -> Result<Self> {
        let image = PngDecoder::new().decode(bytes)?;
        Texture::create_from_image(video, image, generate_mipmaps)
    }

    /// Creates a static texture from a PNG file. The texture is named after the file.
    pub fn create_from_file<P: AsRef<Path>>(
        video: &mut VideoSystem,
        path: P,
        generate_mipmaps: bool,
    ) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|err| {
            Error::ResourceCreationFailure(format!("{}: {}", path.display(), err))
        })?;

        let name = path
            .file_name()
            .map(|v| v.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Texture::create_from_file_data(video, &bytes, generate_mipmaps)?.with_name(name))
    }

    /// Creates a texture whose pixels are replaced with `set_data`.
    pub fn create_dynamic(video: &mut VideoSystem, dimensions: Vector2<u32>) -> Result<Self> {
        let params = TextureParams {
            kind: TextureKind::Dynamic,
            dimensions,
            mip_levels: 1,
        };

        Texture::create(video, params, None)
    }

    /// Creates a render target. The fx object used by post-processing is created right
    /// away if `will_use_fx`, lazily by the first effect otherwise.
    pub fn create_render_target(
        video: &mut VideoSystem,
        dimensions: Vector2<u32>,
        will_use_fx: bool,
    ) -> Result<Self> {
        Texture::create_target(video, TextureKind::RenderTarget, dimensions, will_use_fx)
    }

    /// Creates a render target which keeps the dimensions of the window surface. It is
    /// recreated when bound after the window has been resized.
    pub fn create_screen_render_target(video: &mut VideoSystem, will_use_fx: bool) -> Result<Self> {
        let dimensions = video.true_resolution();
        Texture::create_target(
            video,
            TextureKind::ScreenRenderTarget,
            dimensions,
            will_use_fx,
        )
    }

    fn create_target(
        video: &mut VideoSystem,
        kind: TextureKind,
        dimensions: Vector2<u32>,
        will_use_fx: bool,
    ) -> Result<Self> {
        let params = TextureParams {
            kind,
            dimensions,
            mip_levels: 1,
        };

        let texture = Texture::create(video, params, None)?;
        if will_use_fx {
            texture.fx(video)?;
        }

        Ok(texture)
    }

    pub fn with_name<T: Into<String>>(mut self, name: T) -> Self {
        self.name = name.into();
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> TextureKind {
        self.kind
    }

    #[inline]
    pub fn dimensions(&self) -> Vector2<u32> {
        self.targets.borrow().dimensions
    }

    #[inline]
    pub fn mip_levels(&self) -> u32 {
        self.targets.borrow().mip_levels
    }

    /// The handle of the object currently holding the pixels of this texture.
    #[inline]
    pub fn handle(&self) -> TextureHandle {
        self.targets.borrow().handle
    }

    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.kind == TextureKind::Dynamic
    }

    #[inline]
    pub fn is_render_target(&self) -> bool {
        self.kind.is_render_target()
    }

    /// Replaces all the pixels of a dynamic texture.
    ///
    /// # Panics
    ///
    /// Panics if the texture is not dynamic.
    pub fn set_data(&self, video: &mut VideoSystem, pixels: &[u8]) -> Result<()> {
        assert!(self.is_dynamic(), "Only dynamic texture can be set data.");
        video.update_texture(self.handle(), pixels)
    }

    /// Binds this texture to a sampler slot.
    pub fn bind(&self, video: &mut VideoSystem, slot: usize) {
        assert!(slot < MAX_TEXTURES, "Texture slot {} out of range.", slot);
        video.render_states_mut().textures[slot].set(Some(self.handle()));
    }

    /// Makes this texture the destination of following draw calls. A screen render
    /// target whose dimensions no longer match the window is recreated first.
    pub fn bind_render_target(&self, video: &mut VideoSystem) -> Result<()> {
        assert!(self.is_render_target(), "Binds a non-render-target as render target.");

        let resolution = video.true_resolution();
        if self.kind == TextureKind::ScreenRenderTarget && self.dimensions() != resolution {
            self.resize_target(video, resolution)?;
        }

        video.render_states_mut().render_target.set(Some(self.handle()));
        Ok(())
    }

    /// Makes the window surface the destination of following draw calls.
    pub fn unbind_render_target(&self, video: &mut VideoSystem) {
        video.render_states_mut().render_target.set(None);
    }

    /// Clears this render target without changing the bound one.
    pub fn clear_render_target(&self, video: &mut VideoSystem, color: Color) -> Result<()> {
        assert!(self.is_render_target(), "Clears a non-render-target.");

        let saved = *video.render_states().render_target.get();
        video.render_states_mut().render_target.set(Some(self.handle()));
        let result = video.clear(color);
        video.render_states_mut().render_target.set(saved);
        result
    }

    /// Recreates the GPU objects of a render target with new dimensions. The content is
    /// lost.
    pub fn resize_target(&self, video: &mut VideoSystem, dimensions: Vector2<u32>) -> Result<()> {
        assert!(self.is_render_target(), "Resizes a non-render-target.");

        let current = *self.targets.borrow();
        if current.dimensions == dimensions {
            return Ok(());
        }

        debug!(
            "Recreates render target {} ({}x{} -> {}x{}).",
            current.handle, current.dimensions.x, current.dimensions.y, dimensions.x, dimensions.y
        );

        let params = TextureParams {
            kind: self.kind,
            dimensions,
            mip_levels: 1,
        };

        let handle = video.create_texture(params, None)?;
        let fx = match current.fx {
            Some(_) => Some(video.create_texture(params, None)?),
            None => None,
        };

        *self.targets.borrow_mut() = Targets {
            dimensions,
            mip_levels: 1,
            handle,
            fx,
        };

        video.delete_texture(current.handle)?;
        if let Some(old) = current.fx {
            video.delete_texture(old)?;
        }

        Ok(())
    }

    /// Blurs the render target. Every horizontal and vertical pass pair covers 6 pixels
    /// of `amount`.
    pub fn blur(&self, video: &mut VideoSystem, amount: f32) -> Result<()> {
        self.apply_effect(video, |texture, video| {
            let dimensions = texture.dimensions();
            let mut amount = amount;
            let mut i = 0.0;

            while amount > 0.0 {
                let kernel = Vector2::new(
                    1.0 / dimensions.x as f32 * (i + amount) / 6.0,
                    1.0 / dimensions.y as f32 * (i + amount) / 6.0,
                );

                amount -= 6.0;
                let uniforms = [("u_KernelSize", UniformVariable::from(kernel))];
                texture.fx_pass(video, Effect::BlurHorizontal, &uniforms)?;
                texture.fx_pass(video, Effect::BlurVertical, &uniforms)?;
                i += 1.0;
            }

            Ok(())
        })
    }

    /// Tones the render target, e.g. `tone = (1.40, 1.10, 0.90)` for a sepia look.
    pub fn sepia(
        &self,
        video: &mut VideoSystem,
        tone: Vector3<f32>,
        saturation: f32,
        amount: f32,
    ) -> Result<()> {
        self.apply_effect(video, |texture, video| {
            let uniforms = [
                ("u_Tone", UniformVariable::from(tone)),
                ("u_Saturation", UniformVariable::from(saturation)),
                ("u_Amount", UniformVariable::from(amount)),
            ];

            texture.fx_pass(video, Effect::Sepia, &uniforms)
        })
    }

    /// Applies scan lines and a shadow mask.
    pub fn crt(&self, video: &mut VideoSystem) -> Result<()> {
        self.apply_effect(video, |texture, video| {
            let dimensions = texture.dimensions();
            let resolution = Vector2::new(dimensions.x as f32, dimensions.y as f32);
            let uniforms = [("u_Resolution", UniformVariable::from(resolution))];
            texture.fx_pass(video, Effect::Crt, &uniforms)
        })
    }

    /// Quantizes every channel into `tone` steps.
    pub fn cartoon(&self, video: &mut VideoSystem, tone: Vector3<f32>) -> Result<()> {
        self.apply_effect(video, |texture, video| {
            texture.fx_pass(video, Effect::Cartoon, &[("u_Tone", UniformVariable::from(tone))])
        })
    }

    /// Darkens the borders of the render target.
    pub fn vignette(&self, video: &mut VideoSystem, amount: f32) -> Result<()> {
        self.apply_effect(video, |texture, video| {
            texture.fx_pass(video, Effect::Vignette, &[("u_Amount", UniformVariable::from(amount))])
        })
    }

    /// Runs effect passes with the render states saved around them. Does nothing on
    /// textures that are not render targets.
    ///
    /// Bindings of this texture in the saved states follow the swapped objects, so a
    /// bound target or sampler slot still refers to `handle()` afterwards. Sprite batches
    /// holding quads of this texture should be flushed before.
    fn apply_effect<F>(&self, video: &mut VideoSystem, passes: F) -> Result<()>
    where
        F: FnOnce(&Texture, &mut VideoSystem) -> Result<()>,
    {
        if !self.is_render_target() {
            return Ok(());
        }

        let before = *self.targets.borrow();
        let mut saved = video.render_states().clone();
        let result = passes(self, video);

        let after = *self.targets.borrow();
        let follow = |v: Option<TextureHandle>| match v {
            Some(h) if h == before.handle => Some(after.handle),
            Some(h) if Some(h) == before.fx => after.fx,
            v => v,
        };

        let target = follow(*saved.render_target.get());
        saved.render_target.set(target);
        for slot in saved.textures.iter_mut() {
            let texture = follow(*slot.get());
            slot.set(texture);
        }

        video.render_states_mut().restore(&saved);
        result
    }

    /// Draws the primary object through `effect` into the fx object, then swaps them.
    fn fx_pass(
        &self,
        video: &mut VideoSystem,
        effect: Effect,
        uniforms: &[(&str, UniformVariable)],
    ) -> Result<()> {
        let fx = self.fx(video)?;
        let primary = self.handle();
        video.draw_effect(effect, primary, fx, uniforms)?;

        let mut targets = self.targets.borrow_mut();
        targets.handle = fx;
        targets.fx = Some(primary);
        Ok(())
    }

    fn fx(&self, video: &mut VideoSystem) -> Result<TextureHandle> {
        let current = *self.targets.borrow();
        if let Some(fx) = current.fx {
            return Ok(fx);
        }

        let params = TextureParams {
            kind: self.kind,
            dimensions: current.dimensions,
            mip_levels: 1,
        };

        let fx = video.create_texture(params, None)?;
        self.targets.borrow_mut().fx = Some(fx);
        Ok(fx)
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        let targets = self.targets.borrow();
        let mut releases = self.releases.borrow_mut();
        releases.textures.push(targets.handle);
        if let Some(fx) = targets.fx {
            releases.textures.push(fx);
        }
    }
}

impl ::std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        let targets = self.targets.borrow();
        f.debug_struct("Texture")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("dimensions", &targets.dimensions)
            .field("handle", &targets.handle)
            .finish()
    }
}
