//! Immutable, dynamic or renderable 2D texture. A texture is a container of one or more
//! images. It can be the source of a texture access from a shader, or the destination of
//! draw calls when it has been created as a render target.

use crate::math::prelude::Vector2;
use crate::video::errors::{Error, Result};

impl_handle!(TextureHandle);

/// The intended usage of a texture object.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum TextureKind {
    /// Initialized with data and cannot be changed later.
    Static,
    /// Initialized without data, updated by the CPU with `update_texture`.
    Dynamic,
    /// Could be bound as the destination of draw calls.
    RenderTarget,
    /// A render target which follows the dimensions of the window.
    ScreenRenderTarget,
}

impl TextureKind {
    #[inline]
    pub fn is_render_target(self) -> bool {
        self == TextureKind::RenderTarget || self == TextureKind::ScreenRenderTarget
    }
}

/// The parameters of a texture object. Pixels are always 8-bit RGBA.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextureParams {
    pub kind: TextureKind,
    pub dimensions: Vector2<u32>,
    /// Number of mip levels, the base level included.
    pub mip_levels: u32,
}

impl Default for TextureParams {
    fn default() -> Self {
        TextureParams {
            kind: TextureKind::Static,
            dimensions: Vector2::new(0, 0),
            mip_levels: 1,
        }
    }
}

impl TextureParams {
    /// The size of the base level in bytes.
    #[inline]
    pub fn bytes(&self) -> Result<usize> {
        rgba_bytes(self.dimensions)
    }

    pub fn validate(&self, data: Option<&TextureData>) -> Result<()> {
        if self.dimensions.x == 0 || self.dimensions.y == 0 {
            return Err(Error::ResourceCreationFailure(format!(
                "Texture dimensions {:?} is empty.",
                self.dimensions
            )));
        }

        let bytes = self.bytes()?;
        if let Some(data) = data {
            if data.levels.len() as u32 != self.mip_levels {
                return Err(Error::ResourceCreationFailure(format!(
                    "Expects {} mip levels, but got {}.",
                    self.mip_levels,
                    data.levels.len()
                )));
            }

            if data.levels.first().map(|v| v.len()) != Some(bytes) {
                return Err(Error::OutOfBounds);
            }
        }

        Ok(())
    }
}

/// The pixels of every mip level, base level first.
#[derive(Debug, Clone, Default)]
pub struct TextureData {
    pub levels: Vec<Vec<u8>>,
}

/// The size of RGBA8 pixels with `dimensions`, or `OutOfBounds` if it does not fit
/// into memory.
pub fn rgba_bytes(dimensions: Vector2<u32>) -> Result<usize> {
    (dimensions.x as usize)
        .checked_mul(dimensions.y as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or(Error::OutOfBounds)
}

#[inline]
pub fn is_power_of_two(v: u32) -> bool {
    v != 0 && (v & (v - 1)) == 0
}

/// Multiplies the color channels of RGBA8 pixels with their alpha, `c * a / 255`.
pub fn premultiply(pixels: &mut [u8]) {
    for px in pixels.chunks_mut(4) {
        if px.len() < 4 {
            break;
        }

        let a = u32::from(px[3]);
        px[0] = (u32::from(px[0]) * a / 255) as u8;
        px[1] = (u32::from(px[1]) * a / 255) as u8;
        px[2] = (u32::from(px[2]) * a / 255) as u8;
    }
}

/// Generates the full mip chain of a power-of-two RGBA8 image by 2x2 box averaging. The
/// result has `log2(max(w, h)) + 1` levels.
pub fn generate_mip_chain(base: Vec<u8>, dimensions: Vector2<u32>) -> Vec<Vec<u8>> {
    let (mut w, mut h) = (dimensions.x.max(1), dimensions.y.max(1));
    let mut levels = vec![base];

    while w > 1 || h > 1 {
        let (nw, nh) = ((w / 2).max(1), (h / 2).max(1));
        let mut next = vec![0u8; (nw * nh * 4) as usize];

        {
            let prev = &levels[levels.len() - 1];
            for y in 0..nh {
                for x in 0..nw {
                    let sx = [(x * 2).min(w - 1), (x * 2 + 1).min(w - 1)];
                    let sy = [(y * 2).min(h - 1), (y * 2 + 1).min(h - 1)];

                    for c in 0..4 {
                        let mut sum = 0u32;
                        for &py in &sy {
                            for &px in &sx {
                                sum += u32::from(prev[((py * w + px) * 4 + c) as usize]);
                            }
                        }

                        next[((y * nw + x) * 4 + c) as usize] = (sum / 4) as u8;
                    }
                }
            }
        }

        levels.push(next);
        w = nw;
        h = nh;
    }

    levels
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn power_of_two() {
        assert!(is_power_of_two(1));
        assert!(is_power_of_two(256));
        assert!(!is_power_of_two(0));
        assert!(!is_power_of_two(100));
    }

    #[test]
    fn bytes() {
        assert_eq!(rgba_bytes(Vector2::new(4, 2)).unwrap(), 32);
        assert_eq!(rgba_bytes(Vector2::new(0, 2)).unwrap(), 0);

        let huge = rgba_bytes(Vector2::new(32768, 32768));
        if ::std::mem::size_of::<usize>() > 4 {
            assert_eq!(huge.unwrap() / 4, 32768 * 32768);
        } else {
            match huge {
                Err(Error::OutOfBounds) => {}
                other => panic!("{:?}", other),
            }
        }
    }

    #[test]
    fn premultiplied() {
        let mut px = [255, 128, 0, 128, 10, 20, 30, 0, 200, 100, 50, 255];
        premultiply(&mut px);
        assert_eq!(px, [128, 64, 0, 128, 0, 0, 0, 0, 200, 100, 50, 255]);
    }

    #[test]
    fn mip_chain() {
        let levels = generate_mip_chain(vec![255; 256 * 256 * 4], Vector2::new(256, 256));
        assert_eq!(levels.len(), 9);
        assert_eq!(levels[8].len(), 4);

        let levels = generate_mip_chain(vec![0; 8 * 2 * 4], Vector2::new(8, 2));
        assert_eq!(levels.len(), 4);
        assert_eq!(levels[1].len(), 4 * 1 * 4);
    }

    #[test]
    fn mip_truncates() {
        let base = vec![
            0, 0, 0, 0, 1, 1, 1, 1, //
            1, 1, 1, 1, 3, 3, 3, 3,
        ];

        let levels = generate_mip_chain(base, Vector2::new(2, 2));
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[1], vec![1, 1, 1, 1]);
    }
}
