//! Image decoding into RGBA8 pixels.

use std::io::Cursor;

use crate::math::prelude::Vector2;
use crate::video::errors::{Error, Result};

#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub dimensions: Vector2<u32>,
    /// Straight (non premultiplied) RGBA8 pixels, row by row from the top.
    pub pixels: Vec<u8>,
}

/// Decodes encoded image files into raw pixels.
pub trait ImageDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage>;
}

/// Decodes PNG files of any color type into RGBA8.
#[derive(Debug, Default, Copy, Clone)]
pub struct PngDecoder {
    /// Images larger than this on either axis are rejected.
    pub max_dimension: u32,
}

impl PngDecoder {
    pub fn new() -> Self {
        PngDecoder {
            max_dimension: 16384,
        }
    }
}

impl ImageDecoder for PngDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage> {
        let mut decoder = png::Decoder::new(Cursor::new(bytes));
        decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);

        let mut reader = decoder
            .read_info()
            .map_err(|e| Error::Decode(e.to_string()))?;

        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader
            .next_frame(&mut buf)
            .map_err(|e| Error::Decode(e.to_string()))?;

        let (width, height) = (info.width, info.height);
        if self.max_dimension > 0 && (width > self.max_dimension || height > self.max_dimension) {
            return Err(Error::Decode(format!(
                "Image {}x{} exceeds the maximum dimension {}.",
                width, height, self.max_dimension
            )));
        }

        let data = &buf[..info.buffer_size()];
        let pixels = match info.color_type {
            png::ColorType::Rgba => data.to_vec(),
            png::ColorType::Rgb => {
                let mut rgba = Vec::with_capacity((width * height * 4) as usize);
                for chunk in data.chunks(3) {
                    rgba.extend_from_slice(chunk);
                    rgba.push(255);
                }
                rgba
            }
            png::ColorType::GrayscaleAlpha => {
                let mut rgba = Vec::with_capacity((width * height * 4) as usize);
                for chunk in data.chunks(2) {
                    rgba.extend_from_slice(&[chunk[0], chunk[0], chunk[0], chunk[1]]);
                }
                rgba
            }
            png::ColorType::Grayscale => {
                let mut rgba = Vec::with_capacity((width * height * 4) as usize);
                for &gray in data {
                    rgba.extend_from_slice(&[gray, gray, gray, 255]);
                }
                rgba
            }
            png::ColorType::Indexed => {
                return Err(Error::Decode("Indexed PNG was not expanded.".into()));
            }
        };

        Ok(DecodedImage {
            dimensions: Vector2::new(width, height),
            pixels,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reject_garbage() {
        let decoder = PngDecoder::new();
        assert!(decoder.decode(b"definitely not a png").is_err());
    }
}
