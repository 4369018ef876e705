use serde::{Deserialize, Serialize};

/// A RGBA `Color`. Each color component is a floating point value
/// with a range from 0 to 1.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl From<u32> for Color {
    /// Creates `Color` from a u32 encoded `RGBA`.
    fn from(encoded: u32) -> Self {
        let max = 255.0;
        Color::new(
            ((encoded >> 24) & 0xFF) as f32 / max,
            ((encoded >> 16) & 0xFF) as f32 / max,
            ((encoded >> 8) & 0xFF) as f32 / max,
            (encoded & 0xFF) as f32 / max,
        )
    }
}

impl Into<[f32; 4]> for Color {
    fn into(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[u8; 4]> for Color {
    fn from(v: [u8; 4]) -> Self {
        let max = 255.0;
        Color::new(
            f32::from(v[0]) / max,
            f32::from(v[1]) / max,
            f32::from(v[2]) / max,
            f32::from(v[3]) / max,
        )
    }
}

impl Color {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Color { r, g, b, a }
    }

    /// Creates an opaque `Color` from a u32 encoded `RGB`, e.g. `0x1d232d`.
    pub fn from_hex_rgb(encoded: u32) -> Self {
        Color::from((encoded << 8) | 0xFF)
    }

    #[inline]
    pub fn white() -> Self {
        Color::new(1.0, 1.0, 1.0, 1.0)
    }

    #[inline]
    pub fn black() -> Self {
        Color::new(0.0, 0.0, 0.0, 1.0)
    }

    #[inline]
    pub fn transparent() -> Self {
        Color::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Returns a new `Color` whose components are clamped into [0, 1].
    pub fn clip(&self) -> Self {
        let clamp = |v: f32| v.max(0.0).min(1.0);
        Color::new(clamp(self.r), clamp(self.g), clamp(self.b), clamp(self.a))
    }

    /// Returns this color with its rgb channels scaled by alpha.
    pub fn premultiplied(&self) -> Self {
        Color::new(self.r * self.a, self.g * self.a, self.b * self.a, self.a)
    }

    /// Linear interpolation between `self` and `rhs`.
    pub fn lerp(&self, rhs: Color, t: f32) -> Self {
        Color::new(
            self.r + (rhs.r - self.r) * t,
            self.g + (rhs.g - self.g) * t,
            self.b + (rhs.b - self.b) * t,
            self.a + (rhs.a - self.a) * t,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hex() {
        let c = Color::from_hex_rgb(0xFF0000);
        assert_eq!(c, Color::new(1.0, 0.0, 0.0, 1.0));

        let c = Color::from(0x00FF_0080);
        assert_eq!(c.g, 1.0);
        assert!((c.a - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn premultiplied() {
        let c = Color::new(1.0, 0.5, 0.25, 0.5).premultiplied();
        assert_eq!(c, Color::new(0.5, 0.25, 0.125, 0.5));
    }
}
