use rand::Rng;

use crate::math::prelude::*;
use crate::video::prelude::{BlendMode, Filtering, TextureRef};

/// An inclusive range a particle attribute is randomly picked from.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Range<T> {
    pub min: T,
    pub max: T,
}

impl<T: Copy> Range<T> {
    #[inline]
    pub fn new(min: T, max: T) -> Self {
        Range { min, max }
    }

    #[inline]
    pub fn constant(v: T) -> Self {
        Range { min: v, max: v }
    }
}

impl Range<f32> {
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f32 {
        if self.min < self.max {
            rng.gen_range(self.min, self.max)
        } else {
            self.min
        }
    }
}

impl Range<Color> {
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Color {
        if self.min == self.max {
            self.min
        } else {
            self.min.lerp(self.max, rng.gen_range(0.0, 1.0))
        }
    }
}

/// The description of a particle emitter. It is usually shared by many emitters through
/// a `Rc`, and never changes once emitters have been spawned from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleEmitterDesc {
    /// Particles spawned per second. An emitter with no rate stops right after its burst.
    pub rate: f32,
    /// Particles spawned at once when the emitter is created.
    pub burst: u32,
    /// Seconds of emission before the emitter stops by itself, 0 means forever.
    pub duration: f32,

    /// Seconds a particle lives.
    pub life: Range<f32>,
    /// Pixels per second.
    pub speed: Range<f32>,
    /// Direction of initial velocity in degrees, 0 points to +x and 90 to +y.
    pub direction: Range<f32>,
    /// Acceleration in pixels per second squared.
    pub gravity: Vector2<f32>,

    pub start_color: Range<Color>,
    pub end_color: Range<Color>,
    /// Size in pixels for untextured particles, scale factor otherwise.
    pub start_size: Range<f32>,
    pub end_size: Range<f32>,
    /// Degrees.
    pub start_angle: Range<f32>,
    pub end_angle: Range<f32>,

    pub blend_mode: BlendMode,
    pub filtering: Filtering,
    #[serde(skip)]
    pub texture: Option<TextureRef>,
}

impl Default for ParticleEmitterDesc {
    fn default() -> Self {
        ParticleEmitterDesc {
            rate: 10.0,
            burst: 0,
            duration: 0.0,
            life: Range::constant(1.0),
            speed: Range::constant(50.0),
            direction: Range::new(0.0, 360.0),
            gravity: Vector2::new(0.0, 0.0),
            start_color: Range::constant(Color::white()),
            end_color: Range::constant(Color::transparent()),
            start_size: Range::constant(4.0),
            end_size: Range::constant(4.0),
            start_angle: Range::constant(0.0),
            end_angle: Range::constant(0.0),
            blend_mode: BlendMode::PreMultiplied,
            filtering: Filtering::Linear,
            texture: None,
        }
    }
}

impl ParticleEmitterDesc {
    /// Parses a description from JSON. The texture has to be assigned afterwards.
    pub fn from_json(json: &str) -> crate::errors::Result<Self> {
        Ok(::serde_json::from_str(json)?)
    }
}
