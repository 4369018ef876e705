use std::rc::Rc;

use rand::Rng;

use crate::math::prelude::*;
use crate::video::prelude::SpriteBatch;

use super::desc::ParticleEmitterDesc;

/// The life cycle of an emitter.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EmitterState {
    /// Spawns new particles.
    Spawning,
    /// Spawns nothing, live particles keep aging until they expire.
    Stopped,
    /// No particle is left, the emitter could be removed.
    Dead,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Particle {
    pub position: Vector2<f32>,
    pub velocity: Vector2<f32>,
    pub age: f32,
    pub life: f32,
    pub start_color: Color,
    pub end_color: Color,
    pub start_size: f32,
    pub end_size: f32,
    pub start_angle: f32,
    pub end_angle: f32,
}

impl Particle {
    /// The normalized age in [0, 1].
    #[inline]
    pub fn progress(&self) -> f32 {
        (self.age / self.life).min(1.0)
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.start_color.lerp(self.end_color, self.progress())
    }

    #[inline]
    pub fn size(&self) -> f32 {
        let t = self.progress();
        self.start_size + (self.end_size - self.start_size) * t
    }

    #[inline]
    pub fn angle(&self) -> f32 {
        let t = self.progress();
        self.start_angle + (self.end_angle - self.start_angle) * t
    }
}

pub struct ParticleEmitter {
    desc: Rc<ParticleEmitterDesc>,
    transform: Matrix4<f32>,
    particles: Vec<Particle>,
    rate_progress: f32,
    elapsed: f32,
    state: EmitterState,
    render_enabled: bool,
}

impl ParticleEmitter {
    /// Creates an emitter and spawns its burst at once.
    pub fn new<R: Rng>(
        desc: Rc<ParticleEmitterDesc>,
        transform: Matrix4<f32>,
        rng: &mut R,
    ) -> Self {
        let state = if desc.rate > 0.0 {
            EmitterState::Spawning
        } else {
            EmitterState::Stopped
        };

        let mut emitter = ParticleEmitter {
            particles: Vec::with_capacity(desc.burst as usize),
            desc,
            transform,
            rate_progress: 0.0,
            elapsed: 0.0,
            state,
            render_enabled: true,
        };

        for _ in 0..emitter.desc.burst {
            emitter.spawn(rng);
        }

        if emitter.state == EmitterState::Stopped && emitter.particles.is_empty() {
            emitter.state = EmitterState::Dead;
        }

        emitter
    }

    #[inline]
    pub fn desc(&self) -> &Rc<ParticleEmitterDesc> {
        &self.desc
    }

    #[inline]
    pub fn state(&self) -> EmitterState {
        self.state
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.state != EmitterState::Dead
    }

    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[inline]
    pub fn transform(&self) -> Matrix4<f32> {
        self.transform
    }

    /// Moves the emitter. Particles already spawned are not affected.
    #[inline]
    pub fn set_transform(&mut self, transform: Matrix4<f32>) {
        self.transform = transform;
    }

    #[inline]
    pub fn position(&self) -> Vector2<f32> {
        Vector2::new(self.transform.w.x, self.transform.w.y)
    }

    #[inline]
    pub fn render_enabled(&self) -> bool {
        self.render_enabled
    }

    #[inline]
    pub fn set_render_enabled(&mut self, enabled: bool) {
        self.render_enabled = enabled;
    }

    /// Stops spawning. The emitter dies once its particles expired.
    pub fn stop(&mut self) {
        if self.state == EmitterState::Spawning {
            self.state = EmitterState::Stopped;
        }

        if self.particles.is_empty() {
            self.state = EmitterState::Dead;
        }
    }

    /// Ages the particles by `dt` seconds, removes the expired ones and spawns new ones
    /// according to the emission rate.
    pub fn update<R: Rng>(&mut self, dt: f32, rng: &mut R) {
        if self.state == EmitterState::Dead {
            return;
        }

        let gravity = self.desc.gravity;
        for v in &mut self.particles {
            v.age += dt;
            v.velocity += gravity * dt;
            v.position += v.velocity * dt;
        }

        self.particles.retain(|v| v.age < v.life);

        if self.state == EmitterState::Spawning {
            self.elapsed += dt;
            self.rate_progress += dt * self.desc.rate;

            while self.rate_progress >= 1.0 {
                self.spawn(rng);
                self.rate_progress -= 1.0;
            }

            if self.desc.duration > 0.0 && self.elapsed >= self.desc.duration {
                self.state = EmitterState::Stopped;
            }
        }

        if self.state == EmitterState::Stopped && self.particles.is_empty() {
            self.state = EmitterState::Dead;
        }
    }

    /// Draws the live particles. Nothing is drawn if rendering is disabled.
    pub fn render(&self, batch: &mut SpriteBatch) {
        if !self.render_enabled || self.particles.is_empty() {
            return;
        }

        batch.change_blend_mode(self.desc.blend_mode);
        batch.change_filtering(self.desc.filtering);

        let origin = Vector2::new(0.5, 0.5);
        for v in &self.particles {
            let size = v.size();
            match self.desc.texture {
                Some(ref texture) => batch.draw_sprite(
                    texture,
                    v.position,
                    v.color(),
                    v.angle(),
                    Vector2::new(size, size),
                    origin,
                ),
                None => {
                    let rect = Vector4::new(
                        v.position.x - size * 0.5,
                        v.position.y - size * 0.5,
                        size,
                        size,
                    );

                    batch.draw_rect(None, rect, v.color());
                }
            }
        }
    }

    fn spawn<R: Rng>(&mut self, rng: &mut R) {
        let desc = &self.desc;

        let (sin, cos) = desc.direction.sample(rng).to_radians().sin_cos();
        let speed = desc.speed.sample(rng);
        let local = Vector4::new(cos * speed, sin * speed, 0.0, 0.0);
        let velocity = self.transform * local;

        let particle = Particle {
            position: self.position(),
            velocity: Vector2::new(velocity.x, velocity.y),
            age: 0.0,
            life: desc.life.sample(rng).max(::std::f32::EPSILON),
            start_color: desc.start_color.sample(rng),
            end_color: desc.end_color.sample(rng),
            start_size: desc.start_size.sample(rng),
            end_size: desc.end_size.sample(rng),
            start_angle: desc.start_angle.sample(rng),
            end_angle: desc.end_angle.sample(rng),
        };

        self.particles.push(particle);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::prng::XorShiftRng;
    use rand::SeedableRng;

    fn rng() -> XorShiftRng {
        XorShiftRng::from_seed([3; 16])
    }

    #[test]
    fn rate() {
        let mut rng = rng();
        let desc = Rc::new(ParticleEmitterDesc {
            rate: 10.0,
            life: super::super::desc::Range::constant(100.0),
            ..ParticleEmitterDesc::default()
        });

        let mut emitter = ParticleEmitter::new(desc, Matrix4::identity(), &mut rng);
        assert_eq!(emitter.particles().len(), 0);

        emitter.update(0.25, &mut rng);
        assert_eq!(emitter.particles().len(), 2);

        // The remaining half interval carries over.
        emitter.update(0.05, &mut rng);
        assert_eq!(emitter.particles().len(), 3);
    }

    #[test]
    fn life_cycle() {
        let mut rng = rng();
        let desc = Rc::new(ParticleEmitterDesc {
            rate: 0.0,
            burst: 5,
            life: super::super::desc::Range::constant(1.0),
            ..ParticleEmitterDesc::default()
        });

        let mut emitter = ParticleEmitter::new(desc, Matrix4::identity(), &mut rng);
        assert_eq!(emitter.state(), EmitterState::Stopped);
        assert_eq!(emitter.particles().len(), 5);

        emitter.update(0.5, &mut rng);
        assert_eq!(emitter.state(), EmitterState::Stopped);
        assert_eq!(emitter.particles().len(), 5);

        emitter.update(0.6, &mut rng);
        assert_eq!(emitter.state(), EmitterState::Dead);
        assert!(!emitter.is_alive());
    }

    #[test]
    fn duration() {
        let mut rng = rng();
        let desc = Rc::new(ParticleEmitterDesc {
            rate: 1.0,
            duration: 1.0,
            life: super::super::desc::Range::constant(0.5),
            ..ParticleEmitterDesc::default()
        });

        let mut emitter = ParticleEmitter::new(desc, Matrix4::identity(), &mut rng);
        emitter.update(1.0, &mut rng);
        assert_eq!(emitter.state(), EmitterState::Stopped);
        assert_eq!(emitter.particles().len(), 1);

        emitter.update(0.5, &mut rng);
        assert_eq!(emitter.state(), EmitterState::Dead);
    }

    #[test]
    fn transform() {
        let mut rng = rng();
        let desc = Rc::new(ParticleEmitterDesc {
            rate: 0.0,
            burst: 1,
            speed: super::super::desc::Range::constant(10.0),
            direction: super::super::desc::Range::constant(0.0),
            ..ParticleEmitterDesc::default()
        });

        let transform = Matrix4::from_translation(Vector3::new(100.0, 50.0, 0.0));
        let mut emitter = ParticleEmitter::new(desc, transform, &mut rng);
        assert_eq!(emitter.particles()[0].position, Vector2::new(100.0, 50.0));

        emitter.update(0.5, &mut rng);
        let p = emitter.particles()[0].position;
        assert!((p.x - 105.0).abs() < 1e-4);
        assert!((p.y - 50.0).abs() < 1e-4);
    }
}
