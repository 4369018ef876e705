//! Particle emitters and the manager which keeps them alive.
//!
//! An emitter is spawned from a shared `ParticleEmitterDesc`. It goes through three
//! states: `Spawning`, `Stopped` when its duration elapsed or `stop` was called, and
//! `Dead` once every particle expired. `ParticleSystemManager::update` removes dead
//! emitters.

pub mod desc;
pub mod emitter;

pub mod prelude {
    pub use super::desc::{ParticleEmitterDesc, Range};
    pub use super::emitter::{EmitterState, Particle, ParticleEmitter};
    pub use super::{EmitterHandle, ParticleSystemManager};
}

use std::rc::Rc;

use rand::prng::XorShiftRng;
use rand::SeedableRng;

use crate::math::prelude::*;
use crate::utils::prelude::ObjectPool;
use crate::video::prelude::SpriteBatch;

use self::desc::ParticleEmitterDesc;
use self::emitter::ParticleEmitter;

impl_handle!(EmitterHandle);

pub struct ParticleSystemManager {
    emitters: ObjectPool<EmitterHandle, ParticleEmitter>,
    rng: XorShiftRng,
}

impl Default for ParticleSystemManager {
    fn default() -> Self {
        ParticleSystemManager::new()
    }
}

impl ParticleSystemManager {
    pub fn new() -> Self {
        ParticleSystemManager::with_seed(::rand::random())
    }

    /// Creates a manager whose emitters are deterministic.
    pub fn with_seed(seed: [u8; 16]) -> Self {
        ParticleSystemManager {
            emitters: ObjectPool::new(),
            rng: XorShiftRng::from_seed(seed),
        }
    }

    /// Spawns an emitter at `transform`.
    pub fn emit(
        &mut self,
        desc: Rc<ParticleEmitterDesc>,
        transform: Matrix4<f32>,
    ) -> EmitterHandle {
        let emitter = ParticleEmitter::new(desc, transform, &mut self.rng);
        self.emitters.create(emitter)
    }

    /// Stops spawning particles from the emitter.
    pub fn stop(&mut self, handle: EmitterHandle) {
        if let Some(emitter) = self.emitters.get_mut(handle) {
            emitter.stop();
        }
    }

    pub fn set_transform(&mut self, handle: EmitterHandle, transform: Matrix4<f32>) {
        if let Some(emitter) = self.emitters.get_mut(handle) {
            emitter.set_transform(transform);
        }
    }

    pub fn set_render_enabled(&mut self, handle: EmitterHandle, enabled: bool) {
        if let Some(emitter) = self.emitters.get_mut(handle) {
            emitter.set_render_enabled(enabled);
        }
    }

    /// Returns true if the emitter has not been removed yet.
    #[inline]
    pub fn is_alive(&self, handle: EmitterHandle) -> bool {
        self.emitters.contains(handle)
    }

    #[inline]
    pub fn emitter(&self, handle: EmitterHandle) -> Option<&ParticleEmitter> {
        self.emitters.get(handle)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.emitters.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.emitters.is_empty()
    }

    /// Advances every emitter by `dt` seconds and removes the dead ones.
    pub fn update(&mut self, dt: f32) {
        for handle in self.emitters.keys() {
            let dead = match self.emitters.get_mut(handle) {
                Some(emitter) => {
                    emitter.update(dt, &mut self.rng);
                    !emitter.is_alive()
                }
                None => false,
            };

            if dead {
                self.emitters.free(handle);
            }
        }
    }

    /// Draws every emitter into `batch`, in the order they were created.
    pub fn render(&self, batch: &mut SpriteBatch) {
        for handle in self.emitters.keys() {
            if let Some(emitter) = self.emitters.get(handle) {
                emitter.render(batch);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::desc::Range;
    use super::*;

    #[test]
    fn remove_dead() {
        let mut particles = ParticleSystemManager::with_seed([1; 16]);
        let desc = Rc::new(ParticleEmitterDesc {
            rate: 0.0,
            burst: 3,
            life: Range::constant(1.0),
            ..ParticleEmitterDesc::default()
        });

        let e1 = particles.emit(desc.clone(), Matrix4::identity());
        let e2 = particles.emit(desc.clone(), Matrix4::identity());
        assert_eq!(particles.len(), 2);
        assert_eq!(Rc::strong_count(&desc), 3);

        particles.update(0.5);
        assert!(particles.is_alive(e1));

        particles.update(0.6);
        assert!(!particles.is_alive(e1));
        assert!(!particles.is_alive(e2));
        assert!(particles.is_empty());
        assert_eq!(Rc::strong_count(&desc), 1);
    }

    #[test]
    fn stop() {
        let mut particles = ParticleSystemManager::with_seed([1; 16]);
        let desc = Rc::new(ParticleEmitterDesc {
            rate: 100.0,
            life: Range::constant(0.1),
            ..ParticleEmitterDesc::default()
        });

        let e1 = particles.emit(desc, Matrix4::identity());
        particles.update(0.05);
        assert!(particles.emitter(e1).unwrap().particles().len() > 0);

        particles.stop(e1);
        particles.update(0.2);
        assert!(!particles.is_alive(e1));
    }
}
