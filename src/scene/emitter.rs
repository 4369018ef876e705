use std::rc::Rc;

use rand::prng::XorShiftRng;
use rand::SeedableRng;

use crate::math::prelude::*;
use crate::particles::prelude::{ParticleEmitter, ParticleEmitterDesc};
use crate::video::prelude::SpriteBatch;

use super::component::Component;
use super::manager::{Entity, EntityManager};

/// Drives a particle emitter which follows the world transform of its entity.
///
/// The emitter is spawned on the first update after `desc` has been assigned, and is
/// dropped once it dies. With `looping` set, a new one is spawned right away.
pub struct EmitterComponent {
    pub desc: Option<Rc<ParticleEmitterDesc>>,
    pub looping: bool,
    pub render_enabled: bool,
    emitter: Option<ParticleEmitter>,
    rng: XorShiftRng,
}

impl Default for EmitterComponent {
    fn default() -> Self {
        EmitterComponent {
            desc: None,
            looping: false,
            render_enabled: true,
            emitter: None,
            rng: XorShiftRng::from_seed(::rand::random()),
        }
    }
}

impl EmitterComponent {
    pub fn new(desc: Rc<ParticleEmitterDesc>) -> Self {
        EmitterComponent {
            desc: Some(desc),
            ..EmitterComponent::default()
        }
    }

    #[inline]
    pub fn emitter(&self) -> Option<&ParticleEmitter> {
        self.emitter.as_ref()
    }

    /// Stops spawning. Live particles keep going until they expire.
    pub fn stop(&mut self) {
        self.looping = false;
        self.desc = None;

        if let Some(ref mut emitter) = self.emitter {
            emitter.stop();
        }
    }
}

impl Component for EmitterComponent {
    fn on_update(&mut self, entity: Entity, scene: &mut EntityManager, dt: f32) {
        let world = scene.world_transform(entity).unwrap_or_else(Matrix4::identity);

        if self.emitter.is_none() {
            if let Some(ref desc) = self.desc {
                self.emitter = Some(ParticleEmitter::new(desc.clone(), world, &mut self.rng));
                if !self.looping {
                    self.desc = None;
                }
            }
        }

        let dead = match self.emitter {
            Some(ref mut emitter) => {
                emitter.set_transform(world);
                emitter.set_render_enabled(self.render_enabled);
                emitter.update(dt, &mut self.rng);
                !emitter.is_alive()
            }
            None => false,
        };

        if dead {
            self.emitter = None;
        }
    }

    fn on_render(&mut self, _: Entity, _: &Matrix4<f32>, batch: &mut SpriteBatch) {
        if let Some(ref emitter) = self.emitter {
            emitter.render(batch);
        }
    }

    fn on_destroy(&mut self, _: Entity) {
        self.emitter = None;
    }
}
