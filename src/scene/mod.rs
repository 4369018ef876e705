//! A hierarchical entity/component scene.
//!
//! `EntityManager` owns the entities and their components. Components implement the
//! `Component` trait and are attached at most once per type and entity.

pub mod component;
pub mod emitter;
pub mod manager;
pub mod sprite;

pub mod prelude {
    pub use super::component::Component;
    pub use super::emitter::EmitterComponent;
    pub use super::manager::{Entity, EntityManager};
    pub use super::sprite::SpriteComponent;
}
