use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::rc::Rc;

use crate::math::prelude::Matrix4;
use crate::video::prelude::SpriteBatch;

use super::manager::{Entity, EntityManager};

/// The behaviour attached to an entity.
///
/// Components never own their entity. The owning `Entity` handle and the manager are
/// passed into every callback instead, so components can freely query and mutate the
/// scene. A component is borrowed mutably for the duration of its own callbacks, and
/// does not receive nested callbacks it triggers on itself.
pub trait Component: Any {
    /// Called once the component has been attached.
    fn on_create(&mut self, _entity: Entity, _scene: &mut EntityManager) {}

    /// Called once per frame with the elapsed seconds.
    fn on_update(&mut self, _entity: Entity, _scene: &mut EntityManager, _dt: f32) {}

    fn on_message(
        &mut self,
        _entity: Entity,
        _scene: &mut EntityManager,
        _message: &str,
        _data: &dyn Any,
    ) {
    }

    /// Draws the component with the world transform of its entity.
    fn on_render(&mut self, _entity: Entity, _world: &Matrix4<f32>, _batch: &mut SpriteBatch) {}

    /// Called before the component is detached, while its entity is still linked into
    /// the hierarchy.
    fn on_destroy(&mut self, _entity: Entity) {}
}

/// A type-erased component attached to an entity.
#[derive(Clone)]
pub(crate) struct ComponentSlot {
    pub type_id: TypeId,
    any: Rc<dyn Any>,
    dynamic: Rc<RefCell<dyn Component>>,
}

impl ComponentSlot {
    pub fn new<T: Component>(component: Rc<RefCell<T>>) -> Self {
        ComponentSlot {
            type_id: TypeId::of::<T>(),
            any: component.clone(),
            dynamic: component,
        }
    }

    /// Runs `func` with the component, unless the component is inside one of its own
    /// callbacks already.
    pub fn dispatch<F: FnOnce(&mut dyn Component)>(&self, func: F) {
        if let Ok(mut component) = self.dynamic.try_borrow_mut() {
            func(&mut *component);
        }
    }

    pub fn downcast<T: Component>(&self) -> Option<Rc<RefCell<T>>> {
        self.any.clone().downcast::<RefCell<T>>().ok()
    }
}
