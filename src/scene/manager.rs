use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::rc::Rc;

use crate::errors::*;
use crate::math::prelude::*;
use crate::utils::prelude::ObjectPool;
use crate::video::prelude::SpriteBatch;

use super::component::{Component, ComponentSlot};

impl_handle!(Entity);

struct Node {
    name: String,
    parent: Option<Entity>,
    children: Vec<Entity>,
    local: Matrix4<f32>,
    world: Matrix4<f32>,
    world_dirty: bool,
    components: Vec<ComponentSlot>,
}

impl Node {
    fn new(name: String) -> Self {
        Node {
            name,
            parent: None,
            children: Vec::new(),
            local: Matrix4::identity(),
            world: Matrix4::identity(),
            world_dirty: true,
            components: Vec::new(),
        }
    }
}

/// Owns every entity of a scene.
///
/// Entities form a forest: each one is owned by its parent, or is one of the roots of
/// the manager. The world transform of an entity is cached and recomputed lazily. Any
/// change of local transform, world transform or parent marks the entity and all of its
/// descendants dirty.
pub struct EntityManager {
    nodes: ObjectPool<Entity, Node>,
    roots: Vec<Entity>,
}

impl Default for EntityManager {
    fn default() -> Self {
        EntityManager::new()
    }
}

impl EntityManager {
    pub fn new() -> Self {
        EntityManager {
            nodes: ObjectPool::new(),
            roots: Vec::new(),
        }
    }

    /// Creates a root entity.
    pub fn create(&mut self) -> Entity {
        self.create_with_name("")
    }

    pub fn create_with_name<T: Into<String>>(&mut self, name: T) -> Entity {
        let entity = self.nodes.create(Node::new(name.into()));
        self.roots.push(entity);
        entity
    }

    #[inline]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.nodes.contains(entity)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn roots(&self) -> &[Entity] {
        &self.roots
    }

    pub fn name(&self, entity: Entity) -> Option<&str> {
        self.nodes.get(entity).map(|v| v.name.as_str())
    }

    pub fn set_name<T: Into<String>>(&mut self, entity: Entity, name: T) {
        if let Some(node) = self.nodes.get_mut(entity) {
            node.name = name.into();
        }
    }

    /// Finds the first entity named `name`, in creation order.
    pub fn find(&self, name: &str) -> Option<Entity> {
        self.nodes
            .keys()
            .into_iter()
            .find(|&v| self.name(v) == Some(name))
    }

    #[inline]
    pub fn parent(&self, entity: Entity) -> Option<Entity> {
        self.nodes.get(entity).and_then(|v| v.parent)
    }

    /// The direct children of `entity`, in the order they were added.
    #[inline]
    pub fn children(&self, entity: Entity) -> &[Entity] {
        self.nodes
            .get(entity)
            .map(|v| v.children.as_slice())
            .unwrap_or(&[])
    }

    /// All descendants of `entity` in depth-first order.
    pub fn descendants(&self, entity: Entity) -> Vec<Entity> {
        let mut descendants = Vec::new();
        let mut stack: Vec<Entity> = self.children(entity).iter().rev().cloned().collect();

        while let Some(v) = stack.pop() {
            descendants.push(v);
            stack.extend(self.children(v).iter().rev());
        }

        descendants
    }

    /// Returns true if `ancestor` is one of the ancestors of `entity`.
    pub fn is_ancestor(&self, entity: Entity, ancestor: Entity) -> bool {
        let mut cursor = self.parent(entity);
        while let Some(v) = cursor {
            if v == ancestor {
                return true;
            }

            cursor = self.parent(v);
        }

        false
    }

    /// Attaches `child` to `parent`, detaching it from its previous parent first. The
    /// local transform of `child` is kept.
    pub fn add(&mut self, parent: Entity, child: Entity) -> Result<()> {
        if !self.is_alive(parent) || !self.is_alive(child) {
            bail!("{:?} or {:?} is invalid.", parent, child);
        }

        if parent == child || self.is_ancestor(parent, child) {
            bail!("{:?} can not be attached to its own descendant {:?}.", child, parent);
        }

        self.unlink(child);
        self.roots.retain(|&v| v != child);

        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child);
        }

        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }

        self.mark_dirty(child);
        Ok(())
    }

    /// Detaches `child` from its parent. It becomes a root entity.
    pub fn remove(&mut self, child: Entity) {
        if self.parent(child).is_some() {
            self.unlink(child);
            self.roots.push(child);
            self.mark_dirty(child);
        }
    }

    fn unlink(&mut self, child: Entity) {
        let parent = match self.nodes.get_mut(child) {
            Some(node) => node.parent.take(),
            None => return,
        };

        if let Some(node) = parent.and_then(|v| self.nodes.get_mut(v)) {
            node.children.retain(|&v| v != child);
        }
    }

    /// Destroys `entity` and all of its descendants. Components are notified with
    /// `on_destroy` before the entities are unlinked.
    pub fn destroy(&mut self, entity: Entity) {
        if !self.is_alive(entity) {
            return;
        }

        let mut entities = vec![entity];
        entities.extend(self.descendants(entity));

        for &v in &entities {
            for slot in self.components(v) {
                slot.dispatch(|c| c.on_destroy(v));
            }
        }

        self.unlink(entity);
        self.roots.retain(|&v| v != entity);

        for v in entities {
            self.nodes.free(v);
        }
    }

    /// Creates a deep copy of the hierarchy under `entity` with names and local
    /// transforms, as a new root. Components are not copied.
    pub fn copy(&mut self, entity: Entity) -> Result<Entity> {
        let (name, local, children) = match self.nodes.get(entity) {
            Some(node) => (node.name.clone(), node.local, node.children.clone()),
            None => bail!("{:?} is invalid.", entity),
        };

        let copy = self.create_with_name(name);
        self.set_local_transform(copy, local);

        for child in children {
            let attached = self.copy(child).and_then(|v| self.add(copy, v));
            if let Err(err) = attached {
                self.destroy(copy);
                return Err(err);
            }
        }

        Ok(copy)
    }

    #[inline]
    pub fn local_transform(&self, entity: Entity) -> Option<Matrix4<f32>> {
        self.nodes.get(entity).map(|v| v.local)
    }

    pub fn set_local_transform(&mut self, entity: Entity, transform: Matrix4<f32>) {
        if let Some(node) = self.nodes.get_mut(entity) {
            node.local = transform;
        }

        self.mark_dirty(entity);
    }

    /// Gets the transform in world space, recomputing it only if it has been dirtied.
    pub fn world_transform(&mut self, entity: Entity) -> Option<Matrix4<f32>> {
        let (dirty, parent, local, world) = {
            let node = self.nodes.get(entity)?;
            (node.world_dirty, node.parent, node.local, node.world)
        };

        if !dirty {
            return Some(world);
        }

        let world = match parent {
            Some(parent) => self.world_transform(parent)? * local,
            None => local,
        };

        let node = self.nodes.get_mut(entity)?;
        node.world = world;
        node.world_dirty = false;
        Some(world)
    }

    /// Sets the transform in world space, by computing the matching local transform
    /// against the world transform of parent.
    pub fn set_world_transform(&mut self, entity: Entity, transform: Matrix4<f32>) {
        let local = match self.parent(entity) {
            Some(parent) => match self.world_transform(parent).and_then(|v| v.invert()) {
                Some(inverse) => inverse * transform,
                None => {
                    warn!("World transform of parent {:?} is not invertible.", parent);
                    return;
                }
            },
            None => transform,
        };

        self.set_local_transform(entity, local);
    }

    /// Returns true if the world transform of `entity` will be recomputed on next read.
    #[inline]
    pub fn is_world_dirty(&self, entity: Entity) -> bool {
        self.nodes.get(entity).map(|v| v.world_dirty).unwrap_or(false)
    }

    fn mark_dirty(&mut self, entity: Entity) {
        let mut stack = vec![entity];
        while let Some(v) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(v) {
                node.world_dirty = true;
                stack.extend(node.children.iter());
            }
        }
    }
}

impl EntityManager {
    /// Attaches a default constructed component of type `T`. If the entity has one
    /// already, the existing instance is returned instead.
    pub fn add_component<T>(&mut self, entity: Entity) -> Result<Rc<RefCell<T>>>
    where
        T: Component + Default,
    {
        self.add_component_with(entity, T::default)
    }

    /// Attaches the component built by `func`, which is only invoked if the entity has
    /// no component of type `T` yet.
    pub fn add_component_with<T, F>(&mut self, entity: Entity, func: F) -> Result<Rc<RefCell<T>>>
    where
        T: Component,
        F: FnOnce() -> T,
    {
        if let Some(component) = self.get_component::<T>(entity) {
            return Ok(component);
        }

        let component = Rc::new(RefCell::new(func()));
        self.nodes
            .get_mut(entity)
            .ok_or_else(|| format_err!("{:?} is invalid.", entity))?
            .components
            .push(ComponentSlot::new(component.clone()));

        component.borrow_mut().on_create(entity, self);
        Ok(component)
    }

    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<Rc<RefCell<T>>> {
        let node = self.nodes.get(entity)?;
        node.components
            .iter()
            .find(|v| v.type_id == TypeId::of::<T>())
            .and_then(|v| v.downcast::<T>())
    }

    /// Detaches the component of type `T`. Returns false if there is none.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> bool {
        let slot = {
            let node = match self.nodes.get_mut(entity) {
                Some(node) => node,
                None => return false,
            };

            match node.components.iter().position(|v| v.type_id == TypeId::of::<T>()) {
                Some(index) => node.components.remove(index),
                None => return false,
            }
        };

        slot.dispatch(|c| c.on_destroy(entity));
        true
    }

    /// Delivers a message to every component of `entity`.
    pub fn send_message(&mut self, entity: Entity, message: &str, data: &dyn Any) {
        for slot in self.components(entity) {
            slot.dispatch(|c| c.on_message(entity, self, message, data));
        }
    }

    /// Delivers a message to every component of every entity.
    pub fn broadcast_message(&mut self, message: &str, data: &dyn Any) {
        for entity in self.nodes.keys() {
            self.send_message(entity, message, data);
        }
    }

    /// Updates the components of every entity. Entities created during the update are
    /// updated from next frame on.
    pub fn update(&mut self, dt: f32) {
        for entity in self.nodes.keys() {
            for slot in self.components(entity) {
                // The entity might have been destroyed by one of its components.
                if !self.is_alive(entity) {
                    break;
                }

                slot.dispatch(|c| c.on_update(entity, self, dt));
            }
        }
    }

    /// Renders the components of every entity, parents before children.
    pub fn render(&mut self, batch: &mut SpriteBatch) {
        let mut stack: Vec<Entity> = self.roots.iter().rev().cloned().collect();

        while let Some(entity) = stack.pop() {
            let world = match self.world_transform(entity) {
                Some(world) => world,
                None => continue,
            };

            for slot in self.components(entity) {
                slot.dispatch(|c| c.on_render(entity, &world, batch));
            }

            stack.extend(self.children(entity).iter().rev());
        }
    }

    fn components(&self, entity: Entity) -> Vec<ComponentSlot> {
        self.nodes
            .get(entity)
            .map(|v| v.components.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn translation(x: f32, y: f32) -> Matrix4<f32> {
        Matrix4::from_translation(Vector3::new(x, y, 0.0))
    }

    #[test]
    fn hierarchy() {
        let mut scene = EntityManager::new();
        let root = scene.create();
        let a = scene.create();
        let b = scene.create();
        let c = scene.create();

        scene.add(root, a).unwrap();
        scene.add(a, b).unwrap();
        scene.add(root, c).unwrap();

        assert_eq!(scene.roots(), &[root]);
        assert_eq!(scene.children(root), &[a, c]);
        assert_eq!(scene.descendants(root), vec![a, b, c]);
        assert!(scene.is_ancestor(b, root));
        assert!(scene.add(b, root).is_err());
        assert!(scene.add(a, a).is_err());

        scene.remove(a);
        assert_eq!(scene.parent(a), None);
        assert_eq!(scene.roots(), &[root, a]);
        assert_eq!(scene.children(root), &[c]);
    }

    #[test]
    fn dirty_propagation() {
        let mut scene = EntityManager::new();
        let root = scene.create();
        let a = scene.create();
        let b = scene.create();
        scene.add(root, a).unwrap();
        scene.add(a, b).unwrap();

        scene.world_transform(b);
        assert!(!scene.is_world_dirty(root));
        assert!(!scene.is_world_dirty(b));

        scene.set_local_transform(root, translation(10.0, 0.0));
        assert!(scene.is_world_dirty(a));
        assert!(scene.is_world_dirty(b));

        let world = scene.world_transform(b).unwrap();
        assert_eq!(world.w.x, 10.0);
    }

    #[test]
    fn set_world() {
        let mut scene = EntityManager::new();
        let root = scene.create();
        let a = scene.create();
        scene.add(root, a).unwrap();

        scene.set_local_transform(root, translation(10.0, 20.0));
        scene.set_world_transform(a, translation(15.0, 20.0));

        let local = scene.local_transform(a).unwrap();
        assert!((local.w.x - 5.0).abs() < 1e-5);
        assert!(local.w.y.abs() < 1e-5);

        let world = scene.world_transform(a).unwrap();
        assert!((world.w.x - 15.0).abs() < 1e-5);
    }

    #[test]
    fn destroy() {
        let mut scene = EntityManager::new();
        let root = scene.create();
        let a = scene.create();
        let b = scene.create();
        scene.add(root, a).unwrap();
        scene.add(a, b).unwrap();

        scene.destroy(a);
        assert!(!scene.is_alive(a));
        assert!(!scene.is_alive(b));
        assert!(scene.children(root).is_empty());
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn copy() {
        let mut scene = EntityManager::new();
        let root = scene.create_with_name("root");
        let a = scene.create_with_name("a");
        scene.add(root, a).unwrap();
        scene.set_local_transform(a, translation(1.0, 2.0));

        let copy = scene.copy(root).unwrap();
        assert_ne!(copy, root);
        assert_eq!(scene.name(copy), Some("root"));

        let children = scene.children(copy).to_vec();
        assert_eq!(children.len(), 1);
        assert_ne!(children[0], a);
        assert_eq!(scene.local_transform(children[0]), scene.local_transform(a));
        assert_eq!(scene.len(), 4);

        scene.destroy(a);
        assert!(scene.copy(a).is_err());
        assert_eq!(scene.len(), 3);
    }
}
