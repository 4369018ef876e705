use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use pastel::prelude::*;
use pastel::video::backends::headless::{HeadlessVisitor, Recorder};

#[derive(Default)]
struct Counter {
    created: u32,
    updates: u32,
    messages: Vec<String>,
    destroyed: Option<Rc<RefCell<bool>>>,
}

impl Component for Counter {
    fn on_create(&mut self, _: Entity, _: &mut EntityManager) {
        self.created += 1;
    }

    fn on_update(&mut self, _: Entity, _: &mut EntityManager, _: f32) {
        self.updates += 1;
    }

    fn on_message(&mut self, _: Entity, _: &mut EntityManager, message: &str, data: &dyn Any) {
        let value = data.downcast_ref::<i32>().cloned().unwrap_or(-1);
        self.messages.push(format!("{}:{}", message, value));
    }

    fn on_destroy(&mut self, _: Entity) {
        if let Some(ref flag) = self.destroyed {
            *flag.borrow_mut() = true;
        }
    }
}

/// Destroys its own entity on first update.
#[derive(Default)]
struct SelfDestruct;

impl Component for SelfDestruct {
    fn on_update(&mut self, entity: Entity, scene: &mut EntityManager, _: f32) {
        scene.destroy(entity);
    }
}

/// Spawns a child entity once.
#[derive(Default)]
struct Spawner {
    spawned: Option<Entity>,
}

impl Component for Spawner {
    fn on_update(&mut self, entity: Entity, scene: &mut EntityManager, _: f32) {
        if self.spawned.is_none() {
            let child = scene.create_with_name("spawned");
            scene.add(entity, child).unwrap();
            scene.add_component::<Counter>(child).unwrap();
            self.spawned = Some(child);
        }
    }
}

fn device() -> (VideoSystem, Recorder) {
    let _ = env_logger::try_init();
    let (visitor, recorder) = HeadlessVisitor::recorded();
    let video =
        VideoSystem::from_visitor(Box::new(visitor), VideoParams::default(), Vector2::new(800, 600))
            .unwrap();
    (video, recorder)
}

#[test]
fn add_component_is_idempotent() {
    let mut scene = EntityManager::new();
    let e1 = scene.create();

    let c1 = scene.add_component::<Counter>(e1).unwrap();
    let c2 = scene.add_component::<Counter>(e1).unwrap();
    assert!(Rc::ptr_eq(&c1, &c2));
    assert_eq!(c1.borrow().created, 1);

    let c3 = scene.get_component::<Counter>(e1).unwrap();
    assert!(Rc::ptr_eq(&c1, &c3));
    assert!(scene.get_component::<SpriteComponent>(e1).is_none());

    assert!(scene.remove_component::<Counter>(e1));
    assert!(!scene.remove_component::<Counter>(e1));
    assert!(scene.get_component::<Counter>(e1).is_none());
}

#[test]
fn invalid_entity() {
    let mut scene = EntityManager::new();
    let e1 = scene.create();
    scene.destroy(e1);

    assert!(scene.add_component::<Counter>(e1).is_err());
    assert!(scene.get_component::<Counter>(e1).is_none());
}

#[test]
fn update_and_messages() {
    let mut scene = EntityManager::new();
    let e1 = scene.create();
    let e2 = scene.create();
    let c1 = scene.add_component::<Counter>(e1).unwrap();
    let c2 = scene.add_component::<Counter>(e2).unwrap();

    scene.update(0.016);
    scene.update(0.016);
    assert_eq!(c1.borrow().updates, 2);
    assert_eq!(c2.borrow().updates, 2);

    scene.send_message(e1, "hit", &7i32);
    scene.broadcast_message("reset", &"none");
    assert_eq!(c1.borrow().messages, vec!["hit:7", "reset:-1"]);
    assert_eq!(c2.borrow().messages, vec!["reset:-1"]);
}

#[test]
fn destroy_during_update() {
    let mut scene = EntityManager::new();
    let e1 = scene.create();
    let flag = Rc::new(RefCell::new(false));

    scene.add_component::<SelfDestruct>(e1).unwrap();
    let counter = scene.add_component::<Counter>(e1).unwrap();
    counter.borrow_mut().destroyed = Some(flag.clone());

    scene.update(0.016);
    assert!(!scene.is_alive(e1));
    assert!(*flag.borrow());
    assert_eq!(counter.borrow().updates, 0);
}

#[test]
fn spawn_during_update() {
    let mut scene = EntityManager::new();
    let e1 = scene.create();
    let spawner = scene.add_component::<Spawner>(e1).unwrap();

    scene.update(0.016);
    let child = spawner.borrow().spawned.unwrap();
    assert_eq!(scene.parent(child), Some(e1));
    assert_eq!(scene.find("spawned"), Some(child));

    scene.update(0.016);
    let counter = scene.get_component::<Counter>(child).unwrap();
    assert!(counter.borrow().updates >= 1);
}

#[test]
fn destroy_notifies_descendants() {
    let mut scene = EntityManager::new();
    let e1 = scene.create();
    let e2 = scene.create();
    scene.add(e1, e2).unwrap();

    let flag = Rc::new(RefCell::new(false));
    let counter = scene.add_component::<Counter>(e2).unwrap();
    counter.borrow_mut().destroyed = Some(flag.clone());

    scene.destroy(e1);
    assert!(*flag.borrow());
    assert!(!scene.is_alive(e2));
    assert!(scene.is_empty());
    assert!(scene.roots().is_empty());
}

#[test]
fn render_sprites() {
    let (mut video, recorder) = device();
    let mut batch = SpriteBatch::new(&mut video).unwrap();
    let texture = Rc::new(
        Texture::create_from_data(&mut video, &[255; 16 * 16 * 4], Vector2::new(16, 16), false)
            .unwrap(),
    );

    let mut scene = EntityManager::new();
    let e1 = scene.create();
    let e2 = scene.create();
    let e3 = scene.create();
    scene.add(e1, e2).unwrap();

    scene.add_component_with(e1, || SpriteComponent::with_texture(texture.clone())).unwrap();
    scene.add_component_with(e2, || SpriteComponent::with_texture(texture.clone())).unwrap();
    let hidden = scene.add_component::<SpriteComponent>(e3).unwrap();
    hidden.borrow_mut().visible = false;

    assert_eq!(hidden.borrow().dimensions(), Vector2::new(1.0, 1.0));
    assert_eq!(
        scene.get_component::<SpriteComponent>(e1).unwrap().borrow().dimensions(),
        Vector2::new(16.0, 16.0)
    );

    video.begin_frame().unwrap();
    recorder.clear();

    batch.begin();
    scene.render(&mut batch);
    assert_eq!(batch.len(), 2);
    batch.end(&mut video).unwrap();
    assert_eq!(recorder.draws(), 1);
}

#[test]
fn emitter_follows_entity() {
    let mut scene = EntityManager::new();
    let e1 = scene.create();
    scene.set_local_transform(e1, Matrix4::from_translation(Vector3::new(50.0, 60.0, 0.0)));

    let desc = Rc::new(ParticleEmitterDesc {
        rate: 0.0,
        burst: 4,
        life: Range::constant(1.0),
        speed: Range::constant(0.0),
        ..ParticleEmitterDesc::default()
    });

    let component = scene
        .add_component_with(e1, || EmitterComponent::new(desc.clone()))
        .unwrap();

    scene.update(0.1);
    {
        let component = component.borrow();
        let emitter = component.emitter().unwrap();
        assert_eq!(emitter.particles().len(), 4);
        assert_eq!(emitter.position(), Vector2::new(50.0, 60.0));
    }

    scene.set_local_transform(e1, Matrix4::from_translation(Vector3::new(10.0, 0.0, 0.0)));
    scene.update(0.1);
    assert_eq!(
        component.borrow().emitter().unwrap().position(),
        Vector2::new(10.0, 0.0)
    );

    scene.update(1.0);
    assert!(component.borrow().emitter().is_none());
}
