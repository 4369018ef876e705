use std::rc::Rc;

use pastel::prelude::*;
use pastel::video::backends::headless::HeadlessVisitor;

#[test]
fn render_particles() {
    let (visitor, recorder) = HeadlessVisitor::recorded();
    let mut video =
        VideoSystem::from_visitor(Box::new(visitor), VideoParams::default(), Vector2::new(800, 600))
            .unwrap();
    let mut batch = SpriteBatch::new(&mut video).unwrap();

    let mut particles = ParticleSystemManager::with_seed([7; 16]);
    let desc = Rc::new(ParticleEmitterDesc {
        rate: 0.0,
        burst: 10,
        life: Range::constant(1.0),
        blend_mode: BlendMode::Add,
        ..ParticleEmitterDesc::default()
    });

    let e1 = particles.emit(desc.clone(), Matrix4::identity());
    let e2 = particles.emit(desc, Matrix4::from_translation(Vector3::new(5.0, 5.0, 0.0)));
    particles.set_render_enabled(e2, false);
    particles.update(0.1);

    video.begin_frame().unwrap();
    recorder.clear();

    batch.begin();
    particles.render(&mut batch);
    assert_eq!(batch.len(), 10);
    batch.end(&mut video).unwrap();
    assert_eq!(recorder.draws(), 1);

    particles.stop(e1);
    particles.update(1.0);
    assert!(particles.is_empty());
}

#[test]
fn json_desc() {
    let desc = ParticleEmitterDesc::from_json(
        r#"{
            "rate": 25.0,
            "burst": 3,
            "duration": 2.0,
            "life": { "min": 0.5, "max": 1.5 },
            "gravity": [0.0, 98.0],
            "blend_mode": "Add"
        }"#,
    )
    .unwrap();

    assert_eq!(desc.rate, 25.0);
    assert_eq!(desc.burst, 3);
    assert_eq!(desc.life, Range::new(0.5, 1.5));
    assert_eq!(desc.gravity, Vector2::new(0.0, 98.0));
    assert_eq!(desc.blend_mode, BlendMode::Add);
    assert!(desc.texture.is_none());
}
