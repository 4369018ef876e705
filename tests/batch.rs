use pastel::prelude::*;
use pastel::video::backends::headless::{Call, HeadlessVisitor, Recorder};

fn device(capacity: usize) -> (VideoSystem, Recorder) {
    let _ = env_logger::try_init();
    let (visitor, recorder) = HeadlessVisitor::recorded();
    let params = VideoParams {
        sprite_batch_capacity: capacity,
        ..VideoParams::default()
    };

    let video =
        VideoSystem::from_visitor(Box::new(visitor), params, Vector2::new(800, 600)).unwrap();
    (video, recorder)
}

fn rect(x: f32) -> Vector4<f32> {
    Vector4::new(x, 0.0, 16.0, 16.0)
}

fn texture(video: &mut VideoSystem) -> Texture {
    Texture::create_from_data(video, &[255; 16], Vector2::new(2, 2), false).unwrap()
}

#[test]
fn one_draw_per_texture_run() {
    let (mut video, recorder) = device(2048);
    let mut batch = SpriteBatch::new(&mut video).unwrap();
    let t1 = texture(&mut video);
    let t2 = texture(&mut video);

    video.begin_frame().unwrap();
    recorder.clear();

    batch.begin();
    batch.draw_rect(Some(&t1), rect(0.0), Color::white());
    batch.draw_rect(Some(&t1), rect(16.0), Color::white());
    batch.draw_rect(Some(&t1), rect(32.0), Color::white());
    assert_eq!(batch.len(), 3);
    batch.end(&mut video).unwrap();

    assert_eq!(recorder.draws(), 1);
    assert!(recorder
        .calls()
        .contains(&Call::DrawIndexed(PrimitiveMode::TriangleList, 18)));
    assert!(batch.is_empty());

    recorder.clear();
    batch.begin();
    batch.draw_rect(Some(&t1), rect(0.0), Color::white());
    batch.draw_rect(Some(&t2), rect(16.0), Color::white());
    batch.draw_rect(Some(&t1), rect(32.0), Color::white());
    batch.end(&mut video).unwrap();
    assert_eq!(recorder.draws(), 3);
}

#[test]
fn state_changes_split_runs() {
    let (mut video, recorder) = device(2048);
    let mut batch = SpriteBatch::new(&mut video).unwrap();
    video.begin_frame().unwrap();
    recorder.clear();

    batch.begin();
    batch.draw_rect(None, rect(0.0), Color::white());
    batch.change_blend_mode(BlendMode::PreMultiplied);
    batch.draw_rect(None, rect(16.0), Color::white());
    batch.change_blend_mode(BlendMode::Add);
    batch.draw_rect(None, rect(32.0), Color::white());
    batch.change_filtering(Filtering::Nearest);
    batch.draw_rect(None, rect(48.0), Color::white());
    batch.end(&mut video).unwrap();

    assert_eq!(recorder.draws(), 3);
    assert!(recorder.calls().contains(&Call::SetBlendMode(BlendMode::Add)));
}

#[test]
fn capacity_splits_draws() {
    let (mut video, recorder) = device(2);
    let mut batch = SpriteBatch::new(&mut video).unwrap();
    assert_eq!(batch.capacity(), 2);
    video.begin_frame().unwrap();
    recorder.clear();

    batch.begin();
    for i in 0..5 {
        batch.draw_rect(None, rect(i as f32 * 16.0), Color::white());
    }
    batch.end(&mut video).unwrap();

    let draws: Vec<Call> = recorder.calls().into_iter().filter(Call::is_draw).collect();
    assert_eq!(
        draws,
        vec![
            Call::DrawIndexed(PrimitiveMode::TriangleList, 12),
            Call::DrawIndexed(PrimitiveMode::TriangleList, 12),
            Call::DrawIndexed(PrimitiveMode::TriangleList, 6),
        ]
    );

    let updates = recorder.count(|v| match *v {
        Call::UpdateBuffer(_, _) => true,
        _ => false,
    });
    assert_eq!(updates, 3);
}

#[test]
fn empty_batch() {
    let (mut video, recorder) = device(2048);
    let mut batch = SpriteBatch::new(&mut video).unwrap();
    video.begin_frame().unwrap();
    recorder.clear();

    batch.begin();
    assert!(batch.is_in_batch());
    batch.end(&mut video).unwrap();
    assert!(!batch.is_in_batch());
    assert_eq!(recorder.draws(), 0);
}

#[test]
fn explicit_flush() {
    let (mut video, recorder) = device(2048);
    let mut batch = SpriteBatch::new(&mut video).unwrap();
    let t1 = texture(&mut video);
    video.begin_frame().unwrap();
    recorder.clear();

    batch.begin_with_transform(Matrix4::from_translation(Vector3::new(10.0, 0.0, 0.0)));
    batch.draw_sprite(
        &t1,
        Vector2::new(100.0, 100.0),
        Color::white(),
        45.0,
        Vector2::new(1.0, 1.0),
        Vector2::new(0.5, 0.5),
    );
    batch.flush(&mut video).unwrap();
    assert_eq!(recorder.draws(), 1);

    batch.draw_rect_with_colors(
        None,
        rect(0.0),
        [Color::white(), Color::black(), Color::white(), Color::black()],
    );
    batch.end(&mut video).unwrap();
    assert_eq!(recorder.draws(), 2);
}

#[test]
#[should_panic]
fn nested_begin() {
    let (mut video, _) = device(16);
    let mut batch = SpriteBatch::new(&mut video).unwrap();
    batch.begin();
    batch.begin();
}
