use std::io::Cursor;

use pastel::prelude::*;
use pastel::video::backends::headless::{Call, HeadlessVisitor, Recorder};

fn device(dimensions: Vector2<u32>) -> (VideoSystem, Recorder) {
    let _ = env_logger::try_init();
    let (visitor, recorder) = HeadlessVisitor::recorded();
    let video =
        VideoSystem::from_visitor(Box::new(visitor), VideoParams::default(), dimensions).unwrap();

    recorder.clear();
    (video, recorder)
}

fn encode_png(dimensions: Vector2<u32>, pixels: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(Cursor::new(&mut bytes), dimensions.x, dimensions.y);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(pixels).unwrap();
    }

    bytes
}

#[test]
fn mip_levels() {
    let (mut video, _) = device(Vector2::new(800, 600));

    let pixels = [255u8; 8 * 8 * 4];
    let texture = Texture::create_from_data(&mut video, &pixels, Vector2::new(8, 8), true).unwrap();
    assert_eq!(texture.mip_levels(), 4);
    assert_eq!(video.texture(texture.handle()).unwrap().mip_levels, 4);

    let small = &pixels[..6 * 6 * 4];
    let texture = Texture::create_from_data(&mut video, small, Vector2::new(6, 6), true).unwrap();
    assert_eq!(texture.mip_levels(), 1);

    let texture =
        Texture::create_from_data(&mut video, &pixels, Vector2::new(8, 8), false).unwrap();
    assert_eq!(texture.mip_levels(), 1);

    assert!(Texture::create_from_data(&mut video, &[255; 4], Vector2::new(2, 2), false).is_err());

    let huge = Vector2::new(::std::u32::MAX, ::std::u32::MAX);
    assert!(Texture::create_from_data(&mut video, &[255; 4], huge, false).is_err());
}

#[test]
fn from_file_data() {
    let (mut video, recorder) = device(Vector2::new(800, 600));
    let bytes = encode_png(Vector2::new(4, 2), &[200; 4 * 2 * 4]);

    let texture = Texture::create_from_file_data(&mut video, &bytes, false).unwrap();
    assert_eq!(texture.dimensions(), Vector2::new(4, 2));
    assert_eq!(texture.kind(), TextureKind::Static);
    assert!(!texture.is_dynamic());
    assert!(!texture.is_render_target());
    assert_eq!(recorder.count(|v| match *v {
        Call::CreateTexture(_, _) => true,
        _ => false,
    }), 1);

    assert!(Texture::create_from_file_data(&mut video, b"not a png", false).is_err());
    assert!(Texture::create_from_file(&mut video, "/nonexistent/white.png", false).is_err());
}

#[test]
fn premultiplied_image() {
    let (mut video, recorder) = device(Vector2::new(800, 600));
    let straight = [255, 128, 0, 128, 10, 20, 30, 0, 200, 100, 50, 255];
    let bytes = encode_png(Vector2::new(3, 1), &straight);

    let texture = Texture::create_from_file_data(&mut video, &bytes, false).unwrap();
    assert_eq!(texture.dimensions(), Vector2::new(3, 1));
    assert_eq!(
        recorder.pixels(texture.handle()).unwrap(),
        vec![128, 64, 0, 128, 0, 0, 0, 0, 200, 100, 50, 255]
    );

    let image = DecodedImage {
        dimensions: Vector2::new(1, 1),
        pixels: vec![255, 255, 255, 0],
    };

    let texture = Texture::create_from_image(&mut video, image, false).unwrap();
    assert_eq!(recorder.pixels(texture.handle()).unwrap(), vec![0, 0, 0, 0]);
}

#[test]
fn blur_passes() {
    let (mut video, recorder) = device(Vector2::new(800, 600));
    let target = Texture::create_render_target(&mut video, Vector2::new(256, 256), true).unwrap();
    video.begin_frame().unwrap();
    recorder.clear();

    target.blur(&mut video, 6.5).unwrap();
    assert_eq!(recorder.draws(), 4);

    recorder.clear();
    target.blur(&mut video, 0.0).unwrap();
    assert_eq!(recorder.draws(), 0);

    recorder.clear();
    target.blur(&mut video, 6.0).unwrap();
    assert_eq!(recorder.draws(), 2);
}

#[test]
fn effects_swap_targets() {
    let (mut video, _) = device(Vector2::new(800, 600));
    let target = Texture::create_render_target(&mut video, Vector2::new(64, 32), false).unwrap();
    video.begin_frame().unwrap();

    let primary = target.handle();
    target.sepia(&mut video, Vector3::new(1.40, 1.10, 0.90), 0.0, 1.0).unwrap();
    let fx = target.handle();
    assert_ne!(primary, fx);
    assert_eq!(video.texture(fx).unwrap().dimensions, Vector2::new(64, 32));

    target.crt(&mut video).unwrap();
    assert_eq!(target.handle(), primary);

    target.cartoon(&mut video, Vector3::new(2.0, 5.0, 2.0)).unwrap();
    target.vignette(&mut video, 0.5).unwrap();
    assert_eq!(target.handle(), primary);
}

#[test]
fn effects_follow_bound_target() {
    let (mut video, _) = device(Vector2::new(800, 600));
    let target = Texture::create_render_target(&mut video, Vector2::new(64, 64), true).unwrap();
    video.begin_frame().unwrap();

    target.bind_render_target(&mut video).unwrap();
    target.sepia(&mut video, Vector3::new(1.40, 1.10, 0.90), 0.0, 1.0).unwrap();
    assert_eq!(
        *video.render_states().render_target.get(),
        Some(target.handle())
    );

    target.unbind_render_target(&mut video);
    target.bind(&mut video, 0);
    target.vignette(&mut video, 0.5).unwrap();
    assert_eq!(*video.render_states().textures[0].get(), Some(target.handle()));
    assert_eq!(*video.render_states().render_target.get(), None);
}

#[test]
fn effects_restore_states() {
    let (mut video, _) = device(Vector2::new(800, 600));
    let target = Texture::create_render_target(&mut video, Vector2::new(64, 64), false).unwrap();
    video.begin_frame().unwrap();
    video.render_states_mut().blend_mode.set(BlendMode::Add);

    target.vignette(&mut video, 0.5).unwrap();

    let s = video.render_states();
    assert_eq!(*s.blend_mode.get(), BlendMode::Add);
    assert_eq!(*s.render_target.get(), None);
    assert_eq!(*s.primitive_mode.get(), PrimitiveMode::TriangleList);
}

#[test]
fn effects_skip_plain_textures() {
    let (mut video, recorder) = device(Vector2::new(800, 600));
    let texture = Texture::create_dynamic(&mut video, Vector2::new(16, 16)).unwrap();
    video.begin_frame().unwrap();
    recorder.clear();

    texture.blur(&mut video, 10.0).unwrap();
    texture.sepia(&mut video, Vector3::new(1.0, 1.0, 1.0), 0.0, 1.0).unwrap();
    texture.crt(&mut video).unwrap();
    assert!(recorder.take().is_empty());
}

#[test]
fn screen_target_follows_window() {
    let (mut video, recorder) = device(Vector2::new(800, 600));
    let target = Texture::create_screen_render_target(&mut video, true).unwrap();
    assert_eq!(target.dimensions(), Vector2::new(800, 600));

    let old = target.handle();
    video.on_resize(Vector2::new(1024, 768)).unwrap();
    recorder.clear();

    target.bind_render_target(&mut video).unwrap();
    assert_eq!(target.dimensions(), Vector2::new(1024, 768));
    assert_ne!(target.handle(), old);
    assert!(video.texture(old).is_none());
    assert_eq!(
        *video.render_states().render_target.get(),
        Some(target.handle())
    );

    // Primary and fx objects are both recreated.
    assert_eq!(recorder.count(|v| match *v {
        Call::CreateTexture(_, _) => true,
        _ => false,
    }), 2);

    target.unbind_render_target(&mut video);
    assert_eq!(*video.render_states().render_target.get(), None);
}

#[test]
fn clear_render_target_keeps_binding() {
    let (mut video, recorder) = device(Vector2::new(800, 600));
    let target = Texture::create_render_target(&mut video, Vector2::new(32, 32), false).unwrap();
    video.begin_frame().unwrap();
    recorder.clear();

    target.clear_render_target(&mut video, Color::white()).unwrap();
    assert!(recorder.calls().contains(&Call::BindRenderTarget(Some(target.handle()))));
    assert!(recorder.calls().contains(&Call::Clear));
    assert_eq!(*video.render_states().render_target.get(), None);
}

#[test]
fn set_data() {
    let (mut video, recorder) = device(Vector2::new(800, 600));
    let texture = Texture::create_dynamic(&mut video, Vector2::new(2, 2)).unwrap();
    recorder.clear();

    texture.set_data(&mut video, &[0; 16]).unwrap();
    assert_eq!(recorder.take(), vec![Call::UpdateTexture(texture.handle(), 16)]);
    assert!(texture.set_data(&mut video, &[0; 4]).is_err());
}

#[test]
#[should_panic]
fn set_data_on_static_texture() {
    let (mut video, _) = device(Vector2::new(800, 600));
    let texture =
        Texture::create_from_data(&mut video, &[255; 16], Vector2::new(2, 2), false).unwrap();
    let _ = texture.set_data(&mut video, &[0; 16]);
}

#[test]
#[should_panic]
fn bind_plain_texture_as_target() {
    let (mut video, _) = device(Vector2::new(800, 600));
    let texture = Texture::create_dynamic(&mut video, Vector2::new(2, 2)).unwrap();
    let _ = texture.bind_render_target(&mut video);
}

#[test]
#[should_panic]
fn bind_slot_out_of_range() {
    let (mut video, _) = device(Vector2::new(800, 600));
    let texture = Texture::create_dynamic(&mut video, Vector2::new(2, 2)).unwrap();
    texture.bind(&mut video, 8);
}
