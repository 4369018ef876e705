use std::rc::Rc;

use pastel::prelude::*;
use pastel::video::backends::headless::HeadlessVisitor;

const FONT: &str = r#"info face="Mono" size=16
common lineHeight=16 base=12 scaleW=64 scaleH=64 pages=1 packed=0
page id=0 file="mono.png"
chars count=2
char id=97 x=0 y=0 width=8 height=12 xoffset=0 yoffset=2 xadvance=10 page=0 chnl=15
char id=98 x=8 y=0 width=8 height=12 xoffset=1 yoffset=2 xadvance=6 page=0 chnl=15
kernings count=0
"#;

fn setup() -> (VideoSystem, SpriteBatch, Font) {
    let _ = env_logger::try_init();
    let (visitor, _) = HeadlessVisitor::recorded();
    let mut video =
        VideoSystem::from_visitor(Box::new(visitor), VideoParams::default(), Vector2::new(800, 600))
            .unwrap();

    let batch = SpriteBatch::new(&mut video).unwrap();
    let page = Rc::new(
        Texture::create_from_data(&mut video, &[255; 64 * 64 * 4], Vector2::new(64, 64), false)
            .unwrap(),
    );

    let mut font = Font::parse(FONT).unwrap();
    font.load_pages(|file| {
        assert_eq!(file, "mono.png");
        Ok(page.clone())
    })
    .unwrap();

    (video, batch, font)
}

#[test]
fn draw_aligned() {
    let (_video, mut batch, font) = setup();
    assert_eq!(font.measure("ab\na"), Vector2::new(16.0, 32.0));

    batch.begin();
    let pos = Vector2::new(100.0, 50.0);
    let rect = font.draw("ab", pos, Color::white(), Align::TopLeft, &mut batch);
    assert_eq!(rect, Rect::with_size(100, 50, 16, 16));
    assert_eq!(batch.len(), 2);

    let rect = font.draw("ab", pos, Color::white(), Align::Center, &mut batch);
    assert_eq!(rect, Rect::with_size(92, 42, 16, 16));

    let rect = font.draw("ab\na", pos, Color::white(), Align::BottomRight, &mut batch);
    assert_eq!(rect, Rect::with_size(84, 18, 16, 32));
    assert_eq!(batch.len(), 7);
}

#[test]
fn unknown_glyphs() {
    let (_video, mut batch, font) = setup();
    assert_eq!(font.measure("a?b"), Vector2::new(16.0, 16.0));

    batch.begin();
    font.draw("a?b", Vector2::new(0.0, 0.0), Color::white(), Align::TopLeft, &mut batch);
    assert_eq!(batch.len(), 2);
}

#[test]
fn missing_page() {
    let mut font = Font::parse(FONT).unwrap();
    let result = font.load_pages(|_| Err("not found".to_owned()));
    assert_eq!(
        result,
        Err(FontError::Page("mono.png".to_owned(), "not found".to_owned()))
    );
}
