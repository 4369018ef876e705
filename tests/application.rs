use failure::format_err;
use pastel::prelude::*;

struct Sample {
    updates: u32,
    renders: u32,
    exited: bool,
    last_draw_calls: u32,
}

impl Application for Sample {
    fn on_update(&mut self, ctx: &mut Context, dt: f32) -> Result<()> {
        assert!(dt >= 0.0);
        self.updates += 1;

        if self.updates == 2 {
            ctx.window.resize(Vector2::new(320, 240));
        }

        if self.updates == 3 {
            assert_eq!(ctx.video.true_resolution(), Vector2::new(320, 240));
        }

        if self.updates == 4 {
            ctx.shutdown();
        }

        Ok(())
    }

    fn on_render(&mut self, ctx: &mut Context) -> Result<()> {
        assert!(ctx.video.is_in_frame());
        ctx.video.clear(Color::black())?;
        ctx.video.draw(3)?;
        self.renders += 1;
        Ok(())
    }

    fn on_post_render(&mut self, _: &mut Context, info: &FrameInfo) -> Result<()> {
        self.last_draw_calls = info.draw_calls;
        Ok(())
    }

    fn on_exit(&mut self, _: &mut Context) -> Result<()> {
        self.exited = true;
        Ok(())
    }
}

fn settings() -> Settings {
    let _ = env_logger::try_init();
    Settings::from_json(
        r#"{
            "headless": true,
            "window": { "size": [640, 480] },
            "engine": { "max_fps": 0, "max_inactive_fps": 0 }
        }"#,
    )
    .unwrap()
}

#[test]
fn frame_loop() {
    let engine = Engine::new(&settings()).unwrap();
    assert_eq!(engine.context().video.true_resolution(), Vector2::new(640, 480));

    let mut app = Sample {
        updates: 0,
        renders: 0,
        exited: false,
        last_draw_calls: 0,
    };

    let mut engine = engine;
    while engine.advance(&mut app).unwrap() {}

    // The frame which requested the shutdown is still rendered.
    assert_eq!(app.updates, 4);
    assert_eq!(app.renders, 4);
    assert_eq!(engine.frames(), 4);
    assert!(app.exited);
    assert_eq!(app.last_draw_calls, 1);
}

#[test]
fn run_until_shutdown() {
    struct Once;
    impl Application for Once {
        fn on_update(&mut self, ctx: &mut Context, _: f32) -> Result<()> {
            ctx.shutdown();
            Ok(())
        }
    }

    let engine = Engine::new(&settings()).unwrap().run(Once).unwrap();
    assert_eq!(engine.frames(), 1);
    assert!(engine.context().is_shutdown());
}

#[test]
fn errors_stop_the_loop() {
    struct Failing;
    impl Application for Failing {
        fn on_update(&mut self, _: &mut Context, _: f32) -> Result<()> {
            Err(format_err!("boom"))
        }
    }

    let engine = Engine::new(&settings()).unwrap();
    assert!(engine.run(Failing).is_err());
}

#[cfg(not(feature = "glutin"))]
#[test]
fn native_window_requires_backend() {
    assert!(Engine::new(&Settings::default()).is_err());
}
