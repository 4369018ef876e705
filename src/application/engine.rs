use crate::errors::*;
use crate::math::prelude::Vector2;
use crate::video::prelude::VideoSystem;
use crate::window::prelude::{WindowEvent, WindowSystem};

use super::settings::Settings;
use super::time::{self, TimeSystem};
use super::Application;

/// The sub-systems an `Application` works with.
pub struct Context {
    pub window: WindowSystem,
    pub video: VideoSystem,
    shutdown: bool,
}

impl Context {
    /// Shutdown the whole application at the end of this frame.
    #[inline]
    pub fn shutdown(&mut self) {
        self.shutdown = true;
    }

    /// Returns true if we are going to shutdown the application at the end of this frame.
    #[inline]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown
    }
}

/// `Engine` is the root object of the game application. It binds the window and video
/// systems in a central place and takes take of the execution order of each frame.
pub struct Engine {
    context: Context,
    time: TimeSystem,
    frames: u64,
}

impl Engine {
    /// Setup engine with specified settings. Failing to create the window or the video
    /// device is fatal.
    pub fn new(settings: &Settings) -> Result<Self> {
        let window = if settings.headless {
            WindowSystem::headless(settings.window.size)
        } else {
            WindowSystem::new(settings.window.clone())?
        };

        window.make_current()?;

        let dimensions = window.dimensions();
        let video = if settings.headless {
            VideoSystem::headless(settings.video.clone(), dimensions)?
        } else {
            Engine::create_video(settings, dimensions)?
        };

        info!(
            "Engine started with a {}x{} {} surface.",
            dimensions.x,
            dimensions.y,
            if settings.headless { "headless" } else { "native" }
        );

        Ok(Engine {
            context: Context {
                window,
                video,
                shutdown: false,
            },
            time: TimeSystem::new(settings.engine),
            frames: 0,
        })
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn create_video(settings: &Settings, dimensions: Vector2<u32>) -> Result<VideoSystem> {
        Ok(VideoSystem::new(settings.video.clone(), dimensions)?)
    }

    #[cfg(target_arch = "wasm32")]
    fn create_video(_: &Settings, _: Vector2<u32>) -> Result<VideoSystem> {
        bail!("There is no native video backend on this platform.");
    }

    #[inline]
    pub fn context(&self) -> &Context {
        &self.context
    }

    #[inline]
    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    #[inline]
    pub fn time(&self) -> &TimeSystem {
        &self.time
    }

    #[inline]
    pub fn time_mut(&mut self) -> &mut TimeSystem {
        &mut self.time
    }

    /// The number of frames presented so far.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Runs one frame. Returns false once the application has been shutdown, in which
    /// case `Application::on_exit` has been called and nothing was rendered.
    pub fn advance<T: Application>(&mut self, application: &mut T) -> Result<bool> {
        let dt = self.time.advance(self.context.window.is_focused());

        let events = self.context.window.poll_events().to_vec();
        for v in events {
            match v {
                WindowEvent::Resized(w, h) => self.context.video.on_resize(Vector2::new(w, h))?,
                WindowEvent::Closed => self.context.shutdown(),
                WindowEvent::GainFocus | WindowEvent::LostFocus => {}
            }
        }

        if self.context.is_shutdown() {
            application.on_exit(&mut self.context)?;
            return Ok(false);
        }

        application.on_update(&mut self.context, time::duration_to_secs(dt))?;

        self.context.video.begin_frame()?;
        application.on_render(&mut self.context)?;
        let info = self.context.video.end_frame()?;
        self.context.window.swap_buffers()?;

        application.on_post_render(&mut self.context, &info)?;
        self.frames += 1;
        Ok(true)
    }

    /// Run the main loop of `Engine`, this will block the working
    /// thread until the application shuts down or the window is closed.
    pub fn run<T: Application>(mut self, mut application: T) -> Result<Self> {
        while self.advance(&mut application)? {}
        info!("Engine stopped after {} frames.", self.frames);
        Ok(self)
    }
}

