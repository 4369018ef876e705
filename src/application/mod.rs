//! A unified application model.
//!
//! ## Application
//!
//! To hide trivial platform-specific details, we offers a convenient trait `Application`
//! which defines a simple application-state-model. While the engine runs, the associated
//! per-frame methods are called in a pre-determined order.
//!
//! # Engine
//!
//! `Engine` is where we actully running the main loop and fire `Application` instance. Each
//! frame it:
//!
//! 1. waits for the frame budget of `EngineParams`;
//! 2. polls window events, forwarding resizes to the video system;
//! 3. calls `Application::on_update` with the elapsed seconds;
//! 4. calls `Application::on_render` between `begin_frame` and `end_frame`;
//! 5. presents the frame.

pub mod engine;
pub mod settings;
pub mod time;

pub mod prelude {
    pub use super::engine::{Context, Engine};
    pub use super::settings::{EngineParams, Settings};
    pub use super::time::TimeSystem;
    pub use super::Application;
}

use crate::errors::*;
use crate::video::prelude::FrameInfo;

use self::engine::Context;

/// `Application` is a user-friendly facade to building application, which defines a number
/// of event functions that get executed in a pre-determined order.
pub trait Application {
    /// `Application::on_update` is called every frame with the elapsed seconds. Its the main
    /// workhorse function for frame updates.
    fn on_update(&mut self, _: &mut Context, _dt: f32) -> Result<()> {
        Ok(())
    }

    /// `Application::on_render` is called between the beginning and the end of a frame.
    fn on_render(&mut self, _: &mut Context) -> Result<()> {
        Ok(())
    }

    /// `Application::on_post_render` is called after the frame has been presented.
    fn on_post_render(&mut self, _: &mut Context, _: &FrameInfo) -> Result<()> {
        Ok(())
    }

    /// `Application::on_exit` is called when exiting.
    fn on_exit(&mut self, _: &mut Context) -> Result<()> {
        Ok(())
    }
}
