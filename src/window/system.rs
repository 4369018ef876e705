use crate::errors::*;
use crate::math::prelude::Vector2;

use super::backends::{self, Visitor};
use super::events::WindowEvent;
use super::WindowParams;

/// Represents an OpenGL context and the window or environment around it.
pub struct WindowSystem {
    visitor: Box<dyn Visitor>,
    events: Vec<WindowEvent>,
    focused: bool,
    close_requested: bool,
}

impl WindowSystem {
    /// Creates a new `WindowSystem` and initalize OpenGL context.
    pub fn new(params: WindowParams) -> Result<Self> {
        Ok(WindowSystem::from_visitor(backends::new(params)?))
    }

    /// Creates a new `WindowSystem` with headless context.
    pub fn headless(dimensions: Vector2<u32>) -> Self {
        WindowSystem::from_visitor(backends::new_headless(dimensions))
    }

    pub fn from_visitor(visitor: Box<dyn Visitor>) -> Self {
        WindowSystem {
            visitor,
            events: Vec::new(),
            focused: true,
            close_requested: false,
        }
    }

    /// Polls the events of this frame and returns them. Events of the previous frame
    /// are discarded.
    pub fn poll_events(&mut self) -> &[WindowEvent] {
        self.events.clear();
        self.visitor.poll_events(&mut self.events);

        for v in &self.events {
            match *v {
                WindowEvent::Closed => self.close_requested = true,
                WindowEvent::GainFocus => self.focused = true,
                WindowEvent::LostFocus => self.focused = false,
                WindowEvent::Resized(_, _) => {}
            }
        }

        &self.events
    }

    /// The events returned by the last `poll_events`.
    #[inline]
    pub fn events(&self) -> &[WindowEvent] {
        &self.events
    }

    #[inline]
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    #[inline]
    pub fn is_close_requested(&self) -> bool {
        self.close_requested
    }

    /// Set the context as the active context in this thread.
    #[inline]
    pub fn make_current(&self) -> Result<()> {
        self.visitor.make_current()
    }

    /// Swaps the buffers in case of double or triple buffering.
    ///
    /// **Warning**: if you enabled vsync, this function will block until the next time the screen
    /// is refreshed.
    #[inline]
    pub fn swap_buffers(&self) -> Result<()> {
        self.visitor.swap_buffers()
    }

    /// Returns the size in pixels of the client area of the window.
    #[inline]
    pub fn dimensions(&self) -> Vector2<u32> {
        self.visitor.dimensions()
    }

    /// Returns the ratio between the backing framebuffer resolution and the window size in
    /// screen pixels. This is typically one for a normal display and two for a retina display.
    #[inline]
    pub fn device_pixel_ratio(&self) -> f32 {
        self.visitor.device_pixel_ratio()
    }

    /// Resize the GL context.
    #[inline]
    pub fn resize(&mut self, dimensions: Vector2<u32>) {
        self.visitor.resize(dimensions);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn headless() {
        let mut window = WindowSystem::headless(Vector2::new(800, 600));
        assert_eq!(window.dimensions(), Vector2::new(800, 600));
        assert!(window.poll_events().is_empty());

        window.resize(Vector2::new(1024, 768));
        window.resize(Vector2::new(1024, 768));
        assert_eq!(window.poll_events(), &[WindowEvent::Resized(1024, 768)]);
        assert_eq!(window.dimensions(), Vector2::new(1024, 768));
        assert!(window.poll_events().is_empty());
        assert!(window.is_focused());
        assert!(!window.is_close_requested());
    }
}
