use gl;
use glutin;
use glutin::GlContext;

use crate::errors::*;
use crate::math::prelude::Vector2;

use super::super::events::WindowEvent;
use super::super::WindowParams;
use super::Visitor;

pub struct GlutinVisitor {
    window: glutin::GlWindow,
    events_loop: glutin::EventsLoop,
}

impl GlutinVisitor {
    pub fn from(params: WindowParams) -> Result<Self> {
        let builder = glutin::WindowBuilder::new()
            .with_title(params.title)
            .with_dimensions(glutin::dpi::LogicalSize::new(
                f64::from(params.size.x),
                f64::from(params.size.y),
            ));

        let context = glutin::ContextBuilder::new()
            .with_multisampling(params.multisample)
            .with_gl_profile(glutin::GlProfile::Core)
            .with_gl(glutin::GlRequest::Latest)
            .with_vsync(params.vsync);

        let events_loop = glutin::EventsLoop::new();
        let window = glutin::GlWindow::new(builder, context, &events_loop)
            .map_err(|err| format_err!("Failed to create window. {}", err))?;

        let mut visitor = GlutinVisitor {
            window,
            events_loop,
        };

        visitor.events_loop.poll_events(|_| {});

        unsafe {
            visitor.window.make_current()?;
            gl::load_with(|symbol| visitor.window.get_proc_address(symbol) as *const _);
        }

        info!(
            "Window created with {:?} points, device pixel ratio {}.",
            params.size,
            visitor.device_pixel_ratio()
        );

        Ok(visitor)
    }
}

impl Visitor for GlutinVisitor {
    /// Returns the size of the framebuffer in pixels.
    fn dimensions(&self) -> Vector2<u32> {
        let dpr = self.device_pixel_ratio() as f64;
        match self.window.get_inner_size() {
            Some(size) => {
                let size = size.to_physical(dpr);
                Vector2::new(size.width as u32, size.height as u32)
            }
            None => Vector2::new(0, 0),
        }
    }

    #[inline]
    fn device_pixel_ratio(&self) -> f32 {
        self.window.get_hidpi_factor() as f32
    }

    #[inline]
    fn resize(&mut self, dimensions: Vector2<u32>) {
        let size = glutin::dpi::PhysicalSize::new(f64::from(dimensions.x), f64::from(dimensions.y));
        self.window.resize(size)
    }

    fn poll_events(&mut self, events: &mut Vec<WindowEvent>) {
        let dpr = self.device_pixel_ratio() as f64;
        self.events_loop.poll_events(|v| {
            if let glutin::Event::WindowEvent { event, .. } = v {
                match event {
                    glutin::WindowEvent::CloseRequested => events.push(WindowEvent::Closed),
                    glutin::WindowEvent::Focused(true) => events.push(WindowEvent::GainFocus),
                    glutin::WindowEvent::Focused(false) => events.push(WindowEvent::LostFocus),
                    glutin::WindowEvent::Resized(size) => {
                        let size = size.to_physical(dpr);
                        events.push(WindowEvent::Resized(size.width as u32, size.height as u32));
                    }
                    _ => {}
                }
            }
        });
    }

    #[inline]
    fn make_current(&self) -> Result<()> {
        unsafe {
            self.window.make_current()?;
            Ok(())
        }
    }

    #[inline]
    fn swap_buffers(&self) -> Result<()> {
        self.window.swap_buffers()?;
        Ok(())
    }
}
