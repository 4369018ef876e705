use crate::errors::*;
use crate::math::prelude::Vector2;

use super::super::events::WindowEvent;
use super::Visitor;

/// A window that only exists in memory. Resizing it reports a `Resized` event on the
/// next poll.
pub struct HeadlessVisitor {
    dimensions: Vector2<u32>,
    pending: Vec<WindowEvent>,
}

impl HeadlessVisitor {
    pub fn new(dimensions: Vector2<u32>) -> Self {
        HeadlessVisitor {
            dimensions,
            pending: Vec::new(),
        }
    }
}

impl Visitor for HeadlessVisitor {
    #[inline]
    fn dimensions(&self) -> Vector2<u32> {
        self.dimensions
    }

    #[inline]
    fn device_pixel_ratio(&self) -> f32 {
        1.0
    }

    fn resize(&mut self, dimensions: Vector2<u32>) {
        if self.dimensions != dimensions {
            self.dimensions = dimensions;
            self.pending
                .push(WindowEvent::Resized(dimensions.x, dimensions.y));
        }
    }

    #[inline]
    fn poll_events(&mut self, events: &mut Vec<WindowEvent>) {
        events.extend(self.pending.drain(..));
    }

    #[inline]
    fn make_current(&self) -> Result<()> {
        Ok(())
    }

    #[inline]
    fn swap_buffers(&self) -> Result<()> {
        Ok(())
    }
}
