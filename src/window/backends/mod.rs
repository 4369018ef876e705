pub mod headless;

#[cfg(feature = "glutin")]
mod glutin;

use crate::errors::*;
use crate::math::prelude::Vector2;

use super::events::WindowEvent;
use super::WindowParams;

pub trait Visitor {
    fn dimensions(&self) -> Vector2<u32>;
    fn device_pixel_ratio(&self) -> f32;
    fn resize(&mut self, dimensions: Vector2<u32>);
    fn poll_events(&mut self, events: &mut Vec<WindowEvent>);
    fn make_current(&self) -> Result<()>;
    fn swap_buffers(&self) -> Result<()>;
}

pub fn new_headless(dimensions: Vector2<u32>) -> Box<dyn Visitor> {
    Box::new(self::headless::HeadlessVisitor::new(dimensions))
}

#[cfg(feature = "glutin")]
pub fn new(params: WindowParams) -> Result<Box<dyn Visitor>> {
    let visitor = self::glutin::GlutinVisitor::from(params)?;
    Ok(Box::new(visitor))
}

#[cfg(not(feature = "glutin"))]
pub fn new(params: WindowParams) -> Result<Box<dyn Visitor>> {
    bail!(
        "Can not create window `{}` without a windowing backend, enable the `glutin` feature.",
        params.title
    );
}
