//! Represents an OpenGL context and the window or environment around it.

pub mod backends;
pub mod events;
pub mod system;

pub mod prelude {
    pub use super::events::WindowEvent;
    pub use super::system::WindowSystem;
    pub use super::WindowParams;
}

use crate::math::prelude::Vector2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowParams {
    /// Sets the title of window.
    pub title: String,
    /// Sets the size in *points* of the client area of the window.
    pub size: Vector2<u32>,
    /// Sets the multisampling level to request. A value of 0 indicates that
    /// multisampling must not be enabled.
    pub multisample: u16,
    /// Specifies whether should we have vsync.
    pub vsync: bool,
}

impl Default for WindowParams {
    fn default() -> Self {
        WindowParams {
            title: "Window".to_owned(),
            size: Vector2::new(800, 600),
            multisample: 2,
            vsync: false,
        }
    }
}
