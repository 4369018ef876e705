//! Functions for loading game settings.

use std::fs;
use std::path::Path;

use crate::errors::*;
use crate::video::prelude::VideoParams;
use crate::window::WindowParams;

/// A structure containing configuration data for the game engine, which are
/// used to specify hardware setup stuff to create the window and other
/// context information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub engine: EngineParams,
    pub window: WindowParams,
    pub video: VideoParams,
    pub headless: bool,
}

impl Settings {
    /// Parses settings from JSON. Missing fields keep their defaults.
    pub fn from_json(source: &str) -> Result<Self> {
        let settings = serde_json::from_str(source).context("Malformed settings.")?;
        Ok(settings)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)
            .with_context(|_| format!("Failed to read settings from {}.", path.display()))?;

        Settings::from_json(&source)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineParams {
    /// If fps goes lower than this, the timestep is clamped and time appears to slow.
    pub min_fps: u32,
    /// The loop sleeps if fps is higher than this. 0 means unlimited.
    pub max_fps: u32,
    /// Like `max_fps`, while the window does not have input focus.
    pub max_inactive_fps: u32,
    /// How many frames to average for timestep smoothing.
    pub time_smooth_step: u32,
}

impl Default for EngineParams {
    fn default() -> Self {
        EngineParams {
            min_fps: 0,
            max_fps: 60,
            max_inactive_fps: 20,
            time_smooth_step: 0,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::prelude::Vector2;

    #[test]
    fn json() {
        let settings = Settings::from_json(
            r#"{
                "headless": true,
                "window": { "title": "Sample", "size": [1024, 768] },
                "engine": { "max_fps": 0 },
                "video": { "sprite_batch_capacity": 16 }
            }"#,
        )
        .unwrap();

        assert!(settings.headless);
        assert_eq!(settings.window.title, "Sample");
        assert_eq!(settings.window.size, Vector2::new(1024, 768));
        assert_eq!(settings.window.vsync, WindowParams::default().vsync);
        assert_eq!(settings.engine.max_fps, 0);
        assert_eq!(settings.engine.max_inactive_fps, 20);
        assert_eq!(settings.video.sprite_batch_capacity, 16);

        assert_eq!(Settings::from_json("{}").unwrap(), Settings::default());
        assert!(Settings::from_json("{").is_err());
    }
}
