use crate::math::prelude::*;
use crate::video::prelude::{BlendMode, Filtering, SpriteBatch, TextureRef};

use super::component::Component;
use super::manager::Entity;

/// Draws a textured, or plain colored, quad at the world transform of its entity.
#[derive(Debug, Clone)]
pub struct SpriteComponent {
    pub texture: Option<TextureRef>,
    pub color: Color,
    /// Pivot relative to the size, `(0.5, 0.5)` is the center.
    pub origin: Vector2<f32>,
    /// Size in pixels. Defaults to the dimensions of texture.
    pub size: Option<Vector2<f32>>,
    pub blend_mode: BlendMode,
    pub filtering: Filtering,
    pub visible: bool,
}

impl Default for SpriteComponent {
    fn default() -> Self {
        SpriteComponent {
            texture: None,
            color: Color::white(),
            origin: Vector2::new(0.5, 0.5),
            size: None,
            blend_mode: BlendMode::PreMultiplied,
            filtering: Filtering::Linear,
            visible: true,
        }
    }
}

impl SpriteComponent {
    pub fn with_texture(texture: TextureRef) -> Self {
        SpriteComponent {
            texture: Some(texture),
            ..SpriteComponent::default()
        }
    }

    /// The size the sprite is drawn with.
    pub fn dimensions(&self) -> Vector2<f32> {
        match (self.size, self.texture.as_ref()) {
            (Some(size), _) => size,
            (None, Some(texture)) => {
                let dimensions = texture.dimensions();
                Vector2::new(dimensions.x as f32, dimensions.y as f32)
            }
            (None, None) => Vector2::new(1.0, 1.0),
        }
    }
}

impl Component for SpriteComponent {
    fn on_render(&mut self, _: Entity, world: &Matrix4<f32>, batch: &mut SpriteBatch) {
        if !self.visible {
            return;
        }

        batch.change_blend_mode(self.blend_mode);
        batch.change_filtering(self.filtering);

        let size = self.dimensions();
        let texture = self.texture.as_ref().map(|v| &**v);
        batch.draw_sprite_with_transform(texture, world, size, self.color, self.origin);
    }
}
