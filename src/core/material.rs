use std::cell::RefCell;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use std::sync::Arc;

use crate::core::{Color, Texture};

/// A texture reference shared between materials and the loader that fills it.
///
/// Empty until an asynchronous load resolves; materials sample whatever is in the
/// slot at draw time, so a completed load shows up on the next frame.
pub type TextureSlot = Rc<RefCell<Option<Arc<Texture>>>>;

pub fn empty_slot() -> TextureSlot {
    Rc::new(RefCell::new(None))
}

pub fn filled_slot(texture: Texture) -> TextureSlot {
    Rc::new(RefCell::new(Some(Arc::new(texture))))
}

/// How a fragment combines with what is already in the color buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Blending {
    /// Overwrite the destination.
    #[default]
    Normal,
    /// Add source to destination, saturating.
    Additive,
}

/// Lit surface material for meshes: base color times an optional diffuse map.
#[derive(Debug, Clone)]
pub struct StandardMaterial {
    pub name: String,
    pub color: Color,
    pub map: TextureSlot,
}

impl StandardMaterial {
    pub fn new(name: &str, map: TextureSlot) -> Self {
        Self {
            name: name.to_string(),
            color: Color::WHITE,
            map,
        }
    }

    pub fn is_textured(&self) -> bool {
        self.map.borrow().is_some()
    }

    /// Surface color at `uv` before lighting.
    pub fn albedo(&self, uv: glam::Vec2) -> Color {
        match self.map.borrow().as_ref() {
            Some(tex) => tex.sample(uv).modulate(&self.color),
            None => self.color,
        }
    }
}

impl Display for StandardMaterial {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "StandardMaterial {} (textured: {})",
            self.name,
            self.is_textured()
        )
    }
}

/// Material for point clouds. Every point is drawn as a square sprite.
#[derive(Debug, Clone)]
pub struct PointsMaterial {
    pub color: Color,
    /// Sprite edge in world units when attenuated, in pixels otherwise.
    pub size: f32,
    pub map: TextureSlot,
    pub blending: Blending,
    /// Shrink sprites with distance from the camera.
    pub size_attenuation: bool,
    pub depth_write: bool,
}

impl Default for PointsMaterial {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            size: 1.0,
            map: empty_slot(),
            blending: Blending::Normal,
            size_attenuation: true,
            depth_write: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use image::{Rgba, RgbaImage};

    #[test]
    fn untextured_material_uses_base_color() {
        let mat = StandardMaterial::new("earth", empty_slot());
        assert!(!mat.is_textured());
        assert_eq!(mat.albedo(Vec2::new(0.3, 0.3)), Color::WHITE);
    }

    #[test]
    fn filling_the_slot_retextures_existing_material() {
        let slot = empty_slot();
        let mat = StandardMaterial::new("moon", Rc::clone(&slot));

        let img = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255]));
        *slot.borrow_mut() = Some(Arc::new(Texture::from_rgba(&img, "red")));

        assert!(mat.is_textured());
        assert_eq!(mat.albedo(Vec2::new(0.5, 0.5)), Color::RED);
    }
}
