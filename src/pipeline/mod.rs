//! The software renderer: clip-space geometry in, shaded pixels out.

use glam::Vec2;

use crate::core::{Blending, Color};

pub mod buffer;
pub mod clipper;
pub mod rasterizer;
pub mod renderer;

pub use buffer::{Buffer, FrameBuffer, TermBuffer};
pub use clipper::{ClipTriangle, ClipVertex, Clipper};
pub use rasterizer::{PointSprite, Rasterizer, Surface};
pub use renderer::{RenderStats, Renderer};

/// A clipped triangle ready for rasterization.
#[derive(Clone, Debug)]
pub struct ProcessedGeometry {
    pub vertices: [ClipVertex; 3],
    /// Index into the frame's surface list
    pub surface: usize,
}

#[derive(Clone, Debug)]
pub struct Fragment {
    /// Pixel center in buffer coordinates, y down
    pub screen_pos: Vec2,
    pub depth: f32,
    pub color: Color,
    pub blending: Blending,
    pub depth_write: bool,
}

impl Default for Fragment {
    fn default() -> Self {
        Self {
            screen_pos: Vec2::ZERO,
            depth: f32::INFINITY,
            color: Color::WHITE,
            blending: Blending::Normal,
            depth_write: true,
        }
    }
}
