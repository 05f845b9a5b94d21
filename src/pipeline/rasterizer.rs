use std::sync::Arc;

use glam::{Vec2, Vec3, Vec4};
use rayon::prelude::*;

use crate::core::{Blending, Color, DirectionalLight, LightingModel, Texture};
use crate::debug_print;
use crate::pipeline::{ClipVertex, Fragment, ProcessedGeometry};

/// Everything the rasterizer needs to color one mesh, detached from the scene
/// so it can be shared across worker threads.
#[derive(Clone, Debug)]
pub struct Surface {
    pub color: Color,
    pub map: Option<Arc<Texture>>,
}

impl Surface {
    fn albedo(&self, uv: Vec2) -> Color {
        match &self.map {
            Some(tex) => tex.sample(uv).modulate(&self.color),
            None => self.color,
        }
    }
}

/// Per-draw state of a point cloud.
#[derive(Clone, Debug)]
pub struct PointSprite {
    pub color: Color,
    /// Edge length in pixels, at view depth 1 when `attenuate` is set.
    pub size: f32,
    pub attenuate: bool,
    pub map: Option<Arc<Texture>>,
    pub blending: Blending,
    pub depth_write: bool,
}

pub struct Rasterizer {
    width: usize,
    height: usize,
}

impl Rasterizer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn set_size(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    /// Shade every clipped triangle. Modifies the fragment buffer in place.
    pub fn rasterize<L: LightingModel + Sync>(
        &self,
        geometry: &[ProcessedGeometry],
        surfaces: &[Surface],
        lights: &[&DirectionalLight],
        lighting: &L,
        frags: &mut Vec<Fragment>,
    ) {
        frags.clear();
        if self.width == 0 || self.height == 0 {
            return;
        }
        debug_print!("Processing {} geometries", geometry.len());

        *frags = geometry
            .par_iter()
            .flat_map_iter(|geo| {
                let surface = &surfaces[geo.surface];
                self.rasterize_triangle_barycentric(&geo.vertices, surface, lights, lighting)
            })
            .collect();

        debug_print!("Generated {} fragments", frags.len());
    }

    /// Expand clip-space point centers into square sprite fragments. Points whose
    /// center falls outside the view volume are dropped whole.
    pub fn rasterize_points(&self, points: &[Vec4], sprite: &PointSprite, frags: &mut Vec<Fragment>) {
        frags.clear();
        if self.width == 0 || self.height == 0 {
            return;
        }

        *frags = points
            .par_iter()
            .filter(|p| is_inside_clip_volume(p))
            .flat_map_iter(|p| self.rasterize_sprite(*p, sprite))
            .collect();

        debug_print!("Generated {} point fragments", frags.len());
    }

    fn project_to_screen(&self, clip: Vec4) -> Vec3 {
        let ndc = clip.truncate() / clip.w;
        Vec3::new(
            (ndc.x + 1.0) * 0.5 * self.width as f32,
            (1.0 - ndc.y) * 0.5 * self.height as f32,
            ndc.z * 0.5 + 0.5,
        )
    }

    fn rasterize_triangle_barycentric<L: LightingModel>(
        &self,
        vertices: &[ClipVertex; 3],
        surface: &Surface,
        lights: &[&DirectionalLight],
        lighting: &L,
    ) -> Vec<Fragment> {
        let mut fragments = Vec::new();

        let screen = [
            self.project_to_screen(vertices[0].position),
            self.project_to_screen(vertices[1].position),
            self.project_to_screen(vertices[2].position),
        ];
        let inv_w = [
            1.0 / vertices[0].position.w,
            1.0 / vertices[1].position.w,
            1.0 / vertices[2].position.w,
        ];
        let (v0, v1, v2) = (screen[0].truncate(), screen[1].truncate(), screen[2].truncate());

        // Bounding box over pixel centers, clamped to the target
        let min = v0.min(v1).min(v2);
        let max = v0.max(v1).max(v2);
        let x_start = (min.x - 0.5).ceil().max(0.0) as usize;
        let y_start = (min.y - 0.5).ceil().max(0.0) as usize;
        let x_end = ((max.x - 0.5).floor() as i64).min(self.width as i64 - 1);
        let y_end = ((max.y - 0.5).floor() as i64).min(self.height as i64 - 1);
        if x_end < 0 || y_end < 0 {
            return fragments;
        }

        for y in y_start..=y_end as usize {
            for x in x_start..=x_end as usize {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let Some((w0, w1, w2)) = barycentric(p, v0, v1, v2) else {
                    return fragments;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * screen[0].z + w1 * screen[1].z + w2 * screen[2].z;

                // Perspective-correct attribute weights
                let pw = Vec3::new(w0 * inv_w[0], w1 * inv_w[1], w2 * inv_w[2]);
                let pw = pw / (pw.x + pw.y + pw.z);
                let uv = vertices[0].uv * pw.x + vertices[1].uv * pw.y + vertices[2].uv * pw.z;
                let normal = (vertices[0].normal * pw.x
                    + vertices[1].normal * pw.y
                    + vertices[2].normal * pw.z)
                    .normalize_or_zero();

                let color = lighting.shade(normal, surface.albedo(uv), lights);

                fragments.push(Fragment {
                    screen_pos: p,
                    depth,
                    color,
                    blending: Blending::Normal,
                    depth_write: true,
                });
            }
        }

        fragments
    }

    fn rasterize_sprite(&self, clip: Vec4, sprite: &PointSprite) -> Vec<Fragment> {
        let center = self.project_to_screen(clip);
        let size = if sprite.attenuate {
            sprite.size / clip.w
        } else {
            sprite.size
        }
        .max(1.0);

        let half = size * 0.5;
        let left = center.x - half;
        let top = center.y - half;
        let x_start = (left - 0.5).ceil().max(0.0) as usize;
        let y_start = (top - 0.5).ceil().max(0.0) as usize;
        let x_end = ((left + size - 0.5).ceil() as usize).min(self.width);
        let y_end = ((top + size - 0.5).ceil() as usize).min(self.height);

        let mut fragments = Vec::with_capacity((x_end.saturating_sub(x_start)) * 2);
        for y in y_start..y_end {
            for x in x_start..x_end {
                // Point coordinate, origin at the sprite's top left
                let pc = Vec2::new(
                    ((x as f32 + 0.5 - left) / size).clamp(0.0, 1.0),
                    ((y as f32 + 0.5 - top) / size).clamp(0.0, 1.0),
                );
                let texel = match &sprite.map {
                    Some(tex) => tex.sample(Vec2::new(pc.x, 1.0 - pc.y)),
                    None => Color::WHITE,
                };
                fragments.push(Fragment {
                    screen_pos: Vec2::new(x as f32 + 0.5, y as f32 + 0.5),
                    depth: center.z,
                    color: texel.modulate(&sprite.color),
                    blending: sprite.blending,
                    depth_write: sprite.depth_write,
                });
            }
        }
        fragments
    }
}

fn is_inside_clip_volume(p: &Vec4) -> bool {
    p.w > 0.0 && p.x.abs() <= p.w && p.y.abs() <= p.w && p.z.abs() <= p.w
}

fn barycentric(p: Vec2, v0: Vec2, v1: Vec2, v2: Vec2) -> Option<(f32, f32, f32)> {
    let denom = (v1.y - v2.y) * (v0.x - v2.x) + (v2.x - v1.x) * (v0.y - v2.y);
    if denom.abs() < 1e-10 {
        // Degenerate triangle
        return None;
    }
    let w0 = ((v1.y - v2.y) * (p.x - v2.x) + (v2.x - v1.x) * (p.y - v2.y)) / denom;
    let w1 = ((v2.y - v0.y) * (p.x - v2.x) + (v0.x - v2.x) * (p.y - v2.y)) / denom;
    let w2 = 1.0 - w0 - w1;
    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Lambert, Unlit};

    fn vert(x: f32, y: f32) -> ClipVertex {
        ClipVertex {
            position: Vec4::new(x, y, 0.0, 1.0),
            uv: Vec2::ZERO,
            normal: Vec3::Z,
        }
    }

    fn red() -> Vec<Surface> {
        vec![Surface {
            color: Color::RED,
            map: None,
        }]
    }

    #[test]
    fn full_screen_triangle_covers_its_half() {
        let raster = Rasterizer::new(10, 10);
        let geo = vec![ProcessedGeometry {
            vertices: [vert(-1.0, -1.0), vert(1.0, -1.0), vert(-1.0, 1.0)],
            surface: 0,
        }];
        let mut frags = Vec::new();
        raster.rasterize(&geo, &red(), &[], &Unlit, &mut frags);

        // lower-left half including the diagonal
        assert_eq!(frags.len(), 55);
        assert!(frags.iter().all(|f| f.color == Color::RED));
        assert!(frags.iter().all(|f| (f.depth - 0.5).abs() < 1e-6));
    }

    #[test]
    fn screen_y_points_down() {
        let raster = Rasterizer::new(10, 10);
        // a sliver along the top edge of NDC
        let geo = vec![ProcessedGeometry {
            vertices: [vert(-1.0, 0.8), vert(1.0, 0.8), vert(-1.0, 1.0)],
            surface: 0,
        }];
        let mut frags = Vec::new();
        raster.rasterize(&geo, &red(), &[], &Unlit, &mut frags);
        assert!(!frags.is_empty());
        assert!(frags.iter().all(|f| f.screen_pos.y < 1.0));
    }

    #[test]
    fn unlit_side_is_black_under_lambert() {
        let raster = Rasterizer::new(4, 4);
        let geo = vec![ProcessedGeometry {
            vertices: [vert(-1.0, -1.0), vert(1.0, -1.0), vert(-1.0, 1.0)],
            surface: 0,
        }];
        let light = DirectionalLight::new(Color::WHITE, 1.0, Vec3::NEG_Z);
        let mut frags = Vec::new();
        raster.rasterize(&geo, &red(), &[&light], &Lambert, &mut frags);
        assert!(frags.iter().all(|f| f.color == Color::BLACK));
    }

    #[test]
    fn sprites_shrink_with_distance() {
        let raster = Rasterizer::new(100, 100);
        let sprite = PointSprite {
            color: Color::WHITE,
            size: 40.0,
            attenuate: true,
            map: None,
            blending: Blending::Additive,
            depth_write: false,
        };
        let mut near = Vec::new();
        raster.rasterize_points(&[Vec4::new(0.0, 0.0, 0.0, 2.0)], &sprite, &mut near);
        let mut far = Vec::new();
        raster.rasterize_points(&[Vec4::new(0.0, 0.0, 0.0, 20.0)], &sprite, &mut far);

        assert_eq!(near.len(), 400);
        assert_eq!(far.len(), 4);
        assert!(near.iter().all(|f| f.blending == Blending::Additive && !f.depth_write));
    }

    #[test]
    fn tiny_sprites_still_cover_a_pixel() {
        let raster = Rasterizer::new(100, 100);
        let sprite = PointSprite {
            color: Color::WHITE,
            size: 1.0,
            attenuate: true,
            map: None,
            blending: Blending::Additive,
            depth_write: false,
        };
        let mut frags = Vec::new();
        raster.rasterize_points(&[Vec4::new(0.1, 0.1, 0.0, 500.0)], &sprite, &mut frags);
        assert_eq!(frags.len(), 1);
    }

    #[test]
    fn points_outside_the_view_are_dropped() {
        let raster = Rasterizer::new(100, 100);
        let sprite = PointSprite {
            color: Color::WHITE,
            size: 1.0,
            attenuate: false,
            map: None,
            blending: Blending::Additive,
            depth_write: false,
        };
        let mut frags = Vec::new();
        raster.rasterize_points(
            &[Vec4::new(0.0, 0.0, 0.0, -1.0), Vec4::new(3.0, 0.0, 0.0, 1.0)],
            &sprite,
            &mut frags,
        );
        assert!(frags.is_empty());
    }
}
