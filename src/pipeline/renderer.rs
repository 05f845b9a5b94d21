use glam::{Mat3, Vec4};
use log::debug;

use crate::core::{Blending, Camera, Color, DirectionalLight, Lambert, NodeKind, Scene};
use crate::debug_print;
use crate::util::format_mat4;

use super::{
    buffer::Buffer, rasterizer::Rasterizer, ClipTriangle, ClipVertex, Clipper, Fragment,
    PointSprite, ProcessedGeometry, Surface,
};

/// Counters for the last rendered frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    pub triangles: usize,
    pub points: usize,
    pub fragments: usize,
}

/// Draws a [`Scene`] through a [`Camera`] into a pair of swapped buffers.
///
/// Width and height are logical; the buffers hold `size * pixel_ratio` pixels.
/// Each frame:
/// 1. Clear the back buffer
/// 2. Transform mesh triangles to clip space and clip them against the frustum
/// 3. Rasterize and shade them, then write the fragments with depth testing
/// 4. Expand point clouds into sprites and blend them over the meshes
/// 5. Swap, leaving the finished frame in the front buffer
pub struct Renderer<B: Buffer> {
    width: usize,
    height: usize,
    pixel_ratio: f32,
    clear_color: Color,
    front_buffer: B,
    back_buffer: B,
    clipper: Clipper,
    rasterizer: Rasterizer,
    lighting: Lambert,
    geometry: Vec<ProcessedGeometry>,
    surfaces: Vec<Surface>,
    fragments: Vec<Fragment>,
    stats: RenderStats,
}

impl<B: Buffer> Renderer<B> {
    pub fn new(width: usize, height: usize, pixel_ratio: f32, clear_color: Color) -> Self {
        let pixel_ratio = sanitize_ratio(pixel_ratio);
        let (dw, dh) = drawing_size(width, height, pixel_ratio);
        Self {
            width,
            height,
            pixel_ratio,
            clear_color,
            front_buffer: B::new(dw, dh),
            back_buffer: B::new(dw, dh),
            clipper: Clipper::new(),
            rasterizer: Rasterizer::new(dw, dh),
            lighting: Lambert,
            geometry: Vec::with_capacity(4096),
            surfaces: Vec::new(),
            fragments: Vec::with_capacity(4096),
            stats: RenderStats::default(),
        }
    }

    /// Logical size.
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Buffer size in device pixels.
    pub fn drawing_size(&self) -> (usize, usize) {
        drawing_size(self.width, self.height, self.pixel_ratio)
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    pub fn set_backface_culling(&mut self, enabled: bool) {
        self.clipper.set_backface_culling(enabled);
    }

    pub fn set_pixel_ratio(&mut self, ratio: f32) {
        let ratio = sanitize_ratio(ratio);
        if ratio == self.pixel_ratio {
            return;
        }
        self.pixel_ratio = ratio;
        self.reallocate();
    }

    /// Resize the output. Returns false, touching nothing, when the size is unchanged.
    pub fn set_size(&mut self, width: usize, height: usize) -> bool {
        if (width, height) == (self.width, self.height) {
            return false;
        }
        self.width = width;
        self.height = height;
        self.reallocate();
        true
    }

    fn reallocate(&mut self) {
        let (dw, dh) = self.drawing_size();
        if (dw, dh) == (self.back_buffer.width(), self.back_buffer.height()) {
            return;
        }
        debug!(
            "Reallocating buffers: {}x{} logical at ratio {} -> {}x{}",
            self.width, self.height, self.pixel_ratio, dw, dh
        );
        self.front_buffer.resize(dw, dh);
        self.back_buffer.resize(dw, dh);
        self.front_buffer.clear(self.clear_color);
        self.rasterizer.set_size(dw, dh);
    }

    /// The last finished frame.
    pub fn front_buffer(&self) -> &B {
        &self.front_buffer
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    pub fn render(&mut self, scene: &Scene, camera: &Camera) -> RenderStats {
        self.stats = RenderStats::default();
        self.back_buffer.clear(self.clear_color);

        let lights: Vec<DirectionalLight> = scene.lights().into_iter().cloned().collect();
        let light_refs: Vec<&DirectionalLight> = lights.iter().collect();

        self.process_geometry(scene, camera);
        self.rasterizer.rasterize(
            &self.geometry,
            &self.surfaces,
            &light_refs,
            &self.lighting,
            &mut self.fragments,
        );
        self.stats.triangles = self.geometry.len();
        self.process_fragments();

        // Points after meshes so opaque surfaces hide the stars behind them
        self.process_points(scene, camera);

        std::mem::swap(&mut self.front_buffer, &mut self.back_buffer);
        self.stats
    }

    fn process_geometry(&mut self, scene: &Scene, camera: &Camera) {
        let view_proj = camera.view_projection();
        self.clipper.update_frustum_planes(&camera.frustum_planes());
        self.geometry.clear();
        self.surfaces.clear();

        debug_print!(
            "{}",
            format_mat4("Camera View-Projection Matrix", &view_proj)
        );

        for (id, entity) in scene.iter() {
            let NodeKind::Mesh { mesh, material } = &entity.kind else {
                continue;
            };
            let world = scene.world_matrix(id);
            let mvp = view_proj * world;
            let normal_matrix = Mat3::from_mat4(world).inverse().transpose();

            let surface = self.surfaces.len();
            self.surfaces.push(Surface {
                color: material.color,
                map: material.map.borrow().clone(),
            });

            for tri in &mesh.tris {
                let clip_verts = tri.vertices.map(|i| {
                    let v = &mesh.vertices[i];
                    ClipVertex {
                        position: mvp * Vec4::from((v.pos, 1.0)),
                        uv: v.uv,
                        normal: normal_matrix * v.norm,
                    }
                });

                let clipped = self.clipper.clip_triangle(&ClipTriangle {
                    vertices: clip_verts,
                });
                self.geometry
                    .extend(clipped.into_iter().map(|t| ProcessedGeometry {
                        vertices: t.vertices,
                        surface,
                    }));
            }
        }
    }

    fn process_points(&mut self, scene: &Scene, camera: &Camera) {
        let view_proj = camera.view_projection();
        let (_, drawing_height) = self.drawing_size();

        for (id, entity) in scene.iter() {
            let NodeKind::Points { cloud, material } = &entity.kind else {
                continue;
            };
            let mvp = view_proj * scene.world_matrix(id);
            let clip: Vec<Vec4> = cloud.iter().map(|p| mvp * Vec4::from((p, 1.0))).collect();

            let sprite = PointSprite {
                color: material.color,
                size: if material.size_attenuation {
                    material.size * drawing_height as f32 * 0.5
                } else {
                    material.size * self.pixel_ratio
                },
                attenuate: material.size_attenuation,
                map: material.map.borrow().clone(),
                blending: material.blending,
                depth_write: material.depth_write,
            };

            self.rasterizer
                .rasterize_points(&clip, &sprite, &mut self.fragments);
            self.stats.points += cloud.len();
            self.process_fragments();
        }
    }

    /// Normal fragments replace what they pass the depth test against; additive
    /// ones add onto it and only write depth if asked to.
    fn process_fragments(&mut self) {
        let buffer = &mut self.back_buffer;
        for fragment in &self.fragments {
            let pos = (
                fragment.screen_pos.x as usize,
                fragment.screen_pos.y as usize,
            );
            match fragment.blending {
                Blending::Normal => buffer.set_pixel(pos, &fragment.depth, fragment.color),
                Blending::Additive => buffer.blend_pixel(
                    pos,
                    &fragment.depth,
                    fragment.color,
                    fragment.depth_write,
                ),
            }
        }
        self.stats.fragments += self.fragments.len();
    }
}

fn sanitize_ratio(ratio: f32) -> f32 {
    if ratio.is_finite() && ratio > 0.0 {
        ratio
    } else {
        1.0
    }
}

fn drawing_size(width: usize, height: usize, ratio: f32) -> (usize, usize) {
    (
        (width as f32 * ratio).floor() as usize,
        (height as f32 * ratio).floor() as usize,
    )
}
