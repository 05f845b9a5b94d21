use glam::{Vec2, Vec3};
use std::f32::consts::PI;

#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub pos: Vec3,  // Position in model space
    pub norm: Vec3, // Unit normal in model space
    pub uv: Vec2,   // Texture coordinates, (0, 0) bottom-left
}

#[derive(Debug, Clone, Copy)]
pub struct Tri {
    pub vertices: [usize; 3], // Indices into the vertex buffer, counter-clockwise when front facing
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>, // Vertex buffer
    pub tris: Vec<Tri>,        // Triangles
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// UV sphere around the origin with the Y axis through the poles.
    ///
    /// Builds a `(width_segments + 1) x (height_segments + 1)` vertex grid so the
    /// seam and the poles get their own texture coordinates; the degenerate
    /// triangles touching the poles are skipped.
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let width_segments = width_segments.max(3) as usize;
        let height_segments = height_segments.max(2) as usize;

        let mut mesh = Mesh::new();
        let mut grid: Vec<Vec<usize>> = Vec::with_capacity(height_segments + 1);

        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            let theta = v * PI;

            // Pole vertices sit in the middle of their segment
            let u_offset = if iy == 0 {
                0.5 / width_segments as f32
            } else if iy == height_segments {
                -0.5 / width_segments as f32
            } else {
                0.0
            };

            let mut row = Vec::with_capacity(width_segments + 1);
            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                let phi = u * 2.0 * PI;

                let pos = Vec3::new(
                    -radius * phi.cos() * theta.sin(),
                    radius * theta.cos(),
                    radius * phi.sin() * theta.sin(),
                );

                row.push(mesh.vertices.len());
                mesh.vertices.push(Vertex {
                    pos,
                    norm: pos.normalize_or_zero(),
                    uv: Vec2::new(u + u_offset, 1.0 - v),
                });
            }
            grid.push(row);
        }

        for iy in 0..height_segments {
            for ix in 0..width_segments {
                let a = grid[iy][ix + 1];
                let b = grid[iy][ix];
                let c = grid[iy + 1][ix];
                let d = grid[iy + 1][ix + 1];

                if iy != 0 {
                    mesh.tris.push(Tri { vertices: [a, b, d] });
                }
                if iy != height_segments - 1 {
                    mesh.tris.push(Tri { vertices: [b, c, d] });
                }
            }
        }

        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_counts_match_segment_grid() {
        let mesh = Mesh::sphere(10.0, 30, 30);
        assert_eq!(mesh.vertices.len(), 31 * 31);
        assert_eq!(mesh.tris.len(), 30 * (2 * 30 - 2));
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let mesh = Mesh::sphere(2.5, 30, 30);
        for v in &mesh.vertices {
            assert!((v.pos.length() - 2.5).abs() < 1e-4);
            // pole vertices are nudged half a segment along u
            let half_segment = 0.5 / 30.0 + 1e-6;
            assert!(v.uv.x >= -half_segment && v.uv.x <= 1.0 + half_segment);
            assert!(v.uv.y >= 0.0 && v.uv.y <= 1.0);
        }
    }

    #[test]
    fn sphere_triangles_face_outward() {
        let mesh = Mesh::sphere(10.0, 30, 30);
        for tri in &mesh.tris {
            let [a, b, c] = tri.vertices.map(|i| mesh.vertices[i].pos);
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0);
        }
    }
}
