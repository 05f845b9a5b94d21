use glam::{Vec2, Vec3, Vec4};

#[derive(Clone, Debug)]
pub struct ClipVertex {
    pub position: Vec4,
    pub uv: Vec2,
    pub normal: Vec3, // world space
}

impl ClipVertex {
    pub fn lerp(&self, other: &ClipVertex, t: f32) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            uv: self.uv.lerp(other.uv, t),
            normal: self.normal.lerp(other.normal, t),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClipTriangle {
    pub vertices: [ClipVertex; 3],
}

pub struct Clipper {
    backface_culling: bool,
    frustum_planes: [Vec4; 6],
}

impl Clipper {
    pub fn new() -> Self {
        Self {
            backface_culling: true,
            frustum_planes: [Vec4::ZERO; 6],
        }
    }

    pub fn update_frustum_planes(&mut self, planes: &[Vec4; 6]) {
        self.frustum_planes = *planes;
    }

    pub fn set_backface_culling(&mut self, enabled: bool) {
        self.backface_culling = enabled;
    }

    pub fn clip_triangle(&self, triangle: &ClipTriangle) -> Vec<ClipTriangle> {
        if self.is_degenerate(triangle) {
            return Vec::new();
        }

        let mut triangles = vec![triangle.clone()];
        for plane in &self.frustum_planes {
            triangles = self.clip_against_plane(triangles, *plane);
            if triangles.is_empty() {
                break;
            }
        }

        // Facing is only meaningful once every vertex is in front of the eye
        if self.backface_culling {
            triangles.retain(|t| self.is_front_facing(t));
        }
        triangles
    }

    fn is_degenerate(&self, triangle: &ClipTriangle) -> bool {
        let epsilon = 1e-12;
        for i in 0..3 {
            let j = (i + 1) % 3;
            let diff = triangle.vertices[i].position - triangle.vertices[j].position;
            if diff.length_squared() < epsilon {
                return true;
            }
        }
        false
    }

    /// Counter-clockwise in NDC (y up) is front facing.
    fn is_front_facing(&self, tri: &ClipTriangle) -> bool {
        let [v0, v1, v2] = [
            &tri.vertices[0].position,
            &tri.vertices[1].position,
            &tri.vertices[2].position,
        ];
        let a = Vec2::new(v0.x / v0.w, v0.y / v0.w);
        let b = Vec2::new(v1.x / v1.w, v1.y / v1.w);
        let c = Vec2::new(v2.x / v2.w, v2.y / v2.w);

        (b - a).perp_dot(c - a) > 0.0
    }

    fn clip_against_plane(&self, triangles: Vec<ClipTriangle>, plane: Vec4) -> Vec<ClipTriangle> {
        let mut result = Vec::new();

        for triangle in triangles {
            let distances = [
                plane.dot(triangle.vertices[0].position),
                plane.dot(triangle.vertices[1].position),
                plane.dot(triangle.vertices[2].position),
            ];

            let inside_count = distances.iter().filter(|&&d| d >= 0.0).count();

            match inside_count {
                0 => continue,              // Triangle is completely outside
                3 => result.push(triangle), // Triangle is completely inside
                _ => result.extend(self.clip_triangle_against_plane(triangle, distances)),
            }
        }

        result
    }

    /// Sutherland-Hodgman against one plane, then fan the polygon back into triangles.
    fn clip_triangle_against_plane(
        &self,
        triangle: ClipTriangle,
        distances: [f32; 3],
    ) -> Vec<ClipTriangle> {
        let mut new_verts = Vec::with_capacity(4);
        for i in 0..3 {
            let j = (i + 1) % 3;

            let v0 = &triangle.vertices[i];
            let v1 = &triangle.vertices[j];
            let d0 = distances[i];
            let d1 = distances[j];

            if d0 >= 0.0 {
                new_verts.push(v0.clone());
            }

            if (d0 < 0.0) != (d1 < 0.0) {
                let t = d0 / (d0 - d1);
                new_verts.push(v0.lerp(v1, t));
            }
        }

        let mut result = Vec::new();
        for i in 1..new_verts.len().saturating_sub(1) {
            result.push(ClipTriangle {
                vertices: [
                    new_verts[0].clone(),
                    new_verts[i].clone(),
                    new_verts[i + 1].clone(),
                ],
            });
        }
        result
    }
}

impl Default for Clipper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Camera;

    fn vert(x: f32, y: f32, z: f32, w: f32) -> ClipVertex {
        ClipVertex {
            position: Vec4::new(x, y, z, w),
            uv: Vec2::ZERO,
            normal: Vec3::Z,
        }
    }

    fn clipper() -> Clipper {
        let mut c = Clipper::new();
        c.update_frustum_planes(&Camera::new(60.0, 1.0, 1.0, 100.0).frustum_planes());
        c
    }

    #[test]
    fn inside_triangle_passes_untouched() {
        let tri = ClipTriangle {
            vertices: [
                vert(-0.5, -0.5, 0.0, 1.0),
                vert(0.5, -0.5, 0.0, 1.0),
                vert(0.0, 0.5, 0.0, 1.0),
            ],
        };
        assert_eq!(clipper().clip_triangle(&tri).len(), 1);
    }

    #[test]
    fn clockwise_triangle_is_culled() {
        let tri = ClipTriangle {
            vertices: [
                vert(-0.5, -0.5, 0.0, 1.0),
                vert(0.0, 0.5, 0.0, 1.0),
                vert(0.5, -0.5, 0.0, 1.0),
            ],
        };
        assert!(clipper().clip_triangle(&tri).is_empty());
        let mut c = clipper();
        c.set_backface_culling(false);
        assert_eq!(c.clip_triangle(&tri).len(), 1);
    }

    #[test]
    fn straddling_triangle_is_split_inside_frustum() {
        let tri = ClipTriangle {
            vertices: [
                vert(-0.5, -0.5, 0.0, 1.0),
                vert(3.0, -0.5, 0.0, 1.0),
                vert(0.0, 0.5, 0.0, 1.0),
            ],
        };
        let out = clipper().clip_triangle(&tri);
        assert!(!out.is_empty());
        for t in &out {
            for v in &t.vertices {
                assert!(v.position.x <= v.position.w + 1e-5);
            }
        }
    }

    #[test]
    fn triangle_behind_camera_is_dropped() {
        let tri = ClipTriangle {
            vertices: [
                vert(-0.5, -0.5, -3.0, -1.0),
                vert(0.5, -0.5, -3.0, -1.0),
                vert(0.0, 0.5, -3.0, -1.0),
            ],
        };
        assert!(clipper().clip_triangle(&tri).is_empty());
    }
}
