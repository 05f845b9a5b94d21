use glam::{Mat4, Vec3, Vec4};

/// Perspective camera. The projection matrix is cached and only rebuilt by
/// [`Camera::update_projection_matrix`], so callers that change `fov`, `aspect`,
/// `near` or `far` must call it afterwards.
#[derive(Debug, Clone)]
pub struct Camera {
    /// World position of the camera
    pub position: Vec3,
    /// The point the camera looks at
    pub target: Vec3,
    /// World up used to orient the view
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Viewport width / height
    pub aspect: f32,
    /// The near plane of the camera, anything closer than this will not be rendered
    pub near: f32,
    /// The far plane of the camera, anything beyond this will not be rendered
    pub far: f32,

    projection_matrix: Mat4,
}

impl Camera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut cam = Camera {
            position: Vec3::ZERO,
            target: Vec3::NEG_Z,
            up: Vec3::Y,
            fov,
            aspect,
            near,
            far,
            projection_matrix: Mat4::IDENTITY,
        };
        cam.update_projection_matrix();
        cam
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection_matrix =
            Mat4::perspective_rh_gl(self.fov.to_radians(), self.aspect, self.near, self.far);
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix()
    }

    /// Distance from the camera to what it looks at.
    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    /// Frustum planes in clip space (`dot(plane, v) >= 0` is inside), GL depth range.
    pub fn frustum_planes(&self) -> [Vec4; 6] {
        [
            Vec4::new(1.0, 0.0, 0.0, 1.0),  // left
            Vec4::new(-1.0, 0.0, 0.0, 1.0), // right
            Vec4::new(0.0, 1.0, 0.0, 1.0),  // bottom
            Vec4::new(0.0, -1.0, 0.0, 1.0), // top
            Vec4::new(0.0, 0.0, 1.0, 1.0),  // near
            Vec4::new(0.0, 0.0, -1.0, 1.0), // far
        ]
    }
}
