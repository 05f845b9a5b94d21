//! Orbit camera controller: drag to swing around the target, scroll to zoom.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::config::OrbitConfig;
use crate::core::Camera;

const POLAR_EPS: f32 = 1e-6;

/// Camera offset from the target in spherical coordinates, Y up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    /// Angle from +Y.
    pub phi: f32,
    /// Angle around Y, measured from +Z toward +X.
    pub theta: f32,
}

impl Spherical {
    pub fn from_offset(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self {
                radius: 0.0,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
            theta: v.x.atan2(v.z),
        }
    }

    pub fn to_offset(&self) -> Vec3 {
        let sin_phi_r = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_r * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_r * self.theta.cos(),
        )
    }
}

pub struct OrbitControls {
    pub target: Vec3,
    pub min_distance: f32,
    pub max_distance: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,

    spherical: Spherical,
    pending_theta: f32,
    pending_phi: f32,
    pending_scale: f32,
}

impl OrbitControls {
    /// Attach to `camera` and apply the distance limits right away.
    pub fn attach(camera: &mut Camera, config: &OrbitConfig) -> Self {
        let mut controls = Self {
            target: camera.target,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            spherical: Spherical::from_offset(camera.position - camera.target),
            pending_theta: 0.0,
            pending_phi: 0.0,
            pending_scale: 1.0,
        };
        controls.update(camera);
        controls
    }

    /// Pointer drag of `(dx, dy)` pixels over a surface `viewport_height` pixels tall.
    /// A drag across the full height swings the camera once around.
    pub fn drag(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let h = viewport_height.max(1.0);
        self.pending_theta -= TAU * dx / h * self.rotate_speed;
        self.pending_phi -= TAU * dy / h * self.rotate_speed;
    }

    /// Scroll by `steps` notches; positive zooms in.
    pub fn zoom(&mut self, steps: f32) {
        let per_step = 0.95f32.powf(self.zoom_speed);
        self.pending_scale *= per_step.powf(steps);
    }

    /// Fold pending input into the orbit and move the camera. Returns whether the
    /// camera moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let before = camera.position;

        self.spherical.theta = (self.spherical.theta + self.pending_theta).rem_euclid(TAU);
        self.spherical.phi =
            (self.spherical.phi + self.pending_phi).clamp(POLAR_EPS, PI - POLAR_EPS);
        self.spherical.radius = (self.spherical.radius * self.pending_scale)
            .clamp(self.min_distance, self.max_distance);

        self.pending_theta = 0.0;
        self.pending_phi = 0.0;
        self.pending_scale = 1.0;

        camera.set_position(self.target + self.spherical.to_offset());
        camera.look_at(self.target);

        camera.position != before
    }

    pub fn distance(&self) -> f32 {
        self.spherical.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera() -> Camera {
        let mut cam = Camera::new(60.0, 1.0, 1.0, 1000.0);
        cam.set_position(Vec3::new(100.0, 20.0, 30.0));
        cam.look_at(Vec3::ZERO);
        cam
    }

    #[test]
    fn attaching_keeps_an_in_range_camera_in_place() {
        let mut cam = camera();
        let controls = OrbitControls::attach(&mut cam, &OrbitConfig::default());
        assert_relative_eq!(cam.position.x, 100.0, epsilon = 1e-3);
        assert_relative_eq!(cam.position.y, 20.0, epsilon = 1e-3);
        assert_relative_eq!(cam.position.z, 30.0, epsilon = 1e-3);
        assert_relative_eq!(controls.distance(), 11300f32.sqrt(), epsilon = 1e-3);
    }

    #[test]
    fn zoom_is_clamped_whatever_the_input() {
        let mut cam = camera();
        let mut controls = OrbitControls::attach(&mut cam, &OrbitConfig::default());

        controls.zoom(10_000.0);
        controls.update(&mut cam);
        assert_relative_eq!(cam.distance(), 30.0, epsilon = 1e-3);

        controls.zoom(-10_000.0);
        controls.update(&mut cam);
        assert_relative_eq!(cam.distance(), 800.0, epsilon = 1e-2);

        for steps in [3.0, -7.0, 0.5, 120.0, -0.25] {
            controls.zoom(steps);
            controls.update(&mut cam);
            assert!((30.0 - 1e-3..=800.0 + 1e-2).contains(&cam.distance()));
        }
    }

    #[test]
    fn drag_orbits_at_constant_distance() {
        let mut cam = camera();
        let mut controls = OrbitControls::attach(&mut cam, &OrbitConfig::default());
        let d = cam.distance();

        controls.drag(150.0, -40.0, 600.0);
        assert!(controls.update(&mut cam));
        assert_relative_eq!(cam.distance(), d, epsilon = 1e-3);
        assert_eq!(cam.target, Vec3::ZERO);
    }

    #[test]
    fn vertical_drag_stops_at_the_poles() {
        let mut cam = camera();
        let mut controls = OrbitControls::attach(&mut cam, &OrbitConfig::default());
        controls.drag(0.0, 100_000.0, 600.0);
        controls.update(&mut cam);
        // dragging down lifts the camera over the top, but never past it
        assert!(cam.position.x.abs() + cam.position.z.abs() > 0.0);
        assert!(cam.position.y > 0.0);
        assert_relative_eq!(cam.distance(), controls.distance(), epsilon = 1e-3);
    }

    #[test]
    fn spherical_round_trip() {
        let v = Vec3::new(-3.0, 4.0, 12.0);
        let back = Spherical::from_offset(v).to_offset();
        assert!((back - v).length() < 1e-4);
    }
}
