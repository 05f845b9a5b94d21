use crate::core::Color;
use glam::Vec3;

/// A light infinitely far away: constant direction, no attenuation.
#[derive(Clone, Debug)]
pub struct DirectionalLight {
    /// The light's color.
    pub color: Color,
    /// A scalar multiplier for the light's strength.
    pub intensity: f32,
    /// Where the light sits. Only the direction from `position` to `target` matters.
    pub position: Vec3,
    pub target: Vec3,
}

impl DirectionalLight {
    pub fn new(color: Color, intensity: f32, position: Vec3) -> Self {
        Self {
            color,
            intensity,
            position,
            target: Vec3::ZERO,
        }
    }

    /// Unit vector from a lit surface toward the light.
    pub fn to_light(&self) -> Vec3 {
        (self.position - self.target).normalize_or_zero()
    }

    /// Light color already scaled by intensity.
    pub fn radiance(&self) -> Color {
        self.color.scale(self.intensity)
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        DirectionalLight::new(Color::WHITE, 1.0, Vec3::Y)
    }
}

pub trait LightingModel {
    /// Computes the final color for a fragment given the scene's lights.
    ///
    /// - `normal`: the world-space surface normal (should be normalized).
    /// - `albedo`: the surface color before lighting.
    fn shade(&self, normal: Vec3, albedo: Color, lights: &[&DirectionalLight]) -> Color;
}

/// Diffuse only. Faces turned away from every light are black, there is no ambient term.
pub struct Lambert;

impl LightingModel for Lambert {
    fn shade(&self, normal: Vec3, albedo: Color, lights: &[&DirectionalLight]) -> Color {
        let mut final_color = Color::BLACK;
        for light in lights {
            let diff = normal.dot(light.to_light()).max(0.0);
            let term = albedo.modulate(&light.radiance()).scale(diff);
            final_color = Color::new(
                final_color.r + term.r,
                final_color.g + term.g,
                final_color.b + term.b,
            );
        }
        final_color.clamped()
    }
}

/// Ignores lights entirely (sprites, debugging).
pub struct Unlit;

impl LightingModel for Unlit {
    fn shade(&self, _normal: Vec3, albedo: Color, _lights: &[&DirectionalLight]) -> Color {
        albedo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sun() -> DirectionalLight {
        DirectionalLight::new(Color::WHITE, 1.1, Vec3::new(1.0, 0.0, 1.0))
    }

    #[test]
    fn light_points_from_origin_toward_position() {
        let dir = sun().to_light();
        assert_relative_eq!(dir.x, std::f32::consts::FRAC_1_SQRT_2, epsilon = 1e-6);
        assert_relative_eq!(dir.y, 0.0);
        assert_relative_eq!(dir.z, std::f32::consts::FRAC_1_SQRT_2, epsilon = 1e-6);
    }

    #[test]
    fn facing_light_is_brightest_and_back_is_black() {
        let light = sun();
        let lights = [&light];
        let albedo = Color::new(0.5, 0.5, 0.5);

        let lit = Lambert.shade(light.to_light(), albedo, &lights);
        assert_relative_eq!(lit.r, 0.55, epsilon = 1e-5);

        let dark = Lambert.shade(-light.to_light(), albedo, &lights);
        assert_eq!(dark, Color::BLACK);
    }

    #[test]
    fn shading_saturates() {
        let light = sun();
        let lit = Lambert.shade(light.to_light(), Color::WHITE, &[&light]);
        assert_eq!(lit, Color::WHITE);
    }
}
