//! Every tunable of the diorama, gathered once at startup.
//!
//! Units: angles in degrees where noted, animation rates in radians per frame,
//! distances and sizes in world units, viewport sizes in logical pixels.

use std::path::PathBuf;

use glam::Vec3;
use log::LevelFilter;

use crate::core::{Blending, Color};
use crate::DisplayTarget;

#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    /// Vertical field of view, degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub look_at: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 60.0,
            near: 1.0,
            far: 1000.0,
            position: Vec3::new(100.0, 20.0, 30.0),
            look_at: Vec3::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    pub background: Color,
    pub width: usize,
    pub height: usize,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            background: Color::from_hex_u32(0x000000),
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointMaterialConfig {
    /// Sprite edge, world units (size attenuation on) or pixels (off).
    pub size: f32,
    pub blending: Blending,
    pub size_attenuation: bool,
    pub depth_write: bool,
}

impl Default for PointMaterialConfig {
    fn default() -> Self {
        Self {
            size: 1.0,
            blending: Blending::Additive,
            size_attenuation: true,
            depth_write: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLightConfig {
    pub color: Color,
    pub intensity: f32,
    /// The light shines from here toward the origin.
    pub position: Vec3,
}

impl Default for DirectionalLightConfig {
    fn default() -> Self {
        Self {
            color: Color::from_hex_u32(0xffffff),
            intensity: 1.1,
            position: Vec3::new(1.0, 0.0, 1.0),
        }
    }
}

/// A textured sphere.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyConfig {
    pub name: String,
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    /// Image path relative to the asset directory.
    pub texture: String,
    /// Rotation added to the body's own Euler angles each frame, radians.
    pub spin: Vec3,
}

impl BodyConfig {
    pub fn earth() -> Self {
        Self {
            name: "earth".to_string(),
            radius: 10.0,
            width_segments: 30,
            height_segments: 30,
            texture: "earthmap.jpg".to_string(),
            spin: Vec3::new(0.0, 0.0040, 0.0),
        }
    }

    pub fn moon() -> Self {
        Self {
            name: "moon".to_string(),
            radius: 2.5,
            width_segments: 30,
            height_segments: 30,
            texture: "moonmap.jpg".to_string(),
            spin: Vec3::ZERO,
        }
    }
}

/// The Moon rides at a fixed offset inside a pivot group; spinning the group
/// sweeps the Moon around a circle.
#[derive(Debug, Clone, PartialEq)]
pub struct MoonConfig {
    pub body: BodyConfig,
    /// Moon position relative to the pivot.
    pub offset: Vec3,
    /// Rotation added to the pivot each frame, radians.
    pub pivot_spin: Vec3,
}

impl Default for MoonConfig {
    fn default() -> Self {
        Self {
            body: BodyConfig::moon(),
            offset: Vec3::new(50.0, 0.0, 0.0),
            pivot_spin: Vec3::new(0.0, 0.0030, 0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StarFieldConfig {
    /// Nominal star count.
    pub count: usize,
    /// Generate `count + 1` stars, matching the classic inclusive `0..=count` loop.
    pub inclusive_bound: bool,
    /// Edge of the cube the stars are scattered through, centered on the origin.
    pub spread: f32,
    /// Rotation added to the whole field each frame, radians.
    pub spin: Vec3,
}

impl StarFieldConfig {
    pub fn point_count(&self) -> usize {
        if self.inclusive_bound {
            self.count + 1
        } else {
            self.count
        }
    }
}

impl Default for StarFieldConfig {
    fn default() -> Self {
        Self {
            count: 10_000,
            inclusive_bound: true,
            spread: 1000.0,
            spin: Vec3::new(0.0005, 0.0005, 0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitConfig {
    pub min_distance: f32,
    pub max_distance: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            min_distance: 30.0,
            max_distance: 800.0,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
        }
    }
}

/// How far the animation advances per displayed frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationClock {
    /// One fixed step per frame, whatever the refresh rate.
    PerFrame,
    /// Steps scaled by elapsed wall time, one step per `1 / reference_fps` seconds.
    Elapsed { reference_fps: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct HostConfig {
    pub target: DisplayTarget,
    pub title: String,
    pub target_fps: usize,
    pub assets: PathBuf,
    pub seed: Option<u64>,
    pub log_level: LevelFilter,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            target: DisplayTarget::Window,
            title: "orbit diorama".to_string(),
            target_fps: 60,
            assets: PathBuf::from("assets"),
            seed: None,
            log_level: LevelFilter::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DioramaConfig {
    pub camera: CameraConfig,
    pub renderer: RendererConfig,
    pub points: PointMaterialConfig,
    pub light: DirectionalLightConfig,
    pub earth: BodyConfig,
    pub moon: MoonConfig,
    pub stars: StarFieldConfig,
    pub orbit: OrbitConfig,
    pub clock: AnimationClock,
    pub host: HostConfig,
}

impl Default for DioramaConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            renderer: RendererConfig::default(),
            points: PointMaterialConfig::default(),
            light: DirectionalLightConfig::default(),
            earth: BodyConfig::earth(),
            moon: MoonConfig::default(),
            stars: StarFieldConfig::default(),
            orbit: OrbitConfig::default(),
            clock: AnimationClock::PerFrame,
            host: HostConfig::default(),
        }
    }
}
