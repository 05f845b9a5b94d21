//! Builds the Earth / Moon / stars scene and the camera that looks at it.

use glam::Vec3;
use log::info;
use rand::Rng;

use crate::config::{BodyConfig, DioramaConfig};
use crate::core::geometry::{generate_star_positions, Mesh, PointCloud};
use crate::core::material::filled_slot;
use crate::core::{
    Camera, DirectionalLight, Entity, NodeId, NodeKind, PointsMaterial, Scene, StandardMaterial,
    StarSprite, Transform,
};
use crate::loader::TextureLoader;

/// Handles to the nodes the frame loop animates, plus the light.
#[derive(Debug, Clone, Copy)]
pub struct DioramaNodes {
    pub earth: NodeId,
    pub moon_pivot: NodeId,
    pub moon: NodeId,
    pub stars: NodeId,
    pub light: NodeId,
}

/// A node that turns by a fixed Euler step per animation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spin {
    pub node: NodeId,
    /// Radians per step around X, Y and Z.
    pub rate: Vec3,
}

pub struct Diorama {
    pub scene: Scene,
    pub camera: Camera,
    pub nodes: DioramaNodes,
    pub spins: Vec<Spin>,
}

impl Diorama {
    /// Assemble the scene. Surface images are requested from `loader` and arrive
    /// later; until then the spheres draw with their plain base color.
    pub fn build<R: Rng + ?Sized>(
        config: &DioramaConfig,
        loader: &mut TextureLoader,
        rng: &mut R,
    ) -> Self {
        let mut scene = Scene::new();

        let earth = scene.add(body_entity(&config.earth, loader));

        let moon_pivot = scene.add(Entity::new("moon_pivot", NodeKind::Group));
        let moon = scene.add_child(
            moon_pivot,
            body_entity(&config.moon.body, loader)
                .with_transform(Transform::from_translation(config.moon.offset)),
        );

        let stars_cfg = &config.stars;
        let positions = generate_star_positions(rng, stars_cfg.point_count(), stars_cfg.spread);
        let points = &config.points;
        let stars = scene.add(Entity::new(
            "stars",
            NodeKind::Points {
                cloud: PointCloud::from_positions(positions),
                material: PointsMaterial {
                    size: points.size,
                    map: filled_slot(StarSprite::generate().texture()),
                    blending: points.blending,
                    size_attenuation: points.size_attenuation,
                    depth_write: points.depth_write,
                    ..PointsMaterial::default()
                },
            },
        ));

        let light_cfg = &config.light;
        let light = scene.add(Entity::new(
            "sun",
            NodeKind::Light(DirectionalLight::new(
                light_cfg.color,
                light_cfg.intensity,
                light_cfg.position,
            )),
        ));

        let cam_cfg = &config.camera;
        let aspect = config.renderer.width as f32 / config.renderer.height.max(1) as f32;
        let mut camera = Camera::new(cam_cfg.fov, aspect, cam_cfg.near, cam_cfg.far);
        camera.set_position(cam_cfg.position);
        camera.look_at(cam_cfg.look_at);

        let spins = vec![
            Spin {
                node: earth,
                rate: config.earth.spin,
            },
            Spin {
                node: moon_pivot,
                rate: config.moon.pivot_spin,
            },
            Spin {
                node: moon,
                rate: config.moon.body.spin,
            },
            Spin {
                node: stars,
                rate: stars_cfg.spin,
            },
        ]
        .into_iter()
        .filter(|s| s.rate != Vec3::ZERO)
        .collect();

        info!(
            "Built diorama: {} nodes, {} stars, camera at {:?}",
            scene.len(),
            stars_cfg.point_count(),
            camera.position
        );

        Self {
            scene,
            camera,
            nodes: DioramaNodes {
                earth,
                moon_pivot,
                moon,
                stars,
                light,
            },
            spins,
        }
    }
}

fn body_entity(body: &BodyConfig, loader: &mut TextureLoader) -> Entity {
    let map = loader.load(&body.texture);
    Entity::new(
        &body.name,
        NodeKind::Mesh {
            mesh: Mesh::sphere(body.radius, body.width_segments, body.height_segments),
            material: StandardMaterial::new(&body.name, map),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Blending;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn build() -> (Diorama, TextureLoader) {
        let mut loader = TextureLoader::with_base_path("no-such-asset-dir");
        let diorama = Diorama::build(
            &DioramaConfig::default(),
            &mut loader,
            &mut StdRng::seed_from_u64(42),
        );
        (diorama, loader)
    }

    #[test]
    fn scene_holds_one_of_each_object() {
        let (d, _) = build();
        let scene = &d.scene;
        assert_eq!(scene.count_kind(|k| matches!(k, NodeKind::Mesh { .. })), 2);
        assert_eq!(scene.count_kind(|k| matches!(k, NodeKind::Points { .. })), 1);
        assert_eq!(scene.count_kind(|k| matches!(k, NodeKind::Light(_))), 1);
        assert_eq!(scene.count_kind(|k| matches!(k, NodeKind::Group)), 1);
        assert_eq!(scene.get(d.nodes.moon).parent(), Some(d.nodes.moon_pivot));
        assert_eq!(scene.roots().count(), 4);
    }

    #[test]
    fn star_buffer_has_inclusive_count_inside_cube() {
        let (d, _) = build();
        let NodeKind::Points { cloud, material } = &d.scene.get(d.nodes.stars).kind else {
            panic!("stars node is not a point cloud");
        };
        assert_eq!(cloud.positions.len(), 10_001 * 3);
        assert!(cloud.positions.iter().all(|c| (-500.0..=500.0).contains(c)));
        assert_eq!(material.blending, Blending::Additive);
        assert!(!material.depth_write);
        assert!(material.map.borrow().is_some());
    }

    #[test]
    fn moon_sits_fifty_units_out() {
        let (d, _) = build();
        let p = d.scene.world_matrix(d.nodes.moon).transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(50.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn camera_matches_configuration() {
        let (d, _) = build();
        assert_eq!(d.camera.position, Vec3::new(100.0, 20.0, 30.0));
        assert_eq!(d.camera.target, Vec3::ZERO);
        assert_eq!(d.camera.fov, 60.0);
    }

    #[test]
    fn build_does_not_wait_for_images() {
        let (d, mut loader) = build();
        let NodeKind::Mesh { material, .. } = &d.scene.get(d.nodes.earth).kind else {
            panic!("earth node is not a mesh");
        };
        assert_eq!(loader.pending(), 2);
        let report = loader.wait_all();
        assert_eq!(report.failed.len(), 2);
        assert!(!material.is_textured());
    }

    #[test]
    fn only_moving_nodes_spin() {
        let (d, _) = build();
        let nodes: Vec<_> = d.spins.iter().map(|s| s.node).collect();
        assert_eq!(nodes, vec![d.nodes.earth, d.nodes.moon_pivot, d.nodes.stars]);
    }
}
