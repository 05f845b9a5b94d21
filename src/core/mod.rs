pub mod camera;
pub mod color;
pub mod geometry;
pub mod light;
pub mod material;
pub mod scene;
pub mod sprite;
pub mod texture;
pub mod transform;

pub use camera::Camera;
pub use color::Color;
pub use light::{DirectionalLight, Lambert, LightingModel, Unlit};
pub use material::{Blending, PointsMaterial, StandardMaterial, TextureSlot};
pub use scene::{Entity, NodeId, NodeKind, Scene};
pub use sprite::StarSprite;
pub use texture::{Texture, TextureFilter};
pub use transform::Transform;
