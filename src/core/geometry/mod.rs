mod mesh;
mod points;

pub use mesh::{Mesh, Tri, Vertex};
pub use points::{generate_star_positions, PointCloud, POSITION_STRIDE};
