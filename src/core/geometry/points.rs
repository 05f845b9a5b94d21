use glam::Vec3;
use rand::Rng;

/// Number of floats per point in a position buffer (x, y, z).
pub const POSITION_STRIDE: usize = 3;

/// A cloud of unconnected points stored as a flat `x, y, z, x, y, z, ...` buffer.
#[derive(Debug, Clone, Default)]
pub struct PointCloud {
    pub positions: Vec<f32>,
}

impl PointCloud {
    pub fn from_positions(positions: Vec<f32>) -> Self {
        debug_assert_eq!(positions.len() % POSITION_STRIDE, 0);
        Self { positions }
    }

    pub fn len(&self) -> usize {
        self.positions.len() / POSITION_STRIDE
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn point(&self, i: usize) -> Vec3 {
        Vec3::from_slice(&self.positions[i * POSITION_STRIDE..(i + 1) * POSITION_STRIDE])
    }

    pub fn iter(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.positions
            .chunks_exact(POSITION_STRIDE)
            .map(Vec3::from_slice)
    }
}

/// Scatter `count` points uniformly through an axis-aligned cube of edge `spread`
/// centered on the origin. Each coordinate is drawn independently, so there is
/// no falloff and points may land anywhere, including near the origin.
pub fn generate_star_positions<R: Rng + ?Sized>(rng: &mut R, count: usize, spread: f32) -> Vec<f32> {
    let mut positions = Vec::with_capacity(count * POSITION_STRIDE);
    for _ in 0..count {
        let x = (rng.gen::<f32>() - 0.5) * spread;
        let y = (rng.gen::<f32>() - 0.5) * spread;
        let z = (rng.gen::<f32>() - 0.5) * spread;
        positions.extend_from_slice(&[x, y, z]);
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn positions_stay_inside_cube() {
        let mut rng = StdRng::seed_from_u64(7);
        let positions = generate_star_positions(&mut rng, 10_001, 1000.0);
        assert_eq!(positions.len(), 10_001 * 3);
        assert!(positions.iter().all(|c| (-500.0..=500.0).contains(c)));
    }

    #[test]
    fn same_seed_same_field() {
        let a = generate_star_positions(&mut StdRng::seed_from_u64(1), 64, 1000.0);
        let b = generate_star_positions(&mut StdRng::seed_from_u64(1), 64, 1000.0);
        assert_eq!(a, b);
    }

    #[test]
    fn cloud_reads_back_points() {
        let cloud = PointCloud::from_positions(vec![1.0, 2.0, 3.0, -4.0, -5.0, -6.0]);
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.point(1), Vec3::new(-4.0, -5.0, -6.0));
        assert_eq!(cloud.iter().count(), 2);
    }
}
