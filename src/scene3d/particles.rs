use bytemuck::{Pod, Zeroable};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// One point of the particle field, laid out for direct upload.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Particle {
    pub position: [f32; 3],
}

/// A cube of randomly scattered points centred on the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleField {
    pub count: usize,
    /// Edge length of the cube
    pub spread: f32,
    pub seed: u64,
}

impl Default for ParticleField {
    fn default() -> Self {
        Self {
            count: 8000,
            spread: 10.0,
            seed: 0x6e65_6275_6c61,
        }
    }
}

impl ParticleField {
    /// Positions are uniform in `[-spread / 2, spread / 2)` on every axis and
    /// depend only on the seed.
    pub fn generate(&self) -> Vec<Particle> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        (0..self.count)
            .map(|_| Particle {
                position: [(); 3].map(|_| (rng.gen::<f32>() - 0.5) * self.spread),
            })
            .collect()
    }

    pub fn bytes(particles: &[Particle]) -> &[u8] {
        bytemuck::cast_slice(particles)
    }
}
