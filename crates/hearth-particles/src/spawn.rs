//! Emitter factory: builds a fully initialized pool from a configuration

use crate::emitter::EmitterConfig;
use crate::particle::ParticlePool;
use crate::rand::RandomSource;
use hearth_core::Result;

/// Build a pool of `config.capacity` particles with randomized initial state.
///
/// Per slot, in index order, draws x, z, vertical speed, then lifespan. Every
/// particle starts at height 0 in the emitter's local frame with the start
/// style.
pub fn create_pool<G: RandomSource + ?Sized>(
    config: &EmitterConfig,
    rng: &mut G,
) -> Result<ParticlePool> {
    config.validate()?;

    let mut pool = ParticlePool::zeroed(config.capacity);
    let color = config.color_start.to_array();

    for i in 0..config.capacity {
        let [x, z] = spawn_offset(config, rng);
        pool.positions[i * 3] = x;
        pool.positions[i * 3 + 1] = 0.0;
        pool.positions[i * 3 + 2] = z;

        pool.colors[i * 3..i * 3 + 3].copy_from_slice(&color);
        pool.sizes[i] = config.size_start;
        pool.opacities[i] = config.opacity_start;

        pool.velocities[i * 3 + 1] = config.velocity_y.sample(rng);

        let lifespan = config.lifespan.sample(rng);
        pool.lifespans[i] = lifespan;
        pool.lifespan_max[i] = lifespan;
    }

    log::debug!(
        "created {:?} pool with {} particles",
        config.kind,
        config.capacity
    );
    Ok(pool)
}

/// Random x/z offset in the square spawn region of side `spawn_radius`
pub(crate) fn spawn_offset<G: RandomSource + ?Sized>(config: &EmitterConfig, rng: &mut G) -> [f32; 2] {
    let half = config.spawn_radius * 0.5;
    let x = rng.range(-half, half);
    let z = rng.range(-half, half);
    [x, z]
}
