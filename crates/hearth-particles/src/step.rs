//! Per-frame particle integration and respawn
//!
//! Each step, for every slot in index order:
//! 1. rise by `velocity_y * dt_frames`
//! 2. drift x, then z, by `uniform(-0.5, 0.5) * jitter`
//! 3. lose one frame of lifespan
//! 4. if the lifespan ran out, respawn in place: new x/z in the spawn region,
//!    height reset to the emitter's base height, new lifespan
//!
//! Steps 1-3 always run, so a dying particle is advanced once before the
//! respawn overwrites it. Velocity, color, size and opacity are never written.

use crate::emitter::{EmitterConfig, EmitterKind};
use crate::particle::ParticlePool;
use crate::rand::RandomSource;
use crate::spawn::spawn_offset;

/// Horizontal jitter applied to smoke regardless of configuration
pub const SMOKE_JITTER: f32 = 0.01;

/// Advance a pool by one tick using the step variant for `config.kind`
pub fn step<G: RandomSource + ?Sized>(
    pool: &mut ParticlePool,
    config: &EmitterConfig,
    rng: &mut G,
    dt_frames: f32,
) {
    match config.kind {
        EmitterKind::Fire => step_fire(pool, config, rng, dt_frames),
        EmitterKind::Smoke => step_smoke(pool, config, rng, dt_frames),
    }
}

/// Fire: jitter from `config.jitter_intensity`
pub fn step_fire<G: RandomSource + ?Sized>(
    pool: &mut ParticlePool,
    config: &EmitterConfig,
    rng: &mut G,
    dt_frames: f32,
) {
    integrate(pool, config, rng, dt_frames, config.jitter_intensity);
}

/// Smoke: fixed [`SMOKE_JITTER`], respawning at the smoke base height
pub fn step_smoke<G: RandomSource + ?Sized>(
    pool: &mut ParticlePool,
    config: &EmitterConfig,
    rng: &mut G,
    dt_frames: f32,
) {
    integrate(pool, config, rng, dt_frames, SMOKE_JITTER);
}

fn integrate<G: RandomSource + ?Sized>(
    pool: &mut ParticlePool,
    config: &EmitterConfig,
    rng: &mut G,
    dt_frames: f32,
    jitter: f32,
) {
    for i in 0..pool.capacity() {
        let (x, y, z) = (i * 3, i * 3 + 1, i * 3 + 2);

        pool.positions[y] += pool.velocities[y] * dt_frames;
        // Draws happen even at zero jitter so the random stream does not
        // depend on the jitter setting
        pool.positions[x] += rng.range(-0.5, 0.5) * jitter;
        pool.positions[z] += rng.range(-0.5, 0.5) * jitter;

        pool.lifespans[i] -= 1.0;

        if pool.lifespans[i] <= 0.0 {
            let [sx, sz] = spawn_offset(config, rng);
            pool.positions[x] = sx;
            pool.positions[y] = config.base_height;
            pool.positions[z] = sz;

            let lifespan = config.lifespan.sample(rng);
            pool.lifespans[i] = lifespan;
            pool.lifespan_max[i] = lifespan;
            pool.generations[i] += 1;
        }

        assert!(
            pool.lifespans[i] > 0.0,
            "particle {i} left with lifespan {} after respawn check",
            pool.lifespans[i]
        );
    }

    pool.mark_positions_dirty();
}
