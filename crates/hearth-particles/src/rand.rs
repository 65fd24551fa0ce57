//! Injectable random sources
//!
//! Every random draw in the simulation goes through [`RandomSource`], so a
//! seeded source reproduces a run exactly.

use ::rand::rngs::StdRng;
use ::rand::{Rng, SeedableRng};

/// A source of uniform random floats
pub trait RandomSource {
    /// Returns a float in [0, 1]
    fn next_f32(&mut self) -> f32;

    /// Returns a float in [min, max]
    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }
}

impl<G: RandomSource + ?Sized> RandomSource for &mut G {
    fn next_f32(&mut self) -> f32 {
        (**self).next_f32()
    }
}

/// Lightweight xorshift32 PRNG, the deterministic default
pub struct ParticleRng {
    state: u32,
}

impl ParticleRng {
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}

impl RandomSource for ParticleRng {
    fn next_f32(&mut self) -> f32 {
        (self.next_u32() as f32) / (u32::MAX as f32)
    }
}

/// Adapter over the `rand` crate's standard generator
pub struct StdRandom {
    inner: StdRng,
}

impl StdRandom {
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// Non-reproducible source seeded from the operating system
    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_os_rng(),
        }
    }
}

impl RandomSource for StdRandom {
    fn next_f32(&mut self) -> f32 {
        self.inner.random::<f32>()
    }
}
