//! Hearth Particles - campfire fire and smoke particle engine
//!
//! Provides fixed-budget particle emitters with:
//! - Structure-of-arrays pools that recycle particles in place
//! - An emitter factory with randomized initial state
//! - Fire and smoke step variants (rise, jitter, age, respawn)
//! - A flicker signal for the fire's point light
//! - Dirty-flagged buffers handed to an external renderer
//!
//! All randomness goes through [`RandomSource`], so seeded runs are reproducible.

pub mod emitter;
pub mod flicker;
pub mod particle;
pub mod rand;
pub mod render;
pub mod scene;
pub mod spawn;
pub mod step;

pub use emitter::{EmitterConfig, EmitterKind, ValueRange, MAX_CAPACITY};
pub use flicker::{flicker_intensity, FlickerConfig};
pub use particle::{DirtyBuffers, ParticleBuffers, ParticleInstance, ParticlePool};
pub use crate::rand::{ParticleRng, RandomSource, StdRandom};
pub use render::{
    EmitterDescriptor, EmitterHandle, LightConfig, ParticleBlendMode, SceneRenderer,
};
pub use scene::{Emitter, FireScene, FireSceneConfig};
pub use spawn::create_pool;
pub use step::{step, step_fire, step_smoke, SMOKE_JITTER};
