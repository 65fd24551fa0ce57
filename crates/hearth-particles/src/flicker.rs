//! Flicker signal for the fire's point light

use crate::rand::RandomSource;
use serde::Deserialize;

/// Parameters of the light flicker. Deserializable from a `[flicker]` table.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct FlickerConfig {
    /// Intensity around which the light oscillates
    pub base: f32,
    /// Amplitude of the sine oscillation
    pub amplitude: f32,
    /// Angular frequency in radians per second
    pub frequency: f64,
    /// Width of the symmetric random perturbation
    pub jitter: f32,
}

impl Default for FlickerConfig {
    fn default() -> Self {
        Self {
            base: 2.0,
            amplitude: 1.0,
            frequency: 5.0,
            jitter: 0.3,
        }
    }
}

impl FlickerConfig {
    /// Light intensity at absolute time `time_seconds`. The phase is computed
    /// in f64 from the absolute time so long runs do not drift.
    pub fn intensity<G: RandomSource + ?Sized>(&self, time_seconds: f64, rng: &mut G) -> f32 {
        let wave = (time_seconds * self.frequency).sin() as f32;
        self.base + self.amplitude * wave + rng.range(-0.5, 0.5) * self.jitter
    }
}

/// Light intensity using the default flicker parameters
pub fn flicker_intensity<G: RandomSource + ?Sized>(time_seconds: f64, rng: &mut G) -> f32 {
    FlickerConfig::default().intensity(time_seconds, rng)
}
