//! Emitter configuration (built-in presets or parsed from TOML)

use crate::rand::RandomSource;
use hearth_core::{Color, HearthError, Result};

/// Which step variant drives an emitter's pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitterKind {
    Fire,
    Smoke,
}

/// Inclusive `[min, max]` range sampled uniformly
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn sample<G: RandomSource + ?Sized>(&self, rng: &mut G) -> f32 {
        rng.range(self.min, self.max)
    }

    pub fn contains(&self, v: f32) -> bool {
        v >= self.min && v <= self.max
    }

    fn validate(&self, field: &str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(HearthError::ConfigurationError(format!(
                "{field} must be finite, got ({}, {})",
                self.min, self.max
            )));
        }
        if self.min > self.max {
            return Err(HearthError::InvalidRange {
                field: field.to_string(),
                min: self.min as f64,
                max: self.max as f64,
            });
        }
        Ok(())
    }
}

/// Largest pool an emitter may request
pub const MAX_CAPACITY: usize = 1 << 20;

/// Immutable emitter parameters. Lifespans and velocities are in frames:
/// one step decrements lifespan by one and moves a particle by
/// `velocity * frame delta`.
#[derive(Debug, Clone, PartialEq)]
pub struct EmitterConfig {
    pub kind: EmitterKind,
    pub capacity: usize,
    /// Side of the square spawn region centred on the emitter origin
    pub spawn_radius: f32,
    /// Height particles reset to on respawn
    pub base_height: f32,
    pub velocity_y: ValueRange,
    pub lifespan: ValueRange,
    /// Horizontal jitter magnitude per frame. Ignored by smoke emitters.
    pub jitter_intensity: f32,
    pub color_start: Color,
    pub color_end: Color,
    pub size_start: f32,
    pub size_end: f32,
    pub opacity_start: f32,
    pub opacity_end: f32,
    pub texture: String,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self::fire()
    }
}

impl EmitterConfig {
    /// Campfire flame preset
    pub fn fire() -> Self {
        Self {
            kind: EmitterKind::Fire,
            capacity: 500,
            spawn_radius: 0.5,
            base_height: 0.0,
            velocity_y: ValueRange::new(0.05, 0.15),
            lifespan: ValueRange::new(50.0, 150.0),
            jitter_intensity: 0.3,
            color_start: Color::new(1.0, 0.5, 0.0),
            color_end: Color::new(1.0, 0.0, 0.0),
            size_start: 8.0,
            size_end: 1.0,
            opacity_start: 1.0,
            opacity_end: 0.0,
            texture: "textures/fire.jpg".to_string(),
        }
    }

    /// Campfire smoke preset
    pub fn smoke() -> Self {
        Self {
            kind: EmitterKind::Smoke,
            capacity: 100,
            spawn_radius: 0.5,
            base_height: -1.5,
            velocity_y: ValueRange::new(0.05, 0.15),
            lifespan: ValueRange::new(50.0, 150.0),
            jitter_intensity: 0.0,
            color_start: Color::new(0.4, 0.4, 0.4),
            color_end: Color::new(0.1, 0.1, 0.1),
            size_start: 30.0,
            size_end: 5.0,
            opacity_start: 0.6,
            opacity_end: 0.0,
            texture: "textures/smoke.jpg".to_string(),
        }
    }

    /// Reject configurations that could not produce a well-formed pool
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(HearthError::ConfigurationError(
                "capacity must be positive".into(),
            ));
        }
        if self.capacity > MAX_CAPACITY || self.capacity.checked_mul(3).is_none() {
            return Err(HearthError::ConfigurationError(format!(
                "capacity must be at most {MAX_CAPACITY}, got {}",
                self.capacity
            )));
        }
        if !self.spawn_radius.is_finite() || self.spawn_radius < 0.0 {
            return Err(HearthError::ConfigurationError(format!(
                "spawn_radius must be a non-negative number, got {}",
                self.spawn_radius
            )));
        }
        if !self.base_height.is_finite() {
            return Err(HearthError::ConfigurationError(format!(
                "base_height must be finite, got {}",
                self.base_height
            )));
        }
        if !self.jitter_intensity.is_finite() || self.jitter_intensity < 0.0 {
            return Err(HearthError::ConfigurationError(format!(
                "jitter_intensity must be a non-negative number, got {}",
                self.jitter_intensity
            )));
        }
        self.velocity_y.validate("velocity_y")?;
        self.lifespan.validate("lifespan")?;
        if self.lifespan.min <= 0.0 {
            return Err(HearthError::ConfigurationError(format!(
                "lifespan minimum must be positive, got {}",
                self.lifespan.min
            )));
        }
        Ok(())
    }

    /// Parse an EmitterConfig from a TOML table, starting from the preset for
    /// its `kind` (default "fire"). The result is validated.
    pub fn from_toml(table: &toml::value::Table) -> Result<Self> {
        let kind = match table.get("kind") {
            None => EmitterKind::Fire,
            Some(v) => match v.as_str() {
                Some("fire") => EmitterKind::Fire,
                Some("smoke") => EmitterKind::Smoke,
                Some(other) => {
                    return Err(HearthError::ConfigurationError(format!(
                        "unknown emitter kind '{other}', expected \"fire\" or \"smoke\""
                    )))
                }
                None => {
                    return Err(HearthError::ConfigurationError(format!(
                        "kind must be a string, got {v}"
                    )))
                }
            },
        };
        let mut config = match kind {
            EmitterKind::Fire => Self::fire(),
            EmitterKind::Smoke => Self::smoke(),
        };

        if let Some(v) = table.get("capacity") {
            let n = v.as_integer().ok_or_else(|| {
                HearthError::ConfigurationError(format!("capacity must be an integer, got {v}"))
            })?;
            config.capacity = usize::try_from(n).map_err(|_| {
                HearthError::ConfigurationError(format!("capacity must be positive, got {n}"))
            })?;
        }
        if let Some(v) = table.get("spawn_radius") {
            config.spawn_radius = toml_f32(v, "spawn_radius")?;
        }
        if let Some(v) = table.get("base_height") {
            config.base_height = toml_f32(v, "base_height")?;
        }
        if let Some(v) = table.get("velocity_y") {
            config.velocity_y = toml_range(v, "velocity_y")?;
        }
        if let Some(v) = table.get("lifespan") {
            config.lifespan = toml_range(v, "lifespan")?;
        }
        if let Some(v) = table.get("jitter_intensity") {
            config.jitter_intensity = toml_f32(v, "jitter_intensity")?;
        }
        if let Some(v) = table.get("color_start") {
            config.color_start = Color::from_array(toml_vec3(v, "color_start")?);
        }
        if let Some(v) = table.get("color_end") {
            config.color_end = Color::from_array(toml_vec3(v, "color_end")?);
        }
        if let Some(v) = table.get("size_start") {
            config.size_start = toml_f32(v, "size_start")?;
        }
        if let Some(v) = table.get("size_end") {
            config.size_end = toml_f32(v, "size_end")?;
        }
        if let Some(v) = table.get("opacity_start") {
            config.opacity_start = toml_f32(v, "opacity_start")?;
        }
        if let Some(v) = table.get("opacity_end") {
            config.opacity_end = toml_f32(v, "opacity_end")?;
        }
        if let Some(v) = table.get("texture") {
            config.texture = v
                .as_str()
                .ok_or_else(|| {
                    HearthError::ConfigurationError(format!("texture must be a string, got {v}"))
                })?
                .to_string();
        }

        config.validate()?;
        Ok(config)
    }
}

// ── TOML helpers (integer/float coercion; anything else is an error) ──

pub(crate) fn toml_f32(v: &toml::Value, field: &str) -> Result<f32> {
    v.as_float()
        .map(|f| f as f32)
        .or_else(|| v.as_integer().map(|i| i as f32))
        .ok_or_else(|| HearthError::ConfigurationError(format!("{field} must be a number, got {v}")))
}

fn toml_numbers<const N: usize>(v: &toml::Value, field: &str) -> Result<[f32; N]> {
    let wrong_shape = || {
        HearthError::ConfigurationError(format!("{field} must be an array of {N} numbers, got {v}"))
    };
    let arr = v.as_array().ok_or_else(wrong_shape)?;
    if arr.len() != N {
        return Err(wrong_shape());
    }
    let mut out = [0.0; N];
    for (slot, item) in out.iter_mut().zip(arr) {
        *slot = toml_f32(item, field)?;
    }
    Ok(out)
}

/// `[x, y, z]` or `[r, g, b]` array
pub(crate) fn toml_vec3(v: &toml::Value, field: &str) -> Result<[f32; 3]> {
    toml_numbers::<3>(v, field)
}

/// `[min, max]` array
fn toml_range(v: &toml::Value, field: &str) -> Result<ValueRange> {
    let [min, max] = toml_numbers::<2>(v, field)?;
    Ok(ValueRange::new(min, max))
}
