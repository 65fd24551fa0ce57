//! Particle pool: fixed-capacity structure-of-arrays storage and GPU instance data

use bytemuck::{Pod, Zeroable};
use hearth_core::{HearthError, Result};

/// Which renderer-visible buffers changed since the last upload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirtyBuffers {
    pub position: bool,
    pub color: bool,
    pub size: bool,
    pub opacity: bool,
}

impl DirtyBuffers {
    pub const ALL: Self = Self {
        position: true,
        color: true,
        size: true,
        opacity: true,
    };

    pub fn any(&self) -> bool {
        self.position || self.color || self.size || self.opacity
    }
}

/// Borrowed view of the buffers a renderer uploads
#[derive(Debug, Clone, Copy)]
pub struct ParticleBuffers<'a> {
    /// xyz per particle, `capacity * 3` floats
    pub positions: &'a [f32],
    /// rgb per particle, `capacity * 3` floats
    pub colors: &'a [f32],
    pub sizes: &'a [f32],
    pub opacities: &'a [f32],
}

impl ParticleBuffers<'_> {
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Interleave into `out` for an instanced draw. Reuses the allocation of `out`.
    pub fn pack_instances(&self, out: &mut Vec<ParticleInstance>) {
        out.clear();
        out.reserve(self.len());
        for i in 0..self.len() {
            out.push(ParticleInstance {
                pos_size: [
                    self.positions[i * 3],
                    self.positions[i * 3 + 1],
                    self.positions[i * 3 + 2],
                    self.sizes[i],
                ],
                color_opacity: [
                    self.colors[i * 3],
                    self.colors[i * 3 + 1],
                    self.colors[i * 3 + 2],
                    self.opacities[i],
                ],
            });
        }
    }
}

/// GPU instance data for instanced point-sprite renderers.
/// 32 bytes (2 rows of vec4).
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ParticleInstance {
    pub pos_size: [f32; 4],      // xyz = position, w = size
    pub color_opacity: [f32; 4], // rgb = color, a = opacity
}

/// Fixed-capacity particle storage. Slot `i` is the same logical particle for
/// the pool's whole life; death is respawn-in-place, never removal.
pub struct ParticlePool {
    pub(crate) positions: Vec<f32>,
    pub(crate) velocities: Vec<f32>,
    pub(crate) colors: Vec<f32>,
    pub(crate) sizes: Vec<f32>,
    pub(crate) opacities: Vec<f32>,
    pub(crate) lifespans: Vec<f32>,
    pub(crate) lifespan_max: Vec<f32>,
    /// Respawn count per slot
    pub(crate) generations: Vec<u32>,
    pub(crate) dirty: DirtyBuffers,
}

impl ParticlePool {
    /// Allocate zeroed buffers for `capacity` particles. The emitter factory
    /// fills them in.
    pub(crate) fn zeroed(capacity: usize) -> Self {
        Self {
            positions: vec![0.0; capacity * 3],
            velocities: vec![0.0; capacity * 3],
            colors: vec![0.0; capacity * 3],
            sizes: vec![0.0; capacity],
            opacities: vec![0.0; capacity],
            lifespans: vec![0.0; capacity],
            lifespan_max: vec![0.0; capacity],
            generations: vec![0; capacity],
            dirty: DirtyBuffers::ALL,
        }
    }

    pub fn capacity(&self) -> usize {
        self.sizes.len()
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn velocities(&self) -> &[f32] {
        &self.velocities
    }

    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    pub fn opacities(&self) -> &[f32] {
        &self.opacities
    }

    /// Remaining lifespan per particle, in frames
    pub fn lifespans(&self) -> &[f32] {
        &self.lifespans
    }

    /// Lifespan drawn at each particle's most recent spawn
    pub fn lifespan_max(&self) -> &[f32] {
        &self.lifespan_max
    }

    pub fn generations(&self) -> &[u32] {
        &self.generations
    }

    /// Total respawns across all slots since creation
    pub fn total_respawns(&self) -> u64 {
        self.generations.iter().map(|&g| g as u64).sum()
    }

    /// Position of particle `i`
    pub fn position(&self, i: usize) -> [f32; 3] {
        [
            self.positions[i * 3],
            self.positions[i * 3 + 1],
            self.positions[i * 3 + 2],
        ]
    }

    pub fn buffers(&self) -> ParticleBuffers<'_> {
        ParticleBuffers {
            positions: &self.positions,
            colors: &self.colors,
            sizes: &self.sizes,
            opacities: &self.opacities,
        }
    }

    pub fn dirty(&self) -> DirtyBuffers {
        self.dirty
    }

    /// Return the current dirty flags and clear them
    pub fn take_dirty(&mut self) -> DirtyBuffers {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_positions_dirty(&mut self) {
        self.dirty.position = true;
    }

    /// Check buffer lengths against capacity and that every particle is alive
    pub fn validate(&self) -> Result<()> {
        let n = self.capacity();
        let checks = [
            ("positions", self.positions.len(), n * 3),
            ("velocities", self.velocities.len(), n * 3),
            ("colors", self.colors.len(), n * 3),
            ("opacities", self.opacities.len(), n),
            ("lifespans", self.lifespans.len(), n),
            ("lifespan_max", self.lifespan_max.len(), n),
            ("generations", self.generations.len(), n),
        ];
        for (name, got, expected) in checks {
            if got != expected {
                return Err(HearthError::InvariantViolation(format!(
                    "{name} has length {got}, expected {expected}"
                )));
            }
        }

        if let Some(i) = self.lifespans.iter().position(|&l| l <= 0.0 || l.is_nan()) {
            return Err(HearthError::InvariantViolation(format!(
                "particle {i} has non-positive lifespan {}",
                self.lifespans[i]
            )));
        }
        Ok(())
    }

    /// Interleave the buffers into `out` for an instanced draw
    pub fn pack_instances(&self, out: &mut Vec<ParticleInstance>) {
        self.buffers().pack_instances(out);
    }
}
