//! Renderer collaborator interface
//!
//! The simulation never owns GPU resources, the scene graph or the camera.
//! Whatever draws the scene implements [`SceneRenderer`] and is passed into
//! each call.

use crate::particle::{DirtyBuffers, ParticleBuffers};
use hearth_core::{Color, Result, Vec3};

/// Blend mode for particle rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleBlendMode {
    Alpha,
    Additive,
}

/// Opaque handle to renderer-side resources for one emitter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EmitterHandle(pub u64);

/// Everything a renderer needs to set up an emitter's draw resources
#[derive(Debug, Clone)]
pub struct EmitterDescriptor<'a> {
    pub name: &'a str,
    pub capacity: usize,
    /// World position of the emitter's local origin
    pub origin: Vec3,
    pub texture: &'a str,
    pub blend_mode: ParticleBlendMode,
}

/// Point light that follows the fire, plus the scene's ambient fill
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightConfig {
    pub color: Color,
    pub intensity: f32,
    /// Distance at which the light falls off to zero
    pub range: f32,
    pub position: Vec3,
    pub ambient_color: Color,
    pub ambient_intensity: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            color: Color::from_hex(0xff5500),
            intensity: 2.0,
            range: 15.0,
            position: Vec3::new(0.0, 1.0, 0.0),
            ambient_color: Color::WHITE,
            ambient_intensity: 0.3,
        }
    }
}

/// The drawing side of the system
pub trait SceneRenderer {
    /// Allocate buffers for an emitter
    fn create_emitter(&mut self, desc: &EmitterDescriptor<'_>) -> Result<EmitterHandle>;

    /// Upload the buffers flagged in `dirty`. Called at most once per emitter per frame.
    fn upload_particles(
        &mut self,
        handle: EmitterHandle,
        buffers: ParticleBuffers<'_>,
        dirty: DirtyBuffers,
    ) -> Result<()>;

    fn configure_light(&mut self, light: &LightConfig) -> Result<()>;

    fn set_light_intensity(&mut self, intensity: f32);

    /// Draw the frame
    fn draw(&mut self) -> Result<()>;

    /// Free an emitter's buffers. The handle is invalid afterwards.
    fn release_emitter(&mut self, handle: EmitterHandle);

    fn release_light(&mut self);
}
