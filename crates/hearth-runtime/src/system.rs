//! Runtime system trait

use crate::clock::FrameTime;
use hearth_core::Result;

/// A system that can be ticked by the frame driver
///
/// The renderer is passed into every call; systems never keep a reference
/// to it between frames.
pub trait RuntimeSystem<R: ?Sized> {
    /// Called once before the first frame. Acquire renderer resources here.
    fn initialize(&mut self, renderer: &mut R) -> Result<()>;

    /// Called once per display frame
    fn update(&mut self, renderer: &mut R, frame: FrameTime) -> Result<()>;

    /// Called when the system is being torn down. Must release everything
    /// acquired in `initialize`, and must tolerate a partial initialization.
    fn shutdown(&mut self, renderer: &mut R) -> Result<()>;

    /// Human-readable name for this system
    fn name(&self) -> &str;
}
