//! Hearth Runtime - Frame loop infrastructure
//!
//! Provides the frame loop building blocks:
//! - `TimeSource` / `FrameClock` — monotonic frame timing from absolute elapsed time
//! - `RuntimeSystem` — trait for systems ticked once per display frame
//! - `FrameDriver` — owns scheduling, pausing and guaranteed teardown

mod clock;
mod driver;
mod system;

pub use clock::{FrameClock, FrameTime, ManualTimeSource, SystemTimeSource, TimeSource};
pub use driver::{DriverState, FrameDriver};
pub use system::RuntimeSystem;
