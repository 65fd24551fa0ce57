//! Frame driver: owns scheduling, pausing and teardown for one runtime system

use crate::clock::{FrameClock, FrameTime, TimeSource};
use crate::system::RuntimeSystem;
use hearth_core::{HearthError, Result};

/// Lifecycle state of a [`FrameDriver`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Created, `start` not yet called
    Idle,
    Running,
    Paused,
    /// Torn down. No further frames will be driven.
    Stopped,
}

/// Drives a runtime system once per frame against an owned renderer.
///
/// Teardown is guaranteed: `stop` runs the system's shutdown exactly once, and
/// a driver dropped while still running stops itself.
pub struct FrameDriver<S, R, T>
where
    S: RuntimeSystem<R>,
    T: TimeSource,
{
    system: S,
    renderer: R,
    clock: FrameClock<T>,
    state: DriverState,
}

impl<S, R, T> FrameDriver<S, R, T>
where
    S: RuntimeSystem<R>,
    T: TimeSource,
{
    pub fn new(system: S, renderer: R, time_source: T) -> Self {
        Self {
            system,
            renderer,
            clock: FrameClock::new(time_source),
            state: DriverState::Idle,
        }
    }

    /// Initialize the system. If initialization fails, shutdown still runs so
    /// that anything partially acquired is released, and the driver ends up
    /// stopped.
    pub fn start(&mut self) -> Result<()> {
        if self.state != DriverState::Idle {
            return Err(HearthError::RuntimeError(format!(
                "cannot start '{}' from state {:?}",
                self.system.name(),
                self.state
            )));
        }

        if let Err(e) = self.system.initialize(&mut self.renderer) {
            log::warn!("{} failed to initialize: {e}", self.system.name());
            self.state = DriverState::Stopped;
            if let Err(shutdown_err) = self.system.shutdown(&mut self.renderer) {
                log::warn!(
                    "{} failed to shut down after init error: {shutdown_err}",
                    self.system.name()
                );
            }
            return Err(e);
        }

        log::info!("{} started", self.system.name());
        self.state = DriverState::Running;
        Ok(())
    }

    /// Drive one frame. Returns `Ok(false)` without touching the system when
    /// the driver is not running.
    pub fn tick(&mut self) -> Result<bool> {
        if self.state != DriverState::Running {
            return Ok(false);
        }
        let frame: FrameTime = self.clock.tick();
        self.system.update(&mut self.renderer, frame)?;
        Ok(true)
    }

    /// Drive up to `frames` frames, returning how many actually ran
    pub fn run_frames(&mut self, frames: u64) -> Result<u64> {
        let mut ran = 0;
        for _ in 0..frames {
            if !self.tick()? {
                break;
            }
            ran += 1;
        }
        Ok(ran)
    }

    pub fn pause(&mut self) {
        if self.state == DriverState::Running {
            log::debug!("{} paused", self.system.name());
            self.state = DriverState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == DriverState::Paused {
            log::debug!("{} resumed", self.system.name());
            self.state = DriverState::Running;
        }
    }

    /// Tear the system down. Idempotent; only the first call reaches the
    /// system's shutdown.
    pub fn stop(&mut self) -> Result<()> {
        match self.state {
            DriverState::Stopped => Ok(()),
            DriverState::Idle => {
                self.state = DriverState::Stopped;
                Ok(())
            }
            DriverState::Running | DriverState::Paused => {
                self.state = DriverState::Stopped;
                log::info!(
                    "{} stopping after {} frame(s)",
                    self.system.name(),
                    self.clock.frames()
                );
                self.system.shutdown(&mut self.renderer)
            }
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn system(&self) -> &S {
        &self.system
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Number of frames driven so far
    pub fn frames(&self) -> u64 {
        self.clock.frames()
    }
}

impl<S, R, T> Drop for FrameDriver<S, R, T>
where
    S: RuntimeSystem<R>,
    T: TimeSource,
{
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::warn!("{} failed to shut down: {e}", self.system.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualTimeSource;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Log {
        calls: Vec<String>,
    }

    struct Recorder {
        log: Rc<RefCell<Log>>,
        fail_init: bool,
    }

    impl RuntimeSystem<Vec<u64>> for Recorder {
        fn initialize(&mut self, _renderer: &mut Vec<u64>) -> Result<()> {
            self.log.borrow_mut().calls.push("init".into());
            if self.fail_init {
                Err(HearthError::RenderError("no device".into()))
            } else {
                Ok(())
            }
        }

        fn update(&mut self, renderer: &mut Vec<u64>, frame: FrameTime) -> Result<()> {
            renderer.push(frame.frame);
            Ok(())
        }

        fn shutdown(&mut self, _renderer: &mut Vec<u64>) -> Result<()> {
            self.log.borrow_mut().calls.push("shutdown".into());
            Ok(())
        }

        fn name(&self) -> &str {
            "recorder"
        }
    }

    fn driver(
        fail_init: bool,
    ) -> (
        FrameDriver<Recorder, Vec<u64>, ManualTimeSource>,
        Rc<RefCell<Log>>,
    ) {
        let log = Rc::new(RefCell::new(Log::default()));
        let recorder = Recorder {
            log: log.clone(),
            fail_init,
        };
        (
            FrameDriver::new(recorder, Vec::new(), ManualTimeSource::per_frame_60hz()),
            log,
        )
    }

    #[test]
    fn ticks_only_while_running() {
        let (mut d, _log) = driver(false);
        assert!(!d.tick().unwrap());
        d.start().unwrap();
        assert_eq!(d.run_frames(3).unwrap(), 3);
        d.pause();
        assert!(!d.tick().unwrap());
        d.resume();
        assert!(d.tick().unwrap());
        assert_eq!(d.renderer(), &vec![0, 1, 2, 3]);
    }

    #[test]
    fn stop_is_idempotent_and_final() {
        let (mut d, log) = driver(false);
        d.start().unwrap();
        d.run_frames(2).unwrap();
        d.stop().unwrap();
        d.stop().unwrap();
        assert_eq!(d.state(), DriverState::Stopped);
        assert!(!d.tick().unwrap());
        assert_eq!(d.renderer().len(), 2);
        drop(d);
        assert_eq!(log.borrow().calls, vec!["init", "shutdown"]);
    }

    #[test]
    fn drop_releases_running_system() {
        let (mut d, log) = driver(false);
        d.start().unwrap();
        d.tick().unwrap();
        drop(d);
        assert_eq!(log.borrow().calls, vec!["init", "shutdown"]);
    }

    #[test]
    fn failed_init_still_shuts_down() {
        let (mut d, log) = driver(true);
        assert!(d.start().is_err());
        assert_eq!(d.state(), DriverState::Stopped);
        assert!(!d.tick().unwrap());
        drop(d);
        assert_eq!(log.borrow().calls, vec!["init", "shutdown"]);
    }

    #[test]
    fn cannot_start_twice() {
        let (mut d, _log) = driver(false);
        d.start().unwrap();
        assert!(d.start().is_err());
    }
}
