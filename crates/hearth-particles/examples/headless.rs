//! Run the campfire without a window, logging what a renderer would receive.
//!
//! Usage: cargo run -p hearth-particles --example headless [--random] [frames] [scene.toml]
//!
//! Without `--random` the run is seeded and repeats exactly.

use hearth_core::Result;
use hearth_particles::{
    DirtyBuffers, EmitterDescriptor, EmitterHandle, FireScene, FireSceneConfig, LightConfig,
    ParticleBuffers, ParticleInstance, ParticleRng, RandomSource, SceneRenderer, StdRandom,
};
use hearth_runtime::{FrameDriver, ManualTimeSource};
use std::collections::HashMap;

/// Packs uploads into instance buffers and tracks what was drawn
#[derive(Default)]
struct HeadlessRenderer {
    next_handle: u64,
    instances: HashMap<EmitterHandle, Vec<ParticleInstance>>,
    bytes_uploaded: usize,
    frames_drawn: u64,
    light_intensity: f32,
}

impl SceneRenderer for HeadlessRenderer {
    fn create_emitter(&mut self, desc: &EmitterDescriptor<'_>) -> Result<EmitterHandle> {
        self.next_handle += 1;
        let handle = EmitterHandle(self.next_handle);
        log::info!(
            "emitter '{}' -> {:?}: {} particles at {:?}, texture {}",
            desc.name,
            handle,
            desc.capacity,
            desc.origin.to_array(),
            desc.texture
        );
        self.instances
            .insert(handle, Vec::with_capacity(desc.capacity));
        Ok(handle)
    }

    fn upload_particles(
        &mut self,
        handle: EmitterHandle,
        buffers: ParticleBuffers<'_>,
        dirty: DirtyBuffers,
    ) -> Result<()> {
        let Some(out) = self.instances.get_mut(&handle) else {
            return Err(hearth_core::HearthError::RenderError(format!(
                "unknown emitter {handle:?}"
            )));
        };
        buffers.pack_instances(out);
        self.bytes_uploaded += bytemuck::cast_slice::<ParticleInstance, u8>(out).len();
        log::trace!("upload {handle:?} {dirty:?}");
        Ok(())
    }

    fn configure_light(&mut self, light: &LightConfig) -> Result<()> {
        log::info!(
            "point light {:?} range {} at {:?}",
            light.color.to_array(),
            light.range,
            light.position.to_array()
        );
        Ok(())
    }

    fn set_light_intensity(&mut self, intensity: f32) {
        self.light_intensity = intensity;
    }

    fn draw(&mut self) -> Result<()> {
        self.frames_drawn += 1;
        if self.frames_drawn % 60 == 0 {
            log::info!(
                "frame {}: light {:.3}, {} KiB uploaded",
                self.frames_drawn,
                self.light_intensity,
                self.bytes_uploaded / 1024
            );
        }
        Ok(())
    }

    fn release_emitter(&mut self, handle: EmitterHandle) {
        self.instances.remove(&handle);
        log::info!("released {handle:?}");
    }

    fn release_light(&mut self) {
        log::info!("released light");
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (flags, args): (Vec<String>, Vec<String>) =
        std::env::args().skip(1).partition(|a| a.starts_with("--"));
    let random = flags.iter().any(|f| f == "--random");
    let mut args = args.into_iter();
    let frames: u64 = args.next().and_then(|a| a.parse().ok()).unwrap_or(600);
    let config = match args.next() {
        Some(path) => FireSceneConfig::from_file(std::path::Path::new(&path))?,
        None => FireSceneConfig::default(),
    };

    if random {
        run(FireScene::new(config, StdRandom::from_entropy())?, frames)
    } else {
        run(FireScene::new(config, ParticleRng::new(1))?, frames)
    }
}

fn run<G: RandomSource>(scene: FireScene<G>, frames: u64) -> Result<()> {
    let mut driver = FrameDriver::new(
        scene,
        HeadlessRenderer::default(),
        ManualTimeSource::per_frame_60hz(),
    );
    driver.start()?;
    let ran = driver.run_frames(frames)?;

    for emitter in driver.system().emitters() {
        log::info!(
            "{}: {} respawns over {ran} frames",
            emitter.name,
            emitter.pool.total_respawns()
        );
    }
    driver.stop()
}
