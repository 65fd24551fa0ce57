//! The campfire: fire and smoke emitters plus the flickering light, driven as
//! one runtime system

use crate::emitter::{toml_f32, toml_vec3, EmitterConfig};
use crate::flicker::FlickerConfig;
use crate::particle::ParticlePool;
use crate::rand::RandomSource;
use crate::render::{EmitterDescriptor, EmitterHandle, LightConfig, ParticleBlendMode, SceneRenderer};
use crate::spawn::create_pool;
use crate::step::step;
use hearth_core::{Color, HearthError, Result, Vec3};
use hearth_runtime::{FrameTime, RuntimeSystem};

/// Frames advanced per driver tick
const FRAMES_PER_TICK: f32 = 1.0;

/// Full description of the campfire scene
#[derive(Debug, Clone, PartialEq)]
pub struct FireSceneConfig {
    pub fire: EmitterConfig,
    pub fire_origin: Vec3,
    pub smoke: EmitterConfig,
    pub smoke_origin: Vec3,
    pub light: LightConfig,
    pub flicker: FlickerConfig,
}

impl Default for FireSceneConfig {
    fn default() -> Self {
        Self {
            fire: EmitterConfig::fire(),
            fire_origin: Vec3::new(0.0, -3.0, 0.0),
            smoke: EmitterConfig::smoke(),
            smoke_origin: Vec3::new(0.0, -1.7, 0.0),
            light: LightConfig::default(),
            flicker: FlickerConfig::default(),
        }
    }
}

impl FireSceneConfig {
    /// Parse a scene from TOML. Every table is optional; missing tables keep
    /// the campfire defaults.
    ///
    /// ```toml
    /// [fire]
    /// capacity = 800
    /// origin = [0, -3, 0]
    ///
    /// [smoke]
    /// base_height = -1.5
    ///
    /// [light]
    /// color = 0xff5500
    /// range = 15
    ///
    /// [flicker]
    /// base = 2.0
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let doc: toml::value::Table = toml::from_str(source)?;
        let mut config = Self::default();

        if let Some(table) = doc.get("fire") {
            let table = as_table(table, "fire")?;
            let mut fire = table.clone();
            if !fire.contains_key("kind") {
                fire.insert("kind".into(), "fire".into());
            }
            config.fire = EmitterConfig::from_toml(&fire)?;
            if let Some(v) = table.get("origin") {
                config.fire_origin = Vec3::from_array(toml_vec3(v, "fire.origin")?);
            }
        }
        if let Some(table) = doc.get("smoke") {
            let table = as_table(table, "smoke")?;
            let mut smoke = table.clone();
            if !smoke.contains_key("kind") {
                smoke.insert("kind".into(), "smoke".into());
            }
            config.smoke = EmitterConfig::from_toml(&smoke)?;
            if let Some(v) = table.get("origin") {
                config.smoke_origin = Vec3::from_array(toml_vec3(v, "smoke.origin")?);
            }
        }
        if let Some(table) = doc.get("light") {
            config.light = parse_light(as_table(table, "light")?, config.light)?;
        }
        if let Some(value) = doc.get("flicker") {
            config.flicker = value.clone().try_into().map_err(|e: toml::de::Error| {
                HearthError::ConfigurationError(format!("invalid [flicker] table: {e}"))
            })?;
        }

        Ok(config)
    }

    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}

fn as_table<'a>(value: &'a toml::Value, name: &str) -> Result<&'a toml::value::Table> {
    value
        .as_table()
        .ok_or_else(|| HearthError::ConfigurationError(format!("[{name}] must be a table")))
}

fn parse_light(table: &toml::value::Table, mut light: LightConfig) -> Result<LightConfig> {
    if let Some(v) = table.get("color") {
        light.color = toml_color(v, "light.color")?;
    }
    if let Some(v) = table.get("intensity") {
        light.intensity = toml_f32(v, "light.intensity")?;
    }
    if let Some(v) = table.get("range") {
        light.range = toml_f32(v, "light.range")?;
    }
    if let Some(v) = table.get("position") {
        light.position = Vec3::from_array(toml_vec3(v, "light.position")?);
    }
    if let Some(v) = table.get("ambient_color") {
        light.ambient_color = toml_color(v, "light.ambient_color")?;
    }
    if let Some(v) = table.get("ambient_intensity") {
        light.ambient_intensity = toml_f32(v, "light.ambient_intensity")?;
    }
    Ok(light)
}

/// Color from a 24-bit hex integer (`0xff5500`) or an `[r, g, b]` array
fn toml_color(v: &toml::Value, field: &str) -> Result<Color> {
    match v.as_integer() {
        Some(hex) => match u32::try_from(hex) {
            Ok(rgb) if rgb <= 0xFF_FFFF => Ok(Color::from_hex(rgb)),
            _ => Err(HearthError::ConfigurationError(format!(
                "{field} must be a 24-bit RGB value, got {hex:#x}"
            ))),
        },
        None => Ok(Color::from_array(toml_vec3(v, field)?)),
    }
}

/// Runtime state for one emitter
pub struct Emitter {
    pub name: String,
    pub config: EmitterConfig,
    pub pool: ParticlePool,
    pub origin: Vec3,
    handle: Option<EmitterHandle>,
}

impl Emitter {
    pub fn new<G: RandomSource + ?Sized>(
        name: &str,
        config: EmitterConfig,
        origin: Vec3,
        rng: &mut G,
    ) -> Result<Self> {
        let pool = create_pool(&config, rng)?;
        Ok(Self {
            name: name.to_string(),
            config,
            pool,
            origin,
            handle: None,
        })
    }

    pub fn handle(&self) -> Option<EmitterHandle> {
        self.handle
    }

    /// Hand dirty buffers to the renderer, consuming the dirty flags
    fn upload<R: SceneRenderer + ?Sized>(&mut self, renderer: &mut R) -> Result<()> {
        let Some(handle) = self.handle else {
            return Ok(());
        };
        let dirty = self.pool.take_dirty();
        if dirty.any() {
            renderer.upload_particles(handle, self.pool.buffers(), dirty)?;
        }
        Ok(())
    }
}

/// The campfire system. Owns both pools and the random source; the renderer
/// is lent to it each frame by the driver.
pub struct FireScene<G: RandomSource> {
    emitters: Vec<Emitter>,
    light: LightConfig,
    flicker: FlickerConfig,
    rng: G,
    light_acquired: bool,
    frames_simulated: u64,
    last_light_intensity: f32,
}

impl<G: RandomSource> FireScene<G> {
    /// Build both pools. Configuration errors surface here, before any frame runs.
    pub fn new(config: FireSceneConfig, mut rng: G) -> Result<Self> {
        let emitters = vec![
            Emitter::new("fire", config.fire, config.fire_origin, &mut rng)?,
            Emitter::new("smoke", config.smoke, config.smoke_origin, &mut rng)?,
        ];
        Ok(Self {
            emitters,
            light: config.light,
            flicker: config.flicker,
            rng,
            light_acquired: false,
            frames_simulated: 0,
            last_light_intensity: config.light.intensity,
        })
    }

    pub fn emitters(&self) -> &[Emitter] {
        &self.emitters
    }

    pub fn emitter(&self, name: &str) -> Option<&Emitter> {
        self.emitters.iter().find(|e| e.name == name)
    }

    pub fn frames_simulated(&self) -> u64 {
        self.frames_simulated
    }

    pub fn last_light_intensity(&self) -> f32 {
        self.last_light_intensity
    }

    /// Total particles across all emitters
    pub fn total_particles(&self) -> usize {
        self.emitters.iter().map(|e| e.pool.capacity()).sum()
    }

    /// Advance every pool one tick and recompute the light, without rendering
    pub fn simulate(&mut self, time_seconds: f64) {
        for emitter in &mut self.emitters {
            step(&mut emitter.pool, &emitter.config, &mut self.rng, FRAMES_PER_TICK);
        }
        self.last_light_intensity = self.flicker.intensity(time_seconds, &mut self.rng);
        self.frames_simulated += 1;
    }
}

impl<G: RandomSource, R: SceneRenderer + ?Sized> RuntimeSystem<R> for FireScene<G> {
    fn initialize(&mut self, renderer: &mut R) -> Result<()> {
        renderer.configure_light(&self.light)?;
        self.light_acquired = true;

        for emitter in &mut self.emitters {
            let desc = EmitterDescriptor {
                name: &emitter.name,
                capacity: emitter.pool.capacity(),
                origin: emitter.origin,
                texture: &emitter.config.texture,
                blend_mode: ParticleBlendMode::Additive,
            };
            emitter.handle = Some(renderer.create_emitter(&desc)?);
            emitter.upload(renderer)?;
        }

        log::info!(
            "campfire ready: {} emitter(s), {} particle(s)",
            self.emitters.len(),
            self.total_particles()
        );
        Ok(())
    }

    fn update(&mut self, renderer: &mut R, frame: FrameTime) -> Result<()> {
        self.simulate(frame.total_seconds);
        for emitter in &mut self.emitters {
            emitter.upload(renderer)?;
        }
        renderer.set_light_intensity(self.last_light_intensity);
        renderer.draw()
    }

    fn shutdown(&mut self, renderer: &mut R) -> Result<()> {
        for emitter in &mut self.emitters {
            if let Some(handle) = emitter.handle.take() {
                renderer.release_emitter(handle);
            }
        }
        if std::mem::take(&mut self.light_acquired) {
            renderer.release_light();
        }
        log::info!("campfire released after {} frame(s)", self.frames_simulated);
        Ok(())
    }

    fn name(&self) -> &str {
        "campfire"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::{DirtyBuffers, ParticleBuffers};
    use crate::rand::ParticleRng;
    use hearth_runtime::{DriverState, FrameDriver, ManualTimeSource};
    use std::collections::HashMap;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Create(String),
        Upload(EmitterHandle, DirtyBuffers, usize),
        Light(f32),
        Draw,
        Release(EmitterHandle),
        ReleaseLight,
    }

    /// Records every call; `fail_on` makes `create_emitter` fail for one name
    #[derive(Default)]
    struct RecordingRenderer {
        calls: Vec<Call>,
        live: HashMap<EmitterHandle, String>,
        light_configured: bool,
        next_handle: u64,
        fail_on: Option<String>,
    }

    impl SceneRenderer for RecordingRenderer {
        fn create_emitter(&mut self, desc: &EmitterDescriptor<'_>) -> Result<EmitterHandle> {
            if self.fail_on.as_deref() == Some(desc.name) {
                return Err(HearthError::RenderError(format!("cannot load {}", desc.texture)));
            }
            self.next_handle += 1;
            let handle = EmitterHandle(self.next_handle);
            self.live.insert(handle, desc.name.to_string());
            self.calls.push(Call::Create(desc.name.to_string()));
            Ok(handle)
        }

        fn upload_particles(
            &mut self,
            handle: EmitterHandle,
            buffers: ParticleBuffers<'_>,
            dirty: DirtyBuffers,
        ) -> Result<()> {
            assert!(self.live.contains_key(&handle));
            assert_eq!(buffers.positions.len(), buffers.len() * 3);
            self.calls.push(Call::Upload(handle, dirty, buffers.len()));
            Ok(())
        }

        fn configure_light(&mut self, _light: &LightConfig) -> Result<()> {
            self.light_configured = true;
            Ok(())
        }

        fn set_light_intensity(&mut self, intensity: f32) {
            self.calls.push(Call::Light(intensity));
        }

        fn draw(&mut self) -> Result<()> {
            self.calls.push(Call::Draw);
            Ok(())
        }

        fn release_emitter(&mut self, handle: EmitterHandle) {
            self.live.remove(&handle);
            self.calls.push(Call::Release(handle));
        }

        fn release_light(&mut self) {
            self.light_configured = false;
            self.calls.push(Call::ReleaseLight);
        }
    }

    fn scene(seed: u32) -> FireScene<ParticleRng> {
        FireScene::new(FireSceneConfig::default(), ParticleRng::new(seed)).unwrap()
    }

    #[test]
    fn default_scene_matches_campfire() {
        let s = scene(1);
        assert_eq!(s.emitters().len(), 2);
        assert_eq!(s.emitter("fire").unwrap().pool.capacity(), 500);
        assert_eq!(s.emitter("smoke").unwrap().pool.capacity(), 100);
        assert_eq!(s.emitter("smoke").unwrap().origin, Vec3::new(0.0, -1.7, 0.0));
        assert_eq!(s.total_particles(), 600);
    }

    #[test]
    fn invalid_config_never_builds() {
        let mut config = FireSceneConfig::default();
        config.smoke.capacity = 0;
        let result = FireScene::new(config, ParticleRng::new(1));
        assert!(result.err().unwrap().is_configuration());
    }

    #[test]
    fn frame_uploads_each_emitter_once() {
        let mut driver = FrameDriver::new(
            scene(3),
            RecordingRenderer::default(),
            ManualTimeSource::per_frame_60hz(),
        );
        driver.start().unwrap();

        // Initial full upload for both emitters
        let init: Vec<_> = driver.renderer().calls.clone();
        assert_eq!(init.len(), 4);
        assert!(matches!(&init[1], Call::Upload(_, d, 500) if *d == DirtyBuffers::ALL));
        assert!(matches!(&init[3], Call::Upload(_, d, 100) if *d == DirtyBuffers::ALL));
        driver.renderer_mut().calls.clear();

        driver.run_frames(1).unwrap();
        let position_only = DirtyBuffers {
            position: true,
            ..Default::default()
        };
        let calls = &driver.renderer().calls;
        assert_eq!(calls.len(), 4);
        assert!(matches!(&calls[0], Call::Upload(_, d, 500) if *d == position_only));
        assert!(matches!(&calls[1], Call::Upload(_, d, 100) if *d == position_only));
        assert!(matches!(calls[2], Call::Light(_)));
        assert_eq!(calls[3], Call::Draw);

        for emitter in driver.system().emitters() {
            assert!(!emitter.pool.dirty().any());
        }
    }

    #[test]
    fn light_follows_flicker() {
        let mut driver = FrameDriver::new(
            scene(4),
            RecordingRenderer::default(),
            ManualTimeSource::per_frame_60hz(),
        );
        driver.start().unwrap();
        driver.run_frames(600).unwrap();
        assert_eq!(driver.system().frames_simulated(), 600);

        let intensities: Vec<f32> = driver
            .renderer()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Light(i) => Some(*i),
                _ => None,
            })
            .collect();
        assert_eq!(intensities.len(), 600);
        assert!(intensities.iter().all(|i| (0.85..=3.15).contains(i)));
        assert_eq!(
            *intensities.last().unwrap(),
            driver.system().last_light_intensity()
        );
    }

    #[test]
    fn stop_releases_everything_and_halts() {
        let mut driver = FrameDriver::new(
            scene(5),
            RecordingRenderer::default(),
            ManualTimeSource::per_frame_60hz(),
        );
        driver.start().unwrap();
        driver.run_frames(10).unwrap();
        driver.stop().unwrap();

        assert_eq!(driver.state(), DriverState::Stopped);
        assert!(driver.renderer().live.is_empty());
        assert!(!driver.renderer().light_configured);

        let calls_after_stop = driver.renderer().calls.len();
        assert!(!driver.tick().unwrap());
        assert_eq!(driver.renderer().calls.len(), calls_after_stop);
        assert_eq!(driver.system().frames_simulated(), 10);
    }

    #[test]
    fn failed_setup_releases_partial_resources() {
        let renderer = RecordingRenderer {
            fail_on: Some("smoke".into()),
            ..Default::default()
        };
        let mut driver = FrameDriver::new(scene(6), renderer, ManualTimeSource::per_frame_60hz());
        let err = driver.start().unwrap_err();
        assert!(matches!(err, HearthError::RenderError(_)));

        // The fire emitter and the light were acquired, then released
        assert!(driver.renderer().live.is_empty());
        assert!(!driver.renderer().light_configured);
        assert!(driver
            .renderer()
            .calls
            .iter()
            .any(|c| matches!(c, Call::Release(_))));
        assert!(!driver.tick().unwrap());
    }

    #[test]
    fn simulate_without_renderer() {
        let mut s = scene(7);
        for frame in 0..200 {
            s.simulate(frame as f64 / 60.0);
        }
        for emitter in s.emitters() {
            assert!(emitter.pool.validate().is_ok());
            assert!(emitter.pool.total_respawns() > 0);
        }
    }

    #[test]
    fn scene_from_toml() {
        let source = r#"
[fire]
capacity = 64
origin = [1, -2, 0]

[smoke]
base_height = -1.0

[light]
color = 0x00ff00
range = 20

[flicker]
base = 1.5
jitter = 0.0
"#;
        let config = FireSceneConfig::from_toml_str(source).unwrap();
        assert_eq!(config.fire.capacity, 64);
        assert_eq!(config.fire_origin, Vec3::new(1.0, -2.0, 0.0));
        assert_eq!(config.smoke.kind, crate::emitter::EmitterKind::Smoke);
        assert_eq!(config.smoke.base_height, -1.0);
        assert_eq!(config.smoke.capacity, 100);
        assert_eq!(config.light.color, Color::new(0.0, 1.0, 0.0));
        assert_eq!(config.light.range, 20.0);
        assert_eq!(config.flicker.base, 1.5);
        assert_eq!(config.flicker.jitter, 0.0);
        assert_eq!(config.flicker.frequency, 5.0);
    }

    #[test]
    fn empty_toml_is_default_scene() {
        let config = FireSceneConfig::from_toml_str("").unwrap();
        assert_eq!(config, FireSceneConfig::default());
    }

    #[test]
    fn toml_errors_are_reported() {
        assert!(matches!(
            FireSceneConfig::from_toml_str("[fire\n"),
            Err(HearthError::TomlParseError(_))
        ));
        assert!(FireSceneConfig::from_toml_str("[smoke]\ncapacity = 0")
            .unwrap_err()
            .is_configuration());
        assert!(FireSceneConfig::from_toml_str("fire = 3")
            .unwrap_err()
            .is_configuration());
    }

    #[test]
    fn malformed_emitter_fields_are_reported() {
        let err = FireSceneConfig::from_toml_str(
            "[fire]\nspawn_radius = \"wide\"\nlifespan = \"long\"\nvelocity_y = [0.2]",
        )
        .unwrap_err();
        assert!(err.is_configuration());
        assert!(FireSceneConfig::from_toml_str("[smoke]\norigin = [0, 1]")
            .unwrap_err()
            .is_configuration());
    }

    #[test]
    fn malformed_light_fields_are_reported() {
        for source in [
            "[light]\nrange = \"far\"",
            "[light]\nposition = [0, 1]",
            "[light]\nintensity = []",
            "[light]\ncolor = \"orange\"",
        ] {
            let err = FireSceneConfig::from_toml_str(source).unwrap_err();
            assert!(err.is_configuration(), "{source}: {err}");
        }
    }

    #[test]
    fn light_color_must_fit_24_bits() {
        for source in [
            "[light]\ncolor = -1",
            "[light]\ncolor = 0x1000000",
            "[light]\nambient_color = 0x1ff5500",
        ] {
            let err = FireSceneConfig::from_toml_str(source).unwrap_err();
            assert!(err.is_configuration(), "{source}: {err}");
        }
        let config = FireSceneConfig::from_toml_str("[light]\ncolor = 0xffffff").unwrap();
        assert_eq!(config.light.color, Color::WHITE);
        let config = FireSceneConfig::from_toml_str("[light]\ncolor = [1, 0.5, 0]").unwrap();
        assert_eq!(config.light.color, Color::new(1.0, 0.5, 0.0));
    }

    #[test]
    fn oversized_capacity_is_an_error() {
        let config =
            FireSceneConfig::from_toml_str("[fire]\ncapacity = 4611686018427387904");
        assert!(config.unwrap_err().is_configuration());

        let mut config = FireSceneConfig::default();
        config.fire.capacity = usize::MAX / 2;
        let result = FireScene::new(config, ParticleRng::new(1));
        assert!(result.err().unwrap().is_configuration());
    }

    #[test]
    fn seeded_scenes_are_identical() {
        let mut a = scene(9);
        let mut b = scene(9);
        for frame in 0..90 {
            a.simulate(frame as f64 / 60.0);
            b.simulate(frame as f64 / 60.0);
        }
        for (ea, eb) in a.emitters().iter().zip(b.emitters()) {
            let pa: &[u8] = bytemuck::cast_slice(ea.pool.positions());
            let pb: &[u8] = bytemuck::cast_slice(eb.pool.positions());
            assert_eq!(pa, pb);
        }
        assert_eq!(a.last_light_intensity(), b.last_light_intensity());
    }
}
