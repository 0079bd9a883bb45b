use std::sync::Arc;
use std::time::{Duration, Instant};

use sidescroll_assets::{AssetSource, FrameWork, ImageDecoder, StagedAssetPipeline};
use sidescroll_common::{ConfigError, RuntimeConfig};
use sidescroll_kernel::{ClockError, FixedStepClock, TickRegistry};
use sidescroll_render::RenderRegistry;

use crate::timing::FrameTimer;

/// Pause between frames of the real-time loop.
const FRAME_SLEEP: Duration = Duration::from_millis(1);
/// Samples kept by each diagnostics timer.
const TIMER_HISTORY: usize = 120;

/// Errors that stop the frame loop.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("clock error: {0}")]
    Clock(#[from] ClockError),
}

/// What one frame did.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// Frame number, starting at 1.
    pub frame: u64,
    pub ticks: u64,
    pub alpha: f64,
    pub asset_work: FrameWork,
    /// Visible renderables dispatched.
    pub rendered: usize,
    /// Time spent in tick dispatch.
    pub update_time: Duration,
    /// Time spent in render dispatch.
    pub render_time: Duration,
}

/// Drives clock, tick registry, asset pipeline and render registry once per frame.
pub struct FrameDriver<S, D> {
    config: RuntimeConfig,
    clock: FixedStepClock,
    ticks: Arc<TickRegistry>,
    renders: Arc<RenderRegistry>,
    assets: StagedAssetPipeline<S, D>,
    update_timer: FrameTimer,
    render_timer: FrameTimer,
    frames: u64,
}

impl<S: AssetSource, D: ImageDecoder> FrameDriver<S, D> {
    pub fn new(config: RuntimeConfig, source: S, decoder: D) -> Result<Self, RuntimeError> {
        config.validate()?;
        let clock = FixedStepClock::new(config.tick_interval())?;
        let ticks = if config.diagnostics.enabled {
            TickRegistry::with_sampling(config.diagnostics.sample_every_n_ticks)
        } else {
            TickRegistry::new()
        };
        tracing::info!(
            tick_rate_hz = config.tick_rate_hz,
            diagnostics = config.diagnostics.enabled,
            "frame driver created"
        );

        Ok(Self {
            config,
            clock,
            ticks: Arc::new(ticks),
            renders: Arc::new(RenderRegistry::new()),
            assets: StagedAssetPipeline::new(source, decoder),
            update_timer: FrameTimer::new(TIMER_HISTORY),
            render_timer: FrameTimer::new(TIMER_HISTORY),
            frames: 0,
        })
    }

    /// Run one frame with `delta` seconds of elapsed wall time.
    ///
    /// Invalid deltas fail the frame before any dispatch happens.
    pub fn run_frame(&mut self, delta: f64) -> Result<FrameReport, RuntimeError> {
        let _span = tracing::trace_span!("frame", n = self.frames + 1).entered();
        let ticks_before = self.clock.tick_count();
        let step = self.clock.advance(delta)?;
        self.frames += 1;

        let interval = self.clock.tick_interval();
        let update_start = Instant::now();
        for _ in 0..step.ticks {
            self.ticks.dispatch_tick(interval);
        }
        let update_time = update_start.elapsed();

        let asset_work = self.assets.advance_one_frame();

        let render_start = Instant::now();
        let rendered = self.renders.dispatch_render(step.alpha);
        let render_time = render_start.elapsed();

        self.update_timer.record(update_time);
        self.render_timer.record(render_time);
        self.sample_diagnostics(ticks_before);

        Ok(FrameReport {
            frame: self.frames,
            ticks: step.ticks,
            alpha: step.alpha,
            asset_work,
            rendered,
            update_time,
            render_time,
        })
    }

    /// Log a timing sample whenever the tick counter crosses a sample boundary.
    fn sample_diagnostics(&self, ticks_before: u64) {
        if !self.config.diagnostics.enabled {
            return;
        }
        let every = self.config.diagnostics.sample_every_n_ticks;
        let ticks_now = self.clock.tick_count();
        if ticks_now / every == ticks_before / every {
            return;
        }
        tracing::info!(
            tick = ticks_now,
            update_ms = self.update_timer.average().as_secs_f64() * 1e3,
            render_ms = self.render_timer.average().as_secs_f64() * 1e3,
            update_max_ms = self.update_timer.max().as_secs_f64() * 1e3,
            leftover = self.clock.leftover(),
            pending_assets = self.assets.pending_count(),
            "diagnostics sample"
        );
    }

    /// Real-time loop: measure wall-clock deltas, run frames, sleep briefly
    /// between them. Stops after the first frame for which `keep_running`
    /// returns false. Returns the number of frames run.
    pub fn run_until<F>(&mut self, mut keep_running: F) -> Result<u64, RuntimeError>
    where
        F: FnMut(&FrameReport) -> bool,
    {
        let mut last = Instant::now();
        let mut frames = 0;
        loop {
            let now = Instant::now();
            let report = self.run_frame(now.duration_since(last).as_secs_f64())?;
            last = now;
            frames += 1;
            if !keep_running(&report) {
                break;
            }
            std::thread::sleep(FRAME_SLEEP);
        }
        Ok(frames)
    }

    pub fn tick_registry(&self) -> &Arc<TickRegistry> {
        &self.ticks
    }

    pub fn render_registry(&self) -> &Arc<RenderRegistry> {
        &self.renders
    }

    pub fn assets(&self) -> &StagedAssetPipeline<S, D> {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut StagedAssetPipeline<S, D> {
        &mut self.assets
    }

    pub fn clock(&self) -> &FixedStepClock {
        &self.clock
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn update_timer(&self) -> &FrameTimer {
        &self.update_timer
    }

    pub fn render_timer(&self) -> &FrameTimer {
        &self.render_timer
    }

    /// Frames run so far.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use sidescroll_assets::{ImageCrateDecoder, MemorySource, TextureHandle, TextureState};
    use sidescroll_common::DiagnosticsConfig;
    use sidescroll_kernel::Tickable;
    use sidescroll_render::Renderable;
    use std::io::Cursor;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 100, 50, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn driver(source: MemorySource) -> FrameDriver<MemorySource, ImageCrateDecoder> {
        FrameDriver::new(RuntimeConfig::default(), source, ImageCrateDecoder).unwrap()
    }

    #[derive(Default)]
    struct Counter(AtomicU64);

    impl Tickable for Counter {
        fn tick(&self, _delta_seconds: f64) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Records the alpha and texture state seen at each render.
    struct Watcher {
        texture: TextureHandle,
        seen: Mutex<Vec<(f64, TextureState)>>,
    }

    impl Renderable for Watcher {
        fn order_key(&self) -> i32 {
            0
        }

        fn is_visible(&self) -> bool {
            true
        }

        fn render(&self, alpha: f64) {
            self.seen
                .lock()
                .unwrap()
                .push((alpha, self.texture.state()));
        }
    }

    #[test]
    fn rejects_invalid_config() {
        let config = RuntimeConfig {
            tick_rate_hz: 0.0,
            ..RuntimeConfig::default()
        };
        let result = FrameDriver::new(config, MemorySource::new(), ImageCrateDecoder);
        assert!(matches!(result, Err(RuntimeError::Config(_))));
    }

    #[test]
    fn ticks_follow_the_clock() {
        let mut d = driver(MemorySource::new());
        let counter = Arc::new(Counter::default());
        d.tick_registry().register(&counter);

        let mut total = 0;
        for _ in 0..5 {
            total += d.run_frame(0.02).unwrap().ticks;
        }
        assert_eq!(total, 6);
        assert_eq!(counter.0.load(Ordering::Relaxed), 6);
        assert_eq!(d.clock().tick_count(), 6);
        assert_eq!(d.frame_count(), 5);
    }

    #[test]
    fn invalid_delta_fails_frame_without_dispatch() {
        let mut d = driver(MemorySource::new());
        let counter = Arc::new(Counter::default());
        d.tick_registry().register(&counter);

        assert!(matches!(
            d.run_frame(-1.0),
            Err(RuntimeError::Clock(ClockError::InvalidInput { .. }))
        ));
        assert_eq!(counter.0.load(Ordering::Relaxed), 0);
        assert_eq!(d.frame_count(), 0);
    }

    #[test]
    fn pipeline_advances_before_render() {
        let mut d = driver(MemorySource::new().with("hero.png", png(2, 2)));
        let texture = d.assets_mut().request_load("hero.png");
        let watcher = Arc::new(Watcher {
            texture,
            seen: Mutex::new(Vec::new()),
        });
        d.render_registry().register(&watcher);

        let first = d.run_frame(0.0).unwrap();
        assert!(matches!(first.asset_work, FrameWork::Decoded { .. }));
        let second = d.run_frame(0.0).unwrap();
        assert!(matches!(second.asset_work, FrameWork::Uploaded { .. }));
        assert_eq!(second.rendered, 1);

        let seen = watcher.seen.lock().unwrap();
        assert_eq!(seen[0].1, TextureState::Pending);
        assert_eq!(seen[1].1, TextureState::Resident);
    }

    #[test]
    fn render_receives_clock_alpha() {
        let mut d = driver(MemorySource::new());
        let watcher = Arc::new(Watcher {
            texture: d.assets_mut().request_load("missing.png"),
            seen: Mutex::new(Vec::new()),
        });
        d.render_registry().register(&watcher);

        let report = d.run_frame(1.0 / 120.0).unwrap();
        assert_eq!(report.ticks, 0);
        let (alpha, state) = watcher.seen.lock().unwrap()[0];
        assert!((alpha - 0.5).abs() < 1e-9);
        assert!((report.alpha - alpha).abs() < f64::EPSILON);
        assert_eq!(state, TextureState::Placeholder);
    }

    #[test]
    fn diagnostics_record_timings() {
        let config = RuntimeConfig {
            diagnostics: DiagnosticsConfig {
                enabled: true,
                sample_every_n_ticks: 2,
            },
            ..RuntimeConfig::default()
        };
        let mut d = FrameDriver::new(config, MemorySource::new(), ImageCrateDecoder).unwrap();
        for _ in 0..10 {
            d.run_frame(1.0 / 60.0).unwrap();
        }
        assert_eq!(d.update_timer().count(), 10);
        assert_eq!(d.render_timer().count(), 10);
        assert_eq!(d.tick_registry().dispatch_count(), 10);
    }

    #[test]
    fn run_until_stops_on_predicate() {
        let mut d = driver(MemorySource::new());
        let frames = d.run_until(|report| report.frame < 3).unwrap();
        assert_eq!(frames, 3);
        assert_eq!(d.frame_count(), 3);
    }

    #[test]
    fn registration_from_another_thread() {
        let d = driver(MemorySource::new());
        let counter = Arc::new(Counter::default());
        let registry = d.tick_registry().clone();
        let c = counter.clone();
        std::thread::spawn(move || registry.register(&c))
            .join()
            .unwrap();
        assert_eq!(d.tick_registry().len(), 1);
    }
}
