//=========================================================================
// Aetheric Lifecycle Engine
//
// Main entry point and frame loop of the lifecycle core.
//
// Architecture:
// ```text
//     EngineBuilder  ──build()──>  Engine  ──run()/tick()──>  [Frame Loop]
//         │                          │
//         ├─ with_tps()              ├─ LocalPool (cooperative tasks)
//         ├─ with_fade_duration()    ├─ CoreContext (subsystem handles)
//         └─ with_back_debounce()    └─ EventCollector (platform events)
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Sender};
use futures::executor::LocalPool;
use log::{debug, info};

//=== Internal Dependencies ===============================================

use crate::core::config::LifecycleConfig;
use crate::core::globals::{Collaborators, CoreContext};
use crate::core::platform_bridge::{EventCollector, PlatformEvent, TickControl};
use crate::core::scene::{SceneCatalog, SceneContext, SceneName, TransitionHandle};

//=== EngineBuilder =======================================================

/// Builder for configuring and constructing an [`Engine`].
///
/// # Default Values
///
/// See [`LifecycleConfig`].
///
/// # Examples
///
/// ```no_run
/// # use std::time::Duration;
/// # use aetheric_lifecycle::prelude::*;
/// # fn collaborators() -> Collaborators { unimplemented!() }
/// struct Title;
/// impl SceneAdapter for Title {}
///
/// let engine = EngineBuilder::new()
///     .with_tps(120.0)
///     .with_fade_duration(Duration::from_millis(500))
///     .build(collaborators())
///     .init(|catalog| {
///         catalog.register_scene("Title", || Title);
///         catalog.set_fallback("Title");
///     });
///
/// engine.launch("Title");
/// engine.run();
/// ```
#[derive(Debug, Clone, Default)]
pub struct EngineBuilder {
    config: LifecycleConfig,
}

impl EngineBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the target ticks per second of [`Engine::run`].
    ///
    /// Default: 60.0
    ///
    /// # Panics
    ///
    /// Panics if `tps <= 0.0`.
    pub fn with_tps(mut self, tps: f64) -> Self {
        assert!(tps > 0.0, "TPS must be positive, got {}", tps);
        self.config.tps = tps;
        self
    }

    /// Sets the channel capacity for platform → core communication.
    ///
    /// Default: 128
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.config.channel_capacity = capacity;
        self
    }

    /// Sets the duration of a full fade (visible ↔ obscured).
    ///
    /// Default: 300 ms. Zero makes transitions cut instantly.
    pub fn with_fade_duration(mut self, duration: Duration) -> Self {
        self.config.fade_duration = duration;
        self
    }

    /// Sets the ceiling of a single TimeKeeper step.
    ///
    /// Default: 100 ms
    ///
    /// # Panics
    ///
    /// Panics if `max_delta` is zero.
    pub fn with_max_delta(mut self, max_delta: Duration) -> Self {
        assert!(!max_delta.is_zero(), "Max delta must be positive");
        self.config.max_delta = max_delta;
        self
    }

    /// Sets the cooldown after a processed back press.
    ///
    /// Default: 300 ms
    pub fn with_back_debounce(mut self, debounce: Duration) -> Self {
        self.config.back_debounce = debounce;
        self
    }

    /// Whether the prev stack is emptied when a scene starts loading.
    ///
    /// Default: true
    pub fn with_prev_cleared_on_scene_loading(mut self, clear: bool) -> Self {
        self.config.clear_prev_on_scene_loading = clear;
        self
    }

    /// Builds the engine around `collaborators`.
    ///
    /// The scene catalog starts empty; fill it with [`Engine::init`].
    pub fn build(self, collaborators: Collaborators) -> Engine {
        let config = self.config;
        info!(
            "Building engine (TPS: {}, channel: {}, fade: {:?})",
            config.tps, config.channel_capacity, config.fade_duration
        );

        let pool = LocalPool::new();
        let cx = CoreContext::new(&config, collaborators, pool.spawner());
        let (sender, receiver) = bounded(config.channel_capacity);

        Engine {
            pool,
            cx,
            collector: EventCollector::new(receiver),
            sender,
            config,
        }
    }
}

//=== Engine ==============================================================

/// Lifecycle core runtime.
///
/// Owns the cooperative executor every transition, fade and load runs on.
/// Drive it either with [`Engine::run`] (fixed-rate loop, blocks) or by
/// calling [`Engine::tick`] from a host frame loop.
///
/// # Architecture
///
/// ```text
/// Engine (Logic Thread)
///   ├─► tick(dt)
///   │     ├─ drain PlatformEvents  → PrevStack::handle_back
///   │     ├─ FrameDriver::advance  → wake NextFrame waiters
///   │     ├─ TimeKeeper::advance
///   │     ├─ LocalPool::run_until_stalled
///   │     └─ SceneDirector::update_active
///   │
///   └─► Platform (any thread)
///         └─ Sender<PlatformEvent>
/// ```
pub struct Engine {
    pool: LocalPool,
    cx: CoreContext,
    collector: EventCollector,
    sender: Sender<PlatformEvent>,
    config: LifecycleConfig,
}

impl Engine {
    //--- Initialization ---------------------------------------------------

    /// Registers scenes before the first transition.
    pub fn init<F>(self, init_fn: F) -> Self
    where
        F: FnOnce(&mut SceneCatalog),
    {
        info!("Initializing scene catalog");

        self.cx.director().with_catalog(init_fn);

        info!("Engine initialization complete");
        self
    }

    //--- Accessors --------------------------------------------------------

    pub fn context(&self) -> &CoreContext {
        &self.cx
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// New sender for a platform thread.
    pub fn platform_sender(&self) -> Sender<PlatformEvent> {
        self.sender.clone()
    }

    //--- Transitions ------------------------------------------------------

    /// Starts on the default context of `name` (fallback scene if unknown).
    pub fn launch(&self, name: impl Into<SceneName>) -> TransitionHandle {
        self.cx.launch(name)
    }

    pub fn go_to_next_scene(&self, context: SceneContext) -> TransitionHandle {
        self.cx.go_to_next_scene(context)
    }

    //--- Execution --------------------------------------------------------

    /// Advances the lifecycle core by one frame of `dt` wall time.
    pub fn tick(&mut self, dt: Duration) -> TickControl {
        //--- Step 1: Gather platform events ----------------------------
        if self.collector.collect_frame() == TickControl::Exit {
            return TickControl::Exit;
        }
        for _ in 0..self.collector.back_presses() {
            let outcome = self.cx.prev().handle_back();
            debug!("Back press: {:?}", outcome);
        }

        //--- Step 2: Advance clocks ------------------------------------
        self.cx.frames().advance(dt);
        self.cx.time().advance(dt);

        //--- Step 3: Resume tasks --------------------------------------
        self.pool.run_until_stalled();

        //--- Step 4: Update the active scene ---------------------------
        self.cx.director().update_active(&self.cx);
        self.pool.run_until_stalled();

        TickControl::Continue
    }

    /// Runs queued tasks without advancing time.
    pub fn run_until_stalled(&mut self) {
        self.pool.run_until_stalled();
    }

    /// Fixed-rate frame loop. Blocks until a `Quit` event arrives.
    pub fn run(mut self) {
        let frame_duration = self.config.frame_duration();
        info!("Starting engine runtime (TPS: {})", self.config.tps);

        let mut last = Instant::now();
        loop {
            let frame_start = Instant::now();
            let dt = frame_start.duration_since(last);
            last = frame_start;

            if self.tick(dt) == TickControl::Exit {
                info!("Frame loop exiting");
                break;
            }

            //--- Maintain deterministic pacing -------------------------
            let elapsed = frame_start.elapsed();
            if elapsed < frame_duration {
                thread::sleep(frame_duration - elapsed);
            }
        }

        info!("Engine shutdown complete");
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("cx", &self.cx)
            .finish_non_exhaustive()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scene::SceneAdapter;
    use crate::core::testing::mock_collaborators;
    use std::cell::Cell;
    use std::rc::Rc;

    const FRAME: Duration = Duration::from_millis(16);

    struct Empty;
    impl SceneAdapter for Empty {}

    fn engine() -> Engine {
        EngineBuilder::new()
            .build(mock_collaborators().0)
            .init(|catalog| {
                catalog.register_scene("Boot", || Empty);
                catalog.set_fallback("Boot");
            })
    }

    //=====================================================================
    // EngineBuilder Tests
    //=====================================================================

    #[test]
    fn builder_defaults() {
        let builder = EngineBuilder::new();
        assert_eq!(builder.config, LifecycleConfig::default());
        assert_eq!(builder.config.tps, 60.0);
        assert_eq!(builder.config.channel_capacity, 128);
    }

    #[test]
    #[should_panic(expected = "TPS must be positive")]
    fn builder_with_tps_panics_on_zero() {
        EngineBuilder::new().with_tps(0.0);
    }

    #[test]
    #[should_panic(expected = "TPS must be positive")]
    fn builder_with_tps_panics_on_negative() {
        EngineBuilder::new().with_tps(-60.0);
    }

    #[test]
    #[should_panic(expected = "Channel capacity must be positive")]
    fn builder_with_channel_capacity_panics_on_zero() {
        EngineBuilder::new().with_channel_capacity(0);
    }

    #[test]
    #[should_panic(expected = "Max delta must be positive")]
    fn builder_with_max_delta_panics_on_zero() {
        EngineBuilder::new().with_max_delta(Duration::ZERO);
    }

    #[test]
    fn builder_fluent_api_chaining() {
        let engine = EngineBuilder::new()
            .with_tps(120.0)
            .with_channel_capacity(256)
            .with_fade_duration(Duration::ZERO)
            .with_prev_cleared_on_scene_loading(false)
            .build(mock_collaborators().0);

        assert_eq!(engine.config().tps, 120.0);
        assert_eq!(engine.config().channel_capacity, 256);
        assert_eq!(engine.config().fade_duration, Duration::ZERO);
        assert!(!engine.config().clear_prev_on_scene_loading);
    }

    //=====================================================================
    // Frame Loop Tests
    //=====================================================================

    #[test]
    fn quit_event_exits() {
        let mut engine = engine();
        engine.platform_sender().send(PlatformEvent::Quit).unwrap();

        assert_eq!(engine.tick(FRAME), TickControl::Exit);
    }

    #[test]
    fn back_event_reaches_prev_stack() {
        let mut engine = engine();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        engine.context().prev().push(move || h.set(h.get() + 1));

        engine.platform_sender().send(PlatformEvent::BackPressed).unwrap();
        engine.platform_sender().send(PlatformEvent::BackPressed).unwrap();
        engine.tick(FRAME);

        // Second press in the same frame falls inside the debounce window.
        assert_eq!(hits.get(), 1);
        assert!(engine.context().prev().is_empty());
    }

    #[test]
    fn tick_advances_clocks() {
        let mut engine = engine();
        engine.tick(FRAME);
        engine.tick(FRAME);

        assert_eq!(engine.context().frames().frame(), 2);
        assert_eq!(engine.context().frames().wall_time(), FRAME * 2);
        assert!((engine.context().time().t() - 0.032).abs() < 1e-9);
    }

    #[test]
    fn launch_completes_under_ticks() {
        let mut engine = engine();
        let handle = engine.launch("Boot");
        assert!(handle.is_accepted());

        for _ in 0..120 {
            engine.tick(FRAME);
        }
        assert_eq!(
            engine.context().director().current_scene(),
            Some(SceneName::from("Boot"))
        );
        assert!(!engine.context().director().is_transitioning());
    }
}
