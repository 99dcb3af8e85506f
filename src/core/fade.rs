//=========================================================================
// Fade Controller
//=========================================================================
//
// Drives the normalized cutout value of the transition mask.
//
// Convention: 0.0 = scene fully visible, 1.0 = scene fully obscured.
//
// Each fade recomputes the cutout from frame wall time, pushes it to the
// `MaskSink`, then suspends until the next frame. The terminal value is
// applied exactly on completion.
//
// Redundant requests:
//   same target as the running fade  → join it, no restart
//   opposite target                  → supersede from the current value
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use futures::executor::LocalSpawner;
use futures::task::{LocalSpawnExt, SpawnError};
use log::debug;

//=== Internal Dependencies ===============================================

use super::frame::FrameDriver;

//=== MaskSink ============================================================

/// Visual mask receiving one cutout value per frame.
pub trait MaskSink {
    fn set_cutout(&self, cutout: f32);
}

/// Sink for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMask;

impl MaskSink for NullMask {
    fn set_cutout(&self, _cutout: f32) {}
}

//=== FadeDirection / FadeOutcome =========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeDirection {
    /// Visible → obscured.
    Out,
    /// Obscured → visible.
    In,
}

impl FadeDirection {
    pub const fn target(self) -> f32 {
        match self {
            Self::Out => 1.0,
            Self::In => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeOutcome {
    /// The terminal value was applied.
    Completed,
    /// A fade toward the other target took over.
    Superseded,
}

//=== FadeController ======================================================

#[derive(Debug, Clone, Copy)]
struct ActiveFade {
    id: u64,
    target: f32,
}

struct FadeState {
    cutout: f32,
    active: Option<ActiveFade>,
    next_id: u64,
    sink: Rc<dyn MaskSink>,
}

/// Shared handle to the transition mask.
#[derive(Clone)]
pub struct FadeController {
    state: Rc<RefCell<FadeState>>,
    frames: FrameDriver,
    spawner: LocalSpawner,
}

enum FadePlan {
    Run { id: u64 },
    Join { id: u64 },
}

impl FadeController {
    /// Creates a controller starting fully visible.
    pub fn new(sink: Rc<dyn MaskSink>, frames: FrameDriver, spawner: LocalSpawner) -> Self {
        Self {
            state: Rc::new(RefCell::new(FadeState {
                cutout: 0.0,
                active: None,
                next_id: 0,
                sink,
            })),
            frames,
            spawner,
        }
    }

    //--- Queries ----------------------------------------------------------

    pub fn cutout(&self) -> f32 {
        self.state.borrow().cutout
    }

    pub fn is_fading(&self) -> bool {
        self.state.borrow().active.is_some()
    }

    //--- Fades ------------------------------------------------------------

    pub fn fade_out(&self, duration: Duration) -> impl Future<Output = FadeOutcome> + 'static {
        self.fade(FadeDirection::Out, duration)
    }

    pub fn fade_in(&self, duration: Duration) -> impl Future<Output = FadeOutcome> + 'static {
        self.fade(FadeDirection::In, duration)
    }

    /// Starts (or joins) a fade toward `direction`'s terminal value.
    ///
    /// The decision to join or supersede happens at call time, so two
    /// requests issued in the same frame never race.
    pub fn fade(
        &self,
        direction: FadeDirection,
        duration: Duration,
    ) -> impl Future<Output = FadeOutcome> + 'static {
        let target = direction.target();
        let plan = {
            let mut state = self.state.borrow_mut();
            match state.active {
                Some(active) if active.target == target => FadePlan::Join { id: active.id },
                _ => {
                    let id = state.next_id;
                    state.next_id += 1;
                    state.active = Some(ActiveFade { id, target });
                    FadePlan::Run { id }
                }
            }
        };

        let claim = match plan {
            FadePlan::Run { id } => Some(FadeClaim {
                state: self.state.clone(),
                id,
            }),
            FadePlan::Join { .. } => None,
        };

        let this = self.clone();
        async move {
            let _claim = claim;
            match plan {
                FadePlan::Run { id } => this.run(id, target, duration).await,
                FadePlan::Join { id } => this.join(id, target).await,
            }
        }
    }

    /// Fire-and-forget fade; `on_complete` runs only if the fade completes.
    pub fn spawn_fade(
        &self,
        direction: FadeDirection,
        duration: Duration,
        on_complete: Option<Box<dyn FnOnce()>>,
    ) -> Result<(), SpawnError> {
        let fade = self.fade(direction, duration);
        self.spawner.spawn_local(async move {
            if fade.await == FadeOutcome::Completed {
                if let Some(callback) = on_complete {
                    callback();
                }
            }
        })
    }

    /// Cancels any running fade and applies `cutout` at once.
    pub fn set_immediate(&self, cutout: f32) {
        self.state.borrow_mut().active = None;
        self.apply(cutout.clamp(0.0, 1.0));
    }

    //--- Internal Helpers -------------------------------------------------

    async fn run(&self, id: u64, target: f32, duration: Duration) -> FadeOutcome {
        let from = self.cutout();
        let started = self.frames.wall_time();
        // Time scales with the remaining distance so a resumed fade keeps
        // the same speed.
        let span = duration.mul_f32((target - from).abs());

        loop {
            if !self.is_current(id) {
                debug!("Fade {} superseded at cutout {:.3}", id, self.cutout());
                return FadeOutcome::Superseded;
            }

            let elapsed = self.frames.wall_time().saturating_sub(started);
            if span.is_zero() || elapsed >= span {
                self.state.borrow_mut().active = None;
                self.apply(target);
                return FadeOutcome::Completed;
            }

            let progress = elapsed.as_secs_f32() / span.as_secs_f32();
            self.apply(from + (target - from) * progress);
            self.frames.next_frame().await;
        }
    }

    async fn join(&self, id: u64, target: f32) -> FadeOutcome {
        while self.is_current(id) {
            self.frames.next_frame().await;
        }

        if self.cutout() == target {
            FadeOutcome::Completed
        } else {
            FadeOutcome::Superseded
        }
    }

    fn is_current(&self, id: u64) -> bool {
        self.state.borrow().active.map(|active| active.id) == Some(id)
    }

    fn apply(&self, cutout: f32) {
        let sink = {
            let mut state = self.state.borrow_mut();
            state.cutout = cutout;
            state.sink.clone()
        };
        sink.set_cutout(cutout);
    }
}

/// Held by the future driving a fade. Releases the active slot if that
/// future is dropped before it finishes.
struct FadeClaim {
    state: Rc<RefCell<FadeState>>,
    id: u64,
}

impl Drop for FadeClaim {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        if state.active.is_some_and(|active| active.id == self.id) {
            debug!("Fade {} dropped at cutout {:.3}", self.id, state.cutout);
            state.active = None;
        }
    }
}

impl std::fmt::Debug for FadeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("FadeController")
            .field("cutout", &state.cutout)
            .field("active", &state.active)
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::LocalPool;
    use std::cell::Cell;

    const FRAME: Duration = Duration::from_millis(16);

    #[derive(Default)]
    struct RecordingMask {
        values: RefCell<Vec<f32>>,
    }

    impl MaskSink for RecordingMask {
        fn set_cutout(&self, cutout: f32) {
            self.values.borrow_mut().push(cutout);
        }
    }

    fn setup() -> (LocalPool, FrameDriver, FadeController, Rc<RecordingMask>) {
        let pool = LocalPool::new();
        let frames = FrameDriver::new();
        let mask = Rc::new(RecordingMask::default());
        let fade = FadeController::new(mask.clone(), frames.clone(), pool.spawner());
        (pool, frames, fade, mask)
    }

    fn tick(pool: &mut LocalPool, frames: &FrameDriver) {
        frames.advance(FRAME);
        pool.run_until_stalled();
    }

    #[test]
    fn fade_out_reaches_exact_terminal_value() {
        let (mut pool, frames, fade, mask) = setup();
        let outcome = Rc::new(Cell::new(None));

        let task_outcome = outcome.clone();
        let task = fade.fade_out(Duration::from_millis(100));
        pool.spawner()
            .spawn_local(async move { task_outcome.set(Some(task.await)) })
            .unwrap();

        pool.run_until_stalled();
        for _ in 0..10 {
            tick(&mut pool, &frames);
        }

        assert_eq!(outcome.get(), Some(FadeOutcome::Completed));
        assert_eq!(fade.cutout(), 1.0);
        assert!(!fade.is_fading());

        let values = mask.values.borrow();
        assert_eq!(values.first().copied(), Some(0.0));
        assert_eq!(values.last().copied(), Some(1.0));
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn fade_out_then_in_round_trips_to_visible() {
        let (mut pool, frames, fade, _mask) = setup();

        let out = fade.fade_out(Duration::from_millis(80));
        let fade_in = fade.clone();
        pool.spawner()
            .spawn_local(async move {
                out.await;
                fade_in.fade_in(Duration::from_millis(80)).await;
            })
            .unwrap();

        pool.run_until_stalled();
        for _ in 0..20 {
            tick(&mut pool, &frames);
        }

        assert_eq!(fade.cutout(), 0.0);
        assert!(!fade.is_fading());
    }

    #[test]
    fn redundant_fade_joins_instead_of_restarting() {
        let (mut pool, frames, fade, _mask) = setup();

        let first = fade.fade_out(Duration::from_millis(100));
        pool.spawner().spawn_local(async move { first.await; }).unwrap();
        pool.run_until_stalled();
        for _ in 0..3 {
            tick(&mut pool, &frames);
        }
        let midway = fade.cutout();
        assert!(midway > 0.0 && midway < 1.0);

        let joined = Rc::new(Cell::new(None));
        let task_joined = joined.clone();
        let second = fade.fade_out(Duration::from_millis(100));
        pool.spawner()
            .spawn_local(async move { task_joined.set(Some(second.await)) })
            .unwrap();

        pool.run_until_stalled();
        assert!(fade.cutout() >= midway);

        for _ in 0..5 {
            tick(&mut pool, &frames);
        }
        assert_eq!(joined.get(), Some(FadeOutcome::Completed));
        assert_eq!(fade.cutout(), 1.0);
    }

    #[test]
    fn opposite_fade_supersedes_running_one() {
        let (mut pool, frames, fade, _mask) = setup();
        let first_outcome = Rc::new(Cell::new(None));

        let task_outcome = first_outcome.clone();
        let first = fade.fade_out(Duration::from_millis(100));
        pool.spawner()
            .spawn_local(async move { task_outcome.set(Some(first.await)) })
            .unwrap();
        pool.run_until_stalled();
        tick(&mut pool, &frames);
        tick(&mut pool, &frames);

        let back = fade.fade_in(Duration::from_millis(100));
        pool.spawner().spawn_local(async move { back.await; }).unwrap();
        for _ in 0..10 {
            tick(&mut pool, &frames);
        }

        assert_eq!(first_outcome.get(), Some(FadeOutcome::Superseded));
        assert_eq!(fade.cutout(), 0.0);
    }

    #[test]
    fn zero_duration_applies_terminal_value_immediately() {
        let (mut pool, _frames, fade, _mask) = setup();
        let task = fade.fade_out(Duration::ZERO);
        pool.spawner().spawn_local(async move { task.await; }).unwrap();
        pool.run_until_stalled();

        assert_eq!(fade.cutout(), 1.0);
    }

    #[test]
    fn spawn_fade_invokes_completion_callback() {
        let (mut pool, frames, fade, _mask) = setup();
        let called = Rc::new(Cell::new(false));

        let flag = called.clone();
        fade.spawn_fade(
            FadeDirection::Out,
            Duration::from_millis(32),
            Some(Box::new(move || flag.set(true))),
        )
        .unwrap();

        pool.run_until_stalled();
        assert!(!called.get());
        for _ in 0..3 {
            tick(&mut pool, &frames);
        }
        assert!(called.get());
    }

    #[test]
    fn dropped_fade_releases_the_active_slot() {
        let (mut pool, frames, fade, _mask) = setup();

        drop(fade.fade_out(Duration::from_millis(100)));
        assert!(!fade.is_fading());

        let outcome = Rc::new(Cell::new(None));
        let task_outcome = outcome.clone();
        let task = fade.fade_out(Duration::from_millis(100));
        pool.spawner()
            .spawn_local(async move { task_outcome.set(Some(task.await)) })
            .unwrap();
        pool.run_until_stalled();
        for _ in 0..10 {
            tick(&mut pool, &frames);
        }

        assert_eq!(outcome.get(), Some(FadeOutcome::Completed));
        assert_eq!(fade.cutout(), 1.0);
    }

    #[test]
    fn fade_dropped_midway_frees_the_next_fade() {
        let (mut pool, frames, fade, _mask) = setup();

        let mut running = Box::pin(fade.fade_out(Duration::from_millis(100)));
        assert!(futures::FutureExt::now_or_never(running.as_mut()).is_none());
        frames.advance(FRAME);
        assert!(futures::FutureExt::now_or_never(running.as_mut()).is_none());
        drop(running);

        assert!(!fade.is_fading());
        let midway = fade.cutout();
        assert!(midway > 0.0 && midway < 1.0);
        assert!(futures::FutureExt::now_or_never(fade.fade_in(Duration::ZERO)).is_some());
        assert_eq!(fade.cutout(), 0.0);
        pool.run_until_stalled();
    }
}
