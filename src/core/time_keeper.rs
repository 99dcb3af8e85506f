//=========================================================================
// Time Keeper
//=========================================================================
//
// Scene-scoped virtual clock.
//
// `t` restarts at zero whenever a scene starts loading. Each simulation
// step adds `min(frame_dt * scale, max_dt)`: a stall longer than the
// ceiling drops time instead of producing one huge catch-up step.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use log::debug;

//=== TimeKeeper ==========================================================

#[derive(Debug, Clone, Copy)]
struct Clock {
    t: f64,
    dt: f64,
    max_dt: f64,
    scale: f64,
}

/// Shared handle to the scene clock. All values are in seconds.
#[derive(Debug, Clone)]
pub struct TimeKeeper {
    clock: Rc<Cell<Clock>>,
}

impl TimeKeeper {
    /// Creates a clock whose per-step delta never exceeds `max_dt`.
    ///
    /// # Panics
    ///
    /// Panics if `max_dt` is zero.
    pub fn new(max_dt: Duration) -> Self {
        assert!(!max_dt.is_zero(), "Time step ceiling must be positive");
        Self {
            clock: Rc::new(Cell::new(Clock {
                t: 0.0,
                dt: 0.0,
                max_dt: max_dt.as_secs_f64(),
                scale: 1.0,
            })),
        }
    }

    /// Seconds since the current scene started loading.
    pub fn t(&self) -> f64 {
        self.clock.get().t
    }

    /// Delta applied by the last step.
    pub fn dt(&self) -> f64 {
        self.clock.get().dt
    }

    pub fn max_dt(&self) -> f64 {
        self.clock.get().max_dt
    }

    pub fn time_scale(&self) -> f64 {
        self.clock.get().scale
    }

    pub fn is_paused(&self) -> bool {
        self.time_scale() == 0.0
    }

    //--- Mutation ---------------------------------------------------------

    /// Advances by one simulation step.
    pub fn advance(&self, frame_dt: Duration) {
        let mut clock = self.clock.get();
        clock.dt = (frame_dt.as_secs_f64() * clock.scale).min(clock.max_dt);
        clock.t += clock.dt;
        self.clock.set(clock);
    }

    pub fn reset(&self) {
        let mut clock = self.clock.get();
        clock.t = 0.0;
        clock.dt = 0.0;
        self.clock.set(clock);
        debug!("Scene clock reset");
    }

    /// Negative scales are clamped to zero.
    pub fn set_time_scale(&self, scale: f64) {
        let mut clock = self.clock.get();
        clock.scale = scale.max(0.0);
        self.clock.set(clock);
    }

    pub fn pause(&self) {
        self.set_time_scale(0.0);
    }

    pub fn resume(&self) {
        self.set_time_scale(1.0);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
