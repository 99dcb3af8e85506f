//=========================================================================
// Lifecycle Configuration
//=========================================================================
//
// Tunables collected by `EngineBuilder` and handed to every subsystem at
// construction.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

//=== LifecycleConfig =====================================================

/// Runtime settings of the lifecycle core.
///
/// # Default Values
///
/// - **TPS**: 60.0
/// - **Channel capacity**: 128 platform events
/// - **Fade duration**: 0.3 s per full fade
/// - **Max delta**: 0.1 s per TimeKeeper step
/// - **Back debounce**: 0.3 s
/// - **Clear prev on scene loading**: true
#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleConfig {
    pub tps: f64,
    pub channel_capacity: usize,
    pub fade_duration: Duration,
    pub max_delta: Duration,
    pub back_debounce: Duration,
    pub clear_prev_on_scene_loading: bool,
}

impl LifecycleConfig {
    /// Wall time of one tick at the configured rate.
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tps)
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            tps: 60.0,
            channel_capacity: 128,
            fade_duration: Duration::from_millis(300),
            max_delta: Duration::from_millis(100),
            back_debounce: Duration::from_millis(300),
            clear_prev_on_scene_loading: true,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
