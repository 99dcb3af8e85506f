//=========================================================================
// Signal Hub
//=========================================================================
//
// Typed pub/sub event buses in two scopes.
//
// Architecture:
//   SignalHub
//     ├─ global: SignalRegistry   (process lifetime)
//     └─ scene:  SignalRegistry   (cleared on every SceneLoading)
//
// The engine subscribes `scene().clear()` to the director's
// `SceneLoading` event, so subscribers owned by a scene never outlive it.
//
//=========================================================================

//=== Module Declarations =================================================

mod dispatcher;
mod registry;

//=== Public API ==========================================================

pub use dispatcher::{Event, Signal, SubscriptionId};
pub use registry::SignalRegistry;

//=== SignalHub ===========================================================

/// Global and scene-scoped signal registries.
#[derive(Debug, Clone)]
pub struct SignalHub {
    global: SignalRegistry,
    scene: SignalRegistry,
}

impl SignalHub {
    pub fn new() -> Self {
        Self {
            global: SignalRegistry::new("global"),
            scene: SignalRegistry::new("scene"),
        }
    }

    /// Registry living for the whole process.
    pub fn global(&self) -> &SignalRegistry {
        &self.global
    }

    /// Registry whose subscribers are dropped at every scene boundary.
    pub fn scene(&self) -> &SignalRegistry {
        &self.scene
    }
}

impl Default for SignalHub {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
