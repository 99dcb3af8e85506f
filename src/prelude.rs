//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use aetheric_lifecycle::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine core
pub use crate::engine::{Engine, EngineBuilder};
pub use crate::core::config::LifecycleConfig;
pub use crate::core::platform_bridge::{PlatformEvent, TickControl};

// Context and collaborators
pub use crate::core::globals::{Collaborators, CoreContext};
pub use crate::core::fade::{FadeDirection, MaskSink};
pub use crate::core::resources::{AssetBackend, AssetHandle, RetainScope};
pub use crate::core::ui::{Notice, UiHooks};

// Scene system
pub use crate::core::scene::{
    SceneAdapter, SceneCatalog, SceneContext, SceneLoader, SceneLoading, SceneName, SceneReady,
    TransitionHandle,
};

// Errors
pub use crate::core::error::{LoadError, TransitionError};

// Prev stack
pub use crate::core::prev::BackOutcome;
