//=========================================================================
// Lifecycle Errors
//=========================================================================
//
// Error taxonomy shared by the resource store and the scene director.
//
//   NotFound             → fallback context / `None` getter (warn)
//   ConcurrencyViolation → TransitionError::Busy (warn, caller retries)
//   LoadFailure          → LoadError, surfaced to the awaiting caller
//   InvariantViolation   → ResourceError (error log + debug_assert)
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::resources::RetainScope;
use crate::core::scene::{DirectorState, SceneName};

//=== LoadError ===========================================================

/// Failure reported by an engine collaborator while loading.
///
/// Cloneable because every waiter coalesced onto one in-flight load
/// receives its own copy of the same outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The asset backend could not produce the asset.
    #[error("asset `{address}` failed to load: {reason}")]
    Asset { address: String, reason: String },

    /// The engine could not load or unload a scene.
    #[error("scene `{scene}` failed to load: {reason}")]
    Scene { scene: SceneName, reason: String },

    /// The load task was dropped before it produced a result.
    #[error("load of `{address}` was cancelled")]
    Cancelled { address: String },
}

impl LoadError {
    /// Convenience constructor for backend implementations.
    pub fn asset(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Asset {
            address: address.into(),
            reason: reason.into(),
        }
    }

    /// Convenience constructor for scene loader implementations.
    pub fn scene(scene: impl Into<SceneName>, reason: impl Into<String>) -> Self {
        Self::Scene {
            scene: scene.into(),
            reason: reason.into(),
        }
    }
}

//=== ResourceError =======================================================

/// Misuse of the resource store's retain counts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    /// A release with no matching retain in that scope.
    #[error("`{address}` has no {scope:?} retain to release")]
    NotRetained { address: String, scope: RetainScope },
}

//=== TransitionError =====================================================

/// Why a scene transition request did not reach its target scene.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// Another transition is in flight.
    #[error("cannot go to `{requested}` while the director is {state:?}")]
    Busy {
        requested: SceneName,
        state: DirectorState,
    },

    /// The scene is not in the catalog and no fallback context exists.
    #[error("scene `{0}` is not registered and no fallback scene is set")]
    UnknownScene(SceneName),

    /// Loading the scene or one of its assets failed.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Several assets declared by the context failed to load.
    #[error("{} asset(s) failed to load for `{scene}`", .failed.len())]
    Assets {
        scene: SceneName,
        failed: Vec<LoadError>,
    },

    /// The adapter's after-load hook refused to start the scene.
    #[error("adapter for `{scene}` failed to initialize: {reason}")]
    Adapter { scene: SceneName, reason: String },

    /// The executor shut down before the transition finished.
    #[error("transition to `{0}` was aborted")]
    Aborted(SceneName),
}

//=========================================================================
// Unit Tests
//=========================================================================
