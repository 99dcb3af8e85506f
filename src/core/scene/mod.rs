//=========================================================================
// Scene System
//=========================================================================
//
// Scene descriptors, behavior hooks and the transition state machine.
//
// Architecture:
//   SceneDirector
//     ├─ catalog: SceneCatalog  (name → adapter factory, default context)
//     ├─ active:  ActiveScene   (context + adapter + loaded engine scenes)
//     └─ loader:  dyn SceneLoader
//
// Flow:
//   go_to_next_scene() → SceneLoading → fade out → teardown → load
//                      → adapter hooks → fade in → SceneReady
//
//=========================================================================

//=== External Dependencies ===============================================

use std::borrow::Cow;
use std::fmt;

use futures::future::LocalBoxFuture;
use futures::FutureExt;

//=== Internal Dependencies ===============================================

use crate::core::error::TransitionError;
use crate::core::globals::CoreContext;

//=== Module Declarations =================================================

mod catalog;
mod context;
mod director;
mod loader;

//=== Public API ==========================================================

pub use catalog::SceneCatalog;
pub use context::{SceneContext, SceneContextBuilder};
pub use director::{
    DirectorState, SceneDirector, SceneLoading, SceneReady, SceneTransitionFailed,
    TransitionHandle,
};
pub use loader::SceneLoader;

//=== SceneName ===========================================================

/// Engine-level scene identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneName(Cow<'static, str>);

impl SceneName {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SceneName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SceneName {
    fn from(name: &str) -> Self {
        Self(Cow::Owned(name.to_owned()))
    }
}

impl From<String> for SceneName {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl From<&SceneName> for SceneName {
    fn from(name: &SceneName) -> Self {
        name.clone()
    }
}

impl PartialEq<str> for SceneName {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for SceneName {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

//=== SceneAdapter Trait ==================================================

/// Live behavior object bound to an active scene.
///
/// The director creates one through the catalog after the scene's engine
/// objects and declared assets are loaded, and drops it when the scene
/// unloads. Every hook has a default, so an empty adapter is valid:
///
/// ```rust
/// # use aetheric_lifecycle::prelude::*;
/// struct TitleScene;
///
/// impl SceneAdapter for TitleScene {}
/// ```
pub trait SceneAdapter {
    /// Runs once after loading, before the fade in. May await further
    /// asset work; an error fails the transition.
    fn init_after_load_scene<'a>(
        &'a mut self,
        _cx: &'a CoreContext,
        _context: &'a SceneContext,
    ) -> LocalBoxFuture<'a, Result<(), TransitionError>> {
        futures::future::ready(Ok(())).boxed_local()
    }

    /// Runs right after `init_after_load_scene` succeeds.
    fn on_startup_scene(&mut self, _cx: &CoreContext, _context: &SceneContext) {}

    /// Called every frame while the scene is active and no transition runs.
    fn update(&mut self, _cx: &CoreContext) {}

    /// Called before the scene's engine objects are unloaded.
    fn on_unload_scene(&mut self, _cx: &CoreContext) {}
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const BOOT: SceneName = SceneName::from_static("Boot");

    #[test]
    fn static_and_owned_names_compare_equal() {
        assert_eq!(BOOT, SceneName::from("Boot"));
        assert_eq!(BOOT, "Boot");
        assert_eq!(BOOT.to_string(), "Boot");
    }

    #[test]
    fn names_hash_by_content() {
        let mut set = HashSet::new();
        set.insert(BOOT);
        set.insert(SceneName::from(String::from("Boot")));
        assert_eq!(set.len(), 1);
    }
}
