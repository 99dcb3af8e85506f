//=========================================================================
// Scene Loader Interface
//=========================================================================
//
// Engine scene-loading primitive consumed by the director.
//
//=========================================================================

//=== External Dependencies ===============================================

use futures::future::LocalBoxFuture;

//=== Internal Dependencies ===============================================

use super::SceneName;
use crate::core::error::LoadError;

//=== SceneLoader =========================================================

/// Loads and unloads engine scenes.
///
/// `additive == false` replaces the engine's main scene; additive loads
/// stack sub-scenes on top of it.
pub trait SceneLoader {
    fn load_scene(&self, name: &SceneName, additive: bool) -> LocalBoxFuture<'static, Result<(), LoadError>>;

    fn unload_scene(&self, name: &SceneName) -> LocalBoxFuture<'static, Result<(), LoadError>>;
}
