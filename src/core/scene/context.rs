//=========================================================================
// Scene Context
//=========================================================================
//
// Immutable descriptor of a transition target: main scene, additive
// sub-scenes, assets to retain before activation, optional payload.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::fmt;

//=== Internal Dependencies ===============================================

use super::SceneName;

//=== SceneContext ========================================================

pub struct SceneContext {
    scene: SceneName,
    additive: Vec<SceneName>,
    assets: Vec<String>,
    payload: Option<Box<dyn Any>>,
}

impl SceneContext {
    /// Context for `scene` with no sub-scenes, assets or payload.
    pub fn new(scene: impl Into<SceneName>) -> Self {
        Self::builder(scene).build()
    }

    pub fn builder(scene: impl Into<SceneName>) -> SceneContextBuilder {
        SceneContextBuilder {
            context: Self {
                scene: scene.into(),
                additive: Vec::new(),
                assets: Vec::new(),
                payload: None,
            },
        }
    }

    pub fn scene(&self) -> &SceneName {
        &self.scene
    }

    /// Additive sub-scenes, in load order.
    pub fn additive_scenes(&self) -> &[SceneName] {
        &self.additive
    }

    /// Asset addresses retained in Scene scope before activation.
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// Payload carried from the previous scene, if it is a `T`.
    pub fn payload<T: Any>(&self) -> Option<&T> {
        self.payload.as_ref()?.downcast_ref::<T>()
    }

    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }
}

impl fmt::Debug for SceneContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneContext")
            .field("scene", &self.scene)
            .field("additive", &self.additive)
            .field("assets", &self.assets)
            .field("payload", &self.payload.is_some())
            .finish()
    }
}

//=== SceneContextBuilder =================================================

/// Fluent construction of a [`SceneContext`].
///
/// ```rust
/// # use aetheric_lifecycle::prelude::*;
/// let context = SceneContext::builder("Title")
///     .additive("TitleUi")
///     .asset("texts")
///     .payload(3u32)
///     .build();
///
/// assert_eq!(context.payload::<u32>(), Some(&3));
/// ```
#[must_use]
pub struct SceneContextBuilder {
    context: SceneContext,
}

impl SceneContextBuilder {
    pub fn additive(mut self, scene: impl Into<SceneName>) -> Self {
        self.context.additive.push(scene.into());
        self
    }

    pub fn asset(mut self, address: impl Into<String>) -> Self {
        self.context.assets.push(address.into());
        self
    }

    pub fn assets<I, A>(mut self, addresses: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.context.assets.extend(addresses.into_iter().map(Into::into));
        self
    }

    pub fn payload<T: Any>(mut self, payload: T) -> Self {
        self.context.payload = Some(Box::new(payload));
        self
    }

    pub fn build(self) -> SceneContext {
        self.context
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
