//=========================================================================
// Scene Catalog
//=========================================================================
//
// Registry of the scenes the director can enter.
//
// Each scene has an adapter factory and a default-context factory. One
// registered scene may be designated the fallback (Boot): requests for
// unknown scenes are redirected to it with a warning, which keeps
// direct-scene-launch development workflows working.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::{SceneAdapter, SceneContext, SceneName};
use crate::core::error::TransitionError;

//=== SceneCatalog ========================================================

type AdapterFactory = Box<dyn Fn() -> Box<dyn SceneAdapter>>;
pub(crate) type ContextFactory = Rc<dyn Fn() -> SceneContext>;

struct CatalogEntry {
    adapter: AdapterFactory,
    default_context: ContextFactory,
}

#[derive(Default)]
pub struct SceneCatalog {
    scenes: HashMap<SceneName, CatalogEntry>,
    fallback: Option<SceneName>,
}

impl SceneCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Registration -----------------------------------------------------

    /// Registers a scene whose default context is just its name.
    pub fn register_scene<A, F>(&mut self, name: impl Into<SceneName>, factory: F)
    where
        A: SceneAdapter + 'static,
        F: Fn() -> A + 'static,
    {
        let name = name.into();
        let context_name = name.clone();
        self.register_scene_with_context(name, factory, move || SceneContext::new(context_name.clone()));
    }

    /// Registers a scene with a factory for its default context.
    pub fn register_scene_with_context<A, F, C>(
        &mut self,
        name: impl Into<SceneName>,
        factory: F,
        default_context: C,
    ) where
        A: SceneAdapter + 'static,
        F: Fn() -> A + 'static,
        C: Fn() -> SceneContext + 'static,
    {
        let name = name.into();
        let entry = CatalogEntry {
            adapter: Box::new(move || Box::new(factory()) as Box<dyn SceneAdapter>),
            default_context: Rc::new(default_context),
        };

        if self.scenes.insert(name.clone(), entry).is_some() {
            warn!("Scene {} was already registered and has been replaced", name);
        } else {
            debug!("Registered scene {}", name);
        }
    }

    /// Designates the scene entered in place of unknown ones.
    pub fn set_fallback(&mut self, name: impl Into<SceneName>) {
        let name = name.into();
        if !self.scenes.contains_key(&name) {
            warn!("Fallback scene {} is not registered yet", name);
        }
        self.fallback = Some(name);
    }

    //--- Queries ----------------------------------------------------------

    pub fn contains(&self, name: &SceneName) -> bool {
        self.scenes.contains_key(name)
    }

    pub fn fallback(&self) -> Option<&SceneName> {
        self.fallback.as_ref()
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub(crate) fn create_adapter(&self, name: &SceneName) -> Option<Box<dyn SceneAdapter>> {
        self.scenes.get(name).map(|entry| (entry.adapter)())
    }

    //--- Resolution -------------------------------------------------------

    /// Default context for `name`, or for the fallback scene if unknown.
    pub fn default_context(&self, name: &SceneName) -> Result<SceneContext, TransitionError> {
        self.context_factory(name).map(|factory| factory())
    }

    /// Keeps `context` if its scene is known, otherwise swaps in the
    /// fallback scene's default context.
    pub fn resolve(&self, context: SceneContext) -> Result<SceneContext, TransitionError> {
        self.resolve_deferred(context).map(Resolved::into_context)
    }

    /// Factory of `name`'s default context, or of the fallback's.
    ///
    /// Nothing user-supplied runs here, so callers may invoke the factory
    /// after releasing whatever borrow guards the catalog.
    pub(crate) fn context_factory(&self, name: &SceneName) -> Result<ContextFactory, TransitionError> {
        match self.scenes.get(name) {
            Some(entry) => Ok(entry.default_context.clone()),
            None => self.fallback_factory(name),
        }
    }

    pub(crate) fn resolve_deferred(&self, context: SceneContext) -> Result<Resolved, TransitionError> {
        if self.scenes.contains_key(context.scene()) {
            return Ok(Resolved::Kept(context));
        }
        self.fallback_factory(context.scene()).map(Resolved::Fallback)
    }

    fn fallback_factory(&self, name: &SceneName) -> Result<ContextFactory, TransitionError> {
        let entry = self
            .fallback
            .as_ref()
            .and_then(|fallback| self.scenes.get(fallback).map(|entry| (fallback, entry)));

        match entry {
            Some((fallback, entry)) => {
                warn!("Scene {} is not registered, falling back to {}", name, fallback);
                Ok(entry.default_context.clone())
            }
            None => Err(TransitionError::UnknownScene(name.clone())),
        }
    }
}

/// Outcome of resolving a requested context.
pub(crate) enum Resolved {
    Kept(SceneContext),
    Fallback(ContextFactory),
}

impl Resolved {
    pub(crate) fn into_context(self) -> SceneContext {
        match self {
            Self::Kept(context) => context,
            Self::Fallback(factory) => factory(),
        }
    }
}

impl std::fmt::Debug for SceneCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&SceneName> = self.scenes.keys().collect();
        names.sort();
        f.debug_struct("SceneCatalog")
            .field("scenes", &names)
            .field("fallback", &self.fallback)
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
