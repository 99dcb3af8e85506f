//=========================================================================
// Collaborators
//=========================================================================
//
// Engine-side implementations the lifecycle core drives but does not own:
// scene loading, asset loading, the transition mask and UI widgets.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::rc::Rc;

//=== Internal Dependencies ===============================================

use crate::core::fade::{MaskSink, NullMask};
use crate::core::resources::AssetBackend;
use crate::core::scene::SceneLoader;
use crate::core::ui::{NullUi, UiHooks};

//=== Collaborators =======================================================

/// Bundle of engine collaborators handed to `EngineBuilder::build`.
///
/// The mask and UI default to headless implementations.
pub struct Collaborators {
    pub scene_loader: Rc<dyn SceneLoader>,
    pub asset_backend: Rc<dyn AssetBackend>,
    pub mask: Rc<dyn MaskSink>,
    pub ui: Rc<dyn UiHooks>,
}

impl Collaborators {
    pub fn new(scene_loader: Rc<dyn SceneLoader>, asset_backend: Rc<dyn AssetBackend>) -> Self {
        Self {
            scene_loader,
            asset_backend,
            mask: Rc::new(NullMask),
            ui: Rc::new(NullUi),
        }
    }

    pub fn with_mask(mut self, mask: Rc<dyn MaskSink>) -> Self {
        self.mask = mask;
        self
    }

    pub fn with_ui(mut self, ui: Rc<dyn UiHooks>) -> Self {
        self.ui = ui;
        self
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
