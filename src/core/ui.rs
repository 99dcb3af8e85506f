//=========================================================================
// UI Hooks
//=========================================================================
//
// Boundary to the project's UI widgets (pop notifications, blocking
// overlay). The lifecycle core only decides *when* they show and close.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::info;

//=== Internal Dependencies ===============================================

use crate::core::scene::SceneName;

//=== Notice ==============================================================

/// Transient user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Back was pressed with an empty prev stack.
    NothingToGoBack,
    /// A scene transition failed; the named scene is what remains active.
    TransitionFailed {
        requested: SceneName,
        active: Option<SceneName>,
    },
}

//=== UiHooks =============================================================

pub trait UiHooks {
    fn pop_notification(&self, notice: &Notice);

    /// Input became blocked (busy count 0 → 1).
    fn show_blocking_overlay(&self) {}

    /// Input is no longer blocked (busy count 1 → 0).
    fn close_blocking_overlay(&self) {}
}

/// Headless UI: notifications go to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullUi;

impl UiHooks for NullUi {
    fn pop_notification(&self, notice: &Notice) {
        info!("Notice: {:?}", notice);
    }
}
