//=========================================================================
// Core Context
//=========================================================================
//
// Cheaply cloneable bundle of handles to every lifecycle subsystem.
//
// Scenes receive `&CoreContext` in every adapter hook. Each field is a
// shared handle, so clones observe and mutate the same state.
//
// Wiring done at construction (subscribers of `SceneLoading`):
//   1. scene signal registry cleared
//   2. TimeKeeper reset
//   3. prev stack cleared (when configured)
//
//=========================================================================

//=== External Dependencies ===============================================

use std::rc::Rc;

use futures::executor::LocalSpawner;
use log::debug;

//=== Internal Dependencies ===============================================

use super::Collaborators;
use crate::core::config::LifecycleConfig;
use crate::core::fade::FadeController;
use crate::core::frame::FrameDriver;
use crate::core::input_blocker::InputBlocker;
use crate::core::prev::PrevStack;
use crate::core::resources::ResourceStore;
use crate::core::scene::{SceneCatalog, SceneContext, SceneDirector, SceneLoading, SceneName, TransitionHandle};
use crate::core::signal::SignalHub;
use crate::core::time_keeper::TimeKeeper;
use crate::core::ui::UiHooks;

//=== CoreContext =========================================================

/// Shared lifecycle services available to scenes and hooks.
///
/// # Available Handles
///
/// - `frames`: tick source and "next frame" futures
/// - `signals`: global and scene-scoped typed signals
/// - `time`: scene-scoped virtual clock
/// - `input_blocker`: busy counter gating input
/// - `prev`: back-navigation stack
/// - `fade`: transition mask controller
/// - `resources`: reference-counted asset store
/// - `director`: scene transition state machine
#[derive(Clone)]
pub struct CoreContext {
    frames: FrameDriver,
    spawner: LocalSpawner,
    signals: SignalHub,
    time: TimeKeeper,
    input_blocker: InputBlocker,
    prev: PrevStack,
    fade: FadeController,
    resources: ResourceStore,
    ui: Rc<dyn UiHooks>,
    director: SceneDirector,
}

impl CoreContext {
    /// Builds every subsystem from `config` and wires the scene-boundary
    /// resets. The scene catalog starts empty.
    pub fn new(config: &LifecycleConfig, collaborators: Collaborators, spawner: LocalSpawner) -> Self {
        let Collaborators {
            scene_loader,
            asset_backend,
            mask,
            ui,
        } = collaborators;

        let frames = FrameDriver::new();
        let signals = SignalHub::new();
        let time = TimeKeeper::new(config.max_delta);
        let input_blocker = InputBlocker::new(ui.clone());
        let prev = PrevStack::new(
            input_blocker.clone(),
            frames.clone(),
            ui.clone(),
            config.back_debounce,
        );
        let fade = FadeController::new(mask, frames.clone(), spawner.clone());
        let resources = ResourceStore::new(asset_backend, spawner.clone());
        let director = SceneDirector::new(SceneCatalog::new(), scene_loader, config.fade_duration);

        let cx = Self {
            frames,
            spawner,
            signals,
            time,
            input_blocker,
            prev,
            fade,
            resources,
            ui,
            director,
        };
        cx.wire_scene_boundary(config.clear_prev_on_scene_loading);
        cx
    }

    fn wire_scene_boundary(&self, clear_prev: bool) {
        let loading = self.signals.global().get_or_create::<SceneLoading>();

        let scene = self.signals.scene().clone();
        loading.subscribe(move |_| scene.clear());

        let time = self.time.clone();
        loading.subscribe(move |_| time.reset());

        if clear_prev {
            let prev = self.prev.clone();
            loading.subscribe(move |_| prev.clear());
        }
        debug!("Scene boundary resets wired (clear prev: {})", clear_prev);
    }

    //--- Accessors --------------------------------------------------------

    pub fn frames(&self) -> &FrameDriver {
        &self.frames
    }

    pub fn spawner(&self) -> &LocalSpawner {
        &self.spawner
    }

    pub fn signals(&self) -> &SignalHub {
        &self.signals
    }

    pub fn time(&self) -> &TimeKeeper {
        &self.time
    }

    pub fn input_blocker(&self) -> &InputBlocker {
        &self.input_blocker
    }

    pub fn prev(&self) -> &PrevStack {
        &self.prev
    }

    pub fn fade(&self) -> &FadeController {
        &self.fade
    }

    pub fn resources(&self) -> &ResourceStore {
        &self.resources
    }

    pub fn ui(&self) -> &dyn UiHooks {
        &*self.ui
    }

    pub fn director(&self) -> &SceneDirector {
        &self.director
    }

    //--- Shortcuts --------------------------------------------------------

    /// See [`SceneDirector::go_to_next_scene`].
    pub fn go_to_next_scene(&self, context: SceneContext) -> TransitionHandle {
        self.director.go_to_next_scene(self, context)
    }

    /// See [`SceneDirector::launch`].
    pub fn launch(&self, name: impl Into<SceneName>) -> TransitionHandle {
        self.director.launch(self, name)
    }
}

impl std::fmt::Debug for CoreContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreContext")
            .field("frames", &self.frames)
            .field("time", &self.time)
            .field("input_blocker", &self.input_blocker)
            .field("prev", &self.prev)
            .field("fade", &self.fade)
            .field("resources", &self.resources)
            .field("director", &self.director)
            .finish_non_exhaustive()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
