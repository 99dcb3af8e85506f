//=========================================================================
// Scene Director
//=========================================================================
//
// Transition state machine between scenes.
//
// State flow:
//   Idle → FadingOut → UnloadingPrevious → LoadingNext → InitializingNext
//        → FadingIn → Idle
//
// Only one transition runs at a time. Requests arriving while the state is
// not `Idle` are rejected immediately with `TransitionError::Busy`.
//
// Failure path (scene load, asset retain or adapter init):
//   abandon partial work → re-enter previous context once → fade in
//   → Idle → TransitionFailed notice + SceneTransitionFailed signal
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::channel::oneshot;
use futures::task::LocalSpawnExt;
use futures::FutureExt;
use log::{debug, error, info, warn};

//=== Internal Dependencies ===============================================

use super::{SceneAdapter, SceneCatalog, SceneContext, SceneLoader, SceneName};
use crate::core::error::{LoadError, TransitionError};
use crate::core::fade::FadeOutcome;
use crate::core::globals::CoreContext;
use crate::core::input_blocker::BusyGuard;
use crate::core::resources::RetainScope;
use crate::core::ui::Notice;

//=== DirectorState =======================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectorState {
    Idle,
    FadingOut,
    UnloadingPrevious,
    LoadingNext,
    InitializingNext,
    FadingIn,
}

//=== Lifecycle Signals ===================================================

/// Emitted on the global registry once per accepted transition, before
/// anything of the previous scene is torn down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneLoading {
    pub from: Option<SceneName>,
    pub to: SceneName,
}

/// Emitted on the global registry when a scene is active and visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneReady {
    pub scene: SceneName,
}

/// Emitted on the global registry when an accepted transition fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneTransitionFailed {
    pub requested: SceneName,
    pub error: TransitionError,
}

//=== SceneDirector =======================================================

struct ActiveScene {
    context: Rc<SceneContext>,
    adapter: Option<Box<dyn SceneAdapter>>,
    /// Engine scenes in load order: main first, then additive.
    loaded: Vec<SceneName>,
}

struct DirectorInner {
    state: DirectorState,
    active: Option<ActiveScene>,
    catalog: SceneCatalog,
}

/// Shared handle to the scene transition state machine.
#[derive(Clone)]
pub struct SceneDirector {
    inner: Rc<RefCell<DirectorInner>>,
    loader: Rc<dyn SceneLoader>,
    fade_duration: Duration,
}

impl SceneDirector {
    pub fn new(catalog: SceneCatalog, loader: Rc<dyn SceneLoader>, fade_duration: Duration) -> Self {
        Self {
            inner: Rc::new(RefCell::new(DirectorInner {
                state: DirectorState::Idle,
                active: None,
                catalog,
            })),
            loader,
            fade_duration,
        }
    }

    //--- Queries ----------------------------------------------------------

    pub fn state(&self) -> DirectorState {
        self.inner.borrow().state
    }

    pub fn is_transitioning(&self) -> bool {
        self.state() != DirectorState::Idle
    }

    /// Name of the active scene's main engine scene.
    pub fn current_scene(&self) -> Option<SceneName> {
        self.inner
            .borrow()
            .active
            .as_ref()
            .map(|active| active.context.scene().clone())
    }

    /// Engine scenes currently loaded for the active scene, in load order.
    pub fn loaded_scenes(&self) -> Vec<SceneName> {
        self.inner
            .borrow()
            .active
            .as_ref()
            .map(|active| active.loaded.clone())
            .unwrap_or_default()
    }

    /// Runs `f` with the catalog borrowed mutably.
    ///
    /// `f` must not call back into the director.
    pub fn with_catalog<R>(&self, f: impl FnOnce(&mut SceneCatalog) -> R) -> R {
        f(&mut self.inner.borrow_mut().catalog)
    }

    //--- Transitions ------------------------------------------------------

    /// Requests a transition to `context`.
    ///
    /// Rejections resolve the returned handle immediately. An accepted
    /// transition runs to completion on the executor even if the handle is
    /// dropped.
    pub fn go_to_next_scene(&self, cx: &CoreContext, context: SceneContext) -> TransitionHandle {
        let requested = context.scene().clone();

        // Fallback factories are user code and run with the director unborrowed.
        let resolved = {
            let inner = self.inner.borrow();
            if inner.state != DirectorState::Idle {
                return Self::reject_busy(requested, inner.state);
            }
            inner.catalog.resolve_deferred(context)
        };
        let context = match resolved {
            Ok(resolved) => resolved.into_context(),
            Err(err) => {
                warn!("Rejected transition to {}: {}", requested, err);
                return TransitionHandle::ready(requested, Err(err));
            }
        };

        let from = {
            let mut inner = self.inner.borrow_mut();
            if inner.state != DirectorState::Idle {
                return Self::reject_busy(requested, inner.state);
            }
            inner.state = DirectorState::FadingOut;
            inner
                .active
                .as_ref()
                .map(|active| active.context.scene().clone())
        };

        let to = context.scene().clone();
        info!(
            "Scene transition {} -> {}",
            from.as_ref().map_or("<none>", SceneName::as_str),
            to
        );
        cx.signals().global().emit(&SceneLoading {
            from,
            to: to.clone(),
        });

        let busy = cx.input_blocker().busy_scope();
        let (sender, receiver) = oneshot::channel();
        let director = self.clone();
        let task_cx = cx.clone();
        let spawned = cx.spawner().spawn_local(async move {
            let result = director.run_transition(&task_cx, context, busy).await;
            // The caller may have dropped its handle.
            let _ = sender.send(result);
        });

        if let Err(err) = spawned {
            error!("Could not spawn transition to {}: {}", to, err);
            self.set_state(DirectorState::Idle);
            return TransitionHandle::ready(to.clone(), Err(TransitionError::Aborted(to)));
        }

        TransitionHandle {
            scene: to,
            state: HandleState::Pending(receiver),
        }
    }

    fn reject_busy(requested: SceneName, state: DirectorState) -> TransitionHandle {
        warn!("Rejected transition to {}: director is {:?}", requested, state);
        TransitionHandle::ready(
            requested.clone(),
            Err(TransitionError::Busy { requested, state }),
        )
    }

    /// Enters the catalog's default context for `name`.
    ///
    /// Unknown names fall back to the catalog's fallback scene, which lets
    /// a build start directly on any registered scene.
    pub fn launch(&self, cx: &CoreContext, name: impl Into<SceneName>) -> TransitionHandle {
        let name = name.into();
        let factory = self.inner.borrow().catalog.context_factory(&name);
        match factory {
            Ok(factory) => self.go_to_next_scene(cx, factory()),
            Err(err) => {
                warn!("Cannot launch {}: {}", name, err);
                TransitionHandle::ready(name, Err(err))
            }
        }
    }

    /// Per-frame update of the active adapter while no transition runs.
    pub fn update_active(&self, cx: &CoreContext) {
        let adapter = {
            let mut inner = self.inner.borrow_mut();
            if inner.state != DirectorState::Idle {
                return;
            }
            inner.active.as_mut().and_then(|active| active.adapter.take())
        };

        let Some(mut adapter) = adapter else {
            return;
        };
        adapter.update(cx);

        if let Some(active) = self.inner.borrow_mut().active.as_mut() {
            active.adapter = Some(adapter);
        }
    }

    //--- Internal Helpers -------------------------------------------------

    async fn run_transition(
        &self,
        cx: &CoreContext,
        context: SceneContext,
        busy: BusyGuard,
    ) -> Result<SceneName, TransitionError> {
        let requested = context.scene().clone();

        if cx.fade().fade_out(self.fade_duration).await == FadeOutcome::Superseded {
            debug!("Fade out for {} was superseded", requested);
        }

        self.set_state(DirectorState::UnloadingPrevious);
        let previous = self.teardown(cx).await;

        let result = match self.enter(cx, Rc::new(context)).await {
            Ok(()) => Ok(requested.clone()),
            Err(err) => {
                error!("Transition to {} failed: {}", requested, err);
                if let Some(previous) = previous {
                    let name = previous.scene().clone();
                    warn!("Restoring previous scene {}", name);
                    if let Err(restore) = self.enter(cx, previous).await {
                        error!("Restoring {} failed: {}", name, restore);
                    }
                }
                Err(err)
            }
        };

        self.set_state(DirectorState::FadingIn);
        if cx.fade().fade_in(self.fade_duration).await == FadeOutcome::Superseded {
            warn!("Fade in after {} was superseded; forcing visible", requested);
            cx.fade().set_immediate(0.0);
        }

        drop(busy);
        self.set_state(DirectorState::Idle);

        match &result {
            Ok(scene) => {
                info!("Scene {} ready", scene);
                cx.signals().global().emit(&SceneReady {
                    scene: scene.clone(),
                });
            }
            Err(error) => {
                cx.ui().pop_notification(&Notice::TransitionFailed {
                    requested: requested.clone(),
                    active: self.current_scene(),
                });
                cx.signals().global().emit(&SceneTransitionFailed {
                    requested,
                    error: error.clone(),
                });
            }
        }

        result
    }

    /// Tears the active scene down and hands back its context.
    async fn teardown(&self, cx: &CoreContext) -> Option<Rc<SceneContext>> {
        let active = self.inner.borrow_mut().active.take()?;
        let ActiveScene {
            context,
            adapter,
            loaded,
        } = active;

        debug!("Unloading scene {}", context.scene());
        if let Some(mut adapter) = adapter {
            adapter.on_unload_scene(cx);
        }

        cx.resources().release_scene_scope();
        self.unload_scenes(&loaded).await;
        Some(context)
    }

    /// Loads `context` and starts its adapter.
    ///
    /// On error nothing of `context` is left loaded or retained.
    async fn enter(&self, cx: &CoreContext, context: Rc<SceneContext>) -> Result<(), TransitionError> {
        let scene = context.scene().clone();
        self.set_state(DirectorState::LoadingNext);

        let retain = cx
            .resources()
            .retain_with_auto_load(context.assets(), RetainScope::Scene);
        let ((loaded, scenes), report) = futures::join!(self.load_scenes(&context), retain);

        let failure = match scenes {
            Err(err) => Some(TransitionError::from(err)),
            Ok(()) => match report.into_result() {
                Ok(_) => None,
                Err(mut failed) if failed.len() == 1 => failed.pop().map(TransitionError::from),
                Err(failed) => Some(TransitionError::Assets {
                    scene: scene.clone(),
                    failed,
                }),
            },
        };
        if let Some(err) = failure {
            self.abandon(cx, &loaded).await;
            return Err(err);
        }

        self.set_state(DirectorState::InitializingNext);
        let adapter = self.inner.borrow().catalog.create_adapter(&scene);
        let Some(mut adapter) = adapter else {
            self.abandon(cx, &loaded).await;
            return Err(TransitionError::UnknownScene(scene));
        };

        let initialized = adapter.init_after_load_scene(cx, &context).await;
        if let Err(err) = initialized {
            drop(adapter);
            self.abandon(cx, &loaded).await;
            return Err(err);
        }

        self.inner.borrow_mut().active = Some(ActiveScene {
            context: context.clone(),
            adapter: None,
            loaded,
        });
        adapter.on_startup_scene(cx, &context);

        if let Some(active) = self.inner.borrow_mut().active.as_mut() {
            active.adapter = Some(adapter);
        }
        debug!("Scene {} entered", scene);
        Ok(())
    }

    /// Main scene first, then additive scenes in declaration order. Stops
    /// at the first failure and reports what did load.
    async fn load_scenes(&self, context: &SceneContext) -> (Vec<SceneName>, Result<(), LoadError>) {
        let order = std::iter::once((context.scene(), false))
            .chain(context.additive_scenes().iter().map(|scene| (scene, true)));

        let mut loaded = Vec::with_capacity(1 + context.additive_scenes().len());
        for (scene, additive) in order {
            if let Err(err) = self.loader.load_scene(scene, additive).await {
                return (loaded, Err(err));
            }
            loaded.push(scene.clone());
        }
        (loaded, Ok(()))
    }

    async fn unload_scenes(&self, loaded: &[SceneName]) {
        for scene in loaded.iter().rev() {
            if let Err(err) = self.loader.unload_scene(scene).await {
                warn!("Failed to unload scene {}: {}", scene, err);
            }
        }
    }

    async fn abandon(&self, cx: &CoreContext, loaded: &[SceneName]) {
        cx.resources().release_scene_scope();
        self.unload_scenes(loaded).await;
    }

    fn set_state(&self, state: DirectorState) {
        let mut inner = self.inner.borrow_mut();
        debug!("Director {:?} -> {:?}", inner.state, state);
        inner.state = state;
    }
}

impl fmt::Debug for SceneDirector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("SceneDirector")
            .field("state", &inner.state)
            .field(
                "active",
                &inner.active.as_ref().map(|active| active.context.scene()),
            )
            .field("catalog", &inner.catalog)
            .finish()
    }
}

//=== TransitionHandle ====================================================

enum HandleState {
    Ready(Option<Result<SceneName, TransitionError>>),
    Pending(oneshot::Receiver<Result<SceneName, TransitionError>>),
}

/// Outcome of a transition request. Resolves to the entered scene.
///
/// Dropping the handle does not stop an accepted transition.
pub struct TransitionHandle {
    scene: SceneName,
    state: HandleState,
}

impl TransitionHandle {
    fn ready(scene: SceneName, result: Result<SceneName, TransitionError>) -> Self {
        Self {
            scene,
            state: HandleState::Ready(Some(result)),
        }
    }

    /// Scene this transition targets (after fallback resolution, if it
    /// was accepted).
    pub fn scene(&self) -> &SceneName {
        &self.scene
    }

    /// True if the request was accepted and handed to the executor.
    pub fn is_accepted(&self) -> bool {
        matches!(self.state, HandleState::Pending(_))
    }
}

impl Future for TransitionHandle {
    type Output = Result<SceneName, TransitionError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &mut this.state {
            HandleState::Ready(result) => Poll::Ready(
                result
                    .take()
                    .unwrap_or_else(|| Err(TransitionError::Aborted(this.scene.clone()))),
            ),
            HandleState::Pending(receiver) => receiver.poll_unpin(cx).map(|result| {
                result.unwrap_or_else(|_| Err(TransitionError::Aborted(this.scene.clone())))
            }),
        }
    }
}

impl fmt::Debug for TransitionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionHandle")
            .field("scene", &self.scene)
            .field("accepted", &self.is_accepted())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
