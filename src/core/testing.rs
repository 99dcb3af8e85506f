//=========================================================================
// Test Support
//=========================================================================
//
// Mock collaborators with call counters and a harness stepping an
// `Engine` frame by frame.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use futures::future::{self, LocalBoxFuture};
use futures::FutureExt;

//=== Internal Dependencies ===============================================

use crate::core::error::LoadError;
use crate::core::globals::{Collaborators, CoreContext};
use crate::core::resources::{AssetBackend, AssetHandle};
use crate::core::scene::{SceneCatalog, SceneLoader, SceneName};
use crate::core::signal::Event;
use crate::core::ui::{Notice, UiHooks};
use crate::engine::{Engine, EngineBuilder};

//=== MockLoader ==========================================================

#[derive(Default)]
pub(crate) struct MockLoader {
    loads: RefCell<Vec<(SceneName, bool)>>,
    unloads: RefCell<Vec<SceneName>>,
    loaded: RefCell<HashSet<SceneName>>,
    failing: RefCell<HashSet<SceneName>>,
}

impl MockLoader {
    pub(crate) fn fail(&self, scene: &str) {
        self.failing.borrow_mut().insert(SceneName::from(scene));
    }

    pub(crate) fn loads_of(&self, scene: &str) -> usize {
        self.loads.borrow().iter().filter(|(name, _)| name == scene).count()
    }

    pub(crate) fn unloads(&self) -> Vec<SceneName> {
        self.unloads.borrow().clone()
    }

    pub(crate) fn is_loaded(&self, scene: &str) -> bool {
        self.loaded.borrow().contains(&SceneName::from(scene))
    }
}

impl SceneLoader for MockLoader {
    fn load_scene(&self, name: &SceneName, additive: bool) -> LocalBoxFuture<'static, Result<(), LoadError>> {
        self.loads.borrow_mut().push((name.clone(), additive));
        let result = if self.failing.borrow().contains(name) {
            Err(LoadError::scene(name, "mock failure"))
        } else {
            self.loaded.borrow_mut().insert(name.clone());
            Ok(())
        };
        future::ready(result).boxed_local()
    }

    fn unload_scene(&self, name: &SceneName) -> LocalBoxFuture<'static, Result<(), LoadError>> {
        self.unloads.borrow_mut().push(name.clone());
        self.loaded.borrow_mut().remove(name);
        future::ready(Ok(())).boxed_local()
    }
}

//=== MockBackend =========================================================

#[derive(Default)]
pub(crate) struct MockBackend {
    loads: RefCell<HashMap<String, usize>>,
    unloads: RefCell<HashMap<String, usize>>,
    failing: RefCell<HashSet<String>>,
}

impl MockBackend {
    pub(crate) fn fail(&self, address: &str) {
        self.failing.borrow_mut().insert(address.to_owned());
    }

    pub(crate) fn loads_of(&self, address: &str) -> usize {
        self.loads.borrow().get(address).copied().unwrap_or(0)
    }

    pub(crate) fn unloads_of(&self, address: &str) -> usize {
        self.unloads.borrow().get(address).copied().unwrap_or(0)
    }
}

impl AssetBackend for MockBackend {
    fn load_asset(&self, address: &str) -> LocalBoxFuture<'static, Result<AssetHandle, LoadError>> {
        *self.loads.borrow_mut().entry(address.to_owned()).or_default() += 1;
        let result = if self.failing.borrow().contains(address) {
            Err(LoadError::asset(address, "mock failure"))
        } else {
            Ok(AssetHandle::new(address, address.to_owned()))
        };
        future::ready(result).boxed_local()
    }

    fn unload_asset(&self, handle: AssetHandle) {
        *self
            .unloads
            .borrow_mut()
            .entry(handle.address().to_owned())
            .or_default() += 1;
    }
}

//=== RecordingUi =========================================================

#[derive(Default)]
pub(crate) struct RecordingUi {
    notices: RefCell<Vec<Notice>>,
    overlays_shown: Cell<usize>,
    overlays_closed: Cell<usize>,
}

impl RecordingUi {
    pub(crate) fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }

    pub(crate) fn overlays(&self) -> (usize, usize) {
        (self.overlays_shown.get(), self.overlays_closed.get())
    }
}

impl UiHooks for RecordingUi {
    fn pop_notification(&self, notice: &Notice) {
        self.notices.borrow_mut().push(notice.clone());
    }

    fn show_blocking_overlay(&self) {
        self.overlays_shown.set(self.overlays_shown.get() + 1);
    }

    fn close_blocking_overlay(&self) {
        self.overlays_closed.set(self.overlays_closed.get() + 1);
    }
}

//=== Recorder ============================================================

/// Shared ordered log of hook calls.
#[derive(Default, Clone)]
pub(crate) struct Recorder(Rc<RefCell<Vec<String>>>);

impl Recorder {
    pub(crate) fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub(crate) fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

//=== Harness =============================================================

pub(crate) struct Mocks {
    pub(crate) loader: Rc<MockLoader>,
    pub(crate) backend: Rc<MockBackend>,
    pub(crate) ui: Rc<RecordingUi>,
}

pub(crate) fn mock_collaborators() -> (Collaborators, Mocks) {
    let mocks = Mocks {
        loader: Rc::new(MockLoader::default()),
        backend: Rc::new(MockBackend::default()),
        ui: Rc::new(RecordingUi::default()),
    };
    let collaborators = Collaborators::new(mocks.loader.clone(), mocks.backend.clone())
        .with_ui(mocks.ui.clone());
    (collaborators, mocks)
}

pub(crate) struct Harness {
    engine: RefCell<Engine>,
    pub(crate) cx: CoreContext,
    pub(crate) loader: Rc<MockLoader>,
    pub(crate) backend: Rc<MockBackend>,
    pub(crate) ui: Rc<RecordingUi>,
}

impl Harness {
    const MAX_FRAMES: usize = 10_000;

    pub(crate) fn new(init: impl FnOnce(&mut SceneCatalog)) -> Self {
        let (collaborators, mocks) = mock_collaborators();
        let engine = EngineBuilder::new().build(collaborators).init(init);
        let cx = engine.context().clone();
        Self {
            engine: RefCell::new(engine),
            cx,
            loader: mocks.loader,
            backend: mocks.backend,
            ui: mocks.ui,
        }
    }

    pub(crate) fn run_frames(&self, frames: usize, dt: Duration) {
        let mut engine = self.engine.borrow_mut();
        for _ in 0..frames {
            engine.tick(dt);
        }
    }

    /// Ticks frames of `dt` until `fut` resolves.
    pub(crate) fn settle<F: Future>(&self, fut: F, dt: Duration) -> F::Output {
        let mut fut = Box::pin(fut);
        for _ in 0..Self::MAX_FRAMES {
            if let Some(output) = fut.as_mut().now_or_never() {
                return output;
            }
            self.engine.borrow_mut().tick(dt);
        }
        panic!("future did not resolve within {} frames", Self::MAX_FRAMES);
    }

    /// Counts emissions of `E` on the global registry.
    pub(crate) fn count_signal<E: Event>(&self) -> Rc<Cell<usize>> {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        self.cx
            .signals()
            .global()
            .get_or_create::<E>()
            .subscribe(move |_| c.set(c.get() + 1));
        count
    }
}
