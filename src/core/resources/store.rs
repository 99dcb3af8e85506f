//=========================================================================
// Resource Store
//=========================================================================
//
// Reference-counted, address-keyed asset cache.
//
// Architecture:
//   retain*(addresses, scope)
//     ├─ present  → count += 1 (attach to in-flight load if loading)
//     └─ absent   → count = 1, spawn one load driver
//                      ↓
//                   finish_load() → Ready / removed on failure
//   release(address, scope) → count -= 1 → total 0 → unload + remove
//
// Every mutation of the entry map completes without yielding, so two
// coalesced waiters can never double-load or double-release. Each entry
// carries one count per scope; an entry lives while either is non-zero.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::executor::LocalSpawner;
use futures::future::{join_all, LocalBoxFuture, Shared};
use futures::task::LocalSpawnExt;
use futures::FutureExt;
use log::{debug, error, info, warn};

//=== Internal Dependencies ===============================================

use super::backend::{AssetBackend, AssetHandle};
use crate::core::error::{LoadError, ResourceError};

//=== RetainScope =========================================================

/// Lifetime class of a retain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetainScope {
    /// Survives scene transitions.
    Global,
    /// Force-released when the director tears the current scene down.
    Scene,
}

//=== RetainReport ========================================================

/// Per-address outcome of a batch retain.
///
/// A failed address keeps no count behind; only `loaded` addresses need
/// a matching release.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetainReport {
    pub loaded: Vec<String>,
    pub failed: HashMap<String, LoadError>,
}

impl RetainReport {
    pub fn is_ok(&self) -> bool {
        self.failed.is_empty()
    }

    /// Collapses the report, keeping every failure.
    pub fn into_result(self) -> Result<Vec<String>, Vec<LoadError>> {
        if self.failed.is_empty() {
            Ok(self.loaded)
        } else {
            Err(self.failed.into_values().collect())
        }
    }
}

//=== Entries =============================================================

type SharedLoad = Shared<LocalBoxFuture<'static, Result<AssetHandle, LoadError>>>;

enum EntryState {
    Loading(SharedLoad),
    Ready(AssetHandle),
}

struct ResourceEntry {
    state: EntryState,
    generation: u64,
    /// Bumped each time the Scene counts are forced to zero.
    scene_epoch: u64,
    global: usize,
    scene: usize,
}

/// Identifies the entry incarnation a retain counted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RetainStamp {
    generation: u64,
    scene_epoch: u64,
}

impl ResourceEntry {
    fn count_mut(&mut self, scope: RetainScope) -> &mut usize {
        match scope {
            RetainScope::Global => &mut self.global,
            RetainScope::Scene => &mut self.scene,
        }
    }

    fn count(&self, scope: RetainScope) -> usize {
        match scope {
            RetainScope::Global => self.global,
            RetainScope::Scene => self.scene,
        }
    }

    fn total(&self) -> usize {
        self.global + self.scene
    }

    fn stamp(&self) -> RetainStamp {
        RetainStamp {
            generation: self.generation,
            scene_epoch: self.scene_epoch,
        }
    }

    /// True while a retain stamped `stamp` in `scope` still owns a count.
    fn holds(&self, stamp: RetainStamp, scope: RetainScope) -> bool {
        self.generation == stamp.generation
            && self.count(scope) > 0
            && (scope == RetainScope::Global || self.scene_epoch == stamp.scene_epoch)
    }

    fn into_ready(self) -> Option<AssetHandle> {
        match self.state {
            EntryState::Ready(handle) => Some(handle),
            EntryState::Loading(_) => None,
        }
    }
}

#[derive(Default)]
struct StoreState {
    entries: HashMap<String, ResourceEntry>,
    next_generation: u64,
}

//=== ResourceStore =======================================================

/// Shared handle to the asset cache.
#[derive(Clone)]
pub struct ResourceStore {
    state: Rc<RefCell<StoreState>>,
    backend: Rc<dyn AssetBackend>,
    spawner: LocalSpawner,
}

impl ResourceStore {
    pub fn new(backend: Rc<dyn AssetBackend>, spawner: LocalSpawner) -> Self {
        Self {
            state: Rc::new(RefCell::new(StoreState::default())),
            backend,
            spawner,
        }
    }

    //--- Queries ----------------------------------------------------------

    /// True if the address has an entry, loading or loaded, in any scope.
    pub fn contains(&self, address: &str) -> bool {
        self.state.borrow().entries.contains_key(address)
    }

    pub fn is_loading(&self, address: &str) -> bool {
        matches!(
            self.state.borrow().entries.get(address).map(|e| &e.state),
            Some(EntryState::Loading(_))
        )
    }

    pub fn retain_count(&self, address: &str, scope: RetainScope) -> usize {
        self.state
            .borrow()
            .entries
            .get(address)
            .map_or(0, |entry| entry.count(scope))
    }

    /// Number of resident or loading entries.
    pub fn len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cache-only lookup of a loaded asset. Never starts a load.
    pub fn handle(&self, address: &str) -> Option<AssetHandle> {
        match self.state.borrow().entries.get(address).map(|e| &e.state) {
            Some(EntryState::Ready(handle)) => Some(handle.clone()),
            Some(EntryState::Loading(_)) => {
                warn!("Asset `{}` requested while still loading", address);
                None
            }
            None => {
                warn!("Asset `{}` requested but not loaded", address);
                None
            }
        }
    }

    /// Typed cache-only lookup; `None` if absent, loading, or of another type.
    pub fn get<T: 'static>(&self, address: &str) -> Option<Rc<T>> {
        let asset = self.handle(address)?.downcast::<T>();
        if asset.is_none() {
            warn!(
                "Asset `{}` is not a {}",
                address,
                std::any::type_name::<T>()
            );
        }
        asset
    }

    //--- Retain -----------------------------------------------------------

    pub fn retain_global_with_auto_load<A: AsRef<str>>(&self, addresses: &[A]) -> RetainFuture {
        self.retain_with_auto_load(addresses, RetainScope::Global)
    }

    /// Retains every address in `scope`, loading the ones not yet present.
    ///
    /// Counts are taken when this is called, not when the future is first
    /// polled. Dropping the future before it resolves gives them back.
    pub fn retain_with_auto_load<A: AsRef<str>>(
        &self,
        addresses: &[A],
        scope: RetainScope,
    ) -> RetainFuture {
        let mut guard = RetainGuard {
            store: self.clone(),
            increments: Vec::with_capacity(addresses.len()),
            armed: true,
        };
        let mut ready = Vec::new();
        let mut waits = Vec::new();
        let mut failed = HashMap::new();

        for address in addresses {
            let address = address.as_ref();
            match self.attach(address, scope) {
                Attach::Ready(stamp) => {
                    guard.increments.push((address.to_owned(), stamp, scope));
                    ready.push((address.to_owned(), stamp));
                }
                Attach::Loading(stamp, load) => {
                    guard.increments.push((address.to_owned(), stamp, scope));
                    waits.push((address.to_owned(), stamp, load));
                }
                Attach::Failed(err) => {
                    failed.insert(address.to_owned(), err);
                }
            }
        }

        let store = self.clone();
        let inner = async move {
            let mut report = RetainReport {
                loaded: Vec::new(),
                failed,
            };
            let waits = waits
                .into_iter()
                .map(|(address, stamp, load)| async move { (address, stamp, load.await) });
            let settled = ready
                .into_iter()
                .map(|(address, stamp)| (address, stamp, Ok::<(), LoadError>(())))
                .chain(
                    join_all(waits)
                        .await
                        .into_iter()
                        .map(|(address, stamp, result)| (address, stamp, result.map(|_| ()))),
                );

            for (address, stamp, result) in settled {
                match result {
                    // The count may have been taken away while waiting.
                    Ok(()) if !store.holds(&address, stamp, scope) => {
                        debug!("Retain of `{}` was released before it resolved", address);
                        let err = LoadError::Cancelled {
                            address: address.clone(),
                        };
                        report.failed.insert(address, err);
                    }
                    Ok(()) => report.loaded.push(address),
                    Err(err) => {
                        report.failed.insert(address, err);
                    }
                }
            }
            report
        };

        RetainFuture {
            inner: inner.boxed_local(),
            guard: Some(guard),
        }
    }

    /// Single-address retain resolving to the loaded handle.
    pub fn retain(
        &self,
        address: &str,
        scope: RetainScope,
    ) -> impl Future<Output = Result<AssetHandle, LoadError>> + 'static {
        let retain = self.retain_with_auto_load(&[address], scope);
        let store = self.clone();
        let address = address.to_owned();

        async move {
            let mut report = retain.await;
            if let Some(err) = report.failed.remove(&address) {
                return Err(err);
            }
            store
                .peek(&address)
                .ok_or(LoadError::Cancelled { address })
        }
    }

    //--- Release ----------------------------------------------------------

    /// Drops one retain; the last one across both scopes unloads the asset.
    pub fn release(&self, address: &str, scope: RetainScope) -> Result<(), ResourceError> {
        self.decrement(address, scope, None)
    }

    /// Forces every Scene count to zero.
    ///
    /// Entries still held globally stay resident. Returns the number of
    /// entries removed.
    pub fn release_scene_scope(&self) -> usize {
        let removed: Vec<ResourceEntry> = {
            let mut state = self.state.borrow_mut();
            for entry in state.entries.values_mut() {
                entry.scene = 0;
                entry.scene_epoch += 1;
            }

            let dead: Vec<String> = state
                .entries
                .iter()
                .filter(|(_, entry)| entry.total() == 0)
                .map(|(address, _)| address.clone())
                .collect();

            dead.iter()
                .filter_map(|address| state.entries.remove(address))
                .collect()
        };

        let count = removed.len();
        for handle in removed.into_iter().filter_map(ResourceEntry::into_ready) {
            self.backend.unload_asset(handle);
        }

        info!("Released scene scope ({} entries unloaded)", count);
        count
    }

    //--- Internal Helpers -------------------------------------------------

    fn attach(&self, address: &str, scope: RetainScope) -> Attach {
        {
            let mut state = self.state.borrow_mut();
            if let Some(entry) = state.entries.get_mut(address) {
                *entry.count_mut(scope) += 1;
                let stamp = entry.stamp();
                return match &entry.state {
                    EntryState::Ready(_) => Attach::Ready(stamp),
                    EntryState::Loading(load) => {
                        debug!("Coalescing retain of `{}` onto in-flight load", address);
                        Attach::Loading(stamp, load.clone())
                    }
                };
            }
        }

        let generation = {
            let mut state = self.state.borrow_mut();
            state.next_generation += 1;
            state.next_generation
        };

        let load = match self.start_load(address, generation) {
            Ok(load) => load,
            Err(err) => return Attach::Failed(err),
        };

        let mut entry = ResourceEntry {
            state: EntryState::Loading(load.clone()),
            generation,
            scene_epoch: 0,
            global: 0,
            scene: 0,
        };
        *entry.count_mut(scope) = 1;
        let stamp = entry.stamp();
        self.state.borrow_mut().entries.insert(address.to_owned(), entry);

        Attach::Loading(stamp, load)
    }

    fn start_load(&self, address: &str, generation: u64) -> Result<SharedLoad, LoadError> {
        debug!("Loading asset `{}`", address);

        let (tx, rx) = oneshot::channel();
        let load = self.backend.load_asset(address);
        let store = self.clone();
        let owned = address.to_owned();

        let driver = async move {
            let result = load.await;
            store.finish_load(&owned, generation, &result);
            // Every waiter may already be gone.
            let _ = tx.send(result);
        };

        if let Err(err) = self.spawner.spawn_local(driver) {
            error!("Could not spawn load of `{}`: {}", address, err);
            return Err(LoadError::Cancelled {
                address: address.to_owned(),
            });
        }

        let cancelled = address.to_owned();
        Ok(rx
            .map(move |received| {
                received.unwrap_or(Err(LoadError::Cancelled { address: cancelled }))
            })
            .boxed_local()
            .shared())
    }

    fn finish_load(&self, address: &str, generation: u64, result: &Result<AssetHandle, LoadError>) {
        let orphan = {
            let mut state = self.state.borrow_mut();
            let current = state
                .entries
                .get(address)
                .is_some_and(|entry| entry.generation == generation);

            match (current, result) {
                (true, Ok(handle)) => {
                    if let Some(entry) = state.entries.get_mut(address) {
                        entry.state = EntryState::Ready(handle.clone());
                    }
                    debug!("Asset `{}` loaded", address);
                    None
                }
                (true, Err(err)) => {
                    warn!("Asset `{}` failed to load: {}", address, err);
                    state.entries.remove(address);
                    None
                }
                (false, Ok(handle)) => Some(handle.clone()),
                (false, Err(_)) => None,
            }
        };

        if let Some(handle) = orphan {
            debug!("Asset `{}` finished loading after its last release", address);
            self.backend.unload_asset(handle);
        }
    }

    fn decrement(
        &self,
        address: &str,
        scope: RetainScope,
        generation: Option<u64>,
    ) -> Result<(), ResourceError> {
        let unload = {
            let mut state = self.state.borrow_mut();
            let Some(entry) = state.entries.get_mut(address) else {
                return Err(Self::not_retained(address, scope));
            };

            if generation.is_some_and(|g| g != entry.generation) {
                // Replaced after a failure or a full release.
                return Ok(());
            }

            let count = entry.count_mut(scope);
            if *count == 0 {
                return Err(Self::not_retained(address, scope));
            }
            *count -= 1;

            if entry.total() > 0 {
                return Ok(());
            }

            debug!("Last retain of `{}` released", address);
            state.entries.remove(address).and_then(ResourceEntry::into_ready)
        };

        if let Some(handle) = unload {
            self.backend.unload_asset(handle);
        }
        Ok(())
    }

    fn rollback(&self, increments: Vec<(String, RetainStamp, RetainScope)>) {
        for (address, stamp, scope) in increments {
            if self.holds(&address, stamp, scope) {
                debug!("Rolling back cancelled retain of `{}`", address);
                let _ = self.decrement(&address, scope, Some(stamp.generation));
            }
        }
    }

    fn holds(&self, address: &str, stamp: RetainStamp, scope: RetainScope) -> bool {
        self.state
            .borrow()
            .entries
            .get(address)
            .is_some_and(|entry| entry.holds(stamp, scope))
    }

    fn peek(&self, address: &str) -> Option<AssetHandle> {
        match self.state.borrow().entries.get(address).map(|e| &e.state) {
            Some(EntryState::Ready(handle)) => Some(handle.clone()),
            _ => None,
        }
    }

    fn not_retained(address: &str, scope: RetainScope) -> ResourceError {
        error!("Released `{}` without a {:?} retain", address, scope);
        debug_assert!(false, "released `{}` without a {:?} retain", address, scope);
        ResourceError::NotRetained {
            address: address.to_owned(),
            scope,
        }
    }
}

impl std::fmt::Debug for ResourceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceStore")
            .field("entries", &self.len())
            .finish_non_exhaustive()
    }
}

enum Attach {
    Ready(RetainStamp),
    Loading(RetainStamp, SharedLoad),
    Failed(LoadError),
}

//=== RetainFuture ========================================================

/// Pending batch retain. Resolves to a [`RetainReport`].
#[must_use = "dropping a RetainFuture gives its retains back"]
pub struct RetainFuture {
    inner: LocalBoxFuture<'static, RetainReport>,
    guard: Option<RetainGuard>,
}

impl Future for RetainFuture {
    type Output = RetainReport;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<RetainReport> {
        let report = futures::ready!(self.inner.as_mut().poll(cx));
        if let Some(mut guard) = self.guard.take() {
            guard.armed = false;
        }
        Poll::Ready(report)
    }
}

/// Gives back a retain future's increments if it never resolved.
struct RetainGuard {
    store: ResourceStore,
    increments: Vec<(String, RetainStamp, RetainScope)>,
    armed: bool,
}

impl Drop for RetainGuard {
    fn drop(&mut self) {
        if self.armed {
            self.store.rollback(std::mem::take(&mut self.increments));
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame::FrameDriver;
    use futures::executor::LocalPool;
    use std::cell::Cell;
    use std::collections::HashSet;
    use std::time::Duration;

    //--- Test Helpers -----------------------------------------------------

    #[derive(Default)]
    struct CountingBackend {
        loads: Cell<usize>,
        unloads: Cell<usize>,
        failing: RefCell<HashSet<String>>,
        frames: Option<FrameDriver>,
    }

    impl AssetBackend for CountingBackend {
        fn load_asset(&self, address: &str) -> LocalBoxFuture<'static, Result<AssetHandle, LoadError>> {
            self.loads.set(self.loads.get() + 1);
            let fails = self.failing.borrow().contains(address);
            let frames = self.frames.clone();
            let address = address.to_owned();

            async move {
                if let Some(frames) = frames {
                    frames.next_frame().await;
                }
                if fails {
                    Err(LoadError::asset(address, "missing"))
                } else {
                    Ok(AssetHandle::new(&address, address.clone()))
                }
            }
            .boxed_local()
        }

        fn unload_asset(&self, _handle: AssetHandle) {
            self.unloads.set(self.unloads.get() + 1);
        }
    }

    struct Harness {
        pool: LocalPool,
        frames: FrameDriver,
        backend: Rc<CountingBackend>,
        store: ResourceStore,
    }

    impl Harness {
        fn new() -> Self {
            let pool = LocalPool::new();
            let frames = FrameDriver::new();
            let backend = Rc::new(CountingBackend {
                frames: Some(frames.clone()),
                ..CountingBackend::default()
            });
            let store = ResourceStore::new(backend.clone(), pool.spawner());
            Self {
                pool,
                frames,
                backend,
                store,
            }
        }

        fn tick(&mut self) {
            self.frames.advance(Duration::from_millis(16));
            self.pool.run_until_stalled();
        }

        fn resolve<F: Future + Unpin>(&mut self, fut: &mut F) -> F::Output {
            for _ in 0..8 {
                self.pool.run_until_stalled();
                if let Some(out) = fut.now_or_never() {
                    return out;
                }
                self.tick();
            }
            panic!("future did not resolve");
        }
    }

    //--- Tests ------------------------------------------------------------

    #[test]
    fn texts_scenario_loads_once() {
        let mut h = Harness::new();

        let mut first = h.store.retain_global_with_auto_load(&["texts"]);
        let report = h.resolve(&mut first);
        assert!(report.is_ok());
        assert!(h.store.contains("texts"));

        let mut second = h.store.retain_global_with_auto_load(&["texts"]);
        let report = h.resolve(&mut second);
        assert_eq!(report.loaded, vec!["texts".to_owned()]);
        assert_eq!(h.backend.loads.get(), 1);
        assert_eq!(h.store.retain_count("texts", RetainScope::Global), 2);
        assert_eq!(h.store.get::<String>("texts").as_deref().map(String::as_str), Some("texts"));
    }

    #[test]
    fn concurrent_retains_coalesce_into_one_load() {
        let mut h = Harness::new();

        let mut a = h.store.retain_global_with_auto_load(&["atlas"]);
        let mut b = h.store.retain_global_with_auto_load(&["atlas"]);
        assert!(h.store.is_loading("atlas"));

        assert!(h.resolve(&mut a).is_ok());
        assert!(h.resolve(&mut b).is_ok());
        assert_eq!(h.backend.loads.get(), 1);
        assert_eq!(h.store.retain_count("atlas", RetainScope::Global), 2);
    }

    #[test]
    fn last_release_unloads_and_removes() {
        let mut h = Harness::new();
        let mut fut = h.store.retain_global_with_auto_load(&["bgm", "bgm"]);
        h.resolve(&mut fut);

        h.store.release("bgm", RetainScope::Global).unwrap();
        assert!(h.store.contains("bgm"));
        assert_eq!(h.backend.unloads.get(), 0);

        h.store.release("bgm", RetainScope::Global).unwrap();
        assert!(!h.store.contains("bgm"));
        assert_eq!(h.backend.unloads.get(), 1);

        let mut again = h.store.retain_global_with_auto_load(&["bgm"]);
        h.resolve(&mut again);
        assert_eq!(h.backend.loads.get(), 2);
    }

    #[test]
    fn scene_scope_release_keeps_global_entries() {
        let mut h = Harness::new();
        let mut global = h.store.retain_global_with_auto_load(&["font", "shared"]);
        h.resolve(&mut global);
        let mut scene = h.store.retain_with_auto_load(&["stage", "shared"], RetainScope::Scene);
        h.resolve(&mut scene);

        let removed = h.store.release_scene_scope();

        assert_eq!(removed, 1);
        assert!(h.store.contains("font"));
        assert!(h.store.contains("shared"));
        assert!(!h.store.contains("stage"));
        assert_eq!(h.store.retain_count("shared", RetainScope::Scene), 0);
        assert_eq!(h.store.retain_count("shared", RetainScope::Global), 1);
        assert_eq!(h.backend.unloads.get(), 1);
    }

    #[test]
    fn partial_failure_reports_each_address() {
        let mut h = Harness::new();
        h.backend.failing.borrow_mut().insert("broken".to_owned());

        let mut a = h.store.retain_global_with_auto_load(&["ok", "broken"]);
        let mut b = h.store.retain_global_with_auto_load(&["broken"]);

        let report_a = h.resolve(&mut a);
        let report_b = h.resolve(&mut b);

        assert_eq!(report_a.loaded, vec!["ok".to_owned()]);
        assert!(report_a.failed.contains_key("broken"));
        assert_eq!(report_a.failed.get("broken"), report_b.failed.get("broken"));
        assert!(h.store.contains("ok"));
        assert!(!h.store.contains("broken"));
        assert_eq!(h.backend.loads.get(), 2);
    }

    #[test]
    fn dropping_a_pending_retain_gives_counts_back() {
        let mut h = Harness::new();

        let pending = h.store.retain_global_with_auto_load(&["movie"]);
        assert_eq!(h.store.retain_count("movie", RetainScope::Global), 1);
        drop(pending);
        assert!(!h.store.contains("movie"));

        h.tick();
        h.tick();
        assert_eq!(h.backend.loads.get(), 1);
        assert_eq!(h.backend.unloads.get(), 1);
    }

    #[test]
    fn cancelled_follower_keeps_leader_retain() {
        let mut h = Harness::new();

        let mut leader = h.store.retain_global_with_auto_load(&["voice"]);
        let follower = h.store.retain_global_with_auto_load(&["voice"]);
        drop(follower);

        assert!(h.resolve(&mut leader).is_ok());
        assert_eq!(h.store.retain_count("voice", RetainScope::Global), 1);
        assert_eq!(h.backend.unloads.get(), 0);
    }

    #[test]
    fn stale_scene_retain_leaves_next_scene_count_alone() {
        let mut h = Harness::new();
        let mut global = h.store.retain_global_with_auto_load(&["x"]);
        h.resolve(&mut global);

        let stale = h.store.retain_with_auto_load(&["x"], RetainScope::Scene);
        h.store.release_scene_scope();
        let mut fresh = h.store.retain_with_auto_load(&["x"], RetainScope::Scene);
        assert!(h.resolve(&mut fresh).is_ok());
        assert_eq!(h.store.retain_count("x", RetainScope::Scene), 1);

        drop(stale);
        assert_eq!(h.store.retain_count("x", RetainScope::Scene), 1);
        assert_eq!(h.store.retain_count("x", RetainScope::Global), 1);
    }

    #[test]
    fn scene_retain_cleared_before_resolving_is_reported_cancelled() {
        let mut h = Harness::new();
        let mut global = h.store.retain_global_with_auto_load(&["x"]);
        h.resolve(&mut global);

        let mut stale = h.store.retain_with_auto_load(&["x"], RetainScope::Scene);
        h.store.release_scene_scope();

        let report = h.resolve(&mut stale);
        assert!(report.loaded.is_empty());
        assert!(matches!(report.failed.get("x"), Some(LoadError::Cancelled { .. })));
    }

    #[test]
    fn waiter_on_replaced_entry_is_reported_cancelled() {
        let mut h = Harness::new();

        let mut pending = h.store.retain_global_with_auto_load(&["movie"]);
        h.store.release("movie", RetainScope::Global).unwrap();
        let mut fresh = h.store.retain_global_with_auto_load(&["movie"]);

        let report = h.resolve(&mut pending);
        assert!(report.loaded.is_empty());
        assert!(matches!(report.failed.get("movie"), Some(LoadError::Cancelled { .. })));

        assert!(h.resolve(&mut fresh).is_ok());
        assert_eq!(h.store.retain_count("movie", RetainScope::Global), 1);
        assert_eq!(h.backend.loads.get(), 2);
    }

    #[test]
    fn getters_never_trigger_loads() {
        let h = Harness::new();
        assert!(h.store.get::<String>("unknown").is_none());
        assert!(h.store.handle("unknown").is_none());
        assert_eq!(h.backend.loads.get(), 0);
    }

    #[test]
    fn single_retain_returns_handle() {
        let mut h = Harness::new();
        let mut fut = h.store.retain("icon", RetainScope::Scene).boxed_local();
        let handle = h.resolve(&mut fut).unwrap();
        assert_eq!(handle.address(), "icon");
        assert_eq!(h.store.retain_count("icon", RetainScope::Scene), 1);
    }

    #[test]
    fn counts_never_go_negative_and_load_once_while_held() {
        let mut h = Harness::new();
        let pattern = [true, true, false, true, false, false, true, false];
        let mut held = 0usize;
        let mut loads_expected = 0usize;

        for retain in pattern {
            if retain {
                if held == 0 {
                    loads_expected += 1;
                }
                let mut fut = h.store.retain_global_with_auto_load(&["sfx"]);
                h.resolve(&mut fut);
                held += 1;
            } else {
                h.store.release("sfx", RetainScope::Global).unwrap();
                held -= 1;
            }
            assert_eq!(h.store.retain_count("sfx", RetainScope::Global), held);
            assert_eq!(h.backend.loads.get(), loads_expected);
        }
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "without a Global retain"))]
    fn releasing_without_retain_is_an_invariant_violation() {
        let h = Harness::new();
        let result = h.store.release("ghost", RetainScope::Global);
        assert!(matches!(result, Err(ResourceError::NotRetained { .. })));
    }
}
