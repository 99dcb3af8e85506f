//=========================================================================
// Asset Backend Interface
//=========================================================================
//
// Contract between the resource store and the engine's asset pipeline.
//
// The store owns retain counts and coalescing; the backend only knows
// how to turn an address into a loaded asset and how to free it.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use futures::future::LocalBoxFuture;

//=== Internal Dependencies ===============================================

use crate::core::error::LoadError;

//=== AssetHandle =========================================================

/// A loaded asset, shared between the cache and its readers.
#[derive(Clone)]
pub struct AssetHandle {
    address: Rc<str>,
    asset: Rc<dyn Any>,
}

impl AssetHandle {
    pub fn new<T: Any>(address: &str, asset: T) -> Self {
        Self {
            address: Rc::from(address),
            asset: Rc::new(asset),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Typed view of the asset, `None` on type mismatch.
    pub fn downcast<T: Any>(&self) -> Option<Rc<T>> {
        self.asset.clone().downcast::<T>().ok()
    }

    /// Identity comparison: same underlying load.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.asset, &other.asset)
    }
}

impl fmt::Debug for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetHandle")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

//=== AssetBackend ========================================================

/// Engine asset pipeline.
///
/// `load_asset` futures run on the lifecycle's local executor and may
/// suspend for as many frames as the backend needs.
pub trait AssetBackend {
    fn load_asset(&self, address: &str) -> LocalBoxFuture<'static, Result<AssetHandle, LoadError>>;

    fn unload_asset(&self, handle: AssetHandle);
}

//=========================================================================
// Unit Tests
//=========================================================================
