//=========================================================================
// Resources
//=========================================================================
//
// Address-keyed asset retention with Global and Scene scopes.
//
// Components:
// - `backend`: the engine asset pipeline contract and loaded handles
// - `store`: retain counting, request coalescing, scoped release
//
//=========================================================================

//=== Module Declarations =================================================

mod backend;
mod store;

//=== Public API ==========================================================

pub use backend::{AssetBackend, AssetHandle};
pub use store::{ResourceStore, RetainFuture, RetainReport, RetainScope};
