//=========================================================================
// Global Lifecycle State
//=========================================================================
//
// Explicitly constructed replacement for process-wide singletons.
//
// Architecture:
//   Collaborators: engine-side trait objects (loader, backend, mask, UI)
//   CoreContext:   handles to every lifecycle subsystem (passed to scenes)
//
//=========================================================================

//=== Module Declarations =================================================

mod collaborators;
mod core_context;

//=== Public API ==========================================================

pub use collaborators::Collaborators;
pub use core_context::CoreContext;
