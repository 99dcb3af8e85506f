//=========================================================================
// Lifecycle Core
//
// Subsystems coordinated by the scene director, leaves first.
//
// Architecture:
//   frame ─► fade, prev, resources (wall-time tick source)
//   signal, time_keeper          (scene-scoped registries)
//   input_blocker ─► prev        (busy gating)
//   scene::SceneDirector         (transition state machine)
//   globals::CoreContext         (handle bundle passed to scenes)
//   platform_bridge              (platform thread → frame loop)
//
// Notes:
// Everything here runs on one thread inside the engine's LocalPool.
// Handles are `Rc`-shared; no `RefCell` borrow is held across an
// `.await` or a user callback.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod config;
pub mod error;
pub mod fade;
pub mod frame;
pub mod globals;
pub mod input_blocker;
pub mod platform_bridge;
pub mod prev;
pub mod resources;
pub mod scene;
pub mod signal;
pub mod time_keeper;
pub mod ui;

#[cfg(test)]
pub(crate) mod testing;
