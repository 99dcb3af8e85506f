//=========================================================================
// Aetheric Lifecycle — Library Root
//
// Scene lifecycle core of a game client: ordered scene transitions,
// reference-counted asset retention and the per-scene services around
// them (fade mask, scoped signals, scene clock, input blocking, back
// navigation).
//
// Typical usage:
// ```no_run
// use aetheric_lifecycle::prelude::*;
//
// fn main() {
//     let engine = EngineBuilder::new()
//         .build(collaborators())
//         .init(|catalog| register_scenes(catalog));
//     engine.launch("Boot");
//     engine.run();
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` contains every lifecycle subsystem. Normal application code
// reaches them through `CoreContext` handed to scene adapters.
//
pub mod core;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `engine` defines the builder and the frame loop.
//
mod engine;

//--- Public Exports ------------------------------------------------------

pub use engine::{Engine, EngineBuilder};
