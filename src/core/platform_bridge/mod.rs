//=========================================================================
// Platform Bridge
//=========================================================================
//
// Bridges the platform thread with the single-threaded lifecycle core.
//
// The platform side only holds a `Sender<PlatformEvent>`; everything it
// triggers runs on the frame loop when the engine drains the channel.
//
// Components:
// - `interface`: Event types (the contract)
// - `event_collector`: Core-side bounded event draining
//
//=========================================================================

//=== Module Declarations =================================================

pub(crate) mod event_collector;
pub(crate) mod interface;

//=== Public API ==========================================================

pub use event_collector::TickControl;
pub use interface::PlatformEvent;

pub(crate) use event_collector::EventCollector;
