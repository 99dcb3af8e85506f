//=========================================================================
// Platform Bridge Interface
//=========================================================================
//
// Platform-to-core event contract.
//
//=========================================================================

//=== PlatformEvent =======================================================

/// Events sent from the platform thread to the frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformEvent {
    /// Hardware back button (Android back, Escape).
    BackPressed,

    /// Application shutdown requested.
    Quit,
}
