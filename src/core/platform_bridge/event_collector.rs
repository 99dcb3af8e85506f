//=========================================================================
// Event Collector
//=========================================================================
//
// Platform event collector with bounded polling and shutdown detection.
//
// Architecture:
//   Receiver<PlatformEvent> → collect_frame() → back_presses → TickControl
//
// Bounded polling prevents starvation. Pacing belongs to the run loop,
// so collecting never sleeps.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{Receiver, TryRecvError};
use log::{info, warn};

//=== Internal Dependencies ===============================================

use super::PlatformEvent;

//=== TickControl =========================================================

/// Update loop control signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Exit,
}

//=== EventCollector ======================================================

/// Drains platform events once per frame.
pub(crate) struct EventCollector {
    receiver: Receiver<PlatformEvent>,
    back_presses: usize,
}

impl EventCollector {
    pub(crate) fn new(receiver: Receiver<PlatformEvent>) -> Self {
        Self {
            receiver,
            back_presses: 0,
        }
    }

    /// Collects pending platform events (bounded to prevent starvation).
    pub(crate) fn collect_frame(&mut self) -> TickControl {
        const MAX_EVENTS_PER_FRAME: usize = 100;

        self.back_presses = 0;
        let mut drained = 0;

        while drained < MAX_EVENTS_PER_FRAME {
            match self.receiver.try_recv() {
                Ok(PlatformEvent::BackPressed) => {
                    self.back_presses += 1;
                    drained += 1;
                }
                Ok(PlatformEvent::Quit) => {
                    info!("Quit requested by platform");
                    return TickControl::Exit;
                }
                Err(TryRecvError::Disconnected) => {
                    info!("Platform channel disconnected");
                    return TickControl::Exit;
                }
                Err(TryRecvError::Empty) => break,
            }
        }

        if drained >= MAX_EVENTS_PER_FRAME {
            warn!("Event queue backlog: drained {} events this frame", drained);
        }

        TickControl::Continue
    }

    /// Back presses collected by the last `collect_frame`.
    pub(crate) fn back_presses(&self) -> usize {
        self.back_presses
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
