//=========================================================================
// Input Blocker
//=========================================================================
//
// Reentrant busy counter gating user input during async work.
//
// Overlapping operations each hold their own count, so the first one to
// finish cannot unblock input another still needs blocked. `busy_scope`
// ties a count to a guard, releasing it on every exit path.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::Cell;
use std::rc::Rc;

use log::{debug, error};

//=== Internal Dependencies ===============================================

use super::ui::UiHooks;

//=== InputBlocker ========================================================

#[derive(Clone)]
pub struct InputBlocker {
    busy: Rc<Cell<usize>>,
    ui: Rc<dyn UiHooks>,
}

impl InputBlocker {
    pub fn new(ui: Rc<dyn UiHooks>) -> Self {
        Self {
            busy: Rc::new(Cell::new(0)),
            ui,
        }
    }

    pub fn add_busy_process(&self) {
        let count = self.busy.get() + 1;
        self.busy.set(count);
        if count == 1 {
            debug!("Input blocked");
            self.ui.show_blocking_overlay();
        }
    }

    /// Reducing an idle blocker is a programming error.
    pub fn reduce_busy_process(&self) {
        let count = self.busy.get();
        if count == 0 {
            error!("reduce_busy_process called with no busy process");
            debug_assert!(false, "reduce_busy_process called with no busy process");
            return;
        }

        self.busy.set(count - 1);
        if count == 1 {
            debug!("Input unblocked");
            self.ui.close_blocking_overlay();
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.busy.get() > 0
    }

    pub fn busy_count(&self) -> usize {
        self.busy.get()
    }

    /// Blocks input until the returned guard is dropped.
    pub fn busy_scope(&self) -> BusyGuard {
        self.add_busy_process();
        BusyGuard {
            blocker: self.clone(),
        }
    }
}

impl std::fmt::Debug for InputBlocker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputBlocker")
            .field("busy", &self.busy.get())
            .finish_non_exhaustive()
    }
}

//=== BusyGuard ===========================================================

/// One busy count, released on drop.
#[must_use = "input is unblocked as soon as the guard is dropped"]
#[derive(Debug)]
pub struct BusyGuard {
    blocker: InputBlocker,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.blocker.reduce_busy_process();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
