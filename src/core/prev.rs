//=========================================================================
// Prev Stack
//=========================================================================
//
// LIFO of pending "go back" actions driven by the hardware back signal.
//
// Flow (handle_back):
//   debounce window → input blocked? → validate predicate → pop & invoke
//                                                          └─ empty → notice
//
// The debounce is a cooldown timestamp compared against frame wall time,
// so no timer task outlives the stack.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use log::{debug, info};

//=== Internal Dependencies ===============================================

use super::frame::FrameDriver;
use super::input_blocker::InputBlocker;
use super::ui::{Notice, UiHooks};

//=== Types ===============================================================

pub type PrevAction = Box<dyn FnOnce()>;

/// What a back press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackOutcome {
    /// The top action was popped and run.
    Invoked,
    /// Nothing to go back to; the notice was shown.
    Empty,
    /// Input is blocked by a busy process.
    Blocked,
    /// The validation predicate refused.
    Vetoed,
    /// Same physical press seen again within the debounce window.
    Debounced,
}

struct PrevState {
    actions: Vec<PrevAction>,
    validate: Option<Rc<dyn Fn() -> bool>>,
    last_back: Option<Duration>,
}

//=== PrevStack ===========================================================

#[derive(Clone)]
pub struct PrevStack {
    state: Rc<RefCell<PrevState>>,
    blocker: InputBlocker,
    frames: FrameDriver,
    ui: Rc<dyn UiHooks>,
    debounce: Duration,
}

impl PrevStack {
    pub fn new(
        blocker: InputBlocker,
        frames: FrameDriver,
        ui: Rc<dyn UiHooks>,
        debounce: Duration,
    ) -> Self {
        Self {
            state: Rc::new(RefCell::new(PrevState {
                actions: Vec::new(),
                validate: None,
                last_back: None,
            })),
            blocker,
            frames,
            ui,
            debounce,
        }
    }

    //--- Stack Operations -------------------------------------------------

    pub fn push(&self, action: impl FnOnce() + 'static) {
        self.state.borrow_mut().actions.push(Box::new(action));
    }

    /// Removes the top action without running it.
    pub fn pop(&self) -> Option<PrevAction> {
        self.state.borrow_mut().actions.pop()
    }

    pub fn clear(&self) {
        let mut state = self.state.borrow_mut();
        if !state.actions.is_empty() {
            debug!("Clearing {} prev actions", state.actions.len());
        }
        state.actions.clear();
    }

    pub fn len(&self) -> usize {
        self.state.borrow().actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Back navigation is allowed only while `predicate` returns true.
    pub fn set_validate(&self, predicate: impl Fn() -> bool + 'static) {
        self.state.borrow_mut().validate = Some(Rc::new(predicate));
    }

    pub fn clear_validate(&self) {
        self.state.borrow_mut().validate = None;
    }

    //--- Back Signal ------------------------------------------------------

    /// Processes one hardware back press.
    pub fn handle_back(&self) -> BackOutcome {
        let now = self.frames.wall_time();
        let validate = {
            let mut state = self.state.borrow_mut();
            if let Some(last) = state.last_back {
                if now < last + self.debounce {
                    return BackOutcome::Debounced;
                }
            }
            state.last_back = Some(now);
            state.validate.clone()
        };

        if self.blocker.is_blocking() {
            debug!("Back ignored: input blocked");
            return BackOutcome::Blocked;
        }

        if let Some(validate) = validate {
            if !validate() {
                debug!("Back vetoed by validation predicate");
                return BackOutcome::Vetoed;
            }
        }

        match self.pop() {
            Some(action) => {
                action();
                BackOutcome::Invoked
            }
            None => {
                info!("Back pressed with nothing to go back to");
                self.ui.pop_notification(&Notice::NothingToGoBack);
                BackOutcome::Empty
            }
        }
    }
}

impl std::fmt::Debug for PrevStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrevStack")
            .field("len", &self.len())
            .field("debounce", &self.debounce)
            .finish_non_exhaustive()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
