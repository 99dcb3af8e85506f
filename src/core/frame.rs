//=========================================================================
// Frame Driver
//=========================================================================
//
// Per-frame tick source for the cooperative scheduler.
//
// Architecture:
//   Engine::tick(dt) → FrameDriver::advance(dt) → wake NextFrame waiters
//                                                        ↓
//                       LocalPool::run_until_stalled() resumes them
//
// A task suspended on `next_frame()` resumes exactly once per rendered
// frame. Wall time here is real frame time; it is never scaled or paused.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};
use std::time::Duration;

//=== FrameDriver =========================================================

#[derive(Default)]
struct FrameState {
    frame: u64,
    wall_time: Duration,
    waiters: Vec<Waker>,
}

/// Shared handle to the frame counter and accumulated wall time.
#[derive(Clone, Default)]
pub struct FrameDriver {
    state: Rc<RefCell<FrameState>>,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the current frame (0 before the first tick).
    pub fn frame(&self) -> u64 {
        self.state.borrow().frame
    }

    /// Wall time accumulated over all ticks.
    pub fn wall_time(&self) -> Duration {
        self.state.borrow().wall_time
    }

    /// Starts a new frame and wakes every task waiting for it.
    pub fn advance(&self, dt: Duration) {
        let waiters = {
            let mut state = self.state.borrow_mut();
            state.frame += 1;
            state.wall_time += dt;
            std::mem::take(&mut state.waiters)
        };

        for waker in waiters {
            waker.wake();
        }
    }

    /// Future resolving at the start of the next frame.
    pub fn next_frame(&self) -> NextFrame {
        NextFrame {
            driver: self.clone(),
            target: self.frame() + 1,
        }
    }

    /// Suspends for at least `duration` of wall time.
    pub async fn wait(&self, duration: Duration) {
        let until = self.wall_time() + duration;
        while self.wall_time() < until {
            self.next_frame().await;
        }
    }
}

impl std::fmt::Debug for FrameDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("FrameDriver")
            .field("frame", &state.frame)
            .field("wall_time", &state.wall_time)
            .field("waiters", &state.waiters.len())
            .finish()
    }
}

//=== NextFrame ===========================================================

/// Resolves once the driver's frame counter reaches `target`.
pub struct NextFrame {
    driver: FrameDriver,
    target: u64,
}

impl Future for NextFrame {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let mut state = self.driver.state.borrow_mut();
        if state.frame >= self.target {
            return Poll::Ready(());
        }

        if !state.waiters.iter().any(|w| w.will_wake(cx.waker())) {
            state.waiters.push(cx.waker().clone());
        }
        Poll::Pending
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
