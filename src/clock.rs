//! Tick sources
//!
//! A clock invokes its callback once per display frame with a monotonic
//! timestamp in milliseconds. Callbacks never overlap and none runs after
//! `stop()` returns.

use std::cell::RefCell;
use std::rc::Rc;

pub type TickFn = Box<dyn FnMut(f64)>;

pub trait Clock {
    fn start(&mut self, on_tick: TickFn);
    /// Idempotent; only the first call on a running clock cancels
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}

#[derive(Default)]
struct ManualState {
    on_tick: Option<TickFn>,
    running: bool,
    now: f64,
    ticks: u64,
    cancellations: u32,
}

/// Clock driven by hand, for native runs and tests
///
/// Clones share state, so a test can keep one handle while the controller
/// owns another.
#[derive(Clone, Default)]
pub struct ManualClock {
    state: Rc<RefCell<ManualState>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timestamp of the last fired tick
    pub fn now(&self) -> f64 {
        self.state.borrow().now
    }

    pub fn ticks(&self) -> u64 {
        self.state.borrow().ticks
    }

    /// Number of times a running clock was stopped
    pub fn cancellations(&self) -> u32 {
        self.state.borrow().cancellations
    }

    /// Deliver one tick at `now`; false if the clock is not running
    ///
    /// The callback is taken out before it runs so it may stop the clock.
    pub fn fire(&self, now: f64) -> bool {
        let on_tick = {
            let mut st = self.state.borrow_mut();
            if !st.running {
                return false;
            }
            st.now = now;
            st.on_tick.take()
        };
        let Some(mut on_tick) = on_tick else {
            return false;
        };
        on_tick(now);

        let mut st = self.state.borrow_mut();
        st.ticks += 1;
        if st.running && st.on_tick.is_none() {
            st.on_tick = Some(on_tick);
        }
        true
    }

    /// Advance by `dt_ms` and fire
    pub fn step(&self, dt_ms: f64) -> bool {
        let now = self.now() + dt_ms;
        self.fire(now)
    }

    /// Fire `frames` ticks at the nominal 60 Hz cadence; returns how many ran
    pub fn run_frames(&self, frames: u32) -> u32 {
        let mut ran = 0;
        for _ in 0..frames {
            if !self.step(crate::consts::NOMINAL_FRAME_MS) {
                break;
            }
            ran += 1;
        }
        ran
    }
}

impl Clock for ManualClock {
    fn start(&mut self, on_tick: TickFn) {
        let mut st = self.state.borrow_mut();
        st.on_tick = Some(on_tick);
        st.running = true;
    }

    fn stop(&mut self) {
        let mut st = self.state.borrow_mut();
        if st.running {
            st.running = false;
            st.cancellations += 1;
        }
        st.on_tick = None;
    }

    fn is_running(&self) -> bool {
        self.state.borrow().running
    }
}

#[cfg(target_arch = "wasm32")]
pub use animation_frame::AnimationFrameClock;

#[cfg(target_arch = "wasm32")]
mod animation_frame {
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;

    use super::{Clock, TickFn};

    #[derive(Default)]
    struct FrameState {
        running: bool,
        handle: Option<i32>,
        // Kept after stop: the closure may be the one currently executing
        frame: Option<Closure<dyn FnMut(f64)>>,
        cancellations: u32,
    }

    /// `requestAnimationFrame` driven clock
    #[derive(Default)]
    pub struct AnimationFrameClock {
        state: Rc<RefCell<FrameState>>,
    }

    impl AnimationFrameClock {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn cancellations(&self) -> u32 {
            self.state.borrow().cancellations
        }
    }

    fn request(state: &Rc<RefCell<FrameState>>) {
        let handle = {
            let st = state.borrow();
            let (Some(frame), Some(window)) = (st.frame.as_ref(), web_sys::window()) else {
                return;
            };
            match window.request_animation_frame(frame.as_ref().unchecked_ref()) {
                Ok(h) => Some(h),
                Err(e) => {
                    log::error!("requestAnimationFrame failed: {:?}", e);
                    None
                }
            }
        };
        state.borrow_mut().handle = handle;
    }

    fn on_frame(state: &Weak<RefCell<FrameState>>, on_tick: &mut TickFn, now: f64) {
        let Some(state) = state.upgrade() else {
            return;
        };
        {
            let mut st = state.borrow_mut();
            if !st.running {
                return;
            }
            st.handle = None;
        }
        on_tick(now);
        // The tick may have stopped us
        if state.borrow().running {
            request(&state);
        }
    }

    impl Clock for AnimationFrameClock {
        fn start(&mut self, mut on_tick: TickFn) {
            self.stop();
            let weak = Rc::downgrade(&self.state);
            let frame = Closure::<dyn FnMut(f64)>::new(move |now: f64| {
                on_frame(&weak, &mut on_tick, now);
            });
            {
                let mut st = self.state.borrow_mut();
                st.frame = Some(frame);
                st.running = true;
            }
            request(&self.state);
        }

        fn stop(&mut self) {
            let mut st = self.state.borrow_mut();
            if !st.running {
                return;
            }
            st.running = false;
            st.cancellations += 1;
            if let (Some(handle), Some(window)) = (st.handle.take(), web_sys::window()) {
                let _ = window.cancel_animation_frame(handle);
            }
        }

        fn is_running(&self) -> bool {
            self.state.borrow().running
        }
    }
}
