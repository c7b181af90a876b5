//! Protothreads
//!
//! A protothread is the outermost state machine: one resume point per
//! instance, driven by the application's main loop through
//! [`Thread::run`]. Its body is written with the same [`steps!`] dispatch
//! as a coroutine and usually calls coroutines through [`call!`].
//!
//! ```ignore
//! impl Thread for Blink {
//!     fn run(&mut self) -> bool {
//!         let mut frame = self.pt.begin();
//!         steps!(frame {
//!             0 => { self.led.toggle(); self.timeout.restart(500); }
//!             1 => {
//!                 wait_until!(self.pt, frame, self.timeout.is_expired());
//!                 frame.goto(0);
//!                 continue;
//!             }
//!         } end => self.pt.exit())
//!     }
//! }
//! ```
//!
//! [`steps!`]: crate::steps
//! [`call!`]: crate::call

use crate::co::Frame;
use crate::types::{PtState, PT_START, PT_STOPPED};

/// State cell of one protothread
#[derive(Debug, Clone)]
pub struct Protothread {
    state: PtState,
}

impl Protothread {
    /// Create a protothread that starts at the top of its body
    pub const fn new() -> Self {
        Protothread { state: PT_START }
    }

    /// Enter the body at the point it last suspended.
    ///
    /// A stopped protothread resumes at `PT_STOPPED`, which no step
    /// matches, so its body goes straight to `end`.
    #[inline]
    pub fn begin(&self) -> Frame {
        Frame::new(0, self.state)
    }

    /// Record the frame's step; returns `true` ("still running")
    #[inline]
    pub fn suspend(&mut self, frame: &Frame) -> bool {
        debug_assert!(frame.point() != PT_STOPPED);
        self.state = frame.point();
        true
    }

    /// Stop the protothread; returns `false` ("finished")
    pub fn exit(&mut self) -> bool {
        if self.state != PT_STOPPED {
            crate::debug!("protothread exited");
        }
        self.stop();
        false
    }

    /// Start over from the top on the next invocation; returns `true`
    pub fn restart_now(&mut self) -> bool {
        self.restart();
        true
    }

    /// Start from the top on the next invocation
    #[inline]
    pub fn restart(&mut self) {
        self.state = PT_START;
    }

    /// Keep the protothread stopped until it is restarted
    #[inline]
    pub fn stop(&mut self) {
        self.state = PT_STOPPED;
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state != PT_STOPPED
    }

    /// Raw state cell
    #[inline]
    pub fn state(&self) -> PtState {
        self.state
    }
}

impl Default for Protothread {
    fn default() -> Self {
        Self::new()
    }
}

/// A protothread the main loop can drive
pub trait Thread {
    /// Run until the next suspension point; `true` while still running
    fn run(&mut self) -> bool;
}

/// Run every thread once, in slice order.
///
/// Returns `true` if any of them is still running.
pub fn run_all(threads: &mut [&mut dyn Thread]) -> bool {
    let mut running = false;
    for thread in threads.iter_mut() {
        running |= thread.run();
    }
    running
}
