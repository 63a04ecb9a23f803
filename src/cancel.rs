//!Cancellation flag polled by the pump between chunks.

use core::sync::atomic::{AtomicBool, Ordering};

///Lock-free boolean observed by a running pump.
///
///`trigger` performs a single atomic store: it never blocks and never
///allocates, so it can be called from a signal handler or any other
///context that must not take locks.
///
///The pump polls the flag before each input read only.
///An in-flight chunk is always fully drained and written before
///cancellation takes effect.
pub struct CancelFlag {
    flag: AtomicBool,
}

impl CancelFlag {
    ///Creates new flag in non-triggered state.
    pub const fn new() -> Self {
        Self {
            flag: AtomicBool::new(false),
        }
    }

    #[inline(always)]
    ///Requests cancellation of any pump polling this flag.
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    #[inline(always)]
    ///Returns whether cancellation has been requested.
    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    #[inline(always)]
    ///Clears the flag, allowing new operations to run.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Relaxed);
    }
}

impl Default for CancelFlag {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

static PROCESS: CancelFlag = CancelFlag::new();

#[inline(always)]
///Returns the process-wide flag used by the high level pump functions.
///
///Callers wire their interrupt notification (typically `SIGINT`) to
///[trigger](CancelFlag::trigger) on this flag; the pump itself only ever
///reads it.
pub fn process() -> &'static CancelFlag {
    &PROCESS
}
