//! One-slot completion notification

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embedded_hal_async::delay::DelayNs;
use portable_atomic::{AtomicBool, Ordering};

/// Notification from the panel's completion interrupt to the render task
pub struct VsyncHandshake {
    signal: Signal<CriticalSectionRawMutex, ()>,
    /// Set while the render task is parked in [`wait`](Self::wait)
    waiting: AtomicBool,
}

impl Default for VsyncHandshake {
    fn default() -> Self {
        Self::new()
    }
}

impl VsyncHandshake {
    pub const fn new() -> Self {
        Self {
            signal: Signal::new(),
            waiting: AtomicBool::new(false),
        }
    }

    /// Drop a stale completion left over from an earlier frame
    pub fn reset(&self) {
        self.signal.reset();
    }

    /// Raise the completion; safe from interrupt context
    ///
    /// Returns `true` if the render task was parked waiting for it.
    pub fn signal(&self) -> bool {
        self.signal.signal(());
        self.waiting.load(Ordering::Acquire)
    }

    /// Completion raised and not yet consumed
    pub fn is_pending(&self) -> bool {
        self.signal.signaled()
    }

    /// Wait for the next completion, consuming it
    pub async fn wait(&self) {
        self.waiting.store(true, Ordering::Release);
        self.signal.wait().await;
        self.waiting.store(false, Ordering::Release);
    }

    /// Wait for the next completion for at most `timeout_ms`
    ///
    /// Returns `false` if the wait expired.
    pub async fn wait_timeout<D: DelayNs>(&self, timeout_ms: u32, delay: &mut D) -> bool {
        let completed = match select(self.wait(), delay.delay_ms(timeout_ms)).await {
            Either::First(()) => true,
            Either::Second(()) => false,
        };
        // A dropped wait future leaves the flag set
        self.waiting.store(false, Ordering::Release);
        completed
    }
}
