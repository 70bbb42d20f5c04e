//! Wall-clock delay for host threads

use std::future::poll_fn;
use std::task::Poll;
use std::thread;
use std::time::{Duration, Instant};

use embedded_hal_async::delay::DelayNs;

/// Longest uninterrupted sleep inside one poll
const SLICE: Duration = Duration::from_millis(1);

/// Sleeps in short slices and yields between them
///
/// A delay raced against another future in a `select` must not hold the
/// thread for its full duration, or the other side could never complete
/// first.
#[derive(Debug, Default, Clone, Copy)]
pub struct SleepDelay;

impl DelayNs for SleepDelay {
    async fn delay_ns(&mut self, ns: u32) {
        sleep_until(Instant::now() + Duration::from_nanos(ns as u64)).await
    }

    async fn delay_ms(&mut self, ms: u32) {
        sleep_until(Instant::now() + Duration::from_millis(ms as u64)).await
    }
}

async fn sleep_until(deadline: Instant) {
    poll_fn(|cx| {
        let now = Instant::now();
        if now >= deadline {
            return Poll::Ready(());
        }
        thread::sleep((deadline - now).min(SLICE));
        cx.waker().wake_by_ref();
        Poll::Pending
    })
    .await
}
