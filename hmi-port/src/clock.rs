//! Virtual millisecond clock
//!
//! Advanced by a periodic tick source (timer interrupt on hardware, a
//! thread on the host) and read by the toolkit and by log timestamping.

use core::fmt::Write;

use embedded_hal_async::delay::DelayNs;
use heapless::String;
use portable_atomic::{AtomicU32, Ordering};

use crate::command::{truncate, LOG_LINE_LEN};

/// Default tick period in milliseconds
pub const TICK_PERIOD_MS: u32 = 2;

/// Length of the widest timestamp prefix, `[1193:02:47.295] `
pub const STAMP_LEN: usize = 17;

/// Monotonic millisecond counter, wrapping at `u32::MAX`
pub struct VirtualClock {
    ms: AtomicU32,
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualClock {
    pub const fn new() -> Self {
        Self {
            ms: AtomicU32::new(0),
        }
    }

    /// Advance the clock; safe from interrupt context
    pub fn tick(&self, elapsed_ms: u32) {
        self.ms.fetch_add(elapsed_ms, Ordering::Relaxed);
    }

    /// Milliseconds elapsed since start
    pub fn now_ms(&self) -> u32 {
        self.ms.load(Ordering::Relaxed)
    }
}

/// Format `ms` as `[HH:MM:SS.mmm] `
pub fn format_timestamp(ms: u32) -> String<STAMP_LEN> {
    let total_s = ms / 1000;
    let hours = total_s / 3600;
    let minutes = (total_s % 3600) / 60;
    let seconds = total_s % 60;

    let mut out = String::new();
    let _ = write!(
        out,
        "[{:02}:{:02}:{:02}.{:03}] ",
        hours,
        minutes,
        seconds,
        ms % 1000
    );
    out
}

/// Prefix `text` with the timestamp for `ms`, truncated to one log line
pub fn stamp_line(ms: u32, text: &str) -> String<LOG_LINE_LEN> {
    let mut line: String<LOG_LINE_LEN> = truncate(&format_timestamp(ms));
    let room = LOG_LINE_LEN - line.len();

    let mut end = text.len().min(room);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let _ = line.push_str(&text[..end]);
    line
}

/// Periodic tick source
///
/// Advances `clock` by `period_ms` every period. Missed periods only slow
/// the virtual clock down; nothing else depends on tick delivery.
pub async fn run_tick_source<D: DelayNs>(clock: &VirtualClock, period_ms: u32, delay: &mut D) -> ! {
    info!("Tick source started ({} ms)", period_ms);

    loop {
        delay.delay_ms(period_ms).await;
        clock.tick(period_ms);
    }
}
