//! Shared context between producers, interrupts and the render task
//!
//! One [`Bridge`] exists per display. It is `const`-constructible so it can
//! live in a `static` or a `StaticCell`, and every method takes `&self`.
//!
//! ```ignore
//! static BRIDGE: Bridge = Bridge::new();
//!
//! // Any task
//! BRIDGE.set_status_item(0, "Temp", "25°C", color_hex(0x00FF00));
//! BRIDGE.append_log("Device ready.");
//!
//! // Panel interrupt
//! let need_yield = BRIDGE.notify_vsync();
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embedded_hal_async::delay::DelayNs;

use crate::clock::{stamp_line, VirtualClock};
use crate::command::{ButtonCallback, Color, Command};
use crate::flush::{TripleBuffer, VsyncHandshake};
use crate::lock::{CrossTaskLock, LockGuard, Owner, Timeout};
use crate::queue::{CommandQueue, QUEUE_CAPACITY};

/// Queue type used by the bridge
pub type UiQueue = CommandQueue<CriticalSectionRawMutex, QUEUE_CAPACITY>;

/// Producer API and cross-context primitives for one display
pub struct Bridge {
    queue: UiQueue,
    lock: CrossTaskLock,
    vsync: VsyncHandshake,
    rotation: TripleBuffer,
    clock: VirtualClock,
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}

impl Bridge {
    pub const fn new() -> Self {
        Self {
            queue: CommandQueue::new(),
            lock: CrossTaskLock::new(),
            vsync: VsyncHandshake::new(),
            rotation: TripleBuffer::new(),
            clock: VirtualClock::new(),
        }
    }

    // Producer API. All calls are fire-and-forget: they never wait and
    // return `false` if the command was dropped.

    /// Show firmware name and version in the top banner
    pub fn set_top_banner(&self, name: &str, version: &str) -> bool {
        self.enqueue(Command::top_banner(name, version))
    }

    /// Set status slot `index` (0..6)
    pub fn set_status_item(&self, index: usize, key: &str, value: &str, color: Color) -> bool {
        self.enqueue_checked(Command::status_item(index, key, value, color))
    }

    /// Label button `index` (0..4) and bind its click handler
    pub fn set_button(&self, index: usize, label: &str, callback: Option<ButtonCallback>) -> bool {
        self.enqueue_checked(Command::button(index, label, callback))
    }

    /// Append a log line stamped with the current virtual time
    pub fn append_log(&self, text: &str) -> bool {
        self.enqueue(Command::AppendLog {
            text: stamp_line(self.clock.now_ms(), text),
        })
    }

    pub fn set_bottom_banner(&self, ip: &str, baud: u32, firmware_id: &str) -> bool {
        self.enqueue(Command::bottom_banner(ip, baud, firmware_id))
    }

    /// Redraw every status slot
    pub fn refresh_status(&self) -> bool {
        self.enqueue(Command::RefreshStatus)
    }

    pub fn clear_log(&self) -> bool {
        self.enqueue(Command::ClearLog)
    }

    /// Queue an arbitrary command without waiting
    pub fn enqueue(&self, command: Command) -> bool {
        self.queue.try_enqueue(command)
    }

    /// Queue a command after checking its slot index
    fn enqueue_checked(&self, command: Command) -> bool {
        if !command.index_in_range() {
            warn!("{:?} slot index out of range", command.kind());
            return false;
        }
        self.enqueue(command)
    }

    /// Queue a command that must not be lost, waiting for space
    pub async fn send(&self, command: Command) {
        self.queue.send(command).await
    }

    /// Queue a command, waiting at most `timeout_ms` for space
    pub async fn send_timeout<D: DelayNs>(
        &self,
        command: Command,
        timeout_ms: u32,
        delay: &mut D,
    ) -> bool {
        self.queue.send_timeout(command, timeout_ms, delay).await
    }

    /// Panel finished scanning out a frame; call from its interrupt
    ///
    /// Returns `true` if a waiting render task was released or the triple
    /// buffer rotation advanced, i.e. a context switch may be worthwhile.
    pub fn notify_vsync(&self) -> bool {
        let rotated = self.rotation.on_vsync();
        let released = self.vsync.signal();
        rotated | released
    }

    /// Advance the virtual clock; call from the tick interrupt
    pub fn tick(&self, elapsed_ms: u32) {
        self.clock.tick(elapsed_ms);
    }

    pub fn now_ms(&self) -> u32 {
        self.clock.now_ms()
    }

    /// Take the cross-task lock for direct toolkit access
    pub async fn lock<D: DelayNs>(
        &self,
        owner: Owner,
        timeout: Timeout,
        delay: &mut D,
    ) -> Option<LockGuard<'_>> {
        self.lock.lock(owner, timeout, delay).await
    }

    /// Take the cross-task lock if it is free right now
    pub fn try_lock(&self, owner: Owner) -> Option<LockGuard<'_>> {
        self.lock.try_lock(owner)
    }

    pub fn queue(&self) -> &UiQueue {
        &self.queue
    }

    pub fn ui_lock(&self) -> &CrossTaskLock {
        &self.lock
    }

    pub fn vsync(&self) -> &VsyncHandshake {
        &self.vsync
    }

    pub fn rotation(&self) -> &TripleBuffer {
        &self.rotation
    }

    pub fn clock(&self) -> &VirtualClock {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{color_hex, CommandKind, BUTTON_SLOTS, STATUS_SLOTS};
    use crate::testing::InstantDelay;
    use embassy_futures::block_on;
    use std::sync::Arc;
    use std::thread;
    use std::vec::Vec;

    fn drain_kinds(bridge: &Bridge) -> Vec<CommandKind> {
        let mut kinds = Vec::new();
        bridge.queue().drain(|c| kinds.push(c.kind()));
        kinds
    }

    #[test]
    fn test_producer_calls_enqueue_in_order() {
        let bridge = Bridge::new();
        assert!(bridge.set_top_banner("UniController", "v1.0.0"));
        assert!(bridge.set_status_item(0, "Temp", "25°C", color_hex(0x00FF00)));
        assert!(bridge.set_button(0, "Start", None));
        assert!(bridge.append_log("System booting..."));
        assert!(bridge.set_bottom_banner("192.168.1.100", 115200, "FW-2025"));
        assert!(bridge.refresh_status());
        assert!(bridge.clear_log());

        assert_eq!(
            drain_kinds(&bridge),
            [
                CommandKind::SetTopBanner,
                CommandKind::SetStatusItem,
                CommandKind::SetButton,
                CommandKind::AppendLog,
                CommandKind::SetBottomBanner,
                CommandKind::RefreshStatus,
                CommandKind::ClearLog,
            ]
        );
    }

    #[test]
    fn test_out_of_range_rejected_at_producer() {
        let bridge = Bridge::new();
        assert!(!bridge.set_status_item(STATUS_SLOTS, "k", "v", color_hex(0)));
        assert!(!bridge.set_button(BUTTON_SLOTS, "b", None));
        assert!(bridge.queue().is_empty());
    }

    #[test]
    fn test_append_log_stamped_with_clock() {
        let bridge = Bridge::new();
        bridge.tick(61_250);
        bridge.append_log("Network connected.");

        let mut text = std::string::String::new();
        bridge.queue().drain(|c| {
            if let Command::AppendLog { text: t } = c {
                text = t.as_str().into();
            }
        });
        assert_eq!(text, "[00:01:01.250] Network connected.");
    }

    #[test]
    fn test_drop_on_full() {
        let bridge = Bridge::new();
        let accepted = (0..QUEUE_CAPACITY + 5)
            .filter(|_| bridge.refresh_status())
            .count();

        assert_eq!(accepted, QUEUE_CAPACITY);
        assert!(bridge.queue().is_full());
    }

    #[test]
    fn test_send_timeout_when_full() {
        let bridge = Bridge::new();
        while bridge.clear_log() {}

        let mut delay = InstantDelay::default();
        assert!(!block_on(bridge.send_timeout(Command::RefreshStatus, 10, &mut delay)));

        bridge.queue().drain(|_| {});
        assert!(block_on(bridge.send_timeout(Command::RefreshStatus, 10, &mut delay)));
        block_on(bridge.send(Command::ClearLog));
        assert_eq!(bridge.queue().len(), 2);
    }

    #[test]
    fn test_notify_vsync_reports_waiter() {
        let bridge = Bridge::new();
        // Nobody waiting, rotation idle
        assert!(!bridge.notify_vsync());
        assert!(bridge.vsync().is_pending());

        // Rotation advanced
        bridge.rotation().queue(1);
        assert!(bridge.notify_vsync());
        assert_eq!(bridge.rotation().shown(), 1);
    }

    #[test]
    fn test_lock_through_bridge() {
        let bridge = Bridge::new();
        let app = Owner::new(7);
        let guard = bridge.try_lock(app).unwrap();
        assert!(bridge.try_lock(Owner::RENDER).is_none());
        drop(guard);

        let mut delay = InstantDelay::default();
        let guard = block_on(bridge.lock(Owner::RENDER, Timeout::Millis(1), &mut delay));
        assert!(guard.is_some());
    }

    #[test]
    fn test_concurrent_producers() {
        let bridge = Arc::new(Bridge::new());
        let producers: Vec<_> = (0..4)
            .map(|_| {
                let bridge = bridge.clone();
                thread::spawn(move || (0..10).filter(|_| bridge.refresh_status()).count())
            })
            .collect();

        let accepted: usize = producers.into_iter().map(|p| p.join().unwrap()).sum();
        assert_eq!(accepted, QUEUE_CAPACITY);
        assert_eq!(bridge.queue().len(), QUEUE_CAPACITY);
    }
}
