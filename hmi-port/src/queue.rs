//! Bounded command queue
//!
//! A fixed-capacity FIFO between any number of producers and the single
//! render task. Enqueue and dequeue happen inside a critical section, so a
//! concurrent drain never observes a half-written command.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use embedded_hal_async::delay::DelayNs;

use crate::command::Command;

/// Default queue depth
pub const QUEUE_CAPACITY: usize = 20;

/// Fixed-capacity command FIFO
pub struct CommandQueue<M: RawMutex, const N: usize> {
    channel: Channel<M, Command, N>,
}

impl<M: RawMutex, const N: usize> Default for CommandQueue<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex, const N: usize> CommandQueue<M, N> {
    /// Create an empty queue
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Enqueue without waiting
    ///
    /// Returns `false` and discards the command when the queue is full.
    /// Safe to call from interrupt context.
    pub fn try_enqueue(&self, command: Command) -> bool {
        match self.channel.try_send(command) {
            Ok(()) => true,
            Err(TrySendError::Full(command)) => {
                warn!("UI queue full, dropping {:?}", command.kind());
                false
            }
        }
    }

    /// Enqueue, waiting as long as it takes for a free slot
    pub async fn send(&self, command: Command) {
        self.channel.send(command).await
    }

    /// Enqueue, waiting at most `timeout_ms` for a free slot
    ///
    /// Returns `false` if the wait expired; the command is then discarded.
    pub async fn send_timeout<D: DelayNs>(
        &self,
        command: Command,
        timeout_ms: u32,
        delay: &mut D,
    ) -> bool {
        match select(self.channel.send(command), delay.delay_ms(timeout_ms)).await {
            Either::First(()) => true,
            Either::Second(()) => {
                warn!("UI queue still full after {} ms", timeout_ms);
                false
            }
        }
    }

    /// Dequeue until empty, handing each command to `apply` in FIFO order
    ///
    /// Returns the number of commands applied. Must only be called from the
    /// render task.
    pub fn drain(&self, mut apply: impl FnMut(Command)) -> usize {
        let mut applied = 0;
        while let Ok(command) = self.channel.try_receive() {
            apply(command);
            applied += 1;
        }
        applied
    }

    /// Number of queued commands
    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.channel.is_full()
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{color_hex, CommandKind};
    use crate::testing::InstantDelay;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use proptest::prelude::*;
    use std::vec::Vec;

    type TestQueue<const N: usize> = CommandQueue<CriticalSectionRawMutex, N>;

    fn log_text(command: &Command) -> &str {
        match command {
            Command::AppendLog { text } => text.as_str(),
            _ => "",
        }
    }

    #[test]
    fn test_enqueue_and_drain() {
        let queue: TestQueue<4> = CommandQueue::new();
        assert!(queue.try_enqueue(Command::RefreshStatus));
        assert!(queue.try_enqueue(Command::ClearLog));
        assert_eq!(queue.len(), 2);

        let mut kinds = Vec::new();
        let applied = queue.drain(|c| kinds.push(c.kind()));

        assert_eq!(applied, 2);
        assert_eq!(kinds, [CommandKind::RefreshStatus, CommandKind::ClearLog]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_full_queue_drops_newest() {
        let queue: TestQueue<2> = CommandQueue::new();
        assert!(queue.try_enqueue(Command::log_line("a")));
        assert!(queue.try_enqueue(Command::log_line("b")));
        assert!(queue.is_full());
        assert!(!queue.try_enqueue(Command::log_line("c")));

        let mut seen = Vec::new();
        queue.drain(|c| seen.push(std::string::String::from(log_text(&c))));
        assert_eq!(seen, ["a", "b"]);
    }

    #[test]
    fn test_drain_empty_queue() {
        let queue: TestQueue<2> = CommandQueue::new();
        assert_eq!(queue.drain(|_| panic!("nothing queued")), 0);
    }

    #[test]
    fn test_send_timeout_expires_when_full() {
        let queue: TestQueue<1> = CommandQueue::new();
        assert!(queue.try_enqueue(Command::ClearLog));

        let mut delay = InstantDelay::default();
        let sent = block_on(queue.send_timeout(Command::RefreshStatus, 50, &mut delay));

        assert!(!sent);
        assert_eq!(delay.total_ms(), 50);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_send_timeout_with_space() {
        let queue: TestQueue<1> = CommandQueue::new();
        let mut delay = InstantDelay::default();

        assert!(block_on(queue.send_timeout(Command::ClearLog, 50, &mut delay)));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_send_waits_for_consumer() {
        static QUEUE: TestQueue<1> = CommandQueue::new();
        assert!(QUEUE.try_enqueue(Command::log_line("first")));

        let consumer = std::thread::spawn(|| {
            std::thread::sleep(std::time::Duration::from_millis(20));
            let mut seen = Vec::new();
            while seen.len() < 2 {
                QUEUE.drain(|c| seen.push(std::string::String::from(log_text(&c))));
            }
            seen
        });

        block_on(QUEUE.send(Command::log_line("second")));
        assert_eq!(consumer.join().unwrap(), ["first", "second"]);
    }

    #[test]
    fn test_status_scenario_last_write_wins() {
        let queue: TestQueue<4> = CommandQueue::new();
        queue.try_enqueue(Command::status_item(0, "Temp", "25C", color_hex(0x00FF00)));
        queue.try_enqueue(Command::status_item(0, "Temp", "30C", color_hex(0xFF0000)));

        let mut last = None;
        queue.drain(|c| {
            if let Command::SetStatusItem { value, color, .. } = c {
                last = Some((value, color));
            }
        });

        let (value, color) = last.unwrap();
        assert_eq!(value.as_str(), "30C");
        assert_eq!(color, color_hex(0xFF0000));
    }

    proptest! {
        #[test]
        fn prop_fifo_order_preserved(ops in proptest::collection::vec(any::<bool>(), 1..200)) {
            // `true` enqueues the next sequence number, `false` drains
            let queue: TestQueue<8> = CommandQueue::new();
            let mut next = 0u32;
            let mut accepted = Vec::new();
            let mut applied = Vec::new();

            for enqueue in ops {
                if enqueue {
                    let mut text: heapless::String<16> = heapless::String::new();
                    let _ = core::fmt::Write::write_fmt(&mut text, format_args!("{}", next));
                    if queue.try_enqueue(Command::log_line(&text)) {
                        accepted.push(next);
                    }
                    next += 1;
                } else {
                    queue.drain(|c| applied.push(log_text(&c).parse::<u32>().unwrap()));
                }
            }
            queue.drain(|c| applied.push(log_text(&c).parse::<u32>().unwrap()));

            prop_assert_eq!(applied, accepted);
        }

        #[test]
        fn prop_accepted_never_exceeds_capacity(attempts in 0usize..64) {
            let queue: TestQueue<20> = CommandQueue::new();
            let accepted = (0..attempts)
                .filter(|_| queue.try_enqueue(Command::RefreshStatus))
                .count();

            prop_assert_eq!(accepted, attempts.min(20));
            prop_assert_eq!(queue.len(), accepted);
        }
    }
}
