//! Log ring buffer
//!
//! Fixed number of fixed-length lines. Once full, each new line evicts the
//! oldest one.

use heapless::String;

use crate::command::LOG_LINE_LEN;

/// Number of lines kept by the on-screen log
pub const LOG_CAPACITY: usize = 40;

/// Overwrite-oldest ring of log lines
#[derive(Clone)]
pub struct LogRing<const M: usize = LOG_CAPACITY> {
    lines: [String<LOG_LINE_LEN>; M],
    /// Slot the next line is written to
    write_index: usize,
    /// Number of valid lines
    count: usize,
}

impl<const M: usize> Default for LogRing<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const M: usize> LogRing<M> {
    pub fn new() -> Self {
        Self {
            lines: core::array::from_fn(|_| String::new()),
            write_index: 0,
            count: 0,
        }
    }

    /// Append a line, evicting the oldest when full
    pub fn push(&mut self, line: &str) {
        if M == 0 {
            return;
        }

        let slot = &mut self.lines[self.write_index];
        *slot = crate::command::truncate(line);

        self.write_index = (self.write_index + 1) % M;
        if self.count < M {
            self.count += 1;
        }
    }

    /// Drop every line
    pub fn clear(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
        self.write_index = 0;
        self.count = 0;
    }

    /// Lines oldest-first
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        (0..self.count).map(move |i| {
            let idx = (self.write_index + M - self.count + i) % M;
            self.lines[idx].as_str()
        })
    }

    /// Most recent line
    pub fn last(&self) -> Option<&str> {
        if self.count == 0 {
            None
        } else {
            Some(self.lines[(self.write_index + M - 1) % M].as_str())
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub const fn capacity(&self) -> usize {
        M
    }
}
