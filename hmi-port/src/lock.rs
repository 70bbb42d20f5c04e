//! Cross-task reentrant lock
//!
//! Guards direct access to toolkit objects. The render task holds it while
//! draining and painting; any other context that wants to poke the toolkit
//! without going through the command queue must hold it as well.
//!
//! The lock has no notion of "current task", so every caller identifies
//! itself with an [`Owner`]. The same owner may nest acquisitions; each
//! acquisition is released by dropping its [`LockGuard`] or by one call to
//! [`CrossTaskLock::unlock`].

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embedded_hal_async::delay::DelayNs;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Polling interval while waiting for the lock
const POLL_INTERVAL_MS: u32 = 1;

/// Identity of a lock holder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Owner(u16);

impl Owner {
    /// The render task
    pub const RENDER: Owner = Owner(0);

    pub const fn new(id: u16) -> Self {
        Owner(id)
    }

    pub const fn id(&self) -> u16 {
        self.0
    }
}

/// How long to wait for the lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Timeout {
    /// Wait until the lock is free
    #[default]
    Forever,
    /// Give up after this many milliseconds
    Millis(u32),
}

/// Lock misuse errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LockError {
    /// Release by an owner that does not hold the lock
    NotOwner,
}

#[derive(Clone, Copy)]
struct LockState {
    owner: Option<Owner>,
    depth: u32,
}

/// Reentrant mutual exclusion between tasks and interrupt handlers
pub struct CrossTaskLock {
    state: Mutex<CriticalSectionRawMutex, Cell<LockState>>,
}

impl Default for CrossTaskLock {
    fn default() -> Self {
        Self::new()
    }
}

impl CrossTaskLock {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(Cell::new(LockState {
                owner: None,
                depth: 0,
            })),
        }
    }

    /// Take one level of the lock if it is free or already held by `owner`
    ///
    /// Never waits, so it is the only form usable from interrupt context.
    pub fn try_acquire(&self, owner: Owner) -> bool {
        self.state.lock(|cell| {
            let mut state = cell.get();
            match state.owner {
                None => {
                    state.owner = Some(owner);
                    state.depth = 1;
                }
                Some(current) if current == owner => {
                    state.depth += 1;
                }
                Some(_) => return false,
            }
            cell.set(state);
            true
        })
    }

    /// Take one level of the lock, waiting up to `timeout`
    ///
    /// Returns `false` when a finite timeout expires; the caller must then
    /// treat toolkit state as untouched.
    pub async fn acquire<D: DelayNs>(&self, owner: Owner, timeout: Timeout, delay: &mut D) -> bool {
        let mut waited_ms: u32 = 0;
        loop {
            if self.try_acquire(owner) {
                return true;
            }
            if let Timeout::Millis(limit) = timeout {
                if waited_ms >= limit {
                    debug!("Lock wait by {} timed out after {} ms", owner.id(), waited_ms);
                    return false;
                }
            }
            delay.delay_ms(POLL_INTERVAL_MS).await;
            waited_ms = waited_ms.saturating_add(POLL_INTERVAL_MS);
        }
    }

    /// Release one level of the lock
    pub fn unlock(&self, owner: Owner) -> Result<(), LockError> {
        self.state.lock(|cell| {
            let mut state = cell.get();
            if state.owner != Some(owner) {
                return Err(LockError::NotOwner);
            }
            state.depth -= 1;
            if state.depth == 0 {
                state.owner = None;
            }
            cell.set(state);
            Ok(())
        })
    }

    /// Guarded form of [`try_acquire`](Self::try_acquire)
    pub fn try_lock(&self, owner: Owner) -> Option<LockGuard<'_>> {
        self.try_acquire(owner)
            .then(|| LockGuard { lock: self, owner })
    }

    /// Guarded form of [`acquire`](Self::acquire)
    pub async fn lock<D: DelayNs>(
        &self,
        owner: Owner,
        timeout: Timeout,
        delay: &mut D,
    ) -> Option<LockGuard<'_>> {
        if self.acquire(owner, timeout, delay).await {
            Some(LockGuard { lock: self, owner })
        } else {
            None
        }
    }

    /// Current holder
    pub fn owner(&self) -> Option<Owner> {
        self.state.lock(|cell| cell.get().owner)
    }

    /// Nesting depth of the current holder, 0 when free
    pub fn depth(&self) -> u32 {
        self.state.lock(|cell| cell.get().depth)
    }

    pub fn is_locked(&self) -> bool {
        self.owner().is_some()
    }
}

/// One held level of a [`CrossTaskLock`], released on drop
pub struct LockGuard<'a> {
    lock: &'a CrossTaskLock,
    owner: Owner,
}

impl LockGuard<'_> {
    pub fn owner(&self) -> Owner {
        self.owner
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        // A guard always holds a level, so this cannot fail
        let _ = self.lock.unlock(self.owner);
    }
}
