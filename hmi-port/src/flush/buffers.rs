//! Triple-buffer rotation

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

/// Number of buffers in the rotation
pub const ROTATION_LEN: u8 = 3;

#[derive(Clone, Copy)]
struct Rotation {
    /// Last buffer the render task finished
    pending: u8,
    /// Buffer the panel is scanning out
    shown: u8,
}

/// Pending/shown bookkeeping shared by the render task and the VSync ISR
///
/// Indices refer to the panel's buffer list in acquisition order. Buffer 0
/// is shown at start.
pub struct TripleBuffer {
    state: Mutex<CriticalSectionRawMutex, Cell<Rotation>>,
}

impl Default for TripleBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TripleBuffer {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(Cell::new(Rotation {
                pending: 0,
                shown: 0,
            })),
        }
    }

    /// Back to the power-on state
    pub fn reset(&self) {
        self.state.lock(|cell| cell.set(Rotation { pending: 0, shown: 0 }));
    }

    /// Record `index` as the newest finished frame
    ///
    /// Returns `true` if it differs from the frame on screen and has to be
    /// presented.
    pub fn queue(&self, index: u8) -> bool {
        self.state.lock(|cell| {
            let mut rotation = cell.get();
            rotation.pending = index;
            cell.set(rotation);
            rotation.pending != rotation.shown
        })
    }

    /// Promote the pending frame to shown; called from the VSync ISR
    ///
    /// Returns `true` if the shown frame changed.
    pub fn on_vsync(&self) -> bool {
        self.state.lock(|cell| {
            let mut rotation = cell.get();
            if rotation.pending == rotation.shown {
                return false;
            }
            rotation.shown = rotation.pending;
            cell.set(rotation);
            true
        })
    }

    /// Buffer that is neither on screen nor waiting to go there
    pub fn draw_target(&self) -> u8 {
        self.state.lock(|cell| {
            let Rotation { pending, shown } = cell.get();
            (0..ROTATION_LEN)
                .find(|&i| i != pending && i != shown)
                .unwrap_or((shown + 1) % ROTATION_LEN)
        })
    }

    pub fn pending(&self) -> u8 {
        self.state.lock(|cell| cell.get().pending)
    }

    pub fn shown(&self) -> u8 {
        self.state.lock(|cell| cell.get().shown)
    }
}
