//! Display panel trait

use embedded_graphics::primitives::Rectangle;
use heapless::Vec;

/// Upper bound on frame buffers a panel hands out
pub const MAX_FRAME_BUFFERS: usize = 3;

/// Opaque handle to one panel-owned frame buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BufferId(pub u8);

/// Frame buffers returned by [`Panel::acquire_frame_buffers`]
pub type FrameBuffers = Vec<BufferId, MAX_FRAME_BUFFERS>;

/// Errors reported by the panel driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelError {
    /// Could not allocate the requested frame buffers
    OutOfMemory,
    /// Area lies outside the panel
    InvalidArea,
    /// Buffer handle was not issued by this panel
    UnknownBuffer,
    /// Bus or DMA failure
    Bus,
}

/// RGB panel driver
///
/// Pixel memory belongs to the panel; the port only moves buffer handles
/// around. Completion of a submitted transfer is reported asynchronously
/// through [`crate::Bridge::notify_vsync`].
pub trait Panel {
    /// Allocate `count` equally sized frame buffers
    ///
    /// The first buffer returned is the one the panel scans out at start.
    fn acquire_frame_buffers(&mut self, count: usize) -> Result<FrameBuffers, PanelError>;

    /// Start transferring `area` of `buffer` to the glass
    ///
    /// Must not block; for RGB panels this switches the scan-out pointer.
    fn submit_region(&mut self, buffer: BufferId, area: Rectangle) -> Result<(), PanelError>;
}
