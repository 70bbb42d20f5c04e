//! GUI toolkit traits
//!
//! The toolkit owns widget objects and pixels. The port only tells it what
//! the widgets should show and runs its timer/paint dispatch.

use embedded_graphics::primitives::Rectangle;
use heapless::Vec;

use super::panel::BufferId;
use super::touch::TouchSample;
use crate::command::Color;
use crate::state::LogRing;

/// Maximum dirty regions flushed per paint pass
pub const MAX_FLUSH_REGIONS: usize = 16;

/// Widget-level surface of the toolkit
///
/// Only ever called from the render task while it holds the cross-task lock.
pub trait Widgets {
    /// Replace the top banner text
    fn set_top_text(&mut self, text: &str);

    /// Show a status slot; empty key and value blank the slot
    fn set_status(&mut self, index: usize, key: &str, value: &str, color: Color);

    /// Replace a button label
    fn set_button_label(&mut self, index: usize, label: &str);

    /// Re-render the log view from the ring, oldest line first
    fn show_log(&mut self, log: &LogRing);

    /// Replace the bottom banner text
    fn set_bottom_text(&mut self, text: &str);
}

/// Inputs to one timer/paint pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaintContext {
    /// Virtual clock reading
    pub now_ms: u32,
    /// Touch reading, `None` without a touch device
    pub touch: Option<TouchSample>,
    /// Buffer the toolkit may draw into this pass
    pub target: BufferId,
}

/// One dirty region ready to be sent to the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushRequest {
    pub buffer: BufferId,
    pub area: Rectangle,
}

/// Result of one timer/paint pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paint {
    /// Suggested delay until the next pass
    pub next_delay_ms: u32,
    /// Regions rendered this pass, in flush order
    pub flushes: Vec<FlushRequest, MAX_FLUSH_REGIONS>,
    /// Button released over during this pass
    pub clicked: Option<usize>,
}

impl Paint {
    /// A pass that rendered nothing
    pub fn idle(next_delay_ms: u32) -> Self {
        Self {
            next_delay_ms,
            flushes: Vec::new(),
            clicked: None,
        }
    }
}

/// GUI toolkit driven by the render loop
pub trait Toolkit: Widgets {
    /// Run timers, process input and repaint dirty areas
    ///
    /// Returns the regions that need flushing and the suggested delay before
    /// the next call.
    fn timer_handler(&mut self, ctx: PaintContext) -> Paint;
}
