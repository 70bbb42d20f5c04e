//! Collaborator traits
//!
//! These traits define the interface between the port and the pieces it
//! drives but does not implement: the display panel, the touch controller
//! and the GUI toolkit.

pub mod panel;
pub mod toolkit;
pub mod touch;

pub use panel::{BufferId, FrameBuffers, Panel, PanelError, MAX_FRAME_BUFFERS};
pub use toolkit::{FlushRequest, Paint, PaintContext, Toolkit, Widgets, MAX_FLUSH_REGIONS};
pub use touch::{NoTouch, TouchInput, TouchSample};
