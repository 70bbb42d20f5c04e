//! Flush/VSync handshake
//!
//! Keeps the renderer from drawing into a frame buffer the panel is still
//! scanning out.
//!
//! # Double buffering
//!
//! ```text
//!  render task                         panel / ISR
//!  ───────────                         ───────────
//!  paint into back buffer
//!  last region: reset VSync
//!  submit_region(back) ───────────────▶ switch scan-out pointer
//!  wait VSync ...                       ... frame ends
//!             ◀──────────────────────── notify_vsync()
//!  old front is now free, swap roles
//! ```
//!
//! Intermediate regions of a multi-region refresh share the same buffer
//! generation and are not submitted; only the last region performs the
//! switch and the wait.
//!
//! # Triple buffering
//!
//! In full-refresh mode with three buffers a free buffer always exists, so
//! no wait is needed. The render task records the finished buffer as
//! pending and presents it only if it differs from the one already shown;
//! the VSync interrupt promotes pending to shown.

pub mod buffers;
pub mod flusher;
pub mod vsync;

pub use buffers::TripleBuffer;
pub use flusher::{FlushError, FlushOutcome, Flusher};
pub use vsync::VsyncHandshake;
