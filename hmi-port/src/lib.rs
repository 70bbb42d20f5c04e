//! Display port core for small HMI front ends
//!
//! This crate contains the board-agnostic half of an RGB display front end:
//!
//! - Typed UI mutation commands and the bounded queue that carries them
//! - The renderer state store owned by the render task
//! - A reentrant cross-task lock guarding direct toolkit access
//! - The flush/VSync handshake and frame buffer rotation
//! - The adaptive render loop tying everything together
//! - A virtual millisecond clock fed by a periodic tick source
//!
//! # Architecture
//!
//! ```text
//!  producers (any task / ISR)
//!        │  Bridge::set_status_item(..), append_log(..), ...
//!        ▼
//!  ┌──────────────┐   drain    ┌───────────────┐  paint   ┌─────────┐
//!  │ CommandQueue │ ─────────▶ │ RendererState │ ───────▶ │ Toolkit │
//!  └──────────────┘            └───────────────┘          └────┬────┘
//!                                                               │ flush
//!                                  notify_vsync()  ┌─────────┐  ▼
//!  panel completion (ISR) ───────────────────────▶ │ Flusher │ ──▶ Panel
//!                                                  └─────────┘
//! ```
//!
//! The [`Bridge`] is the single context object shared by every producer,
//! the tick source, the VSync interrupt and the render task. Everything
//! behind it is either lock-free or guarded by critical sections, so it can
//! live in a `static` and be touched from interrupt context.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// This must go first so the macros are visible to every other module.
mod fmt;

pub mod bridge;
pub mod clock;
pub mod command;
pub mod config;
pub mod flush;
pub mod lock;
pub mod queue;
pub mod render;
pub mod state;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

// Re-export key types at crate root for convenience
pub use bridge::Bridge;
pub use clock::VirtualClock;
pub use command::{color_hex, ButtonCallback, Color, Command, CommandKind};
pub use config::{ConfigError, PortConfig, RefreshMode, TearingMode};
pub use flush::{FlushError, FlushOutcome, Flusher, VsyncHandshake};
pub use lock::{CrossTaskLock, LockError, LockGuard, Owner, Timeout};
pub use queue::{CommandQueue, QUEUE_CAPACITY};
pub use render::{InitError, RenderError, RenderLoop, RenderState};
pub use state::{LogRing, RendererState};
pub use traits::{
    BufferId, FlushRequest, NoTouch, Paint, PaintContext, Panel, PanelError, Toolkit, TouchInput,
    TouchSample, Widgets,
};
