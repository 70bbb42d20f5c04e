//! Renderer state store
//!
//! Data owned exclusively by the render task: banner texts, status slots,
//! button descriptors and the log ring. Producers never touch it directly;
//! every change arrives as a [`crate::Command`].

pub mod log;
pub mod store;

pub use log::{LogRing, LOG_CAPACITY};
pub use store::{ButtonSlot, RendererState, StatusSlot, BANNER_LEN};
