//! Port configuration
//!
//! Compile-time defaults match a 800x480 RGB panel refreshed in partial mode
//! with double-buffered tearing avoidance.

use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::clock::TICK_PERIOD_MS;
use crate::lock::Timeout;

/// Default lower bound on the render loop sleep
pub const MIN_DELAY_MS: u32 = 1;

/// Default upper bound on the render loop sleep
pub const MAX_DELAY_MS: u32 = 500;

/// Default limit on a single VSync wait
pub const VSYNC_TIMEOUT_MS: u32 = 1000;

/// How much of the screen the toolkit repaints per pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RefreshMode {
    /// Only dirty regions, into a separate draw buffer
    #[default]
    Partial,
    /// Only dirty regions, directly into the frame buffer
    Direct,
    /// The whole screen every pass
    Full,
}

/// Frame buffer strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TearingMode {
    /// Single buffer, no handshake
    Off,
    /// Two buffers, wait for VSync after the last region
    #[default]
    DoubleBuffered,
    /// Three buffers rotated without waiting; full refresh only
    TripleBuffered,
}

impl TearingMode {
    /// Frame buffers the panel must hand out
    pub const fn buffer_count(self) -> usize {
        match self {
            TearingMode::Off => 1,
            TearingMode::DoubleBuffered => 2,
            TearingMode::TripleBuffered => 3,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// `min_delay_ms` is zero
    ZeroMinDelay,
    /// `min_delay_ms` exceeds `max_delay_ms`
    DelayBoundsInverted,
    /// `tick_period_ms` is zero
    ZeroTickPeriod,
    /// Horizontal or vertical resolution is zero
    ZeroResolution,
    /// Triple buffering requested outside full refresh mode
    TripleBufferNeedsFullRefresh,
}

/// Render loop and flush settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PortConfig {
    pub refresh_mode: RefreshMode,
    pub tearing: TearingMode,
    /// Shortest sleep between cycles
    pub min_delay_ms: u32,
    /// Longest sleep between cycles
    pub max_delay_ms: u32,
    /// Virtual clock tick period
    pub tick_period_ms: u32,
    /// How long the render loop waits for the cross-task lock
    pub lock_timeout: Timeout,
    /// Expiry of the VSync wait, treated as a hardware fault
    pub vsync_timeout_ms: u32,
    pub horizontal_res: u32,
    pub vertical_res: u32,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self::default_const()
    }
}

impl PortConfig {
    /// Defaults, usable in `const` and `static` items
    pub const fn default_const() -> Self {
        Self {
            refresh_mode: RefreshMode::Partial,
            tearing: TearingMode::DoubleBuffered,
            min_delay_ms: MIN_DELAY_MS,
            max_delay_ms: MAX_DELAY_MS,
            tick_period_ms: TICK_PERIOD_MS,
            lock_timeout: Timeout::Forever,
            vsync_timeout_ms: VSYNC_TIMEOUT_MS,
            horizontal_res: 800,
            vertical_res: 480,
        }
    }

    /// Check the invariants the render loop relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_delay_ms == 0 {
            return Err(ConfigError::ZeroMinDelay);
        }
        if self.min_delay_ms > self.max_delay_ms {
            return Err(ConfigError::DelayBoundsInverted);
        }
        if self.tick_period_ms == 0 {
            return Err(ConfigError::ZeroTickPeriod);
        }
        if self.horizontal_res == 0 || self.vertical_res == 0 {
            return Err(ConfigError::ZeroResolution);
        }
        if self.tearing == TearingMode::TripleBuffered && self.refresh_mode != RefreshMode::Full {
            return Err(ConfigError::TripleBufferNeedsFullRefresh);
        }
        Ok(())
    }

    /// Every flush counts as the last region of its refresh
    pub fn every_flush_is_last(&self) -> bool {
        self.refresh_mode == RefreshMode::Full
    }

    /// The whole panel
    pub fn full_area(&self) -> Rectangle {
        Rectangle::new(
            Point::zero(),
            Size::new(self.horizontal_res, self.vertical_res),
        )
    }
}
