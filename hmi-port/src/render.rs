//! Render loop
//!
//! The single task that owns the toolkit and the renderer state store.
//! Each cycle walks `Idle → Draining → Painting → Sleeping → Idle`:
//!
//! - **Draining**: take the cross-task lock and apply every queued command
//! - **Painting**: still under the lock, poll touch, run the toolkit's
//!   timer/paint pass and flush the regions it produced
//! - **Sleeping**: release the lock and sleep for the toolkit's suggested
//!   delay, clamped to the configured bounds
//!
//! If the lock cannot be taken within the configured timeout the cycle skips
//! straight to sleeping; queued commands stay queued for the next cycle.

use core::convert::Infallible;

use embedded_hal_async::delay::DelayNs;

use crate::bridge::Bridge;
use crate::config::{ConfigError, PortConfig};
use crate::flush::{FlushError, Flusher};
use crate::lock::Owner;
use crate::state::RendererState;
use crate::traits::{PaintContext, Panel, PanelError, Toolkit, TouchInput};

/// Render loop position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderState {
    #[default]
    Idle,
    Draining,
    Painting,
    Sleeping,
}

/// Startup failures; the render loop never starts after one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError {
    InvalidConfig(ConfigError),
    /// Panel could not provide the frame buffers
    FrameBuffers(PanelError),
}

impl From<ConfigError> for InitError {
    fn from(e: ConfigError) -> Self {
        InitError::InvalidConfig(e)
    }
}

/// Failures that stop the render loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderError {
    Flush(FlushError),
}

impl From<FlushError> for RenderError {
    fn from(e: FlushError) -> Self {
        RenderError::Flush(e)
    }
}

/// Clamp a suggested sleep into `[min_ms, max_ms]`
pub fn clamp_delay(suggested_ms: u32, min_ms: u32, max_ms: u32) -> u32 {
    suggested_ms.max(min_ms).min(max_ms)
}

/// Owner of the toolkit and renderer state
pub struct RenderLoop<'a, T: Toolkit, P: Panel, I: TouchInput> {
    bridge: &'a Bridge,
    config: PortConfig,
    toolkit: T,
    touch: Option<I>,
    flusher: Flusher<'a, P>,
    store: RendererState,
    state: RenderState,
}

impl<'a, T: Toolkit, P: Panel, I: TouchInput> RenderLoop<'a, T, P, I> {
    /// Validate the config, acquire frame buffers and show the placeholders
    ///
    /// A touch device is optional; pass `None::<NoTouch>` without one.
    pub fn new(
        bridge: &'a Bridge,
        config: PortConfig,
        mut toolkit: T,
        panel: P,
        touch: Option<I>,
    ) -> Result<Self, InitError> {
        if let Err(e) = config.validate() {
            error!("Invalid port config: {:?}", e);
            return Err(e.into());
        }

        let flusher = match Flusher::new(bridge, panel, &config) {
            Ok(flusher) => flusher,
            Err(e) => {
                error!("Frame buffer allocation failed: {:?}", e);
                return Err(InitError::FrameBuffers(e));
            }
        };

        let store = RendererState::new();
        store.refresh_all(&mut toolkit);

        if touch.is_none() {
            info!("No touch input registered");
        }
        info!(
            "Render loop ready: {}x{}, delay {}..{} ms",
            config.horizontal_res,
            config.vertical_res,
            config.min_delay_ms,
            config.max_delay_ms
        );

        Ok(Self {
            bridge,
            config,
            toolkit,
            touch,
            flusher,
            store,
            state: RenderState::Idle,
        })
    }

    /// Run one full cycle including the sleep
    ///
    /// Returns the delay slept. Only a fatal flush error ends the cycle early.
    pub async fn cycle<D: DelayNs>(&mut self, delay: &mut D) -> Result<u32, RenderError> {
        let bridge = self.bridge;

        let suggested = match bridge
            .lock(Owner::RENDER, self.config.lock_timeout, delay)
            .await
        {
            Some(guard) => {
                self.state = RenderState::Draining;
                let applied = bridge
                    .queue()
                    .drain(|command| self.store.apply(command, &mut self.toolkit));
                if applied > 0 {
                    trace!("Applied {} commands", applied);
                }

                self.state = RenderState::Painting;
                let painted = self.paint(delay).await;
                drop(guard);
                painted?
            }
            None => {
                debug!("UI lock busy, skipping paint");
                self.config.min_delay_ms
            }
        };

        self.state = RenderState::Sleeping;
        let sleep_ms = clamp_delay(
            suggested,
            self.config.min_delay_ms,
            self.config.max_delay_ms,
        );
        delay.delay_ms(sleep_ms).await;

        self.state = RenderState::Idle;
        Ok(sleep_ms)
    }

    /// Cycle forever; returns only on a fatal flush error
    pub async fn run<D: DelayNs>(&mut self, delay: &mut D) -> Result<Infallible, RenderError> {
        info!("Render loop started");
        loop {
            if let Err(e) = self.cycle(delay).await {
                error!("Render loop stopped: {:?}", e);
                return Err(e);
            }
        }
    }

    async fn paint<D: DelayNs>(&mut self, delay: &mut D) -> Result<u32, RenderError> {
        let touch = self.touch.as_mut().map(|t| t.read());
        if let Some(sample) = touch.filter(|s| s.pressed) {
            trace!("Touch at ({}, {})", sample.point.x, sample.point.y);
        }

        let ctx = PaintContext {
            now_ms: self.bridge.now_ms(),
            touch,
            target: self.flusher.draw_target(),
        };
        let paint = self.toolkit.timer_handler(ctx);

        let count = paint.flushes.len();
        for (i, request) in paint.flushes.iter().enumerate() {
            match self.flusher.flush(*request, i + 1 == count, delay).await {
                Ok(_) => {}
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => warn!("Flush failed: {:?}", e),
            }
        }

        if let Some(index) = paint.clicked {
            if !self.store.press_button(index, self.bridge) {
                debug!("Button {} has no handler", index);
            }
        }

        Ok(paint.next_delay_ms)
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub fn store(&self) -> &RendererState {
        &self.store
    }

    pub fn toolkit(&self) -> &T {
        &self.toolkit
    }

    pub fn panel(&self) -> &P {
        self.flusher.panel()
    }

    pub fn config(&self) -> &PortConfig {
        &self.config
    }
}
