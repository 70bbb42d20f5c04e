//! Region flushing with tearing avoidance

use embedded_hal_async::delay::DelayNs;

use super::buffers::ROTATION_LEN;
use crate::bridge::Bridge;
use crate::config::{PortConfig, TearingMode};
use crate::traits::{BufferId, FlushRequest, FrameBuffers, Panel, PanelError};

/// What a flush did with its region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlushOutcome {
    /// Intermediate region, presented together with the last one
    Deferred,
    /// Frame already on screen, nothing to present
    Skipped,
    /// Handed to the panel without waiting
    Submitted,
    /// Handed to the panel and scan-out completion observed
    Synchronized,
}

/// Flush failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlushError {
    /// Panel rejected the region; the frame is lost but the link is alive
    Panel(PanelError),
    /// No VSync within the configured limit
    VsyncTimeout,
}

impl FlushError {
    /// The display link can no longer be trusted
    pub fn is_fatal(&self) -> bool {
        matches!(self, FlushError::VsyncTimeout)
    }
}

impl From<PanelError> for FlushError {
    fn from(e: PanelError) -> Self {
        FlushError::Panel(e)
    }
}

/// Moves painted regions to the panel without overwriting scan-out
pub struct Flusher<'a, P: Panel> {
    bridge: &'a Bridge,
    panel: P,
    /// Every region ends its refresh (full refresh mode)
    every_flush_is_last: bool,
    tearing: TearingMode,
    vsync_timeout_ms: u32,
    buffers: FrameBuffers,
    /// Buffer on screen in double-buffered mode, as an index into `buffers`
    front: usize,
}

impl<'a, P: Panel> Flusher<'a, P> {
    /// Acquire the frame buffers the tearing mode needs
    pub fn new(bridge: &'a Bridge, mut panel: P, config: &PortConfig) -> Result<Self, PanelError> {
        let count = config.tearing.buffer_count();
        let buffers = panel.acquire_frame_buffers(count)?;
        if buffers.len() != count {
            error!(
                "Panel returned {} frame buffers, {} required",
                buffers.len(),
                count
            );
            return Err(PanelError::OutOfMemory);
        }

        if config.tearing == TearingMode::TripleBuffered {
            bridge.rotation().reset();
        }
        bridge.vsync().reset();

        debug!("Flusher ready with {} frame buffers", count);

        Ok(Self {
            bridge,
            panel,
            every_flush_is_last: config.every_flush_is_last(),
            tearing: config.tearing,
            vsync_timeout_ms: config.vsync_timeout_ms,
            buffers,
            front: 0,
        })
    }

    /// Buffer the toolkit may draw into now
    pub fn draw_target(&self) -> BufferId {
        let index = match self.tearing {
            TearingMode::Off => 0,
            TearingMode::DoubleBuffered => (self.front + 1) % self.buffers.len(),
            TearingMode::TripleBuffered => self.bridge.rotation().draw_target() as usize,
        };
        self.buffers[index]
    }

    /// Send one region to the panel
    ///
    /// In double-buffered mode only the last region of a refresh switches
    /// buffers, and that flush does not return before the panel reports
    /// VSync. Full refresh treats every region as the last one.
    pub async fn flush<D: DelayNs>(
        &mut self,
        request: FlushRequest,
        is_last: bool,
        delay: &mut D,
    ) -> Result<FlushOutcome, FlushError> {
        let is_last = is_last || self.every_flush_is_last;

        match self.tearing {
            TearingMode::Off => {
                self.panel.submit_region(request.buffer, request.area)?;
                Ok(FlushOutcome::Submitted)
            }
            TearingMode::DoubleBuffered => {
                if !is_last {
                    return Ok(FlushOutcome::Deferred);
                }
                let index = self.index_of(request.buffer)?;

                // Reset before submitting so a fast completion is not lost
                let vsync = self.bridge.vsync();
                vsync.reset();
                self.panel.submit_region(request.buffer, request.area)?;

                if !vsync.wait_timeout(self.vsync_timeout_ms, delay).await {
                    error!("No VSync within {} ms", self.vsync_timeout_ms);
                    return Err(FlushError::VsyncTimeout);
                }
                self.front = index;
                Ok(FlushOutcome::Synchronized)
            }
            TearingMode::TripleBuffered => {
                let index = self.index_of(request.buffer)?;
                if !is_last {
                    return Ok(FlushOutcome::Deferred);
                }
                if !self.bridge.rotation().queue(index as u8) {
                    return Ok(FlushOutcome::Skipped);
                }
                self.panel.submit_region(request.buffer, request.area)?;
                Ok(FlushOutcome::Submitted)
            }
        }
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }

    fn index_of(&self, buffer: BufferId) -> Result<usize, PanelError> {
        self.buffers
            .iter()
            .position(|&b| b == buffer)
            .ok_or(PanelError::UnknownBuffer)
    }
}

const _: () = assert!(ROTATION_LEN as usize == TearingMode::TripleBuffered.buffer_count());
