//! Virtual RGB panel
//!
//! Frame buffers are plain handles; a scan-out thread plays the role of the
//! LCD controller and raises VSync at a fixed period.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;

use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;
use hmi_port::traits::{FrameBuffers, MAX_FRAME_BUFFERS};
use hmi_port::{BufferId, Panel, PanelError};

/// State shared between the panel driver and the scan-out thread
#[derive(Debug, Default)]
pub struct ScanOut {
    /// Buffer the controller reads from
    front: AtomicU8,
    /// Frames scanned since start
    frames: AtomicU32,
    /// Regions submitted since start
    submits: AtomicU32,
}

impl ScanOut {
    /// Finish one frame; the caller raises VSync afterwards
    pub fn scan_frame(&self) -> u32 {
        self.frames.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn front(&self) -> BufferId {
        BufferId(self.front.load(Ordering::Acquire))
    }

    pub fn frames(&self) -> u32 {
        self.frames.load(Ordering::Relaxed)
    }

    pub fn submits(&self) -> u32 {
        self.submits.load(Ordering::Relaxed)
    }
}

pub struct SimPanel {
    bounds: Rectangle,
    allocated: usize,
    scanout: Arc<ScanOut>,
}

impl SimPanel {
    pub fn new(width: u32, height: u32) -> (Self, Arc<ScanOut>) {
        let scanout = Arc::new(ScanOut::default());
        let panel = Self {
            bounds: Rectangle::new(Point::zero(), Size::new(width, height)),
            allocated: 0,
            scanout: scanout.clone(),
        };
        (panel, scanout)
    }
}

impl Panel for SimPanel {
    fn acquire_frame_buffers(&mut self, count: usize) -> Result<FrameBuffers, PanelError> {
        if count == 0 || self.allocated + count > MAX_FRAME_BUFFERS {
            return Err(PanelError::OutOfMemory);
        }
        let mut buffers = FrameBuffers::new();
        for id in self.allocated..self.allocated + count {
            buffers
                .push(BufferId(id as u8))
                .map_err(|_| PanelError::OutOfMemory)?;
        }
        self.allocated += count;
        log::debug!(
            "Allocated {} frame buffers of {}x{}",
            count,
            self.bounds.size.width,
            self.bounds.size.height
        );
        Ok(buffers)
    }

    fn submit_region(&mut self, buffer: BufferId, area: Rectangle) -> Result<(), PanelError> {
        if buffer.0 as usize >= self.allocated {
            return Err(PanelError::UnknownBuffer);
        }
        if area.size.width == 0
            || area.size.height == 0
            || self.bounds.intersection(&area) != area
        {
            return Err(PanelError::InvalidArea);
        }

        self.scanout.front.store(buffer.0, Ordering::Release);
        self.scanout.submits.fetch_add(1, Ordering::Relaxed);
        log::trace!(
            "Buffer {} region ({}, {}) {}x{}",
            buffer.0,
            area.top_left.x,
            area.top_left.y,
            area.size.width,
            area.size.height
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_and_submit() {
        let (mut panel, scanout) = SimPanel::new(800, 480);
        let buffers = panel.acquire_frame_buffers(2).unwrap();
        assert_eq!(buffers.as_slice(), [BufferId(0), BufferId(1)]);

        let area = Rectangle::new(Point::new(0, 0), Size::new(800, 30));
        panel.submit_region(BufferId(1), area).unwrap();
        assert_eq!(scanout.front(), BufferId(1));
        assert_eq!(scanout.submits(), 1);
    }

    #[test]
    fn test_too_many_buffers() {
        let (mut panel, _) = SimPanel::new(800, 480);
        assert_eq!(
            panel.acquire_frame_buffers(4).err(),
            Some(PanelError::OutOfMemory)
        );
        assert!(panel.acquire_frame_buffers(3).is_ok());
        assert!(panel.acquire_frame_buffers(1).is_err());
    }

    #[test]
    fn test_rejects_bad_submits() {
        let (mut panel, _) = SimPanel::new(800, 480);
        panel.acquire_frame_buffers(1).unwrap();

        let inside = Rectangle::new(Point::new(0, 0), Size::new(10, 10));
        assert_eq!(
            panel.submit_region(BufferId(1), inside),
            Err(PanelError::UnknownBuffer)
        );

        let outside = Rectangle::new(Point::new(790, 470), Size::new(20, 20));
        assert_eq!(
            panel.submit_region(BufferId(0), outside),
            Err(PanelError::InvalidArea)
        );
    }

    #[test]
    fn test_scan_frame_counts() {
        let (_, scanout) = SimPanel::new(800, 480);
        scanout.scan_frame();
        assert_eq!(scanout.scan_frame(), 2);
        assert_eq!(scanout.frames(), 2);
    }
}
