//! Host test doubles

use std::collections::VecDeque;
use std::string::String;
use std::time::{Duration, Instant};
use std::vec::Vec;

use core::future::poll_fn;
use core::task::Poll;

use embedded_graphics::primitives::Rectangle;
use embedded_hal_async::delay::DelayNs;

use crate::command::{Color, BUTTON_SLOTS, STATUS_SLOTS};
use crate::state::LogRing;
use crate::traits::{
    BufferId, FrameBuffers, Paint, PaintContext, Panel, PanelError, Toolkit, TouchInput,
    TouchSample, Widgets,
};

/// Delay that completes after a single yield and records requested time
#[derive(Debug, Default)]
pub struct InstantDelay {
    total_ns: u64,
    calls: usize,
}

impl InstantDelay {
    /// Requested delay summed over every call, in milliseconds
    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }

    pub fn calls(&self) -> usize {
        self.calls
    }

    async fn record(&mut self, ns: u64) {
        self.total_ns += ns;
        self.calls += 1;
        embassy_futures::yield_now().await;
    }
}

impl DelayNs for InstantDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.record(ns as u64).await;
    }

    async fn delay_us(&mut self, us: u32) {
        self.record(us as u64 * 1_000).await;
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.record(ms as u64 * 1_000_000).await;
    }
}

/// Wall-clock delay that spins the executor instead of blocking the thread
#[derive(Debug, Default, Clone, Copy)]
pub struct HostDelay;

impl DelayNs for HostDelay {
    async fn delay_ns(&mut self, ns: u32) {
        let deadline = Instant::now() + Duration::from_nanos(ns as u64);
        poll_fn(|cx| {
            if Instant::now() >= deadline {
                Poll::Ready(())
            } else {
                std::thread::yield_now();
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        })
        .await
    }

    async fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.delay_ns(1_000_000).await;
        }
    }
}

/// Widgets that remember what they were last told to show
#[derive(Debug, Default)]
pub struct RecordingWidgets {
    pub top: String,
    pub bottom: String,
    pub buttons: [String; BUTTON_SLOTS],
    pub status: [(String, String, Color); STATUS_SLOTS],
    pub log: Vec<String>,
    /// Number of widget calls of any kind
    pub calls: usize,
}

impl Widgets for RecordingWidgets {
    fn set_top_text(&mut self, text: &str) {
        self.calls += 1;
        self.top = text.into();
    }

    fn set_status(&mut self, index: usize, key: &str, value: &str, color: Color) {
        self.calls += 1;
        self.status[index] = (key.into(), value.into(), color);
    }

    fn set_button_label(&mut self, index: usize, label: &str) {
        self.calls += 1;
        self.buttons[index] = label.into();
    }

    fn show_log(&mut self, log: &LogRing) {
        self.calls += 1;
        self.log = log.iter().map(String::from).collect();
    }

    fn set_bottom_text(&mut self, text: &str) {
        self.calls += 1;
        self.bottom = text.into();
    }
}

/// Toolkit replaying scripted paint results
#[derive(Debug, Default)]
pub struct ScriptedToolkit {
    pub widgets: RecordingWidgets,
    /// Results handed out in order; idle passes once exhausted
    pub script: VecDeque<Paint>,
    /// Delay suggested by idle passes
    pub idle_delay_ms: u32,
    /// Every context the toolkit was painted with
    pub contexts: Vec<PaintContext>,
}

impl ScriptedToolkit {
    pub fn new(idle_delay_ms: u32) -> Self {
        Self {
            idle_delay_ms,
            ..Default::default()
        }
    }

    pub fn push(&mut self, paint: Paint) {
        self.script.push_back(paint);
    }
}

impl Widgets for ScriptedToolkit {
    fn set_top_text(&mut self, text: &str) {
        self.widgets.set_top_text(text)
    }

    fn set_status(&mut self, index: usize, key: &str, value: &str, color: Color) {
        self.widgets.set_status(index, key, value, color)
    }

    fn set_button_label(&mut self, index: usize, label: &str) {
        self.widgets.set_button_label(index, label)
    }

    fn show_log(&mut self, log: &LogRing) {
        self.widgets.show_log(log)
    }

    fn set_bottom_text(&mut self, text: &str) {
        self.widgets.set_bottom_text(text)
    }
}

impl Toolkit for ScriptedToolkit {
    fn timer_handler(&mut self, ctx: PaintContext) -> Paint {
        self.contexts.push(ctx);
        self.script
            .pop_front()
            .unwrap_or_else(|| Paint::idle(self.idle_delay_ms))
    }
}

/// Panel recording every submitted region
#[derive(Debug, Default)]
pub struct MockPanel {
    pub submitted: Vec<(BufferId, Rectangle)>,
    pub fail_acquire: bool,
    pub fail_submit: bool,
    /// Hand out this many fewer buffers than requested
    pub short_by: usize,
}

impl MockPanel {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Panel for MockPanel {
    fn acquire_frame_buffers(&mut self, count: usize) -> Result<FrameBuffers, PanelError> {
        if self.fail_acquire {
            return Err(PanelError::OutOfMemory);
        }
        let mut buffers = FrameBuffers::new();
        for id in 0..count.saturating_sub(self.short_by) {
            buffers
                .push(BufferId(id as u8))
                .map_err(|_| PanelError::OutOfMemory)?;
        }
        Ok(buffers)
    }

    fn submit_region(&mut self, buffer: BufferId, area: Rectangle) -> Result<(), PanelError> {
        if self.fail_submit {
            return Err(PanelError::Bus);
        }
        self.submitted.push((buffer, area));
        Ok(())
    }
}

/// Touch controller replaying scripted samples, then reporting release
#[derive(Debug, Default)]
pub struct ScriptedTouch {
    pub samples: VecDeque<TouchSample>,
}

impl ScriptedTouch {
    pub fn new(samples: impl IntoIterator<Item = TouchSample>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
        }
    }
}

impl TouchInput for ScriptedTouch {
    fn read(&mut self) -> TouchSample {
        self.samples.pop_front().unwrap_or_else(TouchSample::released)
    }
}
