//! Text-mode stand-in for the GUI toolkit
//!
//! Lays out the 800x480 dashboard (top banner, status grid, button row, log
//! view, bottom banner), tracks which bands are dirty, hit-tests touches
//! against the buttons and reports dirty bands as flush regions.

use embedded_graphics::pixelcolor::RgbColor;
use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;
use hmi_port::command::{BUTTON_SLOTS, STATUS_SLOTS};
use hmi_port::{Color, FlushRequest, LogRing, Paint, PaintContext, Toolkit, Widgets};

/// Period of the toolkit's refresh timer
pub const REFRESH_PERIOD_MS: u32 = 30;

const TOP_H: u32 = 30;
const STATUS_H: u32 = 80;
const BUTTONS_H: u32 = 80;
const LOG_H: u32 = 230;
const BOTTOM_H: u32 = 40;
const GAP: u32 = 10;

const BUTTON_W: u32 = 180;
const BUTTON_H: u32 = 40;

/// Smallest panel the dashboard layout fits on
pub const MIN_WIDTH: u32 = BUTTON_W * BUTTON_SLOTS as u32;
pub const MIN_HEIGHT: u32 = TOP_H + STATUS_H + GAP + BUTTONS_H + GAP + LOG_H + BOTTOM_H;

/// Horizontal bands of the dashboard, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Band {
    Top,
    Status,
    Buttons,
    Log,
    Bottom,
}

impl Band {
    const ALL: [Band; 5] = [Band::Top, Band::Status, Band::Buttons, Band::Log, Band::Bottom];

    fn bit(self) -> u8 {
        1 << self as u8
    }

    /// Band rectangle, clipped to the screen
    fn area(self, width: u32, height: u32) -> Rectangle {
        let (y, h) = match self {
            Band::Top => (0, TOP_H),
            Band::Status => (TOP_H, STATUS_H),
            Band::Buttons => (TOP_H + STATUS_H + GAP, BUTTONS_H),
            Band::Log => (TOP_H + STATUS_H + GAP + BUTTONS_H + GAP, LOG_H),
            Band::Bottom => (height.saturating_sub(BOTTOM_H), BOTTOM_H),
        };
        let screen = Rectangle::new(Point::zero(), Size::new(width, height));
        Rectangle::new(Point::new(0, y as i32), Size::new(width, h)).intersection(&screen)
    }
}

/// Screen area of button `index`, evenly spaced across the button band
fn button_area(index: usize, width: u32, height: u32) -> Rectangle {
    let band = Band::Buttons.area(width, height);
    let spacing = width.saturating_sub(BUTTON_W * BUTTON_SLOTS as u32) / BUTTON_SLOTS as u32;
    let x = spacing / 2 + index as u32 * (BUTTON_W + spacing);
    let y = band.top_left.y + ((BUTTONS_H - BUTTON_H) / 2) as i32;
    Rectangle::new(Point::new(x as i32, y), Size::new(BUTTON_W, BUTTON_H))
}

fn hex(color: Color) -> String {
    format!("#{:02X}{:02X}{:02X}", color.r(), color.g(), color.b())
}

pub struct SimToolkit {
    width: u32,
    height: u32,
    full_refresh: bool,
    top: String,
    status: [(String, String, Color); STATUS_SLOTS],
    buttons: [String; BUTTON_SLOTS],
    log: Vec<String>,
    bottom: String,
    /// Bitmask of dirty bands
    dirty: u8,
    /// Button under the finger since the last press
    pressed: Option<usize>,
    frames: u32,
}

impl SimToolkit {
    pub fn new(width: u32, height: u32, full_refresh: bool) -> Self {
        Self {
            width,
            height,
            full_refresh,
            top: String::new(),
            status: Default::default(),
            buttons: Default::default(),
            log: Vec::new(),
            bottom: String::new(),
            dirty: 0,
            pressed: None,
            frames: 0,
        }
    }

    fn mark(&mut self, band: Band) {
        self.dirty |= band.bit();
    }

    /// Button containing `point`
    pub fn hit_test(&self, point: Point) -> Option<usize> {
        (0..BUTTON_SLOTS).find(|&i| button_area(i, self.width, self.height).contains(point))
    }

    /// Current screen contents as text rows
    pub fn screen_lines(&self) -> Vec<String> {
        let mut lines = vec![self.top.clone()];
        lines.push(
            self.status
                .iter()
                .map(|(key, value, color)| format!("[{}: {} {}]", key, value, hex(*color)))
                .collect::<Vec<_>>()
                .join(" "),
        );
        lines.push(
            self.buttons
                .iter()
                .enumerate()
                .map(|(i, label)| {
                    if self.pressed == Some(i) {
                        format!("<{}>", label)
                    } else {
                        format!("[{}]", label)
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
        );
        lines.extend(self.log.iter().cloned());
        lines.push(self.bottom.clone());
        lines
    }

    /// Track press/release; a release over the pressed button is a click
    fn handle_touch(&mut self, ctx: &PaintContext) -> Option<usize> {
        let sample = ctx.touch?;
        if sample.pressed {
            if self.pressed.is_none() {
                self.pressed = self.hit_test(sample.point);
                if self.pressed.is_some() {
                    self.mark(Band::Buttons);
                }
            }
            None
        } else {
            let pressed = self.pressed.take()?;
            self.mark(Band::Buttons);
            (self.hit_test(sample.point) == Some(pressed)).then_some(pressed)
        }
    }
}

impl Widgets for SimToolkit {
    fn set_top_text(&mut self, text: &str) {
        self.top = text.into();
        self.mark(Band::Top);
    }

    fn set_status(&mut self, index: usize, key: &str, value: &str, color: Color) {
        if let Some(slot) = self.status.get_mut(index) {
            *slot = (key.into(), value.into(), color);
            self.mark(Band::Status);
        }
    }

    fn set_button_label(&mut self, index: usize, label: &str) {
        if let Some(slot) = self.buttons.get_mut(index) {
            *slot = label.into();
            self.mark(Band::Buttons);
        }
    }

    fn show_log(&mut self, log: &LogRing) {
        self.log = log.iter().map(String::from).collect();
        self.mark(Band::Log);
    }

    fn set_bottom_text(&mut self, text: &str) {
        self.bottom = text.into();
        self.mark(Band::Bottom);
    }
}

impl Toolkit for SimToolkit {
    fn timer_handler(&mut self, ctx: PaintContext) -> Paint {
        let clicked = self.handle_touch(&ctx);
        let mut paint = Paint {
            clicked,
            ..Paint::idle(REFRESH_PERIOD_MS)
        };
        if self.dirty == 0 {
            return paint;
        }

        if self.full_refresh {
            let _ = paint.flushes.push(FlushRequest {
                buffer: ctx.target,
                area: Rectangle::new(Point::zero(), Size::new(self.width, self.height)),
            });
        } else {
            for band in Band::ALL {
                let area = band.area(self.width, self.height);
                // Bands below a short panel have nothing to flush
                if self.dirty & band.bit() != 0 && !area.is_zero_sized() {
                    let _ = paint.flushes.push(FlushRequest {
                        buffer: ctx.target,
                        area,
                    });
                }
            }
        }
        self.dirty = 0;
        self.frames += 1;

        log::debug!("Frame {} at {} ms", self.frames, ctx.now_ms);
        for line in self.screen_lines() {
            log::debug!("| {}", line);
        }
        paint
    }
}
