//! Store contents and command application

use core::fmt::Write;

use heapless::String;

use super::log::LogRing;
use crate::bridge::Bridge;
use crate::command::{
    truncate, ButtonCallback, Color, Command, ADDR_LEN, BUTTON_SLOTS, KEY_LEN, LABEL_LEN, NAME_LEN,
    STATUS_SLOTS, VALUE_LEN,
};
use crate::traits::Widgets;

/// Maximum formatted banner length
pub const BANNER_LEN: usize = 127;

/// Label shown on a button without one
const NO_LABEL: &str = "N/A";

/// Placeholder for an empty banner field
const NO_VALUE: &str = "-";

/// Bottom banner before the first update
const BOTTOM_PLACEHOLDER: &str = "IP: - | Baud: - | FW: -";

/// Default status value color
const DEFAULT_VALUE_COLOR: Color = crate::command::color_hex(0x00FF00);

/// One cell of the status grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSlot {
    pub key: String<KEY_LEN>,
    pub value: String<VALUE_LEN>,
    pub color: Color,
    /// Set once the slot has received a value
    pub valid: bool,
}

impl Default for StatusSlot {
    fn default() -> Self {
        Self {
            key: String::new(),
            value: String::new(),
            color: DEFAULT_VALUE_COLOR,
            valid: false,
        }
    }
}

/// One button of the button panel
#[derive(Debug, Clone)]
pub struct ButtonSlot {
    pub label: String<LABEL_LEN>,
    pub callback: Option<ButtonCallback>,
}

impl Default for ButtonSlot {
    fn default() -> Self {
        Self {
            label: truncate(NO_LABEL),
            callback: None,
        }
    }
}

/// Everything the render task knows about the screen
pub struct RendererState {
    top: String<BANNER_LEN>,
    bottom: String<BANNER_LEN>,
    status: [StatusSlot; STATUS_SLOTS],
    buttons: [ButtonSlot; BUTTON_SLOTS],
    log: LogRing,
}

impl Default for RendererState {
    fn default() -> Self {
        Self::new()
    }
}

impl RendererState {
    pub fn new() -> Self {
        Self {
            top: format_top("", ""),
            bottom: truncate(BOTTOM_PLACEHOLDER),
            status: core::array::from_fn(|_| StatusSlot::default()),
            buttons: core::array::from_fn(|_| ButtonSlot::default()),
            log: LogRing::new(),
        }
    }

    /// Push the whole store to the widgets
    ///
    /// Used once at start so the toolkit shows the placeholders.
    pub fn refresh_all<W: Widgets + ?Sized>(&self, widgets: &mut W) {
        widgets.set_top_text(&self.top);
        self.refresh_status(widgets);
        for (index, button) in self.buttons.iter().enumerate() {
            widgets.set_button_label(index, &button.label);
        }
        widgets.show_log(&self.log);
        widgets.set_bottom_text(&self.bottom);
    }

    /// Apply one command and update the affected widgets
    pub fn apply<W: Widgets + ?Sized>(&mut self, command: Command, widgets: &mut W) {
        match command {
            Command::SetTopBanner { name, version } => {
                self.top = format_top(&name, &version);
                widgets.set_top_text(&self.top);
            }
            Command::SetStatusItem {
                index,
                key,
                value,
                color,
            } => {
                let Some(slot) = self.status.get_mut(index) else {
                    warn!("Status index {} out of range", index);
                    return;
                };
                slot.key = key;
                slot.value = value;
                slot.color = color;
                slot.valid = true;
                widgets.set_status(index, &slot.key, &slot.value, slot.color);
            }
            Command::SetButton {
                index,
                label,
                callback,
            } => {
                let Some(slot) = self.buttons.get_mut(index) else {
                    warn!("Button index {} out of range", index);
                    return;
                };
                slot.label = if label.is_empty() {
                    truncate(NO_LABEL)
                } else {
                    label
                };
                slot.callback = callback;
                widgets.set_button_label(index, &slot.label);
            }
            Command::AppendLog { text } => {
                self.log.push(&text);
                widgets.show_log(&self.log);
            }
            Command::SetBottomBanner {
                ip,
                baud,
                firmware_id,
            } => {
                self.bottom = format_bottom(&ip, baud, &firmware_id);
                widgets.set_bottom_text(&self.bottom);
            }
            Command::RefreshStatus => self.refresh_status(widgets),
            Command::ClearLog => {
                self.log.clear();
                widgets.show_log(&self.log);
            }
        }
    }

    /// Redraw every status slot; invalid slots are blanked
    pub fn refresh_status<W: Widgets + ?Sized>(&self, widgets: &mut W) {
        for (index, slot) in self.status.iter().enumerate() {
            if slot.valid {
                widgets.set_status(index, &slot.key, &slot.value, slot.color);
            } else {
                widgets.set_status(index, "", "", slot.color);
            }
        }
    }

    /// Run the callback bound to `index`
    ///
    /// Returns `false` if the index is out of range or no callback is bound.
    pub fn press_button(&self, index: usize, bridge: &Bridge) -> bool {
        match self.buttons.get(index).and_then(|b| b.callback) {
            Some(callback) => {
                debug!("Button {} pressed", index);
                callback(bridge);
                true
            }
            None => false,
        }
    }

    pub fn top_banner(&self) -> &str {
        &self.top
    }

    pub fn bottom_banner(&self) -> &str {
        &self.bottom
    }

    pub fn status(&self, index: usize) -> Option<&StatusSlot> {
        self.status.get(index)
    }

    pub fn button(&self, index: usize) -> Option<&ButtonSlot> {
        self.buttons.get(index)
    }

    pub fn log(&self) -> &LogRing {
        &self.log
    }
}

fn or_placeholder(text: &str) -> &str {
    if text.is_empty() {
        NO_VALUE
    } else {
        text
    }
}

fn format_top(name: &str, version: &str) -> String<BANNER_LEN> {
    let mut out = String::new();
    let _ = write!(
        out,
        "Firmware: {} | Ver: {}",
        or_placeholder(name),
        or_placeholder(version)
    );
    out
}

fn format_bottom(ip: &str, baud: u32, firmware_id: &str) -> String<BANNER_LEN> {
    let mut out = String::new();
    let _ = write!(
        out,
        "IP: {} | Baud: {} | FW: {}",
        or_placeholder(ip),
        baud,
        or_placeholder(firmware_id)
    );
    out
}

// Field widths are fixed by the command payloads; keep the banners in sync.
const _: () = assert!(BANNER_LEN >= 2 * NAME_LEN + 20);
const _: () = assert!(BANNER_LEN >= 2 * ADDR_LEN + 10 + 24);
