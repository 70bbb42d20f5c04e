//! UI mutation commands
//!
//! Every change a producer wants to make to the screen travels as one of
//! these values. Text fields are fixed-capacity strings, so a command is a
//! plain value that is copied into the queue and shares nothing with the
//! producer afterwards.

use embedded_graphics::pixelcolor::Rgb888;
use heapless::String;

use crate::bridge::Bridge;

/// Number of status slots in the status grid
pub const STATUS_SLOTS: usize = 6;

/// Number of buttons in the button panel
pub const BUTTON_SLOTS: usize = 4;

/// Maximum firmware name / version length in bytes
pub const NAME_LEN: usize = 31;

/// Maximum status key length in bytes
pub const KEY_LEN: usize = 15;

/// Maximum status value length in bytes
pub const VALUE_LEN: usize = 31;

/// Maximum button label length in bytes
pub const LABEL_LEN: usize = 31;

/// Maximum log line length in bytes, timestamp prefix included
pub const LOG_LINE_LEN: usize = 127;

/// Maximum IP address / firmware id length in bytes
pub const ADDR_LEN: usize = 31;

/// Color of a status value
pub type Color = Rgb888;

/// Button action, invoked on the render task with the shared bridge
///
/// Callbacks run while the render task holds the cross-task lock, so they
/// may use the producer API freely but must not block.
pub type ButtonCallback = fn(&Bridge);

/// Build a color from a `0xRRGGBB` literal
pub const fn color_hex(hex: u32) -> Color {
    Rgb888::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

/// Copy `text` into a fixed-capacity string, cutting at a char boundary
pub fn truncate<const N: usize>(text: &str) -> String<N> {
    let mut end = text.len().min(N);
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    let mut out = String::new();
    // Cannot fail: `end <= N`
    let _ = out.push_str(&text[..end]);
    out
}

/// A single UI mutation request
#[derive(Debug, Clone)]
pub enum Command {
    /// Firmware name and version shown in the top banner
    SetTopBanner {
        name: String<NAME_LEN>,
        version: String<NAME_LEN>,
    },
    /// Key/value pair for one status slot
    SetStatusItem {
        index: usize,
        key: String<KEY_LEN>,
        value: String<VALUE_LEN>,
        color: Color,
    },
    /// Label and action for one button
    SetButton {
        index: usize,
        label: String<LABEL_LEN>,
        callback: Option<ButtonCallback>,
    },
    /// Pre-formatted log line (timestamp already applied)
    AppendLog { text: String<LOG_LINE_LEN> },
    /// Network and firmware details shown in the bottom banner
    SetBottomBanner {
        ip: String<ADDR_LEN>,
        baud: u32,
        firmware_id: String<ADDR_LEN>,
    },
    /// Redraw every status slot from the store
    RefreshStatus,
    /// Drop every log line
    ClearLog,
}

/// Payload-free discriminant, used for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandKind {
    SetTopBanner,
    SetStatusItem,
    SetButton,
    AppendLog,
    SetBottomBanner,
    RefreshStatus,
    ClearLog,
}

impl Command {
    pub fn top_banner(name: &str, version: &str) -> Self {
        Command::SetTopBanner {
            name: truncate(name),
            version: truncate(version),
        }
    }

    pub fn status_item(index: usize, key: &str, value: &str, color: Color) -> Self {
        Command::SetStatusItem {
            index,
            key: truncate(key),
            value: truncate(value),
            color,
        }
    }

    pub fn button(index: usize, label: &str, callback: Option<ButtonCallback>) -> Self {
        Command::SetButton {
            index,
            label: truncate(label),
            callback,
        }
    }

    /// Log line taken verbatim; see [`Bridge::append_log`] for the stamped form
    pub fn log_line(text: &str) -> Self {
        Command::AppendLog {
            text: truncate(text),
        }
    }

    pub fn bottom_banner(ip: &str, baud: u32, firmware_id: &str) -> Self {
        Command::SetBottomBanner {
            ip: truncate(ip),
            baud,
            firmware_id: truncate(firmware_id),
        }
    }

    /// Get the discriminant of this command
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::SetTopBanner { .. } => CommandKind::SetTopBanner,
            Command::SetStatusItem { .. } => CommandKind::SetStatusItem,
            Command::SetButton { .. } => CommandKind::SetButton,
            Command::AppendLog { .. } => CommandKind::AppendLog,
            Command::SetBottomBanner { .. } => CommandKind::SetBottomBanner,
            Command::RefreshStatus => CommandKind::RefreshStatus,
            Command::ClearLog => CommandKind::ClearLog,
        }
    }

    /// Check that any slot index carried by this command is in range
    pub fn index_in_range(&self) -> bool {
        match self {
            Command::SetStatusItem { index, .. } => *index < STATUS_SLOTS,
            Command::SetButton { index, .. } => *index < BUTTON_SLOTS,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        let s: String<4> = truncate("Pressure");
        assert_eq!(s.as_str(), "Pres");
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        // '°' is two bytes; cutting at 3 would split it
        let s: String<3> = truncate("25°C");
        assert_eq!(s.as_str(), "25");
    }

    #[test]
    fn test_truncate_short_text_untouched() {
        let s: String<KEY_LEN> = truncate("Temp");
        assert_eq!(s.as_str(), "Temp");
    }

    #[test]
    fn test_status_key_clamped() {
        let cmd = Command::status_item(0, "AVeryLongStatusKeyName", "1", color_hex(0x00FF00));
        match cmd {
            Command::SetStatusItem { key, .. } => assert_eq!(key.len(), KEY_LEN),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_color_hex() {
        let c = color_hex(0x12_34_56);
        assert_eq!(c, Rgb888::new(0x12, 0x34, 0x56));
    }

    #[test]
    fn test_index_in_range() {
        assert!(Command::status_item(5, "k", "v", color_hex(0)).index_in_range());
        assert!(!Command::status_item(6, "k", "v", color_hex(0)).index_in_range());
        assert!(Command::button(3, "Clear", None).index_in_range());
        assert!(!Command::button(4, "Clear", None).index_in_range());
        assert!(Command::ClearLog.index_in_range());
    }

    #[test]
    fn test_kind() {
        assert_eq!(Command::RefreshStatus.kind(), CommandKind::RefreshStatus);
        assert_eq!(Command::log_line("x").kind(), CommandKind::AppendLog);
    }
}
