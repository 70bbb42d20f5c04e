//! Demo producer
//!
//! Fills the dashboard the way a controller application would, then keeps
//! appending a heartbeat line.

use std::thread;
use std::time::{Duration, Instant};

use hmi_port::{color_hex, Bridge};

fn on_pressed(bridge: &Bridge) {
    bridge.append_log("pressed");
}

fn on_clear(bridge: &Bridge) {
    bridge.clear_log();
}

/// Initial banners, status grid, buttons and boot log
pub fn populate(bridge: &Bridge) {
    bridge.set_top_banner("UniController", "v1.0.0");
    bridge.set_bottom_banner("192.168.1.100", 115200, "FW-2025");

    bridge.set_status_item(0, "Temp", "25°C", color_hex(0x00FF00));
    bridge.set_status_item(1, "Pressure", "101kPa", color_hex(0xFFFF00));
    bridge.set_status_item(2, "Mode", "Auto", color_hex(0x00FFFF));
    bridge.set_status_item(3, "Flow", "5L/min", color_hex(0xFF00FF));
    bridge.set_status_item(4, "Error", "None", color_hex(0xFFFFFF));
    bridge.set_status_item(5, "Uptime", "00:05:30", color_hex(0x00FF00));

    bridge.set_button(0, "Start", Some(on_pressed));
    bridge.set_button(1, "Stop", Some(on_pressed));
    bridge.set_button(2, "Debug", Some(on_pressed));
    bridge.set_button(3, "Clear", Some(on_clear));

    for line in [
        "System booting...",
        "LVGL initialized.",
        "Network connected.",
        "Device ready.",
    ] {
        bridge.append_log(line);
    }
}

/// Populate after a short settle time, then log a heartbeat until `run_for`
pub fn run(bridge: &Bridge, heartbeat: Duration, run_for: Option<Duration>) {
    thread::sleep(Duration::from_secs(1));
    populate(bridge);
    log::info!("Dashboard populated");

    let start = Instant::now();
    loop {
        if !bridge.append_log("tick.") {
            log::warn!("Heartbeat dropped, UI queue full");
        }

        let pause = match run_for {
            Some(limit) => {
                let left = limit.saturating_sub(start.elapsed());
                if left.is_zero() {
                    break;
                }
                left.min(heartbeat)
            }
            None => heartbeat,
        };
        thread::sleep(pause);
    }
}
