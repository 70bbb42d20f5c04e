//! HMI port simulator
//!
//! Runs the render loop against a virtual 800x480 RGB panel on the host.
//! Threads stand in for the board's contexts:
//!
//! - `tick`: 2 ms timer interrupt advancing the virtual clock
//! - `scanout`: LCD controller raising VSync once per frame
//! - `render`: the render task
//! - main thread: the application producing UI updates
//!
//! Usage: `hmi-sim [config.toml]`. Set `RUST_LOG=debug` to dump every frame.

mod config;
mod delay;
mod demo;
mod panel;
mod toolkit;
mod touch;

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use embassy_futures::block_on;
use hmi_port::clock::run_tick_source;
use hmi_port::{Bridge, RefreshMode, RenderLoop};
use static_cell::StaticCell;

use crate::delay::SleepDelay;
use crate::panel::SimPanel;
use crate::toolkit::SimToolkit;
use crate::touch::ScriptedTouch;

static BRIDGE: StaticCell<Bridge> = StaticCell::new();

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = std::env::args().nth(1).map(PathBuf::from);
    let config = config::load(path.as_deref())?;
    let port = config.port;
    log::info!(
        "Starting HMI simulator ({}x{}, {:?} refresh, {:?})",
        port.horizontal_res,
        port.vertical_res,
        port.refresh_mode,
        port.tearing
    );

    let bridge: &'static Bridge = BRIDGE.init(Bridge::new());

    let (panel, scanout) = SimPanel::new(port.horizontal_res, port.vertical_res);
    let toolkit = SimToolkit::new(
        port.horizontal_res,
        port.vertical_res,
        port.refresh_mode == RefreshMode::Full,
    );
    let touch = (!config.taps.is_empty()).then(|| ScriptedTouch::new(bridge, config.taps.clone()));

    let mut render = RenderLoop::new(bridge, port, toolkit, panel, touch)
        .map_err(|e| anyhow!("display init failed: {:?}", e))?;

    thread::Builder::new()
        .name("tick".into())
        .spawn(move || {
            let mut delay = SleepDelay;
            block_on(run_tick_source(bridge.clock(), port.tick_period_ms, &mut delay))
        })
        .context("spawning tick thread")?;

    let frame_period = Duration::from_millis(config.vsync_period_ms);
    let frames = scanout.clone();
    thread::Builder::new()
        .name("scanout".into())
        .spawn(move || loop {
            thread::sleep(frame_period);
            frames.scan_frame();
            bridge.notify_vsync();
        })
        .context("spawning scan-out thread")?;

    thread::Builder::new()
        .name("render".into())
        .spawn(move || {
            let mut delay = SleepDelay;
            let Err(e) = block_on(render.run(&mut delay));
            log::error!("Display link lost: {:?}", e);
            std::process::exit(1);
        })
        .context("spawning render thread")?;

    demo::run(
        bridge,
        Duration::from_secs(config.heartbeat_s),
        config.run_for_s.map(Duration::from_secs),
    );

    log::info!(
        "Simulation finished at {} ms: {} frames scanned, {} regions submitted, showing buffer {}",
        bridge.now_ms(),
        scanout.frames(),
        scanout.submits(),
        scanout.front().0
    );
    Ok(())
}
