//! Simulator configuration
//!
//! Read from an optional TOML file; every field falls back to its default.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use hmi_port::PortConfig;
use serde::Deserialize;

use crate::toolkit::{MIN_HEIGHT, MIN_WIDTH};

/// One scripted touch: finger down at `(x, y)` from `at_ms` for `hold_ms`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Tap {
    pub at_ms: u32,
    pub x: i32,
    pub y: i32,
    #[serde(default = "default_hold_ms")]
    pub hold_ms: u32,
}

fn default_hold_ms() -> u32 {
    100
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub port: PortConfig,
    /// Panel scan-out period
    pub vsync_period_ms: u64,
    /// Interval of the demo's "tick." log line
    pub heartbeat_s: u64,
    /// Stop after this long; run forever when absent
    pub run_for_s: Option<u64>,
    pub taps: Vec<Tap>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            port: PortConfig::default(),
            vsync_period_ms: 16,
            heartbeat_s: 10,
            run_for_s: None,
            taps: Vec::new(),
        }
    }
}

impl SimConfig {
    pub fn parse(text: &str) -> Result<Self> {
        let config: SimConfig = toml::from_str(text).context("invalid simulator config")?;
        config
            .port
            .validate()
            .map_err(|e| anyhow!("invalid port config: {:?}", e))?;
        if config.vsync_period_ms == 0 {
            return Err(anyhow!("vsync_period_ms must be non-zero"));
        }
        if config.port.horizontal_res < MIN_WIDTH || config.port.vertical_res < MIN_HEIGHT {
            return Err(anyhow!(
                "panel {}x{} is smaller than the {}x{} dashboard",
                config.port.horizontal_res,
                config.port.vertical_res,
                MIN_WIDTH,
                MIN_HEIGHT
            ));
        }
        Ok(config)
    }
}

/// Load `path`, or the defaults when no path was given
pub fn load(path: Option<&Path>) -> Result<SimConfig> {
    let Some(path) = path else {
        log::info!("No config file given, using defaults");
        return Ok(SimConfig::default());
    };

    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config = SimConfig::parse(&text).with_context(|| format!("loading {}", path.display()))?;
    log::info!("Loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hmi_port::{RefreshMode, TearingMode, Timeout};

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = SimConfig::parse("").unwrap();
        assert_eq!(config.port, PortConfig::default());
        assert_eq!(config.vsync_period_ms, 16);
        assert!(config.taps.is_empty());
    }

    #[test]
    fn test_sample_config() {
        let config = SimConfig::parse(include_str!("../sim.toml")).unwrap();
        assert_eq!(config.run_for_s, Some(30));
        assert_eq!(config.port.tearing, TearingMode::DoubleBuffered);
        assert_eq!(config.taps.len(), 2);
        assert_eq!(config.taps[0].hold_ms, 100);
    }

    #[test]
    fn test_partial_port_section() {
        let text = r#"
            [port]
            refresh_mode = "full"
            tearing = "triple_buffered"
            lock_timeout = { millis = 50 }
        "#;
        let config = SimConfig::parse(text).unwrap();
        assert_eq!(config.port.refresh_mode, RefreshMode::Full);
        assert_eq!(config.port.lock_timeout, Timeout::Millis(50));
        assert_eq!(config.port.max_delay_ms, 500);
    }

    #[test]
    fn test_invalid_port_rejected() {
        let text = r#"
            [port]
            tearing = "triple_buffered"
        "#;
        let err = SimConfig::parse(text).unwrap_err();
        assert!(err.to_string().contains("TripleBufferNeedsFullRefresh"));
    }

    #[test]
    fn test_panel_smaller_than_layout_rejected() {
        let text = r#"
            [port]
            vertical_res = 30
        "#;
        let err = SimConfig::parse(text).unwrap_err();
        assert!(err.to_string().contains("smaller than"));

        let text = r#"
            [port]
            horizontal_res = 1024
            vertical_res = 600
        "#;
        assert!(SimConfig::parse(text).is_ok());
    }

    #[test]
    fn test_missing_file() {
        assert!(load(Some(Path::new("/nonexistent/sim.toml"))).is_err());
    }
}
