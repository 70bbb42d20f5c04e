//! Scripted touch controller

use embedded_graphics::prelude::Point;
use hmi_port::{Bridge, TouchInput, TouchSample};

use crate::config::Tap;

/// Replays taps against the virtual clock
pub struct ScriptedTouch<'a> {
    bridge: &'a Bridge,
    taps: Vec<Tap>,
    /// Position of the last contact, reported with releases
    last: Point,
}

impl<'a> ScriptedTouch<'a> {
    pub fn new(bridge: &'a Bridge, taps: Vec<Tap>) -> Self {
        Self {
            bridge,
            taps,
            last: Point::zero(),
        }
    }
}

impl TouchInput for ScriptedTouch<'_> {
    fn read(&mut self) -> TouchSample {
        let now = self.bridge.now_ms();
        let active = self
            .taps
            .iter()
            .find(|t| now >= t.at_ms && now - t.at_ms < t.hold_ms);

        match active {
            Some(tap) => {
                self.last = Point::new(tap.x, tap.y);
                TouchSample::pressed(tap.x, tap.y)
            }
            None => TouchSample {
                pressed: false,
                point: self.last,
            },
        }
    }
}
