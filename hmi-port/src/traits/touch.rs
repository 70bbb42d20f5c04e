//! Touch controller trait

use embedded_graphics::prelude::Point;

/// One touch controller reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TouchSample {
    /// Finger down
    pub pressed: bool,
    /// Last known contact position
    pub point: Point,
}

impl TouchSample {
    pub const fn released() -> Self {
        Self {
            pressed: false,
            point: Point::zero(),
        }
    }

    pub const fn pressed(x: i32, y: i32) -> Self {
        Self {
            pressed: true,
            point: Point::new(x, y),
        }
    }
}

/// Touch controller, polled once per paint cycle
pub trait TouchInput {
    /// Read the current contact state
    ///
    /// Controllers that fail to answer should report a release.
    fn read(&mut self) -> TouchSample;
}

/// Stand-in for boards without a touch controller
///
/// Pass `None::<NoTouch>` to the render loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTouch;

impl TouchInput for NoTouch {
    fn read(&mut self) -> TouchSample {
        TouchSample::released()
    }
}
