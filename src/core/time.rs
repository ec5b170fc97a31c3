//=========================================================================
// Frame Clock
//=========================================================================
//
// Wall-clock time between frame loop iterations.
//
// No clamping or smoothing: a long stall is reported as one long frame,
// and the physics accumulator integrates it in a single pass.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Instant;

//=== FrameClock ==========================================================

/// Measures seconds between successive [`FrameClock::tick`] calls.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame: u64,
}

impl FrameClock {
    /// Starts the clock now.
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            frame: 0,
        }
    }

    /// Seconds since the previous tick (or since construction).
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        self.frame += 1;
        dt
    }

    /// Number of ticks so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
