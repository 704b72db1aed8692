use super::Clock;

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped. Single precision: per-frame quantity.
    pub dt: f32,

    /// Clock reading at the tick. Double precision: feeds scene time and the cadence.
    pub now: f64,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Produces `FrameTime` snapshots from a `Clock`.
///
/// `now` is passed through untouched; only `dt` is clamped, so a debugger pause
/// or a minimised window cannot feed a huge step into per-frame animation.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<f64>,
    frame_index: u64,
    dt_min: f64,
    dt_max: f64,
}

impl FrameClock {
    /// Clamps dt to `[0.1 ms, 250 ms]`.
    pub fn new() -> Self {
        Self::with_clamps(0.0001, 0.25)
    }

    pub fn with_clamps(dt_min: f64, dt_max: f64) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: None,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Forgets the previous reading; the next tick reports `dt_min`.
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Reads `clock` and returns the snapshot for the frame about to run.
    pub fn tick(&mut self, clock: &dyn Clock) -> FrameTime {
        let now = clock.seconds();
        let raw = self.last.map_or(self.dt_min, |last| now - last);
        let dt = raw.clamp(self.dt_min, self.dt_max);

        self.last = Some(now);

        let ft = FrameTime {
            dt: dt as f32,
            now,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
