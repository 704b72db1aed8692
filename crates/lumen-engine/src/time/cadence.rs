/// One firing of a `CadenceTimer`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CadenceTick {
    /// Number of firings before this one.
    pub index: u64,

    /// Cadence timestamp of this firing: `origin + (index + 1) * step`.
    pub time: f64,
}

/// Drift-free fixed-rate timer.
///
/// The fire timestamp is always `origin + ticks * step`; it is never snapped to
/// the observed time, so jitter in the caller's polling does not accumulate.
/// At most one tick fires per `poll`, even if several steps have elapsed.
#[derive(Debug, Clone)]
pub struct CadenceTimer {
    step: f64,
    origin: f64,
    ticks: u64,
}

/// Slack for the float comparison at exact step boundaries.
const BOUNDARY_EPSILON: f64 = 1e-9;

impl CadenceTimer {
    pub fn new(step: f64, origin: f64) -> Self {
        debug_assert!(step > 0.0, "cadence step must be positive");
        Self {
            step,
            origin,
            ticks: 0,
        }
    }

    pub fn from_hz(hz: f64, origin: f64) -> Self {
        Self::new(1.0 / hz, origin)
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Timestamp of the most recent firing (the origin before the first one).
    pub fn last_fire(&self) -> f64 {
        self.origin + self.ticks as f64 * self.step
    }

    /// Whole steps elapsed at `now` that have not fired yet.
    pub fn backlog(&self, now: f64) -> u64 {
        self.elapsed_steps(now).saturating_sub(self.ticks)
    }

    /// Fires once if at least one full step separates `now` from the last firing.
    pub fn poll(&mut self, now: f64) -> Option<CadenceTick> {
        if self.elapsed_steps(now) <= self.ticks {
            return None;
        }
        let tick = CadenceTick {
            index: self.ticks,
            time: self.origin + (self.ticks + 1) as f64 * self.step,
        };
        self.ticks += 1;
        Some(tick)
    }

    fn elapsed_steps(&self, now: f64) -> u64 {
        let steps = (now - self.origin) / self.step + BOUNDARY_EPSILON;
        if steps <= 0.0 { 0 } else { steps.floor() as u64 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: f64 = 1.0 / 30.0;

    #[test]
    fn does_not_fire_before_a_full_step() {
        let mut timer = CadenceTimer::new(STEP, 0.0);
        assert_eq!(timer.poll(0.0), None);
        assert_eq!(timer.poll(STEP * 0.99), None);
        assert!(timer.poll(STEP).is_some());
        assert_eq!(timer.poll(STEP * 1.5), None);
    }

    #[test]
    fn half_second_jump_fires_fifteen_times_one_per_poll() {
        let mut timer = CadenceTimer::new(STEP, 0.0);
        let now = 0.5;
        assert_eq!(timer.backlog(now), 15);

        let mut fired = Vec::new();
        for _ in 0..100 {
            match timer.poll(now) {
                Some(tick) => fired.push(tick),
                None => break,
            }
        }

        assert_eq!(fired.len(), 15);
        for (i, tick) in fired.iter().enumerate() {
            assert_eq!(tick.index, i as u64);
            approx::assert_relative_eq!(tick.time, (i + 1) as f64 * STEP, epsilon = 1e-12);
        }
        assert_eq!(timer.backlog(now), 0);
    }

    #[test]
    fn fire_times_stay_on_the_step_grid_under_jitter() {
        let mut timer = CadenceTimer::new(STEP, 2.0);
        let mut now = 2.0;
        let mut prev = timer.last_fire();
        let jitter = [0.007, 0.019, 0.003, 0.041, 0.0161, 0.025, 0.2];

        for i in 0..400 {
            now += jitter[i % jitter.len()];
            if let Some(tick) = timer.poll(now) {
                let steps = (tick.time - prev) / STEP;
                approx::assert_relative_eq!(steps, steps.round(), epsilon = 1e-9);
                assert!(steps.round() >= 1.0);
                assert!(tick.time <= now + 1e-9);
                prev = tick.time;
            }
        }
        approx::assert_relative_eq!(
            timer.last_fire(),
            2.0 + timer.ticks() as f64 * STEP,
            epsilon = 1e-12
        );
    }

    #[test]
    fn stall_leaves_a_backlog_instead_of_catching_up() {
        let mut timer = CadenceTimer::from_hz(30.0, 0.0);
        assert!(timer.poll(1.0).is_some());
        assert_eq!(timer.ticks(), 1);
        assert_eq!(timer.backlog(1.0), 29);
    }
}
