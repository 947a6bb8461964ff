/// One clock cadence: the last timestamp it was updated at, the delta since
/// the update before, and that delta in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Cadence {
    time: f64,
    delta: f64,
    scale: f64,
    started: bool,
}

impl Cadence {
    /// Record a new timestamp in milliseconds. The first update only sets the
    /// baseline and reports a zero delta.
    pub fn update(&mut self, now: f64) {
        if self.started {
            self.delta = now - self.time;
        } else {
            self.delta = 0.0;
            self.started = true;
        }
        self.scale = self.delta * 0.001;
        self.time = now;
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Last update timestamp in milliseconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Milliseconds between the last two updates.
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// `delta` in seconds.
    pub fn scale(&self) -> f64 {
        self.scale
    }
}

/// Engine and frame clocks for one loop instance.
#[derive(Debug, Clone, Default)]
pub struct TimeSource {
    engine: Cadence,
    frame: Cadence,
}

impl TimeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the engine cadence. If no frame has been timed yet the frame
    /// cadence takes `now` as its baseline, so the first frame delta is never
    /// measured from zero.
    pub fn engine_update(&mut self, now: f64) {
        self.engine.update(now);
        if !self.frame.is_started() {
            self.frame.update(now);
        }
    }

    pub fn frame_update(&mut self, now: f64) {
        self.frame.update(now);
    }

    pub fn engine(&self) -> &Cadence {
        &self.engine
    }

    pub fn frame(&self) -> &Cadence {
        &self.frame
    }

    /// Seconds elapsed between the last engine update and `now`, never negative.
    pub fn since_engine(&self, now: f64) -> f64 {
        ((now - self.engine.time) * 0.001).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_update_is_baseline() {
        let mut c = Cadence::default();
        c.update(1500.0);
        assert_eq!(c.time(), 1500.0);
        assert_eq!(c.delta(), 0.0);
        c.update(1520.0);
        assert_eq!(c.delta(), 20.0);
        assert!((c.scale() - 0.02).abs() < 1e-12);
    }

    #[test]
    fn engine_seeds_frame_baseline_once() {
        let mut t = TimeSource::new();
        t.engine_update(100.0);
        assert_eq!(t.frame().time(), 100.0);
        t.frame_update(110.0);
        assert_eq!(t.frame().delta(), 10.0);
        t.engine_update(120.0);
        // Frame cadence is owned by frame updates once it has started.
        assert_eq!(t.frame().time(), 110.0);
        assert_eq!(t.engine().delta(), 20.0);
    }

    #[test]
    fn since_engine_in_seconds() {
        let mut t = TimeSource::new();
        t.engine_update(40.0);
        assert!((t.since_engine(45.0) - 0.005).abs() < 1e-12);
        assert_eq!(t.since_engine(30.0), 0.0);
    }
}
