use std::collections::VecDeque;

/// Mean of the most recent `capacity` samples.
#[derive(Debug, Clone)]
pub struct RollingAverage {
    samples: VecDeque<f64>,
    capacity: usize,
    sum: f64,
}

impl RollingAverage {
    /// A zero capacity is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            sum: 0.0,
        }
    }

    pub fn push(&mut self, sample: f64) {
        if self.samples.len() == self.capacity {
            if let Some(old) = self.samples.pop_front() {
                self.sum -= old;
            }
        }
        self.samples.push_back(sample);
        self.sum += sample;
    }

    /// Mean of the window, or 0 before the first sample.
    pub fn average(&self) -> f64 {
        if self.samples.is_empty() {
            0.0
        } else {
            self.sum / self.samples.len() as f64
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_average_is_zero() {
        assert_eq!(RollingAverage::new(4).average(), 0.0);
    }

    #[test]
    fn window_drops_oldest() {
        let mut avg = RollingAverage::new(3);
        for s in [10.0, 20.0, 30.0, 40.0] {
            avg.push(s);
        }
        assert_eq!(avg.len(), 3);
        assert!((avg.average() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn zero_capacity_keeps_last_sample() {
        let mut avg = RollingAverage::new(0);
        avg.push(1.0);
        avg.push(7.0);
        assert_eq!(avg.capacity(), 1);
        assert_eq!(avg.average(), 7.0);
    }
}
