//! Linear and point scales mapping data values to pixel positions.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    /// `intervals + 1` evenly spaced domain values including both ends.
    pub fn ticks(&self, intervals: u16) -> Vec<f64> {
        let intervals = intervals.max(1);
        let (d0, d1) = self.domain;
        let step = (d1 - d0) / f64::from(intervals);
        (0..=intervals).map(|i| d0 + step * f64::from(i)).collect()
    }
}

/// Evenly spaced positions for an ordered, discrete domain with outer
/// padding expressed in steps (`0.5` leaves half a step at each end).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PointScale<T> {
    domain: Vec<T>,
    start: f64,
    step: f64,
}

impl<T: PartialEq> PointScale<T> {
    pub fn new(domain: Vec<T>, range: (f64, f64), padding: f64) -> Self {
        let (r0, r1) = range;
        let n = domain.len() as f64;
        let step = (r1 - r0) / (n - 1.0 + padding * 2.0).max(1.0);
        let start = r0 + (r1 - r0 - step * (n - 1.0).max(0.0)) * 0.5;
        Self {
            domain,
            start,
            step,
        }
    }

    pub fn domain(&self) -> &[T] {
        &self.domain
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn position_at(&self, index: usize) -> f64 {
        self.start + self.step * index as f64
    }

    pub fn position(&self, value: &T) -> Option<f64> {
        self.domain
            .iter()
            .position(|d| d == value)
            .map(|idx| self.position_at(idx))
    }
}
