//! Angle sweeps used by the rotation search.

use serde::{Deserialize, Serialize};

/// Inclusive, ascending sweep of candidate angles in degrees.
///
/// Angles are generated as `start + i * step` rather than by repeated
/// addition, so the grid stays exact for steps such as 0.25.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AngleSweep {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl Default for AngleSweep {
    fn default() -> Self {
        Self {
            start: -2.0,
            end: 2.0,
            step: 0.25,
        }
    }
}

impl AngleSweep {
    pub fn new(start: f64, end: f64, step: f64) -> Self {
        Self { start, end, step }
    }

    /// Number of candidates; an invalid step or reversed range yields only `start`.
    pub fn steps(&self) -> usize {
        if !(self.step.is_finite() && self.step > 0.0) || self.end < self.start {
            return 1;
        }
        ((self.end - self.start) / self.step + 1e-9).floor() as usize + 1
    }

    pub fn angles(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.steps()).map(move |i| self.start + i as f64 * self.step)
    }

    /// Largest absolute angle visited by the sweep.
    pub fn max_abs(&self) -> f64 {
        self.angles().fold(0.0, |acc: f64, a| acc.max(a.abs()))
    }
}

/// Pick the angle with the highest score; ties keep the earliest candidate.
pub fn best_by_score(scores: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut best: Option<(f64, f64)> = None;
    for &(angle, score) in scores {
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((angle, score)),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sweep_has_seventeen_exact_angles() {
        let sweep = AngleSweep::default();
        let angles: Vec<f64> = sweep.angles().collect();
        assert_eq!(angles.len(), 17);
        assert_eq!(angles[0], -2.0);
        assert_eq!(angles[8], 0.0);
        assert_eq!(angles[16], 2.0);
        assert_eq!(sweep.max_abs(), 2.0);
    }

    #[test]
    fn degenerate_sweeps_yield_start_only() {
        assert_eq!(AngleSweep::new(1.0, 0.0, 0.25).angles().collect::<Vec<_>>(), vec![1.0]);
        assert_eq!(AngleSweep::new(0.0, 1.0, 0.0).steps(), 1);
    }

    #[test]
    fn ties_keep_first_maximum() {
        let scores = [(-1.0, 3.0), (0.0, 5.0), (1.0, 5.0), (2.0, 4.0)];
        assert_eq!(best_by_score(&scores), Some((0.0, 5.0)));
        assert_eq!(best_by_score(&[]), None);
    }
}
