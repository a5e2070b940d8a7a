use rustc_hash::FxHashMap;

use hf_energy::EType;

/// Accumulates per-base-pair ensemble information as a partition-function
/// predictor fills its tables (§4.11 `PredictionTracker.updateZ`).
/// `add_bp_weight` is called once per admissible bp with its (unnormalized)
/// contribution to that bp's marginal; `finalize` divides through by
/// `Zall` once the fill is complete.
pub trait PredictionTracker {
    fn add_bp_weight(&mut self, p: usize, q: usize, weight: EType);
    fn finalize(&mut self, zall: EType);
}

/// Tracks `P(p,q)`, the probability base pair `(p,q)` participates in
/// *some* reported interaction of the ensemble.
#[derive(Default)]
pub struct PredictionTrackerBasePairProb {
    tally: FxHashMap<(usize, usize), EType>,
    probs: FxHashMap<(usize, usize), EType>,
}

impl PredictionTrackerBasePairProb {
    pub fn new() -> Self {
        PredictionTrackerBasePairProb::default()
    }

    pub fn prob(&self, p: usize, q: usize) -> EType {
        self.probs.get(&(p, q)).copied().unwrap_or(0.0)
    }

    /// Every bp with nonzero probability, most probable first.
    pub fn ranked(&self) -> Vec<((usize, usize), EType)> {
        let mut v: Vec<_> = self.probs.iter().map(|(&k, &p)| (k, p)).collect();
        v.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        v
    }
}

impl PredictionTracker for PredictionTrackerBasePairProb {
    fn add_bp_weight(&mut self, p: usize, q: usize, weight: EType) {
        *self.tally.entry((p, q)).or_insert(0.0) += weight;
    }

    fn finalize(&mut self, zall: EType) {
        self.probs.clear();
        if zall <= 0.0 {
            return;
        }
        for (&k, &w) in &self.tally {
            self.probs.insert(k, (w / zall).min(1.0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probabilities_normalize_and_clamp() {
        let mut t = PredictionTrackerBasePairProb::new();
        t.add_bp_weight(0, 0, 3.0);
        t.add_bp_weight(1, 1, 1.0);
        t.finalize(4.0);
        assert_eq!(t.prob(0, 0), 0.75);
        assert_eq!(t.prob(1, 1), 0.25);
        assert_eq!(t.prob(5, 5), 0.0);
    }

    #[test]
    fn zero_zall_leaves_probabilities_at_zero() {
        let mut t = PredictionTrackerBasePairProb::new();
        t.add_bp_weight(0, 0, 1.0);
        t.finalize(0.0);
        assert_eq!(t.prob(0, 0), 0.0);
    }
}
