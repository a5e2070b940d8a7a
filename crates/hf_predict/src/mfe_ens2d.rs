use rustc_hash::FxHashMap;

use hf_energy::{EType, InteractionEnergy, E_INF};
use hf_interaction::Interaction;
use hf_structure::{IndexRange, RnaSequence};

use crate::{check_range, OutputHandler, PredictError, PredictionTracker};

type Key = (usize, usize);

/// Ensemble partition-function predictor, O(n²) space (§4.10). For every
/// right-end frame `(j1,j2)` it fills `Z[i1,i2]`, the Boltzmann sum over
/// all sub-interactions left-bound at `(i1,i2)` and ending exactly at
/// `(j1,j2)`; unlike `Mfe2d` this cannot collapse the frame dimension
/// away, since summation (not `min`) does not commute with "pick the
/// best right end".
///
/// Mirrors the original's boundary-only mfe tracking: the reported mfe
/// interaction carries only the leftmost and rightmost base pair of the
/// dominant `(i1,j1,i2,j2)` term (see `reportOptima`/`traceBack` split in
/// the reference predictor, which never reconstructs interior pairs for
/// this family). Interior base pairs are a property of the *exact*
/// predictors; an ensemble predictor only promises the partition function
/// and the boundary of its best-scoring component (testable property 7:
/// `Emfe = -RT * ln(Zmax_component)`).
pub struct MfeEns2d<'s, 'e, E: InteractionEnergy> {
    seq1: &'s RnaSequence,
    seq2: &'s RnaSequence,
    energy: &'e E,
    no_lp: bool,
    zall: EType,
}

impl<'s, 'e, E: InteractionEnergy> MfeEns2d<'s, 'e, E> {
    pub fn new(seq1: &'s RnaSequence, seq2: &'s RnaSequence, energy: &'e E, no_lp: bool) -> Self {
        MfeEns2d { seq1, seq2, energy, no_lp, zall: 0.0 }
    }

    pub fn energy(&self) -> &'e E { self.energy }

    /// The overall hybridization partition function accumulated by the
    /// last `predict()` call.
    pub fn zall(&self) -> EType { self.zall }

    fn lp_ok(&self, i1: usize, i2: usize) -> bool {
        if !self.no_lp {
            return true;
        }
        let (k1, k2) = (i1 + 1, i2 + 1);
        k1 < self.energy.size1() && k2 < self.energy.size2() && self.energy.are_complementary(k1, k2)
    }

    /// Fills `Z[.,.]` for the frame ending at `(j1,j2)`, accumulating
    /// every defined cell's contribution into `zall` and, if a tracker is
    /// given, into its per-bp boundary tally. Returns the frame-local
    /// table (kept only for inspection in tests).
    fn fill_frame(
        &self,
        j1: usize,
        j2: usize,
        i1init: usize,
        i2init: usize,
        zall: &mut EType,
        best: &mut Option<(EType, Key, Key)>,
        mut tracker: Option<&mut dyn PredictionTracker>,
    ) -> FxHashMap<Key, EType> {
        let mut z: FxHashMap<Key, EType> = FxHashMap::default();
        for i1 in (i1init..=j1).rev() {
            for i2 in (i2init..=j2).rev() {
                if !self.energy.is_accessible1(i1) || !self.energy.is_accessible2(i2) || !self.energy.are_complementary(i1, i2) {
                    continue;
                }

                let mut cur = 0.0;
                if i1 == j1 && i2 == j2 {
                    if self.lp_ok(i1, i2) {
                        cur = self.energy.get_boltzmann_weight(self.energy.e_init());
                    }
                } else if j1 > i1 && j2 > i2 {
                    let step = self.energy.e_inter_left(i1, j1, i2, j2);
                    if step < E_INF {
                        if let Some(&zjj) = z.get(&(j1, j2)) {
                            cur += self.energy.get_boltzmann_weight(step) * zjj;
                        }
                    }
                    for k1 in (i1 + 1)..j1 {
                        for k2 in (i2 + 1)..j2 {
                            if let Some(&zk) = z.get(&(k1, k2)) {
                                if zk == 0.0 {
                                    continue;
                                }
                                let step = self.energy.e_inter_left(i1, k1, i2, k2);
                                if step < E_INF {
                                    cur += self.energy.get_boltzmann_weight(step) * zk;
                                }
                            }
                        }
                    }
                }

                z.insert((i1, i2), cur);
                if cur <= 0.0 {
                    continue;
                }

                let extra = self.energy.get_boltzmann_weight(self.energy.get_e(i1, j1, i2, j2, 0.0));
                let contribution = cur * extra;
                if contribution <= 0.0 {
                    continue;
                }
                *zall += contribution;

                if let Some(t) = tracker.as_deref_mut() {
                    t.add_bp_weight(i1, i2, contribution);
                    if (i1, i2) != (j1, j2) {
                        t.add_bp_weight(j1, j2, contribution);
                    }
                }

                let candidate_e = -self.energy.get_rt() * contribution.ln();
                if best.map_or(true, |(be, _, _)| candidate_e < be) {
                    *best = Some((candidate_e, (i1, i2), (j1, j2)));
                }
            }
        }
        z
    }

    /// Fills the ensemble partition function over `range1 x range2` and
    /// reports the dominant-component interaction (boundary bp only) to
    /// `output`. `tracker`, if given, receives every admissible bp's
    /// Boltzmann-weighted boundary occurrence and is finalized with
    /// `zall` once the fill completes.
    pub fn predict(
        &mut self,
        range1: IndexRange,
        range2: IndexRange,
        output: &mut dyn OutputHandler<'s>,
        mut tracker: Option<&mut dyn PredictionTracker>,
    ) -> Result<(), PredictError> {
        check_range(range1, range2, self.energy.size1(), self.energy.size2())?;

        let mut zall = 0.0;
        let mut best: Option<(EType, Key, Key)> = None;
        for j1 in (range1.from..=range1.to).rev() {
            if !self.energy.is_accessible1(j1) {
                continue;
            }
            for j2 in (range2.from..=range2.to).rev() {
                if !self.energy.is_accessible2(j2) || !self.energy.are_complementary(j1, j2) {
                    continue;
                }
                self.fill_frame(j1, j2, range1.from, range2.from, &mut zall, &mut best, tracker.as_deref_mut());
            }
        }
        self.zall = zall;
        if let Some(t) = tracker.as_deref_mut() {
            t.finalize(zall);
        }

        match best {
            Some((e, left, right)) if e < 0.0 => {
                let mut interaction = Interaction::new(self.seq1, self.seq2);
                interaction.push_bp(left.0, left.1);
                if right != left {
                    interaction.push_bp(right.0, right.1);
                }
                interaction.energy = e;
                output.add(interaction);
            }
            _ => {
                let mut empty = Interaction::new(self.seq1, self.seq2);
                empty.energy = 0.0;
                output.add(empty);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hf_energy::{Accessibility, AccessibilitySource, BasePairEnergyModel};
    use hf_structure::AccessibilityConstraint;

    fn setup(s1: &str, s2: &str) -> (RnaSequence, RnaSequence) {
        (RnaSequence::new("q", s1).unwrap(), RnaSequence::new("t", s2).unwrap())
    }

    fn bp_model<'s>(s1: &'s RnaSequence, s2: &'s RnaSequence, a1: &'s Accessibility<'s>, a2: &'s Accessibility<'s>) -> BasePairEnergyModel<'s> {
        BasePairEnergyModel::new(s1, s2, a1, a2, -1.0, 1.0, usize::MAX, usize::MAX, 0, true)
    }

    #[test]
    fn scenario_s1_two_base_duplex() {
        let (s1, s2) = setup("GG", "CC");
        let c1 = AccessibilityConstraint::unconstrained(2, 0);
        let c2 = AccessibilityConstraint::unconstrained(2, 0);
        let a1 = Accessibility::new(&s1, 0, c1, AccessibilitySource::Disabled);
        let a2 = Accessibility::new(&s2, 0, c2, AccessibilitySource::Disabled);
        let energy = bp_model(&s1, &s2, &a1, &a2);
        let mut predictor = MfeEns2d::new(&s1, &s2, &energy, false);
        let mut out = crate::OutputHandlerInteractionList::new(1);

        predictor.predict(IndexRange::new(0, 1), IndexRange::new(0, 1), &mut out, None).unwrap();

        let e = std::f64::consts::E;
        assert!((predictor.zall() - (4.0 * e + e * e)).abs() < 1e-9);
        let best = out.best().unwrap();
        assert!((best.energy - (-2.0)).abs() < 1e-9);
        assert_eq!(best.base_pairs(), &[(0, 0), (1, 1)]);
    }

    #[test]
    fn scenario_s2_three_base_duplex() {
        let (s1, s2) = setup("GGG", "CCC");
        let c1 = AccessibilityConstraint::unconstrained(3, 0);
        let c2 = AccessibilityConstraint::unconstrained(3, 0);
        let a1 = Accessibility::new(&s1, 0, c1, AccessibilitySource::Disabled);
        let a2 = Accessibility::new(&s2, 0, c2, AccessibilitySource::Disabled);
        let energy = bp_model(&s1, &s2, &a1, &a2);
        let mut predictor = MfeEns2d::new(&s1, &s2, &energy, false);
        let mut out = crate::OutputHandlerInteractionList::new(1);

        predictor.predict(IndexRange::new(0, 2), IndexRange::new(0, 2), &mut out, None).unwrap();

        let e = std::f64::consts::E;
        let expected = 9.0 * e + 9.0 * e * e + e.powi(3);
        assert!((predictor.zall() - expected).abs() < 1e-6);
        assert!((out.best().unwrap().energy - (-3.0)).abs() < 1e-9);
    }

    #[test]
    fn partition_function_bounds_mfe_boltzmann_weight() {
        let (s1, s2) = setup("GGGG", "CCCC");
        let c1 = AccessibilityConstraint::unconstrained(4, 0);
        let c2 = AccessibilityConstraint::unconstrained(4, 0);
        let a1 = Accessibility::new(&s1, 0, c1, AccessibilitySource::Disabled);
        let a2 = Accessibility::new(&s2, 0, c2, AccessibilitySource::Disabled);
        let energy = bp_model(&s1, &s2, &a1, &a2);
        let mut predictor = MfeEns2d::new(&s1, &s2, &energy, false);
        let mut out = crate::OutputHandlerInteractionList::new(1);

        predictor.predict(IndexRange::new(0, 3), IndexRange::new(0, 3), &mut out, None).unwrap();
        let mfe = out.best().unwrap().energy;
        assert!(predictor.zall() >= energy.get_boltzmann_weight(mfe) - 1e-9);
    }
}
