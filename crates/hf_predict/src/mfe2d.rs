use rustc_hash::FxHashMap;

use hf_energy::{EType, InteractionEnergy, E_INF};
use hf_interaction::Interaction;
use hf_structure::{IndexRange, RnaSequence};

use crate::{check_range, OutputHandler, PredictError, ReportOverlap, ReportedSites};

type Key = (usize, usize);

/// Exact mfe predictor (§4.7). `H[i1,i2]` is memoized directly rather than
/// per fixed right-bp frame: since the recursion's `min` already picks the
/// single best completion from `(i1,i2)` onward regardless of which right
/// end realizes it, folding the frame dimension away gives the same
/// optimum and lets traceback follow cached `next` pointers instead of
/// re-matching the recursion by floating-point energy.
pub struct Mfe2d<'s, 'e, E: InteractionEnergy> {
    seq1: &'s RnaSequence,
    seq2: &'s RnaSequence,
    energy: &'e E,
    no_lp: bool,
    h: FxHashMap<Key, EType>,
    next: FxHashMap<Key, Option<Key>>,
    sites: ReportedSites,
}

impl<'s, 'e, E: InteractionEnergy> Mfe2d<'s, 'e, E> {
    pub fn new(seq1: &'s RnaSequence, seq2: &'s RnaSequence, energy: &'e E, no_lp: bool) -> Self {
        Mfe2d { seq1, seq2, energy, no_lp, h: FxHashMap::default(), next: FxHashMap::default(), sites: ReportedSites::new() }
    }

    pub fn energy(&self) -> &'e E { self.energy }

    pub(crate) fn seq1(&self) -> &'s RnaSequence { self.seq1 }

    pub(crate) fn seq2(&self) -> &'s RnaSequence { self.seq2 }

    /// Public alias of `trace` for predictors that compose an unseeded
    /// `Mfe2d` as the continuation past their own left bound.
    pub(crate) fn trace_back_from(&mut self, i1: usize, i2: usize) -> Vec<Key> {
        self.trace(i1, i2)
    }

    fn lp_ok(&self, i1: usize, i2: usize) -> bool {
        if !self.no_lp {
            return true;
        }
        let (k1, k2) = (i1 + 1, i2 + 1);
        k1 < self.energy.size1() && k2 < self.energy.size2() && self.energy.are_complementary(k1, k2)
    }

    pub(crate) fn h(&mut self, i1: usize, i2: usize) -> EType {
        if let Some(&v) = self.h.get(&(i1, i2)) {
            return v;
        }
        let (value, nxt) = self.compute_h(i1, i2);
        self.h.insert((i1, i2), value);
        self.next.insert((i1, i2), nxt);
        value
    }

    fn compute_h(&mut self, i1: usize, i2: usize) -> (EType, Option<Key>) {
        if i1 >= self.energy.size1() || i2 >= self.energy.size2()
            || !self.energy.is_accessible1(i1) || !self.energy.is_accessible2(i2)
            || !self.energy.are_complementary(i1, i2)
        {
            return (E_INF, None);
        }

        let mut best = if self.lp_ok(i1, i2) { self.energy.e_init() } else { E_INF };
        let mut best_next = None;

        for k1 in (i1 + 1)..self.energy.size1() {
            for k2 in (i2 + 1)..self.energy.size2() {
                let step = self.energy.e_inter_left(i1, k1, i2, k2);
                if step >= E_INF {
                    continue;
                }
                let rest = self.h(k1, k2);
                if rest >= E_INF {
                    continue;
                }
                let candidate = step + rest;
                if candidate < best {
                    best = candidate;
                    best_next = Some((k1, k2));
                }
            }
        }
        (best, best_next)
    }

    /// Walks cached `next` pointers from `(i1,i2)` to the chain's
    /// terminal bp, inclusive on both ends.
    fn trace(&mut self, i1: usize, i2: usize) -> Vec<Key> {
        let mut bps = vec![(i1, i2)];
        let mut cur = (i1, i2);
        while let Some(Some(nxt)) = self.next.get(&cur).copied() {
            bps.push(nxt);
            cur = nxt;
        }
        bps
    }

    fn terminal(&mut self, i1: usize, i2: usize) -> Key {
        let mut cur = (i1, i2);
        while let Some(Some(nxt)) = self.next.get(&cur).copied() {
            cur = nxt;
        }
        cur
    }

    fn total_energy(&mut self, i1: usize, i2: usize) -> EType {
        let h = self.h(i1, i2);
        if h >= E_INF {
            return E_INF;
        }
        let (j1, j2) = self.terminal(i1, i2);
        self.energy.get_e(i1, j1, i2, j2, h)
    }

    fn build_interaction(&mut self, i1: usize, i2: usize) -> Interaction<'s> {
        let bps = self.trace(i1, i2);
        let mut interaction = Interaction::new(self.seq1, self.seq2);
        for (a, b) in bps {
            interaction.push_bp(a, b);
        }
        interaction.energy = self.total_energy(i1, i2);
        interaction
    }

    /// Fills `H` over `range1 x range2` and reports up to `report_max`
    /// interactions (by ascending total energy) to `output`.
    pub fn predict(
        &mut self,
        range1: IndexRange,
        range2: IndexRange,
        report_max: usize,
        overlap: ReportOverlap,
        output: &mut dyn OutputHandler<'s>,
    ) -> Result<(), PredictError> {
        check_range(range1, range2, self.energy.size1(), self.energy.size2())?;
        if report_max > 1 && overlap != ReportOverlap::Both {
            return Err(PredictError::NotImplemented("exact predictor sub-optimal enumeration outside OVERLAP_BOTH".into()));
        }

        let mut candidates: Vec<(EType, Key)> = Vec::new();
        for i1 in range1.from..=range1.to {
            for i2 in range2.from..=range2.to {
                let total = self.total_energy(i1, i2);
                if total < E_INF {
                    candidates.push((total, (i1, i2)));
                }
            }
        }
        candidates.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut reported = 0;
        for (_, (i1, i2)) in candidates {
            if reported >= report_max {
                break;
            }
            let interaction = self.build_interaction(i1, i2);
            if overlap == ReportOverlap::Neither {
                let range: hf_interaction::InteractionRange = (&interaction).into();
                if self.sites.overlaps(&range.r1, &range.r2) {
                    continue;
                }
                self.sites.record(range.r1, range.r2);
            }
            output.add(interaction);
            reported += 1;
        }
        Ok(())
    }

    /// The single best interaction within `range1 x range2`, if any
    /// base pair is feasible there at all.
    pub fn mfe(&mut self, range1: IndexRange, range2: IndexRange) -> Result<Option<Interaction<'s>>, PredictError> {
        check_range(range1, range2, self.energy.size1(), self.energy.size2())?;
        let mut best: Option<(EType, Key)> = None;
        for i1 in range1.from..=range1.to {
            for i2 in range2.from..=range2.to {
                let total = self.total_energy(i1, i2);
                if total < E_INF && best.map_or(true, |(be, _)| total < be) {
                    best = Some((total, (i1, i2)));
                }
            }
        }
        Ok(best.map(|(_, (i1, i2))| self.build_interaction(i1, i2)))
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

    #[test]
    fn finds_fully_stacked_duplex() {
        let (s1, s2) = setup("GGGG", "CCCC");
        let c1 = AccessibilityConstraint::unconstrained(4, 0);
        let c2 = AccessibilityConstraint::unconstrained(4, 0);
        let a1 = Accessibility::new(&s1, 0, c1, AccessibilitySource::Disabled);
        let a2 = Accessibility::new(&s2, 0, c2, AccessibilitySource::Disabled);
        let energy = BasePairEnergyModel::new(&s1, &s2, &a1, &a2, -1.0, 1.0, usize::MAX, usize::MAX, 0, true);
        let mut predictor = Mfe2d::new(&s1, &s2, &energy, false);

        let mfe = predictor.mfe(IndexRange::new(0, 3), IndexRange::new(0, 3)).unwrap().unwrap();
        assert_eq!(mfe.energy, -4.0);
        assert_eq!(mfe.base_pairs(), &[(0, 0), (1, 1), (2, 2), (3, 3)]);
    }

    #[test]
    fn scenario_s1_two_base_duplex() {
        let (s1, s2) = setup("GG", "CC");
        let c1 = AccessibilityConstraint::unconstrained(2, 0);
        let c2 = AccessibilityConstraint::unconstrained(2, 0);
        let a1 = Accessibility::new(&s1, 0, c1, AccessibilitySource::Disabled);
        let a2 = Accessibility::new(&s2, 0, c2, AccessibilitySource::Disabled);
        let energy = BasePairEnergyModel::new(&s1, &s2, &a1, &a2, -1.0, 1.0, usize::MAX, usize::MAX, 0, true);
        let mut predictor = Mfe2d::new(&s1, &s2, &energy, false);

        let mfe = predictor.mfe(IndexRange::new(0, 1), IndexRange::new(0, 1)).unwrap().unwrap();
        assert_eq!(mfe.energy, -2.0);
        assert_eq!(mfe.base_pairs(), &[(0, 0), (1, 1)]);
    }

    #[test]
    fn no_lp_rejects_isolated_pairs() {
        // only (1,1) is complementary -- G at 1, C at 1 -- with no stackable neighbor.
        let (s1, s2) = setup("AGA", "ACA");
        let c1 = AccessibilityConstraint::unconstrained(3, 0);
        let c2 = AccessibilityConstraint::unconstrained(3, 0);
        let a1 = Accessibility::new(&s1, 0, c1, AccessibilitySource::Disabled);
        let a2 = Accessibility::new(&s2, 0, c2, AccessibilitySource::Disabled);
        let energy = BasePairEnergyModel::new(&s1, &s2, &a1, &a2, -1.0, 1.0, usize::MAX, usize::MAX, 0, true);
        let mut predictor = Mfe2d::new(&s1, &s2, &energy, true);

        let mfe = predictor.mfe(IndexRange::new(0, 2), IndexRange::new(0, 2)).unwrap();
        assert!(mfe.is_none());
    }

    #[test]
    fn report_max_without_overlap_both_is_rejected() {
        let (s1, s2) = setup("GG", "CC");
        let c1 = AccessibilityConstraint::unconstrained(2, 0);
        let c2 = AccessibilityConstraint::unconstrained(2, 0);
        let a1 = Accessibility::new(&s1, 0, c1, AccessibilitySource::Disabled);
        let a2 = Accessibility::new(&s2, 0, c2, AccessibilitySource::Disabled);
        let energy = BasePairEnergyModel::new(&s1, &s2, &a1, &a2, -1.0, 1.0, usize::MAX, usize::MAX, 0, true);
        let mut predictor = Mfe2d::new(&s1, &s2, &energy, false);
        let mut out = crate::OutputHandlerInteractionList::new(10);
        let err = predictor.predict(IndexRange::new(0, 1), IndexRange::new(0, 1), 2, ReportOverlap::Neither, &mut out);
        assert!(err.is_err());
    }
}
