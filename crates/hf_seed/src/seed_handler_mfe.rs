use rustc_hash::FxHashMap;

use hf_energy::{EType, InteractionEnergy, E_INF};
use hf_structure::IndexRange;

use crate::{is_seed_feasible, SeedConstraint, SeedHandler};

/// `S[i1,i2,bp_inner,u1,u2]` memo key: the minimum hybridization energy
/// of a seed left-bound at `(i1,i2)`, containing `bp_inner+2` base
/// pairs total, using `u1`/`u2` unpaired positions across its internal
/// loops (§4.4). Stored in a flat `FxHashMap` rather than the
/// ring-buffered 5-D array the original keeps; at the sequence lengths
/// this crate targets the memo never grows large enough for the
/// ring-buffer trick to matter, and the hashmap keeps the recursion
/// (and its traceback) trivially correct.
type SKey = (usize, usize, usize, usize, usize);

pub struct SeedHandlerMfe<'e, E: InteractionEnergy> {
    energy: &'e E,
    constraint: SeedConstraint,
    memo: FxHashMap<SKey, EType>,
    /// Best (energy, u1, u2) found for each feasible left-bp, filled
    /// lazily per query or in bulk by `fill_seed`.
    best: FxHashMap<(usize, usize), (EType, usize, usize)>,
}

impl<'e, E: InteractionEnergy> SeedHandlerMfe<'e, E> {
    pub fn new(energy: &'e E, constraint: SeedConstraint) -> Self {
        SeedHandlerMfe { energy, constraint, memo: FxHashMap::default(), best: FxHashMap::default() }
    }

    fn s(&mut self, i1: usize, i2: usize, bp_inner: usize, u1: usize, u2: usize) -> EType {
        let key = (i1, i2, bp_inner, u1, u2);
        if let Some(&v) = self.memo.get(&key) {
            return v;
        }
        let value = self.compute_s(i1, i2, bp_inner, u1, u2);
        self.memo.insert(key, value);
        value
    }

    fn compute_s(&mut self, i1: usize, i2: usize, bp_inner: usize, u1: usize, u2: usize) -> EType {
        let k1 = i1 + 1 + u1;
        let k2 = i2 + 1 + u2;
        if k1 >= self.energy.size1() || k2 >= self.energy.size2() {
            return E_INF;
        }
        if bp_inner == 0 {
            return self.energy.e_inter_left(i1, k1, i2, k2);
        }
        let mut best = E_INF;
        for u1p in 0..=u1 {
            for u2p in 0..=u2 {
                if self.constraint.no_lonely_pair && (u1p > 0 || u2p > 0) {
                    continue;
                }
                let nk1 = i1 + 1 + u1p;
                let nk2 = i2 + 1 + u2p;
                let left = self.energy.e_inter_left(i1, nk1, i2, nk2);
                if left >= E_INF {
                    continue;
                }
                let rest = self.s(nk1, nk2, bp_inner - 1, u1 - u1p, u2 - u2p);
                if rest >= E_INF {
                    continue;
                }
                best = best.min(left + rest);
            }
        }
        best
    }

    /// Best (energy, u1, u2) over the full `u1max x u2max` (subject to
    /// `umax`) search at `(i1,i2)`, restricted to the target bp count;
    /// `None` if no feasible assignment or the candidate is not even
    /// accessible/complementary.
    fn ensure(&mut self, i1: usize, i2: usize) -> Option<(EType, usize, usize)> {
        if let Some(&v) = self.best.get(&(i1, i2)) {
            return Some(v);
        }
        if !is_seed_feasible(self.energy, &self.constraint, i1, i2) {
            return None;
        }
        let bp_inner = self.constraint.bp_inner();
        let mut best: Option<(EType, usize, usize)> = None;
        for u1 in 0..=self.constraint.u1max {
            for u2 in 0..=self.constraint.u2max {
                if u1 + u2 > self.constraint.umax {
                    continue;
                }
                let e = self.s(i1, i2, bp_inner, u1, u2);
                if e >= E_INF {
                    continue;
                }
                if best.map_or(true, |(be, _, _)| e < be) {
                    best = Some((e, u1, u2));
                }
            }
        }
        let (e, u1, u2) = best?;
        let len1 = bp_inner + u1 + 2;
        let len2 = bp_inner + u2 + 2;
        let ed1 = self.energy.ed1(i1, i1 + len1 - 1);
        let ed2 = self.energy.ed2(i2, i2 + len2 - 1);
        if ed1 > self.constraint.max_ed1 || ed2 > self.constraint.max_ed2 {
            return None;
        }
        let total = e + self.energy.e_init() + ed1 + ed2;
        if total > self.constraint.max_e {
            return None;
        }
        self.best.insert((i1, i2), (e, u1, u2));
        Some((e, u1, u2))
    }
}

impl<'e, E: InteractionEnergy> SeedHandler for SeedHandlerMfe<'e, E> {
    fn constraint(&self) -> &SeedConstraint { &self.constraint }

    fn is_seed_bound(&mut self, i1: usize, i2: usize) -> bool {
        self.ensure(i1, i2).is_some()
    }

    fn get_seed_e(&mut self, i1: usize, i2: usize) -> EType {
        self.ensure(i1, i2).map_or(E_INF, |(e, _, _)| e)
    }

    fn get_seed_length1(&mut self, i1: usize, i2: usize) -> usize {
        let bp_inner = self.constraint.bp_inner();
        self.ensure(i1, i2).map_or(0, |(_, u1, _)| bp_inner + u1 + 2)
    }

    fn get_seed_length2(&mut self, i1: usize, i2: usize) -> usize {
        let bp_inner = self.constraint.bp_inner();
        self.ensure(i1, i2).map_or(0, |(_, _, u2)| bp_inner + u2 + 2)
    }

    fn trace_back_seed(&mut self, i1: usize, i2: usize) -> Vec<(usize, usize)> {
        let Some((_, u1_best, u2_best)) = self.ensure(i1, i2) else {
            return Vec::new();
        };
        let mut result = Vec::new();
        let mut cur = (i1, i2);
        let mut bp_inner = self.constraint.bp_inner();
        let mut u1 = u1_best;
        let mut u2 = u2_best;
        loop {
            result.push(cur);
            if bp_inner == 0 {
                break;
            }
            let target = self.s(cur.0, cur.1, bp_inner, u1, u2);
            let mut step = None;
            'search: for u1p in 0..=u1 {
                for u2p in 0..=u2 {
                    let nk1 = cur.0 + 1 + u1p;
                    let nk2 = cur.1 + 1 + u2p;
                    let left = self.energy.e_inter_left(cur.0, nk1, cur.1, nk2);
                    if left >= E_INF {
                        continue;
                    }
                    let rest = self.s(nk1, nk2, bp_inner - 1, u1 - u1p, u2 - u2p);
                    if rest >= E_INF {
                        continue;
                    }
                    if (left + rest - target).abs() < 1e-9 {
                        step = Some((u1p, u2p));
                        break 'search;
                    }
                }
            }
            let (u1p, u2p) = step.expect("seed traceback inconsistent with DP table");
            cur = (cur.0 + 1 + u1p, cur.1 + 1 + u2p);
            u1 -= u1p;
            u2 -= u2p;
            bp_inner -= 1;
        }
        result
    }

    fn update_to_next_seed(&mut self, i1: usize, i2: usize, range1: &IndexRange, range2: &IndexRange) -> Option<(usize, usize)> {
        let mut cur = (i1, i2);
        loop {
            if cur.0 < range1.to {
                cur.0 += 1;
            } else if cur.1 < range2.to {
                cur.0 = range1.from;
                cur.1 += 1;
            } else {
                return None;
            }
            if self.is_seed_bound(cur.0, cur.1) {
                return Some(cur);
            }
        }
    }

    fn fill_seed(&mut self, range1: IndexRange, range2: IndexRange) -> usize {
        let mut count = 0;
        for i1 in range1.from..=range1.to {
            for i2 in range2.from..=range2.to {
                if self.is_seed_bound(i1, i2) {
                    count += 1;
                }
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hf_energy::{Accessibility, AccessibilitySource, BasePairEnergyModel};
    use hf_structure::{AccessibilityConstraint, RnaSequence};

    fn make_model(s1: &str, s2: &str) -> (RnaSequence, RnaSequence) {
        (RnaSequence::new("q", s1).unwrap(), RnaSequence::new("t", s2).unwrap())
    }

    #[test]
    fn finds_a_stacked_seed_of_requested_length() {
        let (s1, s2) = make_model("GGG", "CCC");
        let c1 = AccessibilityConstraint::unconstrained(3, 0);
        let c2 = AccessibilityConstraint::unconstrained(3, 0);
        let a1 = Accessibility::new(&s1, 0, c1, AccessibilitySource::Disabled);
        let a2 = Accessibility::new(&s2, 0, c2, AccessibilitySource::Disabled);
        let energy = BasePairEnergyModel::new(&s1, &s2, &a1, &a2, -1.0, 1.0, usize::MAX, usize::MAX, 0, true);
        let constraint = SeedConstraint::new(3).unwrap().with_max_e(100.0).with_max_ed(100.0, 100.0);
        let mut handler = SeedHandlerMfe::new(&energy, constraint);

        assert!(handler.is_seed_bound(0, 0));
        assert_eq!(handler.get_seed_length1(0, 0), 3);
        assert_eq!(handler.get_seed_length2(0, 0), 3);
        let inner = handler.trace_back_seed(0, 0);
        assert_eq!(inner, vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn fill_seed_counts_feasible_left_ends() {
        let (s1, s2) = make_model("GGGG", "CCCC");
        let c1 = AccessibilityConstraint::unconstrained(4, 0);
        let c2 = AccessibilityConstraint::unconstrained(4, 0);
        let a1 = Accessibility::new(&s1, 0, c1, AccessibilitySource::Disabled);
        let a2 = Accessibility::new(&s2, 0, c2, AccessibilitySource::Disabled);
        let energy = BasePairEnergyModel::new(&s1, &s2, &a1, &a2, -1.0, 1.0, usize::MAX, usize::MAX, 0, true);
        let constraint = SeedConstraint::new(2).unwrap().with_max_e(100.0).with_max_ed(100.0, 100.0);
        let mut handler = SeedHandlerMfe::new(&energy, constraint);
        let count = handler.fill_seed(IndexRange::new(0, 3), IndexRange::new(0, 3));
        assert!(count >= 3); // (0,0),(1,1),(2,2) at least
    }
}
