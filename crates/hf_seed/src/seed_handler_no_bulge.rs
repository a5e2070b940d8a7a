use rustc_hash::FxHashMap;

use hf_energy::{EType, InteractionEnergy, E_INF};
use hf_structure::IndexRange;

use crate::{is_seed_feasible, SeedConstraint, SeedHandler};

/// Seeds with `u1=u2=0` only: a fixed-length window of `bp` stacked
/// base pairs, slid/extended with no bulges. `O(n^2*bp)` time, `O(n^2)`
/// space -- the faster default when bulges are not permitted, grounded
/// on `SeedHandlerNoBulge` (§4.4).
pub struct SeedHandlerNoBulge<'e, E: InteractionEnergy> {
    energy: &'e E,
    constraint: SeedConstraint,
    energies: FxHashMap<(usize, usize), EType>,
}

impl<'e, E: InteractionEnergy> SeedHandlerNoBulge<'e, E> {
    pub fn new(energy: &'e E, constraint: SeedConstraint) -> Self {
        SeedHandlerNoBulge { energy, constraint, energies: FxHashMap::default() }
    }

    fn ensure(&mut self, i1: usize, i2: usize) -> Option<EType> {
        if let Some(&v) = self.energies.get(&(i1, i2)) {
            return Some(v);
        }
        if !is_seed_feasible(self.energy, &self.constraint, i1, i2) {
            return None;
        }
        let bp = self.constraint.bp;
        if i1 + bp > self.energy.size1() || i2 + bp > self.energy.size2() {
            return None;
        }
        let mut total = 0.0;
        for step in 0..bp - 1 {
            let e = self.energy.e_inter_left(i1 + step, i1 + step + 1, i2 + step, i2 + step + 1);
            if e >= E_INF {
                return None;
            }
            total += e;
        }
        let ed1 = self.energy.ed1(i1, i1 + bp - 1);
        let ed2 = self.energy.ed2(i2, i2 + bp - 1);
        if ed1 > self.constraint.max_ed1 || ed2 > self.constraint.max_ed2 {
            return None;
        }
        let full = total + self.energy.e_init() + ed1 + ed2;
        if full > self.constraint.max_e {
            return None;
        }
        self.energies.insert((i1, i2), total);
        Some(total)
    }
}

impl<'e, E: InteractionEnergy> SeedHandler for SeedHandlerNoBulge<'e, E> {
    fn constraint(&self) -> &SeedConstraint { &self.constraint }

    fn is_seed_bound(&mut self, i1: usize, i2: usize) -> bool {
        self.ensure(i1, i2).is_some()
    }

    fn get_seed_e(&mut self, i1: usize, i2: usize) -> EType {
        self.ensure(i1, i2).unwrap_or(E_INF)
    }

    fn get_seed_length1(&mut self, i1: usize, i2: usize) -> usize {
        if self.ensure(i1, i2).is_some() { self.constraint.bp } else { 0 }
    }

    fn get_seed_length2(&mut self, i1: usize, i2: usize) -> usize {
        self.get_seed_length1(i1, i2)
    }

    fn trace_back_seed(&mut self, i1: usize, i2: usize) -> Vec<(usize, usize)> {
        if self.ensure(i1, i2).is_none() {
            return Vec::new();
        }
        (0..self.constraint.bp - 1).map(|step| (i1 + step, i2 + step)).collect()
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

    /// Testable property 5: under `u1max=u2max=0` NoBulge and Mfe agree
    /// on every `(i1,i2,SeedE,len1,len2)` tuple.
    #[test]
    fn agrees_with_mfe_under_zero_unpaired() {
        use crate::SeedHandlerMfe;

        let s1 = RnaSequence::new("q", "GGGG").unwrap();
        let s2 = RnaSequence::new("t", "CCCC").unwrap();
        let c1 = AccessibilityConstraint::unconstrained(4, 0);
        let c2 = AccessibilityConstraint::unconstrained(4, 0);
        let a1 = Accessibility::new(&s1, 0, c1, AccessibilitySource::Disabled);
        let a2 = Accessibility::new(&s2, 0, c2, AccessibilitySource::Disabled);
        let energy = BasePairEnergyModel::new(&s1, &s2, &a1, &a2, -1.0, 1.0, usize::MAX, usize::MAX, 0, true);

        let mk_constraint = || SeedConstraint::new(2).unwrap().with_max_e(100.0).with_max_ed(100.0, 100.0);
        let mut nobulge = SeedHandlerNoBulge::new(&energy, mk_constraint());
        let mut mfe = SeedHandlerMfe::new(&energy, mk_constraint());

        for i1 in 0..3 {
            let bound_nb = nobulge.is_seed_bound(i1, i1);
            let bound_mfe = mfe.is_seed_bound(i1, i1);
            assert_eq!(bound_nb, bound_mfe);
            if bound_nb {
                assert_eq!(nobulge.get_seed_e(i1, i1), mfe.get_seed_e(i1, i1));
                assert_eq!(nobulge.get_seed_length1(i1, i1), mfe.get_seed_length1(i1, i1));
                assert_eq!(nobulge.get_seed_length2(i1, i1), mfe.get_seed_length2(i1, i1));
            }
        }
    }
}
