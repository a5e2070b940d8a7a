use hf_energy::EType;
use hf_structure::IndexRange;

use crate::{SeedConstraint, SeedHandler};

/// Forwards every query to an inner `SeedHandler` after adding a fixed
/// per-strand offset to input indices and subtracting it back out of
/// index-typed outputs, mirroring `InteractionEnergyIdxOffset` (§4.2).
pub struct SeedHandlerIdxOffset<H: SeedHandler> {
    inner: H,
    offset1: usize,
    offset2: usize,
}

impl<H: SeedHandler> SeedHandlerIdxOffset<H> {
    pub fn new(inner: H, offset1: usize, offset2: usize) -> Self {
        SeedHandlerIdxOffset { inner, offset1, offset2 }
    }

    pub fn inner(&self) -> &H { &self.inner }
}

impl<H: SeedHandler> SeedHandler for SeedHandlerIdxOffset<H> {
    fn constraint(&self) -> &SeedConstraint { self.inner.constraint() }

    fn is_seed_bound(&mut self, i1: usize, i2: usize) -> bool {
        self.inner.is_seed_bound(i1 + self.offset1, i2 + self.offset2)
    }

    fn get_seed_e(&mut self, i1: usize, i2: usize) -> EType {
        self.inner.get_seed_e(i1 + self.offset1, i2 + self.offset2)
    }

    fn get_seed_length1(&mut self, i1: usize, i2: usize) -> usize {
        self.inner.get_seed_length1(i1 + self.offset1, i2 + self.offset2)
    }

    fn get_seed_length2(&mut self, i1: usize, i2: usize) -> usize {
        self.inner.get_seed_length2(i1 + self.offset1, i2 + self.offset2)
    }

    fn trace_back_seed(&mut self, i1: usize, i2: usize) -> Vec<(usize, usize)> {
        self.inner.trace_back_seed(i1 + self.offset1, i2 + self.offset2)
            .into_iter()
            .map(|(a, b)| (a - self.offset1, b - self.offset2))
            .collect()
    }

    fn update_to_next_seed(&mut self, i1: usize, i2: usize, range1: &IndexRange, range2: &IndexRange) -> Option<(usize, usize)> {
        let shifted1 = IndexRange::new(range1.from + self.offset1, range1.to + self.offset1);
        let shifted2 = IndexRange::new(range2.from + self.offset2, range2.to + self.offset2);
        self.inner.update_to_next_seed(i1 + self.offset1, i2 + self.offset2, &shifted1, &shifted2)
            .map(|(a, b)| (a - self.offset1, b - self.offset2))
    }

    fn fill_seed(&mut self, range1: IndexRange, range2: IndexRange) -> usize {
        let shifted1 = IndexRange::new(range1.from + self.offset1, range1.to + self.offset1);
        let shifted2 = IndexRange::new(range2.from + self.offset2, range2.to + self.offset2);
        self.inner.fill_seed(shifted1, shifted2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SeedHandlerMfe;
    use hf_energy::{Accessibility, AccessibilitySource, BasePairEnergyModel};
    use hf_structure::{AccessibilityConstraint, RnaSequence};

    #[test]
    fn offset_shifts_indices_transparently() {
        let s1 = RnaSequence::new("q", "AGGG").unwrap();
        let s2 = RnaSequence::new("t", "ACCC").unwrap();
        let c1 = AccessibilityConstraint::unconstrained(4, 0);
        let c2 = AccessibilityConstraint::unconstrained(4, 0);
        let a1 = Accessibility::new(&s1, 0, c1, AccessibilitySource::Disabled);
        let a2 = Accessibility::new(&s2, 0, c2, AccessibilitySource::Disabled);
        let energy = BasePairEnergyModel::new(&s1, &s2, &a1, &a2, -1.0, 1.0, usize::MAX, usize::MAX, 0, true);
        let constraint = SeedConstraint::new(2).unwrap().with_max_e(100.0).with_max_ed(100.0, 100.0);
        let inner = SeedHandlerMfe::new(&energy, constraint);
        let mut wrapped = SeedHandlerIdxOffset::new(inner, 1, 1);

        assert!(wrapped.is_seed_bound(0, 0)); // inner (1,1) = G-C stack
        assert_eq!(wrapped.trace_back_seed(0, 0), vec![(0, 0)]);
    }
}
