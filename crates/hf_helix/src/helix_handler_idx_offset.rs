use hf_energy::EType;
use hf_structure::IndexRange;

use crate::{HelixConstraint, HelixHandler};

/// Forwards every query to an inner `HelixHandler` after adding a fixed
/// per-strand offset to input indices and subtracting it back out of
/// index-typed outputs, mirroring `SeedHandlerIdxOffset` / §4.2.
pub struct HelixHandlerIdxOffset<H: HelixHandler> {
    inner: H,
    offset1: usize,
    offset2: usize,
}

impl<H: HelixHandler> HelixHandlerIdxOffset<H> {
    pub fn new(inner: H, offset1: usize, offset2: usize) -> Self {
        HelixHandlerIdxOffset { inner, offset1, offset2 }
    }
}

impl<H: HelixHandler> HelixHandler for HelixHandlerIdxOffset<H> {
    fn constraint(&self) -> &HelixConstraint { self.inner.constraint() }

    fn fill_helix(&mut self, range1: IndexRange, range2: IndexRange) -> usize {
        let shifted1 = IndexRange::new(range1.from + self.offset1, range1.to + self.offset1);
        let shifted2 = IndexRange::new(range2.from + self.offset2, range2.to + self.offset2);
        self.inner.fill_helix(shifted1, shifted2)
    }

    fn get_helix_e(&mut self, i1: usize, i2: usize) -> EType {
        self.inner.get_helix_e(i1 + self.offset1, i2 + self.offset2)
    }

    fn get_helix_length1(&mut self, i1: usize, i2: usize) -> usize {
        self.inner.get_helix_length1(i1 + self.offset1, i2 + self.offset2)
    }

    fn get_helix_length2(&mut self, i1: usize, i2: usize) -> usize {
        self.inner.get_helix_length2(i1 + self.offset1, i2 + self.offset2)
    }

    fn trace_back_helix(&mut self, i1: usize, i2: usize) -> Vec<(usize, usize)> {
        self.inner.trace_back_helix(i1 + self.offset1, i2 + self.offset2)
            .into_iter()
            .map(|(a, b)| (a - self.offset1, b - self.offset2))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HelixHandlerMfe;
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
        let inner = HelixHandlerMfe::new(&energy, HelixConstraint::new(2, 3, 0));
        let mut wrapped = HelixHandlerIdxOffset::new(inner, 1, 1);

        assert_eq!(wrapped.get_helix_length1(0, 0), 3);
        assert_eq!(wrapped.trace_back_helix(0, 0), vec![(0, 0), (1, 1), (2, 2)]);
    }
}
