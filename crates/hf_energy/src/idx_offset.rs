use crate::{BasePair, EType, InteractionEnergy};

/// Forwards every query to an inner `InteractionEnergy` after adding a
/// fixed per-strand offset to input indices and subtracting it back out
/// of index-typed outputs, so inner DP code stays offset-oblivious. Used
/// by local-window predictors.
pub struct InteractionEnergyIdxOffset<E: InteractionEnergy> {
    inner: E,
    offset1: usize,
    offset2: usize,
}

impl<E: InteractionEnergy> InteractionEnergyIdxOffset<E> {
    pub fn new(inner: E, offset1: usize, offset2: usize) -> Self {
        assert!(offset1 < inner.size1(), "offset1 out of range");
        assert!(offset2 < inner.size2(), "offset2 out of range");
        InteractionEnergyIdxOffset { inner, offset1, offset2 }
    }

    pub fn offset1(&self) -> usize { self.offset1 }
    pub fn offset2(&self) -> usize { self.offset2 }
    pub fn inner(&self) -> &E { &self.inner }
}

impl<E: InteractionEnergy> InteractionEnergy for InteractionEnergyIdxOffset<E> {
    fn size1(&self) -> usize { self.inner.size1() - self.offset1 }
    fn size2(&self) -> usize { self.inner.size2() - self.offset2 }

    fn are_complementary(&self, i1: usize, i2: usize) -> bool {
        self.inner.are_complementary(i1 + self.offset1, i2 + self.offset2)
    }

    fn is_gu(&self, i1: usize, i2: usize) -> bool {
        self.inner.is_gu(i1 + self.offset1, i2 + self.offset2)
    }

    fn is_accessible1(&self, i: usize) -> bool { self.inner.is_accessible1(i + self.offset1) }
    fn is_accessible2(&self, i: usize) -> bool { self.inner.is_accessible2(i + self.offset2) }

    fn get_base_pair(&self, i1: usize, i2: usize) -> BasePair {
        self.inner.get_base_pair(i1 + self.offset1, i2 + self.offset2)
    }
    fn get_index1(&self, bp: BasePair) -> usize { self.inner.get_index1(bp) - self.offset1 }
    fn get_index2(&self, bp: BasePair) -> usize { self.inner.get_index2(bp) - self.offset2 }

    fn e_init(&self) -> EType { self.inner.e_init() }

    fn e_inter_left(&self, i1: usize, k1: usize, i2: usize, k2: usize) -> EType {
        self.inner.e_inter_left(i1 + self.offset1, k1 + self.offset1, i2 + self.offset2, k2 + self.offset2)
    }

    fn e_dangling_left(&self, i1: usize, i2: usize) -> EType {
        self.inner.e_dangling_left(i1 + self.offset1, i2 + self.offset2)
    }
    fn e_dangling_right(&self, j1: usize, j2: usize) -> EType {
        self.inner.e_dangling_right(j1 + self.offset1, j2 + self.offset2)
    }
    fn e_end_left(&self, i1: usize, i2: usize) -> EType {
        self.inner.e_end_left(i1 + self.offset1, i2 + self.offset2)
    }
    fn e_end_right(&self, j1: usize, j2: usize) -> EType {
        self.inner.e_end_right(j1 + self.offset1, j2 + self.offset2)
    }
    fn e_multi_unpaired(&self) -> EType { self.inner.e_multi_unpaired() }
    fn e_multi_helix(&self) -> EType { self.inner.e_multi_helix() }
    fn e_multi_closing(&self) -> EType { self.inner.e_multi_closing() }

    fn ed1(&self, i: usize, j: usize) -> EType { self.inner.ed1(i + self.offset1, j + self.offset1) }
    fn ed2(&self, i: usize, j: usize) -> EType { self.inner.ed2(i + self.offset2, j + self.offset2) }
    fn es1(&self, i: usize, j: usize) -> EType { self.inner.es1(i + self.offset1, j + self.offset1) }
    fn es2(&self, i: usize, j: usize) -> EType { self.inner.es2(i + self.offset2, j + self.offset2) }

    fn get_e_basepair(&self) -> EType { self.inner.get_e_basepair() }
    fn get_rt(&self) -> EType { self.inner.get_rt() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Accessibility, AccessibilitySource, BasePairEnergyModel};
    use hf_structure::{AccessibilityConstraint, RnaSequence};

    #[test]
    fn offset_shifts_indices_transparently() {
        let s1 = RnaSequence::new("q", "AGGG").unwrap();
        let s2 = RnaSequence::new("t", "ACCC").unwrap();
        let c1 = AccessibilityConstraint::unconstrained(4, 0);
        let c2 = AccessibilityConstraint::unconstrained(4, 0);
        let a1 = Accessibility::new(&s1, 0, c1, AccessibilitySource::Disabled);
        let a2 = Accessibility::new(&s2, 0, c2, AccessibilitySource::Disabled);
        let base = BasePairEnergyModel::new(&s1, &s2, &a1, &a2, -1.0, 1.0, usize::MAX, usize::MAX, 3, true);
        let wrapped = InteractionEnergyIdxOffset::new(base, 1, 1);

        assert_eq!(wrapped.size1(), 3);
        assert_eq!(wrapped.size2(), 3);
        assert!(wrapped.are_complementary(0, 0)); // inner (1,1) = G-C
    }
}
