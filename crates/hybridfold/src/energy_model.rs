use hf_energy::{BasePairEnergyModel, EType, InteractionEnergy, ViennaEnergyModel};

/// Sum-typed energy-model selector (REDESIGN FLAGS: "model as sum-typed
/// variants ... switch once at construction"). The driver picks one
/// variant from its CLI flags; every predictor is generic over
/// `InteractionEnergy` and neither knows nor cares which.
pub enum EnergyModelKind<'s> {
    BasePair(BasePairEnergyModel<'s>),
    Vienna(ViennaEnergyModel<'s>),
}

macro_rules! dispatch {
    ($self:ident, $call:ident($($arg:expr),*)) => {
        match $self {
            EnergyModelKind::BasePair(m) => m.$call($($arg),*),
            EnergyModelKind::Vienna(m) => m.$call($($arg),*),
        }
    };
}

impl InteractionEnergy for EnergyModelKind<'_> {
    fn size1(&self) -> usize { dispatch!(self, size1()) }
    fn size2(&self) -> usize { dispatch!(self, size2()) }

    fn are_complementary(&self, i1: usize, i2: usize) -> bool { dispatch!(self, are_complementary(i1, i2)) }
    fn is_gu(&self, i1: usize, i2: usize) -> bool { dispatch!(self, is_gu(i1, i2)) }
    fn is_accessible1(&self, i: usize) -> bool { dispatch!(self, is_accessible1(i)) }
    fn is_accessible2(&self, i: usize) -> bool { dispatch!(self, is_accessible2(i)) }

    fn e_init(&self) -> EType { dispatch!(self, e_init()) }
    fn e_inter_left(&self, i1: usize, k1: usize, i2: usize, k2: usize) -> EType {
        dispatch!(self, e_inter_left(i1, k1, i2, k2))
    }
    fn e_dangling_left(&self, i1: usize, i2: usize) -> EType { dispatch!(self, e_dangling_left(i1, i2)) }
    fn e_dangling_right(&self, j1: usize, j2: usize) -> EType { dispatch!(self, e_dangling_right(j1, j2)) }
    fn e_end_left(&self, i1: usize, i2: usize) -> EType { dispatch!(self, e_end_left(i1, i2)) }
    fn e_end_right(&self, j1: usize, j2: usize) -> EType { dispatch!(self, e_end_right(j1, j2)) }
    fn e_multi_unpaired(&self) -> EType { dispatch!(self, e_multi_unpaired()) }
    fn e_multi_helix(&self) -> EType { dispatch!(self, e_multi_helix()) }
    fn e_multi_closing(&self) -> EType { dispatch!(self, e_multi_closing()) }
    fn ed1(&self, i: usize, j: usize) -> EType { dispatch!(self, ed1(i, j)) }
    fn ed2(&self, i: usize, j: usize) -> EType { dispatch!(self, ed2(i, j)) }
    fn es1(&self, i: usize, j: usize) -> EType { dispatch!(self, es1(i, j)) }
    fn es2(&self, i: usize, j: usize) -> EType { dispatch!(self, es2(i, j)) }
    fn get_e_basepair(&self) -> EType { dispatch!(self, get_e_basepair()) }
    fn get_rt(&self) -> EType { dispatch!(self, get_rt()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hf_energy::{Accessibility, AccessibilitySource};
    use hf_structure::{AccessibilityConstraint, RnaSequence};

    #[test]
    fn base_pair_variant_dispatches() {
        let s1 = RnaSequence::new("q", "GG").unwrap();
        let s2 = RnaSequence::new("t", "CC").unwrap();
        let c1 = AccessibilityConstraint::unconstrained(2, 0);
        let c2 = AccessibilityConstraint::unconstrained(2, 0);
        let a1 = Accessibility::new(&s1, 0, c1, AccessibilitySource::Disabled);
        let a2 = Accessibility::new(&s2, 0, c2, AccessibilitySource::Disabled);
        let model = EnergyModelKind::BasePair(BasePairEnergyModel::new(&s1, &s2, &a1, &a2, -1.0, 1.0, usize::MAX, usize::MAX, 0, true));
        assert_eq!(model.e_init(), -1.0);
        assert_eq!(model.size1(), 2);
    }
}
