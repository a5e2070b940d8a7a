use hf_structure::RnaSequence;

use crate::{AccessibilityLike, EType, NussinovHandler, E_INF};

/// An intermolecular base pair, identified by its 0-based position in
/// each strand.
pub type BasePair = (usize, usize);

/// Pure-functional scalar-query façade every predictor is built against.
/// Two implementers are mandatory: [`BasePairEnergyModel`] here, and a
/// Vienna-style nearest-neighbor backend (`crate::vienna`) treated as an
/// opaque, non-byte-exact delegate to an external fold library.
pub trait InteractionEnergy {
    fn size1(&self) -> usize;
    fn size2(&self) -> usize;

    fn are_complementary(&self, i1: usize, i2: usize) -> bool;
    fn is_gu(&self, i1: usize, i2: usize) -> bool;
    fn is_accessible1(&self, i: usize) -> bool;
    fn is_accessible2(&self, i: usize) -> bool;

    fn get_base_pair(&self, i1: usize, i2: usize) -> BasePair { (i1, i2) }
    fn get_index1(&self, bp: BasePair) -> usize { bp.0 }
    fn get_index2(&self, bp: BasePair) -> usize { bp.1 }

    fn e_init(&self) -> EType;
    fn e_inter_left(&self, i1: usize, k1: usize, i2: usize, k2: usize) -> EType;
    fn e_dangling_left(&self, i1: usize, i2: usize) -> EType;
    fn e_dangling_right(&self, j1: usize, j2: usize) -> EType;
    fn e_end_left(&self, i1: usize, i2: usize) -> EType;
    fn e_end_right(&self, j1: usize, j2: usize) -> EType;
    fn e_multi_unpaired(&self) -> EType;
    fn e_multi_helix(&self) -> EType;
    fn e_multi_closing(&self) -> EType;
    fn ed1(&self, i: usize, j: usize) -> EType;
    fn ed2(&self, i: usize, j: usize) -> EType;
    fn es1(&self, i: usize, j: usize) -> EType;
    fn es2(&self, i: usize, j: usize) -> EType;
    fn get_e_basepair(&self) -> EType;
    fn get_rt(&self) -> EType;

    fn get_boltzmann_weight(&self, e: EType) -> EType {
        if e >= E_INF {
            0.0
        } else {
            (-e / self.get_rt()).exp()
        }
    }

    /// `Ehybrid + ED1(i1,j1) + ED2(i2,j2) + endLeft + endRight + danglingLeft
    /// + danglingRight`; no `energyAdd` term in this core (the driver may
    /// layer one on top when reporting).
    fn get_e(&self, i1: usize, j1: usize, i2: usize, j2: usize, e_hybrid: EType) -> EType {
        if e_hybrid >= E_INF {
            return E_INF;
        }
        e_hybrid
            + self.ed1(i1, j1)
            + self.ed2(i2, j2)
            + self.e_end_left(i1, i2)
            + self.e_end_right(j1, j2)
            + self.e_dangling_left(i1, i2)
            + self.e_dangling_right(j1, j2)
    }
}

/// The constant-bonus-per-base-pair toy model: `Ebp < 0` per intermolecular
/// bp, no dangles/ends/multi-loop terms, `ES` delegated to a per-strand
/// [`NussinovHandler`] partition function.
pub struct BasePairEnergyModel<'s> {
    seq1: &'s RnaSequence,
    seq2: &'s RnaSequence,
    acc1: &'s dyn AccessibilityLike,
    acc2: &'s dyn AccessibilityLike,
    e_bp: EType,
    rt: EType,
    max_il1: usize,
    max_il2: usize,
    min_loop_len: usize,
    allow_gu: bool,
}

impl<'s> BasePairEnergyModel<'s> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        seq1: &'s RnaSequence,
        seq2: &'s RnaSequence,
        acc1: &'s dyn AccessibilityLike,
        acc2: &'s dyn AccessibilityLike,
        e_bp: EType,
        rt: EType,
        max_il1: usize,
        max_il2: usize,
        min_loop_len: usize,
        allow_gu: bool,
    ) -> Self {
        BasePairEnergyModel { seq1, seq2, acc1, acc2, e_bp, rt, max_il1, max_il2, min_loop_len, allow_gu }
    }
}

impl InteractionEnergy for BasePairEnergyModel<'_> {
    fn size1(&self) -> usize { self.seq1.size() }
    fn size2(&self) -> usize { self.seq2.size() }

    fn are_complementary(&self, i1: usize, i2: usize) -> bool {
        self.seq1.are_complementary(self.seq2, i1, i2)
    }

    fn is_gu(&self, i1: usize, i2: usize) -> bool {
        self.seq1.is_gu(self.seq2, i1, i2)
    }

    fn is_accessible1(&self, i: usize) -> bool { self.acc1.is_accessible(i) }
    fn is_accessible2(&self, i: usize) -> bool { self.acc2.is_accessible(i) }

    fn e_init(&self) -> EType { self.e_bp }

    fn e_inter_left(&self, i1: usize, k1: usize, i2: usize, k2: usize) -> EType {
        if !(i1 < k1 && i2 < k2) {
            return E_INF;
        }
        let loop1 = k1 - i1 - 1;
        let loop2 = k2 - i2 - 1;
        if loop1 > self.max_il1 || loop2 > self.max_il2 {
            return E_INF;
        }
        if !self.are_complementary(k1, k2) {
            return E_INF;
        }
        if !self.allow_gu && self.is_gu(k1, k2) {
            return E_INF;
        }
        self.e_bp
    }

    fn e_dangling_left(&self, _i1: usize, _i2: usize) -> EType { 0.0 }
    fn e_dangling_right(&self, _j1: usize, _j2: usize) -> EType { 0.0 }
    fn e_end_left(&self, _i1: usize, _i2: usize) -> EType { 0.0 }
    fn e_end_right(&self, _j1: usize, _j2: usize) -> EType { 0.0 }
    fn e_multi_unpaired(&self) -> EType { 0.0 }
    fn e_multi_helix(&self) -> EType { 0.0 }
    fn e_multi_closing(&self) -> EType { 0.0 }

    fn ed1(&self, i: usize, j: usize) -> EType { self.acc1.get_ed(i, j) }
    fn ed2(&self, i: usize, j: usize) -> EType { self.acc2.get_ed(i, j) }

    fn es1(&self, i: usize, j: usize) -> EType {
        if i > j { return 0.0; }
        let mut h = NussinovHandler::new(self.seq1, self.e_bp.exp_ln_weight(self.rt), self.min_loop_len);
        let q = h.get_q(i, j);
        if q <= 0.0 { E_INF } else { -self.rt * q.ln() }
    }

    fn es2(&self, i: usize, j: usize) -> EType {
        if i > j { return 0.0; }
        let mut h = NussinovHandler::new(self.seq2, self.e_bp.exp_ln_weight(self.rt), self.min_loop_len);
        let q = h.get_q(i, j);
        if q <= 0.0 { E_INF } else { -self.rt * q.ln() }
    }

    fn get_e_basepair(&self) -> EType { self.e_bp }
    fn get_rt(&self) -> EType { self.rt }
}

/// Converts a per-bp energy to the Boltzmann weight `NussinovHandler`
/// expects as its `basePairWeight` parameter.
trait ExpLnWeight {
    fn exp_ln_weight(&self, rt: EType) -> EType;
}

impl ExpLnWeight for EType {
    fn exp_ln_weight(&self, rt: EType) -> EType {
        (-self / rt).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Accessibility, AccessibilitySource};
    use hf_structure::AccessibilityConstraint;

    fn model<'s>(seq1: &'s RnaSequence, seq2: &'s RnaSequence, acc1: &'s Accessibility<'s>, acc2: &'s Accessibility<'s>) -> BasePairEnergyModel<'s> {
        BasePairEnergyModel::new(seq1, seq2, acc1, acc2, -1.0, 1.0, usize::MAX, usize::MAX, 3, true)
    }

    #[test]
    fn single_bp_energy_is_e_init() {
        let s1 = RnaSequence::new("q", "GG").unwrap();
        let s2 = RnaSequence::new("t", "CC").unwrap();
        let c1 = AccessibilityConstraint::unconstrained(2, 0);
        let c2 = AccessibilityConstraint::unconstrained(2, 0);
        let a1 = Accessibility::new(&s1, 0, c1, AccessibilitySource::Disabled);
        let a2 = Accessibility::new(&s2, 0, c2, AccessibilitySource::Disabled);
        let m = model(&s1, &s2, &a1, &a2);
        assert_eq!(m.e_init(), -1.0);
    }

    #[test]
    fn e_inter_left_rejects_non_ascending_or_noncomplementary() {
        let s1 = RnaSequence::new("q", "GG").unwrap();
        let s2 = RnaSequence::new("t", "CC").unwrap();
        let c1 = AccessibilityConstraint::unconstrained(2, 0);
        let c2 = AccessibilityConstraint::unconstrained(2, 0);
        let a1 = Accessibility::new(&s1, 0, c1, AccessibilitySource::Disabled);
        let a2 = Accessibility::new(&s2, 0, c2, AccessibilitySource::Disabled);
        let m = model(&s1, &s2, &a1, &a2);
        assert_eq!(m.e_inter_left(1, 0, 0, 1), E_INF);
        assert_eq!(m.e_inter_left(0, 1, 0, 1), -1.0);
    }

    #[test]
    fn boltzmann_weight_of_infinity_is_zero() {
        let s1 = RnaSequence::new("q", "GG").unwrap();
        let s2 = RnaSequence::new("t", "CC").unwrap();
        let c1 = AccessibilityConstraint::unconstrained(2, 0);
        let c2 = AccessibilityConstraint::unconstrained(2, 0);
        let a1 = Accessibility::new(&s1, 0, c1, AccessibilitySource::Disabled);
        let a2 = Accessibility::new(&s2, 0, c2, AccessibilitySource::Disabled);
        let m = model(&s1, &s2, &a1, &a2);
        assert_eq!(m.get_boltzmann_weight(E_INF), 0.0);
    }
}
