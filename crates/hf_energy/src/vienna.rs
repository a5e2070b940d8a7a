use hf_structure::{PairTypeRNA, RnaSequence};

use crate::{AccessibilityLike, BasePair, EType, InteractionEnergy, E_INF};

/// Simplified nearest-neighbor stacking table, indexed by the two
/// `PairTypeRNA` values of consecutive intermolecular base pairs. Not a
/// byte-exact port of the Vienna/Turner parameter tables -- this crate
/// treats the real thermodynamic back-end as an opaque, pluggable
/// collaborator (see the energy façade's purpose note) and only needs an
/// algebraically faithful stand-in to exercise the DP against.
#[derive(Clone, Debug)]
pub struct StackingTable {
    // indexed [PairTypeRNA as usize][PairTypeRNA as usize], kcal/mol at 37C
    stack: [[EType; 7]; 7],
    au_end_penalty: EType,
    duplex_init: EType,
}

impl Default for StackingTable {
    fn default() -> Self {
        use PairTypeRNA::*;
        let order = [CG, GC, AU, UA, GU, UG, NN];
        let base = [
            // CG    GC    AU    UA    GU    UG    NN
            [-3.26, -3.42, -2.11, -2.35, -1.41, -2.24, 0.0], // CG
            [-3.42, -3.26, -2.24, -2.11, -1.53, -1.41, 0.0], // GC
            [-2.11, -2.24, -1.10, -0.93, -0.55, -1.36, 0.0], // AU
            [-2.35, -2.11, -1.33, -0.93, -1.00, -0.90, 0.0], // UA
            [-1.41, -1.53, -1.36, -1.00, -0.50, -0.59, 0.0], // GU
            [-2.24, -1.41, -0.90, -1.00, -0.59, -0.50, 0.0], // UG
            [0.0; 7],
        ];
        let mut stack = [[0.0; 7]; 7];
        for (a, row) in order.iter().zip(base.iter()) {
            for (b, v) in order.iter().zip(row.iter()) {
                stack[*a as usize][*b as usize] = *v;
            }
        }
        StackingTable { stack, au_end_penalty: 0.45, duplex_init: 4.1 }
    }
}

impl StackingTable {
    fn stacking(&self, closing: PairTypeRNA, inner: PairTypeRNA) -> EType {
        self.stack[closing as usize][inner as usize]
    }

    /// Linear rescaling between the parameterization temperature (37C)
    /// and a target temperature, mirroring the teacher's
    /// `rescale_energy_to_temp` helper in shape (not in the exact
    /// enthalpy/entropy split Turner parameters use).
    fn rescale(&self, e: EType, temp_celsius: f64) -> EType {
        let t_ref = 310.15;
        let t = temp_celsius + 273.15;
        e * (t / t_ref)
    }
}

/// A Vienna-style nearest-neighbor energy model: stacking energies depend
/// on the pair type of consecutive intermolecular base pairs, with
/// AU/GU end penalties and a duplex-initiation constant.
pub struct ViennaEnergyModel<'s> {
    seq1: &'s RnaSequence,
    seq2: &'s RnaSequence,
    acc1: &'s dyn AccessibilityLike,
    acc2: &'s dyn AccessibilityLike,
    table: StackingTable,
    temperature: f64,
    rt: EType,
    max_il1: usize,
    max_il2: usize,
    allow_gu: bool,
}

impl<'s> ViennaEnergyModel<'s> {
    pub fn new(
        seq1: &'s RnaSequence,
        seq2: &'s RnaSequence,
        acc1: &'s dyn AccessibilityLike,
        acc2: &'s dyn AccessibilityLike,
        temperature: f64,
        max_il1: usize,
        max_il2: usize,
        allow_gu: bool,
    ) -> Self {
        let rt = 0.0019872041 * (temperature + 273.15); // kcal/mol
        ViennaEnergyModel {
            seq1, seq2, acc1, acc2,
            table: StackingTable::default(),
            temperature, rt, max_il1, max_il2, allow_gu,
        }
    }

    fn pair_type(&self, i1: usize, i2: usize) -> PairTypeRNA {
        PairTypeRNA::from((self.seq1.base_at(i1), self.seq2.base_at(i2)))
    }

    fn end_penalty(&self, pt: PairTypeRNA) -> EType {
        if matches!(pt, PairTypeRNA::AU | PairTypeRNA::UA | PairTypeRNA::GU | PairTypeRNA::UG) {
            self.table.rescale(self.table.au_end_penalty, self.temperature)
        } else {
            0.0
        }
    }
}

impl InteractionEnergy for ViennaEnergyModel<'_> {
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

    fn get_base_pair(&self, i1: usize, i2: usize) -> BasePair { (i1, i2) }
    fn get_index1(&self, bp: BasePair) -> usize { bp.0 }
    fn get_index2(&self, bp: BasePair) -> usize { bp.1 }

    fn e_init(&self) -> EType { self.table.rescale(self.table.duplex_init, self.temperature) }

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
        let inner_pt = self.pair_type(k1, k2);
        if !self.allow_gu && inner_pt.is_wobble() {
            return E_INF;
        }
        let closing_pt = self.pair_type(i1, i2);
        let stack = self.table.rescale(self.table.stacking(closing_pt, inner_pt), self.temperature);
        if loop1 == 0 && loop2 == 0 {
            stack
        } else {
            // unbonded internal-loop/bulge penalty, linear in total gap size.
            stack + 0.3 * (loop1 + loop2) as EType
        }
    }

    fn e_dangling_left(&self, _i1: usize, _i2: usize) -> EType { 0.0 }
    fn e_dangling_right(&self, _j1: usize, _j2: usize) -> EType { 0.0 }

    fn e_end_left(&self, i1: usize, i2: usize) -> EType { self.end_penalty(self.pair_type(i1, i2)) }
    fn e_end_right(&self, j1: usize, j2: usize) -> EType { self.end_penalty(self.pair_type(j1, j2)) }

    fn e_multi_unpaired(&self) -> EType { 0.0 }
    fn e_multi_helix(&self) -> EType { 0.4 }
    fn e_multi_closing(&self) -> EType { 3.4 }

    fn ed1(&self, i: usize, j: usize) -> EType { self.acc1.get_ed(i, j) }
    fn ed2(&self, i: usize, j: usize) -> EType { self.acc2.get_ed(i, j) }

    fn es1(&self, _i: usize, _j: usize) -> EType { 0.0 }
    fn es2(&self, _i: usize, _j: usize) -> EType { 0.0 }

    fn get_e_basepair(&self) -> EType { self.table.stacking(PairTypeRNA::CG, PairTypeRNA::CG) }
    fn get_rt(&self) -> EType { self.rt }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Accessibility, AccessibilitySource};
    use hf_structure::AccessibilityConstraint;

    #[test]
    fn stacking_energy_is_negative_for_helix_forming_pairs() {
        let table = StackingTable::default();
        assert!(table.stacking(PairTypeRNA::CG, PairTypeRNA::GC) < 0.0);
    }

    #[test]
    fn e_inter_left_applies_bulge_penalty() {
        let s1 = RnaSequence::new("q", "GGAGG").unwrap();
        let s2 = RnaSequence::new("t", "CCACC").unwrap();
        let c1 = AccessibilityConstraint::unconstrained(5, 0);
        let c2 = AccessibilityConstraint::unconstrained(5, 0);
        let a1 = Accessibility::new(&s1, 0, c1, AccessibilitySource::Disabled);
        let a2 = Accessibility::new(&s2, 0, c2, AccessibilitySource::Disabled);
        let m = ViennaEnergyModel::new(&s1, &s2, &a1, &a2, 37.0, 3, 3, true);
        let stacked = m.e_inter_left(0, 1, 0, 1);
        let bulged = m.e_inter_left(0, 2, 0, 2);
        assert!(bulged > stacked);
    }
}
