use hf_energy::{EType, InteractionEnergy};
use hf_structure::IndexRange;

use crate::SeedConstraint;

/// A seed located inside a reported interaction: its leftmost and
/// rightmost base pair and its seed-only hybridization energy. Kept
/// free of `hf_interaction::SeedAnnotation` so this crate stays
/// independent of the reported-interaction type; `hf_predict` converts
/// between the two when it glues seeds onto an `Interaction`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeedMatch {
    pub left_bp: (usize, usize),
    pub right_bp: (usize, usize),
    pub energy: EType,
}

/// Common contract of every seed sub-interaction enumerator (§4.4).
/// Implementors own their own memoization; all operations take `&mut
/// self` since a predictor holds its seed handler uniquely.
pub trait SeedHandler {
    fn constraint(&self) -> &SeedConstraint;

    /// True iff `(i1,i2)` is a feasible seed left-bp under this
    /// handler's constraint (feasibility plus "a seed actually starts
    /// here and satisfies `maxE`").
    fn is_seed_bound(&mut self, i1: usize, i2: usize) -> bool;

    /// Hybridization-only energy of the seed starting at `(i1,i2)`,
    /// excluding `E_init` and the right-most bp's contribution to the
    /// internal loop that continues past the seed.
    fn get_seed_e(&mut self, i1: usize, i2: usize) -> EType;

    fn get_seed_length1(&mut self, i1: usize, i2: usize) -> usize;
    fn get_seed_length2(&mut self, i1: usize, i2: usize) -> usize;

    /// The seed's rightmost base pair, `(i1 + len1 - 1, i2 + len2 - 1)`.
    fn get_seed_right_bp(&mut self, i1: usize, i2: usize) -> (usize, usize) {
        let len1 = self.get_seed_length1(i1, i2);
        let len2 = self.get_seed_length2(i1, i2);
        (i1 + len1 - 1, i2 + len2 - 1)
    }

    /// All inner base pairs of the seed starting at `(i1,i2)`, in
    /// strand-1-ascending order, *excluding* the rightmost bp.
    fn trace_back_seed(&mut self, i1: usize, i2: usize) -> Vec<(usize, usize)>;

    /// Next feasible seed left-end strictly after `(i1,i2)`, scanning
    /// in column-major order (strand 1 fastest) within `range1 x
    /// range2`. `None` once the ranges are exhausted.
    fn update_to_next_seed(&mut self, i1: usize, i2: usize, range1: &IndexRange, range2: &IndexRange) -> Option<(usize, usize)>;

    /// Precomputes every feasible seed left-bp within the given ranges;
    /// returns the count found.
    fn fill_seed(&mut self, range1: IndexRange, range2: IndexRange) -> usize;

    /// Scans a base-pair list (strand-1-ascending) for seeds fully
    /// contained in it, returning a match per seed found.
    fn find_seeds(&mut self, base_pairs: &[(usize, usize)]) -> Vec<SeedMatch> {
        let mut found = Vec::new();
        for &(i1, i2) in base_pairs {
            if self.is_seed_bound(i1, i2) {
                let right = self.get_seed_right_bp(i1, i2);
                if base_pairs.contains(&right) {
                    found.push(SeedMatch { left_bp: (i1, i2), right_bp: right, energy: self.get_seed_e(i1, i2) });
                }
            }
        }
        found
    }

    /// Whether the loop regions `[i,j]` and `[k,l]` (on the same
    /// strand) overlap -- used to detect two seeds sharing territory.
    fn are_loop_overlapping(&self, i: usize, j: usize, k: usize, l: usize) -> bool {
        i.max(k) <= j.min(l)
    }
}

/// Shared feasibility check every `SeedHandler` impl applies to a
/// candidate left-bp before considering it further: both positions
/// accessible, complementary, within any configured per-strand window,
/// GU-end rule honored, and per-position ED within `maxED`.
pub fn is_seed_feasible<E: InteractionEnergy>(energy: &E, constraint: &SeedConstraint, i1: usize, i2: usize) -> bool {
    if i1 >= energy.size1() || i2 >= energy.size2() {
        return false;
    }
    if let Some(r) = &constraint.range1 {
        if !r.covers(i1) {
            return false;
        }
    }
    if let Some(r) = &constraint.range2 {
        if !r.covers(i2) {
            return false;
        }
    }
    if !energy.is_accessible1(i1) || !energy.is_accessible2(i2) {
        return false;
    }
    if !energy.are_complementary(i1, i2) {
        return false;
    }
    if !constraint.allow_gu_end && energy.is_gu(i1, i2) {
        return false;
    }
    if energy.ed1(i1, i1) > constraint.max_ed1 || energy.ed2(i2, i2) > constraint.max_ed2 {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy;
    impl SeedHandler for Dummy {
        fn constraint(&self) -> &SeedConstraint { unimplemented!() }
        fn is_seed_bound(&mut self, _i1: usize, _i2: usize) -> bool { unimplemented!() }
        fn get_seed_e(&mut self, _i1: usize, _i2: usize) -> EType { unimplemented!() }
        fn get_seed_length1(&mut self, _i1: usize, _i2: usize) -> usize { 1 }
        fn get_seed_length2(&mut self, _i1: usize, _i2: usize) -> usize { 1 }
        fn trace_back_seed(&mut self, _i1: usize, _i2: usize) -> Vec<(usize, usize)> { vec![] }
        fn update_to_next_seed(&mut self, _i1: usize, _i2: usize, _r1: &IndexRange, _r2: &IndexRange) -> Option<(usize, usize)> { None }
        fn fill_seed(&mut self, _r1: IndexRange, _r2: IndexRange) -> usize { 0 }
    }

    #[test]
    fn default_loop_overlap_is_interval_intersection() {
        let d = Dummy;
        assert!(d.are_loop_overlapping(1, 5, 4, 8));
        assert!(!d.are_loop_overlapping(1, 3, 4, 8));
    }
}
