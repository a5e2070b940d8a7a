use hf_structure::{AccessibilityConstraint, RnaSequence};

use crate::{EType, NussinovHandler, E_INF};

pub trait AccessibilityLike {
    fn size(&self) -> usize;
    fn get_ed(&self, i: usize, j: usize) -> EType;
    fn is_accessible(&self, i: usize) -> bool;
}

/// Sum-typed back-end selector, replacing the deep Accessibility
/// inheritance hierarchy the energy model used to carry: pick the variant
/// once at construction, dispatch on it from then on.
pub enum AccessibilitySource {
    /// No accessibility penalty anywhere (still honors blocked positions).
    Disabled,
    /// ED derived from the lightweight Nussinov base-pair model.
    BasePair { base_pair_weight: EType, rt: EType, min_loop_len: usize },
}

/// Owns a sequence reference, a length cap and a constraint; the
/// `ReverseAccessibility` wrapper below exposes the same contract with
/// indices read back-to-front, without duplicating the ED computation.
pub struct Accessibility<'s> {
    seq: &'s RnaSequence,
    max_length: usize,
    constraint: AccessibilityConstraint,
    source: AccessibilitySource,
}

impl<'s> Accessibility<'s> {
    pub fn new(seq: &'s RnaSequence, max_length: usize, constraint: AccessibilityConstraint, source: AccessibilitySource) -> Self {
        Accessibility { seq, max_length, constraint, source }
    }

    pub fn sequence(&self) -> &'s RnaSequence { self.seq }
    pub fn constraint(&self) -> &AccessibilityConstraint { &self.constraint }
}

impl AccessibilityLike for Accessibility<'_> {
    fn size(&self) -> usize { self.seq.size() }

    fn get_ed(&self, i: usize, j: usize) -> EType {
        assert!(i <= j && j < self.size(), "getED requires 0 <= i <= j < size()");
        let len = j - i + 1;
        let cap = if self.max_length == 0 { self.size() } else { self.max_length };
        if len > cap {
            return E_INF;
        }
        for p in i..=j {
            if self.constraint.is_marked_blocked(p) {
                return E_INF;
            }
        }
        match &self.source {
            AccessibilitySource::Disabled => 0.0,
            AccessibilitySource::BasePair { base_pair_weight, rt, min_loop_len } => {
                let mut handler = NussinovHandler::new(self.seq, *base_pair_weight, *min_loop_len);
                let pu = handler.get_pu(i, j);
                if pu <= 0.0 {
                    E_INF
                } else {
                    -rt * pu.ln()
                }
            }
        }
    }

    fn is_accessible(&self, i: usize) -> bool {
        self.constraint.is_accessible(i)
    }
}

/// Wraps another `AccessibilityLike` so that position `i` of the view
/// corresponds to position `size-1-i` of the wrapped instance.
pub struct ReverseAccessibility<'a, A: AccessibilityLike> {
    inner: &'a A,
}

impl<'a, A: AccessibilityLike> ReverseAccessibility<'a, A> {
    pub fn new(inner: &'a A) -> Self {
        ReverseAccessibility { inner }
    }

    pub fn inner(&self) -> &'a A { self.inner }
}

impl<'a, A: AccessibilityLike> AccessibilityLike for ReverseAccessibility<'a, A> {
    fn size(&self) -> usize { self.inner.size() }

    fn get_ed(&self, i: usize, j: usize) -> EType {
        let n = self.size();
        self.inner.get_ed(n - 1 - j, n - 1 - i)
    }

    fn is_accessible(&self, i: usize) -> bool {
        let n = self.size();
        self.inner.is_accessible(n - 1 - i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hf_structure::AccessibilityConstraint;

    #[test]
    fn disabled_source_has_zero_ed_unless_blocked() {
        let seq = RnaSequence::new("q", "GGGGCCCC").unwrap();
        let constraint = AccessibilityConstraint::parse("xxxbbbxx", 0).unwrap();
        let acc = Accessibility::new(&seq, 0, constraint, AccessibilitySource::Disabled);
        assert_eq!(acc.get_ed(0, 1), 0.0);
        assert_eq!(acc.get_ed(3, 4), E_INF); // overlaps blocked [3-5]
    }

    #[test]
    fn max_length_cap_is_enforced() {
        let seq = RnaSequence::new("q", "GGGGCCCC").unwrap();
        let constraint = AccessibilityConstraint::unconstrained(8, 0);
        let acc = Accessibility::new(&seq, 3, constraint, AccessibilitySource::Disabled);
        assert_eq!(acc.get_ed(0, 1), 0.0);
        assert_eq!(acc.get_ed(0, 3), E_INF); // length 4 > cap 3
    }

    #[test]
    fn reverse_accessibility_is_involutive() {
        let seq = RnaSequence::new("q", "GGGGCCCC").unwrap();
        let constraint = AccessibilityConstraint::unconstrained(8, 0);
        let acc = Accessibility::new(&seq, 0, constraint, AccessibilitySource::Disabled);
        let rev = ReverseAccessibility::new(&acc);
        let rev_rev = ReverseAccessibility::new(&rev);
        for i in 0..acc.size() {
            for j in i..acc.size() {
                assert_eq!(rev_rev.get_ed(i, j), acc.get_ed(i, j));
            }
        }
    }
}
