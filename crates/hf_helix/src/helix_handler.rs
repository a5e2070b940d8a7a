use rustc_hash::FxHashMap;

use hf_energy::{EType, InteractionEnergy, E_INF};
use hf_seed::SeedHandler;
use hf_structure::IndexRange;

use crate::HelixConstraint;

/// Common contract of every helix enumerator (§4.5), shaped like
/// `SeedHandler` but without the fixed bp-count requirement: helices
/// range over `[min_bp, max_bp]` and may contain internal loops up to
/// `helixConstraint.maxIL` in total size.
pub trait HelixHandler {
    fn constraint(&self) -> &HelixConstraint;

    /// Precomputes the best (lowest-energy) helix starting at every
    /// left-bp within `range1 x range2`; returns the count found.
    fn fill_helix(&mut self, range1: IndexRange, range2: IndexRange) -> usize;

    fn get_helix_e(&mut self, i1: usize, i2: usize) -> EType;
    fn get_helix_length1(&mut self, i1: usize, i2: usize) -> usize;
    fn get_helix_length2(&mut self, i1: usize, i2: usize) -> usize;

    /// All base pairs of the best helix at `(i1,i2)`, strand-1-ascending,
    /// including both endpoints.
    fn trace_back_helix(&mut self, i1: usize, i2: usize) -> Vec<(usize, usize)>;
}

type HKey = (usize, usize, usize); // i1, i2, bp count

/// DP over `H[i1,i2,bp]` = minimum hybridization energy of a helix
/// left-bound at `(i1,i2)` with exactly `bp` stacked/bulged base pairs,
/// analogous in shape to `SeedHandlerMfe`'s 5-D table but with the
/// per-step internal-loop gap bounded only by the helix's total `maxIL`
/// rather than a fixed `(u1,u2)` pair.
pub struct HelixHandlerMfe<'e, E: InteractionEnergy> {
    energy: &'e E,
    constraint: HelixConstraint,
    memo: FxHashMap<HKey, EType>,
    best: FxHashMap<(usize, usize), (EType, usize)>, // energy, bp count
}

impl<'e, E: InteractionEnergy> HelixHandlerMfe<'e, E> {
    pub fn new(energy: &'e E, constraint: HelixConstraint) -> Self {
        HelixHandlerMfe { energy, constraint, memo: FxHashMap::default(), best: FxHashMap::default() }
    }

    pub fn energy(&self) -> &'e E { self.energy }

    fn h(&mut self, i1: usize, i2: usize, bp: usize) -> EType {
        if bp == 1 {
            return 0.0;
        }
        let key = (i1, i2, bp);
        if let Some(&v) = self.memo.get(&key) {
            return v;
        }
        let value = self.compute_h(i1, i2, bp);
        self.memo.insert(key, value);
        value
    }

    fn compute_h(&mut self, i1: usize, i2: usize, bp: usize) -> EType {
        let max_il = self.constraint.max_il;
        let mut best = E_INF;
        for g1 in 0..=max_il {
            for g2 in 0..=(max_il - g1) {
                let k1 = i1 + 1 + g1;
                let k2 = i2 + 1 + g2;
                if k1 >= self.energy.size1() || k2 >= self.energy.size2() {
                    continue;
                }
                let step = self.energy.e_inter_left(i1, k1, i2, k2);
                if step >= E_INF {
                    continue;
                }
                let rest = self.h(k1, k2, bp - 1);
                if rest >= E_INF {
                    continue;
                }
                best = best.min(step + rest);
            }
        }
        best
    }

    /// Best (energy, bp count) over `[min_bp, max_bp]` at `(i1,i2)`,
    /// `None` if `(i1,i2)` is not itself a feasible base pair or no
    /// admissible helix of any length exists.
    fn ensure(&mut self, i1: usize, i2: usize) -> Option<(EType, usize)> {
        if let Some(&v) = self.best.get(&(i1, i2)) {
            return Some(v);
        }
        if i1 >= self.energy.size1() || i2 >= self.energy.size2() || !self.energy.are_complementary(i1, i2) {
            return None;
        }
        let mut best: Option<(EType, usize)> = None;
        for bp in self.constraint.min_bp..=self.constraint.max_bp {
            let e = self.h(i1, i2, bp);
            if e >= E_INF {
                continue;
            }
            if best.map_or(true, |(be, _)| e < be) {
                best = Some((e, bp));
            }
        }
        if let Some(v) = best {
            self.best.insert((i1, i2), v);
        }
        best
    }
}

impl<'e, E: InteractionEnergy> HelixHandler for HelixHandlerMfe<'e, E> {
    fn constraint(&self) -> &HelixConstraint { &self.constraint }

    fn fill_helix(&mut self, range1: IndexRange, range2: IndexRange) -> usize {
        let mut count = 0;
        for i1 in range1.from..=range1.to {
            for i2 in range2.from..=range2.to {
                if self.ensure(i1, i2).is_some() {
                    count += 1;
                }
            }
        }
        count
    }

    fn get_helix_e(&mut self, i1: usize, i2: usize) -> EType {
        self.ensure(i1, i2).map_or(E_INF, |(e, _)| e)
    }

    fn get_helix_length1(&mut self, i1: usize, i2: usize) -> usize {
        self.trace_back_helix(i1, i2).last().map_or(0, |&(j1, _)| j1 - i1 + 1)
    }

    fn get_helix_length2(&mut self, i1: usize, i2: usize) -> usize {
        self.trace_back_helix(i1, i2).last().map_or(0, |&(_, j2)| j2 - i2 + 1)
    }

    fn trace_back_helix(&mut self, i1: usize, i2: usize) -> Vec<(usize, usize)> {
        let Some((_, bp_total)) = self.ensure(i1, i2) else {
            return Vec::new();
        };
        let mut result = vec![(i1, i2)];
        let mut cur = (i1, i2);
        let mut bp_left = bp_total;
        let max_il = self.constraint.max_il;
        while bp_left > 1 {
            let target = self.h(cur.0, cur.1, bp_left);
            let mut step = None;
            'search: for g1 in 0..=max_il {
                for g2 in 0..=(max_il - g1) {
                    let k1 = cur.0 + 1 + g1;
                    let k2 = cur.1 + 1 + g2;
                    if k1 >= self.energy.size1() || k2 >= self.energy.size2() {
                        continue;
                    }
                    let e = self.energy.e_inter_left(cur.0, k1, cur.1, k2);
                    if e >= E_INF {
                        continue;
                    }
                    let rest = self.h(k1, k2, bp_left - 1);
                    if rest >= E_INF {
                        continue;
                    }
                    if (e + rest - target).abs() < 1e-9 {
                        step = Some((k1, k2));
                        break 'search;
                    }
                }
            }
            cur = step.expect("helix traceback inconsistent with DP table");
            result.push(cur);
            bp_left -= 1;
        }
        result
    }
}

/// Composes a helix with a mandatory embedded seed: the helix's left
/// part (up to the seed's right bp) is replaced by the seed's own
/// energy, and the remainder is the plain helix DP continuing from
/// there (§4.5 `fillHelixSeed`/`getHelixSeedE`).
pub struct HelixHandlerMfeSeed<'e, 'h, E: InteractionEnergy, S: SeedHandler> {
    helix: HelixHandlerMfe<'e, E>,
    seed: &'h mut S,
}

impl<'e, 'h, E: InteractionEnergy, S: SeedHandler> HelixHandlerMfeSeed<'e, 'h, E, S> {
    pub fn new(helix: HelixHandlerMfe<'e, E>, seed: &'h mut S) -> Self {
        HelixHandlerMfeSeed { helix, seed }
    }

    /// `(energy, helix-bp-count)` for the best helix at `(i1,i2)` that
    /// contains a seed left-bound at the same position, `None` if no
    /// seed starts there or no helix extends it far enough.
    fn ensure_seeded(&mut self, i1: usize, i2: usize) -> Option<(EType, usize)> {
        if !self.seed.is_seed_bound(i1, i2) {
            return None;
        }
        let seed_e = self.seed.get_seed_e(i1, i2);
        let len1 = self.seed.get_seed_length1(i1, i2);
        let len2 = self.seed.get_seed_length2(i1, i2);
        let (right1, right2) = (i1 + len1 - 1, i2 + len2 - 1);
        let seed_bp_count = self.seed.trace_back_seed(i1, i2).len() + 1; // inner bp + rightmost
        let mut best: Option<(EType, usize)> = None;
        for extra_bp in 0..=(self.helix.constraint.max_bp.saturating_sub(seed_bp_count)) {
            let total_bp = seed_bp_count + extra_bp;
            if total_bp < self.helix.constraint.min_bp {
                continue;
            }
            let tail = if extra_bp == 0 { 0.0 } else { self.helix.h(right1, right2, extra_bp + 1) };
            if tail >= E_INF {
                continue;
            }
            let e = seed_e + tail;
            if best.map_or(true, |(be, _)| e < be) {
                best = Some((e, total_bp));
            }
        }
        best
    }

    pub fn fill_helix_seed(&mut self, range1: IndexRange, range2: IndexRange) -> usize {
        let mut count = 0;
        for i1 in range1.from..=range1.to {
            for i2 in range2.from..=range2.to {
                if self.ensure_seeded(i1, i2).is_some() {
                    count += 1;
                }
            }
        }
        count
    }

    pub fn get_helix_seed_e(&mut self, i1: usize, i2: usize) -> EType {
        self.ensure_seeded(i1, i2).map_or(E_INF, |(e, _)| e)
    }

    pub fn get_helix_seed_length1(&mut self, i1: usize, i2: usize) -> usize {
        self.trace_back_helix_seed(i1, i2).last().map_or(0, |&(j1, _)| j1 - i1 + 1)
    }

    pub fn get_helix_seed_length2(&mut self, i1: usize, i2: usize) -> usize {
        self.trace_back_helix_seed(i1, i2).last().map_or(0, |&(_, j2)| j2 - i2 + 1)
    }

    pub fn trace_back_helix_seed(&mut self, i1: usize, i2: usize) -> Vec<(usize, usize)> {
        if self.ensure_seeded(i1, i2).is_none() {
            return Vec::new();
        }
        let mut bps = self.seed.trace_back_seed(i1, i2);
        let len1 = self.seed.get_seed_length1(i1, i2);
        let len2 = self.seed.get_seed_length2(i1, i2);
        let right = (i1 + len1 - 1, i2 + len2 - 1);
        bps.push(right);
        let (_, total_bp) = self.ensure_seeded(i1, i2).unwrap();
        let seed_bp_count = bps.len();
        if total_bp > seed_bp_count {
            // `right` itself counts as bp 1 of the continuation table entry.
            let extra_bp = total_bp - seed_bp_count + 1;
            let tail = self.helix.trace_back_helix_at(right.0, right.1, extra_bp);
            bps.extend(tail.into_iter().skip(1));
        }
        bps
    }
}

impl<'e, E: InteractionEnergy> HelixHandlerMfe<'e, E> {
    /// Like `trace_back_helix`, but for an explicitly chosen bp count
    /// rather than the handler's own lowest-energy pick -- needed when
    /// a caller (the seed-composed variant) already fixed the count.
    fn trace_back_helix_at(&mut self, i1: usize, i2: usize, bp_total: usize) -> Vec<(usize, usize)> {
        let mut result = vec![(i1, i2)];
        let mut cur = (i1, i2);
        let mut bp_left = bp_total;
        let max_il = self.constraint.max_il;
        while bp_left > 1 {
            let target = self.h(cur.0, cur.1, bp_left);
            let mut step = None;
            'search: for g1 in 0..=max_il {
                for g2 in 0..=(max_il - g1) {
                    let k1 = cur.0 + 1 + g1;
                    let k2 = cur.1 + 1 + g2;
                    if k1 >= self.energy.size1() || k2 >= self.energy.size2() {
                        continue;
                    }
                    let e = self.energy.e_inter_left(cur.0, k1, cur.1, k2);
                    if e >= E_INF {
                        continue;
                    }
                    let rest = self.h(k1, k2, bp_left - 1);
                    if rest >= E_INF {
                        continue;
                    }
                    if (e + rest - target).abs() < 1e-9 {
                        step = Some((k1, k2));
                        break 'search;
                    }
                }
            }
            cur = step.expect("helix traceback inconsistent with DP table");
            result.push(cur);
            bp_left -= 1;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hf_energy::{Accessibility, AccessibilitySource, BasePairEnergyModel};
    use hf_seed::{SeedConstraint, SeedHandlerMfe};
    use hf_structure::{AccessibilityConstraint, RnaSequence};

    #[test]
    fn finds_a_maximal_stacked_helix() {
        let s1 = RnaSequence::new("q", "GGGG").unwrap();
        let s2 = RnaSequence::new("t", "CCCC").unwrap();
        let c1 = AccessibilityConstraint::unconstrained(4, 0);
        let c2 = AccessibilityConstraint::unconstrained(4, 0);
        let a1 = Accessibility::new(&s1, 0, c1, AccessibilitySource::Disabled);
        let a2 = Accessibility::new(&s2, 0, c2, AccessibilitySource::Disabled);
        let energy = BasePairEnergyModel::new(&s1, &s2, &a1, &a2, -1.0, 1.0, usize::MAX, usize::MAX, 0, true);
        let constraint = HelixConstraint::new(2, 4, 0);
        let mut handler = HelixHandlerMfe::new(&energy, constraint);

        assert_eq!(handler.get_helix_e(0, 0), -3.0); // best: all 4 bp stacked, 3 steps
        assert_eq!(handler.get_helix_length1(0, 0), 4);
        let bps = handler.trace_back_helix(0, 0);
        assert_eq!(bps, vec![(0, 0), (1, 1), (2, 2), (3, 3)]);
    }

    #[test]
    fn seeded_helix_extends_past_the_seed() {
        let s1 = RnaSequence::new("q", "GGGG").unwrap();
        let s2 = RnaSequence::new("t", "CCCC").unwrap();
        let c1 = AccessibilityConstraint::unconstrained(4, 0);
        let c2 = AccessibilityConstraint::unconstrained(4, 0);
        let a1 = Accessibility::new(&s1, 0, c1, AccessibilitySource::Disabled);
        let a2 = Accessibility::new(&s2, 0, c2, AccessibilitySource::Disabled);
        let energy = BasePairEnergyModel::new(&s1, &s2, &a1, &a2, -1.0, 1.0, usize::MAX, usize::MAX, 0, true);

        let seed_constraint = SeedConstraint::new(2).unwrap().with_max_e(100.0).with_max_ed(100.0, 100.0);
        let mut seed = SeedHandlerMfe::new(&energy, seed_constraint);

        let helix_constraint = HelixConstraint::new(2, 4, 0).with_embedded_seed(true);
        let helix = HelixHandlerMfe::new(&energy, helix_constraint);
        let mut composed = HelixHandlerMfeSeed::new(helix, &mut seed);

        assert!(composed.get_helix_seed_e(0, 0) <= -3.0 + 1e-9);
        let bps = composed.trace_back_helix_seed(0, 0);
        assert_eq!(bps.first(), Some(&(0, 0)));
    }
}
