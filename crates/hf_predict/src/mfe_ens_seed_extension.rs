use rustc_hash::FxHashMap;

use hf_energy::{EType, InteractionEnergy, E_INF};
use hf_interaction::Interaction;
use hf_seed::SeedHandler;
use hf_structure::{IndexRange, RnaSequence};

use crate::{check_range, OutputHandler, PredictError, PredictionTracker};

type Key = (usize, usize);

/// Ensemble predictor that requires exactly one seed somewhere along the
/// interaction and sums over every admissible extension to either side
/// (§4.10 `MfeEns2dSeedExtension`). For an anchor seed spanning
/// `(si1,si2)..(sj1,sj2)` it builds two one-sided partition tables --
/// `zLeft` walking outward from `(si1,si2)` and `zRight` walking outward
/// from `(sj1,sj2)` -- and combines every `(left, right)` pair with the
/// seed's own hybridization weight. Mirrors
/// `PredictorMfeEns2dSeedExtension::fillHybridZ_left/fillHybridZ_right`.
///
/// When `heuristic` is set, `zRight` keeps only its single
/// minimum-energy extension per left cell instead of the full table,
/// matching `PredictorMfeEns2dHeuristicSeedExtension`'s linear-time
/// trade-off.
pub struct MfeEns2dSeedExtension<'s, 'e, 'h, E: InteractionEnergy, S: SeedHandler> {
    seq1: &'s RnaSequence,
    seq2: &'s RnaSequence,
    energy: &'e E,
    seed: &'h mut S,
    heuristic: bool,
    zall: EType,
}

impl<'s, 'e, 'h, E: InteractionEnergy, S: SeedHandler> MfeEns2dSeedExtension<'s, 'e, 'h, E, S> {
    pub fn new(seq1: &'s RnaSequence, seq2: &'s RnaSequence, energy: &'e E, seed: &'h mut S, heuristic: bool) -> Self {
        MfeEns2dSeedExtension { seq1, seq2, energy, seed, heuristic, zall: 0.0 }
    }

    pub fn zall(&self) -> EType { self.zall }

    /// Partition table walking outward (decreasing indices) from the
    /// anchor seed's left bp `(si1,si2)`, bounded below by `range1.from,
    /// range2.from`. `z[(si1,si2)] = w(E_init)`; every other cell sums
    /// single-step and multi-step internal-loop continuations into the
    /// next cell closer to the anchor, same shape as `Mfe2d`'s `H` table
    /// but summed (`+=`) rather than minimized.
    ///
    /// Cells that are themselves a feasible seed bound whose seed body
    /// overlaps the anchor's are discounted: that cell's own seed
    /// weight is subtracted so the same structural decomposition is not
    /// double-counted once under this seed's extension and once under
    /// the other seed's own enumeration.
    fn fill_z_left(&mut self, si1: usize, si2: usize, sj1: usize, sj2: usize, from1: usize, from2: usize) -> FxHashMap<Key, EType> {
        let mut z: FxHashMap<Key, EType> = FxHashMap::default();
        for i1 in (from1..=si1).rev() {
            for i2 in (from2..=si2).rev() {
                if !self.energy.is_accessible1(i1) || !self.energy.is_accessible2(i2) || !self.energy.are_complementary(i1, i2) {
                    continue;
                }

                let mut cur = if i1 == si1 && i2 == si2 { 1.0 } else { 0.0 };

                if i1 < si1 && i2 < si2 {
                    if let Some(&zsi) = z.get(&(si1, si2)) {
                        let step = self.energy.e_inter_left(i1, si1, i2, si2);
                        if step < E_INF {
                            cur += self.energy.get_boltzmann_weight(step) * zsi;
                        }
                    }
                    for k1 in (i1 + 1)..si1 {
                        for k2 in (i2 + 1)..si2 {
                            if let Some(&zk) = z.get(&(k1, k2)) {
                                if zk == 0.0 {
                                    continue;
                                }
                                let step = self.energy.e_inter_left(i1, k1, i2, k2);
                                if step < E_INF {
                                    cur += self.energy.get_boltzmann_weight(step) * zk;
                                }
                            }
                        }
                    }

                    if cur > 0.0 && self.seed.is_seed_bound(i1, i2) {
                        let len1 = self.seed.get_seed_length1(i1, i2);
                        let len2 = self.seed.get_seed_length2(i1, i2);
                        let (r1, r2) = (i1 + len1 - 1, i2 + len2 - 1);
                        if self.seed.are_loop_overlapping(i1, r1, si1, sj1) && self.seed.are_loop_overlapping(i2, r2, si2, sj2) {
                            let seed_weight = self.energy.get_boltzmann_weight(self.seed.get_seed_e(i1, i2));
                            let continuation = if (r1, r2) == (si1, si2) { 1.0 } else { z.get(&(r1, r2)).copied().unwrap_or(0.0) };
                            let overlap = seed_weight * continuation;
                            cur = (cur - overlap).max(0.0);
                        }
                    }
                }

                z.insert((i1, i2), cur);
            }
        }
        z
    }

    /// Partition table walking outward (increasing indices) from the
    /// anchor seed's right bp `(sj1,sj2)`, bounded above by `range1.to,
    /// range2.to`. `z[(sj1,sj2)] = 1` (the seed's own right end adds
    /// nothing further); every other cell sums single-step and
    /// multi-step continuations from the previous cell closer to the
    /// anchor. No double-counting correction is needed here: the
    /// reference predictor only applies it while extending left, since
    /// `updateToNextSeed`'s column-major order visits overlapping seeds
    /// left-to-right.
    fn fill_z_right(&mut self, sj1: usize, sj2: usize, to1: usize, to2: usize) -> FxHashMap<Key, EType> {
        let mut z: FxHashMap<Key, EType> = FxHashMap::default();
        for j1 in sj1..=to1 {
            for j2 in sj2..=to2 {
                if !self.energy.is_accessible1(j1) || !self.energy.is_accessible2(j2) || !self.energy.are_complementary(j1, j2) {
                    continue;
                }

                let mut cur = if j1 == sj1 && j2 == sj2 { 1.0 } else { 0.0 };

                if j1 > sj1 && j2 > sj2 {
                    if let Some(&zsj) = z.get(&(sj1, sj2)) {
                        let step = self.energy.e_inter_left(sj1, j1, sj2, j2);
                        if step < E_INF {
                            cur += self.energy.get_boltzmann_weight(step) * zsj;
                        }
                    }
                    for k1 in (sj1 + 1)..j1 {
                        for k2 in (sj2 + 1)..j2 {
                            if let Some(&zk) = z.get(&(k1, k2)) {
                                if zk == 0.0 {
                                    continue;
                                }
                                let step = self.energy.e_inter_left(k1, j1, k2, j2);
                                if step < E_INF {
                                    cur += self.energy.get_boltzmann_weight(step) * zk;
                                }
                            }
                        }
                    }
                }

                z.insert((j1, j2), cur);
            }
        }
        z
    }

    /// Fills the ensemble partition function over every seed found in
    /// `range1 x range2`, reporting the dominant component's boundary
    /// (leftmost/rightmost bp of its best `(left,right)` extension) as
    /// the mfe interaction.
    pub fn predict(
        &mut self,
        range1: IndexRange,
        range2: IndexRange,
        output: &mut dyn OutputHandler<'s>,
        mut tracker: Option<&mut dyn PredictionTracker>,
    ) -> Result<(), PredictError> {
        check_range(range1, range2, self.energy.size1(), self.energy.size2())?;

        self.zall = 0.0;
        let found = self.seed.fill_seed(range1, range2);
        if found == 0 {
            let mut empty = Interaction::new(self.seq1, self.seq2);
            empty.energy = 0.0;
            output.add(empty);
            if let Some(t) = tracker.as_deref_mut() {
                t.finalize(0.0);
            }
            return Ok(());
        }

        let mut best: Option<(EType, Key, Key)> = None;

        for si2 in range2.from..=range2.to {
            for si1 in range1.from..=range1.to {
                if !self.seed.is_seed_bound(si1, si2) {
                    continue;
                }
                let len1 = self.seed.get_seed_length1(si1, si2);
                let len2 = self.seed.get_seed_length2(si1, si2);
                let (sj1, sj2) = (si1 + len1 - 1, si2 + len2 - 1);
                if sj1 > range1.to || sj2 > range2.to {
                    continue;
                }
                // `e_init` is the helix-initiation penalty and is incurred exactly
                // once per interaction regardless of how far either side extends,
                // so it is folded into the seed's own weight rather than into
                // either extension table's base case.
                let seed_weight = self.energy.get_boltzmann_weight(self.seed.get_seed_e(si1, si2) + self.energy.e_init());
                if seed_weight <= 0.0 {
                    continue;
                }

                let z_left = self.fill_z_left(si1, si2, sj1, sj2, range1.from, range2.from);
                let mut z_right = self.fill_z_right(sj1, sj2, range1.to, range2.to);
                if self.heuristic {
                    z_right = self.argmin_right(&z_right);
                }

                for (&(i1, i2), &zl) in z_left.iter() {
                    if zl <= 0.0 {
                        continue;
                    }
                    for (&(j1, j2), &zr) in z_right.iter() {
                        if zr <= 0.0 {
                            continue;
                        }
                        let extra = self.energy.get_boltzmann_weight(self.energy.get_e(i1, j1, i2, j2, 0.0));
                        if extra <= 0.0 {
                            continue;
                        }
                        let contribution = zl * seed_weight * zr * extra;
                        if contribution <= 0.0 {
                            continue;
                        }
                        self.zall += contribution;

                        if let Some(t) = tracker.as_deref_mut() {
                            t.add_bp_weight(i1, i2, contribution);
                            if (i1, i2) != (si1, si2) {
                                t.add_bp_weight(si1, si2, contribution);
                            }
                            if (sj1, sj2) != (si1, si2) {
                                t.add_bp_weight(sj1, sj2, contribution);
                            }
                            if (j1, j2) != (sj1, sj2) {
                                t.add_bp_weight(j1, j2, contribution);
                            }
                        }

                        let candidate_e = -self.energy.get_rt() * contribution.ln();
                        if best.map_or(true, |(be, _, _)| candidate_e < be) {
                            best = Some((candidate_e, (i1, i2), (j1, j2)));
                        }
                    }
                }
            }
        }

        if let Some(t) = tracker.as_deref_mut() {
            t.finalize(self.zall);
        }

        match best {
            Some((e, left, right)) if e < 0.0 => {
                let mut interaction = Interaction::new(self.seq1, self.seq2);
                interaction.push_bp(left.0, left.1);
                if right != left {
                    interaction.push_bp(right.0, right.1);
                }
                interaction.energy = e;
                output.add(interaction);
            }
            _ => {
                let mut empty = Interaction::new(self.seq1, self.seq2);
                empty.energy = 0.0;
                output.add(empty);
            }
        }
        Ok(())
    }

    /// Collapses a right-extension table to its single minimum-energy
    /// cell only, the heuristic variant's linear-time trade-off.
    fn argmin_right(&self, z_right: &FxHashMap<Key, EType>) -> FxHashMap<Key, EType> {
        let mut best: Option<(Key, EType)> = None;
        for (&k, &z) in z_right.iter() {
            if z <= 0.0 {
                continue;
            }
            if best.map_or(true, |(_, bz)| z > bz) {
                best = Some((k, z));
            }
        }
        let mut out = FxHashMap::default();
        if let Some((k, z)) = best {
            out.insert(k, z);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hf_energy::{Accessibility, AccessibilitySource, BasePairEnergyModel};
    use hf_seed::{SeedConstraint, SeedHandlerMfe};
    use hf_structure::AccessibilityConstraint;

    fn setup(s1: &str, s2: &str) -> (RnaSequence, RnaSequence) {
        (RnaSequence::new("q", s1).unwrap(), RnaSequence::new("t", s2).unwrap())
    }

    /// Scenario S4: a seed spanning the whole duplex leaves no room for
    /// extension on either side, so the ensemble collapses to exactly
    /// the seed itself: `Zall = w(seed_e)` and the boundary bp are the
    /// sequence's own first/last positions.
    #[test]
    fn full_length_seed_leaves_no_extension_room() {
        let (s1, s2) = setup("GGG", "CCC");
        let c1 = AccessibilityConstraint::unconstrained(3, 0);
        let c2 = AccessibilityConstraint::unconstrained(3, 0);
        let a1 = Accessibility::new(&s1, 0, c1, AccessibilitySource::Disabled);
        let a2 = Accessibility::new(&s2, 0, c2, AccessibilitySource::Disabled);
        let energy = BasePairEnergyModel::new(&s1, &s2, &a1, &a2, -1.0, 1.0, usize::MAX, usize::MAX, 0, true);

        let seed_constraint = SeedConstraint::new(3).unwrap().with_max_e(100.0).with_max_ed(100.0, 100.0);
        let mut seed = SeedHandlerMfe::new(&energy, seed_constraint);
        let mut predictor = MfeEns2dSeedExtension::new(&s1, &s2, &energy, &mut seed, false);
        let mut out = crate::OutputHandlerInteractionList::new(1);

        predictor.predict(IndexRange::new(0, 2), IndexRange::new(0, 2), &mut out, None).unwrap();

        let expected = (-3.0_f64 / energy.get_rt()).exp();
        assert!((predictor.zall() - expected).abs() < 1e-6);
        let best = out.best().unwrap();
        assert!((best.energy - (-3.0)).abs() < 1e-6);
        assert_eq!(best.base_pairs(), &[(0, 0), (2, 2)]);
    }

    #[test]
    fn heuristic_variant_keeps_single_right_extension_per_left_cell() {
        let (s1, s2) = setup("GGGG", "CCCC");
        let c1 = AccessibilityConstraint::unconstrained(4, 0);
        let c2 = AccessibilityConstraint::unconstrained(4, 0);
        let a1 = Accessibility::new(&s1, 0, c1, AccessibilitySource::Disabled);
        let a2 = Accessibility::new(&s2, 0, c2, AccessibilitySource::Disabled);
        let energy = BasePairEnergyModel::new(&s1, &s2, &a1, &a2, -1.0, 1.0, usize::MAX, usize::MAX, 0, true);

        let seed_constraint = SeedConstraint::new(2).unwrap().with_max_e(100.0).with_max_ed(100.0, 100.0);
        let mut seed = SeedHandlerMfe::new(&energy, seed_constraint);
        let mut predictor = MfeEns2dSeedExtension::new(&s1, &s2, &energy, &mut seed, true);
        let mut out = crate::OutputHandlerInteractionList::new(1);

        predictor.predict(IndexRange::new(0, 3), IndexRange::new(0, 3), &mut out, None).unwrap();
        assert!(predictor.zall() > 0.0);
        assert!(out.best().unwrap().energy <= -2.0);
    }
}
