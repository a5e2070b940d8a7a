use rustc_hash::FxHashMap;

use hf_energy::{EType, InteractionEnergy, E_INF};
use hf_interaction::{Interaction, SeedAnnotation};
use hf_seed::SeedHandler;
use hf_structure::IndexRange;

use crate::{check_range, Mfe2d, OutputHandler, PredictError, ReportOverlap, ReportedSites};

type Key = (usize, usize);

#[derive(Clone, Copy, Debug)]
enum HsNext {
    /// A seed starts here; its right bp is `right`, after which the
    /// (unseeded) `Mfe2d` table continues.
    SeedHere { right: Key },
    /// No seed here yet; extend to `Hs` at the given cell.
    Split(Key),
}

/// Mandatory-seed mfe predictor (§4.8). Wraps an unseeded `Mfe2d` (used
/// for both the base `H` table and the post-seed continuation) and adds
/// a second table `Hs[i1,i2]`: the best hybridization energy of a chain
/// left-bound at `(i1,i2)` that contains at least one seed somewhere
/// along it.
pub struct Mfe2dSeed<'s, 'e, 'h, E: InteractionEnergy, S: SeedHandler> {
    mfe: Mfe2d<'s, 'e, E>,
    seed: &'h mut S,
    hs: FxHashMap<Key, EType>,
    hs_next: FxHashMap<Key, Option<HsNext>>,
    sites: ReportedSites,
}

impl<'s, 'e, 'h, E: InteractionEnergy, S: SeedHandler> Mfe2dSeed<'s, 'e, 'h, E, S> {
    pub fn new(mfe: Mfe2d<'s, 'e, E>, seed: &'h mut S) -> Self {
        Mfe2dSeed { mfe, seed, hs: FxHashMap::default(), hs_next: FxHashMap::default(), sites: ReportedSites::new() }
    }

    fn hs(&mut self, i1: usize, i2: usize) -> EType {
        if let Some(&v) = self.hs.get(&(i1, i2)) {
            return v;
        }
        let (value, choice) = self.compute_hs(i1, i2);
        self.hs.insert((i1, i2), value);
        self.hs_next.insert((i1, i2), choice);
        value
    }

    fn compute_hs(&mut self, i1: usize, i2: usize) -> (EType, Option<HsNext>) {
        let energy = self.mfe.energy();
        if i1 >= energy.size1() || i2 >= energy.size2() || !energy.are_complementary(i1, i2) {
            return (E_INF, None);
        }

        let mut best = E_INF;
        let mut best_next = None;

        if self.seed.is_seed_bound(i1, i2) {
            let seed_e = self.seed.get_seed_e(i1, i2);
            let len1 = self.seed.get_seed_length1(i1, i2);
            let len2 = self.seed.get_seed_length2(i1, i2);
            let right = (i1 + len1 - 1, i2 + len2 - 1);
            if right.0 < energy.size1() && right.1 < energy.size2() {
                let rest = self.mfe.h(right.0, right.1);
                if rest < E_INF {
                    let candidate = seed_e + rest;
                    if candidate < best {
                        best = candidate;
                        best_next = Some(HsNext::SeedHere { right });
                    }
                }
            }
        }

        let size1 = energy.size1();
        let size2 = energy.size2();
        for k1 in (i1 + 1)..size1 {
            for k2 in (i2 + 1)..size2 {
                let step = self.mfe.energy().e_inter_left(i1, k1, i2, k2);
                if step >= E_INF {
                    continue;
                }
                let rest = self.hs(k1, k2);
                if rest >= E_INF {
                    continue;
                }
                let candidate = step + rest;
                if candidate < best {
                    best = candidate;
                    best_next = Some(HsNext::Split((k1, k2)));
                }
            }
        }
        (best, best_next)
    }

    fn trace(&mut self, i1: usize, i2: usize) -> Vec<Key> {
        match self.hs_next.get(&(i1, i2)).copied().flatten() {
            Some(HsNext::SeedHere { right }) => {
                let mut bps = self.seed.trace_back_seed(i1, i2);
                bps.push(right);
                let tail = self.mfe.trace_back_from(right.0, right.1);
                bps.extend(tail.into_iter().skip(1));
                bps
            }
            Some(HsNext::Split(next)) => {
                let mut bps = vec![(i1, i2)];
                bps.extend(self.trace(next.0, next.1));
                bps
            }
            None => vec![(i1, i2)],
        }
    }

    /// `(left_bp, right_bp, energy)` of the seed embedded in the chain
    /// starting at `(i1,i2)`, found by walking the same `hs_next` path
    /// `trace` follows.
    fn embedded_seed(&mut self, i1: usize, i2: usize) -> Option<SeedAnnotation> {
        let mut cur = (i1, i2);
        loop {
            match self.hs_next.get(&cur).copied().flatten()? {
                HsNext::SeedHere { right } => {
                    let energy = self.seed.get_seed_e(cur.0, cur.1);
                    return Some(SeedAnnotation { left_bp: cur, right_bp: right, energy });
                }
                HsNext::Split(next) => cur = next,
            }
        }
    }

    fn total_energy(&mut self, i1: usize, i2: usize) -> EType {
        let hs = self.hs(i1, i2);
        if hs >= E_INF {
            return E_INF;
        }
        let bps = self.trace(i1, i2);
        let &(j1, j2) = bps.last().unwrap();
        self.mfe.energy().get_e(i1, j1, i2, j2, hs)
    }

    fn build_interaction(&mut self, i1: usize, i2: usize) -> Interaction<'s> {
        let bps = self.trace(i1, i2);
        let seed = self.embedded_seed(i1, i2);
        let total = self.total_energy(i1, i2);
        let mut interaction = Interaction::new(self.mfe.seq1(), self.mfe.seq2());
        for (a, b) in bps {
            interaction.push_bp(a, b);
        }
        interaction.energy = total;
        if let Some(s) = seed {
            interaction.add_seed(s);
        }
        interaction
    }

    pub fn predict(
        &mut self,
        range1: IndexRange,
        range2: IndexRange,
        report_max: usize,
        overlap: ReportOverlap,
        output: &mut dyn OutputHandler<'s>,
    ) -> Result<(), PredictError> {
        check_range(range1, range2, self.mfe.energy().size1(), self.mfe.energy().size2())?;
        if report_max > 1 && overlap != ReportOverlap::Both {
            return Err(PredictError::NotImplemented("exact predictor sub-optimal enumeration outside OVERLAP_BOTH".into()));
        }

        let mut candidates: Vec<(EType, Key)> = Vec::new();
        for i1 in range1.from..=range1.to {
            for i2 in range2.from..=range2.to {
                let total = self.total_energy(i1, i2);
                if total < E_INF {
                    candidates.push((total, (i1, i2)));
                }
            }
        }
        candidates.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut reported = 0;
        for (_, (i1, i2)) in candidates {
            if reported >= report_max {
                break;
            }
            let interaction = self.build_interaction(i1, i2);
            if overlap == ReportOverlap::Neither {
                let range: hf_interaction::InteractionRange = (&interaction).into();
                if self.sites.overlaps(&range.r1, &range.r2) {
                    continue;
                }
                self.sites.record(range.r1, range.r2);
            }
            output.add(interaction);
            reported += 1;
        }
        Ok(())
    }

    pub fn mfe(&mut self, range1: IndexRange, range2: IndexRange) -> Result<Option<Interaction<'s>>, PredictError> {
        check_range(range1, range2, self.mfe.energy().size1(), self.mfe.energy().size2())?;
        let mut best: Option<(EType, Key)> = None;
        for i1 in range1.from..=range1.to {
            for i2 in range2.from..=range2.to {
                let total = self.total_energy(i1, i2);
                if total < E_INF && best.map_or(true, |(be, _)| total < be) {
                    best = Some((total, (i1, i2)));
                }
            }
        }
        Ok(best.map(|(_, (i1, i2))| self.build_interaction(i1, i2)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hf_energy::{Accessibility, AccessibilitySource, BasePairEnergyModel};
    use hf_seed::{SeedConstraint, SeedHandlerMfe};
    use hf_structure::{AccessibilityConstraint, RnaSequence};

    #[test]
    fn requires_and_embeds_a_seed() {
        let s1 = RnaSequence::new("q", "GGGG").unwrap();
        let s2 = RnaSequence::new("t", "CCCC").unwrap();
        let c1 = AccessibilityConstraint::unconstrained(4, 0);
        let c2 = AccessibilityConstraint::unconstrained(4, 0);
        let a1 = Accessibility::new(&s1, 0, c1, AccessibilitySource::Disabled);
        let a2 = Accessibility::new(&s2, 0, c2, AccessibilitySource::Disabled);
        let energy = BasePairEnergyModel::new(&s1, &s2, &a1, &a2, -1.0, 1.0, usize::MAX, usize::MAX, 0, true);

        let seed_constraint = SeedConstraint::new(2).unwrap().with_max_e(100.0).with_max_ed(100.0, 100.0);
        let mut seed = SeedHandlerMfe::new(&energy, seed_constraint);

        let mfe = Mfe2d::new(&s1, &s2, &energy, false);
        let mut predictor = Mfe2dSeed::new(mfe, &mut seed);

        let best = predictor.mfe(IndexRange::new(0, 3), IndexRange::new(0, 3)).unwrap().unwrap();
        assert_eq!(best.energy, -4.0);
        assert_eq!(best.seeds.len(), 1);
    }
}
