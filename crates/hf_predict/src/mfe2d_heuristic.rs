use rustc_hash::FxHashMap;

use hf_energy::{EType, InteractionEnergy, E_INF};
use hf_interaction::Interaction;
use hf_seed::SeedHandler;
use hf_structure::IndexRange;

use crate::{check_range, OutputHandler, PredictError, ReportOverlap, ReportedSites};

type Key = (usize, usize);

#[derive(Clone, Copy, Debug)]
struct Cell {
    hyb: EType,
    terminal: Key,
    total: EType,
}

/// O(n²)-time heuristic mfe predictor (§4.9). Unlike `Mfe2d`, which keeps
/// every completion of a left bp and lets the aggregate total-energy
/// comparison happen only at reporting time, this predictor keeps a
/// *single* best right extension per left bp, chosen by total energy
/// (including `ED`/end/dangle) rather than hybridization energy alone --
/// since only one chain survives per cell, the choice has to account for
/// the terminal-dependent aggregate up front or a cheaper-hybridization
/// completion with a much worse `ED` could be kept by mistake.
pub struct Mfe2dHeuristic<'s, 'e, E: InteractionEnergy> {
    seq1: &'s hf_structure::RnaSequence,
    seq2: &'s hf_structure::RnaSequence,
    energy: &'e E,
    no_lp: bool,
    cells: FxHashMap<Key, Cell>,
    next: FxHashMap<Key, Option<Key>>,
    sites: ReportedSites,
}

impl<'s, 'e, E: InteractionEnergy> Mfe2dHeuristic<'s, 'e, E> {
    pub fn new(seq1: &'s hf_structure::RnaSequence, seq2: &'s hf_structure::RnaSequence, energy: &'e E, no_lp: bool) -> Self {
        Mfe2dHeuristic { seq1, seq2, energy, no_lp, cells: FxHashMap::default(), next: FxHashMap::default(), sites: ReportedSites::new() }
    }

    pub fn energy(&self) -> &'e E { self.energy }

    fn lp_ok(&self, i1: usize, i2: usize) -> bool {
        if !self.no_lp {
            return true;
        }
        let (k1, k2) = (i1 + 1, i2 + 1);
        k1 < self.energy.size1() && k2 < self.energy.size2() && self.energy.are_complementary(k1, k2)
    }

    pub(crate) fn cell(&mut self, i1: usize, i2: usize) -> Cell {
        if let Some(&c) = self.cells.get(&(i1, i2)) {
            return c;
        }
        let c = self.compute_cell(i1, i2);
        self.cells.insert((i1, i2), c);
        c
    }

    fn compute_cell(&mut self, i1: usize, i2: usize) -> Cell {
        if i1 >= self.energy.size1() || i2 >= self.energy.size2()
            || !self.energy.is_accessible1(i1) || !self.energy.is_accessible2(i2)
            || !self.energy.are_complementary(i1, i2)
        {
            self.next.insert((i1, i2), None);
            return Cell { hyb: E_INF, terminal: (i1, i2), total: E_INF };
        }

        let mut best = if self.lp_ok(i1, i2) {
            let hyb = self.energy.e_init();
            Cell { hyb, terminal: (i1, i2), total: self.energy.get_e(i1, i1, i2, i2, hyb) }
        } else {
            Cell { hyb: E_INF, terminal: (i1, i2), total: E_INF }
        };
        let mut best_next = None;

        for k1 in (i1 + 1)..self.energy.size1() {
            for k2 in (i2 + 1)..self.energy.size2() {
                let step = self.energy.e_inter_left(i1, k1, i2, k2);
                if step >= E_INF {
                    continue;
                }
                let sub = self.cell(k1, k2);
                if sub.hyb >= E_INF {
                    continue;
                }
                let candidate_hyb = step + sub.hyb;
                let (j1, j2) = sub.terminal;
                let candidate_total = self.energy.get_e(i1, j1, i2, j2, candidate_hyb);
                if candidate_total < best.total {
                    best = Cell { hyb: candidate_hyb, terminal: sub.terminal, total: candidate_total };
                    best_next = Some((k1, k2));
                }
            }
        }
        self.next.insert((i1, i2), best_next);
        best
    }

    fn trace(&mut self, i1: usize, i2: usize) -> Vec<Key> {
        let mut bps = vec![(i1, i2)];
        let mut cur = (i1, i2);
        while let Some(Some(nxt)) = self.next.get(&cur).copied() {
            bps.push(nxt);
            cur = nxt;
        }
        bps
    }

    fn build_interaction(&mut self, i1: usize, i2: usize) -> Interaction<'s> {
        let total = self.cell(i1, i2).total;
        let bps = self.trace(i1, i2);
        let mut interaction = Interaction::new(self.seq1, self.seq2);
        for (a, b) in bps {
            interaction.push_bp(a, b);
        }
        interaction.energy = total;
        interaction
    }

    /// Reports up to `report_max` left-bp cells, lowest total energy
    /// first, honoring `overlap` (§4.12: heuristic variants always
    /// support strict non-overlap).
    pub fn predict(
        &mut self,
        range1: IndexRange,
        range2: IndexRange,
        report_max: usize,
        overlap: ReportOverlap,
        output: &mut dyn OutputHandler<'s>,
    ) -> Result<(), PredictError> {
        check_range(range1, range2, self.energy.size1(), self.energy.size2())?;

        let mut candidates: Vec<(EType, Key)> = Vec::new();
        for i1 in range1.from..=range1.to {
            for i2 in range2.from..=range2.to {
                let total = self.cell(i1, i2).total;
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
        check_range(range1, range2, self.energy.size1(), self.energy.size2())?;
        let mut best: Option<(EType, Key)> = None;
        for i1 in range1.from..=range1.to {
            for i2 in range2.from..=range2.to {
                let total = self.cell(i1, i2).total;
                if total < E_INF && best.map_or(true, |(be, _)| total < be) {
                    best = Some((total, (i1, i2)));
                }
            }
        }
        Ok(best.map(|(_, (i1, i2))| self.build_interaction(i1, i2)))
    }
}

/// Seeded heuristic (§4.9): at every left bp, a seed starting there is
/// tried as an alternative right extension and overwrites the plain
/// `Mfe2dHeuristic` choice whenever it yields a strictly lower total
/// energy. Because only the single better-scoring chain survives per
/// cell, this is a bias toward seed-containing chains rather than the
/// exact predictor's hard guarantee that every reported interaction
/// contains a seed -- matching the heuristic/exact split the rest of
/// this family draws.
pub struct Mfe2dHeuristicSeed<'s, 'e, 'h, E: InteractionEnergy, S: SeedHandler> {
    base: Mfe2dHeuristic<'s, 'e, E>,
    seed: &'h mut S,
    cells: FxHashMap<Key, Cell>,
    seeded_at: FxHashMap<Key, bool>,
    next: FxHashMap<Key, Option<Key>>,
    sites: ReportedSites,
}

impl<'s, 'e, 'h, E: InteractionEnergy, S: SeedHandler> Mfe2dHeuristicSeed<'s, 'e, 'h, E, S> {
    pub fn new(base: Mfe2dHeuristic<'s, 'e, E>, seed: &'h mut S) -> Self {
        Mfe2dHeuristicSeed { base, seed, cells: FxHashMap::default(), seeded_at: FxHashMap::default(), next: FxHashMap::default(), sites: ReportedSites::new() }
    }

    fn cell(&mut self, i1: usize, i2: usize) -> Cell {
        if let Some(&c) = self.cells.get(&(i1, i2)) {
            return c;
        }
        let mut best = self.base.cell(i1, i2);
        let mut seeded = false;
        let mut chosen_next = self.base.next.get(&(i1, i2)).copied().flatten();

        if self.seed.is_seed_bound(i1, i2) {
            let seed_e = self.seed.get_seed_e(i1, i2);
            let len1 = self.seed.get_seed_length1(i1, i2);
            let len2 = self.seed.get_seed_length2(i1, i2);
            let right = (i1 + len1 - 1, i2 + len2 - 1);
            if right.0 < self.base.energy().size1() && right.1 < self.base.energy().size2() {
                let sub = self.cell(right.0, right.1);
                if sub.hyb < E_INF {
                    let candidate_hyb = seed_e + sub.hyb;
                    let (j1, j2) = sub.terminal;
                    let candidate_total = self.base.energy().get_e(i1, j1, i2, j2, candidate_hyb);
                    if candidate_total < best.total {
                        best = Cell { hyb: candidate_hyb, terminal: sub.terminal, total: candidate_total };
                        seeded = true;
                        chosen_next = Some(right);
                    }
                }
            }
        }

        self.cells.insert((i1, i2), best);
        self.seeded_at.insert((i1, i2), seeded);
        self.next.insert((i1, i2), chosen_next);
        best
    }

    fn trace(&mut self, i1: usize, i2: usize) -> Vec<Key> {
        let seeded = *self.seeded_at.get(&(i1, i2)).unwrap_or(&false);
        if seeded {
            let mut bps = self.seed.trace_back_seed(i1, i2);
            let right = self.next.get(&(i1, i2)).copied().flatten().expect("seeded cell always has a chosen right bp");
            bps.push(right);
            bps.extend(self.base.trace(right.0, right.1).into_iter().skip(1));
            bps
        } else {
            self.base.trace(i1, i2)
        }
    }

    fn build_interaction(&mut self, i1: usize, i2: usize) -> Interaction<'s> {
        let total = self.cell(i1, i2).total;
        let bps = self.trace(i1, i2);
        let mut interaction = Interaction::new(self.base.seq1, self.base.seq2);
        for (a, b) in bps {
            interaction.push_bp(a, b);
        }
        interaction.energy = total;
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
        check_range(range1, range2, self.base.energy().size1(), self.base.energy().size2())?;

        let mut candidates: Vec<(EType, Key)> = Vec::new();
        for i1 in range1.from..=range1.to {
            for i2 in range2.from..=range2.to {
                let total = self.cell(i1, i2).total;
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
        check_range(range1, range2, self.base.energy().size1(), self.base.energy().size2())?;
        let mut best: Option<(EType, Key)> = None;
        for i1 in range1.from..=range1.to {
            for i2 in range2.from..=range2.to {
                let total = self.cell(i1, i2).total;
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
    fn heuristic_matches_exact_on_fully_stacked_duplex() {
        let s1 = RnaSequence::new("q", "GGGG").unwrap();
        let s2 = RnaSequence::new("t", "CCCC").unwrap();
        let c1 = AccessibilityConstraint::unconstrained(4, 0);
        let c2 = AccessibilityConstraint::unconstrained(4, 0);
        let a1 = Accessibility::new(&s1, 0, c1, AccessibilitySource::Disabled);
        let a2 = Accessibility::new(&s2, 0, c2, AccessibilitySource::Disabled);
        let energy = BasePairEnergyModel::new(&s1, &s2, &a1, &a2, -1.0, 1.0, usize::MAX, usize::MAX, 0, true);
        let mut predictor = Mfe2dHeuristic::new(&s1, &s2, &energy, false);

        let mfe = predictor.mfe(IndexRange::new(0, 3), IndexRange::new(0, 3)).unwrap().unwrap();
        assert_eq!(mfe.energy, -4.0);
        assert_eq!(mfe.base_pairs(), &[(0, 0), (1, 1), (2, 2), (3, 3)]);
    }

    #[test]
    fn next_best_excludes_overlapping_sites() {
        let s1 = RnaSequence::new("q", "GGGGAAAGGGG").unwrap();
        let s2 = RnaSequence::new("t", "CCCCAAACCCC").unwrap();
        let c1 = AccessibilityConstraint::unconstrained(11, 0);
        let c2 = AccessibilityConstraint::unconstrained(11, 0);
        let a1 = Accessibility::new(&s1, 0, c1, AccessibilitySource::Disabled);
        let a2 = Accessibility::new(&s2, 0, c2, AccessibilitySource::Disabled);
        let energy = BasePairEnergyModel::new(&s1, &s2, &a1, &a2, -1.0, 1.0, usize::MAX, usize::MAX, 0, true);
        let mut predictor = Mfe2dHeuristic::new(&s1, &s2, &energy, false);
        let mut out = crate::OutputHandlerInteractionList::new(10);
        predictor.predict(IndexRange::new(0, 10), IndexRange::new(0, 10), 2, ReportOverlap::Neither, &mut out).unwrap();
        assert_eq!(out.items().len(), 2);
        let r0: hf_interaction::InteractionRange = (&out.items()[0]).into();
        let r1: hf_interaction::InteractionRange = (&out.items()[1]).into();
        assert!(!r0.r1.overlaps(&r1.r1));
    }

    #[test]
    fn seeded_variant_overwrites_cell_when_seed_improves_total() {
        let s1 = RnaSequence::new("q", "GGGG").unwrap();
        let s2 = RnaSequence::new("t", "CCCC").unwrap();
        let c1 = AccessibilityConstraint::unconstrained(4, 0);
        let c2 = AccessibilityConstraint::unconstrained(4, 0);
        let a1 = Accessibility::new(&s1, 0, c1, AccessibilitySource::Disabled);
        let a2 = Accessibility::new(&s2, 0, c2, AccessibilitySource::Disabled);
        let energy = BasePairEnergyModel::new(&s1, &s2, &a1, &a2, -1.0, 1.0, usize::MAX, usize::MAX, 0, true);

        let seed_constraint = SeedConstraint::new(2).unwrap().with_max_e(100.0).with_max_ed(100.0, 100.0);
        let mut seed = SeedHandlerMfe::new(&energy, seed_constraint);

        let base = Mfe2dHeuristic::new(&s1, &s2, &energy, false);
        let mut predictor = Mfe2dHeuristicSeed::new(base, &mut seed);

        let mfe = predictor.mfe(IndexRange::new(0, 3), IndexRange::new(0, 3)).unwrap().unwrap();
        assert_eq!(mfe.energy, -4.0);
        assert_eq!(mfe.base_pairs(), &[(0, 0), (1, 1), (2, 2), (3, 3)]);
    }
}
