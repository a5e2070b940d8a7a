use hf_energy::{EType, InteractionEnergy, E_INF};
use hf_interaction::Interaction;
use hf_seed::SeedHandler;
use hf_structure::{IndexRange, RnaSequence};

use crate::{check_range, OutputHandler, PredictError, PredictionTracker};

/// Seed-only ensemble predictor (§4.10 `MfeEnsSeedOnly`): enumerates only
/// the feasible seeds in range -- no extension beyond their boundary --
/// contributing `w(seedE + E_init) * w(extra ED/end/dangle terms)` to
/// `Zall` for each, and reports the minimum-energy seed (full base pairs
/// via `trace_back_seed`) as the mfe interaction. Mirrors
/// `PredictorMfeEnsSeedOnly::predict`, which enumerates every feasible
/// seed left-bound in the range (the reference streams them via
/// `updateToNextSeed`; this scans directly since both visit the same set).
pub struct MfeEnsSeedOnly<'s, 'e, 'h, E: InteractionEnergy, S: SeedHandler> {
    seq1: &'s RnaSequence,
    seq2: &'s RnaSequence,
    energy: &'e E,
    seed: &'h mut S,
    zall: EType,
}

impl<'s, 'e, 'h, E: InteractionEnergy, S: SeedHandler> MfeEnsSeedOnly<'s, 'e, 'h, E, S> {
    pub fn new(seq1: &'s RnaSequence, seq2: &'s RnaSequence, energy: &'e E, seed: &'h mut S) -> Self {
        MfeEnsSeedOnly { seq1, seq2, energy, seed, zall: 0.0 }
    }

    pub fn zall(&self) -> EType { self.zall }

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

        let mut best: Option<(EType, (usize, usize), (usize, usize))> = None;
        // Column-major scan (strand 1 fastest), matching `update_to_next_seed`'s
        // own enumeration order, over every feasible seed left-bound.
        for i2 in range2.from..=range2.to {
            for i1 in range1.from..=range1.to {
                if !self.seed.is_seed_bound(i1, i2) {
                    continue;
                }
                let len1 = self.seed.get_seed_length1(i1, i2);
                let len2 = self.seed.get_seed_length2(i1, i2);
                let j1 = i1 + len1 - 1;
                let j2 = i2 + len2 - 1;
                if j1 > range1.to || j2 > range2.to {
                    continue;
                }

                let seed_e_hybrid = self.seed.get_seed_e(i1, i2) + self.energy.e_init();
                let total_e = self.energy.get_e(i1, j1, i2, j2, seed_e_hybrid);
                if total_e >= E_INF {
                    continue;
                }

                let weight = self.energy.get_boltzmann_weight(total_e);
                if weight <= 0.0 {
                    continue;
                }
                self.zall += weight;

                if let Some(t) = tracker.as_deref_mut() {
                    t.add_bp_weight(j1, j2, weight);
                    // `trace_back_seed` includes the left endpoint itself as its first entry.
                    for (p, q) in self.seed.trace_back_seed(i1, i2) {
                        t.add_bp_weight(p, q, weight);
                    }
                }

                if best.map_or(true, |(be, _, _)| total_e < be) {
                    best = Some((total_e, (i1, i2), (j1, j2)));
                }
            }
        }

        if let Some(t) = tracker.as_deref_mut() {
            t.finalize(self.zall);
        }

        match best {
            Some((e, (i1, i2), (j1, j2))) if e < 0.0 => {
                let mut interaction = Interaction::new(self.seq1, self.seq2);
                for (p, q) in self.seed.trace_back_seed(i1, i2) {
                    interaction.push_bp(p, q);
                }
                if (j1, j2) != (i1, i2) {
                    interaction.push_bp(j1, j2);
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
}
