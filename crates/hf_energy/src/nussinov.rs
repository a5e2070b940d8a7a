use hf_structure::{PairTypeRNA, RnaSequence};

use crate::EType;

/// Classic Nussinov partition-function helper over a single sequence,
/// feeding `ES`/`ED` queries of the lightweight base-pair energy model.
///
/// `Q`/`Qb` are memoized lazily (sentinel `None` = unfilled), matching the
/// `getQ`/`getQb`/`getPbp`/`getPu` static query family this is grounded on.
/// `Pbp`/`Pu` use a simplified outside factorization appropriate for a
/// toy, loop-energy-free model rather than a full inside-outside pass.
pub struct NussinovHandler<'s> {
    seq: &'s RnaSequence,
    base_pair_weight: EType,
    min_loop_len: usize,
    q: Vec<Vec<Option<EType>>>,
    qb: Vec<Vec<Option<EType>>>,
}

impl<'s> NussinovHandler<'s> {
    pub fn new(seq: &'s RnaSequence, base_pair_weight: EType, min_loop_len: usize) -> Self {
        let n = seq.size();
        NussinovHandler {
            seq,
            base_pair_weight,
            min_loop_len,
            q: vec![vec![None; n]; n],
            qb: vec![vec![None; n]; n],
        }
    }

    fn complementary(&self, i: usize, j: usize) -> bool {
        PairTypeRNA::from((self.seq.base_at(i), self.seq.base_at(j))).can_pair()
    }

    pub fn get_qb(&mut self, from: usize, to: usize) -> EType {
        if to <= from || to - from <= self.min_loop_len {
            return 0.0;
        }
        if let Some(v) = self.qb[from][to] {
            return v;
        }
        let value = if self.complementary(from, to) {
            self.get_q(from + 1, to - 1) * self.base_pair_weight
        } else {
            0.0
        };
        self.qb[from][to] = Some(value);
        value
    }

    pub fn get_q(&mut self, from: usize, to: usize) -> EType {
        if from > to {
            return 1.0;
        }
        if to - from <= self.min_loop_len {
            return 1.0;
        }
        if let Some(v) = self.q[from][to] {
            return v;
        }
        let mut sum = self.get_q(from, to - 1);
        for k in (from + self.min_loop_len + 1)..=to {
            sum += self.get_q(from, k - 1) * self.get_qb(k, to);
        }
        self.q[from][to] = Some(sum);
        sum
    }

    /// Probability that region `[from,to]` is entirely unpaired, computed
    /// as `Q` recomputed over the full sequence with every base pair
    /// touching `[from,to]` excluded, normalized by the unconstrained `Q`.
    pub fn get_pu(&mut self, from: usize, to: usize) -> EType {
        let n = self.seq.size();
        if n == 0 {
            return 1.0;
        }
        let qtot = self.get_q(0, n - 1);
        if qtot == 0.0 {
            return 0.0;
        }
        self.q_excl(0, n as isize - 1, from, to) / qtot
    }

    /// Probability that `(from,to)` itself forms a base pair.
    pub fn get_pbp(&mut self, from: usize, to: usize) -> EType {
        let n = self.seq.size();
        let qtot = self.get_q(0, n - 1);
        if qtot == 0.0 || from >= to {
            return 0.0;
        }
        let qb = self.get_qb(from, to);
        let left = if from == 0 { 1.0 } else { self.get_q(0, from - 1) };
        let right = if to + 1 >= n { 1.0 } else { self.get_q(to + 1, n - 1) };
        (left * qb * right) / qtot
    }

    fn qb_excl(&self, i: isize, j: isize, ex_from: usize, ex_to: usize) -> EType {
        if i < 0 || j < 0 || j <= i || (j - i) as usize <= self.min_loop_len {
            return 0.0;
        }
        let (i, j) = (i as usize, j as usize);
        if i <= ex_to && j >= ex_from {
            return 0.0;
        }
        if !self.complementary(i, j) {
            return 0.0;
        }
        self.q_excl(i as isize + 1, j as isize - 1, ex_from, ex_to) * self.base_pair_weight
    }

    fn q_excl(&self, from: isize, to: isize, ex_from: usize, ex_to: usize) -> EType {
        if from > to {
            return 1.0;
        }
        if (to - from) as usize <= self.min_loop_len {
            return 1.0;
        }
        let mut sum = self.q_excl(from, to - 1, ex_from, ex_to);
        for k in (from + self.min_loop_len as isize + 1)..=to {
            sum += self.q_excl(from, k - 1, ex_from, ex_to) * self.qb_excl(k, to, ex_from, ex_to);
        }
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qb_zero_for_short_loop() {
        let seq = RnaSequence::new("q", "GGGGCCCC").unwrap();
        let mut h = NussinovHandler::new(&seq, (1.0f64).exp(), 3);
        assert_eq!(h.get_qb(0, 2), 0.0);
    }

    #[test]
    fn q_is_monotone_nondecreasing_with_window() {
        let seq = RnaSequence::new("q", "GGGGCCCC").unwrap();
        let mut h = NussinovHandler::new(&seq, (1.0f64).exp(), 1);
        let q_small = h.get_q(0, 3);
        let q_large = h.get_q(0, 7);
        assert!(q_large >= q_small);
    }

    #[test]
    fn pu_and_pbp_are_bounded_probabilities() {
        let seq = RnaSequence::new("q", "GGGGCCCC").unwrap();
        let mut h = NussinovHandler::new(&seq, (1.0f64).exp(), 1);
        let pu = h.get_pu(3, 4);
        assert!((0.0..=1.0).contains(&pu));
        let pbp = h.get_pbp(0, 7);
        assert!((0.0..=1.0).contains(&pbp));
    }
}
