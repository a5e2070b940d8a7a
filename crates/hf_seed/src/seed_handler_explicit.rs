use rustc_hash::FxHashMap;

use hf_energy::{EType, InteractionEnergy, E_INF};
use hf_structure::IndexRange;

use crate::{SeedConstraint, SeedError, SeedHandler};

/// One parsed `start1 dotbar1 & start2 dotbar2` entry, expanded to its
/// absolute, 0-based base-pair list (`bps[0]` is the left bp, `bps.last()`
/// the right bp).
#[derive(Clone, Debug)]
struct ExplicitSeed {
    bps: Vec<(usize, usize)>,
}

fn parse_dotbar(s: &str) -> Result<Vec<bool>, SeedError> {
    if s.is_empty() || !s.starts_with('|') || !s.ends_with('|') {
        return Err(SeedError::UnbalancedDotbar(s.to_string()));
    }
    let mut bits = Vec::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '|' => bits.push(true),
            '.' => bits.push(false),
            _ => return Err(SeedError::MalformedExplicitSeed(s.to_string())),
        }
    }
    Ok(bits)
}

fn parse_entry(entry: &str) -> Result<ExplicitSeed, SeedError> {
    let (left, right) = entry.split_once('&').ok_or_else(|| SeedError::MalformedExplicitSeed(entry.to_string()))?;

    let mut left_tokens = left.split(' ');
    let start1: usize = left_tokens.next()
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| SeedError::MalformedExplicitSeed(entry.to_string()))?;
    let dotbar1 = left_tokens.next().ok_or_else(|| SeedError::MalformedExplicitSeed(entry.to_string()))?;
    if left_tokens.next().is_some() {
        return Err(SeedError::MalformedExplicitSeed(entry.to_string()));
    }

    let mut right_tokens = right.split(' ').filter(|t| !t.is_empty());
    let start2: usize = right_tokens.next()
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| SeedError::MalformedExplicitSeed(entry.to_string()))?;
    let dotbar2 = right_tokens.next().ok_or_else(|| SeedError::MalformedExplicitSeed(entry.to_string()))?;
    if right_tokens.next().is_some() {
        return Err(SeedError::MalformedExplicitSeed(entry.to_string()));
    }

    if start1 == 0 || start2 == 0 {
        return Err(SeedError::MalformedExplicitSeed(entry.to_string()));
    }

    let bits1 = parse_dotbar(dotbar1)?;
    let bits2 = parse_dotbar(dotbar2)?;
    if bits1.iter().filter(|&&b| b).count() != bits2.iter().filter(|&&b| b).count() {
        return Err(SeedError::UnbalancedDotbar(entry.to_string()));
    }

    let pos1: Vec<usize> = bits1.iter().enumerate().filter(|(_, &b)| b).map(|(i, _)| start1 - 1 + i).collect();
    let pos2: Vec<usize> = bits2.iter().enumerate().filter(|(_, &b)| b).map(|(i, _)| start2 - 1 + i).collect();

    Ok(ExplicitSeed { bps: pos1.into_iter().zip(pos2).collect() })
}

/// Parses and validates the full comma-separated explicit-seed
/// encoding (§6 EXTERNAL INTERFACES "Explicit-seed string").
fn parse_explicit(s: &str) -> Result<Vec<ExplicitSeed>, SeedError> {
    if s.is_empty() || s.ends_with(',') {
        return Err(SeedError::MalformedExplicitSeed(s.to_string()));
    }
    s.split(',').map(parse_entry).collect()
}

/// Enumerates a fixed, caller-supplied set of seeds rather than
/// searching for them; grounded on `SeedHandlerExplicit` (§4.4).
pub struct SeedHandlerExplicit<'e, E: InteractionEnergy> {
    energy: &'e E,
    constraint: SeedConstraint,
    seeds: Vec<ExplicitSeed>,
    index: FxHashMap<(usize, usize), usize>,
}

impl<'e, E: InteractionEnergy> SeedHandlerExplicit<'e, E> {
    pub fn new(energy: &'e E, constraint: SeedConstraint) -> Result<Self, SeedError> {
        let encoding = constraint.explicit.clone().ok_or_else(|| SeedError::MalformedExplicitSeed(String::new()))?;
        let seeds = parse_explicit(&encoding)?;
        let mut index = FxHashMap::default();
        for (i, seed) in seeds.iter().enumerate() {
            let left = seed.bps[0];
            if !energy.are_complementary(left.0, left.1) {
                return Err(SeedError::MalformedExplicitSeed(encoding.clone()));
            }
            index.insert(left, i);
        }
        Ok(SeedHandlerExplicit { energy, constraint, seeds, index })
    }

    fn seed_at(&self, i1: usize, i2: usize) -> Option<&ExplicitSeed> {
        self.index.get(&(i1, i2)).map(|&i| &self.seeds[i])
    }

    fn energy_of(&self, seed: &ExplicitSeed) -> EType {
        seed.bps.windows(2).map(|w| self.energy.e_inter_left(w[0].0, w[1].0, w[0].1, w[1].1)).sum()
    }
}

impl<'e, E: InteractionEnergy> SeedHandler for SeedHandlerExplicit<'e, E> {
    fn constraint(&self) -> &SeedConstraint { &self.constraint }

    fn is_seed_bound(&mut self, i1: usize, i2: usize) -> bool {
        self.seed_at(i1, i2).is_some()
    }

    fn get_seed_e(&mut self, i1: usize, i2: usize) -> EType {
        match self.seed_at(i1, i2) {
            Some(seed) => self.energy_of(seed),
            None => E_INF,
        }
    }

    fn get_seed_length1(&mut self, i1: usize, i2: usize) -> usize {
        self.seed_at(i1, i2).map_or(0, |s| s.bps.last().unwrap().0 - s.bps[0].0 + 1)
    }

    fn get_seed_length2(&mut self, i1: usize, i2: usize) -> usize {
        self.seed_at(i1, i2).map_or(0, |s| s.bps.last().unwrap().1 - s.bps[0].1 + 1)
    }

    fn trace_back_seed(&mut self, i1: usize, i2: usize) -> Vec<(usize, usize)> {
        match self.seed_at(i1, i2) {
            Some(seed) => seed.bps[..seed.bps.len() - 1].to_vec(),
            None => Vec::new(),
        }
    }

    fn update_to_next_seed(&mut self, i1: usize, i2: usize, range1: &IndexRange, range2: &IndexRange) -> Option<(usize, usize)> {
        self.seeds.iter()
            .map(|s| s.bps[0])
            .filter(|&(a, b)| range1.covers(a) && range2.covers(b))
            .filter(|&(a, b)| (b, a) > (i2, i1))
            .min_by_key(|&(a, b)| (b, a))
    }

    /// Returns only the count within the queried range, per §4.4.
    fn fill_seed(&mut self, range1: IndexRange, range2: IndexRange) -> usize {
        self.seeds.iter()
            .filter(|s| range1.covers(s.bps[0].0) && range2.covers(s.bps[0].1))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hf_energy::{Accessibility, AccessibilitySource, BasePairEnergyModel};
    use hf_structure::{AccessibilityConstraint, RnaSequence};

    fn energy<'s>(s1: &'s RnaSequence, s2: &'s RnaSequence, a1: &'s Accessibility<'s>, a2: &'s Accessibility<'s>) -> BasePairEnergyModel<'s> {
        BasePairEnergyModel::new(s1, s2, a1, a2, -1.0, 1.0, usize::MAX, usize::MAX, 0, true)
    }

    #[test]
    fn parses_and_scores_a_simple_explicit_seed() {
        let s1 = RnaSequence::new("q", "GGG").unwrap();
        let s2 = RnaSequence::new("t", "CCC").unwrap();
        let c1 = AccessibilityConstraint::unconstrained(3, 0);
        let c2 = AccessibilityConstraint::unconstrained(3, 0);
        let a1 = Accessibility::new(&s1, 0, c1, AccessibilitySource::Disabled);
        let a2 = Accessibility::new(&s2, 0, c2, AccessibilitySource::Disabled);
        let e = energy(&s1, &s2, &a1, &a2);

        let constraint = SeedConstraint::new(2).unwrap().with_explicit("1 || & 1 ||");
        let mut handler = SeedHandlerExplicit::new(&e, constraint).unwrap();
        assert!(handler.is_seed_bound(0, 0));
        assert_eq!(handler.get_seed_length1(0, 0), 2);
        assert_eq!(handler.trace_back_seed(0, 0), vec![(0, 0)]);
    }

    #[test]
    fn rejects_unbalanced_dotbar() {
        let s1 = RnaSequence::new("q", "GGG").unwrap();
        let s2 = RnaSequence::new("t", "CCC").unwrap();
        let c1 = AccessibilityConstraint::unconstrained(3, 0);
        let c2 = AccessibilityConstraint::unconstrained(3, 0);
        let a1 = Accessibility::new(&s1, 0, c1, AccessibilitySource::Disabled);
        let a2 = Accessibility::new(&s2, 0, c2, AccessibilitySource::Disabled);
        let e = energy(&s1, &s2, &a1, &a2);
        let constraint = SeedConstraint::new(2).unwrap().with_explicit("1 || & 1 |");
        assert!(SeedHandlerExplicit::new(&e, constraint).is_err());
    }

    #[test]
    fn rejects_trailing_comma() {
        assert!(parse_explicit("1 || & 1 ||,").is_err());
    }
}
