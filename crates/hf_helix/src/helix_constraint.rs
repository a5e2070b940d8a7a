/// Constraints a maximal stacked helix must satisfy: bp-count bounds,
/// an internal-loop cap within the helix, and whether an embedded seed
/// is mandatory (§3 HelixConstraint).
#[derive(Clone, Copy, Debug)]
pub struct HelixConstraint {
    pub min_bp: usize,
    pub max_bp: usize,
    pub max_il: usize,
    pub with_seed: bool,
}

impl HelixConstraint {
    pub fn new(min_bp: usize, max_bp: usize, max_il: usize) -> Self {
        HelixConstraint { min_bp, max_bp, max_il, with_seed: false }
    }

    pub fn with_embedded_seed(mut self, with_seed: bool) -> Self {
        self.with_seed = with_seed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_embedded_seed_flag() {
        let c = HelixConstraint::new(2, 10, 2).with_embedded_seed(true);
        assert!(c.with_seed);
        assert_eq!(c.max_bp, 10);
    }
}
