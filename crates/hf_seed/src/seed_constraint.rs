use hf_energy::{EType, E_INF};
use hf_structure::IndexRange;

use crate::SeedError;

/// Constraints a seed sub-interaction must satisfy: exact base-pair count,
/// bounded unpaired positions per strand and overall, a per-strand ED cap,
/// an overall energy cap, optional per-strand search windows, an optional
/// explicit-seed encoding, and the usual GU/no-lonely-pair toggles.
#[derive(Clone, Debug)]
pub struct SeedConstraint {
    pub bp: usize,
    pub u1max: usize,
    pub u2max: usize,
    pub umax: usize,
    pub max_e: EType,
    pub max_ed1: EType,
    pub max_ed2: EType,
    pub range1: Option<IndexRange>,
    pub range2: Option<IndexRange>,
    pub explicit: Option<String>,
    pub allow_gu: bool,
    pub allow_gu_end: bool,
    pub no_lonely_pair: bool,
}

impl SeedConstraint {
    pub fn new(bp: usize) -> Result<Self, SeedError> {
        if bp < 2 {
            return Err(SeedError::BadIndex(bp, 2));
        }
        Ok(SeedConstraint {
            bp,
            u1max: 0,
            u2max: 0,
            umax: 0,
            max_e: E_INF,
            max_ed1: E_INF,
            max_ed2: E_INF,
            range1: None,
            range2: None,
            explicit: None,
            allow_gu: true,
            allow_gu_end: true,
            no_lonely_pair: false,
        })
    }

    pub fn with_unpaired(mut self, u1max: usize, u2max: usize, umax: usize) -> Self {
        self.u1max = u1max;
        self.u2max = u2max;
        self.umax = umax;
        self
    }

    pub fn with_max_e(mut self, max_e: EType) -> Self {
        self.max_e = max_e;
        self
    }

    pub fn with_max_ed(mut self, max_ed1: EType, max_ed2: EType) -> Self {
        self.max_ed1 = max_ed1;
        self.max_ed2 = max_ed2;
        self
    }

    pub fn with_ranges(mut self, range1: Option<IndexRange>, range2: Option<IndexRange>) -> Self {
        self.range1 = range1;
        self.range2 = range2;
        self
    }

    pub fn with_explicit(mut self, explicit: impl Into<String>) -> Self {
        self.explicit = Some(explicit.into());
        self
    }

    pub fn with_gu(mut self, allow_gu: bool, allow_gu_end: bool) -> Self {
        self.allow_gu = allow_gu;
        self.allow_gu_end = allow_gu_end;
        self
    }

    pub fn with_no_lonely_pair(mut self, no_lp: bool) -> Self {
        self.no_lonely_pair = no_lp;
        self
    }

    /// Internal bp beyond the mandatory left+right pair: `bp - 2`.
    pub fn bp_inner(&self) -> usize {
        self.bp - 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_fewer_than_two_bp() {
        assert!(SeedConstraint::new(1).is_err());
        assert!(SeedConstraint::new(2).is_ok());
    }

    #[test]
    fn builder_chains() {
        let c = SeedConstraint::new(3).unwrap()
            .with_unpaired(2, 2, 3)
            .with_max_e(-1.0)
            .with_gu(true, false);
        assert_eq!(c.u1max, 2);
        assert_eq!(c.umax, 3);
        assert_eq!(c.max_e, -1.0);
        assert!(!c.allow_gu_end);
        assert_eq!(c.bp_inner(), 1);
    }
}
