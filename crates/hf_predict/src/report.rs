use hf_structure::{IndexRange, IndexRangeList};

use crate::PredictError;

/// How much a next-best interaction may overlap previously reported ones
/// (§4.12). Only the two extremes are modeled: heuristic predictors can
/// always honor `Neither` (strict non-overlap on both strands); exact
/// predictors only support `Both` (no restriction at all).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportOverlap {
    Neither,
    Both,
}

/// Bookkeeping shared by every predictor's sub-optimal enumeration: the
/// ranges already handed out, so a subsequent `get_next_best` can skip
/// them under `ReportOverlap::Neither`.
#[derive(Default)]
pub struct ReportedSites {
    sites1: IndexRangeList,
    sites2: IndexRangeList,
}

impl ReportedSites {
    pub fn new() -> Self {
        ReportedSites::default()
    }

    pub fn record(&mut self, r1: IndexRange, r2: IndexRange) {
        self.sites1.insert(r1);
        self.sites2.insert(r2);
    }

    pub fn overlaps(&self, r1: &IndexRange, r2: &IndexRange) -> bool {
        self.sites1.overlaps(r1) || self.sites2.overlaps(r2)
    }
}

/// Verifies `range1`/`range2` are ascending and within `[0,size)`, as
/// every `predict()` entry point requires before filling its tables.
pub fn check_range(range1: IndexRange, range2: IndexRange, size1: usize, size2: usize) -> Result<(), PredictError> {
    if !range1.is_ascending() || !range2.is_ascending() {
        return Err(PredictError::BadRange);
    }
    if range1.to >= size1 || range2.to >= size2 {
        return Err(PredictError::BadRange);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reported_sites_detect_overlap() {
        let mut sites = ReportedSites::new();
        sites.record(IndexRange::new(2, 5), IndexRange::new(1, 3));
        assert!(sites.overlaps(&IndexRange::new(4, 6), &IndexRange::new(0, 0)));
        assert!(!sites.overlaps(&IndexRange::new(6, 8), &IndexRange::new(4, 6)));
    }

    #[test]
    fn check_range_rejects_descending_or_oob() {
        assert!(check_range(IndexRange::new(0, 2), IndexRange::new(0, 2), 3, 3).is_ok());
        assert!(check_range(IndexRange::new(2, 0), IndexRange::new(0, 2), 3, 3).is_err());
        assert!(check_range(IndexRange::new(0, 3), IndexRange::new(0, 2), 3, 3).is_err());
    }
}
