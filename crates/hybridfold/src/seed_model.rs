use hf_energy::{EType, InteractionEnergy};
use hf_seed::{SeedConstraint, SeedHandler, SeedHandlerExplicit, SeedHandlerMfe, SeedHandlerNoBulge};
use hf_structure::IndexRange;

/// Sum-typed seed-handler selector, same rationale as
/// `EnergyModelKind`: pick mfe / no-bulge / explicit once from the CLI's
/// `--seed-*` flags, dispatch on it from then on.
pub enum SeedHandlerKind<'e, E: InteractionEnergy> {
    Mfe(SeedHandlerMfe<'e, E>),
    NoBulge(SeedHandlerNoBulge<'e, E>),
    Explicit(SeedHandlerExplicit<'e, E>),
}

macro_rules! dispatch {
    ($self:ident, $call:ident($($arg:expr),*)) => {
        match $self {
            SeedHandlerKind::Mfe(h) => h.$call($($arg),*),
            SeedHandlerKind::NoBulge(h) => h.$call($($arg),*),
            SeedHandlerKind::Explicit(h) => h.$call($($arg),*),
        }
    };
}

impl<'e, E: InteractionEnergy> SeedHandler for SeedHandlerKind<'e, E> {
    fn constraint(&self) -> &SeedConstraint { dispatch!(self, constraint()) }
    fn is_seed_bound(&mut self, i1: usize, i2: usize) -> bool { dispatch!(self, is_seed_bound(i1, i2)) }
    fn get_seed_e(&mut self, i1: usize, i2: usize) -> EType { dispatch!(self, get_seed_e(i1, i2)) }
    fn get_seed_length1(&mut self, i1: usize, i2: usize) -> usize { dispatch!(self, get_seed_length1(i1, i2)) }
    fn get_seed_length2(&mut self, i1: usize, i2: usize) -> usize { dispatch!(self, get_seed_length2(i1, i2)) }
    fn trace_back_seed(&mut self, i1: usize, i2: usize) -> Vec<(usize, usize)> { dispatch!(self, trace_back_seed(i1, i2)) }
    fn update_to_next_seed(&mut self, i1: usize, i2: usize, range1: &IndexRange, range2: &IndexRange) -> Option<(usize, usize)> {
        dispatch!(self, update_to_next_seed(i1, i2, range1, range2))
    }
    fn fill_seed(&mut self, range1: IndexRange, range2: IndexRange) -> usize { dispatch!(self, fill_seed(range1, range2)) }
}
