use anyhow::Result;
use clap::Args;

use hf_energy::{InteractionEnergy, E_INF};
use hf_seed::{SeedConstraint, SeedHandlerExplicit, SeedHandlerMfe, SeedHandlerNoBulge};

use crate::seed_model::SeedHandlerKind;

/// Seed CLI flags, grounded on the teacher's flatten-a-struct-of-Args
/// pattern. `--no-seed` (the default seed constraint omitted entirely)
/// is modeled at the call site by `build` returning `Ok(None)`.
#[derive(Args, Debug, Clone)]
pub struct SeedConstraintArguments {
    /// Require a seed of this many base pairs before extending; omit to
    /// disable seed-based prediction entirely.
    #[arg(long)]
    pub seed_bp: Option<usize>,

    /// Maximum unpaired positions inside the seed, strand 1.
    #[arg(long, default_value_t = 0)]
    pub seed_max_u1: usize,

    /// Maximum unpaired positions inside the seed, strand 2.
    #[arg(long, default_value_t = 0)]
    pub seed_max_u2: usize,

    /// Maximum total unpaired positions inside the seed.
    #[arg(long, default_value_t = 0)]
    pub seed_max_u: usize,

    /// Maximum seed energy (kcal/mol); unset means uncapped.
    #[arg(long)]
    pub seed_max_e: Option<f64>,

    /// Disallow a seed using the fixed-window (no-bulge) handler instead
    /// of the general mfe one.
    #[arg(long)]
    pub seed_no_bulge: bool,

    /// Explicit seed encoding (`start1 dotbar1&start2 dotbar2`); when
    /// set, overrides both the mfe and no-bulge handlers.
    #[arg(long)]
    pub seed_explicit: Option<String>,

    /// Forbid lonely (unstacked) seed base pairs.
    #[arg(long)]
    pub seed_no_lp: bool,
}

impl SeedConstraintArguments {
    fn constraint(&self) -> Result<Option<SeedConstraint>> {
        let Some(bp) = self.seed_bp else { return Ok(None) };
        let mut c = SeedConstraint::new(bp)?
            .with_unpaired(self.seed_max_u1, self.seed_max_u2, self.seed_max_u)
            .with_no_lonely_pair(self.seed_no_lp);
        if let Some(max_e) = self.seed_max_e {
            c = c.with_max_e(max_e);
        } else {
            c = c.with_max_e(E_INF);
        }
        if let Some(explicit) = &self.seed_explicit {
            c = c.with_explicit(explicit.clone());
        }
        Ok(Some(c))
    }

    /// Builds the seed handler selected by these flags, or `None` if no
    /// `--seed-bp` was given (seed prediction disabled).
    pub fn build<'e, E: InteractionEnergy>(&self, energy: &'e E) -> Result<Option<SeedHandlerKind<'e, E>>> {
        let Some(constraint) = self.constraint()? else { return Ok(None) };
        let handler = if self.seed_explicit.is_some() {
            SeedHandlerKind::Explicit(SeedHandlerExplicit::new(energy, constraint)?)
        } else if self.seed_no_bulge {
            SeedHandlerKind::NoBulge(SeedHandlerNoBulge::new(energy, constraint))
        } else {
            SeedHandlerKind::Mfe(SeedHandlerMfe::new(energy, constraint))
        };
        Ok(Some(handler))
    }
}
