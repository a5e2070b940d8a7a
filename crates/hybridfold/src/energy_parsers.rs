use clap::{Args, ValueEnum};

use hf_energy::{AccessibilityLike, BasePairEnergyModel, ViennaEnergyModel};
use hf_structure::RnaSequence;

use crate::energy_model::EnergyModelKind;

/// Which `InteractionEnergy` implementation to switch to at construction
/// (REDESIGN FLAGS: sum-typed model selection instead of a class hierarchy).
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelChoice {
    /// Nearest-neighbor Vienna-style stacking energies.
    Vienna,
    /// Constant bonus per intermolecular base pair; cheap toy model.
    BasePair,
}

/// Shared (not per-strand) energy-model CLI flags, grounded on the
/// teacher's `EnergyModelArguments` (`temperature`, `model_parameters`)
/// generalized to this crate's two energy models.
#[derive(Args, Debug, Clone)]
pub struct EnergyModelArguments {
    /// Which energy model to use.
    #[arg(long, value_enum, default_value_t = ModelChoice::Vienna)]
    pub model: ModelChoice,

    /// Folding temperature in degrees Celsius.
    #[arg(short = 't', long, default_value_t = 37.0)]
    pub temperature: f64,

    /// Per-base-pair bonus energy (kcal/mol, negative is favorable); only
    /// used by the `base-pair` model.
    #[arg(long, default_value_t = -1.0)]
    pub e_bp: f64,

    /// Maximum internal loop length in strand 1.
    #[arg(long, default_value_t = 16)]
    pub max_il1: usize,

    /// Maximum internal loop length in strand 2.
    #[arg(long, default_value_t = 16)]
    pub max_il2: usize,

    /// Minimum loop length used by the `base-pair` model's Nussinov ES term.
    #[arg(long, default_value_t = 3)]
    pub min_loop_len: usize,

    /// Allow G-U wobble pairs.
    #[arg(long, default_value_t = true)]
    pub allow_gu: bool,
}

impl EnergyModelArguments {
    /// Gas-constant-scaled `RT` at the configured temperature, in
    /// kcal/mol; shared with accessibility so ED and energy terms agree
    /// on the same thermodynamic scale.
    pub fn rt(&self) -> f64 {
        0.0019872041 * (self.temperature + 273.15)
    }

    pub fn build<'s>(
        &self,
        seq1: &'s RnaSequence,
        seq2: &'s RnaSequence,
        acc1: &'s dyn AccessibilityLike,
        acc2: &'s dyn AccessibilityLike,
    ) -> EnergyModelKind<'s> {
        match self.model {
            ModelChoice::Vienna => EnergyModelKind::Vienna(ViennaEnergyModel::new(
                seq1, seq2, acc1, acc2, self.temperature, self.max_il1, self.max_il2, self.allow_gu,
            )),
            ModelChoice::BasePair => EnergyModelKind::BasePair(BasePairEnergyModel::new(
                seq1, seq2, acc1, acc2, self.e_bp, self.rt(), self.max_il1, self.max_il2, self.min_loop_len, self.allow_gu,
            )),
        }
    }
}
