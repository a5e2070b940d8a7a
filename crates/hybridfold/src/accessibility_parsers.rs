use anyhow::Result;
use clap::Args;

use hf_energy::{Accessibility, AccessibilitySource};
use hf_structure::{AccessibilityConstraint, RnaSequence};

/// Per-strand accessibility CLI flags, mirroring the teacher's
/// `EnergyModelArguments` flatten pattern: one struct, `#[command(flatten)]`
/// twice (once per strand) from the top-level `Cli`.
#[derive(Args, Debug, Clone)]
pub struct AccessibilityArguments {
    /// Disable accessibility (ED) terms entirely; only blocked positions
    /// from `--constraint` still apply.
    #[arg(long)]
    pub acc_disabled: bool,

    /// Maximum window length considered when computing ED; 0 means
    /// "as long as the sequence".
    #[arg(long, default_value_t = 0)]
    pub max_ed_length: usize,

    /// Nussinov base-pair weight (`exp(-Ebp/RT)`) used when accessibility
    /// is enabled.
    #[arg(long, default_value_t = 1.0)]
    pub acc_base_pair_weight: f64,

    /// Minimum hairpin loop length fed to the Nussinov folding back-end.
    #[arg(long, default_value_t = 3)]
    pub acc_min_loop_len: usize,

    /// Dot-bracket-like constraint string (`. ( ) x b |`), one char per
    /// sequence position. Defaults to fully unconstrained.
    #[arg(long)]
    pub constraint: Option<String>,
}

impl AccessibilityArguments {
    pub fn build<'s>(&self, seq: &'s RnaSequence, rt: f64, max_bp_span: usize) -> Result<Accessibility<'s>> {
        let constraint = match &self.constraint {
            Some(s) => AccessibilityConstraint::parse(s, max_bp_span)?,
            None => AccessibilityConstraint::unconstrained(seq.size(), max_bp_span),
        };
        let source = if self.acc_disabled {
            AccessibilitySource::Disabled
        } else {
            AccessibilitySource::BasePair {
                base_pair_weight: self.acc_base_pair_weight,
                rt,
                min_loop_len: self.acc_min_loop_len,
            }
        };
        Ok(Accessibility::new(seq, self.max_ed_length, constraint, source))
    }
}
