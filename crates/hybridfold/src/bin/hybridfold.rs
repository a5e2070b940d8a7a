use std::io::Write;

use anyhow::{anyhow, Result};
use clap::{ArgAction, Args, Parser, ValueEnum};
use colored::*;
use env_logger::Builder;
use log::info;

use hf_helix::{HelixConstraint, HelixHandler, HelixHandlerMfe};
use hf_predict::{
    Mfe2d, Mfe2dHeuristic, Mfe2dHeuristicSeed, Mfe2dSeed, MfeEns2d, MfeEns2dSeedExtension, MfeEnsSeedOnly,
    OutputHandlerInteractionList, PredictionTrackerBasePairProb, ReportOverlap,
};
use hf_structure::IndexRange;

use hybridfold::accessibility_parsers::AccessibilityArguments;
use hybridfold::energy_parsers::EnergyModelArguments;
use hybridfold::input_parsers::read_two_sequences_input;
use hybridfold::seed_parsers::SeedConstraintArguments;
use hybridfold::text_output;

/// Which DP predictor to run, per the CLI surface named in §6: one of
/// `Mfe2d, Mfe2dSeed, Mfe2dHeuristic, Mfe2dHeuristicSeed, MfeEns2d,
/// MfeEns2dSeedExtension, MfeEns2dHeuristicSeedExtension, MfeEnsSeedOnly`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Mfe2d,
    Mfe2dSeed,
    Mfe2dHeuristic,
    Mfe2dHeuristicSeed,
    MfeEns2d,
    MfeEns2dSeedExtension,
    MfeEns2dHeuristicSeedExtension,
    MfeEnsSeedOnly,
}

impl Mode {
    fn needs_seed(self) -> bool {
        matches!(
            self,
            Mode::Mfe2dSeed
                | Mode::Mfe2dHeuristicSeed
                | Mode::MfeEns2dSeedExtension
                | Mode::MfeEns2dHeuristicSeedExtension
                | Mode::MfeEnsSeedOnly
        )
    }
}

#[derive(Debug, Args)]
pub struct EvalInput {
    /// Input file (FASTA-like: two headers + sequences, query then
    /// target), or "-" for stdin.
    #[arg(value_name = "INPUT", default_value = "-")]
    pub input: String,

    /// Verbosity (-v = info, -vv = debug).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Prediction mode.
    #[arg(long, value_enum, default_value_t = Mode::Mfe2d)]
    pub mode: Mode,

    /// Disallow lonely (unstacked) base pairs in the reported interaction.
    #[arg(long)]
    pub no_lp: bool,

    /// Number of (sub-optimal) interactions to report.
    #[arg(long, default_value_t = 1)]
    pub report_max: usize,

    /// Allow reported sub-optima to overlap previously reported sites.
    #[arg(long)]
    pub report_overlap_both: bool,

    /// Decompose each reported interaction's span into its maximal
    /// stacked helices and print them alongside the interaction.
    #[arg(long)]
    pub report_helices: bool,
}

#[derive(Debug, Parser)]
#[command(name = "hybridfold")]
#[command(author, version, about)]
pub struct Cli {
    #[command(flatten)]
    pub eval: EvalInput,

    #[command(flatten, next_help_heading = "Energy model parameters")]
    pub energy: EnergyModelArguments,

    #[command(flatten, next_help_heading = "Query accessibility")]
    pub acc1: AccessibilityArguments,

    #[command(flatten, next_help_heading = "Target accessibility")]
    pub acc2: AccessibilityArguments,

    #[command(flatten, next_help_heading = "Seed constraint")]
    pub seed: SeedConstraintArguments,
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.eval.verbose);

    if cli.eval.mode.needs_seed() && cli.seed.seed_bp.is_none() {
        return Err(anyhow!("mode {:?} requires --seed-bp", cli.eval.mode));
    }

    let (seq1, seq2) = read_two_sequences_input(&cli.eval.input)?;
    info!("{} ({} nt) vs {} ({} nt)", seq1.id().yellow(), seq1.size(), seq2.id().yellow(), seq2.size());

    let rt = cli.energy.rt();
    let acc1 = cli.acc1.build(&seq1, rt, 0)?;
    let acc2 = cli.acc2.build(&seq2, rt, 0)?;
    let energy = cli.energy.build(&seq1, &seq2, &acc1, &acc2);

    let range1 = IndexRange::new(0, seq1.size() - 1);
    let range2 = IndexRange::new(0, seq2.size() - 1);
    let overlap = if cli.eval.report_overlap_both { ReportOverlap::Both } else { ReportOverlap::Neither };

    let mut output = OutputHandlerInteractionList::new(cli.eval.report_max.max(1));
    let mut tracker = PredictionTrackerBasePairProb::new();

    match cli.eval.mode {
        Mode::Mfe2d => {
            let mut predictor = Mfe2d::new(&seq1, &seq2, &energy, cli.eval.no_lp);
            predictor.predict(range1, range2, cli.eval.report_max, overlap, &mut output)?;
        }
        Mode::Mfe2dHeuristic => {
            let mut predictor = Mfe2dHeuristic::new(&seq1, &seq2, &energy, cli.eval.no_lp);
            predictor.predict(range1, range2, cli.eval.report_max, overlap, &mut output)?;
        }
        Mode::Mfe2dSeed => {
            let mut seed = cli.seed.build(&energy)?.ok_or_else(|| anyhow!("--seed-bp is required for this mode"))?;
            let base = Mfe2d::new(&seq1, &seq2, &energy, cli.eval.no_lp);
            let mut predictor = Mfe2dSeed::new(base, &mut seed);
            predictor.predict(range1, range2, cli.eval.report_max, overlap, &mut output)?;
        }
        Mode::Mfe2dHeuristicSeed => {
            let mut seed = cli.seed.build(&energy)?.ok_or_else(|| anyhow!("--seed-bp is required for this mode"))?;
            let base = Mfe2dHeuristic::new(&seq1, &seq2, &energy, cli.eval.no_lp);
            let mut predictor = Mfe2dHeuristicSeed::new(base, &mut seed);
            predictor.predict(range1, range2, cli.eval.report_max, overlap, &mut output)?;
        }
        Mode::MfeEns2d => {
            let mut predictor = MfeEns2d::new(&seq1, &seq2, &energy, cli.eval.no_lp);
            predictor.predict(range1, range2, &mut output, Some(&mut tracker))?;
            info!("Zall = {:.6e}", predictor.zall());
        }
        Mode::MfeEns2dSeedExtension => {
            let mut seed = cli.seed.build(&energy)?.ok_or_else(|| anyhow!("--seed-bp is required for this mode"))?;
            let mut predictor = MfeEns2dSeedExtension::new(&seq1, &seq2, &energy, &mut seed, false);
            predictor.predict(range1, range2, &mut output, Some(&mut tracker))?;
            info!("Zall = {:.6e}", predictor.zall());
        }
        Mode::MfeEns2dHeuristicSeedExtension => {
            let mut seed = cli.seed.build(&energy)?.ok_or_else(|| anyhow!("--seed-bp is required for this mode"))?;
            let mut predictor = MfeEns2dSeedExtension::new(&seq1, &seq2, &energy, &mut seed, true);
            predictor.predict(range1, range2, &mut output, Some(&mut tracker))?;
            info!("Zall = {:.6e}", predictor.zall());
        }
        Mode::MfeEnsSeedOnly => {
            let mut seed = cli.seed.build(&energy)?.ok_or_else(|| anyhow!("--seed-bp is required for this mode"))?;
            let mut predictor = MfeEnsSeedOnly::new(&seq1, &seq2, &energy, &mut seed);
            predictor.predict(range1, range2, &mut output, Some(&mut tracker))?;
            info!("Zall = {:.6e}", predictor.zall());
        }
    }

    if output.items().is_empty() {
        println!("no interaction found");
        return Ok(());
    }

    for (rank, interaction) in output.items().iter().enumerate() {
        if interaction.base_pairs().is_empty() {
            println!("no interaction found");
            continue;
        }
        println!("{}", format!("# result {}", rank + 1).cyan());
        print!("{}", text_output::render(interaction, &energy, &seq1, &seq2));

        if cli.eval.report_helices {
            if let Some(&(i1, i2)) = interaction.base_pairs().first() {
                let constraint = HelixConstraint::new(2, interaction.base_pairs().len().max(2), cli.energy.max_il1.min(cli.energy.max_il2));
                let mut helices = HelixHandlerMfe::new(&energy, constraint);
                let e = helices.get_helix_e(i1, i2);
                if e < hf_energy::E_INF {
                    let bps = helices.trace_back_helix(i1, i2);
                    println!(
                        "\nmaximal helix at ({},{}): {} bp, {:.2} kcal/mol",
                        seq1.get_in_out_index(i1),
                        seq2.get_in_out_index(i2),
                        bps.len(),
                        e
                    );
                }
            }
        }
    }

    for (bp, p) in tracker.ranked().into_iter().take(10) {
        info!("P({},{}) = {:.4}", bp.0, bp.1, p);
    }

    Ok(())
}
