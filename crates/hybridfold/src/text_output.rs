use hf_energy::InteractionEnergy;
use hf_interaction::Interaction;
use hf_structure::RnaSequence;

/// Renders a reported interaction the way the teacher's `ff-eval` renders
/// fold trajectories: flanking sequence, a pairing line, decomposed energy
/// contributions, and an optional seed block. GU pairs are marked `:`,
/// seed base pairs `+`, everything else `|`.
pub fn render<E: InteractionEnergy>(interaction: &Interaction, energy: &E, seq1: &RnaSequence, seq2: &RnaSequence) -> String {
    let bps = interaction.base_pairs();
    let mut out = String::new();
    if bps.is_empty() {
        out.push_str("no interaction found\n");
        return out;
    }

    let (i1, i2) = bps[0];
    let (j1, j2) = bps[bps.len() - 1];

    let seed_bps: std::collections::HashSet<(usize, usize)> = interaction
        .seeds
        .iter()
        .flat_map(|s| [s.left_bp, s.right_bp])
        .collect();

    out.push_str(&format!("target  {}\n", &seq1.to_string()[i1..=j1]));
    let pairing: String = bps
        .iter()
        .map(|&(a, b)| {
            if seed_bps.contains(&(a, b)) {
                '+'
            } else if energy.is_gu(a, b) {
                ':'
            } else {
                '|'
            }
        })
        .collect();
    out.push_str(&format!("        {}\n", pairing));
    out.push_str(&format!("query   {}\n", &seq2.to_string()[i2..=j2]));

    out.push_str(&format!("\ninteraction seq1: {}-{} (1-based)\n", seq1.get_in_out_index(i1), seq1.get_in_out_index(j1)));
    out.push_str(&format!("interaction seq2: {}-{} (1-based)\n", seq2.get_in_out_index(i2), seq2.get_in_out_index(j2)));

    let e_init = energy.e_init();
    let e_end_left = energy.e_end_left(i1, i2);
    let e_end_right = energy.e_end_right(j1, j2);
    let e_dangle_left = energy.e_dangling_left(i1, i2);
    let e_dangle_right = energy.e_dangling_right(j1, j2);
    let ed1 = energy.ed1(i1, j1);
    let ed2 = energy.ed2(i2, j2);
    let hybrid = interaction.energy - ed1 - ed2 - e_end_left - e_end_right - e_dangle_left - e_dangle_right;
    let loops = hybrid - e_init;

    out.push_str("\nenergy contributions (kcal/mol):\n");
    out.push_str(&format!("  init        {:>8.2}\n", e_init));
    out.push_str(&format!("  loops       {:>8.2}\n", loops));
    out.push_str(&format!("  dangleLeft  {:>8.2}\n", e_dangle_left));
    out.push_str(&format!("  dangleRight {:>8.2}\n", e_dangle_right));
    out.push_str(&format!("  endLeft     {:>8.2}\n", e_end_left));
    out.push_str(&format!("  endRight    {:>8.2}\n", e_end_right));
    out.push_str(&format!("  hybrid      {:>8.2}\n", hybrid));
    out.push_str(&format!("  ED1         {:>8.2}\n", ed1));
    out.push_str(&format!("  ED2         {:>8.2}\n", ed2));
    out.push_str(&format!("  total       {:>8.2}\n", interaction.energy));

    if !interaction.seeds.is_empty() {
        out.push_str("\nseeds:\n");
        for seed in &interaction.seeds {
            out.push_str(&format!(
                "  {}..{} energy {:.2}\n",
                seq1.get_in_out_index(seed.left_bp.0),
                seq1.get_in_out_index(seed.right_bp.0),
                seed.energy
            ));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use hf_energy::{Accessibility, AccessibilitySource, BasePairEnergyModel};
    use hf_structure::AccessibilityConstraint;

    #[test]
    fn renders_a_single_base_pair() {
        let s1 = RnaSequence::new("q", "GG").unwrap();
        let s2 = RnaSequence::new("t", "CC").unwrap();
        let c1 = AccessibilityConstraint::unconstrained(2, 0);
        let c2 = AccessibilityConstraint::unconstrained(2, 0);
        let a1 = Accessibility::new(&s1, 0, c1, AccessibilitySource::Disabled);
        let a2 = Accessibility::new(&s2, 0, c2, AccessibilitySource::Disabled);
        let model = BasePairEnergyModel::new(&s1, &s2, &a1, &a2, -1.0, 1.0, usize::MAX, usize::MAX, 0, true);
        let mut interaction = Interaction::new(&s1, &s2);
        interaction.push_bp(0, 1);
        interaction.energy = -1.0;
        let text = render(&interaction, &model, &s1, &s2);
        assert!(text.contains("total"));
        assert!(text.contains("target"));
    }
}
