use crate::chemistry::{
    MASS_H2O,
    calc_aa_masses_for_same_len_seqs,
    calc_sequence_masses_for_same_len_seqs,
    residue_masses,
};
use crate::errors::Result;
use crate::models::{
    Array2D,
    Precursor,
};
use crate::modifications::{
    ModificationRegistry,
    calc_mod_masses_for_same_len_seqs,
    mass_sum,
    site_mass_shifts,
};

/// Neutral b/y ladders of a same-length batch.
///
/// `b_masses` and `y_masses` have one row per precursor and
/// `peplen - 1` columns, both in b position order (column `i` of
/// `y_masses` is the y fragment complementary to b fragment `i + 1`).
#[derive(Debug, Clone, PartialEq)]
pub struct ByMasses {
    pub b_masses: Array2D<f64>,
    pub y_masses: Array2D<f64>,
    pub peptide_masses: Vec<f64>,
}

fn ladder_from_residues(residues: &[f64]) -> (Vec<f64>, Vec<f64>, f64) {
    let mut cumulative = 0.0;
    let mut b_masses: Vec<f64> = residues
        .iter()
        .map(|x| {
            cumulative += x;
            cumulative
        })
        .collect();
    let peptide_mass = b_masses.pop().unwrap_or(0.0) + MASS_H2O;
    let y_masses = b_masses.iter().map(|b| peptide_mass - b).collect();
    (b_masses, y_masses, peptide_mass)
}

/// b ladder, y ladder and neutral mass of a single precursor.
pub fn calc_b_y_and_peptide_mass(
    registry: &ModificationRegistry,
    precursor: &Precursor,
) -> Result<(Vec<f64>, Vec<f64>, f64)> {
    let mut residues = residue_masses(&precursor.sequence)?;
    let shifts = site_mass_shifts(registry, precursor)?;
    residues.iter_mut().zip(shifts).for_each(|(r, s)| *r += s);
    Ok(ladder_from_residues(&residues))
}

pub fn calc_b_y_and_peptide_masses_for_same_len_seqs(
    registry: &ModificationRegistry,
    precursors: &[&Precursor],
) -> Result<ByMasses> {
    let peplen = precursors.first().map(|x| x.peplen()).unwrap_or(1);
    let sequences: Vec<&str> = precursors.iter().map(|x| x.sequence.as_str()).collect();
    let aa_masses = calc_aa_masses_for_same_len_seqs(&sequences)?;
    let mod_masses = calc_mod_masses_for_same_len_seqs(registry, peplen, precursors)?;

    let nfrags = peplen.saturating_sub(1);
    let mut b_values = Vec::with_capacity(precursors.len() * nfrags);
    let mut y_values = Vec::with_capacity(precursors.len() * nfrags);
    let mut peptide_masses = Vec::with_capacity(precursors.len());
    // Both arrays are `precursors.len()` x `peplen`, `peplen` is at least 1 here.
    let mut residues = vec![0.0; peplen];
    let aa_rows = aa_masses.values().chunks(peplen);
    let mod_rows = mod_masses.values().chunks(peplen);
    for (aa_row, mod_row) in aa_rows.zip(mod_rows) {
        for ((r, aa), m) in residues.iter_mut().zip(aa_row).zip(mod_row) {
            *r = aa + m;
        }
        let (b, y, pepmass) = ladder_from_residues(&residues);
        b_values.extend(b);
        y_values.extend(y);
        peptide_masses.push(pepmass);
    }

    Ok(ByMasses {
        b_masses: Array2D::from_flat_vector(b_values, precursors.len(), nfrags)?,
        y_masses: Array2D::from_flat_vector(y_values, precursors.len(), nfrags)?,
        peptide_masses,
    })
}

/// Neutral precursor masses: sequence with water, named modifications
/// and mass deltas.
pub fn calc_peptide_masses_for_same_len_seqs(
    registry: &ModificationRegistry,
    precursors: &[&Precursor],
) -> Result<Vec<f64>> {
    let sequences: Vec<&str> = precursors.iter().map(|x| x.sequence.as_str()).collect();
    let mut masses = calc_sequence_masses_for_same_len_seqs(&sequences)?;
    for (mass, prec) in masses.iter_mut().zip(precursors.iter()) {
        *mass += mass_sum(registry, &prec.mods)?;
        *mass += prec.mod_deltas.iter().sum::<f64>();
    }
    Ok(masses)
}
