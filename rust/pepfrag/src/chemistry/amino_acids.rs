use super::constants::MASS_H2O;
use crate::errors::{
    LookupError,
    ShapeError,
};
use crate::models::Array2D;
use rustyms::prelude::Peptidoform;
use std::sync::LazyLock;

// Letters resolved through rustyms, lower case letters share their mass.
const RESIDUE_LETTERS: &str = "ACDEFGHIKLMNOPQRSTUVWY";

/// Residue mass from the formula of the single residue peptide.
fn residue_mass_from_peptide(aa: char) -> Option<f64> {
    let peptide = Peptidoform::pro_forma(&aa.to_string(), None).ok()?;
    let linear = peptide.as_linear()?;
    let formulas = linear.formulas();
    if formulas.len() != 1 {
        return None;
    }
    Some(formulas[0].monoisotopic_mass().value - MASS_H2O)
}

/// ASCII indexed residue masses, `NaN` marks letters with no residue.
static AA_ASCII_MASS: LazyLock<[f64; 128]> = LazyLock::new(|| {
    let mut table = [f64::NAN; 128];
    for aa in RESIDUE_LETTERS.chars() {
        if let Some(mass) = residue_mass_from_peptide(aa) {
            table[aa as usize] = mass;
            table[aa.to_ascii_lowercase() as usize] = mass;
        }
    }
    table
});

/// Monoisotopic residue mass of a single amino acid letter.
pub fn residue_mass(aa: char) -> Option<f64> {
    if !aa.is_ascii() {
        return None;
    }
    let mass = AA_ASCII_MASS[aa as usize];
    if mass.is_nan() { None } else { Some(mass) }
}

/// Residue masses of every position in `sequence`.
pub fn residue_masses(sequence: &str) -> Result<Vec<f64>, LookupError> {
    sequence
        .chars()
        .map(|aa| {
            residue_mass(aa).ok_or_else(|| LookupError::UnknownAminoAcid {
                residue: aa,
                sequence: sequence.to_string(),
            })
        })
        .collect()
}

/// Neutral mass of an unmodified peptide (residues + water).
///
/// Example:
/// ```
/// use pepfrag::chemistry::sequence_mass;
/// let mass = sequence_mass("PEPTIDE").unwrap();
/// assert!((mass - 799.359_964).abs() < 1e-4);
/// ```
pub fn sequence_mass(sequence: &str) -> Result<f64, LookupError> {
    Ok(residue_masses(sequence)?.iter().sum::<f64>() + MASS_H2O)
}

/// Residue masses for sequences sharing one length, one row per sequence.
pub fn calc_aa_masses_for_same_len_seqs<S: AsRef<str>>(
    sequences: &[S],
) -> crate::errors::Result<Array2D<f64>> {
    let nrows = sequences.len();
    let ncols = sequences.first().map(|x| x.as_ref().len()).unwrap_or(0);
    let mut values = Vec::with_capacity(nrows * ncols);
    for seq in sequences {
        let seq = seq.as_ref();
        if seq.len() != ncols {
            return Err(ShapeError::ExpectedSlicesSameLength {
                expected: ncols,
                other: seq.len(),
                context: format!("Sequence {} in a same-length batch", seq),
            }
            .into());
        }
        values.extend(residue_masses(seq)?);
    }
    Array2D::from_flat_vector(values, nrows, ncols)
}

/// Unmodified peptide masses (water included) for same-length sequences.
pub fn calc_sequence_masses_for_same_len_seqs<S: AsRef<str>>(
    sequences: &[S],
) -> crate::errors::Result<Vec<f64>> {
    let aa_masses = calc_aa_masses_for_same_len_seqs(sequences)?;
    Ok(aa_masses
        .row_apply(|row| row.iter().sum::<f64>() + MASS_H2O)
        .collect())
}
