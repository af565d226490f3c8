use super::mass_calc::calc_peptide_masses_for_same_len_seqs;
use crate::chemistry::MASS_PROTON;
use crate::errors::{
    Result,
    ShapeError,
};
use crate::models::{
    Precursor,
    PrecursorTable,
};
use crate::modifications::ModificationRegistry;
use crate::utils::length_batches;
use rayon::prelude::*;
use tracing::instrument;

/// Sets `precursor_mz` of every precursor from its sequence,
/// modifications, mass deltas and charge.
///
/// The collection order and the fragment ranges are left as they are.
/// Every precursor needs a (non-zero) charge, if any is missing nothing
/// is updated.
#[instrument(skip_all, name = "update_precursor_mz", level = "debug")]
pub fn update_precursor_mz(
    registry: &ModificationRegistry,
    precursors: &mut PrecursorTable,
    batch_size: usize,
) -> Result<()> {
    let batches = length_batches(precursors.peplen_groups(), batch_size)?;
    let all = precursors.as_slice();
    let computed: Vec<Vec<(usize, f64)>> = batches
        .par_iter()
        .map(|batch| -> Result<Vec<(usize, f64)>> {
            let precs: Vec<&Precursor> = batch.indices.iter().map(|&i| &all[i]).collect();
            let masses = calc_peptide_masses_for_same_len_seqs(registry, &precs)?;
            batch
                .indices
                .iter()
                .zip(precs.iter())
                .zip(masses)
                .map(|((&i, prec), mass)| -> Result<(usize, f64)> {
                    let charge = prec.charge.filter(|&x| x > 0).ok_or_else(|| {
                        ShapeError::MissingCharge {
                            sequence: prec.sequence.clone(),
                        }
                    })?;
                    Ok((i, mass / charge as f64 + MASS_PROTON))
                })
                .collect()
        })
        .collect::<Result<_>>()?;

    let precs = precursors.precursors_mut();
    for (i, mz) in computed.into_iter().flatten() {
        precs[i].precursor_mz = Some(mz);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemistry::sequence_mass;

    #[test]
    fn test_update_precursor_mz() {
        let reg = ModificationRegistry::builtin().unwrap();
        let ox = reg.mass("Oxidation@M").unwrap();
        let mut precursors = PrecursorTable::new(vec![
            Precursor::unmodified("PEPTIDEK").with_charge(2),
            Precursor::new("AMS", vec!["Oxidation@M".into()], vec![2])
                .unwrap()
                .with_charge(1),
            Precursor::unmodified("GGG")
                .with_charge(3)
                .with_mod_deltas(vec![3.0], vec![1])
                .unwrap(),
        ])
        .unwrap();
        precursors.reset_frag_indices();
        let ranges_before = precursors.frag_ranges().unwrap();

        update_precursor_mz(&reg, &mut precursors, 1).unwrap();

        let mzs: Vec<f64> = precursors.iter().map(|x| x.precursor_mz.unwrap()).collect();
        let expected = [
            sequence_mass("PEPTIDEK").unwrap() / 2.0 + MASS_PROTON,
            sequence_mass("AMS").unwrap() + ox + MASS_PROTON,
            (sequence_mass("GGG").unwrap() + 3.0) / 3.0 + MASS_PROTON,
        ];
        for (got, exp) in mzs.iter().zip(expected.iter()) {
            assert!((got - exp).abs() < 1e-6, "{} != {}", got, exp);
        }
        assert_eq!(precursors.get(0).unwrap().sequence, "PEPTIDEK");
        assert_eq!(precursors.frag_ranges().unwrap(), ranges_before);
    }

    #[test]
    fn test_missing_charge() {
        let reg = ModificationRegistry::builtin().unwrap();
        let mut precursors = PrecursorTable::new(vec![
            Precursor::unmodified("PEPTIDEK").with_charge(2),
            Precursor::unmodified("AMS"),
        ])
        .unwrap();
        let out = update_precursor_mz(&reg, &mut precursors, 10);
        assert!(matches!(
            out,
            Err(crate::errors::PepFragError::Shape(ShapeError::MissingCharge { .. }))
        ));
        assert!(precursors.iter().all(|x| x.precursor_mz.is_none()));
    }
}
