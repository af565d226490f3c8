use super::registry::ModificationRegistry;
use crate::errors::{
    Result,
    ShapeError,
};
use crate::models::{
    Array2D,
    Precursor,
    site_to_index,
};

fn check_same_len(expected: usize, other: usize, context: &str) -> Result<()> {
    if expected != other {
        return Err(ShapeError::ExpectedSlicesSameLength {
            expected,
            other,
            context: context.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Per residue modification mass of one peptide.
///
/// Site `0` lands on the first residue, `-1` on the last one and `k` on
/// residue `k - 1`. Masses of modifications sharing a site add up.
pub fn mass_per_site<S: AsRef<str>>(
    registry: &ModificationRegistry,
    peplen: usize,
    mod_names: &[S],
    mod_sites: &[i32],
) -> Result<Vec<f64>> {
    check_same_len(mod_names.len(), mod_sites.len(), "Modification names and sites")?;
    if peplen == 0 {
        return Err(ShapeError::PeptideTooShort { peplen }.into());
    }
    let mut out = vec![0.0; peplen];
    for (name, &site) in mod_names.iter().zip(mod_sites.iter()) {
        out[site_to_index(site, peplen)?] += registry.mass(name.as_ref())?;
    }
    Ok(out)
}

/// Total modification mass, independent of sites and length.
pub fn mass_sum<S: AsRef<str>>(registry: &ModificationRegistry, mod_names: &[S]) -> Result<f64> {
    mod_names
        .iter()
        .try_fold(0.0, |acc, name| Ok(acc + registry.mass(name.as_ref())?))
}

/// Per residue sum of unnamed mass deltas, same site encoding as
/// [`mass_per_site`].
pub fn delta_mass_per_site(peplen: usize, mod_deltas: &[f64], mod_delta_sites: &[i32]) -> Result<Vec<f64>> {
    check_same_len(mod_deltas.len(), mod_delta_sites.len(), "Modification deltas and sites")?;
    if peplen == 0 {
        return Err(ShapeError::PeptideTooShort { peplen }.into());
    }
    let mut out = vec![0.0; peplen];
    for (&delta, &site) in mod_deltas.iter().zip(mod_delta_sites.iter()) {
        out[site_to_index(site, peplen)?] += delta;
    }
    Ok(out)
}

/// Per residue mass shift (named modifications plus deltas) of a precursor.
pub fn site_mass_shifts(registry: &ModificationRegistry, precursor: &Precursor) -> Result<Vec<f64>> {
    let peplen = precursor.peplen();
    let mut out = mass_per_site(registry, peplen, &precursor.mods, &precursor.mod_sites)?;
    if !precursor.mod_deltas.is_empty() {
        let deltas = delta_mass_per_site(peplen, &precursor.mod_deltas, &precursor.mod_delta_sites)?;
        out.iter_mut().zip(deltas).for_each(|(x, d)| *x += d);
    }
    Ok(out)
}

/// Per residue mass shifts for precursors sharing one length,
/// one row per precursor.
pub fn calc_mod_masses_for_same_len_seqs(
    registry: &ModificationRegistry,
    peplen: usize,
    precursors: &[&Precursor],
) -> Result<Array2D<f64>> {
    let mut values = Vec::with_capacity(precursors.len() * peplen);
    for prec in precursors {
        check_same_len(
            peplen,
            prec.peplen(),
            &format!("Sequence {} in a same-length batch", prec.sequence),
        )?;
        values.extend(site_mass_shifts(registry, prec)?);
    }
    Array2D::from_flat_vector(values, precursors.len(), peplen)
}
