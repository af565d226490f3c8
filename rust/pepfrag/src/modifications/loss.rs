use super::registry::ModificationRegistry;
use crate::errors::{
    Result,
    ShapeError,
};
use crate::fragments::IonSeriesTerminality;

/// Propagates the neutral loss of the most important modification
/// seen so far along the scan direction.
///
/// A position whose importance is strictly higher than the best one
/// seen so far becomes the new best and keeps its own loss. Every other
/// position takes the loss of the current best. Ties keep the earlier
/// position.
///
/// Example:
/// ```
/// use pepfrag::modifications::select_modloss;
/// let mut losses = vec![10.0, 20.0, 30.0];
/// select_modloss(&mut losses, &[2.0, 5.0, 1.0]).unwrap();
/// assert_eq!(losses, vec![10.0, 20.0, 20.0]);
/// ```
pub fn select_modloss(mod_losses: &mut [f64], mod_importance: &[f64]) -> Result<()> {
    if mod_losses.len() != mod_importance.len() {
        return Err(ShapeError::ExpectedSlicesSameLength {
            expected: mod_losses.len(),
            other: mod_importance.len(),
            context: "Modification losses and importance".to_string(),
        }
        .into());
    }
    let Some(&first) = mod_importance.first() else {
        return Ok(());
    };

    let mut prev_importance = first;
    let mut prev_most = 0;
    for i in 1..mod_losses.len() {
        if mod_importance[i] > prev_importance {
            prev_most = i;
            prev_importance = mod_importance[i];
        } else {
            mod_losses[i] = mod_losses[prev_most];
        }
    }
    Ok(())
}

/// Padded position of a site: `0` is the N-terminus slot, `1..=peplen`
/// the residues and `peplen + 1` the C-terminus slot.
fn padded_index(site: i32, peplen: usize) -> Result<usize> {
    match site {
        -1 => Ok(peplen + 1),
        s if s >= 0 && (s as usize) <= peplen => Ok(s as usize),
        s => Err(ShapeError::ModificationSiteOutOfRange { site: s, peplen }.into()),
    }
}

/// Neutral loss mass for each of the `peplen - 1` fragments of one
/// ion series.
///
/// For the N-terminal series the i-th value is the loss of the fragment
/// covering residues `1..=i`, for the C-terminal series the i-th value
/// follows the b-series position order, so both arrays line up with the
/// rows of a fragment table. Modifications with importance 0 never
/// contribute a loss. When several modifications share a site the last
/// one in the list defines that site.
pub fn calc_modloss_mass<S: AsRef<str>>(
    registry: &ModificationRegistry,
    peplen: usize,
    mod_names: &[S],
    mod_sites: &[i32],
    terminality: IonSeriesTerminality,
) -> Result<Vec<f64>> {
    if mod_names.len() != mod_sites.len() {
        return Err(ShapeError::ExpectedSlicesSameLength {
            expected: mod_names.len(),
            other: mod_sites.len(),
            context: "Modification names and sites".to_string(),
        }
        .into());
    }
    if peplen == 0 {
        return Err(ShapeError::PeptideTooShort { peplen }.into());
    }
    if mod_names.is_empty() {
        return Ok(vec![0.0; peplen - 1]);
    }

    let mut losses = vec![0.0; peplen + 2];
    let mut importance = vec![0.0; peplen + 2];
    for (name, &site) in mod_names.iter().zip(mod_sites.iter()) {
        let name = name.as_ref();
        let idx = padded_index(site, peplen)?;
        let loss = registry.loss_mass(name)?;
        let imp = registry.importance(name);
        losses[idx] = if imp == 0.0 { 0.0 } else { loss };
        importance[idx] = imp;
    }

    match terminality {
        IonSeriesTerminality::NTerm => {
            select_modloss(&mut losses, &importance)?;
            Ok(losses[1..peplen].to_vec())
        }
        IonSeriesTerminality::CTerm => {
            losses.reverse();
            importance.reverse();
            select_modloss(&mut losses, &importance)?;
            // Reversed index `peplen - 1 - i` is padded position `i + 2`,
            // the first residue of the i-th y fragment.
            Ok((0..peplen - 1).map(|i| losses[peplen - 1 - i]).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ModificationRegistry {
        ModificationRegistry::builtin()
            .unwrap()
            .with_importance_overrides_str(r#"{"Phospho@S": 1e8, "Oxidation@M": 1.0}"#)
            .unwrap()
    }

    #[test]
    fn test_select_modloss_law() {
        let mut losses = vec![10.0, 20.0, 30.0];
        select_modloss(&mut losses, &[2.0, 5.0, 1.0]).unwrap();
        assert_eq!(losses, vec![10.0, 20.0, 20.0]);

        // Ties keep the first
        let mut losses = vec![1.0, 2.0, 3.0];
        select_modloss(&mut losses, &[1.0, 1.0, 1.0]).unwrap();
        assert_eq!(losses, vec![1.0, 1.0, 1.0]);

        let mut empty: Vec<f64> = vec![];
        select_modloss(&mut empty, &[]).unwrap();
        assert!(select_modloss(&mut [1.0, 2.0], &[1.0]).is_err());
    }

    #[test]
    fn test_unmodified() {
        let reg = registry();
        let empty: [&str; 0] = [];
        let out = calc_modloss_mass(&reg, 6, &empty, &[], IonSeriesTerminality::NTerm).unwrap();
        assert_eq!(out, vec![0.0; 5]);
        let out = calc_modloss_mass(&reg, 1, &empty, &[], IonSeriesTerminality::CTerm).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_zero_importance_never_contributes() {
        // Neither has an importance, overrides only match the exact `Oxidation@M`
        let reg = registry();
        for terminality in [IonSeriesTerminality::NTerm, IonSeriesTerminality::CTerm] {
            let out = calc_modloss_mass(
                &reg,
                5,
                &["Carbamidomethyl@C", "Oxidation@m"],
                &[2, 4],
                terminality,
            )
            .unwrap();
            assert_eq!(out, vec![0.0; 4]);
        }
    }

    #[test]
    fn test_ams_scenario() {
        let reg = registry();
        let ox_loss = reg.loss_mass("Oxidation@M").unwrap();
        let ph_loss = reg.loss_mass("Phospho@S").unwrap();
        let names = ["Oxidation@M", "Phospho@S"];
        let sites = [2, 3];

        let nterm = calc_modloss_mass(&reg, 3, &names, &sites, IonSeriesTerminality::NTerm).unwrap();
        // b1 = A, b2 = AM
        assert_eq!(nterm, vec![0.0, ox_loss]);

        let cterm = calc_modloss_mass(&reg, 3, &names, &sites, IonSeriesTerminality::CTerm).unwrap();
        // y2 = MS, y1 = S, in b order
        assert_eq!(cterm, vec![ph_loss, ph_loss]);
    }

    #[test]
    fn test_phospho_masks_oxidation() {
        let reg = registry();
        let ox_loss = reg.loss_mass("Oxidation@M").unwrap();
        let ph_loss = reg.loss_mass("Phospho@S").unwrap();

        // M S K M K
        let names = ["Oxidation@M", "Phospho@S", "Oxidation@M"];
        let sites = [1, 2, 4];

        let nterm = calc_modloss_mass(&reg, 5, &names, &sites, IonSeriesTerminality::NTerm).unwrap();
        assert_eq!(nterm, vec![ox_loss, ph_loss, ph_loss, ph_loss]);

        let cterm = calc_modloss_mass(&reg, 5, &names, &sites, IonSeriesTerminality::CTerm).unwrap();
        // y4 = SKMK, y3 = KMK, y2 = MK, y1 = K
        assert_eq!(cterm, vec![ph_loss, ox_loss, ox_loss, 0.0]);
    }

    #[test]
    fn test_terminal_sites() {
        let reg = registry()
            .with_importance_overrides_str(r#"{"Acetyl@Protein N-term": 1.0}"#)
            .unwrap();
        // Acetyl carries no loss, so the N-terminal slot propagates a zero loss
        let out = calc_modloss_mass(
            &reg,
            4,
            &["Acetyl@Protein N-term", "Phospho@S"],
            &[0, 3],
            IonSeriesTerminality::NTerm,
        )
        .unwrap();
        let ph_loss = reg.loss_mass("Phospho@S").unwrap();
        assert_eq!(out, vec![0.0, 0.0, ph_loss]);

        assert!(
            calc_modloss_mass(&reg, 4, &["Phospho@S"], &[5], IonSeriesTerminality::NTerm).is_err()
        );
        assert!(
            calc_modloss_mass(&reg, 4, &["Nope@S"], &[1], IonSeriesTerminality::NTerm).is_err()
        );
    }
}
