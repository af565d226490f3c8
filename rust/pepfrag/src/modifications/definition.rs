use crate::chemistry::calc_formula_mass;
use crate::errors::ConfigurationError;
use serde::{
    Deserialize,
    Serialize,
};

/// One entry of a modification source, keyed by `name@site` in the
/// source mapping.
///
/// Only the compositions are used for the masses, `mono_mass` and
/// `modloss` are kept around as reference values. Any other keys in
/// the source (classification, unimod ids ...) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModificationSource {
    pub composition: String,
    #[serde(default)]
    pub modloss_composition: String,
    #[serde(default)]
    pub mono_mass: Option<f64>,
    #[serde(default)]
    pub modloss: Option<f64>,
}

/// A resolved modification with its masses computed from the compositions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModificationDefinition {
    /// Full `name@site` key.
    pub name: String,
    pub site: String,
    pub composition: String,
    pub modloss_composition: String,
    pub mass: f64,
    pub modloss_mass: f64,
    pub importance: f64,
    /// False for the synthesized lower-case site variants.
    pub upper_case_aa: bool,
    pub unimod_mass: Option<f64>,
    pub unimod_modloss: Option<f64>,
}

impl ModificationDefinition {
    pub fn from_source(name: &str, source: &ModificationSource) -> Result<Self, ConfigurationError> {
        let (_, site) = split_site(name)?;
        Ok(Self {
            name: name.to_string(),
            site: site.to_string(),
            composition: source.composition.clone(),
            modloss_composition: source.modloss_composition.clone(),
            mass: calc_formula_mass(&source.composition)?,
            modloss_mass: calc_formula_mass(&source.modloss_composition)?,
            importance: 0.0,
            upper_case_aa: true,
            unimod_mass: source.mono_mass,
            unimod_modloss: source.modloss,
        })
    }

    /// The part of the key before the site, e.g. `Phospho` for `Phospho@S`.
    pub fn mod_name(&self) -> &str {
        &self.name[..self.name.len() - self.site.len() - 1]
    }

    pub(crate) fn with_site(&self, site: String) -> Self {
        let name = format!("{}@{}", self.mod_name(), site);
        Self {
            name,
            site,
            upper_case_aa: false,
            ..self.clone()
        }
    }
}

/// Splits `name@site` at the last `@`.
///
/// Names themselves can contain `@`-free punctuation such as `->` or `:`,
/// sites never contain `@`.
pub fn split_site(key: &str) -> Result<(&str, &str), ConfigurationError> {
    match key.rsplit_once('@') {
        Some((name, site)) if !name.is_empty() && !site.is_empty() => Ok((name, site)),
        _ => Err(ConfigurationError::MissingSiteSeparator {
            key: key.to_string(),
        }),
    }
}

/// The lower-case site variant of a site, if there is one.
///
/// Single residue sites are lower-cased (`S` -> `s`), combined
/// `residue^terminus` sites only fold the residue (`Q^Any N-term` ->
/// `q^Any N-term`). Pure terminus sites have no variant.
pub fn lower_case_site(site: &str) -> Option<String> {
    let mut chars = site.chars();
    let first = chars.next()?;
    let out = if site.chars().count() == 1 {
        site.to_lowercase()
    } else if site.contains('^') {
        first.to_lowercase().chain(chars).collect()
    } else {
        return None;
    };
    if out == site { None } else { Some(out) }
}
