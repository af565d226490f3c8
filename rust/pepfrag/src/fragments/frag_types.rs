use crate::chemistry::{
    MASS_H,
    MASS_H2O,
    MASS_NH3,
};
use crate::errors::IonParsingError;
use serde::{
    Deserialize,
    Deserializer,
    Serialize,
    Serializer,
};
use std::fmt::Display;
use std::str::FromStr;

/// Refers to what terminus of the original peptide retains the
/// charge after a fragmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IonSeriesTerminality {
    NTerm,
    CTerm,
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Copy)]
#[allow(non_camel_case_types)]
pub enum FragmentIonType {
    b,
    y,
    b_modloss,
    y_modloss,
    b_H2O,
    y_H2O,
    b_NH3,
    y_NH3,
    c,
    z,
}

impl FragmentIonType {
    pub const ALL: [FragmentIonType; 10] = [
        Self::b,
        Self::y,
        Self::b_modloss,
        Self::y_modloss,
        Self::b_H2O,
        Self::y_H2O,
        Self::b_NH3,
        Self::y_NH3,
        Self::c,
        Self::z,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::b => "b",
            Self::y => "y",
            Self::b_modloss => "b_modloss",
            Self::y_modloss => "y_modloss",
            Self::b_H2O => "b_H2O",
            Self::y_H2O => "y_H2O",
            Self::b_NH3 => "b_NH3",
            Self::y_NH3 => "y_NH3",
            Self::c => "c",
            Self::z => "z",
        }
    }

    /// Whether the ion is derived from the b (N-terminal) or
    /// y (C-terminal) ladder.
    pub fn terminality(&self) -> IonSeriesTerminality {
        match self {
            Self::b | Self::b_modloss | Self::b_H2O | Self::b_NH3 | Self::c => {
                IonSeriesTerminality::NTerm
            }
            Self::y | Self::y_modloss | Self::y_H2O | Self::y_NH3 | Self::z => {
                IonSeriesTerminality::CTerm
            }
        }
    }

    pub fn is_modloss(&self) -> bool {
        matches!(self, Self::b_modloss | Self::y_modloss)
    }

    /// Constant neutral mass added to the b/y ladder mass.
    ///
    /// The modloss types subtract a per position loss instead,
    /// their constant part is 0.
    pub fn mass_offset(&self) -> f64 {
        match self {
            Self::b | Self::y | Self::b_modloss | Self::y_modloss => 0.0,
            Self::b_H2O | Self::y_H2O => -MASS_H2O,
            Self::b_NH3 | Self::y_NH3 => -MASS_NH3,
            Self::c => MASS_NH3,
            Self::z => -(MASS_NH3 - MASS_H),
        }
    }
}

impl Display for FragmentIonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FragmentIonType {
    type Err = IonParsingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|x| x.as_str() == s)
            .copied()
            .ok_or_else(|| IonParsingError::UnsupportedIonType {
                ion_type: s.to_string(),
            })
    }
}

/// A fragment ion type at a given charge, written as `<ion type>_z<charge>`
/// (`b_z1`, `y_modloss_z2`).
///
/// This is the column key of a fragment table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChargedFragType {
    pub ion_type: FragmentIonType,
    pub charge: i8,
}

impl ChargedFragType {
    pub fn new(ion_type: FragmentIonType, charge: i8) -> Result<Self, IonParsingError> {
        if charge == 0 {
            return Err(IonParsingError::InvalidCharge {
                token: format!("{}_z0", ion_type),
            });
        }
        Ok(Self { ion_type, charge })
    }
}

impl Display for ChargedFragType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_z{}", self.ion_type, self.charge)
    }
}

impl FromStr for ChargedFragType {
    type Err = IonParsingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ion_type, charge) = parse_charged_frag_type(s)?;
        Ok(Self { ion_type, charge })
    }
}

impl Serialize for ChargedFragType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ChargedFragType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Splits `b_modloss_z2` into the ion type and the charge.
///
/// The split happens at the last `_`, so ion types containing
/// underscores are supported. The charge token has to be `z<n>`
/// with a non-zero (possibly negative) `n`.
pub fn parse_charged_frag_type(token: &str) -> Result<(FragmentIonType, i8), IonParsingError> {
    let Some((ion_type, charge_chunk)) = token.rsplit_once('_') else {
        return Err(IonParsingError::MissingChargeSuffix {
            token: token.to_string(),
        });
    };
    let Some(charge_chunk) = charge_chunk.strip_prefix('z') else {
        return Err(IonParsingError::MissingChargeSuffix {
            token: token.to_string(),
        });
    };
    let charge = match charge_chunk.parse::<i8>() {
        Ok(0) | Err(_) => {
            return Err(IonParsingError::InvalidCharge {
                token: token.to_string(),
            });
        }
        Ok(x) => x,
    };
    Ok((ion_type.parse()?, charge))
}

/// Cartesian product of ion types and charges `1..=max_frag_charge`,
/// ion type major.
///
/// Example:
/// ```
/// use pepfrag::fragments::get_charged_frag_types;
/// let types = get_charged_frag_types(&["b", "y"], 2).unwrap();
/// let names: Vec<String> = types.iter().map(|x| x.to_string()).collect();
/// assert_eq!(names, vec!["b_z1", "b_z2", "y_z1", "y_z2"]);
/// ```
pub fn get_charged_frag_types<S: AsRef<str>>(
    frag_types: &[S],
    max_frag_charge: u8,
) -> Result<Vec<ChargedFragType>, IonParsingError> {
    let max_frag_charge = i8::try_from(max_frag_charge).map_err(|_| IonParsingError::InvalidCharge {
        token: max_frag_charge.to_string(),
    })?;
    let mut out = Vec::with_capacity(frag_types.len() * max_frag_charge.max(0) as usize);
    for frag_type in frag_types {
        let ion_type: FragmentIonType = frag_type.as_ref().parse()?;
        for charge in 1..=max_frag_charge {
            out.push(ChargedFragType { ion_type, charge });
        }
    }
    Ok(out)
}
