use crate::errors::{
    Result,
    ShapeError,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::collections::BTreeMap;
use std::ops::Range;

/// Half-open row range `[start, end)` of a precursor inside a fragment table.
///
/// This is only an index into a table, never an owner of its rows; several
/// tables (m/z, intensities ...) built on the same layout share ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FragRange {
    #[serde(rename = "frag_start_idx")]
    pub start: usize,
    #[serde(rename = "frag_end_idx")]
    pub end: usize,
}

impl FragRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn shifted(&self, offset: usize) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
        }
    }
}

/// Site encoding shared by modifications and mass deltas:
/// `0` is the N-terminus, `-1` the C-terminus and `1..=peplen`
/// a 1-indexed residue.
pub const NTERM_SITE: i32 = 0;
pub const CTERM_SITE: i32 = -1;

/// A peptide (precursor) with its modifications.
///
/// `mods` and `mod_sites` are parallel lists, as are `mod_deltas`
/// and `mod_delta_sites`. The mass deltas are unnamed mass shifts
/// (e.g. from open searches) and never carry a neutral loss.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Precursor {
    pub sequence: String,
    pub mods: Vec<String>,
    pub mod_sites: Vec<i32>,
    #[serde(default)]
    pub mod_deltas: Vec<f64>,
    #[serde(default)]
    pub mod_delta_sites: Vec<i32>,
    #[serde(default)]
    pub charge: Option<u8>,
    #[serde(default)]
    pub precursor_mz: Option<f64>,
    #[serde(flatten)]
    pub frag_range: Option<FragRange>,
}

impl Precursor {
    pub fn new(sequence: impl Into<String>, mods: Vec<String>, mod_sites: Vec<i32>) -> Result<Self> {
        let out = Self {
            sequence: sequence.into(),
            mods,
            mod_sites,
            ..Default::default()
        };
        out.validate()?;
        Ok(out)
    }

    pub fn unmodified(sequence: impl Into<String>) -> Self {
        Self {
            sequence: sequence.into(),
            ..Default::default()
        }
    }

    pub fn with_charge(mut self, charge: u8) -> Self {
        self.charge = Some(charge);
        self
    }

    pub fn with_mod_deltas(mut self, mod_deltas: Vec<f64>, mod_delta_sites: Vec<i32>) -> Result<Self> {
        self.mod_deltas = mod_deltas;
        self.mod_delta_sites = mod_delta_sites;
        self.validate()?;
        Ok(self)
    }

    pub fn peplen(&self) -> usize {
        self.sequence.len()
    }

    /// Number of backbone cleavage sites, i.e. the number of fragment rows.
    pub fn num_fragments(&self) -> usize {
        self.peplen().saturating_sub(1)
    }

    pub fn validate(&self) -> Result<()> {
        if self.mods.len() != self.mod_sites.len() {
            return Err(ShapeError::ExpectedSlicesSameLength {
                expected: self.mods.len(),
                other: self.mod_sites.len(),
                context: format!("Modification names and sites of {}", self.sequence),
            }
            .into());
        }
        if self.mod_deltas.len() != self.mod_delta_sites.len() {
            return Err(ShapeError::ExpectedSlicesSameLength {
                expected: self.mod_deltas.len(),
                other: self.mod_delta_sites.len(),
                context: format!("Modification deltas and sites of {}", self.sequence),
            }
            .into());
        }
        if self.peplen() == 0 {
            return Err(ShapeError::PeptideTooShort { peplen: 0 }.into());
        }
        for &site in self.mod_sites.iter().chain(self.mod_delta_sites.iter()) {
            site_to_index(site, self.peplen())?;
        }
        Ok(())
    }
}

/// Maps the site encoding onto a 0-based residue index.
pub fn site_to_index(site: i32, peplen: usize) -> Result<usize> {
    if peplen == 0 {
        return Err(ShapeError::PeptideTooShort { peplen }.into());
    }
    match site {
        CTERM_SITE => Ok(peplen - 1),
        NTERM_SITE => Ok(0),
        s if s > 0 && (s as usize) <= peplen => Ok(s as usize - 1),
        s => Err(ShapeError::ModificationSiteOutOfRange { site: s, peplen }.into()),
    }
}

/// An ordered collection of precursors.
///
/// The fragment ranges of the precursors are arena indices into a fragment
/// table. They are only valid for the order they were assigned in, so any
/// operation that re-orders the collection drops them and
/// [`PrecursorTable::reset_frag_indices`] is the one way of assigning them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PrecursorTable {
    precursors: Vec<Precursor>,
}

impl PrecursorTable {
    pub fn new(precursors: Vec<Precursor>) -> Result<Self> {
        for prec in precursors.iter() {
            prec.validate()?;
        }
        Ok(Self { precursors })
    }

    pub fn len(&self) -> usize {
        self.precursors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.precursors.is_empty()
    }

    pub fn as_slice(&self) -> &[Precursor] {
        &self.precursors
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Precursor> {
        self.precursors.iter()
    }

    pub fn get(&self, idx: usize) -> Option<&Precursor> {
        self.precursors.get(idx)
    }

    pub fn into_inner(self) -> Vec<Precursor> {
        self.precursors
    }

    pub fn peplens(&self) -> Vec<usize> {
        self.precursors.iter().map(|x| x.peplen()).collect()
    }

    /// True if any precursor carries a fragment range.
    pub fn has_frag_indices(&self) -> bool {
        self.precursors.iter().any(|x| x.frag_range.is_some())
    }

    pub fn frag_ranges(&self) -> Result<Vec<FragRange>> {
        self.precursors
            .iter()
            .map(|x| {
                x.frag_range.ok_or_else(|| {
                    ShapeError::MissingFragmentRange {
                        sequence: x.sequence.clone(),
                    }
                    .into()
                })
            })
            .collect()
    }

    pub fn is_sorted_by_peplen(&self) -> bool {
        self.precursors
            .windows(2)
            .all(|w| w[0].peplen() <= w[1].peplen())
    }

    /// Stable sort by peptide length. Drops every fragment range.
    pub fn sort_by_peplen(&mut self) {
        self.precursors.sort_by_key(|x| x.peplen());
        self.clear_frag_indices();
    }

    pub fn clear_frag_indices(&mut self) {
        for prec in self.precursors.iter_mut() {
            prec.frag_range = None;
        }
    }

    /// Assigns contiguous, non-overlapping fragment ranges in the current
    /// order and returns the total number of fragment rows.
    pub fn reset_frag_indices(&mut self) -> usize {
        let ranges = contiguous_frag_ranges(self.precursors.iter().map(|x| x.peplen()));
        let total = ranges.last().map(|x| x.end).unwrap_or(0);
        for (prec, range) in self.precursors.iter_mut().zip(ranges) {
            prec.frag_range = Some(range);
        }
        total
    }

    /// Indices of the precursors grouped by peptide length, in ascending
    /// length and collection order inside each group.
    pub fn peplen_groups(&self) -> BTreeMap<usize, Vec<usize>> {
        let mut out: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (i, prec) in self.precursors.iter().enumerate() {
            out.entry(prec.peplen()).or_default().push(i);
        }
        out
    }

    pub(crate) fn precursors_mut(&mut self) -> &mut [Precursor] {
        &mut self.precursors
    }

    pub(crate) fn from_validated(precursors: Vec<Precursor>) -> Self {
        Self { precursors }
    }
}

/// Prefix sum of `peplen - 1` rows per precursor.
pub fn contiguous_frag_ranges(peplens: impl IntoIterator<Item = usize>) -> Vec<FragRange> {
    let mut start = 0;
    peplens
        .into_iter()
        .map(|peplen| {
            let end = start + peplen.saturating_sub(1);
            let out = FragRange::new(start, end);
            start = end;
            out
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> PrecursorTable {
        PrecursorTable::new(vec![
            Precursor::unmodified("PEPTIDEK"),
            Precursor::unmodified("AMS"),
            Precursor::new("AMSK", vec!["Oxidation@M".into()], vec![2]).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn test_mismatched_mod_lists() {
        let out = Precursor::new("AMS", vec!["Oxidation@M".into()], vec![]);
        assert!(out.is_err());
        let out = Precursor::unmodified("AMS").with_mod_deltas(vec![1.0, 2.0], vec![1]);
        assert!(out.is_err());
    }

    #[test]
    fn test_table_validates_every_precursor() {
        let broken = Precursor {
            sequence: "AMS".into(),
            mods: vec!["Oxidation@M".into()],
            ..Default::default()
        };
        let out = PrecursorTable::new(vec![Precursor::unmodified("PEPTIDE"), broken]);
        assert!(matches!(
            out,
            Err(crate::errors::PepFragError::Shape(
                ShapeError::ExpectedSlicesSameLength { .. }
            ))
        ));
    }

    #[test]
    fn test_site_encoding() {
        assert_eq!(site_to_index(0, 5).unwrap(), 0);
        assert_eq!(site_to_index(-1, 5).unwrap(), 4);
        assert_eq!(site_to_index(3, 5).unwrap(), 2);
        assert_eq!(site_to_index(5, 5).unwrap(), 4);
        assert!(site_to_index(6, 5).is_err());
        assert!(site_to_index(-2, 5).is_err());
        assert!(site_to_index(-1, 0).is_err());
    }

    #[test]
    fn test_reset_frag_indices_partition() {
        let mut table = sample_table();
        let total = table.reset_frag_indices();
        assert_eq!(total, 7 + 2 + 3);

        let ranges = table.frag_ranges().unwrap();
        for (prec, range) in table.iter().zip(ranges.iter()) {
            assert_eq!(range.len(), prec.peplen() - 1);
        }
        for w in ranges.windows(2) {
            assert_eq!(w[0].end, w[1].start);
        }
    }

    #[test]
    fn test_sort_drops_indices() {
        let mut table = sample_table();
        table.reset_frag_indices();
        assert!(table.has_frag_indices());
        assert!(!table.is_sorted_by_peplen());

        table.sort_by_peplen();
        assert!(!table.has_frag_indices());
        assert!(table.is_sorted_by_peplen());
        assert_eq!(table.peplens(), vec![3, 4, 8]);
    }

    #[test]
    fn test_peplen_groups() {
        let mut precs = sample_table().into_inner();
        precs.push(Precursor::unmodified("GGG"));
        let table = PrecursorTable::new(precs).unwrap();
        let groups = table.peplen_groups();
        assert_eq!(groups.keys().copied().collect::<Vec<_>>(), vec![3, 4, 8]);
        assert_eq!(groups[&3], vec![1, 3]);
    }

    #[test]
    fn test_frag_range_serde_names() {
        let mut prec = Precursor::unmodified("PEPTIDE").with_charge(2);
        prec.frag_range = Some(FragRange::new(3, 9));
        let json = serde_json::to_value(&prec).unwrap();
        assert_eq!(json["frag_start_idx"], 3);
        assert_eq!(json["frag_end_idx"], 9);
    }
}
