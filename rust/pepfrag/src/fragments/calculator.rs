use super::frag_types::{
    ChargedFragType,
    IonSeriesTerminality,
};
use super::mass_calc::calc_b_y_and_peptide_masses_for_same_len_seqs;
use super::table::FragmentTable;
use crate::chemistry::MASS_PROTON;
use crate::errors::{
    Result,
    ShapeError,
};
use crate::models::{
    Array2D,
    FragRange,
    Precursor,
    PrecursorTable,
};
use crate::modifications::{
    ModificationRegistry,
    calc_modloss_mass,
};
use crate::utils::{
    DEFAULT_BATCH_SIZE,
    LengthBatch,
    length_batches,
};
use rayon::prelude::*;
use std::time::Instant;
use tracing::{
    debug,
    info,
    instrument,
};

fn concat_modloss(
    registry: &ModificationRegistry,
    precursors: &[&Precursor],
    terminality: IonSeriesTerminality,
) -> Result<Vec<f64>> {
    let mut out = Vec::new();
    for prec in precursors {
        out.extend(calc_modloss_mass(
            registry,
            prec.peplen(),
            &prec.mods,
            &prec.mod_sites,
            terminality,
        )?);
    }
    Ok(out)
}

/// Writes the fragment m/z values of precursors sharing one peptide length
/// into `out`, row-major with one column per requested type.
fn fill_fragment_mz_values_for_same_peplen(
    registry: &ModificationRegistry,
    precursors: &[&Precursor],
    charged_frag_types: &[ChargedFragType],
    out: &mut [f64],
) -> Result<()> {
    let by_masses = calc_b_y_and_peptide_masses_for_same_len_seqs(registry, precursors)?;
    let b_masses = by_masses.b_masses.values();
    let y_masses = by_masses.y_masses.values();
    let ncols = charged_frag_types.len();
    if out.len() != b_masses.len() * ncols {
        return Err(ShapeError::ExpectedSlicesSameLength {
            expected: b_masses.len() * ncols,
            other: out.len(),
            context: "Fragment m/z block of a same length batch".to_string(),
        }
        .into());
    }
    if ncols == 0 {
        return Ok(());
    }

    let requests_modloss = |terminality: IonSeriesTerminality| {
        charged_frag_types
            .iter()
            .any(|x| x.ion_type.is_modloss() && x.ion_type.terminality() == terminality)
    };
    let b_losses = if requests_modloss(IonSeriesTerminality::NTerm) {
        Some(concat_modloss(registry, precursors, IonSeriesTerminality::NTerm)?)
    } else {
        None
    };
    let y_losses = if requests_modloss(IonSeriesTerminality::CTerm) {
        Some(concat_modloss(registry, precursors, IonSeriesTerminality::CTerm)?)
    } else {
        None
    };

    for (ri, row) in out.chunks_exact_mut(ncols).enumerate() {
        for (cell, frag) in row.iter_mut().zip(charged_frag_types.iter()) {
            let charge = frag.charge as f64;
            let (mass, losses) = match frag.ion_type.terminality() {
                IonSeriesTerminality::NTerm => (b_masses[ri], b_losses.as_deref()),
                IonSeriesTerminality::CTerm => (y_masses[ri], y_losses.as_deref()),
            };
            let loss = losses.filter(|_| frag.ion_type.is_modloss()).map(|x| x[ri]);
            *cell = match loss {
                Some(loss) if loss == 0.0 => 0.0,
                Some(loss) => (mass - loss) / charge + MASS_PROTON,
                None => (mass + frag.ion_type.mass_offset()) / charge + MASS_PROTON,
            };
        }
    }
    Ok(())
}

/// Fragment m/z block for precursors sharing one peptide length.
///
/// Returns `precursors.len() * (peplen - 1)` rows, the fragments of each
/// precursor contiguous and in b position order, and one column per
/// requested type. Modloss positions without a selected loss are 0.
pub fn calc_fragment_mz_values_for_same_peplen(
    registry: &ModificationRegistry,
    precursors: &[&Precursor],
    charged_frag_types: &[ChargedFragType],
) -> Result<Array2D<f64>> {
    let nrows: usize = precursors.iter().map(|x| x.num_fragments()).sum();
    let ncols = charged_frag_types.len();
    let mut values = vec![0.0; nrows * ncols];
    fill_fragment_mz_values_for_same_peplen(registry, precursors, charged_frag_types, &mut values)?;
    Array2D::from_flat_vector(values, nrows, ncols)
}

/// Builds fragment m/z tables for collections of precursors.
///
/// Precursors are grouped by length and split into sub-batches of at
/// most `batch_size` precursors. Sub-batches are computed in parallel,
/// each one writing straight into its own rows of the output table.
/// The precursors are only re-ordered once every sub-batch succeeded,
/// so a failing pass leaves them untouched.
#[derive(Debug, Clone)]
pub struct FragmentMzBuilder<'a> {
    registry: &'a ModificationRegistry,
    charged_frag_types: Vec<ChargedFragType>,
    batch_size: usize,
}

impl<'a> FragmentMzBuilder<'a> {
    pub fn new(registry: &'a ModificationRegistry, charged_frag_types: &[ChargedFragType]) -> Self {
        Self {
            registry,
            charged_frag_types: charged_frag_types.to_vec(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn charged_frag_types(&self) -> &[ChargedFragType] {
        &self.charged_frag_types
    }

    fn batch_precursors<'p>(precursors: &'p [Precursor], batch: &LengthBatch) -> Vec<&'p Precursor> {
        batch.indices.iter().map(|&i| &precursors[i]).collect()
    }

    /// Builds the table and (re)assigns fragment ranges as needed.
    ///
    /// * Precursors without ranges: sorted by length, re-indexed and
    ///   built from scratch. A reference table is not needed (and ignored).
    /// * Precursors with ranges and a reference table: the ranges are kept,
    ///   the new table has the rows of the reference.
    /// * Precursors with ranges but no reference: error, the ranges
    ///   would point into a table that does not exist.
    #[instrument(skip_all, name = "FragmentMzBuilder::build", level = "debug")]
    pub fn build(
        &self,
        precursors: &mut PrecursorTable,
        reference: Option<&FragmentTable>,
    ) -> Result<FragmentTable> {
        match (precursors.has_frag_indices(), reference) {
            (false, reference) => {
                if reference.is_some() {
                    debug!("Precursors have no fragment ranges, ignoring the reference table");
                }
                self.build_from_scratch(precursors)
            }
            (true, None) => Err(ShapeError::MissingReferenceTable.into()),
            (true, Some(reference)) => self.build_like_reference(precursors, reference),
        }
    }

    /// Drops any existing fragment ranges and builds from scratch.
    pub fn build_ignore_old_indices(&self, precursors: &mut PrecursorTable) -> Result<FragmentTable> {
        self.build_from_scratch(precursors)
    }

    fn build_from_scratch(&self, precursors: &mut PrecursorTable) -> Result<FragmentTable> {
        let st = Instant::now();
        let batches = length_batches(precursors.peplen_groups(), self.batch_size)?;
        let peplens: Vec<usize> = batches
            .iter()
            .flat_map(|x| std::iter::repeat_n(x.peplen, x.indices.len()))
            .collect();
        let (mut table, _) = FragmentTable::allocate(&peplens, &self.charged_frag_types)?;

        // Batches are laid out back to back in the sorted order
        let ncols = table.ncols();
        let mut rest = table.values_mut();
        let mut jobs = Vec::with_capacity(batches.len());
        for batch in batches.iter() {
            let len = batch.indices.len() * batch.peplen.saturating_sub(1) * ncols;
            let (block, tail) = std::mem::take(&mut rest).split_at_mut(len);
            jobs.push((batch, block));
            rest = tail;
        }

        let all = precursors.as_slice();
        jobs.into_par_iter()
            .try_for_each(|(batch, block)| -> Result<()> {
                let precs = Self::batch_precursors(all, batch);
                fill_fragment_mz_values_for_same_peplen(self.registry, &precs, &self.charged_frag_types, block)
            })?;

        precursors.sort_by_peplen();
        let nrows = precursors.reset_frag_indices();
        debug_assert_eq!(nrows, table.nrows());
        info!(
            "Built {} x {} fragment m/z table for {} precursors in {} batches, took {:#?}",
            table.nrows(),
            table.ncols(),
            precursors.len(),
            batches.len(),
            st.elapsed()
        );
        Ok(table)
    }

    fn build_like_reference(
        &self,
        precursors: &PrecursorTable,
        reference: &FragmentTable,
    ) -> Result<FragmentTable> {
        let st = Instant::now();
        let ranges = precursors.frag_ranges()?;
        for (prec, range) in precursors.iter().zip(ranges.iter()) {
            check_frag_range(prec, range, reference.nrows())?;
        }

        let batches = length_batches(precursors.peplen_groups(), self.batch_size)?;
        let mut table = FragmentTable::allocate_like(reference, &self.charged_frag_types)?;
        {
            let mut targets: Vec<Option<&mut [f64]>> =
                table.range_slices_mut(&ranges)?.into_iter().map(Some).collect();
            let jobs: Vec<(&LengthBatch, Vec<&mut [f64]>)> = batches
                .iter()
                .map(|batch| {
                    let batch_targets = batch.indices.iter().filter_map(|&i| targets[i].take()).collect();
                    (batch, batch_targets)
                })
                .collect();

            let all = precursors.as_slice();
            jobs.into_par_iter()
                .try_for_each(|(batch, batch_targets)| -> Result<()> {
                    let precs = Self::batch_precursors(all, batch);
                    let block = calc_fragment_mz_values_for_same_peplen(
                        self.registry,
                        &precs,
                        &self.charged_frag_types,
                    )?;
                    let mut src = block.values();
                    for target in batch_targets {
                        let (head, tail) = src.split_at(target.len());
                        target.copy_from_slice(head);
                        src = tail;
                    }
                    Ok(())
                })?;
        }

        info!(
            "Regenerated {} x {} fragment m/z table on the reference layout, took {:#?}",
            table.nrows(),
            table.ncols(),
            st.elapsed()
        );
        Ok(table)
    }
}

fn check_frag_range(prec: &Precursor, range: &FragRange, nrows: usize) -> Result<()> {
    if range.start > range.end || range.len() != prec.num_fragments() {
        return Err(ShapeError::FragmentRangeMismatch {
            start: range.start,
            end: range.end,
            peplen: prec.peplen(),
        }
        .into());
    }
    if range.end > nrows {
        return Err(ShapeError::FragmentRangeOutOfBounds {
            end: range.end,
            nrows,
        }
        .into());
    }
    Ok(())
}

/// Fragment m/z table for `precursors`, see [`FragmentMzBuilder::build`].
pub fn create_fragment_mz_table(
    registry: &ModificationRegistry,
    precursors: &mut PrecursorTable,
    charged_frag_types: &[ChargedFragType],
    reference: Option<&FragmentTable>,
    batch_size: Option<usize>,
) -> Result<FragmentTable> {
    FragmentMzBuilder::new(registry, charged_frag_types)
        .with_batch_size(batch_size.unwrap_or(DEFAULT_BATCH_SIZE))
        .build(precursors, reference)
}

/// Fragment m/z table built from scratch, existing ranges are discarded.
pub fn create_fragment_mz_table_ignore_old_indices(
    registry: &ModificationRegistry,
    precursors: &mut PrecursorTable,
    charged_frag_types: &[ChargedFragType],
    batch_size: Option<usize>,
) -> Result<FragmentTable> {
    FragmentMzBuilder::new(registry, charged_frag_types)
        .with_batch_size(batch_size.unwrap_or(DEFAULT_BATCH_SIZE))
        .build_ignore_old_indices(precursors)
}
