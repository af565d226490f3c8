use crate::errors::{
    Result,
    ShapeError,
};
use std::collections::BTreeMap;

/// Number of precursors per sub-batch when not configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 500_000;

/// Indices of up to `batch_size` precursors sharing one peptide length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthBatch {
    pub peplen: usize,
    pub indices: Vec<usize>,
}

/// Splits length groups into sub-batches of at most `batch_size` entries.
///
/// Batches come out in ascending length and, inside a length, in the
/// order of the group, so concatenating their indices gives back the
/// stable sort by length.
pub fn length_batches(groups: BTreeMap<usize, Vec<usize>>, batch_size: usize) -> Result<Vec<LengthBatch>> {
    if batch_size == 0 {
        return Err(ShapeError::ZeroBatchSize.into());
    }
    let mut out = Vec::new();
    for (peplen, indices) in groups {
        for chunk in indices.chunks(batch_size) {
            out.push(LengthBatch {
                peplen,
                indices: chunk.to_vec(),
            });
        }
    }
    Ok(out)
}
