mod arrays;
mod precursor;

pub use arrays::Array2D;
pub use precursor::{
    CTERM_SITE,
    FragRange,
    NTERM_SITE,
    Precursor,
    PrecursorTable,
    contiguous_frag_ranges,
    site_to_index,
};
