//! Theoretical fragment ion m/z values for (modified) peptides.
//!
//! A [`ModificationRegistry`] is loaded once and passed by reference to
//! the calculators. Fragment m/z values of a whole collection of
//! precursors go into one flat [`FragmentTable`], each precursor
//! addressing its rows through a `[frag_start_idx, frag_end_idx)` range.
//!
//! ```
//! use pepfrag::{
//!     ModificationRegistry,
//!     Precursor,
//!     PrecursorTable,
//!     create_fragment_mz_table,
//!     get_charged_frag_types,
//! };
//!
//! let registry = ModificationRegistry::builtin().unwrap();
//! let mut precursors = PrecursorTable::new(vec![
//!     Precursor::new("AMSK", vec!["Oxidation@M".into()], vec![2]).unwrap(),
//!     Precursor::unmodified("PEPTIDE"),
//! ])
//! .unwrap();
//! let frag_types = get_charged_frag_types(&["b", "y"], 2).unwrap();
//! let table = create_fragment_mz_table(&registry, &mut precursors, &frag_types, None, None).unwrap();
//!
//! assert_eq!(table.nrows(), 3 + 6);
//! assert_eq!(table.ncols(), 4);
//! assert_eq!(precursors.get(0).unwrap().frag_range.unwrap().end, 3);
//! ```

// Declare modules
pub mod chemistry;
pub mod errors;
pub mod fragments;
pub mod models;
pub mod modifications;
pub mod utils;

// Re-export main structures
pub use crate::fragments::{
    ChargedFragType,
    FragmentIonType,
    FragmentMzBuilder,
    FragmentTable,
    IonSeriesTerminality,
    concat_precursor_fragment_tables,
    create_fragment_mz_table,
    create_fragment_mz_table_ignore_old_indices,
    get_charged_frag_types,
    parse_charged_frag_type,
    update_precursor_mz,
};
pub use crate::models::{
    FragRange,
    Precursor,
    PrecursorTable,
};
pub use crate::modifications::ModificationRegistry;
pub use crate::utils::DEFAULT_BATCH_SIZE;

// Re-export errors
pub use crate::errors::{
    ConfigurationError,
    IonParsingError,
    LookupError,
    PepFragError,
    ShapeError,
};
