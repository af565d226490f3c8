pub mod calculator;
pub mod frag_types;
pub mod mass_calc;
pub mod precursor_mz;
pub mod table;

pub use calculator::{
    FragmentMzBuilder,
    calc_fragment_mz_values_for_same_peplen,
    create_fragment_mz_table,
    create_fragment_mz_table_ignore_old_indices,
};
pub use frag_types::{
    ChargedFragType,
    FragmentIonType,
    IonSeriesTerminality,
    get_charged_frag_types,
    parse_charged_frag_type,
};
pub use mass_calc::{
    ByMasses,
    calc_b_y_and_peptide_mass,
    calc_b_y_and_peptide_masses_for_same_len_seqs,
    calc_peptide_masses_for_same_len_seqs,
};
pub use precursor_mz::update_precursor_mz;
pub use table::{
    FragmentTable,
    concat_precursor_fragment_tables,
};
