pub mod amino_acids;
pub mod constants;
pub mod elements;
pub mod formula;

pub use amino_acids::{
    calc_aa_masses_for_same_len_seqs,
    calc_sequence_masses_for_same_len_seqs,
    residue_mass,
    residue_masses,
    sequence_mass,
};
pub use constants::{
    MASS_H,
    MASS_H2O,
    MASS_NH3,
    MASS_PROTON,
};
pub use elements::element_mass;
pub use formula::calc_formula_mass;
