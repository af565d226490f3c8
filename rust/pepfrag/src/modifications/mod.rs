pub mod definition;
pub mod loss;
pub mod mass;
pub mod registry;

pub use definition::{
    ModificationDefinition,
    ModificationSource,
};
pub use loss::{
    calc_modloss_mass,
    select_modloss,
};
pub use mass::{
    calc_mod_masses_for_same_len_seqs,
    delta_mass_per_site,
    mass_per_site,
    mass_sum,
    site_mass_shifts,
};
pub use registry::ModificationRegistry;
