/// Monoisotopic mass of a proton.
pub const MASS_PROTON: f64 = 1.007_276_466_88;

/// Monoisotopic mass of a hydrogen atom (1H).
pub const MASS_H: f64 = 1.007_825_032_23;

pub const MASS_O: f64 = 15.994_914_619_57;
pub const MASS_N: f64 = 14.003_074_004_43;

/// H2O, used for y ions, water losses and whole peptide masses.
pub const MASS_H2O: f64 = 2.0 * MASS_H + MASS_O;

/// NH3, used for ammonia losses and the c/z ion conversions.
pub const MASS_NH3: f64 = MASS_N + 3.0 * MASS_H;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_constants() {
        assert!((MASS_H2O - 18.010_564_684).abs() < 1e-8);
        assert!((MASS_NH3 - 17.026_549_101).abs() < 1e-8);
    }
}
