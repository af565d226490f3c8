use super::elements::element_mass;
use crate::errors::ConfigurationError;
use regex::Regex;
use std::sync::LazyLock;

static FORMULA_TERM_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d*[A-Z][a-z]?)(?:\((-?\d+)\))?").expect("Formula term regex should compile")
});

/// Parses a composition string into `(element, count)` pairs.
///
/// The grammar is a sequence of `Symbol(count)` terms, where the count is
/// optional (defaults to 1) and can be negative. Whitespace between terms
/// is ignored. An empty string is a valid, empty composition.
///
/// `C(2)H(3)N(1)O(1)`, `H(-1)O(3)P(1)` and `C(2) H(3) N O` are all valid.
pub fn parse_formula(formula: &str) -> Result<Vec<(String, i32)>, ConfigurationError> {
    let compact: String = formula.chars().filter(|c| !c.is_whitespace()).collect();
    let mut out = Vec::new();
    let mut consumed = 0;

    for caps in FORMULA_TERM_REGEX.captures_iter(&compact) {
        let whole = caps.get(0).expect("Capture group 0 always exists");
        if whole.start() != consumed {
            return Err(ConfigurationError::InvalidFormula {
                formula: formula.to_string(),
                context: "Unexpected characters between element terms",
            });
        }
        consumed = whole.end();

        let element = caps[1].to_string();
        let count = match caps.get(2) {
            Some(cnt) => {
                cnt.as_str()
                    .parse::<i32>()
                    .map_err(|_| ConfigurationError::InvalidFormula {
                        formula: formula.to_string(),
                        context: "Unable to parse the element count",
                    })?
            }
            None => 1,
        };
        out.push((element, count));
    }

    if consumed != compact.len() {
        return Err(ConfigurationError::InvalidFormula {
            formula: formula.to_string(),
            context: "Trailing characters after the last element term",
        });
    }
    Ok(out)
}

/// Monoisotopic mass of a composition string.
///
/// Example:
/// ```
/// use pepfrag::chemistry::calc_formula_mass;
/// let water = calc_formula_mass("H(2)O(1)").unwrap();
/// assert!((water - 18.010_564_684).abs() < 1e-6);
/// assert!(calc_formula_mass("H(2)Q(1)").is_err());
/// ```
pub fn calc_formula_mass(formula: &str) -> Result<f64, ConfigurationError> {
    parse_formula(formula)?
        .into_iter()
        .try_fold(0.0, |acc, (element, count)| match element_mass(&element) {
            Some(mass) => Ok(acc + mass * count as f64),
            None => Err(ConfigurationError::UnknownElement {
                element,
                formula: formula.to_string(),
            }),
        })
}
