use rustyms::prelude::Element;
use std::num::NonZeroU16;

/// Resolves a composition symbol into an element and optional isotope.
///
/// Labelled isotopes are written with their mass number as a prefix,
/// e.g. `13C`, `15N`, `18O` and `2H`. `D` is accepted for deuterium.
/// Symbols are case sensitive.
pub fn parse_element_symbol(symbol: &str) -> Option<(Element, Option<NonZeroU16>)> {
    if symbol == "D" {
        return Some((Element::H, NonZeroU16::new(2)));
    }
    let split = symbol
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(symbol.len());
    let (mass_number, name) = symbol.split_at(split);
    let isotope = if mass_number.is_empty() {
        None
    } else {
        Some(NonZeroU16::new(mass_number.parse::<u16>().ok()?)?)
    };
    // rustyms matches symbols case insensitively
    let element = Element::try_from(name)
        .ok()
        .filter(|el| el.to_string() == name)?;
    Some((element, isotope))
}

/// Monoisotopic mass of an element symbol as used in composition strings.
///
/// Example:
/// ```
/// use pepfrag::chemistry::element_mass;
/// assert!((element_mass("C").unwrap() - 12.0).abs() < 1e-9);
/// assert!(element_mass("Ag").is_some());
/// assert!(element_mass("Xx").is_none());
/// ```
pub fn element_mass(symbol: &str) -> Option<f64> {
    let (element, isotope) = parse_element_symbol(symbol)?;
    element.mass(isotope).map(|x| x.value)
}
