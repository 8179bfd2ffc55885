// src/domain/extract.rs

use once_cell::sync::Lazy;
use regex::Regex;

static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+\.?\d*)").expect("valid regex"));
static BHK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*(?:bhk|bedroom|bh)").expect("valid regex"));

/// Builder name fragments matched case-insensitively. Both spellings of L&T are listed.
pub const PREFERRED_BUILDERS: &[&str] = &[
    "prestige",
    "sobha",
    "brigade",
    "puravankara",
    "godrej",
    "embassy",
    "l&t",
    "l & t",
    "salarpuria",
    "sattva",
    "assetz",
    "casagrand",
];

const CRORE: f64 = 10_000_000.0;
const LAKH: f64 = 100_000.0;
const THOUSAND: f64 = 1_000.0;

/// Parses a displayed price ("₹85 Lakh", "2.5 Cr", "45,00,000") into rupees.
pub fn parse_price(text: &str) -> Option<f64> {
    let cleaned = text
        .to_lowercase()
        .replace(',', "")
        .replace('₹', "")
        .replace("rs", "");
    let cleaned = cleaned.trim();

    let value: f64 = NUMBER.captures(cleaned)?.get(1)?.as_str().parse().ok()?;

    let scale = if cleaned.contains("crore") || cleaned.contains("cr") {
        CRORE
    } else if cleaned.contains("lakh") || cleaned.contains("lac") {
        LAKH
    } else if cleaned.contains('k') {
        THOUSAND
    } else {
        1.0
    };

    Some(value * scale).filter(|v| v.is_finite())
}

/// Returns the bedroom digits from "3 BHK", "2bhk", "4 Bedroom" or "2 bh".
pub fn parse_bhk(text: &str) -> Option<String> {
    BHK.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn is_preferred_builder(text: &str) -> bool {
    let text = text.to_lowercase();
    PREFERRED_BUILDERS.iter().any(|b| text.contains(b))
}

const SQM_TO_SQFT: f64 = 10.7639;
const SQYD_TO_SQFT: f64 = 9.0;
const ACRE_TO_SQFT: f64 = 43_560.0;

/// Normalizes a displayed area to square feet. Square feet is assumed when
/// no other unit is named.
pub fn parse_area_sqft(text: &str) -> Option<f64> {
    let cleaned = text.to_lowercase().replace(',', "");
    let value: f64 = NUMBER.captures(&cleaned)?.get(1)?.as_str().parse().ok()?;

    let scale = if ["sq.m", "sqm", "sq m", "sq. m", "square met"]
        .iter()
        .any(|u| cleaned.contains(u))
    {
        SQM_TO_SQFT
    } else if ["sq.yd", "sqyd", "sq yd", "sq. yd", "square yard"]
        .iter()
        .any(|u| cleaned.contains(u))
    {
        SQYD_TO_SQFT
    } else if cleaned.contains("acre") {
        ACRE_TO_SQFT
    } else {
        1.0
    };

    Some((value * scale).round()).filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_suffixes_scale() {
        assert_eq!(parse_price("2.5 Cr"), Some(25_000_000.0));
        assert_eq!(parse_price("85 Lakh"), Some(8_500_000.0));
        assert_eq!(parse_price("₹ 72 Lac"), Some(7_200_000.0));
        assert_eq!(parse_price("1.1 Crore onwards"), Some(11_000_000.0));
        assert_eq!(parse_price("35k"), Some(35_000.0));
        assert_eq!(parse_price("Rs. 45,00,000"), Some(4_500_000.0));
    }

    #[test]
    fn price_is_case_insensitive() {
        assert_eq!(parse_price("₹85 LAKH"), Some(8_500_000.0));
        assert_eq!(parse_price("1.25 CR"), Some(12_500_000.0));
    }

    #[test]
    fn price_takes_leading_number_of_a_range() {
        assert_eq!(parse_price("₹72 - 85 Lakh"), Some(7_200_000.0));
        assert_eq!(parse_price("₹1.2 - 1.5 Cr"), Some(12_000_000.0));
    }

    #[test]
    fn unparseable_price_is_none() {
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("   "), None);
        assert_eq!(parse_price("Price on Request"), None);
    }

    #[test]
    fn bhk_patterns() {
        assert_eq!(parse_bhk("3 BHK Luxury Apartment").as_deref(), Some("3"));
        assert_eq!(parse_bhk("2bhk").as_deref(), Some("2"));
        assert_eq!(parse_bhk("4 Bedroom Villa").as_deref(), Some("4"));
        assert_eq!(parse_bhk("Spacious 2 bh flat").as_deref(), Some("2"));
        assert_eq!(parse_bhk("Studio Apartment"), None);
    }

    #[test]
    fn preferred_builders_match_substrings() {
        assert!(is_preferred_builder("Prestige Lakeside Habitat"));
        assert!(is_preferred_builder("L & T Raintree Boulevard"));
        assert!(is_preferred_builder("L&T Raintree Boulevard"));
        assert!(is_preferred_builder("by SOBHA Ltd"));
        assert!(!is_preferred_builder("Random Builder Co"));
        assert!(!is_preferred_builder(""));
    }

    #[test]
    fn area_units_normalize_to_sqft() {
        assert_eq!(parse_area_sqft("1,150 sqft"), Some(1150.0));
        assert_eq!(parse_area_sqft("1200"), Some(1200.0));
        assert_eq!(parse_area_sqft("100 sq.m"), Some(1076.0));
        assert_eq!(parse_area_sqft("200 sq.yd"), Some(1800.0));
        assert_eq!(parse_area_sqft("Super Area"), None);
    }
}
