//! Price domain - locale price text parsing and formatting
//!
//! Prices are whole currency units (`i64`). `None` is the "not found"
//! sentinel; `Some(0)` means free. Fractional prices round up so a
//! historical low is never under-reported.

/// Text the storefronts use for free games, lowercase.
const FREE_MARKERS: &[&str] = &["gratuito", "grátis", "free"];

/// Text meaning no usable price, lowercase.
const UNAVAILABLE_MARKERS: &[&str] = &[
    "não encontrado",
    "not found",
    "preço indisponível",
    "unavailable",
];

/// Sentinel emitted by [`format`] for an absent price.
pub const NOT_FOUND: &str = "not found";

/// Parse locale currency text ("R$ 1.299,90") into whole currency units.
///
/// Thousands separators are `.`, the decimal separator is `,`. Fractions
/// round up (ceiling). Free markers parse to `Some(0)`, unavailable markers
/// and anything unparseable to `None`. Never panics.
pub fn parse(text: &str) -> Option<i64> {
    let lowered = text.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }
    if FREE_MARKERS.iter().any(|m| lowered.contains(m)) {
        return Some(0);
    }
    if UNAVAILABLE_MARKERS.iter().any(|m| lowered.contains(m)) {
        return None;
    }

    let cleaned = lowered.replace("r$", "").replace('.', "").replace(',', ".");
    let run: String = cleaned
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if run.is_empty() {
        return None;
    }
    let value: f64 = run.parse().ok()?;
    Some(value.ceil() as i64)
}

/// Inverse of [`parse`]: `None` -> `"not found"`, `Some(0)` -> `"0"`.
pub fn format(price: Option<i64>) -> String {
    match price {
        None => NOT_FOUND.to_string(),
        Some(value) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locale_prices() {
        assert_eq!(parse("R$ 199,90"), Some(200));
        assert_eq!(parse("R$ 1.299,00"), Some(1299));
        assert_eq!(parse("R$ 59,99"), Some(60));
        assert_eq!(parse("R$ 47,49"), Some(48));
        assert_eq!(parse("23,01"), Some(24));
        assert_eq!(parse("R$ 40"), Some(40));
    }

    #[test]
    fn test_parse_free_markers() {
        assert_eq!(parse("Gratuito"), Some(0));
        assert_eq!(parse("grátis"), Some(0));
        assert_eq!(parse("Free To Play"), Some(0));
    }

    #[test]
    fn test_parse_unavailable_markers() {
        assert_eq!(parse("Não encontrado"), None);
        assert_eq!(parse("Preço indisponível"), None);
        assert_eq!(parse("unavailable"), None);
        assert_eq!(parse("not found"), None);
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("   "), None);
        assert_eq!(parse("em breve"), None);
        assert_eq!(parse("R$ --"), None);
    }

    #[test]
    fn test_format() {
        assert_eq!(format(None), "not found");
        assert_eq!(format(Some(0)), "0");
        assert_eq!(format(Some(1299)), "1299");
    }

    #[test]
    fn test_round_trip_after_ceiling() {
        for (text, units) in [
            ("R$ 199,90", 200),
            ("R$ 1.299,00", 1299),
            ("R$ 60", 60),
            ("Gratuito", 0),
        ] {
            let parsed = parse(text);
            assert_eq!(parsed, Some(units));
            assert_eq!(parse(&format(parsed)), Some(units));
        }
        assert_eq!(parse(&format(None)), None);
    }
}
