//! Locale-tolerant percent/number cells: "15%", "0,5", "12,5 %", "7".

/// Parses a percent or plain number into a fraction. `%` divides by 100, `,` is a decimal point.
/// Anything unparseable (or non-finite) is 0.0.
pub fn parse_percent(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }

    let is_percent = s.ends_with('%');
    let s = s.trim_end_matches('%').replace(',', ".");

    let value = match s.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => return 0.0,
    };

    if is_percent {
        value / 100.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::parse_percent;

    #[test]
    fn percent_suffix_divides_by_hundred() {
        assert_eq!(parse_percent("15%"), 0.15);
        assert_eq!(parse_percent("50%"), 0.5);
        assert_eq!(parse_percent("100%"), 1.0);
    }

    #[test]
    fn comma_is_decimal_separator() {
        assert_eq!(parse_percent("0,5"), 0.5);
        assert_eq!(parse_percent("12,5%"), 0.125);
        assert_eq!(parse_percent("5,5%"), 0.055);
    }

    #[test]
    fn plain_numbers_are_unchanged() {
        assert_eq!(parse_percent("7"), 7.0);
        assert_eq!(parse_percent("50"), 50.0);
        assert_eq!(parse_percent("0.15"), 0.15);
    }

    #[test]
    fn whitespace_is_tolerated() {
        assert_eq!(parse_percent("  20% "), 0.2);
        assert_eq!(parse_percent("15 %"), 0.15);
    }

    #[test]
    fn garbage_falls_back_to_zero() {
        assert_eq!(parse_percent(""), 0.0);
        assert_eq!(parse_percent("   "), 0.0);
        assert_eq!(parse_percent("abc"), 0.0);
        assert_eq!(parse_percent("--"), 0.0);
        assert_eq!(parse_percent("%"), 0.0);
        assert_eq!(parse_percent("1,5.3"), 0.0);
        assert_eq!(parse_percent("inf"), 0.0);
        assert_eq!(parse_percent("NaN%"), 0.0);
    }
}
