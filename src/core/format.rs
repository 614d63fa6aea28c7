//! Locale-free currency and percent formatting plus the lenient number parser.

/// Formats a dollar amount as `$1,234.56`. Non-finite values render as `$0`.
pub fn usd(n: f64) -> String {
    if !n.is_finite() {
        return "$0".to_string();
    }

    let cents = (n.abs() * 100.0).round() as u64;
    let sign = if n < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{sign}${}.{:02}",
        group_thousands(&(cents / 100).to_string()),
        cents % 100
    )
}

/// Formats a percentage with two decimals. Non-finite values render as `0%`.
pub fn pct(n: f64) -> String {
    if !n.is_finite() {
        return "0%".to_string();
    }
    format!("{n:.2}%")
}

/// Converts free-form user input into a number.
///
/// Strips `$`, `,`, `%` and whitespace before parsing. This never fails: anything that does not
/// parse to a finite number yields `0.0`. Use it for interactive amounts only, it is not a
/// validating parser.
pub fn parse_number(input: &str) -> f64 {
    let cleaned: String = input
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%') && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return 0.0;
    }

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usd_formatting() {
        assert_eq!(usd(0.0), "$0.00");
        assert_eq!(usd(8830.0), "$8,830.00");
        assert_eq!(usd(1234567.891), "$1,234,567.89");
        assert_eq!(usd(-2500.5), "-$2,500.50");
        assert_eq!(usd(999.999), "$1,000.00");
        assert_eq!(usd(-0.001), "$0.00");
    }

    #[test]
    fn test_usd_non_finite() {
        assert_eq!(usd(f64::NAN), "$0");
        assert_eq!(usd(f64::INFINITY), "$0");
    }

    #[test]
    fn test_pct_formatting() {
        assert_eq!(pct(11.666666), "11.67%");
        assert_eq!(pct(0.0), "0.00%");
        assert_eq!(pct(f64::NAN), "0%");
    }

    #[test]
    fn test_parse_number_strips_noise() {
        assert_eq!(parse_number("$8,830.22"), 8830.22);
        assert_eq!(parse_number(" 12 % "), 12.0);
        assert_eq!(parse_number("50,000"), 50000.0);
        assert_eq!(parse_number("-3.5"), -3.5);
    }

    #[test]
    fn test_parse_number_defaults_to_zero() {
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("abc"), 0.0);
        assert_eq!(parse_number("NaN"), 0.0);
        assert_eq!(parse_number("inf"), 0.0);
        assert_eq!(parse_number("1.2.3"), 0.0);
    }
}
