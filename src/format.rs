//! Number formatting for the CSV, JSON and console outputs.

/// Scientific notation with a signed, at least two digit exponent (`1.500000e+03`).
pub fn sci(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let formatted = format!("{:.*e}", precision, value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        }
        None => formatted,
    }
}

/// Fixed notation with comma thousands separators (`1,234,567.8`).
pub fn thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };

    match fraction {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sci() {
        assert_eq!(sci(1500.0, 6), "1.500000e+03");
        assert_eq!(sci(0.0, 6), "0.000000e+00");
        assert_eq!(sci(-2.5e-7, 3), "-2.500e-07");
        assert_eq!(sci(1.0e123, 1), "1.0e+123");
        assert_eq!(
            sci(1.0034567890123456, 15),
            format!("{:.15e}", 1.0034567890123456).replace('e', "e+0")
        );
    }

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(1234567.89, 1), "1,234,567.9");
        assert_eq!(thousands(999.0, 1), "999.0");
        assert_eq!(thousands(1000.0, 0), "1,000");
        assert_eq!(thousands(-12345.0, 1), "-12,345.0");
        assert_eq!(thousands(0.0, 1), "0.0");
    }
}
