/// Short string for `value` with at most `significant_digits` digits.
///
/// Values of 1e5 or above, or below 0.01 in magnitude, use a compact
/// exponent form (`1e-5`, `1.5e7`). Integers with more digits than
/// requested are shown in full rather than rounded (`num2str(123.0, 2)` is
/// `"123"`). Trailing zeros are dropped.
pub fn num2str(value: f64, significant_digits: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let digits = significant_digits.max(1) as i32;

    let rounded = {
        let exponent = decimal_exponent(value);
        let factor = 10f64.powi(exponent - digits + 1);
        (value / factor).round() * factor
    };
    let exponent = decimal_exponent(rounded);

    if !(-2..5).contains(&exponent) {
        let mantissa = rounded / 10f64.powi(exponent);
        let decimals = (digits - 1).max(0) as usize;
        let mantissa = trim_zeros(format!("{:.*}", decimals, mantissa));
        return format!("{mantissa}e{exponent}");
    }
    if exponent >= digits - 1 {
        return format!("{:.0}", value);
    }
    let decimals = (digits - 1 - exponent) as usize;
    trim_zeros(format!("{:.*}", decimals, rounded))
}

/// `floor(log10(|value|))`, robust to rounding at exact powers of ten.
fn decimal_exponent(value: f64) -> i32 {
    let magnitude = value.abs();
    let mut exponent = magnitude.log10().floor() as i32;
    if magnitude / 10f64.powi(exponent) >= 10.0 {
        exponent += 1;
    } else if magnitude / 10f64.powi(exponent) < 1.0 {
        exponent -= 1;
    }
    exponent
}

fn trim_zeros(text: String) -> String {
    if !text.contains('.') {
        return text;
    }
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_notation() {
        assert_eq!(num2str(1.2345, 2), "1.2");
        assert_eq!(num2str(100.0, 2), "100");
        assert_eq!(num2str(123.0, 2), "123");
        assert_eq!(num2str(0.5, 2), "0.5");
        assert_eq!(num2str(0.05, 1), "0.05");
        assert_eq!(num2str(-0.30103, 2), "-0.3");
        assert_eq!(num2str(-8.0, 1), "-8");
        assert_eq!(num2str(0.0, 3), "0");
    }

    #[test]
    fn exponent_notation() {
        assert_eq!(num2str(1e-5, 1), "1e-5");
        assert_eq!(num2str(1.5e7, 2), "1.5e7");
        assert_eq!(num2str(1e-8, 2), "1e-8");
        assert_eq!(num2str(0.0012, 2), "1.2e-3");
    }
}
