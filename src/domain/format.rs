//! Display formatting for amounts, USD values and percentages.
//!
//! Grouping follows en-US conventions (`,` thousands, `.` decimal point).

/// Shown in place of any value that could not be computed
pub const PLACEHOLDER: &str = "—";

/// Minimum fraction digits for USD values
const USD_MIN_FRACTION: usize = 2;

/// Maximum fraction digits for plain token amounts
const AMOUNT_MAX_FRACTION: usize = 3;

/// Every finite f64 has a terminating decimal expansion within this many fraction digits
const EXACT_FRACTION_DIGITS: usize = 1074;

/// Format a USD value with a `$` prefix and magnitude-scaled precision.
///
/// | magnitude            | max fraction digits |
/// |----------------------|---------------------|
/// | `|n| >= 1`           | 2                   |
/// | `0.01 <= |n| < 1`    | 6                   |
/// | `|n| < 0.01`         | 8                   |
///
/// At least two fraction digits are always shown. Non-finite input yields [`PLACEHOLDER`].
pub fn format_usd(n: f64) -> String {
    if !n.is_finite() {
        return PLACEHOLDER.to_string();
    }
    let abs = n.abs();
    let max_fraction = if abs < 0.01 {
        8
    } else if abs < 1.0 {
        6
    } else {
        2
    };
    format!("${}", format_grouped(n, USD_MIN_FRACTION, max_fraction))
}

/// Fixed two-decimal percentage, e.g. `-3.46%`.
///
/// Rounds the exact binary value, ties away from zero: `0.125` gives `0.13%`,
/// while `1.005` (stored as 1.00499...) gives `1.00%`.
pub fn format_percent(n: f64) -> String {
    if !n.is_finite() {
        return PLACEHOLDER.to_string();
    }
    let exact = format!("{:.*}", EXACT_FRACTION_DIGITS, n.abs());
    let (int_part, fraction) = round_half_up(&exact, 2);
    let sign = if n < 0.0 { "-" } else { "" };
    format!("{}{}.{}%", sign, int_part, fraction)
}

/// Same as [`format_percent`] for a value that may be absent
pub fn format_optional_percent(n: Option<f64>) -> String {
    n.map(format_percent).unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Token amount with thousands grouping and up to three fraction digits.
pub fn format_amount(n: f64) -> String {
    if !n.is_finite() {
        return PLACEHOLDER.to_string();
    }
    format_grouped(n, 0, AMOUNT_MAX_FRACTION)
}

/// Round the shortest decimal form of `n` to `max_fraction` digits, trim trailing
/// zeros down to `min_fraction`, and group the integer part in threes.
fn format_grouped(n: f64, min_fraction: usize, max_fraction: usize) -> String {
    // `{}` prints the shortest round-tripping digits, never an exponent
    let shortest = format!("{}", n.abs());
    let (int_part, frac_part) = round_half_up(&shortest, max_fraction);
    let int_part = int_part.as_str();

    let mut fraction = frac_part.trim_end_matches('0').to_string();
    while fraction.len() < min_fraction {
        fraction.push('0');
    }

    // A value that rounds to zero is shown unsigned
    let is_zero = int_part.bytes().all(|b| b == b'0') && fraction.bytes().all(|b| b == b'0');
    let sign = if n.is_sign_negative() && !is_zero { "-" } else { "" };

    let grouped = group_thousands(int_part);
    if fraction.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, fraction)
    }
}

/// Round an unsigned plain decimal string to `places` fraction digits, ties away
/// from zero. Returns the integer digits and exactly `places` fraction digits.
fn round_half_up(decimal: &str, places: usize) -> (String, String) {
    let (int_part, frac_part) = decimal.split_once('.').unwrap_or((decimal, ""));
    if frac_part.len() <= places {
        let mut fraction = frac_part.to_string();
        while fraction.len() < places {
            fraction.push('0');
        }
        return (int_part.to_string(), fraction);
    }

    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().take(places))
        .collect();
    if frac_part.as_bytes()[places] >= b'5' {
        let mut i = digits.len();
        loop {
            if i == 0 {
                digits.insert(0, b'1');
                break;
            }
            i -= 1;
            if digits[i] == b'9' {
                digits[i] = b'0';
            } else {
                digits[i] += 1;
                break;
            }
        }
    }

    let (int_digits, frac_digits) = digits.split_at(digits.len() - places);
    (
        int_digits.iter().map(|&b| b as char).collect(),
        frac_digits.iter().map(|&b| b as char).collect(),
    )
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
