//! Salary package parsing.
//!
//! Salary packages are free text entered by companies (`"$50k-$70k"`,
//! `"45,000 - 60,000"`, `"12 LPA"`). Filtering compares a single number per
//! job: the midpoint of a range, or the value itself when there is no range.

const THOUSAND: f64 = 1_000.0;

/// Extract a comparable salary figure from a free-text package.
///
/// A `k` suffix multiplies a figure by one thousand. Currency symbols,
/// thousands separators, and other words are ignored. Returns `None` when no
/// number can be read.
///
/// # Examples
///
/// ```
/// use job_filter::salary_midpoint;
///
/// assert_eq!(salary_midpoint("50k-70k"), Some(60_000.0));
/// assert_eq!(salary_midpoint("$45,000"), Some(45_000.0));
/// assert_eq!(salary_midpoint("Negotiable"), None);
/// ```
#[must_use]
pub fn salary_midpoint(raw: &str) -> Option<f64> {
    let mut parts = raw.split(['-', '\u{2013}']);
    let low = parts.next().and_then(parse_amount)?;
    match parts.next() {
        Some(upper) => parse_amount(upper).map(|high| (low + high) / 2.0),
        None => Some(low),
    }
}

fn parse_amount(part: &str) -> Option<f64> {
    let mut chars = part
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .peekable();

    let mut digits = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() || c == '.' {
            digits.push(c);
        } else if c != ',' {
            break;
        }
        chars.next();
    }
    let value = digits.parse::<f64>().ok()?;

    let suffix: String = chars
        .skip_while(|c| c.is_whitespace())
        .take_while(|c| c.is_alphabetic())
        .collect();
    if suffix.eq_ignore_ascii_case("k") {
        Some(value * THOUSAND)
    } else {
        Some(value)
    }
}
