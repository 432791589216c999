//! Integer-first percent helpers (no float arithmetic).

use alloc::format;
use alloc::string::String;

/// `num / den` as tenths of a percent, rounded half-to-even.
/// Returns `None` when `den == 0`.
///
/// Example: 3 / 20 → 150 (15.0 %), 1 / 3 → 333 (33.3 %).
pub fn percent_one_decimal_tenths(num: u64, den: u64) -> Option<u64> {
    if den == 0 {
        return None;
    }
    let scaled = u128::from(num) * 1000;
    let den = u128::from(den);
    let q = scaled / den;
    let r = scaled % den;
    let twice = r * 2;
    let rounded = if twice > den || (twice == den && q % 2 == 1) { q + 1 } else { q };
    Some(u64::try_from(rounded).unwrap_or(u64::MAX))
}

/// Render tenths of a percent as `"15.0%"`.
pub fn format_tenths_pct(tenths: u64) -> String {
    format!("{}.{}%", tenths / 10, tenths % 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenths_basic() {
        assert_eq!(percent_one_decimal_tenths(3, 20), Some(150));
        assert_eq!(percent_one_decimal_tenths(1, 3), Some(333));
        assert_eq!(percent_one_decimal_tenths(2, 3), Some(667));
        assert_eq!(percent_one_decimal_tenths(0, 7), Some(0));
        assert_eq!(percent_one_decimal_tenths(1, 0), None);
    }

    #[test]
    fn tenths_half_even() {
        // 1/16 = 6.25 % → 62.5 tenths → 62 (even)
        assert_eq!(percent_one_decimal_tenths(1, 16), Some(62));
        // 3/16 = 18.75 % → 187.5 tenths → 188 (even)
        assert_eq!(percent_one_decimal_tenths(3, 16), Some(188));
    }

    #[test]
    fn tenths_format() {
        assert_eq!(format_tenths_pct(150), "15.0%");
        assert_eq!(format_tenths_pct(1234), "123.4%");
        assert_eq!(format_tenths_pct(5), "0.5%");
    }
}
