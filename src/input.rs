//! Text-to-integer parsing at the input boundary
//!
//! Numeric fields arrive as free text. Both parsers read an optional sign and
//! the leading run of digits, ignoring surrounding whitespace and anything
//! after the digits ("12abc" reads as 12). Values outside the `i32` range
//! saturate.

/// Parse leading integer text, `None` when there are no digits.
/// Used for fields that must be numbers: HP, initiative, targeted amounts.
pub fn strict_int(text: &str) -> Option<i32> {
    let s = text.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let len = digits.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }

    let mut value: i64 = 0;
    for b in digits[..len].bytes() {
        value = value.saturating_mul(10).saturating_add((b - b'0') as i64);
    }
    if negative {
        value = -value;
    }
    Some(value.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
}

/// Parse leading integer text, 0 when there are no digits.
/// Used for staged damage/heal and quick HP edits.
pub fn lenient_int(text: &str) -> i32 {
    strict_int(text).unwrap_or(0)
}
