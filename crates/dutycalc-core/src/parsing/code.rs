/// Canonical length of a classification code.
pub const CODE_LEN: usize = 8;

/// Normalize a classification code to its canonical 8-digit form.
///
/// Steps:
/// 1. Drop every non-digit character (dots, spaces, a leading BOM)
/// 2. Right-pad with '0' up to 8 digits
/// 3. Truncate to exactly 8 digits
///
/// "8501" -> "85010000", "8501.10.999" -> "85011099".
pub fn normalize_code(raw: &str) -> String {
    let mut digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < CODE_LEN {
        let pad = CODE_LEN - digits.len();
        digits.extend(std::iter::repeat('0').take(pad));
    }
    digits.truncate(CODE_LEN);
    digits
}
