//! Reference-code shape detection.

/// Whether a token looks like a bank-assigned reference code.
///
/// Accepted shapes, all at least 8 characters long: a digit run (masking
/// zeros and asterisks allowed), a letter followed only by digits, or any
/// token combining an asterisk with a digit.
pub fn is_reference_code(token: &str) -> bool {
    if token.chars().count() < 8 {
        return false;
    }

    let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());

    if all_digits(token) {
        return true;
    }

    let unmasked: String = token.chars().filter(|c| !matches!(c, '*' | '0')).collect();
    if all_digits(&unmasked) {
        return true;
    }

    let mut chars = token.chars();
    if chars.next().is_some_and(|c| c.is_alphabetic()) && all_digits(chars.as_str()) {
        return true;
    }

    token.contains('*') && token.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_shapes() {
        assert!(is_reference_code("A0159924"));
        assert!(is_reference_code("12345678"));
        assert!(is_reference_code("0000**4521"));
        assert!(is_reference_code("CARD*1234"));
    }

    #[test]
    fn test_non_references() {
        assert!(!is_reference_code("A015992"));
        assert!(!is_reference_code("Directors"));
        assert!(!is_reference_code("Artiligence"));
        assert!(!is_reference_code("AB123456"));
        assert!(!is_reference_code("********"));
    }
}
