//! Phone number utilities

/// Mask a phone number for logging (e.g. `+1415****671`)
///
/// Keeps enough of the prefix and suffix to correlate log lines without
/// writing the full number into operational logs.
pub fn mask_phone(phone: &str) -> String {
    let digits: String = phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    if digits.len() <= 6 {
        return "*".repeat(digits.len());
    }

    let prefix = &digits[..5.min(digits.len())];
    let suffix = &digits[digits.len() - 3..];
    format!("{}{}{}", prefix, "*".repeat(digits.len() - prefix.len() - suffix.len()), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_phone_e164() {
        let masked = mask_phone("+14155552671");
        assert!(masked.starts_with("+1415"));
        assert!(masked.ends_with("671"));
        assert!(masked.contains('*'));
        assert!(!masked.contains("5555"));
    }

    #[test]
    fn test_mask_phone_short_input() {
        assert_eq!(mask_phone("12345"), "*****");
    }

    #[test]
    fn test_mask_phone_strips_formatting() {
        let masked = mask_phone("+1 (415) 555-2671");
        assert!(!masked.contains('('));
        assert!(masked.ends_with("671"));
    }
}
