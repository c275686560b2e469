//! Cryptographically secure verification code generation.
//!
//! Codes are drawn from the operating system's entropy source (`OsRng`);
//! a non-cryptographic PRNG is never acceptable here. Entropy failures are
//! returned as errors rather than panicking, because they must surface as
//! server errors on the issuing request.

use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

/// Uppercase alphanumeric charset used for long codes
const ALPHANUMERIC_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Maximum digit-code length representable in a u64 draw
const MAX_DIGIT_LENGTH: usize = 18;

/// Entropy-source failure; rare and fatal to the issuing call
#[derive(Error, Debug)]
#[error("entropy source failure: {message}")]
pub struct EntropyError {
    message: String,
}

fn next_u64() -> Result<u64, EntropyError> {
    let mut buf = [0u8; 8];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| EntropyError {
            message: e.to_string(),
        })?;
    Ok(u64::from_le_bytes(buf))
}

/// Generate a zero-padded decimal code of exactly `length` digits
///
/// Uniform over `[0, 10^length)` via rejection sampling, so no code value
/// is more likely than another.
pub fn generate_digits(length: usize) -> Result<String, EntropyError> {
    debug_assert!(length >= 1 && length <= MAX_DIGIT_LENGTH);
    let length = length.clamp(1, MAX_DIGIT_LENGTH);
    let bound = 10u64.pow(length as u32);

    // Reject draws from the biased tail of the u64 range.
    let zone = (u64::MAX / bound) * bound;
    loop {
        let draw = next_u64()?;
        if draw < zone {
            return Ok(format!("{:0width$}", draw % bound, width = length));
        }
    }
}

/// Generate an uppercase alphanumeric code of exactly `length` characters
///
/// Each character is drawn uniformly from A-Z0-9 with per-byte rejection
/// sampling.
pub fn generate_alphanumeric(length: usize) -> Result<String, EntropyError> {
    let charset_len = ALPHANUMERIC_CHARSET.len() as u16; // 36
    let zone = (256 / charset_len) * charset_len; // 252

    let mut out = String::with_capacity(length);
    let mut buf = [0u8; 32];
    while out.len() < length {
        OsRng
            .try_fill_bytes(&mut buf)
            .map_err(|e| EntropyError {
                message: e.to_string(),
            })?;
        for byte in buf {
            if (byte as u16) < zone {
                let idx = (byte as u16 % charset_len) as usize;
                out.push(ALPHANUMERIC_CHARSET[idx] as char);
                if out.len() == length {
                    break;
                }
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_digit_code_length_and_charset() {
        for length in [4, 6, 8, 12] {
            let code = generate_digits(length).unwrap();
            assert_eq!(code.len(), length);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_digit_code_zero_padding() {
        // Over many draws of a short code at least one should carry a
        // leading zero; the format must preserve it.
        let mut saw_leading_zero = false;
        for _ in 0..2000 {
            let code = generate_digits(2).unwrap();
            assert_eq!(code.len(), 2);
            if code.starts_with('0') {
                saw_leading_zero = true;
                break;
            }
        }
        assert!(saw_leading_zero);
    }

    #[test]
    fn test_alphanumeric_length_and_charset() {
        let code = generate_alphanumeric(16).unwrap();
        assert_eq!(code.len(), 16);
        assert!(code
            .bytes()
            .all(|b| ALPHANUMERIC_CHARSET.contains(&b)));
    }

    #[test]
    fn test_codes_are_not_constant() {
        let codes: HashSet<String> = (0..50)
            .map(|_| generate_digits(8).unwrap())
            .collect();
        assert!(codes.len() > 1);
    }
}
