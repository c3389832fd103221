//! Import-material parsing and format detection.

use bip39::Language;
use k256::elliptic_curve::PrimeField;
use k256::Scalar;

use crate::error::AddressError;

/// Strict 64-char hex private key parse; rejects all-zero and keys at or
/// past the curve order.
pub fn parse_hex_key(s: &str) -> Result<[u8; 32], AddressError> {
    let trimmed = s.trim();
    if trimmed.len() != 64 || !trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AddressError::InvalidHexKey(
            "expected 64 hex characters".to_string(),
        ));
    }
    let bytes = hex::decode(trimmed).map_err(|e| AddressError::InvalidHexKey(e.to_string()))?;
    let mut key = [0u8; 32];
    key.copy_from_slice(&bytes);
    if key == [0u8; 32] {
        return Err(AddressError::InvalidHexKey("key is all zero".to_string()));
    }
    let scalar: Option<Scalar> = Option::from(Scalar::from_repr(key.into()));
    if scalar.is_none() {
        return Err(AddressError::InvalidHexKey(
            "key is at or beyond the curve order".to_string(),
        ));
    }
    Ok(key)
}

/// Which kind of import material a string appears to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Mnemonic,
    Wif,
    Hex,
    Unknown,
}

fn looks_like_mnemonic(s: &str) -> bool {
    let words: Vec<&str> = s.split_whitespace().collect();
    if words.len() != 12 && words.len() != 24 {
        return false;
    }
    let wordlist = Language::English.word_list();
    words.iter().all(|w| wordlist.contains(&w.to_lowercase().as_str()))
}

fn looks_like_wif(s: &str) -> bool {
    let len = s.len();
    if !(51..=52).contains(&len) {
        return false;
    }
    matches!(s.chars().next(), Some('5') | Some('K') | Some('L'))
}

fn looks_like_hex(s: &str) -> bool {
    let trimmed = s.trim();
    trimmed.len() == 64 && trimmed.chars().all(|c| c.is_ascii_hexdigit())
}

/// Whitespace-insensitive detection of what kind of import material `s` is.
pub fn detect_input_format(s: &str) -> InputFormat {
    let trimmed = s.trim();
    if looks_like_mnemonic(trimmed) {
        InputFormat::Mnemonic
    } else if looks_like_hex(trimmed) {
        InputFormat::Hex
    } else if looks_like_wif(trimmed) {
        InputFormat::Wif
    } else {
        InputFormat::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_mnemonic() {
        let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
        assert_eq!(detect_input_format(phrase), InputFormat::Mnemonic);
    }

    #[test]
    fn detects_hex() {
        let hexed = "1".repeat(64);
        assert_eq!(detect_input_format(&hexed), InputFormat::Hex);
    }

    #[test]
    fn detects_wif() {
        let wif = "L".to_string() + &"a".repeat(50);
        assert_eq!(detect_input_format(&wif), InputFormat::Wif);
    }

    #[test]
    fn detects_unknown() {
        assert_eq!(detect_input_format("not any recognized format"), InputFormat::Unknown);
    }

    #[test]
    fn parse_hex_key_rejects_all_zero() {
        let zero = "0".repeat(64);
        assert!(parse_hex_key(&zero).is_err());
    }

    #[test]
    fn parse_hex_key_rejects_wrong_length() {
        assert!(parse_hex_key("abcd").is_err());
    }

    #[test]
    fn parse_hex_key_accepts_valid() {
        let key = "11".repeat(32);
        assert!(parse_hex_key(&key).is_ok());
    }
}
