//! Ethereum address derivation (Keccak-256, EIP-55 checksum).

use sha3::{Digest, Keccak256};

use crate::error::AddressError;

fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let out = hasher.finalize();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&out);
    bytes
}

/// Applies the EIP-55 mixed-case checksum to a lowercase hex address body
/// (without the `0x` prefix).
fn to_checksum(lower_hex: &str) -> String {
    let hash = keccak256(lower_hex.as_bytes());
    let mut out = String::with_capacity(lower_hex.len() + 2);
    out.push_str("0x");
    for (i, ch) in lower_hex.chars().enumerate() {
        if ch.is_ascii_digit() {
            out.push(ch);
            continue;
        }
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if nibble >= 8 {
            out.push(ch.to_ascii_uppercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Derives an EIP-55 checksummed Ethereum address from an uncompressed
/// SEC1 public key (65 bytes, leading `0x04`).
pub fn address_from_uncompressed_pubkey(pubkey_uncompressed: &[u8; 65]) -> Result<String, AddressError> {
    let without_prefix = &pubkey_uncompressed[1..];
    let hash = keccak256(without_prefix);
    let lower = hex::encode(&hash[12..]);
    Ok(to_checksum(&lower))
}

/// Validates that `address` is a well-formed `0x`-prefixed 20-byte hex
/// address. Mixed-case addresses must match their EIP-55 checksum;
/// all-lowercase or all-uppercase addresses are accepted unchecked (the
/// conventional EIP-55 fallback).
pub fn validate_address(address: &str) -> Result<(), AddressError> {
    let body = address
        .strip_prefix("0x")
        .ok_or_else(|| AddressError::InvalidAddress("missing 0x prefix".to_string()))?;
    if body.len() != 40 || !body.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AddressError::InvalidAddress(
            "expected 40 hex characters after 0x".to_string(),
        ));
    }
    let has_upper = body.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = body.chars().any(|c| c.is_ascii_lowercase());
    if has_upper && has_lower {
        let expected = to_checksum(&body.to_lowercase());
        if expected != address {
            return Err(AddressError::InvalidAddress(
                "EIP-55 checksum mismatch".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bip39_vector_eth_address() {
        let seed = hex::decode(
            "5eb00bbddcf069084889a8ab9155568165f5c453ccb85e70811aaed6f6da5fc19a5ac40b389cd370d086206dec8aa6c43daea6690f20ad3d8d48b2d2ce9e38e4",
        )
        .unwrap();
        let key = sigil_hdkey::derive(&seed, sigil_hdkey::CoinType::Eth, 0, 0, 0).unwrap();
        let addr = address_from_uncompressed_pubkey(&key.public_key_uncompressed).unwrap();
        assert_eq!(addr, "0x9Db263b3dd35b2D306e61488ce02D88ab02d7023");
    }

    #[test]
    fn validate_checksummed_address() {
        assert!(validate_address("0x9858EfFD232B4033E47d90003D41EC34EcaEda94").is_ok());
    }

    #[test]
    fn validate_lowercase_address_accepted() {
        assert!(validate_address("0x9858effd232b4033e47d90003d41ec34ecaeda94").is_ok());
    }

    #[test]
    fn rejects_bad_checksum() {
        assert!(validate_address("0x9858EfFD232b4033E47d90003D41EC34EcaEda94").is_err());
    }

    #[test]
    fn rejects_missing_prefix() {
        assert!(validate_address("9858EfFD232B4033E47d90003D41EC34EcaEda94").is_err());
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(validate_address("0x1234").is_err());
    }
}
