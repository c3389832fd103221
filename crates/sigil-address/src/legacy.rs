//! Base58Check P2PKH addressing shared by BSV, BTC, and BCH.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::error::AddressError;

/// Which legacy chain's version byte to use for P2PKH encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyChain {
    Bsv,
    Btc,
    Bch,
}

impl LegacyChain {
    /// P2PKH version byte (mainnet).
    pub fn version_byte(self) -> u8 {
        match self {
            // BSV and BCH inherited Bitcoin's original P2PKH version byte;
            // they diverge only at the consensus layer, not the address format.
            LegacyChain::Bsv | LegacyChain::Btc | LegacyChain::Bch => 0x00,
        }
    }

    /// WIF version byte (mainnet private key prefix).
    pub fn wif_version_byte(self) -> u8 {
        0x80
    }
}

fn hash160(data: &[u8]) -> [u8; 20] {
    let sha = Sha256::digest(data);
    let ripemd = Ripemd160::digest(sha);
    let mut out = [0u8; 20];
    out.copy_from_slice(&ripemd);
    out
}

/// Encodes a P2PKH address: Base58Check of `version_byte ||
/// RIPEMD160(SHA256(compressed_pubkey))`.
pub fn address_from_compressed_pubkey(
    pubkey_compressed: &[u8; 33],
    chain: LegacyChain,
) -> String {
    let h160 = hash160(pubkey_compressed);
    let mut payload = Vec::with_capacity(21);
    payload.push(chain.version_byte());
    payload.extend_from_slice(&h160);
    bs58::encode(payload).with_check().into_string()
}

/// Encodes a private key as WIF (compressed-pubkey form): Base58Check of
/// `version_byte || key || 0x01`.
pub fn encode_wif(private_key: &[u8; 32], chain: LegacyChain) -> String {
    let mut payload = Vec::with_capacity(34);
    payload.push(chain.wif_version_byte());
    payload.extend_from_slice(private_key);
    payload.push(0x01); // compressed-pubkey marker
    bs58::encode(payload).with_check().into_string()
}

/// Decodes a WIF string, stripping the network byte and optional
/// compression suffix, returning the raw 32-byte private key.
pub fn parse_wif(s: &str) -> Result<[u8; 32], AddressError> {
    let decoded = bs58::decode(s)
        .with_check(None)
        .into_vec()
        .map_err(|e| AddressError::InvalidWif(e.to_string()))?;
    // decoded = version_byte || key (32) || [compression flag]
    if decoded.len() != 33 && decoded.len() != 34 {
        return Err(AddressError::InvalidWif(format!(
            "unexpected decoded length {}",
            decoded.len()
        )));
    }
    let mut key = [0u8; 32];
    key.copy_from_slice(&decoded[1..33]);
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wif_roundtrip() {
        let key = [0x11u8; 32];
        let wif = encode_wif(&key, LegacyChain::Bsv);
        assert!(wif.len() == 51 || wif.len() == 52);
        let decoded = parse_wif(&wif).unwrap();
        assert_eq!(decoded, key);
    }

    #[test]
    fn wif_starts_with_expected_byte() {
        let key = [0x22u8; 32];
        let wif = encode_wif(&key, LegacyChain::Btc);
        let first = wif.chars().next().unwrap();
        assert!(first == 'K' || first == 'L' || first == '5');
    }

    #[test]
    fn address_is_deterministic() {
        let pubkey = [0x03u8; 33];
        let a = address_from_compressed_pubkey(&pubkey, LegacyChain::Bsv);
        let b = address_from_compressed_pubkey(&pubkey, LegacyChain::Bsv);
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_wif_rejected() {
        assert!(parse_wif("not-a-wif").is_err());
    }
}
