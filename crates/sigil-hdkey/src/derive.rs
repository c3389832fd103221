//! BIP32 master/child derivation and BIP44 path construction.

use hmac::{Hmac, Mac};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::PrimeField;
use k256::{ProjectivePoint, Scalar};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};

use crate::coin::CoinType;
use crate::error::HdKeyError;

pub const HARDENED_OFFSET: u32 = 0x8000_0000;

type HmacSha512 = Hmac<Sha512>;

#[derive(Clone)]
struct Node {
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_number: u32,
    chain_code: [u8; 32],
    private_key: [u8; 32],
}

fn scalar_from_bytes(bytes: &[u8; 32]) -> Option<Scalar> {
    Option::from(Scalar::from_repr((*bytes).into()))
}

fn compressed_pubkey(private_key: &[u8; 32]) -> Result<[u8; 33], HdKeyError> {
    let scalar = scalar_from_bytes(private_key).ok_or(HdKeyError::DerivationFailed)?;
    let point = ProjectivePoint::GENERATOR * scalar;
    let encoded = point.to_affine().to_encoded_point(true);
    let bytes = encoded.as_bytes();
    let mut out = [0u8; 33];
    out.copy_from_slice(bytes);
    Ok(out)
}

/// Uncompressed SEC1 public key (0x04 || X || Y), 65 bytes.
pub fn uncompressed_pubkey(private_key: &[u8; 32]) -> Result<[u8; 65], HdKeyError> {
    let scalar = scalar_from_bytes(private_key).ok_or(HdKeyError::DerivationFailed)?;
    let point = ProjectivePoint::GENERATOR * scalar;
    let encoded = point.to_affine().to_encoded_point(false);
    let bytes = encoded.as_bytes();
    let mut out = [0u8; 65];
    out.copy_from_slice(bytes);
    Ok(out)
}

fn fingerprint_of(private_key: &[u8; 32]) -> Result<[u8; 4], HdKeyError> {
    let compressed = compressed_pubkey(private_key)?;
    let sha = Sha256::digest(compressed);
    let ripemd = Ripemd160::digest(sha);
    let mut fp = [0u8; 4];
    fp.copy_from_slice(&ripemd[0..4]);
    Ok(fp)
}

fn master_node(seed: &[u8]) -> Result<Node, HdKeyError> {
    let mut mac = HmacSha512::new_from_slice(b"Bitcoin seed")
        .expect("HMAC accepts keys of any length");
    mac.update(seed);
    let mut i = mac.finalize().into_bytes();
    let (il, ir) = i.split_at(32);
    let mut private_key = [0u8; 32];
    let mut chain_code = [0u8; 32];
    private_key.copy_from_slice(il);
    chain_code.copy_from_slice(ir);
    sigil_crypto::zeroize(&mut i);
    if scalar_from_bytes(&private_key).is_none() {
        return Err(HdKeyError::DerivationFailed);
    }
    Ok(Node {
        depth: 0,
        parent_fingerprint: [0; 4],
        child_number: 0,
        chain_code,
        private_key,
    })
}

fn derive_child(parent: &Node, index: u32) -> Result<Node, HdKeyError> {
    let mut data = Vec::with_capacity(37);
    if index >= HARDENED_OFFSET {
        data.push(0u8);
        data.extend_from_slice(&parent.private_key);
    } else {
        data.extend_from_slice(&compressed_pubkey(&parent.private_key)?);
    }
    data.extend_from_slice(&index.to_be_bytes());

    let mut mac = HmacSha512::new_from_slice(&parent.chain_code)
        .expect("HMAC accepts keys of any length");
    mac.update(&data);
    let mut i = mac.finalize().into_bytes();
    let (il, ir) = i.split_at(32);

    let il_scalar = scalar_from_bytes(il.try_into().expect("32 bytes")).ok_or(HdKeyError::DerivationFailed)?;
    let parent_scalar = scalar_from_bytes(&parent.private_key).ok_or(HdKeyError::DerivationFailed)?;
    let child_scalar = il_scalar + parent_scalar;
    if child_scalar.is_zero().into() {
        return Err(HdKeyError::DerivationFailed);
    }

    let mut child_private = [0u8; 32];
    child_private.copy_from_slice(child_scalar.to_repr().as_slice());
    let mut chain_code = [0u8; 32];
    chain_code.copy_from_slice(ir);

    let fingerprint = fingerprint_of(&parent.private_key)?;
    sigil_crypto::zeroize(&mut i);

    Ok(Node {
        depth: parent.depth + 1,
        parent_fingerprint: fingerprint,
        child_number: index,
        chain_code,
        private_key: child_private,
    })
}

fn derive_path_nodes(seed: &[u8], indices: &[u32]) -> Result<Node, HdKeyError> {
    let mut node = master_node(seed)?;
    for &index in indices {
        node = derive_child(&node, index)?;
    }
    Ok(node)
}

fn harden(index: u32) -> Result<u32, HdKeyError> {
    if index >= HARDENED_OFFSET {
        return Err(HdKeyError::InvalidPath(format!(
            "index {index} already exceeds the hardened offset"
        )));
    }
    Ok(index + HARDENED_OFFSET)
}

fn check_unhardened(index: u32, field: &str) -> Result<(), HdKeyError> {
    if index >= HARDENED_OFFSET {
        return Err(HdKeyError::InvalidPath(format!(
            "{field} {index} must be less than 2^31"
        )));
    }
    Ok(())
}

/// A derived keypair plus the BIP44 (or legacy) path it came from.
#[derive(Clone)]
pub struct DerivedKey {
    pub private_key: [u8; 32],
    pub public_key_compressed: [u8; 33],
    pub public_key_uncompressed: [u8; 65],
    pub path: String,
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        sigil_crypto::zeroize(&mut self.private_key);
    }
}

/// Derives `m/44'/coin_type'/account'/change/index` for `coin_type`.
pub fn derive(
    seed: &[u8],
    coin_type: CoinType,
    account: u32,
    change: u32,
    index: u32,
) -> Result<DerivedKey, HdKeyError> {
    check_unhardened(account, "account")?;
    check_unhardened(change, "change")?;
    check_unhardened(index, "index")?;

    let indices = [harden(44)?, harden(coin_type.slip44())?, harden(account)?, change, index];
    let node = derive_path_nodes(seed, &indices)?;
    let path = format!(
        "m/44'/{}'/{account}'/{change}/{index}",
        coin_type.slip44()
    );
    to_derived_key(node, path)
}

/// Derives the account-level extended public key at
/// `m/44'/coin_type'/account'` and returns its base58check `xpub...`
/// serialization.
pub fn derive_account_xpub(
    seed: &[u8],
    coin_type: CoinType,
    account: u32,
) -> Result<String, HdKeyError> {
    check_unhardened(account, "account")?;
    let indices = [harden(44)?, harden(coin_type.slip44())?, harden(account)?];
    let node = derive_path_nodes(seed, &indices)?;
    serialize_xpub(&node)
}

/// Derives the legacy HandCash path `m/0'/index`.
pub fn derive_legacy(seed: &[u8], index: u32) -> Result<DerivedKey, HdKeyError> {
    check_unhardened(index, "index")?;
    let indices = [harden(0)?, index];
    let node = derive_path_nodes(seed, &indices)?;
    to_derived_key(node, format!("m/0'/{index}"))
}

fn to_derived_key(node: Node, path: String) -> Result<DerivedKey, HdKeyError> {
    let public_key_compressed = compressed_pubkey(&node.private_key)?;
    let public_key_uncompressed = uncompressed_pubkey(&node.private_key)?;
    Ok(DerivedKey {
        private_key: node.private_key,
        public_key_compressed,
        public_key_uncompressed,
        path,
    })
}

const XPUB_VERSION_MAINNET: [u8; 4] = [0x04, 0x88, 0xB2, 0x1E];

fn serialize_xpub(node: &Node) -> Result<String, HdKeyError> {
    let pubkey = compressed_pubkey(&node.private_key)?;
    let mut buf = Vec::with_capacity(78);
    buf.extend_from_slice(&XPUB_VERSION_MAINNET);
    buf.push(node.depth);
    buf.extend_from_slice(&node.parent_fingerprint);
    buf.extend_from_slice(&node.child_number.to_be_bytes());
    buf.extend_from_slice(&node.chain_code);
    buf.extend_from_slice(&pubkey);
    Ok(bs58::encode(buf).with_check().into_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let seed = [0x42u8; 64];
        let a = derive(&seed, CoinType::Eth, 0, 0, 0).unwrap();
        let b = derive(&seed, CoinType::Eth, 0, 0, 0).unwrap();
        assert_eq!(a.private_key, b.private_key);
        assert_eq!(a.path, "m/44'/60'/0'/0/0");
    }

    #[test]
    fn different_indices_differ() {
        let seed = [0x11u8; 64];
        let a = derive(&seed, CoinType::Bsv, 0, 0, 0).unwrap();
        let b = derive(&seed, CoinType::Bsv, 0, 0, 1).unwrap();
        assert_ne!(a.private_key, b.private_key);
    }

    #[test]
    fn bip39_test_vector_eth_private_key() {
        // Seed for "abandon ... about" with empty passphrase.
        let seed = hex::decode(
            "5eb00bbddcf069084889a8ab9155568165f5c453ccb85e70811aaed6f6da5fc19a5ac40b389cd370d086206dec8aa6c43daea6690f20ad3d8d48b2d2ce9e38e4",
        )
        .unwrap();
        let key = derive(&seed, CoinType::Eth, 0, 0, 0).unwrap();
        assert_eq!(key.path, "m/44'/60'/0'/0/0");
        // Known BIP44 Ethereum test vector private key for this seed.
        assert_eq!(
            hex::encode(key.private_key),
            "274b47a28770aaa95c0ce7b76573ceeb4103c7367bc5c5c91481132763777702"
        );
    }

    #[test]
    fn rejects_out_of_range_index() {
        let seed = [0x01u8; 64];
        let result = derive(&seed, CoinType::Btc, 0, 0, HARDENED_OFFSET);
        assert!(result.is_err());
    }

    #[test]
    fn legacy_path_format() {
        let seed = [0x07u8; 64];
        let key = derive_legacy(&seed, 5).unwrap();
        assert_eq!(key.path, "m/0'/5");
    }

    #[test]
    fn account_xpub_has_xpub_prefix() {
        let seed = [0x09u8; 64];
        let xpub = derive_account_xpub(&seed, CoinType::Bsv, 0).unwrap();
        assert!(xpub.starts_with("xpub"));
    }
}
