//! Chain-specific address encoding and import-material parsing.

pub mod error;
pub mod eth;
pub mod legacy;
pub mod parse;

pub use error::AddressError;
pub use eth::{address_from_uncompressed_pubkey, validate_address as validate_eth_address};
pub use legacy::{address_from_compressed_pubkey, encode_wif, parse_wif, LegacyChain};
pub use parse::{detect_input_format, parse_hex_key, InputFormat};

use sigil_hdkey::CoinType;

/// Encodes the receive address for a derived key, dispatching on the coin
/// type the key was derived for.
pub fn address_for_coin(key: &sigil_hdkey::DerivedKey, coin_type: CoinType) -> Result<String, AddressError> {
    match coin_type {
        CoinType::Eth => eth::address_from_uncompressed_pubkey(&key.public_key_uncompressed),
        CoinType::Bsv => Ok(legacy::address_from_compressed_pubkey(
            &key.public_key_compressed,
            legacy::LegacyChain::Bsv,
        )),
        CoinType::Btc => Ok(legacy::address_from_compressed_pubkey(
            &key.public_key_compressed,
            legacy::LegacyChain::Btc,
        )),
        CoinType::Bch => Ok(legacy::address_from_compressed_pubkey(
            &key.public_key_compressed,
            legacy::LegacyChain::Bch,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_for_coin_dispatches() {
        let seed = [0x01u8; 64];
        let eth_key = sigil_hdkey::derive(&seed, CoinType::Eth, 0, 0, 0).unwrap();
        let addr = address_for_coin(&eth_key, CoinType::Eth).unwrap();
        assert!(addr.starts_with("0x"));

        let bsv_key = sigil_hdkey::derive(&seed, CoinType::Bsv, 0, 0, 0).unwrap();
        let addr = address_for_coin(&bsv_key, CoinType::Bsv).unwrap();
        assert!(!addr.is_empty());
        assert!(!addr.starts_with("0x"));
    }
}
