//! Mnemonic generation, validation, seed derivation, and typo diagnosis.

pub mod error;
pub mod typos;

use bip39::{Language, Mnemonic};

pub use error::Bip39Error;
pub use typos::{detect_typos, TypoReport};

/// A validated BIP39 mnemonic phrase.
#[derive(Clone, Debug)]
pub struct MnemonicPhrase(Mnemonic);

impl MnemonicPhrase {
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }

    pub fn word_count(&self) -> usize {
        self.0.word_count()
    }

    /// Derives the 64-byte BIP39 seed: PBKDF2-HMAC-SHA512, 2048 rounds,
    /// salt `"mnemonic" || passphrase`.
    pub fn to_seed(&self, passphrase: &str) -> [u8; 64] {
        self.0.to_seed(passphrase)
    }
}

fn normalize(phrase: &str) -> String {
    phrase.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Draws CSPRNG entropy (128 bits for 12 words, 256 bits for 24) and
/// returns the resulting mnemonic with its checksum word appended.
pub fn generate_mnemonic(word_count: usize) -> Result<MnemonicPhrase, Bip39Error> {
    if word_count != 12 && word_count != 24 {
        return Err(Bip39Error::UnsupportedWordCount(word_count));
    }
    let entropy_bytes = word_count / 3 * 4;
    let mut entropy = vec![0u8; entropy_bytes];
    rand::RngCore::fill_bytes(&mut rand::rngs::OsRng, &mut entropy);
    let m = Mnemonic::from_entropy_in(Language::English, &entropy)
        .map_err(|e| Bip39Error::InvalidMnemonic(e.to_string()))?;
    Ok(MnemonicPhrase(m))
}

/// Normalizes whitespace, rejects non-wordlist tokens, and verifies the
/// checksum.
pub fn validate_mnemonic(phrase: &str) -> Result<MnemonicPhrase, Bip39Error> {
    let normalized = normalize(phrase);
    let m = Mnemonic::parse_in(Language::English, &normalized)
        .map_err(|e| Bip39Error::InvalidMnemonic(e.to_string()))?;
    Ok(MnemonicPhrase(m))
}

/// Validates `mnemonic` and derives its 64-byte seed in one step.
pub fn mnemonic_to_seed(mnemonic: &str, passphrase: &str) -> Result<[u8; 64], Bip39Error> {
    Ok(validate_mnemonic(mnemonic)?.to_seed(passphrase))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_12_words() {
        let m = generate_mnemonic(12).unwrap();
        assert_eq!(m.word_count(), 12);
    }

    #[test]
    fn generate_24_words() {
        let m = generate_mnemonic(24).unwrap();
        assert_eq!(m.word_count(), 24);
    }

    #[test]
    fn rejects_unsupported_word_count() {
        let err = generate_mnemonic(15).unwrap_err();
        assert_eq!(err, Bip39Error::UnsupportedWordCount(15));
    }

    #[test]
    fn generated_mnemonic_validates() {
        let m = generate_mnemonic(12).unwrap();
        assert!(validate_mnemonic(&m.as_str()).is_ok());
    }

    #[test]
    fn whitespace_is_normalized() {
        let m = generate_mnemonic(12).unwrap();
        let messy = m.as_str().split_whitespace().collect::<Vec<_>>().join("   ");
        assert!(validate_mnemonic(&messy).is_ok());
    }

    #[test]
    fn bip39_test_vector_seed_is_stable() {
        let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
        let seed = mnemonic_to_seed(phrase, "").unwrap();
        let seed_again = mnemonic_to_seed(phrase, "").unwrap();
        assert_eq!(seed, seed_again);
        assert_eq!(
            hex::encode(seed),
            "5eb00bbddcf069084889a8ab9155568165f5c453ccb85e70811aaed6f6da5fc19a5ac40b389cd370d086206dec8aa6c43daea6690f20ad3d8d48b2d2ce9e38e4"
        );
    }

    #[test]
    fn invalid_word_rejected() {
        let result = validate_mnemonic("abandon abandon abandon invalidword");
        assert!(result.is_err());
    }

    #[test]
    fn bad_checksum_rejected() {
        let mut words = vec!["abandon"; 23];
        words.push("zoo");
        let phrase = words.join(" ");
        assert!(validate_mnemonic(&phrase).is_err());
    }
}
