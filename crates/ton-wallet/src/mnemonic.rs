//! TON mnemonic generation and key derivation
//!
//! TON mnemonics reuse the BIP39 English word list but not its checksum.
//! The phrase is turned into entropy with HMAC-SHA512 (phrase as key,
//! password as data), and a phrase is valid when PBKDF2 of that entropy
//! with the "TON seed version" salt starts with a zero byte.

use bip39::Language;
use rand::Rng;
use ton_crypto::{Ed25519Keypair, hmac_sha512, pbkdf2_sha512};
use zeroize::Zeroizing;

use crate::error::{WalletError, WalletResult};

/// Number of words in a TON mnemonic
pub const WORD_COUNT: usize = 24;

/// Number of PBKDF2 iterations for seed derivation
const PBKDF2_ITERATIONS: u32 = 100_000;

/// Salt for seed derivation
const TON_SEED_SALT: &str = "TON default seed";

/// Salt for the basic-seed check
const MNEMONIC_SALT: &str = "TON seed version";

/// Salt for the password-protected check
const PASSWORD_SALT: &str = "TON fast seed version";

/// Mnemonic phrase for wallet key derivation
#[derive(Clone)]
pub struct Mnemonic {
    words: Vec<String>,
}

impl Mnemonic {
    /// Generate a new random 24-word mnemonic without a password.
    ///
    /// Draws phrases until one passes the basic-seed check and does not
    /// look password protected.
    pub fn generate() -> Self {
        let wordlist = Language::English.word_list();
        let mut rng = rand::thread_rng();

        loop {
            let words: Vec<String> = (0..WORD_COUNT)
                .map(|_| wordlist[rng.gen_range(0..wordlist.len())].to_string())
                .collect();

            let mnemonic = Self { words };
            if mnemonic.is_basic_seed() && !mnemonic.is_password_needed() {
                return mnemonic;
            }
        }
    }

    /// Parse a phrase, checking word count and the word list only.
    pub fn from_phrase(phrase: &str) -> WalletResult<Self> {
        let words: Vec<String> = phrase
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .collect();

        if words.len() != WORD_COUNT {
            return Err(WalletError::WrongWordCount(words.len()));
        }

        let language = Language::English;
        if let Some(word) = words.iter().find(|w| language.find_word(w).is_none()) {
            return Err(WalletError::InvalidWord(word.clone()));
        }

        Ok(Self { words })
    }

    /// Parse a phrase and require it to pass the basic-seed check.
    pub fn from_phrase_validated(phrase: &str) -> WalletResult<Self> {
        let mnemonic = Self::from_phrase(phrase)?;
        if !mnemonic.is_basic_seed() {
            return Err(WalletError::InvalidMnemonic(
                "phrase is not a TON seed".to_string(),
            ));
        }
        Ok(mnemonic)
    }

    /// Get the words in this mnemonic
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Convert to phrase string
    pub fn to_phrase(&self) -> String {
        self.words.join(" ")
    }

    /// HMAC-SHA512(phrase, password).
    pub fn entropy(&self, password: &str) -> Zeroizing<[u8; 64]> {
        let phrase = Zeroizing::new(self.to_phrase());
        Zeroizing::new(hmac_sha512(phrase.as_bytes(), password.as_bytes()))
    }

    /// Derive the 64-byte seed.
    pub fn to_seed(&self, password: &str) -> Zeroizing<[u8; 64]> {
        let entropy = self.entropy(password);
        Zeroizing::new(pbkdf2_sha512(
            &entropy[..],
            TON_SEED_SALT.as_bytes(),
            PBKDF2_ITERATIONS,
        ))
    }

    /// Derive Ed25519 keypair from mnemonic
    pub fn to_keypair(&self) -> Ed25519Keypair {
        self.to_keypair_with_password("")
    }

    /// Derive keypair with password
    pub fn to_keypair_with_password(&self, password: &str) -> Ed25519Keypair {
        let seed = self.to_seed(password);
        let mut ed_seed = [0u8; 32];
        ed_seed.copy_from_slice(&seed[..32]);
        Ed25519Keypair::from_seed(ed_seed)
    }

    /// First byte of PBKDF2(entropy, "TON seed version") must be zero.
    pub fn is_basic_seed(&self) -> bool {
        let entropy = self.entropy("");
        let check = pbkdf2_sha512(
            &entropy[..],
            MNEMONIC_SALT.as_bytes(),
            PBKDF2_ITERATIONS / 256,
        );
        check[0] == 0
    }

    /// Whether the phrase was generated with a password.
    pub fn is_password_needed(&self) -> bool {
        let entropy = self.entropy("");
        let check = pbkdf2_sha512(&entropy[..], PASSWORD_SALT.as_bytes(), 1);
        check[0] == 1
    }
}

impl std::fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mnemonic")
            .field("words", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABANDON_ART: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon art";

    #[test]
    fn test_known_derivation() {
        let mnemonic = Mnemonic::from_phrase(ABANDON_ART).unwrap();
        let keypair = mnemonic.to_keypair();
        assert_eq!(
            hex::encode(keypair.seed()),
            "88965e4e6f686bad4be63761f4d8fa1cc682bccf11f8382bd281304d07b76edc"
        );
        assert_eq!(
            hex::encode(keypair.public_key),
            "abbd2a1c784a6086850c172bcc7d56208e4dea0a51b9389ba21d174ff864c17a"
        );
    }

    #[test]
    fn test_bip39_phrase_is_not_a_ton_seed() {
        assert!(matches!(
            Mnemonic::from_phrase_validated(ABANDON_ART),
            Err(WalletError::InvalidMnemonic(_))
        ));
    }

    #[test]
    fn test_generated_phrase_validates() {
        let mnemonic = Mnemonic::generate();
        assert_eq!(mnemonic.words().len(), WORD_COUNT);
        let restored = Mnemonic::from_phrase_validated(&mnemonic.to_phrase()).unwrap();
        assert_eq!(mnemonic.to_keypair().public_key, restored.to_keypair().public_key);
    }

    #[test]
    fn test_phrase_normalized() {
        let shouty = ABANDON_ART.to_uppercase().replace(' ', "   ");
        let mnemonic = Mnemonic::from_phrase(&shouty).unwrap();
        assert_eq!(mnemonic.to_phrase(), ABANDON_ART);
    }

    #[test]
    fn test_wrong_word_count() {
        assert!(matches!(
            Mnemonic::from_phrase("abandon art"),
            Err(WalletError::WrongWordCount(2))
        ));
    }

    #[test]
    fn test_unknown_word() {
        let phrase = ABANDON_ART.replace("art", "tonlike");
        assert!(matches!(
            Mnemonic::from_phrase(&phrase),
            Err(WalletError::InvalidWord(w)) if w == "tonlike"
        ));
    }

    #[test]
    fn test_password_changes_key() {
        let mnemonic = Mnemonic::from_phrase(ABANDON_ART).unwrap();
        assert_ne!(
            mnemonic.to_keypair().public_key,
            mnemonic.to_keypair_with_password("secret").public_key
        );
    }

    #[test]
    fn test_debug_redacts_words() {
        let mnemonic = Mnemonic::from_phrase(ABANDON_ART).unwrap();
        assert!(!format!("{:?}", mnemonic).contains("abandon"));
    }
}
