use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::CoreError;

const NONCE_LEN: usize = 12;

/// Symmetric AEAD over access/refresh tokens. Output layout is
/// `nonce ‖ ciphertext ‖ tag`, base64-encoded for storage as text.
pub struct Crypto {
    cipher: Aes256Gcm,
}

impl Crypto {
    pub fn new(key: &[u8]) -> Result<Self, CoreError> {
        if key.len() != 32 {
            return Err(CoreError::EncryptionFailed);
        }
        let key = Key::<Aes256Gcm>::from_slice(key);
        Ok(Self {
            cipher: Aes256Gcm::new(key),
        })
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Result<String, CoreError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| CoreError::EncryptionFailed)?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(out))
    }

    pub fn decrypt(&self, encoded: &str) -> Result<Vec<u8>, CoreError> {
        let raw = STANDARD
            .decode(encoded)
            .map_err(|_| CoreError::DecryptionFailed)?;

        if raw.len() < NONCE_LEN {
            return Err(CoreError::DecryptionFailed);
        }

        let (nonce_bytes, ciphertext) = raw.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);
        self.cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| CoreError::DecryptionFailed)
    }

    pub fn encrypt_str(&self, plaintext: &str) -> Result<String, CoreError> {
        self.encrypt(plaintext.as_bytes())
    }

    pub fn decrypt_str(&self, encoded: &str) -> Result<String, CoreError> {
        let bytes = self.decrypt(encoded)?;
        String::from_utf8(bytes).map_err(|_| CoreError::DecryptionFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> [u8; 32] {
        [byte; 32]
    }

    #[test]
    fn round_trips_arbitrary_plaintext() {
        let crypto = Crypto::new(&key(1)).unwrap();
        for text in ["", "a", "mock_access_token_123", &"x".repeat(4096)] {
            let encoded = crypto.encrypt_str(text).unwrap();
            assert_eq!(crypto.decrypt_str(&encoded).unwrap(), text);
        }
    }

    #[test]
    fn nonce_is_unique_per_call() {
        let crypto = Crypto::new(&key(2)).unwrap();
        let a = crypto.encrypt_str("same plaintext").unwrap();
        let b = crypto.encrypt_str("same plaintext").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn decrypt_with_wrong_key_fails() {
        let encoded = Crypto::new(&key(3)).unwrap().encrypt_str("secret").unwrap();
        let other = Crypto::new(&key(4)).unwrap();
        assert!(matches!(
            other.decrypt_str(&encoded),
            Err(CoreError::DecryptionFailed)
        ));
    }

    #[test]
    fn decrypt_rejects_invalid_base64() {
        let crypto = Crypto::new(&key(5)).unwrap();
        assert!(matches!(
            crypto.decrypt_str("not base64!!"),
            Err(CoreError::DecryptionFailed)
        ));
    }

    #[test]
    fn decrypt_rejects_ciphertext_shorter_than_nonce() {
        let crypto = Crypto::new(&key(6)).unwrap();
        let short = STANDARD.encode([0u8; 4]);
        assert!(matches!(
            crypto.decrypt_str(&short),
            Err(CoreError::DecryptionFailed)
        ));
    }

    proptest::proptest! {
        #[test]
        fn round_trip_holds_for_any_string(s in ".*") {
            let crypto = Crypto::new(&key(7)).unwrap();
            let encoded = crypto.encrypt_str(&s).unwrap();
            prop_assert_eq!(crypto.decrypt_str(&encoded).unwrap(), s);
        }

        #[test]
        fn tampering_with_any_byte_is_detected(s in "\\PC+", flip_index: usize) {
            let crypto = Crypto::new(&key(8)).unwrap();
            let encoded = crypto.encrypt_str(&s).unwrap();
            let mut raw = STANDARD.decode(&encoded).unwrap();
            let idx = flip_index % raw.len();
            raw[idx] ^= 0xFF;
            let tampered = STANDARD.encode(raw);
            prop_assert!(crypto.decrypt_str(&tampered).is_err());
        }
    }
}
