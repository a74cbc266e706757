//! Authenticated encryption for the secondary QR payload.
//!
//! Messages are encrypted with AES-256-GCM into a self-contained text
//! token: the token alone (plus the key) is enough to recover the exact
//! plaintext, and any tampering or wrong key is rejected at decryption.
//!
//! # Token format
//!
//! ```text
//! base64url( [1 byte version][8 bytes unix timestamp, big-endian]
//!            [12 bytes nonce][ciphertext || 16-byte auth tag] )
//! ```
//!
//! The version byte allows future algorithm migration without breaking
//! existing tokens. The generating pipeline only ever encrypts; decryption
//! exists because the token contract promises exact authenticated recovery.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use rand::RngCore;

use crate::keys::KEY_LEN;

/// Current token format version.
const TOKEN_VERSION: u8 = 1;

/// Size of the embedded unix timestamp in bytes.
const TIMESTAMP_SIZE: usize = 8;

/// Size of the nonce in bytes (96 bits for GCM).
const NONCE_SIZE: usize = 12;

/// Size of the authentication tag in bytes.
const TAG_SIZE: usize = 16;

/// Cipher error types.
#[derive(Debug, thiserror::Error)]
pub enum CipherError {
    #[error("key is not valid base64url: {0}")]
    KeyEncoding(#[from] base64::DecodeError),
    #[error("key material must be {KEY_LEN} bytes after decoding, got {0}")]
    KeyLength(usize),
    #[error("encryption failed: {0}")]
    EncryptFailed(String),
    #[error("invalid token format")]
    InvalidToken,
    #[error("unsupported token version: {0}")]
    UnsupportedVersion(u8),
    #[error("authentication failed - wrong key or corrupted token")]
    Authentication,
    #[error("decrypted payload is not valid UTF-8")]
    NotText(#[from] std::string::FromUtf8Error),
}

/// Result type for cipher operations.
pub type CipherResult<T> = Result<T, CipherError>;

/// Symmetric message cipher over a base64url-encoded 32-byte key.
///
/// The expected key text is what [`crate::keys::encoded_key`] produces,
/// which is always well-formed; the constructor still validates so a key
/// from any other source fails loudly rather than mis-encrypting.
pub struct MessageCipher {
    key: [u8; KEY_LEN],
}

impl MessageCipher {
    /// Create a cipher from base64url-encoded key text.
    ///
    /// Fails if the text is not base64url or does not decode to exactly
    /// 32 bytes of key material.
    pub fn new(encoded_key: &str) -> CipherResult<Self> {
        let material = URL_SAFE.decode(encoded_key)?;
        let key: [u8; KEY_LEN] = material
            .as_slice()
            .try_into()
            .map_err(|_| CipherError::KeyLength(material.len()))?;
        Ok(Self { key })
    }

    /// Encrypt a message into a self-contained ASCII token.
    ///
    /// Each call draws a fresh random nonce, so encrypting the same
    /// message twice yields different tokens.
    pub fn encrypt(&self, plaintext: &str) -> CipherResult<String> {
        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|e| CipherError::EncryptFailed(e.to_string()))?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| CipherError::EncryptFailed(e.to_string()))?;

        let timestamp = chrono::Utc::now().timestamp().max(0) as u64;

        let mut token = Vec::with_capacity(1 + TIMESTAMP_SIZE + NONCE_SIZE + ciphertext.len());
        token.push(TOKEN_VERSION);
        token.extend_from_slice(&timestamp.to_be_bytes());
        token.extend_from_slice(&nonce_bytes);
        token.extend_from_slice(&ciphertext);

        Ok(URL_SAFE.encode(token))
    }

    /// Decrypt a token back to the original message.
    ///
    /// Rejects malformed base64, truncated tokens, unknown versions, and
    /// any token that fails authentication; never returns wrong plaintext.
    pub fn decrypt(&self, token: &str) -> CipherResult<String> {
        let raw = URL_SAFE
            .decode(token)
            .map_err(|_| CipherError::InvalidToken)?;

        // Minimum: version (1) + timestamp (8) + nonce (12) + tag (16).
        let min_len = 1 + TIMESTAMP_SIZE + NONCE_SIZE + TAG_SIZE;
        if raw.len() < min_len {
            return Err(CipherError::InvalidToken);
        }

        let version = raw[0];
        if version != TOKEN_VERSION {
            return Err(CipherError::UnsupportedVersion(version));
        }

        let nonce_start = 1 + TIMESTAMP_SIZE;
        let nonce = Nonce::from_slice(&raw[nonce_start..nonce_start + NONCE_SIZE]);
        let ciphertext = &raw[nonce_start + NONCE_SIZE..];

        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|e| CipherError::EncryptFailed(e.to_string()))?;

        let plaintext = cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| CipherError::Authentication)?;

        Ok(String::from_utf8(plaintext)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::encoded_key;
    use proptest::prelude::*;

    fn cipher(key: &str) -> MessageCipher {
        MessageCipher::new(&encoded_key(key)).unwrap()
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let cipher = cipher("mysecretkey");
        let token = cipher.encrypt("hello world").unwrap();
        assert_eq!(cipher.decrypt(&token).unwrap(), "hello world");
    }

    #[test]
    fn token_is_ascii_base64url() {
        let token = cipher("mysecretkey").encrypt("hello world").unwrap();
        assert!(token.is_ascii());
        assert!(URL_SAFE.decode(&token).is_ok());
    }

    #[test]
    fn token_embeds_version_and_has_expected_length() {
        let plaintext = "hello world";
        let token = cipher("k").encrypt(plaintext).unwrap();
        let raw = URL_SAFE.decode(&token).unwrap();
        assert_eq!(raw[0], TOKEN_VERSION);
        assert_eq!(
            raw.len(),
            1 + TIMESTAMP_SIZE + NONCE_SIZE + plaintext.len() + TAG_SIZE
        );
    }

    #[test]
    fn fresh_nonce_per_encryption() {
        let cipher = cipher("mysecretkey");
        let first = cipher.encrypt("same message").unwrap();
        let second = cipher.encrypt("same message").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let token = cipher("mysecretkey").encrypt("hello world").unwrap();
        let result = cipher("othersecret").decrypt(&token);
        assert!(matches!(result, Err(CipherError::Authentication)));
    }

    #[test]
    fn tampering_is_detected() {
        let cipher = cipher("mysecretkey");
        let token = cipher.encrypt("hello world").unwrap();
        let mut raw = URL_SAFE.decode(&token).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 1;
        let result = cipher.decrypt(&URL_SAFE.encode(raw));
        assert!(matches!(result, Err(CipherError::Authentication)));
    }

    #[test]
    fn truncated_token_rejected() {
        let result = cipher("mysecretkey").decrypt(&URL_SAFE.encode([1u8; 20]));
        assert!(matches!(result, Err(CipherError::InvalidToken)));
    }

    #[test]
    fn unknown_version_rejected() {
        let mut raw = vec![99u8];
        raw.extend_from_slice(&[0u8; 40]);
        let result = cipher("mysecretkey").decrypt(&URL_SAFE.encode(raw));
        assert!(matches!(result, Err(CipherError::UnsupportedVersion(99))));
    }

    #[test]
    fn garbage_token_rejected() {
        let result = cipher("mysecretkey").decrypt("not a token!");
        assert!(matches!(result, Err(CipherError::InvalidToken)));
    }

    #[test]
    fn empty_message_roundtrips() {
        let cipher = cipher("mysecretkey");
        let token = cipher.encrypt("").unwrap();
        assert_eq!(cipher.decrypt(&token).unwrap(), "");
    }

    #[test]
    fn key_must_decode_to_32_bytes() {
        let result = MessageCipher::new(&URL_SAFE.encode(b"short"));
        assert!(matches!(result, Err(CipherError::KeyLength(5))));
    }

    #[test]
    fn key_must_be_base64url() {
        let result = MessageCipher::new("***not base64***");
        assert!(matches!(result, Err(CipherError::KeyEncoding(_))));
    }

    proptest! {
        /// Round-trip holds for arbitrary messages and key strings.
        #[test]
        fn roundtrip_for_arbitrary_inputs(message in ".*", key in ".*") {
            let cipher = cipher(&key);
            let token = cipher.encrypt(&message).unwrap();
            prop_assert_eq!(cipher.decrypt(&token).unwrap(), message);
        }

        /// Keys differing within the first 32 bytes never decrypt each
        /// other's tokens.
        #[test]
        fn distinct_keys_reject_each_other(
            first in "[a-z]{1,32}",
            second in "[a-z]{1,32}"
        ) {
            prop_assume!(first != second);
            let token = cipher(&first).encrypt("payload").unwrap();
            prop_assert!(matches!(
                cipher(&second).decrypt(&token),
                Err(CipherError::Authentication)
            ));
        }
    }
}
