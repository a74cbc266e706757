//! Key derivation for the message cipher.
//!
//! The cipher wants its key as base64url text over exactly 32 bytes of
//! material. This module adapts arbitrary human-chosen key strings into
//! that format: shorter input is right-padded with ASCII `'0'`, longer
//! input is truncated to the first 32 bytes.
//!
//! The literal-`'0'` padding makes short keys predictable and is a known
//! weakness of the scheme. It is kept as-is: every derived key (and every
//! token encrypted under one) depends on it.

use base64::{engine::general_purpose::URL_SAFE, Engine as _};

/// Length of the cipher's key material in bytes.
pub const KEY_LEN: usize = 32;

/// Byte used to fill short keys up to [`KEY_LEN`].
const PAD_BYTE: u8 = b'0';

/// Derive fixed-length key material from an arbitrary key string.
///
/// Total over all inputs: the result is always exactly [`KEY_LEN`] bytes,
/// the first `min(len, 32)` of which are the input's own bytes.
pub fn key_material(key: &str) -> [u8; KEY_LEN] {
    let mut material = [PAD_BYTE; KEY_LEN];
    let bytes = key.as_bytes();
    let used = bytes.len().min(KEY_LEN);
    material[..used].copy_from_slice(&bytes[..used]);
    material
}

/// Derive the base64url-encoded (RFC 4648, `=`-padded) key text expected
/// by [`crate::cipher::MessageCipher::new`].
pub fn encoded_key(key: &str) -> String {
    URL_SAFE.encode(key_material(key))
}
