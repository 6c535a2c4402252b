//! Cryptographic Primitives
//!
//! Low-level building blocks for the credential key hierarchy: scrypt key
//! derivation, SHA-256/SHA-256d hashing, and CSPRNG byte generation. The
//! authenticated-encryption envelope format lives in [`envelope`].

pub mod envelope;

use crate::error::{WalletError, WalletResult};
use crate::security::secure_memory::SecureBuffer;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// scrypt output length for auth keys (L1, LRA1) sent to the credential
/// server in place of the password/recovery answers.
pub const AUTH_KEY_LEN: usize = 32;

/// scrypt output length for data keys (L2, LRA2, LP2). All keys in the
/// credential hierarchy are 32 bytes; envelope key material is stretched
/// from these via [`expand_envelope_key`] rather than derived at a wider
/// width directly.
pub const DATA_KEY_LEN: usize = 32;

/// Envelope key material length: 32 bytes AES-256 key + 32 bytes
/// HMAC-SHA256 key, produced by [`expand_envelope_key`] from a 32-byte
/// data key whenever that key needs to encrypt something rather than be
/// encrypted.
pub const ENVELOPE_KEY_LEN: usize = 64;

/// Derive a key of `out_len` bytes from `input` using the given scrypt cost
/// parameters and salt. `input` should already be UTF-8 NFC normalized by
/// the caller.
pub fn scrypt_derive_len(
    input: &[u8],
    salt: &[u8],
    n: u32,
    r: u32,
    p: u32,
    out_len: usize,
) -> WalletResult<SecureBuffer> {
    let log_n = (32 - n.leading_zeros() - 1) as u8;
    if 1u32 << log_n != n {
        return Err(WalletError::crypto_error("scrypt N must be a power of two"));
    }
    let params = scrypt::Params::new(log_n, r, p, out_len)
        .map_err(|e| WalletError::crypto_error(format!("invalid scrypt params: {}", e)))?;
    let mut out = vec![0u8; out_len];
    scrypt::scrypt(input, salt, &params, &mut out)
        .map_err(|e| WalletError::crypto_error(format!("scrypt derivation failed: {}", e)))?;
    Ok(SecureBuffer::from_vec(out))
}

/// Derive a 32-byte auth key (L1 or LRA1).
pub fn scrypt_derive_auth(input: &[u8], salt: &[u8], n: u32, r: u32, p: u32) -> WalletResult<SecureBuffer> {
    scrypt_derive_len(input, salt, n, r, p, AUTH_KEY_LEN)
}

/// Derive a 32-byte data key (L2, LRA2, or LP2).
pub fn scrypt_derive_data(input: &[u8], salt: &[u8], n: u32, r: u32, p: u32) -> WalletResult<SecureBuffer> {
    scrypt_derive_len(input, salt, n, r, p, DATA_KEY_LEN)
}

/// Generate `len` bytes from the OS CSPRNG.
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut buf);
    buf
}

/// Generate a fresh salt sized for a new SNRP entry.
pub fn random_salt() -> Vec<u8> {
    random_bytes(32)
}

/// Stretch a 32-byte key (LP2) into 64 bytes of independent envelope key
/// material, for the contexts where LP2 itself — not a password- or
/// answer-derived key — needs to encrypt something: EPIN, and the sync
/// repository's cross-encrypted LP2/LRA2 copies. Domain-separated so the
/// AES half and the HMAC half can never collide.
pub fn expand_envelope_key(key: &[u8]) -> SecureBuffer {
    let mut out = Vec::with_capacity(ENVELOPE_KEY_LEN);
    out.extend_from_slice(&sha256(&[key, b"-enc"].concat()));
    out.extend_from_slice(&sha256(&[key, b"-mac"].concat()));
    SecureBuffer::from_vec(out)
}

pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Double SHA-256, as used for Bitcoin txids.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}
