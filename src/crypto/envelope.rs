//! Authenticated Encryption Envelope
//!
//! Every secret record an account keeps at rest (ERQ, ELP2, ELRA2, EPIN)
//! is stored as an `Envelope`: AES-256-CBC for confidentiality, HMAC-SHA256
//! over IV + ciphertext for integrity. Decrypt verifies the MAC in
//! constant time before touching the cipher.

use crate::error::{WalletError, WalletResult};
use crate::security::secure_memory::secure_compare;
use aes::Aes256;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;
type HmacSha256 = Hmac<Sha256>;

const IV_LEN: usize = 16;
/// AES-256 data key || HMAC-SHA256 key, concatenated.
const KEY_MATERIAL_LEN: usize = 64;

/// An encrypted-and-authenticated record, serialized verbatim into account
/// JSON files (ERQ.json, ELP2.json, ELRA2.json, EPIN.json).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub iv_hex: String,
    pub data_hex: String,
    pub hmac_hex: String,
}

/// Split a 64-byte master key into the (encryption, authentication) pair.
/// Callers derive the 64-byte input via scrypt so that key separation does
/// not require an extra HKDF pass.
fn split_keys(key_material: &[u8]) -> WalletResult<(&[u8], &[u8])> {
    if key_material.len() < KEY_MATERIAL_LEN {
        return Err(WalletError::crypto_error(
            "envelope key material must be at least 64 bytes",
        ));
    }
    Ok(key_material.split_at(32))
}

pub fn encrypt(key_material: &[u8], plaintext: &[u8]) -> WalletResult<Envelope> {
    let (enc_key, mac_key) = split_keys(key_material)?;
    let iv = crate::crypto::random_bytes(IV_LEN);

    let ciphertext = Aes256CbcEnc::new(enc_key.into(), iv.as_slice().into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut mac = HmacSha256::new_from_slice(mac_key)
        .map_err(|e| WalletError::crypto_error(format!("invalid HMAC key: {}", e)))?;
    mac.update(&iv);
    mac.update(&ciphertext);
    let tag = mac.finalize().into_bytes();

    Ok(Envelope {
        iv_hex: hex::encode(&iv),
        data_hex: hex::encode(&ciphertext),
        hmac_hex: hex::encode(tag),
    })
}

pub fn decrypt(key_material: &[u8], envelope: &Envelope) -> WalletResult<Vec<u8>> {
    let (enc_key, mac_key) = split_keys(key_material)?;
    let iv = hex::decode(&envelope.iv_hex)?;
    let ciphertext = hex::decode(&envelope.data_hex)?;
    let expected_tag = hex::decode(&envelope.hmac_hex)?;

    let mut mac = HmacSha256::new_from_slice(mac_key)
        .map_err(|e| WalletError::crypto_error(format!("invalid HMAC key: {}", e)))?;
    mac.update(&iv);
    mac.update(&ciphertext);
    let actual_tag = mac.finalize().into_bytes();

    if !secure_compare(&actual_tag, &expected_tag) {
        return Err(WalletError::crypto_error("envelope authentication failed"));
    }

    Aes256CbcDec::new(enc_key.into(), iv.as_slice().into())
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|e| WalletError::crypto_error(format!("envelope decrypt failed: {}", e)))
}
