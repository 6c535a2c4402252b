//! Key Derivation
//!
//! Username and secret material (password, recovery answers, PIN) are
//! concatenated and normalized to Unicode NFC before every scrypt call, so
//! that the same credential typed on different keyboards or platforms
//! always derives the same key.

use crate::crypto;
use crate::error::WalletResult;
use crate::security::secure_memory::SecureBuffer;
use crate::types::{KeySet, Snrp, Snrp1};
use unicode_normalization::UnicodeNormalization;

/// Normalize a username: lowercased (usernames are case-insensitive), then
/// NFC.
pub fn normalize_username(username: &str) -> String {
    username.to_lowercase().nfc().collect()
}

/// Normalize a secret (password, recovery answers, PIN) to NFC. Secrets are
/// case-sensitive, unlike usernames.
pub fn normalize_secret(secret: &str) -> String {
    secret.nfc().collect()
}

/// Normalize a username and secret for a combined-input derivation (L‖P,
/// L‖RA).
pub fn normalize_credential(username: &str, secret: &str) -> String {
    format!("{}{}", normalize_username(username), normalize_secret(secret))
}

/// Derive a 32-byte auth key from a single normalized input (L1 from the
/// username alone, or P1 from the password alone) using the server's
/// SNRP1.
fn derive_single_auth_key(input: &str, snrp1: &Snrp1) -> WalletResult<SecureBuffer> {
    let salt = hex::decode(&snrp1.salt_hex)?;
    crypto::scrypt_derive_auth(input.as_bytes(), &salt, snrp1.n, snrp1.r, snrp1.p)
}

/// Derive L1 = scrypt(L, SNRP1), the username-only auth key sent to the
/// credential server in place of the username.
pub fn derive_l1(username: &str, snrp1: &Snrp1) -> WalletResult<SecureBuffer> {
    derive_single_auth_key(&normalize_username(username), snrp1)
}

/// Derive P1 = scrypt(P, SNRP1), the password-only auth key sent to the
/// credential server in place of the password.
pub fn derive_p1(password: &str, snrp1: &Snrp1) -> WalletResult<SecureBuffer> {
    derive_single_auth_key(&normalize_secret(password), snrp1)
}

/// Derive LRA1 = scrypt(L‖RA, SNRP1), the combined username-plus-answers
/// auth key sent to the credential server when recovery is set up or used.
pub fn derive_lra1(username: &str, answers: &str, snrp1: &Snrp1) -> WalletResult<SecureBuffer> {
    let input = normalize_credential(username, answers);
    derive_single_auth_key(&input, snrp1)
}

/// Derive a 32-byte data key from a combined username-plus-secret input
/// (LP2 = scrypt(L‖P, SNRP2), LRA2 = scrypt(L‖RA, SNRP3)).
pub fn derive_data_key(username: &str, secret: &str, snrp: &Snrp) -> WalletResult<SecureBuffer> {
    let input = normalize_credential(username, secret);
    let salt = hex::decode(&snrp.salt_hex)?;
    crypto::scrypt_derive_data(input.as_bytes(), &salt, snrp.n, snrp.r, snrp.p)
}

/// Derive L2 = scrypt(L, SNRP4), the username-only key that decrypts the
/// account's recovery questions (ERQ) independently of any password.
pub fn derive_l2(username: &str, snrp4: &Snrp) -> WalletResult<SecureBuffer> {
    let input = normalize_username(username);
    let salt = hex::decode(&snrp4.salt_hex)?;
    crypto::scrypt_derive_data(input.as_bytes(), &salt, snrp4.n, snrp4.r, snrp4.p)
}

/// Assemble the in-memory `KeySet` from a password-based login. LP2 is
/// derived directly from the username and password — no envelope needs to
/// be opened to obtain it. The caller validates the password by separately
/// decrypting `EPIN.json` under the returned LP2.
pub fn keyset_from_password(username: &str, password: &str, snrp1: &Snrp1, snrp2: &Snrp) -> WalletResult<KeySet> {
    let l1 = derive_l1(username, snrp1)?;
    let p1 = derive_p1(password, snrp1)?;
    let lp2 = derive_data_key(username, password, snrp2)?;
    Ok(KeySet {
        l1,
        p1: Some(p1),
        lra1: None,
        lra2: None,
        lp2,
    })
}

/// Assemble the in-memory `KeySet` from a recovery-answer-based login:
/// derives LRA1/LRA2 directly, then decrypts `sync/ELP2.json` (LP2
/// encrypted under LRA2's expanded envelope key material) to recover LP2,
/// since LP2 itself depends on the password and cannot be re-derived from
/// the answers alone.
pub fn keyset_from_recovery(
    username: &str,
    answers: &str,
    snrp1: &Snrp1,
    snrp3: &Snrp,
    elp2: &crate::crypto::envelope::Envelope,
) -> WalletResult<KeySet> {
    let lra1 = derive_lra1(username, answers, snrp1)?;
    let lra2 = derive_data_key(username, answers, snrp3)?;
    let envelope_key = crypto::expand_envelope_key(lra2.as_bytes());
    let lp2_bytes = crate::crypto::envelope::decrypt(envelope_key.as_bytes(), elp2)?;
    Ok(KeySet {
        l1: SecureBuffer::from_vec(Vec::new()),
        p1: None,
        lra1: Some(lra1),
        lra2: Some(lra2),
        lp2: SecureBuffer::from_vec(lp2_bytes),
    })
}

/// Default scrypt cost parameters for a freshly created SNRP entry.
/// N = 2^17 (131072), r = 8, p = 1, matching the credential server's
/// published minimum work factor.
pub fn default_cost_params() -> (u32, u32, u32) {
    (1 << 17, 8, 1)
}

/// Generate a fresh SNRP entry with a random 32-byte salt and the default
/// cost parameters.
pub fn fresh_snrp() -> Snrp {
    let (n, r, p) = default_cost_params();
    Snrp {
        salt_hex: hex::encode(crypto::random_salt()),
        n,
        r,
        p,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases_username_only() {
        let a = normalize_credential("Alice", "Secret1");
        let b = normalize_credential("alice", "Secret1");
        assert_eq!(a, b);
        let c = normalize_credential("alice", "secret1");
        assert_ne!(a, c);
    }

    #[test]
    fn test_password_and_recovery_login_recover_same_lp2() {
        let username = "alice";
        let password = "correct horse battery staple";
        let answers = "blue|rex|elm street";

        let snrp1 = Snrp1 {
            salt_hex: hex::encode(crypto::random_salt()),
            n: 16384,
            r: 8,
            p: 1,
        };
        let snrp2 = fresh_snrp();
        let snrp3 = fresh_snrp();

        let lp2_plain = derive_data_key(username, password, &snrp2).unwrap();
        let lra2 = derive_data_key(username, answers, &snrp3).unwrap();

        let envelope_key = crypto::expand_envelope_key(lra2.as_bytes());
        let elp2 = crate::crypto::envelope::encrypt(envelope_key.as_bytes(), lp2_plain.as_bytes()).unwrap();

        let ks_pw = keyset_from_password(username, password, &snrp1, &snrp2).unwrap();
        let ks_rec = keyset_from_recovery(username, answers, &snrp1, &snrp3, &elp2).unwrap();

        assert_eq!(ks_pw.lp2.as_bytes(), lp2_plain.as_bytes());
        assert_eq!(ks_rec.lp2.as_bytes(), lp2_plain.as_bytes());
    }

    #[test]
    fn test_l1_p1_lra1_are_distinct_single_and_combined_inputs() {
        let username = "alice";
        let password = "correct horse battery staple";
        let answers = "blue|rex|elm street";
        let snrp1 = Snrp1 {
            salt_hex: hex::encode(crypto::random_salt()),
            n: 16384,
            r: 8,
            p: 1,
        };

        let l1 = derive_l1(username, &snrp1).unwrap();
        let p1 = derive_p1(password, &snrp1).unwrap();
        let lra1 = derive_lra1(username, answers, &snrp1).unwrap();

        assert_ne!(l1.as_bytes(), p1.as_bytes());
        assert_ne!(l1.as_bytes(), lra1.as_bytes());
        assert_ne!(p1.as_bytes(), lra1.as_bytes());

        // L1 depends only on the username, not the password.
        let l1_again = derive_l1(username, &snrp1).unwrap();
        assert_eq!(l1.as_bytes(), l1_again.as_bytes());
    }
}
