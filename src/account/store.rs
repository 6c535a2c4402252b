//! Account Filesystem Store
//!
//! Accounts live under `<base>/Accounts/Account_N`, `N` in `0..1024`,
//! assigned by lowest available gap so deleted accounts' slots are reused.
//! Each account directory holds:
//!
//! - `username.json` — plaintext username (needed to resolve `num_for_user`
//!   without decrypting anything)
//! - `CarePackage.json` — SNRP2/SNRP3/SNRP4 plus the optional ERQ
//! - `EPIN.json` — the account PIN, encrypted under LP2's expanded
//!   envelope key
//! - `SNRP1.json` — server-class scrypt params, copied in at creation time
//! - `sync/` — the opaque key/value store a (not-implemented-here) sync
//!   repository replicates: `ELP2.json` (LP2 encrypted under LRA2's
//!   expanded envelope key), `ELRA2.json` (LRA2 encrypted under LP2's
//!   expanded envelope key), plus the initially empty wallet and category
//!   lists. See [`super::repo`].
//!
//! LP2 is never stored anywhere in plaintext and never generated at
//! random: it is `scrypt(username || password, SNRP2)`, recomputed
//! directly from the username and password on every password sign-in.
//! LRA2 is `scrypt(username || recovery answers, SNRP3)`, recomputed the
//! same way from the recovery answers. Each envelope's role is to let the
//! *other* credential recover LP2 without knowing the password: recovery
//! sign-in derives LRA2 from the answers, then opens `sync/ELP2.json` to
//! get LP2.

use crate::api::CredentialServer;
use crate::credential::carepackage::CarePackageCodec;
use crate::credential::keyset::{
    derive_data_key, derive_l1, derive_l2, derive_lra1, derive_p1, fresh_snrp, keyset_from_password,
    keyset_from_recovery,
};
use crate::crypto::envelope::{self, Envelope};
use crate::crypto::expand_envelope_key;
use crate::error::{WalletError, WalletResult};
use crate::security::secure_memory::SecureBuffer;
use crate::types::{CarePackage, KeySet, Snrp, Snrp1};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::repo::{FsRepo, Repo};

const LOG_MODULE: &str = "account::store";

#[derive(Serialize, Deserialize)]
struct PinRecord {
    #[serde(rename = "PIN")]
    pin: String,
}

pub const MAX_ACCOUNTS: u32 = 1024;

pub struct AccountStore {
    base_dir: PathBuf,
    credential_server: Option<Box<dyn CredentialServer>>,
}

impl AccountStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> WalletResult<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(base_dir.join("Accounts"))?;
        Ok(Self {
            base_dir,
            credential_server: None,
        })
    }

    /// Like [`Self::new`], but wires a credential server so `create` and
    /// `set_recovery` can best-effort notify it of new or rotated auth
    /// keys. A failed call here never rolls back local account state; it
    /// is only logged.
    pub fn with_credential_server(
        base_dir: impl Into<PathBuf>,
        credential_server: Box<dyn CredentialServer>,
    ) -> WalletResult<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(base_dir.join("Accounts"))?;
        Ok(Self {
            base_dir,
            credential_server: Some(credential_server),
        })
    }

    fn accounts_dir(&self) -> PathBuf {
        self.base_dir.join("Accounts")
    }

    fn account_dir(&self, num: u32) -> PathBuf {
        self.accounts_dir().join(format!("Account_{}", num))
    }

    /// Lowest account number with no directory on disk, or an error if all
    /// 1024 slots are occupied.
    fn next_available_num(&self) -> WalletResult<u32> {
        for n in 0..MAX_ACCOUNTS {
            if !self.account_dir(n).exists() {
                return Ok(n);
            }
        }
        Err(WalletError::no_avail_account_space(format!(
            "all {} account slots are in use",
            MAX_ACCOUNTS
        )))
    }

    pub fn num_for_user(&self, username: &str) -> WalletResult<u32> {
        let target = username.to_lowercase();
        let dir = self.accounts_dir();
        if !dir.exists() {
            return Err(WalletError::account_does_not_exist(username));
        }
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            let username_path = path.join("username.json");
            if let Ok(contents) = fs::read_to_string(&username_path) {
                if let Ok(stored) = serde_json::from_str::<String>(&contents) {
                    if stored.to_lowercase() == target {
                        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
                        let num: u32 = name
                            .strip_prefix("Account_")
                            .and_then(|s| s.parse().ok())
                            .ok_or_else(|| WalletError::internal("malformed account directory name"))?;
                        return Ok(num);
                    }
                }
            }
        }
        Err(WalletError::account_does_not_exist(username))
    }

    pub fn user_for_num(&self, num: u32) -> WalletResult<String> {
        let path = self.account_dir(num).join("username.json");
        let contents = fs::read_to_string(&path)
            .map_err(|_| WalletError::account_does_not_exist(format!("Account_{}", num)))?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn read_snrp1(&self, num: u32) -> WalletResult<Snrp1> {
        let contents = fs::read_to_string(self.account_dir(num).join("SNRP1.json"))?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn read_care_package(&self, num: u32) -> WalletResult<CarePackage> {
        let contents = fs::read_to_string(self.account_dir(num).join("CarePackage.json"))?;
        CarePackageCodec::decode(&contents)
    }

    fn write_care_package(&self, num: u32, package: &CarePackage) -> WalletResult<()> {
        let json = CarePackageCodec::encode(package)?;
        fs::write(self.account_dir(num).join("CarePackage.json"), json)?;
        Ok(())
    }

    fn read_envelope(dir: &Path, name: &str) -> WalletResult<Envelope> {
        let contents = fs::read_to_string(dir.join(name))?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_envelope(dir: &Path, name: &str, envelope: &Envelope) -> WalletResult<()> {
        let json = serde_json::to_string(envelope)?;
        fs::write(dir.join(name), json)?;
        Ok(())
    }

    fn read_sync_envelope(dir: &Path, name: &str) -> WalletResult<Envelope> {
        let repo = FsRepo::new(dir.join("sync"))?;
        let bytes = repo.get(name)?.ok_or_else(|| WalletError::internal(format!("{} missing from sync", name)))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Create a new account: derives the full key hierarchy up front,
    /// establishes the initial recovery set, sets the PIN, and populates
    /// the `sync/` placeholder files. Fails if the username is already
    /// taken or the account directory space is exhausted; any I/O failure
    /// partway through creation rolls back by deleting the partially
    /// written directory.
    pub fn create(
        &self,
        username: &str,
        password: &str,
        pin: &str,
        recovery_questions: &str,
        recovery_answers: &str,
    ) -> WalletResult<u32> {
        if self.num_for_user(username).is_ok() {
            return Err(WalletError::account_already_exists(username));
        }
        let num = self.next_available_num()?;
        let dir = self.account_dir(num);

        match self.create_account_files(&dir, username, password, pin, recovery_questions, recovery_answers) {
            Ok(()) => Ok(num),
            Err(e) => {
                let _ = fs::remove_dir_all(&dir);
                Err(e)
            }
        }
    }

    fn create_account_files(
        &self,
        dir: &Path,
        username: &str,
        password: &str,
        pin: &str,
        recovery_questions: &str,
        recovery_answers: &str,
    ) -> WalletResult<()> {
        fs::create_dir_all(dir)?;

        let snrp1 = Snrp1 {
            salt_hex: hex::encode(crate::crypto::random_salt()),
            n: 16384,
            r: 8,
            p: 1,
        };
        let snrp2 = fresh_snrp();
        let snrp3 = fresh_snrp();
        let snrp4 = fresh_snrp();

        let lp2 = derive_data_key(username, password, &snrp2)?;
        let lra2 = derive_data_key(username, recovery_answers, &snrp3)?;

        let l2 = derive_l2(username, &snrp4)?;
        let erq = envelope::encrypt(l2.as_bytes(), recovery_questions.as_bytes())?;

        let care_package = CarePackage {
            erq: Some(serde_json::to_string(&erq)?),
            snrp2,
            snrp3,
            snrp4,
        };

        let pin_record = PinRecord { pin: pin.to_string() };
        let lp2_envelope_key = expand_envelope_key(lp2.as_bytes());
        let epin = envelope::encrypt(lp2_envelope_key.as_bytes(), serde_json::to_string(&pin_record)?.as_bytes())?;

        fs::write(dir.join("username.json"), serde_json::to_string(&username.to_string())?)?;
        fs::write(dir.join("SNRP1.json"), serde_json::to_string(&snrp1)?)?;
        let package_json = CarePackageCodec::encode(&care_package)?;
        fs::write(dir.join("CarePackage.json"), package_json)?;
        Self::write_envelope(dir, "EPIN.json", &epin)?;

        let lra2_envelope_key = expand_envelope_key(lra2.as_bytes());
        let sync_elp2 = envelope::encrypt(lra2_envelope_key.as_bytes(), lp2.as_bytes())?;
        let sync_elra2 = envelope::encrypt(lp2_envelope_key.as_bytes(), lra2.as_bytes())?;
        let repo = FsRepo::new(dir.join("sync"))?;
        repo.put("ELP2.json", serde_json::to_string(&sync_elp2)?.as_bytes())?;
        repo.put("ELRA2.json", serde_json::to_string(&sync_elra2)?.as_bytes())?;
        repo.put("Wallets.json", b"[]")?;
        repo.put("Categories.json", b"[]")?;

        let l1 = derive_l1(username, &snrp1)?;
        let p1 = derive_p1(password, &snrp1)?;
        let lra1 = derive_lra1(username, recovery_answers, &snrp1)?;

        if let Some(server) = &self.credential_server {
            let req = crate::api::credential_server::CreateAccountRequest {
                l1_hex: &hex::encode(l1.as_bytes()),
                p1_hex: &hex::encode(p1.as_bytes()),
                lra1_hex: &hex::encode(lra1.as_bytes()),
                care_package: &care_package,
            };
            if let Err(e) = server.create_account(username, &req) {
                crate::log_warn!(
                    LOG_MODULE,
                    "credential server account registration failed; local account created anyway",
                    error = e
                );
            }
        }

        Ok(())
    }

    /// Decrypt and return the account PIN. EPIN-decryption failure is
    /// reported as `BadPassword`, matching `sign_in`, so a caller can't
    /// distinguish a wrong password from a corrupt/foreign EPIN blob.
    pub fn get_pin(&self, username: &str, password: &str) -> WalletResult<String> {
        let keyset = self.sign_in(username, password)?;
        let num = self.num_for_user(username)?;
        let epin = Self::read_envelope(&self.account_dir(num), "EPIN.json")?;
        let lp2_envelope_key = expand_envelope_key(keyset.lp2.as_bytes());
        let plaintext = envelope::decrypt(lp2_envelope_key.as_bytes(), &epin)
            .map_err(|_| WalletError::bad_password("PIN does not match this account"))?;
        let record: PinRecord = serde_json::from_slice(&plaintext)?;
        Ok(record.pin)
    }

    /// Rewrite the account PIN. `LP2` itself is unchanged, so this touches
    /// only `EPIN.json`.
    pub fn set_pin(&self, username: &str, password: &str, new_pin: &str) -> WalletResult<()> {
        let keyset = self.sign_in(username, password)?;
        let num = self.num_for_user(username)?;
        let record = PinRecord { pin: new_pin.to_string() };
        let lp2_envelope_key = expand_envelope_key(keyset.lp2.as_bytes());
        let epin = envelope::encrypt(lp2_envelope_key.as_bytes(), serde_json::to_string(&record)?.as_bytes())?;
        Self::write_envelope(&self.account_dir(num), "EPIN.json", &epin)?;
        Ok(())
    }

    /// Sign in with a password, returning the decrypted `KeySet`. LP2 is
    /// derived directly from the username and password; the password is
    /// validated by successfully decrypting `EPIN.json` under it, not by
    /// opening any envelope to obtain LP2 itself.
    pub fn sign_in(&self, username: &str, password: &str) -> WalletResult<KeySet> {
        let num = self.num_for_user(username)?;
        let snrp1 = self.read_snrp1(num)?;
        let care_package = self.read_care_package(num)?;

        let keyset = keyset_from_password(username, password, &snrp1, &care_package.snrp2)?;

        let epin = Self::read_envelope(&self.account_dir(num), "EPIN.json")?;
        let lp2_envelope_key = expand_envelope_key(keyset.lp2.as_bytes());
        envelope::decrypt(lp2_envelope_key.as_bytes(), &epin)
            .map_err(|_| WalletError::bad_password("password does not match this account"))?;

        Ok(keyset)
    }

    /// Sign in with recovery answers, returning the decrypted `KeySet`.
    /// LRA2 is derived directly from the username and answers; LP2 itself
    /// depends on the password, so it is recovered by opening
    /// `sync/ELP2.json` under LRA2's expanded envelope key.
    pub fn sign_in_with_recovery(&self, username: &str, answers: &str) -> WalletResult<KeySet> {
        let num = self.num_for_user(username)?;
        let snrp1 = self.read_snrp1(num)?;
        let care_package = self.read_care_package(num)?;
        if care_package.erq.is_none() {
            return Err(WalletError::account_does_not_exist(
                "no recovery set configured for this account",
            ));
        }
        let dir = self.account_dir(num);
        let elp2 = Self::read_sync_envelope(&dir, "ELP2.json")
            .map_err(|_| WalletError::account_does_not_exist("no recovery set configured for this account"))?;

        keyset_from_recovery(username, answers, &snrp1, &care_package.snrp3, &elp2)
            .map_err(|_| WalletError::bad_password("recovery answers do not match this account"))
    }

    /// Fetch the key via the process-wide cache, falling back to a full
    /// scrypt-derivation sign-in and populating the cache on success.
    pub fn get_key(&self, username: &str, password: &str) -> WalletResult<SecureBuffer> {
        if let Some(lp2) = super::cache::global().verify_and_get_lp2(username, password) {
            return Ok(SecureBuffer::from_vec(lp2));
        }
        let keyset = self.sign_in(username, password)?;
        let lp2 = SecureBuffer::from_bytes(keyset.lp2.as_bytes());
        super::cache::global().insert(username, keyset, password);
        Ok(lp2)
    }

    pub fn clear_cache(&self, username: &str) {
        super::cache::global().release(username);
    }

    /// Re-key the account: derive a new LP2 from the new password, then
    /// rewrite every record LP2 protects. LP2 changes because
    /// `LP2 = scrypt(username || password, SNRP2)` depends on the
    /// password, so `EPIN.json` and both `sync/` cross-copies all need a
    /// fresh encryption under the new LP2 (and `sync/ELRA2.json` needs a
    /// fresh SNRP3-independent LRA2 recovered from the old copy, since
    /// recovery answers themselves are not supplied here). Requires the
    /// current password to authorize the change.
    pub fn change_password(&self, username: &str, old_password: &str, new_password: &str) -> WalletResult<()> {
        let old_keyset = self.sign_in(username, old_password)?;
        let num = self.num_for_user(username)?;
        let mut care_package = self.read_care_package(num)?;
        let dir = self.account_dir(num);

        let old_lp2_envelope_key = expand_envelope_key(old_keyset.lp2.as_bytes());
        let old_sync_elra2 = Self::read_sync_envelope(&dir, "ELRA2.json")?;
        let lra2_bytes = envelope::decrypt(old_lp2_envelope_key.as_bytes(), &old_sync_elra2)?;

        let new_snrp2 = fresh_snrp();
        let new_lp2 = derive_data_key(username, new_password, &new_snrp2)?;
        let new_lp2_envelope_key = expand_envelope_key(new_lp2.as_bytes());
        let lra2_envelope_key = expand_envelope_key(&lra2_bytes);

        let new_pin_record = self.get_pin(username, old_password)?;
        let epin = envelope::encrypt(
            new_lp2_envelope_key.as_bytes(),
            serde_json::to_string(&PinRecord { pin: new_pin_record })?.as_bytes(),
        )?;
        Self::write_envelope(&dir, "EPIN.json", &epin)?;

        let new_sync_elp2 = envelope::encrypt(lra2_envelope_key.as_bytes(), new_lp2.as_bytes())?;
        let new_sync_elra2 = envelope::encrypt(new_lp2_envelope_key.as_bytes(), &lra2_bytes)?;
        let repo = FsRepo::new(dir.join("sync"))?;
        repo.put("ELP2.json", serde_json::to_string(&new_sync_elp2)?.as_bytes())?;
        repo.put("ELRA2.json", serde_json::to_string(&new_sync_elra2)?.as_bytes())?;

        care_package.snrp2 = new_snrp2;
        self.write_care_package(num, &care_package)?;

        self.clear_cache(username);
        Ok(())
    }

    /// Establish (or replace) the account's recovery set. Requires a valid
    /// signed-in `KeySet` from the caller — recovery cannot be set or
    /// rotated without first proving knowledge of the current password.
    /// Generates a fresh SNRP3/LRA2 pair, re-encrypts both `sync/`
    /// cross-copies, and rewrites the recovery-questions envelope (ERQ)
    /// under a key derived from the username alone, since questions must
    /// be displayable before the user supplies answers.
    pub fn set_recovery(
        &self,
        username: &str,
        keyset: &KeySet,
        questions: &str,
        answers: &str,
    ) -> WalletResult<()> {
        let num = self.num_for_user(username)?;
        let snrp1 = self.read_snrp1(num)?;
        let mut care_package = self.read_care_package(num)?;
        let dir = self.account_dir(num);

        let new_snrp3 = fresh_snrp();
        let lra2 = derive_data_key(username, answers, &new_snrp3)?;

        let question_key = derive_l2(username, &care_package.snrp4)?;
        let erq = envelope::encrypt(question_key.as_bytes(), questions.as_bytes())?;

        care_package.snrp3 = new_snrp3;
        care_package.erq = Some(serde_json::to_string(&erq)?);
        self.write_care_package(num, &care_package)?;

        let lp2_envelope_key = expand_envelope_key(keyset.lp2.as_bytes());
        let lra2_envelope_key = expand_envelope_key(lra2.as_bytes());
        let sync_elp2 = envelope::encrypt(lra2_envelope_key.as_bytes(), keyset.lp2.as_bytes())?;
        let sync_elra2 = envelope::encrypt(lp2_envelope_key.as_bytes(), lra2.as_bytes())?;
        let repo = FsRepo::new(dir.join("sync"))?;
        repo.put("ELP2.json", serde_json::to_string(&sync_elp2)?.as_bytes())?;
        repo.put("ELRA2.json", serde_json::to_string(&sync_elra2)?.as_bytes())?;

        let lra1 = derive_lra1(username, answers, &snrp1)?;
        if let Some(server) = &self.credential_server {
            if let Err(e) = server.update_recovery_key(username, &hex::encode(lra1.as_bytes()), &care_package) {
                crate::log_warn!(
                    LOG_MODULE,
                    "credential server recovery key update failed; local recovery set anyway",
                    error = e
                );
            }
        }

        self.clear_cache(username);
        Ok(())
    }

    /// Decrypt and return the recovery questions, if a recovery set exists.
    pub fn recovery_questions(&self, username: &str) -> WalletResult<Option<String>> {
        let num = self.num_for_user(username)?;
        let care_package = self.read_care_package(num)?;
        let Some(erq_json) = care_package.erq else {
            return Ok(None);
        };
        let erq: Envelope = serde_json::from_str(&erq_json)?;
        let question_key = derive_l2(username, &care_package.snrp4)?;
        let plaintext = envelope::decrypt(question_key.as_bytes(), &erq)?;
        Ok(Some(String::from_utf8_lossy(&plaintext).into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_then_sign_in() {
        let dir = tempdir().unwrap();
        let store = AccountStore::new(dir.path()).unwrap();
        store.create("alice", "hunter2", "1234", "Q1\nQ2", "a1\na2").unwrap();

        let keyset = store.sign_in("alice", "hunter2").unwrap();
        assert_eq!(keyset.lp2.len(), 32);
        assert!(store.sign_in("alice", "wrong").is_err());
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let dir = tempdir().unwrap();
        let store = AccountStore::new(dir.path()).unwrap();
        store.create("alice", "hunter2", "1234", "Q1", "a1").unwrap();
        let err = store.create("Alice", "otherpw", "0000", "Q1", "a1").unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::AccountAlreadyExists);
    }

    #[test]
    fn test_num_for_user_and_back() {
        let dir = tempdir().unwrap();
        let store = AccountStore::new(dir.path()).unwrap();
        let num = store.create("bob", "pw12345", "4321", "Q1", "a1").unwrap();
        assert_eq!(store.num_for_user("BOB").unwrap(), num);
        assert_eq!(store.user_for_num(num).unwrap(), "bob");
    }

    #[test]
    fn test_set_recovery_then_sign_in_with_answers() {
        let dir = tempdir().unwrap();
        let store = AccountStore::new(dir.path()).unwrap();
        store.create("carol", "swordfish", "9999", "original Q", "original a").unwrap();
        let keyset = store.sign_in("carol", "swordfish").unwrap();

        store
            .set_recovery(
                "carol",
                &keyset,
                "favorite color?|pet name?",
                "blue|rex",
            )
            .unwrap();

        let recovered = store.sign_in_with_recovery("carol", "blue|rex").unwrap();
        assert_eq!(recovered.lp2.as_bytes(), keyset.lp2.as_bytes());

        let questions = store.recovery_questions("carol").unwrap();
        assert_eq!(questions.as_deref(), Some("favorite color?|pet name?"));
    }

    #[test]
    fn test_change_password_rotates_lp2() {
        let dir = tempdir().unwrap();
        let store = AccountStore::new(dir.path()).unwrap();
        store.create("dave", "first-password", "1111", "Q1", "a1").unwrap();
        let before = store.sign_in("dave", "first-password").unwrap();

        store.change_password("dave", "first-password", "second-password").unwrap();

        assert!(store.sign_in("dave", "first-password").is_err());
        let after = store.sign_in("dave", "second-password").unwrap();
        assert_ne!(before.lp2.as_bytes(), after.lp2.as_bytes());
        assert_eq!(store.get_pin("dave", "second-password").unwrap(), "1111");
    }

    #[test]
    fn test_change_password_preserves_recovery() {
        let dir = tempdir().unwrap();
        let store = AccountStore::new(dir.path()).unwrap();
        store.create("heidi", "first-password", "1111", "Q1", "a1").unwrap();

        store.change_password("heidi", "first-password", "second-password").unwrap();

        let after_password = store.sign_in("heidi", "second-password").unwrap();
        let after_recovery = store.sign_in_with_recovery("heidi", "a1").unwrap();
        assert_eq!(after_password.lp2.as_bytes(), after_recovery.lp2.as_bytes());
    }

    #[test]
    fn test_get_key_uses_cache_on_second_call() {
        let dir = tempdir().unwrap();
        let store = AccountStore::new(dir.path()).unwrap();
        store.create("erin", "pw", "2222", "Q1", "a1").unwrap();

        let first = store.get_key("erin", "pw").unwrap();
        let second = store.get_key("erin", "pw").unwrap();
        assert_eq!(first.as_bytes(), second.as_bytes());
        store.clear_cache("erin");
    }

    #[test]
    fn test_create_populates_pin_and_sync_placeholders() {
        let dir = tempdir().unwrap();
        let store = AccountStore::new(dir.path()).unwrap();
        let num = store.create("frank", "pw", "1234", "Q1", "a1").unwrap();

        assert_eq!(store.get_pin("frank", "pw").unwrap(), "1234");

        let account_dir = dir.path().join("Accounts").join(format!("Account_{}", num));
        assert!(account_dir.join("EPIN.json").exists());
        assert!(!account_dir.join("ELP2.json").exists());
        assert!(!account_dir.join("ELRA2.json").exists());
        let wallets = fs::read_to_string(account_dir.join("sync").join("Wallets.json")).unwrap();
        assert_eq!(wallets, "[]");
        let categories = fs::read_to_string(account_dir.join("sync").join("Categories.json")).unwrap();
        assert_eq!(categories, "[]");
    }

    #[test]
    fn test_set_pin_changes_pin_without_touching_lp2() {
        let dir = tempdir().unwrap();
        let store = AccountStore::new(dir.path()).unwrap();
        store.create("grace", "pw", "0000", "Q1", "a1").unwrap();
        let before = store.sign_in("grace", "pw").unwrap();

        store.set_pin("grace", "pw", "5678").unwrap();

        assert_eq!(store.get_pin("grace", "pw").unwrap(), "5678");
        let after = store.sign_in("grace", "pw").unwrap();
        assert_eq!(before.lp2.as_bytes(), after.lp2.as_bytes());
    }
}
