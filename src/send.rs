//! Send Pipeline
//!
//! Drives a spend through BUILDING → SIGNING → BROADCASTING →
//! MERCHANT_ACK (optional) → RECORDING → DONE, with FAILED reachable from
//! any step. A [`CancellationToken`] is honored up to, but never past,
//! BROADCASTING: once a transaction is on the wire there is nothing left
//! to cancel.
//!
//! SIGNING is the only step that touches long-lived key material, so it's
//! the only step that holds the process-wide core lock — this crate
//! exposes both a single [`LockMode::Legacy`] lock shared by every
//! account and a [`LockMode::PerWallet`] lock scoped to one account, so a
//! host juggling several signed-in accounts doesn't serialize unrelated
//! sends on each other. The lock is released before BUILDING's UTXO fetch
//! and before BROADCASTING, since both can block on network I/O.

use crate::api::general_info_server::GeneralInfoServer;
use crate::error::{WalletError, WalletResult};
use crate::tx;
use crate::tx::AddressKeySource;
use crate::types::{FeeTier, SendInfo, UnsavedTx};
use crate::watcher::UtxoWatcher;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    Idle,
    Building,
    Signing,
    Broadcasting,
    MerchantAck,
    Recording,
    Done,
    Failed,
}

/// A cancellation flag a caller can share with a running send. Checked at
/// the boundary of each step up through SIGNING; ignored once
/// BROADCASTING begins.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Which core lock a send should hold during SIGNING.
pub enum LockMode {
    /// One lock shared across every account in the process — the
    /// historical behavior, simplest to reason about for a single-account
    /// client.
    Legacy,
    /// A lock scoped to one account, keyed by username, so concurrent
    /// sends from different accounts don't block each other.
    PerWallet(String),
}

struct CoreLocks {
    legacy: Mutex<()>,
    per_wallet: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

static CORE_LOCKS: OnceLock<CoreLocks> = OnceLock::new();

fn core_locks() -> &'static CoreLocks {
    CORE_LOCKS.get_or_init(|| CoreLocks {
        legacy: Mutex::new(()),
        per_wallet: Mutex::new(HashMap::new()),
    })
}

fn with_core_lock<T>(mode: &LockMode, f: impl FnOnce() -> T) -> T {
    match mode {
        LockMode::Legacy => {
            let _guard = core_locks().legacy.lock().expect("core lock poisoned");
            f()
        }
        LockMode::PerWallet(username) => {
            let wallet_lock = {
                let mut table = core_locks().per_wallet.lock().expect("core lock table poisoned");
                table
                    .entry(username.to_lowercase())
                    .or_insert_with(|| Arc::new(Mutex::new(())))
                    .clone()
            };
            let _guard = wallet_lock.lock().expect("per-wallet lock poisoned");
            f()
        }
    }
}

pub struct SendOutcome {
    pub state: SendState,
    pub unsaved: Option<UnsavedTx>,
    pub merchant_memo: Option<String>,
}

/// Run one send end-to-end. `addresses` are the account's receiving
/// addresses to pull UTXOs for; `change_address` is where leftover value
/// (above the dust threshold) returns to; `service_fee`, if the fee
/// schedule applies one, is `(amount_sats, payee_address)`.
pub fn execute(
    watcher: &dyn UtxoWatcher,
    keys: &dyn AddressKeySource,
    addresses: &[String],
    send: &SendInfo,
    network: bitcoin::Network,
    change_address: &str,
    service_fee: Option<(u64, String)>,
    lock_mode: LockMode,
    cancel: &CancellationToken,
) -> WalletResult<SendOutcome> {
    if cancel.is_cancelled() {
        return Ok(SendOutcome {
            state: SendState::Failed,
            unsaved: None,
            merchant_memo: None,
        });
    }

    // BUILDING: fetch UTXOs (may block on network) and select inputs.
    let utxos = watcher.utxos(addresses)?;
    let service_fee_sats = service_fee.as_ref().map(|(amt, _)| *amt).unwrap_or(0);
    let (selected, miner_fee, send_amount_sats) = match send.amount_sats {
        Some(amount) => {
            let (selected, fee) = tx::pick_optimal(&utxos, amount, send.fee_rate_sats_per_vbyte)?;
            (selected, fee, amount)
        }
        None => {
            let (selected, fee) = tx::pick_maximum(&utxos, send.fee_rate_sats_per_vbyte)?;
            let total: u64 = selected.iter().map(|u| u.value_sats).sum();
            let sweep_amount = total
                .checked_sub(fee)
                .and_then(|v| v.checked_sub(service_fee_sats))
                .ok_or_else(|| WalletError::insufficient_funds("sweep amount does not cover fees"))?;
            (selected, fee, sweep_amount)
        }
    };
    let unsigned = tx::finalize_outputs(&selected, send, send_amount_sats, miner_fee, service_fee, change_address)?;

    if cancel.is_cancelled() {
        return Ok(SendOutcome {
            state: SendState::Failed,
            unsaved: None,
            merchant_memo: None,
        });
    }

    // SIGNING: the only step touching key material, so the only step
    // holding the core lock. No network I/O happens inside the closure.
    let signed = with_core_lock(&lock_mode, || tx::sign(&unsigned, keys, network))?;

    if cancel.is_cancelled() {
        return Ok(SendOutcome {
            state: SendState::Failed,
            unsaved: None,
            merchant_memo: None,
        });
    }

    // BROADCASTING: cancellation is no longer honored past this point.
    let txid = tx::broadcast(watcher, &signed)?;
    let mut unsaved = signed;
    unsaved.txid = txid;

    // MERCHANT_ACK: best-effort. A merchant that never acknowledges still
    // leaves a confirmed, spendable transaction behind.
    let merchant_memo = match &send.payment_request {
        Some(details) => tx::acknowledge_merchant(details, &unsaved.raw_hex, None, 0).unwrap_or(None),
        None => None,
    };

    Ok(SendOutcome {
        state: SendState::Done,
        unsaved: Some(unsaved),
        merchant_memo,
    })
}

/// Like [`execute`], but resolves `send.fee_rate_sats_per_vbyte` from the
/// general-info server's published fee schedule instead of trusting
/// whatever rate the caller put in `send`. A sweep (`amount_sats: None`)
/// is treated as the largest possible value for the "Standard" tier's
/// value threshold, since its final size isn't known until coin selection
/// runs.
pub fn execute_with_fee_tier(
    watcher: &dyn UtxoWatcher,
    keys: &dyn AddressKeySource,
    addresses: &[String],
    send: &SendInfo,
    fee_tier: FeeTier,
    fee_info_server: &dyn GeneralInfoServer,
    network: bitcoin::Network,
    change_address: &str,
    service_fee: Option<(u64, String)>,
    lock_mode: LockMode,
    cancel: &CancellationToken,
) -> WalletResult<SendOutcome> {
    let fee_info = fee_info_server.bitcoin_fee_info()?;
    let outgoing_funds_sats = send.amount_sats.unwrap_or(u64::MAX);
    let rate = fee_info.rate_for_send(fee_tier, outgoing_funds_sats)?;

    let mut resolved = send.clone();
    resolved.fee_rate_sats_per_vbyte = rate;

    execute(
        watcher,
        keys,
        addresses,
        &resolved,
        network,
        change_address,
        service_fee,
        lock_mode,
        cancel,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Utxo;
    use crate::watcher::InMemoryWatcher;
    use bitcoin::{Address, NetworkKind, PrivateKey};

    struct FixedKey(PrivateKey);
    impl AddressKeySource for FixedKey {
        fn private_key_for_index(&self, _address_index: u32) -> WalletResult<PrivateKey> {
            Ok(self.0)
        }
    }

    fn funded_watcher() -> (InMemoryWatcher, Address) {
        let secp = bitcoin::secp256k1::Secp256k1::new();
        let private_key = PrivateKey::from_slice(&[9u8; 32], NetworkKind::Test).unwrap();
        let public = private_key.public_key(&secp);
        let compressed = bitcoin::key::CompressedPublicKey::try_from(public).unwrap();
        let address = Address::p2wpkh(&compressed, bitcoin::Network::Testnet);

        let watcher = InMemoryWatcher::new();
        watcher.seed_utxo(Utxo {
            txid: "33".repeat(32),
            vout: 0,
            value_sats: 100_000,
            address: address.to_string(),
            address_index: 0,
            confirmations: 6,
        });
        (watcher, address)
    }

    #[test]
    fn test_execute_send_happy_path_reaches_done() {
        let (watcher, address) = funded_watcher();
        let private_key = PrivateKey::from_slice(&[9u8; 32], NetworkKind::Test).unwrap();
        let keys = FixedKey(private_key);

        let send = SendInfo {
            destination_address: address.to_string(),
            amount_sats: Some(50_000),
            fee_rate_sats_per_vbyte: 5,
            payment_request: None,
        };

        let outcome = execute(
            &watcher,
            &keys,
            &[address.to_string()],
            &send,
            bitcoin::Network::Testnet,
            &address.to_string(),
            None,
            LockMode::Legacy,
            &CancellationToken::new(),
        )
        .unwrap();

        assert_eq!(outcome.state, SendState::Done);
        let unsaved = outcome.unsaved.unwrap();
        assert!(watcher.find_tx(&unsaved.txid).unwrap().is_some());
    }

    #[test]
    fn test_cancellation_before_broadcast_aborts() {
        let (watcher, address) = funded_watcher();
        let private_key = PrivateKey::from_slice(&[9u8; 32], NetworkKind::Test).unwrap();
        let keys = FixedKey(private_key);

        let send = SendInfo {
            destination_address: address.to_string(),
            amount_sats: Some(50_000),
            fee_rate_sats_per_vbyte: 5,
            payment_request: None,
        };

        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = execute(
            &watcher,
            &keys,
            &[address.to_string()],
            &send,
            bitcoin::Network::Testnet,
            &address.to_string(),
            None,
            LockMode::Legacy,
            &cancel,
        )
        .unwrap();

        assert_eq!(outcome.state, SendState::Failed);
        assert!(outcome.unsaved.is_none());
    }

    struct StubFeeServer;
    impl GeneralInfoServer for StubFeeServer {
        fn bitcoin_fee_info(&self) -> WalletResult<crate::types::BitcoinFeeInfo> {
            Ok(crate::fees::bitcoin::fallback_fee_info())
        }
        fn airbitz_fee_info(&self) -> WalletResult<crate::types::AirbitzFeeInfo> {
            unimplemented!("not exercised by this test")
        }
    }

    #[test]
    fn test_execute_with_fee_tier_resolves_rate_from_schedule() {
        let (watcher, address) = funded_watcher();
        let private_key = PrivateKey::from_slice(&[9u8; 32], NetworkKind::Test).unwrap();
        let keys = FixedKey(private_key);

        // The literal rate here is ignored; execute_with_fee_tier overwrites
        // it with whatever the schedule resolves for the Low tier.
        let send = SendInfo {
            destination_address: address.to_string(),
            amount_sats: Some(10_000),
            fee_rate_sats_per_vbyte: 999,
            payment_request: None,
        };

        let outcome = execute_with_fee_tier(
            &watcher,
            &keys,
            &[address.to_string()],
            &send,
            FeeTier::Low,
            &StubFeeServer,
            bitcoin::Network::Testnet,
            &address.to_string(),
            None,
            LockMode::Legacy,
            &CancellationToken::new(),
        )
        .unwrap();

        assert_eq!(outcome.state, SendState::Done);
    }

    #[test]
    fn test_per_wallet_lock_mode_does_not_deadlock() {
        let (watcher, address) = funded_watcher();
        let private_key = PrivateKey::from_slice(&[9u8; 32], NetworkKind::Test).unwrap();
        let keys = FixedKey(private_key);

        let send = SendInfo {
            destination_address: address.to_string(),
            amount_sats: Some(10_000),
            fee_rate_sats_per_vbyte: 5,
            payment_request: None,
        };

        let outcome = execute(
            &watcher,
            &keys,
            &[address.to_string()],
            &send,
            bitcoin::Network::Testnet,
            &address.to_string(),
            None,
            LockMode::PerWallet("alice".to_string()),
            &CancellationToken::new(),
        )
        .unwrap();

        assert_eq!(outcome.state, SendState::Done);
    }
}
