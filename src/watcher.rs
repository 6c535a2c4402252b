//! UTXO Watcher Contract
//!
//! This crate never talks to a blockchain indexer itself — a host
//! application supplies one, since the choice of indexer (Electrum
//! server, its own full node, a hosted API) is an application-level
//! deployment decision. [`UtxoWatcher`] is the seam: coin selection and
//! the send pipeline depend on the trait, not on any particular backend.

use crate::error::WalletResult;
use crate::types::Utxo;
use std::collections::HashMap;
use std::sync::RwLock;

pub trait UtxoWatcher: Send + Sync {
    /// Unspent outputs known to pay `addresses`, most confirmed first.
    fn utxos(&self, addresses: &[String]) -> WalletResult<Vec<Utxo>>;

    /// Raw transaction hex for a previously broadcast txid, if the watcher
    /// has observed it (confirmed or still in the mempool).
    fn find_tx(&self, txid: &str) -> WalletResult<Option<String>>;

    /// Submit a raw transaction to the network. Returns the txid the
    /// network accepted it under.
    fn send_tx(&self, raw_hex: &str) -> WalletResult<String>;
}

/// An in-process, in-memory watcher: fine for tests and for a host that
/// wants to seed known UTXOs itself rather than run live chain sync.
#[derive(Default)]
pub struct InMemoryWatcher {
    utxos_by_address: RwLock<HashMap<String, Vec<Utxo>>>,
    broadcast: RwLock<HashMap<String, String>>,
}

impl InMemoryWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_utxo(&self, utxo: Utxo) {
        let mut map = self.utxos_by_address.write().expect("watcher lock poisoned");
        map.entry(utxo.address.clone()).or_default().push(utxo);
    }
}

impl UtxoWatcher for InMemoryWatcher {
    fn utxos(&self, addresses: &[String]) -> WalletResult<Vec<Utxo>> {
        let map = self.utxos_by_address.read().expect("watcher lock poisoned");
        Ok(addresses
            .iter()
            .filter_map(|a| map.get(a))
            .flat_map(|v| v.iter().cloned())
            .collect())
    }

    fn find_tx(&self, txid: &str) -> WalletResult<Option<String>> {
        let map = self.broadcast.read().expect("watcher lock poisoned");
        Ok(map.get(txid).cloned())
    }

    fn send_tx(&self, raw_hex: &str) -> WalletResult<String> {
        let bytes = hex::decode(raw_hex)?;
        let txid_bytes = crate::crypto::sha256d(&bytes);
        let mut reversed = txid_bytes;
        reversed.reverse();
        let txid = hex::encode(reversed);
        let mut map = self.broadcast.write().expect("watcher lock poisoned");
        map.insert(txid.clone(), raw_hex.to_string());
        Ok(txid)
    }
}
