//! Transaction Signing
//!
//! Signs the inputs an [`UnsignedTx`] selected, native-segwit P2WPKH only.
//! Key material for a given input is resolved through [`AddressKeySource`]
//! rather than passed in directly — the account/key-hierarchy layer owns
//! how an address index maps to a signing key; this module only needs the
//! result.

use crate::error::{WalletError, WalletResult};
use crate::types::{UnsavedTx, UnsignedTx};
use bitcoin::hashes::Hash;
use bitcoin::secp256k1::{Message, Secp256k1};
use bitcoin::sighash::{EcdsaSighashType, SighashCache};
use bitcoin::{
    absolute::LockTime, consensus::encode, transaction::Version, Address, Amount, OutPoint,
    PrivateKey, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Witness,
};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// Resolves the private key backing one of an account's derived
/// addresses. Implemented by the account/key-hierarchy layer; kept
/// abstract here so signing never has to know how an address index maps
/// to key material.
pub trait AddressKeySource {
    fn private_key_for_index(&self, address_index: u32) -> WalletResult<PrivateKey>;
}

/// Sign every input an [`UnsignedTx`] selected and serialize the result.
/// The returned txid is the non-malleable transaction identifier: segwit's
/// `compute_txid` hashes only the signature-stripped (non-witness) form of
/// the transaction, so a third party re-encoding an equivalent witness
/// cannot change it.
pub fn sign(unsigned: &UnsignedTx, keys: &dyn AddressKeySource, network: bitcoin::Network) -> WalletResult<UnsavedTx> {
    if unsigned.selected_utxos.is_empty() {
        return Err(WalletError::invalid_input("cannot sign a transaction with no inputs"));
    }

    let secp = Secp256k1::new();
    let mut tx_inputs = Vec::with_capacity(unsigned.selected_utxos.len());
    for utxo in &unsigned.selected_utxos {
        let txid = bitcoin::Txid::from_str(&utxo.txid)
            .map_err(|e| WalletError::invalid_input(format!("invalid utxo txid: {}", e)))?;
        tx_inputs.push(TxIn {
            previous_output: OutPoint::new(txid, utxo.vout),
            script_sig: ScriptBuf::new(),
            sequence: Sequence::ENABLE_RBF_NO_LOCKTIME,
            witness: Witness::default(),
        });
    }

    let tx_outputs = unsigned
        .outputs
        .iter()
        .filter(|o| !o.input)
        .map(|o| {
            let address = Address::from_str(&o.address)?.require_network(network)?;
            Ok(TxOut {
                value: Amount::from_sat(o.amount_sats),
                script_pubkey: address.script_pubkey(),
            })
        })
        .collect::<WalletResult<Vec<_>>>()?;

    let mut tx = Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: tx_inputs,
        output: tx_outputs,
    };

    let mut sighasher = SighashCache::new(&mut tx);
    for (i, utxo) in unsigned.selected_utxos.iter().enumerate() {
        let private_key = keys.private_key_for_index(utxo.address_index)?;
        let public_key = private_key.public_key(&secp);
        let compressed = bitcoin::key::CompressedPublicKey::try_from(public_key)
            .map_err(|_| WalletError::crypto_error("signing key is not compressed; P2WPKH requires it"))?;
        let script_code = ScriptBuf::new_p2wpkh(&compressed.wpubkey_hash());
        let input_amount = Amount::from_sat(utxo.value_sats);

        let sighash = sighasher.p2wpkh_signature_hash(i, &script_code, input_amount, EcdsaSighashType::All)?;
        let msg = Message::from_digest_slice(sighash.as_byte_array())?;
        let signature = secp.sign_ecdsa(&msg, &private_key.inner);

        let mut witness = Witness::new();
        let mut sig_bytes = signature.serialize_der().to_vec();
        sig_bytes.push(EcdsaSighashType::All as u8);
        witness.push(sig_bytes);
        witness.push(compressed.to_bytes());
        *sighasher
            .witness_mut(i)
            .ok_or_else(|| WalletError::internal("witness index out of range"))? = witness;
    }

    let txid = tx.compute_txid().to_string();
    let raw_hex = hex::encode(encode::serialize(&tx));
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Ok(UnsavedTx {
        txid,
        raw_hex,
        fee_sats: unsigned.fee_sats,
        outputs: unsigned.outputs.clone(),
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TxOutput, Utxo};
    use bitcoin::NetworkKind;

    struct FixedKey(PrivateKey);
    impl AddressKeySource for FixedKey {
        fn private_key_for_index(&self, _address_index: u32) -> WalletResult<PrivateKey> {
            Ok(self.0)
        }
    }

    fn test_key_and_address() -> (PrivateKey, Address) {
        let secp = Secp256k1::new();
        let private_key = PrivateKey::from_slice(&[7u8; 32], NetworkKind::Test).unwrap();
        let public = private_key.public_key(&secp);
        let compressed = bitcoin::key::CompressedPublicKey::try_from(public).unwrap();
        let address = Address::p2wpkh(&compressed, bitcoin::Network::Testnet);
        (private_key, address)
    }

    #[test]
    fn test_sign_produces_valid_segwit_transaction() {
        let (private_key, address) = test_key_and_address();
        let unsigned = UnsignedTx {
            selected_utxos: vec![Utxo {
                txid: "11".repeat(32),
                vout: 0,
                value_sats: 100_000,
                address: address.to_string(),
                address_index: 0,
                confirmations: 6,
            }],
            outputs: vec![TxOutput {
                address: address.to_string(),
                amount_sats: 99_000,
                input: false,
            }],
            fee_sats: 1_000,
        };
        let keys = FixedKey(private_key);
        let signed = sign(&unsigned, &keys, bitcoin::Network::Testnet).unwrap();
        assert_eq!(signed.fee_sats, 1_000);
        assert!(!signed.raw_hex.is_empty());
        assert_eq!(signed.txid.len(), 64);
    }

    #[test]
    fn test_sign_rejects_empty_inputs() {
        let unsigned = UnsignedTx {
            selected_utxos: vec![],
            outputs: vec![],
            fee_sats: 0,
        };
        let (private_key, _) = test_key_and_address();
        let keys = FixedKey(private_key);
        assert!(sign(&unsigned, &keys, bitcoin::Network::Testnet).is_err());
    }

    #[test]
    fn test_txid_is_stable_for_same_transaction() {
        let (private_key, address) = test_key_and_address();
        let unsigned = UnsignedTx {
            selected_utxos: vec![Utxo {
                txid: "22".repeat(32),
                vout: 1,
                value_sats: 50_000,
                address: address.to_string(),
                address_index: 0,
                confirmations: 1,
            }],
            outputs: vec![TxOutput {
                address: address.to_string(),
                amount_sats: 49_000,
                input: false,
            }],
            fee_sats: 1_000,
        };
        let keys = FixedKey(private_key);
        let first = sign(&unsigned, &keys, bitcoin::Network::Testnet).unwrap();
        let second = sign(&unsigned, &keys, bitcoin::Network::Testnet).unwrap();
        assert_eq!(first.txid, second.txid);
    }
}
