//! Coin Selection & Output Assembly
//!
//! Turns a caller's [`SendInfo`] plus the set of UTXOs a
//! [`crate::watcher::UtxoWatcher`] reports as spendable into an
//! [`UnsignedTx`]: which inputs to consume, which outputs to create, and
//! the miner fee actually paid. Two selection strategies, matching the
//! two ways a user can ask to spend: an exact amount ([`pick_optimal`])
//! or "send everything" ([`pick_maximum`]).

use crate::error::{WalletError, WalletResult};
use crate::types::{SendInfo, TxOutput, UnsignedTx, Utxo};

/// Dust threshold for a native P2WPKH output, in satoshis: the fee to
/// spend the output at a 1 sat/vbyte relay-minimum rate would exceed the
/// output's own value below this, so wallets and relay policy alike treat
/// it as unspendable and refuse to create it.
pub const DUST_THRESHOLD_SATS: u64 = 294;

const P2WPKH_INPUT_VBYTES: u64 = 68;
const P2WPKH_OUTPUT_VBYTES: u64 = 31;
const BASE_TX_VBYTES: u64 = 11;

fn estimate_vsize(num_inputs: u64, num_outputs: u64) -> u64 {
    BASE_TX_VBYTES + num_inputs * P2WPKH_INPUT_VBYTES + num_outputs * P2WPKH_OUTPUT_VBYTES
}

fn estimate_fee(num_inputs: u64, num_outputs: u64, fee_rate_sats_per_vbyte: u64) -> u64 {
    estimate_vsize(num_inputs, num_outputs) * fee_rate_sats_per_vbyte
}

/// Select the fewest, largest-first UTXOs that cover `amount_sats` plus
/// the miner fee for a two-output transaction (destination + change).
/// Ties — multiple selections of the same input count — favor whichever
/// was reached first under amount-descending order, which is also the
/// selection leaving the smallest change.
pub fn pick_optimal(utxos: &[Utxo], amount_sats: u64, fee_rate_sats_per_vbyte: u64) -> WalletResult<(Vec<Utxo>, u64)> {
    if amount_sats == 0 {
        return Err(WalletError::invalid_input("send amount must be greater than zero"));
    }
    let mut sorted: Vec<Utxo> = utxos.to_vec();
    sorted.sort_by(|a, b| b.value_sats.cmp(&a.value_sats));

    let mut selected: Vec<Utxo> = Vec::new();
    let mut total = 0u64;
    for utxo in sorted {
        total += utxo.value_sats;
        selected.push(utxo);
        let fee = estimate_fee(selected.len() as u64, 2, fee_rate_sats_per_vbyte);
        if total >= amount_sats.saturating_add(fee) {
            return Ok((selected, fee));
        }
    }
    Err(WalletError::insufficient_funds(format!(
        "need {} sats plus fees, have {} sats across {} UTXOs",
        amount_sats,
        total,
        utxos.len()
    )))
}

/// Select every available UTXO to sweep the full spendable balance to a
/// single destination output (no change).
pub fn pick_maximum(utxos: &[Utxo], fee_rate_sats_per_vbyte: u64) -> WalletResult<(Vec<Utxo>, u64)> {
    if utxos.is_empty() {
        return Err(WalletError::insufficient_funds("no spendable UTXOs"));
    }
    let fee = estimate_fee(utxos.len() as u64, 1, fee_rate_sats_per_vbyte);
    let total: u64 = utxos.iter().map(|u| u.value_sats).sum();
    if total <= fee {
        return Err(WalletError::insufficient_funds(format!(
            "total input value {} sats does not cover the {} sat miner fee",
            total, fee
        )));
    }
    Ok((utxos.to_vec(), fee))
}

/// Assemble the final output list in canonical order: destination, then
/// service fee (if the fee schedule applies one), then change. A change
/// amount below [`DUST_THRESHOLD_SATS`] is folded into the miner fee
/// rather than creating an unspendable output.
pub fn finalize_outputs(
    selected: &[Utxo],
    send: &SendInfo,
    send_amount_sats: u64,
    miner_fee_sats: u64,
    service_fee: Option<(u64, String)>,
    change_address: &str,
) -> WalletResult<UnsignedTx> {
    let total_in: u64 = selected.iter().map(|u| u.value_sats).sum();
    let service_fee_sats = service_fee.as_ref().map(|(amt, _)| *amt).unwrap_or(0);
    let spent = send_amount_sats
        .saturating_add(miner_fee_sats)
        .saturating_add(service_fee_sats);
    if total_in < spent {
        return Err(WalletError::insufficient_funds(format!(
            "selected inputs total {} sats, need {} sats",
            total_in, spent
        )));
    }
    let change_sats = total_in - spent;

    let mut outputs: Vec<TxOutput> = selected
        .iter()
        .map(|u| TxOutput {
            address: u.address.clone(),
            amount_sats: u.value_sats,
            input: true,
        })
        .collect();

    outputs.push(TxOutput {
        address: send.destination_address.clone(),
        amount_sats: send_amount_sats,
        input: false,
    });

    if let Some((amount, address)) = service_fee {
        if amount > 0 {
            outputs.push(TxOutput {
                address,
                amount_sats: amount,
                input: false,
            });
        }
    }

    let actual_fee = if change_sats >= DUST_THRESHOLD_SATS {
        outputs.push(TxOutput {
            address: change_address.to_string(),
            amount_sats: change_sats,
            input: false,
        });
        miner_fee_sats
    } else {
        // Dust change is absorbed into the miner fee rather than creating
        // an output too small to ever be worth spending.
        miner_fee_sats + change_sats
    };

    Ok(UnsignedTx {
        selected_utxos: selected.to_vec(),
        outputs,
        fee_sats: actual_fee,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utxo(value_sats: u64, idx: u32) -> Utxo {
        Utxo {
            txid: format!("{:064x}", idx),
            vout: 0,
            value_sats,
            address: format!("addr{}", idx),
            address_index: idx,
            confirmations: 6,
        }
    }

    fn sample_send(amount: Option<u64>) -> SendInfo {
        SendInfo {
            destination_address: "bc1qdestination".to_string(),
            amount_sats: amount,
            fee_rate_sats_per_vbyte: 10,
            payment_request: None,
        }
    }

    #[test]
    fn test_pick_optimal_prefers_fewest_largest_inputs() {
        let utxos = vec![utxo(100_000, 1), utxo(50_000, 2), utxo(10_000, 3)];
        let (selected, fee) = pick_optimal(&utxos, 80_000, 10).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].value_sats, 100_000);
        assert!(fee > 0);
    }

    #[test]
    fn test_pick_optimal_combines_when_needed() {
        let utxos = vec![utxo(50_000, 1), utxo(40_000, 2), utxo(5_000, 3)];
        let (selected, _) = pick_optimal(&utxos, 85_000, 10).unwrap();
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_pick_optimal_insufficient_funds() {
        let utxos = vec![utxo(1_000, 1)];
        assert!(pick_optimal(&utxos, 10_000, 10).is_err());
    }

    #[test]
    fn test_pick_maximum_sweeps_everything() {
        let utxos = vec![utxo(50_000, 1), utxo(20_000, 2)];
        let (selected, fee) = pick_maximum(&utxos, 10).unwrap();
        assert_eq!(selected.len(), 2);
        assert!(fee > 0);
    }

    #[test]
    fn test_finalize_outputs_folds_dust_change_into_fee() {
        let utxos = vec![utxo(100_200, 1)];
        let send = sample_send(Some(100_000));
        let unsigned = finalize_outputs(&utxos, &send, 100_000, 100, None, "bc1qchange").unwrap();
        // Change would be 100 sats, under the 294 sat dust threshold.
        assert!(unsigned.outputs.iter().all(|o| o.address != "bc1qchange"));
        assert_eq!(unsigned.fee_sats, 200);
    }

    #[test]
    fn test_finalize_outputs_keeps_change_above_dust() {
        let utxos = vec![utxo(200_000, 1)];
        let send = sample_send(Some(100_000));
        let unsigned = finalize_outputs(&utxos, &send, 100_000, 500, None, "bc1qchange").unwrap();
        let change = unsigned.outputs.iter().find(|o| o.address == "bc1qchange").unwrap();
        assert_eq!(change.amount_sats, 99_500);
        assert_eq!(unsigned.fee_sats, 500);
    }

    #[test]
    fn test_finalize_outputs_orders_destination_then_service_fee_then_change() {
        let utxos = vec![utxo(200_000, 1)];
        let send = sample_send(Some(100_000));
        let unsigned = finalize_outputs(
            &utxos,
            &send,
            100_000,
            500,
            Some((1_000, "bc1qservicefee".to_string())),
            "bc1qchange",
        )
        .unwrap();
        let non_input: Vec<&str> = unsigned
            .outputs
            .iter()
            .filter(|o| !o.input)
            .map(|o| o.address.as_str())
            .collect();
        assert_eq!(non_input, vec!["bc1qdestination", "bc1qservicefee", "bc1qchange"]);
    }
}
