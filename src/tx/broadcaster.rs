//! Broadcasting & Merchant Acknowledgement
//!
//! Hands a signed transaction to the configured [`crate::watcher::UtxoWatcher`],
//! then — if the send carried a BIP-70 payment request — submits the
//! `Payment` message and waits for the merchant's `PaymentAck`. The ack
//! step never blocks the broadcast itself: a merchant that never
//! acknowledges still leaves the transaction confirmed on-chain.

use crate::bip70::{self, PaymentRequestDetails};
use crate::error::WalletResult;
use crate::types::UnsavedTx;
use crate::watcher::UtxoWatcher;

pub fn broadcast(watcher: &dyn UtxoWatcher, unsaved: &UnsavedTx) -> WalletResult<String> {
    watcher.send_tx(&unsaved.raw_hex)
}

/// Submit payment to the merchant named by `details.payment_url`, if any,
/// and return the ack's memo (shown to the user as a receipt note). A
/// payment request with no `payment_url` has nothing to acknowledge — the
/// transaction itself is already broadcast — so that's `Ok(None)`, not an
/// error.
pub fn acknowledge_merchant(
    details: &PaymentRequestDetails,
    raw_tx_hex: &str,
    refund_script: Option<Vec<u8>>,
    refund_amount: u64,
) -> WalletResult<Option<String>> {
    let Some(payment_url) = &details.payment_url else {
        return Ok(None);
    };
    let raw_tx = hex::decode(raw_tx_hex)?;
    let payment = bip70::build_payment(details, &raw_tx, refund_script, refund_amount);
    let ack = bip70::submit_payment(payment_url, &payment)?;
    Ok(ack.memo)
}
