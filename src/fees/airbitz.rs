//! Service Fee Schedule Fetching
//!
//! Fetches the general-info server's published service-fee schedule:
//! a percentage-of-amount fee, bounded by a fixed minimum and maximum,
//! only applied above a minimum transaction size, payable to a
//! service-controlled address.

use crate::error::WalletResult;
use crate::types::AirbitzFeeInfo;
use crate::utils::http;

/// Compiled-in fallback: 0% fee, so an offline client never silently
/// attaches an unexpected service-fee output.
pub fn fallback_fee_info() -> AirbitzFeeInfo {
    AirbitzFeeInfo {
        fee_percentage: 0.0,
        fee_fixed_sats: 0,
        fee_max_sats: 0,
        min_tx_sats_for_fee: u64::MAX,
        fee_address: String::new(),
    }
}

pub fn fetch(general_info_url: &str) -> WalletResult<AirbitzFeeInfo> {
    let url = format!("{}/feeInfo/service", general_info_url.trim_end_matches('/'));
    let response = http::get(&url)?;
    Ok(response.json()?)
}

/// Compute the service fee owed on a send of `amount_sats`, or `None` if
/// the schedule doesn't apply (amount too small, or fee disabled).
pub fn compute_service_fee(info: &AirbitzFeeInfo, amount_sats: u64) -> Option<u64> {
    if info.fee_percentage <= 0.0 || amount_sats < info.min_tx_sats_for_fee || info.fee_address.is_empty() {
        return None;
    }
    let raw = (amount_sats as f64 * info.fee_percentage / 100.0) as u64;
    let bounded = raw.max(info.fee_fixed_sats).min(info.fee_max_sats);
    if bounded == 0 {
        None
    } else {
        Some(bounded)
    }
}
