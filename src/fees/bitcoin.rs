//! Bitcoin Fee Tier Fetching
//!
//! Fetches the general-info server's `BitcoinFeeInfo` document: seven fee
//! tiers (`confirmFees[1..=6]`, index 0 unused) mapping a target
//! confirmation time to a satoshi/vbyte rate.

use crate::error::WalletResult;
use crate::types::BitcoinFeeInfo;
use crate::utils::http;

/// Compiled-in fallback used when the general-info server cannot be
/// reached and no cached snapshot is available yet. Conservative (higher
/// than typical market rates) so a forced send during an outage still
/// confirms reasonably promptly.
pub fn fallback_fee_info() -> BitcoinFeeInfo {
    BitcoinFeeInfo {
        confirm_fees: [0, 100, 80, 60, 40, 25, 15],
        low_fee_block: 6,
        standard_fee_block_low: 4,
        standard_fee_block_high: 2,
        high_fee_block: 1,
        target_fee_percentage: 0.5,
    }
}

pub fn fetch(general_info_url: &str) -> WalletResult<BitcoinFeeInfo> {
    let url = format!("{}/feeInfo/bitcoin", general_info_url.trim_end_matches('/'));
    let response = http::get(&url)?;
    let info: BitcoinFeeInfo = response.json()?;
    if info.confirm_fees.iter().skip(1).any(|&f| f == 0) {
        return Err(crate::error::WalletError::server_error(
            "general-info server returned zero fee tier",
        ));
    }
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_has_descending_rates() {
        let info = fallback_fee_info();
        for window in info.confirm_fees[1..].windows(2) {
            assert!(window[0] >= window[1]);
        }
    }
}
