//! Fee Estimator Bridge
//!
//! Glues the staleness cache to the two general-info-server fetchers and
//! exposes the single entry point the spend pipeline calls.

use crate::fees::cache::{FeeCache, FeeSnapshot};
use crate::types::{AirbitzFeeInfo, BitcoinFeeInfo};
use std::sync::OnceLock;

static CACHE: OnceLock<FeeCache> = OnceLock::new();

fn global_cache() -> &'static FeeCache {
    CACHE.get_or_init(FeeCache::new)
}

/// Fetch both fee documents in one round trip's worth of coalescing. Falls
/// back to the compiled-in constants if the general-info server is
/// unreachable and nothing usable is cached.
pub fn fee_snapshot(general_info_url: &str) -> FeeSnapshot {
    global_cache().get_or_refresh(|| {
        let bitcoin = super::bitcoin::fetch(general_info_url).ok()?;
        let airbitz = super::airbitz::fetch(general_info_url).ok()?;
        Some((bitcoin, airbitz))
    })
}

pub fn bitcoin_fee_info(general_info_url: &str) -> BitcoinFeeInfo {
    fee_snapshot(general_info_url).bitcoin
}

pub fn airbitz_fee_info(general_info_url: &str) -> AirbitzFeeInfo {
    fee_snapshot(general_info_url).airbitz
}
