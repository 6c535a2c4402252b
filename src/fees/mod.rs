//! Fee Information
//!
//! Cached access to the general-info server's Bitcoin fee tiers and
//! service-fee schedule.

pub mod airbitz;
pub mod bitcoin;
pub mod cache;
pub mod estimator;

pub use estimator::{airbitz_fee_info, bitcoin_fee_info, fee_snapshot};
