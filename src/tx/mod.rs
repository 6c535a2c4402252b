//! Spend Pipeline: Coin Selection, Signing, Broadcasting
//!
//! Three stages, one module each, mirroring the BUILDING / SIGNING /
//! BROADCASTING states of [`crate::send`]'s state machine.

mod broadcaster;
mod builder;
mod signer;

pub use broadcaster::{acknowledge_merchant, broadcast};
pub use builder::{finalize_outputs, pick_maximum, pick_optimal, DUST_THRESHOLD_SATS};
pub use signer::{sign, AddressKeySource};
