//! Account credential and Bitcoin spend core.
//!
//! A client-side library for a Bitcoin wallet's account subsystem: the
//! scrypt-based credential key hierarchy ([`credential`], [`account`]) and
//! the coin-selection/signing/broadcasting spend pipeline ([`tx`],
//! [`send`]). Everything here runs inside a single process against local
//! disk and a handful of HTTP collaborators ([`api`], [`bip70`],
//! [`watcher`]); it has no UI and no direct knowledge of how its host
//! schedules work across threads beyond the locking contract in [`send`].
//!
//! # Security
//!
//! Key material is held in zeroizing buffers ([`security::secure_memory`])
//! and cleared on drop. Envelope encryption ([`crypto::envelope`]) pairs
//! AES-256-CBC with an HMAC-SHA256 tag so a tampered ciphertext fails to
//! decrypt rather than silently producing garbage plaintext.

pub mod account;
pub mod api;
pub mod bip70;
pub mod credential;
pub mod crypto;
pub mod error;
pub mod fees;
pub mod security;
pub mod send;
pub mod tx;
pub mod types;
pub mod utils;
pub mod watcher;

pub use error::{ErrorCode, WalletError, WalletResult};
