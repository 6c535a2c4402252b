//! Account Management
//!
//! Ties the credential key hierarchy to on-disk persistence and the
//! process-wide cache. [`store::AccountStore`] is the entry point; the
//! cache in [`cache`] is shared globally so repeated `get_key` calls across
//! the process avoid re-running scrypt.

pub mod cache;
pub mod repo;
pub mod store;

pub use repo::Repo;
pub use store::AccountStore;
