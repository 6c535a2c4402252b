//! Security Module
//!
//! - Zeroizing secure-memory primitives ([`secure_memory`])
//! - Key rotation ledger for the ambient key-versioning policy
//!   ([`key_rotation`])

pub mod key_rotation;
pub mod secure_memory;

pub use key_rotation::*;
pub use secure_memory::*;
