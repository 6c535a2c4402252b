//! Credential Key Hierarchy
//!
//! Pure functions that turn a username plus a password, recovery answers,
//! or PIN into the scrypt-derived keys of the account key hierarchy.
//! Nothing here touches the filesystem or the network; that belongs to
//! [`crate::account`].

pub mod carepackage;
pub mod keyset;

pub use carepackage::CarePackageCodec;
pub use keyset::{
    derive_data_key, derive_l1, derive_l2, derive_lra1, derive_p1, normalize_credential, normalize_secret,
    normalize_username,
};
