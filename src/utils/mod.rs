//! Utilities Module
//!
//! Common utilities used across the crate.

mod cache;
mod http;
mod json;
mod rate_limiter;
pub mod audit;
pub mod logging;
pub mod sanitize;

pub use cache::*;
pub use http::*;
pub use json::*;
pub use rate_limiter::*;
