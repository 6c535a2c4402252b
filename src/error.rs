//! Error Types
//!
//! Unified error type for credential and spend operations, with stable
//! error codes for serialization across the API boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine-readable error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    AccountAlreadyExists,
    AccountDoesNotExist,
    BadPassword,
    NoAvailAccountSpace,
    InsufficientFunds,
    JsonError,
    CryptoError,
    IoError,
    ServerError,
    NetworkError,
    InvalidInput,
    RateLimited,
    Internal,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::AccountAlreadyExists => "ACCOUNT_ALREADY_EXISTS",
            ErrorCode::AccountDoesNotExist => "ACCOUNT_DOES_NOT_EXIST",
            ErrorCode::BadPassword => "BAD_PASSWORD",
            ErrorCode::NoAvailAccountSpace => "NO_AVAIL_ACCOUNT_SPACE",
            ErrorCode::InsufficientFunds => "INSUFFICIENT_FUNDS",
            ErrorCode::JsonError => "JSON_ERROR",
            ErrorCode::CryptoError => "CRYPTO_ERROR",
            ErrorCode::IoError => "IO_ERROR",
            ErrorCode::ServerError => "SERVER_ERROR",
            ErrorCode::NetworkError => "NETWORK_ERROR",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::RateLimited => "RATE_LIMITED",
            ErrorCode::Internal => "INTERNAL",
        };
        write!(f, "{}", s)
    }
}

/// Crate-wide error. `details` never carries key material; callers logging
/// this value get the same redaction guarantees as `message`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl WalletError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: Some(details.into()),
        }
    }

    pub fn account_already_exists(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::AccountAlreadyExists, msg)
    }

    pub fn account_does_not_exist(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::AccountDoesNotExist, msg)
    }

    pub fn bad_password(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadPassword, msg)
    }

    pub fn no_avail_account_space(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::NoAvailAccountSpace, msg)
    }

    pub fn insufficient_funds(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InsufficientFunds, msg)
    }

    pub fn json_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::JsonError, msg)
    }

    pub fn crypto_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::CryptoError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::IoError, msg)
    }

    pub fn server_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServerError, msg)
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::NetworkError, msg)
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, msg)
    }

    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RateLimited, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, msg)
    }
}

impl fmt::Display for WalletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.details {
            Some(d) => write!(f, "[{}] {}: {}", self.code, self.message, d),
            None => write!(f, "[{}] {}", self.code, self.message),
        }
    }
}

impl std::error::Error for WalletError {}

impl From<serde_json::Error> for WalletError {
    fn from(e: serde_json::Error) -> Self {
        WalletError::json_error(e.to_string())
    }
}

impl From<hex::FromHexError> for WalletError {
    fn from(e: hex::FromHexError) -> Self {
        WalletError::crypto_error(format!("invalid hex: {}", e))
    }
}

impl From<std::io::Error> for WalletError {
    fn from(e: std::io::Error) -> Self {
        WalletError::io_error(e.to_string())
    }
}

impl From<reqwest::Error> for WalletError {
    fn from(e: reqwest::Error) -> Self {
        WalletError::network(e.to_string())
    }
}

impl From<bitcoin::address::ParseError> for WalletError {
    fn from(e: bitcoin::address::ParseError) -> Self {
        WalletError::invalid_input(format!("invalid address: {}", e))
    }
}

impl From<bitcoin::secp256k1::Error> for WalletError {
    fn from(e: bitcoin::secp256k1::Error) -> Self {
        WalletError::crypto_error(format!("secp256k1 error: {}", e))
    }
}

impl From<prost::DecodeError> for WalletError {
    fn from(e: prost::DecodeError) -> Self {
        WalletError::server_error(format!("payment protocol decode error: {}", e))
    }
}

impl From<prost::EncodeError> for WalletError {
    fn from(e: prost::EncodeError) -> Self {
        WalletError::internal(format!("payment protocol encode error: {}", e))
    }
}

pub type WalletResult<T> = Result<T, WalletError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code() {
        let e = WalletError::bad_password("scrypt mismatch");
        let s = e.to_string();
        assert!(s.contains("BAD_PASSWORD"));
        assert!(s.contains("scrypt mismatch"));
    }

    #[test]
    fn test_json_roundtrip() {
        let e = WalletError::with_details(ErrorCode::ServerError, "upstream failed", "HTTP 500");
        let json = serde_json::to_string(&e).unwrap();
        let back: WalletError = serde_json::from_str(&json).unwrap();
        assert_eq!(back.code, ErrorCode::ServerError);
        assert_eq!(back.details.as_deref(), Some("HTTP 500"));
    }
}
