//! External Collaborator Contracts
//!
//! The two HTTP services this crate hands credential material and fee
//! questions to. Both are traits so tests and embedders can swap in a
//! stub; [`credential_server::HttpCredentialServer`] and
//! [`general_info_server::HttpGeneralInfoServer`] are the default,
//! pooled-HTTP-backed implementations a real client wires up.

pub mod credential_server {
    use crate::error::WalletResult;
    use crate::types::CarePackage;
    use crate::utils::http;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize)]
    pub struct CreateAccountRequest<'a> {
        #[serde(rename = "l1Hex")]
        pub l1_hex: &'a str,
        #[serde(rename = "p1Hex")]
        pub p1_hex: &'a str,
        #[serde(rename = "lra1Hex")]
        pub lra1_hex: &'a str,
        #[serde(rename = "carePackage")]
        pub care_package: &'a CarePackage,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct LoginResponse {
        #[serde(rename = "carePackage")]
        pub care_package: CarePackage,
    }

    /// What the client-side core needs from a credential server: register
    /// a new account's auth keys, fetch the CarePackage needed before a
    /// login attempt can complete, and notify it when the recovery auth
    /// key (LRA1) rotates. All calls are best-effort from the caller's
    /// point of view — a network failure here does not roll back local
    /// account state; it is surfaced to the caller to retry or queue.
    pub trait CredentialServer: Send + Sync {
        fn create_account(&self, username: &str, req: &CreateAccountRequest<'_>) -> WalletResult<()>;
        fn fetch_care_package(&self, username: &str) -> WalletResult<CarePackage>;
        fn update_recovery_key(&self, username: &str, lra1_hex: &str, care_package: &CarePackage) -> WalletResult<()>;
    }

    pub struct HttpCredentialServer {
        base_url: String,
    }

    impl HttpCredentialServer {
        pub fn new(base_url: impl Into<String>) -> Self {
            Self {
                base_url: base_url.into(),
            }
        }

        fn url(&self, path: &str) -> String {
            format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
        }
    }

    impl CredentialServer for HttpCredentialServer {
        fn create_account(&self, username: &str, req: &CreateAccountRequest<'_>) -> WalletResult<()> {
            let url = self.url(&format!("account/create/{}", username));
            let response = http::post_json(&url, req)?;
            if !response.status().is_success() {
                return Err(crate::error::WalletError::server_error(format!(
                    "account create rejected: HTTP {}",
                    response.status()
                )));
            }
            Ok(())
        }

        fn fetch_care_package(&self, username: &str) -> WalletResult<CarePackage> {
            let url = self.url(&format!("account/carepackage/{}", username));
            let response = http::get(&url)?;
            Ok(response.json()?)
        }

        fn update_recovery_key(&self, username: &str, lra1_hex: &str, care_package: &CarePackage) -> WalletResult<()> {
            #[derive(Serialize)]
            struct Body<'a> {
                #[serde(rename = "lra1Hex")]
                lra1_hex: &'a str,
                #[serde(rename = "carePackage")]
                care_package: &'a CarePackage,
            }
            let url = self.url(&format!("account/recovery/{}", username));
            let response = http::post_json(
                &url,
                &Body {
                    lra1_hex,
                    care_package,
                },
            )?;
            if !response.status().is_success() {
                return Err(crate::error::WalletError::server_error(format!(
                    "recovery update rejected: HTTP {}",
                    response.status()
                )));
            }
            Ok(())
        }
    }
}

pub mod general_info_server {
    use crate::error::WalletResult;
    use crate::types::{AirbitzFeeInfo, BitcoinFeeInfo};

    /// Thin naming wrapper over [`crate::fees::estimator`] so the
    /// "external collaborator" this crate depends on for fee schedules has
    /// the same trait-shaped seam as the credential server, even though
    /// the concrete implementation (a coalescing cache) lives in `fees`.
    pub trait GeneralInfoServer: Send + Sync {
        fn bitcoin_fee_info(&self) -> WalletResult<BitcoinFeeInfo>;
        fn airbitz_fee_info(&self) -> WalletResult<AirbitzFeeInfo>;
    }

    pub struct HttpGeneralInfoServer {
        base_url: String,
    }

    impl HttpGeneralInfoServer {
        pub fn new(base_url: impl Into<String>) -> Self {
            Self {
                base_url: base_url.into(),
            }
        }
    }

    impl GeneralInfoServer for HttpGeneralInfoServer {
        fn bitcoin_fee_info(&self) -> WalletResult<BitcoinFeeInfo> {
            Ok(crate::fees::bitcoin_fee_info(&self.base_url))
        }

        fn airbitz_fee_info(&self) -> WalletResult<AirbitzFeeInfo> {
            Ok(crate::fees::airbitz_fee_info(&self.base_url))
        }
    }
}

pub use credential_server::CredentialServer;
pub use general_info_server::GeneralInfoServer;
