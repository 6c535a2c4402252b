//! CarePackage Codec
//!
//! CarePackage is the one account record the credential server hands back
//! before a login succeeds, so it must decode leniently: fields are read
//! by name, never by array position, and an absent ERQ (no recovery set
//! configured yet) is not an error.

use crate::error::WalletResult;
use crate::types::CarePackage;

pub struct CarePackageCodec;

impl CarePackageCodec {
    pub fn encode(package: &CarePackage) -> WalletResult<String> {
        Ok(serde_json::to_string(package)?)
    }

    pub fn decode(json: &str) -> WalletResult<CarePackage> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::keyset::fresh_snrp;

    #[test]
    fn test_roundtrip_without_erq() {
        let package = CarePackage {
            erq: None,
            snrp2: fresh_snrp(),
            snrp3: fresh_snrp(),
            snrp4: fresh_snrp(),
        };
        let json = CarePackageCodec::encode(&package).unwrap();
        let back = CarePackageCodec::decode(&json).unwrap();
        assert!(back.erq.is_none());
        assert_eq!(back.snrp2.n, package.snrp2.n);
    }

    #[test]
    fn test_decode_ignores_field_order() {
        let json = r#"{
            "snrp3": {"salt_hex": "aa", "n": 16384, "r": 8, "p": 1},
            "erq": "deadbeef",
            "snrp4": {"salt_hex": "bb", "n": 16384, "r": 8, "p": 1},
            "snrp2": {"salt_hex": "cc", "n": 16384, "r": 8, "p": 1}
        }"#;
        let package = CarePackageCodec::decode(json).unwrap();
        assert_eq!(package.erq.as_deref(), Some("deadbeef"));
        assert_eq!(package.snrp2.salt_hex, "cc");
        assert_eq!(package.snrp3.salt_hex, "aa");
        assert_eq!(package.snrp4.salt_hex, "bb");
    }
}
