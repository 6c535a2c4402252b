//! BIP-70 Payment Protocol
//!
//! Wire messages for the optional merchant-acknowledgement leg of a send:
//! a merchant hands back a `PaymentRequest` (a signed `PaymentDetails`
//! protobuf), the client submits a `Payment` referencing the broadcast raw
//! transaction, and the merchant replies with a `PaymentAck`. Message
//! shapes follow the BIP-70 `.proto` schema directly; no merchant PKI
//! signature verification is attempted here (`pki_type` of `"none"` is the
//! only mode this crate exercises).

use crate::error::{WalletError, WalletResult};
use crate::utils::http;
use prost::Message;

/// One output a `PaymentDetails` asks the payer to pay.
#[derive(Clone, PartialEq, Message)]
pub struct Output {
    #[prost(uint64, optional, tag = "1")]
    pub amount: Option<u64>,
    #[prost(bytes, tag = "2")]
    pub script: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct PaymentDetails {
    #[prost(string, optional, tag = "1")]
    pub network: Option<String>,
    #[prost(message, repeated, tag = "2")]
    pub outputs: Vec<Output>,
    #[prost(uint64, tag = "3")]
    pub time: u64,
    #[prost(uint64, optional, tag = "4")]
    pub expires: Option<u64>,
    #[prost(string, optional, tag = "5")]
    pub memo: Option<String>,
    #[prost(string, optional, tag = "6")]
    pub payment_url: Option<String>,
    #[prost(bytes, optional, tag = "7")]
    pub merchant_data: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, Message)]
pub struct PaymentRequest {
    #[prost(uint32, optional, tag = "1", default = "1")]
    pub payment_details_version: Option<u32>,
    #[prost(string, optional, tag = "2")]
    pub pki_type: Option<String>,
    #[prost(bytes, optional, tag = "3")]
    pub pki_data: Option<Vec<u8>>,
    #[prost(bytes, tag = "4")]
    pub serialized_payment_details: Vec<u8>,
    #[prost(bytes, optional, tag = "5")]
    pub signature: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Payment {
    #[prost(bytes, optional, tag = "1")]
    pub merchant_data: Option<Vec<u8>>,
    #[prost(bytes, repeated, tag = "2")]
    pub transactions: Vec<Vec<u8>>,
    #[prost(message, repeated, tag = "3")]
    pub refund_to: Vec<Output>,
    #[prost(string, optional, tag = "4")]
    pub memo: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct PaymentAck {
    #[prost(message, required, tag = "1")]
    pub payment: Payment,
    #[prost(string, optional, tag = "2")]
    pub memo: Option<String>,
}

/// Friendlier, already-decoded view of a `PaymentRequest` that the rest of
/// the crate works with — `types::SendInfo` carries this, not the raw
/// protobuf.
#[derive(Debug, Clone)]
pub struct PaymentRequestDetails {
    pub network: String,
    pub outputs: Vec<(String, u64)>,
    pub memo: Option<String>,
    pub payment_url: Option<String>,
    pub merchant_data: Option<Vec<u8>>,
    pub expires: Option<u64>,
}

const CONTENT_TYPE_PAYMENT_REQUEST: &str = "application/bitcoin-paymentrequest";
const CONTENT_TYPE_PAYMENT: &str = "application/bitcoin-payment";
const ACCEPT_PAYMENT_ACK: &str = "application/bitcoin-paymentack";

/// Fetch and decode a BIP-70 payment request from a merchant-supplied URL.
pub fn fetch(url: &str, network: bitcoin::Network) -> WalletResult<PaymentRequestDetails> {
    let response = http::get(url)?;
    let bytes = response.bytes()?;
    decode_payment_request(&bytes, network)
}

pub fn decode_payment_request(
    bytes: &[u8],
    network: bitcoin::Network,
) -> WalletResult<PaymentRequestDetails> {
    let request = PaymentRequest::decode(bytes)?;
    let details = PaymentDetails::decode(request.serialized_payment_details.as_slice())?;

    let outputs = details
        .outputs
        .iter()
        .map(|o| {
            let script = bitcoin::ScriptBuf::from_bytes(o.script.clone());
            let address = bitcoin::Address::from_script(&script, network)
                .map_err(|e| WalletError::invalid_input(format!("unrecognized output script: {}", e)))?;
            Ok((address.to_string(), o.amount.unwrap_or(0)))
        })
        .collect::<WalletResult<Vec<_>>>()?;

    if outputs.is_empty() {
        return Err(WalletError::invalid_input("payment request has no outputs"));
    }

    Ok(PaymentRequestDetails {
        network: details.network.unwrap_or_else(|| "main".to_string()),
        outputs,
        memo: details.memo,
        payment_url: details.payment_url,
        merchant_data: details.merchant_data,
        expires: details.expires,
    })
}

/// Build the `Payment` message sent back to a merchant's `payment_url`
/// once the transaction has been signed (not yet broadcast — BIP-70 has
/// the merchant relay it).
pub fn build_payment(details: &PaymentRequestDetails, raw_tx: &[u8], refund_script: Option<Vec<u8>>, refund_amount: u64) -> Payment {
    Payment {
        merchant_data: details.merchant_data.clone(),
        transactions: vec![raw_tx.to_vec()],
        refund_to: refund_script
            .map(|script| {
                vec![Output {
                    amount: Some(refund_amount),
                    script,
                }]
            })
            .unwrap_or_default(),
        memo: None,
    }
}

/// POST a `Payment` to the merchant's payment URL and decode the returned
/// `PaymentAck`.
pub fn submit_payment(payment_url: &str, payment: &Payment) -> WalletResult<PaymentAck> {
    let mut buf = Vec::new();
    payment.encode(&mut buf)?;
    let response = http::get_client_pool().post_bytes(payment_url, CONTENT_TYPE_PAYMENT, buf)?;
    if !response.status().is_success() {
        return Err(WalletError::server_error(format!(
            "merchant rejected payment: HTTP {}",
            response.status()
        )));
    }
    let _ = ACCEPT_PAYMENT_ACK;
    let bytes = response.bytes()?;
    Ok(PaymentAck::decode(bytes.as_ref())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_details() -> PaymentDetails {
        let address = "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq"
            .parse::<bitcoin::Address<bitcoin::address::NetworkUnchecked>>()
            .unwrap()
            .assume_checked();
        PaymentDetails {
            network: Some("main".to_string()),
            outputs: vec![Output {
                amount: Some(50_000),
                script: address.script_pubkey().into_bytes(),
            }],
            time: 1_700_000_000,
            expires: Some(1_700_003_600),
            memo: Some("order #42".to_string()),
            payment_url: Some("https://merchant.example/pay".to_string()),
            merchant_data: Some(b"order-42".to_vec()),
        }
    }

    #[test]
    fn test_decode_roundtrip() {
        let details = sample_details();
        let mut serialized = Vec::new();
        details.encode(&mut serialized).unwrap();

        let request = PaymentRequest {
            payment_details_version: Some(1),
            pki_type: Some("none".to_string()),
            pki_data: None,
            serialized_payment_details: serialized,
            signature: None,
        };
        let mut request_bytes = Vec::new();
        request.encode(&mut request_bytes).unwrap();

        let decoded = decode_payment_request(&request_bytes, bitcoin::Network::Bitcoin).unwrap();
        assert_eq!(decoded.outputs.len(), 1);
        assert_eq!(decoded.outputs[0].1, 50_000);
        assert_eq!(decoded.memo.as_deref(), Some("order #42"));
        assert_eq!(decoded.merchant_data.as_deref(), Some(b"order-42".as_slice()));
    }

    #[test]
    fn test_decode_rejects_empty_outputs() {
        let details = PaymentDetails {
            network: Some("main".to_string()),
            outputs: vec![],
            time: 0,
            expires: None,
            memo: None,
            payment_url: None,
            merchant_data: None,
        };
        let mut serialized = Vec::new();
        details.encode(&mut serialized).unwrap();
        let request = PaymentRequest {
            payment_details_version: Some(1),
            pki_type: None,
            pki_data: None,
            serialized_payment_details: serialized,
            signature: None,
        };
        let mut request_bytes = Vec::new();
        request.encode(&mut request_bytes).unwrap();
        assert!(decode_payment_request(&request_bytes, bitcoin::Network::Bitcoin).is_err());
    }

    #[test]
    fn test_build_payment_carries_merchant_data() {
        let details = PaymentRequestDetails {
            network: "main".to_string(),
            outputs: vec![("bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq".to_string(), 50_000)],
            memo: None,
            payment_url: Some("https://merchant.example/pay".to_string()),
            merchant_data: Some(b"order-42".to_vec()),
            expires: None,
        };
        let payment = build_payment(&details, b"\x01\x02", None, 0);
        assert_eq!(payment.merchant_data.as_deref(), Some(b"order-42".as_slice()));
        assert_eq!(payment.transactions, vec![b"\x01\x02".to_vec()]);
    }
}
