//! Shared Data Model
//!
//! Types that cross module boundaries: the credential/key-hierarchy
//! entities (scrypt parameters, key sets, CarePackage) and the spend-side
//! entities (UTXOs, send requests, signed transaction records).

use crate::error::{WalletError, WalletResult};
use crate::security::secure_memory::SecureBuffer;
use serde::{Deserialize, Serialize};

/// Scrypt parameters plus salt, serialized as part of a CarePackage or sent
/// by the credential server to authenticate a login attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snrp {
    #[serde(rename = "salt_hex")]
    pub salt_hex: String,
    pub n: u32,
    pub r: u32,
    pub p: u32,
}

impl Snrp {
    pub fn salt_bytes(&self) -> WalletResultBytes {
        hex::decode(&self.salt_hex).map_err(Into::into)
    }
}

type WalletResultBytes = crate::error::WalletResult<Vec<u8>>;

/// Server-class scrypt parameters, shared across all accounts on the
/// credential server. Used to derive the two auth keys (password-based
/// and recovery-answer-based) that never leave the client in the clear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snrp1 {
    pub salt_hex: String,
    pub n: u32,
    pub r: u32,
    pub p: u32,
}

/// The recovery-questions envelope plus the three per-account scrypt
/// parameter sets needed to re-derive keys from a password, recovery
/// answers, or PIN. Stored server-side and cached locally; decoded by
/// full field name, never by array position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarePackage {
    /// Encrypted recovery questions (present once a recovery set exists).
    pub erq: Option<String>,
    /// Params for deriving LP2 from the username and password.
    pub snrp2: Snrp,
    /// Params for deriving LRA2 from the username and recovery answers.
    pub snrp3: Snrp,
    /// Params for deriving L2, the username-only key that decrypts ERQ.
    pub snrp4: Snrp,
}

/// The decrypted, in-memory key hierarchy for a signed-in account.
/// Every field is a `SecureBuffer` so the whole struct zeroizes on drop.
pub struct KeySet {
    /// scrypt(username, SNRP1); sent to the credential server in place of
    /// the username.
    pub l1: SecureBuffer,
    /// scrypt(password, SNRP1); sent to the credential server in place of
    /// the password. Present only on a password-based sign-in.
    pub p1: Option<SecureBuffer>,
    /// scrypt(username + recovery answers, SNRP1); sent to the credential
    /// server during recovery login. Absent until a recovery set exists.
    pub lra1: Option<SecureBuffer>,
    /// scrypt(username + recovery answers, SNRP3); the recovery data key.
    pub lra2: Option<SecureBuffer>,
    /// scrypt(username + password, SNRP2); the wallet data key. Derived
    /// directly from the username and password on a password sign-in, or
    /// recovered by decrypting `sync/ELP2.json` under LRA2 on a recovery
    /// sign-in. Encrypts and decrypts every other account record.
    pub lp2: SecureBuffer,
}

impl KeySet {
    pub fn has_recovery(&self) -> bool {
        self.lra1.is_some() && self.lra2.is_some()
    }
}

/// A single unspent transaction output tracked against one of the
/// account's derived addresses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Utxo {
    pub txid: String,
    pub vout: u32,
    pub value_sats: u64,
    pub address: String,
    /// BIP-32 address index this output pays, for signing key lookup.
    pub address_index: u32,
    pub confirmations: u32,
}

/// Caller-supplied description of a spend, before coin selection runs.
#[derive(Debug, Clone)]
pub struct SendInfo {
    pub destination_address: String,
    /// `None` means "send the maximum spendable amount" (sweep).
    pub amount_sats: Option<u64>,
    pub fee_rate_sats_per_vbyte: u64,
    pub payment_request: Option<crate::bip70::PaymentRequestDetails>,
}

/// One leg of a transaction, either consumed (`input = true`) or created
/// (`input = false`). `UnsavedTx::outputs` interleaves both kinds in
/// original order, matching how the record is replayed for history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxOutput {
    pub address: String,
    pub amount_sats: u64,
    pub input: bool,
}

/// The fully assembled, unsigned plan for a transaction: which UTXOs to
/// spend, what outputs to create (destination, change, or absorbed dust),
/// and the fee actually paid.
#[derive(Debug, Clone)]
pub struct UnsignedTx {
    pub selected_utxos: Vec<Utxo>,
    pub outputs: Vec<TxOutput>,
    pub fee_sats: u64,
}

/// A finished, broadcast-ready (or already broadcast) transaction plus
/// the bookkeeping needed to write a history record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnsavedTx {
    pub txid: String,
    pub raw_hex: String,
    pub fee_sats: u64,
    pub outputs: Vec<TxOutput>,
    pub timestamp: u64,
}

/// Details returned to the caller once a send completes, and the shape
/// written to a wallet's transaction history record. Field names on the
/// wire retain the general-info server's historical naming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxDetails {
    pub txid: String,
    /// Net effect on the wallet's balance: negative for an outgoing send
    /// (amount + miner fee + service fee), positive for an incoming
    /// payment.
    #[serde(rename = "amountSatoshi")]
    pub amount_satoshi: i64,
    #[serde(rename = "amountFeesMinersSatoshi")]
    pub amount_fees_miners_satoshi: u64,
    #[serde(rename = "amountFeesAirbitzSatoshi")]
    pub amount_fees_service_satoshi: u64,
    pub notes: String,
    pub category: String,
    pub payee: String,
    #[serde(rename = "bizId")]
    pub biz_id: u64,
    pub outputs: Vec<TxOutput>,
    pub timestamp: u64,
}

/// Which named tier a caller is asking the fee schedule to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeTier {
    Low,
    Standard,
    High,
}

/// Below this outgoing value, the "Standard" tier resolves to
/// `standard_fee_block_low` (cheaper, slower); at or above it, to
/// `standard_fee_block_high` (pricier, faster). Not published anywhere in
/// the fee schedule itself; picked to match roughly one hundredth of a
/// bitcoin, the smallest amount where paying for faster confirmation
/// starts to matter.
pub const STANDARD_TIER_VALUE_THRESHOLD_SATS: u64 = 1_000_000;

/// Mempool-derived fee tiers, indexed 1..=6 (index 0 unused, kept to match
/// the wire format's `confirmFees` array positions), plus the block-target
/// indices and fee percentage the general-info server uses to map those
/// seven raw rates onto the three named tiers the UI shows a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BitcoinFeeInfo {
    #[serde(rename = "confirmFees")]
    pub confirm_fees: [u64; 7],
    #[serde(rename = "lowFeeBlock")]
    pub low_fee_block: u32,
    #[serde(rename = "standardFeeBlockLow")]
    pub standard_fee_block_low: u32,
    #[serde(rename = "standardFeeBlockHigh")]
    pub standard_fee_block_high: u32,
    #[serde(rename = "highFeeBlock")]
    pub high_fee_block: u32,
    /// Percentage (not fraction) of the outgoing amount to aim for as a
    /// per-kilobyte mining fee when resolving the "Standard" tier: sending
    /// 1 BTC with `target_fee_percentage = 0.2` targets a 0.002 BTC/KB fee,
    /// before the floor/cap in [`BitcoinFeeInfo::rate_for_send`] clamps it
    /// back into the published schedule.
    #[serde(rename = "targetFeePercentage")]
    pub target_fee_percentage: f64,
}

impl BitcoinFeeInfo {
    /// Fee rate, in satoshis/vbyte, targeting confirmation within
    /// `target_blocks` (1..=6; values outside the range clamp).
    pub fn rate_for_target(&self, target_blocks: u32) -> u64 {
        let idx = target_blocks.clamp(1, 6) as usize;
        self.confirm_fees[idx]
    }

    fn confirm_fee_at(&self, block: u32) -> WalletResult<u64> {
        let block = block as usize;
        if block == 0 || block >= self.confirm_fees.len() {
            return Err(WalletError::internal(format!("fee block index {} out of range", block)));
        }
        Ok(self.confirm_fees[block])
    }

    /// Which confirmation-block target the "Standard" tier resolves to for
    /// a send of this size.
    pub fn standard_target_block(&self, outgoing_funds_sats: u64) -> u32 {
        if outgoing_funds_sats < STANDARD_TIER_VALUE_THRESHOLD_SATS {
            self.standard_fee_block_low
        } else {
            self.standard_fee_block_high
        }
    }

    /// Resolve a named tier and the transaction's outgoing value to a
    /// satoshi/vbyte rate. `Low` and `High` read their block target's
    /// `confirmFees` slot directly; `High` is never capped, since a caller
    /// asking for the fast lane should get it even past `confirmFees[2]`.
    /// `Standard` instead targets `target_fee_percentage` percent of the
    /// outgoing value as a per-KB fee, floored at `confirmFees[3]` and
    /// capped at `confirmFees[2]` so a malformed percentage can never push
    /// the result outside the published schedule.
    pub fn rate_for_send(&self, tier: FeeTier, outgoing_funds_sats: u64) -> WalletResult<u64> {
        match tier {
            FeeTier::Low => self.confirm_fee_at(self.low_fee_block),
            FeeTier::High => self.confirm_fee_at(self.high_fee_block),
            FeeTier::Standard => {
                let floor = self.confirm_fee_at(3)?;
                let cap = self.confirm_fee_at(2)?;
                let per_kb = outgoing_funds_sats as f64 * (self.target_fee_percentage / 100.0);
                let per_vbyte = (per_kb / 1000.0).round() as u64;
                Ok(per_vbyte.clamp(floor, cap))
            }
        }
    }
}

/// Service-fee schedule published alongside mempool fee tiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirbitzFeeInfo {
    #[serde(rename = "feePercentage")]
    pub fee_percentage: f64,
    #[serde(rename = "feeFixed")]
    pub fee_fixed_sats: u64,
    #[serde(rename = "feeMaxSatoshi")]
    pub fee_max_sats: u64,
    #[serde(rename = "minTxSatoshiForFee")]
    pub min_tx_sats_for_fee: u64,
    #[serde(rename = "address")]
    pub fee_address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_target_clamps() {
        let fees = BitcoinFeeInfo {
            confirm_fees: [0, 50, 40, 30, 20, 10, 5],
            low_fee_block: 6,
            standard_fee_block_low: 3,
            standard_fee_block_high: 2,
            high_fee_block: 1,
            target_fee_percentage: 0.5,
        };
        assert_eq!(fees.rate_for_target(1), 50);
        assert_eq!(fees.rate_for_target(6), 5);
        assert_eq!(fees.rate_for_target(0), 50);
        assert_eq!(fees.rate_for_target(99), 5);
    }

    #[test]
    fn test_standard_rate_floors_and_caps() {
        let fees = BitcoinFeeInfo {
            confirm_fees: [0, 100, 80, 60, 40, 25, 15],
            low_fee_block: 6,
            standard_fee_block_low: 4,
            standard_fee_block_high: 2,
            high_fee_block: 1,
            target_fee_percentage: 0.5,
        };
        // 0.01 BTC outgoing, well under the threshold: 1_000_000 sats *
        // 0.5% = 5_000 sats/KB = 5 sats/vbyte, below the floor of
        // confirmFees[3] = 60, so it clamps up to 60.
        assert_eq!(fees.rate_for_send(FeeTier::Standard, 1_000_000).unwrap(), 60);

        // A much larger send pushes the percentage-based fee above the cap
        // of confirmFees[2] = 80, so it clamps down to 80.
        assert_eq!(fees.rate_for_send(FeeTier::Standard, 50_000_000).unwrap(), 80);

        // High is never capped even when the percentage math would exceed
        // confirmFees[2]; it reads its own block slot directly.
        assert_eq!(fees.rate_for_send(FeeTier::High, 50_000_000).unwrap(), 100);
        assert_eq!(fees.rate_for_send(FeeTier::Low, 1).unwrap(), 15);
    }

    #[test]
    fn test_standard_target_block_switches_on_value_threshold() {
        let fees = BitcoinFeeInfo {
            confirm_fees: [0, 100, 80, 60, 40, 25, 15],
            low_fee_block: 6,
            standard_fee_block_low: 4,
            standard_fee_block_high: 2,
            high_fee_block: 1,
            target_fee_percentage: 0.5,
        };
        assert_eq!(fees.standard_target_block(1), fees.standard_fee_block_low);
        assert_eq!(
            fees.standard_target_block(STANDARD_TIER_VALUE_THRESHOLD_SATS),
            fees.standard_fee_block_high
        );
    }
}
