//! Common types used across the bridge protocol.

use odra::casper_types::bytesrepr::Bytes;
use odra::casper_types::{U256, U512};
use odra::prelude::*;

/// Identifier shared by issue, redeem and replace requests.
///
/// A single monotonically increasing nonce, so an id tags exactly one
/// request system-wide and can be embedded in the BTC payment's data output.
pub type RequestId = u64;

/// Lifecycle of a request. Every request leaves `Pending` at most once.
#[odra::odra_type]
#[derive(Default, Copy)]
pub enum RequestStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

/// Registered custodian state.
///
/// `issued + to_be_issued + to_be_redeemed` converted at the secure
/// collateral threshold must never exceed `collateral`.
#[odra::odra_type]
#[derive(Default)]
pub struct Vault {
    /// X coordinate of the vault's BTC master public key
    pub btc_public_key_x: U256,
    /// Y coordinate of the vault's BTC master public key
    pub btc_public_key_y: U256,
    /// Total collateral deposited (motes)
    pub collateral: U256,
    /// Outstanding minted debt (satoshi)
    pub issued: U256,
    /// Reserved for pending issue requests (satoshi)
    pub to_be_issued: U256,
    /// Reserved for pending redeem requests (satoshi)
    pub to_be_redeemed: U256,
    /// Standing replace offer (satoshi)
    pub to_be_replaced: U256,
    /// Griefing collateral backing the standing replace offer (motes)
    pub replace_collateral: U256,
    /// Set once by liquidation; no new reservations afterwards
    pub liquidated: bool,
}

/// Pending mint against a verified incoming BTC payment.
#[odra::odra_type]
pub struct IssueRequest {
    pub requester: Address,
    pub vault: Address,
    /// Requested wrapped amount (satoshi)
    pub amount: U256,
    /// Fee at the requested amount; recomputed pro rata on execution
    pub fee: U256,
    /// Requester's griefing collateral (motes)
    pub griefing_collateral: U256,
    /// One-time deposit address hash (HASH160)
    pub btc_address: Bytes,
    /// Block time at creation (ms)
    pub opened_at: u64,
    /// Cancellation period (ms)
    pub period: u64,
    pub status: RequestStatus,
}

/// Pending burn against a verified outgoing BTC payment.
#[odra::odra_type]
pub struct RedeemRequest {
    pub requester: Address,
    pub vault: Address,
    /// BTC the vault must pay out (satoshi); the requester burned
    /// `amount_btc + fee` up front
    pub amount_btc: U256,
    /// Redemption fee retained for the vault (satoshi)
    pub fee: U256,
    /// Requester's BTC payout address hash
    pub btc_address: Bytes,
    pub opened_at: u64,
    pub period: u64,
    pub status: RequestStatus,
}

/// Accepted custodian handoff awaiting the old vault's BTC payment.
#[odra::odra_type]
pub struct ReplaceRequest {
    pub old_vault: Address,
    pub new_vault: Address,
    /// BTC custody to move (satoshi)
    pub btc_amount: U256,
    /// New vault's griefing collateral (motes)
    pub griefing_collateral: U256,
    /// Portion of the old vault's offer griefing consumed by this accept (motes)
    pub old_griefing_collateral: U256,
    /// Deposit address derived from the new vault's key and the request id
    pub btc_address: Bytes,
    pub opened_at: u64,
    pub status: RequestStatus,
}

/// Adjustable protocol parameters.
#[odra::odra_type]
pub struct BridgeConfig {
    /// Secure collateral threshold in bps (15000 = 150%)
    pub secure_threshold_bps: u32,
    /// Issue fee in bps of the paid amount
    pub issue_fee_bps: u32,
    /// Redemption fee in bps of the burned amount
    pub redeem_fee_bps: u32,
    /// Griefing collateral in bps of the secured collateral value
    pub griefing_bps: u32,
    /// Issue cancellation period (ms)
    pub issue_period: u64,
    /// Redeem cancellation period (ms)
    pub redeem_period: u64,
    /// Minimum collateral to register a vault (motes)
    pub min_vault_collateral: U256,
}

/// Two days in milliseconds, the default cancellation window.
pub const REQUEST_PERIOD_MS: u64 = 2 * 24 * 60 * 60 * 1000;

/// Basis points scale
pub const BPS_SCALE: u32 = 10_000;

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            secure_threshold_bps: 15_000,
            issue_fee_bps: 50,
            redeem_fee_bps: 50,
            griefing_bps: 50,
            issue_period: REQUEST_PERIOD_MS,
            redeem_period: REQUEST_PERIOD_MS,
            min_vault_collateral: U256::from(1_000_000_000u64), // 1 CSPR
        }
    }
}

// ===== Helper Functions =====

/// Convert U256 to U512 at the native-transfer boundary.
pub fn u256_to_u512(value: U256) -> U512 {
    let mut bytes = [0u8; 32];
    value.to_little_endian(&mut bytes);
    U512::from_little_endian(&bytes)
}

/// Convert an attached U512 value to U256. Attached deposits fit 256 bits
/// by orders of magnitude; the high limbs are truncated.
pub fn u512_to_u256(value: U512) -> U256 {
    let mut bytes = [0u8; 64];
    value.to_little_endian(&mut bytes);
    U256::from_little_endian(&bytes[..32])
}
