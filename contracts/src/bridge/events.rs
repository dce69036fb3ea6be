//! Bridge events.
//!
//! Every collateral movement, vault counter mutation and request
//! transition emits one of these.

use odra::casper_types::bytesrepr::Bytes;
use odra::casper_types::U256;
use odra::prelude::*;

// ===== Collateral Ledger =====

#[odra::event]
pub struct LockCollateral {
    pub account: Address,
    pub amount: U256,
}

#[odra::event]
pub struct ReleaseCollateral {
    pub account: Address,
    pub amount: U256,
}

#[odra::event]
pub struct SlashCollateral {
    pub sender: Address,
    pub receiver: Address,
    pub amount: U256,
}

// ===== Vault Registry =====

#[odra::event]
pub struct RegisterVault {
    pub vault: Address,
    pub collateral: U256,
}

#[odra::event]
pub struct VaultPublicKeyUpdate {
    pub vault: Address,
    pub public_key_x: U256,
    pub public_key_y: U256,
}

#[odra::event]
pub struct RegisterDepositAddress {
    pub vault: Address,
    pub request_id: u64,
    pub btc_address: Bytes,
}

#[odra::event]
pub struct IncreaseToBeIssuedTokens {
    pub vault: Address,
    pub amount: U256,
}

#[odra::event]
pub struct DecreaseToBeIssuedTokens {
    pub vault: Address,
    pub amount: U256,
}

#[odra::event]
pub struct IssueTokens {
    pub vault: Address,
    pub amount: U256,
}

#[odra::event]
pub struct IncreaseToBeRedeemedTokens {
    pub vault: Address,
    pub amount: U256,
}

#[odra::event]
pub struct DecreaseToBeRedeemedTokens {
    pub vault: Address,
    pub amount: U256,
}

#[odra::event]
pub struct RedeemTokens {
    pub vault: Address,
    pub amount: U256,
}

#[odra::event]
pub struct IncreaseToBeReplacedTokens {
    pub vault: Address,
    pub amount: U256,
}

#[odra::event]
pub struct DecreaseToBeReplacedTokens {
    pub vault: Address,
    pub amount: U256,
}

#[odra::event]
pub struct ReplaceTokens {
    pub old_vault: Address,
    pub new_vault: Address,
    pub amount: U256,
    pub collateral: U256,
}

// ===== Issue =====

#[odra::event]
pub struct IssueRequested {
    pub request_id: u64,
    pub requester: Address,
    pub vault: Address,
    pub amount: U256,
    pub fee: U256,
    pub btc_address: Bytes,
}

#[odra::event]
pub struct IssueCompleted {
    pub request_id: u64,
    pub requester: Address,
    pub vault: Address,
    pub amount: U256,
    pub fee: U256,
}

#[odra::event]
pub struct IssueCancelled {
    pub request_id: u64,
    pub requester: Address,
    pub vault: Address,
}

// ===== Redeem =====

#[odra::event]
pub struct RedeemRequested {
    pub request_id: u64,
    pub requester: Address,
    pub vault: Address,
    pub amount_btc: U256,
    pub fee: U256,
    pub btc_address: Bytes,
}

#[odra::event]
pub struct RedeemCompleted {
    pub request_id: u64,
    pub requester: Address,
    pub vault: Address,
    pub amount_btc: U256,
}

#[odra::event]
pub struct RedeemCancelled {
    pub request_id: u64,
    pub requester: Address,
    pub vault: Address,
    pub reimbursed: bool,
}

// ===== Replace =====

#[odra::event]
pub struct RequestReplace {
    pub old_vault: Address,
    pub btc_amount: U256,
    pub griefing_collateral: U256,
}

#[odra::event]
pub struct WithdrawReplace {
    pub old_vault: Address,
    pub btc_amount: U256,
    pub griefing_collateral: U256,
}

#[odra::event]
pub struct AcceptReplace {
    pub request_id: u64,
    pub old_vault: Address,
    pub new_vault: Address,
    pub btc_amount: U256,
    pub griefing_collateral: U256,
    pub btc_address: Bytes,
}

#[odra::event]
pub struct ExecuteReplace {
    pub request_id: u64,
    pub old_vault: Address,
    pub new_vault: Address,
}

// ===== Liquidation =====

#[odra::event]
pub struct LiquidateVault {
    pub vault: Address,
    pub issued: U256,
    pub seized_collateral: U256,
}
