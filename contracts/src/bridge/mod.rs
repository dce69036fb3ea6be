//! BTC Bridge Contract
//!
//! The central ledger of the protocol: vault registry, collateral
//! accounting, the Issue/Redeem/Replace request state machines and
//! liquidation. Wrapped tokens are minted and burned on the separate
//! [`crate::wrapped_token::WrappedBtc`] contract; BTC payments are
//! checked by the relay and transaction validator collaborators.

pub mod events;

mod collateral;
mod registry;

use odra::casper_types::bytesrepr::Bytes;
use odra::casper_types::{runtime_args, U256};
use odra::prelude::*;
use odra::CallDef;
use odra::ContractRef;

use crate::errors::BridgeError;
use crate::relay::{BtcRelayContractRef, TransactionValidatorContractRef};
use crate::types::{
    u512_to_u256, BridgeConfig, IssueRequest, RedeemRequest, ReplaceRequest, RequestStatus, Vault,
    BPS_SCALE,
};
use events::*;

/// Liquidation trigger: a vault is under-collateralized when the value
/// of its issued tokens at the secure threshold exceeds its collateral
/// (ratio above 100%).
const LIQUIDATION_TRIGGER_BPS: u32 = 10_000;

/// Expected length of a BTC payout address hash (HASH160)
const BTC_ADDRESS_LEN: usize = 20;

/// BTC Bridge Contract
#[odra::module(events = [
    LockCollateral, ReleaseCollateral, SlashCollateral,
    RegisterVault, VaultPublicKeyUpdate, RegisterDepositAddress,
    IncreaseToBeIssuedTokens, DecreaseToBeIssuedTokens, IssueTokens,
    IncreaseToBeRedeemedTokens, DecreaseToBeRedeemedTokens, RedeemTokens,
    IncreaseToBeReplacedTokens, DecreaseToBeReplacedTokens, ReplaceTokens,
    IssueRequested, IssueCompleted, IssueCancelled,
    RedeemRequested, RedeemCompleted, RedeemCancelled,
    RequestReplace, WithdrawReplace, AcceptReplace, ExecuteReplace,
    LiquidateVault,
])]
pub struct BtcBridge {
    /// Admin account
    admin: Var<Address>,
    /// Exchange rate oracle contract
    oracle: Var<Address>,
    /// Wrapped token contract
    token: Var<Address>,
    /// BTC header relay contract
    relay: Var<Address>,
    /// BTC payment validator contract
    tx_validator: Var<Address>,
    /// Protocol parameters
    config: Var<BridgeConfig>,
    /// Collateral ledger (motes per account)
    locked: Mapping<Address, U256>,
    /// Griefing portion of an account's ledger entry, not withdrawable
    griefing_locked: Mapping<Address, U256>,
    /// Sum of all ledger entries
    total_collateral: Var<U256>,
    /// Registered vaults
    vaults: Mapping<Address, Vault>,
    /// Registration order, for enumeration
    vault_list: Mapping<u64, Address>,
    /// Number of registered vaults
    vault_count: Var<u64>,
    /// One-time deposit addresses per (vault, request id)
    deposit_addresses: Mapping<(Address, u64), Bytes>,
    /// Shared request id nonce
    request_nonce: Var<u64>,
    /// Issue requests by id
    issue_requests: Mapping<u64, IssueRequest>,
    /// Redeem requests by id
    redeem_requests: Mapping<u64, RedeemRequest>,
    /// Replace requests by id
    replace_requests: Mapping<u64, ReplaceRequest>,
    /// Debt absorbed from liquidated vaults; the matching collateral
    /// sits under the bridge's own ledger entry
    pool_issued: Var<U256>,
}

#[odra::module]
impl BtcBridge {
    /// Initialize the bridge and wire its collaborators. The deployer
    /// becomes admin.
    pub fn init(
        &mut self,
        oracle: Address,
        token: Address,
        relay: Address,
        tx_validator: Address,
    ) {
        self.admin.set(self.env().caller());
        self.oracle.set(oracle);
        self.token.set(token);
        self.relay.set(relay);
        self.tx_validator.set(tx_validator);
        self.config.set(BridgeConfig::default());
        self.total_collateral.set(U256::zero());
        self.vault_count.set(0);
        self.request_nonce.set(0);
        self.pool_issued.set(U256::zero());
    }

    // ========== Admin Functions ==========

    /// Replace the protocol parameters (admin only).
    pub fn update_config(&mut self, config: BridgeConfig) {
        self.require_admin();
        if config.secure_threshold_bps < BPS_SCALE
            || config.issue_fee_bps >= BPS_SCALE
            || config.redeem_fee_bps >= BPS_SCALE
            || config.griefing_bps >= BPS_SCALE
            || config.issue_period == 0
            || config.redeem_period == 0
        {
            self.env().revert(BridgeError::InvalidConfig);
        }
        self.config.set(config);
    }

    /// Current protocol parameters.
    pub fn get_config(&self) -> BridgeConfig {
        self.config_internal()
    }

    /// Swap the relay collaborator (admin only).
    pub fn set_relay(&mut self, relay: Address) {
        self.require_admin();
        self.relay.set(relay);
    }

    /// Swap the payment validator collaborator (admin only).
    pub fn set_transaction_validator(&mut self, tx_validator: Address) {
        self.require_admin();
        self.tx_validator.set(tx_validator);
    }

    // ========== Collateral ==========

    /// Lock the attached deposit under the caller's ledger entry.
    #[odra(payable)]
    pub fn lock_collateral(&mut self) {
        let caller = self.env().caller();
        let amount = u512_to_u256(self.env().attached_value());
        self.lock_collateral_internal(caller, amount);
    }

    /// Withdraw uncommitted collateral back to the caller.
    pub fn withdraw_collateral(&mut self, amount: U256) {
        let caller = self.env().caller();

        let available = match self.vaults.get(&caller) {
            Some(vault) => self.free_collateral_of(caller, &vault),
            None => {
                let locked = self.collateral_of(caller);
                let griefing = self.griefing_of(caller);
                if locked > griefing {
                    locked - griefing
                } else {
                    U256::zero()
                }
            }
        };
        if amount > available {
            self.env().revert(BridgeError::InsufficientCollateral);
        }

        self.release_collateral_internal(caller, amount);
    }

    /// Locked balance of an account.
    pub fn get_collateral(&self, account: Address) -> U256 {
        self.collateral_of(account)
    }

    /// Sum of all ledger entries.
    pub fn get_total_collateral(&self) -> U256 {
        self.total_collateral.get().unwrap_or(U256::zero())
    }

    /// Collateral a vault could still withdraw or back new issues with.
    pub fn get_free_collateral(&self, vault: Address) -> U256 {
        let state = self.load_vault(vault);
        self.free_collateral_of(vault, &state)
    }

    // ========== Vault Registry ==========

    /// Register the caller as a vault with the attached collateral and
    /// its BTC master public key.
    #[odra(payable)]
    pub fn register_vault(&mut self, public_key_x: U256, public_key_y: U256) {
        let caller = self.env().caller();
        if self.vaults.get(&caller).is_some() {
            self.env().revert(BridgeError::VaultAlreadyExists);
        }

        let amount = u512_to_u256(self.env().attached_value());
        let config = self.config_internal();
        if amount < config.min_vault_collateral {
            self.env().revert(BridgeError::InsufficientCollateral);
        }

        self.store_vault(
            caller,
            Vault {
                btc_public_key_x: public_key_x,
                btc_public_key_y: public_key_y,
                ..Default::default()
            },
        );
        let count = self.vault_count.get().unwrap_or(0);
        self.vault_list.set(&count, caller);
        self.vault_count.set(count + 1);

        self.lock_collateral_internal(caller, amount);

        self.env().emit_event(RegisterVault {
            vault: caller,
            collateral: amount,
        });
    }

    /// Update the caller vault's BTC master public key. Affects deposit
    /// addresses of future requests only.
    pub fn update_public_key(&mut self, public_key_x: U256, public_key_y: U256) {
        let caller = self.env().caller();
        let mut vault = self.load_vault(caller);
        vault.btc_public_key_x = public_key_x;
        vault.btc_public_key_y = public_key_y;
        self.store_vault(caller, vault);

        self.env().emit_event(VaultPublicKeyUpdate {
            vault: caller,
            public_key_x,
            public_key_y,
        });
    }

    /// Vault state with its current ledger balance.
    pub fn get_vault(&self, vault: Address) -> Vault {
        let mut state = self.load_vault(vault);
        state.collateral = self.collateral_of(vault);
        state
    }

    /// Number of registered vaults.
    pub fn get_vault_count(&self) -> u64 {
        self.vault_count.get().unwrap_or(0)
    }

    /// Vault address by registration order.
    pub fn get_vault_at(&self, index: u64) -> Address {
        match self.vault_list.get(&index) {
            Some(address) => address,
            None => self.env().revert(BridgeError::VaultNotFound),
        }
    }

    /// Satoshi a vault can still accept issue requests for.
    pub fn issuable_tokens(&self, vault: Address) -> U256 {
        let state = self.load_vault(vault);
        if state.liquidated {
            return U256::zero();
        }
        let free = self.free_collateral_of(vault, &state);
        let config = self.config_internal();
        self.collateral_to_wrapped(free * U256::from(BPS_SCALE) / U256::from(config.secure_threshold_bps))
    }

    /// Satoshi a vault can still offer for replacement.
    pub fn requestable_to_be_replaced_tokens(&self, vault: Address) -> U256 {
        let state = self.load_vault(vault);
        self.requestable_replace_of(&state)
    }

    /// Debt-to-collateral ratio in bps at the secure threshold. Above
    /// 10000 the vault is under-collateralized.
    pub fn get_liquidation_ratio(&self, vault: Address) -> U256 {
        let state = self.load_vault(vault);
        if state.issued.is_zero() {
            return U256::zero();
        }
        let collateral = self.collateral_of(vault);
        if collateral.is_zero() {
            return U256::MAX;
        }
        let config = self.config_internal();
        self.wrapped_to_collateral(state.issued) * U256::from(config.secure_threshold_bps)
            / collateral
    }

    /// Deposit address recorded for a request.
    pub fn get_deposit_address(&self, vault: Address, request_id: u64) -> Bytes {
        match self.deposit_addresses.get(&(vault, request_id)) {
            Some(address) => address,
            None => self.env().revert(BridgeError::RequestNotFound),
        }
    }

    // ========== Issue ==========

    /// Open an issue request against a vault. The attached deposit is the
    /// requester's griefing collateral. Returns the request id.
    #[odra(payable)]
    pub fn request_issue(&mut self, amount: U256, vault: Address) -> u64 {
        let requester = self.env().caller();
        if amount.is_zero() {
            self.env().revert(BridgeError::ZeroAmount);
        }

        let griefing = u512_to_u256(self.env().attached_value());
        let config = self.config_internal();
        let required_griefing =
            self.secured_collateral_for(amount) * U256::from(config.griefing_bps) / U256::from(BPS_SCALE);
        if griefing < required_griefing {
            self.env().revert(BridgeError::InsufficientGriefingCollateral);
        }

        self.try_increase_to_be_issued(vault, amount);

        let request_id = self.next_request_id();
        let btc_address = self.register_deposit_address(vault, request_id);

        if !griefing.is_zero() {
            self.lock_collateral_internal(requester, griefing);
            self.note_griefing(requester, griefing);
        }

        let fee = amount * U256::from(config.issue_fee_bps) / U256::from(BPS_SCALE);
        self.issue_requests.set(
            &request_id,
            IssueRequest {
                requester,
                vault,
                amount,
                fee,
                griefing_collateral: griefing,
                btc_address: btc_address.clone(),
                opened_at: self.env().get_block_time(),
                period: config.issue_period,
                status: RequestStatus::Pending,
            },
        );

        self.env().emit_event(IssueRequested {
            request_id,
            requester,
            vault,
            amount,
            fee,
            btc_address,
        });

        request_id
    }

    /// Complete an issue request against the BTC payment made to its
    /// deposit address. Only the requester may execute. Underpayment is
    /// settled pro rata; overpayment is capped at the requested amount.
    pub fn execute_issue(
        &mut self,
        requester: Address,
        request_id: u64,
        merkle_proof: Bytes,
        raw_tx: Bytes,
        height_and_index: u64,
        header: Bytes,
        output_index: u32,
    ) {
        let mut request = self.load_issue_request(request_id);
        self.require_pending(request.status);
        if self.env().caller() != request.requester || requester != request.requester {
            self.env().revert(BridgeError::InvalidExecutor);
        }
        let vault_state = self.load_vault(request.vault);
        self.require_not_liquidated(&vault_state);

        self.verify_inclusion(merkle_proof, raw_tx.clone(), height_and_index, header);
        let paid = self.validate_payment(
            raw_tx,
            output_index,
            U256::zero(),
            request.btc_address.clone(),
            request_id,
        );
        let paid = core::cmp::min(paid, request.amount);
        if paid.is_zero() {
            self.env().revert(BridgeError::InsufficientValue);
        }

        let config = self.config_internal();
        let fee = paid * U256::from(config.issue_fee_bps) / U256::from(BPS_SCALE);

        self.decrease_to_be_issued(request.vault, request.amount);
        self.issue_tokens(request.vault, paid);

        self.token_mint(request.requester, paid - fee);
        if !fee.is_zero() {
            self.token_mint(request.vault, fee);
        }

        // Shortfall slashes griefing pro rata; the remainder goes back.
        if !request.griefing_collateral.is_zero() {
            self.clear_griefing(request.requester, request.griefing_collateral);
            let slashed = request.griefing_collateral * (request.amount - paid) / request.amount;
            if !slashed.is_zero() {
                self.slash_collateral_internal(request.requester, request.vault, slashed);
            }
            let refund = request.griefing_collateral - slashed;
            if !refund.is_zero() {
                self.release_collateral_internal(request.requester, refund);
            }
        }

        request.status = RequestStatus::Completed;
        self.issue_requests.set(&request_id, request.clone());

        self.env().emit_event(IssueCompleted {
            request_id,
            requester: request.requester,
            vault: request.vault,
            amount: paid,
            fee,
        });
    }

    /// Cancel an expired issue request, releasing the reservation and the
    /// griefing collateral in full.
    pub fn cancel_issue(&mut self, requester: Address, request_id: u64) {
        let mut request = self.load_issue_request(request_id);
        self.require_pending(request.status);
        if self.env().caller() != request.requester || requester != request.requester {
            self.env().revert(BridgeError::InvalidExecutor);
        }
        self.require_expired(request.opened_at, request.period);

        self.decrease_to_be_issued(request.vault, request.amount);

        if !request.griefing_collateral.is_zero() {
            self.clear_griefing(request.requester, request.griefing_collateral);
            self.release_collateral_internal(request.requester, request.griefing_collateral);
        }

        request.status = RequestStatus::Cancelled;
        self.issue_requests.set(&request_id, request.clone());

        self.env().emit_event(IssueCancelled {
            request_id,
            requester: request.requester,
            vault: request.vault,
        });
    }

    /// Issue request by id.
    pub fn get_issue_request(&self, request_id: u64) -> IssueRequest {
        self.load_issue_request(request_id)
    }

    // ========== Redeem ==========

    /// Open a redeem request: burns `amount` wrapped tokens from the
    /// caller immediately and obliges the vault to pay `amount - fee`
    /// satoshi to `btc_address`. Returns the request id.
    pub fn request_redeem(&mut self, amount: U256, btc_address: Bytes, vault: Address) -> u64 {
        let requester = self.env().caller();
        if amount.is_zero() {
            self.env().revert(BridgeError::ZeroAmount);
        }
        if btc_address.len() != BTC_ADDRESS_LEN {
            self.env().revert(BridgeError::InvalidRecipient);
        }

        let config = self.config_internal();
        let fee = amount * U256::from(config.redeem_fee_bps) / U256::from(BPS_SCALE);
        let amount_btc = amount - fee;

        self.try_increase_to_be_redeemed(vault, amount_btc);
        self.token_burn_from(requester, amount);

        let request_id = self.next_request_id();
        self.redeem_requests.set(
            &request_id,
            RedeemRequest {
                requester,
                vault,
                amount_btc,
                fee,
                btc_address: btc_address.clone(),
                opened_at: self.env().get_block_time(),
                period: config.redeem_period,
                status: RequestStatus::Pending,
            },
        );

        self.env().emit_event(RedeemRequested {
            request_id,
            requester,
            vault,
            amount_btc,
            fee,
            btc_address,
        });

        request_id
    }

    /// Complete a redeem request against the vault's BTC payment of at
    /// least `amount_btc` to the requester's address. Only the requester
    /// may execute. The retained fee is minted to the vault.
    pub fn execute_redeem(
        &mut self,
        requester: Address,
        request_id: u64,
        merkle_proof: Bytes,
        raw_tx: Bytes,
        height_and_index: u64,
        header: Bytes,
        output_index: u32,
    ) {
        let mut request = self.load_redeem_request(request_id);
        self.require_pending(request.status);
        if self.env().caller() != request.requester || requester != request.requester {
            self.env().revert(BridgeError::InvalidExecutor);
        }

        self.verify_inclusion(merkle_proof, raw_tx.clone(), height_and_index, header);
        self.validate_payment(
            raw_tx,
            output_index,
            request.amount_btc,
            request.btc_address.clone(),
            request_id,
        );

        self.redeem_tokens(request.vault, request.amount_btc);
        if !request.fee.is_zero() {
            self.token_mint(request.vault, request.fee);
        }

        request.status = RequestStatus::Completed;
        self.redeem_requests.set(&request_id, request.clone());

        self.env().emit_event(RedeemCompleted {
            request_id,
            requester: request.requester,
            vault: request.vault,
            amount_btc: request.amount_btc,
        });
    }

    /// Cancel an expired redeem request. With `reimburse` the full burned
    /// amount is re-minted to the requester and the vault is punished:
    /// the amount's collateral value is seized into the liquidation pool
    /// together with the matching debt. Without it only the reservation
    /// is released.
    pub fn cancel_redeem(&mut self, requester: Address, request_id: u64, reimburse: bool) {
        let mut request = self.load_redeem_request(request_id);
        self.require_pending(request.status);
        if self.env().caller() != request.requester || requester != request.requester {
            self.env().revert(BridgeError::InvalidExecutor);
        }
        self.require_expired(request.opened_at, request.period);

        self.decrease_to_be_redeemed(request.vault, request.amount_btc);

        if reimburse {
            let amount = request.amount_btc + request.fee;
            let pool = self.env().self_address();

            // Move the matching debt into the pool, capped at what the
            // vault still has outstanding.
            let mut vault = self.load_vault(request.vault);
            let moved_issued = core::cmp::min(amount, vault.issued);
            vault.issued -= moved_issued;
            self.store_vault(request.vault, vault);
            self.pool_issued
                .set(self.pool_issued.get().unwrap_or(U256::zero()) + moved_issued);

            let seized = core::cmp::min(
                self.wrapped_to_collateral(amount),
                self.collateral_of(request.vault),
            );
            if !seized.is_zero() {
                self.transfer_collateral_internal(request.vault, pool, seized);
            }

            self.token_mint(request.requester, amount);
        }

        request.status = RequestStatus::Cancelled;
        self.redeem_requests.set(&request_id, request.clone());

        self.env().emit_event(RedeemCancelled {
            request_id,
            requester: request.requester,
            vault: request.vault,
            reimbursed: reimburse,
        });
    }

    /// Redeem request by id.
    pub fn get_redeem_request(&self, request_id: u64) -> RedeemRequest {
        self.load_redeem_request(request_id)
    }

    // ========== Replace ==========

    /// Grow the caller vault's standing replace offer by `btc_amount`.
    /// The attached deposit is the offer's griefing collateral.
    #[odra(payable)]
    pub fn request_replace(&mut self, btc_amount: U256) {
        let old_vault = self.env().caller();
        if btc_amount.is_zero() {
            self.env().revert(BridgeError::ZeroAmount);
        }

        let griefing = u512_to_u256(self.env().attached_value());
        let config = self.config_internal();
        let required_griefing = self.secured_collateral_for(btc_amount)
            * U256::from(config.griefing_bps)
            / U256::from(BPS_SCALE);
        if griefing < required_griefing {
            self.env().revert(BridgeError::InsufficientGriefingCollateral);
        }

        if !griefing.is_zero() {
            self.lock_collateral_internal(old_vault, griefing);
        }
        self.try_increase_to_be_replaced(old_vault, btc_amount, griefing);

        self.env().emit_event(RequestReplace {
            old_vault,
            btc_amount,
            griefing_collateral: griefing,
        });
    }

    /// Withdraw up to `btc_amount` of the caller vault's unaccepted offer,
    /// refunding the proportional griefing collateral.
    pub fn withdraw_replace(&mut self, btc_amount: U256) {
        let old_vault = self.env().caller();
        let (withdrawn, freed_griefing) = self.decrease_to_be_replaced(old_vault, btc_amount);
        if !freed_griefing.is_zero() {
            self.release_collateral_internal(old_vault, freed_griefing);
        }

        self.env().emit_event(WithdrawReplace {
            old_vault,
            btc_amount: withdrawn,
            griefing_collateral: freed_griefing,
        });
    }

    /// Accept up to `btc_amount` of a vault's standing offer. The caller
    /// becomes the new vault; the attached deposit is its griefing
    /// collateral. Returns the request id.
    #[odra(payable)]
    pub fn accept_replace(&mut self, old_vault: Address, btc_amount: U256) -> u64 {
        let new_vault = self.env().caller();
        if new_vault == old_vault {
            self.env().revert(BridgeError::InvalidReplaceAmount);
        }
        if btc_amount.is_zero() {
            self.env().revert(BridgeError::ZeroAmount);
        }
        let new_state = self.load_vault(new_vault);
        self.require_not_liquidated(&new_state);

        let griefing = u512_to_u256(self.env().attached_value());
        let config = self.config_internal();
        let required_griefing = self.secured_collateral_for(btc_amount)
            * U256::from(config.griefing_bps)
            / U256::from(BPS_SCALE);
        if griefing < required_griefing {
            self.env().revert(BridgeError::InsufficientGriefingCollateral);
        }

        // Consume the offer portion; its griefing stays locked under the
        // old vault until execution.
        let (accepted, old_griefing) = self.decrease_to_be_replaced(old_vault, btc_amount);
        self.note_griefing(old_vault, old_griefing);

        self.try_increase_to_be_redeemed(old_vault, accepted);
        self.try_increase_to_be_issued(new_vault, accepted);

        let request_id = self.next_request_id();
        let btc_address = self.register_deposit_address(new_vault, request_id);

        if !griefing.is_zero() {
            self.lock_collateral_internal(new_vault, griefing);
            self.note_griefing(new_vault, griefing);
        }

        self.replace_requests.set(
            &request_id,
            ReplaceRequest {
                old_vault,
                new_vault,
                btc_amount: accepted,
                griefing_collateral: griefing,
                old_griefing_collateral: old_griefing,
                btc_address: btc_address.clone(),
                opened_at: self.env().get_block_time(),
                status: RequestStatus::Pending,
            },
        );

        self.env().emit_event(AcceptReplace {
            request_id,
            old_vault,
            new_vault,
            btc_amount: accepted,
            griefing_collateral: griefing,
            btc_address,
        });

        request_id
    }

    /// Complete a replace once the old vault has paid `btc_amount` to the
    /// new vault's deposit address: moves the debt and its backing
    /// collateral to the new vault and releases both griefing deposits.
    pub fn execute_replace(
        &mut self,
        request_id: u64,
        merkle_proof: Bytes,
        raw_tx: Bytes,
        height_and_index: u64,
        header: Bytes,
        output_index: u32,
    ) {
        let mut request = self.load_replace_request(request_id);
        self.require_pending(request.status);

        self.verify_inclusion(merkle_proof, raw_tx.clone(), height_and_index, header);
        self.validate_payment(
            raw_tx,
            output_index,
            request.btc_amount,
            request.btc_address.clone(),
            request_id,
        );

        self.decrease_to_be_redeemed(request.old_vault, request.btc_amount);
        self.decrease_to_be_issued(request.new_vault, request.btc_amount);

        // Move the backing collateral with the debt, never touching the
        // old vault's griefing deposit.
        let old_available = {
            let locked = self.collateral_of(request.old_vault);
            let reserved = self.griefing_of(request.old_vault);
            if locked > reserved {
                locked - reserved
            } else {
                U256::zero()
            }
        };
        let moved_collateral = core::cmp::min(
            self.secured_collateral_for(request.btc_amount),
            old_available,
        );
        self.replace_tokens(
            request.old_vault,
            request.new_vault,
            request.btc_amount,
            moved_collateral,
        );
        if !moved_collateral.is_zero() {
            self.transfer_collateral_internal(
                request.old_vault,
                request.new_vault,
                moved_collateral,
            );
        }

        if !request.old_griefing_collateral.is_zero() {
            self.clear_griefing(request.old_vault, request.old_griefing_collateral);
            self.release_collateral_internal(request.old_vault, request.old_griefing_collateral);
        }
        if !request.griefing_collateral.is_zero() {
            self.clear_griefing(request.new_vault, request.griefing_collateral);
            self.release_collateral_internal(request.new_vault, request.griefing_collateral);
        }

        request.status = RequestStatus::Completed;
        self.replace_requests.set(&request_id, request.clone());

        self.env().emit_event(ExecuteReplace {
            request_id,
            old_vault: request.old_vault,
            new_vault: request.new_vault,
        });
    }

    /// Replace request by id.
    pub fn get_replace_request(&self, request_id: u64) -> ReplaceRequest {
        self.load_replace_request(request_id)
    }

    // ========== Liquidation ==========

    /// Liquidate an under-collateralized vault: its debt moves into the
    /// system pool, the backing collateral (at the secure threshold,
    /// capped at the vault's balance) is seized into the pool, and the
    /// vault is barred from new reservations.
    pub fn liquidate_vault_under_collateralized(&mut self, vault: Address) {
        let ratio = self.get_liquidation_ratio(vault);
        if ratio <= U256::from(LIQUIDATION_TRIGGER_BPS) {
            self.env().revert(BridgeError::NotUnderCollateralized);
        }

        let mut state = self.load_vault(vault);
        self.require_not_liquidated(&state);

        let issued = state.issued;
        let seized = core::cmp::min(self.secured_collateral_for(issued), self.collateral_of(vault));

        state.issued = U256::zero();
        state.liquidated = true;
        self.store_vault(vault, state);

        self.pool_issued
            .set(self.pool_issued.get().unwrap_or(U256::zero()) + issued);
        if !seized.is_zero() {
            let pool = self.env().self_address();
            self.transfer_collateral_internal(vault, pool, seized);
        }

        self.env().emit_event(LiquidateVault {
            vault,
            issued,
            seized_collateral: seized,
        });
    }

    /// Debt absorbed from liquidated vaults.
    pub fn get_pool_issued(&self) -> U256 {
        self.pool_issued.get().unwrap_or(U256::zero())
    }

    /// Collateral seized into the liquidation pool.
    pub fn get_pool_collateral(&self) -> U256 {
        self.collateral_of(self.env().self_address())
    }

    // ========== Internal Functions ==========

    fn require_admin(&self) {
        let caller = self.env().caller();
        if self.admin.get() != Some(caller) {
            self.env().revert(BridgeError::Unauthorized);
        }
    }

    fn require_pending(&self, status: RequestStatus) {
        if status != RequestStatus::Pending {
            self.env().revert(BridgeError::RequestAlreadyCompleted);
        }
    }

    fn require_expired(&self, opened_at: u64, period: u64) {
        if self.env().get_block_time() < opened_at + period {
            self.env().revert(BridgeError::TimeNotExpired);
        }
    }

    fn load_issue_request(&self, request_id: u64) -> IssueRequest {
        match self.issue_requests.get(&request_id) {
            Some(request) => request,
            None => self.env().revert(BridgeError::RequestNotFound),
        }
    }

    fn load_redeem_request(&self, request_id: u64) -> RedeemRequest {
        match self.redeem_requests.get(&request_id) {
            Some(request) => request,
            None => self.env().revert(BridgeError::RequestNotFound),
        }
    }

    fn load_replace_request(&self, request_id: u64) -> ReplaceRequest {
        match self.replace_requests.get(&request_id) {
            Some(request) => request,
            None => self.env().revert(BridgeError::RequestNotFound),
        }
    }

    fn verify_inclusion(
        &self,
        merkle_proof: Bytes,
        raw_tx: Bytes,
        height_and_index: u64,
        header: Bytes,
    ) {
        let relay_address = match self.relay.get() {
            Some(address) => address,
            None => self.env().revert(BridgeError::InvalidConfig),
        };
        let relay = BtcRelayContractRef::new(self.env().clone(), relay_address);
        if !relay.verify_tx(merkle_proof, raw_tx, height_and_index, header) {
            self.env().revert(BridgeError::InvalidTxProof);
        }
    }

    fn validate_payment(
        &self,
        raw_tx: Bytes,
        output_index: u32,
        required_amount: U256,
        recipient_btc_address: Bytes,
        request_id: u64,
    ) -> U256 {
        let validator_address = match self.tx_validator.get() {
            Some(address) => address,
            None => self.env().revert(BridgeError::InvalidConfig),
        };
        let validator = TransactionValidatorContractRef::new(self.env().clone(), validator_address);
        validator.validate_transaction(
            raw_tx,
            output_index,
            required_amount,
            recipient_btc_address,
            request_id,
        )
    }

    fn token_address(&self) -> Address {
        match self.token.get() {
            Some(address) => address,
            None => self.env().revert(BridgeError::InvalidConfig),
        }
    }

    fn token_mint(&self, to: Address, amount: U256) {
        let args = runtime_args! { "to" => to, "amount" => amount };
        let call_def = CallDef::new("mint", true, args);
        self.env().call_contract::<()>(self.token_address(), call_def);
    }

    fn token_burn_from(&self, from: Address, amount: U256) {
        let args = runtime_args! { "from" => from, "amount" => amount };
        let call_def = CallDef::new("burn_from", true, args);
        self.env().call_contract::<()>(self.token_address(), call_def);
    }
}
