//! Vault registry primitives.
//!
//! Counter mutations for `issued` / `to_be_issued` / `to_be_redeemed` /
//! `to_be_replaced`, the oracle-backed conversion helpers and deposit
//! address bookkeeping. Entry points live in the parent module; these
//! helpers enforce the capacity and underflow rules.

use odra::casper_types::bytesrepr::Bytes;
use odra::casper_types::{runtime_args, U256};
use odra::prelude::*;
use odra::CallDef;

use super::events::{
    DecreaseToBeIssuedTokens, DecreaseToBeRedeemedTokens, DecreaseToBeReplacedTokens,
    IncreaseToBeIssuedTokens, IncreaseToBeRedeemedTokens, IncreaseToBeReplacedTokens, IssueTokens,
    RedeemTokens, RegisterDepositAddress, ReplaceTokens,
};
use super::BtcBridge;
use crate::errors::BridgeError;
use crate::key_derivation::derive_deposit_address;
use crate::types::{BridgeConfig, Vault, BPS_SCALE};

impl BtcBridge {
    // ===== Vault Storage =====

    pub(crate) fn load_vault(&self, vault: Address) -> Vault {
        match self.vaults.get(&vault) {
            Some(v) => v,
            None => self.env().revert(BridgeError::VaultNotFound),
        }
    }

    pub(crate) fn store_vault(&mut self, address: Address, vault: Vault) {
        self.vaults.set(&address, vault);
    }

    pub(crate) fn config_internal(&self) -> BridgeConfig {
        self.config.get().unwrap_or_default()
    }

    // ===== Oracle Conversions =====

    pub(crate) fn oracle_address(&self) -> Address {
        match self.oracle.get() {
            Some(address) => address,
            None => self.env().revert(BridgeError::InvalidConfig),
        }
    }

    /// Satoshi value in motes at the current (fresh) exchange rate.
    pub(crate) fn wrapped_to_collateral(&self, amount: U256) -> U256 {
        let args = runtime_args! { "amount" => amount };
        let call_def = CallDef::new("wrapped_to_collateral", false, args);
        self.env().call_contract(self.oracle_address(), call_def)
    }

    /// Mote value in satoshi at the current (fresh) exchange rate.
    pub(crate) fn collateral_to_wrapped(&self, amount: U256) -> U256 {
        let args = runtime_args! { "amount" => amount };
        let call_def = CallDef::new("collateral_to_wrapped", false, args);
        self.env().call_contract(self.oracle_address(), call_def)
    }

    /// Collateral that must back `amount` satoshi at the secure threshold.
    pub(crate) fn secured_collateral_for(&self, amount: U256) -> U256 {
        let config = self.config_internal();
        self.wrapped_to_collateral(amount) * U256::from(config.secure_threshold_bps)
            / U256::from(BPS_SCALE)
    }

    /// Collateral committed to backing, standing offers and griefing
    /// deposits, in motes.
    pub(crate) fn used_collateral(&self, address: Address, vault: &Vault) -> U256 {
        let backed = vault.issued + vault.to_be_issued + vault.to_be_redeemed;
        self.secured_collateral_for(backed) + vault.replace_collateral + self.griefing_of(address)
    }

    /// Locked collateral not committed to anything.
    pub(crate) fn free_collateral_of(&self, address: Address, vault: &Vault) -> U256 {
        let locked = self.collateral_of(address);
        let used = self.used_collateral(address, vault);
        if locked > used {
            locked - used
        } else {
            U256::zero()
        }
    }

    // ===== Issue Counters =====

    /// Reserve issue capacity; fails when the vault is liquidated or the
    /// reservation would exceed its collateral.
    pub(crate) fn try_increase_to_be_issued(&mut self, address: Address, amount: U256) {
        let mut vault = self.load_vault(address);
        self.require_not_liquidated(&vault);

        vault.to_be_issued += amount;
        if self.used_collateral(address, &vault) > self.collateral_of(address) {
            self.env().revert(BridgeError::ExceedingVaultLimit);
        }
        self.store_vault(address, vault);

        self.env()
            .emit_event(IncreaseToBeIssuedTokens { vault: address, amount });
    }

    pub(crate) fn decrease_to_be_issued(&mut self, address: Address, amount: U256) {
        let mut vault = self.load_vault(address);
        if vault.to_be_issued < amount {
            self.env().revert(BridgeError::InsufficientTokensCommitted);
        }
        vault.to_be_issued -= amount;
        self.store_vault(address, vault);

        self.env()
            .emit_event(DecreaseToBeIssuedTokens { vault: address, amount });
    }

    /// Move a completed reservation into outstanding debt.
    pub(crate) fn issue_tokens(&mut self, address: Address, amount: U256) {
        let mut vault = self.load_vault(address);
        vault.issued += amount;
        self.store_vault(address, vault);

        self.env().emit_event(IssueTokens { vault: address, amount });
    }

    // ===== Redeem Counters =====

    /// Reserve redeemable debt; fails when the vault is liquidated or the
    /// uncommitted issued balance is too small.
    pub(crate) fn try_increase_to_be_redeemed(&mut self, address: Address, amount: U256) {
        let mut vault = self.load_vault(address);
        self.require_not_liquidated(&vault);

        if vault.issued < vault.to_be_redeemed + amount {
            self.env().revert(BridgeError::InsufficientTokensCommitted);
        }
        vault.to_be_redeemed += amount;
        self.store_vault(address, vault);

        self.env()
            .emit_event(IncreaseToBeRedeemedTokens { vault: address, amount });
    }

    pub(crate) fn decrease_to_be_redeemed(&mut self, address: Address, amount: U256) {
        let mut vault = self.load_vault(address);
        if vault.to_be_redeemed < amount {
            self.env().revert(BridgeError::InsufficientTokensCommitted);
        }
        vault.to_be_redeemed -= amount;
        self.store_vault(address, vault);

        self.env()
            .emit_event(DecreaseToBeRedeemedTokens { vault: address, amount });
    }

    /// Burn a completed redemption out of the vault's counters.
    pub(crate) fn redeem_tokens(&mut self, address: Address, amount: U256) {
        let mut vault = self.load_vault(address);
        if vault.to_be_redeemed < amount || vault.issued < amount {
            self.env().revert(BridgeError::InsufficientTokensCommitted);
        }
        vault.to_be_redeemed -= amount;
        vault.issued -= amount;
        self.store_vault(address, vault);

        self.env().emit_event(RedeemTokens { vault: address, amount });
    }

    // ===== Replace Counters =====

    /// Grow the standing replace offer; capped by the uncommitted issued
    /// balance.
    pub(crate) fn try_increase_to_be_replaced(
        &mut self,
        address: Address,
        amount: U256,
        griefing_collateral: U256,
    ) {
        let mut vault = self.load_vault(address);
        self.require_not_liquidated(&vault);

        let replaceable = self.requestable_replace_of(&vault);
        if amount > replaceable {
            self.env().revert(BridgeError::InvalidReplaceAmount);
        }
        vault.to_be_replaced += amount;
        vault.replace_collateral += griefing_collateral;
        self.store_vault(address, vault);

        self.env()
            .emit_event(IncreaseToBeReplacedTokens { vault: address, amount });
    }

    /// Shrink the standing offer by up to `amount`. Returns the tokens
    /// actually removed and the proportional griefing collateral freed.
    pub(crate) fn decrease_to_be_replaced(&mut self, address: Address, amount: U256) -> (U256, U256) {
        let mut vault = self.load_vault(address);

        let consumed = core::cmp::min(amount, vault.to_be_replaced);
        if consumed.is_zero() {
            self.env().revert(BridgeError::InvalidReplaceAmount);
        }
        let freed_griefing = vault.replace_collateral * consumed / vault.to_be_replaced;

        vault.to_be_replaced -= consumed;
        vault.replace_collateral -= freed_griefing;
        self.store_vault(address, vault);

        self.env().emit_event(DecreaseToBeReplacedTokens {
            vault: address,
            amount: consumed,
        });

        (consumed, freed_griefing)
    }

    /// Move completed replace debt and collateral bookkeeping old -> new.
    pub(crate) fn replace_tokens(
        &mut self,
        old_address: Address,
        new_address: Address,
        amount: U256,
        collateral: U256,
    ) {
        let mut old_vault = self.load_vault(old_address);
        if old_vault.issued < amount {
            self.env().revert(BridgeError::InsufficientTokensCommitted);
        }
        old_vault.issued -= amount;
        self.store_vault(old_address, old_vault);

        let mut new_vault = self.load_vault(new_address);
        new_vault.issued += amount;
        self.store_vault(new_address, new_vault);

        self.env().emit_event(ReplaceTokens {
            old_vault: old_address,
            new_vault: new_address,
            amount,
            collateral,
        });
    }

    /// Offer capacity left: issued minus redeem and replace commitments.
    pub(crate) fn requestable_replace_of(&self, vault: &Vault) -> U256 {
        let committed = vault.to_be_redeemed + vault.to_be_replaced;
        if vault.issued > committed {
            vault.issued - committed
        } else {
            U256::zero()
        }
    }

    // ===== Deposit Addresses =====

    /// Derive and record the one-time deposit address for a request.
    /// One address per request id; repeated registration returns the
    /// recorded address.
    pub(crate) fn register_deposit_address(&mut self, address: Address, request_id: u64) -> Bytes {
        if let Some(existing) = self.deposit_addresses.get(&(address, request_id)) {
            return existing;
        }

        let vault = self.load_vault(address);
        let btc_address =
            derive_deposit_address(vault.btc_public_key_x, vault.btc_public_key_y, request_id);
        self.deposit_addresses
            .set(&(address, request_id), btc_address.clone());

        self.env().emit_event(RegisterDepositAddress {
            vault: address,
            request_id,
            btc_address: btc_address.clone(),
        });

        btc_address
    }

    // ===== Guards =====

    pub(crate) fn require_not_liquidated(&self, vault: &Vault) {
        if vault.liquidated {
            self.env().revert(BridgeError::VaultLiquidated);
        }
    }

    pub(crate) fn next_request_id(&mut self) -> u64 {
        let id = self.request_nonce.get().unwrap_or(0) + 1;
        self.request_nonce.set(id);
        id
    }
}
