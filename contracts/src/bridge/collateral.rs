//! Collateral ledger primitives.
//!
//! A single ledger tracks every mote held by the bridge: vault backing,
//! requester griefing deposits and the liquidation pool (kept under the
//! bridge's own address). The global sum equals `total_collateral` after
//! every operation. Slashed collateral is paid out and leaves the ledger;
//! pool seizures and replace transfers stay inside it.

use odra::casper_types::U256;
use odra::prelude::*;

use super::events::{LockCollateral, ReleaseCollateral, SlashCollateral};
use super::BtcBridge;
use crate::errors::BridgeError;
use crate::types::u256_to_u512;

impl BtcBridge {
    /// Locked balance of an account, zero when never locked.
    pub(crate) fn collateral_of(&self, account: Address) -> U256 {
        self.locked.get(&account).unwrap_or(U256::zero())
    }

    /// Credit an attached deposit to an account's ledger entry.
    ///
    /// The caller has already received the motes via `attached_value`;
    /// this only records them.
    pub(crate) fn lock_collateral_internal(&mut self, account: Address, amount: U256) {
        if amount.is_zero() {
            self.env().revert(BridgeError::InvalidCollateral);
        }

        self.locked.set(&account, self.collateral_of(account) + amount);
        let total = self.total_collateral.get().unwrap_or(U256::zero());
        self.total_collateral.set(total + amount);

        self.env().emit_event(LockCollateral { account, amount });
    }

    /// Pay motes back out of an account's ledger entry.
    pub(crate) fn release_collateral_internal(&mut self, account: Address, amount: U256) {
        let balance = self.collateral_of(account);
        if balance < amount {
            self.env().revert(BridgeError::InsufficientCollateral);
        }

        self.locked.set(&account, balance - amount);
        let total = self.total_collateral.get().unwrap_or(U256::zero());
        self.total_collateral.set(total - amount);

        self.env().transfer_tokens(&account, &u256_to_u512(amount));

        self.env().emit_event(ReleaseCollateral { account, amount });
    }

    /// Griefing portion of an account's ledger entry. Not withdrawable
    /// and not counted as vault backing.
    pub(crate) fn griefing_of(&self, account: Address) -> U256 {
        self.griefing_locked.get(&account).unwrap_or(U256::zero())
    }

    pub(crate) fn note_griefing(&mut self, account: Address, amount: U256) {
        self.griefing_locked
            .set(&account, self.griefing_of(account) + amount);
    }

    pub(crate) fn clear_griefing(&mut self, account: Address, amount: U256) {
        let current = self.griefing_of(account);
        let cleared = if current > amount { current - amount } else { U256::zero() };
        self.griefing_locked.set(&account, cleared);
    }

    /// Slash locked collateral: the amount leaves `from`'s ledger entry
    /// and the global total and is paid directly to `to`.
    pub(crate) fn slash_collateral_internal(&mut self, from: Address, to: Address, amount: U256) {
        let from_balance = self.collateral_of(from);
        if from_balance < amount {
            self.env().revert(BridgeError::InsufficientCollateral);
        }

        self.locked.set(&from, from_balance - amount);
        let total = self.total_collateral.get().unwrap_or(U256::zero());
        self.total_collateral.set(total - amount);

        self.env().transfer_tokens(&to, &u256_to_u512(amount));

        self.env().emit_event(SlashCollateral {
            sender: from,
            receiver: to,
            amount,
        });
    }

    /// Move locked collateral between ledger entries. Custody is retained
    /// and the global total is unchanged; the receiver releases it like
    /// any other locked balance. Callers emit their own domain event.
    pub(crate) fn transfer_collateral_internal(&mut self, from: Address, to: Address, amount: U256) {
        let from_balance = self.collateral_of(from);
        if from_balance < amount {
            self.env().revert(BridgeError::InsufficientCollateral);
        }

        self.locked.set(&from, from_balance - amount);
        self.locked.set(&to, self.collateral_of(to) + amount);
    }
}
