//! cBTC Wrapped Token Contract
//!
//! CEP-18 compatible wrapped Bitcoin with protocol-controlled minting and
//! burning. Only authorized protocol contracts (the bridge) can mint/burn;
//! supply therefore tracks BTC held in vault custody.

use crate::errors::BridgeError;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use odra::casper_types::bytesrepr::ToBytes;
use odra::casper_types::{Key, U256};
use odra::prelude::*;

/// Wrapped BTC carries satoshi precision
const WRAPPED_DECIMALS: u8 = 8;
const TOKEN_NAME: &str = "Casper Wrapped Bitcoin";
const TOKEN_SYMBOL: &str = "cBTC";

const CEP18_NAME_KEY: &str = "name";
const CEP18_SYMBOL_KEY: &str = "symbol";
const CEP18_DECIMALS_KEY: &str = "decimals";
const CEP18_TOTAL_SUPPLY_KEY: &str = "total_supply";
const CEP18_BALANCES_DICT: &str = "balances";
const CEP18_ALLOWANCES_DICT: &str = "allowances";

/// cBTC Wrapped Token Contract
#[odra::module]
pub struct WrappedBtc {
    /// Token name
    name: Var<String>,
    /// Token symbol
    symbol: Var<String>,
    /// Decimals (8, satoshi)
    decimals: Var<u8>,
    /// Total supply
    total_supply: Var<U256>,
    /// Balance mapping
    balances: Mapping<Address, U256>,
    /// Allowance mapping (owner -> spender -> amount)
    allowances: Mapping<(Address, Address), U256>,
    /// Admin managing the minter set
    admin: Var<Address>,
    /// Authorized minters (protocol contracts)
    authorized_minters: Mapping<Address, bool>,
}

#[odra::module]
impl WrappedBtc {
    /// Initialize the token. The deployer becomes admin.
    pub fn init(&mut self) {
        self.name.set(String::from(TOKEN_NAME));
        self.symbol.set(String::from(TOKEN_SYMBOL));
        self.decimals.set(WRAPPED_DECIMALS);
        self.total_supply.set(U256::zero());
        self.admin.set(self.env().caller());
        self.env().init_dictionary(CEP18_BALANCES_DICT);
        self.env().init_dictionary(CEP18_ALLOWANCES_DICT);
        self.env().set_named_value(CEP18_NAME_KEY, String::from(TOKEN_NAME));
        self.env().set_named_value(CEP18_SYMBOL_KEY, String::from(TOKEN_SYMBOL));
        self.env().set_named_value(CEP18_DECIMALS_KEY, WRAPPED_DECIMALS);
        self.env().set_named_value(CEP18_TOTAL_SUPPLY_KEY, U256::zero());
    }

    // ========== CEP-18 Standard Functions ==========

    /// Get token name
    pub fn name(&self) -> String {
        self.name.get().unwrap_or_else(|| String::from(TOKEN_NAME))
    }

    /// Get token symbol
    pub fn symbol(&self) -> String {
        self.symbol.get().unwrap_or_else(|| String::from(TOKEN_SYMBOL))
    }

    /// Get decimals
    pub fn decimals(&self) -> u8 {
        self.decimals.get().unwrap_or(WRAPPED_DECIMALS)
    }

    /// Get total supply
    pub fn total_supply(&self) -> U256 {
        self.total_supply.get().unwrap_or(U256::zero())
    }

    /// Get balance of an account
    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).unwrap_or(U256::zero())
    }

    /// Get allowance for spender
    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).unwrap_or(U256::zero())
    }

    /// Transfer tokens to recipient
    pub fn transfer(&mut self, recipient: Address, amount: U256) -> bool {
        let sender = self.env().caller();
        self.transfer_internal(sender, recipient, amount);
        true
    }

    /// Approve spender to spend tokens
    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        let owner = self.env().caller();
        self.approve_internal(owner, spender, amount);
        true
    }

    /// Transfer tokens from owner to recipient (requires allowance)
    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool {
        let spender = self.env().caller();

        let current_allowance = self.allowance(owner, spender);
        if current_allowance < amount {
            self.env().revert(BridgeError::InsufficientTokenBalance);
        }

        self.transfer_internal(owner, recipient, amount);
        self.approve_internal(owner, spender, current_allowance - amount);
        true
    }

    // ========== Protocol Functions (Restricted) ==========

    /// Mint new tokens (only authorized minters)
    pub fn mint(&mut self, to: Address, amount: U256) {
        self.require_authorized_minter();

        let current_balance = self.balance_of(to);
        self.balances.set(&to, current_balance + amount);
        self.set_balance_cep18(to, current_balance + amount);

        let new_supply = self.total_supply() + amount;
        self.total_supply.set(new_supply);
        self.set_total_supply_cep18(new_supply);
    }

    /// Burn tokens from caller
    pub fn burn(&mut self, amount: U256) {
        let caller = self.env().caller();
        self.burn_from_internal(caller, amount);
    }

    /// Burn tokens from account (only authorized minters)
    ///
    /// The bridge burns a redeemer's balance directly when a redeem
    /// request is opened.
    pub fn burn_from(&mut self, from: Address, amount: U256) {
        self.require_authorized_minter();
        self.burn_from_internal(from, amount);
    }

    // ========== Admin Functions ==========

    /// Add an authorized minter (admin only)
    pub fn add_minter(&mut self, minter: Address) {
        self.require_admin();
        self.authorized_minters.set(&minter, true);
    }

    /// Remove an authorized minter (admin only)
    pub fn remove_minter(&mut self, minter: Address) {
        self.require_admin();
        self.authorized_minters.set(&minter, false);
    }

    /// Check if address is authorized minter
    pub fn is_minter(&self, account: Address) -> bool {
        self.authorized_minters.get(&account).unwrap_or(false)
    }

    // ========== Internal Functions ==========

    fn transfer_internal(&mut self, from: Address, to: Address, amount: U256) {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            self.env().revert(BridgeError::InsufficientTokenBalance);
        }

        let new_from_balance = from_balance - amount;
        self.balances.set(&from, new_from_balance);
        self.set_balance_cep18(from, new_from_balance);

        let to_balance = self.balance_of(to);
        let new_to_balance = to_balance + amount;
        self.balances.set(&to, new_to_balance);
        self.set_balance_cep18(to, new_to_balance);
    }

    fn approve_internal(&mut self, owner: Address, spender: Address, amount: U256) {
        self.allowances.set(&(owner, spender), amount);
        self.set_allowance_cep18(owner, spender, amount);
    }

    fn burn_from_internal(&mut self, from: Address, amount: U256) {
        let current_balance = self.balance_of(from);
        if current_balance < amount {
            self.env().revert(BridgeError::InsufficientTokenBalance);
        }

        let new_balance = current_balance - amount;
        self.balances.set(&from, new_balance);
        self.set_balance_cep18(from, new_balance);

        let new_supply = self.total_supply() - amount;
        self.total_supply.set(new_supply);
        self.set_total_supply_cep18(new_supply);
    }

    fn set_balance_cep18(&self, owner: Address, amount: U256) {
        let key = Self::cep18_balance_key(owner);
        self.env()
            .set_dictionary_value(CEP18_BALANCES_DICT, key.as_bytes(), amount);
    }

    fn set_allowance_cep18(&self, owner: Address, spender: Address, amount: U256) {
        let key = Self::cep18_allowance_key(owner, spender);
        self.env()
            .set_dictionary_value(CEP18_ALLOWANCES_DICT, key.as_bytes(), amount);
    }

    fn set_total_supply_cep18(&self, amount: U256) {
        self.env().set_named_value(CEP18_TOTAL_SUPPLY_KEY, amount);
    }

    fn cep18_balance_key(owner: Address) -> String {
        let key = Key::from(owner);
        let bytes = key.to_bytes().unwrap_or_default();
        BASE64_STANDARD.encode(bytes)
    }

    fn cep18_allowance_key(owner: Address, spender: Address) -> String {
        let owner_key = Key::from(owner);
        let spender_key = Key::from(spender);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&owner_key.to_bytes().unwrap_or_default());
        bytes.extend_from_slice(&spender_key.to_bytes().unwrap_or_default());
        BASE64_STANDARD.encode(bytes)
    }

    fn require_authorized_minter(&self) {
        let caller = self.env().caller();
        if !self.is_minter(caller) {
            self.env().revert(BridgeError::UnauthorizedProtocol);
        }
    }

    fn require_admin(&self) {
        let caller = self.env().caller();
        if self.admin.get() != Some(caller) {
            self.env().revert(BridgeError::Unauthorized);
        }
    }
}
