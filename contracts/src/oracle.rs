//! Exchange Rate Oracle
//!
//! Stores the CSPR/BTC exchange rate pushed by authorized off-chain feeds
//! and gates every read behind a staleness check. Conversions between
//! motes (9 decimals) and satoshi (8 decimals) live here so that all
//! protocol contracts price collateral identically.

use odra::casper_types::U256;
use odra::prelude::*;

use crate::errors::BridgeError;

/// Decimal gap between motes (1e9 per CSPR) and satoshi (1e8 per BTC).
pub const GRANULARITY_SCALE: u64 = 10;

/// Default freshness window for the exchange rate (ms).
pub const DEFAULT_MAX_DELAY_MS: u64 = 1000;

/// Emitted on every accepted rate update
#[odra::event]
pub struct SetExchangeRate {
    pub oracle: Address,
    pub rate: U256,
}

/// Emitted when the BTC fee estimate changes
#[odra::event]
pub struct SetSatoshiPerByte {
    pub oracle: Address,
    pub fee: U256,
    pub inclusion_estimate: U256,
}

/// CSPR/BTC exchange rate oracle
#[odra::module(events = [SetExchangeRate, SetSatoshiPerByte])]
pub struct ExchangeRateOracle {
    /// Motes per satoshi, divided by [`GRANULARITY_SCALE`]
    exchange_rate: Var<U256>,
    /// Block time of the last accepted update (ms)
    last_exchange_rate_time: Var<u64>,
    /// Maximum age before the rate counts as stale (ms)
    max_delay: Var<u64>,
    /// Fee rate estimates per BTC inclusion target (satoshi per byte)
    satoshi_per_bytes: Mapping<U256, U256>,
    /// Feeds allowed to push updates
    authorized_oracles: Mapping<Address, bool>,
    /// Admin account managing the feed set
    admin: Var<Address>,
}

#[odra::module]
impl ExchangeRateOracle {
    /// Initialize the oracle. The deployer becomes admin and the first
    /// authorized feed.
    pub fn init(&mut self) {
        let deployer = self.env().caller();
        self.admin.set(deployer);
        self.authorized_oracles.set(&deployer, true);
        self.max_delay.set(DEFAULT_MAX_DELAY_MS);
    }

    // ========== Feed Functions ==========

    /// Push a new exchange rate (motes per satoshi over the granularity
    /// scale). Only authorized feeds. A zero rate is rejected.
    pub fn set_exchange_rate(&mut self, rate: U256) {
        let caller = self.env().caller();
        self.require_authorized_oracle(caller);

        if rate.is_zero() {
            self.env().revert(BridgeError::InvalidExchangeRate);
        }

        self.exchange_rate.set(rate);
        self.last_exchange_rate_time.set(self.env().get_block_time());

        self.env().emit_event(SetExchangeRate {
            oracle: caller,
            rate,
        });
    }

    /// Push the satoshi-per-byte fee estimate for a confirmation target.
    pub fn set_satoshi_per_byte(&mut self, fee: U256, inclusion_estimate: U256) {
        let caller = self.env().caller();
        self.require_authorized_oracle(caller);

        self.satoshi_per_bytes.set(&inclusion_estimate, fee);

        self.env().emit_event(SetSatoshiPerByte {
            oracle: caller,
            fee,
            inclusion_estimate,
        });
    }

    // ========== Read Functions ==========

    /// Current exchange rate. Reverts when unset or older than `max_delay`.
    pub fn get_exchange_rate(&self) -> U256 {
        let updated_at = match self.last_exchange_rate_time.get() {
            Some(time) => time,
            None => self.env().revert(BridgeError::MissingExchangeRate),
        };

        let now = self.env().get_block_time();
        let max_delay = self.max_delay.get().unwrap_or(DEFAULT_MAX_DELAY_MS);
        if now > updated_at && now - updated_at > max_delay {
            self.env().revert(BridgeError::MissingExchangeRate);
        }

        match self.exchange_rate.get() {
            Some(rate) => rate,
            None => self.env().revert(BridgeError::MissingExchangeRate),
        }
    }

    /// Fee estimate for a confirmation target, zero when never pushed.
    pub fn satoshi_per_byte(&self, inclusion_estimate: U256) -> U256 {
        self.satoshi_per_bytes
            .get(&inclusion_estimate)
            .unwrap_or(U256::zero())
    }

    /// Convert a satoshi amount into motes at the current rate.
    pub fn wrapped_to_collateral(&self, amount: U256) -> U256 {
        let rate = self.get_exchange_rate();
        amount * rate * U256::from(GRANULARITY_SCALE)
    }

    /// Convert a mote amount into satoshi at the current rate, rounding down.
    pub fn collateral_to_wrapped(&self, amount: U256) -> U256 {
        let rate = self.get_exchange_rate();
        amount / rate / U256::from(GRANULARITY_SCALE)
    }

    /// Block time of the last accepted update, zero when never updated.
    pub fn last_update(&self) -> u64 {
        self.last_exchange_rate_time.get().unwrap_or(0)
    }

    // ========== Admin Functions ==========

    /// Authorize a feed account (admin only).
    pub fn add_authorized_oracle(&mut self, oracle: Address) {
        self.require_admin();
        self.authorized_oracles.set(&oracle, true);
    }

    /// Remove a feed account (admin only).
    pub fn remove_authorized_oracle(&mut self, oracle: Address) {
        self.require_admin();
        self.authorized_oracles.set(&oracle, false);
    }

    /// Check whether an account may push updates.
    pub fn is_authorized_oracle(&self, oracle: Address) -> bool {
        self.authorized_oracles.get(&oracle).unwrap_or(false)
    }

    /// Change the staleness window (admin only). Zero is rejected.
    pub fn set_max_delay(&mut self, max_delay: u64) {
        self.require_admin();
        if max_delay == 0 {
            self.env().revert(BridgeError::InvalidConfig);
        }
        self.max_delay.set(max_delay);
    }

    /// Current staleness window (ms).
    pub fn get_max_delay(&self) -> u64 {
        self.max_delay.get().unwrap_or(DEFAULT_MAX_DELAY_MS)
    }

    // ========== Internal Functions ==========

    fn require_authorized_oracle(&self, caller: Address) {
        if !self.is_authorized_oracle(caller) {
            self.env().revert(BridgeError::InvalidOracleSource);
        }
    }

    fn require_admin(&self) {
        let caller = self.env().caller();
        if self.admin.get() != Some(caller) {
            self.env().revert(BridgeError::Unauthorized);
        }
    }
}
