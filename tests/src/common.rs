//! Shared test harness: deploys and wires the full protocol.

use cspr_btcbridge_contracts::bridge::{BtcBridge, BtcBridgeHostRef, BtcBridgeInitArgs};
use cspr_btcbridge_contracts::mocks::{
    encode_payment, RelayMock, RelayMockHostRef, TransactionValidatorMock,
    TransactionValidatorMockHostRef,
};
use cspr_btcbridge_contracts::oracle::{ExchangeRateOracle, ExchangeRateOracleHostRef};
use cspr_btcbridge_contracts::types::BPS_SCALE;
use cspr_btcbridge_contracts::wrapped_token::{WrappedBtc, WrappedBtcHostRef};
use odra::casper_types::bytesrepr::Bytes;
use odra::casper_types::{U256, U512};
use odra::host::{Deployer, HostEnv, HostRef, NoArgs};
use odra::prelude::*;

/// Motes per satoshi over the granularity scale
pub const RATE: u64 = 10;

/// 15 CSPR; backs exactly 1 BTC (1e8 sat) at the 150% threshold
pub const VAULT_COLLATERAL: u64 = 15_000_000_000;

/// Default cancellation window plus a margin (ms)
pub const AFTER_EXPIRY_MS: u64 = 2 * 24 * 60 * 60 * 1000 + 1;

/// Staleness window wide enough for time-travel tests (one year, ms)
pub const WIDE_MAX_DELAY_MS: u64 = 365 * 24 * 60 * 60 * 1000;

pub struct TestContext {
    pub env: HostEnv,
    pub oracle: ExchangeRateOracleHostRef,
    pub token: WrappedBtcHostRef,
    pub relay: RelayMockHostRef,
    pub validator: TransactionValidatorMockHostRef,
    pub bridge: BtcBridgeHostRef,
}

impl TestContext {
    pub fn account(&self, index: usize) -> Address {
        self.env.get_account(index)
    }

    pub fn set_caller(&self, index: usize) {
        self.env.set_caller(self.env.get_account(index));
    }

    /// Register `account` as a vault with the given collateral.
    pub fn register_vault(&mut self, index: usize, collateral: u64) {
        self.set_caller(index);
        self.bridge
            .with_tokens(U512::from(collateral))
            .register_vault(public_key_x(index), public_key_y(index));
        self.set_caller(0);
    }

    /// Griefing collateral required for `amount` satoshi.
    pub fn required_griefing(&self, amount: u64) -> U256 {
        let config = self.bridge.get_config();
        U256::from(amount) * U256::from(RATE) * U256::from(10u64)
            * U256::from(config.secure_threshold_bps)
            / U256::from(BPS_SCALE)
            * U256::from(config.griefing_bps)
            / U256::from(BPS_SCALE)
    }

    /// Open an issue request as `requester` against `vault`, with the
    /// exact required griefing attached. Returns the request id.
    pub fn open_issue(&mut self, requester: usize, vault: usize, amount: u64) -> u64 {
        let vault_address = self.account(vault);
        let griefing = self.required_griefing(amount);
        self.set_caller(requester);
        let id = self
            .bridge
            .with_tokens(u256_to_u512(griefing))
            .request_issue(U256::from(amount), vault_address);
        self.set_caller(0);
        id
    }

    /// Open and complete an issue for `amount` satoshi.
    pub fn issue_tokens(&mut self, requester: usize, vault: usize, amount: u64) -> u64 {
        let id = self.open_issue(requester, vault, amount);
        let deposit = self
            .bridge
            .get_deposit_address(self.account(vault), id);
        let raw_tx = encode_payment(id, &deposit, U256::from(amount));

        self.set_caller(requester);
        self.bridge.execute_issue(
            self.account(requester),
            id,
            dummy_proof(),
            raw_tx,
            0,
            dummy_header(),
            0,
        );
        self.set_caller(0);
        id
    }
}

/// Deploy the full protocol with account 0 as admin, the rate pushed and
/// the staleness window widened for time-travel tests.
pub fn setup() -> TestContext {
    let env = odra_test::env();

    let mut oracle = ExchangeRateOracle::deploy(&env, NoArgs);
    oracle.set_max_delay(WIDE_MAX_DELAY_MS);
    oracle.set_exchange_rate(U256::from(RATE));

    let mut token = WrappedBtc::deploy(&env, NoArgs);
    let relay = RelayMock::deploy(&env, NoArgs);
    let validator = TransactionValidatorMock::deploy(&env, NoArgs);

    let bridge = BtcBridge::deploy(
        &env,
        BtcBridgeInitArgs {
            oracle: *oracle.address(),
            token: *token.address(),
            relay: *relay.address(),
            tx_validator: *validator.address(),
        },
    );
    token.add_minter(*bridge.address());

    TestContext {
        env,
        oracle,
        token,
        relay,
        validator,
        bridge,
    }
}

pub fn public_key_x(index: usize) -> U256 {
    U256::from(1000 + index as u64)
}

pub fn public_key_y(index: usize) -> U256 {
    U256::from(2000 + index as u64)
}

pub fn dummy_proof() -> Bytes {
    Bytes::from(vec![0u8; 32])
}

pub fn dummy_header() -> Bytes {
    Bytes::from(vec![0u8; 80])
}

pub fn u256_to_u512(value: U256) -> U512 {
    cspr_btcbridge_contracts::types::u256_to_u512(value)
}
