//! Casper BTC Bridge Contracts
//!
//! Collateralized bridge that mints a CEP-18 wrapped Bitcoin (cBTC)
//! against BTC held by registered vaults.
//!
//! ## Architecture
//!
//! - **BtcBridge**: vault registry, collateral ledger, the
//!   Issue/Redeem/Replace request state machines and liquidation
//! - **WrappedBtc (cBTC)**: wrapped token with mint/burn access control
//! - **ExchangeRateOracle**: staleness-gated CSPR/BTC rate and the
//!   motes/satoshi conversions
//! - **Relay / TransactionValidator**: pluggable BTC proof checking,
//!   with deterministic mocks for tests
//!
//! Every satoshi of cBTC is backed by a vault's locked CSPR at the
//! secure collateral threshold (150%); vaults that fall below it are
//! liquidated into a system pool.

#![cfg_attr(target_arch = "wasm32", no_std)]

#[cfg(target_arch = "wasm32")]
extern crate alloc;

// Re-export odra for downstream usage
pub use odra;

// Core module declarations
pub mod errors;
pub mod key_derivation;
pub mod relay;
pub mod types;

// Contract modules
pub mod bridge;
pub mod mocks;
pub mod oracle;
pub mod wrapped_token;
