//! External Bitcoin verification interfaces.
//!
//! The bridge delegates all BTC transaction checking to two pluggable
//! contracts: a relay attesting chain inclusion and a validator parsing
//! the payment itself. Mock implementations live in [`crate::mocks`].

use odra::casper_types::bytesrepr::Bytes;
use odra::casper_types::U256;
use odra::prelude::*;

/// BTC relay trait for cross-contract calls.
///
/// A production relay tracks Bitcoin block headers and verifies SPV
/// merkle proofs against them.
#[odra::external_contract]
pub trait BtcRelay {
    /// Returns true when the transaction in `raw_tx` is included in the
    /// relay's best chain at the given height and index under `proof`.
    fn verify_tx(&self, proof: Bytes, raw_tx: Bytes, height_and_index: u64, header: Bytes)
        -> bool;
}

/// BTC payment validator trait for cross-contract calls.
///
/// Parses a raw transaction and checks that output `output_index` pays
/// at least `required_amount` satoshi to `recipient_btc_address` while a
/// data output embeds `request_id`. Returns the paid amount and reverts
/// on any mismatch.
#[odra::external_contract]
pub trait TransactionValidator {
    fn validate_transaction(
        &self,
        raw_tx: Bytes,
        output_index: u32,
        required_amount: U256,
        recipient_btc_address: Bytes,
        request_id: u64,
    ) -> U256;
}
