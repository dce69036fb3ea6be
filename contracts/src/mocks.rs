//! Mock BTC verification contracts.
//!
//! Stand-ins for a real header relay and SPV payment validator, used in
//! tests and local deployments. The validator consumes a fixed-layout
//! pseudo transaction built with [`encode_payment`]:
//!
//! `request_id (8 BE) || recipient hash (20) || amount satoshi (32 BE)`

use odra::casper_types::bytesrepr::Bytes;
use odra::casper_types::U256;
use odra::prelude::*;

use crate::errors::BridgeError;

const PAYMENT_LEN: usize = 8 + 20 + 32;

/// Build a pseudo raw transaction accepted by [`TransactionValidatorMock`].
pub fn encode_payment(request_id: u64, recipient: &Bytes, amount: U256) -> Bytes {
    let mut raw = Vec::with_capacity(PAYMENT_LEN);
    raw.extend_from_slice(&request_id.to_be_bytes());
    raw.extend_from_slice(recipient);
    let mut amount_bytes = [0u8; 32];
    amount.to_big_endian(&mut amount_bytes);
    raw.extend_from_slice(&amount_bytes);
    Bytes::from(raw)
}

/// Relay mock with a settable verdict
#[odra::module]
pub struct RelayMock {
    /// Verdict returned by every inclusion check
    result: Var<bool>,
}

#[odra::module]
impl RelayMock {
    pub fn init(&mut self) {
        self.result.set(true);
    }

    /// Set the verdict returned by subsequent inclusion checks.
    pub fn set_result(&mut self, result: bool) {
        self.result.set(result);
    }

    /// Mirrors the relay interface; all arguments are ignored.
    pub fn verify_tx(
        &self,
        _proof: Bytes,
        _raw_tx: Bytes,
        _height_and_index: u64,
        _header: Bytes,
    ) -> bool {
        self.result.get().unwrap_or(true)
    }
}

/// Payment validator mock parsing the fixed pseudo-transaction layout
#[odra::module]
pub struct TransactionValidatorMock {
    /// When false every validation reverts with InvalidTxProof
    enabled: Var<bool>,
}

#[odra::module]
impl TransactionValidatorMock {
    pub fn init(&mut self) {
        self.enabled.set(true);
    }

    /// Force every subsequent validation to fail or restore normal parsing.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled.set(enabled);
    }

    /// Parse `raw_tx` and check it pays at least `required_amount` to
    /// `recipient_btc_address` for `request_id`. The pseudo transaction
    /// has a single payment output, so `output_index` is ignored.
    /// Returns the paid amount.
    pub fn validate_transaction(
        &self,
        raw_tx: Bytes,
        _output_index: u32,
        required_amount: U256,
        recipient_btc_address: Bytes,
        request_id: u64,
    ) -> U256 {
        if !self.enabled.get().unwrap_or(true) || raw_tx.len() != PAYMENT_LEN {
            self.env().revert(BridgeError::InvalidTxProof);
        }

        let mut id_bytes = [0u8; 8];
        id_bytes.copy_from_slice(&raw_tx[0..8]);
        if u64::from_be_bytes(id_bytes) != request_id {
            self.env().revert(BridgeError::InvalidOpReturn);
        }

        if raw_tx[8..28] != recipient_btc_address[..] {
            self.env().revert(BridgeError::InvalidRecipient);
        }

        let paid = U256::from_big_endian(&raw_tx[28..PAYMENT_LEN]);
        if paid < required_amount {
            self.env().revert(BridgeError::InsufficientValue);
        }

        paid
    }
}
