//! One-time BTC deposit address derivation.
//!
//! Each issue and replace request gets its own deposit address hash so
//! payments can be attributed unambiguously. The address is the Bitcoin
//! HASH160 of the vault's registered public key concatenated with the
//! request id.

use odra::casper_types::bytesrepr::Bytes;
use odra::casper_types::U256;
use odra::prelude::*;
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Bitcoin HASH160: RIPEMD160(SHA256(data)).
pub fn hash160(data: &[u8]) -> Bytes {
    let sha = Sha256::digest(data);
    let ripe = Ripemd160::digest(sha);
    Bytes::from(ripe.to_vec())
}

/// Derive the 20-byte deposit address hash for a request.
///
/// Preimage layout: `pub_x (32 BE) || pub_y (32 BE) || request_id (8 BE)`.
pub fn derive_deposit_address(public_key_x: U256, public_key_y: U256, request_id: u64) -> Bytes {
    let mut preimage = [0u8; 72];
    public_key_x.to_big_endian(&mut preimage[0..32]);
    public_key_y.to_big_endian(&mut preimage[32..64]);
    preimage[64..72].copy_from_slice(&request_id.to_be_bytes());
    hash160(&preimage)
}
