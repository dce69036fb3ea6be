//! Redeem state machine tests.

use cspr_btcbridge_contracts::errors::BridgeError;
use cspr_btcbridge_contracts::mocks::encode_payment;
use cspr_btcbridge_contracts::types::RequestStatus;
use odra::casper_types::bytesrepr::Bytes;
use odra::casper_types::U256;
use pretty_assertions::assert_eq;

use crate::common::{dummy_header, dummy_proof, setup, TestContext, AFTER_EXPIRY_MS, VAULT_COLLATERAL};

fn payout_address() -> Bytes {
    Bytes::from(vec![0x77u8; 20])
}

/// Issue 0.5 BTC to account 2 against vault 1, then open a redeem for
/// `amount` satoshi. Returns the request id.
fn issue_then_request_redeem(ctx: &mut TestContext, amount: u64) -> u64 {
    ctx.register_vault(1, VAULT_COLLATERAL);
    ctx.issue_tokens(2, 1, 50_000_000);

    ctx.set_caller(2);
    let id = ctx
        .bridge
        .request_redeem(U256::from(amount), payout_address(), ctx.account(1));
    ctx.set_caller(0);
    id
}

#[test]
fn request_redeem_burns_tokens_up_front() {
    let mut ctx = setup();
    let id = issue_then_request_redeem(&mut ctx, 40_000_000);

    // The full amount left the requester; the vault owes amount - fee.
    assert_eq!(
        ctx.token.balance_of(ctx.account(2)),
        U256::from(9_750_000u64)
    );
    assert_eq!(ctx.token.total_supply(), U256::from(10_000_000u64));

    let request = ctx.bridge.get_redeem_request(id);
    assert_eq!(request.amount_btc, U256::from(39_800_000u64));
    assert_eq!(request.fee, U256::from(200_000u64));
    assert_eq!(request.btc_address, payout_address());
    assert_eq!(request.status, RequestStatus::Pending);

    let vault = ctx.bridge.get_vault(ctx.account(1));
    assert_eq!(vault.to_be_redeemed, U256::from(39_800_000u64));
    assert!(ctx.env.emitted(&ctx.bridge, "RedeemRequested"));
}

#[test]
fn request_redeem_beyond_vault_debt_is_rejected() {
    let mut ctx = setup();
    ctx.register_vault(1, VAULT_COLLATERAL);
    ctx.issue_tokens(2, 1, 50_000_000);

    ctx.set_caller(2);
    assert_eq!(
        ctx.bridge
            .try_request_redeem(U256::from(60_000_000u64), payout_address(), ctx.account(1))
            .unwrap_err(),
        BridgeError::InsufficientTokensCommitted.into()
    );
}

#[test]
fn request_redeem_without_balance_is_rejected() {
    let mut ctx = setup();
    ctx.register_vault(1, VAULT_COLLATERAL);
    ctx.issue_tokens(2, 1, 50_000_000);

    ctx.set_caller(3);
    assert_eq!(
        ctx.bridge
            .try_request_redeem(U256::from(10_000_000u64), payout_address(), ctx.account(1))
            .unwrap_err(),
        BridgeError::InsufficientTokenBalance.into()
    );
}

#[test]
fn request_redeem_validates_the_payout_address() {
    let mut ctx = setup();
    ctx.register_vault(1, VAULT_COLLATERAL);
    ctx.issue_tokens(2, 1, 50_000_000);

    ctx.set_caller(2);
    assert_eq!(
        ctx.bridge
            .try_request_redeem(
                U256::from(10_000_000u64),
                Bytes::from(vec![1u8; 19]),
                ctx.account(1)
            )
            .unwrap_err(),
        BridgeError::InvalidRecipient.into()
    );
}

#[test]
fn execute_redeem_settles_the_vault_debt() {
    let mut ctx = setup();
    let id = issue_then_request_redeem(&mut ctx, 40_000_000);
    let vault_fees_before = ctx.token.balance_of(ctx.account(1));

    let raw_tx = encode_payment(id, &payout_address(), U256::from(39_800_000u64));
    ctx.set_caller(2);
    ctx.bridge.execute_redeem(
        ctx.account(2),
        id,
        dummy_proof(),
        raw_tx,
        0,
        dummy_header(),
        0,
    );

    let vault = ctx.bridge.get_vault(ctx.account(1));
    assert_eq!(vault.issued, U256::from(10_200_000u64));
    assert_eq!(vault.to_be_redeemed, U256::zero());

    // The retained fee is minted to the vault.
    assert_eq!(
        ctx.token.balance_of(ctx.account(1)),
        vault_fees_before + U256::from(200_000u64)
    );
    assert_eq!(
        ctx.bridge.get_redeem_request(id).status,
        RequestStatus::Completed
    );
    assert!(ctx.env.emitted(&ctx.bridge, "RedeemCompleted"));
    assert!(ctx.env.emitted(&ctx.bridge, "RedeemTokens"));
}

#[test]
fn underpaid_redeem_is_rejected() {
    let mut ctx = setup();
    let id = issue_then_request_redeem(&mut ctx, 40_000_000);

    let raw_tx = encode_payment(id, &payout_address(), U256::from(39_799_999u64));
    ctx.set_caller(2);
    assert_eq!(
        ctx.bridge
            .try_execute_redeem(
                ctx.account(2),
                id,
                dummy_proof(),
                raw_tx,
                0,
                dummy_header(),
                0
            )
            .unwrap_err(),
        BridgeError::InsufficientValue.into()
    );
}

#[test]
fn execute_redeem_is_requester_only() {
    let mut ctx = setup();
    let id = issue_then_request_redeem(&mut ctx, 40_000_000);

    let raw_tx = encode_payment(id, &payout_address(), U256::from(39_800_000u64));
    ctx.set_caller(1);
    assert_eq!(
        ctx.bridge
            .try_execute_redeem(
                ctx.account(2),
                id,
                dummy_proof(),
                raw_tx,
                0,
                dummy_header(),
                0
            )
            .unwrap_err(),
        BridgeError::InvalidExecutor.into()
    );
}

#[test]
fn cancel_without_reimbursement_releases_the_reservation() {
    let mut ctx = setup();
    let id = issue_then_request_redeem(&mut ctx, 40_000_000);
    let supply_before = ctx.token.total_supply();

    ctx.env.advance_block_time(AFTER_EXPIRY_MS);
    ctx.set_caller(2);
    ctx.bridge.cancel_redeem(ctx.account(2), id, false);

    let vault = ctx.bridge.get_vault(ctx.account(1));
    assert_eq!(vault.to_be_redeemed, U256::zero());
    assert_eq!(vault.issued, U256::from(50_000_000u64));

    // The burned tokens stay burned.
    assert_eq!(ctx.token.total_supply(), supply_before);
    assert_eq!(
        ctx.bridge.get_redeem_request(id).status,
        RequestStatus::Cancelled
    );
    assert!(ctx.env.emitted(&ctx.bridge, "RedeemCancelled"));
}

#[test]
fn cancel_with_reimbursement_punishes_the_vault() {
    let mut ctx = setup();
    let id = issue_then_request_redeem(&mut ctx, 40_000_000);
    let balance_before = ctx.token.balance_of(ctx.account(2));
    let vault_collateral_before = ctx.bridge.get_collateral(ctx.account(1));

    ctx.env.advance_block_time(AFTER_EXPIRY_MS);
    ctx.set_caller(2);
    ctx.bridge.cancel_redeem(ctx.account(2), id, true);

    // The full burned amount is re-minted to the requester.
    assert_eq!(
        ctx.token.balance_of(ctx.account(2)),
        balance_before + U256::from(40_000_000u64)
    );

    // The vault lost the amount's collateral value into the pool and the
    // matching debt moved with it.
    let seized = U256::from(40_000_000u64) * U256::from(100u64);
    assert_eq!(
        ctx.bridge.get_collateral(ctx.account(1)),
        vault_collateral_before - seized
    );
    assert_eq!(ctx.bridge.get_pool_collateral(), seized);
    assert_eq!(ctx.bridge.get_pool_issued(), U256::from(40_000_000u64));

    let vault = ctx.bridge.get_vault(ctx.account(1));
    assert_eq!(vault.issued, U256::from(10_000_000u64));
    assert_eq!(vault.to_be_redeemed, U256::zero());
}

#[test]
fn cancel_before_expiry_is_rejected() {
    let mut ctx = setup();
    let id = issue_then_request_redeem(&mut ctx, 40_000_000);

    ctx.set_caller(2);
    assert_eq!(
        ctx.bridge
            .try_cancel_redeem(ctx.account(2), id, true)
            .unwrap_err(),
        BridgeError::TimeNotExpired.into()
    );
}

#[test]
fn completed_redeem_cannot_be_cancelled() {
    let mut ctx = setup();
    let id = issue_then_request_redeem(&mut ctx, 40_000_000);

    let raw_tx = encode_payment(id, &payout_address(), U256::from(39_800_000u64));
    ctx.set_caller(2);
    ctx.bridge.execute_redeem(
        ctx.account(2),
        id,
        dummy_proof(),
        raw_tx,
        0,
        dummy_header(),
        0,
    );

    ctx.env.advance_block_time(AFTER_EXPIRY_MS);
    ctx.set_caller(2);
    assert_eq!(
        ctx.bridge
            .try_cancel_redeem(ctx.account(2), id, false)
            .unwrap_err(),
        BridgeError::RequestAlreadyCompleted.into()
    );
}
