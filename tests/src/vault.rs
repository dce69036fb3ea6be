//! Vault registry tests: registration, public keys and capacity views.

use cspr_btcbridge_contracts::errors::BridgeError;
use odra::casper_types::{U256, U512};
use pretty_assertions::assert_eq;

use crate::common::{public_key_x, public_key_y, setup, VAULT_COLLATERAL};

#[test]
fn register_vault_locks_the_deposit() {
    let mut ctx = setup();
    ctx.register_vault(1, VAULT_COLLATERAL);

    let vault = ctx.bridge.get_vault(ctx.account(1));
    assert_eq!(vault.collateral, U256::from(VAULT_COLLATERAL));
    assert_eq!(vault.btc_public_key_x, public_key_x(1));
    assert_eq!(vault.btc_public_key_y, public_key_y(1));
    assert_eq!(vault.issued, U256::zero());
    assert!(!vault.liquidated);

    assert_eq!(ctx.bridge.get_vault_count(), 1);
    assert_eq!(ctx.bridge.get_vault_at(0), ctx.account(1));
    assert!(ctx.env.emitted(&ctx.bridge, "RegisterVault"));
    assert!(ctx.env.emitted(&ctx.bridge, "LockCollateral"));
}

#[test]
fn double_registration_is_rejected() {
    let mut ctx = setup();
    ctx.register_vault(1, VAULT_COLLATERAL);

    ctx.set_caller(1);
    assert_eq!(
        ctx.bridge
            .with_tokens(U512::from(VAULT_COLLATERAL))
            .try_register_vault(public_key_x(1), public_key_y(1))
            .unwrap_err(),
        BridgeError::VaultAlreadyExists.into()
    );
}

#[test]
fn registration_below_minimum_collateral_is_rejected() {
    let mut ctx = setup();
    let minimum = ctx.bridge.get_config().min_vault_collateral;

    ctx.set_caller(1);
    assert_eq!(
        ctx.bridge
            .with_tokens(crate::common::u256_to_u512(minimum - U256::from(1u64)))
            .try_register_vault(public_key_x(1), public_key_y(1))
            .unwrap_err(),
        BridgeError::InsufficientCollateral.into()
    );
}

#[test]
fn unknown_vault_lookup_fails() {
    let ctx = setup();

    assert_eq!(
        ctx.bridge.try_get_vault(ctx.account(7)).unwrap_err(),
        BridgeError::VaultNotFound.into()
    );
    assert_eq!(
        ctx.bridge.try_get_vault_at(0).unwrap_err(),
        BridgeError::VaultNotFound.into()
    );
}

#[test]
fn update_public_key_changes_future_deposit_addresses() {
    let mut ctx = setup();
    ctx.register_vault(1, VAULT_COLLATERAL);

    let first_id = ctx.open_issue(2, 1, 10_000_000);
    let first_address = ctx.bridge.get_deposit_address(ctx.account(1), first_id);

    ctx.set_caller(1);
    ctx.bridge
        .update_public_key(U256::from(9999u64), U256::from(8888u64));
    assert!(ctx.env.emitted(&ctx.bridge, "VaultPublicKeyUpdate"));

    let second_id = ctx.open_issue(2, 1, 10_000_000);
    let second_address = ctx.bridge.get_deposit_address(ctx.account(1), second_id);

    assert_ne!(first_address, second_address);
    // The first request keeps its original address.
    assert_eq!(
        ctx.bridge.get_deposit_address(ctx.account(1), first_id),
        first_address
    );
}

#[test]
fn update_public_key_requires_registration() {
    let mut ctx = setup();

    ctx.set_caller(3);
    assert_eq!(
        ctx.bridge
            .try_update_public_key(U256::from(1u64), U256::from(2u64))
            .unwrap_err(),
        BridgeError::VaultNotFound.into()
    );
}

#[test]
fn issuable_tokens_reflect_the_secure_threshold() {
    let mut ctx = setup();
    ctx.register_vault(1, VAULT_COLLATERAL);

    // 15 CSPR at rate 10 backs exactly 1e8 satoshi at 150%.
    assert_eq!(
        ctx.bridge.issuable_tokens(ctx.account(1)),
        U256::from(100_000_000u64)
    );
}

#[test]
fn deposit_addresses_differ_per_request() {
    let mut ctx = setup();
    ctx.register_vault(1, VAULT_COLLATERAL);

    let first = ctx.open_issue(2, 1, 10_000_000);
    let second = ctx.open_issue(2, 1, 10_000_000);

    assert_ne!(
        ctx.bridge.get_deposit_address(ctx.account(1), first),
        ctx.bridge.get_deposit_address(ctx.account(1), second)
    );
    assert!(ctx.env.emitted(&ctx.bridge, "RegisterDepositAddress"));
}

#[test]
fn deposit_address_lookup_for_unknown_request_fails() {
    let mut ctx = setup();
    ctx.register_vault(1, VAULT_COLLATERAL);

    assert_eq!(
        ctx.bridge
            .try_get_deposit_address(ctx.account(1), 42)
            .unwrap_err(),
        BridgeError::RequestNotFound.into()
    );
}
