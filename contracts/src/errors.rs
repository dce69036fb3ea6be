//! Protocol error definitions.

use odra::prelude::*;

/// Bridge protocol errors
#[repr(u16)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BridgeError {
    // Vault registry errors (1xx)
    VaultNotFound = 100,
    VaultAlreadyExists = 101,
    ExceedingVaultLimit = 102,
    InsufficientTokensCommitted = 103,
    VaultLiquidated = 104,
    InvalidReplaceAmount = 105,
    NotUnderCollateralized = 106,

    // Oracle errors (2xx)
    MissingExchangeRate = 200,
    InvalidOracleSource = 201,
    InvalidExchangeRate = 202,

    // Collateral errors (3xx)
    InvalidCollateral = 300,
    InsufficientCollateral = 301,
    InsufficientGriefingCollateral = 302,

    // Request state errors (4xx)
    RequestNotFound = 400,
    RequestAlreadyCompleted = 401,
    TimeNotExpired = 402,
    InvalidExecutor = 403,

    // Proof errors, raised by the relay / transaction validator (5xx)
    InvalidTxProof = 500,
    InvalidOpReturn = 501,
    InsufficientValue = 502,
    InvalidRecipient = 503,

    // Token errors (6xx)
    InsufficientTokenBalance = 600,
    UnauthorizedProtocol = 601,

    // Access control / config errors (7xx)
    Unauthorized = 700,
    InvalidConfig = 701,
    ZeroAmount = 702,
}

impl BridgeError {
    pub const fn message(&self) -> &'static str {
        match self {
            // Vault registry
            BridgeError::VaultNotFound => "Vault not found",
            BridgeError::VaultAlreadyExists => "Vault already registered for this account",
            BridgeError::ExceedingVaultLimit => "Reservation exceeds vault collateral limit",
            BridgeError::InsufficientTokensCommitted => "Counter decrease exceeds committed tokens",
            BridgeError::VaultLiquidated => "Vault has been liquidated",
            BridgeError::InvalidReplaceAmount => "Replace amount exceeds the replaceable tokens",
            BridgeError::NotUnderCollateralized => "under",

            // Oracle
            BridgeError::MissingExchangeRate => "Exchange rate unset or stale",
            BridgeError::InvalidOracleSource => "Caller is not an authorized oracle",
            BridgeError::InvalidExchangeRate => "Exchange rate is zero",

            // Collateral
            BridgeError::InvalidCollateral => "Collateral amount is zero or deposit mismatch",
            BridgeError::InsufficientCollateral => "Insufficient locked collateral",
            BridgeError::InsufficientGriefingCollateral => "Griefing collateral below requirement",

            // Request state
            BridgeError::RequestNotFound => "Request not found",
            BridgeError::RequestAlreadyCompleted => "Request already completed or cancelled",
            BridgeError::TimeNotExpired => "Cancellation period has not expired",
            BridgeError::InvalidExecutor => "Caller is not the request owner",

            // Proof
            BridgeError::InvalidTxProof => "Transaction inclusion proof rejected by relay",
            BridgeError::InvalidOpReturn => "Payment does not embed the request id",
            BridgeError::InsufficientValue => "Payment value below required amount",
            BridgeError::InvalidRecipient => "Payment output pays the wrong recipient",

            // Token
            BridgeError::InsufficientTokenBalance => "Insufficient token balance",
            BridgeError::UnauthorizedProtocol => "Caller is not an authorized protocol contract",

            // Access control / config
            BridgeError::Unauthorized => "Unauthorized: caller is not admin",
            BridgeError::InvalidConfig => "Invalid configuration parameter",
            BridgeError::ZeroAmount => "Amount must be non-zero",
        }
    }
}

impl core::fmt::Display for BridgeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

impl From<BridgeError> for OdraError {
    fn from(error: BridgeError) -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            OdraError::user(error as u16)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            OdraError::user(error as u16, error.message())
        }
    }
}
