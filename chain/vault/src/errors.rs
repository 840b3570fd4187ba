//! Vault error types
//!
//! Every variant aborts the whole transition it is raised in; nothing is
//! recovered internally.

use thiserror::Error;
use vault_types::ids::Address;

/// Errors raised by vault operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VaultError {
    #[error("Vault is paused")]
    Paused,

    #[error("Vault is not paused")]
    NotPaused,

    #[error("Amount must be positive")]
    ZeroAmount,

    #[error("Zero address not allowed")]
    ZeroAddress,

    #[error("Operation yields insufficient shares")]
    InsufficientShares,

    #[error("Operation yields insufficient assets")]
    InsufficientAssets,

    #[error("Capacity exceeded: totals must stay within 96 bits")]
    CapacityExceeded,

    #[error("Collateral transfer failed")]
    TransferFailed,

    #[error("Reentrancy detected")]
    Reentrant,

    #[error("Unauthorized caller")]
    Unauthorized,

    #[error("Arithmetic overflow in share conversion")]
    Overflow,

    #[error("Claim ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Errors raised by the claim ledger.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Insufficient balance for {account}: required {required}, available {available}")]
    InsufficientBalance {
        account: Address,
        required: u128,
        available: u128,
    },

    #[error("Insufficient allowance from {owner} to {spender}: required {required}, available {available}")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        required: u128,
        available: u128,
    },

    #[error("Claim supply overflow")]
    SupplyOverflow,

    #[error("Zero address not allowed in ledger operation")]
    ZeroAddress,
}

/// Errors raised while encoding, decoding or restoring a snapshot.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SnapshotError {
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unsupported snapshot version: {0}")]
    UnsupportedVersion(u32),

    #[error("Snapshot has claims outstanding but no collateral")]
    OrphanClaims,

    #[error("Claim supply mismatch: state records {claims}, ledger holds {supply}")]
    SupplyMismatch { claims: u128, supply: u128 },

    #[error("Dead claims missing: sink holds {held}")]
    MissingDeadClaims { held: u128 },

    #[error("Zero address in snapshot")]
    ZeroAddress,
}
