//! Share Vault: custody of one collateral token against fungible claims
//!
//! Depositors hand collateral to the vault and receive claims proportional to
//! their contribution; claims are later redeemed for a proportional slice of
//! the collateral the vault accounts for.
//!
//! # Modules
//! - `packed`: Two 96-bit totals packed into one 256-bit storage word
//! - `math`: Collateral/claim conversion with pool-favoring rounding
//! - `vault`: Deposit, mint, withdraw and redeem transitions plus views
//! - `ledger`: Claim-token balances, allowances and supply
//! - `transfer`: Adapter over the external collateral token
//! - `security`: Reentrancy guard, pause guard, owner access control
//! - `events`: Events emitted by the vault
//! - `snapshot`: Persisted vault image and its commitment
//! - `config`: Deployment parameters
//! - `errors`: Error types

pub mod config;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod math;
pub mod packed;
pub mod security;
pub mod snapshot;
pub mod transfer;
pub mod vault;

use vault_types::ids::Address;

/// Vault interface version, frozen after release
pub const VAULT_ABI_VERSION: &str = "1.0.0";

/// Claims locked forever at the first issuance.
pub const MINIMUM_LIQUIDITY: u128 = 1_000;

/// Holder of the permanently locked claims.
pub const DEAD_CLAIMS_SINK: Address = Address::DEAD;

pub use config::VaultConfig;
pub use errors::{LedgerError, SnapshotError, VaultError};
pub use ledger::{ClaimLedger, ShareLedger};
pub use transfer::{CollateralToken, InMemoryToken};
pub use vault::Vault;
