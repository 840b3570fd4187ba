//! Vault events
//!
//! Events are immutable records emitted by successful operations. An event
//! recorded by a transition that later aborts is discarded with it.

use serde::{Deserialize, Serialize};
use vault_types::ids::Address;

/// Collateral deposited and claims issued (by `deposit` or `mint`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub caller: Address,
    pub receiver: Address,
    pub assets: u128,
    pub shares: u128,
}

/// Claims burned and collateral released (by `withdraw` or `redeem`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdraw {
    pub caller: Address,
    pub receiver: Address,
    pub owner: Address,
    pub assets: u128,
    pub shares: u128,
}

/// Mutating operations halted by the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paused {
    pub account: Address,
}

/// Mutating operations resumed by the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unpaused {
    pub account: Address,
}

/// Admin rights handed to a new owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipTransferred {
    pub previous_owner: Address,
    pub new_owner: Address,
}

/// Enum wrapper for all vault events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VaultEvent {
    Deposit(Deposit),
    Withdraw(Withdraw),
    Paused(Paused),
    Unpaused(Unpaused),
    OwnershipTransferred(OwnershipTransferred),
}
