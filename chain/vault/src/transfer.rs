//! Collateral transfer adapter
//!
//! The vault moves collateral through an external token it does not control.
//! Tokens disagree on how they report success: some return `true`, some
//! return nothing and only signal failure by reverting, some return `false`.
//! [`verify`] folds those outcomes into a single verdict.

use std::cell::RefCell;
use std::collections::HashMap;

use thiserror::Error;
use tracing::warn;
use vault_types::ids::Address;

use crate::errors::VaultError;

/// Data returned by a token call that did not revert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnData {
    /// Explicit boolean return.
    Bool(bool),
    /// No return data.
    Empty,
}

/// A token call that reverted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error("call reverted: {0}")]
    Reverted(String),
}

pub type CallResult = Result<ReturnData, CallError>;

/// External collateral token.
///
/// Methods take `&self`: the token is a separate party whose state lives
/// behind its own interior mutability, and it may call back into the vault.
pub trait CollateralToken {
    /// Move `amount` from `sender` to `to`.
    fn transfer(&self, sender: Address, to: Address, amount: u128) -> CallResult;

    /// Move `amount` from `from` to `to` on `spender`'s allowance.
    fn transfer_from(&self, spender: Address, from: Address, to: Address, amount: u128) -> CallResult;

    fn balance_of(&self, account: Address) -> u128;
}

/// Interpret a token call outcome.
///
/// `Bool(true)` and `Empty` succeed; `Bool(false)` and a revert are
/// [`VaultError::TransferFailed`].
pub fn verify(outcome: CallResult) -> Result<(), VaultError> {
    match outcome {
        Ok(ReturnData::Bool(true)) | Ok(ReturnData::Empty) => Ok(()),
        Ok(ReturnData::Bool(false)) => {
            warn!("Collateral token returned false");
            Err(VaultError::TransferFailed)
        }
        Err(CallError::Reverted(reason)) => {
            warn!(%reason, "Collateral token call reverted");
            Err(VaultError::TransferFailed)
        }
    }
}

/// Pull `amount` from `from` into `vault`, spending the vault's allowance.
pub fn pull(
    token: &dyn CollateralToken,
    vault: Address,
    from: Address,
    amount: u128,
) -> Result<(), VaultError> {
    verify(token.transfer_from(vault, from, vault, amount))
}

/// Push `amount` from `vault` to `to`.
pub fn push(
    token: &dyn CollateralToken,
    vault: Address,
    to: Address,
    amount: u128,
) -> Result<(), VaultError> {
    verify(token.transfer(vault, to, amount))
}

/// How an [`InMemoryToken`] reports a successful transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnStyle {
    #[default]
    Bool,
    /// Return nothing, as older non-conforming tokens do.
    Empty,
}

/// How an [`InMemoryToken`] reports a failed transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureStyle {
    #[default]
    Revert,
    ReturnFalse,
}

/// In-memory collateral token for simulations and tests.
#[derive(Debug, Default)]
pub struct InMemoryToken {
    balances: RefCell<HashMap<Address, u128>>,
    allowances: RefCell<HashMap<(Address, Address), u128>>,
    return_style: ReturnStyle,
    failure_style: FailureStyle,
}

impl InMemoryToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_styles(return_style: ReturnStyle, failure_style: FailureStyle) -> Self {
        Self {
            return_style,
            failure_style,
            ..Self::default()
        }
    }

    /// Credit `amount` to `to` out of thin air.
    pub fn mint_to(&self, to: Address, amount: u128) {
        let mut balances = self.balances.borrow_mut();
        let balance = balances.entry(to).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    pub fn approve(&self, owner: Address, spender: Address, amount: u128) {
        self.allowances.borrow_mut().insert((owner, spender), amount);
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> u128 {
        self.allowances
            .borrow()
            .get(&(owner, spender))
            .copied()
            .unwrap_or(0)
    }

    fn success(&self) -> CallResult {
        match self.return_style {
            ReturnStyle::Bool => Ok(ReturnData::Bool(true)),
            ReturnStyle::Empty => Ok(ReturnData::Empty),
        }
    }

    fn failure(&self, reason: &str) -> CallResult {
        match self.failure_style {
            FailureStyle::Revert => Err(CallError::Reverted(reason.to_string())),
            FailureStyle::ReturnFalse => Ok(ReturnData::Bool(false)),
        }
    }

    fn move_balance(&self, from: Address, to: Address, amount: u128) -> CallResult {
        let mut balances = self.balances.borrow_mut();
        let available = balances.get(&from).copied().unwrap_or(0);
        if available < amount {
            drop(balances);
            return self.failure("transfer amount exceeds balance");
        }
        balances.insert(from, available - amount);
        let receiver = balances.entry(to).or_insert(0);
        *receiver = receiver.saturating_add(amount);
        drop(balances);
        self.success()
    }
}

impl CollateralToken for InMemoryToken {
    fn transfer(&self, sender: Address, to: Address, amount: u128) -> CallResult {
        if to.is_zero() {
            return self.failure("transfer to the zero address");
        }
        self.move_balance(sender, to, amount)
    }

    fn transfer_from(&self, spender: Address, from: Address, to: Address, amount: u128) -> CallResult {
        if to.is_zero() {
            return self.failure("transfer to the zero address");
        }
        let allowance = self.allowance(from, spender);
        if allowance < amount {
            return self.failure("insufficient allowance");
        }
        let result = self.move_balance(from, to, amount)?;
        if result != ReturnData::Bool(false) && allowance != u128::MAX {
            self.approve(from, spender, allowance - amount);
        }
        Ok(result)
    }

    fn balance_of(&self, account: Address) -> u128 {
        self.balances
            .borrow()
            .get(&account)
            .copied()
            .unwrap_or(0)
    }
}
