//! Claim ledger
//!
//! The fungible claim token's bookkeeping, consumed by the vault as a
//! capability. The vault only ever mints, burns and spends allowances; the
//! remaining methods serve shareholders through the vault's passthroughs.

use std::collections::HashMap;

use vault_types::ids::Address;

use crate::errors::LedgerError;

/// Fungible claim-token bookkeeping.
pub trait ShareLedger {
    fn total_supply(&self) -> u128;

    fn balance_of(&self, account: Address) -> u128;

    fn allowance(&self, owner: Address, spender: Address) -> u128;

    /// Set `spender`'s allowance over `owner`'s claims to `amount`.
    fn approve(&mut self, owner: Address, spender: Address, amount: u128) -> Result<(), LedgerError>;

    /// Move claims between holders.
    fn transfer(&mut self, from: Address, to: Address, amount: u128) -> Result<(), LedgerError>;

    /// Decrease `owner`'s allowance to `spender` by `amount`.
    ///
    /// An allowance of `u128::MAX` is treated as unlimited and left as is.
    fn spend_allowance(&mut self, owner: Address, spender: Address, amount: u128) -> Result<(), LedgerError>;

    /// Create `amount` claims for `to`.
    fn mint(&mut self, to: Address, amount: u128) -> Result<(), LedgerError>;

    /// Destroy `amount` of `from`'s claims.
    fn burn(&mut self, from: Address, amount: u128) -> Result<(), LedgerError>;
}

/// In-memory claim ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimLedger {
    balances: HashMap<Address, u128>,
    allowances: HashMap<(Address, Address), u128>,
    total_supply: u128,
}

impl ClaimLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accounts holding a non-zero balance.
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }

    fn debit(&mut self, account: Address, amount: u128) -> Result<(), LedgerError> {
        let available = self.balance_of(account);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                account,
                required: amount,
                available,
            });
        }
        let remaining = available - amount;
        if remaining == 0 {
            self.balances.remove(&account);
        } else {
            self.balances.insert(account, remaining);
        }
        Ok(())
    }

    fn credit(&mut self, account: Address, amount: u128) -> Result<(), LedgerError> {
        let current = self.balance_of(account);
        let updated = current
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow)?;
        if updated > 0 {
            self.balances.insert(account, updated);
        }
        Ok(())
    }
}

impl ShareLedger for ClaimLedger {
    fn total_supply(&self) -> u128 {
        self.total_supply
    }

    fn balance_of(&self, account: Address) -> u128 {
        self.balances.get(&account).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: Address, spender: Address) -> u128 {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or(0)
    }

    fn approve(&mut self, owner: Address, spender: Address, amount: u128) -> Result<(), LedgerError> {
        if owner.is_zero() || spender.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        self.allowances.insert((owner, spender), amount);
        Ok(())
    }

    fn transfer(&mut self, from: Address, to: Address, amount: u128) -> Result<(), LedgerError> {
        if from.is_zero() || to.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        self.debit(from, amount)?;
        // Cannot overflow: balances sum to total_supply.
        self.credit(to, amount)
    }

    fn spend_allowance(&mut self, owner: Address, spender: Address, amount: u128) -> Result<(), LedgerError> {
        let available = self.allowance(owner, spender);
        if available == u128::MAX {
            return Ok(());
        }
        if available < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner,
                spender,
                required: amount,
                available,
            });
        }
        self.allowances.insert((owner, spender), available - amount);
        Ok(())
    }

    fn mint(&mut self, to: Address, amount: u128) -> Result<(), LedgerError> {
        if to.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow)?;
        self.credit(to, amount)?;
        self.total_supply = supply;
        Ok(())
    }

    fn burn(&mut self, from: Address, amount: u128) -> Result<(), LedgerError> {
        if from.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        self.debit(from, amount)?;
        self.total_supply -= amount;
        Ok(())
    }
}
