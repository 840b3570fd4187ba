//! Security primitives guarding vault transitions
//!
//! Provides the reentrancy lock, the pause flag and owner-based access
//! control. All three use interior mutability: the vault is driven through
//! `&self` so that an external collaborator holding a handle to it can attempt
//! a nested call, which the lock then rejects.

use std::cell::Cell;

use vault_types::ids::Address;

use crate::errors::VaultError;

/// Reentrancy guard preventing nested calls into protected functions.
///
/// A transition acquires the guard before touching state and holds it until
/// it returns. Any nested attempt while held fails.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    locked: Cell<bool>,
}

impl ReentrancyGuard {
    /// Create a new unlocked guard.
    pub fn new() -> Self {
        Self {
            locked: Cell::new(false),
        }
    }

    /// Acquire the guard. Returns `false` if already locked.
    pub fn acquire(&self) -> bool {
        if self.locked.get() {
            return false;
        }
        self.locked.set(true);
        true
    }

    /// Release the guard.
    pub fn release(&self) {
        self.locked.set(false);
    }

    /// Check if currently locked.
    pub fn is_locked(&self) -> bool {
        self.locked.get()
    }

    /// Acquire the guard for the lifetime of the returned lock.
    ///
    /// The lock releases on drop, so every exit path of the protected scope
    /// (early `?` return, success, unwinding) clears it.
    pub fn enter(&self) -> Result<ReentrancyLock<'_>, VaultError> {
        if !self.acquire() {
            return Err(VaultError::Reentrant);
        }
        Ok(ReentrancyLock { guard: self })
    }
}

/// Held reentrancy lock; releases the owning guard when dropped.
#[derive(Debug)]
#[must_use = "the guard is released as soon as the lock is dropped"]
pub struct ReentrancyLock<'a> {
    guard: &'a ReentrancyGuard,
}

impl Drop for ReentrancyLock<'_> {
    fn drop(&mut self) {
        self.guard.release();
    }
}

/// Composable pause flag.
///
/// When paused, mutating transitions must be rejected and capacity views
/// report zero.
#[derive(Debug, Default)]
pub struct PauseGuard {
    paused: Cell<bool>,
}

impl PauseGuard {
    pub fn new(paused: bool) -> Self {
        Self {
            paused: Cell::new(paused),
        }
    }

    /// Pause operations. Fails if already paused.
    pub fn pause(&self) -> Result<(), VaultError> {
        if self.paused.get() {
            return Err(VaultError::Paused);
        }
        self.paused.set(true);
        Ok(())
    }

    /// Unpause operations. Fails if not paused.
    pub fn unpause(&self) -> Result<(), VaultError> {
        if !self.paused.get() {
            return Err(VaultError::NotPaused);
        }
        self.paused.set(false);
        Ok(())
    }

    /// Check if currently paused.
    pub fn is_paused(&self) -> bool {
        self.paused.get()
    }

    /// Fail with [`VaultError::Paused`] while paused.
    pub fn ensure_not_paused(&self) -> Result<(), VaultError> {
        if self.paused.get() {
            return Err(VaultError::Paused);
        }
        Ok(())
    }
}

/// Single-owner access control.
///
/// The owner is the only caller allowed to toggle the pause flag or hand
/// ownership to someone else.
#[derive(Debug)]
pub struct AccessControl {
    owner: Cell<Address>,
}

impl AccessControl {
    /// Create access control with an initial owner.
    pub fn new(owner: Address) -> Result<Self, VaultError> {
        if owner.is_zero() {
            return Err(VaultError::ZeroAddress);
        }
        Ok(Self {
            owner: Cell::new(owner),
        })
    }

    /// Check if a caller is the owner.
    pub fn is_owner(&self, caller: Address) -> bool {
        self.owner.get() == caller
    }

    /// Fail with [`VaultError::Unauthorized`] unless `caller` is the owner.
    pub fn only_owner(&self, caller: Address) -> Result<(), VaultError> {
        if !self.is_owner(caller) {
            return Err(VaultError::Unauthorized);
        }
        Ok(())
    }

    /// Transfer ownership to `new_owner`, returning the previous owner.
    pub fn transfer_ownership(
        &self,
        caller: Address,
        new_owner: Address,
    ) -> Result<Address, VaultError> {
        self.only_owner(caller)?;
        if new_owner.is_zero() {
            return Err(VaultError::ZeroAddress);
        }
        Ok(self.owner.replace(new_owner))
    }

    /// Get the current owner.
    pub fn owner(&self) -> Address {
        self.owner.get()
    }
}
