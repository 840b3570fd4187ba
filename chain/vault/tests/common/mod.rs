//! Shared fixtures for vault integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use share_vault::errors::{LedgerError, VaultError};
use share_vault::ledger::{ClaimLedger, ShareLedger};
use share_vault::transfer::{CallError, CallResult, CollateralToken, InMemoryToken};
use share_vault::{Vault, VaultConfig};
use vault_types::ids::Address;

pub const FUNDING: u128 = 1_000_000_000;

pub fn owner() -> Address {
    Address::from_low_u64(0x0a)
}

pub fn vault_address() -> Address {
    Address::from_low_u64(0x7a17)
}

pub fn alice() -> Address {
    Address::from_low_u64(0xa11ce)
}

pub fn bob() -> Address {
    Address::from_low_u64(0xb0b)
}

pub fn attacker() -> Address {
    Address::from_low_u64(0xbad)
}

/// Give `user` collateral and an unlimited allowance to the vault.
pub fn fund(token: &InMemoryToken, user: Address, amount: u128) {
    token.mint_to(user, amount);
    token.approve(user, vault_address(), u128::MAX);
}

pub fn setup_vault() -> (Vault, Rc<InMemoryToken>) {
    let token = Rc::new(InMemoryToken::new());
    for user in [alice(), bob(), attacker()] {
        fund(&token, user, FUNDING);
    }
    let vault = Vault::new(VaultConfig::new(vault_address(), owner()), token.clone())
        .expect("vault deploys");
    (vault, token)
}

/// Token whose outbound transfers can be switched off.
pub struct FlakyToken {
    pub inner: InMemoryToken,
    pub fail_push: Cell<bool>,
}

impl FlakyToken {
    pub fn new() -> Self {
        Self {
            inner: InMemoryToken::new(),
            fail_push: Cell::new(false),
        }
    }
}

impl CollateralToken for FlakyToken {
    fn transfer(&self, sender: Address, to: Address, amount: u128) -> CallResult {
        if self.fail_push.get() {
            return Err(CallError::Reverted("transfers frozen".to_string()));
        }
        self.inner.transfer(sender, to, amount)
    }

    fn transfer_from(&self, spender: Address, from: Address, to: Address, amount: u128) -> CallResult {
        self.inner.transfer_from(spender, from, to, amount)
    }

    fn balance_of(&self, account: Address) -> u128 {
        self.inner.balance_of(account)
    }
}

/// Which vault entry point a [`ReentrantToken`] calls back into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reentry {
    Deposit,
    Mint,
    Withdraw,
    Redeem,
    Pause,
    TransferOwnership,
}

/// Malicious token that calls back into the vault mid-transfer.
pub struct ReentrantToken {
    pub inner: InMemoryToken,
    pub vault: RefCell<Weak<Vault>>,
    pub reentry: Cell<Option<Reentry>>,
    pub observed: RefCell<Vec<Result<u128, VaultError>>>,
}

impl ReentrantToken {
    pub fn new() -> Self {
        Self {
            inner: InMemoryToken::new(),
            vault: RefCell::new(Weak::new()),
            reentry: Cell::new(None),
            observed: RefCell::new(Vec::new()),
        }
    }

    fn call_back(&self) {
        let Some(reentry) = self.reentry.get() else {
            return;
        };
        let Some(vault) = self.vault.borrow().upgrade() else {
            return;
        };
        let result = match reentry {
            Reentry::Deposit => vault.deposit(attacker(), 5_000, attacker()),
            Reentry::Mint => vault.mint(attacker(), 5_000, attacker()),
            Reentry::Withdraw => vault.withdraw(attacker(), 100, attacker(), attacker()),
            Reentry::Redeem => vault.redeem(attacker(), 100, attacker(), attacker()),
            Reentry::Pause => vault.pause(owner()).map(|()| 0),
            Reentry::TransferOwnership => vault.transfer_ownership(owner(), attacker()).map(|()| 0),
        };
        self.observed.borrow_mut().push(result);
    }
}

impl CollateralToken for ReentrantToken {
    fn transfer(&self, sender: Address, to: Address, amount: u128) -> CallResult {
        self.call_back();
        self.inner.transfer(sender, to, amount)
    }

    fn transfer_from(&self, spender: Address, from: Address, to: Address, amount: u128) -> CallResult {
        self.call_back();
        self.inner.transfer_from(spender, from, to, amount)
    }

    fn balance_of(&self, account: Address) -> u128 {
        self.inner.balance_of(account)
    }
}

/// Deploy a vault over a [`ReentrantToken`] that knows the vault's handle.
pub fn setup_reentrant_vault() -> (Rc<Vault>, Rc<ReentrantToken>) {
    let token = Rc::new(ReentrantToken::new());
    for user in [alice(), bob(), attacker()] {
        fund(&token.inner, user, FUNDING);
    }
    let vault = Rc::new(
        Vault::new(VaultConfig::new(vault_address(), owner()), token.clone())
            .expect("vault deploys"),
    );
    *token.vault.borrow_mut() = Rc::downgrade(&vault);
    (vault, token)
}

/// Claim ledger that refuses to credit one account.
#[derive(Debug, Clone, Default)]
pub struct RefusingLedger {
    pub inner: ClaimLedger,
    pub refused: Option<Address>,
}

impl ShareLedger for RefusingLedger {
    fn total_supply(&self) -> u128 {
        self.inner.total_supply()
    }

    fn balance_of(&self, account: Address) -> u128 {
        self.inner.balance_of(account)
    }

    fn allowance(&self, owner: Address, spender: Address) -> u128 {
        self.inner.allowance(owner, spender)
    }

    fn approve(&mut self, owner: Address, spender: Address, amount: u128) -> Result<(), LedgerError> {
        self.inner.approve(owner, spender, amount)
    }

    fn transfer(&mut self, from: Address, to: Address, amount: u128) -> Result<(), LedgerError> {
        self.inner.transfer(from, to, amount)
    }

    fn spend_allowance(&mut self, owner: Address, spender: Address, amount: u128) -> Result<(), LedgerError> {
        self.inner.spend_allowance(owner, spender, amount)
    }

    fn mint(&mut self, to: Address, amount: u128) -> Result<(), LedgerError> {
        if self.refused == Some(to) {
            return Err(LedgerError::ZeroAddress);
        }
        self.inner.mint(to, amount)
    }

    fn burn(&mut self, from: Address, amount: u128) -> Result<(), LedgerError> {
        self.inner.burn(from, amount)
    }
}
