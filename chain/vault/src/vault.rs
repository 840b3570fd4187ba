//! Vault: share issuance, redemption and the guarded transitions
//!
//! Four operations mutate the vault: `deposit`, `mint`, `withdraw` and
//! `redeem`. Each runs as one transaction:
//!
//! 1. Reentrancy lock acquired (held until return, on every path)
//! 2. Pause flag and arguments checked
//! 3. Packed state read once, amounts computed, new state written once
//! 4. Event recorded
//! 5. Claims spent/burned and collateral moved through the external token
//!
//! If any step fails, the packed state and the event log are restored to
//! their values before the call, and the claim-ledger steps already applied
//! are undone in reverse order. Admin actions take the same lock, so a token
//! callback cannot pause the vault or change its owner mid-transition.

use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};
use vault_types::ids::Address;
use vault_types::numeric::u96_headroom;

use crate::config::VaultConfig;
use crate::errors::{SnapshotError, VaultError};
use crate::events::{
    Deposit, OwnershipTransferred, Paused, Unpaused, VaultEvent, Withdraw,
};
use crate::ledger::{ClaimLedger, ShareLedger};
use crate::math::{self, Rounding};
use crate::packed::PackedState;
use crate::security::{AccessControl, PauseGuard, ReentrancyGuard};
use crate::snapshot::{VaultSnapshot, SNAPSHOT_VERSION};
use crate::transfer::{self, CollateralToken};
use crate::{DEAD_CLAIMS_SINK, MINIMUM_LIQUIDITY};

/// Share vault over one collateral token.
///
/// The API takes `&self`: state lives behind interior mutability so that the
/// collateral token, which may hold a handle to the vault, can attempt a
/// nested call during a transfer. The reentrancy guard rejects it.
pub struct Vault<L: ShareLedger = ClaimLedger> {
    /// The vault's own address; collateral is held here
    address: Address,
    name: String,
    symbol: String,
    /// Packed `(deposited, claims)` word
    state: Cell<PackedState>,
    /// Claim-token bookkeeping
    ledger: RefCell<L>,
    /// External collateral token
    asset: Rc<dyn CollateralToken>,
    /// Security: reentrancy guard
    reentrancy_guard: ReentrancyGuard,
    /// Security: pause guard
    pause_guard: PauseGuard,
    /// Security: owner access control
    access_control: AccessControl,
    /// Emitted events log (append-only outside rollbacks)
    events: RefCell<Vec<VaultEvent>>,
    /// Ledger steps applied by the running transition
    journal: RefCell<Vec<LedgerStep>>,
}

/// Values restored when a transition aborts.
struct Checkpoint {
    state: PackedState,
    events: usize,
}

/// A claim-ledger mutation and what it takes to undo it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LedgerStep {
    Minted { to: Address, amount: u128 },
    Burned { from: Address, amount: u128 },
    AllowanceSpent { owner: Address, spender: Address, previous: u128 },
}

impl<L: ShareLedger + Default> Vault<L> {
    /// Deploy a vault with zeroed state and an empty claim ledger.
    pub fn new(config: VaultConfig, asset: Rc<dyn CollateralToken>) -> Result<Self, VaultError> {
        if config.address.is_zero() {
            return Err(VaultError::ZeroAddress);
        }
        let access_control = AccessControl::new(config.owner)?;
        info!(
            vault = %config.address,
            owner = %config.owner,
            name = %config.name,
            symbol = %config.symbol,
            paused = config.start_paused,
            "Vault deployed"
        );
        Ok(Self {
            address: config.address,
            name: config.name,
            symbol: config.symbol,
            state: Cell::new(PackedState::empty()),
            ledger: RefCell::new(L::default()),
            asset,
            reentrancy_guard: ReentrancyGuard::new(),
            pause_guard: PauseGuard::new(config.start_paused),
            access_control,
            events: RefCell::new(Vec::new()),
            journal: RefCell::new(Vec::new()),
        })
    }
}

impl<L: ShareLedger> Vault<L> {
    /// Rebuild a vault from a snapshot and the claim ledger it was taken with.
    pub fn restore(
        address: Address,
        snapshot: VaultSnapshot,
        ledger: L,
        asset: Rc<dyn CollateralToken>,
    ) -> Result<Self, SnapshotError> {
        if address.is_zero() {
            return Err(SnapshotError::ZeroAddress);
        }
        snapshot.validate(&ledger)?;
        let access_control =
            AccessControl::new(snapshot.owner).map_err(|_| SnapshotError::ZeroAddress)?;
        info!(
            vault = %address,
            commitment = %snapshot.commitment_hex(),
            "Vault restored from snapshot"
        );
        Ok(Self {
            address,
            name: snapshot.name,
            symbol: snapshot.symbol,
            state: Cell::new(snapshot.state),
            ledger: RefCell::new(ledger),
            asset,
            reentrancy_guard: ReentrancyGuard::new(),
            pause_guard: PauseGuard::new(snapshot.paused),
            access_control,
            events: RefCell::new(Vec::new()),
            journal: RefCell::new(Vec::new()),
        })
    }

    /// Capture the persisted state.
    pub fn snapshot(&self) -> VaultSnapshot {
        VaultSnapshot {
            version: SNAPSHOT_VERSION,
            state: self.state.get(),
            paused: self.pause_guard.is_paused(),
            owner: self.access_control.owner(),
            name: self.name.clone(),
            symbol: self.symbol.clone(),
        }
    }

    // ───────────────────────── Transitions ─────────────────────────

    /// Deposit exactly `assets` collateral from `caller`, issuing claims to
    /// `receiver`. Returns the shares issued.
    pub fn deposit(&self, caller: Address, assets: u128, receiver: Address) -> Result<u128, VaultError> {
        self.transact("deposit", || {
            self.pause_guard.ensure_not_paused()?;
            if assets == 0 {
                return Err(VaultError::ZeroAmount);
            }
            if receiver.is_zero() {
                return Err(VaultError::ZeroAddress);
            }

            let state = self.state.get();
            let (deposited, claims) = state.load();
            let bootstrap = state.is_bootstrap();
            let mut next = state;
            let shares = if bootstrap {
                if assets <= MINIMUM_LIQUIDITY {
                    return Err(VaultError::InsufficientShares);
                }
                // Residual collateral left with no claims stays on the books.
                next.store(add_within_cap(deposited, assets)?, assets)?;
                assets - MINIMUM_LIQUIDITY
            } else {
                let shares = math::to_claims(state, assets, Rounding::Down)?;
                if shares == 0 {
                    return Err(VaultError::InsufficientShares);
                }
                next.store(
                    add_within_cap(deposited, assets)?,
                    add_within_cap(claims, shares)?,
                )?;
                shares
            };

            self.state.set(next);
            self.emit(VaultEvent::Deposit(Deposit {
                caller,
                receiver,
                assets,
                shares,
            }));

            transfer::pull(self.asset.as_ref(), self.address, caller, assets)?;
            if let Err(err) = self.issue(receiver, shares, bootstrap) {
                self.refund(caller, assets);
                return Err(err);
            }

            debug!(
                caller = %caller,
                receiver = %receiver,
                assets,
                shares,
                bootstrap,
                "Deposit committed"
            );
            Ok(shares)
        })
    }

    /// Issue exactly `shares` claims to `receiver`, pulling whatever
    /// collateral they cost from `caller`. Returns the assets pulled.
    pub fn mint(&self, caller: Address, shares: u128, receiver: Address) -> Result<u128, VaultError> {
        self.transact("mint", || {
            self.pause_guard.ensure_not_paused()?;
            if shares == 0 {
                return Err(VaultError::ZeroAmount);
            }
            if receiver.is_zero() {
                return Err(VaultError::ZeroAddress);
            }

            let state = self.state.get();
            let (deposited, claims) = state.load();
            let bootstrap = state.is_bootstrap();
            let mut next = state;
            let assets = if bootstrap {
                let assets = shares
                    .checked_add(MINIMUM_LIQUIDITY)
                    .ok_or(VaultError::CapacityExceeded)?;
                next.store(add_within_cap(deposited, assets)?, assets)?;
                assets
            } else {
                let assets = math::to_assets(state, shares, Rounding::Ceil)?;
                next.store(
                    add_within_cap(deposited, assets)?,
                    add_within_cap(claims, shares)?,
                )?;
                assets
            };

            self.state.set(next);
            self.emit(VaultEvent::Deposit(Deposit {
                caller,
                receiver,
                assets,
                shares,
            }));

            transfer::pull(self.asset.as_ref(), self.address, caller, assets)?;
            if let Err(err) = self.issue(receiver, shares, bootstrap) {
                self.refund(caller, assets);
                return Err(err);
            }

            debug!(
                caller = %caller,
                receiver = %receiver,
                assets,
                shares,
                bootstrap,
                "Mint committed"
            );
            Ok(assets)
        })
    }

    /// Release exactly `assets` collateral to `receiver`, burning whatever
    /// claims they cost from `owner`. Returns the shares burned.
    pub fn withdraw(
        &self,
        caller: Address,
        assets: u128,
        receiver: Address,
        owner: Address,
    ) -> Result<u128, VaultError> {
        self.transact("withdraw", || {
            self.check_exit(assets, receiver, owner)?;

            let state = self.state.get();
            let (deposited, claims) = state.load();
            if assets > deposited {
                return Err(VaultError::InsufficientAssets);
            }
            let shares = math::to_claims(state, assets, Rounding::Up)?;
            if shares == 0 {
                return Err(VaultError::InsufficientShares);
            }
            let remaining_claims = claims
                .checked_sub(shares)
                .ok_or(VaultError::InsufficientShares)?;

            let mut next = state;
            next.store(deposited - assets, remaining_claims)?;
            self.state.set(next);
            self.emit(VaultEvent::Withdraw(Withdraw {
                caller,
                receiver,
                owner,
                assets,
                shares,
            }));

            self.retire(caller, owner, shares)?;
            transfer::push(self.asset.as_ref(), self.address, receiver, assets)?;

            debug!(
                caller = %caller,
                receiver = %receiver,
                owner = %owner,
                assets,
                shares,
                "Withdraw committed"
            );
            Ok(shares)
        })
    }

    /// Burn exactly `shares` claims from `owner`, releasing their collateral
    /// to `receiver`. Returns the assets released.
    pub fn redeem(
        &self,
        caller: Address,
        shares: u128,
        receiver: Address,
        owner: Address,
    ) -> Result<u128, VaultError> {
        self.transact("redeem", || {
            self.check_exit(shares, receiver, owner)?;

            let state = self.state.get();
            let (deposited, claims) = state.load();
            if shares > claims {
                return Err(VaultError::InsufficientShares);
            }
            let assets = math::to_assets(state, shares, Rounding::Down)?;
            if assets == 0 {
                return Err(VaultError::InsufficientAssets);
            }
            let remaining_assets = deposited
                .checked_sub(assets)
                .ok_or(VaultError::InsufficientAssets)?;

            let mut next = state;
            next.store(remaining_assets, claims - shares)?;
            self.state.set(next);
            self.emit(VaultEvent::Withdraw(Withdraw {
                caller,
                receiver,
                owner,
                assets,
                shares,
            }));

            self.retire(caller, owner, shares)?;
            transfer::push(self.asset.as_ref(), self.address, receiver, assets)?;

            debug!(
                caller = %caller,
                receiver = %receiver,
                owner = %owner,
                assets,
                shares,
                "Redeem committed"
            );
            Ok(assets)
        })
    }

    // ───────────────────────── Views ─────────────────────────

    /// Collateral the vault accounts for. Direct transfers to the vault
    /// address are not counted.
    pub fn total_assets(&self) -> u128 {
        self.state.get().deposited()
    }

    pub fn total_claims(&self) -> u128 {
        self.state.get().claims()
    }

    /// Current packed state.
    pub fn state(&self) -> PackedState {
        self.state.get()
    }

    pub fn convert_to_shares(&self, assets: u128) -> Result<u128, VaultError> {
        math::to_claims(self.state.get(), assets, Rounding::Down)
    }

    pub fn convert_to_assets(&self, shares: u128) -> Result<u128, VaultError> {
        math::to_assets(self.state.get(), shares, Rounding::Down)
    }

    pub fn preview_deposit(&self, assets: u128) -> Result<u128, VaultError> {
        math::preview_deposit(self.state.get(), assets)
    }

    pub fn preview_mint(&self, shares: u128) -> Result<u128, VaultError> {
        math::preview_mint(self.state.get(), shares)
    }

    pub fn preview_withdraw(&self, assets: u128) -> Result<u128, VaultError> {
        math::preview_withdraw(self.state.get(), assets)
    }

    pub fn preview_redeem(&self, shares: u128) -> Result<u128, VaultError> {
        math::preview_redeem(self.state.get(), shares)
    }

    /// Collateral still depositable before the 96-bit cap. Zero while paused.
    pub fn max_deposit(&self, _receiver: Address) -> u128 {
        if self.pause_guard.is_paused() {
            return 0;
        }
        u96_headroom(self.state.get().deposited())
    }

    /// Claims still mintable before the 96-bit cap. Zero while paused.
    pub fn max_mint(&self, _receiver: Address) -> u128 {
        if self.pause_guard.is_paused() {
            return 0;
        }
        u96_headroom(self.state.get().claims())
    }

    /// Largest `withdraw` `owner` can currently make. Zero while paused.
    pub fn max_withdraw(&self, owner: Address) -> u128 {
        if self.pause_guard.is_paused() || owner == DEAD_CLAIMS_SINK {
            return 0;
        }
        math::max_withdrawable(self.state.get(), self.balance_of(owner))
    }

    /// Largest `redeem` `owner` can currently make. Zero while paused.
    pub fn max_redeem(&self, owner: Address) -> u128 {
        if self.pause_guard.is_paused() || owner == DEAD_CLAIMS_SINK {
            return 0;
        }
        self.balance_of(owner)
    }

    /// Collateral per claim, `None` before the first issuance.
    pub fn share_price(&self) -> Option<Decimal> {
        let (deposited, claims) = self.state.get().load();
        if claims == 0 {
            return None;
        }
        let deposited = Decimal::try_from_i128_with_scale(i128::try_from(deposited).ok()?, 0).ok()?;
        let claims = Decimal::try_from_i128_with_scale(i128::try_from(claims).ok()?, 0).ok()?;
        deposited.checked_div(claims)
    }

    /// Whether the collateral actually held covers the tracked total.
    pub fn is_solvent(&self) -> bool {
        self.asset.balance_of(self.address) >= self.total_assets()
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// The collateral token.
    pub fn asset(&self) -> &Rc<dyn CollateralToken> {
        &self.asset
    }

    // ───────────────────────── Claim Token ─────────────────────────

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn total_supply(&self) -> u128 {
        self.ledger.borrow().total_supply()
    }

    pub fn balance_of(&self, account: Address) -> u128 {
        self.ledger.borrow().balance_of(account)
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> u128 {
        self.ledger.borrow().allowance(owner, spender)
    }

    /// Read access to the claim ledger.
    pub fn ledger(&self) -> Ref<'_, L> {
        self.ledger.borrow()
    }

    /// Let `spender` withdraw/redeem up to `amount` of `caller`'s claims.
    pub fn approve(&self, caller: Address, spender: Address, amount: u128) -> Result<(), VaultError> {
        self.transact("approve", || {
            self.ledger.borrow_mut().approve(caller, spender, amount)?;
            Ok(())
        })
    }

    /// Move claims from `caller` to `to`. The dead-claims sink cannot send.
    pub fn transfer(&self, caller: Address, to: Address, amount: u128) -> Result<(), VaultError> {
        self.transact("transfer", || {
            if caller == DEAD_CLAIMS_SINK {
                return Err(VaultError::Unauthorized);
            }
            self.ledger.borrow_mut().transfer(caller, to, amount)?;
            Ok(())
        })
    }

    // ───────────────────────── Admin ─────────────────────────

    /// Halt mutating operations. Owner-only.
    pub fn pause(&self, caller: Address) -> Result<(), VaultError> {
        self.transact("pause", || {
            self.access_control.only_owner(caller)?;
            self.pause_guard.pause()?;
            self.emit(VaultEvent::Paused(Paused { account: caller }));
            info!(caller = %caller, "Vault paused");
            Ok(())
        })
    }

    /// Resume mutating operations. Owner-only.
    pub fn unpause(&self, caller: Address) -> Result<(), VaultError> {
        self.transact("unpause", || {
            self.access_control.only_owner(caller)?;
            self.pause_guard.unpause()?;
            self.emit(VaultEvent::Unpaused(Unpaused { account: caller }));
            info!(caller = %caller, "Vault unpaused");
            Ok(())
        })
    }

    pub fn paused(&self) -> bool {
        self.pause_guard.is_paused()
    }

    /// Hand admin rights to `new_owner`. Owner-only.
    pub fn transfer_ownership(&self, caller: Address, new_owner: Address) -> Result<(), VaultError> {
        self.transact("transfer_ownership", || {
            let previous_owner = self.access_control.transfer_ownership(caller, new_owner)?;
            self.emit(VaultEvent::OwnershipTransferred(OwnershipTransferred {
                previous_owner,
                new_owner,
            }));
            info!(previous = %previous_owner, new = %new_owner, "Ownership transferred");
            Ok(())
        })
    }

    pub fn owner(&self) -> Address {
        self.access_control.owner()
    }

    // ───────────────────────── Events ─────────────────────────

    /// All emitted events.
    pub fn events(&self) -> Vec<VaultEvent> {
        self.events.borrow().clone()
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&self) -> Vec<VaultEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    // ───────────────────────── Internals ─────────────────────────

    /// Run `body` under the reentrancy lock, rolling back on failure.
    ///
    /// On error the packed word and event log return to the checkpoint and
    /// the journaled ledger steps are undone newest first.
    fn transact<T>(
        &self,
        op: &'static str,
        body: impl FnOnce() -> Result<T, VaultError>,
    ) -> Result<T, VaultError> {
        let _lock = self.reentrancy_guard.enter().map_err(|err| {
            warn!(op, "Reentrant call rejected");
            err
        })?;
        let checkpoint = self.checkpoint();
        let result = body();
        if let Err(err) = &result {
            debug!(op, error = %err, "Transition aborted, rolling back");
            self.rollback(checkpoint);
        }
        self.journal.borrow_mut().clear();
        result
    }

    fn checkpoint(&self) -> Checkpoint {
        self.journal.borrow_mut().clear();
        Checkpoint {
            state: self.state.get(),
            events: self.events.borrow().len(),
        }
    }

    fn rollback(&self, checkpoint: Checkpoint) {
        self.state.set(checkpoint.state);
        self.events.borrow_mut().truncate(checkpoint.events);

        let steps = std::mem::take(&mut *self.journal.borrow_mut());
        let mut ledger = self.ledger.borrow_mut();
        for step in steps.into_iter().rev() {
            let undone = match step {
                LedgerStep::Minted { to, amount } => ledger.burn(to, amount),
                LedgerStep::Burned { from, amount } => ledger.mint(from, amount),
                LedgerStep::AllowanceSpent {
                    owner,
                    spender,
                    previous,
                } => ledger.approve(owner, spender, previous),
            };
            if let Err(err) = undone {
                error!(?step, error = %err, "Failed to undo claim ledger step");
            }
        }
    }

    fn record(&self, step: LedgerStep) {
        self.journal.borrow_mut().push(step);
    }

    fn emit(&self, event: VaultEvent) {
        self.events.borrow_mut().push(event);
    }

    /// Argument checks shared by `withdraw` and `redeem`.
    fn check_exit(&self, amount: u128, receiver: Address, owner: Address) -> Result<(), VaultError> {
        self.pause_guard.ensure_not_paused()?;
        if amount == 0 {
            return Err(VaultError::ZeroAmount);
        }
        if receiver.is_zero() || owner.is_zero() {
            return Err(VaultError::ZeroAddress);
        }
        if owner == DEAD_CLAIMS_SINK {
            return Err(VaultError::Unauthorized);
        }
        Ok(())
    }

    /// Credit newly issued claims; on bootstrap the dead claims go first.
    fn issue(&self, receiver: Address, shares: u128, bootstrap: bool) -> Result<(), VaultError> {
        if bootstrap {
            self.mint_claims(DEAD_CLAIMS_SINK, MINIMUM_LIQUIDITY)?;
        }
        self.mint_claims(receiver, shares)
    }

    /// Spend the caller's allowance if acting for someone else, then burn.
    fn retire(&self, caller: Address, owner: Address, shares: u128) -> Result<(), VaultError> {
        if caller != owner {
            let previous = {
                let mut ledger = self.ledger.borrow_mut();
                let previous = ledger.allowance(owner, caller);
                ledger.spend_allowance(owner, caller, shares)?;
                previous
            };
            self.record(LedgerStep::AllowanceSpent {
                owner,
                spender: caller,
                previous,
            });
        }
        self.ledger.borrow_mut().burn(owner, shares)?;
        self.record(LedgerStep::Burned {
            from: owner,
            amount: shares,
        });
        Ok(())
    }

    fn mint_claims(&self, to: Address, amount: u128) -> Result<(), VaultError> {
        self.ledger.borrow_mut().mint(to, amount)?;
        self.record(LedgerStep::Minted { to, amount });
        Ok(())
    }

    /// Return pulled collateral after a later step failed.
    fn refund(&self, to: Address, amount: u128) {
        if let Err(err) = transfer::push(self.asset.as_ref(), self.address, to, amount) {
            error!(to = %to, amount, error = %err, "Refund of pulled collateral failed");
        }
    }
}

impl<L: ShareLedger + fmt::Debug> fmt::Debug for Vault<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vault")
            .field("address", &self.address)
            .field("state", &self.state.get())
            .field("paused", &self.pause_guard.is_paused())
            .field("owner", &self.access_control.owner())
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}

fn add_within_cap(current: u128, amount: u128) -> Result<u128, VaultError> {
    current
        .checked_add(amount)
        .ok_or(VaultError::CapacityExceeded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::InMemoryToken;

    fn owner() -> Address {
        Address::from_low_u64(0x0a)
    }

    fn vault_address() -> Address {
        Address::from_low_u64(0x7a17)
    }

    fn alice() -> Address {
        Address::from_low_u64(0xa11ce)
    }

    fn bob() -> Address {
        Address::from_low_u64(0xb0b)
    }

    fn setup_vault() -> (Vault, Rc<InMemoryToken>) {
        let token = Rc::new(InMemoryToken::new());
        let vault = Vault::new(VaultConfig::new(vault_address(), owner()), token.clone()).unwrap();
        for user in [alice(), bob()] {
            token.mint_to(user, 1_000_000);
            token.approve(user, vault_address(), u128::MAX);
        }
        (vault, token)
    }

    // ─── Deployment ───

    #[test]
    fn test_new_rejects_zero_addresses() {
        let token: Rc<dyn CollateralToken> = Rc::new(InMemoryToken::new());
        let err = Vault::<ClaimLedger>::new(VaultConfig::new(Address::ZERO, owner()), token.clone())
            .unwrap_err();
        assert_eq!(err, VaultError::ZeroAddress);
        let err = Vault::<ClaimLedger>::new(VaultConfig::new(vault_address(), Address::ZERO), token)
            .unwrap_err();
        assert_eq!(err, VaultError::ZeroAddress);
    }

    #[test]
    fn test_new_vault_is_zeroed() {
        let (vault, _) = setup_vault();
        assert_eq!(vault.state().load(), (0, 0));
        assert_eq!(vault.total_supply(), 0);
        assert_eq!(vault.share_price(), None);
        assert!(!vault.paused());
        assert_eq!(vault.name(), "Vault Shares");
    }

    // ─── Deposit ───

    #[test]
    fn test_bootstrap_deposit() {
        let (vault, token) = setup_vault();
        let shares = vault.deposit(alice(), 10_000, alice()).unwrap();

        assert_eq!(shares, 9_000);
        assert_eq!(vault.balance_of(alice()), 9_000);
        assert_eq!(vault.balance_of(DEAD_CLAIMS_SINK), MINIMUM_LIQUIDITY);
        assert_eq!(vault.state().load(), (10_000, 10_000));
        assert_eq!(token.balance_of(vault_address()), 10_000);
    }

    #[test]
    fn test_bootstrap_deposit_too_small() {
        let (vault, token) = setup_vault();
        assert_eq!(
            vault.deposit(alice(), MINIMUM_LIQUIDITY, alice()),
            Err(VaultError::InsufficientShares)
        );
        assert_eq!(vault.state().load(), (0, 0));
        assert_eq!(token.balance_of(vault_address()), 0);
    }

    #[test]
    fn test_second_deposit_one_to_one() {
        let (vault, _) = setup_vault();
        vault.deposit(alice(), 10_000, alice()).unwrap();
        assert_eq!(vault.deposit(bob(), 10_000, bob()), Ok(10_000));
        assert_eq!(vault.state().load(), (20_000, 20_000));
    }

    #[test]
    fn test_deposit_zero_checks() {
        let (vault, _) = setup_vault();
        assert_eq!(vault.deposit(alice(), 0, alice()), Err(VaultError::ZeroAmount));
        assert_eq!(
            vault.deposit(alice(), 10_000, Address::ZERO),
            Err(VaultError::ZeroAddress)
        );
    }

    #[test]
    fn test_deposit_without_collateral_rolls_back() {
        let (vault, _) = setup_vault();
        let poor = Address::from_low_u64(0xdeadbeef);
        assert_eq!(
            vault.deposit(poor, 10_000, poor),
            Err(VaultError::TransferFailed)
        );
        assert_eq!(vault.state().load(), (0, 0));
        assert!(vault.events().is_empty());
        assert_eq!(vault.total_supply(), 0);
    }

    // ─── Mint ───

    #[test]
    fn test_bootstrap_mint() {
        let (vault, token) = setup_vault();
        let assets = vault.mint(alice(), 9_000, alice()).unwrap();
        assert_eq!(assets, 10_000);
        assert_eq!(vault.state().load(), (10_000, 10_000));
        assert_eq!(vault.balance_of(alice()), 9_000);
        assert_eq!(token.balance_of(alice()), 990_000);
    }

    #[test]
    fn test_mint_rounds_up() {
        let (vault, _) = setup_vault();
        vault.deposit(alice(), 10_000, alice()).unwrap();
        // exact rate: no surcharge
        assert_eq!(vault.mint(bob(), 100, bob()), Ok(100));
        assert_eq!(vault.state().load(), (10_100, 10_100));

        vault.withdraw(alice(), 5_100, alice(), alice()).unwrap();
        assert_eq!(vault.state().load(), (5_000, 4_999));
        assert_eq!(vault.mint(bob(), 100, bob()), Ok(101));
        assert_eq!(vault.state().load(), (5_101, 5_099));
    }

    // ─── Withdraw / Redeem ───

    #[test]
    fn test_withdraw_burns_rounded_up() {
        let (vault, token) = setup_vault();
        vault.deposit(alice(), 10_000, alice()).unwrap();

        let shares = vault.withdraw(alice(), 5_000, alice(), alice()).unwrap();
        assert_eq!(shares, 5_001);
        assert_eq!(vault.state().load(), (5_000, 4_999));
        assert_eq!(vault.balance_of(alice()), 3_999);
        assert_eq!(token.balance_of(alice()), 995_000);
    }

    #[test]
    fn test_withdraw_more_than_deposited() {
        let (vault, _) = setup_vault();
        vault.deposit(alice(), 10_000, alice()).unwrap();
        assert_eq!(
            vault.withdraw(alice(), 10_001, alice(), alice()),
            Err(VaultError::InsufficientAssets)
        );
    }

    #[test]
    fn test_redeem_all_but_dead_claims() {
        let (vault, token) = setup_vault();
        vault.deposit(alice(), 10_000, alice()).unwrap();

        let assets = vault.redeem(alice(), 9_000, alice(), alice()).unwrap();
        assert_eq!(assets, 9_000);
        assert_eq!(vault.state().load(), (1_000, 1_000));
        assert_eq!(vault.balance_of(DEAD_CLAIMS_SINK), MINIMUM_LIQUIDITY);
        assert_eq!(token.balance_of(alice()), 999_000);
    }

    #[test]
    fn test_redeem_more_than_supply() {
        let (vault, _) = setup_vault();
        vault.deposit(alice(), 10_000, alice()).unwrap();
        assert_eq!(
            vault.redeem(alice(), 10_001, alice(), alice()),
            Err(VaultError::InsufficientShares)
        );
    }

    #[test]
    fn test_redeem_on_behalf_requires_allowance() {
        let (vault, _) = setup_vault();
        vault.deposit(alice(), 10_000, alice()).unwrap();

        let err = vault.redeem(bob(), 100, bob(), alice()).unwrap_err();
        assert!(matches!(
            err,
            VaultError::Ledger(crate::errors::LedgerError::InsufficientAllowance { .. })
        ));
        assert_eq!(vault.state().load(), (10_000, 10_000));

        vault.approve(alice(), bob(), 100).unwrap();
        assert_eq!(vault.redeem(bob(), 100, bob(), alice()), Ok(100));
        assert_eq!(vault.allowance(alice(), bob()), 0);
    }

    #[test]
    fn test_dead_sink_cannot_exit() {
        let (vault, _) = setup_vault();
        vault.deposit(alice(), 10_000, alice()).unwrap();
        assert_eq!(
            vault.redeem(DEAD_CLAIMS_SINK, 1_000, alice(), DEAD_CLAIMS_SINK),
            Err(VaultError::Unauthorized)
        );
        assert_eq!(
            vault.transfer(DEAD_CLAIMS_SINK, alice(), 1_000),
            Err(VaultError::Unauthorized)
        );
        assert_eq!(vault.max_redeem(DEAD_CLAIMS_SINK), 0);
    }

    // ─── Views ───

    #[test]
    fn test_max_views_follow_pause() {
        let (vault, _) = setup_vault();
        vault.deposit(alice(), 10_000, alice()).unwrap();
        assert_eq!(vault.max_redeem(alice()), 9_000);
        assert_eq!(vault.max_withdraw(alice()), 8_999);
        assert_eq!(vault.max_deposit(alice()), crate::packed::CAP - 10_000);
        assert_eq!(vault.max_mint(alice()), crate::packed::CAP - 10_000);

        vault.pause(owner()).unwrap();
        assert_eq!(vault.max_deposit(alice()), 0);
        assert_eq!(vault.max_mint(alice()), 0);
        assert_eq!(vault.max_withdraw(alice()), 0);
        assert_eq!(vault.max_redeem(alice()), 0);
    }

    #[test]
    fn test_share_price() {
        let (vault, _) = setup_vault();
        vault.deposit(alice(), 10_000, alice()).unwrap();
        assert_eq!(vault.share_price(), Some(Decimal::ONE));
        vault.withdraw(alice(), 5_000, alice(), alice()).unwrap();
        assert!(vault.share_price().unwrap() > Decimal::ONE);
    }

    // ─── Admin ───

    #[test]
    fn test_pause_blocks_transitions() {
        let (vault, _) = setup_vault();
        vault.deposit(alice(), 10_000, alice()).unwrap();
        vault.pause(owner()).unwrap();

        assert_eq!(vault.deposit(alice(), 1, alice()), Err(VaultError::Paused));
        assert_eq!(vault.mint(alice(), 1, alice()), Err(VaultError::Paused));
        assert_eq!(
            vault.withdraw(alice(), 1, alice(), alice()),
            Err(VaultError::Paused)
        );
        assert_eq!(
            vault.redeem(alice(), 1, alice(), alice()),
            Err(VaultError::Paused)
        );

        vault.unpause(owner()).unwrap();
        assert!(vault.deposit(alice(), 1_000, alice()).is_ok());
    }

    #[test]
    fn test_pause_unauthorized() {
        let (vault, _) = setup_vault();
        assert_eq!(vault.pause(alice()), Err(VaultError::Unauthorized));
        assert!(!vault.paused());
    }

    #[test]
    fn test_transfer_ownership() {
        let (vault, _) = setup_vault();
        vault.transfer_ownership(owner(), bob()).unwrap();
        assert_eq!(vault.owner(), bob());
        assert_eq!(vault.pause(owner()), Err(VaultError::Unauthorized));
        vault.pause(bob()).unwrap();
        assert_eq!(
            vault.transfer_ownership(bob(), Address::ZERO),
            Err(VaultError::ZeroAddress)
        );
    }

    // ─── Events ───

    #[test]
    fn test_events_emitted() {
        let (vault, _) = setup_vault();
        vault.deposit(alice(), 10_000, alice()).unwrap();
        vault.redeem(alice(), 1_000, bob(), alice()).unwrap();
        vault.pause(owner()).unwrap();

        let events = vault.drain_events();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0],
            VaultEvent::Deposit(Deposit {
                caller: alice(),
                receiver: alice(),
                assets: 10_000,
                shares: 9_000,
            })
        );
        assert_eq!(
            events[1],
            VaultEvent::Withdraw(Withdraw {
                caller: alice(),
                receiver: bob(),
                owner: alice(),
                assets: 1_000,
                shares: 1_000,
            })
        );
        assert!(matches!(events[2], VaultEvent::Paused(_)));
        assert!(vault.events().is_empty());
    }

    // ─── Snapshot ───

    #[test]
    fn test_snapshot_restore_round_trip() {
        let (vault, token) = setup_vault();
        vault.deposit(alice(), 10_000, alice()).unwrap();
        vault.pause(owner()).unwrap();

        let snapshot = vault.snapshot();
        let ledger = vault.ledger().clone();
        let restored =
            Vault::restore(vault_address(), snapshot.clone(), ledger, token.clone()).unwrap();

        assert_eq!(restored.state(), vault.state());
        assert!(restored.paused());
        assert_eq!(restored.owner(), owner());
        assert_eq!(restored.balance_of(alice()), 9_000);
        assert_eq!(restored.snapshot().commitment(), snapshot.commitment());
    }

    #[test]
    fn test_restore_rejects_foreign_ledger() {
        let (vault, token) = setup_vault();
        vault.deposit(alice(), 10_000, alice()).unwrap();
        let err = Vault::restore(vault_address(), vault.snapshot(), ClaimLedger::new(), token)
            .unwrap_err();
        assert_eq!(
            err,
            SnapshotError::SupplyMismatch {
                claims: 10_000,
                supply: 0
            }
        );
    }
}
