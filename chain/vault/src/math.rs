//! Share conversion arithmetic
//!
//! Pure functions mapping collateral to claims and back for a given
//! [`PackedState`]. Every product is formed in a 256-bit intermediate before
//! dividing, so no precision is lost and 96-bit operands never overflow the
//! multiplication.
//!
//! ## Rounding (always favors the pool)
//!
//! | Operation | Convert          | Rounding | Reason                          |
//! |-----------|------------------|----------|---------------------------------|
//! | deposit   | assets → shares  | Down     | depositor receives fewer shares |
//! | mint      | shares → assets  | Ceil     | minter never pays less than fair |
//! | withdraw  | assets → shares  | Up       | withdrawer burns more shares    |
//! | redeem    | shares → assets  | Down     | redeemer receives less          |
//!
//! `Up` is strict: it lands one unit above the floor quotient even when the
//! division is exact, so a withdrawal always burns past the boundary.
//! `Ceil` adds the unit only when the division leaves a remainder, so a
//! minter at an exact rate pays exactly the fair price.

use uint::construct_uint;

use crate::errors::VaultError;
use crate::packed::PackedState;
use crate::MINIMUM_LIQUIDITY;

construct_uint! {
    /// 256-bit unsigned intermediate for multiply-then-divide.
    pub struct U256(4);
}

/// Rounding direction applied at a conversion call-site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Floor of the exact quotient.
    Down,
    /// Floor of the exact quotient plus one.
    Up,
    /// Smallest integer not below the exact quotient.
    Ceil,
}

/// `a * b / denominator` with the requested rounding.
///
/// Fails with [`VaultError::Overflow`] on a zero denominator or when the
/// result does not fit in 128 bits.
pub fn mul_div(a: u128, b: u128, denominator: u128, rounding: Rounding) -> Result<u128, VaultError> {
    if denominator == 0 {
        return Err(VaultError::Overflow);
    }
    let product = U256::from(a)
        .checked_mul(U256::from(b))
        .ok_or(VaultError::Overflow)?;
    let denominator = U256::from(denominator);
    let mut quotient = product / denominator;
    let bump = match rounding {
        Rounding::Down => false,
        Rounding::Up => true,
        Rounding::Ceil => !(product % denominator).is_zero(),
    };
    if bump {
        quotient = quotient
            .checked_add(U256::one())
            .ok_or(VaultError::Overflow)?;
    }
    if quotient > U256::from(u128::MAX) {
        return Err(VaultError::Overflow);
    }
    Ok(quotient.low_u128())
}

/// Claims corresponding to `assets` collateral.
///
/// Before any claim exists the rate is 1:1.
pub fn to_claims(state: PackedState, assets: u128, rounding: Rounding) -> Result<u128, VaultError> {
    let (deposited, claims) = state.load();
    if claims == 0 {
        return Ok(assets);
    }
    mul_div(assets, claims, deposited, rounding)
}

/// Collateral corresponding to `shares` claims.
///
/// Before any claim exists the rate is 1:1.
pub fn to_assets(state: PackedState, shares: u128, rounding: Rounding) -> Result<u128, VaultError> {
    let (deposited, claims) = state.load();
    if claims == 0 {
        return Ok(shares);
    }
    mul_div(shares, deposited, claims, rounding)
}

/// Shares a `deposit(assets)` would issue to the receiver.
///
/// On bootstrap the dead claims come out of the depositor's allotment; a
/// bootstrap deposit too small to cover them previews as zero.
pub fn preview_deposit(state: PackedState, assets: u128) -> Result<u128, VaultError> {
    if state.is_bootstrap() {
        return Ok(assets.saturating_sub(MINIMUM_LIQUIDITY));
    }
    to_claims(state, assets, Rounding::Down)
}

/// Collateral a `mint(shares)` would pull from the caller.
pub fn preview_mint(state: PackedState, shares: u128) -> Result<u128, VaultError> {
    if state.is_bootstrap() {
        return shares
            .checked_add(MINIMUM_LIQUIDITY)
            .ok_or(VaultError::Overflow);
    }
    to_assets(state, shares, Rounding::Ceil)
}

/// Shares a `withdraw(assets)` would burn from the owner.
pub fn preview_withdraw(state: PackedState, assets: u128) -> Result<u128, VaultError> {
    to_claims(state, assets, Rounding::Up)
}

/// Collateral a `redeem(shares)` would release.
pub fn preview_redeem(state: PackedState, shares: u128) -> Result<u128, VaultError> {
    to_assets(state, shares, Rounding::Down)
}

/// Largest `assets` whose withdrawal burns no more than `balance` shares.
///
/// `withdraw` burns `floor(assets * claims / deposited) + 1`, so the bound is
/// `(balance * deposited - 1) / claims`, capped at the tracked collateral.
pub fn max_withdrawable(state: PackedState, balance: u128) -> u128 {
    let (deposited, claims) = state.load();
    if balance == 0 || claims == 0 || deposited == 0 {
        return 0;
    }
    // Two 128-bit factors always fit the 256-bit product.
    let product = U256::from(balance) * U256::from(deposited);
    let bound = (product - U256::one()) / U256::from(claims);
    if bound > U256::from(deposited) {
        return deposited;
    }
    bound.low_u128()
}
