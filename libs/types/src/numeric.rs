//! Amount widths for collateral and claim quantities
//!
//! Amounts travel as `u128` through the API. Quantities the vault persists
//! are bounded to 96 bits so two of them pack into one storage word.

/// Collateral or claim quantity.
pub type Amount = u128;

/// Width in bits of a persisted quantity.
pub const U96_BITS: u32 = 96;

/// Largest value a persisted quantity can hold (`2^96 - 1`).
pub const U96_MAX: Amount = (1u128 << U96_BITS) - 1;

/// Whether `value` fits in a persisted 96-bit quantity.
pub fn fits_u96(value: Amount) -> bool {
    value <= U96_MAX
}

/// Remaining headroom below [`U96_MAX`], zero if `current` is already past it.
pub fn u96_headroom(current: Amount) -> Amount {
    U96_MAX.saturating_sub(current)
}
