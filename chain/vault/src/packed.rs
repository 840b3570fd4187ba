//! Packed vault state
//!
//! Total collateral and total claims live side by side in one 256-bit storage
//! word, big-endian:
//!
//! ```text
//! bytes  0..8   bits 192..256  reserved
//! bytes  8..20  bits  96..192  claims
//! bytes 20..32  bits   0..96   deposited
//! ```
//!
//! The word is the single source of truth for both quantities. It is read as
//! a pair and written as a pair, so a transition never sees half an update.

use std::fmt;

use serde::{Deserialize, Serialize};
use vault_types::numeric::{fits_u96, U96_MAX};

use crate::errors::VaultError;

/// Size of the storage word in bytes.
pub const WORD_LEN: usize = 32;

/// Largest value either packed quantity may hold.
pub const CAP: u128 = U96_MAX;

const RESERVED: std::ops::Range<usize> = 0..8;
const CLAIMS: std::ops::Range<usize> = 8..20;
const DEPOSITED: std::ops::Range<usize> = 20..32;

/// One storage word holding `(deposited, claims)`.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PackedState {
    word: [u8; WORD_LEN],
}

impl PackedState {
    /// Zeroed state, as created at deployment.
    pub const fn empty() -> Self {
        Self {
            word: [0u8; WORD_LEN],
        }
    }

    /// Build a state from both quantities, validating capacity.
    pub fn new(deposited: u128, claims: u128) -> Result<Self, VaultError> {
        let mut state = Self::empty();
        state.store(deposited, claims)?;
        Ok(state)
    }

    /// Reinterpret a raw storage word.
    pub const fn from_word(word: [u8; WORD_LEN]) -> Self {
        Self { word }
    }

    /// The raw storage word.
    pub fn word(&self) -> &[u8; WORD_LEN] {
        &self.word
    }

    /// Read both quantities as one snapshot: `(deposited, claims)`.
    pub fn load(&self) -> (u128, u128) {
        (self.deposited(), self.claims())
    }

    /// Write both quantities. Fails with `CapacityExceeded`, leaving the word
    /// untouched, if either exceeds [`CAP`]. Reserved bits are preserved.
    pub fn store(&mut self, deposited: u128, claims: u128) -> Result<(), VaultError> {
        if !fits_u96(deposited) || !fits_u96(claims) {
            return Err(VaultError::CapacityExceeded);
        }
        write_field(&mut self.word, DEPOSITED, deposited);
        write_field(&mut self.word, CLAIMS, claims);
        Ok(())
    }

    /// Collateral units the vault accounts for.
    pub fn deposited(&self) -> u128 {
        read_field(&self.word, DEPOSITED)
    }

    /// Claim units outstanding.
    pub fn claims(&self) -> u128 {
        read_field(&self.word, CLAIMS)
    }

    pub fn reserved(&self) -> u64 {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.word[RESERVED]);
        u64::from_be_bytes(bytes)
    }

    /// Whether the next issuance takes the bootstrap branch.
    pub fn is_bootstrap(&self) -> bool {
        self.claims() == 0
    }
}

fn read_field(word: &[u8; WORD_LEN], range: std::ops::Range<usize>) -> u128 {
    let mut bytes = [0u8; 16];
    bytes[16 - range.len()..].copy_from_slice(&word[range]);
    u128::from_be_bytes(bytes)
}

fn write_field(word: &mut [u8; WORD_LEN], range: std::ops::Range<usize>, value: u128) {
    let bytes = value.to_be_bytes();
    let width = range.len();
    word[range].copy_from_slice(&bytes[16 - width..]);
}

impl fmt::Debug for PackedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackedState")
            .field("deposited", &self.deposited())
            .field("claims", &self.claims())
            .field("reserved", &self.reserved())
            .finish()
    }
}

impl fmt::Display for PackedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.word))
    }
}

impl From<PackedState> for String {
    fn from(state: PackedState) -> Self {
        state.to_string()
    }
}

impl TryFrom<String> for PackedState {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let digits = value.strip_prefix("0x").unwrap_or(&value);
        let bytes = hex::decode(digits).map_err(|e| e.to_string())?;
        let word: [u8; WORD_LEN] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| format!("expected {WORD_LEN} bytes, got {}", bytes.len()))?;
        Ok(Self::from_word(word))
    }
}
