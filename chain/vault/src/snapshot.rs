//! Persisted vault state
//!
//! A snapshot captures exactly what the vault keeps in storage: the packed
//! state word, the pause flag, the owner and the share-token metadata. It
//! travels as JSON and carries a SHA-256 commitment over a canonical byte
//! encoding, so two parties can compare vault images without shipping them.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use vault_types::ids::Address;

use crate::errors::SnapshotError;
use crate::ledger::ShareLedger;
use crate::packed::PackedState;
use crate::MINIMUM_LIQUIDITY;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Storage image of a vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultSnapshot {
    pub version: u32,
    pub state: PackedState,
    pub paused: bool,
    pub owner: Address,
    pub name: String,
    pub symbol: String,
}

impl VaultSnapshot {
    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(|e| SnapshotError::Serialization(e.to_string()))
    }

    /// Deserialize from JSON, rejecting unknown versions.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| SnapshotError::Serialization(e.to_string()))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(snapshot.version));
        }
        Ok(snapshot)
    }

    /// Canonical byte encoding: word, pause byte, owner, then each string
    /// prefixed by its big-endian `u32` length.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(64 + self.name.len() + self.symbol.len());
        bytes.extend_from_slice(&self.version.to_be_bytes());
        bytes.extend_from_slice(self.state.word());
        bytes.push(u8::from(self.paused));
        bytes.extend_from_slice(self.owner.as_bytes());
        for text in [&self.name, &self.symbol] {
            bytes.extend_from_slice(&(text.len() as u32).to_be_bytes());
            bytes.extend_from_slice(text.as_bytes());
        }
        bytes
    }

    /// SHA-256 over [`canonical_bytes`](Self::canonical_bytes).
    pub fn commitment(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.canonical_bytes());
        hasher.finalize().into()
    }

    pub fn commitment_hex(&self) -> String {
        hex::encode(self.commitment())
    }

    /// Check the snapshot against the claim ledger it will be paired with.
    pub fn validate<L: ShareLedger>(&self, ledger: &L) -> Result<(), SnapshotError> {
        if self.owner.is_zero() {
            return Err(SnapshotError::ZeroAddress);
        }
        let (deposited, claims) = self.state.load();
        if claims > 0 && deposited == 0 {
            return Err(SnapshotError::OrphanClaims);
        }
        let supply = ledger.total_supply();
        if supply != claims {
            return Err(SnapshotError::SupplyMismatch { claims, supply });
        }
        let held = ledger.balance_of(Address::DEAD);
        if claims > 0 && held < MINIMUM_LIQUIDITY {
            return Err(SnapshotError::MissingDeadClaims { held });
        }
        Ok(())
    }
}
