//! Vault configuration

use vault_types::ids::Address;

/// Default share-token name.
pub const DEFAULT_NAME: &str = "Vault Shares";

/// Default share-token symbol.
pub const DEFAULT_SYMBOL: &str = "vSHR";

/// Deployment parameters for a [`Vault`](crate::vault::Vault).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultConfig {
    /// The vault's own address; collateral is held here.
    pub address: Address,
    /// Initial owner, allowed to pause and to hand over ownership.
    pub owner: Address,
    /// Share-token name.
    pub name: String,
    /// Share-token symbol.
    pub symbol: String,
    /// Start in the paused state.
    pub start_paused: bool,
}

impl VaultConfig {
    pub fn new(address: Address, owner: Address) -> Self {
        Self {
            address,
            owner,
            name: DEFAULT_NAME.to_string(),
            symbol: DEFAULT_SYMBOL.to_string(),
            start_paused: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = symbol.into();
        self
    }

    pub fn paused(mut self) -> Self {
        self.start_paused = true;
        self
    }
}
