//! Types library for the share vault
//!
//! Primitive domain types shared by the vault engine and its collaborators.
//!
//! # Modules
//! - `ids`: Account identifiers (`Address`) and well-known addresses
//! - `numeric`: Amount width constants and range helpers
//! - `errors`: Parse errors for the types above

pub mod errors;
pub mod ids;
pub mod numeric;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::errors::*;
    pub use crate::ids::*;
    pub use crate::numeric::*;
}
