//! Types library for the cell escrow engine
//!
//! Value types shared by the engine and by off-engine signers, so that both
//! sides agree on identities, assets, and the exact bytes of a redemption claim.
//!
//! # Modules
//! - `ids`: Identifiers (Address, CellId, TokenId)
//! - `numeric`: Whole-unit amount rules
//! - `asset`: Asset kinds and the custodied asset variant
//! - `signature`: Recoverable 65-byte claim signatures
//! - `message`: Redemption claim encoding and hashing
//! - `errors`: Parse/validation errors

pub mod ids;
pub mod numeric;
pub mod asset;
pub mod signature;
pub mod message;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::asset::*;
    pub use crate::errors::*;
    pub use crate::ids::*;
    pub use crate::message::*;
    pub use crate::numeric::*;
    pub use crate::signature::*;
}
