//! Asset kinds held in custody
//!
//! A cell holds exactly one asset: an amount of native currency, an amount of
//! a fungible token, or one token of a non-fungible collection.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::{Address, TokenId};

/// Category of custodied value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    NativeCurrency,
    FungibleToken,
    NonFungibleToken,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetKind::NativeCurrency => "native",
            AssetKind::FungibleToken => "fungible",
            AssetKind::NonFungibleToken => "non-fungible",
        };
        f.write_str(name)
    }
}

/// The content of a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Asset {
    /// Native currency of the ledger, in base units
    Native { amount: Decimal },
    /// Units of a fungible token contract
    Fungible { token: Address, amount: Decimal },
    /// A single token of a non-fungible collection
    NonFungible { collection: Address, token_id: TokenId },
}

impl Asset {
    pub fn native(amount: Decimal) -> Self {
        Asset::Native { amount }
    }

    pub fn fungible(token: Address, amount: Decimal) -> Self {
        Asset::Fungible { token, amount }
    }

    pub fn non_fungible(collection: Address, token_id: TokenId) -> Self {
        Asset::NonFungible {
            collection,
            token_id,
        }
    }

    pub fn kind(&self) -> AssetKind {
        match self {
            Asset::Native { .. } => AssetKind::NativeCurrency,
            Asset::Fungible { .. } => AssetKind::FungibleToken,
            Asset::NonFungible { .. } => AssetKind::NonFungibleToken,
        }
    }

    /// Token contract or collection; absent for native currency.
    pub fn asset_ref(&self) -> Option<Address> {
        match self {
            Asset::Native { .. } => None,
            Asset::Fungible { token, .. } => Some(*token),
            Asset::NonFungible { collection, .. } => Some(*collection),
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Native { amount } => write!(f, "{} native", amount),
            Asset::Fungible { token, amount } => write!(f, "{} of {}", amount, token),
            Asset::NonFungible {
                collection,
                token_id,
            } => write!(f, "{} of {}", token_id, collection),
        }
    }
}
