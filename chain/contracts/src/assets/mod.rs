//! Asset Adapter — uniform move-in / move-out over three asset kinds
//!
//! The bank never holds token balances itself; it drives the asset's own
//! transfer interface through an [`AssetBackend`]. Dispatch over the asset
//! kind is an exhaustive match kept in this one place.
//!
//! Every backend call is all-or-nothing: on error it must leave balances,
//! allowances, and ownership exactly as they were.

pub mod memory;

use cell_types::asset::Asset;
use cell_types::ids::{Address, TokenId};
use cell_types::numeric::is_whole_units;
use rust_decimal::Decimal;
use tracing::debug;

use crate::errors::AssetError;

pub use memory::InMemoryAssets;

/// Outbound transfer interface of the assets the bank custodies.
pub trait AssetBackend {
    /// Move native currency from `from` to `to`. A recipient that refuses
    /// the value fails the call with `TransferFailed`.
    fn transfer_native(&mut self, from: Address, to: Address, amount: Decimal)
        -> Result<(), AssetError>;

    /// `transferFrom`: `spender` moves `amount` of `token` out of `from`'s
    /// balance, consuming `from`'s allowance for `spender`.
    fn fungible_transfer_from(
        &mut self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: Decimal,
    ) -> Result<(), AssetError>;

    /// `transfer`: `from` moves `amount` of its own `token` balance to `to`.
    fn fungible_transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: Decimal,
    ) -> Result<(), AssetError>;

    /// Move `token_id` of `collection` from `from` to `to`, acting as
    /// `operator`, which must be the owner or approved by it.
    fn collectible_transfer_from(
        &mut self,
        collection: Address,
        operator: Address,
        from: Address,
        to: Address,
        token_id: TokenId,
    ) -> Result<(), AssetError>;
}

/// Moves assets between parties and the bank's custody address.
#[derive(Debug)]
pub struct AssetAdapter<B> {
    custody: Address,
    backend: B,
}

impl<B: AssetBackend> AssetAdapter<B> {
    /// Create an adapter holding assets under `custody` (the bank's address).
    pub fn new(custody: Address, backend: B) -> Self {
        Self { custody, backend }
    }

    pub fn custody(&self) -> Address {
        self.custody
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Reject zero, negative, fractional amounts and the zero token id.
    pub fn validate(asset: &Asset) -> Result<(), AssetError> {
        match asset {
            Asset::Native { amount } | Asset::Fungible { amount, .. } => {
                if !is_whole_units(*amount) {
                    return Err(AssetError::InvalidAmount {
                        reason: format!("{} is not a positive whole number of units", amount),
                    });
                }
            }
            Asset::NonFungible { token_id, .. } => {
                if token_id.is_zero() {
                    return Err(AssetError::InvalidAmount {
                        reason: "token id must be non-zero".to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Pull `asset` from `from` into custody.
    ///
    /// `attached_value` is the native value accompanying the call: it must
    /// equal the amount for a native deposit and be zero otherwise.
    pub fn deposit(
        &mut self,
        asset: &Asset,
        from: Address,
        attached_value: Decimal,
    ) -> Result<(), AssetError> {
        Self::validate(asset)?;

        match asset {
            Asset::Native { amount } => {
                if attached_value != *amount {
                    return Err(AssetError::InvalidAmount {
                        reason: format!(
                            "attached value {} does not match amount {}",
                            attached_value, amount
                        ),
                    });
                }
                self.backend.transfer_native(from, self.custody, *amount)?;
            }
            Asset::Fungible { token, amount } => {
                Self::require_no_value(attached_value)?;
                self.backend
                    .fungible_transfer_from(*token, self.custody, from, self.custody, *amount)?;
            }
            Asset::NonFungible {
                collection,
                token_id,
            } => {
                Self::require_no_value(attached_value)?;
                self.backend.collectible_transfer_from(
                    *collection,
                    self.custody,
                    from,
                    self.custody,
                    *token_id,
                )?;
            }
        }

        debug!(kind = %asset.kind(), %from, "asset taken into custody");
        Ok(())
    }

    /// Push a custodied `asset` to `to`.
    pub fn release(&mut self, asset: &Asset, to: Address) -> Result<(), AssetError> {
        match asset {
            Asset::Native { amount } => {
                self.backend.transfer_native(self.custody, to, *amount)?;
            }
            Asset::Fungible { token, amount } => {
                self.backend
                    .fungible_transfer(*token, self.custody, to, *amount)?;
            }
            Asset::NonFungible {
                collection,
                token_id,
            } => {
                self.backend.collectible_transfer_from(
                    *collection,
                    self.custody,
                    self.custody,
                    to,
                    *token_id,
                )?;
            }
        }

        debug!(kind = %asset.kind(), %to, "asset released from custody");
        Ok(())
    }

    fn require_no_value(attached_value: Decimal) -> Result<(), AssetError> {
        if !attached_value.is_zero() {
            return Err(AssetError::InvalidAmount {
                reason: format!("token deposit carries native value {}", attached_value),
            });
        }
        Ok(())
    }
}
