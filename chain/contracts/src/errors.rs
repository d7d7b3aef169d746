//! Contract-specific error types
//!
//! One enum per component, each convertible into the facade's `BankError`.
//! All faults are terminal for the call that raised it; nothing is retried.

use cell_types::ids::{Address, CellId, TokenId};
use thiserror::Error;

/// Asset Adapter errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssetError {
    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    #[error("Insufficient allowance on {token}: required {required}, approved {approved}")]
    InsufficientAllowance {
        token: Address,
        required: String,
        approved: String,
    },

    #[error("Token {token_id} of {collection} is not approved for transfer by the bank")]
    NotApproved {
        collection: Address,
        token_id: TokenId,
    },

    #[error("Transfer failed: {reason}")]
    TransferFailed { reason: String },
}

/// Cell Ledger errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Unknown cell: {cell_id}")]
    UnknownCell { cell_id: CellId },

    #[error("Cell already redeemed: {cell_id}")]
    CellAlreadyRedeemed { cell_id: CellId },

    #[error("Reentrancy detected")]
    Reentrancy,

    #[error("Cell id space exhausted")]
    Overflow,

    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),
}

/// Authorization Verifier errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthorizationError {
    #[error("Signature expired: deadline {deadline}, now {now}")]
    ExpiredSignature { deadline: u64, now: u64 },

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Top-level error returned by the bank facade.
///
/// Asset faults always arrive through the ledger, as `Ledger(Asset(..))`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BankError {
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Authorization error: {0}")]
    Authorization(#[from] AuthorizationError),
}

impl BankError {
    /// Stable name of the fault kind, for surfacing to end users.
    pub fn kind(&self) -> &'static str {
        match self {
            BankError::Ledger(e) => e.kind(),
            BankError::Authorization(e) => e.kind(),
        }
    }
}

impl AssetError {
    pub fn kind(&self) -> &'static str {
        match self {
            AssetError::InvalidAmount { .. } => "InvalidAmount",
            AssetError::InsufficientAllowance { .. } => "InsufficientAllowance",
            AssetError::NotApproved { .. } => "NotApproved",
            AssetError::TransferFailed { .. } => "TransferFailed",
        }
    }
}

impl LedgerError {
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::UnknownCell { .. } => "UnknownCell",
            LedgerError::CellAlreadyRedeemed { .. } => "CellAlreadyRedeemed",
            LedgerError::Reentrancy => "Reentrancy",
            LedgerError::Overflow => "Overflow",
            LedgerError::Asset(e) => e.kind(),
        }
    }
}

impl AuthorizationError {
    pub fn kind(&self) -> &'static str {
        match self {
            AuthorizationError::ExpiredSignature { .. } => "ExpiredSignature",
            AuthorizationError::InvalidSignature => "InvalidSignature",
            AuthorizationError::Ledger(e) => e.kind(),
        }
    }
}
