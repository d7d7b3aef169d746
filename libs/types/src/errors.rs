//! Error types for parsing and validating shared values

use thiserror::Error;

/// Errors raised while constructing shared value types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("Invalid hex encoding: {0}")]
    InvalidHex(String),

    #[error("Invalid address length: expected 20 bytes, got {0}")]
    InvalidAddressLength(usize),

    #[error("Invalid public key length: expected 64 or 65 bytes, got {0}")]
    InvalidPublicKeyLength(usize),

    #[error("Invalid signature length: expected 65 bytes, got {0}")]
    InvalidSignatureLength(usize),
}
