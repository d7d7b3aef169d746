//! Claim Signer — client-side authorization of cell redemptions
//!
//! A depositor never submits the redemption themselves. Instead they sign a
//! [`RedemptionClaim`](cell_types::message::RedemptionClaim) off-engine and
//! hand the signature to the confidant, who presents it to the bank.
//!
//! This crate holds the depositor's secp256k1 key and produces signatures
//! that the bank's verifier recovers to the depositor's address. The engine
//! itself never links it outside of tests.

pub mod signing;

pub use signing::{ClaimSigner, SignedClaim, SigningError};

/// Crate version constant
pub const CLAIM_SIGNER_VERSION: &str = "1.0.0";
