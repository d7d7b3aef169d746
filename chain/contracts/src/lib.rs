//! Cell Bank — signature-authorized custody cells
//!
//! A depositor locks an asset (native currency, a fungible token, or one
//! non-fungible token) into a numbered cell. Later they authorize exactly one
//! confidant to take the cell's content by signing a claim off-engine; the
//! confidant presents the signature and the bank releases the asset to them.
//!
//! # Modules
//! - `errors`: Error taxonomy per component
//! - `events`: Append-only event records
//! - `security`: Reentrancy guard
//! - `config`: Verifier configuration
//! - `assets`: Asset Adapter and the in-memory asset host
//! - `ledger`: Cell Ledger (cell table and id sequence)
//! - `authorization`: Authorization Verifier (claim hashing, signer recovery, redemption)
//! - `bank`: Facade exposing the inbound calls
//!
//! # Execution model
//! Every mutating call is a transaction on an externally serialized ledger:
//! it either completes with all effects or leaves no trace.

pub mod errors;
pub mod events;
pub mod security;
pub mod config;
pub mod assets;
pub mod ledger;
pub mod authorization;
pub mod bank;

pub use bank::Bank;
pub use config::BankConfig;
pub use errors::BankError;

/// Contract ABI version — frozen after release
pub const CONTRACT_ABI_VERSION: &str = "1.0.0";
