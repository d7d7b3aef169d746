//! Redemption claim encoding
//!
//! The bytes a depositor signs off-engine to let one confidant redeem one
//! cell before a deadline. Every external signer must reproduce this encoding
//! bit for bit:
//!
//! ```text
//! packed       = bank (20) || cell_id (32, uint256 BE) || confidant (20) || deadline (32, uint256 BE)
//! message_hash = keccak256(packed)
//! digest       = keccak256("\x19Ethereum Signed Message:\n32" || message_hash)
//! ```
//!
//! `message_hash` is what a wallet is handed to sign with its personal-message
//! method; the wallet applies the prefix itself, so the signature is computed
//! over `digest`. The bank address is the domain separator: a claim signed for
//! one engine instance never verifies against another.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use crate::ids::{Address, CellId};

/// Signed-message prefix for a 32-byte payload.
pub const SIGNED_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Length of the packed claim encoding.
pub const PACKED_CLAIM_LEN: usize = 20 + 32 + 20 + 32;

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// Apply the signed-message convention to a 32-byte message hash.
pub fn to_signed_message_digest(message_hash: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(SIGNED_MESSAGE_PREFIX);
    hasher.update(message_hash);
    hasher.finalize().into()
}

/// Encode a u64 as a left-padded 32-byte big-endian word.
fn be_word(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Authorization for `confidant` to redeem `cell_id` on `bank` until `deadline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RedemptionClaim {
    /// Engine instance the claim is bound to
    pub bank: Address,
    pub cell_id: CellId,
    /// The only identity allowed to present the signature
    pub confidant: Address,
    /// Last second (unix) at which the claim may be redeemed
    pub deadline: u64,
}

impl RedemptionClaim {
    pub fn new(bank: Address, cell_id: CellId, confidant: Address, deadline: u64) -> Self {
        Self {
            bank,
            cell_id,
            confidant,
            deadline,
        }
    }

    /// Tightly packed encoding, fields in declaration order.
    pub fn packed(&self) -> [u8; PACKED_CLAIM_LEN] {
        let mut out = [0u8; PACKED_CLAIM_LEN];
        out[..20].copy_from_slice(self.bank.as_bytes());
        out[20..52].copy_from_slice(&self.cell_id.to_be_word());
        out[52..72].copy_from_slice(self.confidant.as_bytes());
        out[72..].copy_from_slice(&be_word(self.deadline));
        out
    }

    /// The 32 bytes handed to an external signer.
    pub fn message_hash(&self) -> [u8; 32] {
        keccak256(&self.packed())
    }

    /// The prefixed digest the signature is actually computed over.
    pub fn signing_digest(&self) -> [u8; 32] {
        to_signed_message_digest(&self.message_hash())
    }
}
