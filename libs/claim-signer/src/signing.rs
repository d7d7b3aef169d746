//! Signing Module — redemption claim signing
//!
//! Produces 65-byte recoverable secp256k1 signatures over the signed-message
//! digest of a redemption claim, with `s` normalized to the lower half of the
//! curve order and `v` in the `27/28` convention.

use cell_types::ids::Address;
use cell_types::message::{to_signed_message_digest, RedemptionClaim};
use cell_types::signature::ClaimSignature;
use k256::ecdsa::{RecoveryId, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Signer
// ---------------------------------------------------------------------------

/// Offset added to the raw recovery id in the ledger's `v` convention.
const V_OFFSET: u8 = 27;

/// A depositor's secp256k1 key.
pub struct ClaimSigner {
    signing_key: SigningKey,
    address: Address,
}

impl ClaimSigner {
    /// Load a signer from its 32-byte secret scalar.
    pub fn from_bytes(secret: &[u8; 32]) -> Result<Self, SigningError> {
        let signing_key =
            SigningKey::from_slice(secret).map_err(|_| SigningError::InvalidSecretKey)?;
        Self::from_signing_key(signing_key)
    }

    /// Load a signer from a hex-encoded secret, with or without `0x`.
    pub fn from_hex(secret: &str) -> Result<Self, SigningError> {
        let digits = secret.strip_prefix("0x").unwrap_or(secret);
        let bytes = hex::decode(digits).map_err(|_| SigningError::InvalidSecretKey)?;
        let signing_key =
            SigningKey::from_slice(&bytes).map_err(|_| SigningError::InvalidSecretKey)?;
        Self::from_signing_key(signing_key)
    }

    /// Generate a fresh random key.
    pub fn random() -> Result<Self, SigningError> {
        Self::from_signing_key(SigningKey::random(&mut rand::thread_rng()))
    }

    fn from_signing_key(signing_key: SigningKey) -> Result<Self, SigningError> {
        let address = address_of(signing_key.verifying_key())?;
        Ok(Self {
            signing_key,
            address,
        })
    }

    /// The identity that signatures from this key recover to.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a claim.
    pub fn sign_claim(&self, claim: &RedemptionClaim) -> Result<ClaimSignature, SigningError> {
        self.sign_digest(&claim.signing_digest())
    }

    /// Sign a 32-byte message hash under the signed-message convention,
    /// the way a wallet's personal-sign method does.
    pub fn sign_message_hash(&self, message_hash: &[u8; 32]) -> Result<ClaimSignature, SigningError> {
        self.sign_digest(&to_signed_message_digest(message_hash))
    }

    /// Sign an already-prefixed digest.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Result<ClaimSignature, SigningError> {
        let (mut signature, mut recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(digest)
            .map_err(|_| SigningError::SigningFailed)?;

        // Low-S form; flipping s mirrors R, so the parity bit flips with it.
        if let Some(normalized) = signature.normalize_s() {
            signature = normalized;
            recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
        }

        let rs: [u8; 64] = signature.to_bytes().into();
        Ok(ClaimSignature::from_parts(&rs, V_OFFSET + recovery_id.to_byte()))
    }

    /// Sign a claim and wrap it for transport to the confidant.
    pub fn signed_claim(&self, claim: RedemptionClaim) -> Result<SignedClaim, SigningError> {
        let signature = self.sign_claim(&claim)?;
        Ok(SignedClaim {
            claim,
            signature,
            signer: self.address,
        })
    }
}

impl std::fmt::Debug for ClaimSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

fn address_of(verifying_key: &VerifyingKey) -> Result<Address, SigningError> {
    Address::from_public_key(verifying_key.to_encoded_point(false).as_bytes())
        .map_err(|_| SigningError::InvalidSecretKey)
}

// ---------------------------------------------------------------------------
// Transport envelope
// ---------------------------------------------------------------------------

/// A claim together with its signature, as handed to the confidant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedClaim {
    pub claim: RedemptionClaim,
    /// Hex-encoded `r || s || v`
    pub signature: ClaimSignature,
    /// Address of the signing depositor
    pub signer: Address,
}

impl SignedClaim {
    pub fn to_json(&self) -> Result<String, SigningError> {
        serde_json::to_string(self).map_err(|e| SigningError::Encoding(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, SigningError> {
        serde_json::from_str(json).map_err(|e| SigningError::Encoding(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Signing module errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SigningError {
    #[error("Invalid secret key")]
    InvalidSecretKey,

    #[error("Signing failed")]
    SigningFailed,

    #[error("Envelope encoding error: {0}")]
    Encoding(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
