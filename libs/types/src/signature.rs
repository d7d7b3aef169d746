//! Recoverable secp256k1 signatures in `r || s || v` form

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::errors::TypeError;

/// A 65-byte recoverable ECDSA signature: `r (32) || s (32) || v (1)`.
///
/// `v` is carried as produced by the signer (`27/28` by ledger convention,
/// or the raw recovery id `0/1`). Interpreting it is the verifier's job.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClaimSignature([u8; 65]);

impl ClaimSignature {
    pub const LEN: usize = 65;

    pub const fn from_bytes(bytes: [u8; 65]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypeError> {
        let arr: [u8; 65] = bytes
            .try_into()
            .map_err(|_| TypeError::InvalidSignatureLength(bytes.len()))?;
        Ok(Self(arr))
    }

    /// Assemble from the 64-byte `r || s` pair and a `v` byte.
    pub fn from_parts(rs: &[u8; 64], v: u8) -> Self {
        let mut bytes = [0u8; 65];
        bytes[..64].copy_from_slice(rs);
        bytes[64] = v;
        Self(bytes)
    }

    /// Parse from hex, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn as_bytes(&self) -> &[u8; 65] {
        &self.0
    }

    pub fn r(&self) -> &[u8] {
        &self.0[..32]
    }

    pub fn s(&self) -> &[u8] {
        &self.0[32..64]
    }

    /// The `r || s` pair without the recovery byte.
    pub fn rs(&self) -> &[u8] {
        &self.0[..64]
    }

    pub fn v(&self) -> u8 {
        self.0[64]
    }
}

impl fmt::Debug for ClaimSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClaimSignature({})", self.to_hex())
    }
}

impl Serialize for ClaimSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ClaimSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
