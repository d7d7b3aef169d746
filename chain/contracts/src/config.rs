//! Bank configuration
//!
//! The bank takes no deployment parameters beyond its own address; these
//! knobs only tighten or relax how presented signatures are parsed.

use serde::{Deserialize, Serialize};

/// Configuration for a bank instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankConfig {
    /// Accept only `v ∈ {27, 28}`; when false, raw recovery ids `0/1` are
    /// accepted as well.
    pub strict_recovery_id: bool,
    /// Accept signatures whose `s` lies in the upper half of the curve order.
    /// Off by default: each authorization then has exactly one valid encoding.
    pub allow_high_s: bool,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            strict_recovery_id: false,
            allow_high_s: false,
        }
    }
}

impl BankConfig {
    /// Only canonical signatures: `v ∈ {27, 28}` and low `s`.
    pub fn strict() -> Self {
        Self {
            strict_recovery_id: true,
            allow_high_s: false,
        }
    }
}
