//! Authorization Verifier — signed redemption claims
//!
//! A claim binds `(bank, cell_id, confidant, deadline)`; see
//! [`RedemptionClaim`] for the exact byte layout. On redemption the
//! confidant is always the caller, so a signature is only usable by the
//! party it names.
//!
//! Redemption order:
//! 1. cell exists and is active
//! 2. `now <= deadline`
//! 3. recover the signer of the claim built with `confidant = caller`
//! 4. signer equals the cell's creator
//! 5. retire the cell and release its asset to the caller

use cell_types::ids::{Address, CellId};
use cell_types::message::RedemptionClaim;
use cell_types::signature::ClaimSignature;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use tracing::{debug, warn};

use crate::assets::{AssetAdapter, AssetBackend};
use crate::config::BankConfig;
use crate::errors::AuthorizationError;
use crate::events::CellRedeemed;
use crate::ledger::CellLedger;

/// `v` values at or above this carry the ledger's `27/28` offset.
const V_OFFSET: u8 = 27;

/// Recovers the identity that signed a 32-byte digest.
pub trait SignerRecovery {
    fn recover(
        &self,
        digest: &[u8; 32],
        signature: &ClaimSignature,
    ) -> Result<Address, AuthorizationError>;
}

/// secp256k1 public-key recovery with keccak address derivation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Secp256k1Recovery {
    config: BankConfig,
}

impl Secp256k1Recovery {
    pub fn new(config: BankConfig) -> Self {
        Self { config }
    }

    /// Map `v` onto a parity bit: `27/28`, or raw `0/1` unless strict.
    fn parity(&self, v: u8) -> Option<bool> {
        match v {
            27 | 28 => Some(v - V_OFFSET == 1),
            0 | 1 if !self.config.strict_recovery_id => Some(v == 1),
            _ => None,
        }
    }
}

impl SignerRecovery for Secp256k1Recovery {
    fn recover(
        &self,
        digest: &[u8; 32],
        signature: &ClaimSignature,
    ) -> Result<Address, AuthorizationError> {
        let mut is_y_odd = self
            .parity(signature.v())
            .ok_or(AuthorizationError::InvalidSignature)?;

        let mut sig =
            Signature::from_slice(signature.rs()).map_err(|_| AuthorizationError::InvalidSignature)?;

        // The verifying half of k256 only accepts low-s, so an admitted
        // high-s signature is recovered through its mirror image.
        if let Some(normalized) = sig.normalize_s() {
            if !self.config.allow_high_s {
                return Err(AuthorizationError::InvalidSignature);
            }
            sig = normalized;
            is_y_odd = !is_y_odd;
        }

        let recovery_id = RecoveryId::new(is_y_odd, false);
        let key = VerifyingKey::recover_from_prehash(digest, &sig, recovery_id)
            .map_err(|_| AuthorizationError::InvalidSignature)?;

        Address::from_public_key(key.to_encoded_point(false).as_bytes())
            .map_err(|_| AuthorizationError::InvalidSignature)
    }
}

/// Checks signed claims against the ledger and triggers release.
#[derive(Debug, Clone)]
pub struct AuthorizationVerifier<R = Secp256k1Recovery> {
    /// Domain separator: the address of the bank instance
    bank: Address,
    recovery: R,
}

impl AuthorizationVerifier<Secp256k1Recovery> {
    pub fn new(bank: Address, config: BankConfig) -> Self {
        Self::with_recovery(bank, Secp256k1Recovery::new(config))
    }
}

impl<R: SignerRecovery> AuthorizationVerifier<R> {
    pub fn with_recovery(bank: Address, recovery: R) -> Self {
        Self { bank, recovery }
    }

    pub fn bank(&self) -> Address {
        self.bank
    }

    /// The claim this bank instance expects for the given fields.
    pub fn claim(&self, cell_id: CellId, confidant: Address, deadline: u64) -> RedemptionClaim {
        RedemptionClaim::new(self.bank, cell_id, confidant, deadline)
    }

    /// The 32 bytes an off-engine signer must sign as a signed message.
    pub fn message_hash(&self, cell_id: CellId, confidant: Address, deadline: u64) -> [u8; 32] {
        self.claim(cell_id, confidant, deadline).message_hash()
    }

    /// Whether `signature` over the claim recovers to `signer`. Malformed
    /// signatures are simply not valid.
    pub fn verify(
        &self,
        signer: Address,
        cell_id: CellId,
        confidant: Address,
        deadline: u64,
        signature: &ClaimSignature,
    ) -> bool {
        let digest = self.claim(cell_id, confidant, deadline).signing_digest();
        matches!(self.recovery.recover(&digest, signature), Ok(recovered) if recovered == signer)
    }

    /// Redeem `cell_id` for `caller` if `signature` is the creator's
    /// authorization naming `caller` with this `deadline`.
    #[allow(clippy::too_many_arguments)]
    pub fn redeem<B: AssetBackend>(
        &self,
        ledger: &mut CellLedger,
        assets: &mut AssetAdapter<B>,
        cell_id: CellId,
        deadline: u64,
        signature: &ClaimSignature,
        caller: Address,
        now: u64,
    ) -> Result<CellRedeemed, AuthorizationError> {
        let creator = ledger.active_cell(cell_id)?.creator;

        if now > deadline {
            warn!(%cell_id, %caller, deadline, now, "redemption past deadline");
            return Err(AuthorizationError::ExpiredSignature { deadline, now });
        }

        let digest = self.claim(cell_id, caller, deadline).signing_digest();
        let recovered = self.recovery.recover(&digest, signature).map_err(|err| {
            warn!(%cell_id, %caller, "unrecoverable signature");
            err
        })?;
        if recovered != creator {
            warn!(%cell_id, %caller, %recovered, %creator, "signer is not the cell creator");
            return Err(AuthorizationError::InvalidSignature);
        }

        debug!(%cell_id, %caller, "claim verified");
        Ok(ledger.retire_and_release(assets, cell_id, caller, now)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::InMemoryAssets;
    use crate::errors::LedgerError;
    use cell_types::asset::Asset;
    use cell_types::numeric::units;
    use claim_signer::ClaimSigner;

    const BANK: Address = Address::new([0xba; 20]);
    const BOB: Address = Address::new([0xb0; 20]);
    const MALLORY: Address = Address::new([0x66; 20]);

    const T: u64 = 1_700_000_000;

    struct Fixture {
        signer: ClaimSigner,
        verifier: AuthorizationVerifier,
        ledger: CellLedger,
        assets: AssetAdapter<InMemoryAssets>,
        cell_id: CellId,
    }

    fn fixture() -> Fixture {
        let signer = ClaimSigner::from_bytes(&[7u8; 32]).unwrap();
        let mut host = InMemoryAssets::new();
        host.fund_native(signer.address(), units(100)).unwrap();
        let mut assets = AssetAdapter::new(BANK, host);
        let mut ledger = CellLedger::new();
        let cell_id = ledger
            .create_cell(&mut assets, Asset::native(units(40)), signer.address(), units(40), T)
            .unwrap();
        Fixture {
            signer,
            verifier: AuthorizationVerifier::new(BANK, BankConfig::default()),
            ledger,
            assets,
            cell_id,
        }
    }

    fn sign(f: &Fixture, confidant: Address, deadline: u64) -> ClaimSignature {
        f.signer
            .sign_claim(&f.verifier.claim(f.cell_id, confidant, deadline))
            .unwrap()
    }

    // ─── Recovery ───

    #[test]
    fn test_recovery_matches_signer_address() {
        let f = fixture();
        let sig = sign(&f, BOB, T + 100);
        assert!(f.verifier.verify(f.signer.address(), f.cell_id, BOB, T + 100, &sig));
        assert!(!f.verifier.verify(BOB, f.cell_id, BOB, T + 100, &sig));
    }

    #[test]
    fn test_raw_recovery_id_accepted_unless_strict() {
        let f = fixture();
        let sig = sign(&f, BOB, T + 100);
        let raw = ClaimSignature::from_parts(
            sig.rs().try_into().unwrap(),
            sig.v() - V_OFFSET,
        );
        assert!(f.verifier.verify(f.signer.address(), f.cell_id, BOB, T + 100, &raw));

        let strict = AuthorizationVerifier::new(BANK, BankConfig::strict());
        assert!(!strict.verify(f.signer.address(), f.cell_id, BOB, T + 100, &raw));
        assert!(strict.verify(f.signer.address(), f.cell_id, BOB, T + 100, &sig));
    }

    #[test]
    fn test_out_of_range_v_rejected() {
        let f = fixture();
        let sig = sign(&f, BOB, T + 100);
        let bad = ClaimSignature::from_parts(sig.rs().try_into().unwrap(), 29);
        let digest = f.verifier.claim(f.cell_id, BOB, T + 100).signing_digest();
        assert_eq!(
            Secp256k1Recovery::default().recover(&digest, &bad),
            Err(AuthorizationError::InvalidSignature)
        );
    }

    #[test]
    fn test_zero_signature_rejected() {
        let digest = [1u8; 32];
        let sig = ClaimSignature::from_bytes([0u8; 65]);
        assert_eq!(
            Secp256k1Recovery::default().recover(&digest, &sig),
            Err(AuthorizationError::InvalidSignature)
        );
    }

    #[test]
    fn test_message_hash_is_domain_separated() {
        let here = AuthorizationVerifier::new(BANK, BankConfig::default());
        let there = AuthorizationVerifier::new(MALLORY, BankConfig::default());
        assert_ne!(
            here.message_hash(CellId::new(1), BOB, T),
            there.message_hash(CellId::new(1), BOB, T)
        );
    }

    // ─── Redeem ───

    #[test]
    fn test_redeem_pays_caller() {
        let mut f = fixture();
        let sig = sign(&f, BOB, T + 100);
        let redeemed = f
            .verifier
            .redeem(&mut f.ledger, &mut f.assets, f.cell_id, T + 100, &sig, BOB, T + 50)
            .unwrap();
        assert_eq!(redeemed.redeemer, BOB);
        assert_eq!(f.assets.backend().native_balance(BOB), units(40));
        assert!(!f.ledger.is_active(f.cell_id));
    }

    #[test]
    fn test_redeem_by_other_caller_rejected() {
        let mut f = fixture();
        let sig = sign(&f, BOB, T + 100);
        let result =
            f.verifier
                .redeem(&mut f.ledger, &mut f.assets, f.cell_id, T + 100, &sig, MALLORY, T + 50);
        assert_eq!(result, Err(AuthorizationError::InvalidSignature));
        assert!(f.ledger.is_active(f.cell_id));
    }

    #[test]
    fn test_expiry_checked_before_signature() {
        let mut f = fixture();
        let garbage = ClaimSignature::from_bytes([0u8; 65]);
        let result =
            f.verifier
                .redeem(&mut f.ledger, &mut f.assets, f.cell_id, T + 100, &garbage, BOB, T + 101);
        assert_eq!(
            result,
            Err(AuthorizationError::ExpiredSignature {
                deadline: T + 100,
                now: T + 101
            })
        );
    }

    #[test]
    fn test_unknown_cell_checked_first() {
        let mut f = fixture();
        let sig = sign(&f, BOB, T + 100);
        let result = f.verifier.redeem(
            &mut f.ledger,
            &mut f.assets,
            CellId::new(42),
            T + 100,
            &sig,
            BOB,
            T + 500,
        );
        assert_eq!(
            result,
            Err(AuthorizationError::Ledger(LedgerError::UnknownCell {
                cell_id: CellId::new(42)
            }))
        );
    }

    /// Recovery stub that always yields a fixed identity.
    struct FixedRecovery(Address);

    impl SignerRecovery for FixedRecovery {
        fn recover(
            &self,
            _digest: &[u8; 32],
            _signature: &ClaimSignature,
        ) -> Result<Address, AuthorizationError> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_custom_recovery_primitive() {
        let mut f = fixture();
        let verifier = AuthorizationVerifier::with_recovery(BANK, FixedRecovery(f.signer.address()));
        let any = ClaimSignature::from_bytes([9u8; 65]);
        verifier
            .redeem(&mut f.ledger, &mut f.assets, f.cell_id, T + 1, &any, BOB, T)
            .unwrap();
        assert_eq!(f.assets.backend().native_balance(BOB), units(40));
    }
}
