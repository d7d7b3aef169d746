//! Bank — the engine facade
//!
//! One instance per deployment, identified by its own address. Exposes the
//! inbound calls (`create_cell_*`, `redeem`) and the read accessors. Each
//! inbound call carries the caller identity and the current time supplied
//! by the calling substrate.

use cell_types::asset::Asset;
use cell_types::ids::{Address, CellId, TokenId};
use cell_types::signature::ClaimSignature;
use rust_decimal::Decimal;

use crate::assets::{AssetAdapter, AssetBackend};
use crate::authorization::{AuthorizationVerifier, Secp256k1Recovery, SignerRecovery};
use crate::config::BankConfig;
use crate::errors::BankError;
use crate::events::{BankEvent, CellRedeemed};
use crate::ledger::{Cell, CellLedger};

#[derive(Debug)]
pub struct Bank<B, R = Secp256k1Recovery> {
    address: Address,
    assets: AssetAdapter<B>,
    ledger: CellLedger,
    verifier: AuthorizationVerifier<R>,
}

impl<B: AssetBackend> Bank<B> {
    /// Instantiate a bank at `address` over the given asset backend.
    pub fn new(address: Address, backend: B) -> Self {
        Self::with_config(address, backend, BankConfig::default())
    }

    pub fn with_config(address: Address, backend: B, config: BankConfig) -> Self {
        Self::with_recovery(address, backend, Secp256k1Recovery::new(config))
    }
}

impl<B: AssetBackend, R: SignerRecovery> Bank<B, R> {
    /// Instantiate a bank with a custom signer-recovery primitive.
    pub fn with_recovery(address: Address, backend: B, recovery: R) -> Self {
        Self {
            address,
            assets: AssetAdapter::new(address, backend),
            ledger: CellLedger::new(),
            verifier: AuthorizationVerifier::with_recovery(address, recovery),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    // ───────────────────────── Inbound Calls ─────────────────────────

    /// Deposit `amount` of native currency. `value` is the native value
    /// attached to the call and must equal `amount`.
    pub fn create_cell_native(
        &mut self,
        caller: Address,
        amount: Decimal,
        value: Decimal,
        now: u64,
    ) -> Result<CellId, BankError> {
        self.create_cell(caller, Asset::native(amount), value, now)
    }

    /// Deposit `amount` of `token`; the bank must hold enough allowance.
    pub fn create_cell_fungible(
        &mut self,
        caller: Address,
        token: Address,
        amount: Decimal,
        now: u64,
    ) -> Result<CellId, BankError> {
        self.create_cell(caller, Asset::fungible(token, amount), Decimal::ZERO, now)
    }

    /// Deposit `token_id` of `collection`; the bank must be approved for it.
    pub fn create_cell_non_fungible(
        &mut self,
        caller: Address,
        collection: Address,
        token_id: TokenId,
        now: u64,
    ) -> Result<CellId, BankError> {
        self.create_cell(
            caller,
            Asset::non_fungible(collection, token_id),
            Decimal::ZERO,
            now,
        )
    }

    fn create_cell(
        &mut self,
        caller: Address,
        asset: Asset,
        value: Decimal,
        now: u64,
    ) -> Result<CellId, BankError> {
        Ok(self
            .ledger
            .create_cell(&mut self.assets, asset, caller, value, now)?)
    }

    /// Redeem `cell_id` to `caller` with the creator's signature naming
    /// `caller` as confidant.
    pub fn redeem(
        &mut self,
        caller: Address,
        cell_id: CellId,
        deadline: u64,
        signature: &ClaimSignature,
        now: u64,
    ) -> Result<CellRedeemed, BankError> {
        Ok(self.verifier.redeem(
            &mut self.ledger,
            &mut self.assets,
            cell_id,
            deadline,
            signature,
            caller,
            now,
        )?)
    }

    // ───────────────────────── Reads ─────────────────────────

    /// The 32-byte hash an off-engine signer signs for this bank instance.
    pub fn get_message_hash(&self, cell_id: CellId, confidant: Address, deadline: u64) -> [u8; 32] {
        self.verifier.message_hash(cell_id, confidant, deadline)
    }

    pub fn verify(
        &self,
        signer: Address,
        cell_id: CellId,
        confidant: Address,
        deadline: u64,
        signature: &ClaimSignature,
    ) -> bool {
        self.verifier
            .verify(signer, cell_id, confidant, deadline, signature)
    }

    pub fn creator(&self, cell_id: CellId) -> Result<Address, BankError> {
        Ok(self.ledger.creator(cell_id)?)
    }

    pub fn is_active(&self, cell_id: CellId) -> bool {
        self.ledger.is_active(cell_id)
    }

    pub fn cell(&self, cell_id: CellId) -> Option<&Cell> {
        self.ledger.cell(cell_id)
    }

    pub fn cell_count(&self) -> usize {
        self.ledger.cell_count()
    }

    pub fn next_cell_id(&self) -> CellId {
        self.ledger.next_cell_id()
    }

    pub fn events(&self) -> &[BankEvent] {
        self.ledger.events()
    }

    pub fn drain_events(&mut self) -> Vec<BankEvent> {
        self.ledger.drain_events()
    }

    /// The external asset host, for balance inspection.
    pub fn assets(&self) -> &B {
        self.assets.backend()
    }

    /// The external asset host, for the substrate to act on it directly
    /// (approvals, mints, transfers between third parties).
    pub fn assets_mut(&mut self) -> &mut B {
        self.assets.backend_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::InMemoryAssets;
    use crate::errors::{AssetError, LedgerError};
    use cell_types::numeric::units;

    const BANK: Address = Address::new([0xba; 20]);
    const ALICE: Address = Address::new([0xa1; 20]);
    const NFT: Address = Address::new([0x71; 20]);

    fn bank() -> Bank<InMemoryAssets> {
        let mut host = InMemoryAssets::new();
        host.fund_native(ALICE, units(50)).unwrap();
        host.mint_collectible(NFT, ALICE, TokenId::new(1)).unwrap();
        Bank::new(BANK, host)
    }

    #[test]
    fn test_create_native_cell() {
        let mut bank = bank();
        let id = bank
            .create_cell_native(ALICE, units(20), units(20), 100)
            .unwrap();

        assert!(bank.is_active(id));
        assert_eq!(bank.creator(id).unwrap(), ALICE);
        assert_eq!(bank.assets().native_balance(ALICE), units(30));
        assert_eq!(bank.assets().native_balance(BANK), units(20));
        assert_eq!(bank.cell(id).unwrap().created_at, 100);
    }

    #[test]
    fn test_create_nft_cell_after_approval() {
        let mut bank = bank();
        bank.assets_mut()
            .approve_collectible(NFT, ALICE, BANK, TokenId::new(1))
            .unwrap();
        let id = bank
            .create_cell_non_fungible(ALICE, NFT, TokenId::new(1), 100)
            .unwrap();
        assert_eq!(bank.assets().owner_of(NFT, TokenId::new(1)), Some(BANK));
        assert_eq!(bank.cell_count(), 1);
        assert_eq!(bank.next_cell_id(), id.checked_next().unwrap());
    }

    #[test]
    fn test_creator_of_unknown_cell() {
        let bank = bank();
        let err = bank.creator(CellId::new(1)).unwrap_err();
        assert_eq!(
            err,
            BankError::Ledger(LedgerError::UnknownCell {
                cell_id: CellId::new(1)
            })
        );
        assert_eq!(err.kind(), "UnknownCell");
    }

    #[test]
    fn test_error_kind_surfaces_through_facade() {
        let mut bank = bank();
        let err = bank
            .create_cell_native(ALICE, units(20), units(19), 100)
            .unwrap_err();
        assert!(matches!(
            err,
            BankError::Ledger(LedgerError::Asset(AssetError::InvalidAmount { .. }))
        ));
        assert_eq!(err.kind(), "InvalidAmount");
    }
}
