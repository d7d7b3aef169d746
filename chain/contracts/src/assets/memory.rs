//! In-memory asset host
//!
//! Stands in for the external ledger's native balances and token contracts:
//! fungible tokens with balances and allowances, non-fungible collections
//! with owners, single-token approvals and operator approvals, and
//! recipients that refuse native value.

use cell_types::ids::{Address, TokenId};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

use super::AssetBackend;
use crate::errors::AssetError;

/// Balances and allowances of one fungible token contract.
#[derive(Debug, Clone, Default)]
pub struct TokenBook {
    balances: HashMap<Address, Decimal>,
    /// (owner, spender) -> remaining allowance
    allowances: HashMap<(Address, Address), Decimal>,
}

impl TokenBook {
    pub fn balance_of(&self, owner: Address) -> Decimal {
        self.balances.get(&owner).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> Decimal {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

/// Ownership and approvals of one non-fungible collection.
#[derive(Debug, Clone, Default)]
pub struct CollectionBook {
    owners: HashMap<TokenId, Address>,
    /// Single-token approvals, cleared on every transfer
    approvals: HashMap<TokenId, Address>,
    /// (owner, operator) pairs approved for all of owner's tokens
    operators: HashSet<(Address, Address)>,
}

impl CollectionBook {
    pub fn owner_of(&self, token_id: TokenId) -> Option<Address> {
        self.owners.get(&token_id).copied()
    }

    fn is_authorized(&self, owner: Address, operator: Address, token_id: TokenId) -> bool {
        operator == owner
            || self.approvals.get(&token_id) == Some(&operator)
            || self.operators.contains(&(owner, operator))
    }
}

/// Native balances plus every token contract the bank can touch.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAssets {
    native: HashMap<Address, Decimal>,
    tokens: HashMap<Address, TokenBook>,
    collections: HashMap<Address, CollectionBook>,
    /// Recipients whose receive hook reverts on native value
    rejecting: HashSet<Address>,
}

impl InMemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    // ───────────────────────── Native ─────────────────────────

    /// Credit native currency to `account` (genesis / faucet).
    pub fn fund_native(&mut self, account: Address, amount: Decimal) -> Result<(), AssetError> {
        let balance = self.native.entry(account).or_insert(Decimal::ZERO);
        *balance = balance.checked_add(amount).ok_or_else(|| overflow("fund"))?;
        Ok(())
    }

    pub fn native_balance(&self, account: Address) -> Decimal {
        self.native.get(&account).copied().unwrap_or(Decimal::ZERO)
    }

    /// Make `account` refuse incoming native value.
    pub fn reject_native(&mut self, account: Address) {
        self.rejecting.insert(account);
    }

    pub fn accept_native(&mut self, account: Address) {
        self.rejecting.remove(&account);
    }

    // ───────────────────────── Fungible ─────────────────────────

    /// Mint `amount` of `token` to `to`, creating the token on first use.
    pub fn mint_tokens(
        &mut self,
        token: Address,
        to: Address,
        amount: Decimal,
    ) -> Result<(), AssetError> {
        let book = self.tokens.entry(token).or_default();
        let balance = book.balances.entry(to).or_insert(Decimal::ZERO);
        *balance = balance.checked_add(amount).ok_or_else(|| overflow("mint"))?;
        Ok(())
    }

    /// Set `spender`'s allowance over `owner`'s `token` balance.
    pub fn approve(&mut self, token: Address, owner: Address, spender: Address, amount: Decimal) {
        self.tokens
            .entry(token)
            .or_default()
            .allowances
            .insert((owner, spender), amount);
    }

    /// Raise `spender`'s allowance over `owner`'s `token` balance by `added`.
    pub fn increase_allowance(
        &mut self,
        token: Address,
        owner: Address,
        spender: Address,
        added: Decimal,
    ) -> Result<(), AssetError> {
        let book = self.tokens.entry(token).or_default();
        let current = book
            .allowances
            .entry((owner, spender))
            .or_insert(Decimal::ZERO);
        *current = current
            .checked_add(added)
            .ok_or_else(|| overflow("allowance"))?;
        Ok(())
    }

    pub fn token_balance(&self, token: Address, owner: Address) -> Decimal {
        self.tokens
            .get(&token)
            .map_or(Decimal::ZERO, |book| book.balance_of(owner))
    }

    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> Decimal {
        self.tokens
            .get(&token)
            .map_or(Decimal::ZERO, |book| book.allowance(owner, spender))
    }

    // ───────────────────────── Non-fungible ─────────────────────────

    /// Mint `token_id` of `collection` to `to`.
    pub fn mint_collectible(
        &mut self,
        collection: Address,
        to: Address,
        token_id: TokenId,
    ) -> Result<(), AssetError> {
        let book = self.collections.entry(collection).or_default();
        if book.owners.contains_key(&token_id) {
            return Err(AssetError::TransferFailed {
                reason: format!("token {} already minted", token_id),
            });
        }
        book.owners.insert(token_id, to);
        Ok(())
    }

    /// Approve `approved` to move a single token. Only the owner may approve.
    pub fn approve_collectible(
        &mut self,
        collection: Address,
        owner: Address,
        approved: Address,
        token_id: TokenId,
    ) -> Result<(), AssetError> {
        let book = self
            .collections
            .get_mut(&collection)
            .ok_or_else(|| unknown_contract(collection))?;
        if book.owner_of(token_id) != Some(owner) {
            return Err(AssetError::TransferFailed {
                reason: format!("approve caller is not owner of {}", token_id),
            });
        }
        book.approvals.insert(token_id, approved);
        Ok(())
    }

    /// Grant or revoke `operator` over all of `owner`'s tokens in `collection`.
    pub fn set_approval_for_all(
        &mut self,
        collection: Address,
        owner: Address,
        operator: Address,
        approved: bool,
    ) {
        let book = self.collections.entry(collection).or_default();
        if approved {
            book.operators.insert((owner, operator));
        } else {
            book.operators.remove(&(owner, operator));
        }
    }

    pub fn owner_of(&self, collection: Address, token_id: TokenId) -> Option<Address> {
        self.collections
            .get(&collection)
            .and_then(|book| book.owner_of(token_id))
    }
}

impl AssetBackend for InMemoryAssets {
    fn transfer_native(
        &mut self,
        from: Address,
        to: Address,
        amount: Decimal,
    ) -> Result<(), AssetError> {
        if self.rejecting.contains(&to) {
            return Err(AssetError::TransferFailed {
                reason: format!("recipient {} rejected native transfer", to),
            });
        }
        move_balance(&mut self.native, from, to, amount)
    }

    fn fungible_transfer_from(
        &mut self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: Decimal,
    ) -> Result<(), AssetError> {
        let book = self
            .tokens
            .get_mut(&token)
            .ok_or_else(|| unknown_contract(token))?;

        let approved = book.allowance(from, spender);
        if approved < amount {
            return Err(AssetError::InsufficientAllowance {
                token,
                required: amount.to_string(),
                approved: approved.to_string(),
            });
        }

        move_balance(&mut book.balances, from, to, amount)?;
        book.allowances.insert((from, spender), approved - amount);
        Ok(())
    }

    fn fungible_transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: Decimal,
    ) -> Result<(), AssetError> {
        let book = self
            .tokens
            .get_mut(&token)
            .ok_or_else(|| unknown_contract(token))?;
        move_balance(&mut book.balances, from, to, amount)
    }

    fn collectible_transfer_from(
        &mut self,
        collection: Address,
        operator: Address,
        from: Address,
        to: Address,
        token_id: TokenId,
    ) -> Result<(), AssetError> {
        let book = self
            .collections
            .get_mut(&collection)
            .ok_or_else(|| unknown_contract(collection))?;

        let owner = book.owner_of(token_id).ok_or_else(|| AssetError::TransferFailed {
            reason: format!("token {} does not exist", token_id),
        })?;
        if owner != from {
            return Err(AssetError::TransferFailed {
                reason: format!("{} is not the owner of {}", from, token_id),
            });
        }
        if !book.is_authorized(owner, operator, token_id) {
            return Err(AssetError::NotApproved {
                collection,
                token_id,
            });
        }

        book.approvals.remove(&token_id);
        book.owners.insert(token_id, to);
        Ok(())
    }
}

/// Debit `from` and credit `to`; checks everything before mutating.
fn move_balance(
    balances: &mut HashMap<Address, Decimal>,
    from: Address,
    to: Address,
    amount: Decimal,
) -> Result<(), AssetError> {
    let available = balances.get(&from).copied().unwrap_or(Decimal::ZERO);
    if available < amount {
        return Err(AssetError::TransferFailed {
            reason: format!(
                "transfer amount {} exceeds balance {} of {}",
                amount, available, from
            ),
        });
    }
    if from == to {
        return Ok(());
    }

    let received = balances.get(&to).copied().unwrap_or(Decimal::ZERO);
    let credited = received
        .checked_add(amount)
        .ok_or_else(|| overflow("credit"))?;

    balances.insert(from, available - amount);
    balances.insert(to, credited);
    Ok(())
}

fn unknown_contract(address: Address) -> AssetError {
    AssetError::TransferFailed {
        reason: format!("no token contract at {}", address),
    }
}

fn overflow(what: &str) -> AssetError {
    AssetError::TransferFailed {
        reason: format!("{} overflows the numeric domain", what),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cell_types::numeric::units;

    const ALICE: Address = Address::new([0xa1; 20]);
    const BOB: Address = Address::new([0xb0; 20]);
    const CAROL: Address = Address::new([0xc0; 20]);
    const TOKEN: Address = Address::new([0x70; 20]);
    const NFT: Address = Address::new([0x71; 20]);

    #[test]
    fn test_native_transfer_insufficient_balance() {
        let mut host = InMemoryAssets::new();
        host.fund_native(ALICE, units(5)).unwrap();
        let result = host.transfer_native(ALICE, BOB, units(6));
        assert!(matches!(result, Err(AssetError::TransferFailed { .. })));
        assert_eq!(host.native_balance(ALICE), units(5));
    }

    #[test]
    fn test_reject_then_accept_native() {
        let mut host = InMemoryAssets::new();
        host.fund_native(ALICE, units(5)).unwrap();
        host.reject_native(BOB);
        assert!(host.transfer_native(ALICE, BOB, units(1)).is_err());

        host.accept_native(BOB);
        host.transfer_native(ALICE, BOB, units(1)).unwrap();
        assert_eq!(host.native_balance(BOB), units(1));
    }

    #[test]
    fn test_increase_allowance_accumulates() {
        let mut host = InMemoryAssets::new();
        host.increase_allowance(TOKEN, ALICE, BOB, units(30)).unwrap();
        host.increase_allowance(TOKEN, ALICE, BOB, units(20)).unwrap();
        assert_eq!(host.allowance(TOKEN, ALICE, BOB), units(50));
    }

    #[test]
    fn test_transfer_from_consumes_allowance() {
        let mut host = InMemoryAssets::new();
        host.mint_tokens(TOKEN, ALICE, units(100)).unwrap();
        host.approve(TOKEN, ALICE, BOB, units(60));

        host.fungible_transfer_from(TOKEN, BOB, ALICE, CAROL, units(40))
            .unwrap();
        assert_eq!(host.allowance(TOKEN, ALICE, BOB), units(20));
        assert_eq!(host.token_balance(TOKEN, CAROL), units(40));
    }

    #[test]
    fn test_transfer_from_exceeding_balance_keeps_allowance() {
        let mut host = InMemoryAssets::new();
        host.mint_tokens(TOKEN, ALICE, units(10)).unwrap();
        host.approve(TOKEN, ALICE, BOB, units(60));

        let result = host.fungible_transfer_from(TOKEN, BOB, ALICE, CAROL, units(50));
        assert!(matches!(result, Err(AssetError::TransferFailed { .. })));
        assert_eq!(host.allowance(TOKEN, ALICE, BOB), units(60));
        assert_eq!(host.token_balance(TOKEN, ALICE), units(10));
    }

    #[test]
    fn test_unknown_token_fails() {
        let mut host = InMemoryAssets::new();
        let result = host.fungible_transfer(TOKEN, ALICE, BOB, units(1));
        assert!(matches!(result, Err(AssetError::TransferFailed { .. })));
    }

    #[test]
    fn test_mint_overflow() {
        let mut host = InMemoryAssets::new();
        host.mint_tokens(TOKEN, ALICE, Decimal::MAX).unwrap();
        let result = host.mint_tokens(TOKEN, ALICE, units(1));
        assert!(matches!(result, Err(AssetError::TransferFailed { .. })));
    }

    #[test]
    fn test_fund_native_overflow() {
        let mut host = InMemoryAssets::new();
        host.fund_native(ALICE, Decimal::MAX).unwrap();
        let result = host.fund_native(ALICE, units(1));
        assert!(matches!(result, Err(AssetError::TransferFailed { .. })));
        assert_eq!(host.native_balance(ALICE), Decimal::MAX);
    }

    #[test]
    fn test_collectible_double_mint() {
        let mut host = InMemoryAssets::new();
        host.mint_collectible(NFT, ALICE, TokenId::new(1)).unwrap();
        assert!(host.mint_collectible(NFT, BOB, TokenId::new(1)).is_err());
        assert_eq!(host.owner_of(NFT, TokenId::new(1)), Some(ALICE));
    }

    #[test]
    fn test_only_owner_can_approve_collectible() {
        let mut host = InMemoryAssets::new();
        host.mint_collectible(NFT, ALICE, TokenId::new(1)).unwrap();
        let result = host.approve_collectible(NFT, BOB, CAROL, TokenId::new(1));
        assert!(matches!(result, Err(AssetError::TransferFailed { .. })));
    }

    #[test]
    fn test_operator_approval_authorizes_transfer() {
        let mut host = InMemoryAssets::new();
        host.mint_collectible(NFT, ALICE, TokenId::new(3)).unwrap();
        host.set_approval_for_all(NFT, ALICE, BOB, true);

        host.collectible_transfer_from(NFT, BOB, ALICE, CAROL, TokenId::new(3))
            .unwrap();
        assert_eq!(host.owner_of(NFT, TokenId::new(3)), Some(CAROL));
    }

    #[test]
    fn test_single_approval_cleared_after_transfer() {
        let mut host = InMemoryAssets::new();
        host.mint_collectible(NFT, ALICE, TokenId::new(1)).unwrap();
        host.approve_collectible(NFT, ALICE, BOB, TokenId::new(1))
            .unwrap();
        host.collectible_transfer_from(NFT, BOB, ALICE, BOB, TokenId::new(1))
            .unwrap();

        // The approval was consumed by the first transfer
        host.collectible_transfer_from(NFT, BOB, BOB, CAROL, TokenId::new(1))
            .unwrap();
        let result = host.collectible_transfer_from(NFT, BOB, CAROL, BOB, TokenId::new(1));
        assert_eq!(
            result,
            Err(AssetError::NotApproved {
                collection: NFT,
                token_id: TokenId::new(1)
            })
        );
    }

    #[test]
    fn test_transfer_from_non_owner_fails() {
        let mut host = InMemoryAssets::new();
        host.mint_collectible(NFT, ALICE, TokenId::new(1)).unwrap();
        let result = host.collectible_transfer_from(NFT, BOB, BOB, CAROL, TokenId::new(1));
        assert!(matches!(result, Err(AssetError::TransferFailed { .. })));
    }
}
