//! Cell Ledger — numbered custody cells and their lifecycle
//!
//! Each cell records who created it and which asset it holds. A cell is
//! `Active` from creation until a successful redemption retires it; a
//! retired cell never becomes active again, which is what makes every
//! authorization single-use.
//!
//! Both mutating entry points hold the [`EntryLock`] across their outbound
//! asset movement. Redemption retires the cell before releasing the asset
//! and puts it back to `Active` only if the release fails.

use cell_types::asset::Asset;
use cell_types::ids::{Address, CellId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::assets::{AssetAdapter, AssetBackend};
use crate::errors::LedgerError;
use crate::events::{BankEvent, CellCreated, CellRedeemed};
use crate::security::{EntryLock, EntryPoint};

/// Lifecycle state of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellStatus {
    Active,
    Retired,
}

/// One custody cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub id: CellId,
    pub creator: Address,
    pub asset: Asset,
    pub status: CellStatus,
    pub created_at: u64,
    pub redeemed_by: Option<Address>,
    pub redeemed_at: Option<u64>,
}

impl Cell {
    pub fn is_active(&self) -> bool {
        self.status == CellStatus::Active
    }
}

/// Registry of cells keyed by id, plus the append-only event log.
#[derive(Debug)]
pub struct CellLedger {
    cells: BTreeMap<CellId, Cell>,
    /// Id the next successful `create_cell` will assign
    next_id: CellId,
    lock: EntryLock,
    events: Vec<BankEvent>,
}

impl Default for CellLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl CellLedger {
    pub fn new() -> Self {
        Self {
            cells: BTreeMap::new(),
            next_id: CellId::FIRST,
            lock: EntryLock::new(),
            events: Vec::new(),
        }
    }

    // ───────────────────────── Create ─────────────────────────

    /// Take `asset` from `creator` into custody and record it under a
    /// fresh id.
    ///
    /// The id is only consumed when the deposit succeeds; a failed deposit
    /// leaves the counter, the registry and the event log untouched.
    pub fn create_cell<B: AssetBackend>(
        &mut self,
        assets: &mut AssetAdapter<B>,
        asset: Asset,
        creator: Address,
        attached_value: Decimal,
        now: u64,
    ) -> Result<CellId, LedgerError> {
        self.lock.enter(EntryPoint::CreateCell)?;
        let result = self.create_cell_locked(assets, asset, creator, attached_value, now);
        self.lock.exit();
        result
    }

    fn create_cell_locked<B: AssetBackend>(
        &mut self,
        assets: &mut AssetAdapter<B>,
        asset: Asset,
        creator: Address,
        attached_value: Decimal,
        now: u64,
    ) -> Result<CellId, LedgerError> {
        let cell_id = self.next_id;
        let following = cell_id.checked_next().ok_or(LedgerError::Overflow)?;

        assets.deposit(&asset, creator, attached_value)?;

        self.cells.insert(
            cell_id,
            Cell {
                id: cell_id,
                creator,
                asset: asset.clone(),
                status: CellStatus::Active,
                created_at: now,
                redeemed_by: None,
                redeemed_at: None,
            },
        );
        self.next_id = following;

        info!(%cell_id, %creator, %asset, "cell created");
        self.events.push(BankEvent::CellCreated(CellCreated {
            cell_id,
            creator,
            asset,
            created_at: now,
        }));
        Ok(cell_id)
    }

    // ───────────────────────── Retire ─────────────────────────

    /// Retire an active cell and release its asset to `to`.
    ///
    /// The caller is responsible for authorization; this only enforces the
    /// lifecycle. If the release fails the cell is restored to `Active`
    /// and the asset stays in custody.
    pub fn retire_and_release<B: AssetBackend>(
        &mut self,
        assets: &mut AssetAdapter<B>,
        cell_id: CellId,
        to: Address,
        now: u64,
    ) -> Result<CellRedeemed, LedgerError> {
        self.lock.enter(EntryPoint::RetireAndRelease)?;
        let result = self.retire_and_release_locked(assets, cell_id, to, now);
        self.lock.exit();
        result
    }

    fn retire_and_release_locked<B: AssetBackend>(
        &mut self,
        assets: &mut AssetAdapter<B>,
        cell_id: CellId,
        to: Address,
        now: u64,
    ) -> Result<CellRedeemed, LedgerError> {
        let cell = self.active_cell_mut(cell_id)?;
        cell.status = CellStatus::Retired;
        cell.redeemed_by = Some(to);
        cell.redeemed_at = Some(now);
        let asset = cell.asset.clone();
        let creator = cell.creator;

        if let Err(err) = assets.release(&asset, to) {
            warn!(%cell_id, %to, error = %err, "release failed, cell restored");
            if let Some(cell) = self.cells.get_mut(&cell_id) {
                cell.status = CellStatus::Active;
                cell.redeemed_by = None;
                cell.redeemed_at = None;
            }
            return Err(err.into());
        }

        info!(%cell_id, redeemer = %to, "cell redeemed");
        let redeemed = CellRedeemed {
            cell_id,
            creator,
            redeemer: to,
            asset,
            redeemed_at: now,
        };
        self.events.push(BankEvent::CellRedeemed(redeemed.clone()));
        Ok(redeemed)
    }

    // ───────────────────────── Queries ─────────────────────────

    /// The cell, failing with `UnknownCell` or `CellAlreadyRedeemed`
    /// unless it exists and is active.
    pub fn active_cell(&self, cell_id: CellId) -> Result<&Cell, LedgerError> {
        let cell = self
            .cells
            .get(&cell_id)
            .ok_or(LedgerError::UnknownCell { cell_id })?;
        if !cell.is_active() {
            return Err(LedgerError::CellAlreadyRedeemed { cell_id });
        }
        Ok(cell)
    }

    fn active_cell_mut(&mut self, cell_id: CellId) -> Result<&mut Cell, LedgerError> {
        let cell = self
            .cells
            .get_mut(&cell_id)
            .ok_or(LedgerError::UnknownCell { cell_id })?;
        if !cell.is_active() {
            return Err(LedgerError::CellAlreadyRedeemed { cell_id });
        }
        Ok(cell)
    }

    /// Creator of a cell, active or retired.
    pub fn creator(&self, cell_id: CellId) -> Result<Address, LedgerError> {
        self.cells
            .get(&cell_id)
            .map(|cell| cell.creator)
            .ok_or(LedgerError::UnknownCell { cell_id })
    }

    /// Unknown ids are simply not active.
    pub fn is_active(&self, cell_id: CellId) -> bool {
        self.cells.get(&cell_id).is_some_and(Cell::is_active)
    }

    pub fn cell(&self, cell_id: CellId) -> Option<&Cell> {
        self.cells.get(&cell_id)
    }

    /// Number of cells ever created.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn next_cell_id(&self) -> CellId {
        self.next_id
    }

    pub fn events(&self) -> &[BankEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<BankEvent> {
        std::mem::take(&mut self.events)
    }

    #[cfg(test)]
    fn starting_at(next_id: CellId) -> Self {
        Self {
            next_id,
            ..Self::new()
        }
    }
}
