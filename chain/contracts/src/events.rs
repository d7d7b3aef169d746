//! Contract events
//!
//! Immutable records appended by successful state transitions. A call that
//! fails appends nothing.

use cell_types::asset::Asset;
use cell_types::ids::{Address, CellId};
use serde::{Deserialize, Serialize};

/// A cell was created and its asset taken into custody
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellCreated {
    pub cell_id: CellId,
    pub creator: Address,
    pub asset: Asset,
    pub created_at: u64,
}

/// A cell was redeemed by its confidant and retired
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRedeemed {
    pub cell_id: CellId,
    pub creator: Address,
    pub redeemer: Address,
    pub asset: Asset,
    pub redeemed_at: u64,
}

/// Enum wrapper for all contract events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BankEvent {
    CellCreated(CellCreated),
    CellRedeemed(CellRedeemed),
}

impl BankEvent {
    pub fn cell_id(&self) -> CellId {
        match self {
            BankEvent::CellCreated(e) => e.cell_id,
            BankEvent::CellRedeemed(e) => e.cell_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_cell_created_serialization() {
        let event = CellCreated {
            cell_id: CellId::new(1),
            creator: Address::new([0xa1; 20]),
            asset: Asset::fungible(Address::new([0x70; 20]), Decimal::from(100)),
            created_at: 1_700_000_000,
        };
        let json = serde_json::to_string(&event).unwrap();
        let deser: CellCreated = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deser);
    }

    #[test]
    fn test_bank_event_cell_id() {
        let event = BankEvent::CellRedeemed(CellRedeemed {
            cell_id: CellId::new(3),
            creator: Address::new([1; 20]),
            redeemer: Address::new([2; 20]),
            asset: Asset::native(Decimal::from(5)),
            redeemed_at: 10,
        });
        assert_eq!(event.cell_id(), CellId::new(3));
        assert!(matches!(event, BankEvent::CellRedeemed(_)));
    }
}
