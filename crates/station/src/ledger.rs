//! Bounded, append-only transaction ledger.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use forecourt_core::{ColumnId, FuelGrade, TankId, TransactionId};

/// The ledger keeps only this many entries; the oldest are dropped first.
pub const LEDGER_CAPACITY: usize = 100;

/// Typed per-operation payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionDetails {
    Sale {
        column: ColumnId,
        fuel: FuelGrade,
        liters: f64,
        price_per_liter: f64,
        total_price: f64,
        tank: TankId,
    },
    Refuel {
        tank: TankId,
        liters_added: f64,
        new_volume: f64,
    },
    Transfer {
        from_tank: TankId,
        to_tank: TankId,
        liters: f64,
        fuel: FuelGrade,
    },
    TankToggle {
        tank: TankId,
        enabled: bool,
        volume: f64,
    },
    Emergency {
        activated: bool,
    },
}

impl TransactionDetails {
    /// Stable operation tag, matching the serialized `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            TransactionDetails::Sale { .. } => "sale",
            TransactionDetails::Refuel { .. } => "refuel",
            TransactionDetails::Transfer { .. } => "transfer",
            TransactionDetails::TankToggle { .. } => "tank_toggle",
            TransactionDetails::Emergency { .. } => "emergency",
        }
    }
}

/// One completed operation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub details: TransactionDetails,
}

impl Transaction {
    pub fn now(details: TransactionDetails) -> Self {
        Self {
            id: TransactionId::new(),
            timestamp: Utc::now(),
            details,
        }
    }
}

/// In-memory window over the transaction history, oldest first.
///
/// Bounded to [`LEDGER_CAPACITY`] entries with FIFO eviction; anything
/// older lives only with the persistence collaborator (which applies the
/// same bound on disk).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionLedger {
    entries: VecDeque<Transaction>,
}

impl TransactionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted history (most recent last), keeping only the
    /// capacity-bounded tail.
    pub fn from_history(history: Vec<Transaction>) -> Self {
        let skip = history.len().saturating_sub(LEDGER_CAPACITY);
        Self {
            entries: history.into_iter().skip(skip).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append one entry, evicting the oldest when full.
    pub fn append(&mut self, transaction: Transaction) {
        if self.entries.len() == LEDGER_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(transaction);
    }

    /// Most-recent-first slice of at most `limit` entries.
    pub fn recent(&self, limit: usize) -> Vec<&Transaction> {
        self.entries.iter().rev().take(limit).collect()
    }

    /// Full retained history, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &Transaction> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toggle_entry(n: u64) -> Transaction {
        Transaction::now(TransactionDetails::TankToggle {
            tank: TankId::new(format!("tank-{n}")),
            enabled: true,
            volume: n as f64,
        })
    }

    #[test]
    fn append_evicts_oldest_beyond_capacity() {
        let mut ledger = TransactionLedger::new();
        for n in 0..(LEDGER_CAPACITY as u64 + 25) {
            ledger.append(toggle_entry(n));
        }
        assert_eq!(ledger.len(), LEDGER_CAPACITY);

        // The 25 oldest entries are gone; the first survivor is entry 25.
        let oldest = ledger.entries().next().unwrap();
        match &oldest.details {
            TransactionDetails::TankToggle { tank, .. } => {
                assert_eq!(tank.as_str(), "tank-25");
            }
            other => panic!("unexpected details: {other:?}"),
        }
    }

    #[test]
    fn recent_is_most_recent_first_and_bounded() {
        let mut ledger = TransactionLedger::new();
        for n in 0..10 {
            ledger.append(toggle_entry(n));
        }
        let recent = ledger.recent(3);
        assert_eq!(recent.len(), 3);
        match &recent[0].details {
            TransactionDetails::TankToggle { tank, .. } => {
                assert_eq!(tank.as_str(), "tank-9");
            }
            other => panic!("unexpected details: {other:?}"),
        }
        assert!(ledger.recent(100).len() == 10);
    }

    #[test]
    fn from_history_keeps_only_the_tail() {
        let history: Vec<_> = (0..150).map(toggle_entry).collect();
        let ledger = TransactionLedger::from_history(history);
        assert_eq!(ledger.len(), LEDGER_CAPACITY);
        match &ledger.entries().next().unwrap().details {
            TransactionDetails::TankToggle { tank, .. } => {
                assert_eq!(tank.as_str(), "tank-50");
            }
            other => panic!("unexpected details: {other:?}"),
        }
    }

    #[test]
    fn details_serialize_with_type_tag() {
        let tx = Transaction::now(TransactionDetails::Emergency { activated: true });
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "emergency");
        assert_eq!(json["activated"], true);
    }
}
