//! Persistence collaborator contract.
//!
//! The orchestrator talks to durable storage only through [`StateStore`],
//! so the backend (flat files, embedded DB, remote store) is swappable
//! without touching orchestration logic. [`MemoryStore`] is the in-memory
//! reference implementation, intended for tests/dev.

use std::sync::RwLock;

use thiserror::Error;

use forecourt_core::StationError;

use crate::ledger::{Transaction, LEDGER_CAPACITY};
use crate::stats::Statistics;
use crate::tank::Tank;

/// Failure of the durable store itself (not a domain validation error).
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage encoding: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("storage backend: {0}")]
    Backend(String),
}

impl From<StorageError> for StationError {
    fn from(err: StorageError) -> Self {
        StationError::Storage(err.to_string())
    }
}

/// Narrow load/save contract for the four persisted record kinds.
///
/// Loads report absence (`Option`/empty/false defaults) distinctly from
/// backend failure. `save_transaction` appends and truncates the durable
/// history to the most recent [`LEDGER_CAPACITY`] entries; `load_transactions`
/// returns them most-recent-last.
pub trait StateStore {
    fn load_tanks(&self) -> Result<Vec<Tank>, StorageError>;
    fn save_tanks(&self, tanks: &[Tank]) -> Result<(), StorageError>;

    fn load_transactions(&self) -> Result<Vec<Transaction>, StorageError>;
    fn save_transaction(&self, transaction: &Transaction) -> Result<(), StorageError>;

    fn load_statistics(&self) -> Result<Option<Statistics>, StorageError>;
    fn save_statistics(&self, stats: &Statistics) -> Result<(), StorageError>;

    fn load_emergency(&self) -> Result<bool, StorageError>;
    fn save_emergency(&self, active: bool) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
struct MemoryState {
    tanks: Vec<Tank>,
    transactions: Vec<Transaction>,
    statistics: Option<Statistics>,
    emergency: bool,
}

/// In-memory [`StateStore`].
///
/// Intended for tests/dev. Not durable.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, MemoryState>, StorageError> {
        self.state
            .read()
            .map_err(|_| StorageError::Backend("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, MemoryState>, StorageError> {
        self.state
            .write()
            .map_err(|_| StorageError::Backend("lock poisoned".to_string()))
    }
}

impl StateStore for MemoryStore {
    fn load_tanks(&self) -> Result<Vec<Tank>, StorageError> {
        Ok(self.read()?.tanks.clone())
    }

    fn save_tanks(&self, tanks: &[Tank]) -> Result<(), StorageError> {
        self.write()?.tanks = tanks.to_vec();
        Ok(())
    }

    fn load_transactions(&self) -> Result<Vec<Transaction>, StorageError> {
        Ok(self.read()?.transactions.clone())
    }

    fn save_transaction(&self, transaction: &Transaction) -> Result<(), StorageError> {
        let mut state = self.write()?;
        state.transactions.push(transaction.clone());
        let excess = state.transactions.len().saturating_sub(LEDGER_CAPACITY);
        if excess > 0 {
            state.transactions.drain(..excess);
        }
        Ok(())
    }

    fn load_statistics(&self) -> Result<Option<Statistics>, StorageError> {
        Ok(self.read()?.statistics.clone())
    }

    fn save_statistics(&self, stats: &Statistics) -> Result<(), StorageError> {
        self.write()?.statistics = Some(stats.clone());
        Ok(())
    }

    fn load_emergency(&self) -> Result<bool, StorageError> {
        Ok(self.read()?.emergency)
    }

    fn save_emergency(&self, active: bool) -> Result<(), StorageError> {
        self.write()?.emergency = active;
        Ok(())
    }
}
