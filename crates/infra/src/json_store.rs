//! Flat-file JSON implementation of the station's persistence contract.
//!
//! One file per record kind under a data directory. Every save serializes
//! to a `.tmp` sibling and renames it over the target, so a crash mid-write
//! never leaves a half-written record behind.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use forecourt_station::ledger::{Transaction, LEDGER_CAPACITY};
use forecourt_station::stats::Statistics;
use forecourt_station::storage::{StateStore, StorageError};
use forecourt_station::tank::Tank;

const TANKS_FILE: &str = "tanks.json";
const TRANSACTIONS_FILE: &str = "transactions.json";
const STATISTICS_FILE: &str = "statistics.json";
const EMERGENCY_FILE: &str = "emergency.json";

/// Persisted shape of the emergency flag.
#[derive(Debug, Serialize, Deserialize)]
struct EmergencyRecord {
    is_emergency: bool,
}

/// File-backed [`StateStore`] rooted at a data directory.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open a store at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        debug!(dir = %dir.display(), "opened json file store");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load a record, with `None` for a missing file. A present but
    /// unreadable file is an error, never silently treated as absent.
    fn load<T: DeserializeOwned>(&self, file: &str) -> Result<Option<T>, StorageError> {
        let path = self.dir.join(file);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Write-temp-then-rename save.
    fn save<T: Serialize>(&self, file: &str, value: &T) -> Result<(), StorageError> {
        let path = self.dir.join(file);
        let tmp = self.dir.join(format!("{file}.tmp"));
        let bytes = serde_json::to_vec_pretty(value)?;
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

impl StateStore for JsonFileStore {
    fn load_tanks(&self) -> Result<Vec<Tank>, StorageError> {
        Ok(self.load(TANKS_FILE)?.unwrap_or_default())
    }

    fn save_tanks(&self, tanks: &[Tank]) -> Result<(), StorageError> {
        self.save(TANKS_FILE, &tanks)
    }

    fn load_transactions(&self) -> Result<Vec<Transaction>, StorageError> {
        Ok(self.load(TRANSACTIONS_FILE)?.unwrap_or_default())
    }

    fn save_transaction(&self, transaction: &Transaction) -> Result<(), StorageError> {
        let mut history = self.load_transactions()?;
        history.push(transaction.clone());
        let excess = history.len().saturating_sub(LEDGER_CAPACITY);
        if excess > 0 {
            history.drain(..excess);
        }
        self.save(TRANSACTIONS_FILE, &history)
    }

    fn load_statistics(&self) -> Result<Option<Statistics>, StorageError> {
        self.load(STATISTICS_FILE)
    }

    fn save_statistics(&self, stats: &Statistics) -> Result<(), StorageError> {
        self.save(STATISTICS_FILE, stats)
    }

    fn load_emergency(&self) -> Result<bool, StorageError> {
        Ok(self
            .load::<EmergencyRecord>(EMERGENCY_FILE)?
            .map(|r| r.is_emergency)
            .unwrap_or(false))
    }

    fn save_emergency(&self, active: bool) -> Result<(), StorageError> {
        self.save(
            EMERGENCY_FILE,
            &EmergencyRecord {
                is_emergency: active,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forecourt_core::{ColumnId, FuelGrade, TankId};
    use forecourt_station::ledger::TransactionDetails;

    fn tank(id: &str, volume: f64) -> Tank {
        Tank::new(
            TankId::from(id),
            FuelGrade::Ai95,
            1000.0,
            volume,
            100.0,
            true,
            [ColumnId::new(1)],
        )
        .unwrap()
    }

    #[test]
    fn missing_files_report_documented_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();

        assert!(store.load_tanks().unwrap().is_empty());
        assert!(store.load_transactions().unwrap().is_empty());
        assert!(store.load_statistics().unwrap().is_none());
        assert!(!store.load_emergency().unwrap());
    }

    #[test]
    fn tanks_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();

        let tanks = vec![tank("a", 500.0), tank("b", 750.0)];
        store.save_tanks(&tanks).unwrap();
        assert_eq!(store.load_tanks().unwrap(), tanks);

        // Reopening the same directory sees the same state.
        let reopened = JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.load_tanks().unwrap(), tanks);
    }

    #[test]
    fn emergency_flag_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();

        store.save_emergency(true).unwrap();
        assert!(store.load_emergency().unwrap());
        store.save_emergency(false).unwrap();
        assert!(!store.load_emergency().unwrap());
    }

    #[test]
    fn transaction_history_is_truncated_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();

        for n in 0..(LEDGER_CAPACITY + 5) {
            let tx = Transaction::now(TransactionDetails::Refuel {
                tank: TankId::new(format!("tank-{n}")),
                liters_added: 1.0,
                new_volume: n as f64,
            });
            store.save_transaction(&tx).unwrap();
        }

        let history = store.load_transactions().unwrap();
        assert_eq!(history.len(), LEDGER_CAPACITY);
        match &history.last().unwrap().details {
            TransactionDetails::Refuel { tank, .. } => {
                assert_eq!(tank.as_str(), format!("tank-{}", LEDGER_CAPACITY + 4));
            }
            other => panic!("unexpected details: {other:?}"),
        }
    }

    #[test]
    fn corrupt_record_surfaces_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();

        std::fs::write(dir.path().join(TANKS_FILE), b"{not json").unwrap();
        assert!(matches!(
            store.load_tanks(),
            Err(StorageError::Serde(_))
        ));
    }

    #[test]
    fn saves_leave_no_temp_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        store.save_tanks(&[tank("a", 500.0)]).unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
