//! `forecourt-station` — inventory control for a single fuel-retail site.
//!
//! The [`orchestrator::StationOrchestrator`] composes the leaf pieces:
//! [`tank::Tank`] inventory entities, the [`emergency::EmergencyMode`] state
//! machine, the bounded [`ledger::TransactionLedger`], running
//! [`stats::Statistics`], and a [`storage::StateStore`] collaborator that
//! durably saves the whole station state after every mutation.

pub mod config;
pub mod emergency;
pub mod ledger;
pub mod orchestrator;
pub mod stats;
pub mod storage;
pub mod tank;

pub use config::StationConfig;
pub use emergency::EmergencyMode;
pub use ledger::{Transaction, TransactionDetails, TransactionLedger, LEDGER_CAPACITY};
pub use orchestrator::{ColumnStatus, FuelLine, SaleReceipt, StationOrchestrator};
pub use stats::{FuelTally, Statistics};
pub use storage::{MemoryStore, StateStore, StorageError};
pub use tank::Tank;
