//! Domain error model.

use thiserror::Error;

use crate::fuel::FuelGrade;
use crate::id::{ColumnId, TankId};

/// Result type used across the station domain.
pub type StationResult<T> = Result<T, StationError>;

/// Station-level operational error.
///
/// Every variant except [`StationError::Storage`] is a deterministic,
/// recoverable validation failure: the caller corrects the input and
/// retries. `Storage` is different — it reports a failed durable save after
/// a validated mutation and must be surfaced to the operator rather than
/// retried blindly.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StationError {
    /// Emergency mode is active; all mutating operations are blocked.
    #[error("emergency mode active: dispensing and tank operations are blocked")]
    EmergencyBlocked,

    /// No tank with the given identifier exists at this site.
    #[error("tank {0} not found")]
    TankNotFound(TankId),

    /// No enabled tank serves the requested grade on the requested column.
    #[error("{fuel} is not available on column {column}")]
    FuelUnavailable { fuel: FuelGrade, column: ColumnId },

    /// The price table has no entry for the requested grade.
    #[error("no price configured for {0}")]
    UnknownFuelType(FuelGrade),

    /// The tank holds less fuel than the operation requires.
    #[error("insufficient stock in tank {tank}: {available:.1} l available")]
    InsufficientStock { tank: TankId, available: f64 },

    /// The tank cannot absorb the requested volume.
    #[error("tank {tank} cannot absorb {requested:.1} l ({free:.1} l free)")]
    CapacityExceeded {
        tank: TankId,
        requested: f64,
        free: f64,
    },

    /// Transfers may only move fuel between tanks of the same grade.
    #[error("cannot transfer {from} into a {to} tank")]
    FuelTypeMismatch { from: FuelGrade, to: FuelGrade },

    /// The dispensing/source tank is disabled.
    #[error("source tank {0} is disabled")]
    SourceDisabled(TankId),

    /// A tank below its minimum safe level cannot be enabled.
    #[error("tank {tank} is below its minimum level ({min_level:.1} l)")]
    BelowMinimum { tank: TankId, min_level: f64 },

    /// An emergency transition was requested from its own target state.
    #[error("emergency mode is already {0}")]
    AlreadyInState(&'static str),

    /// Amounts must be positive, finite liter quantities.
    #[error("amount must be a positive, finite number of liters (got {0})")]
    InvalidAmount(f64),

    /// The durable-save step failed after a validated mutation.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl StationError {
    /// True for the one category that is operationally fatal for the call:
    /// a failed durable save, which risks drift between memory and storage.
    pub fn is_storage(&self) -> bool {
        matches!(self, StationError::Storage(_))
    }
}
