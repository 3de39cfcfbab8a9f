//! `forecourt-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** vocabulary (no infrastructure
//! concerns): the station error taxonomy, strongly-typed identifiers, and
//! the fixed fuel-grade enumeration.

pub mod error;
pub mod fuel;
pub mod id;

pub use error::{StationError, StationResult};
pub use fuel::FuelGrade;
pub use id::{ColumnId, TankId, TransactionId};
