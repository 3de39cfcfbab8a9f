//! Station orchestrator: routes fuel requests to tanks, enforces the
//! station-wide invariants, and keeps the ledger, statistics, and durable
//! store in step with every mutation.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use forecourt_core::{ColumnId, FuelGrade, StationError, StationResult, TankId};

use crate::config::StationConfig;
use crate::emergency::EmergencyMode;
use crate::ledger::{Transaction, TransactionDetails, TransactionLedger};
use crate::stats::Statistics;
use crate::storage::StateStore;
use crate::tank::Tank;

/// Outcome of a completed sale.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleReceipt {
    pub tank: TankId,
    pub column: ColumnId,
    pub fuel: FuelGrade,
    pub liters: f64,
    pub price_per_liter: f64,
    pub total_price: f64,
}

/// One dispensing line in a column status report.
#[derive(Debug, Clone, PartialEq)]
pub struct FuelLine {
    pub tank: TankId,
    pub enabled: bool,
    pub volume: f64,
}

/// Read-only projection of a column's dispensing lines.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStatus {
    pub column: ColumnId,
    pub available_fuels: BTreeMap<FuelGrade, FuelLine>,
    /// Grades present on the column whose tank is currently disabled.
    pub disabled_pistols: Vec<FuelGrade>,
}

/// Owns the whole in-memory station state for the lifetime of a session.
///
/// Every mutating operation validates fully before touching any entity, so
/// a rejected call leaves all state unchanged; every accepted call commits
/// its ledger entry and a full-state save as one unit, rolling the
/// in-memory mutation back if the durable save fails.
pub struct StationOrchestrator<S: StateStore> {
    store: S,
    config: StationConfig,
    tanks: Vec<Tank>,
    ledger: TransactionLedger,
    stats: Statistics,
    mode: EmergencyMode,
}

impl<S: StateStore> StationOrchestrator<S> {
    /// Load persisted state (seeding the configured roster and zeroed
    /// statistics when absent), sweep low tanks, and save the result.
    pub fn new(config: StationConfig, store: S) -> StationResult<Self> {
        let mut tanks = store.load_tanks()?;
        if tanks.is_empty() {
            debug!("no persisted tanks, seeding initial roster");
            tanks = config.initial_tanks().to_vec();
            store.save_tanks(&tanks)?;
        }

        let stats = match store.load_statistics()? {
            Some(stats) => stats,
            None => Statistics::zeroed(config.priced_grades()),
        };
        let mode = EmergencyMode::from_flag(store.load_emergency()?);
        let ledger = TransactionLedger::from_history(store.load_transactions()?);

        let mut orchestrator = Self {
            store,
            config,
            tanks,
            ledger,
            stats,
            mode,
        };

        // Startup level sweep: anything already below minimum must not
        // dispense.
        for tank in &mut orchestrator.tanks {
            if tank.disable_if_low() {
                warn!(tank = %tank.id(), volume = tank.current_volume(), "tank below minimum at startup");
            }
        }
        orchestrator.save_state()?;
        Ok(orchestrator)
    }

    pub fn config(&self) -> &StationConfig {
        &self.config
    }

    pub fn tanks(&self) -> &[Tank] {
        &self.tanks
    }

    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    pub fn emergency_mode(&self) -> EmergencyMode {
        self.mode
    }

    pub fn is_emergency(&self) -> bool {
        self.mode.is_active()
    }

    /// First enabled tank serving `fuel` on `column`. Absence is not an
    /// error at this layer; callers interpret `None`.
    pub fn lookup_tank(&self, fuel: FuelGrade, column: ColumnId) -> Option<&Tank> {
        self.tanks
            .iter()
            .find(|t| t.fuel() == fuel && t.serves_column(column) && t.is_enabled())
    }

    /// Every tank plumbed to `column`, enabled or not, keyed by grade.
    /// Used to report dispenser status including disabled lines.
    pub fn available_fuels(&self, column: ColumnId) -> BTreeMap<FuelGrade, &Tank> {
        let mut available = BTreeMap::new();
        for tank in &self.tanks {
            if tank.serves_column(column) {
                available.insert(tank.fuel(), tank);
            }
        }
        available
    }

    /// Tanks currently unable to dispense.
    pub fn disabled_tanks(&self) -> Vec<&Tank> {
        self.tanks.iter().filter(|t| !t.is_enabled()).collect()
    }

    /// Read-only column projection; no mutation.
    pub fn column_status(&self, column: ColumnId) -> ColumnStatus {
        let mut available_fuels = BTreeMap::new();
        let mut disabled_pistols = Vec::new();
        for (fuel, tank) in self.available_fuels(column) {
            available_fuels.insert(
                fuel,
                FuelLine {
                    tank: tank.id().clone(),
                    enabled: tank.is_enabled(),
                    volume: tank.current_volume(),
                },
            );
            if !tank.is_enabled() {
                disabled_pistols.push(fuel);
            }
        }
        ColumnStatus {
            column,
            available_fuels,
            disabled_pistols,
        }
    }

    /// Most-recent-first slice of the retained ledger.
    pub fn recent_transactions(&self, limit: usize) -> Vec<&Transaction> {
        self.ledger.recent(limit)
    }

    /// Dispense `liters` of `fuel` at `column` and charge for it.
    ///
    /// The single place money and stock move together: tank debit,
    /// statistics credit, ledger append, and the durable save happen as a
    /// unit or not at all.
    pub fn serve_customer(
        &mut self,
        column: ColumnId,
        fuel: FuelGrade,
        liters: f64,
    ) -> StationResult<SaleReceipt> {
        crate::tank::validate_amount(liters)?;
        self.ensure_normal_mode()?;

        let idx = self
            .tank_index(|t| t.fuel() == fuel && t.serves_column(column) && t.is_enabled())
            .ok_or(StationError::FuelUnavailable { fuel, column })?;

        if liters > self.tanks[idx].current_volume() {
            return Err(StationError::InsufficientStock {
                tank: self.tanks[idx].id().clone(),
                available: self.tanks[idx].current_volume(),
            });
        }

        // Price lookup fails after the tank lookup succeeded; the two-stage
        // order is kept for message compatibility.
        let price_per_liter = self
            .config
            .price_of(fuel)
            .ok_or(StationError::UnknownFuelType(fuel))?;
        let total_price = liters * price_per_liter;

        let tank_before = self.tanks[idx].clone();
        let stats_before = self.stats.clone();

        self.tanks[idx].remove_fuel(liters)?;
        self.stats.record_sale(fuel, liters, total_price);

        let receipt = SaleReceipt {
            tank: self.tanks[idx].id().clone(),
            column,
            fuel,
            liters,
            price_per_liter,
            total_price,
        };
        let details = TransactionDetails::Sale {
            column,
            fuel,
            liters,
            price_per_liter,
            total_price,
            tank: receipt.tank.clone(),
        };
        if let Err(err) = self.commit(details) {
            self.tanks[idx] = tank_before;
            self.stats = stats_before;
            return Err(err);
        }

        info!(
            column = %column,
            fuel = %fuel,
            liters,
            total = total_price,
            tank = %receipt.tank,
            "sale completed"
        );
        Ok(receipt)
    }

    /// Top a tank up from a delivery.
    pub fn refuel_tank(&mut self, tank_id: &TankId, liters: f64) -> StationResult<f64> {
        crate::tank::validate_amount(liters)?;
        self.ensure_normal_mode()?;

        let idx = self
            .tank_index(|t| t.id() == tank_id)
            .ok_or_else(|| StationError::TankNotFound(tank_id.clone()))?;

        let tank_before = self.tanks[idx].clone();
        self.tanks[idx].add_fuel(liters)?;
        let new_volume = self.tanks[idx].current_volume();

        let details = TransactionDetails::Refuel {
            tank: tank_id.clone(),
            liters_added: liters,
            new_volume,
        };
        if let Err(err) = self.commit(details) {
            self.tanks[idx] = tank_before;
            return Err(err);
        }

        info!(tank = %tank_id, liters, new_volume, "tank refueled");
        Ok(new_volume)
    }

    /// Move fuel between two tanks of the same grade.
    ///
    /// The source is re-evaluated for low-level auto-disable afterwards;
    /// the destination never is, and receiving fuel never re-enables it.
    pub fn transfer_fuel(
        &mut self,
        from_id: &TankId,
        to_id: &TankId,
        liters: f64,
    ) -> StationResult<()> {
        crate::tank::validate_amount(liters)?;
        self.ensure_normal_mode()?;

        let from_idx = self
            .tank_index(|t| t.id() == from_id)
            .ok_or_else(|| StationError::TankNotFound(from_id.clone()))?;
        let to_idx = self
            .tank_index(|t| t.id() == to_id)
            .ok_or_else(|| StationError::TankNotFound(to_id.clone()))?;

        let fuel = self.tanks[from_idx].fuel();
        if fuel != self.tanks[to_idx].fuel() {
            return Err(StationError::FuelTypeMismatch {
                from: fuel,
                to: self.tanks[to_idx].fuel(),
            });
        }
        if !self.tanks[from_idx].is_enabled() {
            return Err(StationError::SourceDisabled(from_id.clone()));
        }
        if liters > self.tanks[from_idx].current_volume() {
            return Err(StationError::InsufficientStock {
                tank: from_id.clone(),
                available: self.tanks[from_idx].current_volume(),
            });
        }
        if liters > self.tanks[to_idx].free_capacity() {
            return Err(StationError::CapacityExceeded {
                tank: to_id.clone(),
                requested: liters,
                free: self.tanks[to_idx].free_capacity(),
            });
        }

        let from_before = self.tanks[from_idx].clone();
        let to_before = self.tanks[to_idx].clone();

        self.tanks[from_idx].debit_unchecked(liters);
        self.tanks[to_idx].credit_unchecked(liters);
        self.tanks[from_idx].disable_if_low();

        let details = TransactionDetails::Transfer {
            from_tank: from_id.clone(),
            to_tank: to_id.clone(),
            liters,
            fuel,
        };
        if let Err(err) = self.commit(details) {
            self.tanks[from_idx] = from_before;
            self.tanks[to_idx] = to_before;
            return Err(err);
        }

        info!(from = %from_id, to = %to_id, liters, fuel = %fuel, "fuel transferred");
        Ok(())
    }

    /// Enable or disable a tank by operator action. Disabling always
    /// succeeds for an existing tank; enabling re-validates the level.
    pub fn toggle_tank(&mut self, tank_id: &TankId, enable: bool) -> StationResult<()> {
        let idx = self
            .tank_index(|t| t.id() == tank_id)
            .ok_or_else(|| StationError::TankNotFound(tank_id.clone()))?;

        let tank_before = self.tanks[idx].clone();
        if enable {
            self.tanks[idx].enable()?;
        } else {
            self.tanks[idx].disable();
        }

        let details = TransactionDetails::TankToggle {
            tank: tank_id.clone(),
            enabled: self.tanks[idx].is_enabled(),
            volume: self.tanks[idx].current_volume(),
        };
        if let Err(err) = self.commit(details) {
            self.tanks[idx] = tank_before;
            return Err(err);
        }

        info!(tank = %tank_id, enabled = enable, "tank toggled");
        Ok(())
    }

    /// Enter station-wide lockdown, force-disabling every tank.
    pub fn trigger_emergency(&mut self) -> StationResult<()> {
        self.mode.trigger()?;

        let tanks_before = self.tanks.clone();
        for tank in &mut self.tanks {
            tank.disable();
        }

        if let Err(err) = self.commit(TransactionDetails::Emergency { activated: true }) {
            self.tanks = tanks_before;
            self.mode = EmergencyMode::Normal;
            return Err(err);
        }

        warn!("emergency mode activated, all tanks locked");
        Ok(())
    }

    /// Leave lockdown. Tanks stay disabled until re-enabled one by one.
    pub fn deactivate_emergency(&mut self) -> StationResult<()> {
        self.mode.deactivate()?;

        if let Err(err) = self.commit(TransactionDetails::Emergency { activated: false }) {
            self.mode = EmergencyMode::Emergency;
            return Err(err);
        }

        info!("emergency mode deactivated, tanks remain disabled");
        Ok(())
    }

    fn ensure_normal_mode(&self) -> StationResult<()> {
        if self.mode.is_active() {
            return Err(StationError::EmergencyBlocked);
        }
        Ok(())
    }

    fn tank_index(&self, pred: impl Fn(&Tank) -> bool) -> Option<usize> {
        self.tanks.iter().position(pred)
    }

    /// Durably record one completed mutation: save the full station state,
    /// then append the transaction. The transaction record is written last,
    /// so a partial failure can at worst lose a history entry — it can
    /// never persist a record of a debit that was rolled back. The
    /// in-memory ledger is only touched once every save succeeded, so a
    /// failed commit leaves it unchanged and the caller rolls back its own
    /// entity mutations.
    fn commit(&mut self, details: TransactionDetails) -> StationResult<()> {
        let transaction = Transaction::now(details);
        self.save_state()?;
        self.store.save_transaction(&transaction)?;
        self.ledger.append(transaction);
        Ok(())
    }

    fn save_state(&self) -> StationResult<()> {
        self.store.save_tanks(&self.tanks)?;
        self.store.save_statistics(&self.stats)?;
        self.store.save_emergency(self.mode.as_flag())?;
        Ok(())
    }
}
